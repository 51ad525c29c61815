//! C ABI matching the shared-library kernel the Python pipeline loads via
//! `ctypes`.

use std::borrow::Cow;
use std::os::raw::{c_int, c_long};
use std::slice;

use crate::kernel;

// LP64: `long` is already `i64`.
#[cfg(all(target_pointer_width = "64", not(windows)))]
fn widen(words: &[c_long]) -> Cow<'_, [i64]> {
    Cow::Borrowed(words)
}

#[cfg(not(all(target_pointer_width = "64", not(windows))))]
fn widen(words: &[c_long]) -> Cow<'_, [i64]> {
    Cow::Owned(words.iter().map(|&w| i64::from(w)).collect())
}

/// # Safety
///
/// `output` must point to `output_size` writable doubles, and `words` and
/// `weights` to `words_size` readable values each. The regions must not
/// overlap. Null pointers or non-positive sizes turn the call into a no-op.
#[no_mangle]
pub unsafe extern "C" fn pairwise_entropies_window(
    output: *mut f64,
    output_size: c_long,
    words: *const c_long,
    words_size: c_long,
    weights: *const f64,
) {
    if output.is_null() || words.is_null() || weights.is_null() || output_size <= 0 || words_size <= 0 {
        return;
    }
    let output = slice::from_raw_parts_mut(output, output_size as usize);
    let words = widen(slice::from_raw_parts(words, words_size as usize));
    let weights = slice::from_raw_parts(weights, words_size as usize);
    kernel::accumulate(output, &words, weights);
}

/// Validating variant. Returns `0` on success, `1` on a precondition
/// violation and `2` on an aggregated weight with no finite entropy term;
/// `output` is left untouched on failure.
///
/// # Safety
///
/// Same contract as [`pairwise_entropies_window`], except that null pointers
/// and non-positive sizes are reported as precondition violations.
#[no_mangle]
pub unsafe extern "C" fn pairwise_entropies_window_checked(
    output: *mut f64,
    output_size: c_long,
    words: *const c_long,
    words_size: c_long,
    weights: *const f64,
) -> c_int {
    if output.is_null() || words.is_null() || weights.is_null() || output_size <= 0 || words_size <= 0 {
        return 1;
    }
    let output = slice::from_raw_parts_mut(output, output_size as usize);
    let words = widen(slice::from_raw_parts(words, words_size as usize));
    let weights = slice::from_raw_parts(weights, words_size as usize);
    match kernel::accumulate_checked(output, &words, weights) {
        Ok(()) => 0,
        Err(err) => err.code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_entry_point_matches_kernel() {
        let mut out = [0.0f64; 10];
        let words: [c_long; 3] = [1, 2, 1];
        let weights = [1.0f64, 2.0, 3.0];
        unsafe {
            pairwise_entropies_window(out.as_mut_ptr(), 10, words.as_ptr(), 3, weights.as_ptr());
        }
        assert!((out[1] - 4.0 * 4.0f64.ln()).abs() < 1e-9);
        assert!((out[2] - 2.0 * 2.0f64.ln()).abs() < 1e-9);
    }

    #[cfg(all(target_pointer_width = "64", not(windows)))]
    #[test]
    fn lp64_tokens_are_borrowed_not_copied() {
        let words: [c_long; 3] = [4, -8, 15];
        let widened = widen(&words);
        assert!(matches!(widened, Cow::Borrowed(_)));
        assert_eq!(widened.as_ptr(), words.as_ptr());
    }

    #[test]
    fn widened_tokens_keep_their_values() {
        let words: [c_long; 3] = [c_long::MIN, 0, c_long::MAX];
        let expected: Vec<i64> = vec![i64::from(c_long::MIN), 0, i64::from(c_long::MAX)];
        assert_eq!(widen(&words).as_ref(), expected.as_slice());
    }

    #[test]
    fn degenerate_arguments_are_ignored() {
        let mut out = [0.0f64; 4];
        let words: [c_long; 1] = [1];
        let weights = [1.0f64];
        unsafe {
            pairwise_entropies_window(out.as_mut_ptr(), 0, words.as_ptr(), 1, weights.as_ptr());
            pairwise_entropies_window(out.as_mut_ptr(), 4, words.as_ptr(), 0, weights.as_ptr());
            pairwise_entropies_window(out.as_mut_ptr(), 4, std::ptr::null(), 1, weights.as_ptr());
        }
        assert_eq!(out, [0.0; 4]);
    }

    #[test]
    fn checked_entry_point_reports_codes() {
        let mut out = [0.0f64; 4];
        let words: [c_long; 2] = [3, 3];
        let good = [0.5f64, 0.5];
        let bad = [0.5f64, -0.5];
        unsafe {
            assert_eq!(
                pairwise_entropies_window_checked(out.as_mut_ptr(), 4, words.as_ptr(), 2, bad.as_ptr()),
                2
            );
            assert_eq!(out, [0.0; 4]);
            assert_eq!(
                pairwise_entropies_window_checked(out.as_mut_ptr(), 0, words.as_ptr(), 2, good.as_ptr()),
                1
            );
            assert_eq!(
                pairwise_entropies_window_checked(out.as_mut_ptr(), 4, words.as_ptr(), 2, good.as_ptr()),
                0
            );
        }
        // 1.0 * ln(1.0) == 0 for the merged token.
        assert_eq!(out, [0.0; 4]);
    }
}
