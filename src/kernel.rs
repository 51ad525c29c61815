//! Hashed pairwise-entropy accumulation over a single window.
//!
//! Weights are summed per distinct token, each sum `w` becomes `w * ln(w)`,
//! and that term is added into the output slot picked by hashing the window's
//! center token with the summed token. The output is never cleared here: the
//! caller zeroes it once per document and reuses it across every window.

use std::collections::HashMap;

use crate::error::{KernelError, Precondition};

/// Multiplier of the `(center, token)` bucket hash. Frozen.
pub const MULTIPLIER: i64 = 1_664_525;

/// Center token of a window: `words[len / 2]`, so even windows pick the
/// element just past the midpoint.
///
/// Panics on an empty window.
#[inline(always)]
pub fn center(words: &[i64]) -> i64 {
    words[words.len() / 2]
}

/// Output slot for `token` in a window centered on `center`.
///
/// Panics when `output_size` is zero.
#[inline(always)]
pub fn bucket(center: i64, token: i64, output_size: usize) -> usize {
    let h = center.wrapping_mul(MULTIPLIER).wrapping_add(token);
    h.rem_euclid(output_size as i64) as usize
}

/// `w * ln(w)`. Zero and negative weights yield NaN.
#[inline(always)]
pub fn entropy_term(weight: f64) -> f64 {
    weight * weight.ln()
}

/// Per-token weight sums in first-encounter order.
///
/// Each key is summed in index order, so repeated calls are bit-identical.
/// Pairs past the shorter of the two buffers are ignored.
pub fn aggregate(words: &[i64], weights: &[f64]) -> Vec<(i64, f64)> {
    let mut slots: HashMap<i64, usize> = HashMap::with_capacity(words.len());
    let mut sums: Vec<(i64, f64)> = Vec::with_capacity(words.len());
    for (&word, &weight) in words.iter().zip(weights) {
        match slots.get(&word) {
            Some(&slot) => sums[slot].1 += weight,
            None => {
                slots.insert(word, sums.len());
                sums.push((word, weight));
            }
        }
    }
    sums
}

#[inline(always)]
fn scatter(output: &mut [f64], center: i64, sums: &[(i64, f64)]) {
    let size = output.len();
    for &(token, weight) in sums {
        output[bucket(center, token, size)] += entropy_term(weight);
    }
}

/// Adds one window's entropy terms into `output`.
///
/// Nothing is validated: NaN and Inf from non-positive sums land in the
/// output as-is. Panics if `words` or `output` is empty.
pub fn accumulate(output: &mut [f64], words: &[i64], weights: &[f64]) {
    let center = center(words);
    let sums = aggregate(words, weights);
    scatter(output, center, &sums);
}

/// Like [`accumulate`], but rejects bad input instead of writing NaN or Inf.
///
/// Every check runs before the first write, so `output` is untouched on error.
pub fn accumulate_checked(
    output: &mut [f64],
    words: &[i64],
    weights: &[f64],
) -> Result<(), KernelError> {
    if words.is_empty() {
        return Err(Precondition::EmptyWindow.into());
    }
    if output.is_empty() {
        return Err(Precondition::ZeroOutputSize.into());
    }
    if words.len() != weights.len() {
        return Err(Precondition::LengthMismatch {
            words: words.len(),
            weights: weights.len(),
        }
        .into());
    }

    let sums = aggregate(words, weights);
    if let Some(&(token, weight)) = sums
        .iter()
        .find(|&&(_, w)| !(w.is_finite() && w > 0.0 && entropy_term(w).is_finite()))
    {
        return Err(KernelError::NumericDomain { token, weight });
    }

    scatter(output, center(words), &sums);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn three_token_window_lands_in_expected_slots() {
        let mut out = [0.0; 10];
        accumulate(&mut out, &[1, 2, 1], &[1.0, 2.0, 3.0]);

        assert!((out[1] - 4.0 * 4.0f64.ln()).abs() < EPS);
        assert!((out[1] - 5.545177).abs() < 1e-6);
        assert!((out[2] - 2.0 * 2.0f64.ln()).abs() < EPS);
        assert!((out[2] - 1.386294).abs() < 1e-6);
        for (i, v) in out.iter().enumerate() {
            if i != 1 && i != 2 {
                assert_eq!(*v, 0.0, "slot {i} should be untouched");
            }
        }
    }

    #[test]
    fn center_uses_floor_half_index() {
        assert_eq!(center(&[7]), 7);
        assert_eq!(center(&[1, 2, 3]), 2);
        assert_eq!(center(&[10, 20, 30, 40]), 30);
        assert_eq!(center(&[10, 20]), 20);
    }

    #[test]
    fn aggregate_sums_per_token_in_encounter_order() {
        let sums = aggregate(&[3, 1, 3, 2, 1], &[0.5, 1.0, 0.25, 2.0, 4.0]);
        assert_eq!(sums, vec![(3, 0.75), (1, 5.0), (2, 2.0)]);
    }

    #[test]
    fn negative_hash_is_normalized() {
        // -1664525 = -166453 * 10 + 5
        assert_eq!(bucket(-1, 0, 10), 5);
        assert!(bucket(i64::MIN, -1, 7) < 7);
        assert!(bucket(i64::MAX, i64::MAX, 13) < 13);
    }

    #[test]
    fn single_slot_output_collects_everything() {
        let mut out = [0.0; 1];
        accumulate(&mut out, &[-9, 4, 1_000_000], &[1.0, 2.0, 3.0]);
        let expected = entropy_term(1.0) + entropy_term(2.0) + entropy_term(3.0);
        assert!((out[0] - expected).abs() < EPS);
    }

    #[test]
    fn repeated_calls_accumulate() {
        let mut once = [0.0; 16];
        accumulate(&mut once, &[4, 8, 15, 16, 23], &[0.1, 0.2, 0.4, 0.2, 0.1]);

        let mut twice = [0.0; 16];
        accumulate(&mut twice, &[4, 8, 15, 16, 23], &[0.1, 0.2, 0.4, 0.2, 0.1]);
        accumulate(&mut twice, &[4, 8, 15, 16, 23], &[0.1, 0.2, 0.4, 0.2, 0.1]);

        for (a, b) in once.iter().zip(&twice) {
            assert!((2.0 * a - b).abs() < EPS);
        }
    }

    #[test]
    fn existing_output_is_added_to() {
        let mut out = [1.5; 10];
        accumulate(&mut out, &[1, 2, 1], &[1.0, 2.0, 3.0]);
        assert!((out[1] - (1.5 + 4.0 * 4.0f64.ln())).abs() < EPS);
        assert_eq!(out[0], 1.5);
    }

    #[test]
    fn zero_weight_writes_nan() {
        let mut out = [0.0; 4];
        accumulate(&mut out, &[3], &[0.0]);
        let idx = bucket(3, 3, 4);
        assert!(out[idx].is_nan());
    }

    #[test]
    fn cancelling_weights_write_nan() {
        let mut out = [0.0; 4];
        accumulate(&mut out, &[5, 5], &[1.0, -1.0]);
        assert!(out[bucket(5, 5, 4)].is_nan());
    }

    #[test]
    fn negative_weight_writes_nan() {
        let mut out = [0.0; 4];
        accumulate(&mut out, &[2], &[-0.5]);
        assert!(out[bucket(2, 2, 4)].is_nan());
    }

    #[test]
    #[should_panic]
    fn empty_window_panics() {
        let mut out = [0.0; 4];
        accumulate(&mut out, &[], &[]);
    }

    #[test]
    #[should_panic]
    fn empty_output_panics() {
        let mut out: [f64; 0] = [];
        accumulate(&mut out, &[1], &[1.0]);
    }

    #[test]
    fn checked_matches_permissive_on_valid_input() {
        let words = [1, 2, 1];
        let weights = [1.0, 2.0, 3.0];
        let mut a = [0.0; 10];
        let mut b = [0.0; 10];
        accumulate(&mut a, &words, &weights);
        accumulate_checked(&mut b, &words, &weights).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn checked_rejects_preconditions() {
        let mut out = [0.0; 4];
        assert_eq!(
            accumulate_checked(&mut out, &[], &[]),
            Err(Precondition::EmptyWindow.into())
        );
        assert_eq!(
            accumulate_checked(&mut [], &[1], &[1.0]),
            Err(Precondition::ZeroOutputSize.into())
        );
        assert_eq!(
            accumulate_checked(&mut out, &[1, 2], &[1.0]),
            Err(Precondition::LengthMismatch { words: 2, weights: 1 }.into())
        );
    }

    #[test]
    fn checked_rejects_non_positive_sum_without_writing() {
        let mut out = [1.0; 4];
        let err = accumulate_checked(&mut out, &[1, 2, 3], &[1.0, 0.0, 2.0]).unwrap_err();
        assert_eq!(err, KernelError::NumericDomain { token: 2, weight: 0.0 });
        assert_eq!(out, [1.0; 4]);

        let err = accumulate_checked(&mut out, &[1], &[f64::INFINITY]).unwrap_err();
        assert_eq!(err.code(), 2);
        assert_eq!(out, [1.0; 4]);
    }

    #[test]
    fn checked_rejects_overflowing_entropy_term() {
        // Finite and positive, but w * ln(w) overflows to +inf.
        let mut out = [0.0; 4];
        let err = accumulate_checked(&mut out, &[1], &[f64::MAX]).unwrap_err();
        assert_eq!(err, KernelError::NumericDomain { token: 1, weight: f64::MAX });
        assert_eq!(out, [0.0; 4]);

        // Two finite weights whose sum overflows.
        let err = accumulate_checked(&mut out, &[7, 7], &[f64::MAX, f64::MAX]).unwrap_err();
        assert_eq!(err, KernelError::NumericDomain { token: 7, weight: f64::INFINITY });
        assert_eq!(out, [0.0; 4]);

        // Large but representable terms still pass.
        accumulate_checked(&mut out, &[1], &[1e300]).unwrap();
        assert!(out[bucket(1, 1, 4)].is_finite());
    }
}
