/// Dense hashed feature histogram for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVec {
    data: Vec<f64>,
}

impl FeatureVec {
    #[inline(always)]
    pub fn new(output_size: usize) -> Self {
        Self {
            data: vec![0.0; output_size],
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Zeroes every slot, keeping the allocation.
    #[inline(always)]
    pub fn reset(&mut self) {
        self.data.iter_mut().for_each(|v| *v = 0.0);
    }

    #[inline(always)]
    pub fn copy_to_slice(&self, out: &mut [f64]) {
        out.copy_from_slice(&self.data);
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.data
    }
}

impl From<Vec<f64>> for FeatureVec {
    fn from(data: Vec<f64>) -> Self {
        Self { data }
    }
}
