//! MultiDiscrete action space

use super::Space;
use rand::Rng;

/// Several independent discrete choices.
///
/// Dimension i has nvec[i] possible values: {0, 1, ..., nvec[i]-1}
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiDiscrete {
    /// Number of values for each dimension
    pub nvec: Vec<usize>,
    shape: Vec<usize>,
}

impl MultiDiscrete {
    pub fn new(nvec: Vec<usize>) -> Self {
        assert!(!nvec.is_empty(), "MultiDiscrete must have at least 1 dimension");
        assert!(nvec.iter().all(|&n| n > 0), "All dimensions must have at least 1 element");
        let shape = vec![nvec.len()];
        Self { nvec, shape }
    }

    pub fn ndim(&self) -> usize {
        self.nvec.len()
    }

    /// Truncate each component toward zero and clamp it into its dimension.
    ///
    /// Components beyond `ndim` are ignored; missing ones read as 0.
    pub fn clip(&self, row: &[f32]) -> Vec<usize> {
        self.nvec
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                let v = row.get(i).copied().unwrap_or(0.0);
                (v.max(0.0) as usize).min(n - 1)
            })
            .collect()
    }
}

impl Space for MultiDiscrete {
    type Sample = Vec<usize>;

    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample {
        self.nvec.iter().map(|&n| rng.gen_range(0..n)).collect()
    }

    fn contains(&self, value: &Self::Sample) -> bool {
        value.len() == self.nvec.len() && value.iter().zip(&self.nvec).all(|(&v, &n)| v < n)
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn num_elements(&self) -> usize {
        self.nvec.len()
    }
}
