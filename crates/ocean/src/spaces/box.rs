//! Box (continuous or bounded integer) space

use super::{Dtype, Space};
use ndarray::{ArrayD, IxDyn};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Box space with per-element bounds
#[derive(Clone, Debug)]
pub struct Box {
    /// Lower bound for each element
    pub low: ArrayD<f32>,
    /// Upper bound for each element
    pub high: ArrayD<f32>,
    /// Element type of buffers described by this space
    pub dtype: Dtype,
    shape: Vec<usize>,
}

impl Box {
    /// Create a new `f32` box space with given bounds
    pub fn new(low: ArrayD<f32>, high: ArrayD<f32>) -> Self {
        assert_eq!(low.shape(), high.shape(), "Low and high must have same shape");
        let shape = low.shape().to_vec();
        Self {
            low,
            high,
            dtype: Dtype::F32,
            shape,
        }
    }

    /// Create a box space with uniform bounds
    pub fn uniform(shape: &[usize], low: f32, high: f32) -> Self {
        Self::new(
            ArrayD::from_elem(IxDyn(shape), low),
            ArrayD::from_elem(IxDyn(shape), high),
        )
    }

    /// Create a symmetric box [-1, 1] for all elements
    pub fn symmetric(shape: &[usize]) -> Self {
        Self::uniform(shape, -1.0, 1.0)
    }

    pub fn with_dtype(mut self, dtype: Dtype) -> Self {
        self.dtype = dtype;
        self
    }

    /// Clamp a flat row into the bounds, element by element
    pub fn clip(&self, row: &[f32]) -> Vec<f32> {
        row.iter()
            .zip(self.low.iter().zip(self.high.iter()))
            .map(|(&v, (&l, &h))| v.clamp(l, h))
            .collect()
    }
}

impl Space for Box {
    type Sample = ArrayD<f32>;

    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample {
        let mut result = ArrayD::zeros(IxDyn(&self.shape));
        for ((&l, &h), r) in self.low.iter().zip(self.high.iter()).zip(result.iter_mut()) {
            *r = Uniform::new_inclusive(l, h).sample(rng);
            if self.dtype != Dtype::F32 {
                *r = r.floor();
            }
        }
        result
    }

    fn contains(&self, value: &Self::Sample) -> bool {
        value.shape() == self.low.shape()
            && value
                .iter()
                .zip(self.low.iter())
                .zip(self.high.iter())
                .all(|((&v, &l), &h)| v >= l && v <= h)
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_box_sample() {
        let space = Box::uniform(&[3, 4], -1.0, 1.0);
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let sample = space.sample(&mut rng);
            assert!(space.contains(&sample));
            assert_eq!(sample.shape(), &[3, 4]);
        }
    }

    #[test]
    fn test_box_clip() {
        let space = Box::symmetric(&[2]);
        assert_eq!(space.clip(&[3.0, -0.25]), vec![1.0, -0.25]);
        assert_eq!(space.clip(&[-7.5, -1.0]), vec![-1.0, -1.0]);
    }

    #[test]
    fn test_integer_box_samples_whole_numbers() {
        let space = Box::uniform(&[16], 0.0, 255.0).with_dtype(Dtype::U8);
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let sample = space.sample(&mut rng);
        assert!(sample.iter().all(|v| v.fract() == 0.0));
        assert!(space.contains(&sample));
    }
}
