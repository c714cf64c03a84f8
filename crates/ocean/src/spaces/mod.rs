//! Observation and action space types.
//!
//! Gymnasium-style space definitions. Every space describes a single agent;
//! batched buffers add a leading agent axis.

mod r#box;
mod discrete;
mod multi_discrete;

pub use discrete::Discrete;
pub use multi_discrete::MultiDiscrete;
pub use r#box::Box;

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Trait for observation and action spaces
pub trait Space: Clone + Send + Sync {
    /// The type of samples from this space
    type Sample;

    /// Sample a random element from this space
    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample;

    /// Check if a value is contained in this space
    fn contains(&self, value: &Self::Sample) -> bool;

    /// Get the shape of samples from this space
    fn shape(&self) -> &[usize];

    /// Get the total number of elements in a sample
    fn num_elements(&self) -> usize {
        self.shape().iter().product()
    }
}

/// Element type of a buffer described by a space
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dtype {
    U8,
    U32,
    F32,
}

/// Enum for dynamic space types
#[derive(Clone, Debug)]
pub enum DynSpace {
    Discrete(Discrete),
    MultiDiscrete(MultiDiscrete),
    Box(Box),
}

impl DynSpace {
    /// Get the shape of this space
    pub fn shape(&self) -> Vec<usize> {
        match self {
            DynSpace::Discrete(s) => s.shape().to_vec(),
            DynSpace::MultiDiscrete(s) => s.shape().to_vec(),
            DynSpace::Box(s) => s.shape().to_vec(),
        }
    }

    /// Flat number of elements in one sample
    pub fn num_elements(&self) -> usize {
        match self {
            DynSpace::Discrete(s) => s.num_elements(),
            DynSpace::MultiDiscrete(s) => s.num_elements(),
            DynSpace::Box(s) => s.num_elements(),
        }
    }

    pub fn dtype(&self) -> Dtype {
        match self {
            DynSpace::Discrete(_) | DynSpace::MultiDiscrete(_) => Dtype::U32,
            DynSpace::Box(s) => s.dtype,
        }
    }

    /// Sample from this space as a flat `f32` row
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Array1<f32> {
        match self {
            DynSpace::Discrete(s) => Array1::from_elem(1, s.sample(rng) as f32),
            DynSpace::MultiDiscrete(s) => s.sample(rng).into_iter().map(|x| x as f32).collect(),
            DynSpace::Box(s) => s.sample(rng).iter().copied().collect(),
        }
    }

    /// Check if this space contains the flat row `value`
    pub fn contains(&self, value: &[f32]) -> bool {
        match self {
            DynSpace::Discrete(s) => match value {
                [v] => v.fract() == 0.0 && *v >= 0.0 && s.contains(&(*v as usize)),
                _ => false,
            },
            DynSpace::MultiDiscrete(s) => {
                value.iter().all(|v| v.fract() == 0.0 && *v >= 0.0)
                    && s.contains(&value.iter().map(|&v| v as usize).collect::<Vec<usize>>())
            }
            DynSpace::Box(s) => {
                s.num_elements() == value.len()
                    && value
                        .iter()
                        .zip(s.low.iter().zip(s.high.iter()))
                        .all(|(&v, (&l, &h))| v >= l && v <= h)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_dyn_space_sample_contained() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let spaces = [
            DynSpace::Discrete(Discrete::new(7)),
            DynSpace::MultiDiscrete(MultiDiscrete::new(vec![3, 3])),
            DynSpace::Box(Box::symmetric(&[2])),
        ];
        for space in &spaces {
            for _ in 0..50 {
                let sample = space.sample(&mut rng);
                assert_eq!(sample.len(), space.num_elements());
                assert!(space.contains(sample.as_slice().unwrap()));
            }
        }
    }

    #[test]
    fn test_dyn_space_rejects() {
        let md = DynSpace::MultiDiscrete(MultiDiscrete::new(vec![3, 3]));
        assert!(!md.contains(&[3.0, 0.0]));
        assert!(!md.contains(&[0.5, 0.0]));
        assert!(!md.contains(&[1.0]));

        let discrete = DynSpace::Discrete(Discrete::new(7));
        assert!(!discrete.contains(&[-1.0]));
        assert!(!discrete.contains(&[1.0, 2.0]));
    }

    #[test]
    fn test_dtypes() {
        assert_eq!(DynSpace::Discrete(Discrete::new(2)).dtype(), Dtype::U32);
        let obs = Box::uniform(&[4], 0.0, 255.0).with_dtype(Dtype::U8);
        assert_eq!(DynSpace::Box(obs).dtype(), Dtype::U8);
    }
}
