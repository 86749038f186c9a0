//! Candidate solutions
//!
//! A [`Solution`] is a position in n-dimensional space paired with the
//! fitness observed there. A fitness of `+inf` means "never evaluated".

use core::fmt;

use serde::{Deserialize, Serialize};

/// A position in the search space together with its fitness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Coordinates, one per problem dimension
    pub position: Vec<f64>,
    /// Fitness at `position`; lower is better
    pub fitness: f64,
}

impl Solution {
    /// Create an unevaluated solution at the origin
    pub fn new(dimension: usize) -> Self {
        Self {
            position: vec![0.0; dimension],
            fitness: f64::INFINITY,
        }
    }

    /// Number of coordinates
    pub fn dimension(&self) -> usize {
        self.position.len()
    }

    /// Whether this solution has been scored since its last reset
    pub fn is_evaluated(&self) -> bool {
        self.fitness != f64::INFINITY
    }

    /// Forget the fitness, keeping the position
    pub fn reset_fitness(&mut self) {
        self.fitness = f64::INFINITY;
    }
}

/// Write coordinates as `(x,y,...)` in single precision
pub(crate) fn write_coords(f: &mut fmt::Formatter<'_>, coords: &[f64]) -> fmt::Result {
    f.write_str("(")?;
    for (i, x) in coords.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{}", *x as f32)?;
    }
    f.write_str(")")
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_coords(f, &self.position)
    }
}
