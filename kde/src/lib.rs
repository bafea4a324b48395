//! Dual-tree kernel density estimation.
//!
//! The density at a query point is the average kernel value over every reference point. Rather
//! than evaluate all `|Q| * |R|` pairs, both sets are organized into kd-trees and node pairs are
//! scored: when the kernel barely varies across a pair, the whole pair is credited at its midpoint
//! value and never descended into. How much variation is tolerated is controlled by a relative
//! and an absolute error tolerance, and every estimate stays within
//! `abs_error + rel_error * exact` of the exact density.
//!
//! [`kde::Kde`] is the entry point. [`traversal`] holds the generic traversers and the rules
//! traits they drive, [`rules::KdeRules`] the density-specific pruning logic.
//!
//! TODO
//! - [x] depth-first and breadth-first dual-tree traversal with tests
//! - [x] single-tree traversal
//! - [ ] ball tree as a second `SpaceTree` implementation
//! - [ ] parallel single-tree queries
//!
//!
pub mod error;
pub mod data;
pub mod metric;
pub mod kernel;
pub mod bound;
pub mod node;
pub mod tree;
pub mod traversal;
pub mod rules;
pub mod config;
pub mod kde;

pub use crate::config::{KdeConfig, KernelType, TraversalMode};
pub use crate::data::Dataset;
pub use crate::error::Error;
pub use crate::kde::{Kde, ReferenceTree};
pub use crate::kernel::{EpanechnikovKernel, GaussianKernel, Kernel, LaplacianKernel, SphericalKernel, TriangularKernel};
pub use crate::metric::{ChebyshevDistance, EuclideanDistance, ManhattanDistance, Metric};
pub use crate::tree::{KdTree, SpaceTree, TreeNode};
