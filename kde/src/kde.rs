//! The estimator facade.
//!
//! [`Kde`] holds the kernel, metric, tolerances and traversal mode, owns or borrows a reference
//! tree, and turns [`Kde::evaluate`] calls into a traversal over [`KdeRules`]. Densities come back
//! normalized by the reference-set size and in the caller's query order.

use std::time::Instant;

use log::{debug, info, warn};

use crate::config::{KdeConfig, TraversalMode, DEFAULT_LEAF_SIZE};
use crate::data::Dataset;
use crate::error::Error;
use crate::kernel::{check_bandwidth, Kernel};
use crate::metric::{EuclideanDistance, Metric};
use crate::rules::KdeRules;
use crate::traversal::{DualTreeTraverser, Rules, SingleTreeTraverser, TraversalStats};
use crate::tree::{KdTree, SpaceTree};

/// Who is responsible for the reference tree.
///
/// Cloning an `Owned` tree deep-copies it; cloning a `Borrowed` one copies the reference. Since
/// the variant is only known at run time, `Clone` is available only for `T: Clone`, whichever
/// variant is held. Trees that cannot be cloned still train, borrow and evaluate normally.
#[derive(Debug, Clone)]
pub enum ReferenceTree<'a, T> {
    Owned(T),
    Borrowed(&'a T),
}

impl<'a, T> ReferenceTree<'a, T> {

    pub fn get(&self) -> &T {
        match self {
            ReferenceTree::Owned(tree) => tree,
            ReferenceTree::Borrowed(tree) => *tree,
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, ReferenceTree::Owned(_))
    }
}

pub fn check_relative_error(value: f64) -> Result<(), Error> {

    match (0.0..=1.0).contains(&value) {
        true => Ok(()),
        false => Err(Error::Configuration(format!(
            "relative error tolerance must be a value between 0 and 1, got {}",
            value
        ))),
    }
}

pub fn check_absolute_error(value: f64) -> Result<(), Error> {

    match value >= 0.0 {
        true => Ok(()),
        false => Err(Error::Configuration(format!(
            "absolute error tolerance must be a value greater or equal to 0, got {}",
            value
        ))),
    }
}

fn warn_if_summed(rel_error: f64, abs_error: f64) {

    if rel_error > 0.0 && abs_error > 0.0 {
        warn!("absolute ({}) and relative ({}) error tolerances will be summed up", abs_error, rel_error);
    }
}

/// Writes `values[i]` to position `old_from_new[i]`.
fn unpermute(values: Vec<f64>, old_from_new: &[usize]) -> Vec<f64> {

    let mut result = vec![0.0; values.len()];
    for (new, value) in values.into_iter().enumerate() {
        result[old_from_new[new]] = value;
    }

    return result;
}

fn check_permutation(old_from_new: &[usize], len: usize) -> Result<(), Error> {

    if old_from_new.len() != len {
        return Err(Error::Precondition(format!(
            "query permutation has {} entries but the query tree holds {} points",
            old_from_new.len(),
            len
        )));
    }

    let mut seen = vec![false; len];
    for &old in old_from_new {
        if old >= len || seen[old] {
            return Err(Error::Precondition(format!("query permutation is not a permutation of 0..{}", len)));
        }
        seen[old] = true;
    }

    Ok(())
}

/// Kernel density estimator over a reference tree of type `T`.
///
/// `Clone` needs `K`, `M` and `T` to be `Clone`; see [`ReferenceTree`].
#[derive(Debug, Clone)]
pub struct Kde<'a, K, M = EuclideanDistance, T = KdTree> {
    kernel: K,
    metric: M,
    rel_error: f64,
    abs_error: f64,
    mode: TraversalMode,
    leaf_size: usize,
    reference_tree: Option<ReferenceTree<'a, T>>,
    stats: TraversalStats,
}

impl<'a, K, M, T> Kde<'a, K, M, T>
where
    K: Kernel,
    M: Metric + Default,
    T: SpaceTree,
{
    /// Both tolerances may be nonzero; their effects are added, not maxed.
    pub fn new(bandwidth: f64, rel_error: f64, abs_error: f64, mode: TraversalMode) -> Result<Self, Error> {

        check_bandwidth(bandwidth)?;
        check_relative_error(rel_error)?;
        check_absolute_error(abs_error)?;
        warn_if_summed(rel_error, abs_error);

        return Ok(Self {
            kernel: K::with_bandwidth(bandwidth),
            metric: M::default(),
            rel_error,
            abs_error,
            mode,
            leaf_size: DEFAULT_LEAF_SIZE,
            reference_tree: None,
            stats: TraversalStats::default(),
        });
    }

    /// The kernel type itself is fixed by `K`; `config.kernel` is not consulted.
    pub fn from_config(config: &KdeConfig) -> Result<Self, Error> {

        let mut kde = Self::new(config.bandwidth, config.rel_error, config.abs_error, config.mode)?;
        kde.set_leaf_size(config.leaf_size)?;

        return Ok(kde);
    }

    pub fn with_metric(mut self, metric: M) -> Self {
        self.metric = metric;
        self
    }
}

impl<'a, K, M, T> Kde<'a, K, M, T>
where
    K: Kernel,
    M: Metric,
    T: SpaceTree,
{
    /// Builds a tree over a copy of `reference_set` and takes ownership of it.
    pub fn train(&mut self, reference_set: &Dataset) -> Result<(), Error> {

        if reference_set.is_empty() {
            return Err(Error::EmptyDataset("reference set has no points".to_string()));
        }

        let start = Instant::now();
        let tree = T::build(reference_set.clone(), self.leaf_size)?;
        debug!("built reference tree over {} points in {:?}", reference_set.len(), start.elapsed());

        self.reference_tree = Some(ReferenceTree::Owned(tree));
        Ok(())
    }

    /// Uses a tree owned by the caller. Any tree owned so far is dropped.
    pub fn train_with_tree(&mut self, reference_tree: &'a T) -> Result<(), Error> {

        if reference_tree.dataset().is_empty() {
            return Err(Error::Precondition("reference tree holds no points".to_string()));
        }

        self.reference_tree = Some(ReferenceTree::Borrowed(reference_tree));
        Ok(())
    }

    /// Densities at every column of `query_set`, in the same order.
    ///
    /// Dual-tree modes build a query tree for the duration of the call; single-tree and naive modes
    /// work on `query_set` directly.
    pub fn evaluate(&mut self, query_set: &Dataset) -> Result<Vec<f64>, Error> {

        if query_set.is_empty() {
            return Err(Error::EmptyDataset("query set has no points".to_string()));
        }

        match self.mode.dual_tree_order() {
            Some(_) => {
                self.check_query_dimension(query_set.dimension())?;

                let query_tree = T::build(query_set.clone(), self.leaf_size)?;
                let densities = self.estimate(query_tree.dataset(), Some(query_tree.root()))?;

                match query_tree.old_from_new() {
                    Some(old_from_new) => Ok(unpermute(densities, old_from_new)),
                    None => Ok(densities),
                }
            },
            None => self.estimate(query_set, None),
        }
    }

    /// Densities for a query tree built by the caller. `old_from_new` maps the tree's point order
    /// back to the order the results should be returned in.
    pub fn evaluate_with_tree(&mut self, query_tree: &T, old_from_new: &[usize]) -> Result<Vec<f64>, Error> {

        check_permutation(old_from_new, query_tree.dataset().len())?;

        let densities = self.estimate(query_tree.dataset(), Some(query_tree.root()))?;
        Ok(unpermute(densities, old_from_new))
    }

    fn check_query_dimension(&self, dimension: usize) -> Result<(), Error> {

        let reference_tree = match &self.reference_tree {
            None => return Err(Error::Precondition("cannot evaluate before training".to_string())),
            Some(x) => x.get(),
        };

        let expected = reference_tree.dataset().dimension();
        match expected == dimension {
            true => Ok(()),
            false => Err(Error::DimensionMismatch { expected, found: dimension }),
        }
    }

    /// Normalized densities indexed like `query_set`.
    fn estimate(&mut self, query_set: &Dataset, query_root: Option<&T::Node>) -> Result<Vec<f64>, Error> {

        self.check_query_dimension(query_set.dimension())?;

        let reference_tree = match &self.reference_tree {
            None => return Err(Error::Precondition("cannot evaluate before training".to_string())),
            Some(x) => x.get(),
        };
        let reference_set = reference_tree.dataset();

        let start = Instant::now();
        let mut densities = vec![0.0; query_set.len()];

        let mut rules = KdeRules::new(reference_set,
                                      query_set,
                                      &mut densities,
                                      self.rel_error,
                                      self.abs_error,
                                      &self.metric,
                                      &self.kernel);

        let mut stats = match (self.mode, query_root) {
            (TraversalMode::DepthFirst | TraversalMode::BreadthFirst, Some(query_root)) => {
                let order = match self.mode.dual_tree_order() {
                    Some(x) => x,
                    None => return Err(Error::Precondition("traversal mode has no dual-tree order".to_string())),
                };
                let mut traverser = DualTreeTraverser::new(&mut rules, order);
                traverser.traverse(query_root, reference_tree.root())?;
                *traverser.stats()
            },
            (TraversalMode::DepthFirst | TraversalMode::BreadthFirst, None) => {
                return Err(Error::Precondition("dual-tree traversal needs a query tree".to_string()));
            },
            (TraversalMode::SingleTree, _) => {
                let mut stats = TraversalStats::default();
                for query_index in 0..query_set.len() {
                    let mut traverser = SingleTreeTraverser::new(&mut rules);
                    traverser.traverse(query_index, reference_tree.root())?;
                    stats.merge(traverser.stats());
                }
                stats
            },
            (TraversalMode::Naive, _) => {
                for query_index in 0..query_set.len() {
                    for reference_index in 0..reference_set.len() {
                        rules.base_case(query_index, reference_index)?;
                    }
                }
                TraversalStats::default()
            },
        };

        stats.base_cases = rules.base_cases();
        stats.scores = rules.scores();

        let reference_len = reference_set.len() as f64;
        for density in densities.iter_mut() {
            *density /= reference_len;
        }

        info!("evaluated {} queries against {} references ({:?}): {} base cases, {} scores, {} prunes in {:?}",
              query_set.len(),
              reference_set.len(),
              self.mode,
              stats.base_cases,
              stats.scores,
              stats.prunes,
              start.elapsed());

        self.stats = stats;

        return Ok(densities);
    }

    pub fn set_relative_error(&mut self, rel_error: f64) -> Result<(), Error> {

        check_relative_error(rel_error)?;
        warn_if_summed(rel_error, self.abs_error);

        self.rel_error = rel_error;
        Ok(())
    }

    pub fn set_absolute_error(&mut self, abs_error: f64) -> Result<(), Error> {

        check_absolute_error(abs_error)?;
        warn_if_summed(self.rel_error, abs_error);

        self.abs_error = abs_error;
        Ok(())
    }

    /// Takes effect for trees built after the call.
    pub fn set_leaf_size(&mut self, leaf_size: usize) -> Result<(), Error> {

        if leaf_size == 0 {
            return Err(Error::Configuration("leaf size must be at least 1".to_string()));
        }

        self.leaf_size = leaf_size;
        Ok(())
    }

    pub fn set_mode(&mut self, mode: TraversalMode) {
        self.mode = mode;
    }

    pub fn relative_error(&self) -> f64 {
        self.rel_error
    }

    pub fn absolute_error(&self) -> f64 {
        self.abs_error
    }

    pub fn mode(&self) -> TraversalMode {
        self.mode
    }

    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    pub fn is_trained(&self) -> bool {
        self.reference_tree.is_some()
    }

    pub fn owns_reference_tree(&self) -> bool {
        match &self.reference_tree {
            Some(x) => x.is_owned(),
            None => false,
        }
    }

    pub fn reference_tree(&self) -> Option<&T> {
        self.reference_tree.as_ref().map(|x| x.get())
    }

    /// Counters of the last successful evaluation.
    pub fn stats(&self) -> &TraversalStats {
        &self.stats
    }

    pub fn base_cases(&self) -> usize {
        self.stats.base_cases
    }

    pub fn scores(&self) -> usize {
        self.stats.scores
    }
}
