//! Pruning rules for kernel density estimation.
//!
//! For a query/reference pair `(Q, R)` the rules bound the kernel value of every point pair the two
//! nodes represent: `min_k = K(max_distance)` and `max_k = K(min_distance)`. Crediting every query
//! point in `Q` with `|R| * (min_k + max_k) / 2` is off by at most `|R| * (max_k - min_k) / 2` per
//! query point, so the pair is pruned when
//!
//! ```text
//! (max_k - min_k) * |R| <= |R| * (abs_error + rel_error * min_k)
//! ```
//!
//! The right-hand side is the share of the error budget owned by `R`: each reference point brings
//! `abs_error + rel_error * K(q, r)` at most, so summed over the whole reference set the allowance
//! never exceeds `N * abs_error + rel_error * exact_sum`, which after normalization by `N` is
//! `abs_error + rel_error * exact`. Both tolerances apply at once and add up.

use crate::bound::Bound;
use crate::data::Dataset;
use crate::error::Error;
use crate::kernel::Kernel;
use crate::metric::Metric;
use crate::traversal::{DualTreeRules, Rules, Score, SingleTreeRules};
use crate::tree::TreeNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryKey {
    Point(usize),
    Node { begin: usize, count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PairBounds {
    min_distance: f64,
    min_kernel: f64,
    max_kernel: f64,
}

/// Memo of the last pair whose bounds were computed.
#[derive(Debug, Default, Clone)]
pub struct TraversalInfo {
    last: Option<(QueryKey, (usize, usize), PairBounds)>,
    hits: usize,
}

impl TraversalInfo {

    fn lookup(&mut self, query: QueryKey, reference: (usize, usize)) -> Option<PairBounds> {

        match self.last {
            Some((q, r, bounds)) if q == query && r == reference => {
                self.hits += 1;
                Some(bounds)
            },
            _ => None,
        }
    }

    fn store(&mut self, query: QueryKey, reference: (usize, usize), bounds: PairBounds) {
        self.last = Some((query, reference, bounds));
    }

    /// Number of bound computations answered from the memo.
    pub fn hits(&self) -> usize {
        self.hits
    }
}

pub struct KdeRules<'a, K, M> {
    reference_set: &'a Dataset,
    query_set: &'a Dataset,
    /// Unnormalized sums, indexed like `query_set`.
    densities: &'a mut [f64],
    abs_error: f64,
    rel_error: f64,
    metric: &'a M,
    kernel: &'a K,
    /// Worst-case absolute error credited so far to each query point, same units as `densities`.
    error_bounds: Vec<f64>,
    traversal_info: TraversalInfo,
    base_cases: usize,
    scores: usize,
}

impl<'a, K: Kernel, M: Metric> KdeRules<'a, K, M> {

    pub fn new(reference_set: &'a Dataset,
               query_set: &'a Dataset,
               densities: &'a mut [f64],
               rel_error: f64,
               abs_error: f64,
               metric: &'a M,
               kernel: &'a K) -> Self {

        let error_bounds = vec![0.0; query_set.len()];

        return Self {
            reference_set,
            query_set,
            densities,
            abs_error,
            rel_error,
            metric,
            kernel,
            error_bounds,
            traversal_info: TraversalInfo::default(),
            base_cases: 0,
            scores: 0,
        };
    }

    pub fn base_cases(&self) -> usize {
        self.base_cases
    }

    pub fn scores(&self) -> usize {
        self.scores
    }

    pub fn traversal_info(&self) -> &TraversalInfo {
        &self.traversal_info
    }

    pub fn error_bound(&self, query_index: usize) -> f64 {
        self.error_bounds[query_index]
    }

    fn kernel_bounds(&self, min_distance: f64, max_distance: f64) -> Result<PairBounds, Error> {

        let (min_kernel, max_kernel) = self.kernel.bounds(min_distance, max_distance);

        if min_kernel > max_kernel {
            return Err(Error::GeometricInconsistency { min_weight: min_kernel, max_weight: max_kernel });
        }

        Ok(PairBounds { min_distance, min_kernel, max_kernel })
    }

    fn node_bounds<N: TreeNode>(&mut self, query_node: &N, reference_node: &N) -> Result<PairBounds, Error> {

        let query = QueryKey::Node { begin: query_node.begin(), count: query_node.count() };
        let reference = (reference_node.begin(), reference_node.count());

        if let Some(bounds) = self.traversal_info.lookup(query, reference) {
            return Ok(bounds);
        }

        let min_distance = query_node.bound().min_distance(reference_node.bound(), self.metric);
        let max_distance = query_node.bound().max_distance(reference_node.bound(), self.metric);
        let bounds = self.kernel_bounds(min_distance, max_distance)?;

        self.traversal_info.store(query, reference, bounds);
        Ok(bounds)
    }

    fn point_bounds<N: TreeNode>(&mut self, query_index: usize, reference_node: &N) -> Result<PairBounds, Error> {

        let query = QueryKey::Point(query_index);
        let reference = (reference_node.begin(), reference_node.count());

        if let Some(bounds) = self.traversal_info.lookup(query, reference) {
            return Ok(bounds);
        }

        let point = self.query_set.point(query_index);
        let min_distance = reference_node.bound().min_distance_to_point(point, self.metric);
        let max_distance = reference_node.bound().max_distance_to_point(point, self.metric);
        let bounds = self.kernel_bounds(min_distance, max_distance)?;

        self.traversal_info.store(query, reference, bounds);
        Ok(bounds)
    }

    fn prunable(&self, bounds: &PairBounds, reference_count: usize) -> bool {

        let count = reference_count as f64;
        let error = (bounds.max_kernel - bounds.min_kernel) * count;
        let allowance = count * (self.abs_error + self.rel_error * bounds.min_kernel);

        error <= allowance
    }

    fn credit(&mut self, query_index: usize, bounds: &PairBounds, reference_count: usize) {

        let count = reference_count as f64;
        self.densities[query_index] += count * (bounds.min_kernel + bounds.max_kernel) / 2.0;
        self.error_bounds[query_index] += count * (bounds.max_kernel - bounds.min_kernel) / 2.0;
    }

    fn try_prune_nodes<N: TreeNode>(&mut self, query_node: &N, reference_node: &N, bounds: &PairBounds) -> bool {

        if !self.prunable(bounds, reference_node.count()) {
            return false;
        }

        for query_index in query_node.points() {
            self.credit(query_index, bounds, reference_node.count());
        }

        true
    }
}

impl<'a, K: Kernel, M: Metric> Rules for KdeRules<'a, K, M> {

    fn base_case(&mut self, query_index: usize, reference_index: usize) -> Result<f64, Error> {

        let distance = self.metric.distance(self.query_set.point(query_index),
                                            self.reference_set.point(reference_index));

        self.densities[query_index] += self.kernel.evaluate(distance);
        self.base_cases += 1;

        Ok(distance)
    }
}

impl<'a, K: Kernel, M: Metric, N: TreeNode> DualTreeRules<N> for KdeRules<'a, K, M> {

    fn score(&mut self, query_node: &N, reference_node: &N) -> Result<Score, Error> {

        self.scores += 1;
        let bounds = self.node_bounds(query_node, reference_node)?;

        match self.try_prune_nodes(query_node, reference_node, &bounds) {
            true => Ok(Score::Prune),
            false => Ok(Score::Priority(bounds.min_distance)),
        }
    }

    fn rescore(&mut self, query_node: &N, reference_node: &N, old_score: Score) -> Result<Score, Error> {

        if old_score.is_prune() {
            return Ok(old_score);
        }

        let bounds = self.node_bounds(query_node, reference_node)?;

        match self.try_prune_nodes(query_node, reference_node, &bounds) {
            true => Ok(Score::Prune),
            false => Ok(old_score),
        }
    }
}

impl<'a, K: Kernel, M: Metric, N: TreeNode> SingleTreeRules<N> for KdeRules<'a, K, M> {

    fn score_point(&mut self, query_index: usize, reference_node: &N) -> Result<Score, Error> {

        self.scores += 1;
        let bounds = self.point_bounds(query_index, reference_node)?;

        match self.prunable(&bounds, reference_node.count()) {
            true => {
                self.credit(query_index, &bounds, reference_node.count());
                Ok(Score::Prune)
            },
            false => Ok(Score::Priority(bounds.min_distance)),
        }
    }

    fn rescore_point(&mut self, query_index: usize, reference_node: &N, old_score: Score) -> Result<Score, Error> {

        if old_score.is_prune() {
            return Ok(old_score);
        }

        let bounds = self.point_bounds(query_index, reference_node)?;

        match self.prunable(&bounds, reference_node.count()) {
            true => {
                self.credit(query_index, &bounds, reference_node.count());
                Ok(Score::Prune)
            },
            false => Ok(old_score),
        }
    }
}
