//! Generic tree traversals driven by a rule set.
//!
//! A traverser knows nothing about densities: it asks its rules to [`score`](DualTreeRules::score)
//! node pairs, skips pairs scored [`Score::Prune`], runs [`base_case`](Rules::base_case) over the
//! point pairs of two leaves and otherwise descends. All mutable traversal state lives on the
//! traverser itself.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::tree::TreeNode;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    /// The pair is resolved (or contributes nothing) and must not be visited.
    Prune,
    /// Visit the pair; lower values are visited first.
    Priority(f64),
}

impl Score {

    pub fn is_prune(&self) -> bool {
        matches!(self, Score::Prune)
    }

    pub fn priority(&self) -> f64 {
        match self {
            Score::Prune => f64::INFINITY,
            Score::Priority(x) => *x,
        }
    }
}

/// Exact evaluation of one query/reference point pair.
pub trait Rules {
    fn base_case(&mut self, query_index: usize, reference_index: usize) -> Result<f64, Error>;
}

pub trait DualTreeRules<N: TreeNode>: Rules {

    fn score(&mut self, query_node: &N, reference_node: &N) -> Result<Score, Error>;

    /// Called right before a previously scored pair is descended into. May turn the pair into a
    /// prune; must never turn a prune back into a visit.
    fn rescore(&mut self, query_node: &N, reference_node: &N, old_score: Score) -> Result<Score, Error>;
}

pub trait SingleTreeRules<N: TreeNode>: Rules {

    fn score_point(&mut self, query_index: usize, reference_node: &N) -> Result<Score, Error>;

    fn rescore_point(&mut self, query_index: usize, reference_node: &N, old_score: Score) -> Result<Score, Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalOrder {
    DepthFirst,
    BreadthFirst,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalStats {
    pub pairs_visited: usize,
    pub prunes: usize,
    pub scores: usize,
    pub base_cases: usize,
}

impl TraversalStats {

    pub fn merge(&mut self, other: &TraversalStats) {
        self.pairs_visited += other.pairs_visited;
        self.prunes += other.prunes;
        self.scores += other.scores;
        self.base_cases += other.base_cases;
    }
}

/// A leaf stands in for its own (single) child when paired with an internal node.
fn children_or_self<N: TreeNode>(node: &N) -> &[N] {

    match node.is_leaf() {
        true => std::slice::from_ref(node),
        false => node.children(),
    }
}

pub struct DualTreeTraverser<'r, R> {
    rules: &'r mut R,
    order: TraversalOrder,
    stats: TraversalStats,
}

impl<'r, R> DualTreeTraverser<'r, R> {

    pub fn new(rules: &'r mut R, order: TraversalOrder) -> Self {
        Self { rules, order, stats: TraversalStats::default() }
    }

    pub fn stats(&self) -> &TraversalStats {
        &self.stats
    }

    pub fn traverse<N>(&mut self, query_root: &N, reference_root: &N) -> Result<(), Error>
    where
        N: TreeNode,
        R: DualTreeRules<N>,
    {
        let score = self.score(query_root, reference_root)?;
        if score.is_prune() {
            self.stats.prunes += 1;
            return Ok(());
        }

        match self.order {
            TraversalOrder::DepthFirst => self.depth_first(query_root, reference_root),
            TraversalOrder::BreadthFirst => self.breadth_first(query_root, reference_root, score),
        }
    }

    fn score<N>(&mut self, query_node: &N, reference_node: &N) -> Result<Score, Error>
    where
        N: TreeNode,
        R: DualTreeRules<N>,
    {
        self.stats.scores += 1;
        self.rules.score(query_node, reference_node)
    }

    fn base_cases<N>(&mut self, query_node: &N, reference_node: &N) -> Result<(), Error>
    where
        N: TreeNode,
        R: DualTreeRules<N>,
    {
        for query_index in query_node.points() {
            for reference_index in reference_node.points() {
                self.rules.base_case(query_index, reference_index)?;
                self.stats.base_cases += 1;
            }
        }

        Ok(())
    }

    fn depth_first<N>(&mut self, query_node: &N, reference_node: &N) -> Result<(), Error>
    where
        N: TreeNode,
        R: DualTreeRules<N>,
    {
        self.stats.pairs_visited += 1;

        if query_node.is_leaf() && reference_node.is_leaf() {
            return self.base_cases(query_node, reference_node);
        }

        let reference_children = children_or_self(reference_node);

        for query_child in children_or_self(query_node) {

            let mut scored: Vec<(Score, &N)> = Vec::with_capacity(reference_children.len());
            for reference_child in reference_children {
                let score = self.score(query_child, reference_child)?;
                match score {
                    Score::Prune => self.stats.prunes += 1,
                    Score::Priority(_) => scored.push((score, reference_child)),
                }
            }

            scored.sort_by(|a, b| a.0.priority().total_cmp(&b.0.priority()));

            for (score, reference_child) in scored {
                let score = self.rules.rescore(query_child, reference_child, score)?;
                if score.is_prune() {
                    self.stats.prunes += 1;
                    continue;
                }

                self.depth_first(query_child, reference_child)?;
            }
        }

        Ok(())
    }

    fn breadth_first<'t, N>(&mut self, query_root: &'t N, reference_root: &'t N, root_score: Score) -> Result<(), Error>
    where
        N: TreeNode,
        R: DualTreeRules<N>,
    {
        let mut pairs_to_check: VecDeque<(&'t N, &'t N, Score)> = VecDeque::new();
        pairs_to_check.push_back((query_root, reference_root, root_score));

        while let Some((query_node, reference_node, score)) = pairs_to_check.pop_front() {

            let score = self.rules.rescore(query_node, reference_node, score)?;
            if score.is_prune() {
                self.stats.prunes += 1;
                continue;
            }

            self.stats.pairs_visited += 1;

            if query_node.is_leaf() && reference_node.is_leaf() {
                self.base_cases(query_node, reference_node)?;
                continue;
            }

            for query_child in children_or_self(query_node) {
                for reference_child in children_or_self(reference_node) {
                    let score = self.score(query_child, reference_child)?;
                    match score {
                        Score::Prune => self.stats.prunes += 1,
                        Score::Priority(_) => pairs_to_check.push_back((query_child, reference_child, score)),
                    }
                }
            }
        }

        Ok(())
    }
}

/// Walks the reference tree once per query point.
pub struct SingleTreeTraverser<'r, R> {
    rules: &'r mut R,
    stats: TraversalStats,
}

impl<'r, R> SingleTreeTraverser<'r, R> {

    pub fn new(rules: &'r mut R) -> Self {
        Self { rules, stats: TraversalStats::default() }
    }

    pub fn stats(&self) -> &TraversalStats {
        &self.stats
    }

    pub fn traverse<N>(&mut self, query_index: usize, reference_root: &N) -> Result<(), Error>
    where
        N: TreeNode,
        R: SingleTreeRules<N>,
    {
        self.stats.scores += 1;
        let score = self.rules.score_point(query_index, reference_root)?;
        if score.is_prune() {
            self.stats.prunes += 1;
            return Ok(());
        }

        self.descend(query_index, reference_root)
    }

    fn descend<N>(&mut self, query_index: usize, reference_node: &N) -> Result<(), Error>
    where
        N: TreeNode,
        R: SingleTreeRules<N>,
    {
        self.stats.pairs_visited += 1;

        if reference_node.is_leaf() {
            for reference_index in reference_node.points() {
                self.rules.base_case(query_index, reference_index)?;
                self.stats.base_cases += 1;
            }
            return Ok(());
        }

        let mut scored: Vec<(Score, &N)> = Vec::with_capacity(reference_node.children().len());
        for child in reference_node.children() {
            self.stats.scores += 1;
            let score = self.rules.score_point(query_index, child)?;
            match score {
                Score::Prune => self.stats.prunes += 1,
                Score::Priority(_) => scored.push((score, child)),
            }
        }

        scored.sort_by(|a, b| a.0.priority().total_cmp(&b.0.priority()));

        for (score, child) in scored {
            let score = self.rules.rescore_point(query_index, child, score)?;
            if score.is_prune() {
                self.stats.prunes += 1;
                continue;
            }

            self.descend(query_index, child)?;
        }

        Ok(())
    }
}
