//! Space tree capabilities and the kd-tree that implements them.
//!
//! The estimator only ever talks to [`SpaceTree`] and [`TreeNode`]: a point range per node, a
//! bounding region, child access and, for trees that rearrange their dataset, the `old_from_new`
//! permutation. [`KdTree`] is the implementation shipped with the crate.

use std::ops::Range;

use log::debug;

use crate::bound::{Bound, HRectBound};
use crate::data::Dataset;
use crate::error::Error;
use crate::node::KdNode;

pub trait TreeNode: Sized {
    type Bound: Bound;

    /// First position (in the tree's dataset) owned by this node.
    fn begin(&self) -> usize;

    fn count(&self) -> usize;

    /// Empty for leaves.
    fn children(&self) -> &[Self];

    fn bound(&self) -> &Self::Bound;

    fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    fn points(&self) -> Range<usize> {
        self.begin()..self.begin() + self.count()
    }
}

pub trait SpaceTree: Sized {
    type Node: TreeNode;

    fn build(dataset: Dataset, leaf_size: usize) -> Result<Self, Error>;

    fn root(&self) -> &Self::Node;

    /// The dataset in tree order; node ranges index into this.
    fn dataset(&self) -> &Dataset;

    /// `old_from_new[i]` is the caller's index of tree position `i`. `None` if the tree keeps the
    /// caller's order.
    fn old_from_new(&self) -> Option<&[usize]>;
}

/// Median-split kd-tree over the widest axis of each node.
#[derive(Debug, Clone)]
pub struct KdTree {
    root: KdNode,
    dataset: Dataset,
    old_from_new: Vec<usize>,
    leaf_size: usize,
}

impl KdTree {

    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    pub fn num_nodes(&self) -> usize {
        self.root.num_nodes()
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

impl SpaceTree for KdTree {
    type Node = KdNode;

    fn build(dataset: Dataset, leaf_size: usize) -> Result<Self, Error> {

        if dataset.is_empty() {
            return Err(Error::EmptyDataset("cannot build a tree over zero points".to_string()));
        }

        if leaf_size == 0 {
            return Err(Error::Configuration("leaf size must be at least 1".to_string()));
        }

        if dataset.dimension() == 0 {
            return Err(Error::Configuration("cannot build a tree over 0-dimensional points".to_string()));
        }

        let mut order: Vec<usize> = (0..dataset.len()).collect();
        let root = split(&dataset, &mut order, 0, leaf_size);

        let reordered = dataset.select(&order);

        debug!("built kd-tree over {} points: {} nodes, depth {}", reordered.len(), root.num_nodes(), root.depth());
        debug!("root: {}", root.pretty());

        return Ok(Self {
            root,
            dataset: reordered,
            old_from_new: order,
            leaf_size,
        });
    }

    fn root(&self) -> &KdNode {
        &self.root
    }

    fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    fn old_from_new(&self) -> Option<&[usize]> {
        Some(&self.old_from_new)
    }
}

/// Builds the node owning `order[..]`, which sits at tree position `begin`. Children are split at
/// the median of the widest axis; a node whose points all coincide stays a leaf.
fn split(dataset: &Dataset, order: &mut [usize], begin: usize, leaf_size: usize) -> KdNode {

    let count = order.len();

    let bound = HRectBound::from_indices(dataset, order);

    if count <= leaf_size {
        return KdNode::leaf(begin, count, bound);
    }

    let split_axis = bound.widest_axis();
    if bound.width(split_axis) == 0.0 {
        return KdNode::leaf(begin, count, bound);
    }

    order.sort_by(|a, b| dataset.point(*a)[split_axis].total_cmp(&dataset.point(*b)[split_axis]));

    let median = count / 2;
    let split_value = dataset.point(order[median])[split_axis];

    let (left_order, right_order) = order.split_at_mut(median);

    let left = split(dataset, left_order, begin, leaf_size);
    let right = split(dataset, right_order, begin + median, leaf_size);

    return KdNode {
        begin,
        count,
        bound,
        split_axis,
        split_value,
        children: vec![left, right],
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn check_node(tree: &KdTree, node: &KdNode) {

        for i in node.points() {
            assert!(node.bound.contains(tree.dataset().point(i)));
        }

        match node.is_leaf() {
            true => assert!(node.count <= tree.leaf_size() || node.bound.width(node.bound.widest_axis()) == 0.0),
            false => {
                assert_eq!(node.children.len(), 2);
                assert_eq!(node.children[0].begin, node.begin);
                assert_eq!(node.children[0].count + node.children[1].count, node.count);
                assert_eq!(node.children[1].begin, node.begin + node.children[0].count);
                for child in node.children.iter() {
                    check_node(tree, child);
                }
            }
        }
    }

    #[test]
    fn random_tree_is_consistent() {

        let mut rng = StdRng::seed_from_u64(11);
        let ds = Dataset::random_with_rng(3, 500, &mut rng).unwrap();

        let tree = KdTree::build(ds.clone(), 10).unwrap();

        assert_eq!(tree.root().count, 500);
        assert!(tree.depth() > 1);
        check_node(&tree, tree.root());

        let old_from_new = tree.old_from_new().unwrap();
        let mut seen = vec![false; ds.len()];
        for (new, &old) in old_from_new.iter().enumerate() {
            assert!(!seen[old]);
            seen[old] = true;
            assert_eq!(tree.dataset().point(new), ds.point(old));
        }
    }

    #[test]
    fn large_leaf_gives_single_node() {

        let ds = Dataset::random(2, 40).unwrap();
        let tree = KdTree::build(ds, 40).unwrap();

        assert!(tree.root().is_leaf());
        assert_eq!(tree.num_nodes(), 1);
    }

    #[test]
    fn duplicate_points_terminate() {

        let points = vec![vec![0.5, 0.5]; 64];
        let ds = Dataset::from_points(&points).unwrap();
        let tree = KdTree::build(ds, 4).unwrap();

        assert!(tree.root().is_leaf());
        assert_eq!(tree.root().count, 64);
    }

    #[test]
    fn bad_inputs() {

        let empty = Dataset::new(Vec::new(), 3).unwrap();
        assert!(matches!(KdTree::build(empty, 10), Err(Error::EmptyDataset(_))));
        assert!(matches!(KdTree::build(Dataset::random(2, 5).unwrap(), 0), Err(Error::Configuration(_))));
        assert!(matches!(Dataset::random(0, 50), Err(Error::Configuration(_))));
    }
}
