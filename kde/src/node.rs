//! Nodes of the kd-tree.
//!
//! A node owns the contiguous range `begin..begin + count` of its tree's (reordered) dataset and a
//! rectangle around those points. Internal nodes own exactly two children, leaves own none.

use crate::bound::HRectBound;
use crate::tree::TreeNode;

#[derive(Debug, PartialEq, Clone)]
pub struct KdNode {
    pub begin: usize,
    pub count: usize,
    pub bound: HRectBound,
    pub split_axis: usize,
    pub split_value: f64,
    pub children: Vec<KdNode>,
}

impl KdNode {

    pub fn leaf(begin: usize, count: usize, bound: HRectBound) -> Self {

        return Self {
            begin,
            count,
            bound,
            split_axis: 0,
            split_value: 0.0,
            children: Vec::new(),
        };
    }

    pub fn pretty(&self) -> String {

        return format!("BEGIN: {} COUNT: {} SA: {} SV: {:.4} CHILDREN: {}",
                        self.begin,
                        self.count,
                        self.split_axis,
                        self.split_value,
                        self.children.len())
    }

    /// Number of nodes in the subtree rooted here, this one included.
    pub fn num_nodes(&self) -> usize {
        1 + self.children.iter().map(|c| c.num_nodes()).sum::<usize>()
    }

    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }
}

impl TreeNode for KdNode {
    type Bound = HRectBound;

    fn begin(&self) -> usize {
        self.begin
    }

    fn count(&self) -> usize {
        self.count
    }

    fn children(&self) -> &[KdNode] {
        &self.children
    }

    fn bound(&self) -> &HRectBound {
        &self.bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_pretty() {

        let mut bound = HRectBound::empty(2);
        bound.expand(&[0.0, 0.0]);
        bound.expand(&[1.0, 1.0]);
        let left = KdNode::leaf(0, 3, bound.clone());
        let right = KdNode::leaf(3, 4, bound.clone());
        let mut root = KdNode::leaf(0, 7, bound);
        root.split_axis = 1;
        root.split_value = 0.25;
        root.children = vec![left, right];

        assert_eq!(root.num_nodes(), 3);
        assert_eq!(root.depth(), 2);
        assert!(!root.is_leaf());
        assert_eq!(root.points(), 0..7);
        assert_eq!(root.pretty(), "BEGIN: 0 COUNT: 7 SA: 1 SV: 0.2500 CHILDREN: 2");
    }
}
