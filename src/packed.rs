//! Packed storage for trees where a node may have any number of children.
//!
//! All nodes of a [`PackedTree`] live in a single `Vec`, in pre-order. Every node stores the offset
//! to its next sibling, so the descendants of a node are exactly the nodes between it and its next
//! sibling. A reference to a node is therefore just a slice: the node itself followed by all its
//! descendants.
use std::iter::Iterator;
use std::num::NonZeroUsize;

/// The data stored per node: a value, and the offset to the next sibling (if any).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NodeData<T> {
    val: T,
    next_sibling_offset: Option<NonZeroUsize>, // Difference between the index of the next sibling and the index of the current node. None if there is no next sibling.
}

impl<T> NodeData<T> {
    #[inline(always)]
    pub fn val(&self) -> &T {
        &self.val
    }

    #[inline(always)]
    pub fn next_sibling_offset(&self) -> Option<NonZeroUsize> {
        self.next_sibling_offset
    }
}

/// A tree that is built in one go and whose structure can't change afterwards.
///
/// Always has a root node; an absent tree is modelled as `Option<PackedTree<T>>` by its owner.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PackedTree<T> {
    data: Vec<NodeData<T>>,
}

impl<T> PackedTree<T> {
    /// Build a tree with the given root value.
    ///
    /// The callback is called exactly once with a [`NodeBuilder`] for the root node, which can be
    /// used to add its children.
    #[inline]
    pub fn new(root_val: T, node_builder_cb: impl FnOnce(&mut NodeBuilder<T>)) -> PackedTree<T> {
        let mut data = Vec::new();
        node_builder_cb(&mut NodeBuilder::new_root(&mut data, root_val));
        PackedTree { data }
    }

    /// Like [`new`](`PackedTree::new`), but the callback may fail, in which case the partially built
    /// tree is thrown away and the error is returned.
    pub fn try_new<E>(
        root_val: T,
        node_builder_cb: impl FnOnce(&mut NodeBuilder<T>) -> Result<(), E>,
    ) -> Result<PackedTree<T>, E> {
        let mut data = Vec::new();
        node_builder_cb(&mut NodeBuilder::new_root(&mut data, root_val))?;
        Ok(PackedTree { data })
    }

    #[inline(always)]
    pub fn root(&self) -> NodeRef<T> {
        NodeRef { slice: &self.data }
    }

    /// Iterates over the values of all nodes, in pre-order.
    pub fn iter_flattened(&self) -> impl Iterator<Item = &T> {
        self.data.iter().map(|node_data| &node_data.val)
    }

    /// Read-only view of the raw data.
    #[inline(always)]
    pub fn raw_data(&self) -> &[NodeData<T>] {
        &self.data
    }

    #[inline(always)]
    pub fn tot_num_nodes(&self) -> usize {
        self.data.len()
    }
}

/// Adds children to a node while its tree is being built.
pub struct NodeBuilder<'a, T> {
    data: &'a mut Vec<NodeData<T>>,
    last_added_child_index: Option<usize>, // to update next_sibling_offset
}

impl<'a, T> NodeBuilder<'a, T> {
    fn new_root(data: &'a mut Vec<NodeData<T>>, root_val: T) -> NodeBuilder<'a, T> {
        debug_assert!(data.is_empty());
        data.push(NodeData {
            val: root_val,
            next_sibling_offset: None,
        });
        NodeBuilder {
            data,
            last_added_child_index: None,
        }
    }

    /// Add a child with the given value, then call `child_builder_cb` to add that child's own children.
    /// The value returned by the callback becomes the return value of this function.
    #[inline]
    pub fn build_child<R>(
        &mut self,
        val: T,
        child_builder_cb: impl FnOnce(&mut NodeBuilder<T>) -> R,
    ) -> R {
        child_builder_cb(&mut self.child_builder(val))
    }

    /// Add a child without children of its own.
    #[inline]
    pub fn add_child(&mut self, val: T) {
        self.child_builder(val);
    }

    fn child_builder(&mut self, val: T) -> NodeBuilder<T> {
        let child_node_index = self.data.len();
        self.data.push(NodeData {
            val,
            next_sibling_offset: None,
        });

        // the previous child (if any) now knows where its subtree ends
        if let Some(last_added_child_index) = self.last_added_child_index {
            debug_assert!(last_added_child_index < child_node_index);
            self.data[last_added_child_index].next_sibling_offset =
                NonZeroUsize::new(child_node_index - last_added_child_index);
        }
        self.last_added_child_index = Some(child_node_index);

        NodeBuilder {
            data: &mut *self.data,
            last_added_child_index: None,
        }
    }
}

/// Iterates over a list of sibling nodes.
#[derive(Copy)]
pub struct NodeIter<'t, T> {
    remaining_nodes: &'t [NodeData<T>], // contains (only) the nodes in the iterator and all their descendants
}

impl<'t, T> Clone for NodeIter<'t, T> {
    fn clone(&self) -> Self {
        Self {
            remaining_nodes: self.remaining_nodes,
        }
    }
}

impl<'t, T> Iterator for NodeIter<'t, T> {
    type Item = NodeRef<'t, T>;
    fn next(&mut self) -> Option<Self::Item> {
        let cur_node = self.remaining_nodes.first()?;
        // the last sibling owns everything that is left
        let subtree_len = cur_node
            .next_sibling_offset
            .map_or(self.remaining_nodes.len(), NonZeroUsize::get);
        let (cur_node_slice, next_nodes_slice) = self.remaining_nodes.split_at(subtree_len);
        self.remaining_nodes = next_nodes_slice;
        Some(NodeRef {
            slice: cur_node_slice,
        })
    }
}

/// A shared reference to a node and, through it, to all of its descendants.
#[derive(Clone, Copy)]
pub struct NodeRef<'t, T> {
    slice: &'t [NodeData<T>], // contains (only) the current node and all its descendants
}

impl<'t, T> NodeRef<'t, T> {
    #[inline(always)]
    pub fn val(&self) -> &'t T {
        &self.slice[0].val
    }

    #[inline(always)]
    pub fn children(&self) -> NodeIter<'t, T> {
        NodeIter {
            remaining_nodes: &self.slice[1..],
        }
    }

    #[inline(always)]
    pub fn is_leaf(&self) -> bool {
        self.slice.len() == 1
    }

    #[inline(always)]
    pub fn num_descendants_incl_self(&self) -> usize {
        self.slice.len()
    }

    #[inline(always)]
    pub fn num_descendants_excl_self(&self) -> usize {
        self.slice.len() - 1
    }

    /// Depth-first, pre-order fold over this node and all its descendants.
    ///
    /// The accumulator is handed to `f` for each node and the returned value is passed on to the next
    /// node, so nothing outside the traversal is mutated.
    pub fn fold_preorder<A>(&self, init: A, f: &mut impl FnMut(A, &'t T) -> A) -> A {
        let acc = f(init, self.val());
        self.children()
            .fold(acc, |acc, child| child.fold_preorder(acc, &mut *f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_tree() -> PackedTree<i32> {
        PackedTree::new(2, |node| {
            node.build_child(10, |node| {
                node.add_child(11);
                node.add_child(12);
                node.add_child(13);
            });
            node.add_child(20);
            node.build_child(30, |node| {
                node.add_child(31);
                node.build_child(32, |node| {
                    node.add_child(321);
                });
                node.add_child(33);
            });
        })
    }

    fn child_vals(node: NodeRef<i32>) -> Vec<i32> {
        node.children().map(|child| *child.val()).collect()
    }

    #[test]
    fn test_layout_is_preorder() {
        let tree = build_tree();
        let vals: Vec<i32> = tree.iter_flattened().cloned().collect();
        assert_eq!(vals, vec![2, 10, 11, 12, 13, 20, 30, 31, 32, 321, 33]);
        assert_eq!(tree.tot_num_nodes(), 11);
    }

    #[test]
    fn test_children() {
        let tree = build_tree();
        let root = tree.root();
        assert_eq!(*root.val(), 2);
        assert_eq!(child_vals(root), vec![10, 20, 30]);

        let mut children = root.children();
        let ten = children.next().unwrap();
        assert_eq!(child_vals(ten), vec![11, 12, 13]);
        assert_eq!(ten.num_descendants_incl_self(), 4);

        let twenty = children.next().unwrap();
        assert!(twenty.is_leaf());
        assert!(twenty.children().next().is_none());

        let thirty = children.next().unwrap();
        assert_eq!(child_vals(thirty), vec![31, 32, 33]);
        assert_eq!(thirty.num_descendants_excl_self(), 4);
        let thirty_two = thirty.children().nth(1).unwrap();
        assert_eq!(child_vals(thirty_two), vec![321]);

        assert!(children.next().is_none());
    }

    #[test]
    fn test_single_node() {
        let tree = PackedTree::new("root", |_| {});
        assert!(tree.root().is_leaf());
        assert_eq!(tree.tot_num_nodes(), 1);
        assert!(tree.raw_data()[0].next_sibling_offset().is_none());
    }

    #[test]
    fn test_sibling_offsets() {
        let tree = build_tree();
        let offsets: Vec<usize> = tree
            .raw_data()
            .iter()
            .map(|node| node.next_sibling_offset().map_or(0, NonZeroUsize::get))
            .collect();
        assert_eq!(offsets, vec![0, 4, 1, 1, 0, 1, 0, 1, 2, 0, 0]);
    }

    #[test]
    fn test_fold_preorder_visits_in_order() {
        let tree = build_tree();
        let visited = tree.root().fold_preorder(Vec::new(), &mut |mut acc, val| {
            acc.push(*val);
            acc
        });
        let flattened: Vec<i32> = tree.iter_flattened().cloned().collect();
        assert_eq!(visited, flattened);
    }

    #[test]
    fn test_try_new_propagates_error() {
        let result: Result<PackedTree<i32>, &str> = PackedTree::try_new(1, |node| {
            node.add_child(2);
            Err("nope")
        });
        assert_eq!(result.err(), Some("nope"));
    }
}
