use crate::*;

/// An owned node of a general tree: a value and any number of children.
///
/// This is the convenient shape to write a tree down in; [`GeneralTree::from_root`] packs it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneralTreeNode {
    pub value: Value,
    pub children: Vec<GeneralTreeNode>,
}

impl GeneralTreeNode {
    pub fn new(value: Value) -> GeneralTreeNode {
        GeneralTreeNode {
            value,
            children: Vec::new(),
        }
    }

    pub fn with_children(value: Value, children: Vec<GeneralTreeNode>) -> GeneralTreeNode {
        GeneralTreeNode { value, children }
    }
}

/// A tree where every node can have any number of children, possibly without any nodes at all.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct GeneralTree {
    pub(crate) tree: Option<PackedTree<Value>>,
}

impl GeneralTree {
    /// A tree without nodes.
    pub fn empty() -> GeneralTree {
        GeneralTree { tree: None }
    }

    /// Build a tree with the given root value. See [`PackedTree::new`].
    pub fn new(root_val: Value, node_builder_cb: impl FnOnce(&mut NodeBuilder<Value>)) -> GeneralTree {
        GeneralTree {
            tree: Some(PackedTree::new(root_val, node_builder_cb)),
        }
    }

    pub fn from_root(root: Option<GeneralTreeNode>) -> GeneralTree {
        fn add_children(node_builder: &mut NodeBuilder<Value>, children: Vec<GeneralTreeNode>) {
            for child in children {
                node_builder.build_child(child.value, |child_builder| {
                    add_children(child_builder, child.children)
                });
            }
        }

        match root {
            Some(root) => GeneralTree::new(root.value, |node_builder| {
                add_children(node_builder, root.children)
            }),
            None => GeneralTree::empty(),
        }
    }

    #[inline]
    pub fn root(&self) -> Option<NodeRef<Value>> {
        self.tree.as_ref().map(PackedTree::root)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_none()
    }

    pub fn tot_num_nodes(&self) -> usize {
        self.tree.as_ref().map_or(0, PackedTree::tot_num_nodes)
    }

    /// The values of all nodes, in pre-order.
    pub fn iter_preorder(&self) -> impl Iterator<Item = &Value> {
        self.tree.iter().flat_map(PackedTree::iter_flattened)
    }

    /// The sum of the values of all nodes, including the root. An empty tree sums to 0.
    pub fn sum_values(&self) -> Sum {
        self.fold(0, |total, val| total + Sum::from(*val))
    }

    /// The number of nodes whose value is even.
    pub fn count_evens(&self) -> usize {
        self.count_matching(|val| val % 2 == 0)
    }

    /// The number of nodes whose value is strictly greater than `lower_bound`.
    pub fn num_greater(&self, lower_bound: Value) -> usize {
        self.count_matching(|val| val > lower_bound)
    }

    fn count_matching(&self, mut pred: impl FnMut(Value) -> bool) -> usize {
        self.fold(0, |count, val| if pred(*val) { count + 1 } else { count })
    }

    fn fold<A>(&self, init: A, mut f: impl FnMut(A, &Value) -> A) -> A {
        match self.root() {
            Some(root) => root.fold_preorder(init, &mut f),
            None => init,
        }
    }
}

impl From<GeneralTreeNode> for GeneralTree {
    fn from(root: GeneralTreeNode) -> GeneralTree {
        GeneralTree::from_root(Some(root))
    }
}
