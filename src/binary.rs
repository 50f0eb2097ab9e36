use crate::codec::{tokenize, ParseTreeError, Token, TokenReader, TOKEN_SEPARATOR};
use crate::{Sum, Value};

use std::str::FromStr;

use tracing::{debug, trace};

/// Identifies a node of a [`BinaryTree`].
///
/// Ids are only meaningful for the tree that handed them out. Queries that take ids compare them
/// against the nodes they walk over, so an id from another tree simply matches nothing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct BinaryNodeData {
    val: Value,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

/// An owned node of a binary tree: a value and at most two children.
///
/// This is the convenient shape to write a tree down in; [`BinaryTree::from_root`] turns it into an
/// arena.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinaryTreeNode {
    pub value: Value,
    pub left: Option<Box<BinaryTreeNode>>,
    pub right: Option<Box<BinaryTreeNode>>,
}

impl BinaryTreeNode {
    pub fn new(value: Value) -> BinaryTreeNode {
        BinaryTreeNode {
            value,
            left: None,
            right: None,
        }
    }

    pub fn with_left(mut self, left: BinaryTreeNode) -> BinaryTreeNode {
        self.left = Some(Box::new(left));
        self
    }

    pub fn with_right(mut self, right: BinaryTreeNode) -> BinaryTreeNode {
        self.right = Some(Box::new(right));
        self
    }
}

/// A binary tree, possibly without any nodes.
///
/// Every node lives in a single arena and is addressed by a [`NodeId`]. Node identity, not value,
/// is what [`are_cousins`](`BinaryTree::are_cousins`) and
/// [`lowest_common_ancestor`](`BinaryTree::lowest_common_ancestor`) work with.
#[derive(Clone, Default)]
pub struct BinaryTree {
    nodes: Vec<BinaryNodeData>,
    root: Option<NodeId>,
}

/// Where the parent of a node was found, see [`BinaryTree::are_cousins`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct ParentInfo {
    parent: NodeId,
    depth: usize,
}

#[derive(Copy, Clone)]
enum Side {
    Left,
    Right,
}

/// Adds children to a node while its [`BinaryTree`] is being built.
pub struct BinaryNodeBuilder<'a> {
    nodes: &'a mut Vec<BinaryNodeData>,
    id: NodeId,
}

impl<'a> BinaryNodeBuilder<'a> {
    #[inline(always)]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Give the node a left child without children of its own. Returns the id of the new child.
    ///
    /// If the node already had a left child, that subtree is no longer reachable from the root.
    pub fn add_left(&mut self, val: Value) -> NodeId {
        self.child_builder(val, Side::Left).id
    }

    /// Give the node a right child without children of its own. Returns the id of the new child.
    pub fn add_right(&mut self, val: Value) -> NodeId {
        self.child_builder(val, Side::Right).id
    }

    /// Give the node a left child, then call `child_builder_cb` to add that child's own children.
    /// The value returned by the callback becomes the return value of this function.
    pub fn build_left<R>(
        &mut self,
        val: Value,
        child_builder_cb: impl FnOnce(&mut BinaryNodeBuilder) -> R,
    ) -> R {
        child_builder_cb(&mut self.child_builder(val, Side::Left))
    }

    pub fn build_right<R>(
        &mut self,
        val: Value,
        child_builder_cb: impl FnOnce(&mut BinaryNodeBuilder) -> R,
    ) -> R {
        child_builder_cb(&mut self.child_builder(val, Side::Right))
    }

    fn child_builder(&mut self, val: Value, side: Side) -> BinaryNodeBuilder {
        let child_id = NodeId(self.nodes.len());
        self.nodes.push(BinaryNodeData {
            val,
            left: None,
            right: None,
        });
        let parent = &mut self.nodes[self.id.0];
        match side {
            Side::Left => parent.left = Some(child_id),
            Side::Right => parent.right = Some(child_id),
        }
        BinaryNodeBuilder {
            nodes: &mut *self.nodes,
            id: child_id,
        }
    }
}

/// A shared reference to a node of a [`BinaryTree`].
#[derive(Clone, Copy)]
pub struct BinaryNodeRef<'t> {
    tree: &'t BinaryTree,
    id: NodeId,
}

impl<'t> BinaryNodeRef<'t> {
    #[inline(always)]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline(always)]
    pub fn val(&self) -> Value {
        self.tree.data(self.id).val
    }

    pub fn left(&self) -> Option<BinaryNodeRef<'t>> {
        self.tree.data(self.id).left.map(|id| self.tree.node_ref(id))
    }

    pub fn right(&self) -> Option<BinaryNodeRef<'t>> {
        self.tree.data(self.id).right.map(|id| self.tree.node_ref(id))
    }

    pub fn is_leaf(&self) -> bool {
        let node = self.tree.data(self.id);
        node.left.is_none() && node.right.is_none()
    }
}

impl BinaryTree {
    /// A tree without nodes.
    pub fn empty() -> BinaryTree {
        BinaryTree {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Build a tree with the given root value.
    ///
    /// The callback is called exactly once with a [`BinaryNodeBuilder`] for the root node. Whatever it
    /// returns (typically the [`NodeId`]s of nodes that will be queried later) is returned together
    /// with the tree.
    pub fn build<R>(
        root_val: Value,
        node_builder_cb: impl FnOnce(&mut BinaryNodeBuilder) -> R,
    ) -> (BinaryTree, R) {
        let mut nodes = vec![BinaryNodeData {
            val: root_val,
            left: None,
            right: None,
        }];
        let root = NodeId(0);
        let ret = node_builder_cb(&mut BinaryNodeBuilder {
            nodes: &mut nodes,
            id: root,
        });
        (
            BinaryTree {
                nodes,
                root: Some(root),
            },
            ret,
        )
    }

    /// Like [`build`](`BinaryTree::build`), for when the callback returns nothing of interest.
    pub fn new(root_val: Value, node_builder_cb: impl FnOnce(&mut BinaryNodeBuilder)) -> BinaryTree {
        BinaryTree::build(root_val, node_builder_cb).0
    }

    /// Lays the given nodes out in pre-order.
    pub fn from_root(root: Option<BinaryTreeNode>) -> BinaryTree {
        fn add_children(node_builder: &mut BinaryNodeBuilder, node: BinaryTreeNode) {
            if let Some(left) = node.left {
                let left = *left;
                node_builder.build_left(left.value, |child_builder| {
                    add_children(child_builder, left)
                });
            }
            if let Some(right) = node.right {
                let right = *right;
                node_builder.build_right(right.value, |child_builder| {
                    add_children(child_builder, right)
                });
            }
        }

        match root {
            Some(root) => BinaryTree::new(root.value, |node_builder| add_children(node_builder, root)),
            None => BinaryTree::empty(),
        }
    }

    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root_ref(&self) -> Option<BinaryNodeRef> {
        self.root.map(|id| self.node_ref(id))
    }

    /// Look up a node by id. Returns `None` if this tree never handed out `id`.
    pub fn node(&self, id: NodeId) -> Option<BinaryNodeRef> {
        if id.0 < self.nodes.len() {
            Some(self.node_ref(id))
        } else {
            None
        }
    }

    #[inline(always)]
    fn node_ref(&self, id: NodeId) -> BinaryNodeRef {
        BinaryNodeRef { tree: self, id }
    }

    // Ids stored inside the arena always point into it.
    #[inline(always)]
    fn data(&self, id: NodeId) -> &BinaryNodeData {
        &self.nodes[id.0]
    }

    /// The number of nodes reachable from the root.
    pub fn tot_num_nodes(&self) -> usize {
        self.preorder_ids().len()
    }

    /// The values of all nodes, in pre-order.
    pub fn preorder(&self) -> Vec<Value> {
        self.preorder_ids()
            .into_iter()
            .map(|id| self.data(id).val)
            .collect()
    }

    fn preorder_ids(&self) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            result.push(id);
            let node = self.data(id);
            // right first, so that left is visited first
            stack.extend(node.right);
            stack.extend(node.left);
        }
        result
    }

    /// The number of nodes on the shortest path from the root down to a leaf. An empty tree has depth 0.
    ///
    /// A node with a single child isn't a leaf: the path continues through that child.
    pub fn min_depth(&self) -> usize {
        self.root.map_or(0, |root| self.min_depth_from(root))
    }

    fn min_depth_from(&self, id: NodeId) -> usize {
        let node = self.data(id);
        match (node.left, node.right) {
            (None, None) => 1,
            (Some(child), None) | (None, Some(child)) => self.min_depth_from(child) + 1,
            (Some(left), Some(right)) => {
                self.min_depth_from(left).min(self.min_depth_from(right)) + 1
            }
        }
    }

    /// The number of nodes on the longest path from the root down to a leaf. An empty tree has depth 0.
    pub fn max_depth(&self) -> usize {
        self.root.map_or(0, |root| self.max_depth_from(root))
    }

    fn max_depth_from(&self, id: NodeId) -> usize {
        let node = self.data(id);
        match (node.left, node.right) {
            (None, None) => 1,
            (Some(child), None) | (None, Some(child)) => self.max_depth_from(child) + 1,
            (Some(left), Some(right)) => {
                self.max_depth_from(left).max(self.max_depth_from(right)) + 1
            }
        }
    }

    /// The largest sum of values along any path in the tree. The path can start and end at any node,
    /// but visits every node at most once.
    ///
    /// The best sum starts out at 0 and branches that would lower a sum are dropped, so the result is
    /// never negative: a tree where every value is negative (or an empty tree) yields 0.
    pub fn max_sum(&self) -> Sum {
        self.max_sum_from(self.root, 0).1
    }

    /// Returns the best sum of a path going down from `id` through at most one child (at least 0),
    /// and the best sum of any path seen so far, starting from `best`.
    fn max_sum_from(&self, id: Option<NodeId>, best: Sum) -> (Sum, Sum) {
        let node = match id {
            Some(id) => self.data(id),
            None => return (0, best),
        };
        let (left, best) = self.max_sum_from(node.left, best);
        let (right, best) = self.max_sum_from(node.right, best);
        let val = Sum::from(node.val);
        let best = best.max(val + left + right);
        let branch = (val + left).max(val + right).max(0);
        (branch, best)
    }

    /// The smallest value in the tree that is strictly larger than `lower_bound`, if there is one.
    pub fn next_larger(&self, lower_bound: Value) -> Option<Value> {
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        let mut result: Option<Value> = None;
        while let Some(id) = stack.pop() {
            let node = self.data(id);
            if node.val > lower_bound && result.map_or(true, |best| node.val < best) {
                result = Some(node.val);
            }
            stack.extend(node.left);
            stack.extend(node.right);
        }
        result
    }

    /// Whether the two nodes are at the same depth but have different parents.
    ///
    /// The root is nobody's cousin. Nodes that aren't in this tree aren't cousins either.
    pub fn are_cousins(&self, node1: NodeId, node2: NodeId) -> bool {
        let root = match self.root {
            Some(root) => root,
            None => return false,
        };
        if node1 == root || node2 == root {
            return false;
        }
        let info1 = self.find_parent(root, node1, 1);
        let info2 = self.find_parent(root, node2, 1);
        trace!(?node1, ?info1, ?node2, ?info2, "looked up parents");
        match (info1, info2) {
            (Some(info1), Some(info2)) => info1.depth == info2.depth && info1.parent != info2.parent,
            _ => false,
        }
    }

    /// Searches the subtree of `cur` (which is at `depth`) for the parent of `target`, stopping at
    /// the first match.
    fn find_parent(&self, cur: NodeId, target: NodeId, depth: usize) -> Option<ParentInfo> {
        let node = self.data(cur);
        if node.left == Some(target) || node.right == Some(target) {
            return Some(ParentInfo {
                parent: cur,
                depth: depth + 1,
            });
        }
        node.left
            .and_then(|left| self.find_parent(left, target, depth + 1))
            .or_else(|| {
                node.right
                    .and_then(|right| self.find_parent(right, target, depth + 1))
            })
    }

    /// The deepest node that has both nodes as descendants, where every node is a descendant of
    /// itself.
    ///
    /// Both nodes must be in this tree. If only one of them is, that one (or an ancestor of it that
    /// the search happens to settle on) is returned; the result is not meaningful in that case.
    pub fn lowest_common_ancestor(&self, node1: NodeId, node2: NodeId) -> Option<NodeId> {
        let lca = self.lca_from(self.root, node1, node2);
        trace!(?node1, ?node2, ?lca, "lowest common ancestor");
        lca
    }

    fn lca_from(&self, cur: Option<NodeId>, node1: NodeId, node2: NodeId) -> Option<NodeId> {
        let cur = cur?;
        if cur == node1 || cur == node2 {
            return Some(cur);
        }
        let node = self.data(cur);
        let left = self.lca_from(node.left, node1, node2);
        let right = self.lca_from(node.right, node1, node2);
        match (left, right) {
            (Some(_), Some(_)) => Some(cur),
            (found, None) | (None, found) => found,
        }
    }

    /// The pre-order token stream, with an absent token for every missing child.
    pub(crate) fn tokens(&self) -> Vec<Token> {
        fn push_tokens(tree: &BinaryTree, id: Option<NodeId>, tokens: &mut Vec<Token>) {
            match id {
                Some(id) => {
                    let node = tree.data(id);
                    tokens.push(Token::Node(node.val));
                    push_tokens(tree, node.left, tokens);
                    push_tokens(tree, node.right, tokens);
                }
                None => tokens.push(Token::Absent),
            }
        }

        let mut tokens = Vec::with_capacity(2 * self.nodes.len() + 1);
        push_tokens(self, self.root, &mut tokens);
        tokens
    }

    /// Encode the tree as a string: its values in pre-order, with `#` for every missing child,
    /// separated by single spaces. An empty tree encodes as `"#"`.
    pub fn serialize(&self) -> String {
        self.tokens()
            .iter()
            .map(Token::to_string)
            .collect::<Vec<_>>()
            .join(TOKEN_SEPARATOR)
    }

    /// Decode a string produced by [`serialize`](`BinaryTree::serialize`).
    ///
    /// Tokens must be separated by single spaces and values written as plain decimal integers
    /// (an optional leading `-`, no `+`). The empty string decodes to `None`, while `"#"` decodes
    /// to an empty tree.
    pub fn deserialize(input: &str) -> Result<Option<BinaryTree>, ParseTreeError> {
        debug!(input_len = input.len(), "deserializing binary tree");
        let result = BinaryTree::from_tokens(tokenize(input));
        match &result {
            Ok(Some(tree)) => debug!(num_nodes = tree.nodes.len(), "deserialized binary tree"),
            Ok(None) => debug!("empty input, no tree"),
            Err(err) => debug!(%err, "failed to deserialize binary tree"),
        }
        result
    }

    pub(crate) fn from_tokens<I>(tokens: I) -> Result<Option<BinaryTree>, ParseTreeError>
    where
        I: Iterator<Item = Result<Token, ParseTreeError>>,
    {
        fn read_subtree<I>(
            reader: &mut TokenReader<I>,
            nodes: &mut Vec<BinaryNodeData>,
        ) -> Result<Option<NodeId>, ParseTreeError>
        where
            I: Iterator<Item = Result<Token, ParseTreeError>>,
        {
            match reader.next_token()? {
                Token::Absent => Ok(None),
                Token::Node(val) => {
                    let id = NodeId(nodes.len());
                    nodes.push(BinaryNodeData {
                        val,
                        left: None,
                        right: None,
                    });
                    let left = read_subtree(reader, nodes)?;
                    let right = read_subtree(reader, nodes)?;
                    let node = &mut nodes[id.0];
                    node.left = left;
                    node.right = right;
                    Ok(Some(id))
                }
            }
        }

        let mut reader = TokenReader::new(tokens);
        if reader.is_empty() {
            return Ok(None);
        }
        let mut nodes = Vec::new();
        let root = read_subtree(&mut reader, &mut nodes)?;
        trace!(num_tokens = reader.consumed(), num_nodes = nodes.len(), "read tree tokens");
        reader.finish()?;
        Ok(Some(BinaryTree { nodes, root }))
    }
}

/// Trees are equal when they have the same shape and the same values in the same places.
impl PartialEq for BinaryTree {
    fn eq(&self, other: &BinaryTree) -> bool {
        self.tokens() == other.tokens()
    }
}

impl Eq for BinaryTree {}

impl From<BinaryTreeNode> for BinaryTree {
    fn from(root: BinaryTreeNode) -> BinaryTree {
        BinaryTree::from_root(Some(root))
    }
}

impl FromStr for BinaryTree {
    type Err = ParseTreeError;

    fn from_str(s: &str) -> Result<BinaryTree, ParseTreeError> {
        BinaryTree::deserialize(s)?.ok_or(ParseTreeError::Empty)
    }
}
