// Formatting impls for the tree types.

use crate::*;

use std::fmt::{self, Debug, Display, Formatter};

fn fmt_node<T: Debug>(node: NodeRef<T>, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{{ value: {:?}, children: [", node.val())?;
    for (i, child) in node.children().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        fmt_node(child, f)?;
    }
    write!(f, "] }}")
}

impl<T: Debug> Debug for PackedTree<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "PackedTree")?;
        fmt_node(self.root(), f)
    }
}

impl Debug for GeneralTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "GeneralTree")?;
        match self.root() {
            Some(root) => fmt_node(root, f),
            None => write!(f, " {{}}"),
        }
    }
}

fn fmt_binary_node(node: Option<BinaryNodeRef>, f: &mut Formatter<'_>) -> fmt::Result {
    match node {
        Some(node) => {
            write!(f, "{{ value: {:?}, left: ", node.val())?;
            fmt_binary_node(node.left(), f)?;
            write!(f, ", right: ")?;
            fmt_binary_node(node.right(), f)?;
            write!(f, " }}")
        }
        None => write!(f, "None"),
    }
}

impl Debug for BinaryTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "BinaryTree")?;
        match self.root_ref() {
            Some(root) => fmt_binary_node(Some(root), f),
            None => write!(f, " {{}}"),
        }
    }
}

/// The same encoding as [`BinaryTree::serialize`].
impl Display for BinaryTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}
