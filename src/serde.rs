#![cfg(any(feature = "serde", test))]

use ::serde::de;
use ::serde::de::{DeserializeSeed, SeqAccess, Visitor};
use ::serde::ser::SerializeSeq;
use ::serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::{tokenize, Token};
use crate::*;

use std::fmt;

#[derive(Deserialize)]
struct FlatNode<T> {
    val: T,
    offset: usize,
}

#[derive(Serialize)]
#[serde(rename = "FlatNode")]
struct FlatNodeRef<'a, T> {
    val: &'a T,
    offset: usize,
}

// Human-readable formats get the nested form: the tree is a list of at most one root node, and
// a node is `[val, [children...]]`. Other formats get the packed form: every node in pre-order
// as `{ val, offset }`, where offset is the distance to the next sibling (0 if there is none).
impl Serialize for GeneralTree {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            let mut seq = serializer.serialize_seq(Some(self.tree.iter().len()))?;
            if let Some(root) = self.root() {
                seq.serialize_element(&root)?;
            }
            seq.end()
        } else {
            let data = self.tree.as_ref().map_or(&[][..], PackedTree::raw_data);
            serializer.collect_seq(data.iter().map(|node| FlatNodeRef {
                val: node.val(),
                offset: node.next_sibling_offset().map_or(0, |offset| offset.get()),
            }))
        }
    }
}

impl<'t, T: Serialize> Serialize for NodeIter<'t, T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(None)?;
        for node in (*self).clone() {
            seq.serialize_element(&node)?;
        }
        seq.end()
    }
}

impl<'t, T: Serialize> Serialize for NodeRef<'t, T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_seq(Some(2))?;
        s.serialize_element(self.val())?;
        s.serialize_element(&self.children())?;
        s.end()
    }
}

impl<'de> Deserialize<'de> for GeneralTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            struct RecNodeDeserializer<'a, 'b: 'a> {
                node_builder: &'a mut NodeBuilder<'b, Value>,
            }

            impl<'de, 'a, 'b> DeserializeSeed<'de> for RecNodeDeserializer<'a, 'b> {
                type Value = ();

                fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
                where
                    D: Deserializer<'de>,
                {
                    deserializer.deserialize_seq(self)
                }
            }

            impl<'de, 'a, 'b> Visitor<'de> for RecNodeDeserializer<'a, 'b> {
                type Value = ();

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    write!(formatter, "a node (which is a sequence of 2 elements)")
                }

                fn visit_seq<A>(self, mut seq: A) -> Result<(), A::Error>
                where
                    A: SeqAccess<'de>,
                {
                    let val = seq
                        .next_element()?
                        .ok_or_else(|| de::Error::invalid_length(0, &self))?;

                    let children = self.node_builder.build_child(val, |child_node_builder| {
                        seq.next_element_seed(ChildrenDeserializer {
                            node_builder: child_node_builder,
                        })
                    })?;
                    children.ok_or_else(|| de::Error::invalid_length(1, &self))
                }
            }

            struct ChildrenDeserializer<'a, 'b: 'a> {
                node_builder: &'a mut NodeBuilder<'b, Value>,
            }

            impl<'de, 'a, 'b> DeserializeSeed<'de> for ChildrenDeserializer<'a, 'b> {
                type Value = ();

                fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
                where
                    D: Deserializer<'de>,
                {
                    deserializer.deserialize_seq(self)
                }
            }

            impl<'de, 'a, 'b> Visitor<'de> for ChildrenDeserializer<'a, 'b> {
                type Value = ();

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    write!(formatter, "a sequence")
                }

                fn visit_seq<A>(self, mut seq: A) -> Result<(), A::Error>
                where
                    A: SeqAccess<'de>,
                {
                    while let Some(()) = seq.next_element_seed(RecNodeDeserializer {
                        node_builder: &mut *self.node_builder,
                    })? {}

                    Ok(())
                }
            }

            struct RootNodeDeserializer;

            impl<'de> DeserializeSeed<'de> for RootNodeDeserializer {
                type Value = PackedTree<Value>;

                fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
                where
                    D: Deserializer<'de>,
                {
                    deserializer.deserialize_seq(self)
                }
            }

            impl<'de> Visitor<'de> for RootNodeDeserializer {
                type Value = PackedTree<Value>;

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    write!(formatter, "a node (which is a sequence of 2 elements)")
                }

                fn visit_seq<A>(self, mut seq: A) -> Result<PackedTree<Value>, A::Error>
                where
                    A: SeqAccess<'de>,
                {
                    let val = seq
                        .next_element()?
                        .ok_or_else(|| de::Error::invalid_length(0, &self))?;

                    PackedTree::try_new(val, |node_builder| -> Result<(), A::Error> {
                        seq.next_element_seed(ChildrenDeserializer { node_builder })?
                            .ok_or_else(|| de::Error::invalid_length(1, &self))
                    })
                }
            }

            struct RootListVisitor;

            impl<'de> Visitor<'de> for RootListVisitor {
                type Value = GeneralTree;

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    write!(formatter, "a sequence of at most one root node")
                }

                fn visit_seq<A>(self, mut seq: A) -> Result<GeneralTree, A::Error>
                where
                    A: SeqAccess<'de>,
                {
                    let tree = seq.next_element_seed(RootNodeDeserializer)?;
                    if tree.is_some() && seq.next_element::<de::IgnoredAny>()?.is_some() {
                        return Err(de::Error::invalid_length(2, &self));
                    }
                    Ok(GeneralTree { tree })
                }
            }

            deserializer.deserialize_seq(RootListVisitor)
        } else {
            struct FlatNodeListVisitor;

            impl<'de> Visitor<'de> for FlatNodeListVisitor {
                type Value = GeneralTree;

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    write!(formatter, "a sequence")
                }

                fn visit_seq<A>(self, mut seq: A) -> Result<GeneralTree, A::Error>
                where
                    A: SeqAccess<'de>,
                {
                    // reads n nodes (each with its descendants) from the SeqAccess and adds them as children to the node_builder
                    // if n is None, reads all elements until the end of the stream
                    fn rec_add_n_children<'de, A: SeqAccess<'de>>(
                        seq: &mut A,
                        n: Option<usize>,
                        node_builder: &mut NodeBuilder<Value>,
                    ) -> Result<(), A::Error> {
                        match n {
                            Some(n) => {
                                let mut num_read = 0;
                                while num_read < n {
                                    if let Some(node) = seq.next_element::<FlatNode<Value>>()? {
                                        num_read += 1;
                                        let max_num_left_to_read = n - num_read;
                                        let n_rec = {
                                            if node.offset == 0 {
                                                max_num_left_to_read
                                            } else {
                                                if node.offset - 1 > max_num_left_to_read {
                                                    return Err(de::Error::invalid_length(
                                                        num_read,
                                                        &"offset invalid",
                                                    ));
                                                }
                                                node.offset - 1
                                            }
                                        };
                                        node_builder.build_child(node.val, |child_builder| {
                                            rec_add_n_children(seq, Some(n_rec), child_builder)
                                        })?;
                                        num_read += n_rec;
                                    } else {
                                        return Err(de::Error::invalid_length(
                                            num_read,
                                            &"offset too large",
                                        ));
                                    }
                                }
                            }
                            None => {
                                while let Some(node) = seq.next_element::<FlatNode<Value>>()? {
                                    let n_rec = {
                                        if node.offset == 0 {
                                            None
                                        } else {
                                            Some(node.offset - 1)
                                        }
                                    };
                                    node_builder.build_child(node.val, |child_builder| {
                                        rec_add_n_children(seq, n_rec, child_builder)
                                    })?;
                                }
                            }
                        }
                        Ok(())
                    }

                    let root = match seq.next_element::<FlatNode<Value>>()? {
                        Some(root) => root,
                        None => return Ok(GeneralTree::empty()),
                    };
                    if root.offset != 0 {
                        return Err(de::Error::invalid_value(
                            de::Unexpected::Unsigned(root.offset as u64),
                            &"a root node without siblings (offset 0)",
                        ));
                    }
                    let tree = PackedTree::try_new(root.val, |node_builder| {
                        rec_add_n_children(&mut seq, None, node_builder)
                    })?;
                    Ok(GeneralTree { tree: Some(tree) })
                }
            }

            deserializer.deserialize_seq(FlatNodeListVisitor)
        }
    }
}

// Human-readable formats get the string encoding, other formats the pre-order token list with
// `None` for every missing child.
impl Serialize for BinaryTree {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.collect_seq(self.tokens().into_iter().map(Option::<Value>::from))
        }
    }
}

impl<'de> Deserialize<'de> for BinaryTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tree = if deserializer.is_human_readable() {
            let encoded = String::deserialize(deserializer)?;
            BinaryTree::from_tokens(tokenize(&encoded))
        } else {
            let tokens = Vec::<Option<Value>>::deserialize(deserializer)?;
            BinaryTree::from_tokens(tokens.into_iter().map(|token| Ok(Token::from(token))))
        };
        tree.map(Option::unwrap_or_default)
            .map_err(de::Error::custom)
    }
}
