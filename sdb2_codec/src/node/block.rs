use crate::node::{List, Node, Scalar};
use crate::serde::{encoded_text_len, StrTableOffset, MAX_TEXT_LEN};
use std::cell::Cell;

mod deser;
mod ser;

#[derive(Clone, Debug)]
struct Entry {
    key: String,
    str_offset: StrTableOffset,
    node: Node,
}

/// Key-addressed children, kept in first-insertion order.
///
/// A block that has never been placed into a container is a root,
/// and is serialized as a framed document.
#[derive(Clone, Default, Debug)]
pub struct Block {
    entries: Vec<Entry>,
    next_str_offset: u32,
    has_parent: bool,
    cached_size: Cell<Option<u32>>,
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.has_parent == other.has_parent
            && self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|(a, b)| a.key == b.key && a.node == b.node)
    }
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        !self.has_parent
    }

    pub(crate) fn mark_nested(&mut self) {
        self.has_parent = true;
        self.invalidate_size();
    }

    /// Replacing an existing key keeps its position and string table offset.
    /// Empty keys, and keys too long for the string table, are ignored.
    pub fn set(&mut self, key: &str, value: impl Into<Node>) {
        if key.is_empty() {
            log::warn!("ignoring value set under an empty key");
            return;
        }
        if key.len() > MAX_TEXT_LEN {
            log::warn!("ignoring value set under a {} byte key", key.len());
            return;
        }

        let mut node = value.into();
        node.adopt();
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => entry.node = node,
            None => {
                let str_offset = StrTableOffset::from(self.next_str_offset);
                self.next_str_offset += encoded_text_len(key.as_bytes());
                self.entries.push(Entry {
                    key: key.to_owned(),
                    str_offset,
                    node,
                });
            }
        }
        self.invalidate_size();
    }

    pub fn get_node(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.node)
    }

    fn get_node_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.invalidate_size();
        self.entries
            .iter_mut()
            .find(|e| e.key == key)
            .map(|e| &mut e.node)
    }

    /// The zero value when the key is missing or holds another kind.
    pub fn get<T: Scalar>(&self, key: &str) -> T {
        self.get_node(key)
            .and_then(T::from_node)
            .unwrap_or_default()
    }

    pub fn get_str(&self, key: &str) -> &str {
        self.get_node(key).map(Node::as_str).unwrap_or("")
    }

    pub fn get_block(&self, key: &str) -> Option<&Block> {
        self.get_node(key)?.as_block()
    }

    pub fn get_block_mut(&mut self, key: &str) -> Option<&mut Block> {
        match self.get_node_mut(key)? {
            Node::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn get_list(&self, key: &str) -> Option<&List> {
        self.get_node(key)?.as_list()
    }

    pub fn get_list_mut(&mut self, key: &str) -> Option<&mut List> {
        match self.get_node_mut(key)? {
            Node::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get_node(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|e| (e.key.as_str(), &e.node))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Where `key` sits in the string table.
    pub fn str_offset(&self, key: &str) -> Option<StrTableOffset> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.str_offset)
    }

    pub fn invalidate_size(&self) {
        self.cached_size.set(None);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::serde::Ser;

    #[test]
    fn set_and_get() {
        let mut block = Block::new();
        block.set("Int", 7i32);
        block.set("Str", "seven");
        block.set("Char", 'x' as u16);

        assert_eq!(block.len(), 3);
        assert_eq!(block.get::<i32>("Int"), 7);
        assert_eq!(block.get::<u16>("Char"), 'x' as u16);
        assert_eq!(block.get_str("Str"), "seven");
        assert_eq!(block.keys().collect::<Vec<_>>(), vec!["Int", "Str", "Char"]);

        assert_eq!(block.get::<i64>("Int"), 0);
        assert_eq!(block.get::<f64>("Missing"), 0.0);
        assert_eq!(block.get_str("Int"), "");
        assert!(block.get_list("Str").is_none());
        assert!(!block.contains_key("Missing"));
    }

    #[test]
    fn replacement_keeps_offset() {
        let mut block = Block::new();
        block.set("a", 1u8);
        block.set("bb", 2u8);
        block.set("ccc", 3u8);
        let offsets = ["a", "bb", "ccc"].map(|k| block.str_offset(k));

        block.set("bb", "two");
        assert_eq!(["a", "bb", "ccc"].map(|k| block.str_offset(k)), offsets);
        assert_eq!(block.keys().collect::<Vec<_>>(), vec!["a", "bb", "ccc"]);
        assert_eq!(block.get_str("bb"), "two");

        assert_eq!(offsets.map(|o| o.map(|o| *o)), [Some(0), Some(4), Some(9)]);
        block.set("d", 4u8);
        assert_eq!(block.str_offset("d").map(|o| *o), Some(15));
    }

    #[test]
    fn invalid_keys_are_ignored() {
        let mut block = Block::new();
        block.set("", 1i32);
        block.set(&"k".repeat(MAX_TEXT_LEN + 1), 1i32);
        assert!(block.is_empty());

        block.set(&"k".repeat(MAX_TEXT_LEN), 1i32);
        assert_eq!(block.len(), 1);
    }

    #[test]
    fn nesting_clears_root() {
        let mut inner = Block::new();
        inner.set("x", 1i16);
        assert!(inner.is_root());

        let mut outer = Block::new();
        outer.set("inner", inner);
        assert!(outer.is_root());
        assert_eq!(outer.get_block("inner").map(Block::is_root), Some(false));
    }

    #[test]
    fn mutation_through_children_resizes() {
        let mut outer = Block::new();
        outer.set("list", List::new());
        let before = outer.size();

        if let Some(list) = outer.get_list_mut("list") {
            list.set(0, 1.5f64);
        }
        assert_eq!(outer.size(), before + 2 + 10);
        assert_eq!(
            outer.get_list("list").map(|l| l.get::<f64>(0)),
            Some(1.5)
        );
    }
}
