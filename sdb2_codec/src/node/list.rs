use crate::node::{Block, Node, Scalar};
use crate::serde::MAX_SLOT_INDEX;
use std::cell::Cell;

mod deser;
mod ser;

/// Index-addressed, possibly sparse sequence of children.
#[derive(Clone, Default, Debug)]
pub struct List {
    slots: Vec<Option<Node>>,
    cached_size: Cell<Option<u32>>,
}

impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        self.slots == other.slots
    }
}

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    /// Setting past the end fills the gap with empty slots.
    /// Indices the 2-byte slot index cannot hold are ignored.
    pub fn set(&mut self, index: usize, value: impl Into<Node>) {
        if index > MAX_SLOT_INDEX {
            log::warn!("ignoring value set at list index {index}");
            return;
        }
        let mut node = value.into();
        node.adopt();
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        self.slots[index] = Some(node);
        self.invalidate_size();
    }

    /// Leaves an empty slot behind.
    pub fn take(&mut self, index: usize) -> Option<Node> {
        let node = self.slots.get_mut(index)?.take();
        self.invalidate_size();
        node
    }

    pub fn get_node(&self, index: usize) -> Option<&Node> {
        self.slots.get(index)?.as_ref()
    }

    /// The zero value when the slot is out of range, empty, or holds another kind.
    pub fn get<T: Scalar>(&self, index: usize) -> T {
        self.get_node(index)
            .and_then(T::from_node)
            .unwrap_or_default()
    }

    pub fn get_str(&self, index: usize) -> &str {
        self.get_node(index).map(Node::as_str).unwrap_or("")
    }

    pub fn get_block(&self, index: usize) -> Option<&Block> {
        self.get_node(index)?.as_block()
    }

    pub fn get_block_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.invalidate_size();
        match self.slots.get_mut(index)? {
            Some(Node::Block(block)) => Some(block),
            _ => None,
        }
    }

    pub fn get_list(&self, index: usize) -> Option<&List> {
        self.get_node(index)?.as_list()
    }

    pub fn get_list_mut(&mut self, index: usize) -> Option<&mut List> {
        self.invalidate_size();
        match self.slots.get_mut(index)? {
            Some(Node::List(list)) => Some(list),
            _ => None,
        }
    }

    /// Number of slots, empty ones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_present(&self, index: usize) -> bool {
        self.get_node(index).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&Node>> {
        self.slots.iter().map(Option::as_ref)
    }

    /// Present slots with their indices.
    pub fn present(&self) -> impl Iterator<Item = (usize, &Node)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|node| (i, node)))
    }

    pub fn invalidate_size(&self) {
        self.cached_size.set(None);
    }
}
