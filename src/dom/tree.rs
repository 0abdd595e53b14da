//! The DOM arena: a slotmap of nodes plus parent/children maps, with dirty
//! tracking folded in so every mutation invalidates exactly what it must.

use slotmap::{SecondaryMap, SlotMap};

use crate::css::model::PseudoState;
use crate::dom::dirty::{DirtySet, Invalidate};
use crate::dom::node::{AttrValue, NodeData, NodeId};

const EMPTY_CHILDREN: &[NodeId] = &[];

// ---------------------------------------------------------------------------
// Dom
// ---------------------------------------------------------------------------

/// Arena-backed widget tree.
///
/// Nodes own their children; parent links are non-owning back-references.
/// Removal therefore only ever walks downward. All mutating entry points
/// route through the embedded [`DirtySet`], comparing old and new values
/// first so redundant writes leave no dirt behind.
#[derive(Debug, Default)]
pub struct Dom {
    nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    root: Option<NodeId>,
    dirty: DirtySet,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Structure ────────────────────────────────────────────────────

    /// Insert a detached node. The first insertion becomes the root.
    pub fn insert(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        if self.root.is_none() {
            self.root = Some(id);
        }
        self.dirty.mark_layout(id);
        id
    }

    /// Insert a node as the last child of `parent`.
    pub fn insert_child(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        debug_assert!(self.nodes.contains_key(parent), "parent must exist");
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(id);
        }
        self.parent.insert(id, parent);
        self.dirty.mark_layout(id);
        self.dirty.mark_layout(parent);
        id
    }

    /// Remove a node and its whole subtree. Returns the removed node's data.
    pub fn remove(&mut self, node: NodeId) -> Option<NodeData> {
        if !self.nodes.contains_key(node) {
            return None;
        }

        if let Some(parent) = self.parent.get(node).copied() {
            if let Some(siblings) = self.children.get_mut(parent) {
                siblings.retain(|&c| c != node);
            }
            self.dirty.mark_layout(parent);
        }
        if self.root == Some(node) {
            self.root = None;
        }

        // Collect the subtree breadth-first, then drop bottom-up-agnostic:
        // nothing references a removed id afterwards.
        let mut doomed = vec![node];
        let mut i = 0;
        while i < doomed.len() {
            if let Some(kids) = self.children.get(doomed[i]) {
                doomed.extend_from_slice(kids);
            }
            i += 1;
        }

        let mut removed = None;
        for id in doomed {
            self.children.remove(id);
            self.parent.remove(id);
            self.dirty.forget(id);
            let data = self.nodes.remove(id);
            if id == node {
                removed = data;
            }
        }
        removed
    }

    /// Move a subtree under a new parent (appended as last child).
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) {
        debug_assert!(self.nodes.contains_key(node));
        debug_assert!(self.nodes.contains_key(new_parent));

        if let Some(old_parent) = self.parent.get(node).copied() {
            if let Some(siblings) = self.children.get_mut(old_parent) {
                siblings.retain(|&c| c != node);
            }
            self.dirty.mark_layout(old_parent);
        }
        if let Some(siblings) = self.children.get_mut(new_parent) {
            siblings.push(node);
        }
        self.parent.insert(node, new_parent);
        self.dirty.mark_layout(new_parent);
        self.dirty.mark_layout(node);
    }

    /// Move a child to position `index` among its siblings.
    pub fn reorder_child(&mut self, node: NodeId, index: usize) {
        let Some(parent) = self.parent.get(node).copied() else {
            return;
        };
        let Some(siblings) = self.children.get_mut(parent) else {
            return;
        };
        let Some(current) = siblings.iter().position(|&c| c == node) else {
            return;
        };
        let index = index.min(siblings.len() - 1);
        if current == index {
            return;
        }
        siblings.remove(current);
        siblings.insert(index, node);
        self.dirty.mark_layout(parent);
    }

    // ── Access ───────────────────────────────────────────────────────

    pub fn get(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node)
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parent.get(node).copied()
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.children.get(node).map_or(EMPTY_CHILDREN, Vec::as_slice)
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = node;
        while let Some(parent) = self.parent.get(current).copied() {
            out.push(parent);
            current = parent;
        }
        out
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, node: NodeId) {
        debug_assert!(self.nodes.contains_key(node));
        self.root = Some(node);
        self.dirty.mark_layout(node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    // ── Traversal ────────────────────────────────────────────────────

    /// Depth-first pre-order from the root, children in document order.
    pub fn walk_depth_first(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let Some(root) = self.root else {
            return out;
        };
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            out.push(node);
            for &child in self.children(node).iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Breadth-first from the root.
    pub fn walk_breadth_first(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let Some(root) = self.root else {
            return out;
        };
        let mut queue = std::collections::VecDeque::from([root]);
        while let Some(node) = queue.pop_front() {
            out.push(node);
            queue.extend(self.children(node).iter().copied());
        }
        out
    }

    // ── Reactive mutation ────────────────────────────────────────────

    /// Write a reactive attribute. Compares against the current value first:
    /// an unchanged write marks nothing. Returns whether the value changed.
    pub fn set_attr(
        &mut self,
        node: NodeId,
        name: &str,
        value: impl Into<AttrValue>,
        level: Invalidate,
    ) -> bool {
        let value = value.into();
        let Some(data) = self.nodes.get_mut(node) else {
            return false;
        };
        if data.attrs.get(name) == Some(&value) {
            return false;
        }
        data.attrs.insert(name.to_owned(), value);
        self.dirty.mark(node, level);
        true
    }

    /// Flip a pseudo-state flag. Style-dirty on change only.
    pub fn set_state(&mut self, node: NodeId, state: PseudoState, on: bool) -> bool {
        let Some(data) = self.nodes.get_mut(node) else {
            return false;
        };
        if data.state(state) == on {
            return false;
        }
        data.set_state_flag(state, on);
        self.dirty.mark_style(node);
        true
    }

    /// Add a class. Style-dirty on change only.
    pub fn add_class(&mut self, node: NodeId, class: &str) -> bool {
        let Some(data) = self.nodes.get_mut(node) else {
            return false;
        };
        if data.has_class(class) {
            return false;
        }
        data.classes.push(class.to_owned());
        self.dirty.mark_style(node);
        true
    }

    /// Remove a class. Style-dirty on change only.
    pub fn remove_class(&mut self, node: NodeId, class: &str) -> bool {
        let Some(data) = self.nodes.get_mut(node) else {
            return false;
        };
        let before = data.classes.len();
        data.classes.retain(|c| c != class);
        if data.classes.len() == before {
            return false;
        }
        self.dirty.mark_style(node);
        true
    }

    /// Change paint order among siblings. Paint-dirty (the parent recomposes
    /// its sibling group) on change only.
    pub fn set_z_index(&mut self, node: NodeId, z_index: i32) -> bool {
        let parent = self.parent.get(node).copied();
        let Some(data) = self.nodes.get_mut(node) else {
            return false;
        };
        if data.z_index == z_index {
            return false;
        }
        data.z_index = z_index;
        self.dirty.mark_paint(node);
        if let Some(parent) = parent {
            self.dirty.mark_paint(parent);
        }
        true
    }

    /// Toggle visibility. Layout-dirty on change: hidden nodes still occupy
    /// space but invisible subtrees skip paint, and focus order changes.
    pub fn set_visible(&mut self, node: NodeId, visible: bool) -> bool {
        let Some(data) = self.nodes.get_mut(node) else {
            return false;
        };
        if data.visible == visible {
            return false;
        }
        data.visible = visible;
        self.dirty.mark_layout(node);
        true
    }

    // ── Dirty bookkeeping ────────────────────────────────────────────

    pub fn dirty(&self) -> &DirtySet {
        &self.dirty
    }

    pub fn dirty_mut(&mut self) -> &mut DirtySet {
        &mut self.dirty
    }

    /// Take this frame's dirty sets, leaving the tree clean.
    pub fn take_dirty(&mut self) -> DirtySet {
        self.dirty.take()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
