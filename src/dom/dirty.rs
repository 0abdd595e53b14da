//! Dirty tracking: which nodes need style resolution, layout, or repaint.

use std::collections::HashSet;

use crate::dom::node::NodeId;

/// How much work a mutation invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidate {
    /// Content changed; repaint only.
    Paint,
    /// Geometry may have changed; re-layout (which implies repaint).
    Layout,
}

/// Idempotent per-frame sets of dirty node ids.
///
/// Marking is monotone within a frame: a hundred writes to the same node
/// leave one entry. [`DirtySet::take`] hands the frame's accumulated sets to
/// the pipeline and clears the live one in a single move.
#[derive(Debug, Default, Clone)]
pub struct DirtySet {
    style: HashSet<NodeId>,
    layout: HashSet<NodeId>,
    paint: HashSet<NodeId>,
}

impl DirtySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node needs its style re-resolved (and whatever follows from that).
    pub fn mark_style(&mut self, node: NodeId) {
        self.style.insert(node);
    }

    /// Node needs layout. Layout dirt implies paint dirt.
    pub fn mark_layout(&mut self, node: NodeId) {
        self.layout.insert(node);
        self.paint.insert(node);
    }

    /// Node needs repaint only.
    pub fn mark_paint(&mut self, node: NodeId) {
        self.paint.insert(node);
    }

    pub fn mark(&mut self, node: NodeId, level: Invalidate) {
        match level {
            Invalidate::Paint => self.mark_paint(node),
            Invalidate::Layout => self.mark_layout(node),
        }
    }

    pub fn is_style_dirty(&self, node: NodeId) -> bool {
        self.style.contains(&node)
    }

    pub fn is_layout_dirty(&self, node: NodeId) -> bool {
        self.layout.contains(&node)
    }

    pub fn is_paint_dirty(&self, node: NodeId) -> bool {
        self.paint.contains(&node)
    }

    pub fn style_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.style.iter().copied()
    }

    pub fn layout_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.layout.iter().copied()
    }

    pub fn paint_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.paint.iter().copied()
    }

    /// Whether nothing is dirty.
    pub fn is_empty(&self) -> bool {
        self.style.is_empty() && self.layout.is_empty() && self.paint.is_empty()
    }

    /// Take the accumulated sets, leaving empty ones behind. Called once at
    /// the start of a render pass so marks made during the pass land in the
    /// next frame.
    pub fn take(&mut self) -> DirtySet {
        std::mem::take(self)
    }

    /// Drop any marks for a node that left the tree.
    pub fn forget(&mut self, node: NodeId) {
        self.style.remove(&node);
        self.layout.remove(&node);
        self.paint.remove(&node);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
