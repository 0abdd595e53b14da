//! The screen: one DOM plus everything derived from it.
//!
//! [`Screen`] owns the tree, the widgets attached to its nodes, the compiled
//! stylesheets, the memoized resolved styles, the layout engine, the
//! compositor, and the focus chain. [`Screen::render_frame`] is the whole
//! pipeline for one frame: take the dirty sets, re-resolve styles, solve
//! layout, composite, and diff.

use std::collections::HashSet;

use slotmap::SecondaryMap;

use crate::css::styles::ResolvedStyle;
use crate::css::stylesheet::{compute_styles, CompiledStylesheet};
use crate::dom::node::NodeId;
use crate::dom::tree::Dom;
use crate::error::{ConfigError, LayoutWarning};
use crate::css::model::PseudoState;
use crate::geometry::Size;
use crate::layout::engine::{LayoutEngine, StyleMap, WidgetMap};
use crate::render::compositor::Compositor;
use crate::render::diff::TermOp;
use crate::widget::traits::Widget;

// ---------------------------------------------------------------------------
// FocusChain
// ---------------------------------------------------------------------------

/// Tab order over focusable, visible, enabled nodes.
///
/// Rebuilt from the DOM on demand; a surviving focused node keeps its focus
/// across rebuilds.
#[derive(Debug, Default)]
pub struct FocusChain {
    nodes: Vec<NodeId>,
    current: Option<usize>,
}

impl FocusChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recollect focusable nodes in depth-first order.
    pub fn rebuild(&mut self, dom: &Dom) {
        let previous = self.current_node();
        self.nodes.clear();
        self.current = None;

        for node in dom.walk_depth_first() {
            if dom.get(node).is_some_and(|data| data.accepts_focus()) {
                self.nodes.push(node);
            }
        }
        if let Some(previous) = previous {
            self.current = self.nodes.iter().position(|&n| n == previous);
        }
    }

    pub fn current_node(&self) -> Option<NodeId> {
        self.current.and_then(|i| self.nodes.get(i).copied())
    }

    /// Advance focus, wrapping. `None` when nothing is focusable.
    pub fn next(&mut self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            return None;
        }
        let next = match self.current {
            Some(i) => (i + 1) % self.nodes.len(),
            None => 0,
        };
        self.current = Some(next);
        self.nodes.get(next).copied()
    }

    /// Step focus backwards, wrapping.
    pub fn previous(&mut self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            return None;
        }
        let previous = match self.current {
            Some(0) | None => self.nodes.len() - 1,
            Some(i) => i - 1,
        };
        self.current = Some(previous);
        self.nodes.get(previous).copied()
    }

    /// Focus a specific node. `false` when it is not in the chain.
    pub fn focus(&mut self, node: NodeId) -> bool {
        match self.nodes.iter().position(|&n| n == node) {
            Some(i) => {
                self.current = Some(i);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Screen
// ---------------------------------------------------------------------------

/// One screen of the application and its full render pipeline.
pub struct Screen {
    pub dom: Dom,
    pub widgets: WidgetMap,
    pub layout: LayoutEngine,
    pub compositor: Compositor,
    pub focus: FocusChain,
    resolved: StyleMap,
    stylesheets: Vec<CompiledStylesheet>,
    size: Size,
}

impl Screen {
    pub fn new(width: u16, height: u16) -> Self {
        let size = Size::new(width as i32, height as i32);
        Self {
            dom: Dom::new(),
            widgets: SecondaryMap::new(),
            layout: LayoutEngine::new(),
            compositor: Compositor::new(size),
            focus: FocusChain::new(),
            resolved: SecondaryMap::new(),
            stylesheets: Vec::new(),
            size,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Attach a widget implementation to a node.
    pub fn set_widget(&mut self, node: NodeId, widget: Box<dyn Widget>) {
        self.widgets.insert(node, widget);
        self.dom.dirty_mut().mark_layout(node);
    }

    /// Compile and add a stylesheet.
    ///
    /// A parse error rejects the whole sheet and leaves the screen's styles
    /// untouched. On success every node is marked style-dirty so the next
    /// frame re-resolves against the new cascade.
    pub fn load_stylesheet(&mut self, source: &str, user: bool) -> Result<(), ConfigError> {
        let sheet = CompiledStylesheet::parse(source, user)?;
        self.stylesheets.push(sheet);
        for node in self.dom.walk_depth_first() {
            self.dom.dirty_mut().mark_style(node);
        }
        Ok(())
    }

    /// Change the viewport. The next frame does a full layout pass and the
    /// diff repaints everything.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.size = Size::new(width as i32, height as i32);
        self.compositor.resize(self.size);
        if let Some(root) = self.dom.root() {
            self.dom.dirty_mut().mark_layout(root);
        }
    }

    pub fn focused_node(&self) -> Option<NodeId> {
        self.focus.current_node()
    }

    /// Move focus forward, updating `:focus` pseudo-state flags.
    pub fn focus_next(&mut self) -> Option<NodeId> {
        self.focus.rebuild(&self.dom);
        let old = self.focus.current_node();
        let new = self.focus.next();
        self.apply_focus_change(old, new);
        new
    }

    /// Move focus backward, updating `:focus` pseudo-state flags.
    pub fn focus_previous(&mut self) -> Option<NodeId> {
        self.focus.rebuild(&self.dom);
        let old = self.focus.current_node();
        let new = self.focus.previous();
        self.apply_focus_change(old, new);
        new
    }

    /// Focus a specific node, if focusable.
    pub fn focus_node(&mut self, node: NodeId) -> bool {
        self.focus.rebuild(&self.dom);
        let old = self.focus.current_node();
        if self.focus.focus(node) {
            self.apply_focus_change(old, Some(node));
            true
        } else {
            false
        }
    }

    fn apply_focus_change(&mut self, old: Option<NodeId>, new: Option<NodeId>) {
        if old == new {
            return;
        }
        if let Some(old) = old {
            self.dom.set_state(old, PseudoState::Focus, false);
        }
        if let Some(new) = new {
            self.dom.set_state(new, PseudoState::Focus, true);
        }
    }

    /// The resolved style snapshot for a node, if one has been computed.
    pub fn resolved_style(&self, node: NodeId) -> Option<&ResolvedStyle> {
        self.resolved.get(node)
    }

    /// Layout warnings from the most recent frame.
    pub fn warnings(&self) -> &[LayoutWarning] {
        self.layout.warnings()
    }

    /// Produce one frame: resolve dirty styles, solve layout, composite,
    /// and diff against the previous frame.
    ///
    /// With nothing dirty this is cheap and returns no ops: styles are
    /// memoized, clean subtrees keep their geometry, and identical frames
    /// diff to nothing.
    pub fn render_frame(&mut self) -> Result<Vec<TermOp>, ConfigError> {
        let dirty = self.dom.take_dirty();
        let mut layout_dirty: HashSet<NodeId> = dirty.layout_nodes().collect();
        let mut paint_dirty: HashSet<NodeId> = dirty.paint_nodes().collect();
        let style_dirty: HashSet<NodeId> = dirty.style_nodes().collect();

        self.prune_resolved();
        self.resolve_styles(&style_dirty, &mut layout_dirty, &mut paint_dirty);

        self.layout.compute(
            &self.dom,
            &self.resolved,
            &self.widgets,
            self.size,
            &layout_dirty,
        )?;
        paint_dirty.extend(layout_dirty);

        Ok(self.compositor.render(
            &self.dom,
            &self.resolved,
            &self.widgets,
            &self.layout,
            &paint_dirty,
        ))
    }

    fn prune_resolved(&mut self) {
        let gone: Vec<NodeId> = self
            .resolved
            .keys()
            .filter(|&node| !self.dom.contains(node))
            .collect();
        for node in gone {
            self.resolved.remove(node);
        }
    }

    /// Re-resolve styles for dirty nodes and their descendants (inherited
    /// properties flow down). Each changed snapshot marks the node for
    /// re-layout or just repaint, depending on which properties moved.
    fn resolve_styles(
        &mut self,
        style_dirty: &HashSet<NodeId>,
        layout_dirty: &mut HashSet<NodeId>,
        paint_dirty: &mut HashSet<NodeId>,
    ) {
        let root = match self.dom.root() {
            Some(root) => root,
            None => return,
        };

        // (node, ancestor re-resolved)
        let mut stack = vec![(root, false)];
        while let Some((node, ancestor_changed)) = stack.pop() {
            let stale = ancestor_changed
                || style_dirty.contains(&node)
                || !self.resolved.contains_key(node);

            let mut changed = false;
            if stale {
                let declared = compute_styles(&self.stylesheets, &self.dom, node);
                let parent = self
                    .dom
                    .parent(node)
                    .and_then(|p| self.resolved.get(p))
                    .cloned();
                let next = ResolvedStyle::resolve(&declared, parent.as_ref());

                changed = match self.resolved.get(node) {
                    Some(old) if *old == next => false,
                    Some(old) => {
                        if affects_layout(old, &next) {
                            layout_dirty.insert(node);
                        } else {
                            paint_dirty.insert(node);
                        }
                        true
                    }
                    None => {
                        layout_dirty.insert(node);
                        true
                    }
                };
                if changed {
                    self.resolved.insert(node, next);
                }
            }

            for &child in self.dom.children(node) {
                stack.push((child, changed || ancestor_changed));
            }
        }
    }
}

/// Whether a style change requires a new layout pass, or repaint alone.
fn affects_layout(old: &ResolvedStyle, new: &ResolvedStyle) -> bool {
    old.display != new.display
        || old.layout != new.layout
        || old.dock != new.dock
        || old.position != new.position
        || old.overflow_x != new.overflow_x
        || old.overflow_y != new.overflow_y
        || old.width != new.width
        || old.height != new.height
        || old.min_width != new.min_width
        || old.min_height != new.min_height
        || old.max_width != new.max_width
        || old.max_height != new.max_height
        || old.margin != new.margin
        || old.padding != new.padding
        || old.offset_x != new.offset_x
        || old.offset_y != new.offset_y
        || old.grid_rows != new.grid_rows
        || old.grid_columns != new.grid_columns
        || old.row_span != new.row_span
        || old.column_span != new.column_span
        || old.border.kind != new.border.kind
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::scalar::ScalarBox;
    use crate::css::scalar::Scalar;
    use crate::dom::node::NodeData;
    use crate::geometry::Region;
    use crate::render::strip::{CellStyle, Strip};

    struct Label(String);

    impl Label {
        fn boxed(text: &str) -> Box<dyn Widget> {
            Box::new(Self(text.into()))
        }
    }

    impl Widget for Label {
        fn widget_type(&self) -> &str {
            "Label"
        }

        fn intrinsic_size(&self, _available: Size) -> Size {
            Size::new(self.0.chars().count() as i32, 1)
        }

        fn paint(&self, region: Region, style: &ResolvedStyle) -> Vec<Strip> {
            let mut strip = Strip::new(region.y, region.x);
            strip.push_str(&self.0, CellStyle::from_resolved(style));
            vec![strip]
        }
    }

    fn screen_with_label(text: &str) -> (Screen, NodeId, NodeId) {
        let mut screen = Screen::new(10, 3);
        let root = screen.dom.insert(NodeData::new("Screen"));
        let label = screen.dom.insert_child(root, NodeData::new("Label"));
        screen.set_widget(label, Label::boxed(text));
        (screen, root, label)
    }

    // ── FocusChain ───────────────────────────────────────────────────

    #[test]
    fn focus_chain_cycles_both_ways() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::new("Screen"));
        let a = dom.insert_child(root, NodeData::new("Button").focusable(true));
        let b = dom.insert_child(root, NodeData::new("Button").focusable(true));
        let mut chain = FocusChain::new();
        chain.rebuild(&dom);

        assert_eq!(chain.next(), Some(a));
        assert_eq!(chain.next(), Some(b));
        assert_eq!(chain.next(), Some(a));
        assert_eq!(chain.previous(), Some(b));
    }

    #[test]
    fn focus_chain_skips_disabled_and_hidden() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::new("Screen"));
        let _off = dom.insert_child(root, NodeData::new("Button").focusable(true).disabled(true));
        let hidden = dom.insert_child(root, NodeData::new("Button").focusable(true));
        dom.set_visible(hidden, false);
        let on = dom.insert_child(root, NodeData::new("Button").focusable(true));

        let mut chain = FocusChain::new();
        chain.rebuild(&dom);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.next(), Some(on));
    }

    #[test]
    fn rebuild_preserves_surviving_focus() {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::new("Screen"));
        let a = dom.insert_child(root, NodeData::new("Button").focusable(true));
        let mut chain = FocusChain::new();
        chain.rebuild(&dom);
        chain.focus(a);

        let _b = dom.insert_child(root, NodeData::new("Button").focusable(true));
        chain.rebuild(&dom);
        assert_eq!(chain.current_node(), Some(a));

        dom.remove(a);
        chain.rebuild(&dom);
        assert_eq!(chain.current_node(), None);
    }

    // ── Stylesheets ──────────────────────────────────────────────────

    #[test]
    fn bad_stylesheet_is_rejected_whole() {
        let mut screen = Screen::new(10, 3);
        let err = screen.load_stylesheet("Button { color red; }", false);
        assert!(matches!(err, Err(ConfigError::Stylesheet { .. })));
        assert!(screen.stylesheets.is_empty());
    }

    #[test]
    fn stylesheet_applies_on_next_frame() {
        let (mut screen, _root, label) = screen_with_label("hi");
        screen.render_frame().unwrap();

        screen
            .load_stylesheet("Label { color: red; }", false)
            .unwrap();
        screen.render_frame().unwrap();
        let style = screen.resolved_style(label).unwrap();
        assert_eq!(style.color.as_deref(), Some("red"));
    }

    // ── render_frame ─────────────────────────────────────────────────

    #[test]
    fn first_frame_paints_then_idle_frames_are_empty() {
        let (mut screen, _root, _label) = screen_with_label("hi");
        let first = screen.render_frame().unwrap();
        assert!(!first.is_empty());
        assert_eq!(screen.compositor.last_frame().to_text(), "hi        \n          \n          ");

        let second = screen.render_frame().unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn attribute_writes_coalesce_into_one_repaint() {
        let (mut screen, _root, label) = screen_with_label("hi");
        screen.render_frame().unwrap();

        for i in 0..100 {
            screen
                .dom
                .set_attr(label, "value", i as i64, crate::dom::dirty::Invalidate::Paint);
        }
        assert_eq!(screen.dom.dirty().paint_nodes().count(), 1);
        screen.render_frame().unwrap();
        assert!(screen.dom.dirty().is_empty());
    }

    #[test]
    fn focus_pseudo_state_restyles_node() {
        let mut screen = Screen::new(10, 3);
        let root = screen.dom.insert(NodeData::new("Screen"));
        let button = screen
            .dom
            .insert_child(root, NodeData::new("Button").focusable(true));
        screen
            .load_stylesheet(
                "Button { background: gray; } Button:focus { background: blue; }",
                false,
            )
            .unwrap();
        screen.render_frame().unwrap();
        assert_eq!(
            screen.resolved_style(button).unwrap().background.as_deref(),
            Some("gray")
        );

        assert_eq!(screen.focus_next(), Some(button));
        screen.render_frame().unwrap();
        assert_eq!(
            screen.resolved_style(button).unwrap().background.as_deref(),
            Some("blue")
        );
    }

    #[test]
    fn color_only_change_skips_relayout() {
        let (mut screen, _root, label) = screen_with_label("hi");
        screen.render_frame().unwrap();
        let region = screen.layout.region(label);

        screen
            .load_stylesheet("Label { color: red; }", false)
            .unwrap();
        screen.render_frame().unwrap();
        assert_eq!(screen.layout.region(label), region);
    }

    #[test]
    fn shrink_resize_clamps_and_warns_without_panic() {
        let mut screen = Screen::new(20, 10);
        let root = screen.dom.insert(NodeData::new("Screen"));
        let _ = root;
        screen
            .load_stylesheet("Screen { padding: 3; border: thin white; }", false)
            .unwrap();
        screen.render_frame().unwrap();
        assert!(screen.warnings().is_empty());

        screen.resize(4, 2);
        screen.render_frame().unwrap();
        assert!(matches!(
            screen.warnings(),
            [LayoutWarning::ContentClamped { .. }]
        ));
    }

    #[test]
    fn removing_a_node_drops_its_style() {
        let (mut screen, _root, label) = screen_with_label("hi");
        screen.render_frame().unwrap();
        assert!(screen.resolved_style(label).is_some());

        screen.dom.remove(label);
        screen.render_frame().unwrap();
        assert!(screen.resolved_style(label).is_none());
    }

    #[test]
    fn margin_shorthand_from_css_reaches_layout() {
        let (mut screen, _root, label) = screen_with_label("hi");
        screen
            .load_stylesheet("Label { margin: 1; height: 1; }", false)
            .unwrap();
        screen.render_frame().unwrap();
        let margin = screen.resolved_style(label).unwrap().margin;
        assert_eq!(margin, ScalarBox::all(Scalar::cells(1.0)));
        assert_eq!(screen.layout.region(label), Some(Region::new(1, 1, 8, 1)));
    }
}
