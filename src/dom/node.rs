//! Node data: the per-node record stored in the DOM arena.

use std::collections::HashMap;

use crate::css::model::PseudoState;

slotmap::new_key_type! {
    /// Stable handle to a node in the DOM arena. Generational: a handle to a
    /// removed node never aliases a later insertion.
    pub struct NodeId;
}

// ---------------------------------------------------------------------------
// AttrValue
// ---------------------------------------------------------------------------

/// A typed reactive attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

// ---------------------------------------------------------------------------
// NodeData
// ---------------------------------------------------------------------------

/// Everything the tree knows about one node.
///
/// Pseudo-states (`focus`, `hover`, `disabled`) are plain flags set by the
/// embedding application; the style system reads them during selector
/// matching but never infers them. Reactive attributes live in `attrs` and
/// are written through [`crate::dom::tree::Dom::set_attr`], which is where
/// compare-then-invalidate happens.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    /// Type name used by CSS type selectors, e.g. "Button".
    pub widget_type: String,
    /// Optional unique id for `#id` selectors.
    pub id: Option<String>,
    /// Classes for `.class` selectors.
    pub classes: Vec<String>,
    /// Whether the node paints and participates in focus.
    pub visible: bool,
    /// Whether the node can take keyboard focus.
    pub focusable: bool,
    /// Explicit paint order among siblings. Document order breaks ties.
    pub z_index: i32,
    pub(crate) focus: bool,
    pub(crate) hover: bool,
    pub(crate) disabled: bool,
    pub(crate) attrs: HashMap<String, AttrValue>,
}

impl NodeData {
    pub fn new(widget_type: impl Into<String>) -> Self {
        Self {
            widget_type: widget_type.into(),
            id: None,
            classes: Vec::new(),
            visible: true,
            focusable: false,
            z_index: 0,
            focus: false,
            hover: false,
            disabled: false,
            attrs: HashMap::new(),
        }
    }

    // ── Builders ─────────────────────────────────────────────────────

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_classes(mut self, classes: &[&str]) -> Self {
        self.classes.extend(classes.iter().map(|c| (*c).to_owned()));
        self
    }

    pub fn focusable(mut self, focusable: bool) -> Self {
        self.focusable = focusable;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    // ── Classes ──────────────────────────────────────────────────────

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    // ── Pseudo-states ────────────────────────────────────────────────

    /// Read one pseudo-state flag.
    pub fn state(&self, state: PseudoState) -> bool {
        match state {
            PseudoState::Focus => self.focus,
            PseudoState::Hover => self.hover,
            PseudoState::Disabled => self.disabled,
        }
    }

    pub(crate) fn set_state_flag(&mut self, state: PseudoState, on: bool) {
        match state {
            PseudoState::Focus => self.focus = on,
            PseudoState::Hover => self.hover = on,
            PseudoState::Disabled => self.disabled = on,
        }
    }

    /// Whether this node can currently take focus.
    pub fn accepts_focus(&self) -> bool {
        self.focusable && self.visible && !self.disabled
    }

    // ── Attributes ───────────────────────────────────────────────────

    /// Read a reactive attribute.
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    /// Read a string attribute, empty when unset or of another type.
    pub fn attr_text(&self, name: &str) -> &str {
        match self.attrs.get(name) {
            Some(AttrValue::Text(s)) => s,
            _ => "",
        }
    }

    /// Read a bool attribute, `false` when unset or of another type.
    pub fn attr_bool(&self, name: &str) -> bool {
        matches!(self.attrs.get(name), Some(AttrValue::Bool(true)))
    }

    /// Read an integer attribute, `0` when unset or of another type.
    pub fn attr_int(&self, name: &str) -> i64 {
        match self.attrs.get(name) {
            Some(AttrValue::Int(v)) => *v,
            _ => 0,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_node_defaults() {
        let node = NodeData::new("Button");
        assert_eq!(node.widget_type, "Button");
        assert!(node.id.is_none());
        assert!(node.classes.is_empty());
        assert!(node.visible);
        assert!(!node.focusable);
        assert_eq!(node.z_index, 0);
    }

    #[test]
    fn builders_chain() {
        let node = NodeData::new("Button")
            .with_id("ok")
            .with_classes(&["primary", "wide"])
            .focusable(true)
            .with_z_index(5);
        assert_eq!(node.id.as_deref(), Some("ok"));
        assert!(node.has_class("primary"));
        assert!(node.has_class("wide"));
        assert!(node.focusable);
        assert_eq!(node.z_index, 5);
    }

    #[test]
    fn states_default_off() {
        let node = NodeData::new("Button");
        assert!(!node.state(PseudoState::Focus));
        assert!(!node.state(PseudoState::Hover));
        assert!(!node.state(PseudoState::Disabled));
    }

    #[test]
    fn set_state_flag_roundtrip() {
        let mut node = NodeData::new("Button");
        node.set_state_flag(PseudoState::Focus, true);
        assert!(node.state(PseudoState::Focus));
        node.set_state_flag(PseudoState::Focus, false);
        assert!(!node.state(PseudoState::Focus));
    }

    #[test]
    fn accepts_focus_requires_all_three() {
        let node = NodeData::new("Button").focusable(true);
        assert!(node.accepts_focus());

        let mut hidden = NodeData::new("Button").focusable(true);
        hidden.visible = false;
        assert!(!hidden.accepts_focus());

        let disabled = NodeData::new("Button").focusable(true).disabled(true);
        assert!(!disabled.accepts_focus());
    }

    #[test]
    fn typed_attr_accessors() {
        let mut node = NodeData::new("Input");
        node.attrs.insert("value".into(), "hello".into());
        node.attrs.insert("count".into(), AttrValue::Int(3));
        node.attrs.insert("checked".into(), AttrValue::Bool(true));

        assert_eq!(node.attr_text("value"), "hello");
        assert_eq!(node.attr_int("count"), 3);
        assert!(node.attr_bool("checked"));

        // Unset or mistyped reads fall back.
        assert_eq!(node.attr_text("missing"), "");
        assert_eq!(node.attr_int("value"), 0);
        assert!(!node.attr_bool("count"));
    }
}
