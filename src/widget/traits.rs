//! The widget capability trait.
//!
//! The core ships no widget catalog. An embedding application implements
//! [`Widget`] per node kind and registers instances against DOM nodes; the
//! layout engine asks them for intrinsic sizes, the compositor asks them to
//! paint.

use crate::css::styles::ResolvedStyle;
use crate::geometry::{Region, Size};
use crate::render::strip::Strip;

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

/// Per-node behavior supplied by the embedding application.
///
/// Object-safe: instances are stored as `Box<dyn Widget>` keyed by node id.
pub trait Widget {
    /// The CSS type name, e.g. "Button". Must match the node's
    /// `widget_type` for type selectors to behave.
    fn widget_type(&self) -> &str;

    /// Natural content size given the space on offer. Consulted for
    /// `auto`-sized boxes; the result is content only, before padding and
    /// border are added back.
    fn intrinsic_size(&self, available: Size) -> Size;

    /// Paint the content box into strips. `region` is the node's content
    /// region in screen coordinates; the compositor clips whatever sticks
    /// out.
    fn paint(&self, region: Region, style: &ResolvedStyle) -> Vec<Strip>;

    /// Attribute names whose changes this widget's paint depends on.
    /// Advisory; the tree's dirty tracking is what actually drives repaints.
    fn reacts_to(&self) -> &[&str] {
        &[]
    }

    /// Whether this widget kind takes keyboard focus by default.
    fn can_focus(&self) -> bool {
        false
    }
}

// ===========================================================================
// Tests
// ===========================================================================
