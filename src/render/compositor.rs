//! The compositor: flattens the laid-out tree into a cell buffer, then diffs
//! against the previous frame.
//!
//! Nodes paint in document order with siblings stable-sorted by `z-index`,
//! so a later or higher sibling overwrites earlier cells outright (replace
//! semantics; there is no blending). Widget strips are cached per node and
//! only regenerated when the node is paint-dirty or its content box moved.
//! The two frame buffers trade places by swap after every diff.

use std::collections::HashSet;

use slotmap::SecondaryMap;

use crate::css::styles::{BorderKind, Display, Overflow, ResolvedStyle, Visibility};
use crate::dom::node::NodeId;
use crate::dom::tree::Dom;
use crate::geometry::{Offset, Region, Size};
use crate::layout::engine::{LayoutEngine, StyleMap, WidgetMap};
use crate::render::buffer::CellBuffer;
use crate::render::diff::{diff, TermOp};
use crate::render::strip::{CellStyle, Strip, StyledCell};

// ---------------------------------------------------------------------------
// Border glyphs
// ---------------------------------------------------------------------------

struct BorderGlyphs {
    top_left: char,
    top_right: char,
    bottom_left: char,
    bottom_right: char,
    horizontal: char,
    vertical: char,
}

fn border_glyphs(kind: BorderKind) -> Option<BorderGlyphs> {
    let (top_left, top_right, bottom_left, bottom_right, horizontal, vertical) = match kind {
        BorderKind::None => return None,
        BorderKind::Thin => ('┌', '┐', '└', '┘', '─', '│'),
        BorderKind::Heavy => ('┏', '┓', '┗', '┛', '━', '┃'),
        BorderKind::Double => ('╔', '╗', '╚', '╝', '═', '║'),
        BorderKind::Round => ('╭', '╮', '╰', '╯', '─', '│'),
        BorderKind::Ascii => ('+', '+', '+', '+', '-', '|'),
    };
    Some(BorderGlyphs {
        top_left,
        top_right,
        bottom_left,
        bottom_right,
        horizontal,
        vertical,
    })
}

// ---------------------------------------------------------------------------
// Compositor
// ---------------------------------------------------------------------------

/// Double-buffered frame compositor.
pub struct Compositor {
    current: CellBuffer,
    previous: CellBuffer,
    /// Widget paint output per node, keyed by the content box it was painted
    /// for. Stale entries (moved box, paint-dirty node) are regenerated.
    cache: SecondaryMap<NodeId, (Region, Vec<Strip>)>,
}

impl Compositor {
    pub fn new(size: Size) -> Self {
        Self {
            current: CellBuffer::new(size.width, size.height),
            previous: CellBuffer::new(size.width, size.height),
            cache: SecondaryMap::new(),
        }
    }

    pub fn size(&self) -> Size {
        self.current.size()
    }

    /// Resize both frame buffers. The next diff repaints everything.
    pub fn resize(&mut self, size: Size) {
        self.current.resize(size.width, size.height);
        self.previous.resize(size.width, size.height);
    }

    /// The frame most recently produced by [`render`](Self::render).
    pub fn last_frame(&self) -> &CellBuffer {
        &self.previous
    }

    /// Composite the tree and diff against the previous frame.
    ///
    /// `paint_dirty` names nodes whose widget output must be regenerated;
    /// everything else reuses cached strips. Returns the minimal terminal
    /// ops for the frame, then swaps the buffers.
    pub fn render(
        &mut self,
        dom: &Dom,
        styles: &StyleMap,
        widgets: &WidgetMap,
        layout: &LayoutEngine,
        paint_dirty: &HashSet<NodeId>,
    ) -> Vec<TermOp> {
        self.prune(dom);
        self.current.clear();

        if let Some(root) = dom.root() {
            let clip = self.current.region();
            let frame = PaintFrame {
                dom,
                styles,
                widgets,
                layout,
                paint_dirty,
                default_style: ResolvedStyle::default(),
            };
            self.paint_node(&frame, root, clip, Offset::ZERO);
        }

        let ops = diff(&self.previous, &self.current);
        std::mem::swap(&mut self.previous, &mut self.current);
        ops
    }

    fn prune(&mut self, dom: &Dom) {
        let gone: Vec<NodeId> = self
            .cache
            .keys()
            .filter(|&node| !dom.contains(node))
            .collect();
        for node in gone {
            self.cache.remove(node);
        }
    }

    fn paint_node(&mut self, frame: &PaintFrame, node: NodeId, clip: Region, translate: Offset) {
        let style = frame.style(node);
        if style.display == Display::None || style.visibility == Visibility::Hidden {
            return;
        }
        let data = match frame.dom.get(node) {
            Some(data) => data,
            None => return,
        };
        if !data.visible {
            return;
        }
        let geometry = match frame.layout.geometry(node) {
            Some(geometry) => *geometry,
            None => return,
        };

        let region = geometry.region.translate(translate);
        let content = geometry.content.translate(translate);
        let node_clip = clip.intersection(&region);

        if style.background.is_some() {
            self.current
                .fill_region(node_clip, CellStyle::from_resolved(style));
        }
        self.paint_border(style, region, node_clip);
        self.paint_widget(frame, node, style, geometry.content, translate, clip.intersection(&content));

        // Children of a clipping container are confined to its content box;
        // overflow: visible lets them spill into the parent's clip.
        let clips_children =
            style.overflow_x != Overflow::Visible || style.overflow_y != Overflow::Visible;
        let child_clip = if clips_children {
            clip.intersection(&content)
        } else {
            clip
        };
        let child_translate = match frame.layout.scroll(node) {
            Some(state) => translate - state.offset(),
            None => translate,
        };

        let mut order: Vec<NodeId> = frame.dom.children(node).to_vec();
        order.sort_by_key(|&child| frame.dom.get(child).map_or(0, |d| d.z_index));
        for child in order {
            self.paint_node(frame, child, child_clip, child_translate);
        }
    }

    fn paint_border(&mut self, style: &ResolvedStyle, region: Region, clip: Region) {
        let glyphs = match border_glyphs(style.border.kind) {
            Some(glyphs) => glyphs,
            None => return,
        };
        if region.width < 1 || region.height < 1 {
            return;
        }
        let cell_style = CellStyle {
            fg: style.border.color.clone().or_else(|| style.color.clone()),
            bg: style.background.clone(),
            ..Default::default()
        };
        let mut put = |x: i32, y: i32, ch: char| {
            if clip.contains(x, y) {
                self.current.set(x, y, StyledCell::new(ch, cell_style.clone()));
            }
        };

        let top = region.y;
        let bottom = region.bottom() - 1;
        let left = region.x;
        let right = region.right() - 1;

        for x in left + 1..right {
            put(x, top, glyphs.horizontal);
            put(x, bottom, glyphs.horizontal);
        }
        for y in top + 1..bottom {
            put(left, y, glyphs.vertical);
            put(right, y, glyphs.vertical);
        }
        put(left, top, glyphs.top_left);
        put(right, top, glyphs.top_right);
        put(left, bottom, glyphs.bottom_left);
        put(right, bottom, glyphs.bottom_right);
    }

    /// Blit the node's widget strips, regenerating them first when the node
    /// is paint-dirty or its content box moved since they were cached.
    fn paint_widget(
        &mut self,
        frame: &PaintFrame,
        node: NodeId,
        style: &ResolvedStyle,
        content: Region,
        translate: Offset,
        clip: Region,
    ) {
        let widget = match frame.widgets.get(node) {
            Some(widget) => widget,
            None => return,
        };

        let stale = frame.paint_dirty.contains(&node)
            || self.cache.get(node).map(|(region, _)| *region) != Some(content);
        if stale {
            let strips = widget.paint(content, style);
            self.cache.insert(node, (content, strips));
        }

        let (_, strips) = &self.cache[node];
        if translate == Offset::ZERO {
            for strip in strips {
                self.current.blit(strip, clip);
            }
        } else {
            for strip in strips {
                let moved = Strip {
                    y: strip.y + translate.y,
                    x_offset: strip.x_offset + translate.x,
                    cells: strip.cells.clone(),
                };
                self.current.blit(&moved, clip);
            }
        }
    }
}

/// Immutable inputs for one composite pass.
struct PaintFrame<'a> {
    dom: &'a Dom,
    styles: &'a StyleMap,
    widgets: &'a WidgetMap,
    layout: &'a LayoutEngine,
    paint_dirty: &'a HashSet<NodeId>,
    default_style: ResolvedStyle,
}

impl PaintFrame<'_> {
    fn style(&self, node: NodeId) -> &ResolvedStyle {
        self.styles.get(node).unwrap_or(&self.default_style)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
