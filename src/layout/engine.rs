//! The layout solver.
//!
//! Walks the tree top-down, carving each node's border box out of the region
//! its parent allotted, then arranging children by the container's strategy:
//! vertical or horizontal stacking, edge docking, grid placement, or absolute
//! positioning against the nearest relative ancestor. All arithmetic is in
//! whole cells; fractional remainders are handed out deterministically so the
//! same tree and viewport always produce the same geometry.

use std::collections::HashSet;

use slotmap::SecondaryMap;
use tracing::warn;

use crate::css::scalar::Scalar;
use crate::css::styles::{Display, Dock, LayoutDirection, Position, ResolvedStyle};
use crate::dom::node::NodeId;
use crate::dom::tree::Dom;
use crate::error::{ConfigError, LayoutWarning};
use crate::geometry::{Offset, Region, Size, Spacing};
use crate::layout::resolve::{clamp_scalar, distribute_fractions, resolve_scalar, resolve_spacing};
use crate::widget::scroll::ScrollState;
use crate::widget::traits::Widget;

/// Per-node resolved styles, keyed by the DOM arena.
pub type StyleMap = SecondaryMap<NodeId, ResolvedStyle>;
/// Per-node widget implementations.
pub type WidgetMap = SecondaryMap<NodeId, Box<dyn Widget>>;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A node's solved placement.
///
/// Inside a scroll container, coordinates are virtual: children are placed as
/// if the scroll offset were zero, and the compositor translates at paint
/// time. Everywhere else they are screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Border box: margin already subtracted by the parent.
    pub region: Region,
    /// Content box: border box minus border and padding, clamped to zero.
    pub content: Region,
    /// Extent children were laid into. Exceeds `content.size()` only for
    /// scroll containers with overflowing content.
    pub virtual_size: Size,
}

// ---------------------------------------------------------------------------
// LayoutEngine
// ---------------------------------------------------------------------------

/// Owns solved geometry and scroll state across frames.
///
/// [`LayoutEngine::compute`] is incremental: subtrees that are not dirty and
/// whose border box did not move keep their cached geometry untouched.
#[derive(Default)]
pub struct LayoutEngine {
    geometry: SecondaryMap<NodeId, Geometry>,
    scroll: SecondaryMap<NodeId, ScrollState>,
    warnings: Vec<LayoutWarning>,
    viewport: Size,
}

/// Immutable inputs for one layout pass.
struct Pass<'a> {
    dom: &'a Dom,
    styles: &'a StyleMap,
    widgets: &'a WidgetMap,
    viewport: Size,
    /// Nodes to re-solve; `None` re-solves everything.
    affected: Option<HashSet<NodeId>>,
    default_style: ResolvedStyle,
}

#[derive(Clone, Copy, PartialEq)]
enum Axis {
    Vertical,
    Horizontal,
}

fn is_sized(scalar: Scalar) -> bool {
    !scalar.is_auto() && !scalar.is_fraction()
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Solve geometry for the whole tree.
    ///
    /// `dirty` lists layout-dirty nodes; clean subtrees whose allotted region
    /// did not move are skipped. A viewport change forces a full pass.
    /// Warnings from the previous pass are discarded.
    pub fn compute(
        &mut self,
        dom: &Dom,
        styles: &StyleMap,
        widgets: &WidgetMap,
        viewport: Size,
        dirty: &HashSet<NodeId>,
    ) -> Result<(), ConfigError> {
        self.warnings.clear();
        self.prune(dom);

        let full_pass = viewport != self.viewport || self.geometry.is_empty();
        self.viewport = viewport;

        let root = match dom.root() {
            Some(root) => root,
            None => return Ok(()),
        };

        let affected = if full_pass {
            None
        } else {
            let mut set = dirty.clone();
            for &node in dirty {
                set.extend(dom.ancestors(node));
            }
            Some(set)
        };

        let pass = Pass {
            dom,
            styles,
            widgets,
            viewport,
            affected,
            default_style: ResolvedStyle::default(),
        };

        let root_margin = resolve_spacing(&pass.style(root).margin, viewport.width, viewport);
        self.place(&pass, root, viewport.to_region().shrink(root_margin))
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn geometry(&self, node: NodeId) -> Option<&Geometry> {
        self.geometry.get(node)
    }

    /// Border box, when the node was laid out this or an earlier pass.
    pub fn region(&self, node: NodeId) -> Option<Region> {
        self.geometry.get(node).map(|g| g.region)
    }

    pub fn content_region(&self, node: NodeId) -> Option<Region> {
        self.geometry.get(node).map(|g| g.content)
    }

    /// Warnings recorded by the most recent [`compute`](Self::compute).
    pub fn warnings(&self) -> &[LayoutWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<LayoutWarning> {
        std::mem::take(&mut self.warnings)
    }

    pub fn scroll(&self, node: NodeId) -> Option<&ScrollState> {
        self.scroll.get(node)
    }

    /// Scroll a container by a delta, clamped. Returns whether the offset
    /// moved; callers mark the node paint-dirty when it did.
    pub fn scroll_by(&mut self, node: NodeId, delta: Offset) -> bool {
        self.scroll
            .get_mut(node)
            .is_some_and(|state| state.scroll_by(delta))
    }

    pub fn scroll_to(&mut self, node: NodeId, offset: Offset) -> bool {
        self.scroll
            .get_mut(node)
            .is_some_and(|state| state.scroll_to(offset))
    }

    /// Drop cached state for nodes no longer in the tree.
    fn prune(&mut self, dom: &Dom) {
        let gone: Vec<NodeId> = self
            .geometry
            .keys()
            .filter(|&node| !dom.contains(node))
            .collect();
        for node in gone {
            self.geometry.remove(node);
            self.scroll.remove(node);
        }
    }

    /// Lay out `node` into the border box `region`, then its children.
    fn place(&mut self, pass: &Pass, node: NodeId, region: Region) -> Result<(), ConfigError> {
        let style = pass.style(node);
        if style.display == Display::None {
            self.geometry.remove(node);
            return Ok(());
        }

        let region = if style.position == Position::Relative {
            let dx = resolve_scalar(style.offset_x, pass.viewport.width, pass.viewport, 0);
            let dy = resolve_scalar(style.offset_y, pass.viewport.height, pass.viewport, 0);
            region.translate(Offset::new(dx, dy))
        } else {
            region
        };

        if let Some(affected) = &pass.affected {
            if !affected.contains(&node) {
                if let Some(cached) = self.geometry.get(node) {
                    if cached.region == region {
                        return Ok(());
                    }
                }
            }
        }

        let border = style.border.thickness();
        let padding = resolve_spacing(&style.padding, region.width, pass.viewport);
        let chrome = Spacing::new(
            border + padding.top,
            border + padding.right,
            border + padding.bottom,
            border + padding.left,
        );
        let deficit_width = (chrome.width() - region.width).max(0);
        let deficit_height = (chrome.height() - region.height).max(0);
        if deficit_width > 0 || deficit_height > 0 {
            let warning = LayoutWarning::ContentClamped {
                node,
                deficit_width,
                deficit_height,
            };
            warn!(%warning, "content clamped");
            self.warnings.push(warning);
        }
        let content = region.shrink(chrome);

        let scroll_container = style.is_scroll_container();
        let layout_region = if scroll_container {
            let natural = pass.natural_content_size(node, content.size());
            let mut size = content.size();
            if style.overflow_x.scrolls() {
                size.width = size.width.max(natural.width);
            }
            if style.overflow_y.scrolls() {
                size.height = size.height.max(natural.height);
            }
            Region::new(content.x, content.y, size.width, size.height)
        } else {
            content
        };

        self.geometry.insert(
            node,
            Geometry {
                region,
                content,
                virtual_size: layout_region.size(),
            },
        );

        if scroll_container {
            if !self.scroll.contains_key(node) {
                self.scroll.insert(node, ScrollState::new());
            }
            let state = &mut self.scroll[node];
            state.set_viewport_size(content.size());
            state.set_content_size(layout_region.size());
        } else {
            self.scroll.remove(node);
        }

        self.layout_children(pass, node, style.layout, layout_region)
    }

    /// Partition children into docked, flow, and absolute, then arrange each
    /// group. Docked children claim edges first (one child per edge; extras
    /// fall back into the flow); flow children follow the container strategy
    /// in the remaining region; absolute children are placed last against
    /// their anchors.
    fn layout_children(
        &mut self,
        pass: &Pass,
        node: NodeId,
        layout: LayoutDirection,
        content: Region,
    ) -> Result<(), ConfigError> {
        let mut inner = content;
        let mut claimed = [false; 4];
        let mut flow = Vec::new();
        let mut absolute = Vec::new();

        for &child in pass.dom.children(node) {
            let cs = pass.style(child);
            if cs.display == Display::None {
                self.geometry.remove(child);
                continue;
            }
            if cs.position == Position::Absolute {
                absolute.push(child);
                continue;
            }
            if let Some(edge) = cs.dock {
                let slot = match edge {
                    Dock::Top => 0,
                    Dock::Right => 1,
                    Dock::Bottom => 2,
                    Dock::Left => 3,
                };
                if !claimed[slot] {
                    claimed[slot] = true;
                    inner = self.dock_child(pass, child, edge, inner)?;
                    continue;
                }
                warn!(child = ?child, edge = ?edge, "dock edge already claimed; laying out in flow");
            }
            flow.push(child);
        }

        match layout {
            LayoutDirection::Vertical => self.layout_stack(pass, &flow, inner, Axis::Vertical)?,
            LayoutDirection::Horizontal => {
                self.layout_stack(pass, &flow, inner, Axis::Horizontal)?
            }
            LayoutDirection::Grid => self.layout_grid(pass, node, &flow, inner)?,
        }

        for child in absolute {
            self.layout_absolute(pass, child)?;
        }
        Ok(())
    }

    /// Give a docked child its band along `edge` and return what is left.
    fn dock_child(
        &mut self,
        pass: &Pass,
        child: NodeId,
        edge: Dock,
        inner: Region,
    ) -> Result<Region, ConfigError> {
        let cs = pass.style(child);
        let margin = resolve_spacing(&cs.margin, inner.width, pass.viewport);

        match edge {
            Dock::Top | Dock::Bottom => {
                let main = if is_sized(cs.height) {
                    resolve_scalar(cs.height, inner.height, pass.viewport, 0)
                } else {
                    pass.natural_size(child, inner.size()).height
                };
                let main = clamp_scalar(main, cs.min_height, cs.max_height, inner.height, pass.viewport)
                    .max(0);
                let outer = (main + margin.height()).min(inner.height);
                let band_y = match edge {
                    Dock::Top => inner.y,
                    _ => inner.bottom() - outer,
                };
                let band = Region::new(inner.x, band_y, inner.width, outer);
                self.place(pass, child, band.shrink(margin))?;
                let rest = match edge {
                    Dock::Top => Region::new(inner.x, inner.y + outer, inner.width, inner.height - outer),
                    _ => Region::new(inner.x, inner.y, inner.width, inner.height - outer),
                };
                Ok(rest)
            }
            Dock::Left | Dock::Right => {
                let main = if is_sized(cs.width) {
                    resolve_scalar(cs.width, inner.width, pass.viewport, 0)
                } else {
                    pass.natural_size(child, inner.size()).width
                };
                let main = clamp_scalar(main, cs.min_width, cs.max_width, inner.width, pass.viewport)
                    .max(0);
                let outer = (main + margin.width()).min(inner.width);
                let band_x = match edge {
                    Dock::Left => inner.x,
                    _ => inner.right() - outer,
                };
                let band = Region::new(band_x, inner.y, outer, inner.height);
                self.place(pass, child, band.shrink(margin))?;
                let rest = match edge {
                    Dock::Left => Region::new(inner.x + outer, inner.y, inner.width - outer, inner.height),
                    _ => Region::new(inner.x, inner.y, inner.width - outer, inner.height),
                };
                Ok(rest)
            }
        }
    }

    /// Stack flow children along one axis.
    ///
    /// Fixed and auto children are measured first; the remaining main-axis
    /// cells are split over fractional children by weight, with the floor
    /// remainder handed out one cell each to the first fractional children in
    /// document order. The cross axis fills unless a size is declared.
    fn layout_stack(
        &mut self,
        pass: &Pass,
        children: &[NodeId],
        inner: Region,
        axis: Axis,
    ) -> Result<(), ConfigError> {
        let main_extent = match axis {
            Axis::Vertical => inner.height,
            Axis::Horizontal => inner.width,
        };
        let cross_extent = match axis {
            Axis::Vertical => inner.width,
            Axis::Horizontal => inner.height,
        };

        let mut margins = Vec::with_capacity(children.len());
        let mut fixed: Vec<Option<i32>> = Vec::with_capacity(children.len());
        let mut weights = Vec::new();
        let mut used = 0;

        for &child in children {
            let cs = pass.style(child);
            let margin = resolve_spacing(&cs.margin, inner.width, pass.viewport);
            let margin_main = match axis {
                Axis::Vertical => margin.height(),
                Axis::Horizontal => margin.width(),
            };
            let (scalar, min, max) = match axis {
                Axis::Vertical => (cs.height, cs.min_height, cs.max_height),
                Axis::Horizontal => (cs.width, cs.min_width, cs.max_width),
            };
            margins.push(margin);

            if scalar.is_fraction() {
                weights.push(scalar.value.max(0.0));
                used += margin_main;
                fixed.push(None);
            } else {
                let main = if scalar.is_auto() {
                    let natural = pass.natural_size(child, inner.size());
                    match axis {
                        Axis::Vertical => natural.height,
                        Axis::Horizontal => natural.width,
                    }
                } else {
                    resolve_scalar(scalar, main_extent, pass.viewport, 0)
                };
                let main = clamp_scalar(main, min, max, main_extent, pass.viewport).max(0);
                used += main + margin_main;
                fixed.push(Some(main));
            }
        }

        let shares = distribute_fractions(main_extent - used, &weights);
        let mut share_iter = shares.into_iter();

        let mut cursor = match axis {
            Axis::Vertical => inner.y,
            Axis::Horizontal => inner.x,
        };
        for ((&child, &main), margin) in children.iter().zip(&fixed).zip(&margins) {
            let cs = pass.style(child);
            let main = match main {
                Some(main) => main,
                None => {
                    let (min, max) = match axis {
                        Axis::Vertical => (cs.min_height, cs.max_height),
                        Axis::Horizontal => (cs.min_width, cs.max_width),
                    };
                    let share = share_iter.next().unwrap_or(0);
                    clamp_scalar(share, min, max, main_extent, pass.viewport).max(0)
                }
            };

            let (cross_scalar, cross_min, cross_max, margin_cross) = match axis {
                Axis::Vertical => (cs.width, cs.min_width, cs.max_width, margin.width()),
                Axis::Horizontal => (cs.height, cs.min_height, cs.max_height, margin.height()),
            };
            let cross = if is_sized(cross_scalar) {
                resolve_scalar(cross_scalar, cross_extent, pass.viewport, 0)
            } else {
                cross_extent - margin_cross
            };
            let cross = clamp_scalar(cross, cross_min, cross_max, cross_extent, pass.viewport).max(0);

            let border_box = match axis {
                Axis::Vertical => {
                    Region::new(inner.x + margin.left, cursor + margin.top, cross, main)
                }
                Axis::Horizontal => {
                    Region::new(cursor + margin.left, inner.y + margin.top, main, cross)
                }
            };
            self.place(pass, child, border_box)?;

            let margin_main = match axis {
                Axis::Vertical => margin.height(),
                Axis::Horizontal => margin.width(),
            };
            cursor += main + margin_main;
        }
        Ok(())
    }

    /// Place flow children on the container's grid template.
    ///
    /// An empty template axis defaults to a single `1fr` track. Children are
    /// placed row-major into the first free run of cells that fits their
    /// span; a span of zero, a span wider than the template, or a grid with
    /// no free fit is a configuration error, never a clamp.
    fn layout_grid(
        &mut self,
        pass: &Pass,
        node: NodeId,
        children: &[NodeId],
        inner: Region,
    ) -> Result<(), ConfigError> {
        let one_fr = vec![Scalar::fr(1.0)];
        let template = pass.style(node);
        let rows_template = if template.grid_rows.is_empty() {
            &one_fr
        } else {
            &template.grid_rows
        };
        let cols_template = if template.grid_columns.is_empty() {
            &one_fr
        } else {
            &template.grid_columns
        };

        let row_sizes = resolve_tracks(rows_template, inner.height, pass.viewport);
        let col_sizes = resolve_tracks(cols_template, inner.width, pass.viewport);
        let row_offsets = prefix_offsets(&row_sizes);
        let col_offsets = prefix_offsets(&col_sizes);
        let rows = row_sizes.len();
        let cols = col_sizes.len();

        let mut occupied = vec![false; rows * cols];
        let is_free = |occupied: &[bool], r: usize, c: usize, rs: usize, cs: usize| {
            (r..r + rs).all(|row| (c..c + cs).all(|col| !occupied[row * cols + col]))
        };

        for &child in children {
            let style = pass.style(child);
            let row_span = style.row_span as usize;
            let col_span = style.column_span as usize;
            if row_span == 0 || col_span == 0 {
                return Err(ConfigError::GridSpan {
                    node: child,
                    message: "span must be at least 1".into(),
                });
            }
            if row_span > rows || col_span > cols {
                return Err(ConfigError::GridSpan {
                    node: child,
                    message: format!(
                        "span {row_span}x{col_span} exceeds template {rows}x{cols}"
                    ),
                });
            }

            let mut slot = None;
            'scan: for r in 0..=rows - row_span {
                for c in 0..=cols - col_span {
                    if is_free(&occupied, r, c, row_span, col_span) {
                        slot = Some((r, c));
                        break 'scan;
                    }
                }
            }
            let (r, c) = slot.ok_or_else(|| ConfigError::GridSpan {
                node: child,
                message: "no free cell fits the span".into(),
            })?;
            for row in r..r + row_span {
                for col in c..c + col_span {
                    occupied[row * cols + col] = true;
                }
            }

            let cell = Region::new(
                inner.x + col_offsets[c],
                inner.y + row_offsets[r],
                col_offsets[c + col_span] - col_offsets[c],
                row_offsets[r + row_span] - row_offsets[r],
            );
            let margin = resolve_spacing(&style.margin, cell.width, pass.viewport);
            let avail = cell.shrink(margin);
            let width = if is_sized(style.width) {
                resolve_scalar(style.width, avail.width, pass.viewport, 0)
            } else {
                avail.width
            };
            let width = clamp_scalar(width, style.min_width, style.max_width, avail.width, pass.viewport)
                .clamp(0, avail.width);
            let height = if is_sized(style.height) {
                resolve_scalar(style.height, avail.height, pass.viewport, 0)
            } else {
                avail.height
            };
            let height =
                clamp_scalar(height, style.min_height, style.max_height, avail.height, pass.viewport)
                    .clamp(0, avail.height);

            self.place(pass, child, Region::new(avail.x, avail.y, width, height))?;
        }
        Ok(())
    }

    /// Place an absolute node against its anchor: the nearest ancestor with
    /// `position: relative`, or the root region when there is none.
    fn layout_absolute(&mut self, pass: &Pass, node: NodeId) -> Result<(), ConfigError> {
        let style = pass.style(node);
        let anchor = self.anchor_region(pass, node);
        let margin = resolve_spacing(&style.margin, anchor.width, pass.viewport);
        let natural = pass.natural_size(node, anchor.size());

        let width = if is_sized(style.width) {
            resolve_scalar(style.width, anchor.width, pass.viewport, 0)
        } else {
            natural.width
        };
        let width =
            clamp_scalar(width, style.min_width, style.max_width, anchor.width, pass.viewport).max(0);
        let height = if is_sized(style.height) {
            resolve_scalar(style.height, anchor.height, pass.viewport, 0)
        } else {
            natural.height
        };
        let height =
            clamp_scalar(height, style.min_height, style.max_height, anchor.height, pass.viewport)
                .max(0);

        let dx = resolve_scalar(style.offset_x, anchor.width, pass.viewport, 0);
        let dy = resolve_scalar(style.offset_y, anchor.height, pass.viewport, 0);
        let border_box = Region::new(
            anchor.x + dx + margin.left,
            anchor.y + dy + margin.top,
            width,
            height,
        );
        self.place(pass, node, border_box)
    }

    fn anchor_region(&self, pass: &Pass, node: NodeId) -> Region {
        for ancestor in pass.dom.ancestors(node) {
            if pass.style(ancestor).position == Position::Relative {
                if let Some(geometry) = self.geometry.get(ancestor) {
                    return geometry.region;
                }
            }
        }
        pass.viewport.to_region()
    }
}

impl Pass<'_> {
    fn style(&self, node: NodeId) -> &ResolvedStyle {
        self.styles.get(node).unwrap_or(&self.default_style)
    }

    /// Natural border-box size of a node: declared sizes where given, widget
    /// intrinsics or stacked child sizes elsewhere, plus chrome.
    fn natural_size(&self, node: NodeId, available: Size) -> Size {
        let style = self.style(node);
        if style.display == Display::None {
            return Size::ZERO;
        }
        let border = style.border.thickness();
        let padding = resolve_spacing(&style.padding, available.width, self.viewport);
        let chrome_width = border * 2 + padding.width();
        let chrome_height = border * 2 + padding.height();
        let avail_content = Size::new(
            (available.width - chrome_width).max(0),
            (available.height - chrome_height).max(0),
        );

        let intrinsic = self.natural_content_size(node, avail_content);

        let width = if is_sized(style.width) {
            resolve_scalar(style.width, available.width, self.viewport, 0)
        } else {
            intrinsic.width + chrome_width
        };
        let height = if is_sized(style.height) {
            resolve_scalar(style.height, available.height, self.viewport, 0)
        } else {
            intrinsic.height + chrome_height
        };
        Size::new(
            clamp_scalar(width, style.min_width, style.max_width, available.width, self.viewport)
                .max(0),
            clamp_scalar(height, style.min_height, style.max_height, available.height, self.viewport)
                .max(0),
        )
    }

    /// Natural size of a node's content: stacked flow children when it has
    /// any, otherwise the widget's intrinsic size.
    fn natural_content_size(&self, node: NodeId, available: Size) -> Size {
        let children = self.dom.children(node);
        if children.is_empty() {
            return match self.widgets.get(node) {
                Some(widget) => widget.intrinsic_size(available),
                None => Size::ZERO,
            };
        }

        let horizontal = self.style(node).layout == LayoutDirection::Horizontal;
        let mut size = Size::ZERO;
        for &child in children {
            let cs = self.style(child);
            if cs.display == Display::None || cs.position == Position::Absolute {
                continue;
            }
            let margin = resolve_spacing(&cs.margin, available.width, self.viewport);
            let natural = self.natural_size(child, available);
            let outer = Size::new(natural.width + margin.width(), natural.height + margin.height());
            if horizontal {
                size.width += outer.width;
                size.height = size.height.max(outer.height);
            } else {
                size.height += outer.height;
                size.width = size.width.max(outer.width);
            }
        }
        size
    }
}

/// Resolve a track template to whole-cell track sizes. Fixed tracks first;
/// what is left goes to fractional tracks (`auto` counts as `1fr`) by the
/// same deterministic remainder rule the stack uses.
fn resolve_tracks(template: &[Scalar], extent: i32, viewport: Size) -> Vec<i32> {
    let mut sizes = vec![0; template.len()];
    let mut fractional = Vec::new();
    let mut fixed = 0;

    for (i, &track) in template.iter().enumerate() {
        if track.is_fraction() || track.is_auto() {
            let weight = if track.is_auto() { 1.0 } else { track.value.max(0.0) };
            fractional.push((i, weight));
        } else {
            let size = resolve_scalar(track, extent, viewport, 0).max(0);
            sizes[i] = size;
            fixed += size;
        }
    }

    let weights: Vec<f32> = fractional.iter().map(|&(_, w)| w).collect();
    let shares = distribute_fractions(extent - fixed, &weights);
    for ((i, _), share) in fractional.into_iter().zip(shares) {
        sizes[i] = share;
    }
    sizes
}

fn prefix_offsets(sizes: &[i32]) -> Vec<i32> {
    let mut offsets = Vec::with_capacity(sizes.len() + 1);
    let mut total = 0;
    offsets.push(0);
    for &size in sizes {
        total += size;
        offsets.push(total);
    }
    offsets
}

// ===========================================================================
// Tests
// ===========================================================================
