//! [`CellBuffer`]: a full frame of styled cells, row-major.

use crate::geometry::{Region, Size};
use crate::render::strip::{CellStyle, Strip, StyledCell};

// ---------------------------------------------------------------------------
// CellBuffer
// ---------------------------------------------------------------------------

/// One frame's worth of cells. Two of these make the double buffer: the
/// compositor fills `current`, the diff reads `previous`, and the frames
/// trade places by swap, never by copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellBuffer {
    width: i32,
    height: i32,
    cells: Vec<StyledCell>,
}

impl CellBuffer {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![StyledCell::blank(); (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The whole buffer as a region at the origin.
    pub fn region(&self) -> Region {
        Region::new(0, 0, self.width, self.height)
    }

    /// Reallocate to a new size, blanking every cell.
    pub fn resize(&mut self, width: i32, height: i32) {
        let width = width.max(0);
        let height = height.max(0);
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize((width * height) as usize, StyledCell::blank());
    }

    /// Reset every cell to an unstyled blank without reallocating.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = StyledCell::blank();
        }
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&StyledCell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn set(&mut self, x: i32, y: i32, cell: StyledCell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    /// One row of cells. Empty when `y` is out of range.
    pub fn line(&self, y: i32) -> &[StyledCell] {
        match self.index(0, y) {
            Some(start) => &self.cells[start..start + self.width as usize],
            None => &[],
        }
    }

    /// Overwrite a region with styled blanks (background fill). The region
    /// is clipped to the buffer.
    pub fn fill_region(&mut self, region: Region, style: CellStyle) {
        let region = region.intersection(&self.region());
        for y in region.y..region.bottom() {
            for x in region.x..region.right() {
                self.set(x, y, StyledCell::blank_styled(style.clone()));
            }
        }
    }

    /// Blit a strip, clipped to `clip` and to the buffer. Replace semantics:
    /// each written cell overwrites whatever was there.
    pub fn blit(&mut self, strip: &Strip, clip: Region) {
        let clip = clip.intersection(&self.region());
        if clip.is_empty() || strip.y < clip.y || strip.y >= clip.bottom() {
            return;
        }
        let cropped = strip.crop(clip.x, clip.right());
        for (i, cell) in cropped.cells.iter().enumerate() {
            self.set(cropped.x_offset + i as i32, cropped.y, cell.clone());
        }
    }

    /// Render to plain text, one line per row. Styles are dropped. Test and
    /// debugging aid.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity((self.width as usize + 1) * self.height as usize);
        for y in 0..self.height {
            for cell in self.line(y) {
                out.push(cell.ch);
            }
            if y + 1 < self.height {
                out.push('\n');
            }
        }
        out
    }
}

// ===========================================================================
// Tests
// ===========================================================================
