//! Line diffing: previous frame vs current frame → minimal terminal ops.
//!
//! Per row: identical rows emit nothing; a changed row is reduced to the
//! span between its longest common prefix and suffix, then the span is
//! emitted as style runs so each style is set once per run. The whole-frame
//! op list also dedups styles across runs: a run continuing the previous
//! style emits no `SetStyle`.

use crate::render::buffer::CellBuffer;
use crate::render::strip::{CellStyle, StyledCell};

// ---------------------------------------------------------------------------
// TermOp
// ---------------------------------------------------------------------------

/// One terminal output operation. The driver executes these in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermOp {
    /// Move the cursor to column `x`, row `y`.
    MoveTo { x: u16, y: u16 },
    /// Change the active style for subsequent prints.
    SetStyle(CellStyle),
    /// Print text under the active style. Advances the cursor.
    Print(String),
}

// ---------------------------------------------------------------------------
// diff
// ---------------------------------------------------------------------------

/// Compute the ops that transform `previous` into `current` on screen.
///
/// Identical buffers produce no ops. A size change repaints everything:
/// there is no previous content worth diffing against.
pub fn diff(previous: &CellBuffer, current: &CellBuffer) -> Vec<TermOp> {
    let mut ops = Vec::new();
    let mut last_style: Option<&CellStyle> = None;

    let full_repaint = previous.size() != current.size();
    for y in 0..current.height() {
        let cur = current.line(y);
        let (start, end) = if full_repaint {
            (0, cur.len())
        } else {
            let prev = previous.line(y);
            match changed_span(prev, cur) {
                Some(span) => span,
                None => continue,
            }
        };

        ops.push(TermOp::MoveTo {
            x: start as u16,
            y: y as u16,
        });
        emit_runs(&cur[start..end], &mut ops, &mut last_style);
    }
    ops
}

/// The half-open `[start, end)` span where two equal-length lines differ, or
/// `None` when they match. Longest common prefix and suffix are stripped;
/// the suffix never overlaps the prefix.
fn changed_span(prev: &[StyledCell], cur: &[StyledCell]) -> Option<(usize, usize)> {
    debug_assert_eq!(prev.len(), cur.len());
    let len = cur.len();

    let start = prev.iter().zip(cur).position(|(a, b)| a != b)?;
    let tail = prev
        .iter()
        .rev()
        .zip(cur.iter().rev())
        .take(len - start - 1)
        .take_while(|(a, b)| a == b)
        .count();
    Some((start, len - tail))
}

/// Append the span's cells as style-batched prints.
fn emit_runs<'a>(
    cells: &'a [StyledCell],
    ops: &mut Vec<TermOp>,
    last_style: &mut Option<&'a CellStyle>,
) {
    let mut text = String::new();
    for cell in cells {
        if Some(&cell.style) != *last_style {
            if !text.is_empty() {
                ops.push(TermOp::Print(std::mem::take(&mut text)));
            }
            ops.push(TermOp::SetStyle(cell.style.clone()));
            *last_style = Some(&cell.style);
        }
        text.push(cell.ch);
    }
    if !text.is_empty() {
        ops.push(TermOp::Print(text));
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::strip::StyledCell;

    fn red() -> CellStyle {
        CellStyle {
            fg: Some("red".into()),
            ..Default::default()
        }
    }

    fn buffer(lines: &[&str]) -> CellBuffer {
        let width = lines.first().map_or(0, |l| l.len() as i32);
        let mut buf = CellBuffer::new(width, lines.len() as i32);
        for (y, line) in lines.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                buf.set(x as i32, y as i32, StyledCell::new(ch, CellStyle::default()));
            }
        }
        buf
    }

    fn prints(ops: &[TermOp]) -> Vec<&str> {
        ops.iter()
            .filter_map(|op| match op {
                TermOp::Print(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn identical_buffers_no_ops() {
        let a = buffer(&["hello", "world"]);
        let b = a.clone();
        assert!(diff(&a, &b).is_empty());
    }

    #[test]
    fn single_cell_change_emits_one_span() {
        let a = buffer(&["hello world"]);
        let b = buffer(&["hello_world"]);
        let ops = diff(&a, &b);
        assert_eq!(
            ops,
            vec![
                TermOp::MoveTo { x: 5, y: 0 },
                TermOp::SetStyle(CellStyle::default()),
                TermOp::Print("_".into()),
            ]
        );
    }

    #[test]
    fn span_covers_first_to_last_change() {
        let a = buffer(&["abcdefgh"]);
        let b = buffer(&["abXdefYh"]);
        let ops = diff(&a, &b);
        assert_eq!(ops[0], TermOp::MoveTo { x: 2, y: 0 });
        assert_eq!(prints(&ops), vec!["XdefY"]);
    }

    #[test]
    fn unchanged_lines_are_skipped() {
        let a = buffer(&["one", "two", "three"]);
        let mut b = a.clone();
        b.set(0, 1, StyledCell::new('T', CellStyle::default()));
        let ops = diff(&a, &b);
        let moves: Vec<_> = ops
            .iter()
            .filter(|op| matches!(op, TermOp::MoveTo { .. }))
            .collect();
        assert_eq!(moves, vec![&TermOp::MoveTo { x: 0, y: 1 }]);
    }

    #[test]
    fn style_only_change_is_detected() {
        let a = buffer(&["hi"]);
        let mut b = a.clone();
        b.set(1, 0, StyledCell::new('i', red()));
        let ops = diff(&a, &b);
        assert_eq!(ops[0], TermOp::MoveTo { x: 1, y: 0 });
        assert!(ops.contains(&TermOp::SetStyle(red())));
    }

    #[test]
    fn style_runs_batch_within_span() {
        let mut a = buffer(&["....."]);
        let mut b = buffer(&["....."]);
        // Make all five cells change, with cells 1-3 styled red in `b`.
        for x in 0..5 {
            a.set(x, 0, StyledCell::new('o', CellStyle::default()));
        }
        b.set(0, 0, StyledCell::new('x', CellStyle::default()));
        for x in 1..4 {
            b.set(x, 0, StyledCell::new('x', red()));
        }
        b.set(4, 0, StyledCell::new('x', CellStyle::default()));

        let ops = diff(&a, &b);
        // One move, three runs: default "x", red "xxx", default "x".
        assert_eq!(prints(&ops), vec!["x", "xxx", "x"]);
        let set_count = ops
            .iter()
            .filter(|op| matches!(op, TermOp::SetStyle(_)))
            .count();
        assert_eq!(set_count, 3);
    }

    #[test]
    fn style_persists_across_lines() {
        let a = buffer(&["ab", "cd"]);
        let b = buffer(&["xb", "xd"]);
        let ops = diff(&a, &b);
        // Both changed cells are default-styled; the style is set once.
        let set_count = ops
            .iter()
            .filter(|op| matches!(op, TermOp::SetStyle(_)))
            .count();
        assert_eq!(set_count, 1);
        assert_eq!(prints(&ops), vec!["x", "x"]);
    }

    #[test]
    fn resize_repaints_everything() {
        let a = buffer(&["ab"]);
        let b = buffer(&["abc", "def"]);
        let ops = diff(&a, &b);
        assert!(ops.contains(&TermOp::MoveTo { x: 0, y: 0 }));
        assert!(ops.contains(&TermOp::MoveTo { x: 0, y: 1 }));
        assert_eq!(prints(&ops), vec!["abc", "def"]);
    }

    #[test]
    fn whole_line_change() {
        let a = buffer(&["aaaa"]);
        let b = buffer(&["bbbb"]);
        let ops = diff(&a, &b);
        assert_eq!(ops[0], TermOp::MoveTo { x: 0, y: 0 });
        assert_eq!(prints(&ops), vec!["bbbb"]);
    }
}
