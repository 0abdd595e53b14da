//! Terminal output driver.
//!
//! Owns the real terminal: raw mode, the alternate screen, and a buffered
//! writer that executes [`TermOp`]s from the diff. The driver keeps its own
//! idea of where the cursor is and what style is active, so redundant escape
//! sequences are never written.

use std::io::{self, BufWriter, Stdout, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{
    Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use tracing::debug;

use crate::error::RenderError;
use crate::render::diff::TermOp;
use crate::render::strip::CellStyle;

// ---------------------------------------------------------------------------
// Color parsing
// ---------------------------------------------------------------------------

/// Parse a color name or `#rgb`/`#rrggbb` hex string.
pub fn parse_color(value: &str) -> Option<Color> {
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }
    let named = match value.to_ascii_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::DarkRed,
        "green" => Color::DarkGreen,
        "yellow" => Color::DarkYellow,
        "blue" => Color::DarkBlue,
        "magenta" => Color::DarkMagenta,
        "cyan" => Color::DarkCyan,
        "gray" | "grey" => Color::Grey,
        "darkgray" | "darkgrey" => Color::DarkGrey,
        "white" => Color::White,
        "brightred" => Color::Red,
        "brightgreen" => Color::Green,
        "brightyellow" => Color::Yellow,
        "brightblue" => Color::Blue,
        "brightmagenta" => Color::Magenta,
        "brightcyan" => Color::Cyan,
        _ => return None,
    };
    Some(named)
}

fn parse_hex(hex: &str) -> Option<Color> {
    let expand = |c: u8| (c << 4) | c;
    let digit = |c: char| c.to_digit(16).map(|d| d as u8);
    let chars: Vec<u8> = hex.chars().map(digit).collect::<Option<_>>()?;
    match chars.as_slice() {
        [r, g, b] => Some(Color::Rgb {
            r: expand(*r),
            g: expand(*g),
            b: expand(*b),
        }),
        [r1, r0, g1, g0, b1, b0] => Some(Color::Rgb {
            r: (r1 << 4) | r0,
            g: (g1 << 4) | g0,
            b: (b1 << 4) | b0,
        }),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Buffered terminal writer executing diff ops.
pub struct Driver {
    writer: BufWriter<Stdout>,
    /// Where the terminal cursor is, as far as we have told it to be.
    cursor: Option<(u16, u16)>,
}

impl Driver {
    /// Take over the terminal: raw mode, alternate screen, hidden cursor.
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut writer = BufWriter::new(io::stdout());
        execute!(writer, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        debug!("terminal driver started");
        Ok(Self {
            writer,
            cursor: None,
        })
    }

    /// The terminal's current size in cells.
    pub fn terminal_size() -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    /// Queue a batch of ops and flush them to the terminal.
    pub fn apply(&mut self, ops: &[TermOp]) -> Result<(), RenderError> {
        for op in ops {
            match op {
                TermOp::MoveTo { x, y } => {
                    if self.cursor != Some((*x, *y)) {
                        queue!(self.writer, MoveTo(*x, *y))?;
                        self.cursor = Some((*x, *y));
                    }
                }
                TermOp::SetStyle(style) => self.queue_style(style)?,
                TermOp::Print(text) => {
                    queue!(self.writer, Print(text))?;
                    if let Some((x, _)) = &mut self.cursor {
                        *x = x.saturating_add(text.chars().count() as u16);
                    }
                }
            }
        }
        self.writer.flush()?;
        Ok(())
    }

    fn queue_style(&mut self, style: &CellStyle) -> Result<(), RenderError> {
        queue!(self.writer, SetAttribute(Attribute::Reset), ResetColor)?;
        if let Some(fg) = style.fg.as_deref().and_then(parse_color) {
            queue!(self.writer, SetForegroundColor(fg))?;
        }
        if let Some(bg) = style.bg.as_deref().and_then(parse_color) {
            queue!(self.writer, SetBackgroundColor(bg))?;
        }
        for (on, attribute) in [
            (style.bold, Attribute::Bold),
            (style.dim, Attribute::Dim),
            (style.italic, Attribute::Italic),
            (style.underline, Attribute::Underlined),
            (style.strikethrough, Attribute::CrossedOut),
            (style.reverse, Attribute::Reverse),
        ] {
            if on {
                queue!(self.writer, SetAttribute(attribute))?;
            }
        }
        Ok(())
    }

    /// Restore the terminal. Also runs on drop; calling it early surfaces
    /// any I/O error instead of swallowing it.
    pub fn shutdown(&mut self) -> io::Result<()> {
        execute!(self.writer, SetAttribute(Attribute::Reset), ResetColor, Show, LeaveAlternateScreen)?;
        disable_raw_mode()?;
        debug!("terminal driver stopped");
        Ok(())
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_colors_parse() {
        assert_eq!(parse_color("red"), Some(Color::DarkRed));
        assert_eq!(parse_color("BLUE"), Some(Color::DarkBlue));
        assert_eq!(parse_color("brightgreen"), Some(Color::Green));
        assert_eq!(parse_color("grey"), Some(Color::Grey));
        assert_eq!(parse_color("chartreuse"), None);
    }

    #[test]
    fn six_digit_hex_parses() {
        assert_eq!(
            parse_color("#1a2b3c"),
            Some(Color::Rgb {
                r: 0x1a,
                g: 0x2b,
                b: 0x3c
            })
        );
    }

    #[test]
    fn three_digit_hex_expands() {
        assert_eq!(
            parse_color("#f0a"),
            Some(Color::Rgb {
                r: 0xff,
                g: 0x00,
                b: 0xaa
            })
        );
    }

    #[test]
    fn malformed_hex_is_rejected() {
        assert_eq!(parse_color("#12"), None);
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#zzzzzz"), None);
    }
}
