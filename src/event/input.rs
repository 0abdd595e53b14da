//! Terminal input, decoupled from crossterm.
//!
//! The runtime converts raw crossterm events into these types at the edge,
//! so everything past the driver can be tested without a terminal.

use std::ops::{BitAnd, BitOr};

use crossterm::event as ct;

// ---------------------------------------------------------------------------
// Key and modifiers
// ---------------------------------------------------------------------------

/// A keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

/// Modifier key bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1);
    pub const CTRL: Modifiers = Modifiers(2);
    pub const ALT: Modifiers = Modifiers(4);

    /// Whether `self` contains every bit of `other`.
    pub fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;
    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

impl BitAnd for Modifiers {
    type Output = Modifiers;
    fn bitand(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 & rhs.0)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A key press with modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(code: Key, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseAction {
    Down(MouseButton),
    Up(MouseButton),
    Drag(MouseButton),
    Moved,
    ScrollUp,
    ScrollDown,
}

/// A mouse event in cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    pub kind: MouseAction,
    pub x: u16,
    pub y: u16,
    pub modifiers: Modifiers,
}

/// Top-level input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize { width: u16, height: u16 },
    FocusGained,
    FocusLost,
    Paste(String),
}

impl InputEvent {
    /// Whether two events should collapse into one when queued in the same
    /// batch. Resize and mouse-move events arrive in floods; only the last
    /// one matters.
    pub fn coalesces_with(&self, other: &InputEvent) -> bool {
        match (self, other) {
            (InputEvent::Resize { .. }, InputEvent::Resize { .. }) => true,
            (InputEvent::Mouse(a), InputEvent::Mouse(b)) => {
                a.kind == MouseAction::Moved && b.kind == MouseAction::Moved
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// crossterm conversions
// ---------------------------------------------------------------------------

fn modifiers(m: ct::KeyModifiers) -> Modifiers {
    let mut out = Modifiers::NONE;
    if m.contains(ct::KeyModifiers::SHIFT) {
        out = out | Modifiers::SHIFT;
    }
    if m.contains(ct::KeyModifiers::CONTROL) {
        out = out | Modifiers::CTRL;
    }
    if m.contains(ct::KeyModifiers::ALT) {
        out = out | Modifiers::ALT;
    }
    out
}

impl From<ct::KeyEvent> for KeyEvent {
    fn from(event: ct::KeyEvent) -> Self {
        let code = match event.code {
            ct::KeyCode::Char(c) => Key::Char(c),
            ct::KeyCode::Enter => Key::Enter,
            ct::KeyCode::Tab => Key::Tab,
            ct::KeyCode::BackTab => Key::BackTab,
            ct::KeyCode::Backspace => Key::Backspace,
            ct::KeyCode::Delete => Key::Delete,
            ct::KeyCode::Left => Key::Left,
            ct::KeyCode::Right => Key::Right,
            ct::KeyCode::Up => Key::Up,
            ct::KeyCode::Down => Key::Down,
            ct::KeyCode::Home => Key::Home,
            ct::KeyCode::End => Key::End,
            ct::KeyCode::PageUp => Key::PageUp,
            ct::KeyCode::PageDown => Key::PageDown,
            ct::KeyCode::F(n) => Key::F(n),
            // Everything else collapses to Escape.
            _ => Key::Escape,
        };
        KeyEvent::new(code, modifiers(event.modifiers))
    }
}

fn button(b: ct::MouseButton) -> MouseButton {
    match b {
        ct::MouseButton::Left => MouseButton::Left,
        ct::MouseButton::Right => MouseButton::Right,
        ct::MouseButton::Middle => MouseButton::Middle,
    }
}

impl From<ct::Event> for InputEvent {
    fn from(event: ct::Event) -> Self {
        match event {
            ct::Event::Key(key) => InputEvent::Key(KeyEvent::from(key)),
            ct::Event::Mouse(mouse) => {
                let kind = match mouse.kind {
                    ct::MouseEventKind::Down(b) => MouseAction::Down(button(b)),
                    ct::MouseEventKind::Up(b) => MouseAction::Up(button(b)),
                    ct::MouseEventKind::Drag(b) => MouseAction::Drag(button(b)),
                    ct::MouseEventKind::Moved => MouseAction::Moved,
                    ct::MouseEventKind::ScrollUp => MouseAction::ScrollUp,
                    _ => MouseAction::ScrollDown,
                };
                InputEvent::Mouse(MouseEvent {
                    kind,
                    x: mouse.column,
                    y: mouse.row,
                    modifiers: modifiers(mouse.modifiers),
                })
            }
            ct::Event::Resize(width, height) => InputEvent::Resize { width, height },
            ct::Event::FocusGained => InputEvent::FocusGained,
            ct::Event::FocusLost => InputEvent::FocusLost,
            ct::Event::Paste(text) => InputEvent::Paste(text),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ── Modifiers ────────────────────────────────────────────────────

    #[test]
    fn modifier_bits_combine_and_test() {
        let mods = Modifiers::CTRL | Modifiers::ALT;
        assert!(mods.contains(Modifiers::CTRL));
        assert!(mods.contains(Modifiers::ALT));
        assert!(!mods.contains(Modifiers::SHIFT));
        assert!(mods.contains(Modifiers::NONE));
        assert_eq!(mods & Modifiers::CTRL, Modifiers::CTRL);
        assert!(Modifiers::NONE.is_empty());
    }

    // ── crossterm conversion ─────────────────────────────────────────

    #[test]
    fn key_event_converts_code_and_modifiers() {
        let event = KeyEvent::from(ct::KeyEvent::new(
            ct::KeyCode::Char('c'),
            ct::KeyModifiers::CONTROL,
        ));
        assert_eq!(event.code, Key::Char('c'));
        assert!(event.modifiers.contains(Modifiers::CTRL));
    }

    #[test]
    fn special_keys_convert() {
        for (raw, expected) in [
            (ct::KeyCode::Enter, Key::Enter),
            (ct::KeyCode::Tab, Key::Tab),
            (ct::KeyCode::BackTab, Key::BackTab),
            (ct::KeyCode::Esc, Key::Escape),
            (ct::KeyCode::PageDown, Key::PageDown),
            (ct::KeyCode::F(5), Key::F(5)),
        ] {
            let event = KeyEvent::from(ct::KeyEvent::new(raw, ct::KeyModifiers::NONE));
            assert_eq!(event.code, expected);
        }
    }

    #[test]
    fn resize_and_paste_convert() {
        assert_eq!(
            InputEvent::from(ct::Event::Resize(120, 40)),
            InputEvent::Resize {
                width: 120,
                height: 40
            }
        );
        assert_eq!(
            InputEvent::from(ct::Event::Paste("hi".into())),
            InputEvent::Paste("hi".into())
        );
    }

    #[test]
    fn mouse_converts_kind_and_position() {
        let raw = ct::Event::Mouse(ct::MouseEvent {
            kind: ct::MouseEventKind::Down(ct::MouseButton::Left),
            column: 10,
            row: 5,
            modifiers: ct::KeyModifiers::NONE,
        });
        match InputEvent::from(raw) {
            InputEvent::Mouse(mouse) => {
                assert_eq!(mouse.kind, MouseAction::Down(MouseButton::Left));
                assert_eq!((mouse.x, mouse.y), (10, 5));
            }
            other => panic!("expected mouse event, got {other:?}"),
        }
    }

    // ── Coalescing ───────────────────────────────────────────────────

    #[test]
    fn resize_events_coalesce() {
        let a = InputEvent::Resize {
            width: 80,
            height: 24,
        };
        let b = InputEvent::Resize {
            width: 100,
            height: 30,
        };
        assert!(a.coalesces_with(&b));
    }

    #[test]
    fn mouse_moves_coalesce_but_clicks_do_not() {
        let moved = |x| {
            InputEvent::Mouse(MouseEvent {
                kind: MouseAction::Moved,
                x,
                y: 0,
                modifiers: Modifiers::NONE,
            })
        };
        let click = InputEvent::Mouse(MouseEvent {
            kind: MouseAction::Down(MouseButton::Left),
            x: 0,
            y: 0,
            modifiers: Modifiers::NONE,
        });
        assert!(moved(1).coalesces_with(&moved(2)));
        assert!(!click.coalesces_with(&moved(1)));
        assert!(!moved(1).coalesces_with(&click));
    }

    #[test]
    fn keys_never_coalesce() {
        let key = InputEvent::Key(KeyEvent::new(Key::Char('a'), Modifiers::NONE));
        assert!(!key.coalesces_with(&key.clone()));
    }
}
