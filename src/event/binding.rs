//! Key bindings: key + modifiers resolved to an action.

use std::collections::HashMap;

use super::input::{Key, KeyEvent, Modifiers};
use super::message::Message;

// ---------------------------------------------------------------------------
// BindingAction
// ---------------------------------------------------------------------------

/// What a matched binding does.
pub enum BindingAction {
    Quit,
    FocusNext,
    FocusPrevious,
    /// A named action, delivered as a `Custom` message.
    Custom(String),
    /// Produce an arbitrary message.
    Message(fn() -> Box<dyn Message>),
}

impl std::fmt::Debug for BindingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Quit => write!(f, "Quit"),
            Self::FocusNext => write!(f, "FocusNext"),
            Self::FocusPrevious => write!(f, "FocusPrevious"),
            Self::Custom(name) => write!(f, "Custom({name:?})"),
            Self::Message(_) => write!(f, "Message(<fn>)"),
        }
    }
}

// ---------------------------------------------------------------------------
// KeyBindingRegistry
// ---------------------------------------------------------------------------

/// Maps `(Key, Modifiers)` to actions. Later binds replace earlier ones.
#[derive(Debug, Default)]
pub struct KeyBindingRegistry {
    bindings: HashMap<(Key, Modifiers), BindingAction>,
}

impl KeyBindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock bindings: `Ctrl+C` quits, `Tab` and `BackTab` move focus.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.bind(Key::Char('c'), Modifiers::CTRL, BindingAction::Quit);
        registry.bind(Key::Tab, Modifiers::NONE, BindingAction::FocusNext);
        registry.bind(Key::BackTab, Modifiers::NONE, BindingAction::FocusPrevious);
        registry
    }

    pub fn bind(&mut self, key: Key, modifiers: Modifiers, action: BindingAction) {
        self.bindings.insert((key, modifiers), action);
    }

    pub fn unbind(&mut self, key: Key, modifiers: Modifiers) -> Option<BindingAction> {
        self.bindings.remove(&(key, modifiers))
    }

    /// The action bound to this exact key + modifier combination, if any.
    pub fn resolve(&self, event: &KeyEvent) -> Option<&BindingAction> {
        self.bindings.get(&(event.code, event.modifiers))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
