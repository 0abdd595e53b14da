//! Messages and envelopes.
//!
//! A [`Message`] is an object-safe payload delivered through the message
//! pump. [`Envelope`] adds routing: a targeted envelope goes straight to one
//! node, an untargeted one bubbles from its sender up the ancestor chain
//! until a handler marks it handled.

use std::any::Any;

use crate::dom::node::NodeId;

// ---------------------------------------------------------------------------
// Message trait
// ---------------------------------------------------------------------------

/// Object-safe message payload.
pub trait Message: Send + 'static {
    /// Upcast for downcasting by handlers.
    fn as_any(&self) -> &dyn Any;

    /// Stable name for logging and fault reports.
    fn message_name(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// A boxed message plus routing metadata.
pub struct Envelope {
    pub message: Box<dyn Message>,
    /// The node that sent the message.
    pub sender: NodeId,
    /// Deliver to this node only; `None` bubbles from the sender.
    pub target: Option<NodeId>,
    /// Set by a handler to stop propagation.
    pub handled: bool,
}

impl Envelope {
    /// An envelope that bubbles up from `sender`.
    pub fn new(message: impl Message, sender: NodeId) -> Self {
        Self {
            message: Box::new(message),
            sender,
            target: None,
            handled: false,
        }
    }

    /// An envelope delivered to `target` only.
    pub fn targeted(message: impl Message, sender: NodeId, target: NodeId) -> Self {
        Self {
            target: Some(target),
            ..Self::new(message, sender)
        }
    }

    pub fn downcast_ref<T: Message>(&self) -> Option<&T> {
        self.message.as_any().downcast_ref::<T>()
    }

    /// Stop further propagation.
    pub fn mark_handled(&mut self) {
        self.handled = true;
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("message", &self.message.message_name())
            .field("sender", &self.sender)
            .field("target", &self.target)
            .field("handled", &self.handled)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Built-in messages
// ---------------------------------------------------------------------------

macro_rules! builtin_message {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name;

        impl Message for $name {
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn message_name(&self) -> &'static str {
                stringify!($name)
            }
        }
    };
}

builtin_message! {
    /// Request application shutdown.
    Quit
}
builtin_message! {
    /// Request a full repaint.
    Refresh
}
builtin_message! {
    /// Move focus to the next focusable node.
    FocusNext
}
builtin_message! {
    /// Move focus to the previous focusable node.
    FocusPrevious
}
builtin_message! {
    /// Suspend event processing (background the application).
    Suspend
}
builtin_message! {
    /// Resume from a suspension.
    Resume
}

/// A named user-defined message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Custom(pub String);

impl Custom {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl Message for Custom {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn message_name(&self) -> &'static str {
        "Custom"
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::NodeData;
    use crate::dom::tree::Dom;

    fn sender() -> (Dom, NodeId) {
        let mut dom = Dom::new();
        let node = dom.insert(NodeData::new("Screen"));
        (dom, node)
    }

    #[test]
    fn builtin_names() {
        assert_eq!(Quit.message_name(), "Quit");
        assert_eq!(Refresh.message_name(), "Refresh");
        assert_eq!(FocusNext.message_name(), "FocusNext");
        assert_eq!(FocusPrevious.message_name(), "FocusPrevious");
        assert_eq!(Suspend.message_name(), "Suspend");
        assert_eq!(Resume.message_name(), "Resume");
    }

    #[test]
    fn bubbling_envelope_has_no_target() {
        let (_dom, node) = sender();
        let envelope = Envelope::new(Quit, node);
        assert_eq!(envelope.sender, node);
        assert!(envelope.target.is_none());
        assert!(!envelope.handled);
    }

    #[test]
    fn targeted_envelope_carries_target() {
        let (mut dom, node) = sender();
        let target = dom.insert_child(node, NodeData::new("Button"));
        let envelope = Envelope::targeted(Custom::new("press"), node, target);
        assert_eq!(envelope.target, Some(target));
    }

    #[test]
    fn downcast_matches_concrete_type_only() {
        let (_dom, node) = sender();
        let envelope = Envelope::new(Custom::new("press"), node);
        assert_eq!(envelope.downcast_ref::<Custom>().unwrap().0, "press");
        assert!(envelope.downcast_ref::<Quit>().is_none());
    }

    #[test]
    fn mark_handled_sets_flag() {
        let (_dom, node) = sender();
        let mut envelope = Envelope::new(Quit, node);
        envelope.mark_handled();
        assert!(envelope.handled);
    }

    #[test]
    fn debug_names_the_message() {
        let (_dom, node) = sender();
        let text = format!("{:?}", Envelope::new(Quit, node));
        assert!(text.contains("Quit"));
    }
}
