//! Input events, messages, and key bindings.

pub mod binding;
pub mod input;
pub mod message;
