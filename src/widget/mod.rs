//! The widget capability trait and scroll state.

pub mod scroll;
pub mod traits;
