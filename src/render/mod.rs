//! Rendering: strips, cell buffers, compositing, diffing, terminal driver.

pub mod buffer;
pub mod compositor;
pub mod diff;
pub mod driver;
pub mod strip;
