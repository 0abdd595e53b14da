//! # weft-tui
//!
//! A CSS-styled, retained-mode terminal UI core.
//!
//! weft-tui keeps a widget tree, resolves a CSS-like cascade over it, solves
//! layout in whole terminal cells, composites into a cell buffer, and emits
//! the minimal escape-sequence diff between frames. A tokio-driven message
//! pump ties input, messages, and timers into one queue.
//!
//! ## Core Systems
//!
//! - **[`css`]** — Stylesheet engine: tokenizer, parser, specificity, cascade
//! - **[`dom`]** — Slotmap-backed widget tree with dirty tracking and reactive attributes
//! - **[`layout`]** — Stack, dock, grid, and absolute layout with scalar resolution
//! - **[`widget`]** — Widget trait and scroll state
//! - **[`event`]** — Input events, messages and envelopes, key bindings
//! - **[`render`]** — Cell buffer, compositor, frame diff, terminal driver
//! - **[`runtime`]** — Message pump, timers, cooperative task cancellation
//! - **[`app`]** / **[`screen`]** — The application loop and its screen
//! - **[`geometry`]** — Offset, Size, Region, Spacing primitives

// Foundation
pub mod error;
pub mod geometry;

// Core systems
pub mod css;
pub mod dom;
pub mod layout;

// Widget system
pub mod widget;

// Events
pub mod event;

// Rendering
pub mod render;

// Application
pub mod app;
pub mod runtime;
pub mod screen;
