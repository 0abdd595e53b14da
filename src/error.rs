//! Error taxonomy: configuration errors, render errors, layout warnings,
//! handler faults.
//!
//! Only two kinds of failure surface as `Err`: [`ConfigError`] (a stylesheet
//! or layout configuration the engine refuses to run with) and
//! [`RenderError`] (terminal I/O, which terminates the pump). Everything else
//! is recoverable: [`LayoutWarning`]s are recorded and logged, and
//! [`HandlerFault`]s isolate a panicking handler without taking down the
//! application.

use crate::dom::node::NodeId;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// A configuration the engine rejects outright.
///
/// Stylesheet errors carry the line and column of the offending token so the
/// author can find it. Grid span errors name the node whose span walks off
/// the declared template.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The stylesheet failed to parse. The whole sheet is rejected; no rules
    /// from it are applied.
    #[error("stylesheet error at line {line}, column {column}: {message}")]
    Stylesheet {
        line: usize,
        column: usize,
        message: String,
    },

    /// A grid child's row/column span does not fit the declared template.
    /// Spans are never clamped.
    #[error("grid span out of bounds for {node:?}: {message}")]
    GridSpan { node: NodeId, message: String },
}

// ---------------------------------------------------------------------------
// RenderError
// ---------------------------------------------------------------------------

/// Terminal output failure. Escalates: the pump flushes best-effort and
/// transitions to `Terminated`.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("terminal i/o: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

/// Anything that can stop the application: bad configuration, or terminal
/// I/O failing underneath it.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// LayoutWarning
// ---------------------------------------------------------------------------

/// A recoverable layout anomaly. Recorded per pass and logged via `tracing`;
/// layout always completes with clamped values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutWarning {
    /// Margin + border + padding exceeded the allotted region on one or both
    /// axes; the content box was clamped to zero extent there.
    ContentClamped {
        node: NodeId,
        deficit_width: i32,
        deficit_height: i32,
    },
}

impl std::fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContentClamped {
                node,
                deficit_width,
                deficit_height,
            } => write!(
                f,
                "content box clamped to zero for {node:?} (deficit {deficit_width}x{deficit_height})"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// HandlerFault
// ---------------------------------------------------------------------------

/// Record of a message handler that panicked.
///
/// The fault is isolated: the handler's node keeps its last good paint and is
/// marked failed, and the pump continues delivering to other nodes.
#[derive(Debug, Clone)]
pub struct HandlerFault {
    /// The node whose handler panicked.
    pub node: NodeId,
    /// Name of the message being delivered when the panic occurred.
    pub message_name: String,
    /// Panic payload, stringified when possible.
    pub panic_message: String,
}

// ---------------------------------------------------------------------------
// Cancelled
// ---------------------------------------------------------------------------

/// Returned by a cooperative task checkpoint once cancellation was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("task cancelled")]
pub struct Cancelled;

// ===========================================================================
// Tests
// ===========================================================================
