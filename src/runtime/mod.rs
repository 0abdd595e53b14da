//! Runtime: the message pump, timers, and task cancellation.

pub mod pump;
pub mod task;
pub mod timer;

pub use pump::{Handler, MessagePump, PumpEvent, PumpState, Tick};
pub use task::TaskHandle;
pub use timer::{TimerHandle, TimerId};
