//! The message pump: the application's single event queue.
//!
//! Everything that happens at runtime arrives here as a [`PumpEvent`]:
//! terminal input, [`Envelope`]d messages, timer firings, and lifecycle
//! requests. [`MessagePump::pump_once`] drains the queue, coalesces input
//! floods, delivers messages to registered handlers, and reports what the
//! caller should do next.
//!
//! A panicking handler never takes down the pump. The panic is caught, the
//! node is marked failed and skipped from then on, and a [`HandlerFault`]
//! records what happened.

use std::collections::{HashMap, HashSet, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error};

use crate::dom::node::NodeId;
use crate::error::HandlerFault;
use crate::event::input::InputEvent;
use crate::event::message::Envelope;
use crate::screen::Screen;

use super::timer::{spawn_timer, TimerHandle, TimerId};

// ---------------------------------------------------------------------------
// PumpState
// ---------------------------------------------------------------------------

/// Pump lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    /// Queue empty, waiting for events.
    Idle,
    /// Draining the queue and running handlers.
    ProcessingEvents,
    /// The caller is producing a frame.
    Rendering,
    /// Events are buffered, not delivered, until a resume.
    Suspended,
    /// Shut down; the pump stays terminated forever.
    Terminated,
}

// ---------------------------------------------------------------------------
// PumpEvent
// ---------------------------------------------------------------------------

/// Anything the pump can receive.
#[derive(Debug)]
pub enum PumpEvent {
    Input(InputEvent),
    Message(Envelope),
    TimerFired(TimerId),
    /// Buffer events until `Resume`.
    Suspend,
    Resume,
    /// Terminate the pump. Events behind this one are dropped.
    Shutdown,
}

// ---------------------------------------------------------------------------
// MessagePump
// ---------------------------------------------------------------------------

/// A message handler attached to a node.
pub type Handler = Box<dyn FnMut(&mut Screen, &mut Envelope)>;

/// What one [`MessagePump::pump_once`] call produced.
#[derive(Debug, Default)]
pub struct Tick {
    /// Coalesced input, in arrival order. The caller routes these.
    pub inputs: Vec<InputEvent>,
    /// Timers that fired.
    pub timers: Vec<TimerId>,
    /// Envelopes no handler claimed. The application gets last refusal.
    pub unhandled: Vec<Envelope>,
    /// Whether any handler ran, so the screen may be dirty.
    pub needs_render: bool,
}

pub struct MessagePump {
    events: UnboundedSender<PumpEvent>,
    queue: UnboundedReceiver<PumpEvent>,
    state: PumpState,
    handlers: HashMap<NodeId, Vec<Handler>>,
    /// Nodes whose handler panicked. Skipped on every later delivery.
    failed: HashSet<NodeId>,
    faults: Vec<HandlerFault>,
    /// Events buffered while suspended, in arrival order.
    pending: Vec<PumpEvent>,
    next_timer: u64,
}

impl Default for MessagePump {
    fn default() -> Self {
        Self::new()
    }
}

impl MessagePump {
    pub fn new() -> Self {
        let (events, queue) = mpsc::unbounded_channel();
        Self {
            events,
            queue,
            state: PumpState::Idle,
            handlers: HashMap::new(),
            failed: HashSet::new(),
            faults: Vec::new(),
            pending: Vec::new(),
            next_timer: 0,
        }
    }

    pub fn state(&self) -> PumpState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == PumpState::Terminated
    }

    /// A sender for feeding the pump from other tasks.
    pub fn sender(&self) -> UnboundedSender<PumpEvent> {
        self.events.clone()
    }

    /// Queue an event. A terminated pump silently drops it.
    pub fn post(&self, event: PumpEvent) {
        let _ = self.events.send(event);
    }

    pub fn post_message(&self, envelope: Envelope) {
        self.post(PumpEvent::Message(envelope));
    }

    pub fn post_input(&self, input: InputEvent) {
        self.post(PumpEvent::Input(input));
    }

    /// Queue a shutdown request.
    pub fn shutdown(&self) {
        self.post(PumpEvent::Shutdown);
    }

    /// Attach a handler to a node. A node may carry several; they run in
    /// registration order.
    pub fn on(&mut self, node: NodeId, handler: impl FnMut(&mut Screen, &mut Envelope) + 'static) {
        self.handlers.entry(node).or_default().push(Box::new(handler));
    }

    /// Start a one-shot timer. Requires a tokio runtime.
    pub fn set_timer(&mut self, delay: Duration) -> TimerHandle {
        self.next_timer += 1;
        spawn_timer(TimerId(self.next_timer), delay, self.events.clone())
    }

    /// Faults recorded so far.
    pub fn faults(&self) -> &[HandlerFault] {
        &self.faults
    }

    pub fn take_faults(&mut self) -> Vec<HandlerFault> {
        std::mem::take(&mut self.faults)
    }

    /// Let a failed node receive messages again.
    pub fn clear_fault(&mut self, node: NodeId) -> bool {
        self.failed.remove(&node)
    }

    /// The caller is about to produce a frame.
    pub fn begin_render(&mut self) {
        if self.state == PumpState::Idle {
            self.state = PumpState::Rendering;
        }
    }

    pub fn end_render(&mut self) {
        if self.state == PumpState::Rendering {
            self.state = PumpState::Idle;
        }
    }

    /// Drain and process everything currently queued.
    ///
    /// Bursts of coalescable input (resize floods, mouse moves) collapse to
    /// their last event before delivery, so a hundred queued resizes cost
    /// one. While suspended, everything except resume and shutdown is
    /// buffered and replayed in order on resume.
    pub fn pump_once(&mut self, screen: &mut Screen) -> Tick {
        let mut tick = Tick::default();
        if self.state == PumpState::Terminated {
            return tick;
        }

        let mut work: VecDeque<PumpEvent> = VecDeque::new();
        while let Ok(event) = self.queue.try_recv() {
            match (work.back(), &event) {
                (Some(PumpEvent::Input(a)), PumpEvent::Input(b)) if a.coalesces_with(b) => {
                    *work.back_mut().unwrap() = event;
                }
                _ => work.push_back(event),
            }
        }

        if self.state == PumpState::Idle && !work.is_empty() {
            self.state = PumpState::ProcessingEvents;
        }

        while let Some(event) = work.pop_front() {
            if self.state == PumpState::Suspended {
                match event {
                    PumpEvent::Resume => {
                        debug!("pump resumed, replaying {} buffered events", self.pending.len());
                        self.state = PumpState::ProcessingEvents;
                        for buffered in self.pending.drain(..).rev() {
                            work.push_front(buffered);
                        }
                    }
                    PumpEvent::Shutdown => {
                        self.terminate();
                        break;
                    }
                    other => self.pending.push(other),
                }
                continue;
            }

            match event {
                PumpEvent::Input(input) => tick.inputs.push(input),
                PumpEvent::Message(envelope) => {
                    if let Some(unclaimed) = self.deliver(screen, envelope) {
                        tick.unhandled.push(unclaimed);
                    }
                    tick.needs_render = true;
                }
                PumpEvent::TimerFired(id) => {
                    tick.timers.push(id);
                    tick.needs_render = true;
                }
                PumpEvent::Suspend => {
                    debug!("pump suspended");
                    self.state = PumpState::Suspended;
                }
                PumpEvent::Resume => {}
                PumpEvent::Shutdown => {
                    self.terminate();
                    break;
                }
            }
        }

        if self.state == PumpState::ProcessingEvents {
            self.state = PumpState::Idle;
        }
        tick
    }

    fn terminate(&mut self) {
        debug!("pump terminated");
        self.state = PumpState::Terminated;
        self.pending.clear();
        self.queue.close();
    }

    /// Deliver one envelope: straight to its target, or bubbling from the
    /// sender up the ancestor chain until a handler marks it handled.
    /// Returns the envelope when no handler claimed it.
    fn deliver(&mut self, screen: &mut Screen, mut envelope: Envelope) -> Option<Envelope> {
        let route: Vec<NodeId> = match envelope.target {
            Some(target) => vec![target],
            None => {
                let mut route = vec![envelope.sender];
                route.extend(screen.dom.ancestors(envelope.sender));
                route
            }
        };

        for node in route {
            if envelope.handled {
                break;
            }
            if self.failed.contains(&node) {
                continue;
            }
            let Some(mut list) = self.handlers.remove(&node) else {
                continue;
            };
            for handler in &mut list {
                if envelope.handled {
                    break;
                }
                let outcome =
                    catch_unwind(AssertUnwindSafe(|| handler(screen, &mut envelope)));
                if let Err(payload) = outcome {
                    let fault = HandlerFault {
                        node,
                        message_name: envelope.message.message_name().to_owned(),
                        panic_message: panic_text(&*payload),
                    };
                    error!(?node, message = %fault.message_name, "handler panicked; node marked failed");
                    self.failed.insert(node);
                    self.faults.push(fault);
                    break;
                }
            }
            self.handlers.insert(node, list);
        }

        if envelope.handled {
            None
        } else {
            Some(envelope)
        }
    }
}

impl std::fmt::Debug for MessagePump {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagePump")
            .field("state", &self.state)
            .field("handlers", &self.handlers.len())
            .field("failed", &self.failed.len())
            .field("faults", &self.faults.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

fn panic_text(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_owned()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "panic payload of unknown type".to_owned()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
