//! The application: screen, driver, bindings, and the message pump.
//!
//! [`App`] owns one [`Screen`] and drives it from an async event loop. Input
//! arrives from crossterm's [`EventStream`], frames go out at the configured
//! rate, and everything in between flows through the [`MessagePump`]. The
//! `new_headless` constructor drops the terminal driver so the whole loop is
//! testable in-process.

use std::time::Duration;

use futures::StreamExt;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, warn};

use crate::error::{AppError, RenderError};
use crate::event::binding::{BindingAction, KeyBindingRegistry};
use crate::event::input::InputEvent;
use crate::event::message::{self, Envelope};
use crate::render::driver::Driver;
use crate::runtime::pump::MessagePump;
use crate::screen::Screen;

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Optional application title.
    pub title: Option<String>,
    /// Stylesheet source compiled when the app starts.
    pub css: Option<String>,
    /// Target frames per second for the render loop.
    pub fps: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: None,
            css: None,
            fps: 60,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_css(mut self, css: impl Into<String>) -> Self {
        self.css = Some(css.into());
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// The running application.
pub struct App {
    /// DOM, styles, layout, compositor, focus.
    pub screen: Screen,
    /// Terminal output driver. `None` in headless mode.
    pub driver: Option<Driver>,
    /// Key bindings resolved before anything else sees a key.
    pub bindings: KeyBindingRegistry,
    /// The single event queue.
    pub pump: MessagePump,
    pub config: AppConfig,
    running: bool,
}

impl App {
    /// Create an app on the real terminal, sized to it.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let (width, height) = Driver::terminal_size()?;
        let driver = Driver::new()?;
        let mut app = Self {
            screen: Screen::new(width, height),
            driver: Some(driver),
            bindings: KeyBindingRegistry::with_defaults(),
            pump: MessagePump::new(),
            config,
            running: true,
        };
        app.load_config_styles()?;
        Ok(app)
    }

    /// Create an app with no terminal, for tests and tooling.
    pub fn new_headless(width: u16, height: u16) -> Self {
        Self {
            screen: Screen::new(width, height),
            driver: None,
            bindings: KeyBindingRegistry::with_defaults(),
            pump: MessagePump::new(),
            config: AppConfig::default(),
            running: true,
        }
    }

    fn load_config_styles(&mut self) -> Result<(), AppError> {
        if let Some(css) = self.config.css.clone() {
            self.screen.load_stylesheet(&css, false)?;
        }
        Ok(())
    }

    pub fn should_quit(&self) -> bool {
        !self.running
    }

    pub fn request_quit(&mut self) {
        self.running = false;
    }

    pub fn has_driver(&self) -> bool {
        self.driver.is_some()
    }

    /// Route one input event: bindings first, then resize bookkeeping.
    /// Unbound keys and mouse events are ignored at the app level; widgets
    /// see them as messages posted by their owner.
    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Key(key) => {
                let Some(action) = self.bindings.resolve(&key) else {
                    return;
                };
                match action {
                    BindingAction::Quit => self.running = false,
                    BindingAction::FocusNext => {
                        self.screen.focus_next();
                    }
                    BindingAction::FocusPrevious => {
                        self.screen.focus_previous();
                    }
                    BindingAction::Custom(name) => {
                        let Some(sender) = self.screen.dom.root() else {
                            return;
                        };
                        self.pump
                            .post_message(Envelope::new(message::Custom::new(name.clone()), sender));
                    }
                    BindingAction::Message(factory) => {
                        let Some(sender) = self.screen.dom.root() else {
                            return;
                        };
                        self.pump.post_message(Envelope {
                            message: factory(),
                            sender,
                            target: None,
                            handled: false,
                        });
                    }
                }
            }
            InputEvent::Resize { width, height } => self.screen.resize(width, height),
            _ => {}
        }
    }

    /// Built-in fallback for envelopes no widget handler claimed.
    fn handle_builtin(&mut self, envelope: &Envelope) {
        if envelope.downcast_ref::<message::Quit>().is_some() {
            self.running = false;
        } else if envelope.downcast_ref::<message::FocusNext>().is_some() {
            self.screen.focus_next();
        } else if envelope.downcast_ref::<message::FocusPrevious>().is_some() {
            self.screen.focus_previous();
        } else if envelope.downcast_ref::<message::Refresh>().is_some() {
            let nodes: Vec<_> = self.screen.dom.walk_depth_first();
            for node in nodes {
                self.screen.dom.dirty_mut().mark_paint(node);
            }
        } else if envelope.downcast_ref::<message::Suspend>().is_some() {
            self.pump.post(crate::runtime::pump::PumpEvent::Suspend);
        } else if envelope.downcast_ref::<message::Resume>().is_some() {
            self.pump.post(crate::runtime::pump::PumpEvent::Resume);
        }
    }

    /// One iteration of the loop: drain the pump, route input, apply
    /// built-ins, render, and flush to the driver if there is one.
    pub fn tick(&mut self) -> Result<(), AppError> {
        let tick = self.pump.pump_once(&mut self.screen);
        for input in tick.inputs {
            self.handle_input(input);
        }
        for envelope in &tick.unhandled {
            self.handle_builtin(envelope);
        }
        for fault in self.pump.take_faults() {
            error!(
                node = ?fault.node,
                message = %fault.message_name,
                panic = %fault.panic_message,
                "handler fault"
            );
        }
        if self.pump.is_terminated() {
            self.running = false;
        }

        self.pump.begin_render();
        let result = self.render();
        self.pump.end_render();
        result
    }

    fn render(&mut self) -> Result<(), AppError> {
        let ops = self.screen.render_frame()?;
        for warning in self.screen.layout.take_warnings() {
            warn!(%warning, "layout warning");
        }
        if let Some(driver) = &mut self.driver {
            if let Err(err) = driver.apply(&ops) {
                // I/O failure is fatal; take the pump down with us.
                self.pump.shutdown();
                self.running = false;
                return Err(err.into());
            }
        }
        Ok(())
    }

    /// Run until quit. Requires a tokio runtime; reads crossterm's event
    /// stream and ticks at the configured frame rate.
    pub async fn run(&mut self) -> Result<(), AppError> {
        if let Some(title) = &self.config.title {
            debug!(%title, "starting");
        }
        let mut events = crossterm::event::EventStream::new();
        let frame = Duration::from_secs_f64(1.0 / f64::from(self.config.fps.max(1)));
        let mut interval = tokio::time::interval(frame);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while self.running {
            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(raw)) => self.pump.post_input(InputEvent::from(raw)),
                    Some(Err(err)) => {
                        self.running = false;
                        return Err(RenderError::Io(err).into());
                    }
                    None => self.running = false,
                },
                _ = interval.tick() => self.tick()?,
            }
        }

        if let Some(driver) = &mut self.driver {
            driver.shutdown()?;
        }
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::NodeData;
    use crate::event::input::{Key, KeyEvent, Modifiers};
    use crate::event::message::{Custom, FocusNext, FocusPrevious, Quit};
    use crate::geometry::Size;

    fn headless_app() -> App {
        App::new_headless(80, 24)
    }

    fn headless_app_with_dom() -> (App, Vec<crate::dom::node::NodeId>) {
        let mut app = App::new_headless(80, 24);
        let root = app.screen.dom.insert(NodeData::new("Screen"));
        let a = app
            .screen
            .dom
            .insert_child(root, NodeData::new("Button").focusable(true));
        let b = app
            .screen
            .dom
            .insert_child(root, NodeData::new("Button").focusable(true));
        (app, vec![root, a, b])
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn headless_app_has_no_driver() {
        let app = headless_app();
        assert!(!app.has_driver());
        assert!(!app.should_quit());
    }

    #[test]
    fn headless_app_screen_size() {
        let app = App::new_headless(120, 40);
        assert_eq!(app.screen.compositor.size(), Size::new(120, 40));
    }

    #[test]
    fn headless_app_has_default_bindings() {
        assert_eq!(headless_app().bindings.len(), 3);
    }

    // ── Input routing ────────────────────────────────────────────────

    #[test]
    fn ctrl_c_quits() {
        let (mut app, _) = headless_app_with_dom();
        app.handle_input(InputEvent::Key(KeyEvent::new(Key::Char('c'), Modifiers::CTRL)));
        assert!(app.should_quit());
    }

    #[test]
    fn tab_cycles_focus() {
        let (mut app, nodes) = headless_app_with_dom();
        app.handle_input(InputEvent::Key(KeyEvent::new(Key::Tab, Modifiers::NONE)));
        assert_eq!(app.screen.focused_node(), Some(nodes[1]));
        app.handle_input(InputEvent::Key(KeyEvent::new(Key::Tab, Modifiers::NONE)));
        assert_eq!(app.screen.focused_node(), Some(nodes[2]));
        app.handle_input(InputEvent::Key(KeyEvent::new(Key::BackTab, Modifiers::NONE)));
        assert_eq!(app.screen.focused_node(), Some(nodes[1]));
    }

    #[test]
    fn unbound_key_does_nothing() {
        let (mut app, _) = headless_app_with_dom();
        app.handle_input(InputEvent::Key(KeyEvent::new(Key::Char('z'), Modifiers::NONE)));
        assert!(!app.should_quit());
        assert!(app.screen.focused_node().is_none());
    }

    #[test]
    fn resize_updates_screen() {
        let mut app = headless_app();
        app.handle_input(InputEvent::Resize {
            width: 120,
            height: 40,
        });
        assert_eq!(app.screen.size(), Size::new(120, 40));
        assert_eq!(app.screen.compositor.size(), Size::new(120, 40));
    }

    #[test]
    fn custom_binding_posts_a_message() {
        let (mut app, nodes) = headless_app_with_dom();
        app.bindings.bind(
            Key::F(1),
            Modifiers::NONE,
            BindingAction::Custom("help".into()),
        );
        let seen = std::rc::Rc::new(std::cell::Cell::new(false));
        let flag = std::rc::Rc::clone(&seen);
        app.pump.on(nodes[0], move |_, envelope| {
            if envelope.downcast_ref::<Custom>().is_some_and(|c| c.0 == "help") {
                flag.set(true);
                envelope.mark_handled();
            }
        });

        app.handle_input(InputEvent::Key(KeyEvent::new(Key::F(1), Modifiers::NONE)));
        app.tick().unwrap();
        assert!(seen.get());
    }

    // ── Built-in message fallback ────────────────────────────────────

    #[test]
    fn unclaimed_quit_message_quits() {
        let (mut app, nodes) = headless_app_with_dom();
        app.pump.post_message(Envelope::new(Quit, nodes[0]));
        app.tick().unwrap();
        assert!(app.should_quit());
    }

    #[test]
    fn claimed_quit_message_does_not_quit() {
        let (mut app, nodes) = headless_app_with_dom();
        app.pump.on(nodes[0], |_, envelope| envelope.mark_handled());
        app.pump.post_message(Envelope::new(Quit, nodes[0]));
        app.tick().unwrap();
        assert!(!app.should_quit());
    }

    #[test]
    fn focus_messages_move_focus() {
        let (mut app, nodes) = headless_app_with_dom();
        app.pump.post_message(Envelope::new(FocusNext, nodes[0]));
        app.tick().unwrap();
        assert_eq!(app.screen.focused_node(), Some(nodes[1]));

        app.pump.post_message(Envelope::new(FocusPrevious, nodes[0]));
        app.tick().unwrap();
        assert_eq!(app.screen.focused_node(), Some(nodes[2]));
    }

    #[test]
    fn tick_renders_headless_without_error() {
        let (mut app, _) = headless_app_with_dom();
        app.tick().unwrap();
        // A second idle tick is a no-op.
        app.tick().unwrap();
        assert!(!app.should_quit());
    }

    // ── AppConfig ────────────────────────────────────────────────────

    #[test]
    fn config_defaults() {
        let config = AppConfig::new();
        assert!(config.title.is_none());
        assert!(config.css.is_none());
        assert_eq!(config.fps, 60);
    }

    #[test]
    fn config_builder() {
        let config = AppConfig::new()
            .with_title("demo")
            .with_css("Button { color: red; }")
            .with_fps(30);
        assert_eq!(config.title.as_deref(), Some("demo"));
        assert_eq!(config.css.as_deref(), Some("Button { color: red; }"));
        assert_eq!(config.fps, 30);
    }
}
