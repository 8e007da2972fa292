//! Display surface.
//!
//! A surface is the display side of a preview panel. It runs on its own
//! thread, reads [`SurfaceMsg`]s, classifies every update with
//! [`detect::inspect`] and then either inserts ready markup, shows an image,
//! or renders raw source with its in-surface [`DiagramEngine`].
//!
//! ```text
//! SurfaceHandle ──SurfaceMsg──> Surface ──insert/show──> Canvas
//!                                  │
//!                                  └──SurfaceEvent (render-result)──> panel
//! ```

mod canvas;
pub mod detect;
mod engine;
mod handle;
mod message;

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread;

use tokio::sync::mpsc;

use crate::core::{ImageFormat, Theme};

pub use canvas::{Canvas, CanvasError, FileCanvas, validate_svg};
pub use detect::{Detection, Signals, UpdateReport};
pub use engine::{CompilerEngine, DiagramEngine};
pub use handle::SurfaceHandle;
pub use message::{Payload, RenderReply, RequestId, SurfaceEvent, SurfaceMsg};

/// Display side of one panel.
pub struct Surface<C, E> {
    canvas: C,
    engine: E,
    events: mpsc::UnboundedSender<SurfaceEvent>,
    /// Theme the engine was last initialized with.
    theme: Option<Theme>,
}

/// A surface running on its own thread.
pub struct SpawnedSurface {
    pub handle: SurfaceHandle,
    pub events: mpsc::UnboundedReceiver<SurfaceEvent>,
    pub thread: thread::JoinHandle<()>,
}

impl<C: Canvas, E: DiagramEngine> Surface<C, E> {
    pub fn new(canvas: C, engine: E, events: mpsc::UnboundedSender<SurfaceEvent>) -> Self {
        Self {
            canvas,
            engine,
            events,
            theme: None,
        }
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    /// Handle one message.
    pub fn handle(&mut self, msg: SurfaceMsg) {
        match msg {
            SurfaceMsg::Init { theme } => self.initialize(theme),
            SurfaceMsg::Update {
                content,
                format,
                theme,
            } => self.on_update(content, format, theme),
            SurfaceMsg::RenderRequest { id, source, theme } => {
                crate::debug!("surface"; "render request {id} ({} bytes)", source.len());
                self.render_source(Some(id), &source, theme);
            }
            SurfaceMsg::Error { message, line } => {
                self.canvas.show_error(&error_text(&message, line));
            }
        }
    }

    /// Read messages until every handle is dropped.
    pub fn run(mut self, mut rx: mpsc::UnboundedReceiver<SurfaceMsg>) {
        while let Some(msg) = rx.blocking_recv() {
            self.handle(msg);
        }
        crate::debug!("surface"; "closed");
    }

    fn initialize(&mut self, theme: Theme) {
        if self.theme == Some(theme) {
            return;
        }
        self.engine.initialize(theme);
        self.theme = Some(theme);
    }

    fn on_update(&mut self, content: Payload, format: ImageFormat, theme: Theme) {
        let report = detect::inspect(&content, format);

        match (report.detection, content) {
            (Detection::Image, Payload::Binary(bytes)) => {
                if let Err(e) = self.canvas.show_image(&bytes, format) {
                    self.canvas.show_error(&format!("Failed to display image: {e}"));
                }
            }
            (Detection::Image, Payload::Text(text)) => {
                if let Err(e) = self.canvas.show_image(text.as_bytes(), format) {
                    self.canvas.show_error(&format!("Failed to display image: {e}"));
                }
            }
            (Detection::Markup, content) => {
                let text = payload_text(content);
                if let Err(message) = self.insert_markup(&text) {
                    self.canvas.show_error(&message);
                }
            }
            (Detection::RawSource, content) => {
                let text = payload_text(content);
                self.render_source(None, &text, theme);
            }
        }
    }

    /// Render raw source in-surface. With a request id the outcome is
    /// acknowledged exactly once and a failure is left for the panel to show.
    fn render_source(&mut self, request: Option<RequestId>, source: &str, theme: Theme) {
        self.initialize(theme);

        let reply = match self.engine.render(source) {
            Ok(svg) => match self.insert_markup(&svg) {
                Ok(()) => RenderReply::Success { svg },
                Err(message) => RenderReply::Failure { message },
            },
            Err(message) => RenderReply::Failure { message },
        };

        match (request, reply) {
            (Some(id), reply) => {
                crate::debug!("surface"; "ack {id}: {}", reply_kind(&reply));
                let _ = self.events.send(SurfaceEvent::RenderResult { id, reply });
            }
            (None, RenderReply::Failure { message }) => self.canvas.show_error(&message),
            (None, RenderReply::Success { .. }) => {}
        }
    }

    /// Insert markup, turning both errors and panics into an error message.
    fn insert_markup(&mut self, markup: &str) -> Result<(), String> {
        let body = detect::markup_body(markup);
        let outcome = catch_unwind(AssertUnwindSafe(|| self.canvas.insert_svg(body)));

        let message = match outcome {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => format!("Failed to insert SVG: {e}"),
            Err(panic) => format!("Failed to insert SVG: {}", panic_message(&*panic)),
        };
        crate::log!("surface"; "{message}");
        Err(message)
    }
}

impl<C, E> Surface<C, E>
where
    C: Canvas + 'static,
    E: DiagramEngine + 'static,
{
    /// Run a surface on a dedicated thread.
    pub fn spawn(canvas: C, engine: E) -> SpawnedSurface {
        let (handle, rx) = SurfaceHandle::channel();
        let (events_tx, events) = mpsc::unbounded_channel();
        let surface = Self::new(canvas, engine, events_tx);
        let thread = thread::spawn(move || surface.run(rx));
        SpawnedSurface {
            handle,
            events,
            thread,
        }
    }
}

fn payload_text(content: Payload) -> String {
    match content {
        Payload::Text(text) => text,
        Payload::Binary(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
    }
}

fn error_text(message: &str, line: Option<u32>) -> String {
    match line {
        Some(line) if !message.contains(&line.to_string()) => format!("{message} (line {line})"),
        _ => message.to_string(),
    }
}

fn reply_kind(reply: &RenderReply) -> &'static str {
    match reply {
        RenderReply::Success { .. } => "success",
        RenderReply::Failure { .. } => "failure",
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
