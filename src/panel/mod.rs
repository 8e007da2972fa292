//! Panel/update controller.
//!
//! One [`PanelActor`] per open preview. It binds one document, resolves its
//! backend, and drives renders through the adapter, one at a time:
//!
//! - edits go through a debouncer that keeps only the newest content
//! - a due edit starts only when nothing is in flight, so outcomes reach the
//!   surface in edit order
//! - a deferred (in-surface) render stays in flight until its correlation id
//!   comes back from the surface; other ids are stale and dropped
//!
//! ```text
//! PanelHandle ──PanelCmd──> PanelActor ──render──> adapter (blocking pool)
//!                               │  ▲
//!  update / render-request /    │  │ SurfaceEvent (render-result)
//!  error                        │  │
//!                               ▼  │
//!                              Surface
//! ```
//!
//! The panel never touches a cache; caching is internal to the adapters.

mod debounce;
mod state;


use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::adapter::{Backends, RenderOutcome, Renderer, SurfaceRender};
use crate::backend::resolve;
use crate::core::{DiagramFile, ImageFormat, RenderOptions, RenderResult, Theme};
use crate::surface::{Payload, RequestId, SurfaceEvent, SurfaceHandle};

use debounce::Debouncer;

pub use debounce::DEBOUNCE_MS;
pub use state::{PanelCmd, PanelId, PanelState};

/// The render currently owned by a panel.
enum InFlight {
    /// Adapter call running on the blocking pool.
    Compile(JoinHandle<RenderOutcome>),
    /// Raw source handed to the surface, awaiting its acknowledgement.
    Surface(RequestId),
}

pub struct PanelActor {
    id: PanelId,
    rx: mpsc::UnboundedReceiver<PanelCmd>,
    events: mpsc::UnboundedReceiver<SurfaceEvent>,
    surface: SurfaceHandle,
    backends: Arc<Backends>,
    state: watch::Sender<PanelState>,
    theme: Theme,
    debouncer: Debouncer,
    /// Snapshot of the last render started.
    file: Option<DiagramFile>,
    adapter: Option<Arc<dyn Renderer>>,
    in_flight: Option<InFlight>,
}

/// Controller side of a running panel.
pub struct PanelHandle {
    id: PanelId,
    tx: mpsc::UnboundedSender<PanelCmd>,
    state: watch::Receiver<PanelState>,
    task: JoinHandle<()>,
}

impl PanelHandle {
    pub fn id(&self) -> PanelId {
        self.id
    }

    pub fn open(&self, file: DiagramFile) {
        self.send(PanelCmd::Open(file));
    }

    pub fn edit(&self, content: impl Into<String>) {
        self.send(PanelCmd::Edit(content.into()));
    }

    pub fn set_theme(&self, theme: Theme) {
        self.send(PanelCmd::Theme(theme));
    }

    pub fn close(&self) {
        self.send(PanelCmd::Close);
    }

    pub fn state(&self) -> PanelState {
        *self.state.borrow()
    }

    /// Receiver for observing state transitions.
    pub fn subscribe(&self) -> watch::Receiver<PanelState> {
        self.state.clone()
    }

    /// Close and wait for the actor to release everything.
    pub async fn shutdown(self) {
        self.close();
        let _ = self.task.await;
    }

    fn send(&self, cmd: PanelCmd) {
        if self.tx.send(cmd).is_err() {
            crate::debug!("panel"; "{} is closed", self.id);
        }
    }
}

impl PanelActor {
    /// Spawn a panel on the current runtime.
    pub fn spawn(
        id: PanelId,
        surface: SurfaceHandle,
        events: mpsc::UnboundedReceiver<SurfaceEvent>,
        backends: Arc<Backends>,
        theme: Theme,
        debounce: Duration,
    ) -> PanelHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(PanelState::Idle);

        let actor = Self {
            id,
            rx,
            events,
            surface,
            backends,
            state: state_tx,
            theme,
            debouncer: Debouncer::new(debounce),
            file: None,
            adapter: None,
            in_flight: None,
        };
        let task = tokio::spawn(actor.run());

        PanelHandle {
            id,
            tx,
            state: state_rx,
            task,
        }
    }

    /// Main event loop. Commands win over everything so `Close` always gets through.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                biased;

                cmd = self.rx.recv() => {
                    let Some(cmd) = cmd else { break };
                    if !self.dispatch(cmd) {
                        break;
                    }
                }

                Some(event) = self.events.recv() => self.on_surface_event(event),

                outcome = wait_render(&mut self.in_flight) => {
                    self.in_flight = None;
                    self.on_outcome(outcome);
                }

                () = self.debouncer.wait(), if self.in_flight.is_none() => {
                    if let Some(file) = self.debouncer.take() {
                        self.start_render(file);
                    }
                }
            }
        }

        self.close();
    }

    /// Handle a command; `false` once the panel should stop.
    fn dispatch(&mut self, cmd: PanelCmd) -> bool {
        match cmd {
            PanelCmd::Open(file) => self.on_open(file),
            PanelCmd::Edit(content) => self.on_edit(content),
            PanelCmd::Theme(theme) => self.on_theme(theme),
            PanelCmd::Close => return false,
        }
        true
    }

    fn on_open(&mut self, file: DiagramFile) {
        self.cancel_in_flight();
        self.debouncer.clear();
        if let Some(old) = self.adapter.take() {
            old.detach(self.id);
        }
        self.file = None;

        self.set_state(PanelState::Resolving);
        match resolve(file.extension()) {
            Ok(descriptor) => {
                crate::debug!("panel"; "{} -> {}", file.display_name(), descriptor);
                let adapter = self.backends.for_descriptor(descriptor);
                adapter.attach(self.id, self.surface.clone());
                self.adapter = Some(adapter);
                self.start_render(file);
            }
            Err(unsupported) => {
                crate::log!("panel"; "{}: {}", file.display_name(), unsupported);
                self.surface.error(unsupported.to_string(), None);
                self.set_state(PanelState::Unsupported);
            }
        }
    }

    fn on_edit(&mut self, content: String) {
        let Some(base) = self.debouncer.peek().or(self.file.as_ref()) else {
            crate::debug!("panel"; "{}: edit ignored ({})", self.id, self.current_state());
            return;
        };
        if self.adapter.is_none() {
            return;
        }
        let next = base.with_content(content);
        self.debouncer.push(next);
    }

    fn on_theme(&mut self, theme: Theme) {
        self.theme = theme;
        if self.adapter.is_none() {
            return;
        }
        self.cancel_in_flight();
        // pending edit is newer than the last render
        let file = self.debouncer.take().or_else(|| self.file.clone());
        if let Some(file) = file {
            self.start_render(file);
        }
    }

    fn start_render(&mut self, file: DiagramFile) {
        let Some(adapter) = self.adapter.clone() else {
            return;
        };
        self.set_state(PanelState::Resolving);

        let options = RenderOptions::for_file(&file, self.theme);
        let content = file.shared_content();
        self.file = Some(file);
        self.set_state(PanelState::Rendering);

        let task = tokio::task::spawn_blocking(move || adapter.render(&content, &options));
        self.in_flight = Some(InFlight::Compile(task));
    }

    fn on_outcome(&mut self, outcome: RenderOutcome) {
        match outcome {
            RenderOutcome::Ready(result) => self.display(&result),
            RenderOutcome::Deferred(SurfaceRender { id, source, theme }) => {
                crate::debug!("panel"; "{}: surface render {id}", self.id);
                self.surface.render_request(id, source.to_string(), theme);
                self.in_flight = Some(InFlight::Surface(id));
            }
        }
    }

    fn on_surface_event(&mut self, event: SurfaceEvent) {
        let SurfaceEvent::RenderResult { id, reply } = event;

        let awaited = matches!(self.in_flight, Some(InFlight::Surface(current)) if current == id);
        if !awaited {
            crate::debug!("panel"; "{}: ignoring stale result {id}", self.id);
            return;
        }
        self.in_flight = None;

        let Some(adapter) = self.adapter.clone() else {
            return;
        };
        match adapter.acknowledge(id, reply) {
            // the surface already shows the markup it rendered
            Some(result) if !result.is_error() => self.set_state(PanelState::Displayed),
            Some(result) => self.display(&result),
            None => crate::debug!("panel"; "{}: {id} was withdrawn by the adapter", self.id),
        }
    }

    /// Deliver a finished result: exactly one show or one error display.
    fn display(&mut self, result: &RenderResult) {
        match result {
            RenderResult::Svg(markup) => {
                self.surface
                    .update(Payload::Text(markup.to_string()), ImageFormat::Svg, self.theme);
                self.set_state(PanelState::Displayed);
            }
            RenderResult::Png(bytes) => {
                self.surface
                    .update(Payload::Binary(bytes.to_vec()), ImageFormat::Png, self.theme);
                self.set_state(PanelState::Displayed);
            }
            RenderResult::Error { message, line } => {
                let name = self
                    .file
                    .as_ref()
                    .map_or_else(|| self.id.to_string(), DiagramFile::display_name);
                crate::log!("panel"; "{}: {}", name, result.error_text().unwrap_or_default());
                self.surface.error(message.clone(), *line);
                self.set_state(PanelState::Error);
            }
        }
    }

    fn cancel_in_flight(&mut self) {
        match self.in_flight.take() {
            Some(InFlight::Compile(task)) => {
                // a running compiler can't be interrupted; its outcome is dropped
                task.abort();
                crate::debug!("panel"; "{}: dropped in-flight render", self.id);
            }
            Some(InFlight::Surface(id)) => {
                if let Some(adapter) = &self.adapter {
                    adapter.cancel(id);
                }
            }
            None => {}
        }
    }

    fn close(&mut self) {
        self.cancel_in_flight();
        self.debouncer.clear();
        if let Some(adapter) = self.adapter.take() {
            adapter.detach(self.id);
        }
        self.file = None;
        self.set_state(PanelState::Idle);
        crate::debug!("panel"; "{} closed", self.id);
    }

    fn current_state(&self) -> PanelState {
        *self.state.borrow()
    }

    fn set_state(&self, next: PanelState) {
        let prev = self.state.send_replace(next);
        if prev != next {
            crate::debug!("panel"; "{}: {} -> {}", self.id, prev, next);
        }
    }
}

/// Wait for the in-flight adapter call (pending forever otherwise).
async fn wait_render(task: &mut Option<InFlight>) -> RenderOutcome {
    match task {
        Some(InFlight::Compile(handle)) => match handle.await {
            Ok(outcome) => outcome,
            Err(e) => RenderOutcome::ready(RenderResult::error(format!("render task failed: {e}"))),
        },
        _ => std::future::pending().await,
    }
}
