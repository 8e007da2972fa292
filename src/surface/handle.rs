use tokio::sync::mpsc;

use super::message::{Payload, RequestId, SurfaceMsg};
use crate::core::{ImageFormat, Theme};

/// Sending side of a display surface.
///
/// Cheap to clone; the panel controller and the adapters registered for that
/// panel each hold one. Sends never block and report `false` once the surface
/// is gone.
#[derive(Debug, Clone)]
pub struct SurfaceHandle {
    tx: mpsc::UnboundedSender<SurfaceMsg>,
}

impl SurfaceHandle {
    /// Create a handle and the receiver the surface reads from.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SurfaceMsg>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, msg: SurfaceMsg) -> bool {
        self.tx.send(msg).is_ok()
    }

    /// `show(content, format)`.
    pub fn update(&self, content: Payload, format: ImageFormat, theme: Theme) -> bool {
        self.send(SurfaceMsg::Update {
            content,
            format,
            theme,
        })
    }

    /// Ask the surface to render source itself and answer with `id`.
    pub fn render_request(&self, id: RequestId, source: impl Into<String>, theme: Theme) -> bool {
        self.send(SurfaceMsg::RenderRequest {
            id,
            source: source.into(),
            theme,
        })
    }

    pub fn init(&self, theme: Theme) -> bool {
        self.send(SurfaceMsg::Init { theme })
    }

    pub fn error(&self, message: impl Into<String>, line: Option<u32>) -> bool {
        self.send(SurfaceMsg::Error {
            message: message.into(),
            line,
        })
    }
}
