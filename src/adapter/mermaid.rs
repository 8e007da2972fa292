use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::{RenderOutcome, Renderer, SurfaceRender};
use crate::backend::DiagramType;
use crate::cache::RenderCache;
use crate::compiler::extract_line;
use crate::core::{RenderOptions, RenderResult, Theme};
use crate::panel::PanelId;
use crate::surface::{RenderReply, RequestId, SurfaceHandle};

/// Surface-family adapter for Mermaid.
///
/// Rendering happens in the surface's own engine. The adapter only tracks
/// outstanding requests by id and caches confirmed successes.
pub struct MermaidAdapter {
    cache: RenderCache,
    next_id: AtomicU64,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    /// Outstanding request id -> cache key it will fill.
    pending: FxHashMap<RequestId, String>,
    /// Surfaces to re-initialize on theme change.
    listeners: FxHashMap<PanelId, SurfaceHandle>,
    /// Whether attached engines were initialized with `theme`.
    initialized: bool,
    theme: Theme,
}

impl MermaidAdapter {
    pub fn new(cache_capacity: usize, theme: Theme) -> Self {
        Self {
            cache: RenderCache::new(cache_capacity),
            next_id: AtomicU64::new(1),
            state: Mutex::new(State {
                theme,
                ..State::default()
            }),
        }
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    /// Number of requests awaiting acknowledgement.
    pub fn pending(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().initialized
    }

    fn next_request(&self) -> RequestId {
        RequestId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl Renderer for MermaidAdapter {
    fn name(&self) -> &'static str {
        "mermaid"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        DiagramType::Mermaid.extensions()
    }

    fn render(&self, content: &str, options: &RenderOptions) -> RenderOutcome {
        if let Some(hit) = self.cache.get(&options.cache_key) {
            crate::debug!("mermaid"; "cache hit {}", options.cache_key);
            return RenderOutcome::Ready(hit);
        }

        let id = self.next_request();
        self.state
            .lock()
            .pending
            .insert(id, options.cache_key.clone());
        crate::debug!("mermaid"; "cache miss, deferring {id} to surface");

        RenderOutcome::Deferred(SurfaceRender {
            id,
            source: Arc::from(content),
            theme: options.theme,
        })
    }

    fn acknowledge(&self, id: RequestId, reply: RenderReply) -> Option<Arc<RenderResult>> {
        let Some(key) = self.state.lock().pending.remove(&id) else {
            crate::debug!("mermaid"; "ignoring stale ack {id}");
            return None;
        };

        let result = match reply {
            RenderReply::Success { svg } => {
                let result = Arc::new(RenderResult::svg(svg));
                self.cache.set(key, Arc::clone(&result));
                result
            }
            RenderReply::Failure { message } => {
                let line = extract_line(&message);
                Arc::new(RenderResult::error_at(message, line))
            }
        };
        Some(result)
    }

    fn cancel(&self, id: RequestId) {
        if self.state.lock().pending.remove(&id).is_some() {
            crate::debug!("mermaid"; "cancelled {id}");
        }
    }

    fn handle_theme_change(&self, theme: Theme) {
        self.cache.clear();

        let mut state = self.state.lock();
        state.pending.clear();
        state.theme = theme;
        state.initialized = false;
        state.listeners.retain(|_, surface| surface.init(theme));
        state.initialized = !state.listeners.is_empty();

        crate::debug!(
            "mermaid";
            "theme -> {}, re-initialized {} surface(s)",
            theme.engine_theme(),
            state.listeners.len()
        );
    }

    fn attach(&self, panel: PanelId, surface: SurfaceHandle) {
        let mut state = self.state.lock();
        let theme = state.theme;
        if surface.init(theme) {
            state.initialized = true;
        }
        state.listeners.insert(panel, surface);
    }

    fn detach(&self, panel: PanelId) {
        let mut state = self.state.lock();
        state.listeners.remove(&panel);
        if state.listeners.is_empty() {
            state.initialized = false;
        }
    }

    fn dispose(&self) {
        let mut state = self.state.lock();
        state.listeners.clear();
        state.pending.clear();
        state.initialized = false;
        crate::debug!("mermaid"; "disposed");
    }
}
