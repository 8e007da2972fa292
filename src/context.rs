//! Composition root.
//!
//! [`PreviewContext`] owns everything that would otherwise be global: the
//! configuration, the adapters (and through them every render cache), the
//! current theme and the open panels. It is built once by the CLI and passed
//! down explicitly.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tokio::sync::mpsc;

use crate::adapter::Backends;
use crate::config::PreviewConfig;
use crate::core::Theme;
use crate::panel::{PanelActor, PanelHandle, PanelId};
use crate::surface::{SurfaceEvent, SurfaceHandle};

pub struct PreviewContext {
    config: Arc<PreviewConfig>,
    backends: Arc<Backends>,
    theme: Theme,
    panels: FxHashMap<PanelId, PanelHandle>,
    next_panel: u64,
}

impl PreviewContext {
    pub fn new(config: PreviewConfig) -> Self {
        let backends = Backends::new(&config);
        Self::with_backends(config, backends)
    }

    pub fn with_backends(config: PreviewConfig, backends: Backends) -> Self {
        Self {
            theme: config.preview.theme,
            config: Arc::new(config),
            backends: Arc::new(backends),
            panels: FxHashMap::default(),
            next_panel: 1,
        }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn backends(&self) -> &Arc<Backends> {
        &self.backends
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Start a panel bound to a surface. Must be called inside a tokio runtime.
    pub fn open_panel(
        &mut self,
        surface: SurfaceHandle,
        events: mpsc::UnboundedReceiver<SurfaceEvent>,
    ) -> &PanelHandle {
        let id = PanelId(self.next_panel);
        self.next_panel += 1;

        let handle = PanelActor::spawn(
            id,
            surface,
            events,
            Arc::clone(&self.backends),
            self.theme,
            self.config.debounce(),
        );
        crate::debug!("panel"; "opened {id}");
        self.panels.entry(id).or_insert(handle)
    }

    pub fn panel(&self, id: PanelId) -> Option<&PanelHandle> {
        self.panels.get(&id)
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    /// Close one panel and wait until it has released its listeners.
    pub async fn close_panel(&mut self, id: PanelId) {
        if let Some(panel) = self.panels.remove(&id) {
            panel.shutdown().await;
        }
    }

    /// Switch theme: caches are dropped once, then every panel re-renders.
    pub fn set_theme(&mut self, theme: Theme) {
        if theme == self.theme {
            return;
        }
        self.theme = theme;
        self.backends.handle_theme_change(theme);
        for panel in self.panels.values() {
            panel.set_theme(theme);
        }
        crate::log!("preview"; "theme: {theme}");
    }

    /// Close every panel, then dispose the adapters.
    pub async fn dispose(mut self) {
        for (_, panel) in self.panels.drain() {
            panel.shutdown().await;
        }
        self.backends.dispose();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::adapter::testing::CountingCompiler;
    use crate::core::DiagramFile;
    use crate::panel::PanelState;
    use crate::surface::{Payload, SurfaceMsg};

    fn context() -> PreviewContext {
        let backends = Backends::with_compilers(
            4,
            Theme::Light,
            Box::new(CountingCompiler::default()),
            Box::new(CountingCompiler::default()),
        );
        PreviewContext::with_backends(PreviewConfig::default(), backends)
    }

    async fn recv(rx: &mut mpsc::UnboundedReceiver<SurfaceMsg>) -> SurfaceMsg {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_theme_switch_reaches_every_panel() {
        let mut ctx = context();
        let (surface_a, mut rx_a) = SurfaceHandle::channel();
        let (surface_b, mut rx_b) = SurfaceHandle::channel();
        let (_events_a, events_a) = mpsc::unbounded_channel();
        let (_events_b, events_b) = mpsc::unbounded_channel();

        let a = ctx.open_panel(surface_a, events_a).id();
        let b = ctx.open_panel(surface_b, events_b).id();
        assert_ne!(a, b);

        ctx.panel(a).unwrap().open(DiagramFile::new("a.puml", "A -> B"));
        ctx.panel(b).unwrap().open(DiagramFile::new("b.mmd", "graph TD;A-->B"));
        recv(&mut rx_a).await;
        assert_eq!(recv(&mut rx_b).await, SurfaceMsg::Init { theme: Theme::Light });
        recv(&mut rx_b).await;

        ctx.set_theme(Theme::Dark);
        assert!(ctx.backends().plantuml().cache().is_empty());

        match recv(&mut rx_a).await {
            SurfaceMsg::Update {
                content: Payload::Text(svg),
                theme,
                ..
            } => {
                assert!(svg.contains("dark"));
                assert_eq!(theme, Theme::Dark);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(recv(&mut rx_b).await, SurfaceMsg::Init { theme: Theme::Dark });
        assert!(matches!(
            recv(&mut rx_b).await,
            SurfaceMsg::RenderRequest { theme: Theme::Dark, .. }
        ));

        ctx.dispose().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_panel_releases_it() {
        let mut ctx = context();
        let (surface, _rx) = SurfaceHandle::channel();
        let (_events_tx, events) = mpsc::unbounded_channel();
        let id = ctx.open_panel(surface, events).id();
        let state = ctx.panel(id).unwrap().subscribe();

        ctx.close_panel(id).await;
        assert_eq!(ctx.panel_count(), 0);
        assert_eq!(*state.borrow(), PanelState::Idle);
    }

    #[test]
    fn test_same_theme_is_a_no_op() {
        let mut ctx = context();
        ctx.set_theme(Theme::Light);
        assert_eq!(ctx.theme(), Theme::Light);
    }
}
