//! Renderer adapters.
//!
//! One adapter per diagram family, all behind [`Renderer`]:
//!
//! - [`MermaidAdapter`] (surface family): a cache miss hands raw source back
//!   as [`RenderOutcome::Deferred`]; the panel ships it to the surface, and the
//!   surface's `render-result` goes back through [`Renderer::acknowledge`].
//!   Only a successful acknowledgement populates the cache.
//! - [`ExternalAdapter`] (compiler family): compiles synchronously and writes
//!   successful results through to the cache.
//!
//! Every adapter owns its [`RenderCache`](crate::cache::RenderCache); nothing
//! else touches it.

mod external;
mod mermaid;
mod registry;

use std::sync::Arc;

use crate::core::{RenderOptions, RenderResult, Theme};
use crate::panel::PanelId;
use crate::surface::{RenderReply, RequestId, SurfaceHandle};

pub use external::ExternalAdapter;
pub use mermaid::MermaidAdapter;
pub use registry::Backends;

/// Source to be rendered by the display surface itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceRender {
    /// Correlation id the surface must echo back.
    pub id: RequestId,
    pub source: Arc<str>,
    pub theme: Theme,
}

/// What an adapter's `render` produced.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// A finished result (image or error).
    Ready(Arc<RenderResult>),
    /// Raw source for the surface; finished by a later acknowledgement.
    Deferred(SurfaceRender),
}

impl RenderOutcome {
    pub fn ready(result: RenderResult) -> Self {
        Self::Ready(Arc::new(result))
    }
}

/// Render contract shared by every diagram family.
///
/// Methods never panic and never return `Err`: failures come back as
/// [`RenderResult::Error`].
pub trait Renderer: Send + Sync {
    fn name(&self) -> &'static str;

    fn supported_extensions(&self) -> &'static [&'static str];

    /// Render `content`. Blocking; may invoke an external process.
    fn render(&self, content: &str, options: &RenderOptions) -> RenderOutcome;

    /// Complete a deferred render. Unknown ids are stale and yield `None`.
    fn acknowledge(&self, _id: RequestId, _reply: RenderReply) -> Option<Arc<RenderResult>> {
        None
    }

    /// Forget a deferred render; its acknowledgement will be ignored.
    fn cancel(&self, _id: RequestId) {}

    /// Drop every cached result and re-initialize surface engines.
    fn handle_theme_change(&self, theme: Theme);

    /// Register a panel's surface for theme-change notifications.
    fn attach(&self, _panel: PanelId, _surface: SurfaceHandle) {}

    /// Release a panel's listener.
    fn detach(&self, _panel: PanelId) {}

    fn dispose(&self);
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::compiler::{CompileError, CompiledImage, DiagramCompiler};
    use crate::core::Theme;

    /// Compiler stub that counts invocations.
    #[derive(Default)]
    pub struct CountingCompiler {
        pub calls: AtomicUsize,
        pub probes: AtomicUsize,
        pub unavailable: bool,
    }

    impl CountingCompiler {
        pub fn unavailable() -> Self {
            Self {
                unavailable: true,
                ..Default::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl DiagramCompiler for CountingCompiler {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn probe(&self) -> Result<(), CompileError> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            if self.unavailable {
                return Err(CompileError::Unavailable {
                    tool: "stub".into(),
                    hint: "install stub from https://example.invalid".into(),
                });
            }
            Ok(())
        }

        fn compile(&self, source: &str, theme: Theme) -> Result<CompiledImage, CompileError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if source.contains("error") {
                return Err(CompileError::syntax("Syntax Error? (line 2)"));
            }
            if source.contains("png") {
                return Ok(CompiledImage::Png(vec![0x89, b'P', b'N', b'G']));
            }
            Ok(CompiledImage::Svg(format!(
                "<svg data-theme=\"{}\"><text>{}</text></svg>",
                theme.name(),
                source.trim()
            )))
        }
    }

    /// Lets a test keep the counters while the adapter owns the box.
    impl DiagramCompiler for Arc<CountingCompiler> {
        fn name(&self) -> &'static str {
            CountingCompiler::name(self)
        }

        fn probe(&self) -> Result<(), CompileError> {
            CountingCompiler::probe(self)
        }

        fn compile(&self, source: &str, theme: Theme) -> Result<CompiledImage, CompileError> {
            CountingCompiler::compile(self, source, theme)
        }
    }
}
