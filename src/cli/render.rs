//! `render`: one render cycle through a panel, written to disk.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};

use super::{OutputArgs, file_surface, runtime};
use crate::config::PreviewConfig;
use crate::context::PreviewContext;
use crate::core::{DiagramFile, ImageFormat};
use crate::panel::PanelState;
use crate::surface::SpawnedSurface;

pub fn render_file(
    file: &Path,
    output: &OutputArgs,
    format: Option<ImageFormat>,
    mut config: PreviewConfig,
) -> Result<()> {
    output.apply(&mut config);
    if let Some(format) = format {
        config.plantuml.format = format;
        config.structurizr.format = format;
    }

    let diagram =
        DiagramFile::read(file).with_context(|| format!("failed to read `{}`", file.display()))?;
    let SpawnedSurface {
        handle,
        events,
        thread,
    } = file_surface(&config, output.output_for(file));

    let state = runtime()?.block_on(async move {
        let mut ctx = PreviewContext::new(config);
        let panel = ctx.open_panel(handle, events);
        let mut state = panel.subscribe();
        panel.open(diagram);

        let settled = *state.wait_for(|s| s.is_settled()).await?;
        ctx.dispose().await;
        anyhow::Ok(settled)
    })?;

    // the surface exits once every handle is gone, after its last write
    thread
        .join()
        .map_err(|_| anyhow!("display surface panicked"))?;

    match state {
        PanelState::Displayed => Ok(()),
        PanelState::Unsupported => bail!("`{}` is not a supported diagram", file.display()),
        _ => bail!("failed to render `{}`", file.display()),
    }
}
