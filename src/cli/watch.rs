//! `watch`: keep a panel open and feed it every saved change.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use notify::{EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::{OutputArgs, file_surface, runtime};
use crate::cache::ContentHash;
use crate::config::PreviewConfig;
use crate::context::PreviewContext;
use crate::core::DiagramFile;
use crate::surface::SpawnedSurface;
use crate::{debug, log};

pub fn watch_file(file: &Path, output: &OutputArgs, mut config: PreviewConfig) -> Result<()> {
    output.apply(&mut config);

    let path = file
        .canonicalize()
        .with_context(|| format!("failed to resolve `{}`", file.display()))?;
    let diagram =
        DiagramFile::read(&path).with_context(|| format!("failed to read `{}`", path.display()))?;
    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("`{}` has no parent directory", path.display()))?;

    let SpawnedSurface {
        handle,
        events,
        thread,
    } = file_surface(&config, output.output_for(file));

    let (shutdown_tx, mut shutdown_rx) = mpsc::unbounded_channel();
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(());
    })
    .map_err(|e| anyhow!("failed to set Ctrl+C handler: {}", e))?;

    // editors often save by rename, so watch the directory, not the file
    let (change_tx, mut change_rx) = mpsc::unbounded_channel();
    let target = path.clone();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(event) if touches(&event, &target) => {
                let _ = change_tx.send(());
            }
            Ok(_) => {}
            Err(e) => log!("watch"; "notify error: {}", e),
        }
    })?;
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;

    runtime()?.block_on(async move {
        let mut ctx = PreviewContext::new(config);
        let panel = ctx.open_panel(handle, events);
        let mut last = diagram.hash();
        panel.open(diagram);
        log!("watch"; "watching {} (Ctrl+C to stop)", path.display());

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                Some(()) = change_rx.recv() => {
                    match read_if_changed(&path, &mut last) {
                        Ok(Some(content)) => panel.edit(content),
                        Ok(None) => crate::logger::status_unchanged(&format!("unchanged: {}", display_name(&path))),
                        // mid-save; the next event brings the content
                        Err(e) => debug!("watch"; "read {}: {}", path.display(), e),
                    }
                }
            }
        }

        log!("watch"; "stopping");
        drop(watcher);
        ctx.dispose().await;
    });

    thread
        .join()
        .map_err(|_| anyhow!("display surface panicked"))
}

/// Whether a notify event is a content change of `target`.
fn touches(event: &notify::Event, target: &Path) -> bool {
    let relevant = match event.kind {
        EventKind::Create(_) => true,
        EventKind::Modify(notify::event::ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    };
    relevant
        && event
            .paths
            .iter()
            .any(|p| p == target || p.file_name() == target.file_name())
}

fn read_if_changed(path: &Path, last: &mut ContentHash) -> std::io::Result<Option<String>> {
    let content = fs::read_to_string(path)?;
    let hash = ContentHash::of(content.as_bytes());
    if hash == *last {
        return Ok(None);
    }
    *last = hash;
    Ok(Some(content))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn event(kind: EventKind, path: &Path) -> notify::Event {
        notify::Event {
            kind,
            paths: vec![path.to_path_buf()],
            attrs: notify::event::EventAttributes::new(),
        }
    }

    #[test]
    fn test_touches_filters_kind_and_path() {
        use notify::event::{CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind};

        let target = Path::new("/docs/flow.mmd");
        assert!(touches(
            &event(EventKind::Modify(ModifyKind::Data(DataChange::Any)), target),
            target
        ));
        assert!(touches(&event(EventKind::Create(CreateKind::File), target), target));
        assert!(!touches(
            &event(EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any)), target),
            target
        ));
        assert!(!touches(&event(EventKind::Remove(RemoveKind::File), target), target));
        assert!(!touches(
            &event(
                EventKind::Modify(ModifyKind::Data(DataChange::Any)),
                Path::new("/docs/other.mmd")
            ),
            target
        ));
    }

    #[test]
    fn test_read_if_changed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.puml");
        fs::write(&path, "A -> B").unwrap();

        let mut last = ContentHash::of(b"A -> B");
        assert_eq!(read_if_changed(&path, &mut last).unwrap(), None);

        fs::write(&path, "A -> C").unwrap();
        assert_eq!(read_if_changed(&path, &mut last).unwrap().as_deref(), Some("A -> C"));
        assert_eq!(last, ContentHash::of(b"A -> C"));
    }
}
