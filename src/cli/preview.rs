//! `preview` command: voxelize one file, optionally in watch mode.
//!
//! Watch mode keeps the rasterized buffer and re-synthesizes when the
//! settings file changes. Editing the source file re-rasterizes it.
//!
//! ```text
//! notify ──► debounce ──► classify ──► settings: reload config
//!                                  └─► source:   invalidate buffer
//!                                          │
//!                                          ▼
//!                                 synthesize ──► write ──► WatchStatus
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};

use super::StyleArgs;
use super::args::SessionArgs;
use super::settings::Settings;
use crate::batch::{FileSystem, LocalFs};
use crate::core::{enable_graceful_shutdown, is_shutdown};
use crate::image::raster::ResvgRasterizer;
use crate::image::voxel::{RandomSource, random_source, shape_count};
use crate::logger::WatchStatus;
use crate::preview::PreviewSession;
use crate::utils::path::{expand_path, normalize_path};
use crate::{debug, log};

/// Quiet period after the last event before acting on a burst.
const DEBOUNCE: Duration = Duration::from_millis(100);
/// How often the loop checks for Ctrl+C while idle.
const POLL: Duration = Duration::from_millis(250);

/// Options of one preview invocation.
pub struct PreviewArgs<'a> {
    pub file: &'a Path,
    pub output: Option<&'a Path>,
    pub watch: bool,
    pub style: &'a StyleArgs,
    pub session: &'a SessionArgs,
}

/// Execute the preview command.
pub fn preview_file(settings: &mut Settings, args: &PreviewArgs<'_>) -> Result<()> {
    let file = expand_path(args.file);
    let output = args.output.map(expand_path);
    let mut rng = random_source(args.session.seed);
    let mut preview = Preview {
        session: PreviewSession::new(ResvgRasterizer),
        file,
        output,
        markup: None,
    };

    if args.watch {
        watch(settings, &mut preview, rng.as_mut(), args.style)?;
    } else {
        let svg = preview.render(settings, rng.as_mut())?;
        preview.emit(&svg)?;
    }

    settings
        .persist(!args.session.no_persist)
        .context("failed to save settings")
}

/// Source file, its cached markup and the raster cache.
struct Preview {
    session: PreviewSession<ResvgRasterizer>,
    file: PathBuf,
    output: Option<PathBuf>,
    markup: Option<String>,
}

impl Preview {
    fn render(&mut self, settings: &Settings, rng: &mut dyn RandomSource) -> Result<String> {
        let markup = match self.markup.take() {
            Some(markup) => markup,
            None => fs::read_to_string(&self.file)
                .with_context(|| format!("cannot read {}", self.file.display()))?,
        };
        let markup = self.markup.insert(markup);

        self.session
            .render(&self.file, markup, settings.config(), rng)
            .with_context(|| format!("cannot render {}", self.file.display()))
    }

    /// Forget the source markup and its raster.
    fn invalidate(&mut self) {
        self.markup = None;
        self.session.invalidate();
    }

    fn emit(&self, svg: &str) -> Result<()> {
        match &self.output {
            Some(path) => LocalFs
                .write_text(path, svg)
                .with_context(|| format!("cannot write {}", path.display())),
            None => {
                println!("{svg}");
                Ok(())
            }
        }
    }

    fn name(&self) -> String {
        self.file
            .file_name()
            .map_or_else(|| self.file.display().to_string(), |n| n.to_string_lossy().into_owned())
    }

    /// Render, write, and report the outcome on `status`.
    fn refresh(&mut self, settings: &Settings, rng: &mut dyn RandomSource, status: &mut WatchStatus) {
        let result = self.render(settings, rng).and_then(|svg| {
            self.emit(&svg)?;
            Ok(shape_count(&svg))
        });
        match result {
            Ok(shapes) => status.success(&format!("re-synthesized {} ({shapes} shapes)", self.name())),
            Err(e) => status.error(&format!("failed: {}", self.name()), &format!("{e:#}")),
        }
    }
}

/// What a burst of events touched.
#[derive(Debug, Default, PartialEq, Eq)]
struct Changes {
    source: bool,
    settings: bool,
}

impl Changes {
    fn add(&mut self, event: &Event, source: &Path, settings: Option<&Path>) {
        if matches!(event.kind, EventKind::Access(_)) {
            return;
        }
        for path in &event.paths {
            self.source |= same_file(path, source);
            self.settings |= settings.is_some_and(|s| same_file(path, s));
        }
    }

    fn is_empty(&self) -> bool {
        !self.source && !self.settings
    }
}

/// Path equality tolerant of symlinked or relative parents.
fn same_file(a: &Path, b: &Path) -> bool {
    a == b
        || (a.file_name() == b.file_name()
            && a.parent().map(normalize_path) == b.parent().map(normalize_path))
}

fn watch(
    settings: &mut Settings,
    preview: &mut Preview,
    rng: &mut dyn RandomSource,
    style: &StyleArgs,
) -> Result<()> {
    let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let _ = tx.send(res);
    })
    .context("failed to start file watcher")?;

    // Watch parent directories: editors replace files instead of writing in place.
    let settings_path = settings.path().map(Path::to_path_buf);
    let mut dirs: Vec<PathBuf> = Vec::new();
    for target in std::iter::once(preview.file.as_path()).chain(settings_path.as_deref()) {
        if let Some(dir) = target.parent().filter(|d| d.is_dir())
            && !dirs.iter().any(|d| d == dir)
        {
            dirs.push(dir.to_path_buf());
        }
    }
    for dir in &dirs {
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("cannot watch {}", dir.display()))?;
        debug!("watch"; "watching {}", dir.display());
    }
    if let Some(path) = &settings_path
        && !path.parent().is_some_and(Path::is_dir)
    {
        log!("watch"; "settings directory of {} does not exist yet, not watching it", path.display());
    }

    enable_graceful_shutdown();
    log!("watch"; "watching {} (Ctrl+C to stop)", preview.name());

    let mut status = WatchStatus::new();
    preview.refresh(settings, rng, &mut status);

    while !is_shutdown() {
        let first = match rx.recv_timeout(POLL) {
            Ok(res) => res,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let mut changes = Changes::default();
        let mut record = |res: notify::Result<Event>| match res {
            Ok(event) => changes.add(&event, &preview.file, settings_path.as_deref()),
            Err(e) => status.warning(&format!("notify error: {e}")),
        };
        record(first);
        let deadline = Instant::now() + DEBOUNCE;
        while let Ok(res) = rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            record(res);
        }

        if changes.is_empty() {
            continue;
        }
        debug!("watch"; "changed: source={} settings={}", changes.source, changes.settings);

        let mut dirty = changes.source;
        if changes.source {
            preview.invalidate();
        }
        if changes.settings {
            match settings.reload(style) {
                Ok(changed) => dirty |= changed,
                Err(e) => {
                    status.error("settings", &format!("{e:#}"));
                    continue;
                }
            }
        }
        if dirty {
            preview.refresh(settings, rng, &mut status);
        }
    }

    debug!("watch"; "stopped after {} rasterizations", preview.session.rasterized());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use notify::event::{AccessKind, CreateKind, ModifyKind};
    use tempfile::TempDir;

    fn event(kind: EventKind, path: &Path) -> Event {
        Event::new(kind).add_path(path.to_path_buf())
    }

    #[test]
    fn test_changes_classify_paths() {
        let source = Path::new("/icons/star.svg");
        let settings = Path::new("/config/settings.json");
        let mut changes = Changes::default();

        changes.add(
            &event(EventKind::Modify(ModifyKind::Any), Path::new("/icons/other.svg")),
            source,
            Some(settings),
        );
        assert!(changes.is_empty());

        changes.add(&event(EventKind::Create(CreateKind::File), source), source, Some(settings));
        assert_eq!(
            changes,
            Changes {
                source: true,
                settings: false
            }
        );

        changes.add(&event(EventKind::Modify(ModifyKind::Any), settings), source, Some(settings));
        assert!(changes.source && changes.settings);
    }

    #[test]
    fn test_changes_ignore_access() {
        let source = Path::new("/icons/star.svg");
        let mut changes = Changes::default();
        changes.add(&event(EventKind::Access(AccessKind::Any), source), source, None);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_same_file_through_relative_parent() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().canonicalize().unwrap();
        std::fs::create_dir(dir.join("icons")).unwrap();

        let direct = dir.join("icons/star.svg");
        let dotted = dir.join("icons/../icons/star.svg");
        assert!(same_file(&direct, &dotted));
        assert!(!same_file(&direct, &dir.join("icons/moon.svg")));
    }

    #[test]
    fn test_preview_writes_output() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("star.svg");
        let output = temp.path().join("out/star.svg");
        std::fs::write(
            &file,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><rect width="24" height="24"/></svg>"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "voxelizer",
            "--settings",
            temp.path().join("settings.json").to_str().unwrap(),
            "preview",
            file.to_str().unwrap(),
        ])
        .unwrap();
        let mut settings = Settings::load(&cli);
        let style = StyleArgs {
            grid: Some(4),
            ..StyleArgs::default()
        };
        settings.apply(&style).unwrap();

        let session = SessionArgs {
            seed: None,
            no_persist: true,
        };
        let args = PreviewArgs {
            file: &file,
            output: Some(&output),
            watch: false,
            style: &style,
            session: &session,
        };
        preview_file(&mut settings, &args).unwrap();

        let svg = std::fs::read_to_string(&output).unwrap();
        assert_eq!(shape_count(&svg), 16);
        assert!(!temp.path().join("settings.json").exists());
    }
}
