// Filesystem repository - gathers a log directory into a snapshot
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use image::{GenericImageView, ImageEncoder};
use serde_json::Value;
use walkdir::WalkDir;

use crate::application::log_repository::LogRepository;
use crate::domain::command::Command;
use crate::domain::run::Run;
use crate::domain::snapshot::{
    ImageEntry, Item, Kind, LogEntry, LogLine, MarkdownEntry, ScalarEntry, Snapshot, StepKey,
    TextEntry, Thumbnail,
};
use crate::infrastructure::config::Limits;
use crate::infrastructure::file_types::{categorise_file, FileCategory};

pub struct FsLogRepository {
    log_dir: PathBuf,
    limits: Limits,
}

impl FsLogRepository {
    pub fn new(log_dir: impl Into<PathBuf>, limits: Limits) -> Self {
        Self {
            log_dir: log_dir.into(),
            limits,
        }
    }
}

#[async_trait]
impl LogRepository for FsLogRepository {
    async fn list_runs(&self) -> Result<Vec<Run>> {
        let log_dir = self.log_dir.clone();
        tokio::task::spawn_blocking(move || list_runs(&log_dir)).await?
    }

    async fn load_snapshot(&self) -> Result<Snapshot> {
        let log_dir = self.log_dir.clone();
        let limits = self.limits;
        tokio::task::spawn_blocking(move || gather_snapshot(&log_dir, limits)).await?
    }
}

fn list_runs(log_dir: &Path) -> Result<Vec<Run>> {
    let entries = fs::read_dir(log_dir)
        .with_context(|| format!("failed to read log directory {}", log_dir.display()))?;
    let mut runs = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let modified = entry
            .metadata()
            .ok()
            .and_then(|meta| meta.modified().ok())
            .map(DateTime::<Utc>::from);
        runs.push(Run::new(name, modified));
    }
    runs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(runs)
}

pub(crate) fn gather_snapshot(log_dir: &Path, limits: Limits) -> Result<Snapshot> {
    let mut snapshot = Snapshot::new();
    for run in list_runs(log_dir)? {
        // Empty runs are still part of the snapshot.
        snapshot.add_run(&run.name);
        gather_run(&mut snapshot, log_dir, &run.name, limits);
    }
    Ok(snapshot)
}

fn gather_run(snapshot: &mut Snapshot, log_dir: &Path, name: &str, limits: Limits) {
    let run_dir = log_dir.join(name);
    if let Some(command) = load_command(&run_dir.join("command.json")) {
        snapshot.set_command(name, command);
    }

    // Directories with all-digit names hold the data of one step, everything
    // else belongs to the run as a whole.
    let mut step_dirs: Vec<(u64, String)> = Vec::new();
    if let Ok(entries) = fs::read_dir(&run_dir) {
        for entry in entries.flatten() {
            if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            let dir_name = entry.file_name().to_string_lossy().into_owned();
            if let Some(step) = parse_step_dir(&dir_name) {
                step_dirs.push((step, dir_name));
            }
        }
    }
    for (step, dir_name) in &step_dirs {
        gather_files(
            snapshot,
            &run_dir.join(dir_name),
            name,
            StepKey::Step(*step),
            log_dir,
            limits,
            &[],
        );
    }
    let ignore: Vec<String> = step_dirs.into_iter().map(|(_, dir)| dir).collect();
    gather_files(
        snapshot,
        &run_dir,
        name,
        StepKey::Global,
        log_dir,
        limits,
        &ignore,
    );
}

fn parse_step_dir(name: &str) -> Option<u64> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

fn gather_files(
    snapshot: &mut Snapshot,
    base: &Path,
    name: &str,
    step: StepKey,
    root: &Path,
    limits: Limits,
    ignore_dirs: &[String],
) {
    let walker = WalkDir::new(base)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| {
            !(entry.depth() == 1
                && entry.file_type().is_dir()
                && ignore_dirs
                    .iter()
                    .any(|dir| entry.file_name().to_string_lossy().as_ref() == dir.as_str()))
        });
    for entry in walker.flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        let Some(file_category) = categorise_file(&file_name) else {
            continue;
        };
        let Some(category) = category_path(entry.path(), base) else {
            continue;
        };
        insert_file(
            snapshot,
            entry.path(),
            name,
            step,
            &category,
            file_category,
            root,
            limits,
        );
    }
}

/// The category is the file's path relative to the walk base, without the
/// extension: `val/attention.png` becomes `val/attention`.
fn category_path(path: &Path, base: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let stem = rel.file_stem()?.to_string_lossy().into_owned();
    let mut parts: Vec<String> = rel
        .parent()?
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.push(stem);
    Some(parts.join("/"))
}

fn insert_file(
    snapshot: &mut Snapshot,
    path: &Path,
    name: &str,
    step: StepKey,
    category: &str,
    file_category: FileCategory,
    root: &Path,
    limits: Limits,
) {
    match file_category {
        FileCategory::Json => insert_json(snapshot, path, name, step, category, root, limits),
        FileCategory::Image => {
            let Some(image) = prepare_image(path, root, limits.thumbnail_size) else {
                return;
            };
            // A JSON-provided image with the same source keeps priority over
            // the bare file.
            if let Some(Item::Image(existing)) = snapshot.get(Kind::Images, name, step, category) {
                if existing.source == image.source {
                    return;
                }
            }
            snapshot.set(Kind::Images, name, step, category, Item::Image(image), false);
        }
        FileCategory::Text => {
            let Ok(actual) = fs::read_to_string(path) else {
                return;
            };
            let truncate = actual.len() > limits.max_text_len;
            snapshot.set(
                Kind::Texts,
                name,
                step,
                category,
                Item::Text(TextEntry {
                    actual,
                    expected: None,
                }),
                truncate,
            );
        }
        FileCategory::Log => {
            let Ok(content) = fs::read_to_string(path) else {
                return;
            };
            let lines = parse_log_lines(&content);
            let truncate = lines.len() > limits.max_log_lines;
            snapshot.set(
                Kind::Logs,
                name,
                step,
                category,
                Item::Log(LogEntry { lines }),
                truncate,
            );
        }
        FileCategory::Markdown => {
            let Ok(raw) = fs::read_to_string(path) else {
                return;
            };
            let truncate = raw.len() > limits.max_text_len;
            snapshot.set(
                Kind::Markdown,
                name,
                step,
                category,
                Item::Markdown(MarkdownEntry { raw }),
                truncate,
            );
        }
    }
}

// A JSON file can carry scalars, texts and images under the matching keys.
// Anything else in it (including command.json's "command") contributes
// nothing to the walked data.
fn insert_json(
    snapshot: &mut Snapshot,
    path: &Path,
    name: &str,
    step: StepKey,
    category: &str,
    root: &Path,
    limits: Limits,
) {
    let Some(json) = load_json(path) else {
        return;
    };
    if let Some(scalars) = json.get("scalars") {
        let value = scalars.get("value").and_then(Value::as_f64);
        snapshot.set(
            Kind::Scalars,
            name,
            step,
            category,
            Item::Scalar(ScalarEntry { value }),
            false,
        );
    }
    if let Some(texts) = json.get("texts") {
        let actual = texts
            .get("actual")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let expected = texts
            .get("expected")
            .and_then(Value::as_str)
            .map(str::to_string);
        let text_len = actual.len() + expected.as_deref().map_or(0, str::len);
        snapshot.set(
            Kind::Texts,
            name,
            step,
            category,
            Item::Text(TextEntry { actual, expected }),
            text_len > limits.max_text_len,
        );
    }
    if let Some(images) = json.get("images") {
        if let Some(source) = images.get("source").and_then(Value::as_str) {
            if let Some(parent) = path.parent() {
                if let Some(image) = prepare_image(&parent.join(source), root, limits.thumbnail_size)
                {
                    snapshot.set(Kind::Images, name, step, category, Item::Image(image), false);
                }
            }
        }
    }
}

fn load_json(path: &Path) -> Option<Value> {
    let content = fs::read_to_string(path).ok()?;
    let json: Value = serde_json::from_str(&content).ok()?;
    json.is_object().then_some(json)
}

fn load_command(path: &Path) -> Option<Command> {
    #[derive(serde::Deserialize)]
    struct CommandFile {
        command: Option<Command>,
    }
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str::<CommandFile>(&content).ok()?.command
}

/// Log files are tab-separated: an optional timestamp, an optional tag and
/// the message itself, which may contain further tabs.
fn parse_log_lines(content: &str) -> Vec<LogLine> {
    content
        .lines()
        .map(|line| {
            let parts: Vec<&str> = line.splitn(3, '\t').collect();
            match parts.as_slice() {
                [message] => LogLine {
                    message: (*message).to_string(),
                    timestamp: None,
                    tag: None,
                },
                [timestamp, message] => LogLine {
                    message: (*message).to_string(),
                    timestamp: Some((*timestamp).to_string()),
                    tag: None,
                },
                [timestamp, tag, message] => LogLine {
                    message: (*message).to_string(),
                    timestamp: Some((*timestamp).to_string()),
                    tag: Some((*tag).to_string()),
                },
                _ => LogLine {
                    message: line.to_string(),
                    timestamp: None,
                    tag: None,
                },
            }
        })
        .collect()
}

/// Reads an image and builds an aspect-preserving inline thumbnail. Images
/// that cannot be decoded (for example because they are still being written)
/// are skipped; a later rescan picks them up.
fn prepare_image(path: &Path, root: &Path, thumbnail_size: u32) -> Option<ImageEntry> {
    let image = image::open(path).ok()?;
    let (width, height) = image.dimensions();
    let thumbnail = image.thumbnail(thumbnail_size, thumbnail_size).to_rgb8();
    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut jpeg)
        .write_image(
            thumbnail.as_raw(),
            thumbnail.width(),
            thumbnail.height(),
            image::ExtendedColorType::Rgb8,
        )
        .ok()?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(&jpeg);
    let rel = path.strip_prefix(root).ok()?;
    Some(ImageEntry {
        source: format!("/data/{}", posix_path(rel)),
        thumbnail: Some(Thumbnail {
            base64: format!("data:image/jpeg;base64,{encoded}"),
            width,
            height,
        }),
    })
}

fn posix_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
