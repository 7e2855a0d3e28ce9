//! Listing of recorded videos in the video directory

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::Result;

pub const VIDEO_EXTENSION: &str = "mp4";

/// One recorded video on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoEntry {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: DateTime<Utc>,
}

impl VideoEntry {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// The directory recordings are written to
#[derive(Debug, Clone)]
pub struct VideoLibrary {
    dir: PathBuf,
}

impl VideoLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// A fresh, uniquely named output path inside the library
    pub fn new_video_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}.{}", Uuid::new_v4(), VIDEO_EXTENSION))
    }

    /// All videos, newest first. A missing directory yields an empty list.
    pub fn list(&self) -> Result<Vec<VideoEntry>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut videos = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let is_video = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(VIDEO_EXTENSION));
            if !is_video {
                continue;
            }

            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }

            videos.push(VideoEntry {
                path,
                size_bytes: metadata.len(),
                modified: metadata.modified().map(DateTime::<Utc>::from)?,
            });
        }

        videos.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.path.cmp(&b.path)));
        log::debug!("Found {} videos in {}", videos.len(), self.dir.display());
        Ok(videos)
    }
}
