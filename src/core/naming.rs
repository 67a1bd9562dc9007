use std::path::{Path, PathBuf};

use crate::shared::constants;

/// One recorded video segment, identified by where it sits in the camera store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFileRef {
    path: PathBuf,
    bucket: String,
    stem: String,
}

impl VideoFileRef {
    /// Dot-files keep their whole name as the stem (`.hidden` stays `.hidden`),
    /// which is how `Path::file_stem` treats them.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let bucket = path
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self { path, bucket, stem }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the time-bucket folder holding the video.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// `<bucket>_<stem>.jpg`. This name is the only de-duplication key, so it
    /// must never depend on anything but the video path.
    pub fn snapshot_file_name(&self) -> String {
        format!("{}_{}.{}", self.bucket(), self.stem(), constants::SNAPSHOT_EXTENSION)
    }
}

/// Where the snapshot for a given video lives (or will live).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRef {
    file_name: String,
    path: PathBuf,
}

impl SnapshotRef {
    pub fn for_video(video: &VideoFileRef, output_root: &Path) -> Self {
        let file_name = video.snapshot_file_name();
        let path = output_root.join(&file_name);
        Self { file_name, path }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A snapshot on disk marks its video as done.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}
