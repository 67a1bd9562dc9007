use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while generating snapshots.
///
/// The first three variants abort the run before any video is touched; the
/// rest are scoped to a single video and the runner moves on to the next one.
#[derive(Debug, Error)]
pub enum SnapError {
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("camera storage path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("cannot list camera storage {}: {source}", path.display())]
    StorageUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open video file {}: {reason}", path.display())]
    VideoOpenFailed { path: PathBuf, reason: String },

    #[error("decoder returned an unusable frame for {}: {reason}", path.display())]
    FrameDecodeInvalid { path: PathBuf, reason: String },

    #[error("failed to write snapshot {}: {reason}", path.display())]
    SnapshotWriteFailed { path: PathBuf, reason: String },
}

impl SnapError {
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SnapError::ConfigInvalid(_)
                | SnapError::PathNotFound(_)
                | SnapError::StorageUnreadable { .. }
        )
    }

    /// Stable label used in log lines and the run summary.
    pub fn kind(&self) -> &'static str {
        match self {
            SnapError::ConfigInvalid(_) => "config_invalid",
            SnapError::PathNotFound(_) => "path_not_found",
            SnapError::StorageUnreadable { .. } => "storage_unreadable",
            SnapError::VideoOpenFailed { .. } => "video_open_failed",
            SnapError::FrameDecodeInvalid { .. } => "frame_decode_invalid",
            SnapError::SnapshotWriteFailed { .. } => "snapshot_write_failed",
        }
    }
}
