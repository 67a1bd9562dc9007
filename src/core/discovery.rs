use std::io;
use std::path::Path;

use super::config::Config;
use super::error::SnapError;
use super::naming::{SnapshotRef, VideoFileRef};
use crate::utils::{file_utils, logger};

/// Result of one walk over the camera store.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// Videos that still need a snapshot, bucket by bucket in name order.
    pub pending: Vec<VideoFileRef>,
    /// Videos whose snapshot already exists.
    pub already_done: usize,
    /// Entries that are not videos (wrong extension or nested directories).
    pub ignored: usize,
}

/// Walks `<storage_root>/<camera_sub_path>/<bucket>/<file>` and keeps the
/// files that have no snapshot under `output_root` yet.
///
/// A missing camera root fails the whole walk. Unreadable buckets are logged
/// and contribute nothing.
pub fn discover(config: &Config) -> Result<Discovery, SnapError> {
    discover_in(
        &config.camera_root(),
        &config.output_root,
        &config.video_extensions,
    )
}

pub fn discover_in(
    camera_root: &Path,
    output_root: &Path,
    extensions: &[String],
) -> Result<Discovery, SnapError> {
    let buckets = file_utils::list_entries(camera_root).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SnapError::PathNotFound(camera_root.to_path_buf()),
        _ => SnapError::StorageUnreadable {
            path: camera_root.to_path_buf(),
            source: e,
        },
    })?;

    let mut discovery = Discovery::default();

    for bucket in buckets.iter().filter(|path| path.is_dir()) {
        let entries = match file_utils::list_entries(bucket) {
            Ok(entries) => entries,
            Err(e) => {
                logger::warn(&format!("skipping unreadable folder {}: {}", bucket.display(), e));
                continue;
            }
        };

        for entry in entries {
            if entry.is_dir() {
                logger::warn(&format!("skipping nested folder {}", entry.display()));
                discovery.ignored += 1;
                continue;
            }
            if !file_utils::has_allowed_extension(&entry, extensions) {
                logger::debug(&format!("ignoring non-video entry {}", entry.display()));
                discovery.ignored += 1;
                continue;
            }

            let video = VideoFileRef::new(entry);
            if SnapshotRef::for_video(&video, output_root).exists() {
                discovery.already_done += 1;
                continue;
            }

            discovery.pending.push(video);
        }
    }

    logger::info(&format!(
        "discovered {} pending videos under {} ({} already done, {} ignored)",
        discovery.pending.len(),
        camera_root.display(),
        discovery.already_done,
        discovery.ignored
    ));

    Ok(discovery)
}
