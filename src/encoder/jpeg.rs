use opencv::{core, imgcodecs, prelude::*};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::error::SnapError;
use crate::decoder::FrameData;

/// Persists a frame as an image file.
pub trait SnapshotEncoder {
    fn write(&self, path: &Path, frame: &FrameData) -> Result<(), SnapError>;
}

/// JPEG through OpenCV's imgcodecs.
///
/// The image is encoded in memory, written next to its destination under a
/// hidden name and renamed into place, so a crash mid-write never leaves a
/// file that looks like a finished snapshot.
pub struct JpegEncoder {
    quality: i32,
}

impl JpegEncoder {
    pub fn new(quality: i32) -> Self {
        Self { quality }
    }

    pub fn encode(&self, frame: &FrameData) -> opencv::Result<Option<Vec<u8>>> {
        let mut mat = core::Mat::new_rows_cols_with_default(
            frame.height as i32,
            frame.width as i32,
            core::CV_8UC3,
            core::Scalar::all(0.0),
        )?;
        mat.data_bytes_mut()?.copy_from_slice(&frame.buffer);

        let params = core::Vector::<i32>::from_slice(&[imgcodecs::IMWRITE_JPEG_QUALITY, self.quality]);
        let mut encoded = core::Vector::<u8>::new();
        if !imgcodecs::imencode(".jpg", &mat, &mut encoded, &params)? {
            return Ok(None);
        }

        Ok(Some(encoded.to_vec()))
    }
}

impl SnapshotEncoder for JpegEncoder {
    fn write(&self, path: &Path, frame: &FrameData) -> Result<(), SnapError> {
        let write_failed = |reason: String| SnapError::SnapshotWriteFailed {
            path: path.to_path_buf(),
            reason,
        };

        frame.check().map_err(write_failed)?;
        let bytes = self
            .encode(frame)
            .map_err(|e| write_failed(e.to_string()))?
            .ok_or_else(|| write_failed("JPEG encoder rejected the frame".into()))?;

        persist(path, |partial| fs::write(partial, &bytes)).map_err(|e| write_failed(e.to_string()))
    }
}

/// Runs `write` against the hidden sibling of `path`, then renames it into
/// place. On any failure the sibling is removed.
fn persist(path: &Path, write: impl FnOnce(&Path) -> io::Result<()>) -> io::Result<()> {
    let partial = partial_path(path);
    let result = write(&partial).and_then(|()| fs::rename(&partial, path));
    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

/// `dir/.name.partial` for `dir/name`.
fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.partial", name))
}
