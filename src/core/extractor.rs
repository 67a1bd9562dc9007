use std::path::Path;

use super::error::SnapError;
use super::naming::{SnapshotRef, VideoFileRef};
use crate::decoder::{resize, FrameData, VideoBackend, VideoStream};
use crate::encoder::SnapshotEncoder;

/// What a successful extraction produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub snapshot: SnapshotRef,
    pub source_size: (u32, u32),
    pub output_size: (u32, u32),
}

/// Turns one video into one snapshot: open, take the first frame, scale,
/// write.
pub struct FrameExtractor<B, E> {
    backend: B,
    encoder: E,
    scale: f64,
}

impl<B: VideoBackend, E: SnapshotEncoder> FrameExtractor<B, E> {
    pub fn new(backend: B, encoder: E, scale: f64) -> Self {
        Self { backend, encoder, scale }
    }

    /// Does not check whether the snapshot already exists; callers filter
    /// through discovery first.
    pub fn extract(&self, video: &VideoFileRef, output_root: &Path) -> Result<Extracted, SnapError> {
        let frame = self.first_frame(video)?;
        let source_size = (frame.width, frame.height);

        let frame = resize::downsample(frame, self.scale).map_err(|reason| {
            SnapError::FrameDecodeInvalid {
                path: video.path().to_path_buf(),
                reason,
            }
        })?;

        let snapshot = SnapshotRef::for_video(video, output_root);
        self.encoder.write(snapshot.path(), &frame)?;

        Ok(Extracted {
            snapshot,
            source_size,
            output_size: (frame.width, frame.height),
        })
    }

    /// The stream only lives inside this call, so the decoder is released
    /// before anything is written or the next video is opened.
    fn first_frame(&self, video: &VideoFileRef) -> Result<FrameData, SnapError> {
        let mut stream = self.backend.open(video.path())?;
        let frame = stream.read_frame()?.ok_or_else(|| SnapError::FrameDecodeInvalid {
            path: video.path().to_path_buf(),
            reason: "stream ended before the first frame".into(),
        })?;
        drop(stream);

        frame.check().map_err(|reason| SnapError::FrameDecodeInvalid {
            path: video.path().to_path_buf(),
            reason,
        })?;
        Ok(frame)
    }
}
