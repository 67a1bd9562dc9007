use opencv::{core, prelude::*, videoio};
use std::path::{Path, PathBuf};

use super::frame_data::FrameData;
use crate::core::config::VideoApi;
use crate::core::error::SnapError;

/// Opens videos for decoding.
pub trait VideoBackend {
    type Stream: VideoStream;

    fn open(&self, path: &Path) -> Result<Self::Stream, SnapError>;
}

/// An open video. Dropping the stream releases the decoder.
pub trait VideoStream {
    /// Next frame in decode order, `Ok(None)` at end of stream.
    fn read_frame(&mut self) -> Result<Option<FrameData>, SnapError>;
}

pub struct OpenCvBackend {
    api: VideoApi,
}

impl OpenCvBackend {
    pub fn new(api: VideoApi) -> Self {
        Self { api }
    }

    fn api_preference(&self) -> i32 {
        match self.api {
            VideoApi::Ffmpeg => videoio::CAP_FFMPEG,
            VideoApi::Any => videoio::CAP_ANY,
        }
    }
}

impl VideoBackend for OpenCvBackend {
    type Stream = OpenCvStream;

    fn open(&self, path: &Path) -> Result<OpenCvStream, SnapError> {
        let open_failed = |reason: String| SnapError::VideoOpenFailed {
            path: path.to_path_buf(),
            reason,
        };

        let path_str = path
            .to_str()
            .ok_or_else(|| open_failed("path is not valid UTF-8".into()))?;

        let capture = videoio::VideoCapture::from_file(path_str, self.api_preference())
            .map_err(|e| open_failed(e.to_string()))?;

        if !capture.is_opened().map_err(|e| open_failed(e.to_string()))? {
            return Err(open_failed("no backend could open the file".into()));
        }

        Ok(OpenCvStream {
            capture,
            path: path.to_path_buf(),
        })
    }
}

pub struct OpenCvStream {
    capture: videoio::VideoCapture,
    path: PathBuf,
}

impl OpenCvStream {
    fn invalid(&self, reason: String) -> SnapError {
        SnapError::FrameDecodeInvalid {
            path: self.path.clone(),
            reason,
        }
    }
}

impl VideoStream for OpenCvStream {
    fn read_frame(&mut self) -> Result<Option<FrameData>, SnapError> {
        let mut frame = core::Mat::default();
        let got_frame = self
            .capture
            .read(&mut frame)
            .map_err(|e| self.invalid(format!("read failed: {}", e)))?;

        if !got_frame {
            return Ok(None);
        }
        if frame.empty() {
            return Err(self.invalid("decoder reported a frame but it is empty".into()));
        }
        if frame.typ() != core::CV_8UC3 {
            return Err(self.invalid(format!("unexpected pixel type {}", frame.typ())));
        }

        // Packed access needs a continuous buffer; a clone always is.
        let frame = if frame.is_continuous() {
            frame
        } else {
            frame
                .try_clone()
                .map_err(|e| self.invalid(format!("cannot copy frame: {}", e)))?
        };

        let buffer = frame
            .data_bytes()
            .map_err(|e| self.invalid(format!("cannot access pixels: {}", e)))?
            .to_vec();

        Ok(Some(FrameData::new(
            buffer,
            frame.cols() as u32,
            frame.rows() as u32,
        )))
    }
}

impl Drop for OpenCvStream {
    fn drop(&mut self) {
        let _ = self.capture.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::file_utils::scratch_dir;
    use std::fs;

    #[test]
    fn test_garbage_file_fails_to_open() {
        let dir = scratch_dir("opencv_garbage").join("1000");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("clip.mp4");
        fs::write(&path, b"definitely not an mp4 container").unwrap();

        for api in [VideoApi::Ffmpeg, VideoApi::Any] {
            let err = OpenCvBackend::new(api).open(&path).err().unwrap();
            assert!(matches!(err, SnapError::VideoOpenFailed { .. }));
            assert!(!err.is_fatal());
        }
    }

    #[test]
    fn test_missing_file_fails_to_open() {
        let dir = scratch_dir("opencv_missing");
        let err = OpenCvBackend::new(VideoApi::Ffmpeg)
            .open(&dir.join("1000").join("clip.mp4"))
            .err()
            .unwrap();
        assert!(matches!(err, SnapError::VideoOpenFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_path_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"/s/1000/clip\xFF.mp4"));
        match OpenCvBackend::new(VideoApi::Any).open(path) {
            Err(SnapError::VideoOpenFailed { reason, .. }) => assert!(reason.contains("UTF-8")),
            other => panic!("expected VideoOpenFailed, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_reads_first_frame_of_mjpeg_avi() {
        let dir = scratch_dir("opencv_mjpeg").join("1000");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("clip.avi");
        let (width, height) = (64, 48);

        let fourcc = videoio::VideoWriter::fourcc('M', 'J', 'P', 'G').unwrap();
        let writer = videoio::VideoWriter::new(
            path.to_str().unwrap(),
            fourcc,
            10.0,
            core::Size::new(width, height),
            true,
        );
        // no MJPEG writer in this OpenCV build
        let Ok(mut writer) = writer else { return };
        if !writer.is_opened().unwrap() {
            return;
        }
        let solid = core::Mat::new_rows_cols_with_default(
            height,
            width,
            core::CV_8UC3,
            core::Scalar::new(40.0, 120.0, 200.0, 0.0),
        )
        .unwrap();
        for _ in 0..3 {
            writer.write(&solid).unwrap();
        }
        writer.release().unwrap();

        let mut stream = OpenCvBackend::new(VideoApi::Any).open(&path).unwrap();
        let frame = stream.read_frame().unwrap().unwrap();
        drop(stream);

        assert_eq!((frame.width, frame.height), (width as u32, height as u32));
        assert_eq!(frame.buffer.len(), (width * height * 3) as usize);
        assert!(frame.check().is_ok());
        // lossy, but a flat colour survives MJPEG closely
        let (b, g, r) = (frame.buffer[0] as i32, frame.buffer[1] as i32, frame.buffer[2] as i32);
        assert!((b - 40).abs() < 16 && (g - 120).abs() < 16 && (r - 200).abs() < 16);
    }
}
