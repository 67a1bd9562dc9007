use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use super::config::Config;
use super::discovery::{self, Discovery};
use super::error::SnapError;
use super::extractor::FrameExtractor;
use super::naming::VideoFileRef;
use crate::decoder::VideoBackend;
use crate::encoder::SnapshotEncoder;
use crate::utils::logger;
use crate::utils::time_utils::Timer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedVideo {
    pub video: PathBuf,
    pub kind: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub discovered: usize,
    pub already_done: usize,
    pub succeeded: usize,
    pub failed: Vec<FailedVideo>,
    /// Set when the run stopped early on request; unprocessed videos are
    /// simply picked up next time.
    pub interrupted: bool,
    pub elapsed_ms: u64,
}

pub struct Runner<'a, B, E> {
    config: &'a Config,
    extractor: FrameExtractor<B, E>,
}

impl<'a, B: VideoBackend, E: SnapshotEncoder> Runner<'a, B, E> {
    pub fn new(config: &'a Config, backend: B, encoder: E) -> Self {
        Self {
            config,
            extractor: FrameExtractor::new(backend, encoder, config.scale),
        }
    }

    /// Discovers pending videos and extracts each one in order.
    ///
    /// Only discovery can fail the run. Per-video failures are reported and
    /// collected in the summary. `stop` is checked between videos.
    pub fn run(&self, stop: &AtomicBool) -> Result<RunSummary, SnapError> {
        let timer = Timer::new();
        let work = discovery::discover(self.config)?;

        let mut summary = RunSummary {
            discovered: work.pending.len(),
            already_done: work.already_done,
            ..Default::default()
        };

        for video in &work.pending {
            if stop.load(Ordering::SeqCst) {
                logger::warn("stop requested, leaving remaining videos for the next run");
                summary.interrupted = true;
                break;
            }

            match self.process(video) {
                Ok(()) => summary.succeeded += 1,
                Err(e) => summary.failed.push(FailedVideo {
                    video: video.path().to_path_buf(),
                    kind: e.kind(),
                    reason: e.to_string(),
                }),
            }
        }

        summary.elapsed_ms = timer.elapsed_ms();
        logger::info(&format!(
            "run finished in {:.1}s: {} generated, {} failed, {} already done{}",
            timer.elapsed().as_secs_f64(),
            summary.succeeded,
            summary.failed.len(),
            summary.already_done,
            if summary.interrupted { ", interrupted" } else { "" }
        ));

        Ok(summary)
    }

    /// Discovery only; nothing is decoded or written.
    pub fn plan(&self) -> Result<Discovery, SnapError> {
        discovery::discover(self.config)
    }

    fn process(&self, video: &VideoFileRef) -> Result<(), SnapError> {
        let timer = Timer::new();
        match self.extractor.extract(video, &self.config.output_root) {
            Ok(extracted) => {
                println!("Snap Generated: {}", extracted.snapshot.file_name());
                logger::info(&format!(
                    "snap generated: video={} snapshot={} size={}x{}->{}x{} took={}ms",
                    video.path().display(),
                    extracted.snapshot.file_name(),
                    extracted.source_size.0,
                    extracted.source_size.1,
                    extracted.output_size.0,
                    extracted.output_size.1,
                    timer.elapsed_ms()
                ));
                Ok(())
            }
            Err(e) => {
                eprintln!("Failed: {}", e);
                let line = format!(
                    "snap failed: video={} kind={} reason={}",
                    video.path().display(),
                    e.kind(),
                    e
                );
                match &e {
                    // a decoder that says it produced a frame but didn't is unexpected
                    SnapError::FrameDecodeInvalid { .. } => logger::error(&line),
                    _ => logger::warn(&line),
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::VideoApi;
    use crate::core::extractor::testing::*;
    use crate::utils::file_utils::scratch_dir;
    use std::fs;
    use std::rc::Rc;

    /// storage/cam/{buckets}/clip.mp4 plus an empty output dir
    fn setup(tag: &str, buckets: &[&str]) -> Config {
        let root = scratch_dir(tag);
        let storage = root.join("storage");
        let output = root.join("output");
        for bucket in buckets {
            let dir = storage.join("cam").join(bucket);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("clip.mp4"), b"video").unwrap();
        }
        fs::create_dir_all(&output).unwrap();

        Config {
            storage_root: storage,
            output_root: output,
            camera_sub_path: PathBuf::from("cam"),
            scale: 0.5,
            jpeg_quality: 95,
            video_extensions: vec!["mp4".to_string()],
            video_api: VideoApi::Ffmpeg,
        }
    }

    fn outputs(config: &Config) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&config.output_root)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_generates_one_snapshot_per_bucket() {
        let config = setup("run_two_buckets", &["1000", "1005"]);
        let runner = Runner::new(&config, FakeBackend::default(), FakeEncoder::default());

        let summary = runner.run(&AtomicBool::new(false)).unwrap();

        assert_eq!(summary.discovered, 2);
        assert_eq!(summary.succeeded, 2);
        assert!(summary.failed.is_empty());
        assert_eq!(outputs(&config), vec!["1000_clip.jpg", "1005_clip.jpg"]);
    }

    #[test]
    fn test_existing_snapshot_is_not_decoded_again() {
        let config = setup("run_existing", &["1000", "1005"]);
        fs::write(config.output_root.join("1000_clip.jpg"), b"old").unwrap();

        let backend = FakeBackend::default();
        let opened = Rc::clone(&backend.opened);
        let runner = Runner::new(&config, backend, FakeEncoder::default());
        let summary = runner.run(&AtomicBool::new(false)).unwrap();

        assert_eq!(summary.already_done, 1);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(
            *opened.borrow(),
            vec![config.camera_root().join("1005").join("clip.mp4")]
        );
        assert_eq!(fs::read_to_string(config.output_root.join("1000_clip.jpg")).unwrap(), "old");
    }

    #[test]
    fn test_corrupt_video_does_not_stop_the_batch() {
        let config = setup("run_corrupt", &["1000", "1005", "1010", "1015"]);
        let backend = FakeBackend::with(&[("1005/clip.mp4", Clip::Unopenable)]);
        let max_open = Rc::clone(&backend.max_open);
        let runner = Runner::new(&config, backend, FakeEncoder::default());

        let summary = runner.run(&AtomicBool::new(false)).unwrap();

        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].kind, "video_open_failed");
        assert_eq!(summary.failed[0].video, config.camera_root().join("1005").join("clip.mp4"));
        assert_eq!(outputs(&config), vec!["1000_clip.jpg", "1010_clip.jpg", "1015_clip.jpg"]);
        assert_eq!(max_open.get(), 1, "more than one decoder open at once");
    }

    #[test]
    fn test_failed_video_is_retried_next_run() {
        let config = setup("run_retry", &["1000", "1005"]);
        let broken = FakeBackend::with(&[("1000/clip.mp4", Clip::NoFrames)]);
        let first = Runner::new(&config, broken, FakeEncoder::default())
            .run(&AtomicBool::new(false))
            .unwrap();
        assert_eq!(first.failed[0].kind, "frame_decode_invalid");

        let runner = Runner::new(&config, FakeBackend::default(), FakeEncoder::default());
        let plan = runner.plan().unwrap();
        assert_eq!(plan.pending.len(), 1);
        assert_eq!(plan.pending[0].snapshot_file_name(), "1000_clip.jpg");

        let second = runner.run(&AtomicBool::new(false)).unwrap();
        assert_eq!(second.succeeded, 1);
        assert_eq!(runner.plan().unwrap().pending.len(), 0);
    }

    #[test]
    fn test_missing_camera_folder_aborts_before_any_write() {
        let mut config = setup("run_missing_camera", &["1000"]);
        config.camera_sub_path = PathBuf::from("other_cam");

        let runner = Runner::new(&config, FakeBackend::default(), FakeEncoder::default());
        let err = runner.run(&AtomicBool::new(false)).unwrap_err();

        assert!(matches!(err, SnapError::PathNotFound(_)));
        assert!(outputs(&config).is_empty());
    }

    #[test]
    fn test_stop_flag_halts_between_videos() {
        let config = setup("run_stop", &["1000", "1005"]);
        let runner = Runner::new(&config, FakeBackend::default(), FakeEncoder::default());

        let summary = runner.run(&AtomicBool::new(true)).unwrap();

        assert!(summary.interrupted);
        assert_eq!(summary.discovered, 2);
        assert_eq!(summary.succeeded, 0);
        assert!(outputs(&config).is_empty());
    }

    #[test]
    fn test_summary_serializes_to_json() {
        let summary = RunSummary {
            discovered: 1,
            failed: vec![FailedVideo {
                video: PathBuf::from("/s/1000/clip.mp4"),
                kind: "video_open_failed",
                reason: "corrupt".into(),
            }],
            ..Default::default()
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["discovered"], 1);
        assert_eq!(json["failed"][0]["kind"], "video_open_failed");
        assert_eq!(json["interrupted"], false);
    }
}
