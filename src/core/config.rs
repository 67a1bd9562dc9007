use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::error::SnapError;
use crate::shared::constants;

/// Which OpenCV capture API opens the videos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum VideoApi {
    /// FFmpeg backend only
    #[default]
    Ffmpeg,
    /// Let OpenCV pick
    Any,
}

/// On-disk configuration. Every field is optional so a file can set only
/// what differs from the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub storage_root: Option<PathBuf>,
    pub output_root: Option<PathBuf>,
    pub camera_sub_path: Option<PathBuf>,
    pub scale: Option<f64>,
    pub jpeg_quality: Option<i32>,
    pub video_extensions: Option<Vec<String>>,
    pub video_api: Option<VideoApi>,
}

impl ConfigFile {
    /// Reads `path` if given, otherwise the default location if it exists.
    /// No file at the default location means an empty config.
    ///
    /// Returns the file that was actually read, if any.
    pub fn load(path: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok((Self::default(), None)),
            },
        };

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let file: ConfigFile = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config JSON at {}", path.display()))?;

        Ok((file, Some(path)))
    }

    /// Values set in `overrides` win.
    pub fn merge(self, overrides: ConfigFile) -> ConfigFile {
        ConfigFile {
            storage_root: overrides.storage_root.or(self.storage_root),
            output_root: overrides.output_root.or(self.output_root),
            camera_sub_path: overrides.camera_sub_path.or(self.camera_sub_path),
            scale: overrides.scale.or(self.scale),
            jpeg_quality: overrides.jpeg_quality.or(self.jpeg_quality),
            video_extensions: overrides.video_extensions.or(self.video_extensions),
            video_api: overrides.video_api.or(self.video_api),
        }
    }
}

/// `<config dir>/snapgen/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(constants::APP_NAME).join(constants::CONFIG_FILE))
}

/// Validated, immutable settings for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub storage_root: PathBuf,
    pub output_root: PathBuf,
    pub camera_sub_path: PathBuf,
    pub scale: f64,
    pub jpeg_quality: i32,
    pub video_extensions: Vec<String>,
    pub video_api: VideoApi,
}

impl Config {
    /// Fills in defaults and checks every value, including that both
    /// directories are usable. Nothing is read from the camera store yet.
    pub fn resolve(file: ConfigFile) -> Result<Self, SnapError> {
        let storage_root = file
            .storage_root
            .ok_or_else(|| SnapError::ConfigInvalid("storage_root is not set".into()))?;
        let output_root = file
            .output_root
            .ok_or_else(|| SnapError::ConfigInvalid("output_root is not set".into()))?;

        let config = Config {
            storage_root,
            output_root,
            camera_sub_path: file
                .camera_sub_path
                .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_CAMERA_SUB_PATH)),
            scale: file.scale.unwrap_or(constants::DEFAULT_SCALE),
            jpeg_quality: file.jpeg_quality.unwrap_or(constants::DEFAULT_JPEG_QUALITY),
            video_extensions: file.video_extensions.unwrap_or_else(|| {
                constants::VIDEO_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
            }),
            video_api: file.video_api.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SnapError> {
        if !(self.scale > 0.0 && self.scale <= 1.0) {
            return Err(SnapError::ConfigInvalid(format!(
                "scale must be in (0, 1], got {}",
                self.scale
            )));
        }
        if !(0..=100).contains(&self.jpeg_quality) {
            return Err(SnapError::ConfigInvalid(format!(
                "jpeg_quality must be in 0..=100, got {}",
                self.jpeg_quality
            )));
        }
        if self.camera_sub_path.is_absolute() {
            return Err(SnapError::ConfigInvalid(format!(
                "camera_sub_path must be relative to storage_root, got {}",
                self.camera_sub_path.display()
            )));
        }

        check_dir("storage_root", &self.storage_root)?;
        fs::read_dir(&self.storage_root).map_err(|e| {
            SnapError::ConfigInvalid(format!(
                "storage_root {} is not readable: {}",
                self.storage_root.display(),
                e
            ))
        })?;

        check_dir("output_root", &self.output_root)?;
        check_writable(&self.output_root).map_err(|e| {
            SnapError::ConfigInvalid(format!(
                "output_root {} is not writable: {}",
                self.output_root.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// The folder holding this camera's time-bucket folders.
    pub fn camera_root(&self) -> PathBuf {
        self.storage_root.join(&self.camera_sub_path)
    }
}

/// Permission bits say nothing about who owns the directory, so write and
/// remove a real file.
fn check_writable(dir: &Path) -> std::io::Result<()> {
    let probe = dir.join(constants::WRITE_CHECK_FILE);
    fs::write(&probe, b"")?;
    fs::remove_file(&probe)
}

fn check_dir(label: &str, path: &Path) -> Result<(), SnapError> {
    let meta = fs::metadata(path).map_err(|e| {
        SnapError::ConfigInvalid(format!("{} {} is not accessible: {}", label, path.display(), e))
    })?;
    if !meta.is_dir() {
        return Err(SnapError::ConfigInvalid(format!(
            "{} {} is not a directory",
            label,
            path.display()
        )));
    }
    Ok(())
}
