pub const APP_NAME: &str = "snapgen";

pub const CONFIG_FILE: &str = "config.json";
/// Created and removed in the output directory to prove it is writable.
pub const WRITE_CHECK_FILE: &str = ".snapgen-write-check";
pub const ERROR_LOG_FILE: &str = "snapgen-error.log";
pub const DEBUG_LOG_FILE: &str = "snapgen-debug.log";

/// Camera folder scanned under the storage root unless configured otherwise.
pub const DEFAULT_CAMERA_SUB_PATH: &str = "xiaomi_camera_videos/04cf8c70d5de";

pub const SNAPSHOT_EXTENSION: &str = "jpg";
pub const DEFAULT_SCALE: f64 = 0.5;
pub const DEFAULT_JPEG_QUALITY: i32 = 95;

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "webm"];
