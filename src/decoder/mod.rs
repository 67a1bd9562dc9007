pub mod frame_data;
pub mod resize;
pub mod video;

pub use frame_data::FrameData;
pub use video::{OpenCvBackend, VideoBackend, VideoStream};
