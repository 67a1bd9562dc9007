pub mod jpeg;

pub use jpeg::{JpegEncoder, SnapshotEncoder};
