use fast_image_resize as fr;
use fr::images::Image;

use super::frame_data::FrameData;

/// Target size for a linear downsample: `max(1, round(dim * scale))`,
/// rounding halves away from zero.
pub fn scaled_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let scale_dim = |dim: u32| ((dim as f64 * scale).round() as u32).max(1);
    (scale_dim(width), scale_dim(height))
}

/// Downsamples `frame` by `scale`. A scale of 1.0 (or one that rounds back
/// to the same size) returns the frame untouched.
pub fn downsample(frame: FrameData, scale: f64) -> Result<FrameData, String> {
    frame.check()?;

    let (new_w, new_h) = scaled_dimensions(frame.width, frame.height, scale);
    if new_w == frame.width && new_h == frame.height {
        return Ok(frame);
    }

    let src_image = Image::from_vec_u8(frame.width, frame.height, frame.buffer, fr::PixelType::U8x3)
        .map_err(|e| format!("cannot wrap frame for resize: {}", e))?;
    let mut dst_image = Image::new(new_w, new_h, fr::PixelType::U8x3);

    let mut resizer = fr::Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, None)
        .map_err(|e| format!("resize to {}x{} failed: {}", new_w, new_h, e))?;

    Ok(FrameData::new(dst_image.buffer().to_vec(), new_w, new_h))
}
