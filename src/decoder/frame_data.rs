/// One decoded frame as packed 8-bit BGR pixels, row-major, no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameData {
    pub buffer: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl FrameData {
    pub const CHANNELS: usize = 3;

    pub fn new(buffer: Vec<u8>, width: u32, height: u32) -> Self {
        Self { buffer, width, height }
    }

    /// Checks the frame is non-empty and the buffer matches its dimensions.
    pub fn check(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!("empty frame ({}x{})", self.width, self.height));
        }
        let expected = self.width as usize * self.height as usize * Self::CHANNELS;
        if self.buffer.len() != expected {
            return Err(format!(
                "frame buffer holds {} bytes, {}x{} BGR needs {}",
                self.buffer.len(),
                self.width,
                self.height,
                expected
            ));
        }
        Ok(())
    }
}
