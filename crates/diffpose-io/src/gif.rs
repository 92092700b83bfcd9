use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use diffpose_image::Image;
use image::{
    codecs::gif::{GifEncoder, Repeat},
    Delay, Frame, RgbaImage,
};

use crate::error::IoError;

/// Default delay between two frames in milliseconds.
pub const DEFAULT_FRAME_DELAY_MS: u32 = 30;

/// Writes frames to a looping animated GIF.
///
/// The GIF trailer is written when the writer is dropped.
pub struct GifWriter<W: Write> {
    encoder: GifEncoder<W>,
    delay: Delay,
    num_frames: usize,
}

impl GifWriter<BufWriter<File>> {
    /// Create the file at `file_path` and write frames to it.
    pub fn create(file_path: impl AsRef<Path>, delay_ms: u32) -> Result<Self, IoError> {
        let file = File::create(file_path)?;
        Self::new(BufWriter::new(file), delay_ms)
    }
}

impl<W: Write> GifWriter<W> {
    /// Write frames to `writer`, showing each one for `delay_ms` milliseconds.
    pub fn new(writer: W, delay_ms: u32) -> Result<Self, IoError> {
        let mut encoder = GifEncoder::new(writer);
        encoder.set_repeat(Repeat::Infinite)?;
        Ok(Self {
            encoder,
            delay: Delay::from_numer_denom_ms(delay_ms, 1),
            num_frames: 0,
        })
    }

    /// Number of frames written so far.
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    fn append_rgba(&mut self, width: usize, height: usize, rgba: Vec<u8>) -> Result<(), IoError> {
        let buffer = RgbaImage::from_raw(width as u32, height as u32, rgba)
            .ok_or(IoError::InvalidFrame(width, height))?;
        self.encoder
            .encode_frame(Frame::from_parts(buffer, 0, 0, self.delay))?;
        self.num_frames += 1;
        Ok(())
    }

    /// Append a gray frame with values in `[0, 1]`; values outside are clamped.
    pub fn append_gray_f32(&mut self, image: &Image<f32, 1>) -> Result<(), IoError> {
        let rgba = image
            .as_slice()
            .iter()
            .flat_map(|&v| {
                let g = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
                [g, g, g, 255]
            })
            .collect();
        self.append_rgba(image.width(), image.height(), rgba)
    }
}
