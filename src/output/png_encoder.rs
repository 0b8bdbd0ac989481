//! PNG snapshots of rendered frames.

use crate::error::Result;
use crate::framebuffer::Framebuffer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Encodes a [`Framebuffer`] as 8-bit RGBA PNG.
pub struct PngEncoder;

impl PngEncoder {
    /// Write a framebuffer to a PNG file.
    pub fn write_to_file<P: AsRef<Path>>(fb: &Framebuffer, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut out = BufWriter::new(File::create(path)?);
        Self::encode(fb, &mut out)?;
        out.flush()?;
        log::debug!("wrote {}x{} frame to {}", fb.width(), fb.height(), path.display());
        Ok(())
    }

    /// Encode a framebuffer to PNG bytes.
    pub fn to_bytes(fb: &Framebuffer) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        Self::encode(fb, &mut bytes)?;
        Ok(bytes)
    }

    fn encode<W: Write>(fb: &Framebuffer, sink: W) -> Result<()> {
        let mut encoder = png::Encoder::new(sink, fb.width(), fb.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&fb.to_compact_pixels())?;
        writer.finish()?;
        Ok(())
    }
}
