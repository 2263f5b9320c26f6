//! Terminal image encoding
//!
//!     [`KittyEncoder`] emits the kitty graphics protocol: the PNG is base64 encoded and sent
//!     in chunks of at most 4096 bytes, each wrapped in an APC sequence (`ESC _ G ... ESC \`).
//!     The first chunk carries the control keys (`a=T` transmit and display, `f=100` PNG,
//!     `r=` rows) and every chunk says whether more follow (`m=1`) or not (`m=0`).

use crate::error::EncodeError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

const CHUNK_SIZE: usize = 4096;
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// Turns image bytes into something a terminal can display.
pub trait ImageEncoder {
    /// `target_rows == 0` means the default height: one row inline, terminal-chosen for
    /// display math. A positive value is used as is.
    fn encode(&self, image: &[u8], display: bool, target_rows: u32) -> Result<String, EncodeError>;
}

impl<E: ImageEncoder + ?Sized> ImageEncoder for &E {
    fn encode(&self, image: &[u8], display: bool, target_rows: u32) -> Result<String, EncodeError> {
        (**self).encode(image, display, target_rows)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KittyEncoder;

impl KittyEncoder {
    pub fn new() -> Self {
        KittyEncoder
    }

    fn rows(display: bool, target_rows: u32) -> Option<u32> {
        match (target_rows, display) {
            (0, true) => None,
            (0, false) => Some(1),
            (rows, _) => Some(rows),
        }
    }
}

impl ImageEncoder for KittyEncoder {
    fn encode(&self, image: &[u8], display: bool, target_rows: u32) -> Result<String, EncodeError> {
        if image.is_empty() {
            return Err(EncodeError::EmptyImage);
        }
        if !image.starts_with(PNG_SIGNATURE) {
            return Err(EncodeError::InvalidImage(
                "missing PNG signature".to_string(),
            ));
        }

        let payload = STANDARD.encode(image);
        let mut control = String::from("a=T,f=100");
        if let Some(rows) = Self::rows(display, target_rows) {
            control.push_str(&format!(",r={rows}"));
        }

        let chunks: Vec<&[u8]> = payload.as_bytes().chunks(CHUNK_SIZE).collect();
        let mut out = String::with_capacity(payload.len() + chunks.len() * 16 + 32);
        for (i, chunk) in chunks.iter().enumerate() {
            let more = if i + 1 < chunks.len() { 1 } else { 0 };
            out.push_str("\x1b_G");
            if i == 0 {
                out.push_str(&control);
                out.push(',');
            }
            out.push_str(&format!("m={more};"));
            // base64 output is ASCII, so every chunk boundary is a char boundary
            out.push_str(&String::from_utf8_lossy(chunk));
            out.push_str("\x1b\\");
        }

        let mut out = out.replace('\0', "");
        let trimmed = out.trim_end_matches('\n').len();
        out.truncate(trimmed);
        if display {
            out.push('\n');
        }
        log::debug!(
            "Encoded {} bytes into {} kitty chunk(s), display: {display}",
            image.len(),
            chunks.len()
        );
        Ok(out)
    }
}
