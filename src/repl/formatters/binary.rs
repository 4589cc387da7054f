//! Hex dump rendering for non-textual bodies.

use super::ResponseFormatter;
use anyhow::{bail, Result};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryFormatter;

/// Classic `offset  hex bytes  |ascii|` dump, 16 bytes per line
pub fn hex_dump(raw: &[u8]) -> String {
    let mut out = String::new();
    for (line, chunk) in raw.chunks(16).enumerate() {
        let mut hex = String::with_capacity(49);
        for (i, byte) in chunk.iter().enumerate() {
            let _ = write!(hex, "{byte:02x} ");
            if i == 7 {
                hex.push(' ');
            }
        }
        let ascii: String = chunk
            .iter()
            .map(|&b| if (0x20..=0x7e).contains(&b) { b as char } else { '.' })
            .collect();
        let _ = writeln!(out, "{:08x}  {hex:<49} |{ascii}|", line * 16);
    }
    out
}

impl ResponseFormatter for BinaryFormatter {
    fn title(&self) -> String {
        "[binary]".to_string()
    }

    fn searchable(&self) -> bool {
        false
    }

    fn format(&self, output: &mut String, raw: &[u8]) -> Result<()> {
        output.push_str(&hex_dump(raw));
        Ok(())
    }

    fn search(&self, _query: &str, _raw: &[u8]) -> Result<Vec<String>> {
        bail!("binary responses cannot be searched")
    }
}
