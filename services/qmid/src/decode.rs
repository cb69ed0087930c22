//! `qmid decode`: describe captured frames

use anyhow::{Context, Result};
use qmi_codec::dump;
use std::io::{self, BufRead};

/// Hex bytes with optional `0x` prefix, `:` separators and whitespace
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let cleaned: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&cleaned).with_context(|| format!("Invalid hex frame: {text}"))
}

pub fn run(frames: &[String]) -> Result<()> {
    if !frames.is_empty() {
        for text in frames {
            print!("{}", dump::describe(&parse_hex(text)?));
        }
        return Ok(());
    }

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        print!("{}", dump::describe(&parse_hex(&line)?));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_formats() {
        assert_eq!(parse_hex("01 0c 00").unwrap(), vec![0x01, 0x0C, 0x00]);
        assert_eq!(parse_hex("01:0C:00").unwrap(), vec![0x01, 0x0C, 0x00]);
        assert_eq!(parse_hex("0x010c00\n").unwrap(), vec![0x01, 0x0C, 0x00]);
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("01 0").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn test_describes_captured_frame() {
        let bytes = parse_hex("01 11 00 00 03 02 00 01 00 33 00 05 00 11 02 00 04 00").unwrap();
        let text = dump::describe(&bytes);
        assert!(text.contains("message 0x0033"));
        assert!(text.contains("TLV 0x11 len 2: 0400"));
    }
}
