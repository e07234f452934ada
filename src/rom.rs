use anyhow::{Context, Result};
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// On-disk encoding of a program image.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Format {
  /// Bytes loaded as-is.
  Raw,
  /// Text of hexadecimal byte pairs. Whitespace is ignored and `#` or `;`
  /// comment out the rest of a line.
  Hex,
}

impl FromStr for Format {
  type Err = String;

  fn from_str(s: &str) -> Result<Format, String> {
    match s {
      "raw" | "bin" => Ok(Format::Raw),
      "hex" => Ok(Format::Hex),
      _ => Err(format!("unknown image format '{}'", s)),
    }
  }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum HexError {
  /// A character that is not a hex digit, with its line number.
  BadDigit { line: usize, c: char },
  /// The image ended halfway through a byte.
  OddDigits,
}

impl fmt::Display for HexError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      HexError::BadDigit { line, c } => {
        write!(f, "line {}: '{}' is not a hex digit", line, c)
      }
      HexError::OddDigits => write!(f, "odd number of hex digits"),
    }
  }
}

impl StdError for HexError {}

/// Decode a hex text image.
pub fn parse_hex(text: &str) -> Result<Vec<u8>, HexError> {
  let mut bytes = Vec::new();
  let mut high: Option<u8> = None;
  for (n, line) in text.lines().enumerate() {
    let code = line.split(|c: char| c == '#' || c == ';').next().unwrap_or("");
    for c in code.chars().filter(|c| !c.is_whitespace()) {
      let digit = c
        .to_digit(16)
        .ok_or(HexError::BadDigit { line: n + 1, c })? as u8;
      high = match high {
        None => Some(digit),
        Some(h) => {
          bytes.push((h << 4) | digit);
          None
        }
      };
    }
  }
  if high.is_some() {
    return Err(HexError::OddDigits);
  }
  Ok(bytes)
}

/// Read a program image from `path`.
pub fn load(path: &Path, format: Format) -> Result<Vec<u8>> {
  let data = fs::read(path)
    .with_context(|| format!("failed to read program {}", path.display()))?;
  let image = match format {
    Format::Raw => data,
    Format::Hex => {
      let text = String::from_utf8(data)
        .with_context(|| format!("{} is not text", path.display()))?;
      parse_hex(&text)
        .with_context(|| format!("failed to decode {}", path.display()))?
    }
  };
  info!("Loaded {} bytes from {}", image.len(), path.display());
  Ok(image)
}
