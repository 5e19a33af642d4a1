// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! Coding-aware stream decorator (spec.md §4.2, `load`'s "coding-aware
//! decoder that sniffs an encoding declaration from the opening comment").
//!
//! Recognizes the same two spellings as the decoder note in SPEC_FULL.md:
//! `;; -*- coding: <name> -*-` and `;coding: <name>`. Only UTF-8 and
//! Latin-1 are actually decoded; anything else round-trips as raw bytes
//! with a one-time warning, since transcoding arbitrary legacy encodings
//! is outside this subsystem's scope.

use std::collections::VecDeque;
use std::io::{self, BufRead, Read};

/// A recognized (or not) coding declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coding {
    Utf8,
    Latin1,
    Unknown(String),
}

fn extract_coding_name(line: &str) -> Option<&str> {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix(";;") {
        let rest = rest.trim();
        let inner = rest.strip_prefix("-*-").map(str::trim).unwrap_or(rest);
        let inner = inner.strip_suffix("-*-").map(str::trim).unwrap_or(inner);
        for part in inner.split(';') {
            if let Some(v) = part.trim().strip_prefix("coding:") {
                return Some(v.trim());
            }
        }
        return None;
    }
    if let Some(rest) = line.strip_prefix(';') {
        let rest = rest.trim();
        return rest.strip_prefix("coding:").map(str::trim);
    }
    None
}

fn parse_coding(name: &str) -> Coding {
    match name.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => Coding::Utf8,
        "latin-1" | "latin1" | "iso-8859-1" => Coding::Latin1,
        other => Coding::Unknown(other.to_string()),
    }
}

/// Peek (without consuming) up to the first two lines of `reader` looking
/// for a coding declaration.
pub fn sniff_coding<R: BufRead>(reader: &mut R) -> io::Result<Coding> {
    let peeked = reader.fill_buf()?;
    let head_len = peeked.len().min(512);
    let text = String::from_utf8_lossy(&peeked[..head_len]).into_owned();
    for line in text.lines().take(2) {
        if let Some(name) = extract_coding_name(line) {
            return Ok(parse_coding(name));
        }
    }
    Ok(Coding::Utf8)
}

/// A `Read` adapter that transcodes Latin-1 input to UTF-8 on the fly.
/// UTF-8 and unrecognized codings pass through unmodified.
pub struct CodingAwareReader<R> {
    inner: R,
    coding: Coding,
    pending: VecDeque<u8>,
}

impl<R: BufRead> CodingAwareReader<R> {
    /// Sniff `inner`'s coding declaration (without consuming any bytes)
    /// and wrap it accordingly.
    pub fn detect(mut inner: R) -> io::Result<Self> {
        let coding = sniff_coding(&mut inner)?;
        if let Coding::Unknown(name) = &coding {
            tracing::warn!(coding = %name, "unsupported source coding, reading as UTF-8");
        }
        Ok(Self { inner, coding, pending: VecDeque::new() })
    }
}

impl<R: BufRead> Read for CodingAwareReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if !matches!(self.coding, Coding::Latin1) {
            return self.inner.read(buf);
        }

        while self.pending.len() < buf.len() {
            let mut raw = [0u8; 256];
            let n = self.inner.read(&mut raw)?;
            if n == 0 {
                break;
            }
            for &byte in &raw[..n] {
                if byte < 0x80 {
                    self.pending.push_back(byte);
                } else {
                    // Latin-1 code points map directly onto the
                    // equivalent Unicode scalar values.
                    let mut utf8 = [0u8; 2];
                    let encoded = char::from(byte).encode_utf8(&mut utf8);
                    self.pending.extend(encoded.as_bytes());
                }
            }
        }

        let to_copy = buf.len().min(self.pending.len());
        for slot in buf.iter_mut().take(to_copy) {
            *slot = self.pending.pop_front().unwrap_or(0);
        }
        Ok(to_copy)
    }
}

#[cfg(test)]
#[path = "coding_tests.rs"]
mod tests;
