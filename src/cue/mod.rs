use crate::cue::error::{CueError, CueResult};
use crate::cue::models::{CueLine, Directive};
use crate::cue::msf::parse_timecode;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

pub mod error;
pub mod models;
pub mod msf;

/// Reads a CUE sheet line by line, yielding one directive per line.
///
/// Only FILE, TRACK and INDEX are recognised, by substring, in that priority:
/// TRACK first, then INDEX, then FILE. Any other line comes back as
/// [`Directive::Other`] with its text intact.
pub struct CueParser<R> {
    reader: R,
    line_number: usize,
    buffer: Vec<u8>,
}

impl CueParser<BufReader<File>> {
    pub async fn open(cue_path: impl AsRef<Path>) -> CueResult<Self> {
        let file = File::open(cue_path).await?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: AsyncBufRead + Unpin> CueParser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buffer: Vec::new(),
        }
    }

    /// Returns the next line, or `None` once the sheet is exhausted.
    pub async fn next_line(&mut self) -> CueResult<Option<CueLine>> {
        self.buffer.clear();
        if self.reader.read_until(b'\n', &mut self.buffer).await? == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        let decoded = String::from_utf8_lossy(&self.buffer);
        let text = decoded.split(['\r', '\n']).next().unwrap_or_default();
        let directive = parse_directive(text, self.line_number)?;

        Ok(Some(CueLine {
            number: self.line_number,
            text: text.to_string(),
            directive,
        }))
    }
}

pub fn parse_directive(line: &str, line_number: usize) -> CueResult<Directive> {
    if let Some(pos) = line.find("TRACK") {
        parse_track(&line[pos..], line_number)
    } else if let Some(pos) = line.find("INDEX") {
        parse_index(&line[pos..], line_number)
    } else if let Some(pos) = line.find("FILE") {
        parse_file(&line[pos..], line_number)
    } else {
        Ok(Directive::Other)
    }
}

fn malformed(line: usize, reason: &'static str) -> CueError {
    CueError::MalformedDirective { line, reason }
}

fn parse_track(directive: &str, line: usize) -> CueResult<Directive> {
    let (_, rest) = directive
        .split_once(' ')
        .ok_or_else(|| malformed(line, "no space after TRACK"))?;
    let (number, mode) = rest
        .split_once(' ')
        .ok_or_else(|| malformed(line, "no space after track number"))?;

    let number = number
        .trim()
        .parse::<u32>()
        .map_err(|_| malformed(line, "track number is not numeric"))?;

    Ok(Directive::Track {
        number,
        mode: mode.trim().to_string(),
    })
}

fn parse_index(directive: &str, line: usize) -> CueResult<Directive> {
    let (_, rest) = directive
        .split_once(' ')
        .ok_or_else(|| malformed(line, "no space after INDEX"))?;
    let (number, timecode) = rest
        .split_once(' ')
        .ok_or_else(|| malformed(line, "no space after index number"))?;

    Ok(Directive::Index {
        number: number.to_string(),
        position: parse_timecode(timecode.trim())?,
    })
}

fn parse_file(directive: &str, line: usize) -> CueResult<Directive> {
    let start = directive
        .find('"')
        .ok_or_else(|| malformed(line, "missing opening quote for file name"))?;
    let quoted = &directive[start + 1..];
    let end = quoted
        .find('"')
        .ok_or_else(|| malformed(line, "missing closing quote for file name"))?;

    Ok(Directive::File {
        filename: quoted[..end].to_string(),
        file_type: quoted[end + 1..].trim().to_string(),
    })
}
