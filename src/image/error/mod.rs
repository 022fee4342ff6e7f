use crate::cue::error::CueError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    #[error(transparent)]
    CueError(#[from] CueError),

    #[error("INDEX on line {0} appears before any TRACK")]
    IndexOutsideTrack(usize),

    #[error("INDEX on line {0} points past the largest addressable sector")]
    PositionOverflow(usize),

    #[error("Track {0} never received an INDEX 01 start position")]
    UnresolvedTrack(u32),

    #[error("Track {next} starts at sector {next_start}, not after track {track} at sector {start}")]
    TrackOutOfOrder {
        track: u32,
        start: u64,
        next: u32,
        next_start: u64,
    },

    #[error("Track {track} starts at sector {start_sector} but the image only has {total_sectors} sectors")]
    TrackBeyondStream {
        track: u32,
        start_sector: u64,
        total_sectors: u64,
    },

    #[error("The BIN image is empty")]
    EmptyImage,

    #[error("Track {track} is truncated: expected {expected} sectors, image ended after {read}")]
    StreamTruncation { track: u32, expected: u64, read: u64 },

    #[error("Track {track} holds {length} bytes of audio, too large for a WAV file")]
    WavDataTooLarge { track: u32, length: u64 },

    #[error("Merged file already exists, use --force to overwrite: {0}")]
    MergedFileAlreadyExists(PathBuf),

    #[error("Merged BIN file name must end in .bin: {0}")]
    InvalidMergeTarget(PathBuf),
}

pub type ImageResult<T> = Result<T, ImageError>;
