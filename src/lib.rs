//! Splits BIN/CUE optical disc images into per-track ISO, raw CDR or WAV files,
//! and merges multi-file BIN/CUE sets into a single BIN/CUE pair.

pub mod cd;
pub mod cue;
pub mod image;
pub mod options;

pub use image::{MergeReport, SplitReport, merge_image, split_image};
pub use options::ExtractOptions;
