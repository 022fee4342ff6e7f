use binchunker::ExtractOptions;
use clap::{Args, Parser};
use std::path::PathBuf;

/// Output switches shared by every command.
#[derive(Args, Debug, Clone, Eq, PartialEq)]
pub struct ExtractArgs {
    /// Raw mode for MODE2/2352: write all 2352 bytes from offset 0 (VCD/MPEG)
    #[arg(long, short = 'r', default_value_t = false)]
    pub raw: bool,

    /// PSX mode for MODE2/2352: write 2336 bytes from offset 0
    #[arg(long, short = 'p', default_value_t = false)]
    pub psx: bool,

    /// Output audio tracks in WAV format
    #[arg(long, short = 'w', default_value_t = false)]
    pub wav: bool,

    /// Swap the byte order of samples in audio tracks
    #[arg(long = "swap-audio", short = 's', default_value_t = false)]
    pub swap_audio: bool,
}

impl From<&ExtractArgs> for ExtractOptions {
    fn from(args: &ExtractArgs) -> Self {
        Self {
            raw: args.raw,
            psx: args.psx,
            wav: args.wav,
            swap_audio: args.swap_audio,
        }
    }
}

/// Splits a .bin image into one file per track described by its .cue sheet.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
#[command(
    long_about = "Splits a .bin image into one file per track described by its .cue sheet\n\nTracks are written as <BASENAME><NN>.<ext> where ext is iso for data tracks, cdr or wav for audio tracks and ugh for unknown track modes"
)]
pub struct SplitCommand {
    /// Input .bin image
    #[arg(value_name = "BIN")]
    pub bin: PathBuf,

    /// Input .cue sheet describing the image
    #[arg(value_name = "CUE")]
    pub cue: PathBuf,

    /// Prefix for the track files
    #[arg(value_name = "BASENAME")]
    pub basename: PathBuf,

    #[command(flatten)]
    pub extract: ExtractArgs,
}

/// Merges every .bin referenced by a .cue sheet into one .bin/.cue pair.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
#[command(
    long_about = "Merges every .bin referenced by a .cue sheet into one .bin/.cue pair\n\nA matching .cue is written next to OUTPUT_BIN. When BASENAME is given the merged image is split into tracks afterwards"
)]
pub struct MergeCommand {
    /// Merged .bin file to create
    #[arg(value_name = "OUTPUT_BIN")]
    pub output_bin: PathBuf,

    /// Input .cue sheet referencing the source .bin files
    #[arg(value_name = "CUE")]
    pub cue: PathBuf,

    /// Prefix for the track files, omit to only merge
    #[arg(value_name = "BASENAME")]
    pub basename: Option<PathBuf>,

    /// Force overwrite of the merged files if they already exist
    #[arg(long, short = 'f', default_value_t = false)]
    pub force: bool,

    #[command(flatten)]
    pub extract: ExtractArgs,
}
