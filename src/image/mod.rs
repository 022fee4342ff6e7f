use crate::cue::CueParser;
use crate::cue::models::Directive;
use crate::image::error::ImageResult;
use crate::image::merge::{MergeAccumulator, MergedImage};
use crate::image::track::{Track, TrackListBuilder};
use crate::image::writer::write_track_file;
use crate::options::ExtractOptions;
use indicatif::MultiProgress;
use log::{debug, info};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeek};

pub mod error;
pub mod merge;
pub mod track;
pub mod writer;

#[derive(Debug)]
pub struct SplitReport {
    pub tracks: Vec<Track>,
    pub files: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct MergeReport {
    pub merged: MergedImage,
    pub tracks: Vec<Track>,
    /// Empty when no basename was given.
    pub files: Vec<PathBuf>,
}

/// Splits `bin_path` into one file per track described by `cue_path`.
/// FILE directives are ignored, the BIN is taken as given.
pub async fn split_image(
    bin_path: impl AsRef<Path>,
    cue_path: impl AsRef<Path>,
    basename: impl AsRef<Path>,
    options: &ExtractOptions,
    multi: &MultiProgress,
) -> ImageResult<SplitReport> {
    let (bin_path, cue_path) = (bin_path.as_ref(), cue_path.as_ref());

    debug!("Parsing CUE file: {:?}", cue_path);
    let mut parser = CueParser::open(cue_path).await?;
    let mut builder = TrackListBuilder::new(options);

    while let Some(line) = parser.next_line().await? {
        builder.apply(&line, 0)?;
    }

    debug!("Opening BIN file: {:?}", bin_path);
    let mut bin = File::open(bin_path).await?;
    let length = bin.metadata().await?.len();

    let tracks = builder.finish(length)?;
    log_tracks(&tracks);

    let files = write_tracks(&mut bin, &tracks, basename.as_ref(), options, multi).await?;

    Ok(SplitReport { tracks, files })
}

/// Merges every FILE of `cue_path` into `merged_bin_path` plus a rewritten
/// `.cue` next to it, then splits the merged image if `basename` is given.
pub async fn merge_image(
    cue_path: impl AsRef<Path>,
    merged_bin_path: impl AsRef<Path>,
    basename: Option<&Path>,
    options: &ExtractOptions,
    force: bool,
    multi: &MultiProgress,
) -> ImageResult<MergeReport> {
    let cue_path = cue_path.as_ref();
    let cue_dir = cue_path.parent().unwrap_or(Path::new("."));
    debug!("Path to BIN/CUE files: {:?}", cue_dir);

    let mut merger = MergeAccumulator::create(merged_bin_path, cue_dir, force).await?;
    let mut parser = CueParser::open(cue_path).await?;
    let mut builder = TrackListBuilder::new(options);

    while let Some(line) = parser.next_line().await? {
        if let Directive::File { filename, .. } = &line.directive {
            merger.append_source(filename).await?;
        }
        merger.emit_line(&line).await?;
        builder.apply(&line, merger.committed_sector_offset())?;
    }

    let merged = merger.finish().await?;
    let tracks = builder.finish(merged.length)?;
    log_tracks(&tracks);

    let files = match basename {
        Some(basename) => {
            let mut bin = File::open(&merged.bin_path).await?;
            write_tracks(&mut bin, &tracks, basename, options, multi).await?
        }
        None => {
            info!("No basename given, skipping track extraction");
            Vec::new()
        }
    };

    Ok(MergeReport {
        merged,
        tracks,
        files,
    })
}

fn log_tracks(tracks: &[Track]) {
    for track in tracks {
        debug!(
            "Track {:2}: {:<12} sectors {:?}",
            track.number,
            track.mode_label,
            track.sector_range()
        );
    }
}

async fn write_tracks<R>(
    source: &mut R,
    tracks: &[Track],
    basename: &Path,
    options: &ExtractOptions,
    multi: &MultiProgress,
) -> ImageResult<Vec<PathBuf>>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    info!("Writing tracks:");

    let mut files = Vec::with_capacity(tracks.len());
    for track in tracks {
        files.push(write_track_file(source, track, basename, options, multi).await?);
    }

    Ok(files)
}
