pub mod wav;

use crate::cd::SECTOR_SIZE;
use crate::image::error::{ImageError, ImageResult};
use crate::image::track::Track;
use crate::image::writer::wav::{WAV_HEADER_SIZE, WavHeader};
use crate::options::ExtractOptions;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::ffi::OsString;
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{
    AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, AsyncWrite, AsyncWriteExt, BufWriter,
};

const SECTOR_BYTES: u64 = SECTOR_SIZE as u64;

/// `<basename><NN>.<ext>`, the basename being a plain prefix.
pub fn track_file_name(basename: &Path, track: &Track) -> PathBuf {
    let mut name = OsString::from(basename.as_os_str());
    name.push(format!("{:02}.{}", track.number, track.layout.extension));
    PathBuf::from(name)
}

/// Swaps the two bytes of every 16 bit sample. A trailing odd byte is left alone.
pub fn swap_sample_bytes(samples: &mut [u8]) {
    for sample in samples.chunks_exact_mut(2) {
        sample.swap(0, 1);
    }
}

/// Writes `track` from `source` into its own file next to `basename`.
pub async fn write_track_file<R>(
    source: &mut R,
    track: &Track,
    basename: &Path,
    options: &ExtractOptions,
    multi: &MultiProgress,
) -> ImageResult<PathBuf>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    let path = track_file_name(basename, track);
    info!("{:2}: {}", track.number, path.display());

    if let (Some((start, stop)), Some(start_byte), Some(stop_byte)) =
        (track.sector_range(), track.start_byte, track.stop_byte)
    {
        debug!(
            "mmc sectors {}->{} ({}), mmc bytes {}->{} ({}), sector data at {}, {} bytes per sector, real data {} bytes",
            start,
            stop,
            track.sector_count(),
            start_byte,
            stop_byte,
            stop_byte + 1 - start_byte,
            track.layout.offset,
            track.layout.length,
            track.output_length()
        );
    }

    let file = File::create(&path).await?;
    let mut writer = BufWriter::with_capacity(8 * 1024 * 1024, file); // 8 MB buffer

    let pb = multi.add(ProgressBar::new(track.sector_count()));
    pb.set_style(
        ProgressStyle::with_template(
            "{prefix} {bar:40.cyan/blue} {pos}/{len} sectors ({percent}%)",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.set_prefix(format!("{:02}", track.number));

    let result = extract_track(source, &mut writer, track, options, &pb).await;
    pb.finish_and_clear();
    result?;

    writer.flush().await?;

    Ok(path)
}

/// Streams the track's sectors from `source` into `sink`, one sector at a time.
///
/// A partial sector at the very end of the stream is dropped. Returns the
/// number of payload bytes written, excluding any WAV header.
pub async fn extract_track<R, W>(
    source: &mut R,
    sink: &mut W,
    track: &Track,
    options: &ExtractOptions,
    progress: &ProgressBar,
) -> ImageResult<u64>
where
    R: AsyncRead + AsyncSeek + Unpin,
    W: AsyncWrite + Unpin,
{
    let start_byte = track
        .start_byte
        .filter(|_| track.sector_range().is_some())
        .ok_or(ImageError::UnresolvedTrack(track.number))?;

    let stream_length = source.seek(SeekFrom::End(0)).await?;
    source.seek(SeekFrom::Start(start_byte)).await?;

    let mut sector_count = track.sector_count();
    if let Some((_, stop)) = track.sector_range() {
        let tail = stream_length.saturating_sub(stop * SECTOR_BYTES);
        if sector_count > 0 && tail > 0 && tail < SECTOR_BYTES {
            warn!(
                "Track {} ends in a partial sector, dropping the trailing {} bytes",
                track.number, tail
            );
            sector_count -= 1;
        }
    }
    let output_length = sector_count * track.layout.length as u64;

    if track.is_audio() && options.wav {
        let data_length = u32::try_from(output_length)
            .ok()
            .filter(|len| len.checked_add(WAV_HEADER_SIZE as u32).is_some())
            .ok_or(ImageError::WavDataTooLarge {
                track: track.number,
                length: output_length,
            })?;
        sink.write_all(&WavHeader::redbook(data_length).to_bytes()?)
            .await?;
    }

    let payload = track.layout.offset..track.layout.offset + track.layout.length;
    let swap = track.is_audio() && options.swap_audio;
    let mut sector = vec![0u8; SECTOR_SIZE];

    for read in 0..sector_count {
        match source.read_exact(&mut sector).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(ImageError::StreamTruncation {
                    track: track.number,
                    expected: sector_count,
                    read,
                });
            }
            Err(e) => return Err(e.into()),
        }

        let data = &mut sector[payload.clone()];
        if swap {
            swap_sample_bytes(data);
        }
        sink.write_all(data).await?;
        progress.inc(1);
    }

    Ok(output_length)
}
