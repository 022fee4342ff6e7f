use crate::cd::SECTOR_SIZE;
use crate::cue::models::{CueLine, Directive};
use crate::cue::msf::format_timecode;
use crate::image::error::{ImageError, ImageResult};
use log::{debug, info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};

const SECTOR_BYTES: u64 = SECTOR_SIZE as u64;
const COPY_CHUNK_SIZE: usize = 64 * 1024;

/// Paths and size of a finished merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedImage {
    pub bin_path: PathBuf,
    pub cue_path: PathBuf,
    pub length: u64,
}

/// Concatenates every FILE of a CUE sheet into one BIN and writes the
/// matching CUE sheet with INDEX positions shifted into merged coordinates.
pub struct MergeAccumulator {
    bin_path: PathBuf,
    cue_path: PathBuf,
    source_dir: PathBuf,
    bin: BufWriter<File>,
    cue: BufWriter<File>,
    /// Sector at which the active source file begins in the merged stream.
    committed_sector_offset: u64,
    /// Sector at which the next source file will begin.
    pending_sector_offset: u64,
    length: u64,
}

impl MergeAccumulator {
    /// The merged CUE sheet lives next to the merged BIN, with a `.cue` extension.
    pub fn cue_path_for(bin_path: &Path) -> ImageResult<PathBuf> {
        match bin_path.extension().and_then(|ext| ext.to_str()) {
            Some("bin") => Ok(bin_path.with_extension("cue")),
            _ => Err(ImageError::InvalidMergeTarget(bin_path.to_path_buf())),
        }
    }

    /// Creates the merged BIN/CUE pair. Source files named by FILE directives
    /// are resolved against `source_dir`.
    pub async fn create(
        bin_path: impl AsRef<Path>,
        source_dir: impl AsRef<Path>,
        force: bool,
    ) -> ImageResult<Self> {
        let bin_path = bin_path.as_ref().to_path_buf();
        let cue_path = Self::cue_path_for(&bin_path)?;

        let bin = open_output(&bin_path, force).await?;
        let mut cue = BufWriter::new(open_output(&cue_path, force).await?);

        let bin_name = bin_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        cue.write_all(format!("FILE \"{bin_name}\" BINARY\n").as_bytes())
            .await?;

        Ok(Self {
            bin_path,
            cue_path,
            source_dir: source_dir.as_ref().to_path_buf(),
            bin: BufWriter::with_capacity(8 * 1024 * 1024, bin), // 8 MB buffer
            cue,
            committed_sector_offset: 0,
            pending_sector_offset: 0,
            length: 0,
        })
    }

    pub fn committed_sector_offset(&self) -> u64 {
        self.committed_sector_offset
    }

    pub fn pending_sector_offset(&self) -> u64 {
        self.pending_sector_offset
    }

    /// Appends one source file to the merged BIN and makes it the active file.
    ///
    /// Source lengths are rounded up to whole sectors when advancing the
    /// offset, so a misaligned file shifts every later track.
    pub async fn append_source(&mut self, filename: &str) -> ImageResult<u64> {
        let source_path = self.source_dir.join(filename);
        info!("Loading BIN file: {}", source_path.display());

        let mut source = File::open(&source_path).await?;
        let mut buffer = vec![0u8; COPY_CHUNK_SIZE];
        let mut copied = 0u64;

        loop {
            let read = source.read(&mut buffer).await?;
            if read == 0 {
                break;
            }
            self.bin.write_all(&buffer[..read]).await?;
            copied += read as u64;
        }

        if copied % SECTOR_BYTES != 0 {
            warn!(
                "{} is {} bytes, not a whole number of {} byte sectors, later tracks may be misaligned",
                source_path.display(),
                copied,
                SECTOR_SIZE
            );
        }

        self.committed_sector_offset = self.pending_sector_offset;
        self.pending_sector_offset += copied.div_ceil(SECTOR_BYTES);
        self.length += copied;

        debug!(
            "{} begins at merged sector {}, next file at sector {}",
            filename, self.committed_sector_offset, self.pending_sector_offset
        );

        Ok(copied)
    }

    /// Re-emits one line of the source CUE sheet into the merged sheet.
    pub async fn emit_line(&mut self, line: &CueLine) -> ImageResult<()> {
        let rewritten = match &line.directive {
            Directive::File { .. } => return Ok(()),
            Directive::Index { number, position } => {
                let shifted = self
                    .committed_sector_offset
                    .checked_add(*position)
                    .ok_or(ImageError::PositionOverflow(line.number))?;
                format!("    INDEX {} {}\n", number, format_timecode(shifted))
            }
            _ => format!("{}\n", line.text),
        };

        self.cue.write_all(rewritten.as_bytes()).await?;
        Ok(())
    }

    pub async fn finish(mut self) -> ImageResult<MergedImage> {
        self.bin.flush().await?;
        self.cue.flush().await?;

        info!(
            "Merged {} bytes into {} and {}",
            self.length,
            self.bin_path.display(),
            self.cue_path.display()
        );

        Ok(MergedImage {
            bin_path: self.bin_path,
            cue_path: self.cue_path,
            length: self.length,
        })
    }
}

async fn open_output(path: &Path, force: bool) -> ImageResult<File> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    options.open(path).await.map_err(|e| match e.kind() {
        ErrorKind::AlreadyExists => ImageError::MergedFileAlreadyExists(path.to_path_buf()),
        _ => e.into(),
    })
}
