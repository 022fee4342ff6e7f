use crate::options::ExtractOptions;
use log::warn;
use std::fmt;

pub const SECTOR_SIZE: usize = 2352;
pub const FRAMES_PER_SECOND: u64 = 75;
pub const SECONDS_PER_MINUTE: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackMode {
    Mode1_2352,
    Mode2_2352,
    Mode2_2336,
    Audio,
    Unknown,
}

impl TrackMode {
    pub fn from_label(label: &str) -> Self {
        if label.eq_ignore_ascii_case("MODE1/2352") {
            TrackMode::Mode1_2352
        } else if label.eq_ignore_ascii_case("MODE2/2352") {
            TrackMode::Mode2_2352
        } else if label.eq_ignore_ascii_case("MODE2/2336") {
            TrackMode::Mode2_2336
        } else if label.eq_ignore_ascii_case("AUDIO") {
            TrackMode::Audio
        } else {
            TrackMode::Unknown
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackExtension {
    Iso,
    Cdr,
    Wav,
    /// Placeholder for modes the table does not know.
    Ugh,
}

impl TrackExtension {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackExtension::Iso => "iso",
            TrackExtension::Cdr => "cdr",
            TrackExtension::Wav => "wav",
            TrackExtension::Ugh => "ugh",
        }
    }
}

impl fmt::Display for TrackExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the payload lives inside every raw sector of a track and how it is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorLayout {
    pub offset: usize,
    pub length: usize,
    pub extension: TrackExtension,
    pub audio: bool,
}

impl SectorLayout {
    const fn data(offset: usize, length: usize) -> Self {
        Self {
            offset,
            length,
            extension: TrackExtension::Iso,
            audio: false,
        }
    }
}

pub fn layout_for_mode(mode: TrackMode, options: &ExtractOptions) -> SectorLayout {
    match mode {
        TrackMode::Mode1_2352 => SectorLayout::data(16, 2048),
        TrackMode::Mode2_2352 if options.raw => SectorLayout::data(0, SECTOR_SIZE),
        TrackMode::Mode2_2352 if options.psx => SectorLayout::data(0, 2336),
        TrackMode::Mode2_2352 => SectorLayout::data(24, 2048),
        TrackMode::Mode2_2336 => SectorLayout::data(16, 2336),
        TrackMode::Audio => SectorLayout {
            offset: 0,
            length: SECTOR_SIZE,
            extension: if options.wav {
                TrackExtension::Wav
            } else {
                TrackExtension::Cdr
            },
            audio: true,
        },
        TrackMode::Unknown => SectorLayout {
            offset: 0,
            length: SECTOR_SIZE,
            extension: TrackExtension::Ugh,
            audio: false,
        },
    }
}

/// Resolves the byte layout for a CUE track mode label, case-insensitively.
/// Unknown labels degrade to a raw full sector dump.
pub fn resolve_layout(mode_label: &str, options: &ExtractOptions) -> SectorLayout {
    let mode = TrackMode::from_label(mode_label);
    if mode == TrackMode::Unknown {
        warn!(
            "Unknown track mode {:?}, dumping raw {} byte sectors as .{}",
            mode_label,
            SECTOR_SIZE,
            TrackExtension::Ugh
        );
    }

    layout_for_mode(mode, options)
}
