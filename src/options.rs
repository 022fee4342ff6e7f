/// Conversion switches collected once from the front end and passed by reference
/// through layout resolution, track building and extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Dump MODE2/2352 tracks as full 2352 byte sectors (VCD/MPEG).
    pub raw: bool,

    /// Dump MODE2/2352 tracks as 2336 byte sectors (PSX).
    pub psx: bool,

    /// Write audio tracks as WAV instead of headerless CDR.
    pub wav: bool,

    /// Swap the byte order of every 16 bit audio sample.
    pub swap_audio: bool,
}
