use binrw::{BinRead, BinWrite};
use std::io::Cursor;

pub const WAV_HEADER_SIZE: usize = 44;

const SAMPLE_RATE: u32 = 44100;
const CHANNELS: u16 = 2;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = CHANNELS * BITS_PER_SAMPLE / 8;

/// Canonical 44 byte RIFF/WAVE header for redbook audio: PCM, 44.1 kHz,
/// stereo, 16 bit. All fields are little-endian.
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct WavHeader {
    pub riff_tag: [u8; 4],
    /// File length minus the 8 bytes of `RIFF` and this field.
    pub riff_length: u32,
    pub wave_tag: [u8; 4],

    pub format_tag: [u8; 4],
    pub format_length: u32,
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,

    pub data_tag: [u8; 4],
    pub data_length: u32,
}

impl WavHeader {
    /// `data_length` must leave room for the 36 header bytes counted in `riff_length`.
    pub fn redbook(data_length: u32) -> Self {
        Self {
            riff_tag: *b"RIFF",
            riff_length: data_length + (WAV_HEADER_SIZE as u32 - 8),
            wave_tag: *b"WAVE",
            format_tag: *b"fmt ",
            format_length: 16,
            audio_format: 1,
            channels: CHANNELS,
            sample_rate: SAMPLE_RATE,
            byte_rate: SAMPLE_RATE * BLOCK_ALIGN as u32,
            block_align: BLOCK_ALIGN,
            bits_per_sample: BITS_PER_SAMPLE,
            data_tag: *b"data",
            data_length,
        }
    }

    pub fn to_bytes(&self) -> binrw::BinResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::with_capacity(WAV_HEADER_SIZE));
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }
}
