use crate::cd::{SECTOR_SIZE, SectorLayout, resolve_layout};
use crate::cue::models::{CueLine, Directive};
use crate::image::error::{ImageError, ImageResult};
use crate::options::ExtractOptions;
use log::{debug, warn};

const SECTOR_BYTES: u64 = SECTOR_SIZE as u64;

/// One output unit of the image. Positions are absolute sectors/bytes in the
/// stream being split and are `None` until resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub number: u32,
    pub mode_label: String,
    pub layout: SectorLayout,
    pub start_sector: Option<u64>,
    pub stop_sector: Option<u64>,
    pub start_byte: Option<u64>,
    pub stop_byte: Option<u64>,
    /// Track body split off an audio pregap, still waiting for its INDEX 01.
    synthesized: bool,
}

impl Track {
    fn new(number: u32, mode_label: String, layout: SectorLayout) -> Self {
        Self {
            number,
            mode_label,
            layout,
            start_sector: None,
            stop_sector: None,
            start_byte: None,
            stop_byte: None,
            synthesized: false,
        }
    }

    fn set_start(&mut self, sector: u64, byte: u64) {
        self.start_sector = Some(sector);
        self.start_byte = Some(byte);
    }

    pub fn is_audio(&self) -> bool {
        self.layout.audio
    }

    /// Inclusive sector range, once both ends are resolved.
    pub fn sector_range(&self) -> Option<(u64, u64)> {
        Some((self.start_sector?, self.stop_sector?))
    }

    pub fn sector_count(&self) -> u64 {
        self.sector_range()
            .map(|(start, stop)| (stop + 1).saturating_sub(start))
            .unwrap_or(0)
    }

    /// Payload bytes the track extracts to, excluding any WAV header.
    pub fn output_length(&self) -> u64 {
        self.sector_count() * self.layout.length as u64
    }
}

/// Turns TRACK and INDEX directives into an ordered track list.
///
/// Directives only record where each track starts. Stop positions are filled
/// in by [`TrackListBuilder::finish`] once the stream length is known.
#[derive(Debug)]
pub struct TrackListBuilder {
    options: ExtractOptions,
    tracks: Vec<Track>,
    current: Option<usize>,
}

impl TrackListBuilder {
    pub fn new(options: &ExtractOptions) -> Self {
        Self {
            options: *options,
            tracks: Vec::new(),
            current: None,
        }
    }

    /// Feeds one parsed CUE line. `sector_offset` is where the active FILE
    /// begins in the stream being split (zero outside merge mode).
    pub fn apply(&mut self, line: &CueLine, sector_offset: u64) -> ImageResult<()> {
        match &line.directive {
            Directive::Track { number, mode } => {
                self.begin_track(*number, mode);
                Ok(())
            }
            Directive::Index { number, position } => {
                let sector = sector_offset
                    .checked_add(*position)
                    .ok_or(ImageError::PositionOverflow(line.number))?;
                self.index(line.number, number, sector)
            }
            _ => Ok(()),
        }
    }

    pub fn begin_track(&mut self, number: u32, mode_label: &str) {
        let layout = resolve_layout(mode_label, &self.options);
        self.tracks
            .push(Track::new(number, mode_label.to_string(), layout));
        self.current = Some(self.tracks.len() - 1);
    }

    fn index(&mut self, line: usize, number: &str, sector: u64) -> ImageResult<()> {
        let current = self.current.ok_or(ImageError::IndexOutsideTrack(line))?;
        let byte = sector
            .checked_mul(SECTOR_BYTES)
            .ok_or(ImageError::PositionOverflow(line))?;
        let track = &mut self.tracks[current];

        match number {
            "01" => {
                track.set_start(sector, byte);
                debug!(
                    "Track {} starts at sector {} (byte {})",
                    track.number, sector, byte
                );
            }
            "00" if track.number == 1 && track.is_audio() => {
                debug!("Detected pregap track at track one, starting at sector {sector}");
                track.number = 0;
                track.set_start(sector, byte);

                let mut body = Track::new(1, track.mode_label.clone(), track.layout);
                body.synthesized = true;
                self.tracks.push(body);
                self.current = Some(self.tracks.len() - 1);
            }
            _ => {}
        }

        Ok(())
    }

    /// Resolves every stop position: each track ends one sector before its
    /// successor starts, the last one at the end of a `stream_length` byte stream.
    pub fn finish(self, stream_length: u64) -> ImageResult<Vec<Track>> {
        let mut tracks = self.tracks;

        if let Some(pos) = tracks
            .iter()
            .position(|t| t.synthesized && t.start_sector.is_none())
        {
            warn!("Pregap track 0 is never followed by INDEX 01, treating it as track 1");
            tracks.remove(pos);
            if let Some(pregap) = pos.checked_sub(1).and_then(|p| tracks.get_mut(p)) {
                pregap.number = 1;
            }
        }

        let empty_pregap = matches!(
            tracks.as_slice(),
            [pregap, body, ..] if pregap.number == 0
                && pregap.start_sector.is_some()
                && pregap.start_sector == body.start_sector
        );
        if empty_pregap {
            warn!("Pregap track 0 is empty, skipping it");
            tracks.remove(0);
        }

        if tracks.is_empty() {
            warn!("The CUE sheet does not describe any tracks");
            return Ok(tracks);
        }

        if stream_length == 0 {
            return Err(ImageError::EmptyImage);
        }

        let starts = tracks
            .iter()
            .map(|t| {
                t.start_sector
                    .map(|start| (t.number, start))
                    .ok_or(ImageError::UnresolvedTrack(t.number))
            })
            .collect::<ImageResult<Vec<_>>>()?;

        for (idx, track) in tracks.iter_mut().enumerate() {
            let (_, start) = starts[idx];

            let (stop_sector, stop_byte) = match starts.get(idx + 1) {
                Some(&(next, next_start)) => {
                    if next_start <= start {
                        return Err(ImageError::TrackOutOfOrder {
                            track: track.number,
                            start,
                            next,
                            next_start,
                        });
                    }
                    (next_start - 1, next_start * SECTOR_BYTES - 1)
                }
                None => {
                    let stop_byte = stream_length - 1;
                    let stop_sector = stop_byte / SECTOR_BYTES;
                    if start > stop_sector {
                        return Err(ImageError::TrackBeyondStream {
                            track: track.number,
                            start_sector: start,
                            total_sectors: stop_sector + 1,
                        });
                    }
                    (stop_sector, stop_byte)
                }
            };

            track.stop_sector = Some(stop_sector);
            track.stop_byte = Some(stop_byte);
        }

        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cd::TrackExtension;

    fn index_line(number: usize, index: &str, position: u64) -> CueLine {
        CueLine {
            number,
            text: String::new(),
            directive: Directive::Index {
                number: index.to_string(),
                position,
            },
        }
    }

    fn track_line(number: usize, track: u32, mode: &str) -> CueLine {
        CueLine {
            number,
            text: String::new(),
            directive: Directive::Track {
                number: track,
                mode: mode.to_string(),
            },
        }
    }

    fn build(lines: &[CueLine], stream_length: u64) -> ImageResult<Vec<Track>> {
        let options = ExtractOptions {
            wav: true,
            ..Default::default()
        };
        let mut builder = TrackListBuilder::new(&options);
        for line in lines {
            builder.apply(line, 0)?;
        }
        builder.finish(stream_length)
    }

    #[test]
    fn consecutive_tracks_are_adjacent() {
        let tracks = build(
            &[
                track_line(1, 1, "MODE1/2352"),
                index_line(2, "01", 0),
                track_line(3, 2, "AUDIO"),
                index_line(4, "00", 8),
                index_line(5, "01", 10),
                track_line(6, 3, "AUDIO"),
                index_line(7, "01", 25),
            ],
            40 * SECTOR_BYTES,
        )
        .unwrap();

        assert_eq!(tracks.len(), 3);
        for pair in tracks.windows(2) {
            assert_eq!(
                pair[0].stop_sector.unwrap() + 1,
                pair[1].start_sector.unwrap()
            );
            assert_eq!(pair[0].stop_byte.unwrap() + 1, pair[1].start_byte.unwrap());
        }
        assert_eq!(tracks[0].sector_range(), Some((0, 9)));
        assert_eq!(tracks[1].sector_range(), Some((10, 24)));
        assert_eq!(tracks[2].sector_range(), Some((25, 39)));
        assert_eq!(tracks[2].stop_byte, Some(40 * SECTOR_BYTES - 1));
    }

    #[test]
    fn last_track_covers_partial_trailing_sector() {
        let tracks = build(
            &[track_line(1, 1, "MODE1/2352"), index_line(2, "01", 0)],
            3 * SECTOR_BYTES + 100,
        )
        .unwrap();

        assert_eq!(tracks[0].stop_byte, Some(3 * SECTOR_BYTES + 99));
        assert_eq!(tracks[0].stop_sector, Some(3));
    }

    #[test]
    fn audio_pregap_on_track_one_is_split_off() {
        let tracks = build(
            &[
                track_line(1, 1, "AUDIO"),
                index_line(2, "00", 0),
                index_line(3, "01", 150),
                track_line(4, 2, "AUDIO"),
                index_line(5, "01", 1000),
            ],
            1200 * SECTOR_BYTES,
        )
        .unwrap();

        let numbers: Vec<_> = tracks.iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![0, 1, 2]);
        assert_eq!(tracks[0].mode_label, tracks[1].mode_label);
        assert_eq!(tracks[0].layout, tracks[1].layout);
        assert_eq!(tracks[1].layout.extension, TrackExtension::Wav);
        assert!(tracks[0].start_sector < tracks[1].start_sector);
        assert_eq!(tracks[0].sector_range(), Some((0, 149)));
        assert_eq!(tracks[1].sector_range(), Some((150, 999)));
    }

    #[test]
    fn index_zero_on_data_track_is_ignored() {
        let tracks = build(
            &[
                track_line(1, 1, "MODE1/2352"),
                index_line(2, "00", 0),
                index_line(3, "01", 150),
            ],
            300 * SECTOR_BYTES,
        )
        .unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].number, 1);
        assert_eq!(tracks[0].sector_range(), Some((150, 299)));
    }

    #[test]
    fn pregap_without_body_index_collapses_back_to_track_one() {
        let tracks = build(
            &[track_line(1, 1, "AUDIO"), index_line(2, "00", 0)],
            20 * SECTOR_BYTES,
        )
        .unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].number, 1);
        assert_eq!(tracks[0].sector_range(), Some((0, 19)));
    }

    #[test]
    fn sector_offset_shifts_start_positions() {
        let options = ExtractOptions::default();
        let mut builder = TrackListBuilder::new(&options);
        builder.apply(&track_line(1, 1, "MODE2/2352"), 0).unwrap();
        builder.apply(&index_line(2, "01", 0), 0).unwrap();
        builder.apply(&track_line(3, 2, "AUDIO"), 0).unwrap();
        builder.apply(&index_line(4, "01", 2), 500).unwrap();

        let tracks = builder.finish(600 * SECTOR_BYTES).unwrap();
        assert_eq!(tracks[1].start_sector, Some(502));
        assert_eq!(tracks[1].start_byte, Some(502 * SECTOR_BYTES));
        assert_eq!(tracks[0].stop_sector, Some(501));
    }

    #[test]
    fn empty_pregap_is_dropped() {
        let tracks = build(
            &[
                track_line(1, 1, "AUDIO"),
                index_line(2, "00", 0),
                index_line(3, "01", 0),
            ],
            20 * SECTOR_BYTES,
        )
        .unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].number, 1);
        assert_eq!(tracks[0].sector_range(), Some((0, 19)));
    }

    #[test]
    fn position_past_addressable_bytes_is_rejected() {
        assert!(matches!(
            build(
                &[
                    track_line(1, 1, "MODE1/2352"),
                    index_line(2, "01", 9_999_999_999_999 * 4500),
                ],
                SECTOR_BYTES,
            ),
            Err(ImageError::PositionOverflow(2))
        ));
    }

    #[test]
    fn file_offset_overflow_is_rejected() {
        let options = ExtractOptions::default();
        let mut builder = TrackListBuilder::new(&options);
        builder.apply(&track_line(1, 1, "AUDIO"), 0).unwrap();

        assert!(matches!(
            builder.apply(&index_line(2, "01", 1), u64::MAX),
            Err(ImageError::PositionOverflow(2))
        ));
    }

    #[test]
    fn index_before_track_is_rejected() {
        assert!(matches!(
            build(&[index_line(7, "01", 0)], SECTOR_BYTES),
            Err(ImageError::IndexOutsideTrack(7))
        ));
    }

    #[test]
    fn track_without_start_is_rejected() {
        assert!(matches!(
            build(
                &[
                    track_line(1, 1, "MODE1/2352"),
                    index_line(2, "01", 0),
                    track_line(3, 2, "AUDIO"),
                    track_line(4, 3, "AUDIO"),
                    index_line(5, "01", 10),
                ],
                20 * SECTOR_BYTES,
            ),
            Err(ImageError::UnresolvedTrack(2))
        ));
    }

    #[test]
    fn backwards_track_is_rejected() {
        assert!(matches!(
            build(
                &[
                    track_line(1, 1, "MODE1/2352"),
                    index_line(2, "01", 10),
                    track_line(3, 2, "AUDIO"),
                    index_line(4, "01", 5),
                ],
                20 * SECTOR_BYTES,
            ),
            Err(ImageError::TrackOutOfOrder { track: 1, .. })
        ));
    }

    #[test]
    fn last_track_past_end_of_stream_is_rejected() {
        assert!(matches!(
            build(
                &[track_line(1, 1, "MODE1/2352"), index_line(2, "01", 30)],
                20 * SECTOR_BYTES,
            ),
            Err(ImageError::TrackBeyondStream {
                track: 1,
                start_sector: 30,
                total_sectors: 20
            })
        ));
    }

    #[test]
    fn empty_stream_is_rejected() {
        assert!(matches!(
            build(&[track_line(1, 1, "AUDIO"), index_line(2, "01", 0)], 0),
            Err(ImageError::EmptyImage)
        ));
    }

    #[test]
    fn sheet_without_tracks_yields_nothing() {
        assert!(build(&[], 0).unwrap().is_empty());
    }

    #[test]
    fn output_length_follows_layout() {
        let tracks = build(
            &[track_line(1, 1, "MODE1/2352"), index_line(2, "01", 0)],
            10 * SECTOR_BYTES,
        )
        .unwrap();

        assert_eq!(tracks[0].sector_count(), 10);
        assert_eq!(tracks[0].output_length(), 10 * 2048);
    }
}
