use crate::cd::{FRAMES_PER_SECOND, SECONDS_PER_MINUTE};
use crate::cue::error::{CueError, CueResult};
use std::fmt;
use std::str::FromStr;

const FRAMES_PER_MINUTE: u64 = FRAMES_PER_SECOND * SECONDS_PER_MINUTE;

/// A minutes:seconds:frames position as written in CUE INDEX lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Msf {
    pub minutes: u64,
    pub seconds: u64,
    pub frames: u64,
}

impl Msf {
    pub fn from_frames(total: u64) -> Self {
        let minutes = total / FRAMES_PER_MINUTE;
        let remainder = total % FRAMES_PER_MINUTE;

        Self {
            minutes,
            seconds: remainder / FRAMES_PER_SECOND,
            frames: remainder % FRAMES_PER_SECOND,
        }
    }

    /// `None` when the position does not fit a 64 bit frame count.
    pub fn to_frames(&self) -> Option<u64> {
        SECONDS_PER_MINUTE
            .checked_mul(self.minutes)?
            .checked_add(self.seconds)?
            .checked_mul(FRAMES_PER_SECOND)?
            .checked_add(self.frames)
    }
}

impl FromStr for Msf {
    type Err = CueError;

    fn from_str(msf_str: &str) -> CueResult<Self> {
        let malformed = || CueError::MalformedTimecode(msf_str.to_string());

        let (minutes, rest) = msf_str.split_once(':').ok_or_else(malformed)?;
        let (seconds, frames) = rest.split_once(':').ok_or_else(malformed)?;

        let field = |text: &str| text.trim().parse::<u64>().map_err(|_| malformed());

        Ok(Self {
            minutes: field(minutes)?,
            seconds: field(seconds)?,
            frames: field(frames)?,
        })
    }
}

impl fmt::Display for Msf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.minutes, self.seconds, self.frames
        )
    }
}

/// Parses `MM:SS:FF` into an absolute frame count.
pub fn parse_timecode(text: &str) -> CueResult<u64> {
    text.parse::<Msf>()?
        .to_frames()
        .ok_or_else(|| CueError::MalformedTimecode(text.to_string()))
}

pub fn format_timecode(frames: u64) -> String {
    Msf::from_frames(frames).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_frames_from_msf() {
        assert_eq!(parse_timecode("00:00:00").unwrap(), 0);
        assert_eq!(parse_timecode("00:02:00").unwrap(), 150);
        assert_eq!(parse_timecode("01:00:00").unwrap(), 4500);
        assert_eq!(parse_timecode("12:34:56").unwrap(), 75 * (12 * 60 + 34) + 56);
    }

    #[test]
    fn formats_zero_padded_fields() {
        assert_eq!(format_timecode(0), "00:00:00");
        assert_eq!(format_timecode(150), "00:02:00");
        assert_eq!(format_timecode(4500 + 75 + 1), "01:01:01");
        assert_eq!(format_timecode(75 * 60 * 100 - 1), "99:59:74");
    }

    #[test]
    fn missing_colon_is_rejected() {
        assert!(matches!(
            parse_timecode("0000:00"),
            Err(CueError::MalformedTimecode(_))
        ));
        assert!(matches!(
            parse_timecode("000000"),
            Err(CueError::MalformedTimecode(_))
        ));
    }

    #[test]
    fn non_numeric_field_is_rejected() {
        assert!(matches!(
            parse_timecode("00:xx:00"),
            Err(CueError::MalformedTimecode(_))
        ));
        assert!(matches!(
            parse_timecode("00:00:01:02"),
            Err(CueError::MalformedTimecode(_))
        ));
    }

    #[test]
    fn oversized_minutes_are_rejected() {
        assert!(matches!(
            parse_timecode("9999999999999999999:00:00"),
            Err(CueError::MalformedTimecode(_))
        ));
        assert!(matches!(
            parse_timecode(&format!("{}:00:00", u64::MAX / 60)),
            Err(CueError::MalformedTimecode(_))
        ));
    }

    #[test]
    fn frames_round_trip_through_text() {
        for frames in 0..75 * 60 * 100 {
            assert_eq!(parse_timecode(&format_timecode(frames)).unwrap(), frames);
        }
    }

    #[test]
    fn text_round_trips_through_frames() {
        for minutes in [0, 1, 9, 10, 59, 74, 99] {
            for seconds in [0, 1, 30, 59] {
                for frames in [0, 1, 37, 74] {
                    let text = format!("{minutes:02}:{seconds:02}:{frames:02}");
                    assert_eq!(format_timecode(parse_timecode(&text).unwrap()), text);
                }
            }
        }
    }
}
