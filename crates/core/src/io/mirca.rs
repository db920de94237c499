//! Parser for the MIRCA2000 condensed crop calendar format.
//!
//! Each record starts with `unit_code crop_class n_subcrops`, followed by
//! `n_subcrops` triples of `area plant_month harvest_month`, all
//! whitespace-separated on one line. A configurable number of header
//! lines is skipped first.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Number of header lines in the files distributed with MIRCA2000
pub const DEFAULT_HEADER_LINES: usize = 4;

/// One (unit, crop, subcrop) entry of a condensed crop calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MircaRecord {
    pub unit_code: i32,
    pub crop: i16,
    /// 1-based subcrop index within the (unit, crop) record
    pub subcrop: i16,
    pub plant_month: i16,
    pub harvest_month: i16,
}

/// Parse a condensed crop calendar file.
///
/// # Arguments
/// * `path` - full path to the crop calendar file
/// * `header_lines` - number of header lines to skip
///   (use [`DEFAULT_HEADER_LINES`] for standard files)
///
/// # Errors
/// Fails on I/O errors and at the first unparseable token of a
/// malformed record.
pub fn parse_condensed_crop_calendar(
    path: impl AsRef<Path>,
    header_lines: usize,
) -> Result<Vec<MircaRecord>> {
    let file = File::open(path)?;
    parse_condensed_crop_calendar_reader(BufReader::new(file), header_lines)
}

/// Parse a condensed crop calendar from any buffered reader.
pub fn parse_condensed_crop_calendar_reader<R: BufRead>(
    reader: R,
    header_lines: usize,
) -> Result<Vec<MircaRecord>> {
    let mut records = Vec::new();

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = line_idx + 1;

        if line_idx < header_lines {
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let unit_code: i32 = parse_token(&mut tokens, line_no, "unit_code")?;
        let crop: i16 = parse_token(&mut tokens, line_no, "crop_class")?;
        let n_subcrops: i16 = parse_token(&mut tokens, line_no, "n_subcrops")?;

        for subcrop in 1..=n_subcrops {
            // The cultivated area leads each triple but is not carried
            // into the result.
            let _area: f64 = parse_token(&mut tokens, line_no, "area")?;
            let plant_month: i16 = parse_token(&mut tokens, line_no, "plant_month")?;
            let harvest_month: i16 = parse_token(&mut tokens, line_no, "harvest_month")?;

            records.push(MircaRecord {
                unit_code,
                crop,
                subcrop,
                plant_month,
                harvest_month,
            });
        }
    }

    Ok(records)
}

fn parse_token<'a, T: std::str::FromStr>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
    field: &str,
) -> Result<T> {
    let token = tokens.next().ok_or_else(|| Error::Parse {
        line,
        message: format!("missing {field}"),
    })?;

    token.parse().map_err(|_| Error::Parse {
        line,
        message: format!("invalid {field}: {token:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
header 1
header 2
header 3
header 4
1001 2 2 1500.0 5 9 320.5 11 3
1002 7 1 80.25 6 10
";

    #[test]
    fn test_parse_sample() {
        let records =
            parse_condensed_crop_calendar_reader(Cursor::new(SAMPLE), DEFAULT_HEADER_LINES)
                .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0],
            MircaRecord {
                unit_code: 1001,
                crop: 2,
                subcrop: 1,
                plant_month: 5,
                harvest_month: 9,
            }
        );
        assert_eq!(records[1].subcrop, 2);
        assert_eq!(records[1].plant_month, 11);
        assert_eq!(records[1].harvest_month, 3);
        assert_eq!(records[2].unit_code, 1002);
    }

    #[test]
    fn test_parse_header_lines_configurable() {
        let input = "only one header\n5 1 1 10.0 2 6\n";
        let records = parse_condensed_crop_calendar_reader(Cursor::new(input), 1).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].unit_code, 5);
    }

    #[test]
    fn test_parse_truncated_record_fails() {
        let input = "1001 2 2 1500.0 5\n";
        let err = parse_condensed_crop_calendar_reader(Cursor::new(input), 0).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn test_parse_bad_token_fails() {
        let input = "1001 x 1 10.0 5 9\n";
        let err = parse_condensed_crop_calendar_reader(Cursor::new(input), 0).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }
}
