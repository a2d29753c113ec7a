use time::macros::format_description;
use time::PrimitiveDateTime;

use super::constants::RECORD_SEPARATOR;
use super::error::FormatError;

/// The two header lines at the top of a dump
#[derive(Debug, Clone, PartialEq)]
pub struct Preamble {
    pub baseline: i64,
    pub anchor_date: String,
    pub anchor_time: String,
    /// The anchor date and time as nanoseconds since the unix epoch (UTC)
    pub anchor_wallclock_ns: i128,
}

impl Preamble {
    /// Parse the baseline line and the anchor line
    pub fn parse(baseline_line: &str, anchor_line: &str) -> Result<Self, FormatError> {
        let baseline = baseline_line
            .split_whitespace()
            .last()
            .and_then(|token| token.parse::<i64>().ok())
            .ok_or_else(|| FormatError::BadBaseline(String::from(baseline_line)))?;

        let tokens: Vec<&str> = anchor_line.split_whitespace().collect();
        if tokens.len() < 2 {
            return Err(FormatError::MissingAnchorTokens(String::from(anchor_line)));
        }
        let anchor_date = tokens[tokens.len() - 2];
        let anchor_time = tokens[tokens.len() - 1];
        let anchor_wallclock_ns = parse_anchor(anchor_date, anchor_time)?;

        Ok(Self {
            baseline,
            anchor_date: String::from(anchor_date),
            anchor_time: String::from(anchor_time),
            anchor_wallclock_ns,
        })
    }
}

/// Convert `YYYY-MM-DD` and `HH:MM:SS.ffffff` into epoch nanoseconds
fn parse_anchor(date: &str, time_of_day: &str) -> Result<i128, FormatError> {
    let format = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"
    );
    let stamp = format!("{date} {time_of_day}");
    match PrimitiveDateTime::parse(&stamp, &format) {
        Ok(datetime) => Ok(datetime.assume_utc().unix_timestamp_nanos()),
        Err(e) => Err(FormatError::BadAnchor(stamp, e)),
    }
}

/// A dump split into its preamble and record blocks.
///
/// Blocks borrow from the raw dump text. Block 0 is whatever follows the preamble up to the
/// first separator.
#[derive(Debug)]
pub struct TokenizedDump<'a> {
    pub preamble: Preamble,
    pub blocks: Vec<&'a str>,
}

impl<'a> TokenizedDump<'a> {
    pub fn n_blocks(&self) -> usize {
        self.blocks.len()
    }
}

/// Split a raw dump into its preamble and separator delimited record blocks
pub fn tokenize(raw: &str) -> Result<TokenizedDump<'_>, FormatError> {
    if !raw.contains(RECORD_SEPARATOR) {
        return Err(FormatError::MissingSeparator);
    }

    let mut blocks: Vec<&str> = raw.split(RECORD_SEPARATOR).collect();

    // Strip the two header lines off the front of block 0
    let first: &str = blocks[0];
    let mut head = first.splitn(3, '\n');
    let baseline_line = head
        .next()
        .filter(|l| !l.trim().is_empty())
        .ok_or(FormatError::MissingBaselineLine)?;
    let anchor_line = head
        .next()
        .filter(|l| !l.trim().is_empty())
        .ok_or(FormatError::MissingAnchorLine)?;
    let preamble = Preamble::parse(baseline_line.trim_end(), anchor_line.trim_end())?;
    blocks[0] = head.next().unwrap_or("");

    log::info!(
        "Dump preamble -- baseline: {} anchor: {} {}",
        preamble.baseline,
        preamble.anchor_date,
        preamble.anchor_time
    );

    Ok(TokenizedDump { preamble, blocks })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preamble() {
        let raw = format!(
            "BASELINE = 512\nRun start 2019-03-01 12:00:00.250000\nfirst\n{RECORD_SEPARATOR}\nsecond\n"
        );
        let dump = tokenize(&raw).unwrap();
        assert_eq!(dump.preamble.baseline, 512);
        assert_eq!(dump.preamble.anchor_date, "2019-03-01");
        assert_eq!(dump.preamble.anchor_time, "12:00:00.250000");
        // 2019-03-01T12:00:00Z
        assert_eq!(
            dump.preamble.anchor_wallclock_ns,
            1_551_441_600_250_000_000i128
        );
        assert_eq!(dump.n_blocks(), 2);
        assert_eq!(dump.blocks[0], "first\n");
        assert_eq!(dump.blocks[1], "\nsecond\n");
    }

    #[test]
    fn test_missing_separator() {
        let raw = "BASELINE = 512\nRun start 2019-03-01 12:00:00.0\nrecord\n";
        assert!(matches!(tokenize(raw), Err(FormatError::MissingSeparator)));
    }

    #[test]
    fn test_missing_anchor_line() {
        let raw = format!("BASELINE = 512\n\nrecord\n{RECORD_SEPARATOR}\n");
        assert!(matches!(
            tokenize(&raw),
            Err(FormatError::MissingAnchorLine)
        ));
        let raw = format!("BASELINE = 512{RECORD_SEPARATOR}\n");
        assert!(matches!(
            tokenize(&raw),
            Err(FormatError::MissingAnchorLine)
        ));
    }

    #[test]
    fn test_bad_preamble_tokens() {
        let raw = format!("BASELINE = x\nstart 2019-03-01 12:00:00.0\n{RECORD_SEPARATOR}\n");
        assert!(matches!(tokenize(&raw), Err(FormatError::BadBaseline(_))));
        let raw = format!("BASELINE = 5\n12:00:00.0\n{RECORD_SEPARATOR}\n");
        assert!(matches!(
            tokenize(&raw),
            Err(FormatError::MissingAnchorTokens(_))
        ));
        let raw = format!("BASELINE = 5\nstart 2019-13-01 12:00:00.0\n{RECORD_SEPARATOR}\n");
        assert!(matches!(tokenize(&raw), Err(FormatError::BadAnchor(..))));
    }
}
