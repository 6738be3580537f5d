//! # Delimiter Inference
//!
//! Infers the field separator of a delimited text file from a sample of
//! its first bytes.
//!
//! The sample is split into records (newlines inside a quoted field do not
//! end a record) and, for each candidate, the number of unquoted
//! occurrences per record is tallied. A candidate qualifies when its most
//! common per-record count is non-zero and shared by at least
//! `DELIMITER_AGREEMENT_PERCENT` of the records. The qualifier with the
//! most agreeing records wins; ties fall back to preference order.

use crate::LoaderError;
use crate::primitives::{DELIMITER_AGREEMENT_PERCENT, DELIMITER_CANDIDATES};
use std::collections::BTreeMap;

const CANDIDATES: usize = DELIMITER_CANDIDATES.len();

type RecordCounts = [usize; CANDIDATES];

/// Infer the delimiter from `sample`.
///
/// `truncated` tells whether the sample was cut from a longer file; in that
/// case a trailing record without its newline is ignored, unless it is the
/// only record available.
pub fn sniff_delimiter(sample: &[u8], truncated: bool) -> Result<u8, LoaderError> {
    let text = utf8_prefix(sample, truncated)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let records = record_counts(text, truncated);
    if records.is_empty() {
        return Err(LoaderError::FormatError(
            "could not determine delimiter: sample is empty".to_string(),
        ));
    }

    let total = records.len();
    let mut best: Option<(usize, usize)> = None;

    for (idx, _) in DELIMITER_CANDIDATES.iter().enumerate() {
        let Some((mode, agreeing)) = modal_count(&records, idx) else {
            continue;
        };
        if mode == 0 || agreeing * 100 < DELIMITER_AGREEMENT_PERCENT * total {
            continue;
        }
        // Strictly greater keeps the earlier (preferred) candidate on ties.
        if best.is_none_or(|(_, best_agreeing)| agreeing > best_agreeing) {
            best = Some((idx, agreeing));
        }
    }

    best.map(|(idx, _)| DELIMITER_CANDIDATES[idx])
        .ok_or_else(|| {
            LoaderError::FormatError(format!(
                "could not determine delimiter from {} sampled record(s)",
                total
            ))
        })
}

/// Human-readable name of a delimiter byte.
#[must_use]
pub fn delimiter_name(delimiter: u8) -> &'static str {
    match delimiter {
        b',' => "comma",
        b'\t' => "tab",
        b';' => "semicolon",
        b'|' => "pipe",
        b':' => "colon",
        _ => "other",
    }
}

/// Longest valid UTF-8 prefix of the sample.
///
/// Only a character split by the sample boundary is tolerated; any other
/// invalid sequence means the file is not UTF-8 text.
fn utf8_prefix(sample: &[u8], truncated: bool) -> Result<&str, LoaderError> {
    match std::str::from_utf8(sample) {
        Ok(text) => Ok(text),
        Err(e) if truncated && e.error_len().is_none() => {
            Ok(std::str::from_utf8(&sample[..e.valid_up_to()]).unwrap_or_default())
        }
        Err(e) => Err(LoaderError::FormatError(format!(
            "sample is not valid UTF-8 (byte {})",
            e.valid_up_to()
        ))),
    }
}

/// Position of the scanner within the current field.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    /// Nothing read yet; a quote here opens a quoted field.
    Start,
    /// Inside an unquoted field; quotes are literal.
    Bare,
    /// Inside a quoted field.
    Quoted,
    /// A quote seen inside a quoted field: either `""` or the closing quote.
    QuoteInQuoted,
}

/// Per-record unquoted occurrence counts of every candidate.
///
/// A quote opens a quoted field only at the start of a record or right
/// after a candidate delimiter; anywhere else it is an ordinary byte.
fn record_counts(text: &str, truncated: bool) -> Vec<RecordCounts> {
    let mut records = Vec::new();
    let mut current = [0usize; CANDIDATES];
    let mut field = Field::Start;
    let mut has_content = false;

    for byte in text.bytes() {
        match (field, byte) {
            (Field::Start, b'"') => {
                field = Field::Quoted;
                has_content = true;
            }
            (Field::Quoted, b'"') => field = Field::QuoteInQuoted,
            (Field::Quoted, _) => {}
            (Field::QuoteInQuoted, b'"') => field = Field::Quoted,
            (_, b'\n') => {
                if has_content {
                    records.push(current);
                }
                current = [0; CANDIDATES];
                field = Field::Start;
                has_content = false;
            }
            (_, b'\r') => {}
            (_, other) => {
                has_content = true;
                field = match DELIMITER_CANDIDATES.iter().position(|&c| c == other) {
                    Some(idx) => {
                        current[idx] += 1;
                        Field::Start
                    }
                    None => Field::Bare,
                };
            }
        }
    }

    if has_content && (!truncated || records.is_empty()) {
        records.push(current);
    }
    records
}

/// Most common per-record count of candidate `idx`, with how many records
/// share it. Ties go to the larger count.
fn modal_count(records: &[RecordCounts], idx: usize) -> Option<(usize, usize)> {
    let mut tally: BTreeMap<usize, usize> = BTreeMap::new();
    for counts in records {
        *tally.entry(counts[idx]).or_default() += 1;
    }
    tally
        .into_iter()
        .max_by(|(count_a, freq_a), (count_b, freq_b)| {
            freq_a.cmp(freq_b).then(count_a.cmp(count_b))
        })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_comma() {
        let sample = b"book_id,title,authors\n1,Dune,Frank Herbert\n2,Emma,Jane Austen\n";
        assert_eq!(sniff_delimiter(sample, false).expect("sniff"), b',');
    }

    #[test]
    fn detects_semicolon_and_tab() {
        let semi = b"tag_id;tag_name\n5;scifi\n6;fantasy\n";
        assert_eq!(sniff_delimiter(semi, false).expect("sniff"), b';');

        let tab = b"goodreads_book_id\ttag_id\tcount\n1\t5\t42\n";
        assert_eq!(sniff_delimiter(tab, false).expect("sniff"), b'\t');
    }

    #[test]
    fn ignores_delimiters_inside_quotes() {
        let sample = b"book_id;title\n1;\"Dune, Messiah, and more\"\n2;\"A, B\"\n";
        assert_eq!(sniff_delimiter(sample, false).expect("sniff"), b';');
    }

    #[test]
    fn quoted_newline_does_not_split_record() {
        let sample = b"id,title\n1,\"two\nlines\"\n2,plain\n";
        assert_eq!(sniff_delimiter(sample, false).expect("sniff"), b',');
    }

    #[test]
    fn stray_quote_inside_field_is_literal() {
        let sample = b"book_id,title,authors\n1,The 12\" Single,Some Band\n2,Emma,Jane Austen\n3,Dune,Frank Herbert\n4,Ulysses,James Joyce\n";
        assert_eq!(sniff_delimiter(sample, false).expect("sniff"), b',');
    }

    #[test]
    fn doubled_quote_stays_inside_quoted_field() {
        let sample = b"id;title\n1;\"Say \"\"hi\"\"; then\nleave\"\n2;plain\n";
        assert_eq!(sniff_delimiter(sample, false).expect("sniff"), b';');
    }

    #[test]
    fn drops_partial_last_record_when_truncated() {
        // The last record is cut mid-way and carries fewer commas.
        let sample = b"a,b,c\n1,2,3\n4,5,6\n7,8";
        assert_eq!(sniff_delimiter(sample, true).expect("sniff"), b',');
    }

    #[test]
    fn prefers_comma_on_tie() {
        let sample = b"a,b;c\n1,2;3\n";
        assert_eq!(sniff_delimiter(sample, false).expect("sniff"), b',');
    }

    #[test]
    fn strips_byte_order_mark() {
        let sample = "\u{feff}tag_id|tag_name\n1|x\n".as_bytes();
        assert_eq!(sniff_delimiter(sample, false).expect("sniff"), b'|');
    }

    #[test]
    fn single_column_fails() {
        let result = sniff_delimiter(b"title\nDune\nEmma\n", false);
        assert!(matches!(result, Err(LoaderError::FormatError(_))));
    }

    #[test]
    fn empty_sample_fails() {
        assert!(matches!(
            sniff_delimiter(b"", false),
            Err(LoaderError::FormatError(_))
        ));
    }

    #[test]
    fn tolerates_split_utf8_character_at_cut() {
        let mut sample = "id,name\n1,Caf".as_bytes().to_vec();
        sample.extend_from_slice(&"é".as_bytes()[..1]);
        assert_eq!(sniff_delimiter(&sample, true).expect("sniff"), b',');
    }

    #[test]
    fn rejects_invalid_utf8() {
        let result = sniff_delimiter(b"id,name\n1,\xff\xfe\n", false);
        assert!(matches!(result, Err(LoaderError::FormatError(_))));
    }

    #[test]
    fn delimiter_names() {
        assert_eq!(delimiter_name(b','), "comma");
        assert_eq!(delimiter_name(b'\t'), "tab");
        assert_eq!(delimiter_name(b'#'), "other");
    }
}
