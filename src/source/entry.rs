//! The entry type produced by every feed source, and id extraction.
//!
//! An [`Entry`] only lives for one poll cycle.  The relay never stores whole
//! entries, only the id derived from them by [`extract_id`].
//!
//! ## Id shape
//!
//! Upstream guids look like `https://host/thread-1234.html` or
//! `feed-entry-101.xml`: the post number is the last `-`-separated segment
//! with its file extension removed.  Anything that does not fit that shape is
//! rejected with [`RelayError::MalformedEntry`] rather than guessed at, so a
//! change in the publisher's guid format shows up in the logs immediately.

use chrono::{DateTime, Utc};

use crate::error::{RelayError, Result};

/// A single feed entry, normalised from RSS or Atom.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Entry {
    /// The raw globally-unique identifier (RSS `<guid>`, Atom `<id>`).
    ///
    /// `None` when an RSS item has no `<guid>`.  An Atom entry without `<id>`
    /// still gets `Some`: `feed-rs` fills in a hex digest, which has no `-`
    /// segment and is rejected by [`extract_id`].  Either way the entry is
    /// never relayed.
    pub guid: Option<String>,

    /// Human-readable headline.
    pub title: String,

    /// URL of the post.
    pub link: Option<String>,

    /// Publication timestamp, only used for logging.
    pub published: Option<DateTime<Utc>>,
}

/// Derive the relay id from an entry's guid.
///
/// Takes the last `-`-delimited segment of the guid and strips the trailing
/// extension (everything after the last `.`).  Pure and deterministic.
pub fn extract_id(entry: &Entry) -> Result<String> {
    let guid = entry
        .guid
        .as_deref()
        .ok_or_else(|| RelayError::MalformedEntry(format!("{:?} has no guid", entry.title)))?;

    let (_, last) = guid
        .rsplit_once('-')
        .ok_or_else(|| RelayError::MalformedEntry(format!("guid {guid:?} has no '-' segment")))?;

    let id = match last.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => last,
    };

    if id.is_empty() {
        return Err(RelayError::MalformedEntry(format!(
            "guid {guid:?} has an empty id segment"
        )));
    }

    Ok(id.to_string())
}

/// Parse an extracted id as the publisher's sequence number.
pub fn sequence_number(id: &str) -> Result<u64> {
    id.parse::<u64>()
        .map_err(|e| RelayError::MalformedEntry(format!("id {id:?} is not numeric: {e}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Shorthand constructor shared with the filter and poll tests.
    pub fn make_entry(guid: &str, title: &str) -> Entry {
        Entry {
            guid: Some(guid.to_string()),
            title: title.to_string(),
            link: Some(format!("https://example.com/{title}")),
            published: None,
        }
    }

    #[test]
    fn extracts_trailing_number() {
        let e = make_entry("feed-entry-101.xml", "a");
        assert_eq!(extract_id(&e).unwrap(), "101");
    }

    #[test]
    fn extracts_from_url_guid() {
        let e = make_entry("https://bbs.example.org/thread-48213-1-1.html", "a");
        assert_eq!(extract_id(&e).unwrap(), "1");

        let e = make_entry("https://bbs.example.org/post-48213.html", "a");
        assert_eq!(extract_id(&e).unwrap(), "48213");
    }

    #[test]
    fn segment_without_extension_is_kept_whole() {
        let e = make_entry("entry-77", "a");
        assert_eq!(extract_id(&e).unwrap(), "77");
    }

    #[test]
    fn only_the_last_extension_is_stripped() {
        let e = make_entry("entry-12.tar.gz", "a");
        assert_eq!(extract_id(&e).unwrap(), "12.tar");
        assert!(sequence_number("12.tar").is_err());
    }

    #[test]
    fn extraction_is_idempotent() {
        let e = make_entry("feed-entry-103.xml", "a");
        assert_eq!(extract_id(&e).unwrap(), extract_id(&e).unwrap());
    }

    #[test]
    fn missing_guid_is_malformed() {
        let mut e = make_entry("x-1", "a");
        e.guid = None;
        assert!(matches!(extract_id(&e), Err(RelayError::MalformedEntry(_))));
    }

    #[test]
    fn guid_without_dash_is_malformed() {
        let e = make_entry("12345.xml", "a");
        assert!(matches!(extract_id(&e), Err(RelayError::MalformedEntry(_))));
    }

    #[test]
    fn empty_segment_is_malformed() {
        assert!(extract_id(&make_entry("entry-", "a")).is_err());
        assert!(extract_id(&make_entry("entry-.xml", "a")).is_err());
    }

    #[test]
    fn sequence_number_parses_digits_only() {
        assert_eq!(sequence_number("101").unwrap(), 101);
        assert_eq!(sequence_number("007").unwrap(), 7);
        assert!(matches!(sequence_number("abc"), Err(RelayError::MalformedEntry(_))));
        assert!(sequence_number("").is_err());
    }
}
