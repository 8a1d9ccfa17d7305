//! New-entry detection.
//!
//! Picks the one entry to relay this cycle: among entries whose id is not yet
//! in [`SentIds`], the one with the **smallest** numeric id.  A backlog of
//! unseen posts therefore drains oldest-first, one per cycle, in the
//! publisher's numbering order rather than the feed's listing order.
//!
//! Entries whose id cannot be extracted or is not numeric are logged and
//! skipped; they never abort selection.  Equal numeric ids keep feed order
//! (the sort is stable), so the first one listed wins.

use tracing::warn;

use crate::source::{extract_id, sequence_number, Entry};
use crate::store::SentIds;

/// The entry chosen for delivery together with its extracted id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selected<'a> {
    pub id: String,
    pub entry: &'a Entry,
}

/// Return the oldest unseen entry of `fetched`, or `None` if all are known.
pub fn select_newest<'a>(fetched: &'a [Entry], known: &SentIds) -> Option<Selected<'a>> {
    let mut unseen: Vec<(u64, Selected<'a>)> = fetched
        .iter()
        .filter_map(|entry| {
            let id = extract_id(entry)
                .and_then(|id| sequence_number(&id).map(|seq| (seq, id)));
            match id {
                Ok(pair) => Some((pair, entry)),
                Err(e) => {
                    warn!("skipping entry: {e}");
                    None
                }
            }
        })
        .filter(|((_, id), _)| !known.contains(id))
        .map(|((seq, id), entry)| (seq, Selected { id, entry }))
        .collect();

    unseen.sort_by_key(|(seq, _)| *seq);
    unseen.into_iter().next().map(|(_, selected)| selected)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::make_entry;

    fn known(ids: &[&str]) -> SentIds {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn selects_smallest_unseen_id() {
        let fetched = vec![
            make_entry("post-5.html", "five"),
            make_entry("post-2.html", "two"),
            make_entry("post-9.html", "nine"),
        ];

        let selected = select_newest(&fetched, &known(&["2"])).unwrap();
        assert_eq!(selected.id, "5");
        assert_eq!(selected.entry.title, "five");
    }

    #[test]
    fn ordering_is_numeric_not_lexical() {
        let fetched = vec![
            make_entry("post-100.html", "hundred"),
            make_entry("post-99.html", "ninety-nine"),
        ];

        let selected = select_newest(&fetched, &SentIds::new()).unwrap();
        assert_eq!(selected.id, "99");
    }

    #[test]
    fn all_known_yields_none() {
        let fetched = vec![make_entry("post-1.html", "a"), make_entry("post-2.html", "b")];
        assert!(select_newest(&fetched, &known(&["1", "2"])).is_none());
    }

    #[test]
    fn empty_feed_yields_none() {
        assert!(select_newest(&[], &SentIds::new()).is_none());
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let mut no_guid = make_entry("x-1", "no guid");
        no_guid.guid = None;
        let fetched = vec![
            no_guid,
            make_entry("nodash.xml", "no dash"),
            make_entry("post-abc.html", "not numeric"),
            make_entry("post-40.html", "good"),
        ];

        let selected = select_newest(&fetched, &SentIds::new()).unwrap();
        assert_eq!(selected.entry.title, "good");
    }

    #[test]
    fn only_malformed_yields_none() {
        let fetched = vec![make_entry("post-abc.html", "bad")];
        assert!(select_newest(&fetched, &SentIds::new()).is_none());
    }

    #[test]
    fn equal_ids_keep_feed_order() {
        let fetched = vec![
            make_entry("post-8.html", "later"),
            make_entry("a-3.html", "first listed"),
            make_entry("b-3.xml", "second listed"),
        ];

        let selected = select_newest(&fetched, &SentIds::new()).unwrap();
        assert_eq!(selected.id, "3");
        assert_eq!(selected.entry.title, "first listed");
    }

    #[test]
    fn never_selects_a_known_id() {
        let fetched: Vec<Entry> = (1..=20)
            .map(|n| make_entry(&format!("post-{n}.html"), &n.to_string()))
            .collect();
        let mut sent = SentIds::new();

        while let Some(selected) = select_newest(&fetched, &sent) {
            assert!(!sent.contains(&selected.id));
            sent.push(selected.id);
        }
        assert_eq!(sent.len(), 20);
        assert_eq!(sent.as_slice()[0], "1");
        assert_eq!(sent.as_slice()[19], "20");
    }
}
