use crate::article::PostRecord;
use chrono::{DateTime, FixedOffset};
use std::cmp::{Ord, Ordering, PartialOrd};

/// A source file that made it into the store, with the date used to order it.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Document {
    /// A blog post from `_posts`; always dated.
    Post(DateTime<FixedOffset>, PostRecord),
    /// A document of any other collection.
    Entry(Option<DateTime<FixedOffset>>, PostRecord),
}

impl Document {
    pub fn into_record(self) -> PostRecord {
        match self {
            Document::Post(_, record) | Document::Entry(_, record) => record,
        }
    }
}

impl Ord for Document {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            // oldest post first, as Jekyll lists a collection's docs
            (Document::Post(date1, record1), Document::Post(date2, record2)) => date1
                .cmp(date2)
                .then_with(|| record1.url.cmp(&record2.url)),
            (Document::Post(..), Document::Entry(..)) => Ordering::Less,
            (Document::Entry(..), Document::Post(..)) => Ordering::Greater,
            (Document::Entry(date1, record1), Document::Entry(date2, record2)) => {
                let by_date = match (date1, date2) {
                    (Some(d1), Some(d2)) => d1.cmp(d2),
                    (Some(_), None) => Ordering::Less, // dated entries before undated ones
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                by_date.then_with(|| record1.url.cmp(&record2.url))
            }
        }
    }
}

impl PartialOrd for Document {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
