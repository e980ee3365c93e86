//! Context provided to record checks.

use crate::core::{book_id, Book};

/// A decoded record together with the key it was read from
#[derive(Clone, Copy, Debug)]
pub struct RecordContext<'a> {
    pub key: &'a str,
    pub book: &'a Book,
}

impl RecordContext<'_> {
    /// Key the record's own identity maps to (pure)
    pub fn expected_key(&self) -> String {
        book_id(&self.book.name, &self.book.owner)
    }
}
