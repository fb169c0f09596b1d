use super::SequenceNumber;

/// Ascending iterator over sequence numbers, ending after [`SequenceNumber::MAX`].
///
/// # Examples
/// ```
/// # use golcheck_data::replication::{SequenceCursor, SequenceNumber};
/// let start = SequenceNumber::try_from(7_u64).expect("in range");
/// let next: Vec<u32> = SequenceCursor::new(start).take(3).map(SequenceNumber::get).collect();
/// assert_eq!(next, [7, 8, 9]);
/// ```
#[derive(Debug, Clone)]
pub struct SequenceCursor {
    next: Option<SequenceNumber>,
}

impl SequenceCursor {
    /// Cursor yielding `start` first.
    #[must_use]
    pub const fn new(start: SequenceNumber) -> Self {
        Self { next: Some(start) }
    }
}

impl Iterator for SequenceCursor {
    type Item = SequenceNumber;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next();
        Some(current)
    }
}

impl std::iter::FusedIterator for SequenceCursor {}
