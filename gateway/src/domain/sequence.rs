//! Diff sequencing rules for local book reconstruction
//!
//! Binance "how to manage a local order book correctly":
//! 1. Drop any event where `u` <= `lastUpdateId` of the snapshot.
//! 2. The first processed event must satisfy `U <= lastUpdateId+1 <= u`.
//! 3. Each later event's `U` must equal the previous event's `u` + 1.
//!
//! Anything else is a gap: updates were missed and the local book can no
//! longer be proven equal to the venue's.

/// Outcome of checking a diff against the book's sequence bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Apply the diff
    Accept,
    /// Fully covered by the snapshot or an earlier diff; discard silently
    Stale,
    /// Updates were missed between the book and this diff
    Gap {
        /// First update id the book needed next
        expected: u64,
    },
}

impl Classification {
    pub fn is_accept(&self) -> bool {
        matches!(self, Classification::Accept)
    }
}

/// Sequence bookkeeping for one book
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceCursor {
    /// Id of the last update reflected in the book (snapshot or diff)
    pub last_applied_update_id: u64,
    /// Final id of the last applied diff; `None` until one is applied
    /// after seeding
    pub previous_event_last_update_id: Option<u64>,
}

impl SequenceCursor {
    /// Cursor positioned at a freshly seeded snapshot
    pub fn seeded(last_update_id: u64) -> Self {
        SequenceCursor {
            last_applied_update_id: last_update_id,
            previous_event_last_update_id: None,
        }
    }

    /// Record an applied diff ending at `last_update_id`
    pub fn advance(&mut self, last_update_id: u64) {
        self.last_applied_update_id = last_update_id;
        self.previous_event_last_update_id = Some(last_update_id);
    }

    /// Classify a diff covering `first_update_id..=last_update_id`.
    ///
    /// Pure: the cursor is not modified.
    pub fn classify(&self, first_update_id: u64, last_update_id: u64) -> Classification {
        if last_update_id <= self.last_applied_update_id {
            return Classification::Stale;
        }

        match self.previous_event_last_update_id {
            None => {
                let expected = self.last_applied_update_id + 1;
                if first_update_id <= expected && expected <= last_update_id {
                    Classification::Accept
                } else {
                    Classification::Gap { expected }
                }
            }
            Some(previous) => {
                let expected = previous + 1;
                if first_update_id == expected {
                    Classification::Accept
                } else {
                    Classification::Gap { expected }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_regardless_of_first_id() {
        let cursor = SequenceCursor::seeded(100);
        assert_eq!(cursor.classify(0, 100), Classification::Stale);
        assert_eq!(cursor.classify(100, 100), Classification::Stale);
        assert_eq!(cursor.classify(500, 99), Classification::Stale);
    }

    #[test]
    fn test_stale_after_applied_diff() {
        let mut cursor = SequenceCursor::seeded(100);
        cursor.advance(105);
        assert_eq!(cursor.classify(104, 104), Classification::Stale);
        assert_eq!(cursor.classify(101, 105), Classification::Stale);
    }

    #[test]
    fn test_first_diff_must_bridge_snapshot() {
        let cursor = SequenceCursor::seeded(100);
        assert_eq!(cursor.classify(98, 105), Classification::Accept);
        assert_eq!(cursor.classify(101, 101), Classification::Accept);
        assert_eq!(cursor.classify(90, 101), Classification::Accept);
        assert_eq!(
            cursor.classify(102, 110),
            Classification::Gap { expected: 101 }
        );
    }

    #[test]
    fn test_later_diff_must_be_contiguous() {
        let mut cursor = SequenceCursor::seeded(100);
        cursor.advance(105);
        assert_eq!(cursor.classify(106, 110), Classification::Accept);
        assert_eq!(cursor.classify(106, 106), Classification::Accept);
        // Overlapping but not contiguous is no longer enough
        assert_eq!(
            cursor.classify(105, 110),
            Classification::Gap { expected: 106 }
        );
        assert_eq!(
            cursor.classify(115, 120),
            Classification::Gap { expected: 106 }
        );
    }

    #[test]
    fn test_advance_updates_both_ids() {
        let mut cursor = SequenceCursor::seeded(100);
        cursor.advance(110);
        assert_eq!(cursor.last_applied_update_id, 110);
        assert_eq!(cursor.previous_event_last_update_id, Some(110));
        assert!(cursor.classify(111, 111).is_accept());
    }

    #[test]
    fn test_seeded_at_zero() {
        let cursor = SequenceCursor::seeded(0);
        assert_eq!(cursor.classify(1, 3), Classification::Accept);
        assert_eq!(cursor.classify(0, 0), Classification::Stale);
    }
}
