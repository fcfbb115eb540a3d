//! Partitioning of a deck into fixed-width groups.
//!
//! Groups are contiguous half-open ranges of card indices. When the deck
//! length is not a multiple of the group size, the final group is shorter
//! but still selectable; no range ever reaches past the end of the deck.

use std::collections::VecDeque;
use std::ops::Range;

use crate::error::{SessionError, SessionResult};

/// Number of groups needed to cover `card_count` cards.
pub fn group_count(card_count: usize, group_size: usize) -> usize {
    if group_size == 0 {
        return 0;
    }
    card_count.div_ceil(group_size)
}

/// Card index range covered by a group.
pub fn group_range(
    card_count: usize,
    group_size: usize,
    group_index: usize,
) -> SessionResult<Range<usize>> {
    if group_size == 0 {
        return Err(SessionError::InvalidGroupSize);
    }

    let count = group_count(card_count, group_size);
    if group_index >= count {
        return Err(SessionError::InvalidGroupIndex {
            index: group_index,
            group_count: count,
        });
    }

    let start = group_index * group_size;
    let end = (start + group_size).min(card_count);
    Ok(start..end)
}

/// Build the initial queue for a sitting: the chosen group with its first
/// `start_offset` cards skipped, in ascending order.
///
/// A short final group may produce an empty queue for large offsets; the
/// engine treats that as a sitting that is already complete.
pub fn build_initial_queue(
    card_count: usize,
    group_size: usize,
    group_index: usize,
    start_offset: usize,
) -> SessionResult<VecDeque<usize>> {
    if group_size == 0 {
        return Err(SessionError::InvalidGroupSize);
    }
    if start_offset >= group_size {
        return Err(SessionError::InvalidOffset {
            offset: start_offset,
            group_size,
        });
    }

    let range = group_range(card_count, group_size, group_index)?;
    let first = (range.start + start_offset).min(range.end);
    Ok((first..range.end).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_deck_has_five_groups() {
        assert_eq!(group_count(150, 30), 5);
        assert_eq!(group_range(150, 30, 4).unwrap(), 120..150);
    }

    #[test]
    fn every_group_and_offset_of_reference_deck() {
        for group in 0..5 {
            for offset in 0..30 {
                let queue = build_initial_queue(150, 30, group, offset).unwrap();
                assert_eq!(queue.len(), 30 - offset);

                let lo = group * 30;
                let hi = lo + 30;
                assert!(queue.iter().all(|&i| i >= lo && i < hi));
                assert!(queue.iter().zip(queue.iter().skip(1)).all(|(a, b)| a < b));
                assert_eq!(queue.front().copied(), Some(lo + offset));
            }
        }
    }

    #[test]
    fn last_offset_yields_single_card() {
        let queue = build_initial_queue(150, 30, 2, 29).unwrap();
        assert_eq!(queue, VecDeque::from(vec![89]));
    }

    #[test]
    fn offset_at_group_size_is_rejected() {
        assert_eq!(
            build_initial_queue(150, 30, 0, 30),
            Err(SessionError::InvalidOffset {
                offset: 30,
                group_size: 30
            })
        );
    }

    #[test]
    fn group_past_end_is_rejected() {
        assert_eq!(
            build_initial_queue(150, 30, 5, 0),
            Err(SessionError::InvalidGroupIndex {
                index: 5,
                group_count: 5
            })
        );
    }

    #[test]
    fn zero_group_size_is_rejected() {
        assert_eq!(group_count(150, 0), 0);
        assert_eq!(
            build_initial_queue(150, 0, 0, 0),
            Err(SessionError::InvalidGroupSize)
        );
    }

    #[test]
    fn short_final_group_stays_inside_deck() {
        assert_eq!(group_count(70, 30), 3);
        assert_eq!(group_range(70, 30, 2).unwrap(), 60..70);

        let queue = build_initial_queue(70, 30, 2, 4).unwrap();
        assert_eq!(queue, (64..70).collect::<VecDeque<_>>());

        // Offset inside the group size but past the short group's end.
        let queue = build_initial_queue(70, 30, 2, 15).unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn empty_deck_has_no_groups() {
        assert_eq!(group_count(0, 30), 0);
        assert!(matches!(
            build_initial_queue(0, 30, 0, 0),
            Err(SessionError::InvalidGroupIndex { .. })
        ));
    }
}
