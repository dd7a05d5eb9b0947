#![forbid(unsafe_code)]

//! Pure planning for dense, zero-based orderings.
//!
//! Every function takes the current placements of one scope and returns the
//! complete placement list the scope must hold afterwards. Callers persist
//! the result by rewriting the scope; nothing here shifts positions in place.

use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Placement {
    pub item_id: i64,
    pub position: i64,
}

impl Placement {
    pub fn new(item_id: i64, position: i64) -> Self {
        Self { item_id, position }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OrderingError {
    #[error("position {position} is used more than once")]
    DuplicatePosition { position: i64 },
    #[error("positions are not dense (expected {expected}, found {found})")]
    Gap { expected: i64, found: i64 },
    #[error("item {item_id} appears more than once")]
    DuplicateItem { item_id: i64 },
    #[error("item {item_id} is not part of the ordering")]
    UnknownItem { item_id: i64 },
    #[error("position {position} is out of range for {len} items")]
    PositionOutOfRange { position: i64, len: usize },
}

/// Position assigned to an item appended after `current_max`.
pub fn next_position(current_max: Option<i64>) -> i64 {
    current_max.map_or(0, |max| max + 1)
}

/// Returns the placements sorted by position, or the first violation of the
/// `0..n-1` contract.
pub fn ensure_dense(placements: &[Placement]) -> Result<Vec<Placement>, OrderingError> {
    let mut sorted = placements.to_vec();
    sorted.sort_by_key(|placement| (placement.position, placement.item_id));

    let mut seen_items = BTreeSet::new();
    for (rank, placement) in sorted.iter().enumerate() {
        if !seen_items.insert(placement.item_id) {
            return Err(OrderingError::DuplicateItem {
                item_id: placement.item_id,
            });
        }
        let expected = rank as i64;
        if placement.position != expected {
            if rank > 0 && sorted[rank - 1].position == placement.position {
                return Err(OrderingError::DuplicatePosition {
                    position: placement.position,
                });
            }
            return Err(OrderingError::Gap {
                expected,
                found: placement.position,
            });
        }
    }
    Ok(sorted)
}

/// Drops `remove` from the ordering and renumbers the survivors by rank.
///
/// Ids in `remove` that are not part of the ordering are ignored.
pub fn compact(
    placements: &[Placement],
    remove: &BTreeSet<i64>,
) -> Result<Vec<Placement>, OrderingError> {
    let sorted = ensure_dense(placements)?;
    Ok(renumber(
        sorted
            .into_iter()
            .filter(|placement| !remove.contains(&placement.item_id))
            .map(|placement| placement.item_id),
    ))
}

/// Moves `item_id` so that it ends up at `new_position`, shifting the items in
/// between by one.
pub fn move_to(
    placements: &[Placement],
    item_id: i64,
    new_position: i64,
) -> Result<Vec<Placement>, OrderingError> {
    let sorted = ensure_dense(placements)?;
    let len = sorted.len();
    if new_position < 0 || new_position as usize >= len.max(1) {
        return Err(OrderingError::PositionOutOfRange {
            position: new_position,
            len,
        });
    }

    let mut ids = sorted
        .iter()
        .map(|placement| placement.item_id)
        .collect::<Vec<_>>();
    let Some(current) = ids.iter().position(|id| *id == item_id) else {
        return Err(OrderingError::UnknownItem { item_id });
    };
    let moved = ids.remove(current);
    ids.insert(new_position as usize, moved);
    Ok(renumber(ids))
}

fn renumber(item_ids: impl IntoIterator<Item = i64>) -> Vec<Placement> {
    item_ids
        .into_iter()
        .enumerate()
        .map(|(rank, item_id)| Placement::new(item_id, rank as i64))
        .collect()
}
