use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::models::collection::{Collection, OrderedRecord};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            _ => None,
        }
    }
}

/// The pair of ids whose sort orders must be exchanged to move `id` one step,
/// or `None` at a boundary. `sorted` must already be in display order.
pub fn swap_pair(sorted: &[OrderedRecord], id: i64, dir: Direction) -> Option<(i64, i64)> {
    let i = sorted.iter().position(|r| r.id == id)?;
    let j = match dir {
        Direction::Up => i.checked_sub(1)?,
        Direction::Down => i + 1,
    };
    sorted.get(j).map(|other| (id, other.id))
}

/// Moves one row up or down by a single position. Returns `false` when the row
/// is already at that end of the list.
pub fn move_entity(store: &dyn Store, c: Collection, id: i64, dir: Direction) -> StoreResult<bool> {
    let sorted = store.collection_list(c, false)?;
    if !sorted.iter().any(|r| r.id == id) {
        return Err(StoreError::NotFound(format!("{} #{}", c.label(), id)));
    }
    match swap_pair(&sorted, id, dir) {
        Some((a, b)) => {
            store.collection_swap_sort(c, a, b)?;
            log::info!("Moved {} #{} {:?}", c.table(), id, dir);
            Ok(true)
        }
        None => Ok(false),
    }
}
