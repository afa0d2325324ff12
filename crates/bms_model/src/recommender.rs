//! Study-room recommendation.
//!
//! Floors are walked upwards from the ground floor. A higher floor's best open
//! study room replaces the current pick only if it is strictly more
//! comfortable; a floor that offers no improvement is passed over and the walk
//! goes on. The walk stops at the first floor without an open study room, so a
//! ground floor without one means the building is avoided entirely.

use crate::building::Building;
use crate::room::{Room, RoomState, RoomType};

/// Recommend the most suitable open study room in `building`, if any
pub fn recommend_study_room(building: &Building) -> Option<&Room> {
    let mut best: Option<&Room> = None;

    for floor in building.floors() {
        let Some(candidate) = most_comfortable(floor.rooms()) else {
            return best;
        };
        match best {
            Some(current) if candidate.average_comfort() <= current.average_comfort() => {}
            _ => best = Some(candidate),
        }
    }
    best
}

/// Most comfortable open study room; the first one wins ties
fn most_comfortable(rooms: &[Room]) -> Option<&Room> {
    rooms
        .iter()
        .filter(|room| room.room_type() == RoomType::Study)
        .filter(|room| room.evaluate_state() == RoomState::Open)
        .fold(None, |best: Option<&Room>, room| match best {
            Some(best) if best.average_comfort() >= room.average_comfort() => Some(best),
            _ => Some(room),
        })
}
