//! Maintenance rotation.
//!
//! A rotation visits a floor's rooms in a fixed cyclic order, one at a time.
//! The rotation does not own the rooms: it stores indices into the owning
//! floor's room list and is always driven with that list, so it can flip
//! the rooms' maintenance flags in place.
//!
//! ```text
//!   order:  [A, B, C]          A current, elapsed 0
//!   tick x maintenance_minutes(A)  ->  B current, elapsed 0
//!   tick x maintenance_minutes(B)  ->  C current, elapsed 0
//!   tick x maintenance_minutes(C)  ->  A current, elapsed 0
//! ```

use serde::Serialize;
use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::room::{Room, RoomState};

/// Cyclic maintenance schedule over a floor's rooms
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintenanceRotation {
    /// Indices into the floor's room list; may repeat, never adjacently
    order: Vec<usize>,
    /// Position in `order` of the room being maintained
    position: usize,
    /// Minutes spent on the current room
    elapsed: u32,
}

impl MaintenanceRotation {
    /// Start a rotation over `order`, marking its first room as in maintenance.
    ///
    /// `order` must be non-empty, every index must refer to a room in `rooms`,
    /// and when it holds more than one entry no two neighbours (including the
    /// last and the first) may be the same room.
    pub fn start(order: Vec<usize>, rooms: &mut [Room]) -> ModelResult<Self> {
        Self::validate(&order, rooms)?;
        rooms[order[0]].set_maintenance(true);
        Ok(Self {
            order,
            position: 0,
            elapsed: 0,
        })
    }

    pub(crate) fn validate(order: &[usize], rooms: &[Room]) -> ModelResult<()> {
        if order.is_empty() {
            return Err(ModelError::EmptyMaintenanceOrder);
        }
        if let Some(&missing) = order.iter().find(|&&index| index >= rooms.len()) {
            return Err(ModelError::RoomNotOnFloor(missing as u32));
        }
        if order.len() > 1 {
            for (i, &index) in order.iter().enumerate() {
                let next = order[(i + 1) % order.len()];
                if index == next {
                    return Err(ModelError::AdjacentMaintenanceRepeat(rooms[index].number()));
                }
            }
        }
        Ok(())
    }

    /// Room indices in rotation order
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Index (into the floor's rooms) of the room being maintained
    pub fn current_room(&self) -> usize {
        self.order[self.position]
    }

    /// Minutes spent on the current room
    pub fn elapsed_minutes(&self) -> u32 {
        self.elapsed
    }

    /// Progress maintenance by one minute.
    ///
    /// Nothing happens while the current room is being evacuated. Once the
    /// current room's maintenance time has elapsed, maintenance moves on to
    /// the next room in the order.
    pub fn elapse_one_minute(&mut self, rooms: &mut [Room]) {
        let current = &rooms[self.current_room()];
        if current.evaluate_state() == RoomState::Evacuate {
            return;
        }
        self.elapsed += 1;
        if self.elapsed == current.maintenance_minutes() {
            self.advance(rooms);
        }
    }

    /// Abandon the current room and move on, even during an evacuation
    pub fn skip_current(&mut self, rooms: &mut [Room]) {
        self.advance(rooms);
    }

    /// Clear the current room's maintenance flag, e.g. before replacing this rotation
    pub fn stop(&self, rooms: &mut [Room]) {
        rooms[self.current_room()].set_maintenance(false);
    }

    fn advance(&mut self, rooms: &mut [Room]) {
        let finished = self.current_room();
        rooms[finished].set_maintenance(false);
        self.position = (self.position + 1) % self.order.len();
        self.elapsed = 0;
        let next = self.current_room();
        rooms[next].set_maintenance(true);
        debug!(
            finished = rooms[finished].number(),
            next = rooms[next].number(),
            "Maintenance moved to next room"
        );
    }

    /// Comma-separated room numbers, e.g. `101,103,102`
    pub fn encode(&self, rooms: &[Room]) -> String {
        self.order
            .iter()
            .map(|&index| rooms[index].number().to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}
