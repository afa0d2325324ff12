//! Buildings: an ordered stack of floors.

use serde::Serialize;
use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::floor::Floor;
use crate::room::RoomType;
use crate::timed::TimedItem;

/// A building of floors, which in turn contain rooms
#[derive(Debug, Clone, Serialize)]
pub struct Building {
    name: String,
    floors: Vec<Floor>,
}

impl Building {
    /// Create an empty building. The name must not be empty.
    pub fn new(name: impl Into<String>) -> ModelResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ModelError::EmptyBuildingName);
        }
        Ok(Self {
            name,
            floors: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Floors in ascending floor-number order
    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    pub fn floor(&self, number: u32) -> Option<&Floor> {
        self.floors.iter().find(|floor| floor.number() == number)
    }

    pub fn floor_mut(&mut self, number: u32) -> Option<&mut Floor> {
        self.floors.iter_mut().find(|floor| floor.number() == number)
    }

    /// Add a floor on top of the building.
    ///
    /// Every floor above the ground floor needs the floor directly below it,
    /// and must fit within that floor's footprint in both dimensions.
    pub fn add_floor(&mut self, floor: Floor) -> ModelResult<()> {
        let number = floor.number();
        if number < 1 {
            return Err(ModelError::InvalidFloorNumber(number as i64));
        }
        if self.floor(number).is_some() {
            return Err(ModelError::DuplicateFloor(number));
        }
        if number > 1 {
            let below = self
                .floor(number - 1)
                .ok_or(ModelError::NoFloorBelow(number))?;
            if floor.width() > below.width() || floor.length() > below.length() {
                return Err(ModelError::FloorTooSmall { floor: number });
            }
        }
        debug!(building = %self.name, floor = number, rooms = floor.rooms().len(), "Added floor");
        self.floors.push(floor);
        Ok(())
    }

    /// Resize a floor in place.
    ///
    /// The new footprint must meet the floor minimums, still hold the
    /// floor's rooms, fit on the floor below, and still carry the floor above.
    pub fn renovate_floor(&mut self, number: u32, width: f64, length: f64) -> ModelResult<()> {
        if self.floor(number).is_none() {
            return Err(ModelError::FloorNotFound(number));
        }
        if let Some(below) = number.checked_sub(1).and_then(|n| self.floor(n)) {
            if width > below.width() || length > below.length() {
                return Err(ModelError::FloorTooSmall { floor: number });
            }
        }
        if let Some(above) = self.floor(number + 1) {
            if above.width() > width || above.length() > length {
                return Err(ModelError::FloorTooSmall { floor: number + 1 });
            }
        }
        self.floor_mut(number)
            .ok_or(ModelError::FloorNotFound(number))?
            .change_dimensions(width, length)
    }

    /// Start a fire drill in every room of `room_type` (all rooms when `None`).
    pub fn fire_drill(&mut self, room_type: Option<RoomType>) -> ModelResult<()> {
        if self.floors.is_empty() {
            return Err(ModelError::NoFloors);
        }
        if self.floors.iter().all(|floor| floor.rooms().is_empty()) {
            return Err(ModelError::NoRooms);
        }
        for floor in &mut self.floors {
            floor.fire_drill(room_type);
        }
        Ok(())
    }

    pub fn cancel_fire_drill(&mut self) {
        for floor in &mut self.floors {
            floor.cancel_fire_drill();
        }
    }

    /// Save-file block for this building
    pub fn encode(&self) -> String {
        let mut out = format!("{}\n{}", self.name, self.floors.len());
        for floor in &self.floors {
            out.push('\n');
            out.push_str(&floor.encode());
        }
        out
    }
}

/// Buildings compare by name and floors.
impl PartialEq for Building {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.floors.len() == other.floors.len()
            && self
                .floors
                .iter()
                .all(|floor| other.floor(floor.number()) == Some(floor))
    }
}

impl TimedItem for Building {
    fn elapse_one_minute(&mut self) {
        for floor in &mut self.floors {
            floor.elapse_one_minute();
        }
    }
}
