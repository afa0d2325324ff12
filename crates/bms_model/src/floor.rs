//! Floors: a footprint holding rooms and an optional maintenance rotation.

use serde::Serialize;
use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::maintenance::MaintenanceRotation;
use crate::room::{AREA_EPSILON, MIN_ROOM_AREA, Room, RoomType};
use crate::timed::TimedItem;

/// Smallest allowed floor width, in metres
pub const MIN_FLOOR_WIDTH: f64 = 5.0;

/// Smallest allowed floor length, in metres
pub const MIN_FLOOR_LENGTH: f64 = 5.0;

/// A floor of a building. Floor 1 is the ground floor.
#[derive(Debug, Clone, Serialize)]
pub struct Floor {
    number: u32,
    width: f64,
    length: f64,
    rooms: Vec<Room>,
    rotation: Option<MaintenanceRotation>,
}

impl Floor {
    pub fn new(number: u32, width: f64, length: f64) -> ModelResult<Self> {
        if number < 1 {
            return Err(ModelError::InvalidFloorNumber(number as i64));
        }
        check_dimensions(width, length)?;
        Ok(Self {
            number,
            width,
            length,
            rooms: Vec::new(),
            rotation: None,
        })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Footprint area, width x length
    pub fn area(&self) -> f64 {
        self.width * self.length
    }

    /// Sum of all room areas
    pub fn occupied_area(&self) -> f64 {
        self.rooms.iter().map(Room::area).sum()
    }

    /// Rooms in the order they were added
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, number: u32) -> Option<&Room> {
        self.rooms.iter().find(|room| room.number() == number)
    }

    pub fn room_mut(&mut self, number: u32) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|room| room.number() == number)
    }

    fn room_index(&self, number: u32) -> Option<usize> {
        self.rooms.iter().position(|room| room.number() == number)
    }

    /// Add a room, provided its number is free and it fits in the unoccupied area.
    pub fn add_room(&mut self, room: Room) -> ModelResult<()> {
        if room.area() < MIN_ROOM_AREA {
            return Err(ModelError::RoomAreaTooSmall {
                area: room.area(),
                minimum: MIN_ROOM_AREA,
            });
        }
        if self.room(room.number()).is_some() {
            return Err(ModelError::DuplicateRoom(room.number()));
        }
        let occupied = self.occupied_area();
        if occupied + room.area() > self.area() {
            return Err(ModelError::InsufficientSpace {
                room: room.number(),
                floor_area: self.area(),
                occupied,
                room_area: room.area(),
            });
        }
        self.rooms.push(room);
        Ok(())
    }

    /// Change the footprint. The rooms already on the floor must still fit.
    pub fn change_dimensions(&mut self, width: f64, length: f64) -> ModelResult<()> {
        check_dimensions(width, length)?;
        if width * length < self.occupied_area() {
            return Err(ModelError::FloorTooSmall { floor: self.number });
        }
        self.width = width;
        self.length = length;
        Ok(())
    }

    pub fn maintenance_rotation(&self) -> Option<&MaintenanceRotation> {
        self.rotation.as_ref()
    }

    /// Room currently being maintained, if a rotation is installed
    pub fn current_maintenance_room(&self) -> Option<&Room> {
        self.rotation
            .as_ref()
            .map(|rotation| &self.rooms[rotation.current_room()])
    }

    /// Install a maintenance rotation over the given room numbers.
    ///
    /// Replaces any existing rotation; the room the old rotation was
    /// maintaining leaves maintenance. On error the floor is unchanged.
    pub fn create_maintenance_rotation(&mut self, room_numbers: &[u32]) -> ModelResult<()> {
        let order = room_numbers
            .iter()
            .map(|&number| {
                self.room_index(number)
                    .ok_or(ModelError::RoomNotOnFloor(number))
            })
            .collect::<ModelResult<Vec<_>>>()?;

        MaintenanceRotation::validate(&order, &self.rooms)?;

        if let Some(old) = self.rotation.take() {
            old.stop(&mut self.rooms);
        }
        self.rotation = Some(MaintenanceRotation::start(order, &mut self.rooms)?);
        debug!(floor = self.number, order = ?room_numbers, "Installed maintenance rotation");
        Ok(())
    }

    /// Abandon maintenance of the current room and move to the next one
    pub fn skip_current_maintenance(&mut self) {
        if let Some(rotation) = self.rotation.as_mut() {
            rotation.skip_current(&mut self.rooms);
        }
    }

    /// Start a fire drill in every room of `room_type`, or every room when `None`
    pub fn fire_drill(&mut self, room_type: Option<RoomType>) {
        for room in &mut self.rooms {
            if room_type.is_none_or(|kind| kind == room.room_type()) {
                room.set_fire_drill(true);
            }
        }
    }

    pub fn cancel_fire_drill(&mut self) {
        for room in &mut self.rooms {
            room.set_fire_drill(false);
        }
    }

    /// Save-file block for this floor: header line plus every room block
    pub fn encode(&self) -> String {
        let mut out = format!(
            "{}:{}:{}:{}",
            self.number,
            self.width,
            self.length,
            self.rooms.len()
        );
        if let Some(rotation) = &self.rotation {
            out.push(':');
            out.push_str(&rotation.encode(&self.rooms));
        }
        for room in &self.rooms {
            out.push('\n');
            out.push_str(&room.encode());
        }
        out
    }
}

fn check_dimensions(width: f64, length: f64) -> ModelResult<()> {
    if !(width >= MIN_FLOOR_WIDTH) {
        return Err(ModelError::FloorDimensionTooSmall {
            dimension: "width",
            value: width,
            minimum: MIN_FLOOR_WIDTH,
        });
    }
    if !(length >= MIN_FLOOR_LENGTH) {
        return Err(ModelError::FloorDimensionTooSmall {
            dimension: "length",
            value: length,
            minimum: MIN_FLOOR_LENGTH,
        });
    }
    Ok(())
}

/// Floors compare by number, dimensions and rooms (in any order).
impl PartialEq for Floor {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number
            && (self.width - other.width).abs() <= AREA_EPSILON
            && (self.length - other.length).abs() <= AREA_EPSILON
            && self.rooms.len() == other.rooms.len()
            && self
                .rooms
                .iter()
                .all(|room| other.room(room.number()) == Some(room))
    }
}

impl TimedItem for Floor {
    /// Sensors advance first so the rotation sees this minute's readings.
    fn elapse_one_minute(&mut self) {
        for room in &mut self.rooms {
            room.elapse_one_minute();
        }
        if let Some(rotation) = self.rotation.as_mut() {
            rotation.elapse_one_minute(&mut self.rooms);
        }
    }
}
