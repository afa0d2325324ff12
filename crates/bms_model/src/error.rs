//! Error types for the building model.

use crate::sensors::SensorKind;

/// Result type alias for model operations
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Violations of the building model's invariants.
///
/// Every constructor and mutator in this crate checks its inputs before
/// touching any state, so an `Err` always leaves the receiver unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("Building name must not be empty")]
    EmptyBuildingName,

    #[error("Floor number must be 1 or higher, got {0}")]
    InvalidFloorNumber(i64),

    #[error("Floor {dimension} {value} is below the minimum of {minimum}")]
    FloorDimensionTooSmall {
        dimension: &'static str,
        value: f64,
        minimum: f64,
    },

    #[error("Room area {area} is below the minimum of {minimum}")]
    RoomAreaTooSmall { area: f64, minimum: f64 },

    #[error("Floor {0} already exists in the building")]
    DuplicateFloor(u32),

    #[error("There is no floor below to support floor {0}")]
    NoFloorBelow(u32),

    #[error("Floor {floor} does not fit on the floor below")]
    FloorTooSmall { floor: u32 },

    #[error("Room number {0} is already taken on this floor")]
    DuplicateRoom(u32),

    #[error(
        "Insufficient space for room {room}: floor area {floor_area}, \
         occupied {occupied}, room {room_area}"
    )]
    InsufficientSpace {
        room: u32,
        floor_area: f64,
        occupied: f64,
        room_area: f64,
    },

    #[error("Room already has a {0}")]
    DuplicateSensor(SensorKind),

    #[error("Sensor readings must not be empty")]
    EmptyReadings,

    #[error("Update frequency {0} is outside the allowed range 1..=5")]
    InvalidUpdateFrequency(u32),

    #[error("Invalid carbon dioxide limits: ideal {ideal}, variation limit {limit}")]
    InvalidCarbonDioxideLimits { ideal: u32, limit: u32 },

    #[error("Weighting {0} is outside the range 0..=100")]
    WeightOutOfRange(i64),

    #[error("Weightings sum to {0}, expected exactly 100")]
    WeightSumNot100(i64),

    #[error("Room does not contain a {0}")]
    SensorNotInRoom(SensorKind),

    #[error("Maintenance order must contain at least one room")]
    EmptyMaintenanceOrder,

    #[error("Room {0} appears consecutively in the maintenance order")]
    AdjacentMaintenanceRepeat(u32),

    #[error("Room {0} is not on this floor")]
    RoomNotOnFloor(u32),

    #[error("Floor {0} does not exist")]
    FloorNotFound(u32),

    #[error("Cannot conduct fire drill: there are no floors in the building")]
    NoFloors,

    #[error("Cannot conduct fire drill: there are no rooms in the building")]
    NoRooms,
}
