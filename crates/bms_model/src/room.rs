//! Rooms and their derived state.

use std::fmt;

use serde::Serialize;

use crate::error::{ModelError, ModelResult};
use crate::hazard::HazardEvaluator;
use crate::sensors::{Sensor, SensorKind};
use crate::timed::TimedItem;

/// Smallest allowed room area, in square metres
pub const MIN_ROOM_AREA: f64 = 5.0;

/// Tolerance used when comparing areas and dimensions
pub const AREA_EPSILON: f64 = 0.001;

/// Room usage type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RoomType {
    Study,
    Office,
    Laboratory,
}

impl RoomType {
    pub const ALL: [RoomType; 3] = [RoomType::Study, RoomType::Office, RoomType::Laboratory];

    /// Token used in save files (`STUDY`, `OFFICE`, `LABORATORY`)
    pub fn token(&self) -> &'static str {
        match self {
            RoomType::Study => "STUDY",
            RoomType::Office => "OFFICE",
            RoomType::Laboratory => "LABORATORY",
        }
    }

    /// Parse a save-file token. Tokens are case-sensitive.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|room_type| room_type.token() == token)
    }

    /// Multiplier applied to the base maintenance time
    pub fn maintenance_multiplier(&self) -> f64 {
        match self {
            RoomType::Study => 1.0,
            RoomType::Office => 1.5,
            RoomType::Laboratory => 2.0,
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Derived room status, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RoomState {
    Evacuate,
    Error,
    Maintenance,
    Open,
}

/// A room on a floor
#[derive(Debug, Clone, Serialize)]
pub struct Room {
    number: u32,
    room_type: RoomType,
    area: f64,
    sensors: Vec<Sensor>,
    hazard_evaluator: Option<HazardEvaluator>,
    fire_drill: bool,
    in_maintenance: bool,
}

impl Room {
    pub fn new(number: u32, room_type: RoomType, area: f64) -> ModelResult<Self> {
        if !(area >= MIN_ROOM_AREA) {
            return Err(ModelError::RoomAreaTooSmall {
                area,
                minimum: MIN_ROOM_AREA,
            });
        }
        Ok(Self {
            number,
            room_type,
            area,
            sensors: Vec::new(),
            hazard_evaluator: None,
            fire_drill: false,
            in_maintenance: false,
        })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn room_type(&self) -> RoomType {
        self.room_type
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    /// Sensors in the order they were added
    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn sensor(&self, kind: SensorKind) -> Option<&Sensor> {
        self.sensors.iter().find(|sensor| sensor.kind() == kind)
    }

    /// Add a sensor. A room holds at most one sensor of each kind.
    pub fn add_sensor(&mut self, sensor: Sensor) -> ModelResult<()> {
        if self.sensor(sensor.kind()).is_some() {
            return Err(ModelError::DuplicateSensor(sensor.kind()));
        }
        self.sensors.push(sensor);
        Ok(())
    }

    pub fn hazard_evaluator(&self) -> Option<&HazardEvaluator> {
        self.hazard_evaluator.as_ref()
    }

    /// Attach an evaluator. Every sensor it reads must already be in the room.
    pub fn set_hazard_evaluator(&mut self, evaluator: HazardEvaluator) -> ModelResult<()> {
        evaluator.validate_against(&self.sensors)?;
        self.hazard_evaluator = Some(evaluator);
        Ok(())
    }

    /// Room hazard level, or `None` without an evaluator
    pub fn hazard_level(&self) -> Option<u32> {
        self.hazard_evaluator
            .as_ref()
            .map(|evaluator| evaluator.evaluate(&self.sensors))
    }

    /// Mean comfort level over all sensors; 0 for a room without sensors
    pub fn average_comfort(&self) -> f64 {
        if self.sensors.is_empty() {
            return 0.0;
        }
        let total: u32 = self.sensors.iter().map(Sensor::comfort_level).sum();
        total as f64 / self.sensors.len() as f64
    }

    pub fn fire_drill_ongoing(&self) -> bool {
        self.fire_drill
    }

    pub fn set_fire_drill(&mut self, ongoing: bool) {
        self.fire_drill = ongoing;
    }

    pub fn maintenance_ongoing(&self) -> bool {
        self.in_maintenance
    }

    pub(crate) fn set_maintenance(&mut self, ongoing: bool) {
        self.in_maintenance = ongoing;
    }

    /// Derive the room's current state.
    ///
    /// Evacuation outranks sensor faults, which outrank maintenance.
    pub fn evaluate_state(&self) -> RoomState {
        if self.fire_drill {
            RoomState::Evacuate
        } else if self.sensors.iter().any(Sensor::is_faulted) {
            RoomState::Error
        } else if self.in_maintenance {
            RoomState::Maintenance
        } else {
            RoomState::Open
        }
    }

    /// Minutes needed to maintain this room
    pub fn maintenance_minutes(&self) -> u32 {
        let base = if self.area > MIN_ROOM_AREA {
            5.0 + 0.2 * (self.area - MIN_ROOM_AREA)
        } else {
            5.0
        };
        (base * self.room_type.maintenance_multiplier()).round() as u32
    }

    /// Save-file block for this room: header line plus one line per sensor
    pub fn encode(&self) -> String {
        let mut out = format!(
            "{}:{}:{}:{}",
            self.number,
            self.room_type,
            self.area,
            self.sensors.len()
        );
        if let Some(evaluator) = &self.hazard_evaluator {
            out.push(':');
            out.push_str(evaluator.evaluator_type().tag());
        }
        for sensor in &self.sensors {
            out.push('\n');
            out.push_str(&sensor.encode());
            if let Some(weight) = self
                .hazard_evaluator
                .as_ref()
                .and_then(|evaluator| evaluator.weight_of(sensor.kind()))
            {
                out.push_str(&format!("@{}", weight));
            }
        }
        out
    }
}

/// Rooms compare by number, type, area and sensors (in any order).
impl PartialEq for Room {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number
            && self.room_type == other.room_type
            && (self.area - other.area).abs() <= AREA_EPSILON
            && self.sensors.len() == other.sensors.len()
            && self
                .sensors
                .iter()
                .all(|sensor| other.sensor(sensor.kind()) == Some(sensor))
    }
}

impl TimedItem for Room {
    fn elapse_one_minute(&mut self) {
        for sensor in &mut self.sensors {
            sensor.elapse_one_minute();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hazard::HazardEvaluator;

    #[test]
    fn test_room_area_minimum() {
        assert!(Room::new(101, RoomType::Study, 5.0).is_ok());
        assert!(matches!(
            Room::new(101, RoomType::Study, 4.99),
            Err(ModelError::RoomAreaTooSmall { .. })
        ));
        assert!(Room::new(101, RoomType::Study, f64::NAN).is_err());
    }

    #[test]
    fn test_duplicate_sensor_rejected() {
        let mut room = Room::new(101, RoomType::Office, 20.0).unwrap();
        room.add_sensor(Sensor::noise(vec![50], 1).unwrap()).unwrap();
        let err = room.add_sensor(Sensor::noise(vec![60], 2).unwrap()).unwrap_err();
        assert_eq!(err, ModelError::DuplicateSensor(SensorKind::Noise));
        assert_eq!(room.sensors().len(), 1);
    }

    #[test]
    fn test_state_priority() {
        let mut room = Room::new(101, RoomType::Study, 10.0).unwrap();
        assert_eq!(room.evaluate_state(), RoomState::Open);

        room.set_maintenance(true);
        assert_eq!(room.evaluate_state(), RoomState::Maintenance);

        room.add_sensor(Sensor::temperature(vec![80]).unwrap()).unwrap();
        assert_eq!(room.evaluate_state(), RoomState::Error);

        room.set_fire_drill(true);
        assert_eq!(room.evaluate_state(), RoomState::Evacuate);
    }

    #[test]
    fn test_maintenance_minutes() {
        let study = Room::new(1, RoomType::Study, MIN_ROOM_AREA).unwrap();
        assert_eq!(study.maintenance_minutes(), 5);

        let office = Room::new(2, RoomType::Office, MIN_ROOM_AREA + 10.0).unwrap();
        assert_eq!(office.maintenance_minutes(), 11);

        let office_min = Room::new(3, RoomType::Office, MIN_ROOM_AREA).unwrap();
        assert_eq!(office_min.maintenance_minutes(), 8);

        let lab = Room::new(4, RoomType::Laboratory, 10.0).unwrap();
        assert_eq!(lab.maintenance_minutes(), 12);
    }

    #[test]
    fn test_hazard_evaluator_must_reference_room_sensors() {
        let mut room = Room::new(201, RoomType::Office, 50.0).unwrap();
        assert!(room.hazard_level().is_none());
        assert_eq!(
            room.set_hazard_evaluator(HazardEvaluator::rule_based(vec![SensorKind::Noise])),
            Err(ModelError::SensorNotInRoom(SensorKind::Noise))
        );

        room.add_sensor(Sensor::noise(vec![60], 1).unwrap()).unwrap();
        room.set_hazard_evaluator(HazardEvaluator::rule_based(vec![SensorKind::Noise]))
            .unwrap();
        assert_eq!(room.hazard_level(), Some(50));
    }

    #[test]
    fn test_encode_with_weightings() {
        let mut room = Room::new(201, RoomType::Office, 50.0).unwrap();
        room.add_sensor(Sensor::noise(vec![55, 62], 3).unwrap()).unwrap();
        room.add_sensor(Sensor::occupancy(vec![32, 35], 2, 40).unwrap()).unwrap();
        room.set_hazard_evaluator(
            HazardEvaluator::weighting_based([(SensorKind::Noise, 70), (SensorKind::Occupancy, 30)])
                .unwrap(),
        )
        .unwrap();

        assert_eq!(
            room.encode(),
            "201:OFFICE:50:2:WeightingBased\nNoiseSensor:55,62:3@70\nOccupancySensor:32,35:2:40@30"
        );
    }

    #[test]
    fn test_equality_ignores_sensor_order_and_flags() {
        let mut a = Room::new(7, RoomType::Laboratory, 12.5).unwrap();
        a.add_sensor(Sensor::noise(vec![50], 1).unwrap()).unwrap();
        a.add_sensor(Sensor::temperature(vec![21]).unwrap()).unwrap();

        let mut b = Room::new(7, RoomType::Laboratory, 12.5004).unwrap();
        b.add_sensor(Sensor::temperature(vec![21]).unwrap()).unwrap();
        b.add_sensor(Sensor::noise(vec![50], 1).unwrap()).unwrap();
        b.set_fire_drill(true);

        assert_eq!(a, b);
        assert_ne!(a, Room::new(7, RoomType::Study, 12.5).unwrap());
    }

    #[test]
    fn test_average_comfort() {
        let mut room = Room::new(1, RoomType::Study, 10.0).unwrap();
        assert_eq!(room.average_comfort(), 0.0);
        room.add_sensor(Sensor::temperature(vec![22]).unwrap()).unwrap();
        room.add_sensor(Sensor::noise(vec![60], 1).unwrap()).unwrap();
        assert_eq!(room.average_comfort(), 75.0);
    }
}
