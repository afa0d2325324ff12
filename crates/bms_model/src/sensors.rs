//! Environmental sensors.
//!
//! A sensor is a fixed, cyclic series of integer readings that advances every
//! `update_frequency` minutes, plus kind-specific settings. The set of kinds is
//! closed, so kind-specific behaviour is a `match` on [`SensorDetail`].

use std::fmt;

use serde::Serialize;

use crate::error::{ModelError, ModelResult};
use crate::timed::TimedItem;

/// Smallest allowed update frequency, in minutes
pub const MIN_UPDATE_FREQUENCY: u32 = 1;

/// Largest allowed update frequency, in minutes
pub const MAX_UPDATE_FREQUENCY: u32 = 5;

/// Temperature (°C) at or above which a room is considered on fire
pub const FIRE_TEMPERATURE: u32 = 68;

/// Comfortable temperature band (°C), inclusive
pub const COMFORT_TEMPERATURE: (u32, u32) = (20, 26);

/// Reference level (dB) for relative loudness
pub const REFERENCE_DECIBELS: f64 = 70.0;

/// CO2 concentration (ppm) at or above which the sensor reports a fault
pub const CO2_FAULT_PPM: u32 = 5000;

/// Concrete sensor kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SensorKind {
    Temperature,
    Noise,
    Occupancy,
    CarbonDioxide,
}

impl SensorKind {
    pub const ALL: [SensorKind; 4] = [
        SensorKind::Temperature,
        SensorKind::Noise,
        SensorKind::Occupancy,
        SensorKind::CarbonDioxide,
    ];

    /// Tag used for this kind in save files (e.g. `NoiseSensor`)
    pub fn tag(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "TemperatureSensor",
            SensorKind::Noise => "NoiseSensor",
            SensorKind::Occupancy => "OccupancySensor",
            SensorKind::CarbonDioxide => "CarbonDioxideSensor",
        }
    }

    /// Parse a save-file tag. Tags are case-sensitive.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Cyclic series of readings shared by every sensor kind
#[derive(Debug, Clone, Serialize)]
pub struct ReadingSeries {
    readings: Vec<u32>,
    update_frequency: u32,
    #[serde(skip)]
    index: usize,
    #[serde(skip)]
    minutes_elapsed: u32,
}

impl ReadingSeries {
    pub fn new(readings: Vec<u32>, update_frequency: u32) -> ModelResult<Self> {
        if readings.is_empty() {
            return Err(ModelError::EmptyReadings);
        }
        if !(MIN_UPDATE_FREQUENCY..=MAX_UPDATE_FREQUENCY).contains(&update_frequency) {
            return Err(ModelError::InvalidUpdateFrequency(update_frequency));
        }
        Ok(Self {
            readings,
            update_frequency,
            index: 0,
            minutes_elapsed: 0,
        })
    }

    pub fn readings(&self) -> &[u32] {
        &self.readings
    }

    pub fn update_frequency(&self) -> u32 {
        self.update_frequency
    }

    pub fn current(&self) -> u32 {
        self.readings[self.index]
    }

    fn advance(&mut self) {
        self.minutes_elapsed += 1;
        if self.minutes_elapsed % self.update_frequency == 0 {
            self.index = (self.index + 1) % self.readings.len();
        }
    }

    fn encode(&self) -> String {
        self.readings
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Kind-specific sensor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum SensorDetail {
    Temperature,
    Noise,
    Occupancy {
        /// Maximum allowable number of people in the room
        capacity: u32,
    },
    CarbonDioxide {
        /// Ideal concentration in ppm
        ideal_value: u32,
        /// Acceptable variation above and below the ideal, in ppm
        variation_limit: u32,
    },
}

/// A sensor installed in a room
#[derive(Debug, Clone, Serialize)]
pub struct Sensor {
    series: ReadingSeries,
    detail: SensorDetail,
}

impl Sensor {
    /// Temperature sensors always update every minute.
    pub fn temperature(readings: Vec<u32>) -> ModelResult<Self> {
        Ok(Self {
            series: ReadingSeries::new(readings, MIN_UPDATE_FREQUENCY)?,
            detail: SensorDetail::Temperature,
        })
    }

    pub fn noise(readings: Vec<u32>, update_frequency: u32) -> ModelResult<Self> {
        Ok(Self {
            series: ReadingSeries::new(readings, update_frequency)?,
            detail: SensorDetail::Noise,
        })
    }

    pub fn occupancy(
        readings: Vec<u32>,
        update_frequency: u32,
        capacity: u32,
    ) -> ModelResult<Self> {
        Ok(Self {
            series: ReadingSeries::new(readings, update_frequency)?,
            detail: SensorDetail::Occupancy { capacity },
        })
    }

    /// Both limits must be positive and `ideal_value - variation_limit >= 0`.
    pub fn carbon_dioxide(
        readings: Vec<u32>,
        update_frequency: u32,
        ideal_value: u32,
        variation_limit: u32,
    ) -> ModelResult<Self> {
        let series = ReadingSeries::new(readings, update_frequency)?;
        if ideal_value == 0 || variation_limit == 0 || variation_limit > ideal_value {
            return Err(ModelError::InvalidCarbonDioxideLimits {
                ideal: ideal_value,
                limit: variation_limit,
            });
        }
        Ok(Self {
            series,
            detail: SensorDetail::CarbonDioxide {
                ideal_value,
                variation_limit,
            },
        })
    }

    pub fn kind(&self) -> SensorKind {
        match self.detail {
            SensorDetail::Temperature => SensorKind::Temperature,
            SensorDetail::Noise => SensorKind::Noise,
            SensorDetail::Occupancy { .. } => SensorKind::Occupancy,
            SensorDetail::CarbonDioxide { .. } => SensorKind::CarbonDioxide,
        }
    }

    pub fn detail(&self) -> &SensorDetail {
        &self.detail
    }

    pub fn readings(&self) -> &[u32] {
        self.series.readings()
    }

    pub fn update_frequency(&self) -> u32 {
        self.series.update_frequency()
    }

    pub fn current_reading(&self) -> u32 {
        self.series.current()
    }

    /// Relative loudness of the current reading against [`REFERENCE_DECIBELS`].
    fn relative_loudness(&self) -> f64 {
        2f64.powf((self.current_reading() as f64 - REFERENCE_DECIBELS) / 10.0)
    }

    /// Hazard level of the current reading, in `0..=100`
    pub fn hazard_level(&self) -> u32 {
        let reading = self.current_reading();
        match self.detail {
            SensorDetail::Temperature => {
                if reading >= FIRE_TEMPERATURE {
                    100
                } else {
                    0
                }
            }
            SensorDetail::Noise => clamp_percent((self.relative_loudness() * 100.0).floor()),
            SensorDetail::Occupancy { capacity } => {
                if capacity == 0 {
                    return if reading > 0 { 100 } else { 0 };
                }
                clamp_percent((reading as f64 / capacity as f64 * 100.0).floor())
            }
            SensorDetail::CarbonDioxide { .. } => match reading {
                0..1000 => 0,
                1000..2000 => 25,
                2000..5000 => 50,
                _ => 100,
            },
        }
    }

    /// Comfort level of the current reading, in `0..=100`
    pub fn comfort_level(&self) -> u32 {
        let reading = self.current_reading();
        match self.detail {
            SensorDetail::Temperature => {
                let (low, high) = COMFORT_TEMPERATURE;
                if (low..=high).contains(&reading) { 100 } else { 0 }
            }
            SensorDetail::Noise => {
                clamp_percent(((1.0 - self.relative_loudness()) * 100.0).floor())
            }
            SensorDetail::Occupancy { capacity } => {
                if reading >= capacity {
                    return 0;
                }
                clamp_percent(((1.0 - reading as f64 / capacity as f64) * 100.0).round())
            }
            SensorDetail::CarbonDioxide {
                ideal_value,
                variation_limit,
            } => {
                let difference = (ideal_value as f64 - reading as f64).abs();
                let limit = variation_limit as f64;
                if difference >= limit {
                    return 0;
                }
                clamp_percent((100.0 - difference / limit * 100.0).round())
            }
        }
    }

    /// Whether the current reading is a fault condition for this kind.
    ///
    /// Rooms holding a faulted sensor report `RoomState::Error`.
    pub fn is_faulted(&self) -> bool {
        let reading = self.current_reading();
        match self.detail {
            SensorDetail::Temperature => reading >= FIRE_TEMPERATURE,
            SensorDetail::Noise => false,
            SensorDetail::Occupancy { capacity } => reading > capacity,
            SensorDetail::CarbonDioxide { .. } => reading >= CO2_FAULT_PPM,
        }
    }

    /// Save-file line for this sensor, without a weighting suffix
    pub fn encode(&self) -> String {
        let readings = self.series.encode();
        let frequency = self.update_frequency();
        match self.detail {
            SensorDetail::Temperature => format!("{}:{}", self.kind(), readings),
            SensorDetail::Noise => format!("{}:{}:{}", self.kind(), readings, frequency),
            SensorDetail::Occupancy { capacity } => {
                format!("{}:{}:{}:{}", self.kind(), readings, frequency, capacity)
            }
            SensorDetail::CarbonDioxide {
                ideal_value,
                variation_limit,
            } => format!(
                "{}:{}:{}:{}:{}",
                self.kind(),
                readings,
                frequency,
                ideal_value,
                variation_limit
            ),
        }
    }
}

/// Sensors compare by configuration, not by position in their reading cycle.
impl PartialEq for Sensor {
    fn eq(&self, other: &Self) -> bool {
        self.detail == other.detail
            && self.series.readings == other.series.readings
            && self.series.update_frequency == other.series.update_frequency
    }
}

impl TimedItem for Sensor {
    fn elapse_one_minute(&mut self) {
        self.series.advance();
    }
}

fn clamp_percent(value: f64) -> u32 {
    value.clamp(0.0, 100.0) as u32
}
