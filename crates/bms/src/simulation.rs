//! Simulation
//!
//! Drives loaded buildings through simulated minutes and summarises their
//! state as a report that can be printed as text or serialized to JSON.

use std::fmt;

use bms_model::{Building, Floor, Room, RoomState, RoomType, Scheduler, recommend_study_room};
use serde::Serialize;
use tracing::info;

/// Owns the loaded buildings and ticks them once per simulated minute
pub struct Simulation {
    scheduler: Scheduler<Building>,
}

impl Simulation {
    pub fn new(buildings: Vec<Building>) -> Self {
        let mut scheduler = Scheduler::new();
        for building in buildings {
            scheduler.register(building);
        }
        Self { scheduler }
    }

    /// Advance every building by `minutes` simulated minutes
    pub fn run(&mut self, minutes: u64) {
        if minutes == 0 {
            return;
        }
        info!(
            "Simulating {} minutes across {} buildings",
            minutes,
            self.scheduler.items().len()
        );
        self.scheduler.run(minutes);
    }

    pub fn minutes_elapsed(&self) -> u64 {
        self.scheduler.minutes_elapsed()
    }

    pub fn buildings(&self) -> &[Building] {
        self.scheduler.items()
    }

    pub fn building_mut(&mut self, index: usize) -> Option<&mut Building> {
        self.scheduler.get_mut(index)
    }

    /// Snapshot of every building, optionally with a study-room recommendation
    pub fn report(&self, recommend: bool) -> SimulationReport {
        SimulationReport {
            minutes_elapsed: self.minutes_elapsed(),
            buildings: self
                .buildings()
                .iter()
                .map(|building| BuildingReport::new(building, recommend))
                .collect(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reports
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub minutes_elapsed: u64,
    pub buildings: Vec<BuildingReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildingReport {
    pub name: String,
    pub floors: Vec<FloorReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_study_room: Option<u32>,
}

impl BuildingReport {
    fn new(building: &Building, recommend: bool) -> Self {
        Self {
            name: building.name().to_string(),
            floors: building.floors().iter().map(FloorReport::new).collect(),
            recommended_study_room: recommend
                .then(|| recommend_study_room(building).map(Room::number))
                .flatten(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FloorReport {
    pub number: u32,
    pub width: f64,
    pub length: f64,
    pub occupied_area: f64,
    pub maintenance: Option<MaintenanceReport>,
    pub rooms: Vec<RoomReport>,
}

impl FloorReport {
    fn new(floor: &Floor) -> Self {
        let maintenance = floor
            .maintenance_rotation()
            .zip(floor.current_maintenance_room())
            .map(|(rotation, room)| MaintenanceReport {
                room: room.number(),
                elapsed_minutes: rotation.elapsed_minutes(),
                required_minutes: room.maintenance_minutes(),
            });
        Self {
            number: floor.number(),
            width: floor.width(),
            length: floor.length(),
            occupied_area: floor.occupied_area(),
            maintenance,
            rooms: floor.rooms().iter().map(RoomReport::new).collect(),
        }
    }
}

/// Progress of a floor's maintenance rotation
#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceReport {
    pub room: u32,
    pub elapsed_minutes: u32,
    pub required_minutes: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomReport {
    pub number: u32,
    pub room_type: RoomType,
    pub area: f64,
    pub state: RoomState,
    pub hazard_level: Option<u32>,
    pub comfort: f64,
}

impl RoomReport {
    fn new(room: &Room) -> Self {
        Self {
            number: room.number(),
            room_type: room.room_type(),
            area: room.area(),
            state: room.evaluate_state(),
            hazard_level: room.hazard_level(),
            comfort: room.average_comfort(),
        }
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Minutes elapsed: {}", self.minutes_elapsed)?;
        for building in &self.buildings {
            writeln!(f, "{} ({} floors)", building.name, building.floors.len())?;
            for floor in &building.floors {
                write!(
                    f,
                    "  Floor {} ({} x {}, {} occupied)",
                    floor.number, floor.width, floor.length, floor.occupied_area
                )?;
                if let Some(m) = &floor.maintenance {
                    write!(
                        f,
                        ", maintaining room {} ({}/{} min)",
                        m.room, m.elapsed_minutes, m.required_minutes
                    )?;
                }
                writeln!(f)?;
                for room in &floor.rooms {
                    let hazard = room
                        .hazard_level
                        .map_or_else(|| "-".to_string(), |level| level.to_string());
                    writeln!(
                        f,
                        "    Room {} {} {}: {:?}, hazard {}, comfort {:.1}",
                        room.number, room.room_type, room.area, room.state, hazard, room.comfort
                    )?;
                }
            }
            if let Some(number) = building.recommended_study_room {
                writeln!(f, "  Recommended study room: {}", number)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::savefile::SaveFileLoader;

    const SAVE: &str = "\
Hawken
1
1:20:15:3:101,102
101:STUDY:5:1
TemperatureSensor:22,23
102:OFFICE:10:1:RuleBased
NoiseSensor:60,70:2
103:STUDY:10:1
TemperatureSensor:30
";

    fn simulation() -> Simulation {
        Simulation::new(SaveFileLoader::parse(SAVE).unwrap())
    }

    #[test]
    fn test_rotation_advances_with_simulated_time() {
        let mut sim = simulation();
        let report = sim.report(false);
        let floor = &report.buildings[0].floors[0];
        assert_eq!(floor.maintenance.as_ref().unwrap().room, 101);
        assert_eq!(floor.rooms[0].state, RoomState::Maintenance);

        // study room at minimum area takes 5 minutes
        sim.run(5);
        assert_eq!(sim.minutes_elapsed(), 5);
        let report = sim.report(false);
        let floor = &report.buildings[0].floors[0];
        let maintenance = floor.maintenance.as_ref().unwrap();
        assert_eq!(maintenance.room, 102);
        assert_eq!(maintenance.elapsed_minutes, 0);
        assert_eq!(floor.rooms[0].state, RoomState::Open);
    }

    #[test]
    fn test_sensors_cycle_with_simulated_time() {
        let mut sim = simulation();
        assert_eq!(sim.report(false).buildings[0].floors[0].rooms[1].hazard_level, Some(50));
        sim.run(2);
        assert_eq!(sim.report(false).buildings[0].floors[0].rooms[1].hazard_level, Some(100));
    }

    #[test]
    fn test_fire_drill_freezes_rotation() {
        let mut sim = simulation();
        sim.building_mut(0).unwrap().fire_drill(None).unwrap();
        sim.run(10);
        let report = sim.report(false);
        let floor = &report.buildings[0].floors[0];
        assert_eq!(floor.maintenance.as_ref().unwrap().room, 101);
        assert_eq!(floor.maintenance.as_ref().unwrap().elapsed_minutes, 0);
        assert!(floor.rooms.iter().all(|room| room.state == RoomState::Evacuate));
    }

    #[test]
    fn test_recommendation_only_when_requested() {
        let sim = simulation();
        assert_eq!(sim.report(false).buildings[0].recommended_study_room, None);
        // 101 is in maintenance, leaving 103 as the only open study room
        assert_eq!(sim.report(true).buildings[0].recommended_study_room, Some(103));
    }

    #[test]
    fn test_json_report() {
        let sim = simulation();
        let json = serde_json::to_value(sim.report(false)).unwrap();
        assert_eq!(json["minutes_elapsed"], 0);
        assert_eq!(json["buildings"][0]["name"], "Hawken");
        assert_eq!(json["buildings"][0]["floors"][0]["rooms"][1]["state"], "Open");
        assert!(json["buildings"][0].get("recommended_study_room").is_none());
    }

    #[test]
    fn test_text_report() {
        let text = simulation().report(true).to_string();
        assert!(text.starts_with("Minutes elapsed: 0\nHawken (1 floors)\n"));
        assert!(text.contains("  Floor 1 (20 x 15, 25 occupied), maintaining room 101 (0/5 min)\n"));
        assert!(text.contains("    Room 102 OFFICE 10: Open, hazard 50, comfort 50.0\n"));
        assert!(text.contains("    Room 103 STUDY 10: Open, hazard -, comfort 0.0\n"));
        assert!(text.ends_with("  Recommended study room: 103\n"));
    }
}
