//! Save File Loader
//!
//! Reads the text save format into buildings. A load yields every building
//! in the file, or fails on the first invalid record in file order and
//! yields none.

use std::path::Path;

use bms_model::{
    Building, Floor, HazardEvaluator, HazardEvaluatorType, ModelError, Room, RoomType, Sensor,
    SensorKind,
};
use tokio::fs;
use tracing::{debug, info, warn};

use super::error::{FormatError, FormatErrorKind, LoadError};
use super::reader::{FIELD_DELIMITER, LIST_DELIMITER, Line, LineReader, WEIGHT_DELIMITER};

/// Save file loader
pub struct SaveFileLoader;

impl SaveFileLoader {
    /// Load every building from the save file at `path`
    pub async fn load(path: impl AsRef<Path>) -> Result<Vec<Building>, LoadError> {
        let path = path.as_ref();
        info!("Loading buildings from: {}", path.display());

        let content = fs::read_to_string(path).await?;
        let buildings = Self::parse(&content)?;
        Ok(buildings)
    }

    /// Parse save-file text into buildings
    pub fn parse(content: &str) -> Result<Vec<Building>, FormatError> {
        let mut reader = LineReader::new(content);
        let mut buildings = Vec::new();

        while let Some(name) = reader.next_line() {
            match read_building(name, &mut reader) {
                Ok(building) => buildings.push(building),
                Err(err) => {
                    warn!(
                        line = err.line,
                        category = %err.category(),
                        "Rejected save data: {}",
                        err.kind
                    );
                    return Err(err);
                }
            }
        }

        let floors: usize = buildings.iter().map(|b| b.floors().len()).sum();
        let rooms: usize = buildings
            .iter()
            .flat_map(Building::floors)
            .map(|floor| floor.rooms().len())
            .sum();
        info!(
            "Loaded {} buildings ({} floors, {} rooms) from {} lines",
            buildings.len(),
            floors,
            rooms,
            reader.lines_read()
        );
        Ok(buildings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

fn read_building(name: Line<'_>, reader: &mut LineReader<'_>) -> Result<Building, FormatError> {
    if name.text.is_empty() {
        return Err(name.error(FormatErrorKind::EmptyLine("building name")));
    }
    if name.text.contains(FIELD_DELIMITER) {
        return Err(name.error(FormatErrorKind::NameContainsDelimiter));
    }

    let count_line = reader.expect_line("floor count")?;
    let floor_count = parse_int(&count_line, "floor count", count_line.text)?;
    let floor_count = non_negative(&count_line, "floor count", floor_count)?;

    let mut building = Building::new(name.text).map_err(|e| name.error(e))?;
    for _ in 0..floor_count {
        let (floor, header) = read_floor(reader)?;
        building.add_floor(floor).map_err(|e| header.error(e))?;
    }

    debug!(line = name.number, building = %building.name(), floors = floor_count, "Read building");
    Ok(building)
}

fn read_floor<'a>(reader: &mut LineReader<'a>) -> Result<(Floor, Line<'a>), FormatError> {
    let header = reader.expect_line("floor record")?;
    let fields = header.fields();
    if !(4..=5).contains(&fields.len()) {
        return Err(header.error(FormatErrorKind::FieldCount {
            record: "floor record",
            found: fields.len(),
        }));
    }

    let number = parse_int(&header, "floor number", fields[0])?;
    let width = parse_real(&header, "floor width", fields[1])?;
    let length = parse_real(&header, "floor length", fields[2])?;
    let room_count = parse_int(&header, "room count", fields[3])?;

    let number = positive(&header, "floor number", number)?;
    let width = non_negative_real(&header, "floor width", width)?;
    let length = non_negative_real(&header, "floor length", length)?;
    let room_count = non_negative(&header, "room count", room_count)?;

    let mut floor = Floor::new(number, width, length).map_err(|e| header.error(e))?;
    for _ in 0..room_count {
        let (room, room_header) = read_room(reader)?;
        floor.add_room(room).map_err(|e| room_header.error(e))?;
    }

    if let Some(order) = fields.get(4) {
        let room_numbers = parse_maintenance_order(&header, order)?;
        floor
            .create_maintenance_rotation(&room_numbers)
            .map_err(|e| header.error(e))?;
    }

    debug!(line = header.number, floor = number, rooms = room_count, "Read floor");
    Ok((floor, header))
}

fn parse_maintenance_order(header: &Line<'_>, field: &str) -> Result<Vec<u32>, FormatError> {
    if field.is_empty() {
        return Err(header.error(ModelError::EmptyMaintenanceOrder));
    }
    field
        .split(LIST_DELIMITER)
        .map(|token| {
            let number = parse_int(header, "maintenance room number", token)?;
            u32::try_from(number).map_err(|_| {
                header.error(FormatErrorKind::UnknownMaintenanceRoom(token.to_string()))
            })
        })
        .collect()
}

fn read_room<'a>(reader: &mut LineReader<'a>) -> Result<(Room, Line<'a>), FormatError> {
    let header = reader.expect_line("room record")?;
    let fields = header.fields();
    if !(4..=5).contains(&fields.len()) {
        return Err(header.error(FormatErrorKind::FieldCount {
            record: "room record",
            found: fields.len(),
        }));
    }

    let evaluator_type = fields
        .get(4)
        .map(|tag| {
            HazardEvaluatorType::from_tag(tag).ok_or_else(|| {
                header.error(FormatErrorKind::UnknownHazardEvaluator(tag.to_string()))
            })
        })
        .transpose()?;

    let number = parse_int(&header, "room number", fields[0])?;
    let room_type = RoomType::from_token(fields[1])
        .ok_or_else(|| header.error(FormatErrorKind::UnknownRoomType(fields[1].to_string())))?;
    let area = parse_real(&header, "room area", fields[2])?;
    let sensor_count = parse_int(&header, "sensor count", fields[3])?;

    let number = non_negative(&header, "room number", number)?;
    let area = non_negative_real(&header, "room area", area)?;
    let sensor_count = non_negative(&header, "sensor count", sensor_count)?;

    let mut room = Room::new(number, room_type, area).map_err(|e| header.error(e))?;

    let weighted = evaluator_type == Some(HazardEvaluatorType::WeightingBased);
    let mut kinds = Vec::new();
    let mut weights = Vec::new();
    for _ in 0..sensor_count {
        let line = reader.expect_line("sensor record")?;
        let (sensor, weight) = read_sensor(&line, weighted)?;
        let kind = sensor.kind();
        room.add_sensor(sensor).map_err(|e| line.error(e))?;
        kinds.push(kind);
        if let Some(weight) = weight {
            weights.push((kind, weight));
        }
    }

    if let Some(evaluator_type) = evaluator_type {
        let evaluator = match evaluator_type {
            HazardEvaluatorType::RuleBased => HazardEvaluator::rule_based(kinds),
            HazardEvaluatorType::WeightingBased => {
                HazardEvaluator::weighting_based(weights).map_err(|e| header.error(e))?
            }
        };
        room.set_hazard_evaluator(evaluator)
            .map_err(|e| header.error(e))?;
    }

    debug!(line = header.number, room = number, sensors = sensor_count, "Read room");
    Ok((room, header))
}

/// Parse one sensor line, returning the sensor and its weighting if the
/// owning room is weighting-based
fn read_sensor(line: &Line<'_>, weighted: bool) -> Result<(Sensor, Option<i64>), FormatError> {
    let (body, weight) = match line.text.split_once(WEIGHT_DELIMITER) {
        Some((body, weight)) if weighted => (body, Some(weight)),
        Some(_) => return Err(line.error(FormatErrorKind::UnexpectedWeight)),
        None if weighted => return Err(line.error(FormatErrorKind::MissingWeight)),
        None => (line.text, None),
    };
    let weight = weight
        .map(|weight| parse_int(line, "weighting", weight))
        .transpose()?;

    let fields: Vec<&str> = body.split(FIELD_DELIMITER).collect();
    let kind = SensorKind::from_tag(fields[0])
        .ok_or_else(|| line.error(FormatErrorKind::UnknownSensorKind(fields[0].to_string())))?;

    let expected = match kind {
        SensorKind::Temperature => 2,
        SensorKind::Noise => 3,
        SensorKind::Occupancy => 4,
        SensorKind::CarbonDioxide => 5,
    };
    if fields.len() != expected {
        return Err(line.error(FormatErrorKind::FieldCount {
            record: "sensor record",
            found: fields.len(),
        }));
    }

    let readings = fields[1]
        .split(LIST_DELIMITER)
        .map(|token| parse_count(line, "sensor reading", token))
        .collect::<Result<Vec<_>, _>>()?;

    let sensor = match kind {
        SensorKind::Temperature => Sensor::temperature(readings),
        SensorKind::Noise => {
            let frequency = parse_count(line, "update frequency", fields[2])?;
            Sensor::noise(readings, frequency)
        }
        SensorKind::Occupancy => {
            let frequency = parse_count(line, "update frequency", fields[2])?;
            let capacity = parse_count(line, "capacity", fields[3])?;
            Sensor::occupancy(readings, frequency, capacity)
        }
        SensorKind::CarbonDioxide => {
            let frequency = parse_count(line, "update frequency", fields[2])?;
            let ideal = parse_count(line, "ideal value", fields[3])?;
            let limit = parse_count(line, "variation limit", fields[4])?;
            Sensor::carbon_dioxide(readings, frequency, ideal, limit)
        }
    }
    .map_err(|e| line.error(e))?;

    Ok((sensor, weight))
}

// ─────────────────────────────────────────────────────────────────────────────
// Fields
// ─────────────────────────────────────────────────────────────────────────────

fn parse_int(line: &Line<'_>, field: &'static str, value: &str) -> Result<i64, FormatError> {
    value.parse::<i64>().map_err(|_| {
        line.error(FormatErrorKind::InvalidNumber {
            field,
            value: value.to_string(),
        })
    })
}

fn parse_real(line: &Line<'_>, field: &'static str, value: &str) -> Result<f64, FormatError> {
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(line.error(FormatErrorKind::InvalidNumber {
            field,
            value: value.to_string(),
        })),
    }
}

/// Parse a non-negative integer field
fn parse_count(line: &Line<'_>, field: &'static str, value: &str) -> Result<u32, FormatError> {
    let parsed = parse_int(line, field, value)?;
    non_negative(line, field, parsed)
}

fn non_negative(line: &Line<'_>, field: &'static str, value: i64) -> Result<u32, FormatError> {
    if value < 0 {
        return Err(line.error(FormatErrorKind::Negative {
            field,
            value: value.to_string(),
        }));
    }
    u32::try_from(value).map_err(|_| line.error(FormatErrorKind::TooLarge { field, value }))
}

fn positive(line: &Line<'_>, field: &'static str, value: i64) -> Result<u32, FormatError> {
    if value <= 0 {
        return Err(line.error(FormatErrorKind::NotPositive {
            field,
            value: value.to_string(),
        }));
    }
    non_negative(line, field, value)
}

fn non_negative_real(line: &Line<'_>, field: &'static str, value: f64) -> Result<f64, FormatError> {
    if value < 0.0 {
        return Err(line.error(FormatErrorKind::Negative {
            field,
            value: value.to_string(),
        }));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::savefile::ErrorCategory;
    use bms_model::RoomState;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
General Purpose South
5
1:10:10:3:101,102,103
101:STUDY:23.8:1
TemperatureSensor:5,5,2,4
102:STUDY:20:0
103:OFFICE:15:2:RuleBased
NoiseSensor:55,62,69,63:3
OccupancySensor:32,35,11,29,33,34,36,37:2:40
2:10:10:2:201,202
201:OFFICE:5:3:WeightingBased
NoiseSensor:35,41,48,55,62:1@25
OccupancySensor:13,24,28,15,6:4:30@30
CarbonDioxideSensor:690,740,867,1250,1990,2041,1400,1050,830,734:5:700:150@45
202:LABORATORY:40.5:1
TemperatureSensor:28,29,25,22,21,19
3:5:8:0
4:5:5:0
5:5:5:1
501:STUDY:25:0
Forgan Smith Building
1
1:50:25.5:0
";

    fn category(content: &str) -> ErrorCategory {
        SaveFileLoader::parse(content).unwrap_err().category()
    }

    #[test]
    fn test_parse_sample() {
        let buildings = SaveFileLoader::parse(SAMPLE).unwrap();
        assert_eq!(buildings.len(), 2);

        let gps = &buildings[0];
        assert_eq!(gps.name(), "General Purpose South");
        assert_eq!(gps.floors().len(), 5);

        let ground = gps.floor(1).unwrap();
        assert_eq!(ground.rooms().len(), 3);
        assert_eq!(ground.current_maintenance_room().unwrap().number(), 101);
        assert_eq!(ground.room(101).unwrap().evaluate_state(), RoomState::Maintenance);

        let room = ground.room(103).unwrap();
        assert_eq!(
            room.hazard_evaluator().unwrap().evaluator_type(),
            HazardEvaluatorType::RuleBased
        );
        assert_eq!(room.sensor(SensorKind::Occupancy).unwrap().readings().len(), 8);

        let room = gps.floor(2).unwrap().room(201).unwrap();
        let evaluator = room.hazard_evaluator().unwrap();
        assert_eq!(evaluator.weight_of(SensorKind::CarbonDioxide), Some(45));
        assert_eq!(room.sensors().len(), 3);

        assert_eq!(buildings[1].floor(1).unwrap().length(), 25.5);
    }

    #[test]
    fn test_bundled_save_file() {
        let buildings = SaveFileLoader::parse(include_str!("../../saves/uqstlucia.txt")).unwrap();
        let names: Vec<&str> = buildings.iter().map(Building::name).collect();
        assert_eq!(
            names,
            vec!["General Purpose South", "Forgan Smith Building", "Andrew N. Liveris"]
        );
    }

    #[test]
    fn test_empty_input_has_no_buildings() {
        assert!(SaveFileLoader::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_building_without_floors() {
        let buildings = SaveFileLoader::parse("Hawken\n0\n").unwrap();
        assert_eq!(buildings[0].name(), "Hawken");
        assert!(buildings[0].floors().is_empty());
    }

    #[test]
    fn test_malformed_second_building_rejects_everything() {
        let content = format!("{}Hawken\n1\nabc:5:5:0\n", SAMPLE);
        let err = SaveFileLoader::parse(&content).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Structural);
        assert_eq!(err.text, "abc:5:5:0");
        assert_eq!(err.line, SAMPLE.lines().count() + 3);
    }

    #[test]
    fn test_structural_errors() {
        // wrong field counts
        assert_eq!(category("Hawken\n1\n1:10:10\n"), ErrorCategory::Structural);
        assert_eq!(category("Hawken\n1\n1:10:10:0:101:7\n"), ErrorCategory::Structural);
        assert_eq!(
            category("Hawken\n1\n1:10:10:1\n101:STUDY:10:1\nNoiseSensor:50\n"),
            ErrorCategory::Structural
        );
        // unparsable numbers
        assert_eq!(category("Hawken\nfive\n"), ErrorCategory::Structural);
        assert_eq!(category("Hawken\n1\n1:ten:10:0\n"), ErrorCategory::Structural);
        assert_eq!(category("Hawken\n1\n1:NaN:10:0\n"), ErrorCategory::Structural);
        // fewer floors than declared
        let err = SaveFileLoader::parse("Hawken\n2\n1:10:10:0\n").unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::UnexpectedEof("floor record"));
        assert_eq!(err.line, 4);
        // more floors than declared
        assert_eq!(category("Hawken\n1\n1:10:10:0\n2:10:10:0\n"), ErrorCategory::Structural);
        // empty building name
        assert_eq!(category("\n0\n"), ErrorCategory::Structural);
    }

    #[test]
    fn test_weighting_suffix_must_match_evaluator() {
        let missing = "Hawken\n1\n1:10:10:1\n101:STUDY:10:1:WeightingBased\nNoiseSensor:50:1\n";
        assert_eq!(
            SaveFileLoader::parse(missing).unwrap_err().kind,
            FormatErrorKind::MissingWeight
        );
        let unexpected = "Hawken\n1\n1:10:10:1\n101:STUDY:10:1:RuleBased\nNoiseSensor:50:1@100\n";
        assert_eq!(
            SaveFileLoader::parse(unexpected).unwrap_err().kind,
            FormatErrorKind::UnexpectedWeight
        );
    }

    #[test]
    fn test_range_errors() {
        assert_eq!(category("Hawken\n-1\n"), ErrorCategory::Range);
        assert_eq!(category("Hawken\n1\n0:10:10:0\n"), ErrorCategory::Range);
        assert_eq!(category("Hawken\n1\n1:4.5:10:0\n"), ErrorCategory::Range);
        assert_eq!(category("Hawken\n1\n1:10:10:1\n101:STUDY:-3:0\n"), ErrorCategory::Range);
        assert_eq!(category("Hawken\n1\n1:10:10:1\n101:STUDY:4:0\n"), ErrorCategory::Range);
        assert_eq!(
            category("Hawken\n1\n1:10:10:1\n101:STUDY:10:1\nNoiseSensor:50:9\n"),
            ErrorCategory::Range
        );
        assert_eq!(
            category("Hawken\n1\n1:10:10:1\n101:STUDY:10:1\nTemperatureSensor:20,-4\n"),
            ErrorCategory::Range
        );
    }

    #[test]
    fn test_referential_errors() {
        assert_eq!(
            category("Hawken\n2\n1:10:10:0\n1:10:10:0\n"),
            ErrorCategory::Referential
        );
        assert_eq!(
            category("Hawken\n1\n1:10:10:2\n101:STUDY:10:0\n101:OFFICE:10:0\n"),
            ErrorCategory::Referential
        );
        assert_eq!(
            category(
                "Hawken\n1\n1:10:10:1\n101:STUDY:10:2\nNoiseSensor:50:1\nNoiseSensor:60:2\n"
            ),
            ErrorCategory::Referential
        );
        let err = SaveFileLoader::parse("Hawken\n1\n1:10:10:1:101,999\n101:STUDY:10:0\n")
            .unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::Model(ModelError::RoomNotOnFloor(999)));
        assert_eq!(err.category(), ErrorCategory::Referential);
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_structural_support_errors() {
        assert_eq!(category("Hawken\n1\n2:10:10:0\n"), ErrorCategory::StructuralSupport);
        assert_eq!(
            category("Hawken\n2\n1:10:10:0\n2:10:12:0\n"),
            ErrorCategory::StructuralSupport
        );
        let err = SaveFileLoader::parse("Hawken\n1\n1:5:5:2\n101:STUDY:20:0\n102:STUDY:6:0\n")
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::StructuralSupport);
        assert_eq!(err.text, "102:STUDY:6:0");
    }

    #[test]
    fn test_semantic_errors() {
        assert_eq!(category("Hawken\n1\n1:10:10:1\n101:Study:10:0\n"), ErrorCategory::Semantic);
        assert_eq!(
            category("Hawken\n1\n1:10:10:1\n101:STUDY:10:0:Rulebased\n"),
            ErrorCategory::Semantic
        );
        assert_eq!(
            category("Hawken\n1\n1:10:10:1\n101:STUDY:10:1\nHumiditySensor:50:1\n"),
            ErrorCategory::Semantic
        );
        assert_eq!(
            category(
                "Hawken\n1\n1:10:10:1\n101:STUDY:10:2:WeightingBased\nNoiseSensor:50:1@60\nTemperatureSensor:20@30\n"
            ),
            ErrorCategory::Semantic
        );
        assert_eq!(
            category("Hawken\n1\n1:10:10:1\n101:STUDY:10:1\nCarbonDioxideSensor:700:1:100:150\n"),
            ErrorCategory::Semantic
        );
        assert_eq!(
            category("Hawken\n1\n1:10:10:2:101,102,101\n101:STUDY:10:0\n102:STUDY:10:0\n"),
            ErrorCategory::Semantic
        );
        assert_eq!(
            category("Hawken\n1\n1:10:10:1:\n101:STUDY:10:0\n"),
            ErrorCategory::Semantic
        );
    }

    #[test]
    fn test_round_trip() {
        let buildings = SaveFileLoader::parse(SAMPLE).unwrap();
        let encoded: String = buildings
            .iter()
            .map(|building| format!("{}\n", building.encode()))
            .collect();
        let reloaded = SaveFileLoader::parse(&encoded).unwrap();
        assert_eq!(buildings, reloaded);
    }

    #[tokio::test]
    async fn test_load_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("uqstlucia.txt");
        tokio::fs::write(&path, SAMPLE).await.unwrap();

        let buildings = SaveFileLoader::load(&path).await.unwrap();
        assert_eq!(buildings.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = SaveFileLoader::load(dir.path().join("missing.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[tokio::test]
    async fn test_invalid_file_is_format_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.txt");
        tokio::fs::write(&path, "Hawken\n1\n1:10:10\n").await.unwrap();

        let err = SaveFileLoader::load(&path).await.unwrap_err();
        assert_eq!(err.format().unwrap().line, 3);
    }
}
