//! Save-file error types.

use std::fmt;

use bms_model::ModelError;

/// Error type for save-file loading.
///
/// I/O failures are kept apart from invalid file contents.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read save file: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Format(#[from] FormatError),
}

impl LoadError {
    /// The format error, if this is one
    pub fn format(&self) -> Option<&FormatError> {
        match self {
            LoadError::Format(err) => Some(err),
            LoadError::Io(_) => None,
        }
    }
}

/// Invalid save data, pinned to the line where the problem was found
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid save data at line {line} ({}): {kind}", .kind.category())]
pub struct FormatError {
    /// 1-based line number
    pub line: usize,
    /// The offending line, empty at end of input
    pub text: String,
    pub kind: FormatErrorKind,
}

impl FormatError {
    pub fn new(line: usize, text: impl Into<String>, kind: impl Into<FormatErrorKind>) -> Self {
        let kind = kind.into();
        Self {
            line,
            text: text.into(),
            kind,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

/// What is wrong with a save file
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatErrorKind {
    #[error("unexpected end of input, expected {0}")]
    UnexpectedEof(&'static str),

    #[error("expected {0}, found an empty line")]
    EmptyLine(&'static str),

    #[error("building name must not contain ':'")]
    NameContainsDelimiter,

    #[error("wrong number of fields for {record}: found {found}")]
    FieldCount { record: &'static str, found: usize },

    #[error("cannot parse {field} from {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: String },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: String },

    #[error("{field} {value} is too large")]
    TooLarge { field: &'static str, value: i64 },

    #[error("sensor line is missing its '@' weighting")]
    MissingWeight,

    #[error("sensor line has a weighting but the room is not weighting-based")]
    UnexpectedWeight,

    #[error("unknown room type {0:?}")]
    UnknownRoomType(String),

    #[error("unknown sensor kind {0:?}")]
    UnknownSensorKind(String),

    #[error("unknown hazard evaluator {0:?}")]
    UnknownHazardEvaluator(String),

    #[error("maintenance order names room {0:?}, which is not on this floor")]
    UnknownMaintenanceRoom(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl FormatErrorKind {
    /// Which class of rule was violated
    pub fn category(&self) -> ErrorCategory {
        use FormatErrorKind::*;

        match self {
            UnexpectedEof(_)
            | EmptyLine(_)
            | NameContainsDelimiter
            | FieldCount { .. }
            | InvalidNumber { .. }
            | MissingWeight
            | UnexpectedWeight => ErrorCategory::Structural,
            Negative { .. } | NotPositive { .. } | TooLarge { .. } => ErrorCategory::Range,
            UnknownRoomType(_) | UnknownSensorKind(_) | UnknownHazardEvaluator(_) => {
                ErrorCategory::Semantic
            }
            UnknownMaintenanceRoom(_) => ErrorCategory::Referential,
            Model(err) => model_category(err),
        }
    }
}

fn model_category(err: &ModelError) -> ErrorCategory {
    match err {
        ModelError::EmptyBuildingName | ModelError::EmptyReadings => ErrorCategory::Structural,

        ModelError::InvalidFloorNumber(_)
        | ModelError::FloorDimensionTooSmall { .. }
        | ModelError::RoomAreaTooSmall { .. }
        | ModelError::InvalidUpdateFrequency(_) => ErrorCategory::Range,
        ModelError::InvalidCarbonDioxideLimits { ideal, limit } if *ideal == 0 || *limit == 0 => {
            ErrorCategory::Range
        }

        ModelError::DuplicateFloor(_)
        | ModelError::DuplicateRoom(_)
        | ModelError::DuplicateSensor(_)
        | ModelError::RoomNotOnFloor(_)
        | ModelError::SensorNotInRoom(_)
        | ModelError::FloorNotFound(_) => ErrorCategory::Referential,

        ModelError::NoFloorBelow(_)
        | ModelError::FloorTooSmall { .. }
        | ModelError::InsufficientSpace { .. } => ErrorCategory::StructuralSupport,

        ModelError::InvalidCarbonDioxideLimits { .. }
        | ModelError::WeightOutOfRange(_)
        | ModelError::WeightSumNot100(_)
        | ModelError::EmptyMaintenanceOrder
        | ModelError::AdjacentMaintenanceRepeat(_)
        | ModelError::NoFloors
        | ModelError::NoRooms => ErrorCategory::Semantic,
    }
}

/// Classes of save-file rule violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Field counts, unparsable numbers, empty lines, premature end of input
    Structural,
    /// Negative, non-positive or below-minimum values
    Range,
    /// Duplicates and references to things that do not exist
    Referential,
    /// Floors and rooms that cannot be physically supported
    StructuralSupport,
    /// Unknown tokens and broken evaluator or maintenance rules
    Semantic,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Structural => write!(f, "structural"),
            ErrorCategory::Range => write!(f, "range"),
            ErrorCategory::Referential => write!(f, "referential"),
            ErrorCategory::StructuralSupport => write!(f, "structural support"),
            ErrorCategory::Semantic => write!(f, "semantic"),
        }
    }
}
