//! Save Files
//!
//! Reading and writing the line-oriented building save format.

mod error;
mod loader;
mod reader;
mod writer;

pub use error::*;
pub use loader::*;
pub use reader::{FIELD_DELIMITER, LIST_DELIMITER, WEIGHT_DELIMITER};
pub use writer::*;
