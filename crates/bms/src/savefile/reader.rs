//! Line-oriented reader with line-number tracking.

use std::str::Lines;

use super::error::{FormatError, FormatErrorKind};

/// Field delimiter within a record line
pub const FIELD_DELIMITER: char = ':';

/// Delimiter between items of a list field
pub const LIST_DELIMITER: char = ',';

/// Separator between a sensor line and its weighting
pub const WEIGHT_DELIMITER: char = '@';

/// One line of input and where it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number
    pub number: usize,
    pub text: &'a str,
}

impl<'a> Line<'a> {
    /// Format error located at this line
    pub fn error(&self, kind: impl Into<FormatErrorKind>) -> FormatError {
        FormatError::new(self.number, self.text, kind)
    }

    /// Split into delimiter-separated fields. Empty fields are kept.
    pub fn fields(&self) -> Vec<&'a str> {
        self.text.split(FIELD_DELIMITER).collect()
    }
}

/// Hands out lines one at a time, counting as it goes
pub struct LineReader<'a> {
    lines: Lines<'a>,
    number: usize,
}

impl<'a> LineReader<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            lines: content.lines(),
            number: 0,
        }
    }

    /// Next line, or `None` at end of input
    pub fn next_line(&mut self) -> Option<Line<'a>> {
        let text = self.lines.next()?;
        self.number += 1;
        Some(Line {
            number: self.number,
            text,
        })
    }

    /// Next line, which must exist and must not be empty
    pub fn expect_line(&mut self, what: &'static str) -> Result<Line<'a>, FormatError> {
        let Some(line) = self.next_line() else {
            return Err(FormatError::new(
                self.number + 1,
                "",
                FormatErrorKind::UnexpectedEof(what),
            ));
        };
        if line.text.is_empty() {
            return Err(line.error(FormatErrorKind::EmptyLine(what)));
        }
        Ok(line)
    }

    /// Number of lines consumed so far
    pub fn lines_read(&self) -> usize {
        self.number
    }
}
