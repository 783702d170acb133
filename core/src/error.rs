use std::error;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ReadingError {
    MissingField(&'static str),
    EmptyField(&'static str),
}

impl fmt::Display for ReadingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReadingError::MissingField(field) => write!(f, "Missing required field: {}", field),
            ReadingError::EmptyField(field) => write!(f, "Field must not be empty: {}", field),
        }
    }
}

impl error::Error for ReadingError {}
