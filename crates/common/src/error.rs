#![allow(clippy::uninlined_format_args)]

//! Error related data structures to be shared and used.
//!
//! This module contains the [`Error`] enum, which is used to represent
//! errors that can occur within the Dot Matrix domain.

use std::{
    fmt::{self, Display, Formatter},
    io,
};

/// Top level enum for error handling within Dot Matrix.
///
/// Most of the time, you will want to use the `CustomError` variant
/// to provide a more detailed error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidData,
    RomSize,
    RomType(u8),
    IncompatibleBootRom,
    InvalidParameter(String),
    CustomError(String),
}

impl Error {
    pub fn description(&self) -> String {
        match self {
            Error::InvalidData => String::from("Invalid data format"),
            Error::RomSize => String::from("Invalid ROM size"),
            Error::RomType(rom_type) => format!("Unknown ROM type: 0x{:02x}", rom_type),
            Error::IncompatibleBootRom => String::from("Incompatible Boot ROM"),
            Error::InvalidParameter(message) => format!("Invalid parameter: {}", message),
            Error::CustomError(message) => String::from(message),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::CustomError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn test_description() {
        assert_eq!(Error::RomSize.description(), "Invalid ROM size");
        assert_eq!(Error::RomType(0xef).description(), "Unknown ROM type: 0xef");
        assert_eq!(
            Error::CustomError(String::from("everything is broken")).description(),
            "everything is broken"
        );
    }
}
