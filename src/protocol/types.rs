//! MTP container kinds

use std::fmt;

/// Container kind carried in header bytes 4..6.
///
/// Values outside 1..=4 decode to [`ContainerKind::Unknown`] instead of
/// failing, since devices may emit frames the host does not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Operation request sent by the initiator
    Command,
    /// Dataset or object payload (either direction)
    Data,
    /// Operation result sent by the responder
    Response,
    /// Asynchronous device notification
    Event,
    /// Unrecognized kind value (0 is the reserved "undefined" kind)
    Unknown(u16),
}

impl ContainerKind {
    /// Convert from the wire value
    #[must_use]
    pub const fn from_u16(value: u16) -> Self {
        match value {
            1 => Self::Command,
            2 => Self::Data,
            3 => Self::Response,
            4 => Self::Event,
            other => Self::Unknown(other),
        }
    }

    /// Convert to the wire value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        match self {
            Self::Command => 1,
            Self::Data => 2,
            Self::Response => 3,
            Self::Event => 4,
            Self::Unknown(value) => value,
        }
    }

    /// Check if this kind carries 32-bit parameters rather than a payload
    #[must_use]
    pub const fn has_parameters(self) -> bool {
        matches!(self, Self::Command | Self::Response | Self::Event)
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Command => "Command Block",
            Self::Data => "Data Block",
            Self::Response => "Response Block",
            Self::Event => "Event Block",
            Self::Unknown(_) => "undefined",
        };
        write!(f, "{name}")
    }
}
