//! Request types for the API

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Power operations accepted for a VM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PowerAction {
    Start,
    Stop,
    Reset,
}

impl PowerAction {
    /// Path segment used by the upstream power endpoint
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Reset => "reset",
        }
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected power action name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid power action: {0} (expected start, stop or reset)")]
pub struct ParsePowerActionError(pub String);

impl FromStr for PowerAction {
    type Err = ParsePowerActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "reset" => Ok(Self::Reset),
            other => Err(ParsePowerActionError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_closed_set() {
        assert_eq!("start".parse::<PowerAction>(), Ok(PowerAction::Start));
        assert_eq!("stop".parse::<PowerAction>(), Ok(PowerAction::Stop));
        assert_eq!("reset".parse::<PowerAction>(), Ok(PowerAction::Reset));
    }

    #[test]
    fn test_parse_rejects_others() {
        assert!("suspend".parse::<PowerAction>().is_err());
        assert!("START".parse::<PowerAction>().is_err());
        assert!("".parse::<PowerAction>().is_err());
    }
}
