use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    Draft,
    Published,
    Canceled,
}

impl ShiftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftStatus::Draft => "draft",
            ShiftStatus::Published => "published",
            ShiftStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for ShiftStatus {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "draft" => Ok(ShiftStatus::Draft),
            "published" => Ok(ShiftStatus::Published),
            "canceled" => Ok(ShiftStatus::Canceled),
            other => Err(format!("unknown shift status: {other}")),
        }
    }
}
