//! The fixed catalog of review statuses and the notification text derived
//! from them.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::BotError;

/// Review verdict for a submitted homework.
///
/// The upstream contract knows exactly these three statuses; anything else
/// means the contract changed under us and must surface as
/// [`BotError::UnknownStatus`] rather than being skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Reviewing => "reviewing",
            Self::Rejected => "rejected",
        }
    }

    /// Human-readable verdict sentence shown to the recipient.
    pub fn verdict(&self) -> &'static str {
        match self {
            Self::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Self::Reviewing => "Работа взята на проверку ревьюером.",
            Self::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl FromStr for HomeworkStatus {
    type Err = BotError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "approved" => Ok(Self::Approved),
            "reviewing" => Ok(Self::Reviewing),
            "rejected" => Ok(Self::Rejected),
            other => Err(BotError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One homework record as returned by the status service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeworkEntry {
    pub homework_name: String,
    pub status: String,
}

impl HomeworkEntry {
    /// Extracts an entry from the raw JSON the validator passed through.
    ///
    /// Entry shape is checked here, per entry, not eagerly for the whole
    /// list; the error names the missing field.
    pub fn from_value(raw: &Value) -> Result<Self, BotError> {
        let homework_name = raw
            .get("homework_name")
            .and_then(Value::as_str)
            .ok_or(BotError::MalformedEntry("homework_name"))?;
        let status = raw
            .get("status")
            .and_then(Value::as_str)
            .ok_or(BotError::MalformedEntry("status"))?;
        Ok(Self {
            homework_name: homework_name.to_string(),
            status: status.to_string(),
        })
    }

    /// Renders the notification text for this entry's status transition.
    pub fn status_change_message(&self) -> Result<String, BotError> {
        let status: HomeworkStatus = self.status.parse()?;
        Ok(format!(
            "Изменился статус проверки работы \"{}\". {}",
            self.homework_name,
            status.verdict()
        ))
    }
}
