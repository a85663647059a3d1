//! Task records and the values derived from them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Server-assigned task identifier.
///
/// The server may hand out numbers or strings. The identifier is kept opaque:
/// two ids are equal when their textual forms are equal, and an id serializes
/// back in the JSON type it arrived in.
#[derive(Debug, Clone, Eq)]
pub struct TaskId {
    raw: String,
    numeric: bool,
}

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for TaskId {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Hash for TaskId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<u64> for TaskId {
    fn from(value: u64) -> Self {
        Self {
            raw: value.to_string(),
            numeric: true,
        }
    }
}

impl From<String> for TaskId {
    fn from(raw: String) -> Self {
        Self {
            raw,
            numeric: false,
        }
    }
}

impl From<&str> for TaskId {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl FromStr for TaskId {
    type Err = std::convert::Infallible;

    /// Digit-only input becomes a numeric id; anything else stays textual.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let numeric = !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        Ok(Self {
            raw: s.to_string(),
            numeric,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Unsigned(u64),
    Signed(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match IdRepr::deserialize(deserializer)? {
            IdRepr::Unsigned(n) => TaskId::from(n),
            IdRepr::Signed(n) => TaskId {
                raw: n.to_string(),
                numeric: true,
            },
            IdRepr::Text(s) => TaskId::from(s),
        })
    }
}

impl Serialize for TaskId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.numeric {
            if let Ok(n) = self.raw.parse::<i64>() {
                return serializer.serialize_i64(n);
            }
        }
        serializer.serialize_str(&self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriorityError {
    #[error("priority must be a whole number, got {0:?}")]
    NotANumber(String),

    #[error("priority must be between {min} and {max}, got {value}", min = Priority::MIN, max = Priority::MAX)]
    OutOfRange { value: i64 },
}

/// Task priority in `[1, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "PriorityRepr", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 100;

    pub fn new(value: i64) -> Result<Self, PriorityError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(PriorityError::OutOfRange { value })
        }
    }

    /// Coerce form input into a priority. Blank input means the default.
    pub fn parse(input: &str) -> Result<Self, PriorityError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        let value = trimmed
            .parse::<i64>()
            .map_err(|_| PriorityError::NotANumber(trimmed.to_string()))?;
        Self::new(value)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriorityRepr {
    Number(i64),
    Float(f64),
    Text(String),
}

impl TryFrom<PriorityRepr> for Priority {
    type Error = PriorityError;

    fn try_from(repr: PriorityRepr) -> Result<Self, Self::Error> {
        match repr {
            PriorityRepr::Number(n) => Priority::new(n),
            // JSON has no integer type; 3.0 is a whole number, 3.5 is not
            PriorityRepr::Float(f) if f.fract() == 0.0 && f.is_finite() => Priority::new(f as i64),
            PriorityRepr::Float(f) => Err(PriorityError::NotANumber(f.to_string())),
            PriorityRepr::Text(s) => Priority::parse(&s),
        }
    }
}

/// A task as the server returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(alias = "_id")]
    pub id: TaskId,
    #[serde(alias = "user", default, deserialize_with = "null_as_default")]
    pub owner: String,
    pub value: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,
    #[serde(default, deserialize_with = "null_as_default")]
    pub checked: bool,
}

/// Explicit `null` reads the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of create and edit requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDraft {
    pub value: String,
    pub priority: Priority,
}

impl TaskDraft {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            priority: Priority::default(),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Build a draft from raw form input, coercing the priority text.
    pub fn parse(value: impl Into<String>, priority: &str) -> Result<Self, PriorityError> {
        Ok(Self::new(value).with_priority(Priority::parse(priority)?))
    }
}

/// Counts derived from a task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl Summary {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let (total, completed) = tasks.into_iter().fold((0, 0), |(total, completed), task| {
            (total + 1, completed + usize::from(task.checked))
        });
        Self {
            total,
            completed,
            pending: total - completed,
        }
    }
}
