use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// JSON-friendly cell value.
///
/// Serialized untagged so records render as plain scalars: `null`, a number, a string,
/// a boolean, or an ISO-8601 date-time string. When deserializing, strings that parse as
/// ISO-8601 date-times come back as [`CellValue::DateTime`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
    String(String),
}

impl CellValue {
    /// Returns true if the value is [`CellValue::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Boolean(b) => write!(f, "{b}"),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            CellValue::String(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

/// Cell classification, serialized with the short SpreadsheetML tags.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    #[serde(rename = "n")]
    Numeric,
    #[serde(rename = "s")]
    String,
    #[serde(rename = "f")]
    Formula,
    #[serde(rename = "b")]
    Boolean,
    #[serde(rename = "d")]
    Date,
    #[serde(rename = "inlineStr")]
    InlineString,
    #[serde(rename = "e")]
    Error,
}

impl CellKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            CellKind::Numeric => "n",
            CellKind::String => "s",
            CellKind::Formula => "f",
            CellKind::Boolean => "b",
            CellKind::Date => "d",
            CellKind::InlineString => "inlineStr",
            CellKind::Error => "e",
        }
    }

    /// Map a worksheet `c/@t` attribute to a kind. Absent or unknown tags are numeric.
    pub fn from_type_attr(tag: Option<&str>) -> Self {
        match tag {
            Some("s") | Some("str") => CellKind::String,
            Some("b") => CellKind::Boolean,
            Some("e") => CellKind::Error,
            Some("inlineStr") => CellKind::InlineString,
            Some("d") => CellKind::Date,
            _ => CellKind::Numeric,
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
