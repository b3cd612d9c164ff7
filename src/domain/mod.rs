//! Domain records shared by the primary store, the search index and the REST layer.

mod authority;
mod employee;
mod job;
mod job_history;
mod paging;

pub use authority::{Authority, ROLE_ADMIN, ROLE_USER};
pub use employee::{Employee, EmployeeDto};
pub use job::Job;
pub use job_history::JobHistory;
pub use paging::{Direction, Order, Page, PageDefaults, PageRequest};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::{Debug, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Timestamp,
}

/// A persisted attribute: its wire (JSON / query) name and its storage column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn new(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Field { name, column, kind }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Timestamps are stored with fixed nanosecond precision so that
    /// lexicographic order matches chronological order.
    pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    /// Text handed to the full-text engine for this value, `None` for nulls.
    pub fn to_index_text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Timestamp(ts) => Some(Self::format_timestamp(ts)),
        }
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map(FieldValue::Text).unwrap_or(FieldValue::Null)
    }
}

impl From<Option<i64>> for FieldValue {
    fn from(value: Option<i64>) -> Self {
        value.map(FieldValue::Integer).unwrap_or(FieldValue::Null)
    }
}

impl From<Option<DateTime<Utc>>> for FieldValue {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map(FieldValue::Timestamp).unwrap_or(FieldValue::Null)
    }
}

pub trait Entity:
    Clone + Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static
{
    type Id: Clone + Debug + Display + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static;

    /// Camel-case entity name used in alert headers, e.g. `jobHistory`.
    const NAME: &'static str;
    const ID: Field;
    /// Every non-identifier attribute, in storage order.
    const FIELDS: &'static [Field];

    fn id(&self) -> Option<Self::Id>;

    /// Values of `FIELDS`, same order.
    fn field_values(&self) -> Vec<FieldValue>;

    /// Looks up a sortable attribute (identifier included) by its wire name.
    fn field(name: &str) -> Option<Field> {
        if Self::ID.name == name {
            return Some(Self::ID);
        }
        Self::FIELDS.iter().find(|f| f.name == name).copied()
    }
}

/// Pure, total mapping between a record and its wire representation.
pub trait WireMapping: Entity {
    type Dto: Clone + Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static;

    fn from_dto(dto: Self::Dto) -> Self;
    fn to_dto(&self) -> Self::Dto;
    fn dto_id(dto: &Self::Dto) -> Option<Self::Id>;
}
