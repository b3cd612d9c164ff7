use crate::domain::{Authority, Employee, Entity, FieldValue, Job, JobHistory};
use chrono::{DateTime, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{Row, Statement};

/// Binds an entity to its table in the primary database.
///
/// Rows are read back with the identifier column followed by the columns of
/// [`Entity::FIELDS`].
pub trait SqlRecord: Entity {
    const TABLE: &'static str;
    /// Whether the database assigns the identifier on insert.
    const GENERATED_ID: bool;

    fn id_value(id: &Self::Id) -> Value;

    fn from_row(row: &Row) -> rusqlite::Result<Self>;

    /// Returns the record carrying the identifier assigned by the database.
    fn with_generated_id(self, rowid: i64) -> Self;
}

pub(super) fn sql_value(value: FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Text(s) => Value::Text(s),
        FieldValue::Integer(i) => Value::Integer(i),
        FieldValue::Timestamp(ts) => Value::Text(FieldValue::format_timestamp(&ts)),
    }
}

fn timestamp_column(row: &Row, column: &str) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(column)?;
    raw.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| {
                let stmt: &Statement = row.as_ref();
                let idx = stmt.column_index(column).unwrap_or(0);
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
            })
    })
    .transpose()
}

impl SqlRecord for Employee {
    const TABLE: &'static str = "employee";
    const GENERATED_ID: bool = true;

    fn id_value(id: &i64) -> Value {
        Value::Integer(*id)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Employee {
            id: row.get("id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            email: row.get("email")?,
            phone_number: row.get("phone_number")?,
            hire_date: timestamp_column(row, "hire_date")?,
            salary: row.get("salary")?,
            commission_pct: row.get("commission_pct")?,
            manager_id: row.get("manager_id")?,
        })
    }

    fn with_generated_id(self, rowid: i64) -> Self {
        Employee {
            id: Some(rowid),
            ..self
        }
    }
}

impl SqlRecord for Job {
    const TABLE: &'static str = "job";
    const GENERATED_ID: bool = true;

    fn id_value(id: &i64) -> Value {
        Value::Integer(*id)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Job {
            id: row.get("id")?,
            job_title: row.get("job_title")?,
            min_salary: row.get("min_salary")?,
            max_salary: row.get("max_salary")?,
            employee_id: row.get("employee_id")?,
        })
    }

    fn with_generated_id(self, rowid: i64) -> Self {
        Job {
            id: Some(rowid),
            ..self
        }
    }
}

impl SqlRecord for JobHistory {
    const TABLE: &'static str = "job_history";
    const GENERATED_ID: bool = true;

    fn id_value(id: &i64) -> Value {
        Value::Integer(*id)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(JobHistory {
            id: row.get("id")?,
            start_date: timestamp_column(row, "start_date")?,
            end_date: timestamp_column(row, "end_date")?,
            job_id: row.get("job_id")?,
            employee_id: row.get("employee_id")?,
        })
    }

    fn with_generated_id(self, rowid: i64) -> Self {
        JobHistory {
            id: Some(rowid),
            ..self
        }
    }
}

impl SqlRecord for Authority {
    const TABLE: &'static str = "jhi_authority";
    const GENERATED_ID: bool = false;

    fn id_value(id: &String) -> Value {
        Value::Text(id.clone())
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Authority {
            name: row.get("name")?,
        })
    }

    fn with_generated_id(self, _rowid: i64) -> Self {
        self
    }
}
