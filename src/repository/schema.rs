//! SQLite schema of the primary database.
//!
//! Reference columns (`manager_id`, `job_id`, `employee_id`) are plain ids, no
//! foreign keys are declared on them. Generated ids are `AUTOINCREMENT` so a
//! deleted id is never handed to a new row.

use crate::domain::{ROLE_ADMIN, ROLE_USER};
use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};
use anyhow::Result;
use rusqlite::{params, Connection};

const EMPLOYEE_TABLE_V1: Table = Table {
    name: "employee",
    columns: &[
        sqlite_column!(
            "id",
            SqlType::Integer,
            is_primary_key = true,
            autoincrement = true
        ),
        sqlite_column!("first_name", SqlType::Text),
        sqlite_column!("last_name", SqlType::Text),
        sqlite_column!("email", SqlType::Text),
        sqlite_column!("phone_number", SqlType::Text),
        sqlite_column!("hire_date", SqlType::Text),
        sqlite_column!("salary", SqlType::Integer),
        sqlite_column!("commission_pct", SqlType::Integer),
        sqlite_column!("manager_id", SqlType::Integer),
    ],
    indices: &[("idx_employee_manager_id", "manager_id")],
};

const JOB_TABLE_V1: Table = Table {
    name: "job",
    columns: &[
        sqlite_column!(
            "id",
            SqlType::Integer,
            is_primary_key = true,
            autoincrement = true
        ),
        sqlite_column!("job_title", SqlType::Text),
        sqlite_column!("min_salary", SqlType::Integer),
        sqlite_column!("max_salary", SqlType::Integer),
        sqlite_column!("employee_id", SqlType::Integer),
    ],
    indices: &[("idx_job_employee_id", "employee_id")],
};

const JOB_HISTORY_TABLE_V1: Table = Table {
    name: "job_history",
    columns: &[
        sqlite_column!(
            "id",
            SqlType::Integer,
            is_primary_key = true,
            autoincrement = true
        ),
        sqlite_column!("start_date", SqlType::Text),
        sqlite_column!("end_date", SqlType::Text),
        sqlite_column!("job_id", SqlType::Integer),
        sqlite_column!("employee_id", SqlType::Integer),
    ],
    indices: &[
        ("idx_job_history_job_id", "job_id"),
        ("idx_job_history_employee_id", "employee_id"),
    ],
};

const AUTHORITY_TABLE_V1: Table = Table {
    name: "jhi_authority",
    columns: &[sqlite_column!(
        "name",
        SqlType::Text,
        is_primary_key = true,
        non_null = true
    )],
    indices: &[],
};

fn seed_authorities(conn: &Connection) -> Result<()> {
    for name in [ROLE_ADMIN, ROLE_USER] {
        conn.execute(
            "INSERT INTO jhi_authority (name) VALUES (?1)",
            params![name],
        )?;
    }
    Ok(())
}

pub const PRIMARY_SCHEMA: VersionedSchema = VersionedSchema {
    version: 1,
    tables: &[
        EMPLOYEE_TABLE_V1,
        JOB_TABLE_V1,
        JOB_HISTORY_TABLE_V1,
        AUTHORITY_TABLE_V1,
    ],
    seed: Some(seed_authorities),
};
