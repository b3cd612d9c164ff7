//! Shared constants for end-to-end tests
//!
//! When resource paths or header names change, update only this file.

// ============================================================================
// Resource paths
// ============================================================================

pub const EMPLOYEES: &str = "employees";
pub const JOBS: &str = "jobs";
pub const JOB_HISTORIES: &str = "job-histories";

// ============================================================================
// Headers
// ============================================================================

pub const APP_NAME: &str = "jhipsterApp";
pub const ALERT_HEADER: &str = "X-jhipsterApp-alert";
pub const ERROR_HEADER: &str = "X-jhipsterApp-error";
pub const PARAMS_HEADER: &str = "X-jhipsterApp-params";
pub const WARNING_HEADER: &str = "X-jhipsterApp-warning";
pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

// ============================================================================
// Job history fixtures
// ============================================================================

pub const DEFAULT_START_DATE: &str = "1970-01-01T00:00:00Z";
pub const UPDATED_START_DATE: &str = "2024-03-01T08:30:00Z";
pub const DEFAULT_END_DATE: &str = "1970-01-01T00:00:00Z";
pub const UPDATED_END_DATE: &str = "2025-06-30T17:00:00.250Z";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Polling interval when waiting for server readiness (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// Default timeout for HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
