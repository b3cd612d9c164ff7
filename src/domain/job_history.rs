use super::{Entity, Field, FieldKind, FieldValue, WireMapping};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHistory {
    pub id: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub job_id: Option<i64>,
    pub employee_id: Option<i64>,
}

const JOB_HISTORY_FIELDS: &[Field] = &[
    Field::new("startDate", "start_date", FieldKind::Timestamp),
    Field::new("endDate", "end_date", FieldKind::Timestamp),
    Field::new("jobId", "job_id", FieldKind::Integer),
    Field::new("employeeId", "employee_id", FieldKind::Integer),
];

impl Entity for JobHistory {
    type Id = i64;

    const NAME: &'static str = "jobHistory";
    const ID: Field = Field::new("id", "id", FieldKind::Integer);
    const FIELDS: &'static [Field] = JOB_HISTORY_FIELDS;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn field_values(&self) -> Vec<FieldValue> {
        vec![
            self.start_date.into(),
            self.end_date.into(),
            self.job_id.into(),
            self.employee_id.into(),
        ]
    }
}

impl WireMapping for JobHistory {
    type Dto = JobHistory;

    fn from_dto(dto: JobHistory) -> Self {
        dto
    }

    fn to_dto(&self) -> JobHistory {
        self.clone()
    }

    fn dto_id(dto: &JobHistory) -> Option<i64> {
        dto.id
    }
}
