use super::{Entity, Field, FieldKind, FieldValue, WireMapping};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Option<i64>,
    pub job_title: Option<String>,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
    pub employee_id: Option<i64>,
}

const JOB_FIELDS: &[Field] = &[
    Field::new("jobTitle", "job_title", FieldKind::Text),
    Field::new("minSalary", "min_salary", FieldKind::Integer),
    Field::new("maxSalary", "max_salary", FieldKind::Integer),
    Field::new("employeeId", "employee_id", FieldKind::Integer),
];

impl Entity for Job {
    type Id = i64;

    const NAME: &'static str = "job";
    const ID: Field = Field::new("id", "id", FieldKind::Integer);
    const FIELDS: &'static [Field] = JOB_FIELDS;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn field_values(&self) -> Vec<FieldValue> {
        vec![
            self.job_title.clone().into(),
            self.min_salary.into(),
            self.max_salary.into(),
            self.employee_id.into(),
        ]
    }
}

// Jobs travel over the wire as-is.
impl WireMapping for Job {
    type Dto = Job;

    fn from_dto(dto: Job) -> Self {
        dto
    }

    fn to_dto(&self) -> Job {
        self.clone()
    }

    fn dto_id(dto: &Job) -> Option<i64> {
        dto.id
    }
}
