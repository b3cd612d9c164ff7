use super::{Entity, Field, FieldKind, FieldValue, WireMapping};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted employee record, also the shape mirrored into the search index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub hire_date: Option<DateTime<Utc>>,
    pub salary: Option<i64>,
    pub commission_pct: Option<i64>,
    pub manager_id: Option<i64>,
}

/// Wire representation of an [`Employee`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDto {
    pub id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub hire_date: Option<DateTime<Utc>>,
    pub salary: Option<i64>,
    pub commission_pct: Option<i64>,
    pub manager_id: Option<i64>,
}

const EMPLOYEE_FIELDS: &[Field] = &[
    Field::new("firstName", "first_name", FieldKind::Text),
    Field::new("lastName", "last_name", FieldKind::Text),
    Field::new("email", "email", FieldKind::Text),
    Field::new("phoneNumber", "phone_number", FieldKind::Text),
    Field::new("hireDate", "hire_date", FieldKind::Timestamp),
    Field::new("salary", "salary", FieldKind::Integer),
    Field::new("commissionPct", "commission_pct", FieldKind::Integer),
    Field::new("managerId", "manager_id", FieldKind::Integer),
];

impl Entity for Employee {
    type Id = i64;

    const NAME: &'static str = "employee";
    const ID: Field = Field::new("id", "id", FieldKind::Integer);
    const FIELDS: &'static [Field] = EMPLOYEE_FIELDS;

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn field_values(&self) -> Vec<FieldValue> {
        vec![
            self.first_name.clone().into(),
            self.last_name.clone().into(),
            self.email.clone().into(),
            self.phone_number.clone().into(),
            self.hire_date.into(),
            self.salary.into(),
            self.commission_pct.into(),
            self.manager_id.into(),
        ]
    }
}

impl WireMapping for Employee {
    type Dto = EmployeeDto;

    fn from_dto(dto: EmployeeDto) -> Self {
        Employee {
            id: dto.id,
            first_name: dto.first_name,
            last_name: dto.last_name,
            email: dto.email,
            phone_number: dto.phone_number,
            hire_date: dto.hire_date,
            salary: dto.salary,
            commission_pct: dto.commission_pct,
            manager_id: dto.manager_id,
        }
    }

    fn to_dto(&self) -> EmployeeDto {
        EmployeeDto {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            hire_date: self.hire_date,
            salary: self.salary,
            commission_pct: self.commission_pct,
            manager_id: self.manager_id,
        }
    }

    fn dto_id(dto: &EmployeeDto) -> Option<i64> {
        dto.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_dto() -> EmployeeDto {
        EmployeeDto {
            id: Some(7),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            email: Some("ada@example.com".to_string()),
            phone_number: None,
            hire_date: Some(Utc.with_ymd_and_hms(2015, 12, 10, 9, 30, 0).unwrap()),
            salary: Some(90000),
            commission_pct: Some(5),
            manager_id: Some(1),
        }
    }

    #[test]
    fn mapping_is_lossless_both_ways() {
        let dto = sample_dto();
        let employee = Employee::from_dto(dto.clone());
        assert_eq!(employee.id, Some(7));
        assert_eq!(employee.last_name.as_deref(), Some("Lovelace"));
        assert_eq!(employee.to_dto(), dto);
        assert_eq!(Employee::dto_id(&dto), Some(7));
    }

    #[test]
    fn empty_dto_maps_to_empty_record() {
        let employee = Employee::from_dto(EmployeeDto::default());
        assert_eq!(employee, Employee::default());
        assert_eq!(Employee::dto_id(&EmployeeDto::default()), None);
    }

    #[test]
    fn field_values_follow_field_order() {
        let employee = Employee::from_dto(sample_dto());
        let values = employee.field_values();
        assert_eq!(values.len(), Employee::FIELDS.len());
        assert_eq!(values[1], FieldValue::Text("Lovelace".to_string()));
        assert_eq!(values[3], FieldValue::Null);
        assert_eq!(values[5], FieldValue::Integer(90000));
    }

    #[test]
    fn dto_uses_camel_case_on_the_wire() {
        let json = serde_json::to_value(sample_dto()).unwrap();
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["hireDate"], "2015-12-10T09:30:00Z");
        assert_eq!(json["commissionPct"], 5);
    }

    #[test]
    fn field_lookup_includes_identifier() {
        assert_eq!(Employee::field("id").map(|f| f.column), Some("id"));
        assert_eq!(
            Employee::field("hireDate").map(|f| f.kind),
            Some(FieldKind::Timestamp)
        );
        assert!(Employee::field("hire_date").is_none());
    }
}
