use super::{Entity, Field, FieldKind, FieldValue};
use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
pub const ROLE_USER: &str = "ROLE_USER";

/// Security authority, keyed by its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Authority {
    pub name: String,
}

impl Authority {
    pub fn new(name: &str) -> Self {
        Authority {
            name: name.to_string(),
        }
    }
}

impl Entity for Authority {
    type Id = String;

    const NAME: &'static str = "authority";
    const ID: Field = Field::new("name", "name", FieldKind::Text);
    const FIELDS: &'static [Field] = &[];

    fn id(&self) -> Option<String> {
        Some(self.name.clone())
    }

    fn field_values(&self) -> Vec<FieldValue> {
        Vec::new()
    }
}
