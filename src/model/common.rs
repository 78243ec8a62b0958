use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type Id = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum DataType {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}
