use crate::model::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A persisted record: a type name, a bag of scalar/structured fields and an
/// identity assigned by the store on first persist.
///
/// Relationship edges are not held on the entity itself — owned edges live in
/// foreign-key (and discriminator) fields of the related entity, many-to-many
/// edges live in join rows inside the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// None until the store's persist operation assigns an identity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub fields: HashMap<String, serde_json::Value>,

    /// Store-managed timestamps; stripped by shallow copy, refreshed by persist.
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity {
    pub fn new(entity_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            entity_type: entity_type.into(),
            fields: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: serde_json::Value) -> &mut Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Read a field holding an identity reference (foreign keys, discriminators).
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }

    /// True once the store has assigned this entity an identity.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
