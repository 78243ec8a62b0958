use crate::model::{DataType, Entity};
use serde::{Deserialize, Serialize};

/// Relationship registry for a store: every entity type and every relationship
/// an entity of that type exposes, resolved by name lookup rather than any
/// runtime reflection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Collection of entity type definitions
    pub entities: Vec<EntityDef>,
    /// Optional schema description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Schema {
    /// Find an entity definition by type name
    pub fn get_entity_def(&self, entity_type: &str) -> Option<&EntityDef> {
        self.entities.iter().find(|def| def.name == entity_type)
    }

    /// Look up a relationship by `(entity type, relationship name)`.
    /// `None` covers both an unknown entity type and an unknown relationship
    /// name — callers treat it as "skip", never as an error.
    pub fn get_relationship(
        &self,
        entity_type: &str,
        relation_name: &str,
    ) -> Option<&RelationshipDef> {
        self.get_entity_def(entity_type)?.relationship(relation_name)
    }
}

/// Structure of one entity type: its fields and the relationships it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    /// Type name (e.g., "Invoice", "Line", "Item")
    pub name: String,
    pub fields: Vec<FieldDef>,
    pub relationships: Vec<RelationshipDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EntityDef {
    pub fn relationship(&self, name: &str) -> Option<&RelationshipDef> {
        self.relationships.iter().find(|rel| rel.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub data_type: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipDef {
    /// Logical name used in relation paths (e.g., "lines", "items")
    pub name: String,
    /// Entity type on the related side
    pub target: String,
    pub kind: RelationKind,
}

impl RelationshipDef {
    pub fn is_many_to_many(&self) -> bool {
        matches!(
            self.kind,
            RelationKind::ManyToMany { .. } | RelationKind::ManyToManyPolymorphic { .. }
        )
    }

    /// Whether `child` carries the foreign key (and discriminator) for this
    /// relationship when attached to `parent`. Many-to-many kinds carry no
    /// fields on either side.
    pub fn owns(&self) -> bool {
        !self.is_many_to_many()
    }
}

/// Closed union over the six relationship mechanisms. For owned kinds the
/// foreign key (and, when polymorphic, the owner-type discriminator) are
/// fields on the related entity; many-to-many kinds are mediated by join
/// rows under `join_table`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mechanism", rename_all = "snake_case")]
pub enum RelationKind {
    SingularOwned {
        foreign_key: String,
    },
    SingularOwnedPolymorphic {
        foreign_key: String,
        discriminator: String,
    },
    CollectionOwned {
        foreign_key: String,
    },
    CollectionOwnedPolymorphic {
        foreign_key: String,
        discriminator: String,
    },
    ManyToMany {
        join_table: String,
    },
    ManyToManyPolymorphic {
        join_table: String,
        discriminator: String,
    },
}

impl RelationKind {
    /// Whether at most one related entity participates.
    pub fn is_singular(&self) -> bool {
        matches!(
            self,
            RelationKind::SingularOwned { .. } | RelationKind::SingularOwnedPolymorphic { .. }
        )
    }

    /// Owner-type discriminator written alongside the edge, if polymorphic.
    pub fn discriminator(&self) -> Option<&str> {
        match self {
            RelationKind::SingularOwnedPolymorphic { discriminator, .. }
            | RelationKind::CollectionOwnedPolymorphic { discriminator, .. }
            | RelationKind::ManyToManyPolymorphic { discriminator, .. } => Some(discriminator),
            _ => None,
        }
    }

    /// True when an entity row matches this relationship's owned-side edge
    /// for the given parent. Always false for many-to-many kinds.
    pub fn matches_owned_edge(&self, parent: &Entity, candidate: &Entity) -> bool {
        let Some(parent_id) = parent.id.as_deref() else {
            return false;
        };
        match self {
            RelationKind::SingularOwned { foreign_key }
            | RelationKind::CollectionOwned { foreign_key } => {
                candidate.field_str(foreign_key) == Some(parent_id)
            }
            RelationKind::SingularOwnedPolymorphic {
                foreign_key,
                discriminator,
            }
            | RelationKind::CollectionOwnedPolymorphic {
                foreign_key,
                discriminator,
            } => {
                candidate.field_str(foreign_key) == Some(parent_id)
                    && candidate.field_str(discriminator) == Some(parent.entity_type.as_str())
            }
            RelationKind::ManyToMany { .. } | RelationKind::ManyToManyPolymorphic { .. } => false,
        }
    }
}
