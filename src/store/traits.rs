use crate::model::{Entity, Id, RelationshipDef, Schema};
use anyhow::Result;
use chrono::Utc;
use thiserror::Error;

/// Failures a store backend can surface. The duplication engine never catches
/// these — they propagate unmodified to the caller of `replicate`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),

    #[error("entity of type {0} has no identity; persist it first")]
    MissingIdentity(String),

    #[error("entity not found: {0}")]
    MissingEntity(Id),

    #[error("constraint violation on {entity_type}: required field '{field}' is missing")]
    ConstraintViolation { entity_type: String, field: String },

    #[error("relationship '{relation}' does not support {operation}")]
    UnsupportedOperation {
        relation: String,
        operation: &'static str,
    },
}

/// Persistence contract the duplication engine runs against.
///
/// The store owns all entities; the engine borrows a handle and drives it
/// strictly sequentially — it opens no transactions and performs no
/// compensation, so all-or-nothing semantics are the caller's concern.
#[async_trait::async_trait]
pub trait EntityStore: Send + Sync {
    /// Relationship registry used by the classifier.
    fn schema(&self) -> &Schema;

    /// Field-for-field copy excluding identity and store-managed timestamps.
    /// Foreign-key fields are copied as-is; attaching the copy re-points them.
    fn replicate_shallow(&self, entity: &Entity) -> Entity {
        let now = Utc::now();
        Entity {
            id: None,
            entity_type: entity.entity_type.clone(),
            fields: entity.fields.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Fetch an entity by identity.
    async fn get_entity(&self, id: &Id) -> Result<Option<Entity>>;

    /// Assign an identity if absent and write current field state.
    /// Returns the (possibly fresh) identity.
    async fn persist(&self, entity: &mut Entity) -> Result<Id>;

    /// Resolve the related entities currently reachable from `parent` over
    /// `relation`, in the store's natural order. Singular kinds yield at
    /// most one entity; an unpersisted parent reaches nothing.
    async fn get_related(&self, parent: &Entity, relation: &RelationshipDef)
        -> Result<Vec<Entity>>;

    /// Attach `child` to `parent` over a singular- or collection-owned
    /// relationship: set the foreign key (and discriminator when
    /// polymorphic) on the child, then persist it.
    async fn save_owned(
        &self,
        parent: &Entity,
        relation: &RelationshipDef,
        child: &mut Entity,
    ) -> Result<()>;

    /// Replace `parent`'s entire association set for a many-to-many
    /// relationship with exactly `child_ids`, preserving their order.
    /// A full sync, never an additive write.
    async fn sync_associations(
        &self,
        parent: &Entity,
        relation: &RelationshipDef,
        child_ids: &[Id],
    ) -> Result<()>;
}
