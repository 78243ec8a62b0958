use crate::model::{generate_id, Entity, Id, RelationKind, RelationshipDef, Schema};
use crate::store::traits::{EntityStore, StoreError};
use anyhow::Result;
use chrono::Utc;
use log::debug;
use parking_lot::RwLock;

/// One association edge in a many-to-many join table. `parent_type` is set
/// only for polymorphic joins, where several owner types share one table.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinRow {
    pub table: String,
    pub parent_id: Id,
    pub child_id: Id,
    pub parent_type: Option<String>,
}

#[derive(Debug, Default)]
struct StoreInner {
    /// Entity rows in insertion order; iteration order of collections and
    /// join fetches follows this order.
    entities: Vec<Entity>,
    joins: Vec<JoinRow>,
}

/// Reference store backend: schema-validated entity rows plus join rows,
/// all behind a single lock. Identities are UUIDv4 strings.
pub struct InMemoryStore {
    schema: Schema,
    inner: RwLock<StoreInner>,
}

impl InMemoryStore {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            inner: RwLock::new(StoreInner::default()),
        }
    }

    pub fn entity_count(&self) -> usize {
        self.inner.read().entities.len()
    }

    /// All persisted entities of one type, in insertion order.
    pub fn entities_of_type(&self, entity_type: &str) -> Vec<Entity> {
        self.inner
            .read()
            .entities
            .iter()
            .filter(|e| e.entity_type == entity_type)
            .cloned()
            .collect()
    }

    /// Current association set for a many-to-many relationship, in row order.
    pub fn association_ids(&self, parent: &Entity, relation: &RelationshipDef) -> Vec<Id> {
        let Some(parent_id) = parent.id.as_deref() else {
            return Vec::new();
        };
        let inner = self.inner.read();
        match &relation.kind {
            RelationKind::ManyToMany { join_table } => inner
                .joins
                .iter()
                .filter(|row| row.table == *join_table && row.parent_id == parent_id)
                .map(|row| row.child_id.clone())
                .collect(),
            RelationKind::ManyToManyPolymorphic { join_table, .. } => inner
                .joins
                .iter()
                .filter(|row| {
                    row.table == *join_table
                        && row.parent_id == parent_id
                        && row.parent_type.as_deref() == Some(parent.entity_type.as_str())
                })
                .map(|row| row.child_id.clone())
                .collect(),
            _ => Vec::new(),
        }
    }

    fn check_constraints(&self, entity: &Entity) -> Result<()> {
        let def = self
            .schema
            .get_entity_def(&entity.entity_type)
            .ok_or_else(|| StoreError::UnknownEntityType(entity.entity_type.clone()))?;
        for field in &def.fields {
            if field.required == Some(true) && !entity.fields.contains_key(&field.name) {
                return Err(StoreError::ConstraintViolation {
                    entity_type: entity.entity_type.clone(),
                    field: field.name.clone(),
                }
                .into());
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl EntityStore for InMemoryStore {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn get_entity(&self, id: &Id) -> Result<Option<Entity>> {
        Ok(self
            .inner
            .read()
            .entities
            .iter()
            .find(|e| e.id.as_deref() == Some(id.as_str()))
            .cloned())
    }

    async fn persist(&self, entity: &mut Entity) -> Result<Id> {
        self.check_constraints(entity)?;

        let id = match &entity.id {
            Some(id) => id.clone(),
            None => {
                let id = generate_id();
                entity.id = Some(id.clone());
                debug!("assigned identity {} to new {}", id, entity.entity_type);
                id
            }
        };
        entity.updated_at = Utc::now();

        let mut inner = self.inner.write();
        match inner
            .entities
            .iter_mut()
            .find(|e| e.id.as_deref() == Some(id.as_str()))
        {
            Some(row) => {
                // Updates keep the original creation timestamp.
                entity.created_at = row.created_at;
                *row = entity.clone();
            }
            None => inner.entities.push(entity.clone()),
        }
        Ok(id)
    }

    async fn get_related(
        &self,
        parent: &Entity,
        relation: &RelationshipDef,
    ) -> Result<Vec<Entity>> {
        if parent.id.is_none() {
            return Ok(Vec::new());
        }
        if relation.owns() {
            let inner = self.inner.read();
            let mut related: Vec<Entity> = inner
                .entities
                .iter()
                .filter(|e| e.entity_type == relation.target)
                .filter(|e| relation.kind.matches_owned_edge(parent, e))
                .cloned()
                .collect();
            if relation.kind.is_singular() {
                related.truncate(1);
            }
            return Ok(related);
        }

        let child_ids = self.association_ids(parent, relation);
        let inner = self.inner.read();
        let mut related = Vec::with_capacity(child_ids.len());
        for child_id in child_ids {
            let child = inner
                .entities
                .iter()
                .find(|e| e.id.as_deref() == Some(child_id.as_str()))
                .cloned()
                .ok_or(StoreError::MissingEntity(child_id))?;
            related.push(child);
        }
        Ok(related)
    }

    async fn save_owned(
        &self,
        parent: &Entity,
        relation: &RelationshipDef,
        child: &mut Entity,
    ) -> Result<()> {
        let parent_id = parent
            .id
            .clone()
            .ok_or_else(|| StoreError::MissingIdentity(parent.entity_type.clone()))?;

        match &relation.kind {
            RelationKind::SingularOwned { foreign_key }
            | RelationKind::CollectionOwned { foreign_key } => {
                child.set_field(foreign_key.clone(), serde_json::Value::String(parent_id));
            }
            RelationKind::SingularOwnedPolymorphic {
                foreign_key,
                discriminator,
            }
            | RelationKind::CollectionOwnedPolymorphic {
                foreign_key,
                discriminator,
            } => {
                child.set_field(foreign_key.clone(), serde_json::Value::String(parent_id));
                child.set_field(
                    discriminator.clone(),
                    serde_json::Value::String(parent.entity_type.clone()),
                );
            }
            RelationKind::ManyToMany { .. } | RelationKind::ManyToManyPolymorphic { .. } => {
                return Err(StoreError::UnsupportedOperation {
                    relation: relation.name.clone(),
                    operation: "save_owned",
                }
                .into());
            }
        }
        self.persist(child).await?;
        Ok(())
    }

    async fn sync_associations(
        &self,
        parent: &Entity,
        relation: &RelationshipDef,
        child_ids: &[Id],
    ) -> Result<()> {
        let parent_id = parent
            .id
            .clone()
            .ok_or_else(|| StoreError::MissingIdentity(parent.entity_type.clone()))?;

        let (join_table, parent_type) = match &relation.kind {
            RelationKind::ManyToMany { join_table } => (join_table.clone(), None),
            RelationKind::ManyToManyPolymorphic { join_table, .. } => {
                (join_table.clone(), Some(parent.entity_type.clone()))
            }
            _ => {
                return Err(StoreError::UnsupportedOperation {
                    relation: relation.name.clone(),
                    operation: "sync_associations",
                }
                .into());
            }
        };

        let mut inner = self.inner.write();
        for child_id in child_ids {
            if !inner
                .entities
                .iter()
                .any(|e| e.id.as_deref() == Some(child_id.as_str()))
            {
                return Err(StoreError::MissingEntity(child_id.clone()).into());
            }
        }

        // Full replacement of the parent's association set for this table.
        inner.joins.retain(|row| {
            !(row.table == join_table
                && row.parent_id == parent_id
                && row.parent_type == parent_type)
        });
        for child_id in child_ids {
            inner.joins.push(JoinRow {
                table: join_table.clone(),
                parent_id: parent_id.clone(),
                child_id: child_id.clone(),
                parent_type: parent_type.clone(),
            });
        }
        debug!(
            "synced {} association(s) on {} for parent {}",
            child_ids.len(),
            join_table,
            parent_id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataType, EntityDef, FieldDef};

    fn test_schema() -> Schema {
        Schema {
            entities: vec![
                EntityDef {
                    name: "Invoice".to_string(),
                    fields: vec![FieldDef {
                        name: "number".to_string(),
                        data_type: DataType::String,
                        required: Some(true),
                    }],
                    relationships: vec![
                        RelationshipDef {
                            name: "lines".to_string(),
                            target: "Line".to_string(),
                            kind: RelationKind::CollectionOwned {
                                foreign_key: "invoice_id".to_string(),
                            },
                        },
                        RelationshipDef {
                            name: "tags".to_string(),
                            target: "Tag".to_string(),
                            kind: RelationKind::ManyToMany {
                                join_table: "invoice_tag".to_string(),
                            },
                        },
                    ],
                    description: None,
                },
                EntityDef {
                    name: "Line".to_string(),
                    fields: vec![],
                    relationships: vec![],
                    description: None,
                },
                EntityDef {
                    name: "Tag".to_string(),
                    fields: vec![],
                    relationships: vec![],
                    description: None,
                },
            ],
            description: None,
        }
    }

    #[tokio::test]
    async fn persist_assigns_identity_once() {
        let store = InMemoryStore::new(test_schema());
        let mut invoice = Entity::new("Invoice");
        invoice.set_field("number", serde_json::json!("INV-1"));

        let id = store.persist(&mut invoice).await.unwrap();
        assert_eq!(invoice.id.as_deref(), Some(id.as_str()));

        let again = store.persist(&mut invoice).await.unwrap();
        assert_eq!(id, again, "persisting twice must not reassign identity");
        assert_eq!(store.entity_count(), 1);
    }

    #[tokio::test]
    async fn persist_rejects_unknown_type_and_missing_required_field() {
        let store = InMemoryStore::new(test_schema());

        let mut stranger = Entity::new("Stranger");
        let err = store.persist(&mut stranger).await.unwrap_err();
        assert!(err.to_string().contains("unknown entity type"));

        let mut invoice = Entity::new("Invoice");
        let err = store.persist(&mut invoice).await.unwrap_err();
        assert!(err.to_string().contains("required field 'number'"));
    }

    #[tokio::test]
    async fn save_owned_sets_foreign_key() {
        let store = InMemoryStore::new(test_schema());
        let schema = store.schema().clone();
        let relation = schema.get_relationship("Invoice", "lines").unwrap();

        let mut invoice = Entity::new("Invoice");
        invoice.set_field("number", serde_json::json!("INV-1"));
        let invoice_id = store.persist(&mut invoice).await.unwrap();

        let mut line = Entity::new("Line");
        store.save_owned(&invoice, relation, &mut line).await.unwrap();

        assert_eq!(line.field_str("invoice_id"), Some(invoice_id.as_str()));
        let related = store.get_related(&invoice, relation).await.unwrap();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].id, line.id);
    }

    #[tokio::test]
    async fn sync_associations_replaces_the_full_set() {
        let store = InMemoryStore::new(test_schema());
        let schema = store.schema().clone();
        let relation = schema.get_relationship("Invoice", "tags").unwrap();

        let mut invoice = Entity::new("Invoice");
        invoice.set_field("number", serde_json::json!("INV-1"));
        store.persist(&mut invoice).await.unwrap();

        let mut tag_a = Entity::new("Tag");
        let mut tag_b = Entity::new("Tag");
        let id_a = store.persist(&mut tag_a).await.unwrap();
        let id_b = store.persist(&mut tag_b).await.unwrap();

        store
            .sync_associations(&invoice, relation, &[id_a.clone(), id_b.clone()])
            .await
            .unwrap();
        assert_eq!(store.association_ids(&invoice, relation), vec![id_a, id_b.clone()]);

        // Re-syncing with a subset drops the rest instead of accumulating.
        store
            .sync_associations(&invoice, relation, &[id_b.clone()])
            .await
            .unwrap();
        assert_eq!(store.association_ids(&invoice, relation), vec![id_b]);
    }

    #[tokio::test]
    async fn owned_and_many_to_many_operations_do_not_cross() {
        let store = InMemoryStore::new(test_schema());
        let schema = store.schema().clone();
        let lines = schema.get_relationship("Invoice", "lines").unwrap();
        let tags = schema.get_relationship("Invoice", "tags").unwrap();

        let mut invoice = Entity::new("Invoice");
        invoice.set_field("number", serde_json::json!("INV-1"));
        store.persist(&mut invoice).await.unwrap();

        let mut tag = Entity::new("Tag");
        store.persist(&mut tag).await.unwrap();

        let err = store
            .save_owned(&invoice, tags, &mut tag)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not support save_owned"));

        let err = store
            .sync_associations(&invoice, lines, &[])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not support sync_associations"));
    }
}
