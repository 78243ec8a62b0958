use crate::logic::{Classifier, RelationPath};
use crate::model::{Entity, Id, RelationKind};
use crate::store::{EntityStore, StoreError};
use anyhow::Result;
use log::debug;
use std::future::Future;
use std::pin::Pin;

/// Deep-duplicates an entity graph: shallow-copies the root, then walks each
/// requested relationship path, shallow-copying every related entity reached
/// along it and re-establishing the edges on the new graph.
///
/// Each entity is persisted before anything references its identity, and
/// every store call completes before the next is issued. The engine opens no
/// transaction and performs no rollback — a store failure midway leaves the
/// entities persisted so far in place and propagates unchanged.
pub struct Replicator<'a> {
    store: &'a dyn EntityStore,
}

impl<'a> Replicator<'a> {
    pub fn new(store: &'a dyn EntityStore) -> Self {
        Self { store }
    }

    /// Duplicate `entity` along with the relationships named by
    /// `relation_paths` (dot notation for nesting, e.g. `lines.items`).
    /// Paths naming relationships the entity does not expose are skipped
    /// without affecting sibling paths.
    pub async fn replicate(&self, entity: &Entity, relation_paths: &[String]) -> Result<Entity> {
        let mut new_entity = self.store.replicate_shallow(entity);
        // Persist first so nested relations have an identity to point at.
        self.store.persist(&mut new_entity).await?;

        for raw in relation_paths {
            let path = RelationPath::parse(raw);
            self.duplicate_relation(entity, &new_entity, path.segments())
                .await?;
        }
        Ok(new_entity)
    }

    /// Duplicate one relationship path from `original` onto `new_entity`.
    /// Boxed because the path recursion re-enters through
    /// `duplicate_related`.
    fn duplicate_relation<'f>(
        &'f self,
        original: &'f Entity,
        new_entity: &'f Entity,
        segments: &'f [String],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'f>> {
        Box::pin(async move {
            let Some((head, rest)) = segments.split_first() else {
                return Ok(());
            };
            let Some(relation) = Classifier::classify(self.store.schema(), original, head) else {
                debug!(
                    "skipping path segment '{}': no such relationship on {}",
                    head, original.entity_type
                );
                return Ok(());
            };

            match relation.kind {
                RelationKind::SingularOwned { .. }
                | RelationKind::SingularOwnedPolymorphic { .. } => {
                    let related = self.store.get_related(original, relation).await?;
                    if let Some(related) = related.into_iter().next() {
                        let mut new_related = self.duplicate_related(&related, rest).await?;
                        self.store
                            .save_owned(new_entity, relation, &mut new_related)
                            .await?;
                    }
                }
                RelationKind::CollectionOwned { .. }
                | RelationKind::CollectionOwnedPolymorphic { .. } => {
                    for related in self.store.get_related(original, relation).await? {
                        let mut new_related = self.duplicate_related(&related, rest).await?;
                        self.store
                            .save_owned(new_entity, relation, &mut new_related)
                            .await?;
                    }
                }
                RelationKind::ManyToMany { .. } | RelationKind::ManyToManyPolymorphic { .. } => {
                    let related = self.store.get_related(original, relation).await?;
                    let mut new_ids: Vec<Id> = Vec::with_capacity(related.len());
                    for related in related {
                        let new_related = self.duplicate_related(&related, rest).await?;
                        let id = new_related.id.clone().ok_or_else(|| {
                            StoreError::MissingIdentity(new_related.entity_type.clone())
                        })?;
                        new_ids.push(id);
                    }
                    self.store
                        .sync_associations(new_entity, relation, &new_ids)
                        .await?;
                }
            }
            Ok(())
        })
    }

    /// Shallow-copy and persist one related entity, then recurse into any
    /// remaining nested segments against the *original* related entity.
    async fn duplicate_related(&self, related: &Entity, nested: &[String]) -> Result<Entity> {
        let mut new_related = self.store.replicate_shallow(related);
        self.store.persist(&mut new_related).await?;
        if !nested.is_empty() {
            self.duplicate_relation(related, &new_related, nested)
                .await?;
        }
        Ok(new_related)
    }
}
