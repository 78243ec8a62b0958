use crate::model::{Entity, RelationshipDef, Schema};

pub struct Classifier;

impl Classifier {
    /// Resolve the relationship an entity exposes under `relation_name`.
    ///
    /// `None` covers an entity type absent from the schema as well as a
    /// relationship name the type does not define; both are skip conditions
    /// for the duplication engine, never errors. The returned definition's
    /// `RelationKind` is a closed union, so every resolved relationship has
    /// exactly one of the six recognized kinds.
    pub fn classify<'a>(
        schema: &'a Schema,
        entity: &Entity,
        relation_name: &str,
    ) -> Option<&'a RelationshipDef> {
        schema.get_relationship(&entity.entity_type, relation_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityDef, RelationKind};

    fn schema() -> Schema {
        Schema {
            entities: vec![EntityDef {
                name: "Invoice".to_string(),
                fields: vec![],
                relationships: vec![RelationshipDef {
                    name: "lines".to_string(),
                    target: "Line".to_string(),
                    kind: RelationKind::CollectionOwned {
                        foreign_key: "invoice_id".to_string(),
                    },
                }],
                description: None,
            }],
            description: None,
        }
    }

    #[test]
    fn resolves_known_relationship() {
        let schema = schema();
        let invoice = Entity::new("Invoice");
        let relation = Classifier::classify(&schema, &invoice, "lines").unwrap();
        assert_eq!(relation.target, "Line");
        assert!(!relation.kind.is_singular());
    }

    #[test]
    fn unknown_relation_name_is_not_found() {
        let schema = schema();
        let invoice = Entity::new("Invoice");
        assert!(Classifier::classify(&schema, &invoice, "nonexistent").is_none());
        assert!(Classifier::classify(&schema, &invoice, "").is_none());
    }

    #[test]
    fn unknown_entity_type_is_not_found() {
        let schema = schema();
        let mystery = Entity::new("Mystery");
        assert!(Classifier::classify(&schema, &mystery, "lines").is_none());
    }
}
