use crate::config::DemoConfig;
use crate::model::{
    DataType, Entity, EntityDef, FieldDef, RelationKind, RelationshipDef, Schema,
};
use crate::store::{EntityStore, InMemoryStore};
use anyhow::{anyhow, Result};
use serde_json::json;

fn rel<'a>(schema: &'a Schema, entity: &str, name: &str) -> Result<&'a RelationshipDef> {
    schema
        .get_relationship(entity, name)
        .ok_or_else(|| anyhow!("demo schema is missing {}.{}", entity, name))
}

fn field(name: &str, data_type: DataType, required: bool) -> FieldDef {
    FieldDef {
        name: name.to_string(),
        data_type,
        required: if required { Some(true) } else { None },
    }
}

fn relationship(name: &str, target: &str, kind: RelationKind) -> RelationshipDef {
    RelationshipDef {
        name: name.to_string(),
        target: target.to_string(),
        kind,
    }
}

fn entity_def(name: &str, fields: Vec<FieldDef>, relationships: Vec<RelationshipDef>) -> EntityDef {
    EntityDef {
        name: name.to_string(),
        fields,
        relationships,
        description: None,
    }
}

/// Invoice schema exercising every relationship mechanism: a singular owned
/// summary, a polymorphic singular note, owned lines with nested items,
/// polymorphic owned attachments, plain many-to-many tags and polymorphic
/// many-to-many labels.
pub fn demo_schema() -> Schema {
    Schema {
        entities: vec![
            entity_def(
                "Invoice",
                vec![
                    field("number", DataType::String, true),
                    field("total", DataType::Number, false),
                ],
                vec![
                    relationship(
                        "summary",
                        "Summary",
                        RelationKind::SingularOwned {
                            foreign_key: "invoice_id".to_string(),
                        },
                    ),
                    relationship(
                        "note",
                        "Note",
                        RelationKind::SingularOwnedPolymorphic {
                            foreign_key: "notable_id".to_string(),
                            discriminator: "notable_type".to_string(),
                        },
                    ),
                    relationship(
                        "lines",
                        "Line",
                        RelationKind::CollectionOwned {
                            foreign_key: "invoice_id".to_string(),
                        },
                    ),
                    relationship(
                        "attachments",
                        "Attachment",
                        RelationKind::CollectionOwnedPolymorphic {
                            foreign_key: "attachable_id".to_string(),
                            discriminator: "attachable_type".to_string(),
                        },
                    ),
                    relationship(
                        "tags",
                        "Tag",
                        RelationKind::ManyToMany {
                            join_table: "invoice_tag".to_string(),
                        },
                    ),
                    relationship(
                        "labels",
                        "Label",
                        RelationKind::ManyToManyPolymorphic {
                            join_table: "labelables".to_string(),
                            discriminator: "labelable_type".to_string(),
                        },
                    ),
                ],
            ),
            entity_def(
                "Line",
                vec![
                    field("description", DataType::String, false),
                    field("quantity", DataType::Number, false),
                ],
                vec![relationship(
                    "items",
                    "Item",
                    RelationKind::CollectionOwned {
                        foreign_key: "line_id".to_string(),
                    },
                )],
            ),
            entity_def(
                "Item",
                vec![
                    field("sku", DataType::String, false),
                    field("price", DataType::Number, false),
                ],
                vec![],
            ),
            entity_def("Summary", vec![field("text", DataType::String, false)], vec![]),
            entity_def("Note", vec![field("body", DataType::String, false)], vec![]),
            entity_def(
                "Attachment",
                vec![field("filename", DataType::String, false)],
                vec![],
            ),
            entity_def("Tag", vec![field("name", DataType::String, false)], vec![]),
            entity_def("Label", vec![field("name", DataType::String, false)], vec![]),
        ],
        description: Some("Demo invoice graph".to_string()),
    }
}

/// Seed an invoice with related entities across every relationship kind,
/// sized by the demo config. Returns the persisted root invoice.
pub async fn load_demo_graph(store: &InMemoryStore, demo: &DemoConfig) -> Result<Entity> {
    let schema = store.schema().clone();

    let mut invoice = Entity::new("Invoice");
    invoice.set_field("number", json!("INV-1001"));
    invoice.set_field("total", json!(420));
    store.persist(&mut invoice).await?;

    let summary_rel = rel(&schema, "Invoice", "summary")?;
    let mut summary = Entity::new("Summary");
    summary.set_field("text", json!("Quarterly hosting invoice"));
    store.save_owned(&invoice, summary_rel, &mut summary).await?;

    let note_rel = rel(&schema, "Invoice", "note")?;
    let mut note = Entity::new("Note");
    note.set_field("body", json!("Customer prefers email delivery"));
    store.save_owned(&invoice, note_rel, &mut note).await?;

    let lines_rel = rel(&schema, "Invoice", "lines")?;
    let items_rel = rel(&schema, "Line", "items")?;
    for line_no in 0..demo.lines {
        let mut line = Entity::new("Line");
        line.set_field("description", json!(format!("line {}", line_no + 1)));
        line.set_field("quantity", json!(line_no + 1));
        store.save_owned(&invoice, lines_rel, &mut line).await?;

        for item_no in 0..demo.items_per_line {
            let mut item = Entity::new("Item");
            item.set_field("sku", json!(format!("SKU-{}-{}", line_no + 1, item_no + 1)));
            item.set_field("price", json!(10 * (item_no + 1)));
            store.save_owned(&line, items_rel, &mut item).await?;
        }
    }

    let attachments_rel = rel(&schema, "Invoice", "attachments")?;
    for name in ["terms.pdf", "delivery.pdf"] {
        let mut attachment = Entity::new("Attachment");
        attachment.set_field("filename", json!(name));
        store
            .save_owned(&invoice, attachments_rel, &mut attachment)
            .await?;
    }

    let tags_rel = rel(&schema, "Invoice", "tags")?;
    let mut tag_ids = Vec::new();
    for name in ["hosting", "q3"] {
        let mut tag = Entity::new("Tag");
        tag.set_field("name", json!(name));
        tag_ids.push(store.persist(&mut tag).await?);
    }
    store.sync_associations(&invoice, tags_rel, &tag_ids).await?;

    let labels_rel = rel(&schema, "Invoice", "labels")?;
    let mut label_ids = Vec::new();
    for name in ["priority", "recurring"] {
        let mut label = Entity::new("Label");
        label.set_field("name", json!(name));
        label_ids.push(store.persist(&mut label).await?);
    }
    store
        .sync_associations(&invoice, labels_rel, &label_ids)
        .await?;

    Ok(invoice)
}
