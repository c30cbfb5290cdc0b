//! Mermaid ER diagram emission

use super::{ExportError, ExportOptions, ExportResult, ExportedFile, unmappable};
use crate::models::{Cardinality, DataType, Schema};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub type_name: String,
    pub name: String,
    /// `PK`, `FK`, `UK`
    pub keys: Vec<&'static str>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub attributes: Vec<Attribute>,
}

/// `left <left_end>--<right_end> right : "label"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub left: String,
    pub left_end: &'static str,
    pub right_end: &'static str,
    pub right: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    pub entities: Vec<Entity>,
    pub edges: Vec<Edge>,
}

/// Mermaid attribute types are single words; spaces and quotes are dropped.
fn type_word(data_type: &DataType) -> Option<String> {
    if !data_type.is_supported() {
        return None;
    }
    Some(
        data_type
            .name()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '"')
            .collect(),
    )
}

/// Exporter for Mermaid `erDiagram` markup
pub struct MermaidExporter;

impl MermaidExporter {
    pub fn export(&self, schema: &Schema, options: &ExportOptions) -> ExportResult<ExportedFile> {
        let diagram = self.build(schema, options)?;
        Ok(ExportedFile::new("schema.mmd", print(&diagram), "text/plain"))
    }

    pub fn build(&self, schema: &Schema, options: &ExportOptions) -> ExportResult<Diagram> {
        let foreign_keys = schema.foreign_keys();
        let mut entities = Vec::with_capacity(schema.tables.len());

        for table in &schema.tables {
            let mut attributes = Vec::with_capacity(table.columns.len());
            for column in &table.columns {
                let type_name = type_word(&column.data_type).ok_or_else(|| {
                    unmappable("mermaid", &column.data_type, &table.name, &column.name)
                })?;

                let mut keys = Vec::new();
                if column.is_primary_key() {
                    keys.push("PK");
                }
                if foreign_keys
                    .iter()
                    .any(|fk| fk.source_table == table.name && fk.source_column == column.name)
                {
                    keys.push("FK");
                }
                if column.is_unique() && !column.is_primary_key() {
                    keys.push("UK");
                }

                attributes.push(Attribute {
                    type_name,
                    name: column.name.clone(),
                    keys,
                    comment: column.comment.clone().filter(|_| options.include_comments),
                });
            }
            entities.push(Entity {
                name: table.name.clone(),
                attributes,
            });
        }

        let mut edges = Vec::with_capacity(foreign_keys.len());
        for fk in &foreign_keys {
            let source = schema
                .table(&fk.source_table)
                .and_then(|t| t.column(&fk.source_column))
                .ok_or_else(|| {
                    ExportError::InvalidReference(format!(
                        "relationship '{}' points at missing column {}.{}",
                        fk.name, fk.source_table, fk.source_column
                    ))
                })?;
            if schema.table(&fk.target_table).is_none() {
                return Err(ExportError::InvalidReference(format!(
                    "relationship '{}' points at missing table '{}'",
                    fk.name, fk.target_table
                )));
            }

            let (left_end, right_end) = match fk.cardinality {
                Cardinality::ManyToMany => ("}o", "o{"),
                Cardinality::OneToOne if source.is_nullable() => ("|o", "o|"),
                Cardinality::OneToOne => ("||", "o|"),
                Cardinality::OneToMany if source.is_nullable() => ("|o", "o{"),
                Cardinality::OneToMany => ("||", "o{"),
            };
            edges.push(Edge {
                left: fk.target_table.clone(),
                left_end,
                right_end,
                right: fk.source_table.clone(),
                label: fk.name.clone(),
            });
        }

        Ok(Diagram { entities, edges })
    }
}

pub fn print(diagram: &Diagram) -> String {
    let mut out = String::from("erDiagram\n");
    for entity in &diagram.entities {
        out.push_str(&format!("    {} {{\n", entity.name));
        for attribute in &entity.attributes {
            let mut line = format!("        {} {}", attribute.type_name, attribute.name);
            if !attribute.keys.is_empty() {
                line.push(' ');
                line.push_str(&attribute.keys.join(", "));
            }
            if let Some(comment) = &attribute.comment {
                line.push_str(&format!(" \"{}\"", comment.replace('"', "'")));
            }
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str("    }\n");
    }
    for edge in &diagram.edges {
        out.push_str(&format!(
            "    {} {}--{} {} : \"{}\"\n",
            edge.left,
            edge.left_end,
            edge.right_end,
            edge.right,
            edge.label.replace('"', "'")
        ));
    }
    out
}
