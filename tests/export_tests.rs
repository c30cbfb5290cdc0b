//! Emission tests across targets

use chrono::{TimeZone, Utc};

use schema_forge::export::sql::reparse_create_tables;
use schema_forge::export::{ExportError, ExportFormat, ExportOptions, emit};
use schema_forge::models::{
    AccessPolicy, Column, DataType, ReferentialAction, Relationship, Schema, Table,
};

fn shop() -> Schema {
    let mut schema = Schema::new("shop");
    schema
        .add_table(Table::new(
            "customers",
            vec![
                Column::new("id", DataType::Uuid)
                    .primary_key()
                    .with_default("gen_random_uuid()"),
                Column::new("email", DataType::Varchar)
                    .with_length(255)
                    .not_null()
                    .unique(),
                Column::new("nickname", DataType::Text),
                Column::new("created_at", DataType::TimestampTz)
                    .not_null()
                    .with_default("now()"),
            ],
        ))
        .unwrap();
    schema
        .add_table(Table::new(
            "orders",
            vec![
                Column::new("id", DataType::Uuid).primary_key(),
                Column::new("customer_id", DataType::Uuid).not_null(),
                Column::new("total", DataType::Numeric).with_precision(10, Some(2)),
                Column::new("quantity", DataType::Integer).not_null(),
                Column::new("shipped", DataType::Boolean),
                Column::new("placed_on", DataType::Date),
                Column::new("extra", DataType::Jsonb),
            ],
        ))
        .unwrap();
    schema
        .add_relationship(
            Relationship::new("orders", "customer_id", "customers", "id")
                .on_delete(ReferentialAction::Cascade),
        )
        .unwrap();
    schema
}

fn options() -> ExportOptions {
    ExportOptions::default().at(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
}

mod sql_tests {
    use super::*;

    #[test]
    fn test_declarative_sql_reparses_to_the_model() {
        let schema = shop();
        let files = emit(&schema, ExportFormat::SqlDeclarative, &options()).unwrap();
        let parsed = reparse_create_tables(&files[0].content).unwrap();
        assert_eq!(parsed.len(), 2);

        for parsed_table in &parsed {
            let table = schema.table(&parsed_table.name).unwrap();
            assert_eq!(parsed_table.columns.len(), table.columns.len());
            for column in &table.columns {
                let reparsed = parsed_table.column(&column.name).unwrap();
                let parsed_type = DataType::parse(&reparsed.data_type);
                assert_eq!(
                    parsed_type.data_type, column.data_type,
                    "{}.{}",
                    table.name, column.name
                );
                assert_eq!(parsed_type.length, column.length);
                assert_eq!(reparsed.nullable, column.is_nullable(), "{}", column.name);
                assert_eq!(reparsed.primary_key, column.is_primary_key());
            }
        }
    }

    #[test]
    fn test_migration_files() {
        let files = emit(&shop(), ExportFormat::SqlMigration, &options()).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].filename, "20240301120000_init_schema.sql");
        assert_eq!(files[1].filename, "20240301120000_init_schema_down.sql");

        let up = &files[0].content;
        assert!(up.contains("BEGIN;"));
        assert!(up.contains("COMMIT;"));
        let customers = up.find("CREATE TABLE \"public\".\"customers\"").unwrap();
        let orders = up.find("CREATE TABLE \"public\".\"orders\"").unwrap();
        let fk = up.find("FOREIGN KEY (\"customer_id\")").unwrap();
        assert!(customers < orders && orders < fk);
        assert!(up.contains("ON DELETE CASCADE"));

        let down = &files[1].content;
        assert!(
            down.find("DROP TABLE IF EXISTS \"public\".\"orders\"").unwrap()
                < down.find("DROP TABLE IF EXISTS \"public\".\"customers\"").unwrap()
        );
    }

    #[test]
    fn test_policies_follow_operation_shape() {
        let mut schema = shop();
        schema
            .add_policy(AccessPolicy::select("orders", "orders_read", "customer_id = auth.uid()"))
            .unwrap();
        schema
            .add_policy(AccessPolicy::insert("orders", "orders_write", "customer_id = auth.uid()"))
            .unwrap();

        let files = emit(
            &schema,
            ExportFormat::SqlDeclarative,
            &options().include_rls(true),
        )
        .unwrap();
        let sql = &files[0].content;
        assert!(sql.contains("ALTER TABLE \"public\".\"orders\" ENABLE ROW LEVEL SECURITY;"));

        let chunk = |name: &str| {
            sql.split(";\n")
                .find(|s| s.contains(&format!("CREATE POLICY \"{}\"", name)))
                .unwrap()
                .to_string()
        };
        let read = chunk("orders_read");
        assert!(read.contains("FOR SELECT"));
        assert!(read.contains("USING (customer_id = auth.uid())"));
        assert!(!read.contains("WITH CHECK"));

        let write = chunk("orders_write");
        assert!(write.contains("FOR INSERT"));
        assert!(write.contains("WITH CHECK (customer_id = auth.uid())"));
        assert!(!write.contains("USING"));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let mut schema = shop();
        schema
            .add_table(Table::new(
                "places",
                vec![
                    Column::new("id", DataType::Uuid).primary_key(),
                    Column::new(
                        "shape",
                        DataType::Other {
                            name: "geometry".into(),
                        },
                    ),
                ],
            ))
            .unwrap();

        for format in [ExportFormat::SqlMigration, ExportFormat::SqlDeclarative] {
            let err = emit(&schema, format, &options()).unwrap_err();
            match err {
                ExportError::UnmappableType { table, column, .. } => {
                    assert_eq!(table, "places");
                    assert_eq!(column, "shape");
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }
}

mod target_tests {
    use super::*;

    #[test]
    fn test_every_target_emits() {
        let schema = shop();
        for format in ExportFormat::all() {
            let files = emit(&schema, format, &options()).unwrap();
            assert!(!files.is_empty(), "{}", format);
            assert!(files.iter().all(|f| !f.content.is_empty()));
        }
    }

    #[test]
    fn test_prisma_relation_fields() {
        let files = emit(&shop(), ExportFormat::Prisma, &options()).unwrap();
        let prisma = &files[0].content;
        assert!(prisma.contains("model Customers {"));
        assert!(prisma.contains("model Orders {"));
        assert!(prisma.contains("onDelete: Cascade"));
        assert!(prisma.contains("@@map(\"orders\")"));
    }

    #[test]
    fn test_typescript_insert_optionality() {
        let files = emit(&shop(), ExportFormat::TypeScript, &options()).unwrap();
        let ts = &files[0].content;
        assert!(ts.contains("export interface CustomersRow {"));
        assert!(ts.contains("export interface CustomersInsert {"));
        assert!(ts.contains("  email: string;"));
        assert!(ts.contains("  id?: string;"));
        assert!(ts.contains("  nickname: string | null;"));
    }

    #[test]
    fn test_mermaid_edges() {
        let files = emit(&shop(), ExportFormat::Mermaid, &options()).unwrap();
        let diagram = &files[0].content;
        assert!(diagram.starts_with("erDiagram"));
        assert!(diagram.contains("customers ||--o{ orders : \"fk_orders_customer_id\""));
    }

    #[test]
    fn test_output_is_deterministic() {
        let schema = shop();
        for format in ExportFormat::all() {
            assert_eq!(
                emit(&schema, format, &options()).unwrap(),
                emit(&schema, format, &options()).unwrap()
            );
        }
    }
}
