//! Renders the statement tree as PostgreSQL text
//!
//! Identifiers are always double-quoted with embedded quotes doubled, and
//! string literals are single-quoted the same way, so names and comments
//! cannot break out of their position.

use super::ast::{
    AddForeignKey, ColumnDef, CreateIndex, CreatePolicy, CreateTable, QualifiedName, Statement,
};
use crate::models::ReferentialAction;

const INDENT: &str = "    ";

pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn qualified(name: &QualifiedName) -> String {
    format!(
        "{}.{}",
        quote_identifier(&name.schema),
        quote_identifier(&name.name)
    )
}

fn identifier_list(names: &[String]) -> String {
    names
        .iter()
        .map(|n| quote_identifier(n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render statements separated by blank lines, each terminated by `;`.
pub fn print_statements(statements: &[Statement]) -> String {
    statements
        .iter()
        .map(print_statement)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render one statement followed by `;` and a newline.
pub fn print_statement(statement: &Statement) -> String {
    let body = match statement {
        Statement::CreateEnum { name, values } => format!(
            "CREATE TYPE {} AS ENUM ({})",
            qualified(name),
            values
                .iter()
                .map(|v| quote_literal(v))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        Statement::CreateTable(table) => print_create_table(table),
        Statement::AddForeignKey(fk) => print_foreign_key(fk),
        Statement::CreateIndex(index) => print_index(index),
        Statement::EnableRls(table) => {
            format!("ALTER TABLE {} ENABLE ROW LEVEL SECURITY", qualified(table))
        }
        Statement::CreatePolicy(policy) => print_policy(policy),
        Statement::CommentOnTable { table, comment } => format!(
            "COMMENT ON TABLE {} IS {}",
            qualified(table),
            quote_literal(comment)
        ),
        Statement::CommentOnColumn {
            table,
            column,
            comment,
        } => format!(
            "COMMENT ON COLUMN {}.{} IS {}",
            qualified(table),
            quote_identifier(column),
            quote_literal(comment)
        ),
        Statement::DropTable(table) => format!("DROP TABLE IF EXISTS {} CASCADE", qualified(table)),
        Statement::DropType(name) => format!("DROP TYPE IF EXISTS {}", qualified(name)),
    };
    format!("{};\n", body)
}

fn print_column(column: &ColumnDef) -> String {
    let mut def = format!("{} {}", quote_identifier(&column.name), column.sql_type);
    if column.primary_key {
        def.push_str(" PRIMARY KEY");
    } else if column.not_null {
        def.push_str(" NOT NULL");
    }
    if column.unique && !column.primary_key {
        def.push_str(" UNIQUE");
    }
    if let Some(default) = &column.default {
        def.push_str(&format!(" DEFAULT {}", default));
    }
    for check in &column.checks {
        def.push_str(&format!(" CHECK ({})", check));
    }
    def
}

fn print_create_table(table: &CreateTable) -> String {
    let mut lines: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("{}{}", INDENT, print_column(c)))
        .collect();
    if !table.primary_key.is_empty() {
        lines.push(format!(
            "{}PRIMARY KEY ({})",
            INDENT,
            identifier_list(&table.primary_key)
        ));
    }

    format!(
        "CREATE TABLE {}{} (\n{}\n)",
        if table.if_not_exists { "IF NOT EXISTS " } else { "" },
        qualified(&table.name),
        lines.join(",\n")
    )
}

fn print_foreign_key(fk: &AddForeignKey) -> String {
    let mut sql = format!(
        "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
        qualified(&fk.table),
        quote_identifier(&fk.constraint),
        quote_identifier(&fk.column),
        qualified(&fk.references),
        quote_identifier(&fk.referenced_column)
    );
    if fk.on_delete != ReferentialAction::NoAction {
        sql.push_str(&format!(" ON DELETE {}", fk.on_delete.as_sql()));
    }
    if fk.on_update != ReferentialAction::NoAction {
        sql.push_str(&format!(" ON UPDATE {}", fk.on_update.as_sql()));
    }
    sql
}

fn print_index(index: &CreateIndex) -> String {
    let mut sql = String::from("CREATE ");
    if index.unique {
        sql.push_str("UNIQUE ");
    }
    sql.push_str("INDEX ");
    if index.if_not_exists {
        sql.push_str("IF NOT EXISTS ");
    }
    sql.push_str(&format!(
        "{} ON {}",
        quote_identifier(&index.name),
        qualified(&index.table)
    ));
    if let Some(method) = index.method {
        sql.push_str(&format!(" USING {}", method.as_sql()));
    }
    sql.push_str(&format!(" ({})", identifier_list(&index.columns)));
    sql
}

fn print_policy(policy: &CreatePolicy) -> String {
    let roles = if policy.roles.is_empty() {
        "public".to_string()
    } else {
        policy
            .roles
            .iter()
            .map(|r| {
                if r.eq_ignore_ascii_case("public") {
                    "public".to_string()
                } else {
                    quote_identifier(r)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut sql = format!(
        "CREATE POLICY {} ON {}\n{}FOR {}\n{}TO {}",
        quote_identifier(&policy.name),
        qualified(&policy.table),
        INDENT,
        policy.operation.as_sql(),
        INDENT,
        roles
    );
    if let Some(using) = &policy.using {
        sql.push_str(&format!("\n{}USING ({})", INDENT, using));
    }
    if let Some(check) = &policy.with_check {
        sql.push_str(&format!("\n{}WITH CHECK ({})", INDENT, check));
    }
    sql
}
