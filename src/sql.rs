//! Compiles a [`Snapshot`] into PostgreSQL DDL and a bulk INSERT.
//!
//! The layout of the generated text is fixed so that regenerated files diff
//! cleanly against previously committed ones. Constraint values are emitted in
//! lexicographic order.

use std::{collections::BTreeSet, sync::OnceLock};

use heck::ToSnakeCase;
use itertools::Itertools;
use regex::Regex;

use crate::{
    cli::CompatMode,
    snapshot::{COLUMNS, Snapshot},
};

pub const PRIMARY_KEY: [&str; 5] = ["ECS_Version", "Field_Set", "Field", "Type", "Level"];
pub const CONSTRAINED_COLUMNS: [&str; 3] = ["Type", "Field_Set", "Level"];

// The trailing eight spaces indent the PRIMARY KEY line that follows.
const COLUMN_DEFINITIONS: &str = r#"
        "ECS_Version" character(16) NOT NULL,
        "Indexed" boolean NOT NULL,
        "Field_Set" character(16) NOT NULL,
        "Field" character(96) NOT NULL,
        "Type" character(16) NOT NULL,
        "Level" character(16) NOT NULL,
        "Normalization" character(16),
        "Example" text,
        "Description" text,
        "#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTarget {
    pub schema: String,
    pub table: String,
    pub owner: String,
}

impl TableTarget {
    pub fn new(schema: impl Into<String>, table: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            owner: owner.into(),
        }
    }

    fn qualified(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.table))
    }

    pub fn constraint_name(&self, column: &str) -> String {
        format!(
            "{}_{}_{}_oneof",
            self.schema,
            self.table,
            column.to_snake_case()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSql {
    pub ddl: String,
    pub insert: String,
}

impl CompiledSql {
    pub fn render(&self) -> String {
        format!("{}{}", self.ddl, self.insert)
    }
}

pub fn compile(snapshot: &Snapshot, target: &TableTarget, mode: CompatMode) -> CompiledSql {
    CompiledSql {
        ddl: create_table(snapshot, target, mode),
        insert: insert_rows(snapshot, target, mode),
    }
}

pub fn create_table(snapshot: &Snapshot, target: &TableTarget, mode: CompatMode) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (", target.qualified());
    sql.push_str(COLUMN_DEFINITIONS);
    sql.push_str(&primary_key(&PRIMARY_KEY));
    sql.push(',');
    for (idx, column) in CONSTRAINED_COLUMNS.iter().enumerate() {
        sql.push_str("\n\t");
        sql.push_str(&one_of_constraint(snapshot, target, column, mode));
        if idx < CONSTRAINED_COLUMNS.len() - 1 {
            sql.push(',');
        }
        sql.push('\t');
    }
    sql.push_str("\n\t);\n\n");
    sql.push_str(&format!(
        "ALTER TABLE IF EXISTS {}\n\tOWNER to {};",
        target.qualified(),
        owner_ident(&target.owner)
    ));
    sql
}

fn primary_key(columns: &[&str]) -> String {
    format!(
        "PRIMARY KEY ({})",
        columns.iter().map(|c| quote_ident(c)).join(", ")
    )
}

/// Distinct values of `column` across the snapshot, in lexicographic order.
pub fn constraint_set<'a>(snapshot: &'a Snapshot, column: &str) -> BTreeSet<&'a str> {
    snapshot
        .rows
        .iter()
        .filter_map(|row| row.text(column))
        .collect()
}

fn one_of_constraint(
    snapshot: &Snapshot,
    target: &TableTarget,
    column: &str,
    mode: CompatMode,
) -> String {
    let mut sql = format!(
        "CONSTRAINT {}\n\t\tCHECK (\n\t\t\t{} = ANY (",
        quote_ident(&target.constraint_name(column)),
        quote_ident(column)
    );
    let values = constraint_set(snapshot, column);
    if values.is_empty() {
        sql.push_str("ARRAY[]::bpchar[]))");
        return sql;
    }
    sql.push_str("ARRAY[");
    let items = values
        .iter()
        .map(|value| format!("\n\t\t\t{}::bpchar", quote_literal(value, mode)))
        .join(",");
    sql.push_str(&items);
    sql.push_str("\n\t\t]))");
    sql
}

/// Multi-row INSERT for every row of the snapshot. Empty when there are no rows.
pub fn insert_rows(snapshot: &Snapshot, target: &TableTarget, mode: CompatMode) -> String {
    if snapshot.is_empty() {
        return String::new();
    }
    let mut sql = format!("\n\nINSERT INTO {}\n\t(\n\t\t", target.qualified());
    sql.push_str(&COLUMNS.iter().map(|c| quote_ident(c)).join(", "));
    sql.push_str("\n\t)\n\t\tVALUES\n\t\t");
    let last = snapshot.len() - 1;
    for (idx, row) in snapshot.rows.iter().enumerate() {
        let values = [
            quote_literal(&row.ecs_version, mode),
            bool_literal(row.indexed).to_string(),
            quote_literal(&row.field_set, mode),
            quote_literal(&row.field, mode),
            quote_literal(&row.field_type, mode),
            quote_literal(&row.level, mode),
            nullable_literal(row.normalization.as_deref(), mode),
            nullable_literal(row.example.as_deref(), mode),
            quote_literal(&row.description, mode),
        ];
        sql.push('(');
        sql.push_str(&values.join(", "));
        sql.push(')');
        if idx < last {
            sql.push(',');
        }
        sql.push_str("\n\t\t");
    }
    sql.push(';');
    sql
}

fn bool_literal(value: bool) -> &'static str {
    if value { "'true'" } else { "'false'" }
}

fn nullable_literal(value: Option<&str>, mode: CompatMode) -> String {
    value.map_or_else(|| "NULL".to_string(), |v| quote_literal(v, mode))
}

/// Renders a single-quoted character literal.
///
/// `Strict` doubles embedded apostrophes. `Legacy` strips them, which alters
/// the stored value but matches files generated by earlier tooling.
pub fn quote_literal(value: &str, mode: CompatMode) -> String {
    match mode {
        CompatMode::Strict => format!("'{}'", value.replace('\'', "''")),
        CompatMode::Legacy => format!("'{}'", value.replace('\'', "")),
    }
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn owner_ident(owner: &str) -> String {
    static PLAIN: OnceLock<Regex> = OnceLock::new();
    let plain = PLAIN.get_or_init(|| {
        Regex::new(r"^[a-z_][a-z0-9_$]*$").expect("owner identifier pattern is valid")
    });
    if plain.is_match(owner) {
        owner.to_string()
    } else {
        quote_ident(owner)
    }
}
