//! Declarative database schema nodes, one `ModuleSchema` per module file.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSchema {
    pub module: String,
    #[serde(default)]
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub indexes: Vec<Index>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub precision: Option<u32>,
    #[serde(default)]
    pub scale: Option<u32>,
    #[serde(default)]
    pub unsigned: bool,
    #[serde(default)]
    pub identity: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    /// Storage definition besides type, nullability and default.
    pub fn same_definition(&self, other: &Column) -> bool {
        self.length == other.length
            && self.precision == other.precision
            && self.scale == other.scale
            && self.unsigned == other.unsigned
            && self.identity == other.identity
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub reference_id: String,
    #[serde(default = "default_index_type")]
    pub index_type: String,
    #[serde(default)]
    pub columns: Vec<String>,
}

fn default_index_type() -> String {
    "btree".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Constraint {
    Primary {
        reference_id: String,
        columns: Vec<String>,
    },
    Unique {
        reference_id: String,
        columns: Vec<String>,
    },
    Foreign {
        reference_id: String,
        column: String,
        reference_table: String,
        reference_column: String,
        #[serde(default)]
        on_delete: Option<String>,
    },
}

impl Constraint {
    pub fn reference_id(&self) -> &str {
        match self {
            Constraint::Primary { reference_id, .. }
            | Constraint::Unique { reference_id, .. }
            | Constraint::Foreign { reference_id, .. } => reference_id,
        }
    }
}
