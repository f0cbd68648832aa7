//! Node shapes for the XML/LESS configuration families: DI virtual types,
//! XSD grammars, system configuration and LESS stylesheets.

use serde::{Deserialize, Serialize};

pub const GLOBAL_SCOPE: &str = "global";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiConfig {
    pub module: String,
    #[serde(default = "global_scope")]
    pub scope: String,
    #[serde(default)]
    pub virtual_types: Vec<VirtualTypeDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualTypeDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default = "default_shared")]
    pub shared: bool,
}

fn global_scope() -> String {
    GLOBAL_SCOPE.to_string()
}

fn default_shared() -> bool {
    true
}

/// A virtual type as registered: the declaration plus the scope of the file
/// that declared it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualType {
    pub name: String,
    pub type_name: String,
    pub shared: bool,
    pub scope: String,
    pub module: String,
}

impl VirtualType {
    pub fn is_global(&self) -> bool {
        self.scope == GLOBAL_SCOPE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XsdNodeKind {
    Element,
    Attribute,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XsdNode {
    /// Slash separated path from the schema root, attributes prefixed with `@`.
    pub path: String,
    pub kind: XsdNodeKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XsdSchema {
    #[serde(default)]
    pub nodes: Vec<XsdNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub module: String,
    #[serde(default)]
    pub sections: Vec<SystemSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSection {
    pub id: String,
    #[serde(default)]
    pub groups: Vec<SystemGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemGroup {
    pub id: String,
    #[serde(default)]
    pub fields: Vec<SystemField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemField {
    pub id: String,
    #[serde(default, rename = "type")]
    pub field_type: Option<String>,
    #[serde(default)]
    pub show_in_default: bool,
    #[serde(default)]
    pub show_in_website: bool,
    #[serde(default)]
    pub show_in_store: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemNodeKind {
    Section,
    Group,
    Field,
}

/// A flattened section, group or field keyed by its `section/group/field` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemNode {
    pub path: String,
    pub kind: SystemNodeKind,
    pub field_type: Option<String>,
    pub scopes: [bool; 3],
}

impl SystemConfig {
    pub fn nodes(&self) -> Vec<SystemNode> {
        let mut nodes = Vec::new();
        for section in &self.sections {
            nodes.push(SystemNode {
                path: section.id.clone(),
                kind: SystemNodeKind::Section,
                field_type: None,
                scopes: [false; 3],
            });
            for group in &section.groups {
                let group_path = format!("{}/{}", section.id, group.id);
                for field in &group.fields {
                    nodes.push(SystemNode {
                        path: format!("{}/{}", group_path, field.id),
                        kind: SystemNodeKind::Field,
                        field_type: field.field_type.clone(),
                        scopes: [
                            field.show_in_default,
                            field.show_in_website,
                            field.show_in_store,
                        ],
                    });
                }
                nodes.push(SystemNode {
                    path: group_path,
                    kind: SystemNodeKind::Group,
                    field_type: None,
                    scopes: [false; 3],
                });
            }
        }
        nodes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessRuleKind {
    Variable,
    Mixin,
    Import,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessRule {
    pub kind: LessRuleKind,
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessFile {
    #[serde(default)]
    pub rules: Vec<LessRule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_config_flattening() {
        let config = SystemConfig {
            module: "Magento_Catalog".to_string(),
            sections: vec![SystemSection {
                id: "catalog".to_string(),
                groups: vec![SystemGroup {
                    id: "frontend".to_string(),
                    fields: vec![SystemField {
                        id: "list_mode".to_string(),
                        field_type: Some("select".to_string()),
                        show_in_default: true,
                        show_in_website: true,
                        show_in_store: false,
                    }],
                }],
            }],
        };

        let paths: Vec<_> = config.nodes().into_iter().map(|n| n.path).collect();
        assert_eq!(
            paths,
            vec!["catalog", "catalog/frontend/list_mode", "catalog/frontend"]
        );
    }

    #[test]
    fn test_di_defaults_to_global_scope() {
        let json = r#"{"module": "Magento_Store", "virtual_types": [{"name": "A", "type": "B"}]}"#;
        let config: DiConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.scope, GLOBAL_SCOPE);
        assert!(config.virtual_types[0].shared);
    }
}
