use super::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of a class-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
}

impl ClassKind {
    pub fn context(self) -> Context {
        match self {
            ClassKind::Class => Context::Class,
            ClassKind::Interface => Context::Interface,
            ClassKind::Trait => Context::Trait,
        }
    }
}

impl std::fmt::Display for ClassKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassKind::Class => write!(f, "class"),
            ClassKind::Interface => write!(f, "interface"),
            ClassKind::Trait => write!(f, "trait"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Protected,
    #[default]
    Public,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Private => write!(f, "private"),
            Visibility::Protected => write!(f, "protected"),
            Visibility::Public => write!(f, "public"),
        }
    }
}

/// Where a type annotation was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeSource {
    Inline,
    #[serde(alias = "doc")]
    DocBlock,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default = "default_type_source")]
    pub source: TypeSource,
}

fn default_type_source() -> TypeSource {
    TypeSource::Inline
}

impl TypeDecl {
    pub fn inline(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: TypeSource::Inline,
        }
    }

    pub fn doc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: TypeSource::DocBlock,
        }
    }

    /// Type names compared without the leading namespace separator or case.
    pub fn same_type(&self, other: &TypeDecl) -> bool {
        normalize_type(&self.name) == normalize_type(&other.name)
    }
}

fn normalize_type(name: &str) -> String {
    let mut parts: Vec<String> = name
        .split('|')
        .map(|p| p.trim().trim_start_matches('\\').to_lowercase())
        .collect();
    parts.sort();
    parts.join("|")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(default, rename = "type")]
    pub type_decl: Option<TypeDecl>,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub variadic: bool,
}

impl Param {
    pub fn is_optional(&self) -> bool {
        self.default.is_some() || self.variadic
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_api: bool,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default)]
    pub return_type: Option<TypeDecl>,
    #[serde(default)]
    pub throws: Vec<String>,
}

impl Method {
    /// Method names are case-insensitive in PHP.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_api: bool,
    #[serde(default, rename = "type")]
    pub type_decl: Option<TypeDecl>,
    #[serde(default)]
    pub default: Option<String>,
}

impl Property {
    pub fn key(&self) -> String {
        self.name.trim_start_matches('$').to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constant {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub is_api: bool,
    #[serde(default)]
    pub value: Option<String>,
}

impl Constant {
    pub fn key(&self) -> String {
        self.name.clone()
    }
}

/// A class, interface or trait declaration as emitted by the PHP parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassLike {
    pub name: String,
    pub kind: ClassKind,
    #[serde(default)]
    pub is_api: bool,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub uses: Vec<String>,
    #[serde(default)]
    pub methods: Vec<Method>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub constants: Vec<Constant>,
}

impl ClassLike {
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_api: false,
            is_final: false,
            is_abstract: false,
            extends: Vec::new(),
            implements: Vec::new(),
            uses: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            constants: Vec::new(),
        }
    }

    /// Lookup key; class names are case-insensitive.
    pub fn key(&self) -> String {
        name_key(&self.name)
    }

    /// The declared name without a leading separator, as reported.
    pub fn fqn(&self) -> String {
        normalize_name(&self.name)
    }

    /// Classes that can be subclassed by third parties.
    pub fn is_extendable(&self) -> bool {
        self.kind == ClassKind::Class && !self.is_final
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        let name = name.trim_start_matches('$');
        self.properties.iter().find(|p| p.key() == name)
    }

    pub fn constant(&self, name: &str) -> Option<&Constant> {
        self.constants.iter().find(|c| c.name == name)
    }

    /// Names this declaration inherits members from: parents first, then traits.
    pub fn inheritance_sources(&self) -> impl DoubleEndedIterator<Item = &String> {
        self.extends.iter().chain(self.uses.iter())
    }
}

/// Fully-qualified names without a leading separator.
pub fn normalize_name(name: &str) -> String {
    name.trim().trim_start_matches('\\').to_string()
}

/// Case-folded form of a class-like name, for lookups.
pub fn name_key(name: &str) -> String {
    normalize_name(name).to_lowercase()
}

/// Referenced names keyed case-insensitively, keeping the first spelling.
pub fn name_set<'a>(names: impl IntoIterator<Item = &'a String>) -> BTreeMap<String, String> {
    let mut set = BTreeMap::new();
    for name in names {
        set.entry(name_key(name)).or_insert_with(|| normalize_name(name));
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_comparison_ignores_leading_separator_and_union_order() {
        assert!(TypeDecl::inline("\\Foo\\Bar").same_type(&TypeDecl::doc("Foo\\Bar")));
        assert!(TypeDecl::inline("int|string").same_type(&TypeDecl::inline("string|int")));
        assert!(!TypeDecl::inline("int").same_type(&TypeDecl::inline("string")));
    }

    #[test]
    fn test_deserialize_minimal_class() {
        let json = r#"{"name": "\\Vendor\\Foo", "kind": "class", "is_api": true}"#;
        let class: ClassLike = serde_json::from_str(json).unwrap();
        assert_eq!(class.key(), "vendor\\foo");
        assert_eq!(class.fqn(), "Vendor\\Foo");
        assert!(class.is_api);
        assert!(class.methods.is_empty());
        assert!(class.is_extendable());
    }
}
