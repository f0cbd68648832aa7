use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Declaration category a difference belongs to.
///
/// `Custom` carries contexts introduced by callers (an extra XML dialect,
/// for instance) that the report must accept without knowing them upfront.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Context {
    Class,
    Interface,
    Trait,
    Database,
    Di,
    Xsd,
    System,
    Less,
    Custom(String),
}

impl Context {
    pub fn as_str(&self) -> &str {
        match self {
            Context::Class => "class",
            Context::Interface => "interface",
            Context::Trait => "trait",
            Context::Database => "database",
            Context::Di => "di",
            Context::Xsd => "xsd",
            Context::System => "system",
            Context::Less => "less",
            Context::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Context {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "class" => Context::Class,
            "interface" => Context::Interface,
            "trait" => Context::Trait,
            "database" | "db_schema" => Context::Database,
            "di" => Context::Di,
            "xsd" => Context::Xsd,
            "system" => Context::System,
            "less" => Context::Less,
            _ => Context::Custom(s.to_string()),
        }
    }
}

impl Serialize for Context {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Context {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Context::from(raw.as_str()))
    }
}
