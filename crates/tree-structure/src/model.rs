//! Records exchanged with the backend and manipulated by the sorter and the
//! insertion engine.

use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier as it appears on the wire: the backend uses integer primary
/// keys, temporary client-side ids are strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawKey {
    Text(String),
    Int(i64),
}

impl RawKey {
    fn into_string(self) -> String {
        match self {
            RawKey::Text(text) => text,
            RawKey::Int(value) => value.to_string(),
        }
    }
}

/// Numeric keys go back out as numbers so the backend sees the same type it sent.
fn serialize_key<S: Serializer>(key: &str, serializer: S) -> Result<S::Ok, S::Error> {
    match key.parse::<i64>() {
        Ok(value) => serializer.serialize_i64(value),
        Err(_) => serializer.serialize_str(key),
    }
}

macro_rules! define_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value.to_string())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serialize_key(&self.0, serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = Option::<RawKey>::deserialize(deserializer)?;
                Ok(Self(raw.map(RawKey::into_string).unwrap_or_default()))
            }
        }
    };
}

define_key!(
    /// Identifier of a node (a part, an assembly, a generated code)
    NodeKey
);
define_key!(
    /// Identifier of a tree
    TreeKey
);
define_key!(
    /// Identifier of a code prefix
    PrefixKey
);

/// Prefix carried by edge ids minted on the client.
pub const TEMPORARY_ID_PREFIX: &str = "temp_";

/// Identifier of an edge record
///
/// Only `Persisted` ids are sent back to the backend; everything else is
/// written as `""` so the row is created rather than updated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum EdgeId {
    /// Edge built in memory without any id yet
    #[default]
    Unassigned,
    /// Client-side id, unique within one editing session
    Temporary(String),
    /// Id assigned by the backend
    Persisted(String),
}

impl EdgeId {
    /// Temporary id for the `index`-th record of a batch minted at `stamp`
    pub fn temporary(stamp: i64, index: usize) -> Self {
        EdgeId::Temporary(format!("{TEMPORARY_ID_PREFIX}{stamp}_{index}"))
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, EdgeId::Persisted(_))
    }

    /// The wire value, `""` for anything the backend has not assigned
    pub fn as_str(&self) -> &str {
        match self {
            EdgeId::Unassigned => "",
            EdgeId::Temporary(id) => id,
            EdgeId::Persisted(id) => id,
        }
    }
}

impl From<String> for EdgeId {
    fn from(value: String) -> Self {
        if value.is_empty() {
            EdgeId::Unassigned
        } else if value.starts_with(TEMPORARY_ID_PREFIX) {
            EdgeId::Temporary(value)
        } else {
            EdgeId::Persisted(value)
        }
    }
}

impl From<&str> for EdgeId {
    fn from(value: &str) -> Self {
        EdgeId::from(value.to_string())
    }
}

impl Serialize for EdgeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EdgeId::Persisted(id) => serialize_key(id, serializer),
            EdgeId::Unassigned | EdgeId::Temporary(_) => serializer.serialize_str(""),
        }
    }
}

impl<'de> Deserialize<'de> for EdgeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<RawKey>::deserialize(deserializer)?;
        Ok(raw.map(|raw| EdgeId::from(raw.into_string())).unwrap_or_default())
    }
}

/// One parent -> child relationship of a tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    #[serde(default)]
    pub id: EdgeId,
    /// Display label of the child node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `None` marks a root attachment
    #[serde(default)]
    pub parent: Option<NodeKey>,
    pub child: NodeKey,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub tree: TreeKey,
}

impl EdgeRecord {
    /// A root edge for `child`
    pub fn root(child: impl Into<NodeKey>, name: impl Into<String>) -> Self {
        Self {
            child: child.into(),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// An edge attaching `child` under `parent`
    pub fn under(
        parent: impl Into<NodeKey>,
        child: impl Into<NodeKey>,
        name: impl Into<String>,
        level: u32,
    ) -> Self {
        Self {
            parent: Some(parent.into()),
            child: child.into(),
            name: Some(name.into()),
            level,
            ..Default::default()
        }
    }

    /// The display name, empty when the backend did not supply one
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A node as served by `/node/{id}/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub id: NodeKey,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NodeSummary {
    pub fn new(id: impl Into<NodeKey>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }
}

/// Kind of code a prefix mints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum CodeType {
    #[serde(rename = "1")]
    #[display(fmt = "assembly")]
    Assembly,
    #[serde(rename = "2")]
    #[display(fmt = "part")]
    Part,
    #[serde(rename = "3")]
    #[display(fmt = "purchased")]
    Purchased,
}

/// A code prefix as served by `/prefix/{id}/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefix {
    #[serde(default, skip_serializing)]
    pub id: PrefixKey,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub code_type: CodeType,
}

/// Response of `generate_code`: the minted node and its display code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCode {
    pub id: NodeKey,
    #[serde(alias = "name")]
    pub code: String,
}

impl From<GeneratedCode> for NodeSummary {
    fn from(generated: GeneratedCode) -> Self {
        NodeSummary::new(generated.id, generated.code)
    }
}

/// A tree as served by `/tree/{id}/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSummary {
    #[serde(default, skip_serializing)]
    pub id: TreeKey,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Response of `get_root_structure_detail`: every structure of the trees the
/// node roots, with the node itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtreeDetail {
    #[serde(default)]
    pub tree_structures: Vec<EdgeRecord>,
    #[serde(default)]
    pub node: Option<NodeSummary>,
    #[serde(default)]
    pub trees: Vec<TreeSummary>,
    #[serde(default)]
    pub children_count: u32,
}

impl SubtreeDetail {
    /// The edge attaching the subtree to nothing
    pub fn root_edge(&self) -> Option<&EdgeRecord> {
        self.tree_structures.iter().find(|edge| edge.is_root())
    }
}
