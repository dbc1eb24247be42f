//! Editing session over one tree's structure
//!
//! [`StructureEditor`] is the single owner of the edge list being edited. It
//! keeps two copies: the speculative structure every edit is applied to, and
//! the last structure the backend confirmed. Edits become durable only
//! through [`StructureEditor::persist`]; a failed persist rolls the speculative
//! copy back to the confirmed one.

use crate::error::{Result, StructureError};
use crate::gateway::Gateway;
use crate::insert::{anchor_position, attach_node, attach_subtree, Anchor};
use crate::model::{EdgeRecord, NodeKey, NodeSummary, PrefixKey, TreeKey};
use crate::sort::sort_structure;
use chrono::Utc;
use futures::future::join_all;
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};

/// Name given to edges whose node could not be fetched
pub const UNKNOWN_NODE_NAME: &str = "Unknown Node";
/// Name given to edges whose node has an empty name
pub const UNNAMED_NODE_NAME: &str = "Unnamed Node";

/// Callback invoked with the new structure after every change
pub type Observer = Box<dyn Fn(&[EdgeRecord]) + Send + Sync>;

/// What to attach under an anchor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// A node that already exists on the backend
    ExistingNode(NodeSummary),
    /// A code minted from a prefix just before attaching it
    NewPrefixCode { prefix: PrefixKey },
    /// A node together with every structure rooted at it elsewhere
    Subtree(NodeSummary),
}

pub struct StructureEditor {
    tree: TreeKey,
    structure: Vec<EdgeRecord>,
    committed: Vec<EdgeRecord>,
    observers: Vec<Observer>,
}

impl StructureEditor {
    /// An editor over an empty structure
    pub fn new(tree: impl Into<TreeKey>) -> Self {
        Self {
            tree: tree.into(),
            structure: Vec::new(),
            committed: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// An editor whose confirmed structure is `edges`
    pub fn with_structure(tree: impl Into<TreeKey>, edges: &[EdgeRecord]) -> Self {
        let mut editor = Self::new(tree);
        editor.commit(sort_structure(edges));
        editor
    }

    /// Fetch a tree's structure, name every edge and sort it
    pub async fn load<G: Gateway + ?Sized>(gateway: &G, tree: impl Into<TreeKey>) -> Result<Self> {
        let mut editor = Self::new(tree);
        editor.reload(gateway).await?;
        Ok(editor)
    }

    /// Replace both copies with the backend's current structure
    pub async fn reload<G: Gateway + ?Sized>(&mut self, gateway: &G) -> Result<()> {
        let raw = gateway.fetch_structure(&self.tree).await?;
        info!("Fetched {} edge(s) for tree {}", raw.len(), self.tree);
        let named = name_edges(gateway, raw).await;
        self.commit(sort_structure(&named));
        Ok(())
    }

    pub fn tree(&self) -> &TreeKey {
        &self.tree
    }

    /// The structure as edited, in canonical order
    pub fn structure(&self) -> &[EdgeRecord] {
        &self.structure
    }

    /// The structure last confirmed by the backend
    pub fn committed(&self) -> &[EdgeRecord] {
        &self.committed
    }

    /// True when there are edits the backend has not confirmed
    pub fn is_dirty(&self) -> bool {
        self.structure != self.committed
    }

    /// Anchor on the first edge whose child is `child`
    pub fn anchor_for(&self, child: &NodeKey) -> Option<Anchor> {
        self.structure
            .iter()
            .find(|edge| &edge.child == child)
            .map(Anchor::on)
    }

    pub fn subscribe(&mut self, observer: impl Fn(&[EdgeRecord]) + Send + Sync + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Attach something under `anchor` and re-sort
    ///
    /// The anchor is checked before any gateway call. On error the structure
    /// is left as it was.
    pub async fn attach<G: Gateway + ?Sized>(
        &mut self,
        gateway: &G,
        anchor: &Anchor,
        attachment: Attachment,
    ) -> Result<()> {
        anchor.validate()?;
        anchor_position(&self.structure, anchor)?;

        let updated = match attachment {
            Attachment::ExistingNode(node) => {
                attach_node(&self.structure, anchor, &node, &self.tree)?
            }
            Attachment::NewPrefixCode { prefix } => {
                if prefix.is_empty() {
                    return Err(StructureError::Validation("prefix has no id".into()));
                }
                let generated = gateway.generate_code(&prefix).await?;
                info!("Generated code {} from prefix {}", generated.code, prefix);
                attach_node(&self.structure, anchor, &generated.into(), &self.tree)?
            }
            Attachment::Subtree(node) => {
                if node.id.is_empty() {
                    return Err(StructureError::Validation("node to attach has no id".into()));
                }
                let detail = gateway.fetch_subtree(&node.id).await?;
                let stamp = Utc::now().timestamp_millis();
                attach_subtree(&self.structure, anchor, &node, &detail, &self.tree, stamp)?
            }
        };

        self.replace(sort_structure(&updated));
        Ok(())
    }

    /// Write the edited structure to the backend
    ///
    /// On success the persisted records become the confirmed structure. On
    /// failure the edits are discarded and the error is returned.
    pub async fn persist<G: Gateway + ?Sized>(&mut self, gateway: &G) -> Result<()> {
        match gateway.bulk_persist(&self.tree, &self.structure).await {
            Ok(persisted) => {
                info!("Persisted {} edge(s) for tree {}", persisted.len(), self.tree);
                let named = carry_names(&self.structure, persisted);
                self.commit(sort_structure(&named));
                Ok(())
            }
            Err(err) => {
                warn!("Persisting tree {} failed, rolling back: {}", self.tree, err);
                self.discard();
                Err(err)
            }
        }
    }

    /// Drop unconfirmed edits
    pub fn discard(&mut self) {
        if self.is_dirty() {
            self.replace(self.committed.clone());
        }
    }

    fn commit(&mut self, edges: Vec<EdgeRecord>) {
        self.committed = edges.clone();
        self.replace(edges);
    }

    fn replace(&mut self, edges: Vec<EdgeRecord>) {
        self.structure = edges;
        for observer in &self.observers {
            observer(&self.structure);
        }
    }
}

/// Put node names on edges, one lookup per distinct child
async fn name_edges<G: Gateway + ?Sized>(gateway: &G, edges: Vec<EdgeRecord>) -> Vec<EdgeRecord> {
    let keys: HashSet<&NodeKey> = edges.iter().map(|edge| &edge.child).collect();
    let lookups = keys
        .into_iter()
        .map(|key| async move { (key.clone(), gateway.fetch_node(key).await) });

    let names: HashMap<NodeKey, String> = join_all(lookups)
        .await
        .into_iter()
        .map(|(key, result)| {
            let name = match result {
                Ok(node) if node.name.is_empty() => UNNAMED_NODE_NAME.to_string(),
                Ok(node) => node.name,
                Err(err) => {
                    warn!("Failed to fetch node {}: {}", key, err);
                    UNKNOWN_NODE_NAME.to_string()
                }
            };
            (key, name)
        })
        .collect();
    debug!("Resolved {} node name(s)", names.len());

    edges
        .into_iter()
        .map(|mut edge| {
            if let Some(name) = names.get(&edge.child) {
                edge.name = Some(name.clone());
            }
            edge
        })
        .collect()
}

/// Fill names the backend did not echo back from the edited structure
fn carry_names(edited: &[EdgeRecord], persisted: Vec<EdgeRecord>) -> Vec<EdgeRecord> {
    let names: HashMap<&NodeKey, &str> = edited
        .iter()
        .filter_map(|edge| edge.name.as_deref().map(|name| (&edge.child, name)))
        .collect();

    persisted
        .into_iter()
        .map(|mut edge| {
            if edge.name.as_deref().map_or(true, str::is_empty) {
                edge.name = names.get(&edge.child).map(|name| name.to_string());
            }
            edge
        })
        .collect()
}
