use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tree_structure::{
    EdgeRecord, Gateway, GeneratedCode, NodeKey, NodeSummary, Prefix, PrefixKey, SubtreeDetail,
    TreeKey, TreeSummary,
};
use url::Url;

use crate::config::RemoteConfig;
use crate::error::{RemoteError, Result};

/// A reqwest client bound to the backend's API root
///
/// Implements [`Gateway`] for the structure editor and exposes the node,
/// prefix and tree resources directly.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base: Url,
}

impl HttpGateway {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)?;

        let client = Client::builder().timeout(config.timeout).build()?;
        info!("Using backend at {}", base);

        Ok(Self { client, base })
    }

    /// Absolute url of an API path such as `node/5/`
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    fn subtree_url(&self, node: &NodeKey) -> Result<Url> {
        let mut url = self.endpoint("tree-structure/get_root_structure_detail/")?;
        url.query_pairs_mut().append_pair("node_id", node.as_str());
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        self.fetch(self.client.request(Method::GET, url)).await
    }

    async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<T> {
        self.fetch(self.client.request(method, url).json(body)).await
    }

    async fn delete(&self, url: Url) -> Result<()> {
        let response = self.client.request(Method::DELETE, url).send().await?;
        checked(response).await?;
        Ok(())
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = checked(request.send().await?).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    // Nodes

    pub async fn list_nodes(&self) -> Result<Vec<NodeSummary>> {
        self.get(self.endpoint("node/")?).await
    }

    pub async fn get_node(&self, id: &NodeKey) -> Result<NodeSummary> {
        self.get(self.endpoint(&format!("node/{}/", id))?).await
    }

    pub async fn create_node(&self, name: &str, description: Option<&str>) -> Result<NodeSummary> {
        let body = json!({ "name": name, "description": description });
        self.send(Method::POST, self.endpoint("node/")?, &body).await
    }

    pub async fn update_node(&self, node: &NodeSummary) -> Result<NodeSummary> {
        let url = self.endpoint(&format!("node/{}/", node.id))?;
        let body = json!({ "name": node.name, "description": node.description });
        self.send(Method::PUT, url, &body).await
    }

    pub async fn delete_node(&self, id: &NodeKey) -> Result<()> {
        self.delete(self.endpoint(&format!("node/{}/", id))?).await
    }

    // Prefixes

    pub async fn list_prefixes(&self) -> Result<Vec<Prefix>> {
        self.get(self.endpoint("prefix/")?).await
    }

    pub async fn get_prefix(&self, id: &PrefixKey) -> Result<Prefix> {
        self.get(self.endpoint(&format!("prefix/{}/", id))?).await
    }

    pub async fn create_prefix(&self, prefix: &Prefix) -> Result<Prefix> {
        self.send(Method::POST, self.endpoint("prefix/")?, prefix).await
    }

    pub async fn update_prefix(&self, prefix: &Prefix) -> Result<Prefix> {
        let url = self.endpoint(&format!("prefix/{}/", prefix.id))?;
        self.send(Method::PUT, url, prefix).await
    }

    pub async fn delete_prefix(&self, id: &PrefixKey) -> Result<()> {
        self.delete(self.endpoint(&format!("prefix/{}/", id))?).await
    }

    // Trees

    pub async fn list_trees(&self) -> Result<Vec<TreeSummary>> {
        self.get(self.endpoint("tree/")?).await
    }

    pub async fn get_tree(&self, id: &TreeKey) -> Result<TreeSummary> {
        self.get(self.endpoint(&format!("tree/{}/", id))?).await
    }

    /// The node at level 0 of a tree
    pub async fn get_tree_root(&self, id: &TreeKey) -> Result<NodeSummary> {
        self.get(self.endpoint(&format!("tree/{}/get_root/", id))?).await
    }
}

/// Turn non-success responses into [`RemoteError::Status`]
async fn checked(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(RemoteError::Status { status, url, body })
}

/// Records in a bulk-create response, if the backend sent any
///
/// Some backend revisions answer with the created rows, others with a bare
/// `{"status": "success"}`.
fn persisted_records(response: Value) -> Result<Option<Vec<EdgeRecord>>> {
    match response {
        Value::Array(_) => Ok(Some(serde_json::from_value(response)?)),
        _ => Ok(None),
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn fetch_structure(&self, tree: &TreeKey) -> tree_structure::Result<Vec<EdgeRecord>> {
        let url = self.endpoint(&format!("tree-structure/{}/get_tree_structure/", tree))?;
        Ok(self.get(url).await?)
    }

    async fn fetch_node(&self, node: &NodeKey) -> tree_structure::Result<NodeSummary> {
        Ok(self.get_node(node).await?)
    }

    async fn fetch_subtree(&self, node: &NodeKey) -> tree_structure::Result<SubtreeDetail> {
        let url = self.subtree_url(node)?;
        Ok(self.get(url).await?)
    }

    async fn generate_code(&self, prefix: &PrefixKey) -> tree_structure::Result<GeneratedCode> {
        let url = self.endpoint(&format!("prefix/{}/generate_code/", prefix))?;
        Ok(self.send(Method::POST, url, &json!({})).await?)
    }

    async fn bulk_persist(
        &self,
        tree: &TreeKey,
        edges: &[EdgeRecord],
    ) -> tree_structure::Result<Vec<EdgeRecord>> {
        let url = self.endpoint("tree-structure/bulk_create/")?;
        let response: Value = self.send(Method::POST, url, edges).await?;

        match persisted_records(response)? {
            Some(records) => Ok(records),
            None => {
                debug!("Bulk create for tree {} returned no rows, re-fetching", tree);
                self.fetch_structure(tree).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn gateway(base: &str) -> HttpGateway {
        HttpGateway::new(&RemoteConfig::new(base)).unwrap()
    }

    #[test]
    fn test_endpoint_keeps_api_prefix() {
        let gateway = gateway("http://localhost:8000/api");
        assert_eq!(
            gateway.endpoint("node/5/").unwrap().as_str(),
            "http://localhost:8000/api/node/5/"
        );
        assert_eq!(
            gateway.endpoint("/tree/").unwrap().as_str(),
            "http://localhost:8000/api/tree/"
        );
    }

    #[test]
    fn test_subtree_query() {
        let gateway = gateway("http://backend/api/");
        assert_eq!(
            gateway.subtree_url(&NodeKey::from("42")).unwrap().as_str(),
            "http://backend/api/tree-structure/get_root_structure_detail/?node_id=42"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpGateway::new(&RemoteConfig::new("not a url")).unwrap_err();
        assert!(matches!(err, RemoteError::InvalidUrl(_)));
    }

    #[test]
    fn test_persisted_records() {
        let rows = json!([{"id": 7, "parent": null, "child": 1, "level": 0, "tree": 3}]);
        let records = persisted_records(rows).unwrap().unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].id.is_persisted());

        assert_eq!(persisted_records(json!({"status": "success"})).unwrap(), None);
    }
}
