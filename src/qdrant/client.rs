//! HTTP client wrapper for interacting with Qdrant.

use crate::config::Config;
use crate::qdrant::types::{
    CollectionParams, Distance, ListCollectionsResponse, Point, QdrantError,
};
use reqwest::{Client, Method, StatusCode};
use serde_json::{Value, json};

/// Lightweight HTTP client for Qdrant operations.
pub struct QdrantService {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
}

impl QdrantService {
    /// Construct a new client from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self, QdrantError> {
        let client = Client::builder().user_agent("rfp-ingest/0.2").build()?;
        let base_url = normalize_base_url(&config.qdrant_url).map_err(QdrantError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            has_api_key = %config
                .qdrant_api_key
                .as_deref()
                .map(|value| !value.is_empty())
                .unwrap_or(false),
            "Initialized Qdrant HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            api_key: config.qdrant_api_key.clone(),
        })
    }

    /// Retrieve the names of all collections present in Qdrant.
    pub async fn list_collections(&self) -> Result<Vec<String>, QdrantError> {
        let response = self.request(Method::GET, "collections")?.send().await?;

        if response.status().is_success() {
            let payload: ListCollectionsResponse = response.json().await?;
            let names = payload
                .result
                .collections
                .into_iter()
                .map(|collection| collection.name)
                .collect();
            Ok(names)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = QdrantError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Failed to list collections");
            Err(error)
        }
    }

    /// Fetch the vector parameters of an existing collection.
    ///
    /// Returns `None` when the collection is missing or its vector config uses
    /// a shape this service does not manage (e.g. named vectors).
    pub async fn collection_params(
        &self,
        collection_name: &str,
    ) -> Result<Option<CollectionParams>, QdrantError> {
        let response = self
            .request(Method::GET, &format!("collections/{collection_name}"))?
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body: Value = response.json().await?;
                Ok(vector_size_from_info(&body).map(|size| CollectionParams { size }))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => {
                let body = response.text().await.unwrap_or_default();
                let error = QdrantError::UnexpectedStatus { status, body };
                tracing::error!(collection = collection_name, error = %error, "Collection info request failed");
                Err(error)
            }
        }
    }

    /// Create a collection with the specified vector size and metric.
    pub async fn create_collection(
        &self,
        collection_name: &str,
        vector_size: u64,
        distance: Distance,
    ) -> Result<(), QdrantError> {
        let body = json!({
            "vectors": {
                "size": vector_size,
                "distance": distance.as_str()
            }
        });

        let response = self
            .request(Method::PUT, &format!("collections/{collection_name}"))?
            .json(&body)
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::debug!(
                collection = collection_name,
                vector_size,
                distance = distance.as_str(),
                "Collection created"
            );
        })
        .await
    }

    /// Upload a batch of points to the given collection.
    pub async fn upsert_points(
        &self,
        collection_name: &str,
        points: Vec<Point>,
    ) -> Result<usize, QdrantError> {
        if points.is_empty() {
            return Ok(0);
        }

        let point_count = points.len();
        let response = self
            .request(
                Method::PUT,
                &format!("collections/{collection_name}/points"),
            )?
            .query(&[("wait", true)])
            .json(&json!({ "points": points }))
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::debug!(
                collection = collection_name,
                points = point_count,
                "Points upserted"
            );
        })
        .await?;

        Ok(point_count)
    }

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, QdrantError> {
        let url = format_endpoint(&self.base_url, path);
        let mut req = self.client.request(method, url);
        if let Some(api_key) = &self.api_key
            && !api_key.is_empty()
        {
            req = req.header("api-key", api_key);
        }
        Ok(req)
    }

    async fn ensure_success<F>(
        &self,
        response: reqwest::Response,
        on_success: F,
    ) -> Result<(), QdrantError>
    where
        F: FnOnce(),
    {
        if response.status().is_success() {
            on_success();
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = QdrantError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Qdrant request failed");
            Err(error)
        }
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

/// Dig the single-vector size out of a collection info response.
fn vector_size_from_info(body: &Value) -> Option<u64> {
    body.get("result")?
        .get("config")?
        .get("params")?
        .get("vectors")?
        .get("size")?
        .as_u64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, Method::PUT, MockServer};
    use reqwest::Client;

    fn service_for(server: &MockServer) -> QdrantService {
        QdrantService {
            client: Client::builder()
                .user_agent("rfp-ingest-test")
                .build()
                .expect("client"),
            base_url: server.base_url(),
            api_key: None,
        }
    }

    #[tokio::test]
    async fn upsert_points_emits_expected_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/collections/demo/points")
                    .query_param("wait", "true")
                    .json_body_partial(
                        r#"{"points": [{"id": "point-1", "vector": [0.5, 0.25]}]}"#,
                    );
                then.status(200)
                    .json_body(json!({"status": "ok", "time": 0.0, "result": {}}));
            })
            .await;

        let service = service_for(&server);
        let points = vec![Point {
            id: "point-1".into(),
            vector: vec![0.5, 0.25],
            payload: json!({"text": "Example", "source": "demo.pdf"}),
        }];

        let count = service
            .upsert_points("demo", points)
            .await
            .expect("upsert request");

        mock.assert();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn upsert_points_skips_network_call_for_empty_batch() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT).path("/collections/demo/points");
                then.status(200);
            })
            .await;

        let service = service_for(&server);
        let count = service
            .upsert_points("demo", Vec::new())
            .await
            .expect("empty upsert");

        assert_eq!(count, 0);
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn list_collections_returns_names() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/collections");
                then.status(200).json_body(json!({
                    "result": {
                        "collections": [{"name": "rfp_documents"}, {"name": "scratch"}]
                    }
                }));
            })
            .await;

        let service = service_for(&server);
        let names = service.list_collections().await.expect("list");
        assert_eq!(names, vec!["rfp_documents".to_string(), "scratch".to_string()]);
    }

    #[tokio::test]
    async fn missing_collection_has_no_params() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/collections/absent");
                then.status(404);
            })
            .await;

        let service = service_for(&server);
        let params = service.collection_params("absent").await.expect("request");
        assert!(params.is_none());
    }

    #[tokio::test]
    async fn collection_params_reads_vector_size() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/collections/demo");
                then.status(200).json_body(json!({
                    "result": {
                        "config": {
                            "params": {
                                "vectors": { "size": 768, "distance": "Cosine" }
                            }
                        }
                    }
                }));
            })
            .await;

        let service = service_for(&server);
        let params = service
            .collection_params("demo")
            .await
            .expect("info request")
            .expect("params present");
        assert_eq!(params.size, 768);
    }

    #[test]
    fn vector_size_tolerates_named_vector_configs() {
        let body = json!({
            "result": {
                "config": {
                    "params": {
                        "vectors": { "dense": { "size": 384, "distance": "Cosine" } }
                    }
                }
            }
        });
        assert_eq!(vector_size_from_info(&body), None);
    }
}
