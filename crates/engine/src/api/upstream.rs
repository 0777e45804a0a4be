//! Client for the arena backend API
//!
//! Every endpoint may answer either with a bare payload or with an envelope
//! `{ "data": ... }`. Bodies go through [`unwrap_envelope`] before decoding.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{DataError, DataResult};

/// Arena backend client
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base}{path}` and return the unwrapped payload.
    ///
    /// 404 maps to `DataError::NotFound`, any other non-success status to
    /// `DataError::Upstream`.
    pub async fn get_payload(&self, path: &str, query: &[(&str, String)]) -> DataResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, ?query, "Fetching from arena API");

        let response = self
            .client
            .get(&url)
            .header("Content-Type", "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DataError::NotFound {
                resource: path.to_string(),
            });
        }
        if !status.is_success() {
            warn!(endpoint = path, status = status.as_u16(), "Arena API request failed");
            return Err(DataError::Upstream {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body: Value = response.json().await.map_err(|e| DataError::Decode {
            endpoint: path.to_string(),
            reason: e.to_string(),
        })?;
        Ok(unwrap_envelope(body))
    }

    /// GET a list endpoint; non-array payloads decode as empty.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> DataResult<Vec<T>> {
        let payload = self.get_payload(path, query).await?;
        Ok(decode_list(path, payload))
    }

    /// GET a single object; 404 and falsy payloads decode as `None`.
    pub async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> DataResult<Option<T>> {
        let payload = match self.get_payload(path, &[]).await {
            Ok(p) => p,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        if !is_truthy(&payload) {
            return Ok(None);
        }
        serde_json::from_value(payload)
            .map(Some)
            .map_err(|e| DataError::Decode {
                endpoint: path.to_string(),
                reason: e.to_string(),
            })
    }
}

/// JavaScript truthiness of a JSON value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// `body.data` when it is truthy, otherwise the whole body.
pub fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) if is_truthy(&data) => data,
            Some(data) => {
                map.insert("data".to_string(), data);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => other,
    }
}

/// Decode each array element, skipping the ones that do not fit `T`.
pub fn decode_list<T: DeserializeOwned>(endpoint: &str, payload: Value) -> Vec<T> {
    let Value::Array(items) = payload else {
        warn!(endpoint, "Arena API returned non-array data");
        return Vec::new();
    };

    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!(endpoint, error = %e, "Skipping malformed item");
                None
            }
        })
        .collect();

    if decoded.len() < total {
        warn!(
            endpoint,
            skipped = total - decoded.len(),
            "Dropped malformed items from arena API"
        );
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_envelope_prefers_truthy_data() {
        let body = json!({ "success": true, "data": [1, 2, 3] });
        assert_eq!(unwrap_envelope(body), json!([1, 2, 3]));
    }

    #[test]
    fn test_unwrap_envelope_falls_back_to_body() {
        assert_eq!(unwrap_envelope(json!([4, 5])), json!([4, 5]));

        let body = json!({ "data": null, "id": "season-2" });
        assert_eq!(unwrap_envelope(body.clone()), body);

        let body = json!({ "data": 0 });
        assert_eq!(unwrap_envelope(body.clone()), body);

        let body = json!({ "id": "gpt-6", "name": "gpt-6" });
        assert_eq!(unwrap_envelope(body.clone()), body);
    }

    #[test]
    fn test_truthiness_matches_javascript() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!(-1.5)));
    }

    #[test]
    fn test_decode_list_skips_malformed_items() {
        #[derive(serde::Deserialize)]
        struct Item {
            id: u32,
        }

        let items: Vec<Item> = decode_list("/x", json!([{ "id": 1 }, { "id": "bad" }, { "id": 3 }]));
        assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 3]);

        let empty: Vec<Item> = decode_list("/x", json!({ "error": "nope" }));
        assert!(empty.is_empty());
    }
}
