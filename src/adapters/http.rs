use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::config::RestConfig;
use crate::core::envelope::remote_error_message;
use crate::domain::ports::{ReadParams, ResourceTransport};
use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::{validate_required_field, validate_url};

/// `ResourceTransport` over HTTP: GET/POST/PUT/DELETE against `host/path`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    host: String,
    username: Option<String>,
    password: Option<String>,
}

impl HttpTransport {
    pub fn new(host: impl Into<String>) -> Result<Self> {
        let host = host.into();
        validate_url("host", &host)?;
        Ok(Self {
            client: Client::new(),
            host: host.trim_end_matches('/').to_string(),
            username: None,
            password: None,
        })
    }

    pub fn from_config(config: &RestConfig) -> Result<Self> {
        let host = validate_required_field("host", &config.host)?;
        validate_url("host", host)?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            host: host.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.host, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.username {
            Some(username) => request.basic_auth(username, self.password.as_deref()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Value> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        tracing::debug!("{} responded with {}", url, status);

        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Some(Value::Null)
        } else {
            serde_json::from_str::<Value>(&text).ok()
        };

        if status.is_success() {
            return match body {
                Some(body) => Ok(body),
                None => Err(AdapterError::HttpStatusError {
                    status: status.as_u16(),
                    url: url.to_string(),
                    body: text,
                }),
            };
        }

        // only a usable error envelope goes back to the adapter as data
        match body {
            Some(body) if remote_error_message(&body).is_some() => Ok(body),
            _ => Err(AdapterError::HttpStatusError {
                status: status.as_u16(),
                url: url.to_string(),
                body: text,
            }),
        }
    }
}

/// Query string for collection reads and bulk removes.
pub fn query_pairs(params: &ReadParams) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if let Some(conditions) = &params.query {
        pairs.push(("query", Value::Object(conditions.clone()).to_string()));
    }
    if let Some(sort) = &params.sort {
        let sort = match sort {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        pairs.push(("sort", sort));
    }
    if let Some(limit) = params.limit {
        pairs.push(("limit", limit.to_string()));
    }
    if let Some(skip) = params.skip {
        pairs.push(("skip", skip.to_string()));
    }
    if params.nocase {
        pairs.push(("nocase", "true".to_string()));
    }
    pairs
}

#[async_trait]
impl ResourceTransport for HttpTransport {
    async fn read(&self, path: &str, params: &ReadParams) -> Result<Value> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);
        let request = self.client.get(&url).query(&query_pairs(params));
        self.send(request, &url).await
    }

    async fn create(&self, path: &str, data: &Value) -> Result<Value> {
        let url = self.url(path);
        tracing::debug!("POST {}", url);
        let request = self.client.post(&url).json(data);
        self.send(request, &url).await
    }

    async fn update(&self, path: &str, data: &Value) -> Result<Value> {
        let url = self.url(path);
        tracing::debug!("PUT {}", url);
        let request = self.client.put(&url).json(data);
        self.send(request, &url).await
    }

    async fn remove(&self, path: &str, params: Option<&ReadParams>) -> Result<Value> {
        let url = self.url(path);
        tracing::debug!("DELETE {}", url);
        let mut request = self.client.delete(&url);
        if let Some(params) = params {
            request = request.query(&query_pairs(params));
        }
        self.send(request, &url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_pairs_skip_unset_options() {
        assert!(query_pairs(&ReadParams::default()).is_empty());
    }

    #[test]
    fn test_query_pairs_encode_json_values() {
        let params = ReadParams {
            query: json!({"active": true}).as_object().cloned(),
            sort: Some(json!({"name": "asc"})),
            limit: Some(10),
            skip: Some(20),
            nocase: true,
        };

        let pairs = query_pairs(&params);

        assert_eq!(
            pairs,
            vec![
                ("query", r#"{"active":true}"#.to_string()),
                ("sort", r#"{"name":"asc"}"#.to_string()),
                ("limit", "10".to_string()),
                ("skip", "20".to_string()),
                ("nocase", "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_host_is_required_and_validated() {
        assert!(HttpTransport::from_config(&RestConfig::default()).is_err());
        assert!(HttpTransport::new("ftp://files.local").is_err());

        let transport = HttpTransport::new("http://api.local/").unwrap();
        assert_eq!(transport.host(), "http://api.local");
        assert_eq!(transport.url("/users/7"), "http://api.local/users/7");
    }
}
