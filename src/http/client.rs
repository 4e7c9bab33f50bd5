//! JSON REST client bound to a single API root.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{CONNECTION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use super::config::ClientConfig;
use super::error::{RestLibError, is_distinguished_status};

/// The GET/POST contract offered by [`RestClient`].
///
/// `response` is only written when the server answers 2xx with a non-empty
/// body. A 429 or 403 answer fails with [`RestLibError`]; any other non-2xx
/// answer fails with an error whose message is the raw response body.
#[async_trait]
pub trait RestApi: Send + Sync {
    async fn get<T>(
        &self,
        resource: &str,
        response: &mut T,
        query: Option<&HashMap<String, String>>,
        headers: Option<&HashMap<String, String>>,
    ) -> Result<()>
    where
        T: DeserializeOwned + Send;

    async fn post<B, T>(
        &self,
        resource: &str,
        body: &B,
        response: &mut T,
        headers: Option<&HashMap<String, String>>,
    ) -> Result<()>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send;
}

/// REST client that prefixes every resource with a fixed root URL.
///
/// Cloning is cheap and clones share the connection pool.
#[derive(Clone, Debug)]
pub struct RestClient {
    api_root_url: String,
    config: ClientConfig,
    client: Client,
}

impl RestClient {
    /// Creates a client with the default transport settings.
    ///
    /// The root URL is not validated here; a malformed one fails each request.
    pub fn new(api_root_url: impl Into<String>) -> Result<Self> {
        Self::with_config(api_root_url, ClientConfig::default())
    }

    /// Creates a client with the given transport settings.
    pub fn with_config(api_root_url: impl Into<String>, config: ClientConfig) -> Result<Self> {
        let client = config.build_client()?;
        Ok(Self {
            api_root_url: api_root_url.into(),
            config,
            client,
        })
    }

    /// Returns the root URL prepended to every resource.
    pub fn root_url(&self) -> &str {
        &self.api_root_url
    }

    /// Returns the transport settings the client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, resource: &str) -> Result<Url> {
        let endpoint = format!("{}{}", self.api_root_url, resource);
        Url::parse(&endpoint).with_context(|| format!("Invalid request URL: {}", endpoint))
    }

    /// Sends the request on a single-use connection and classifies the response.
    async fn process_response<T>(&self, request: RequestBuilder, response_obj: &mut T) -> Result<()>
    where
        T: DeserializeOwned + Send,
    {
        let mut request = request.build().context("Failed to build request")?;
        request
            .headers_mut()
            .insert(CONNECTION, HeaderValue::from_static("close"));

        let method = request.method().clone();
        let url = request.url().clone();

        let response = self
            .client
            .execute(request)
            .await
            .with_context(|| format!("Failed to send {} request to {}", method, url))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body: {} {}", method, url))?;

        if !status.is_success() {
            if is_distinguished_status(status) {
                warn!("{} {} was refused with {}", method, url, status);
                return Err(RestLibError::from_status(status).into());
            }
            let text = String::from_utf8_lossy(&body).into_owned();
            warn!("{} {} returned {}: {}", method, url, status, text);
            return Err(anyhow::Error::msg(text));
        }

        if body.is_empty() {
            debug!("{} {} returned an empty body", method, url);
            return Ok(());
        }

        match serde_json::from_slice(&body) {
            Ok(decoded) => {
                *response_obj = decoded;
                Ok(())
            }
            Err(e) => {
                warn!("{} {} returned an undecodable body: {}", method, url, e);
                Err(anyhow::Error::from(e)
                    .context(format!("Failed to parse JSON response from {} {}", method, url)))
            }
        }
    }
}

#[async_trait]
impl RestApi for RestClient {
    #[tracing::instrument(skip(self, response, query, headers))]
    async fn get<T>(
        &self,
        resource: &str,
        response: &mut T,
        query: Option<&HashMap<String, String>>,
        headers: Option<&HashMap<String, String>>,
    ) -> Result<()>
    where
        T: DeserializeOwned + Send,
    {
        let mut url = self.endpoint(resource)?;
        merge_query(&mut url, query);

        debug!("GET {} with query {:?}", url, query);

        let mut request = self.client.get(url);
        if let Some(headers) = headers {
            request = set_headers(request, headers)?;
        }

        self.process_response(request, response).await
    }

    #[tracing::instrument(skip(self, body, response, headers))]
    async fn post<B, T>(
        &self,
        resource: &str,
        body: &B,
        response: &mut T,
        headers: Option<&HashMap<String, String>>,
    ) -> Result<()>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send,
    {
        let payload = serde_json::to_vec(body)
            .with_context(|| format!("Failed to serialize request body for {}", resource))?;
        let url = self.endpoint(resource)?;

        debug!("POST {} with {} byte body", url, payload.len());

        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload);
        if let Some(headers) = headers {
            request = set_headers(request, headers)?;
        }

        self.process_response(request, response).await
    }
}

/// Applies `headers` to the request, replacing any value already set for
/// the same name.
pub fn set_headers(
    request: RequestBuilder,
    headers: &HashMap<String, String>,
) -> Result<RequestBuilder> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .with_context(|| format!("Invalid header name: {:?}", key))?;
        let value = HeaderValue::from_str(value)
            .with_context(|| format!("Invalid value for header {}", key))?;
        map.insert(name, value);
    }
    Ok(request.headers(map))
}

/// Merges `query` into any query already on `url` and re-encodes the whole
/// string sorted by key. Values sharing a key keep their relative order.
fn merge_query(url: &mut Url, query: Option<&HashMap<String, String>>) {
    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    if let Some(query) = query {
        pairs.extend(query.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    if pairs.is_empty() {
        url.set_query(None);
        return;
    }

    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    url.query_pairs_mut().clear().extend_pairs(pairs);
}
