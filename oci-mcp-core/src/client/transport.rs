//! Signed HTTP transport shared by every service client

use crate::auth::{RequestSigner, sign_request};
use crate::error::{OciMcpError, Result};
use reqwest::header::HeaderMap;
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Request id header sent on every call and echoed in responses
pub const OPC_REQUEST_ID: &str = "opc-request-id";
/// Pagination cursor header
pub const OPC_NEXT_PAGE: &str = "opc-next-page";

/// Query parameters as owned pairs
pub type Query = Vec<(&'static str, String)>;

/// A decoded response
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    /// HTTP status code
    pub status: u16,
    /// Response headers, lower-cased names
    pub headers: BTreeMap<String, String>,
    /// Decoded body
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Next page cursor, if any
    pub fn next_page(&self) -> Option<&str> {
        self.headers
            .get(OPC_NEXT_PAGE)
            .map(String::as_str)
            .filter(|p| !p.is_empty())
    }
}

/// OCI error body
#[derive(Debug, Default, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Signed client bound to one service base URL
#[derive(Clone)]
pub struct OciHttpClient {
    http: reqwest::Client,
    signer: Arc<dyn RequestSigner>,
    base_url: String,
}

impl OciHttpClient {
    /// Bind to `base_url` (endpoint plus API prefix)
    pub fn new(http: reqwest::Client, signer: Arc<dyn RequestSigner>, base_url: String) -> Self {
        Self {
            http,
            signer,
            base_url,
        }
    }

    /// Base URL this client targets
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` and decode the body
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &Query) -> Result<ApiResponse<T>> {
        let builder = self.builder(Method::GET, path, query);
        self.execute(builder).await
    }

    /// POST a JSON body to `path` and decode the response body
    pub async fn post<B, T>(&self, path: &str, query: &Query, body: &B) -> Result<ApiResponse<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body)?;
        let builder = self
            .builder(Method::POST, path, query)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload);
        self.execute(builder).await
    }

    /// POST with an empty body, keeping only status and headers
    pub async fn post_empty(&self, path: &str, query: &Query) -> Result<ApiResponse<()>> {
        let builder = self.builder(Method::POST, path, query);
        let response = self.send(builder).await?;
        let (status, headers) = (response.status().as_u16(), header_map(response.headers()));
        Ok(ApiResponse {
            status,
            headers,
            data: (),
        })
    }

    /// GET every page of a list endpoint, following `opc-next-page`
    pub async fn list_all<T: DeserializeOwned>(&self, path: &str, query: &Query) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page: Option<String> = None;

        loop {
            let mut page_query = query.clone();
            if let Some(token) = &page {
                page_query.push(("page", token.clone()));
            }

            let response: ApiResponse<Vec<T>> = self.get(path, &page_query).await?;
            let next = response.next_page().map(str::to_string);
            items.extend(response.data);

            match next {
                Some(token) => {
                    debug!(path, "Following opc-next-page");
                    page = Some(token);
                }
                None => break,
            }
        }

        Ok(items)
    }

    fn builder(&self, method: Method, path: &str, query: &Query) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .http
            .request(method, url)
            .header("accept", "application/json")
            .header(OPC_REQUEST_ID, uuid::Uuid::new_v4().simple().to_string());
        if !query.is_empty() {
            builder = builder.query(query);
        }
        builder
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let mut request = builder.build()?;
        sign_request(self.signer.as_ref(), &mut request)?;

        debug!(method = %request.method(), url = %request.url(), "OCI request");
        let response = self.http.execute(request).await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let opc_request_id = response
            .headers()
            .get(OPC_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();

        Err(OciMcpError::Service {
            status: status.as_u16(),
            code: body
                .code
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string()),
            message: body.message.unwrap_or(text),
            opc_request_id,
        })
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<ApiResponse<T>> {
        let response = self.send(builder).await?;
        let status = response.status().as_u16();
        let headers = header_map(response.headers());
        let bytes = response.bytes().await?;
        let data = serde_json::from_slice(&bytes)?;
        Ok(ApiResponse {
            status,
            headers,
            data,
        })
    }
}

impl fmt::Debug for OciHttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OciHttpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

/// Percent-encode a path segment such as an OCID or bucket name
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
