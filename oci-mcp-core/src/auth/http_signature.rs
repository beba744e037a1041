//! OCI HTTP request signatures
//!
//! Implements the `version="1"` draft-cavage signature scheme used by every
//! OCI REST API: `date`, `(request-target)` and `host` are always signed, and
//! requests with a body also sign `content-length`, `content-type` and
//! `x-content-sha256`.

use super::signer::RequestSigner;
use crate::error::{OciMcpError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, DATE, HOST, HeaderValue};
use reqwest::{Method, Request};
use sha2::{Digest, Sha256};

/// Header carrying the base64 SHA-256 of the request body
pub const X_CONTENT_SHA256: &str = "x-content-sha256";

const GENERIC_HEADERS: [&str; 3] = ["date", "(request-target)", "host"];
const BODY_HEADERS: [&str; 3] = ["content-length", "content-type", X_CONTENT_SHA256];

/// Whether requests with this method carry a signed body
fn signs_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Add the `date`, `host`, body digest and `authorization` headers to `request`
pub fn sign_request(signer: &dyn RequestSigner, request: &mut Request) -> Result<()> {
    if !request.headers().contains_key(DATE) {
        let date = chrono::Utc::now()
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string();
        request.headers_mut().insert(DATE, header_value(&date)?);
    }

    if !request.headers().contains_key(HOST) {
        let host = host_of(request)?;
        request.headers_mut().insert(HOST, header_value(&host)?);
    }

    let mut signed: Vec<&str> = GENERIC_HEADERS.to_vec();

    if signs_body(request.method()) {
        let body: Vec<u8> = request
            .body()
            .and_then(|b| b.as_bytes())
            .map(<[u8]>::to_vec)
            .unwrap_or_default();

        let digest = STANDARD.encode(Sha256::digest(&body));
        let headers = request.headers_mut();
        headers.insert(X_CONTENT_SHA256, header_value(&digest)?);
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        signed.extend(BODY_HEADERS);
    }

    let signing_string = signing_string(request, &signed)?;
    let signature = STANDARD.encode(signer.sign(signing_string.as_bytes())?);

    let authorization = format!(
        "Signature version=\"1\",keyId=\"{}\",algorithm=\"rsa-sha256\",headers=\"{}\",signature=\"{}\"",
        signer.key_id(),
        signed.join(" "),
        signature
    );
    request
        .headers_mut()
        .insert(AUTHORIZATION, header_value(&authorization)?);

    Ok(())
}

/// Newline-joined `name: value` lines in the order of `headers`
pub(crate) fn signing_string(request: &Request, headers: &[&str]) -> Result<String> {
    let mut lines = Vec::with_capacity(headers.len());

    for name in headers {
        let value = if *name == "(request-target)" {
            request_target(request)
        } else {
            request
                .headers()
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .ok_or_else(|| {
                    OciMcpError::Signing(format!("Header '{}' missing from request", name))
                })?
        };
        lines.push(format!("{}: {}", name, value));
    }

    Ok(lines.join("\n"))
}

fn request_target(request: &Request) -> String {
    let url = request.url();
    let method = request.method().as_str().to_lowercase();
    match url.query() {
        Some(query) => format!("{} {}?{}", method, url.path(), query),
        None => format!("{} {}", method, url.path()),
    }
}

fn host_of(request: &Request) -> Result<String> {
    let url = request.url();
    let host = url
        .host_str()
        .ok_or_else(|| OciMcpError::Signing(format!("URL has no host: {}", url)))?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| OciMcpError::Signing(format!("Invalid header value: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records what it was asked to sign
    struct RecordingSigner {
        seen: Mutex<Vec<String>>,
    }

    impl RecordingSigner {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl RequestSigner for RecordingSigner {
        fn key_id(&self) -> String {
            "tenancy/user/fp".to_string()
        }

        fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
            self.seen
                .lock()
                .unwrap()
                .push(String::from_utf8_lossy(message).to_string());
            Ok(b"sig".to_vec())
        }
    }

    fn build(method: Method, url: &str, body: Option<&str>) -> Request {
        let client = reqwest::Client::new();
        let mut builder = client.request(method, url);
        if let Some(body) = body {
            builder = builder.body(body.to_string());
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_get_signs_generic_headers_only() {
        let signer = RecordingSigner::new();
        let mut request = build(
            Method::GET,
            "https://iaas.us-ashburn-1.oraclecloud.com/20160918/instances?compartmentId=ocid1.c",
            None,
        );
        sign_request(&signer, &mut request).unwrap();

        let auth = request.headers()[AUTHORIZATION].to_str().unwrap();
        assert!(auth.starts_with("Signature version=\"1\",keyId=\"tenancy/user/fp\""));
        assert!(auth.contains("algorithm=\"rsa-sha256\""));
        assert!(auth.contains("headers=\"date (request-target) host\""));
        assert!(auth.contains("signature=\"c2ln\""));

        let seen = signer.seen.lock().unwrap();
        let lines: Vec<&str> = seen[0].lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date: "));
        assert!(lines[0].ends_with(" GMT"));
        assert_eq!(
            lines[1],
            "(request-target): get /20160918/instances?compartmentId=ocid1.c"
        );
        assert_eq!(lines[2], "host: iaas.us-ashburn-1.oraclecloud.com");
    }

    #[test]
    fn test_post_signs_body_headers() {
        let signer = RecordingSigner::new();
        let mut request = build(
            Method::POST,
            "http://127.0.0.1:8080/20160918/instances/ocid1.i?action=START",
            Some("{}"),
        );
        sign_request(&signer, &mut request).unwrap();

        let auth = request.headers()[AUTHORIZATION].to_str().unwrap();
        assert!(auth.contains(
            "headers=\"date (request-target) host content-length content-type x-content-sha256\""
        ));
        assert_eq!(request.headers()[CONTENT_LENGTH], "2");
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");

        let expected_digest = STANDARD.encode(Sha256::digest(b"{}"));
        assert_eq!(
            request.headers()[X_CONTENT_SHA256].to_str().unwrap(),
            expected_digest
        );

        let seen = signer.seen.lock().unwrap();
        assert!(seen[0].contains("host: 127.0.0.1:8080"));
        assert!(seen[0].contains("(request-target): post /20160918/instances/ocid1.i?action=START"));
    }

    #[test]
    fn test_post_without_body_hashes_empty_payload() {
        let signer = RecordingSigner::new();
        let mut request = build(Method::POST, "https://example.com/x", None);
        sign_request(&signer, &mut request).unwrap();

        assert_eq!(request.headers()[CONTENT_LENGTH], "0");
        let expected_digest = STANDARD.encode(Sha256::digest(b""));
        assert_eq!(
            request.headers()[X_CONTENT_SHA256].to_str().unwrap(),
            expected_digest
        );
    }
}
