//! Object store reached over HTTP with S3-style path addressing:
//! `{endpoint}/{bucket}/{key}` for blobs, `{endpoint}/{bucket}?list-type=2` for listings.

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use std::time::Duration;

use crate::error::{Result, StoreError};
use crate::remote::RemoteObjectStore;

pub struct HttpObjectStore {
    client: Client,
    endpoint: Url,
    bucket: String,
    auth_token: Option<String>,
}

impl HttpObjectStore {
    pub fn new(endpoint: &str, bucket: &str, timeout: Duration, auth_token: Option<String>) -> Result<Self> {
        if bucket.is_empty() {
            return Err(StoreError::Config("Remote bucket name is empty".to_string()));
        }
        let endpoint = Url::parse(endpoint)
            .map_err(|e| StoreError::Config(format!("Invalid remote endpoint {:?}: {}", endpoint, e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(StoreError::Config(format!("Remote endpoint {} cannot hold paths", endpoint)));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint,
            bucket: bucket.to_string(),
            auth_token,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Endpoint with the bucket and, if given, the key appended as percent-encoded segments
    fn url_for(&self, key: Option<&str>) -> Result<Url> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::Config(format!("Remote endpoint {} cannot hold paths", self.endpoint)))?;
            segments.pop_if_empty().push(&self.bucket);
            if let Some(key) = key {
                segments.push(key);
            }
        }
        Ok(url)
    }

    fn bucket_url(&self) -> Result<Url> {
        self.url_for(None)
    }

    fn object_url(&self, key: &str) -> Result<Url> {
        self.url_for(Some(key))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, key: &str) -> Result<reqwest::Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| classify_transport_error(&e, key))?;
        check_status(response.status(), key)?;
        Ok(response)
    }
}

#[async_trait]
impl RemoteObjectStore for HttpObjectStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn upload(&self, key: &str, data: &[u8]) -> Result<()> {
        let request = self
            .client
            .put(self.object_url(key)?)
            .header("Content-Type", "application/octet-stream")
            .body(data.to_vec());
        self.send(request, key).await?;
        info!("Uploaded {} to bucket {} ({} bytes)", key, self.bucket, data.len());
        Ok(())
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>> {
        let response = self.send(self.client.get(self.object_url(key)?), key).await?;
        let content_type = response
            .headers()
            .get("Content-Type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(&e, key))?;
        info!(
            "Downloaded {} from bucket {}. Size: {} bytes, Content-type: {}",
            key,
            self.bucket,
            body.len(),
            content_type
        );
        Ok(body.to_vec())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.send(self.client.delete(self.object_url(key)?), key).await?;
        info!("Deleted {} from bucket {}", key, self.bucket);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>> {
        let request = self.client.get(self.bucket_url()?).query(&[("list-type", "2")]);
        let response = self.send(request, &self.bucket).await?;
        let body = response
            .text()
            .await
            .map_err(|e| classify_transport_error(&e, &self.bucket))?;
        let keys = extract_keys(&body);
        debug!("Files in {}: {:?}", self.bucket, keys);
        Ok(keys)
    }
}

/// Map an HTTP status from the object store onto the error taxonomy.
pub fn check_status(status: StatusCode, key: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    warn!("Remote store answered {} for {}", status, key);
    let err = match status {
        StatusCode::NOT_FOUND => StoreError::NotFound(key.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            StoreError::PermissionDenied(format!("{} ({})", key, status))
        }
        StatusCode::REQUEST_TIMEOUT
        | StatusCode::TOO_MANY_REQUESTS
        | StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => StoreError::TransientFailure(format!("{} ({})", key, status)),
        _ => StoreError::Remote(format!("{} ({})", key, status)),
    };
    Err(err)
}

fn classify_transport_error(err: &reqwest::Error, key: &str) -> StoreError {
    if err.is_timeout() || err.is_connect() {
        StoreError::TransientFailure(format!("{}: {}", key, err))
    } else {
        StoreError::Remote(format!("{}: {}", key, err))
    }
}

/// Pull every `<Key>` value out of a ListObjectsV2 response body.
pub fn extract_keys(xml: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find("<Key>") {
        let after = &rest[start + "<Key>".len()..];
        match after.find("</Key>") {
            Some(end) => {
                keys.push(unescape_xml(&after[..end]));
                rest = &after[end + "</Key>".len()..];
            }
            None => break,
        }
    }
    keys
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::ServerHandle;
    use actix_web::http::{header, Method};
    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[test]
    fn test_status_classification() {
        assert!(check_status(StatusCode::OK, "a.jpg").is_ok());
        assert!(check_status(StatusCode::NO_CONTENT, "a.jpg").is_ok());
        assert!(check_status(StatusCode::NOT_FOUND, "a.jpg").unwrap_err().is_not_found());
        assert!(matches!(
            check_status(StatusCode::FORBIDDEN, "a.jpg"),
            Err(StoreError::PermissionDenied(_))
        ));
        assert!(matches!(
            check_status(StatusCode::UNAUTHORIZED, "a.jpg"),
            Err(StoreError::PermissionDenied(_))
        ));
        assert!(check_status(StatusCode::SERVICE_UNAVAILABLE, "a.jpg").unwrap_err().is_retryable());
        assert!(check_status(StatusCode::TOO_MANY_REQUESTS, "a.jpg").unwrap_err().is_retryable());
        assert!(check_status(StatusCode::GATEWAY_TIMEOUT, "a.jpg").unwrap_err().is_retryable());
        assert!(matches!(
            check_status(StatusCode::BAD_REQUEST, "a.jpg"),
            Err(StoreError::Remote(_))
        ));
        // Server errors that will not go away on retry
        assert!(matches!(
            check_status(StatusCode::NOT_IMPLEMENTED, "a.jpg"),
            Err(StoreError::Remote(_))
        ));
        assert!(matches!(
            check_status(StatusCode::HTTP_VERSION_NOT_SUPPORTED, "a.jpg"),
            Err(StoreError::Remote(_))
        ));
    }

    #[test]
    fn test_extract_keys() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult>
    <Name>proj1-rn</Name>
    <Contents>
        <Key>a.jpg</Key>
        <Size>0</Size>
    </Contents>
    <Contents>
        <Key>tom&amp;jerry.jpeg</Key>
    </Contents>
</ListBucketResult>"#;
        assert_eq!(extract_keys(xml), vec!["a.jpg".to_string(), "tom&jerry.jpeg".to_string()]);
        assert!(extract_keys("<ListBucketResult></ListBucketResult>").is_empty());
        assert!(extract_keys("<Key>truncated").is_empty());
    }

    #[test]
    fn test_urls() {
        let store = HttpObjectStore::new("http://objects:9710/", "proj1-rn", Duration::from_secs(5), None).unwrap();
        assert_eq!(store.bucket(), "proj1-rn");
        assert_eq!(store.object_url("a.jpg").unwrap().as_str(), "http://objects:9710/proj1-rn/a.jpg");
        assert_eq!(store.bucket_url().unwrap().as_str(), "http://objects:9710/proj1-rn");
    }

    #[test]
    fn test_keys_are_single_encoded_segments() {
        let store = HttpObjectStore::new("http://objects:9710", "proj1-rn", Duration::from_secs(5), None).unwrap();

        let url = store.object_url("a?b.jpg").unwrap();
        assert_eq!(url.path(), "/proj1-rn/a%3Fb.jpg");
        assert_eq!(url.query(), None);

        let url = store.object_url("a#b.jpg").unwrap();
        assert_eq!(url.path(), "/proj1-rn/a%23b.jpg");
        assert_eq!(url.fragment(), None);

        assert_eq!(store.object_url("50%.jpg").unwrap().path(), "/proj1-rn/50%25.jpg");
        assert_eq!(store.object_url("a/b.jpg").unwrap().path(), "/proj1-rn/a%2Fb.jpg");
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let result = HttpObjectStore::new("not a url", "proj1-rn", Duration::from_secs(5), None);
        assert!(matches!(result, Err(StoreError::Config(_))));
        let result = HttpObjectStore::new("mailto:objects@example.com", "proj1-rn", Duration::from_secs(5), None);
        assert!(matches!(result, Err(StoreError::Config(_))));
    }

    #[test]
    fn test_empty_bucket_is_rejected() {
        let result = HttpObjectStore::new("http://objects:9710", "", Duration::from_secs(5), None);
        assert!(matches!(result, Err(StoreError::Config(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transient() {
        // Port 9 (discard) is closed on test machines, so the connect fails fast
        let store = HttpObjectStore::new("http://127.0.0.1:9", "proj1-rn", Duration::from_secs(2), None).unwrap();
        let err = store.upload("a.jpg", b"data").await.unwrap_err();
        assert!(err.is_retryable(), "unexpected error: {}", err);
    }

    /// In-process stand-in for the object store: keeps blobs of one bucket and records
    /// every request line it sees
    #[derive(Default)]
    struct FakeBucket {
        blobs: Mutex<BTreeMap<String, Vec<u8>>>,
        requests: Mutex<Vec<String>>,
    }

    async fn fake_object_store(req: HttpRequest, body: web::Bytes, bucket: web::Data<FakeBucket>) -> HttpResponse {
        bucket.requests.lock().unwrap().push(format!("{} {}", req.method(), req.uri()));

        let authorized = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            == Some("Bearer secret");
        if !authorized {
            return HttpResponse::Unauthorized().finish();
        }

        let rest = match req.uri().path().strip_prefix("/proj1-rn") {
            Some(rest) => rest.trim_start_matches('/'),
            None => return HttpResponse::NotFound().finish(),
        };
        let key = urlencoding::decode(rest).unwrap().into_owned();
        let mut blobs = bucket.blobs.lock().unwrap();

        let method = req.method();
        if *method == Method::GET && key.is_empty() {
            let mut xml = String::from("<ListBucketResult><Name>proj1-rn</Name>");
            for key in blobs.keys() {
                xml.push_str(&format!("<Contents><Key>{}</Key></Contents>", key.replace('&', "&amp;")));
            }
            xml.push_str("</ListBucketResult>");
            return HttpResponse::Ok().content_type("application/xml").body(xml);
        }
        if key.is_empty() {
            return HttpResponse::MethodNotAllowed().finish();
        }
        if *method == Method::PUT {
            blobs.insert(key, body.to_vec());
            HttpResponse::Ok().finish()
        } else if *method == Method::GET {
            match blobs.get(&key) {
                Some(data) => HttpResponse::Ok().content_type("image/jpeg").body(data.clone()),
                None => HttpResponse::NotFound().finish(),
            }
        } else if *method == Method::DELETE {
            match blobs.remove(&key) {
                Some(_) => HttpResponse::NoContent().finish(),
                None => HttpResponse::NotFound().finish(),
            }
        } else {
            HttpResponse::MethodNotAllowed().finish()
        }
    }

    fn start_fake_store() -> (web::Data<FakeBucket>, String, ServerHandle) {
        let bucket = web::Data::new(FakeBucket::default());
        let data = bucket.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .default_service(web::to(fake_object_store))
        })
        .workers(1)
        .disable_signals()
        .shutdown_timeout(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let endpoint = format!("http://{}", server.addrs()[0]);
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        (bucket, endpoint, handle)
    }

    #[actix_web::test]
    async fn test_operations_against_live_endpoint() {
        let (bucket, endpoint, handle) = start_fake_store();
        let store = HttpObjectStore::new(&endpoint, "proj1-rn", Duration::from_secs(5), Some("secret".to_string())).unwrap();

        store.upload("a.jpg", b"plain").await.unwrap();
        store.upload("a?b.jpg", b"question").await.unwrap();
        store.upload("a#b.jpg", b"hash").await.unwrap();
        store.upload("50%.jpg", b"percent").await.unwrap();
        store.upload("x&y.jpg", b"ampersand").await.unwrap();

        assert_eq!(store.download("a.jpg").await.unwrap(), b"plain");
        assert_eq!(store.download("a?b.jpg").await.unwrap(), b"question");
        assert_eq!(store.download("a#b.jpg").await.unwrap(), b"hash");
        assert_eq!(store.download("50%.jpg").await.unwrap(), b"percent");

        assert_eq!(
            store.list().await.unwrap(),
            vec!["50%.jpg", "a#b.jpg", "a.jpg", "a?b.jpg", "x&y.jpg"]
        );

        store.delete("a?b.jpg").await.unwrap();
        assert!(store.download("a?b.jpg").await.unwrap_err().is_not_found());
        assert!(store.delete("a?b.jpg").await.unwrap_err().is_not_found());
        // Neighbouring keys are untouched
        assert_eq!(store.download("a.jpg").await.unwrap(), b"plain");

        let requests = bucket.requests.lock().unwrap().clone();
        for expected in [
            "PUT /proj1-rn/a.jpg",
            "PUT /proj1-rn/a%3Fb.jpg",
            "PUT /proj1-rn/a%23b.jpg",
            "PUT /proj1-rn/50%25.jpg",
            "GET /proj1-rn?list-type=2",
            "DELETE /proj1-rn/a%3Fb.jpg",
        ] {
            assert!(requests.iter().any(|r| r == expected), "missing {:?} in {:?}", expected, requests);
        }

        let anonymous = HttpObjectStore::new(&endpoint, "proj1-rn", Duration::from_secs(5), None).unwrap();
        assert!(matches!(
            anonymous.upload("a.jpg", b"data").await,
            Err(StoreError::PermissionDenied(_))
        ));

        handle.stop(false).await;
    }
}
