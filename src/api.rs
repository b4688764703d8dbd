// API client module: a small blocking HTTP client that talks to the
// ptpimg.me upload endpoint. Remote images are fetched here and re-sent as
// ordinary file uploads, so the host only ever sees multipart file parts.

use reqwest::blocking::{multipart, Client, Response};
use reqwest::header::{CONTENT_TYPE, REFERER};
use reqwest::StatusCode;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::config::UploaderConfig;
use crate::error::{UploadError, UploadFailure, UploadResult};
use crate::item::{image_mime_from_header, partition, UploadItem, UploadRequest};

/// One uploaded image as reported by the host, e.g.
/// `{"code": "ulkm79", "ext": "jpg"}`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub code: String,
    pub ext: String,
}

/// Uploads images to the configured host. Holds no state between calls
/// besides its configuration and the connection pool.
pub struct Uploader {
    client: Client,
    config: UploaderConfig,
}

impl Uploader {
    pub fn new(config: UploaderConfig) -> UploadResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Uploader { client, config })
    }

    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    /// Upload every item in order and return all resulting URLs. Items are
    /// classified before the first upload; the batch stops at the first
    /// failing item.
    pub fn upload<S: AsRef<str>>(&self, items: &[S]) -> UploadResult<Vec<String>> {
        let requests = partition(items)?;
        let mut results = Vec::new();
        for request in &requests {
            let urls = match request {
                UploadRequest::File(path) => self.upload_file(path)?,
                UploadRequest::Url(url) => self.upload_url(url)?,
            };
            results.extend(urls);
        }
        Ok(results)
    }

    /// Upload a local image file.
    pub fn upload_file(&self, path: impl AsRef<Path>) -> UploadResult<Vec<String>> {
        let path = path.as_ref();
        let item = UploadItem::from_file(path)?;
        log::info!(
            "Uploading {} ({}, {} bytes)",
            path.display(),
            item.mime_type,
            item.content.len()
        );
        self.send_upload(&item)
    }

    /// Fetch an image URL and upload its body.
    pub fn upload_url(&self, url: &str) -> UploadResult<Vec<String>> {
        // The body download is part of the retried operation, so a reset
        // mid-transfer starts the fetch over.
        let item = self.config.retry.run_while(
            "Fetching image",
            || self.fetch_image(url),
            UploadError::is_retryable,
        )?;
        log::info!(
            "Uploading {} ({}, {} bytes)",
            url,
            item.mime_type,
            item.content.len()
        );
        self.send_upload(&item)
    }

    fn fetch_image(&self, url: &str) -> UploadResult<UploadItem> {
        let res = self.client.get(url).send()?;

        let status = res.status();
        if !status.is_success() {
            return Err(UploadError::not_found(format!(
                "Cannot fetch url {} with error {}",
                url,
                status.as_u16()
            )));
        }

        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        // Reject before downloading the body.
        image_mime_from_header(content_type.as_deref())?;

        let content = res.bytes()?.to_vec();
        UploadItem::from_remote(content, content_type.as_deref())
    }

    fn send_upload(&self, item: &UploadItem) -> UploadResult<Vec<String>> {
        let url = self.config.upload_endpoint();
        log::debug!("POST {} with part {:?}", url, item.filename);

        let res = self.config.retry.run_while(
            "Upload",
            || {
                // A multipart form is consumed by sending, so every attempt
                // gets a fresh one.
                let form = self.build_form(item)?;
                self.client
                    .post(&url)
                    .header(REFERER, self.config.referer())
                    .multipart(form)
                    .send()
                    .map_err(UploadError::from)
            },
            UploadError::is_retryable,
        )?;

        self.handle_response(res)
    }

    fn build_form(&self, item: &UploadItem) -> UploadResult<multipart::Form> {
        Ok(multipart::Form::new()
            .text("api_key", self.config.api_key.clone())
            .part(item.field_name, item.to_part()?))
    }

    fn handle_response(&self, res: Response) -> UploadResult<Vec<String>> {
        let status = res.status();
        let bytes = res.bytes()?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        if status != StatusCode::OK {
            log::debug!("Upload rejected with {}: {}", status, body);
            return Err(UploadFailure::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let images: Vec<UploadedImage> = serde_json::from_slice(&bytes)
            .map_err(|source| UploadFailure::Decode { source, body })?;
        Ok(images
            .iter()
            .map(|image| self.config.image_url(&image.code, &image.ext))
            .collect())
    }
}

/// One-shot upload against the default host.
pub fn upload<S: AsRef<str>>(
    api_key: &str,
    items: &[S],
    timeout: Option<Duration>,
) -> UploadResult<Vec<String>> {
    let config = UploaderConfig::new(api_key).with_timeout(timeout);
    Uploader::new(config)?.upload(items)
}
