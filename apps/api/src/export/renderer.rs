//! Document renderer: a pluggable bridge to whatever turns the
//! preview HTML into a PDF.
//!
//! Default: `HttpDocumentRenderer`, which posts the page to an external
//! rendering service. `AppState` holds an `Arc<dyn DocumentRenderer>`.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::export::ExportOptions;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Render service error (status {status}): {message}")]
    Service { status: u16, message: String },

    #[error("Render service returned an empty document")]
    EmptyDocument,
}

#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Renders a standalone HTML page into the final document bytes.
    async fn render(&self, html: &str, options: &ExportOptions) -> Result<Bytes, RenderError>;

    /// Backend name, for logs.
    fn backend(&self) -> &'static str;
}

#[derive(Debug, Serialize)]
struct RenderRequest<'a> {
    html: &'a str,
    options: &'a ExportOptions,
}

/// Posts `{html, options}` as JSON and takes the response body as the document.
#[derive(Clone)]
pub struct HttpDocumentRenderer {
    client: Client,
    endpoint: String,
}

impl HttpDocumentRenderer {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RenderError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl DocumentRenderer for HttpDocumentRenderer {
    async fn render(&self, html: &str, options: &ExportOptions) -> Result<Bytes, RenderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RenderRequest { html, options })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RenderError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Err(RenderError::EmptyDocument);
        }

        debug!(
            "Render service produced {} bytes for '{}'",
            body.len(),
            options.filename
        );
        Ok(body)
    }

    fn backend(&self) -> &'static str {
        "http"
    }
}
