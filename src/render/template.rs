//! Template acquisition and decoding.
//!
//! A template locator is either an `http(s)://` URL or a local file path
//! (PNG or JPEG, matching what the organizer upload surface accepts). Byte
//! acquisition sits behind [`TemplateFetcher`] so tests can script outcomes
//! and delays without network access; [`HttpFetcher`] is the production
//! implementation.
//!
//! Unlike typeface loading, template failure is fatal to the render attempt:
//! there is no placeholder raster. An empty locator, a failed fetch or read,
//! a non-success HTTP status, and undecodable bytes all surface as
//! [`TemplateError`].

use image::RgbaImage;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("no template configured for this event")]
    MissingTemplate,
    #[error("template fetch failed: {0}")]
    Fetch(String),
    #[error("template source answered HTTP {status}")]
    Status { status: u16 },
    #[error("template bytes are not a decodable image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Byte acquisition for template locators.
#[allow(async_fn_in_trait)]
pub trait TemplateFetcher {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, TemplateError>;
}

/// Production fetcher: HTTP for `http(s)://` locators, filesystem otherwise.
///
/// Network timeouts are the HTTP client's concern; none are imposed here.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        HttpFetcher {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateFetcher for HttpFetcher {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, TemplateError> {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            let response = self
                .client
                .get(locator)
                .send()
                .await
                .map_err(|e| TemplateError::Fetch(e.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                return Err(TemplateError::Status {
                    status: status.as_u16(),
                });
            }
            let bytes = response
                .bytes()
                .await
                .map_err(|e| TemplateError::Fetch(e.to_string()))?;
            Ok(bytes.to_vec())
        } else {
            tokio::fs::read(Path::new(locator))
                .await
                .map_err(|e| TemplateError::Fetch(format!("{locator}: {e}")))
        }
    }
}

/// A decoded template raster with known native pixel dimensions.
pub struct DecodedTemplate {
    image: RgbaImage,
}

impl fmt::Debug for DecodedTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedTemplate")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl DecodedTemplate {
    /// Decode template bytes (PNG or JPEG) into an RGBA raster.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TemplateError> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        Ok(DecodedTemplate { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }
}

/// Acquire and decode the template behind `locator`.
///
/// The empty locator is a valid event state ("no template uploaded yet") but
/// still an error for a render attempt: nothing can be composited.
pub async fn load_template(
    fetcher: &impl TemplateFetcher,
    locator: &str,
) -> Result<DecodedTemplate, TemplateError> {
    let locator = locator.trim();
    if locator.is_empty() {
        return Err(TemplateError::MissingTemplate);
    }
    let bytes = fetcher.fetch(locator).await?;
    let template = DecodedTemplate::from_bytes(&bytes)?;
    debug!(
        locator,
        width = template.width(),
        height = template.height(),
        "decoded template"
    );
    Ok(template)
}
