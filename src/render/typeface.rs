//! Best-effort typeface acquisition.
//!
//! Named families resolve to TTF files in an optional font directory; any
//! failure along that path (no directory, no candidate file, unreadable or
//! unparsable bytes) degrades to a fallback face compiled into the binary.
//! Loading therefore never fails and never blocks a render; a missing
//! decorative font must not stop certificate delivery. Degradations are
//! logged and reported through [`TypefaceSource`] so callers and tests can
//! observe them.
//!
//! Parsed named faces are cached per `(family, weight)` so live-preview
//! renders do not re-read font files on every parameter change. The cache
//! holds font assets, not render results; a config change to another family
//! is a different key and loads fresh.

use crate::config::FontWeight;
use rusttype::Font;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock, Mutex};
use thiserror::Error;
use tracing::{debug, warn};

/// Families offered by the organizer UI. Purely advisory: any family name
/// may be configured, and unknown ones degrade to the fallback face.
pub const KNOWN_FAMILIES: &[&str] = &[
    "Poppins",
    "Montserrat",
    "Times New Roman",
    "Playfair Display",
    "Raleway",
];

static FALLBACK_REGULAR: LazyLock<Arc<Font<'static>>> = LazyLock::new(|| {
    let bytes: &'static [u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
    Arc::new(Font::try_from_bytes(bytes).expect("embedded fallback font must parse"))
});

static FALLBACK_BOLD: LazyLock<Arc<Font<'static>>> = LazyLock::new(|| {
    let bytes: &'static [u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");
    Arc::new(Font::try_from_bytes(bytes).expect("embedded fallback font must parse"))
});

/// Where a resolved typeface came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypefaceSource {
    /// The configured family, loaded from the font directory.
    Named,
    /// The embedded fallback family (DejaVu Sans).
    Fallback,
}

/// A typeface ready for rasterization, always usable.
#[derive(Clone)]
pub struct Typeface {
    font: Arc<Font<'static>>,
    source: TypefaceSource,
}

impl Typeface {
    /// The embedded fallback face for a weight. Cannot fail: the bytes are
    /// compiled into the binary.
    pub fn fallback(weight: FontWeight) -> Self {
        let font = match weight {
            FontWeight::Normal => FALLBACK_REGULAR.clone(),
            FontWeight::Bold => FALLBACK_BOLD.clone(),
        };
        Typeface {
            font,
            source: TypefaceSource::Fallback,
        }
    }

    pub fn font(&self) -> &Font<'static> {
        &self.font
    }

    pub fn source(&self) -> TypefaceSource {
        self.source
    }
}

/// Why a named family could not be used. Never escapes the loader: it is
/// logged and replaced by the fallback face.
#[derive(Error, Debug)]
enum LoadFailure {
    #[error("no font directory configured")]
    NoFontDir,
    #[error("no candidate file for family")]
    NoCandidate,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("file is not a usable TrueType font")]
    Unparsable,
}

/// Resolves named families from a font directory, with caching.
pub struct TypefaceLoader {
    font_dir: Option<PathBuf>,
    cache: Mutex<HashMap<(String, FontWeight), Arc<Font<'static>>>>,
}

impl TypefaceLoader {
    pub fn new(font_dir: Option<PathBuf>) -> Self {
        TypefaceLoader {
            font_dir,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Make `(family, weight)` available to the rasterizer. Infallible:
    /// resolves to the named face when possible, the fallback face otherwise.
    pub async fn load(&self, family: &str, weight: FontWeight) -> Typeface {
        let key = (family.to_string(), weight);
        if let Some(font) = self.cache.lock().unwrap().get(&key) {
            return Typeface {
                font: font.clone(),
                source: TypefaceSource::Named,
            };
        }

        match self.load_named(family, weight).await {
            Ok(font) => {
                debug!(family, weight = %weight, "loaded named typeface");
                self.cache.lock().unwrap().insert(key, font.clone());
                Typeface {
                    font,
                    source: TypefaceSource::Named,
                }
            }
            Err(reason) => {
                warn!(family, weight = %weight, %reason, "typeface unavailable, using fallback face");
                Typeface::fallback(weight)
            }
        }
    }

    async fn load_named(
        &self,
        family: &str,
        weight: FontWeight,
    ) -> Result<Arc<Font<'static>>, LoadFailure> {
        let dir = self.font_dir.as_ref().ok_or(LoadFailure::NoFontDir)?;
        let path = candidate_file_names(family, weight)
            .into_iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
            .ok_or(LoadFailure::NoCandidate)?;
        let bytes = tokio::fs::read(&path).await?;
        let font = Font::try_from_vec(bytes).ok_or(LoadFailure::Unparsable)?;
        Ok(Arc::new(font))
    }
}

/// File names tried for a family and weight, in order.
fn candidate_file_names(family: &str, weight: FontWeight) -> Vec<String> {
    match weight {
        FontWeight::Bold => vec![
            format!("{family}-Bold.ttf"),
            format!("{family} Bold.ttf"),
        ],
        FontWeight::Normal => vec![
            format!("{family}-Regular.ttf"),
            format!("{family}.ttf"),
        ],
    }
}
