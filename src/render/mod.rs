//! Render orchestration and staleness control.
//!
//! | Step | Module |
//! |---|---|
//! | **Template acquisition** | [`template`] (HTTP/file fetch + decode) |
//! | **Typeface acquisition** | [`typeface`] (named family or embedded fallback) |
//! | **Anchor resolution** | [`geometry`] (pure percentage math) |
//! | **Compositing** | [`compositor`] (template + subject name → surface) |
//!
//! [`Renderer`] drives one attempt end-to-end: both loaders run
//! concurrently, compositing starts once both have settled, and a commit
//! gate enforces the live-preview correctness rule that only the most
//! recently issued attempt may publish its outcome. Every parameter change
//! constructs a fresh [`RenderRequest`]; an in-flight attempt is never
//! patched, only superseded.

pub mod compositor;
pub mod geometry;
pub mod template;
pub mod typeface;

pub use compositor::{INK_COLOR, RasterSurface, compose};
pub use geometry::{Anchor, anchor_point};
pub use template::{DecodedTemplate, HttpFetcher, TemplateError, TemplateFetcher, load_template};
pub use typeface::{KNOWN_FAMILIES, Typeface, TypefaceLoader, TypefaceSource};

use crate::config::EventConfig;
use crate::eligibility::SubjectName;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// One render attempt's inputs, constructed fresh per attempt (preview tick
/// or export click) and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub config: EventConfig,
    pub subject_name: SubjectName,
}

impl RenderRequest {
    pub fn new(config: EventConfig, subject_name: SubjectName) -> Self {
        RenderRequest {
            config,
            subject_name,
        }
    }

    /// An organizer-preview request printing the sample subject name, so
    /// text can be positioned before anyone registers.
    pub fn preview(config: EventConfig) -> Self {
        RenderRequest {
            config,
            subject_name: SubjectName::sample(),
        }
    }
}

/// How a render attempt ended.
#[derive(Debug)]
pub enum RenderOutcome {
    /// The attempt was the latest issued and produced a surface.
    Ready {
        seq: u64,
        surface: RasterSurface,
        /// Which face the subject name was drawn with; `Fallback` means the
        /// configured family could not be loaded (logged, never fatal).
        typeface: TypefaceSource,
    },
    /// The attempt was the latest issued but could not produce a surface.
    Failed { seq: u64, error: TemplateError },
    /// A newer attempt was issued before this one finished; its result
    /// (success or failure alike) was discarded without publishing.
    Superseded { seq: u64 },
}

impl RenderOutcome {
    pub fn seq(&self) -> u64 {
        match self {
            RenderOutcome::Ready { seq, .. }
            | RenderOutcome::Failed { seq, .. }
            | RenderOutcome::Superseded { seq } => *seq,
        }
    }
}

/// Attempt bookkeeping observable by callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererStatus {
    /// Sequence number of the most recently issued attempt.
    pub latest_issued: u64,
    /// Sequence number of the last attempt that published its outcome.
    pub last_committed: u64,
}

/// Orchestrates render attempts under the staleness discipline.
///
/// The renderer owns the typeface loader (its font cache is an asset cache,
/// valid across attempts); the template fetcher is passed per call so
/// drivers and tests control byte acquisition.
pub struct Renderer {
    typefaces: TypefaceLoader,
    issued: AtomicU64,
    committed: AtomicU64,
}

impl Renderer {
    pub fn new(typefaces: TypefaceLoader) -> Self {
        Renderer {
            typefaces,
            issued: AtomicU64::new(0),
            committed: AtomicU64::new(0),
        }
    }

    pub fn status(&self) -> RendererStatus {
        RendererStatus {
            latest_issued: self.issued.load(Ordering::SeqCst),
            last_committed: self.committed.load(Ordering::SeqCst),
        }
    }

    /// Run one render attempt end-to-end.
    ///
    /// Template and typeface loads run concurrently; compositing starts once
    /// both settle. The attempt's outcome is published only if no newer
    /// attempt was issued meanwhile; otherwise it resolves to
    /// [`RenderOutcome::Superseded`] and leaves visible state untouched.
    /// In-flight I/O is never aborted; stale results are simply discarded,
    /// which is sufficient because an attempt has no external side effects
    /// before export.
    pub async fn render(
        &self,
        fetcher: &impl TemplateFetcher,
        request: RenderRequest,
    ) -> RenderOutcome {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let config = &request.config;
        debug!(
            seq,
            subject = %request.subject_name,
            template = %config.template_url,
            "render attempt issued"
        );

        let (template, typeface) = tokio::join!(
            template::load_template(fetcher, &config.template_url),
            self.typefaces.load(&config.font_family, config.font_weight),
        );

        let result = template.map(|template| {
            debug!(seq, phase = "compositing", "loads settled");
            let anchor = geometry::anchor_point(
                template.width(),
                template.height(),
                config.position_x,
                config.position_y,
            );
            compositor::compose(
                &template,
                &typeface,
                config.font_size_px,
                anchor,
                request.subject_name.as_str(),
            )
        });

        // Commit gate: only the newest issued attempt may publish.
        if self.issued.load(Ordering::SeqCst) != seq {
            warn!(seq, "stale render attempt discarded");
            return RenderOutcome::Superseded { seq };
        }
        self.committed.store(seq, Ordering::SeqCst);

        match result {
            Ok(surface) => {
                debug!(
                    seq,
                    phase = "ready",
                    width = surface.width(),
                    height = surface.height(),
                    "render attempt committed"
                );
                RenderOutcome::Ready {
                    seq,
                    surface,
                    typeface: typeface.source(),
                }
            }
            Err(error) => {
                warn!(seq, %error, "render attempt failed");
                RenderOutcome::Failed { seq, error }
            }
        }
    }
}
