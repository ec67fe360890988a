//! # Certstamp
//!
//! A certificate composition engine. Certstamp stamps a participant's name
//! onto an event's certificate template and packages the result as a PNG
//! image or a single-page PDF, ready to download.
//!
//! # Architecture: Resolve, Compose, Deliver
//!
//! A certificate request moves through three independent stages:
//!
//! ```text
//! 1. Resolve   who?   → eligibility check yields the subject name
//! 2. Compose   what?  → template + typeface load concurrently, name is
//!                       drawn at the configured anchor → RasterSurface
//! 3. Deliver   how?   → the surface is packaged as PNG bytes or a PDF page
//! ```
//!
//! This separation exists for three reasons:
//!
//! - **Access control stays out of rendering**: the compositor only ever sees
//!   a resolved subject name, never credentials or roster data.
//! - **One raster, many containers**: PNG and PDF are serializations of the
//!   same composed surface, so the two downloads are always pixel-identical.
//! - **Testability**: composition is a pure function from decoded inputs to
//!   pixels, so unit tests can assert exact output without network access.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`eligibility`] | Who gets a certificate: free-text names on public events, roster lookups on restricted ones |
//! | [`render`] | The composition pipeline: geometry, typeface loading, template loading, compositing, and the attempt-tracking renderer |
//! | [`export`] | Packages a composed surface as a PNG or single-page PDF download |
//! | [`naming`] | Deterministic `certificate-<subject>.<ext>` download file names |
//! | [`config`] | Event definition loading and validation from TOML |
//!
//! # Design Decisions
//!
//! ## Latest Attempt Wins
//!
//! Render attempts are issued monotonic sequence numbers, and only the most
//! recently issued attempt may publish its result. A stale attempt that
//! finishes late, or finishes *first* while a newer one is still in
//! flight, is discarded without surfacing its pixels or its error. This
//! keeps the visible certificate consistent with the newest inputs no matter
//! how slow an old template fetch turns out to be.
//!
//! ## Typefaces Are Best-Effort, Templates Are Not
//!
//! A missing or unreadable font face falls back to an embedded face and the
//! render proceeds; a missing or undecodable template fails the attempt.
//! The asymmetry is deliberate: a certificate in a substitute typeface is
//! still a certificate, but a name stamped on a blank page is not.
//!
//! ## One Pixel, One Point
//!
//! The PDF page is sized so that one raster pixel equals exactly one PDF
//! point. The certificate fills the page edge to edge with no resampling,
//! and page orientation follows the template's aspect ratio automatically.
//!
//! ## Refusals Are Indistinguishable
//!
//! On restricted events, an identifier that is not on the roster and a
//! roster backend that is down produce the same answer: not eligible. The
//! distinction lives only in the logs, so the download form never becomes
//! an oracle for probing which identifiers exist.

pub mod config;
pub mod eligibility;
pub mod export;
pub mod naming;
pub mod render;

#[cfg(test)]
pub(crate) mod test_helpers;
