//! End-to-end pipeline tests: event definition → eligibility → render →
//! export, exercising the real file-backed fetcher against the fixture
//! event under `fixtures/`.
//!
//! Run with: cargo test --test render_pipeline

use std::path::{Path, PathBuf};

use certstamp::config::{self, AccessMode, EventConfig};
use certstamp::eligibility::{
    EligibilityError, RosterDirectory, SubjectName, resolve_public, resolve_subject,
};
use certstamp::export;
use certstamp::render::{
    HttpFetcher, RasterSurface, RenderOutcome, RenderRequest, Renderer, TemplateError,
    TypefaceLoader, TypefaceSource,
};
use tempfile::TempDir;

fn fixture(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(relative)
}

fn fixture_event(name: &str) -> EventConfig {
    config::load_event_config(&fixture(&format!("fixtures/events/{name}"))).unwrap()
}

fn fixture_roster() -> RosterDirectory {
    RosterDirectory::from_file(&fixture("fixtures/roster.json")).unwrap()
}

async fn render_once(
    event: EventConfig,
    subject: SubjectName,
    font_dir: Option<PathBuf>,
) -> RenderOutcome {
    let renderer = Renderer::new(TypefaceLoader::new(font_dir));
    renderer
        .render(&HttpFetcher::default(), RenderRequest::new(event, subject))
        .await
}

fn surface_of(outcome: RenderOutcome) -> RasterSurface {
    match outcome {
        RenderOutcome::Ready { surface, .. } => surface,
        other => panic!("expected Ready, got {other:?}"),
    }
}

fn media_box_of(pdf_bytes: &[u8]) -> Vec<f32> {
    let doc = lopdf::Document::load_mem(pdf_bytes).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1, "expected a single-page document");
    let page_id = *pages.values().next().unwrap();
    let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
    page.get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|obj| match obj {
            lopdf::Object::Integer(i) => *i as f32,
            lopdf::Object::Real(r) => *r,
            other => panic!("MediaBox entry is not a number: {other:?}"),
        })
        .collect()
}

fn assert_media_box(pdf_bytes: &[u8], width: u32, height: u32) {
    let media_box = media_box_of(pdf_bytes);
    let expected = [0.0, 0.0, width as f32, height as f32];
    for (got, want) in media_box.iter().zip(expected) {
        assert!(
            (got - want).abs() < 0.1,
            "MediaBox {media_box:?} does not match {width}x{height}pt"
        );
    }
}

// =========================================================================
// Public event round trip
// =========================================================================

#[tokio::test]
async fn public_event_round_trip_produces_both_downloads() {
    let event = fixture_event("public.toml");
    assert_eq!(event.mode, AccessMode::Public);

    // Public mode resolves the submitted name without consulting the roster
    let subject = resolve_subject(&fixture_roster(), &event, "  Asha Rao  ")
        .await
        .unwrap();
    assert_eq!(subject.as_str(), "Asha Rao");

    let surface = surface_of(render_once(event, subject.clone(), None).await);
    assert_eq!((surface.width(), surface.height()), (480, 360));

    let png = export::to_png(&surface, subject.as_str()).unwrap();
    assert_eq!(png.file_name, "certificate-Asha-Rao.png");
    assert_eq!(png.media_type, "image/png");
    let decoded = image::load_from_memory(&png.bytes).unwrap().to_rgba8();
    assert_eq!(decoded.as_raw(), surface.as_raw());

    let pdf = export::to_pdf(&surface, subject.as_str()).unwrap();
    assert_eq!(pdf.file_name, "certificate-Asha-Rao.pdf");
    assert_eq!(pdf.media_type, "application/pdf");
    assert!(pdf.bytes.starts_with(b"%PDF"));
    // The fixture template is wider than tall, so the page is landscape
    assert_media_box(&pdf.bytes, 480, 360);
}

// =========================================================================
// Restricted event round trip
// =========================================================================

#[tokio::test]
async fn restricted_event_resolves_the_roster_display_name() {
    let event = fixture_event("restricted.toml");
    assert_eq!(event.mode, AccessMode::Restricted);

    let roster = fixture_roster();
    assert_eq!(roster.event_id(), "aurora-summit-2025");

    let subject = resolve_subject(&roster, &event, "9998887776").await.unwrap();
    assert_eq!(subject.as_str(), "Asha Rao");

    let surface = surface_of(render_once(event, subject.clone(), None).await);
    let png = export::to_png(&surface, subject.as_str()).unwrap();
    assert_eq!(png.file_name, "certificate-Asha-Rao.png");
}

#[tokio::test]
async fn restricted_event_rejects_unknown_identifiers() {
    let event = fixture_event("restricted.toml");
    let err = resolve_subject(&fixture_roster(), &event, "0000000000")
        .await
        .unwrap_err();
    assert_eq!(err, EligibilityError::NotEligible);
}

// =========================================================================
// Template failures
// =========================================================================

#[tokio::test]
async fn missing_template_fails_the_attempt() {
    let event = fixture_event("no-template.toml");
    let subject = resolve_public("Asha Rao").unwrap();
    let outcome = render_once(event, subject, None).await;
    assert!(matches!(
        outcome,
        RenderOutcome::Failed {
            error: TemplateError::MissingTemplate,
            ..
        }
    ));
}

#[tokio::test]
async fn unreadable_template_path_fails_the_attempt() {
    let mut event = fixture_event("public.toml");
    event.template_url = "fixtures/templates/does-not-exist.png".to_string();
    let subject = resolve_public("Asha Rao").unwrap();
    let outcome = render_once(event, subject, None).await;
    assert!(matches!(
        outcome,
        RenderOutcome::Failed {
            error: TemplateError::Fetch(_),
            ..
        }
    ));
}

// =========================================================================
// Determinism
// =========================================================================

#[tokio::test]
async fn repeated_renders_are_byte_identical() {
    let subject = resolve_public("Asha Rao").unwrap();
    let renderer = Renderer::new(TypefaceLoader::new(None));
    let fetcher = HttpFetcher::default();

    // Sequential attempts both commit; each is the latest when it finishes
    let first = surface_of(
        renderer
            .render(
                &fetcher,
                RenderRequest::new(fixture_event("public.toml"), subject.clone()),
            )
            .await,
    );
    let second = surface_of(
        renderer
            .render(
                &fetcher,
                RenderRequest::new(fixture_event("public.toml"), subject.clone()),
            )
            .await,
    );

    assert_eq!(first.as_raw(), second.as_raw());
    let png_a = export::to_png(&first, subject.as_str()).unwrap();
    let png_b = export::to_png(&second, subject.as_str()).unwrap();
    assert_eq!(png_a.bytes, png_b.bytes);
}

// =========================================================================
// Typeface resolution
// =========================================================================

#[tokio::test]
async fn named_font_directory_changes_the_face() {
    // The fixture event asks for Poppins. Without a font directory the
    // embedded bold face steps in; with a directory that carries a
    // Poppins-Bold.ttf (any parseable face will do), the named load wins.
    let fonts = TempDir::new().unwrap();
    std::fs::write(
        fonts.path().join("Poppins-Bold.ttf"),
        include_bytes!("../assets/fonts/DejaVuSans.ttf"),
    )
    .unwrap();

    let subject = resolve_public("Asha Rao").unwrap();
    let fallback_outcome =
        render_once(fixture_event("public.toml"), subject.clone(), None).await;
    let named_outcome = render_once(
        fixture_event("public.toml"),
        subject.clone(),
        Some(fonts.path().to_path_buf()),
    )
    .await;

    let (fallback_surface, named_surface) = match (fallback_outcome, named_outcome) {
        (
            RenderOutcome::Ready {
                surface: a,
                typeface: TypefaceSource::Fallback,
                ..
            },
            RenderOutcome::Ready {
                surface: b,
                typeface: TypefaceSource::Named,
                ..
            },
        ) => (a, b),
        other => panic!("expected fallback then named renders, got {other:?}"),
    };

    // The substitute file is a different face, so the ink pattern differs
    assert_ne!(fallback_surface.as_raw(), named_surface.as_raw());
}

// =========================================================================
// Page geometry with generated templates
// =========================================================================

async fn render_generated_template(width: u32, height: u32) -> RasterSurface {
    let tmp = TempDir::new().unwrap();
    let template_path = tmp.path().join("template.png");
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([236, 240, 244, 255]));
    img.save(&template_path).unwrap();

    let event_path = tmp.path().join("event.toml");
    std::fs::write(
        &event_path,
        format!(
            "event_id = \"workshop-2025\"\ntemplate_url = \"{}\"\nfont_size_px = 24.0\n",
            template_path.display()
        ),
    )
    .unwrap();

    let event = config::load_event_config(&event_path).unwrap();
    let subject = resolve_public("Ravi Kumar").unwrap();
    surface_of(render_once(event, subject, None).await)
}

#[tokio::test]
async fn portrait_template_yields_a_portrait_pdf_page() {
    let surface = render_generated_template(300, 400).await;
    let pdf = export::to_pdf(&surface, "Ravi Kumar").unwrap();
    assert_eq!(pdf.file_name, "certificate-Ravi-Kumar.pdf");
    assert_media_box(&pdf.bytes, 300, 400);
}

#[tokio::test]
async fn landscape_template_yields_a_landscape_pdf_page() {
    let surface = render_generated_template(640, 400).await;
    let pdf = export::to_pdf(&surface, "Ravi Kumar").unwrap();
    assert_media_box(&pdf.bytes, 640, 400);
}
