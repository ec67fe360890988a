use certstamp::render::{
    HttpFetcher, RasterSurface, RenderOutcome, RenderRequest, Renderer, TypefaceLoader,
    TypefaceSource,
};
use certstamp::{config, eligibility, export};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that compose a certificate.
#[derive(clap::Args, Clone)]
struct ComposeArgs {
    /// Event definition TOML file
    #[arg(long)]
    event: PathBuf,

    /// Directory searched for named font files (e.g. Poppins-Bold.ttf)
    #[arg(long)]
    font_dir: Option<PathBuf>,
}

#[derive(clap::Args)]
struct RenderArgs {
    #[command(flatten)]
    compose: ComposeArgs,

    /// Participant name to print (public events)
    #[arg(long)]
    name: Option<String>,

    /// Registration identifier to look up (restricted events)
    #[arg(long)]
    identifier: Option<String>,

    /// Participant roster JSON file (restricted events)
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Which download to write
    #[arg(long, value_enum, default_value_t = Format::Png)]
    format: Format,
}

#[derive(ValueEnum, Clone, Copy, PartialEq, Eq)]
enum Format {
    Png,
    Pdf,
    Both,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "certstamp")]
#[command(about = "Compose and deliver event certificates")]
#[command(long_about = "\
Compose and deliver event certificates

An event definition supplies the certificate template, the typeface, and
where the participant's name sits. Certstamp stamps a name onto the template
and writes the result as a PNG image, a single-page PDF, or both.

Event definition (TOML):

  event_id     = \"aurora-summit-2025\"          # identifies the event roster
  template_url = \"https://example.com/cert.png\" # http(s) URL or local path
  mode         = \"public\"                      # \"public\" or \"restricted\"
  font_family  = \"Poppins\"                     # looked up in --font-dir
  font_weight  = \"bold\"
  font_size_px = 60.0
  position_x   = 50.0                          # percent of template width
  position_y   = 50.0                          # percent of template height

Who gets a certificate:

  public      anyone; pass the name to print with --name
  restricted  registered participants only; pass --identifier and --roster,
              the printed name comes from the matching roster entry

Run 'certstamp gen-config' to generate a documented event file.")]
#[command(version = version_string())]
struct Cli {
    /// Directory where downloads are written
    #[arg(long, default_value = ".", global = true)]
    out: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compose a certificate and write the download file(s)
    Render(RenderArgs),
    /// Compose a sample certificate so organizers can check the layout
    Preview(ComposeArgs),
    /// Print a stock event definition with all options documented
    GenConfig,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Render(args) => render_command(args, &cli.out).await,
        Command::Preview(args) => preview_command(args, &cli.out).await,
        Command::GenConfig => {
            print!("{}", config::stock_event_toml());
            Ok(())
        }
    }
}

async fn render_command(args: RenderArgs, out: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let event = config::load_event_config(&args.compose.event)?;
    println!("==> Event definition loaded ({} access)", event.mode);

    let subject = match event.mode {
        config::AccessMode::Public => {
            let name = args.name.ok_or("public events need --name")?;
            eligibility::resolve_public(&name)?
        }
        config::AccessMode::Restricted => {
            let identifier = args
                .identifier
                .ok_or("restricted events need --identifier")?;
            let roster_path = args.roster.ok_or("restricted events need --roster")?;
            let roster = eligibility::RosterDirectory::from_file(&roster_path)?;
            eligibility::resolve_restricted(&roster, &event.event_id, &identifier).await?
        }
    };
    println!("==> Certificate subject: {subject}");

    println!("==> Composing certificate");
    let request = RenderRequest::new(event, subject.clone());
    let surface = compose_surface(request, args.compose.font_dir).await?;

    std::fs::create_dir_all(out)?;
    if matches!(args.format, Format::Png | Format::Both) {
        write_download(out, export::to_png(&surface, subject.as_str())?)?;
    }
    if matches!(args.format, Format::Pdf | Format::Both) {
        write_download(out, export::to_pdf(&surface, subject.as_str())?)?;
    }

    Ok(())
}

async fn preview_command(args: ComposeArgs, out: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let event = config::load_event_config(&args.event)?;

    if !event.has_template() {
        println!("==> No template configured for this event; nothing to preview");
        return Ok(());
    }

    println!("==> Composing preview with the sample name");
    let surface = compose_surface(RenderRequest::preview(event), args.font_dir).await?;

    std::fs::create_dir_all(out)?;
    write_download(out, export::to_png(&surface, eligibility::SAMPLE_SUBJECT_NAME)?)?;

    Ok(())
}

/// Run a single render attempt and unwrap it into a surface.
///
/// The CLI issues exactly one attempt per invocation, so a `Superseded`
/// outcome cannot happen here; it is still mapped to an error rather than
/// a panic.
async fn compose_surface(
    request: RenderRequest,
    font_dir: Option<PathBuf>,
) -> Result<RasterSurface, Box<dyn std::error::Error>> {
    let renderer = Renderer::new(TypefaceLoader::new(font_dir));
    let fetcher = HttpFetcher::default();
    match renderer.render(&fetcher, request).await {
        RenderOutcome::Ready {
            surface, typeface, ..
        } => {
            if typeface == TypefaceSource::Fallback {
                println!("==> Named typeface unavailable, used the embedded fallback face");
            }
            Ok(surface)
        }
        RenderOutcome::Failed { error, .. } => Err(error.into()),
        RenderOutcome::Superseded { .. } => Err("render attempt was superseded".into()),
    }
}

/// Write a finished download into the output directory.
fn write_download(out: &Path, download: export::Download) -> Result<(), Box<dyn std::error::Error>> {
    let path = out.join(&download.file_name);
    std::fs::write(&path, &download.bytes)?;
    println!(
        "==> Wrote {} ({}, {} bytes)",
        path.display(),
        download.media_type,
        download.bytes.len()
    );
    Ok(())
}
