use clap::{Parser, Subcommand};
use clinic_widgets::calculator::calculate_custom_cost;
use clinic_widgets::content::{SiteContent, load_content};
use clinic_widgets::page::{Hosts, Page, build_document};
use clinic_widgets::timer::Clock;
use clinic_widgets::{config, markup, output};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "clinic-widgets")]
#[command(about = "Interactive widgets for an orthodontic practice site")]
#[command(long_about = "\
Interactive widgets for an orthodontic practice site

Renders the single-page site from a content file and checks that every widget
finds the markup it binds to. The cost estimator is available on its own.

Files:

  widgets.toml     # Widget behavior: autoplay, fees, timeouts (optional)
  content.toml     # Testimonials, tour, FAQ, cases, posts (optional)

Without --content, the bundled sample content is used.

Run 'clinic-widgets gen-config' to generate a documented widgets.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory containing widgets.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// Content file (defaults to the bundled sample)
    #[arg(long, global = true)]
    content: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate treatment cost
    Estimate {
        /// invisalign, traditional-braces, ceramic-braces, lingual-braces
        treatment: String,
        /// short, medium, long
        duration: String,
        /// simple, moderate, complex
        complexity: String,
        /// Print the breakdown as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render the full page to HTML
    Render {
        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Mount every widget on the rendered page and report the result
    Check,
    /// Print a stock widgets.toml with all options documented
    GenConfig,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clinic_widgets=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_site_content(path: Option<&PathBuf>) -> Result<SiteContent, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(load_content(path)?),
        None => Ok(SiteContent::sample()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Estimate {
            treatment,
            duration,
            complexity,
            json,
        } => {
            let config = config::load_config(&cli.config)?;
            let breakdown =
                calculate_custom_cost(&treatment, &duration, &complexity, &config.calculator)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&breakdown)?);
            } else {
                output::print_estimate(&breakdown);
            }
        }
        Command::Render { output: target } => {
            let config = config::load_config(&cli.config)?;
            let content = load_site_content(cli.content.as_ref())?;
            let html = markup::render_page(&content, &config).into_string();
            match target {
                Some(path) => {
                    std::fs::write(&path, html)?;
                    println!("==> Wrote {}", path.display());
                }
                None => print!("{html}"),
            }
        }
        Command::Check => {
            let config = config::load_config(&cli.config)?;
            let content = load_site_content(cli.content.as_ref())?;
            let doc = build_document(&content, &config);
            let page = Page::mount(doc, &config, Clock::system(), Hosts::default());
            output::print_check_output(&content, &page.status());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
