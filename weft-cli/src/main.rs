//! Weft CLI - headless layout of box-tree descriptions
//!
//! Usage:
//!   weft <file.json>                 Lay out and print the box tree with geometry
//!   weft <file.json> --json          Print the geometry snapshot as JSON
//!   weft <file.json> --width 640     Override the container width
//!   weft <file.json> --measure       Shrink the root to its preferred width
//!
//! Set `RUST_LOG=weft=debug` to follow float placement and clearance.

use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use weft_common::report::{ErrorKind, ErrorSink, LogSink};
use weft_layout::description::BoxGeometry;
use weft_layout::{
    ApproximateMeasurer, BoxId, BoxTree, Container, DocumentDescription, FontCache,
    GeometrySnapshot, LayoutContext, LayoutHost, Size, layout,
};

#[derive(Parser, Debug)]
#[command(name = "weft")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    weft page.json
    weft page.json --width 320 --height 480
    weft page.json --measure --json"#)]
struct Cli {
    /// Path to a JSON document description
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Container width, overriding the description
    #[arg(long, conflicts_with = "measure")]
    width: Option<f64>,

    /// Viewport height, overriding the description
    #[arg(long)]
    height: Option<f64>,

    /// Lay out without a maximum width: the root takes its preferred width
    #[arg(long)]
    measure: bool,

    /// Print the geometry snapshot as JSON
    #[arg(short, long)]
    json: bool,
}

/// Forwards reports to the log and keeps count of them.
#[derive(Debug, Default)]
struct CliHost {
    sink: LogSink,
    errors: usize,
}

impl ErrorSink for CliHost {
    fn report_error(&mut self, kind: ErrorKind, message: &str, cause: Option<&(dyn Error + 'static)>) {
        self.errors += 1;
        self.sink.report_error(kind, message, cause);
    }
}

impl LayoutHost for CliHost {
    // A single pass over a static description; nothing loads later.
    fn request_refresh(&mut self, needs_relayout: bool) {
        log::debug!(target: "weft", "refresh requested (relayout: {needs_relayout})");
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.path)
        .with_context(|| format!("failed to read {}", cli.path.display()))?;
    let document: DocumentDescription = serde_json::from_str(&source)
        .with_context(|| format!("{} is not a valid document description", cli.path.display()))?;

    let mut config = document.container.clone();
    if cli.measure {
        config.max_width = None;
    } else if let Some(width) = cli.width {
        config.max_width = Some(width);
    }
    if let Some(height) = cli.height {
        config.viewport_height = Some(height);
    }

    let mut tree = BoxTree::from_description(&document.root);
    let mut host = CliHost::default();
    let mut container = Container::new(config);
    let mut fonts = FontCache::new();
    let mut ctx = LayoutContext::new(&ApproximateMeasurer, &mut host, &mut container, &mut fonts);
    layout(&mut tree, &mut ctx);
    log::debug!(target: "weft", "{} font(s) resolved", fonts.len());

    let snapshot = GeometrySnapshot::capture(&mut tree, &container);
    if cli.json {
        let json = serde_json::to_string_pretty(&snapshot).context("failed to serialize geometry")?;
        println!("{json}");
    } else {
        print_snapshot(&snapshot);
    }

    if host.errors > 0 {
        eprintln!(
            "{}",
            format!("{} box(es) failed to lay out; see the log for details", host.errors).yellow()
        );
    }
    Ok(())
}

/// Print every captured box, indented by depth.
fn print_snapshot(snapshot: &GeometrySnapshot) {
    let Size { width, height } = snapshot.document;
    println!("{}", format!("=== Layout ({width:.1}x{height:.1}) ===").bold());

    let mut depths: HashMap<BoxId, usize> = HashMap::new();
    for geometry in &snapshot.boxes {
        let depth = geometry
            .parent
            .and_then(|parent| depths.get(&parent))
            .map_or(0, |d| d + 1);
        let _ = depths.insert(geometry.id, depth);
        print_box(geometry, depth);
    }
}

fn print_box(geometry: &BoxGeometry, depth: usize) {
    let indent = "  ".repeat(depth);
    let name = geometry
        .tag
        .as_ref()
        .map_or_else(|| "anonymous".to_string(), |tag| format!("<{tag}>"));
    let rect = geometry.rect;
    println!(
        "{indent}{} {} {:?}  x={:.1} y={:.1} w={:.1} h={:.1}",
        name.cyan(),
        geometry.id.dimmed(),
        geometry.display,
        rect.x,
        rect.y,
        rect.width,
        rect.height,
    );

    let margin = geometry.margin;
    if margin.horizontal() != 0.0 || margin.vertical() != 0.0 {
        println!(
            "{indent}  margin: t={:.1} r={:.1} b={:.1} l={:.1}",
            margin.top, margin.right, margin.bottom, margin.left
        );
    }
    let padding = geometry.padding;
    if padding.horizontal() != 0.0 || padding.vertical() != 0.0 {
        println!(
            "{indent}  padding: t={:.1} r={:.1} b={:.1} l={:.1}",
            padding.top, padding.right, padding.bottom, padding.left
        );
    }
    if geometry.stack_level != 0 {
        println!("{indent}  z-index: {}", geometry.stack_level);
    }
    if let Some(marker) = &geometry.marker {
        println!(
            "{indent}  marker {} at x={:.1}",
            marker.text.green(),
            marker.rect.x
        );
    }
    if let Some(text) = &geometry.text {
        let preview: String = text.chars().take(30).collect();
        let suffix = if text.chars().count() > 30 { "..." } else { "" };
        println!(
            "{indent}  {} in {} line(s)",
            format!("\"{preview}{suffix}\"").green(),
            geometry.lines.len()
        );
    }
}
