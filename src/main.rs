//! Page-Reflow CLI (for testing purposes only)
//! The main interface is through WASM bindings.
//!
//! Paginates a list of block heights and prints the resulting breaks.
//! Set RUST_LOG=debug to see reflow passes.

use std::path::PathBuf;

use clap::Parser;
use page_reflow::reflow::now_ms;
use page_reflow::{MeasuredBlocks, Paginator, RecomputeCause};

const SAMPLE_HEIGHTS: [f32; 12] = [
    48.0, 120.0, 260.0, 96.0, 400.0, 32.0, 180.0, 640.0, 72.0, 1200.0, 24.0, 300.0,
];

#[derive(Debug, Parser)]
#[command(name = "page-reflow", version, about = "Paginate measured block heights")]
struct Cli {
    /// Page setup JSON to load before paginating
    #[arg(short, long, value_name = "FILE")]
    setup: Option<PathBuf>,

    /// Outer block heights in pixels; a built-in sample is used when empty
    #[arg(value_name = "HEIGHT")]
    heights: Vec<f32>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut paginator = Paginator::new();
    if let Some(path) = &cli.setup {
        let json = std::fs::read_to_string(path)?;
        paginator.load_setup_json(&json)?;
        log::info!("loaded page setup from {}", path.display());
    }

    let heights = if cli.heights.is_empty() {
        SAMPLE_HEIGHTS.to_vec()
    } else {
        cli.heights
    };

    let blocks = MeasuredBlocks::from_heights(&heights);
    paginator.request(RecomputeCause::ContentChanged);
    let Some(report) = paginator.flush(&blocks, &blocks) else {
        return Ok(());
    };

    let setup = paginator.store().setup();
    println!("Page-Reflow");
    println!("===========");
    println!(
        "page {}x{}px, usable height {}px, gap {}px",
        setup.page.width,
        setup.page.height,
        setup.usable_height(0),
        setup.page_gap
    );
    println!("{} blocks, {} pages, {} unresolved", heights.len(), report.total_pages, report.skipped);
    println!();

    for extent in paginator.breaks().pages() {
        let label = setup
            .page_numbers
            .label_for(extent.page_index)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "page {:>3} [{:>4}]  blocks {:>3}  used {:>7.1}px",
            extent.page_index + 1,
            label,
            extent.block_count,
            extent.used_height
        );
    }

    println!();
    for marker in paginator.breaks().markers() {
        println!(
            "break before block {:>3}: filler {:>6.1}px, spacer {:>6.1}px",
            marker.position.0, marker.filler_height, marker.spacer_height
        );
    }

    log::debug!("finished at {}ms", now_ms());
    Ok(())
}
