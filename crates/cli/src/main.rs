use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use vortree_core::dataset::{self, DEFAULT_DATASET};
use vortree_core::geometry::circling_polygon;
use vortree_core::{export, hierarchy, logging, render};
use vortree_core::{ChartConfig, Partitioner, TreemapConfig, VoronoiTreemap};

#[derive(Parser, Debug)]
#[command(name = "vortree", about = "Voronoi treemap chart renderer")]
struct Args {
    /// Hierarchical JSON dataset
    #[arg(default_value = DEFAULT_DATASET)]
    input: PathBuf,
    /// SVG output path (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Chart settings as JSON; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Chart title
    #[arg(long)]
    title: Option<String>,
    /// Seed for the initial site placement
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Relaxation iterations per group
    #[arg(long, default_value_t = TreemapConfig::default().max_iterations)]
    max_iterations: usize,
    /// Also write the leaf cells as CSV
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Also write every node with its polygon as JSON
    #[arg(long)]
    json: Option<PathBuf>,
    /// Also write a PDF rendition
    #[arg(long)]
    pdf: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    logging::init("vortree=info,vortree_core=info");
    let args = Args::parse();

    let mut chart: ChartConfig = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ChartConfig::default(),
    };
    if let Some(title) = args.title {
        chart.title = title;
    }
    let engine = VoronoiTreemap::new(TreemapConfig {
        seed: args.seed,
        max_iterations: args.max_iterations,
        ..TreemapConfig::default()
    });

    let data = dataset::load(&args.input)
        .with_context(|| format!("loading dataset {}", args.input.display()))?;
    let tree = hierarchy::build(&data)?;
    let boundary = circling_polygon(chart.treemap_radius, chart.polygon_points)?;
    let treemap = engine.partition(&tree, &boundary)?;

    let svg = render::render_svg(&tree, &treemap, &chart);
    render::write_svg(&svg, args.output.as_deref()).context("writing svg")?;

    if let Some(path) = args.csv {
        let file = std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        export::to_csv(&tree, &treemap, file)?;
    }
    if let Some(path) = args.json {
        let json = export::to_json(&tree, &treemap);
        std::fs::write(&path, serde_json::to_string_pretty(&json)?)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = args.pdf {
        export::to_pdf(&tree, &treemap, &chart, &path)?;
    }

    let progress = treemap.progress();
    info!(
        leaves = tree.leaves().len(),
        groups = progress.groups,
        unconverged = progress.unconverged,
        "chart rendered"
    );
    Ok(())
}
