/*!
chartspec command line interface

Provides commands for transforming query result rows with a chart
specification, retargeting a specification at a new chart family, and
inspecting a specification file.
*/

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use chartspec::{transform_rows, ChartSpec, ChartType, Row, VERSION};

#[derive(Parser)]
#[command(name = "chartspec")]
#[command(about = "Declarative chart specification toolkit")]
#[command(version = VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reshape query result rows into renderer-ready chart data
    Transform {
        /// Path to the chart specification JSON file
        spec: PathBuf,

        /// Path to a JSON array of result rows
        rows: PathBuf,

        /// Output file path (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print the output JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Switch a specification to a new chart type, remapping its encodings
    Retarget {
        /// Path to the chart specification JSON file
        spec: PathBuf,

        /// Target chart type (bar, line, pie, table, scatter)
        #[arg(long)]
        to: String,

        /// Output file path (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print a summary of a specification file
    Inspect {
        /// Path to the chart specification JSON file
        spec: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Transform {
            spec,
            rows,
            output,
            pretty,
        } => {
            let spec = read_spec(&spec)?;
            let rows_text = std::fs::read_to_string(&rows)
                .with_context(|| format!("Failed to read rows file {}", rows.display()))?;
            let rows: Vec<Row> = serde_json::from_str(&rows_text)
                .with_context(|| "Rows file must contain a JSON array of flat objects")?;

            let data = transform_rows(&spec, rows);
            let json = if pretty {
                serde_json::to_string_pretty(&data)?
            } else {
                serde_json::to_string(&data)?
            };
            emit(output.as_deref(), &json)?;
        }

        Commands::Retarget { spec, to, output } => {
            let spec = read_spec(&spec)?;
            let target: ChartType = to.parse()?;
            let retargeted = spec.with_chart_type(target);
            emit(output.as_deref(), &serde_json::to_string_pretty(&retargeted)?)?;
        }

        Commands::Inspect { spec } => {
            let spec = read_spec(&spec)?;
            println!("type:       {}", spec.chart_type);
            println!(
                "source:     {}",
                if spec.query.has_source() {
                    spec.query.source.as_str()
                } else {
                    "(unset)"
                }
            );
            let dimensions: Vec<&str> =
                spec.query.dimensions.iter().map(|d| d.field.as_str()).collect();
            let measures: Vec<&str> =
                spec.query.measures.iter().map(|m| m.field.as_str()).collect();
            println!("dimensions: {}", format_list(&dimensions));
            println!("measures:   {}", format_list(&measures));
            let slots: Vec<String> = spec
                .encodings
                .used_slots()
                .iter()
                .map(|s| s.to_string())
                .collect();
            let slots: Vec<&str> = slots.iter().map(|s| s.as_str()).collect();
            println!("slots:      {}", format_list(&slots));
            if let Some(title) = spec.options.as_ref().and_then(|o| o.title.as_deref()) {
                println!("title:      {}", title);
            }
        }
    }

    Ok(())
}

fn read_spec(path: &Path) -> anyhow::Result<ChartSpec> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read spec file {}", path.display()))?;
    Ok(ChartSpec::from_json(&text)?)
}

fn emit(output: Option<&Path>, json: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}

fn format_list(items: &[&str]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}
