//! Brent CLI binary.
//!
//! Fetches the input series, runs the shock decomposition, and prints
//! or exports the monthly panel.

use brent::{PipelineConfig, PipelineInputs, ShockPipeline};
use brent_data::fred::{FredClient, INDUSTRIAL_PRODUCTION};
use brent_data::yahoo::YahooCloseProvider;
use brent_output::{ExportFormat, Exporter, PanelExport, generate_run_summary};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process;
use std::time::Duration as StdDuration;

#[derive(Parser)]
#[command(name = "brent")]
#[command(about = "Brent: oil-market shock decomposition", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch data and run the full decomposition
    Run {
        /// Oil price symbol
        #[arg(long, default_value = "BZ=F")]
        symbol: String,

        /// Implied-volatility index symbol
        #[arg(long, default_value = "^OVX")]
        vol_symbol: String,

        /// FRED series used as the activity proxy
        #[arg(long, default_value = INDUSTRIAL_PRODUCTION)]
        activity_series: String,

        /// First date of the sample (inclusive)
        #[arg(long, default_value = "2007-05-01")]
        start: NaiveDate,

        /// Last date of the sample (inclusive, defaults to today)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Write the shock panel to this file
        #[arg(long)]
        export: Option<PathBuf>,

        /// Export format (csv, json, or pretty-json)
        #[arg(long, default_value = "csv")]
        format: String,

        /// Number of panel rows to print (0 prints the whole panel)
        #[arg(long, default_value = "12")]
        rows: usize,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            symbol,
            vol_symbol,
            activity_series,
            start,
            end,
            export,
            format,
            rows,
        } => {
            let end = end.unwrap_or_else(|| Utc::now().date_naive());
            let format = parse_format(&format)?;
            run_decomposition(
                &symbol,
                &vol_symbol,
                &activity_series,
                start,
                end,
                export.as_deref(),
                format,
                rows,
            )
            .await?;
        }
    }

    Ok(())
}

fn parse_format(name: &str) -> Result<ExportFormat, Box<dyn std::error::Error>> {
    match name.to_lowercase().as_str() {
        "csv" => Ok(ExportFormat::Csv),
        "json" => Ok(ExportFormat::Json),
        "pretty-json" | "pretty" => Ok(ExportFormat::PrettyJson),
        _ => Err(format!("Unknown export format: {}", name).into()),
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_decomposition(
    symbol: &str,
    vol_symbol: &str,
    activity_series: &str,
    start: NaiveDate,
    end: NaiveDate,
    export: Option<&std::path::Path>,
    format: ExportFormat,
    rows: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", format!("OIL SHOCK DECOMPOSITION: {}", symbol));
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Sample:          {} to {}", start, end);
    println!("Activity proxy:  {} (FRED)", activity_series);
    println!("Implied vol:     {} (Yahoo)", vol_symbol);
    println!();

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(StdDuration::from_millis(100));

    let yahoo = YahooCloseProvider::new()?;
    let fred = FredClient::from_env()?;

    pb.set_message(format!("Fetching {} closes...", symbol));
    let oil_closes = yahoo.fetch_closes(symbol, start, end).await?;

    pb.set_message(format!("Fetching {}...", vol_symbol));
    let implied_vol = yahoo.fetch_closes(vol_symbol, start, end).await?;

    pb.set_message(format!("Fetching {}...", activity_series));
    let activity = fred
        .fetch_series(
            activity_series,
            brent::series::Frequency::Monthly,
            start,
            end,
        )
        .await?;

    pb.finish_with_message(format!(
        "Fetched {} closes, {} vol quotes, {} activity observations",
        oil_closes.len(),
        implied_vol.len(),
        activity.len()
    ));

    print!("Fitting GARCH(1,1) and decomposing...");
    std::io::Write::flush(&mut std::io::stdout())?;
    let pipeline = ShockPipeline::new(PipelineConfig::default());
    let run = match pipeline.run(&PipelineInputs {
        oil_closes,
        implied_vol,
        activity,
    }) {
        Ok(run) => {
            println!(" ✓ ({} months)", run.panel.height());
            run
        }
        Err(e) => {
            println!(" ✗");
            return Err(Box::new(e));
        }
    };

    let params = &run.garch.params;
    println!("\nGARCH(1,1) fit (daily returns, percent):");
    println!(
        "  μ = {:.4}  ω = {:.4}  α = {:.4}  β = {:.4}",
        params.mu, params.omega, params.alpha, params.beta
    );
    println!("  persistence (α+β):  {:.4}", params.persistence());
    println!("  log-likelihood:     {:.2}", run.garch.log_likelihood);

    println!("\n{}", generate_run_summary(&run.shocks));

    let df = run.panel.to_dataframe()?;
    if rows == 0 || rows >= run.panel.height() {
        println!("{}", df);
    } else {
        println!("Last {} months of the shock panel:", rows);
        println!("{}", df.tail(Some(rows)));
    }

    if let Some(path) = export {
        let panel_export = PanelExport::from_panel(&run.panel);
        panel_export.export_to_file(path, format)?;
        println!(
            "\nExported {} rows to {} ({})",
            panel_export.len(),
            path.display(),
            format.extension()
        );
    }

    Ok(())
}
