use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use cruise_bottle_summary::config::Config;
use cruise_bottle_summary::services::bottle_service::CTD_SUMMARY_FILE;
use cruise_bottle_summary::services::{BottleService, SummaryService};

#[derive(Parser)]
#[command(name = "bottle-summary")]
#[command(about = "Build per-bottle discrete sample summaries from CTD bottle files and lab spreadsheets", long_about = None)]
struct Cli {
    /// Mode: 'bottles' (parse .btl files into per-cast and CTD tables), 'summary' (merge the CTD table with the sampling log and lab data), 'all' (bottles then summary), 'update-carbon' (refresh carbon columns of an existing summary)
    #[arg(long)]
    mode: String,

    /// Directory holding the cast .btl files
    #[arg(long, env = "CTD_DIR")]
    ctd_dir: Option<PathBuf>,

    /// CTD sampling log workbook (sheet 'Summary')
    #[arg(long, env = "SAMPLING_LOG")]
    sampling_log: Option<PathBuf>,

    /// Directory with salinity (.SAL, SAL.xlsx) and oxygen (*oxy*.xlsx) files
    #[arg(long, env = "SALINITY_OXYGEN_DIR")]
    salinity_oxygen_dir: Option<PathBuf>,

    /// Chlorophyll workbook (sheet 'Chl')
    #[arg(long, env = "CHLOROPHYLL_PATH")]
    chlorophyll: Option<PathBuf>,

    /// Nutrients workbook (sheet 'Summary')
    #[arg(long, env = "NUTRIENTS_PATH")]
    nutrients: Option<PathBuf>,

    /// Carbon system (DIC/TA/pH) workbook
    #[arg(long, env = "CARBON_PATH")]
    carbon: Option<PathBuf>,

    /// Workbook mapping instrument short channel names to full names
    #[arg(long, env = "NAME_MAP_PATH")]
    name_map: Option<PathBuf>,

    /// Directory for the cruise summary (default: parent of the CTD directory)
    #[arg(long, env = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Cruise name used in the output file name (e.g. Pioneer-07)
    #[arg(long, env = "CRUISE_NAME")]
    cruise_name: Option<String>,

    /// Cruise id (e.g. AR-18A), used where the sampling log has no cruise id and in the output file name
    #[arg(long, env = "CRUISE_ID")]
    cruise_id: Option<String>,

    /// Summary version used in the output file name
    #[arg(long, env = "SUMMARY_VERSION")]
    version: Option<String>,

    /// Log and skip bottle files that fail to parse instead of stopping
    #[arg(long)]
    skip_invalid_files: bool,

    /// Existing summary CSV (for 'update-carbon' mode)
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Output CSV (for 'update-carbon' mode)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Cruise id prefix for carbon leg ids, e.g. 'AR-18' turns AR18-A into AR-18A
    #[arg(long)]
    cruise_prefix: Option<String>,
}

impl Cli {
    /// Command line values take precedence over the environment
    fn apply(&self, config: &mut Config) {
        let paths = [
            (&self.ctd_dir, &mut config.ctd_dir),
            (&self.sampling_log, &mut config.sampling_log),
            (&self.salinity_oxygen_dir, &mut config.salinity_oxygen_dir),
            (&self.chlorophyll, &mut config.chlorophyll),
            (&self.nutrients, &mut config.nutrients),
            (&self.carbon, &mut config.carbon),
            (&self.name_map, &mut config.name_map),
            (&self.output_dir, &mut config.output_dir),
        ];
        for (value, setting) in paths {
            if value.is_some() {
                setting.clone_from(value);
            }
        }

        if self.cruise_name.is_some() {
            config.cruise_name.clone_from(&self.cruise_name);
        }
        if self.cruise_id.is_some() {
            config.cruise_id.clone_from(&self.cruise_id);
        }
        if let Some(version) = &self.version {
            config.version.clone_from(version);
        }
        config.skip_invalid_files |= self.skip_invalid_files;
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if it exists (ignore errors if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    cli.apply(&mut config);

    match cli.mode.as_str() {
        "bottles" => process_bottles(&config)?,
        "summary" => build_summary(&config)?,
        "all" => {
            process_bottles(&config)?;
            build_summary(&config)?;
        }
        "update-carbon" => {
            let summary = cli
                .summary
                .ok_or("--summary is required for update-carbon mode")?;
            let output = cli
                .output
                .ok_or("--output is required for update-carbon mode")?;
            let service = SummaryService::new(config);
            let rows = service.update_carbon_file(&summary, &output, cli.cruise_prefix.as_deref())?;
            println!("Updated {rows} rows: {}", output.display());
        }
        _ => {
            return Err(format!(
                "Invalid mode '{}'. Valid modes: bottles, summary, all, update-carbon",
                cli.mode
            )
            .into());
        }
    }

    info!("Done");
    Ok(())
}

fn process_bottles(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    let ctd_dir = config.ctd_dir()?;
    let service = BottleService::from_config(config)?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    let (_, stats) = service.process_directory(ctd_dir, |path, total| {
        pb.set_length(total as u64);
        if let Some(name) = path.file_name() {
            pb.set_message(name.to_string_lossy().into_owned());
        }
        pb.inc(1);
    })?;
    pb.finish_with_message("Parsed");

    for (file, reason) in &stats.failed {
        warn!("Skipped {}: {}", file.display(), reason);
    }

    println!("\n✓ Bottle processing complete");
    println!("  Files parsed: {}/{}", stats.files_parsed, stats.files_found);
    println!("  Bottles: {}", stats.bottles);
    println!("  CTD summary: {}", ctd_dir.join(CTD_SUMMARY_FILE).display());
    println!("  Duration: {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}

fn build_summary(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let service = SummaryService::new(config.clone());
    let path = service.run(Utc::now().date_naive())?;
    println!("\n✓ Discrete summary written to {}", path.display());
    Ok(())
}
