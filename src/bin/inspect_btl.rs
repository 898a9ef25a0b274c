use clap::Parser;
use std::path::PathBuf;

use cruise_bottle_summary::bottle::line_classifier::classify_lines;
use cruise_bottle_summary::bottle::BottleFileParser;

#[derive(Parser)]
#[command(name = "inspect-btl")]
#[command(about = "Show how a CTD bottle file is classified and parsed", long_about = None)]
struct Cli {
    /// Bottle (.btl) file to inspect
    file: PathBuf,

    /// Print the parsed file as JSON
    #[arg(long)]
    json: bool,

    /// Number of bottles to show
    #[arg(long, default_value = "5")]
    rows: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let parser = BottleFileParser::new();
    let bottle_file = parser.parse_path(&cli.file)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&bottle_file)?);
        return Ok(());
    }

    let content = std::fs::read_to_string(&cli.file)?;
    let classified = classify_lines(&content);

    println!("Bottle file: {}", cli.file.display());
    println!("Cast: {}", bottle_file.cast);
    println!(
        "Lines: {} header, {} column header, {} data",
        classified.header.len(),
        classified.columns.len(),
        classified.data.len()
    );

    println!("\nHeader fields:");
    for (field, value) in bottle_file.metadata.iter() {
        println!("  {:<28} {}", field.column_name(), value);
    }

    println!("\nColumns ({}):", bottle_file.layout.width());
    for (idx, name) in bottle_file.layout.iter() {
        println!("  {idx:3}: {name}");
    }

    println!("\nBottles: {}", bottle_file.rows.len());
    println!("{}", "=".repeat(100));
    for row in bottle_file.rows.iter().take(cli.rows) {
        println!("  {}", row.values.join(" | "));
    }

    Ok(())
}
