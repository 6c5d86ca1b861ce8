//! dwc-converter CLI - Convert CSV files to Darwin Core CSV
//!
//! # Main Commands
//!
//! ```bash
//! dwc-converter serve                                 # Start HTTP server (port 3000)
//! dwc-converter convert -i input.csv -m mapping.json  # One-shot file conversion
//! dwc-converter example-mapping                       # Print a starter mapping
//! ```

use clap::{Parser, Subcommand};
use dwc_converter::{convert_csv_to_dwc, example_mapping, ConvertOptions, MappingSpec};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dwc-converter")]
#[command(about = "Convert CSV files to Darwin Core CSV using a column mapping", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a CSV file using a mapping JSON file
    Convert {
        /// Input CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Mapping JSON file
        #[arg(short, long)]
        mapping: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// CSV delimiter for reading and writing
        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Don't generate UUIDs for empty occurrenceID values
        #[arg(long)]
        no_id_fill: bool,
    },

    /// Print a starter mapping JSON
    ExampleMapping,

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            mapping,
            output,
            delimiter,
            no_id_fill,
        } => cmd_convert(&input, &mapping, output.as_deref(), delimiter, no_id_fill),

        Commands::ExampleMapping => cmd_example_mapping(),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_convert(
    input: &Path,
    mapping_path: &Path,
    output: Option<&Path>,
    delimiter: char,
    no_id_fill: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !delimiter.is_ascii() {
        return Err("Delimiter must be a single ASCII character.".into());
    }

    eprintln!("📄 Converting: {}", input.display());

    let mapping_json = fs::read_to_string(mapping_path)?;
    let mapping = MappingSpec::from_json(&mapping_json)?;
    eprintln!("   Mapped fields: {}", mapping.parse().len());

    let bytes = fs::read(input)?;
    let options = ConvertOptions {
        delimiter: delimiter as u8,
        ensure_occurrence_id: !no_id_fill,
    };

    let converted = convert_csv_to_dwc(&bytes, &mapping, &options)?;

    match output {
        Some(p) => {
            fs::write(p, &converted)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            std::io::stdout().write_all(&converted)?;
        }
    }

    eprintln!("✨ Done!");
    Ok(())
}

fn cmd_example_mapping() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", example_mapping().to_json()?);
    Ok(())
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    dwc_converter::server::start_server(port).await
}
