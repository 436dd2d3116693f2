//! Class Map Inspector CLI
//!
//! Prints the reference schema snapshot and manages configuration.

use clap::{Parser, Subcommand};
use familiar_classmap::{starwars, ClassMapConfig, OutputFormat, SchemaRegistry};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "classmap-inspect")]
#[command(about = "Inspect class map registrations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register the reference schema and print its snapshot
    Snapshot {
        /// Config file to load (optional)
        #[arg(short, long)]
        config: Option<String>,

        /// Compact JSON instead of the configured format
        #[arg(long)]
        compact: bool,
    },

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show {
        /// Config file to load (optional)
        #[arg(short, long)]
        config: Option<String>,

        /// Output as TOML
        #[arg(long)]
        toml: bool,
    },

    /// Initialize a new config file
    Init {
        /// Output path (default: classmap.toml)
        #[arg(short, long, default_value = "classmap.toml")]
        output: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Snapshot { config, compact } => {
            let cfg = ClassMapConfig::load_from(config.as_deref())?;
            let registry = SchemaRegistry::with_config(&cfg.registry);
            starwars::register_schema(&registry)?;

            let snapshot = registry.snapshot(cfg.export.include_checksum)?;
            let format = if compact {
                OutputFormat::Compact
            } else {
                cfg.export.output_format
            };
            println!("{}", snapshot.to_json(format)?);
        }

        Commands::Config(ConfigCommands::Show { config, toml }) => {
            let cfg = ClassMapConfig::load_from(config.as_deref())?;

            if toml {
                println!("{}", ::toml::to_string_pretty(&cfg)?);
            } else {
                println!("Class Map Configuration\n");
                println!("Registry:");
                println!("  Serialize registration: {}", cfg.registry.serialize_registration);
                println!("\nExport:");
                println!("  Format: {:?}", cfg.export.output_format);
                println!("  Checksum: {}", cfg.export.include_checksum);
            }
        }

        Commands::Config(ConfigCommands::Init { output }) => {
            ClassMapConfig::default().save(&output)?;
            println!("Created config file: {}", output);
        }
    }

    Ok(())
}
