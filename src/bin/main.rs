//! intentql CLI - Compile intent analyses to SQL
//!
//! Usage:
//!   intentql generate [<file.json>|-] [--config <path>] [--dialect <dialect>] [--output <format>]
//!   intentql tables [--config <path>]
//!   intentql check [--config <path>]
//!   intentql features [--config <path>]
//!
//! Examples:
//!   intentql generate analysis.json
//!   echo '{...}' | intentql generate - --dialect duckdb --output json
//!   intentql tables --config intentql.toml

use clap::{Parser, Subcommand, ValueEnum};
use intentql::compile::SqlGenerator;
use intentql::config::Settings;
use intentql::sql::Dialect;
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "intentql")]
#[command(about = "intentql - Compile natural-language intent analyses into SQL")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate SQL for an intent analysis JSON document
    Generate {
        /// Path to the JSON document ("-" or absent reads stdin)
        file: Option<PathBuf>,

        /// Path to a config file (default lookup otherwise)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// SQL dialect to generate (overrides the config file)
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        output: OutputFormat,
    },

    /// List catalog tables
    Tables {
        /// Path to a config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the schema compatibility report
    Check {
        /// Path to a config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print supported intents, tables and time filters
    Features {
        /// Path to a config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Postgres,
    Duckdb,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Duckdb => Dialect::DuckDb,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Output SQL, with bound values as a trailing comment
    Sql,
    /// Output the full generation result as JSON
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            file,
            config,
            dialect,
            output,
        } => cmd_generate(file, config, dialect, output),
        Commands::Tables { config } => cmd_tables(config),
        Commands::Check { config } => cmd_check(config),
        Commands::Features { config } => cmd_features(config),
    }
}

fn load_settings(config: Option<&Path>) -> Result<Settings, ExitCode> {
    let result = match config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    result.map_err(|e| {
        eprintln!("Configuration error: {}", e);
        ExitCode::FAILURE
    })
}

fn load_generator(settings: &Settings) -> Result<SqlGenerator, ExitCode> {
    settings.build_generator().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        ExitCode::FAILURE
    })
}

fn read_input(file: Option<&Path>) -> io::Result<String> {
    match file {
        Some(path) if path != Path::new("-") => fs::read_to_string(path),
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_generate(
    file: Option<PathBuf>,
    config: Option<PathBuf>,
    dialect: Option<DialectArg>,
    output: OutputFormat,
) -> ExitCode {
    let mut settings = match load_settings(config.as_deref()) {
        Ok(s) => s,
        Err(code) => return code,
    };
    if let Some(dialect) = dialect {
        settings.compiler.dialect = dialect.into();
    }
    let generator = match load_generator(&settings) {
        Ok(g) => g,
        Err(code) => return code,
    };

    let source = match read_input(file.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            let name = file
                .as_deref()
                .map_or_else(|| "stdin".to_string(), |p| p.display().to_string());
            eprintln!("Error reading '{}': {}", name, e);
            return ExitCode::FAILURE;
        }
    };

    let result = generator.generate_json(&source);

    match output {
        OutputFormat::Json => {
            let code = print_json(&result);
            if result.success {
                code
            } else {
                ExitCode::FAILURE
            }
        }
        OutputFormat::Sql => match (&result.sql, result.success) {
            (Some(sql), true) => {
                println!("{}", sql);
                if !result.params.is_empty() {
                    let params = serde_json::to_string(&result.params).unwrap_or_default();
                    println!("-- params: {}", params);
                }
                ExitCode::SUCCESS
            }
            _ => {
                let kind = result.error_kind.map(|k| k.as_str()).unwrap_or("error");
                let message = result.error.as_deref().unwrap_or("generation failed");
                eprintln!("Generation error ({}): {}", kind, message);
                if let Some(sql) = &result.sql {
                    eprintln!("  SQL: {}", sql);
                }
                if let Some(debug) = &result.debug_info {
                    eprintln!("  Available tables: {}", debug.available_tables.join(", "));
                }
                ExitCode::FAILURE
            }
        },
    }
}

fn cmd_tables(config: Option<PathBuf>) -> ExitCode {
    let generator = match load_settings(config.as_deref()).and_then(|s| load_generator(&s)) {
        Ok(g) => g,
        Err(code) => return code,
    };
    let catalog = generator.catalog();

    println!("Tables:");
    for name in catalog.get_all_tables() {
        let Some(info) = catalog.get_table_info(name) else {
            continue;
        };
        let mut traits = Vec::new();
        if info.supports_sum {
            traits.push("sum".to_string());
        }
        if info.supports_avg {
            traits.push("avg".to_string());
        }
        if let Some(date) = &info.date_column {
            traits.push(format!("date: {}", date));
        }
        println!(
            "  - {} ({} display columns{}{})",
            name,
            info.display_column_count,
            if traits.is_empty() { "" } else { "; " },
            traits.join(", ")
        );
    }

    let relations = generator.graph().relations();
    if !relations.is_empty() {
        println!();
        println!("Relations:");
        for relation in relations {
            println!("  - {}", relation);
        }
    }

    ExitCode::SUCCESS
}

fn cmd_check(config: Option<PathBuf>) -> ExitCode {
    match load_settings(config.as_deref()).and_then(|s| load_generator(&s)) {
        Ok(generator) => print_json(&generator.catalog().compatibility_report()),
        Err(code) => code,
    }
}

fn cmd_features(config: Option<PathBuf>) -> ExitCode {
    match load_settings(config.as_deref()).and_then(|s| load_generator(&s)) {
        Ok(generator) => print_json(&generator.supported_features()),
        Err(code) => code,
    }
}
