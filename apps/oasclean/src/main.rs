use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{LevelFilter, debug, info};
use oasclean_refs::{Config, ReportFormat};
use oasclean_sanitize::SanitizeConfig;
use std::io::{self, BufWriter, Write};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "oasclean")]
#[command(about = "Find and clean up undefined and unused components in OpenAPI/Swagger documents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Report undefined and unused components
    Check(Config),
    /// Tag or remove unused components and write a sanitized copy
    Sanitize(SanitizeConfig),
}

impl Commands {
    fn log_level(&self) -> LevelFilter {
        match self {
            Commands::Check(cfg) => cfg.log_level(),
            Commands::Sanitize(cfg) => cfg.log_level(),
        }
    }
}

fn init_logging(level: LevelFilter) {
    // RUST_LOG, when set, overrides the level picked by --debug/--quiet
    let env = env_logger::Env::default().default_filter_or(level.to_string().to_lowercase());
    env_logger::Builder::from_env(env).init();
}

fn finished<W: Write>(writer: &mut W, start: Instant, documents: usize) -> io::Result<()> {
    writeln!(
        writer,
        "\n{} Finished in {}ms on {} documents (using {} threads).",
        "●".bright_blue(),
        start.elapsed().as_millis().to_string().cyan(),
        documents.to_string().cyan(),
        rayon::current_num_threads().to_string().cyan()
    )?;
    writer.flush()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.command.log_level());
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();

    let failed = match cli.command {
        Commands::Check(cfg) => {
            // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
            // See https://github.com/rust-lang/rust/issues/60673
            let mut stdout = BufWriter::new(io::stdout());

            info!("Running reference check on {} inputs", cfg.inputs.len());
            let result = oasclean_refs::run_reference_check(&cfg)?;
            debug!(
                "{} failures, {} unused components",
                result.failures(),
                result.unused_total()
            );

            match cfg.format {
                ReportFormat::Json => oasclean_refs::print_json(&mut stdout, &result)?,
                ReportFormat::Text if result.is_clean() => {
                    oasclean_refs::print_clean_message(&mut stdout, result.documents_analyzed)?;
                    finished(&mut stdout, start, result.documents_analyzed)?;
                }
                ReportFormat::Text => {
                    oasclean_refs::print_report_tree(&mut stdout, &result, cfg.lax)?;
                    finished(&mut stdout, start, result.documents_analyzed)?;
                }
            }
            stdout.flush()?;
            result.should_fail(cfg.lax)
        }
        Commands::Sanitize(cfg) => {
            info!("Running sanitize on {} inputs", cfg.inputs.len());
            let result = oasclean_sanitize::run_sanitize(&cfg)?;

            // The sanitized document owns stdout when written there
            let mut out: BufWriter<Box<dyn Write>> = if cfg.writes_to_stdout() {
                BufWriter::new(Box::new(io::stderr()))
            } else {
                BufWriter::new(Box::new(io::stdout()))
            };

            match cfg.format {
                ReportFormat::Json => oasclean_refs::print_json(&mut out, &result)?,
                ReportFormat::Text => {
                    oasclean_sanitize::print_sanitize_report(&mut out, &result)?;
                    finished(&mut out, start, result.documents_analyzed)?;
                }
            }
            out.flush()?;
            result.failures() > 0
        }
    };

    if failed {
        // Non-zero exit to fail CI
        std::process::exit(1);
    }
    Ok(())
}
