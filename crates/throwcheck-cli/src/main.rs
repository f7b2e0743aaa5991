//! throwcheck
//!
//! Reports calls to `@Throws` declarations that nothing handles.
//!
//! Usage:
//!
//! ```text
//! throwcheck <program.json> [--config throwcheck.json] [--format text|json] [--deny-warnings]
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::process;
use throwcheck_cli::{run, OutputFormat, RunOptions};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "throwcheck")]
#[command(about = "Report calls to @Throws declarations whose failures nothing handles")]
struct Cli {
    /// Path to a resolved program exported by the host front-end (JSON)
    program: PathBuf,

    /// Path to a rule config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format for findings
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Exit with status 1 on any finding, not only errors
    #[arg(long)]
    deny_warnings: bool,
}

fn main() {
    throwcheck_cli::init_logging();

    let cli = Cli::parse();

    info!("Checking {}", cli.program.display());

    let options = RunOptions {
        program: cli.program,
        config: cli.config,
        format: cli.format,
        deny_warnings: cli.deny_warnings,
    };

    match run(&options) {
        Ok(outcome) => {
            if !outcome.output.is_empty() {
                println!("{}", outcome.output);
            }
            info!("{} finding(s)", outcome.findings.len());
            process::exit(outcome.exit_code);
        }
        Err(e) => {
            error!("{}", e);
            process::exit(2);
        }
    }
}
