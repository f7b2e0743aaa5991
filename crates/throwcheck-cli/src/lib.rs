//! throwcheck runner
//!
//! Loads a host-exported program (JSON), loads the optional rule config, runs
//! the rule and renders the findings as text or JSON.

use clap::ValueEnum;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use throwcheck_ast::Program;
use throwcheck_rule::{
    check_program, CompileError, ConfigError, DiagnosticFormatter, RuleConfig, Severity,
};
use tracing_subscriber::{fmt, EnvFilter};

/// Failures that stop a run before or after checking.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read program {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid program export {path}: {source}")]
    Program {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("program export {path} has no single root node ({parentless} nodes without a parent)")]
    Root { path: PathBuf, parentless: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to render findings: {0}")]
    Render(#[from] serde_json::Error),
}

/// How findings are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Source snippets with carets
    Text,
    /// Machine-readable report
    Json,
}

/// One invocation of the runner.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub program: PathBuf,
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
    pub deny_warnings: bool,
}

/// Rendered findings plus the process exit status.
#[derive(Debug)]
pub struct RunOutcome {
    pub findings: Vec<CompileError>,
    pub output: String,
    pub exit_code: i32,
}

#[derive(Serialize)]
struct Report<'a> {
    path: &'a Path,
    findings: &'a [CompileError],
}

/// Initialize logging to stderr. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("throwcheck=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads a program export and restores its parent links.
///
/// Exports may list nodes in any order. Without an explicit `root`, the
/// export must have exactly one node without a parent.
pub fn load_program(path: &Path) -> Result<Program, LoadError> {
    let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut program: Program =
        serde_json::from_str(&json).map_err(|source| LoadError::Program {
            path: path.to_path_buf(),
            source,
        })?;

    program.link_parents();
    if !program.tree.is_empty() && program.tree.root().is_none() {
        return Err(LoadError::Root {
            path: path.to_path_buf(),
            parentless: program.tree.parentless().len(),
        });
    }
    if program.path.as_os_str().is_empty() {
        program.path = path.to_path_buf();
    }

    tracing::debug!(
        nodes = program.tree.len(),
        declarations = program.declarations.len(),
        types = program.types.len(),
        "program loaded"
    );

    Ok(program)
}

/// Loads the rule config, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<RuleConfig, LoadError> {
    match path {
        Some(path) => Ok(RuleConfig::from_path(path)?),
        None => Ok(RuleConfig::default()),
    }
}

/// Renders findings in the requested format.
pub fn render(
    program: &Program,
    findings: &[CompileError],
    format: OutputFormat,
) -> Result<String, LoadError> {
    match format {
        OutputFormat::Text => {
            let sources = program.source_map();
            Ok(DiagnosticFormatter::new(&sources).format_all(findings))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&Report {
            path: &program.path,
            findings,
        })?),
    }
}

/// 1 when an error-severity finding exists, or any finding under
/// `deny_warnings`; 0 otherwise.
pub fn exit_code(findings: &[CompileError], deny_warnings: bool) -> i32 {
    let failing = findings
        .iter()
        .any(|f| f.severity == Severity::Error || deny_warnings);
    i32::from(failing)
}

/// Loads, checks and renders one program.
pub fn run(options: &RunOptions) -> Result<RunOutcome, LoadError> {
    let config = load_config(options.config.as_deref())?;
    let program = load_program(&options.program)?;

    let findings = check_program(&program, &config);
    let output = render(&program, &findings, options.format)?;
    let exit_code = exit_code(&findings, options.deny_warnings);

    Ok(RunOutcome {
        findings,
        output,
        exit_code,
    })
}
