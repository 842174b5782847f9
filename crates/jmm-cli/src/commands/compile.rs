//! `jmmc <INPUT>`: compile one Java-- source file.

use crate::output::{resolve_color_choice, ColorWhen, StyledOutput};
use anyhow::{bail, Context};
use jmm_engine::parser::checker::{create_files, JsonDiagnostic};
use jmm_engine::{CompilationOutput, CompilerConfig, Diagnostic, Pipeline, Report, Severity};
use std::fmt;
use std::path::{Path, PathBuf};

/// Artifact printed after a successful compilation.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emit {
    Ollir,
    Jasmin,
    Symbols,
}

impl fmt::Display for Emit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Emit::Ollir => write!(f, "ollir"),
            Emit::Jasmin => write!(f, "jasmin"),
            Emit::Symbols => write!(f, "symbols"),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct Args {
    /// Source file to compile
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Request optimizations (recorded only)
    #[arg(short, long)]
    pub optimize: bool,

    /// Register budget for allocation (recorded only)
    #[arg(short, long, value_name = "N", allow_negative_numbers = true)]
    pub register_allocation: Option<i32>,

    /// Print the AST, symbol table and IR while compiling
    #[arg(short, long)]
    pub debug: bool,

    /// Artifact to print
    #[arg(long, default_value_t = Emit::Jasmin)]
    pub emit: Emit,

    /// Write the artifact to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print diagnostics as JSON
    #[arg(long)]
    pub json: bool,

    /// TOML file with `inputFile`, `optimize`, `registerAllocation` and `debug`
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// When to color diagnostics
    #[arg(long, value_name = "WHEN", value_enum, default_value_t = ColorWhen::Auto)]
    pub color: ColorWhen,
}

/// Merge the optional config file with the command line. Flags win.
pub fn resolve_config(args: &Args) -> anyhow::Result<CompilerConfig> {
    let mut config = match &args.config {
        Some(path) => CompilerConfig::from_toml_file(path)?,
        None => CompilerConfig::default(),
    };
    config.input_file = Some(args.input.clone());
    if args.optimize {
        config.optimize = true;
    }
    if let Some(registers) = args.register_allocation {
        config.register_allocation = registers;
    }
    if args.debug {
        config.debug = true;
    }
    Ok(config)
}

pub fn execute(args: &Args, config: CompilerConfig) -> anyhow::Result<()> {
    let mut out = StyledOutput::new(resolve_color_choice(args.color));
    let path = config
        .input_file
        .clone()
        .unwrap_or_else(|| args.input.clone());
    log::debug!("configuration: {:?}", config.to_map());

    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let pipeline = Pipeline::new(config);
    let output = match pipeline.compile(&source) {
        Ok(output) => output,
        Err(err) => {
            let reports = err.reports();
            if reports.is_empty() {
                return Err(err).with_context(|| format!("could not compile {}", path.display()));
            }
            render_reports(&mut out, &path, &source, &reports, args.json)?;
            let errors = reports.iter().filter(|r| r.severity == Severity::Error).count();
            bail!(
                "could not compile {} due to {} previous error{}",
                path.display(),
                errors,
                if errors == 1 { "" } else { "s" }
            );
        }
    };

    if !output.reports.is_empty() {
        render_reports(&mut out, &path, &source, &output.reports, args.json)?;
    }

    let artifact = artifact(&output, args.emit);
    match &args.output {
        Some(target) => {
            std::fs::write(target, &artifact)
                .with_context(|| format!("failed to write {}", target.display()))?;
            out.success("Compiled");
            out.plain(&format!(" {} -> {} ({})", path.display(), target.display(), args.emit));
            out.newline();
        }
        None => print!("{}", artifact),
    }
    Ok(())
}

fn artifact(output: &CompilationOutput, emit: Emit) -> String {
    match emit {
        Emit::Ollir => output.ir.clone(),
        Emit::Jasmin => output.jasmin.clone(),
        Emit::Symbols => output.symbol_table.to_string(),
    }
}

/// Print reports as codespan diagnostics on stderr, or as a JSON array on
/// stdout.
fn render_reports(
    out: &mut StyledOutput,
    path: &Path,
    source: &str,
    reports: &[Report],
    json: bool,
) -> anyhow::Result<()> {
    let files = create_files(path, source);
    let diagnostics: Vec<Diagnostic> = reports
        .iter()
        .map(|report| Diagnostic::from_report(report, 0, &files))
        .collect();

    if json {
        let json: Vec<JsonDiagnostic> = diagnostics
            .iter()
            .map(|diag| JsonDiagnostic::from_diagnostic(diag, &files))
            .collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    for (report, diag) in reports.iter().zip(&diagnostics) {
        if let Err(err) = diag.emit_to(out.stream(), &files) {
            log::debug!("falling back to plain report: {}", err);
            match report.severity {
                Severity::Error => out.error(&report.severity.to_string()),
                Severity::Warning => out.warning(&report.severity.to_string()),
            }
            out.plain(&format!(
                " [{}] {}:{}: {}",
                report.stage, report.line, report.col, report.message
            ));
            out.newline();
        }
    }
    Ok(())
}
