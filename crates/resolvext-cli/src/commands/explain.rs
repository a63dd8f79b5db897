use super::{absolutize, install_runtime_builtins, load_options, ErrorInfo};
use miette::{IntoDiagnostic, Result};
use resolvext_core::{
    explain_specifier, Config, ResolutionContext, ResolveTraceStep, Rewrite,
    EXPLAIN_SCHEMA_VERSION,
};
use serde::Serialize;
use std::path::PathBuf;

/// Arguments of `resolvext explain`.
#[derive(Debug, Clone)]
pub struct ExplainAction {
    pub specifier: String,
    pub from: PathBuf,
    pub config: Option<PathBuf>,
    pub runtime_builtins: bool,
}

#[derive(Debug, Serialize)]
struct ExplainReport {
    schema_version: u32,
    specifier: String,
    from: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Rewrite>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorInfo>,
    trace: Vec<ResolveTraceStep>,
}

pub fn run(config: &Config, action: ExplainAction) -> Result<()> {
    if action.runtime_builtins {
        install_runtime_builtins()?;
    }

    let (options, config_path) = load_options(&config.cwd, action.config.as_deref())?;
    let from = absolutize(&config.cwd, &action.from);

    let ctx = ResolutionContext::new(&from, &options);
    let (result, trace) = explain_specifier(&action.specifier, &ctx);

    let (result, error) = match result {
        Ok(rewrite) => (Some(rewrite), None),
        Err(err) => (None, Some(ErrorInfo::from(&err))),
    };
    let failed = error.is_some();

    let report = ExplainReport {
        schema_version: EXPLAIN_SCHEMA_VERSION,
        specifier: action.specifier,
        from,
        config: config_path,
        result,
        error,
        trace: trace.steps,
    };

    if config.json_logs {
        let json = serde_json::to_string_pretty(&report).into_diagnostic()?;
        println!("{json}");
    } else {
        print_human(&report);
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

fn print_human(report: &ExplainReport) {
    println!("Specifier: {}", report.specifier);
    println!("From: {}", report.from.display());
    if let Some(config) = &report.config {
        println!("Config: {}", config.display());
    }
    println!();

    if let Some(result) = &report.result {
        println!("Kind: {}", result.kind);
        if result.is_changed() {
            println!("Rewritten: {}", result.specifier());
        } else {
            println!("Unchanged: {}", result.original);
        }
    }
    if let Some(error) = &report.error {
        println!("Status: UNRESOLVED");
        println!("Error: {}", error.code);
        println!("Message: {}", error.message);
    }
    println!();

    println!("Resolution trace:");
    for (i, step) in report.trace.iter().enumerate() {
        let status = if step.ok { "OK" } else { "FAIL" };
        println!("  {}. [{}] {}: {}", i + 1, status, step.step, step.detail);

        if let Some(path) = &step.path {
            println!("      path: {}", path.display());
        }
        if let Some(key) = &step.key {
            println!("      key: {key}");
        }
        for note in &step.notes {
            println!("      note: {note}");
        }
    }
}
