use super::{absolutize, diagnostic, install_runtime_builtins, load_options, ErrorInfo};
use miette::{IntoDiagnostic, Result};
use rayon::prelude::*;
use resolvext_core::imports::SiteRewrite;
use resolvext_core::resolver::default_global_dirs;
use resolvext_core::{transform_source, Config, Error, ResolutionContext, ResolveOptions};
use resolvext_util::fs::{read_to_string_lossy, write_if_changed};
use resolvext_util::walk::collect_source_files;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Schema version for the rewrite JSON report.
pub const REWRITE_SCHEMA_VERSION: u32 = 1;

/// Arguments of `resolvext rewrite`.
#[derive(Debug, Clone)]
pub struct RewriteAction {
    pub paths: Vec<PathBuf>,
    pub config: Option<PathBuf>,
    pub write: bool,
    pub check: bool,
    pub ignore_unresolved: bool,
    pub keep_going: bool,
    pub runtime_builtins: bool,
}

#[derive(Debug, Serialize)]
struct FileReport {
    path: PathBuf,
    changed: usize,
    written: bool,
    sites: Vec<SiteRewrite>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorInfo>,
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    files: usize,
    changed_files: usize,
    rewrites: usize,
    errors: usize,
}

#[derive(Debug, Serialize)]
struct RewriteReport {
    schema_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<PathBuf>,
    write: bool,
    files: Vec<FileReport>,
    summary: Summary,
}

/// A transformed file, before anything is written.
struct Transformed {
    path: PathBuf,
    result: std::result::Result<(String, Vec<SiteRewrite>), Error>,
}

pub fn run(config: &Config, action: RewriteAction) -> Result<()> {
    let cwd = &config.cwd;

    if action.runtime_builtins {
        install_runtime_builtins()?;
    }

    let (mut options, config_path) = load_options(cwd, action.config.as_deref())?;
    if action.ignore_unresolved {
        options.ignore_unresolved = true;
    }

    let roots: Vec<PathBuf> = action.paths.iter().map(|p| absolutize(cwd, p)).collect();
    let files = collect_source_files(&roots).into_diagnostic()?;
    info!(count = files.len(), "collected source files");

    let global_dirs = default_global_dirs();
    let transformed: Vec<Transformed> = files
        .par_iter()
        .map(|path| transform_file(path, &options, &global_dirs))
        .collect();

    // Without --keep-going, the first failure aborts before anything is written.
    if !action.keep_going {
        if let Some(failed) = transformed.iter().find(|t| t.result.is_err()) {
            if let Err(err) = &failed.result {
                return Err(diagnostic(err, Some(&failed.path)));
            }
        }
    }

    let mut reports = Vec::with_capacity(transformed.len());
    let mut summary = Summary {
        files: transformed.len(),
        ..Summary::default()
    };

    for item in transformed {
        let report = match item.result {
            Ok((code, sites)) => {
                let changed = sites.iter().filter(|s| s.rewrite.is_changed()).count();
                let written = if action.write && changed > 0 {
                    write_if_changed(&item.path, code.as_bytes()).into_diagnostic()?
                } else {
                    false
                };
                if changed > 0 {
                    summary.changed_files += 1;
                    summary.rewrites += changed;
                }
                FileReport {
                    path: item.path,
                    changed,
                    written,
                    sites,
                    error: None,
                }
            }
            Err(err) => {
                warn!(file = %item.path.display(), code = err.code(), "{err}");
                summary.errors += 1;
                FileReport {
                    path: item.path,
                    changed: 0,
                    written: false,
                    sites: Vec::new(),
                    error: Some(ErrorInfo::from(&err)),
                }
            }
        };
        reports.push(report);
    }

    let report = RewriteReport {
        schema_version: REWRITE_SCHEMA_VERSION,
        config: config_path,
        write: action.write,
        files: reports,
        summary,
    };

    if config.json_logs {
        let json = serde_json::to_string_pretty(&report).into_diagnostic()?;
        println!("{json}");
    } else {
        print_human(&report, cwd).into_diagnostic()?;
    }

    if report.summary.errors > 0 {
        std::process::exit(1);
    }
    if action.check && report.summary.changed_files > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn transform_file(path: &Path, options: &ResolveOptions, global_dirs: &[PathBuf]) -> Transformed {
    let result = read_to_string_lossy(path)
        .map_err(Error::from)
        .and_then(|source| {
            let ctx = ResolutionContext::new(path, options).with_global_dirs(global_dirs.to_vec());
            transform_source(&source, &ctx)
        })
        .map(|out| {
            for site in out.sites.iter().filter(|s| s.rewrite.is_changed()) {
                debug!(
                    file = %path.display(),
                    line = site.line,
                    from = %site.rewrite.original,
                    to = %site.rewrite.specifier(),
                    "rewrite"
                );
            }
            info!(file = %path.display(), changed = out.changed_count(), "processed");
            (out.code, out.sites)
        });

    Transformed {
        path: path.to_path_buf(),
        result,
    }
}

fn print_human(report: &RewriteReport, cwd: &Path) -> io::Result<()> {
    let mut out = io::stdout().lock();

    for file in &report.files {
        let display = file.path.strip_prefix(cwd).unwrap_or(&file.path);

        if let Some(error) = &file.error {
            writeln!(out, "{}: error [{}] {}", display.display(), error.code, error.message)?;
            continue;
        }
        if file.changed == 0 {
            continue;
        }

        let verb = if file.written { "rewrote" } else { "would rewrite" };
        writeln!(out, "{}: {verb} {} specifier(s)", display.display(), file.changed)?;
        for site in file.sites.iter().filter(|s| s.rewrite.is_changed()) {
            writeln!(
                out,
                "  {}: {} -> {}",
                site.line,
                site.rewrite.original,
                site.rewrite.specifier()
            )?;
        }
    }

    let s = &report.summary;
    writeln!(
        out,
        "{} file(s) scanned, {} changed, {} rewrite(s), {} error(s)",
        s.files, s.changed_files, s.rewrites, s.errors
    )?;
    Ok(())
}
