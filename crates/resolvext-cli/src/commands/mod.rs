pub mod explain;
pub mod rewrite;
pub mod version;

use miette::{MietteDiagnostic, Report, Result};
use resolvext_core::paths::find_config_file;
use resolvext_core::{install_builtins, query_runtime_builtins, Error, ResolveOptions};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Runtime queried by `--runtime-builtins`.
const RUNTIME_PROGRAM: &str = "node";

/// Machine-readable error in JSON reports.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
}

impl From<&Error> for ErrorInfo {
    fn from(err: &Error) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// Convert a core error into a diagnostic, optionally naming the file it
/// came from.
pub fn diagnostic(err: &Error, file: Option<&Path>) -> Report {
    let message = match file {
        Some(file) => format!("{}: {err}", file.display()),
        None => err.to_string(),
    };
    let mut diag = MietteDiagnostic::new(message).with_code(err.code());
    if let Some(help) = help_for(err) {
        diag = diag.with_help(help);
    }
    Report::new(diag)
}

fn help_for(err: &Error) -> Option<&'static str> {
    match err {
        Error::UnresolvedPath { .. } | Error::UnresolvedModule { .. } => {
            Some("set \"ignoreUnresolved\": true or pass --ignore-unresolved to keep it as written")
        }
        Error::PackageNotFound { .. } => Some("is the package installed in a node_modules directory?"),
        Error::ConfigParse { .. } | Error::Configuration(_) => {
            Some("check the options file against the documented configuration format")
        }
        _ => None,
    }
}

/// Resolve `path` against `cwd`, canonicalizing when it exists.
pub fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    dunce::canonicalize(&joined).unwrap_or(joined)
}

/// Load rewrite options: the explicit file, else the nearest
/// `resolvext.json`, else defaults. Returns the file used, if any.
pub fn load_options(cwd: &Path, explicit: Option<&Path>) -> Result<(ResolveOptions, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => Some(absolutize(cwd, path)),
        None => find_config_file(cwd),
    };

    match path {
        Some(path) => {
            let options = ResolveOptions::load(&path).map_err(|e| diagnostic(&e, None))?;
            info!(config = %path.display(), "loaded options");
            Ok((options, Some(path)))
        }
        None => {
            debug!("no options file found, using defaults");
            Ok((ResolveOptions::default(), None))
        }
    }
}

/// Replace the embedded built-in list with the one reported by `node`.
///
/// Must run before any specifier is classified.
pub fn install_runtime_builtins() -> Result<()> {
    let modules = query_runtime_builtins(RUNTIME_PROGRAM).map_err(|e| diagnostic(&e, None))?;
    let count = modules.len();
    install_builtins(modules).map_err(|e| diagnostic(&e, None))?;
    info!(count, "using runtime built-in module list");
    Ok(())
}
