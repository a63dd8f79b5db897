//! Built-in module registry.
//!
//! Built-in names are never resolved against the filesystem. The set is
//! fixed once per process: either installed by the host before first use,
//! or the embedded Node.js list on first access.

use crate::error::Error;
use std::collections::HashSet;
use std::process::Command;
use std::sync::OnceLock;

/// Scheme reserved exclusively for built-in modules.
pub const BUILTIN_SCHEME: &str = "node:";

/// Node.js built-in module names (as reported by `require('module').builtinModules`).
pub const NODE_BUILTIN_MODULES: &[&str] = &[
    "_http_agent",
    "_http_client",
    "_http_common",
    "_http_incoming",
    "_http_outgoing",
    "_http_server",
    "_stream_duplex",
    "_stream_passthrough",
    "_stream_readable",
    "_stream_transform",
    "_stream_wrap",
    "_stream_writable",
    "_tls_common",
    "_tls_wrap",
    "assert",
    "assert/strict",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "dns/promises",
    "domain",
    "events",
    "fs",
    "fs/promises",
    "http",
    "http2",
    "https",
    "inspector",
    "inspector/promises",
    "module",
    "net",
    "os",
    "path",
    "path/posix",
    "path/win32",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "readline/promises",
    "repl",
    "stream",
    "stream/consumers",
    "stream/promises",
    "stream/web",
    "string_decoder",
    "sys",
    "timers",
    "timers/promises",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "util/types",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Script passed to the runtime to enumerate its built-in modules.
const RUNTIME_QUERY: &str = "require('module').builtinModules.join('\\n')";

static BUILTINS: OnceLock<BuiltinModules> = OnceLock::new();

/// A set of reserved built-in module names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinModules {
    names: HashSet<String>,
}

impl BuiltinModules {
    /// The embedded Node.js list.
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_names(NODE_BUILTIN_MODULES.iter().copied())
    }

    /// Build a set from arbitrary names. Blank entries are dropped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = names
            .into_iter()
            .map(Into::into)
            .map(|n: String| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        Self { names }
    }

    /// Whether `name` is exactly a known built-in name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Whether a specifier refers to a built-in module (known name or `node:` scheme).
    #[must_use]
    pub fn is_builtin(&self, specifier: &str) -> bool {
        specifier.starts_with(BUILTIN_SCHEME) || self.contains(specifier)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The process-wide built-in set, initializing it with the embedded list if
/// nothing was installed first.
pub fn builtin_modules() -> &'static BuiltinModules {
    BUILTINS.get_or_init(BuiltinModules::embedded)
}

/// Install the process-wide built-in set.
///
/// # Errors
/// Returns `Configuration` if the set was already fixed (installed earlier,
/// or read by a classification).
pub fn install_builtins(modules: BuiltinModules) -> Result<(), Error> {
    BUILTINS
        .set(modules)
        .map_err(|_| Error::configuration("built-in module set is already initialized"))
}

/// Enumerate built-in module names from a JavaScript runtime on `PATH`.
///
/// # Errors
/// Returns `Configuration` if the program cannot be found, exits with an
/// error, or reports no names.
pub fn query_runtime_builtins(program: &str) -> Result<BuiltinModules, Error> {
    let path = which::which(program).map_err(|e| {
        Error::configuration(format!("built-in module enumeration unavailable: {program}: {e}"))
    })?;

    let output = Command::new(&path)
        .args(["-p", RUNTIME_QUERY])
        .output()
        .map_err(|e| {
            Error::configuration(format!(
                "built-in module enumeration failed: {}: {e}",
                path.display()
            ))
        })?;

    if !output.status.success() {
        return Err(Error::configuration(format!(
            "built-in module enumeration failed: {} exited with {}",
            path.display(),
            output.status
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let modules = BuiltinModules::from_names(stdout.lines());
    if modules.is_empty() {
        return Err(Error::configuration(format!(
            "built-in module enumeration returned no names: {}",
            path.display()
        )));
    }

    Ok(modules)
}
