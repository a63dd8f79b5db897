#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::return_self_not_must_use)]

pub mod builtins;
pub mod config;
pub mod error;
pub mod imports;
pub mod paths;
pub mod resolver;
pub mod rewrite;
pub mod specifier;
pub mod version;

pub use builtins::{builtin_modules, install_builtins, query_runtime_builtins, BuiltinModules};
pub use config::{Config, RawOptions, ResolveOptions};
pub use error::Error;
pub use imports::{scan_specifiers, transform_source, SiteKind, SpecifierSite, TransformOutput};
pub use resolver::{ResolveTrace, ResolveTraceStep, EXPLAIN_SCHEMA_VERSION};
pub use rewrite::{
    explain_specifier, rewrite_specifier, Outcome, ResolutionContext, Rewrite, UnchangedReason,
};
pub use specifier::{classify, SpecifierKind};
pub use version::VERSION;
