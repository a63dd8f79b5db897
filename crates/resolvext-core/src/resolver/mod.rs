//! Specifier resolution engine.
//!
//! Extension probing, `node_modules` package lookup, and manifest entry
//! resolution. The orchestration lives in [`crate::rewrite`].

mod extensions;
mod locate;
mod manifest;
mod probe;
pub mod trace;

pub use extensions::{ExtensionRule, ExtensionRules, RawExtensionRule, RawRulePart};
pub use locate::{default_global_dirs, locate_package_dir, NODE_MODULES, NODE_PATH_ENV};
pub use manifest::{
    resolve_entry, EntryDescriptor, PackageManifest, RawEntryDescriptor, EXPORTS_KEY,
    MANIFEST_FILE,
};
pub use probe::{resolve_extension, Probe, ProbeMode};
pub use trace::{steps as trace_steps, ResolveTrace, ResolveTraceStep, EXPLAIN_SCHEMA_VERSION};
