//! Specifier discovery and whole-file rewriting.

mod scan;
mod transform;

pub use scan::{scan_specifiers, SiteKind, SpecifierSite};
pub use transform::{transform_source, SiteRewrite, TransformOutput};
