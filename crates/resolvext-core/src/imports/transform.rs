//! Whole-file rewriting.

use super::scan::{scan_specifiers, SiteKind};
use crate::error::Error;
use crate::rewrite::{rewrite_specifier, ResolutionContext, Rewrite};
use serde::Serialize;

/// One rewritten (or kept) site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteRewrite {
    pub line: u32,
    pub site: SiteKind,
    #[serde(flatten)]
    pub rewrite: Rewrite,
}

/// Result of transforming a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    /// Source text with every changed specifier replaced.
    pub code: String,
    /// Every site visited, in source order.
    pub sites: Vec<SiteRewrite>,
}

impl TransformOutput {
    /// Number of sites whose specifier changed.
    #[must_use]
    pub fn changed_count(&self) -> usize {
        self.sites.iter().filter(|s| s.rewrite.is_changed()).count()
    }

    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.changed_count() > 0
    }
}

/// Rewrite every specifier site in `source`.
///
/// Only the literal contents are replaced; quotes, whitespace and the rest
/// of the statement are left as written.
///
/// # Errors
/// The first error returned by [`rewrite_specifier`] aborts the file.
pub fn transform_source(source: &str, ctx: &ResolutionContext<'_>) -> Result<TransformOutput, Error> {
    let mut code = String::with_capacity(source.len());
    let mut sites = Vec::new();
    let mut last = 0;

    for site in scan_specifiers(source) {
        let rewrite = rewrite_specifier(&site.raw, ctx)?;

        if rewrite.is_changed() {
            code.push_str(&source[last..site.span.start]);
            code.push_str(rewrite.specifier());
            last = site.span.end;
        }

        sites.push(SiteRewrite {
            line: site.line,
            site: site.kind,
            rewrite,
        });
    }

    code.push_str(&source[last..]);
    Ok(TransformOutput { code, sites })
}
