//! Shared helper functions for CLI commands

use std::path::Path;

use miette::{IntoDiagnostic, Result};

use crate::core::catalog::Catalog;

/// Truncate a string to max_len, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}

/// Load a catalog from the given YAML path, or fall back to the built-in
/// six-operation chain. The catalog is validated either way.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let catalog = match path {
        Some(path) => Catalog::load(path).into_diagnostic()?,
        None => Catalog::default(),
    };
    catalog.validate().into_diagnostic()?;
    Ok(catalog)
}
