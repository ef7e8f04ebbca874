//! Identifier and package-path algebra.
//!
//! A document identifier is a dot-separated reverse-domain path such as
//! `app.bsky.feed.post`. Its output package lives under the module root at
//! `<root>/<reversed prefix>/<last part>`, e.g. `lexicon.me/feed.bsky.app/post`.

use crate::error::{CodegenError, Result};
use itertools::Itertools;
use smol_str::SmolStr;

/// Translate a document identifier into its output package path.
pub fn id_to_pkg(module_root: &str, id: &str) -> Result<String> {
    let parts: Vec<&str> = id.split('.').collect();
    if parts.len() < 3 {
        return Err(CodegenError::InvalidId { id: id.to_owned() });
    }
    let prefix = parts[..parts.len() - 1].iter().rev().join(".");
    Ok(format!("{module_root}/{prefix}/{}", parts[parts.len() - 1]))
}

/// The identifier a package path binds to when imported without an alias.
pub fn implied_import_ident(pkg: &str) -> &str {
    pkg.rsplit('/').next().unwrap_or(pkg)
}

/// A more informative identifier for packages whose final segment is `defs`:
/// the parent segment with `.` rewritten to `_`, when that forms a valid
/// identifier.
pub fn defs_import_ident(pkg: &str) -> Option<SmolStr> {
    let (dir, _) = pkg.rsplit_once('/')?;
    let base = dir.rsplit('/').next().unwrap_or(dir);
    let ident = base.replace('.', "_");
    (!ident.is_empty() && crate::cue::ast::is_valid_ident(&ident)).then(|| SmolStr::new(ident))
}

/// Strip the module root (and its trailing slash) from a package path.
pub fn trim_root<'a>(path: &'a str, module_root: &str) -> &'a str {
    path.strip_prefix(module_root)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(path)
}
