//! Application catalog loading.
//!
//! The catalog is static JSON read once at startup. Structural problems
//! (bad JSON, duplicate ids) fail the load. Unknown store types and missing
//! listing identifiers only produce warnings: they surface later as failures
//! of the affected targets without blocking the others.

use std::path::Path;

use storewatch_core::error::CoreError;
use storewatch_core::types::{Catalog, StoreKind};

/// Read and validate the catalog at `path`, logging any warnings.
pub fn load_catalog(path: &Path) -> Result<Catalog, CoreError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        CoreError::Validation(format!("Cannot read catalog {}: {e}", path.display()))
    })?;
    let catalog = Catalog::from_json(&raw)?;

    for warning in catalog_warnings(&catalog) {
        tracing::warn!(path = %path.display(), "{warning}");
    }
    tracing::info!(
        path = %path.display(),
        apps = catalog.apps.len(),
        targets = catalog.target_count(),
        "Loaded application catalog"
    );
    Ok(catalog)
}

/// Targets that are certain to fail at scrape time.
pub fn catalog_warnings(catalog: &Catalog) -> Vec<String> {
    let mut warnings = Vec::new();
    for app in &catalog.apps {
        for target in &app.stores {
            match StoreKind::from_name(&target.kind) {
                None => warnings.push(format!(
                    "{}/{}: unsupported store type '{}'",
                    app.id, target.id, target.kind
                )),
                Some(kind) if target.identifier(kind).is_none() => warnings.push(format!(
                    "{}/{}: missing {} for {}",
                    app.id,
                    target.id,
                    kind.identifier_field(),
                    kind.label()
                )),
                Some(_) => {}
            }
        }
    }
    warnings
}
