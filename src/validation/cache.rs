//! Content-addressed cache of validation reports

use std::collections::HashMap;
use std::sync::Mutex;

use sha2::{Digest, Sha256};
use tracing::debug;

use super::validator::{SchemaValidator, ValidationReport, ValidatorConfig};
use crate::models::Schema;

/// SHA-256 over the schema content (name, tables, relationships, policies)
/// and the validator settings. Ids and timestamps are excluded, so two
/// snapshots with the same content share a fingerprint.
pub fn fingerprint(schema: &Schema, config: &ValidatorConfig) -> String {
    let mut hasher = Sha256::new();
    hasher.update(schema.name.as_bytes());
    // Plain model data always serializes.
    hasher.update(serde_json::to_vec(&schema.tables).unwrap_or_default());
    hasher.update(serde_json::to_vec(&schema.relationships).unwrap_or_default());
    hasher.update(serde_json::to_vec(&schema.policies).unwrap_or_default());
    hasher.update(serde_json::to_vec(config).unwrap_or_default());
    format!("{:x}", hasher.finalize())
}

/// Explicit, shareable store of validation results.
///
/// Create one per process (or per test) and pass it where needed; entries
/// never expire on their own, call [`ValidationCache::clear`] to drop them.
#[derive(Debug, Default)]
pub struct ValidationCache {
    entries: Mutex<HashMap<String, ValidationReport>>,
}

impl ValidationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached report for this content, validating on a miss.
    pub fn validate(&self, validator: &SchemaValidator, schema: &Schema) -> ValidationReport {
        let key = fingerprint(schema, validator.config());

        if let Some(report) = self.lock().get(&key) {
            debug!(fingerprint = %key, "Validation cache hit");
            return report.clone();
        }

        let report = validator.validate(schema);
        self.lock().insert(key, report.clone());
        report
    }

    pub fn get(&self, schema: &Schema, config: &ValidatorConfig) -> Option<ValidationReport> {
        self.lock().get(&fingerprint(schema, config)).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, ValidationReport>> {
        // A poisoned map still holds complete reports.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, DataType, Table};

    fn schema() -> Schema {
        let mut schema = Schema::new("shop");
        schema
            .add_table(Table::new(
                "customers",
                vec![Column::new("id", DataType::Uuid).primary_key()],
            ))
            .unwrap();
        schema
    }

    #[test]
    fn test_fingerprint_ignores_timestamps_and_id() {
        let a = schema();
        let mut b = a.clone();
        b.id = uuid::Uuid::new_v4();
        b.updated_at = b.updated_at + chrono::Duration::hours(1);
        b.version += 3;
        let config = ValidatorConfig::default();
        assert_eq!(fingerprint(&a, &config), fingerprint(&b, &config));
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = schema();
        let mut b = a.clone();
        b.tables[0].columns.push(Column::new("name", DataType::Text));
        let config = ValidatorConfig::default();
        assert_ne!(fingerprint(&a, &config), fingerprint(&b, &config));
    }

    #[test]
    fn test_cache_hit_and_clear() {
        let cache = ValidationCache::new();
        let validator = SchemaValidator::default();
        let schema = schema();

        let first = cache.validate(&validator, &schema);
        let second = cache.validate(&validator, &schema);
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&schema, validator.config()).is_some());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_config_is_part_of_key() {
        let cache = ValidationCache::new();
        let schema = schema();
        cache.validate(&SchemaValidator::default(), &schema);
        cache.validate(
            &SchemaValidator::new(ValidatorConfig {
                require_uuid_primary_keys: false,
                ..Default::default()
            }),
            &schema,
        );
        assert_eq!(cache.len(), 2);
    }
}
