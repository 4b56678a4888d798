//! Owned collection of partial well records grouped by well name.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::error::{Result, WellMergeError};
use crate::merge::{MergeEngine, MergeReport, MergeResult};
use crate::table::CurveTable;

/// Partial records keyed by well name, in insertion order.
///
/// Which tables go in, and whether same-named records are merged, renamed or
/// skipped, is up to the caller.
#[derive(Debug, Clone, Default)]
pub struct WellRegistry {
    wells: IndexMap<String, Vec<CurveTable>>,
}

impl WellRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record to the group for its name.
    pub fn insert(&mut self, table: CurveTable) {
        let group = self.wells.entry(table.name().to_string()).or_default();
        group.push(table);
        debug!(well = %group[0].name(), records = group.len(), "registered record");
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.wells.keys().map(|k| k.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&[CurveTable]> {
        self.wells.get(name).map(|g| g.as_slice())
    }

    /// Number of distinct well names.
    pub fn len(&self) -> usize {
        self.wells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<CurveTable>> {
        self.wells.shift_remove(name)
    }

    /// Names that hold more than one partial record.
    pub fn duplicates(&self) -> Vec<&str> {
        self.wells
            .iter()
            .filter(|(_, group)| group.len() > 1)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Merge every record registered under `name`.
    ///
    /// The registry is left untouched.
    pub fn merge_well(&self, name: &str, engine: &MergeEngine) -> Result<MergeResult> {
        let group = self
            .wells
            .get(name)
            .ok_or_else(|| WellMergeError::WellNotFound(name.to_string()))?;
        engine.merge(group, name)
    }

    /// Merge all duplicate groups and replace each by its merged record.
    ///
    /// Every merge runs before any group is replaced, so an error leaves the
    /// registry as it was.
    pub fn merge_all(&mut self, engine: &MergeEngine) -> Result<IndexMap<String, MergeReport>> {
        let merged = self
            .duplicates()
            .into_iter()
            .map(|name| Ok((name.to_string(), self.merge_well(name, engine)?)))
            .collect::<Result<Vec<_>>>()?;

        let mut reports = IndexMap::with_capacity(merged.len());
        for (name, MergeResult { table, report }) in merged {
            if let Some(group) = self.wells.get_mut(&name) {
                *group = vec![table];
            }
            reports.insert(name, report);
        }

        info!(merged = reports.len(), wells = self.len(), "merged duplicate wells");
        Ok(reports)
    }
}

impl FromIterator<CurveTable> for WellRegistry {
    fn from_iter<I: IntoIterator<Item = CurveTable>>(iter: I) -> Self {
        let mut registry = Self::new();
        for table in iter {
            registry.insert(table);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, depths: Vec<f64>, gr: &[f64]) -> CurveTable {
        CurveTable::builder(name)
            .depths(depths)
            .readings("GR", gr)
            .build()
            .unwrap()
    }

    fn registry() -> WellRegistry {
        [
            record("POZO-1", vec![100.0, 100.5, 101.0], &[50.0, 55.0, 60.0]),
            record("POZO-2", vec![10.0, 11.0], &[1.0, 2.0]),
            record("POZO-1", vec![101.5, 102.0], &[65.0, 70.0]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_grouping_by_name() {
        let registry = registry();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["POZO-1", "POZO-2"]);
        assert_eq!(registry.get("POZO-1").unwrap().len(), 2);
        assert_eq!(registry.get("POZO-2").unwrap().len(), 1);
        assert_eq!(registry.duplicates(), vec!["POZO-1"]);
        assert!(registry.get("POZO-3").is_none());
    }

    #[test]
    fn test_merge_well() {
        let registry = registry();
        let result = registry.merge_well("POZO-1", &MergeEngine::new()).unwrap();

        assert_eq!(result.table.depths(), &[100.0, 100.5, 101.0, 101.5, 102.0]);
        assert_eq!(registry.get("POZO-1").unwrap().len(), 2);
    }

    #[test]
    fn test_merge_unknown_well() {
        let err = registry()
            .merge_well("POZO-9", &MergeEngine::new())
            .unwrap_err();
        assert!(matches!(err, WellMergeError::WellNotFound(name) if name == "POZO-9"));
    }

    #[test]
    fn test_merge_all_replaces_duplicates() {
        let mut registry = registry();
        let reports = registry.merge_all(&MergeEngine::new()).unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports["POZO-1"].sources.len(), 2);
        assert!(registry.duplicates().is_empty());

        let merged = &registry.get("POZO-1").unwrap()[0];
        assert_eq!(merged.row_count(), 5);
        assert_eq!(registry.get("POZO-2").unwrap()[0].row_count(), 2);
    }

    #[test]
    fn test_merge_all_error_leaves_registry_unchanged() {
        use crate::merge::{MergeConfig, UnitPolicy};

        let mut registry = registry();
        registry.insert(
            CurveTable::builder("POZO-2")
                .depths(vec![12.0])
                .curve(crate::table::Curve::from_readings("GR", &[3.0]).with_unit("API"))
                .build()
                .unwrap(),
        );
        registry.insert(
            CurveTable::builder("POZO-2")
                .depths(vec![13.0])
                .curve(crate::table::Curve::from_readings("GR", &[4.0]).with_unit("gAPI"))
                .build()
                .unwrap(),
        );

        let engine =
            MergeEngine::with_config(MergeConfig::default().with_unit_policy(UnitPolicy::Reject));
        assert!(registry.merge_all(&engine).is_err());
        assert_eq!(registry.get("POZO-1").unwrap().len(), 2);
        assert_eq!(registry.get("POZO-2").unwrap().len(), 3);
    }

    #[test]
    fn test_remove() {
        let mut registry = registry();
        let removed = registry.remove("POZO-1").unwrap();

        assert_eq!(removed.len(), 2);
        assert_eq!(registry.len(), 1);
        assert!(registry.remove("POZO-1").is_none());
    }
}
