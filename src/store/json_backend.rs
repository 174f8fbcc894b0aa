//! Atomic JSON persistence for a [`MemoryStore`] snapshot.

use std::{fs, path::Path};

use crate::store::{MemoryStore, Result};

const TMP_SUFFIX: &str = "tmp";

/// Writes the store to disk atomically by staging to a temporary file.
pub fn save_store_to_path(store: &MemoryStore, path: &Path) -> Result<()> {
    let tmp = path.with_extension(TMP_SUFFIX);
    let json = serde_json::to_string_pretty(store)?;
    fs::write(&tmp, json)?;
    fs::rename(tmp, path)?;
    Ok(())
}

/// Loads a store snapshot from disk, returning structured errors on failure.
pub fn load_store_from_path(path: &Path) -> Result<MemoryStore> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Biller, PaymentSchedule};
    use crate::period::{Period, TimingBucket};
    use crate::store::ObligationStore;

    #[test]
    fn store_round_trips_through_disk() {
        let mut store = MemoryStore::new();
        let biller = Biller::new("Internet", "Utilities", 1500_00, Some(10));
        let biller_id = biller.id;
        store.save_biller(biller).unwrap();
        store
            .insert_schedules(vec![PaymentSchedule::for_biller(
                biller_id,
                Period::new(2026, 1),
                TimingBucket::FirstHalf,
                1500_00,
            )])
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        save_store_to_path(&store, &path).unwrap();

        let loaded = load_store_from_path(&path).unwrap();
        assert_eq!(loaded.schema_version, store.schema_version);
        assert!(loaded.biller(biller_id).is_some());
        assert_eq!(loaded.schedules.len(), 1);
    }
}
