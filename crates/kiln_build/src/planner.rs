//! Skip-or-recompile decisions.

use std::collections::HashMap;
use std::path::PathBuf;

use kiln_cache::{CacheError, HashStore, SourceHasher};
use kiln_common::ContentHash;

use crate::unit::CompilationUnit;

/// Outcome of planning one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The recorded digest matches; nothing to do.
    Skip,
    /// The unit is new or changed and the store already holds its new digest.
    Recompile {
        /// The entry the store held before this run, for [`RebuildPlanner::revert`].
        previous: Option<ContentHash>,
    },
}

/// Compares each unit's current digest with the hash store.
///
/// A dirty unit's entry is updated immediately, before it is compiled. If the
/// compile then fails, the caller can put the old entry back with
/// [`revert`](Self::revert); otherwise the next run treats the unit as clean.
pub struct RebuildPlanner<'a> {
    store: &'a mut HashStore,
    claimed_objects: HashMap<PathBuf, PathBuf>,
}

impl<'a> RebuildPlanner<'a> {
    /// Creates a planner that reads and updates `store`.
    pub fn new(store: &'a mut HashStore) -> Self {
        Self {
            store,
            claimed_objects: HashMap::new(),
        }
    }

    /// Hashes the unit's source and decides whether it needs recompiling.
    ///
    /// Marks `unit.dirty` accordingly. An unreadable source is returned as an
    /// error and the store is left untouched for that unit.
    pub fn plan(&mut self, unit: &mut CompilationUnit) -> Result<Decision, CacheError> {
        self.claim_object(unit);

        let digest = SourceHasher::hash_file(&unit.source)?;
        if self.store.get(&unit.source) == Some(&digest) {
            unit.dirty = false;
            return Ok(Decision::Skip);
        }

        unit.dirty = true;
        let previous = self.store.insert(unit.source.clone(), digest);
        Ok(Decision::Recompile { previous })
    }

    /// Restores the store entry a [`Decision::Recompile`] replaced.
    pub fn revert(&mut self, unit: &CompilationUnit, previous: Option<ContentHash>) {
        self.store.restore(&unit.source, previous);
    }

    fn claim_object(&mut self, unit: &CompilationUnit) {
        if let Some(other) = self
            .claimed_objects
            .insert(unit.object.clone(), unit.source.clone())
        {
            if other != unit.source {
                tracing::warn!(
                    object = %unit.object.display(),
                    first = %other.display(),
                    second = %unit.source.display(),
                    "two sources map to the same object file"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn unit_in(dir: &Path, rel: &str, content: &str) -> CompilationUnit {
        let source = dir.join("src").join(rel);
        std::fs::create_dir_all(source.parent().unwrap()).unwrap();
        std::fs::write(&source, content).unwrap();
        CompilationUnit::new(source, &dir.join("src"), &dir.join("build"), "o")
    }

    #[test]
    fn unknown_unit_is_recompiled_and_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let mut unit = unit_in(dir.path(), "a.cpp", "int a;");
        let mut store = HashStore::new();

        let decision = RebuildPlanner::new(&mut store).plan(&mut unit).unwrap();
        assert_eq!(decision, Decision::Recompile { previous: None });
        assert!(unit.dirty);
        assert_eq!(
            store.get(&unit.source),
            Some(&ContentHash::from_bytes(b"int a;"))
        );
    }

    #[test]
    fn matching_digest_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut unit = unit_in(dir.path(), "a.cpp", "int a;");
        let mut store = HashStore::new();
        store.insert(unit.source.clone(), ContentHash::from_bytes(b"int a;"));

        let decision = RebuildPlanner::new(&mut store).plan(&mut unit).unwrap();
        assert_eq!(decision, Decision::Skip);
        assert!(!unit.dirty);
    }

    #[test]
    fn changed_digest_replaces_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut unit = unit_in(dir.path(), "a.cpp", "int a = 2;");
        let old = ContentHash::from_bytes(b"int a = 1;");
        let mut store = HashStore::new();
        store.insert(unit.source.clone(), old);

        let decision = RebuildPlanner::new(&mut store).plan(&mut unit).unwrap();
        assert_eq!(decision, Decision::Recompile { previous: Some(old) });
        assert_eq!(
            store.get(&unit.source),
            Some(&ContentHash::from_bytes(b"int a = 2;"))
        );
    }

    #[test]
    fn revert_restores_previous_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut changed = unit_in(dir.path(), "a.cpp", "int a = 2;");
        let mut fresh = unit_in(dir.path(), "b.cpp", "int b;");
        let old = ContentHash::from_bytes(b"int a = 1;");
        let mut store = HashStore::new();
        store.insert(changed.source.clone(), old);

        {
            let mut planner = RebuildPlanner::new(&mut store);
            for unit in [&mut changed, &mut fresh] {
                if let Decision::Recompile { previous } = planner.plan(unit).unwrap() {
                    planner.revert(unit, previous);
                }
            }
        }
        assert_eq!(store.get(&changed.source), Some(&old));
        assert!(!store.contains(&fresh.source));
    }

    #[test]
    fn unreadable_source_is_error_and_leaves_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut unit = CompilationUnit::new(
            dir.path().join("src/gone.cpp"),
            &dir.path().join("src"),
            &dir.path().join("build"),
            "o",
        );
        let mut store = HashStore::new();

        let result = RebuildPlanner::new(&mut store).plan(&mut unit);
        assert!(matches!(result, Err(CacheError::Io { .. })));
        assert!(store.is_empty());
    }
}
