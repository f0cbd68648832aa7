use super::Snapshot;
use std::collections::BTreeSet;

/// Files that differ between two snapshots by path or content hash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedFiles {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
    pub modified: BTreeSet<String>,
}

impl ChangedFiles {
    pub fn between(before: &Snapshot, after: &Snapshot) -> Self {
        let mut changed = ChangedFiles::default();

        for (path, hash) in &after.files {
            match before.files.get(path) {
                None => {
                    changed.added.insert(path.clone());
                }
                Some(previous) if previous != hash => {
                    changed.modified.insert(path.clone());
                }
                Some(_) => {}
            }
        }
        for path in before.files.keys() {
            if !after.files.contains_key(path) {
                changed.removed.insert(path.clone());
            }
        }

        changed
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.added
            .iter()
            .chain(self.removed.iter())
            .chain(self.modified.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(files: &[(&str, &str)]) -> Snapshot {
        Snapshot {
            files: files
                .iter()
                .map(|(p, h)| (p.to_string(), h.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_between() {
        let before = snapshot(&[("a.php", "1"), ("b.php", "2"), ("c.php", "3")]);
        let after = snapshot(&[("a.php", "1"), ("b.php", "9"), ("d.php", "4")]);

        let changed = ChangedFiles::between(&before, &after);
        assert_eq!(changed.added, BTreeSet::from(["d.php".to_string()]));
        assert_eq!(changed.removed, BTreeSet::from(["c.php".to_string()]));
        assert_eq!(changed.modified, BTreeSet::from(["b.php".to_string()]));
        assert_eq!(changed.len(), 3);
    }

    #[test]
    fn test_identical_trees() {
        let before = snapshot(&[("a.php", "1")]);
        let after = snapshot(&[("a.php", "1")]);
        assert!(ChangedFiles::between(&before, &after).is_empty());
    }
}
