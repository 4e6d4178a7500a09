//! Collision-free output file names.

use std::path::PathBuf;

use rustc_hash::FxHashSet;

/// Hands out file names in one directory without collisions.
///
/// `home.svg`, then `home-2.svg`, `home-3.svg`, ... Names already on disk
/// count as taken.
#[derive(Debug)]
pub struct UniqueNames {
    dir: PathBuf,
    taken: FxHashSet<String>,
}

impl UniqueNames {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            taken: FxHashSet::default(),
        }
    }

    /// Reserve a path for `file_name`, numbering the stem on collision.
    pub fn reserve(&mut self, file_name: &str) -> PathBuf {
        let (stem, extension) = match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (file_name, None),
        };

        let mut n = 1;
        loop {
            let stem = match n {
                1 => stem.to_string(),
                _ => format!("{stem}-{n}"),
            };
            let name = match extension {
                Some(ext) => format!("{stem}.{ext}"),
                None => stem,
            };
            if !self.taken.contains(&name) && !self.dir.join(&name).exists() {
                self.taken.insert(name.clone());
                return self.dir.join(name);
            }
            n += 1;
        }
    }
}
