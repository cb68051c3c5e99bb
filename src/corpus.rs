//! Feeding corpus files into a [`TourneyTree`].

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info, warn};

use crate::token;
use crate::{Error, Result, TourneyTree};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub files_read: usize,
    pub files_skipped: usize,
    /// Words inserted across all files.
    pub words: u64,
}

/// Inserts every word of one file, calling `on_insert` after each insertion.
///
/// Returns the number of words inserted. On a read error the words seen
/// before it stay in the tree.
pub fn load_file(
    tree: &mut TourneyTree,
    path: &Path,
    on_insert: impl FnMut(&TourneyTree),
) -> Result<u64> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut inserted = 0u64;
    feed(tree, path, BufReader::new(file), &mut inserted, on_insert)?;
    debug!("{}: {} words", path.display(), inserted);
    Ok(inserted)
}

/// Inserts the words of `reader`, bumping `inserted` as it goes so the count
/// stays accurate when a read fails partway.
fn feed<R: BufRead>(
    tree: &mut TourneyTree,
    path: &Path,
    mut reader: R,
    inserted: &mut u64,
    mut on_insert: impl FnMut(&TourneyTree),
) -> Result<()> {
    let mut line = Vec::new();
    loop {
        line.clear();
        let n = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| Error::io(path, e))?;
        if n == 0 {
            return Ok(());
        }
        for word in token::words(&line) {
            tree.insert(&word)?;
            *inserted += 1;
            on_insert(&*tree);
        }
    }
}

/// Loads each file in turn. Files that cannot be read are skipped with a
/// warning; only allocation failures abort the whole load. Words inserted
/// before a read error are still counted.
pub fn load_all<P: AsRef<Path>>(
    tree: &mut TourneyTree,
    paths: &[P],
    mut on_insert: impl FnMut(&TourneyTree),
) -> Result<LoadStats> {
    let mut stats = LoadStats::default();
    for path in paths {
        let path = path.as_ref();
        info!("reading {}", path.display());
        let before = stats.words;
        let loaded = File::open(path)
            .map_err(|e| Error::io(path, e))
            .and_then(|file| {
                feed(tree, path, BufReader::new(file), &mut stats.words, &mut on_insert)
            });
        match loaded {
            Ok(()) => {
                stats.files_read += 1;
                debug!("{}: {} words", path.display(), stats.words - before);
            }
            Err(e @ Error::Io { .. }) => {
                warn!("skipping corpus file: {e}");
                stats.files_skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(stats)
}
