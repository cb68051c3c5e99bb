//! Writing the ranked word list.
//!
//! One line per word, most frequent tier first, words of a tier in key order:
//!
//! ```text
//! the 6.25%
//! and 3.13%
//! ```

use std::io::{self, Write};

use log::debug;

use crate::{Entry, TourneyTree};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RankingSummary {
    pub total_occurrences: u64,
    pub words_written: usize,
    pub tiers: usize,
}

/// Share of `total` taken by `count`, in percent.
pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    100.0 * count as f64 / total as f64
}

/// Drains `tree` tier by tier into `out`.
///
/// With `max_words`, no new tier is started once that many words have been
/// written, but a started tier is always written in full, so the output can
/// run past the cap when it falls inside a tie. `on_tier` sees the tree after
/// each extraction.
pub fn write_ranking<W: Write>(
    tree: &mut TourneyTree,
    mut out: W,
    max_words: Option<usize>,
    mut on_tier: impl FnMut(&TourneyTree),
) -> io::Result<RankingSummary> {
    let total = tree.total_occurrences();
    let mut summary = RankingSummary {
        total_occurrences: total,
        ..RankingSummary::default()
    };

    while !tree.is_empty() && max_words.map_or(true, |cap| summary.words_written < cap) {
        let tier = tree.extract_max_tier();
        summary.tiers += 1;
        on_tier(&*tree);

        if let Some(first) = tier.first() {
            debug!("tier {}: {} words at count {}", summary.tiers, tier.len(), first.count);
        }
        for entry in &tier {
            write_entry(&mut out, entry, total)?;
            summary.words_written += 1;
        }
    }

    out.flush()?;
    Ok(summary)
}

fn write_entry<W: Write>(out: &mut W, entry: &Entry, total: u64) -> io::Result<()> {
    out.write_all(&entry.key)?;
    writeln!(out, " {:.2}%", percentage(entry.count, total))
}
