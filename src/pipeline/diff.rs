//! Download deltas against the previous snapshot.
//!
//! Produces one entry per current item, in ranking order, with the increase
//! since the last run. Extensions missing from the snapshot count as
//! unchanged, so a first run shows plain totals.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{Item, Snapshot};

/// One line of the report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeltaEntry {
    /// 1-based position in the ranking
    pub rank: usize,
    pub name: String,
    pub download_count: u64,
    /// Downloads gained since the snapshot; zero for unseen extensions
    pub increase: i64,
}

impl fmt::Display for DeltaEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}: {}", self.rank, self.name, self.download_count)?;
        if self.increase > 0 {
            write!(f, " | +{}", self.increase)?;
        }
        Ok(())
    }
}

/// Ordered report, ready to render into a notification body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeltaReport {
    pub entries: Vec<DeltaEntry>,
}

impl DeltaReport {
    /// Lines joined by `\n`, no trailing newline.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of extensions that gained downloads.
    pub fn changed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.increase > 0).count()
    }

    /// Downloads gained across all extensions.
    pub fn total_increase(&self) -> i64 {
        self.entries
            .iter()
            .fold(0i64, |acc, e| acc.saturating_add(e.increase.max(0)))
    }
}

impl fmt::Display for DeltaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// `current - before`, clamped to the `i64` range.
fn signed_increase(current: u64, before: u64) -> i64 {
    let delta = i128::from(current) - i128::from(before);
    i64::try_from(delta).unwrap_or(if delta > 0 { i64::MAX } else { i64::MIN })
}

/// Compute the report for `current` against `previous`.
pub fn diff(current: &[Item], previous: &Snapshot) -> DeltaReport {
    let entries = current
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let before = previous.get(&item.name).unwrap_or(item.download_count);
            DeltaEntry {
                rank: index + 1,
                name: item.name.clone(),
                download_count: item.download_count,
                increase: signed_increase(item.download_count, before),
            }
        })
        .collect();

    DeltaReport { entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pairs: &[(&str, u64)]) -> Snapshot {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_increase_and_new_item() {
        let current = vec![Item::new("A", 15), Item::new("B", 5)];
        let report = diff(&current, &snapshot(&[("A", 10)]));

        assert_eq!(report.render(), "1. A: 15 | +5\n2. B: 5");
        assert_eq!(report.changed_count(), 1);
        assert_eq!(report.total_increase(), 5);
    }

    #[test]
    fn test_first_run_shows_no_increase() {
        let report = diff(&[Item::new("A", 15)], &Snapshot::new());
        assert_eq!(report.render(), "1. A: 15");
        assert_eq!(report.entries[0].increase, 0);
    }

    #[test]
    fn test_large_unseen_item_has_no_suffix() {
        let report = diff(&[Item::new("huge", 1_000_000)], &snapshot(&[("other", 1)]));
        assert_eq!(report.render(), "1. huge: 1000000");
    }

    #[test]
    fn test_unchanged_and_decreased() {
        let current = vec![Item::new("same", 7), Item::new("down", 3)];
        let report = diff(&current, &snapshot(&[("same", 7), ("down", 4)]));

        assert_eq!(report.render(), "1. same: 7\n2. down: 3");
        assert_eq!(report.entries[1].increase, -1);
        assert_eq!(report.changed_count(), 0);
        assert_eq!(report.total_increase(), 0);
    }

    #[test]
    fn test_counts_beyond_i64_range() {
        let big = 1u64 << 63;
        let current = vec![Item::new("big", big), Item::new("max", u64::MAX)];
        let report = diff(&current, &snapshot(&[("big", 1), ("max", 0)]));

        assert_eq!(report.entries[0].increase, i64::MAX);
        assert_eq!(
            report.entries[0].to_string(),
            "1. big: 9223372036854775808 | +9223372036854775807"
        );
        assert_eq!(report.entries[1].increase, i64::MAX);
        assert_eq!(report.changed_count(), 2);
        assert_eq!(report.total_increase(), i64::MAX);
    }

    #[test]
    fn test_large_decrease_stays_negative() {
        let report = diff(&[Item::new("A", 0)], &snapshot(&[("A", u64::MAX)]));
        assert_eq!(report.entries[0].increase, i64::MIN);
        assert_eq!(report.render(), "1. A: 0");
    }

    #[test]
    fn test_ranks_follow_input_order() {
        let current: Vec<Item> = (0..20).map(|i| Item::new(format!("ext-{i}"), 100 - i)).collect();
        let report = diff(&current, &Snapshot::new());

        for (index, (entry, item)) in report.entries.iter().zip(&current).enumerate() {
            assert_eq!(entry.rank, index + 1);
            assert_eq!(entry.name, item.name);
        }
    }

    #[test]
    fn test_empty_input() {
        let report = diff(&[], &snapshot(&[("gone", 3)]));
        assert!(report.is_empty());
        assert_eq!(report.render(), "");
    }

    #[test]
    fn test_no_trailing_newline() {
        let report = diff(&[Item::new("A", 1), Item::new("B", 1)], &Snapshot::new());
        assert!(!report.render().ends_with('\n'));
        assert_eq!(report.to_string(), report.render());
    }
}
