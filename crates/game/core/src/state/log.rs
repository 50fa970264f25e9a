//! Combat log entries.
//!
//! Entries are append-only and immutable once written. Two entries are the
//! same entry when `(turn, phase, key, params)` match exactly, which lets a
//! client re-submit a log batch without duplicating history.

use std::collections::{BTreeMap, HashSet};

use super::Phase;

/// Parameters attached to a log entry (`attacker`, `target`, `damage`, ...).
///
/// Stored as strings so equality is exact and ordering is deterministic.
pub type LogParams = BTreeMap<String, String>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatLogEntry {
    pub turn: u32,
    pub phase: Phase,
    /// Message key understood by the client (e.g. `attack`, `defeated`).
    pub key: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub params: LogParams,
}

impl CombatLogEntry {
    pub fn new(turn: u32, phase: Phase, key: impl Into<String>) -> Self {
        Self {
            turn,
            phase,
            key: key.into(),
            params: LogParams::new(),
        }
    }

    /// Adds a parameter (builder pattern).
    #[must_use]
    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.params.insert(name.to_owned(), value.to_string());
        self
    }
}

/// Ordered, duplicate-free combat log of one session.
///
/// Entries are kept ordered by turn, then by insertion. Membership is
/// answered from a hash set, so appending costs O(1) per entry unless an
/// entry arrives for an earlier turn than the tail.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CombatLog {
    entries: Vec<CombatLogEntry>,
    seen: HashSet<CombatLogEntry>,
}

impl CombatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[CombatLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, entry: &CombatLogEntry) -> bool {
        self.seen.contains(entry)
    }

    /// Number of distinct entries in `incoming` that are not stored yet.
    pub fn count_new(&self, incoming: &[CombatLogEntry]) -> usize {
        incoming
            .iter()
            .filter(|entry| !self.seen.contains(*entry))
            .collect::<HashSet<_>>()
            .len()
    }

    /// Appends `incoming`, skipping entries already present.
    ///
    /// Returns the entries that were actually appended, in submission order.
    pub fn append(
        &mut self,
        incoming: impl IntoIterator<Item = CombatLogEntry>,
    ) -> Vec<CombatLogEntry> {
        let mut appended = Vec::new();
        for entry in incoming {
            if !self.seen.insert(entry.clone()) {
                continue;
            }
            let at = match self.entries.last() {
                Some(last) if last.turn > entry.turn => {
                    self.entries.partition_point(|stored| stored.turn <= entry.turn)
                }
                _ => self.entries.len(),
            };
            self.entries.insert(at, entry.clone());
            appended.push(entry);
        }
        appended
    }
}

impl FromIterator<CombatLogEntry> for CombatLog {
    fn from_iter<I: IntoIterator<Item = CombatLogEntry>>(iter: I) -> Self {
        let mut log = Self::new();
        log.append(iter);
        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resubmitted_batch_is_ignored() {
        let batch = vec![
            CombatLogEntry::new(1, Phase::Player, "attack").with("damage", 4),
            CombatLogEntry::new(1, Phase::Player, "defeated").with("target", "e1"),
        ];

        let mut log = CombatLog::new();
        assert_eq!(log.count_new(&batch), 2);
        assert_eq!(log.append(batch.clone()).len(), 2);
        assert_eq!(log.count_new(&batch), 0);
        assert!(log.append(batch).is_empty());
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn duplicates_inside_one_batch_are_stored_once() {
        let entry = CombatLogEntry::new(1, Phase::Player, "attack").with("damage", 4);
        let batch = vec![entry.clone(), entry.clone()];

        let mut log = CombatLog::new();
        assert_eq!(log.count_new(&batch), 1);
        assert_eq!(log.append(batch), vec![entry]);
    }

    #[test]
    fn differing_params_are_distinct() {
        let log: CombatLog = [
            CombatLogEntry::new(1, Phase::Player, "attack").with("damage", 4),
            CombatLogEntry::new(1, Phase::Player, "attack").with("damage", 5),
        ]
        .into_iter()
        .collect();
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn ordering_is_by_turn_then_insertion() {
        let mut log: CombatLog = [
            CombatLogEntry::new(1, Phase::Player, "a"),
            CombatLogEntry::new(3, Phase::Player, "late"),
        ]
        .into_iter()
        .collect();
        log.append([
            CombatLogEntry::new(2, Phase::Enemy, "b"),
            CombatLogEntry::new(1, Phase::Enemy, "c"),
            CombatLogEntry::new(3, Phase::Enemy, "d"),
        ]);
        let keys: Vec<_> = log.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["a", "c", "b", "late", "d"]);
    }

    #[test]
    fn large_resubmission_stays_linear() {
        let batch: Vec<_> = (0..5_000)
            .map(|i| CombatLogEntry::new(i / 10, Phase::Player, "attack").with("n", i))
            .collect();

        let mut log = CombatLog::new();
        assert_eq!(log.append(batch.clone()).len(), 5_000);
        assert!(log.append(batch).is_empty());
        assert!(log.entries().windows(2).all(|pair| pair[0].turn <= pair[1].turn));
    }
}
