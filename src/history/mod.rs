//! Executed-operation history
//!
//! An ordered list of [`AlgorithmUnit`]s with one cursor. Adding a unit
//! while the cursor sits in the middle discards everything after it.

use tracing::debug;

use crate::algorithm::AlgorithmUnit;

/// Ordered units with a current position
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<AlgorithmUnit>,
    current: Option<usize>,
    continuous: bool,
}

impl History {
    /// Create empty history
    pub fn new(continuous: bool) -> Self {
        Self {
            entries: Vec::new(),
            current: None,
            continuous,
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current position
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Whether finishing one entry runs the next
    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    /// Toggle continuous chaining
    pub fn set_continuous(&mut self, continuous: bool) {
        self.continuous = continuous;
    }

    /// Unit at the cursor
    pub fn current_unit(&self) -> Option<&AlgorithmUnit> {
        self.current.and_then(|i| self.entries.get(i))
    }

    /// Unit at the cursor, mutably
    pub fn current_unit_mut(&mut self) -> Option<&mut AlgorithmUnit> {
        self.current.and_then(|i| self.entries.get_mut(i))
    }

    /// Unit at an index
    pub fn get(&self, index: usize) -> Option<&AlgorithmUnit> {
        self.entries.get(index)
    }

    /// Drop entries after the cursor and append a unit
    pub fn push(&mut self, unit: AlgorithmUnit) {
        let keep = self.current.map_or(0, |i| i + 1);
        if keep < self.entries.len() {
            debug!(
                dropped = self.entries.len() - keep,
                "history truncated after current entry"
            );
            self.entries.truncate(keep);
        }
        self.entries.push(unit);
    }

    /// True if an entry follows the cursor
    pub fn has_next(&self) -> bool {
        self.current.map_or(0, |i| i + 1) < self.entries.len()
    }

    /// True if an entry precedes the cursor
    pub fn has_previous(&self) -> bool {
        self.current.is_some_and(|i| i > 0)
    }

    /// Move the cursor forward one entry
    pub fn advance(&mut self) -> Option<usize> {
        if !self.has_next() {
            return None;
        }
        let next = self.current.map_or(0, |i| i + 1);
        self.current = Some(next);
        debug!(current = next, "history advanced");
        Some(next)
    }

    /// Move the cursor back one entry
    pub fn retreat(&mut self) -> Option<usize> {
        let previous = self.current.filter(|i| *i > 0)? - 1;
        self.current = Some(previous);
        debug!(current = previous, "history moved back");
        Some(previous)
    }

    /// Put the cursor on an entry
    pub fn seek(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.current = Some(index);
        debug!(current = index, "history seek");
        true
    }

    /// Description of every entry
    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|u| u.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::Operation;
    use crate::animation::TimelineProducer;
    use crate::config::SessionConfig;
    use crate::tree::BinaryTree;

    fn unit(value: i64) -> AlgorithmUnit {
        let mut producer = TimelineProducer::new(&SessionConfig::default());
        AlgorithmUnit::new(
            Operation::BstInsert(value),
            &BinaryTree::new(),
            None,
            &mut producer,
        )
        .unwrap()
    }

    #[test]
    fn test_push_and_advance() {
        let mut history = History::new(true);
        history.push(unit(1));
        assert_eq!(history.current(), None);
        assert_eq!(history.advance(), Some(0));
        assert_eq!(history.advance(), None);
    }

    #[test]
    fn test_push_truncates_after_cursor() {
        let mut history = History::new(true);
        for v in 1..=3 {
            history.push(unit(v));
            history.advance();
        }
        assert!(history.seek(0));
        history.push(unit(9));
        assert_eq!(
            history.labels(),
            vec!["insert(value: 1)".to_string(), "insert(value: 9)".to_string()]
        );
    }

    #[test]
    fn test_retreat_stops_at_start() {
        let mut history = History::new(false);
        history.push(unit(1));
        history.advance();
        history.push(unit(2));
        history.advance();
        assert_eq!(history.retreat(), Some(0));
        assert_eq!(history.retreat(), None);
        assert!(history.has_next());
        assert!(!history.seek(5));
    }
}
