use std::collections::VecDeque;

/// Bounded undo/redo over snapshots of some state.
///
/// Owned by whoever owns the state; there is no shared instance. Callers
/// `record` the state *before* a mutation, then hand the current state to
/// `undo`/`redo` to swap it with the stored one.
#[derive(Debug, Clone)]
pub struct History<T> {
    past: VecDeque<T>,
    future: Vec<T>,
    capacity: usize,
}

impl<T: Clone> History<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, snapshot: T) {
        if self.past.len() == self.capacity {
            self.past.pop_front();
        }
        self.past.push_back(snapshot);
        self.future.clear();
    }

    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.past.pop_back()?;
        self.future.push(current);
        Some(previous)
    }

    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.future.pop()?;
        self.past.push_back(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_then_redo() {
        let mut history = History::new(10);
        let mut state = 1;
        history.record(state);
        state = 2;
        history.record(state);
        state = 3;

        state = history.undo(state).unwrap();
        assert_eq!(state, 2);
        state = history.undo(state).unwrap();
        assert_eq!(state, 1);
        assert!(history.undo(state).is_none());

        state = history.redo(state).unwrap();
        assert_eq!(state, 2);
        state = history.redo(state).unwrap();
        assert_eq!(state, 3);
        assert!(!history.can_redo());
    }

    #[test]
    fn recording_drops_redo_branch() {
        let mut history = History::new(10);
        history.record("a");
        let state = history.undo("b").unwrap();
        assert!(history.can_redo());
        history.record(state);
        assert!(!history.can_redo());
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut history = History::new(2);
        history.record(1);
        history.record(2);
        history.record(3);
        assert_eq!(history.undo(4), Some(3));
        assert_eq!(history.undo(3), Some(2));
        assert_eq!(history.undo(2), None);
    }
}
