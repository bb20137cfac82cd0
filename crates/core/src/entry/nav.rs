//! Focus navigation across the six entry slots.

use super::BONUS_INDEX;

/// Direction a cell asks focus to move in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavIntent {
    /// Toward the bonus slot.
    Next,
    /// Toward the first slot.
    Prev,
}

/// Planned focus change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Focus already sits on the target.
    Stay,
    /// Ordinary transfer between slots.
    Move {
        /// Slot losing focus, if any.
        from: Option<usize>,
        /// Slot gaining focus.
        to: usize,
    },
    /// Focus enters the bonus slot from the white group. Sort-on-commit is
    /// evaluated after `from` is blurred and before the bonus slot is focused.
    CommitWhites {
        /// Slot losing focus, if any.
        from: Option<usize>,
    },
}

/// Index an intent leads to from `current`, clamped to the form's bounds.
pub fn step(current: usize, intent: NavIntent) -> usize {
    match intent {
        NavIntent::Next => (current + 1).min(BONUS_INDEX),
        NavIntent::Prev => current.saturating_sub(1),
    }
}

/// Plan moving focus from `from` to `to`.
pub fn plan(from: Option<usize>, to: usize) -> Transition {
    let to = to.min(BONUS_INDEX);
    if from == Some(to) {
        Transition::Stay
    } else if to == BONUS_INDEX {
        Transition::CommitWhites { from }
    } else {
        Transition::Move { from, to }
    }
}
