//! Ascending reorder of the white slots when focus enters the bonus.

use crate::models::WHITE_COUNT;

use super::state::EntryState;

/// Whether the white slots may be reordered right now.
pub fn can_sort(state: &EntryState, editing: Option<usize>) -> bool {
    let editing_white = editing.is_some_and(|idx| idx < WHITE_COUNT);
    !editing_white && state.whites().iter().all(|slot| !slot.is_empty())
}

/// Reorder the white slots ascending by value.
///
/// Does nothing while a white slot is empty or being edited. Returns `true`
/// when the order changed.
pub fn sort_on_commit(state: &mut EntryState, editing: Option<usize>) -> bool {
    if !can_sort(state, editing) {
        return false;
    }
    let before = state.white_values();
    state.whites_mut().sort_by_key(|slot| slot.value());
    before != state.white_values()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn whites(state: &EntryState) -> Vec<Option<u8>> {
        state.white_values().to_vec()
    }

    #[test]
    fn sorts_complete_whites_ascending() {
        let mut state = EntryState::from_raw(["44", "3", "28", "19", "12"], "17");
        assert!(sort_on_commit(&mut state, None));
        assert_eq!(
            whites(&state),
            vec![Some(3), Some(12), Some(19), Some(28), Some(44)]
        );
        assert_eq!(state.bonus_value(), Some(17));
    }

    #[test]
    fn partial_sets_are_left_alone() {
        let mut state = EntryState::from_raw(["12", "", "5", "9", "3"], "");
        let before = state.clone();
        assert!(!sort_on_commit(&mut state, None));
        assert_eq!(state, before);
    }

    #[test]
    fn white_being_edited_blocks_sorting() {
        let mut state = EntryState::from_raw(["44", "3", "28", "19", "12"], "");
        assert!(!sort_on_commit(&mut state, Some(2)));
        assert!(sort_on_commit(&mut state, Some(5)));
    }

    proptest! {
        #[test]
        fn sorting_is_an_idempotent_permutation(values in proptest::array::uniform5(1u32..=69)) {
            let raw = values.map(|value| format!("{value:02}"));
            let mut state = EntryState::from_raw(std::array::from_fn(|idx| raw[idx].as_str()), "");
            let mut original = whites(&state);

            sort_on_commit(&mut state, None);
            let once = whites(&state);
            prop_assert!(!sort_on_commit(&mut state, None));
            prop_assert_eq!(&whites(&state), &once);

            let mut sorted = once.clone();
            sorted.sort();
            prop_assert_eq!(&once, &sorted);
            original.sort();
            prop_assert_eq!(once, original);
        }
    }
}
