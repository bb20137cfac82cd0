//! Duplicate detection and submit eligibility.
//!
//! Everything here is a pure function of an [`EntryState`]; the form calls
//! it again after every mutation instead of caching results.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::models::{DrawResult, WHITE_COUNT};

use super::{
    buffer::{BONUS_RANGE, WHITE_RANGE},
    state::EntryState,
};

/// White slot indices whose value also appears in another white slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateFlags(BTreeSet<usize>);

impl DuplicateFlags {
    /// Whether slot `index` is flagged.
    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    /// No slot is flagged.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flagged slot indices, ascending.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

/// Reasons a submit attempt is refused locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// At least one white slot is empty.
    #[error("Enter all 5 white balls (1-69); {missing} missing.")]
    IncompleteWhites {
        /// Number of empty white slots.
        missing: usize,
    },
    /// A white value lies outside 1..=69.
    #[error("White balls must be between 1 and 69 (got {value:02}).")]
    WhiteOutOfRange {
        /// The offending value.
        value: u8,
    },
    /// Two or more white slots share a value.
    #[error("White balls must be distinct; {} repeated.", format_values(.values))]
    DuplicateWhites {
        /// Each repeated value once, ascending.
        values: Vec<u8>,
    },
    /// The bonus slot is empty.
    #[error("Enter the Powerball (1-26).")]
    MissingBonus,
    /// The bonus lies outside 1..=26.
    #[error("Powerball must be between 1 and 26 (got {value:02}).")]
    BonusOutOfRange {
        /// The offending value.
        value: u32,
    },
}

fn format_values(values: &[u8]) -> String {
    values
        .iter()
        .map(|value| format!("{value:02}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Flag every white slot whose value appears in another white slot.
pub fn compute_flags(state: &EntryState) -> DuplicateFlags {
    duplicate_indices(&state.white_values())
}

fn duplicate_indices(values: &[Option<u8>]) -> DuplicateFlags {
    let flagged = values
        .iter()
        .enumerate()
        .filter_map(|(idx, value)| {
            let value = (*value)?;
            values
                .iter()
                .enumerate()
                .any(|(other, candidate)| other != idx && *candidate == Some(value))
                .then_some(idx)
        })
        .collect();
    DuplicateFlags(flagged)
}

/// Check the form's current values and build the payload to submit.
pub fn validate(state: &EntryState) -> Result<DrawResult, ValidationError> {
    check_values(
        state.white_values(),
        state.bonus_value().map(u32::from),
    )
}

/// Submit eligibility over plain values.
///
/// The bonus is taken as `u32` so values the buffer could never hold are
/// still rejected with a reason rather than truncated.
pub fn check_values(
    whites: [Option<u8>; WHITE_COUNT],
    bonus: Option<u32>,
) -> Result<DrawResult, ValidationError> {
    let missing = whites.iter().filter(|value| value.is_none()).count();
    if missing > 0 {
        return Err(ValidationError::IncompleteWhites { missing });
    }
    let numbers = whites.map(|value| value.unwrap_or_default());

    if let Some(value) = numbers.iter().find(|value| !WHITE_RANGE.contains(*value)) {
        return Err(ValidationError::WhiteOutOfRange { value: *value });
    }

    let flags = duplicate_indices(&whites);
    if !flags.is_empty() {
        let values: BTreeSet<u8> = flags.iter().map(|idx| numbers[idx]).collect();
        return Err(ValidationError::DuplicateWhites {
            values: values.into_iter().collect(),
        });
    }

    let bonus = bonus.ok_or(ValidationError::MissingBonus)?;
    let powerball = u8::try_from(bonus)
        .ok()
        .filter(|value| BONUS_RANGE.contains(value))
        .ok_or(ValidationError::BonusOutOfRange { value: bonus })?;

    Ok(DrawResult { numbers, powerball })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn flags_every_member_of_a_duplicate_pair() {
        let state = EntryState::from_raw(["12", "40", "12", "", "40"], "");
        let flags = compute_flags(&state);
        assert_eq!(flags.iter().collect::<Vec<_>>(), vec![0, 1, 2, 4]);
        assert!(!flags.contains(3));
    }

    #[test]
    fn bonus_does_not_participate_in_duplicates() {
        let state = EntryState::from_raw(["12", "3", "", "", ""], "12");
        assert!(compute_flags(&state).is_empty());
    }

    #[test]
    fn empty_whites_are_rejected() {
        let state = EntryState::from_raw(["44", "", "28", "19", "12"], "17");
        assert_eq!(
            validate(&state),
            Err(ValidationError::IncompleteWhites { missing: 1 })
        );
    }

    #[test]
    fn duplicates_are_rejected_with_the_repeated_value() {
        let state = EntryState::from_raw(["3", "3", "10", "20", "30"], "5");
        let err = validate(&state).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateWhites { values: vec![3] });
        assert_eq!(err.to_string(), "White balls must be distinct; 03 repeated.");
    }

    #[test]
    fn bonus_outside_range_is_rejected() {
        let whites = [Some(1), Some(2), Some(3), Some(4), Some(5)];
        assert_eq!(
            check_values(whites, Some(0)),
            Err(ValidationError::BonusOutOfRange { value: 0 })
        );
        assert_eq!(
            check_values(whites, Some(27)),
            Err(ValidationError::BonusOutOfRange { value: 27 })
        );
        assert_eq!(
            check_values(whites, None),
            Err(ValidationError::MissingBonus)
        );

        let typed_zero = EntryState::from_raw(["1", "2", "3", "4", "5"], "0");
        assert_eq!(
            validate(&typed_zero),
            Err(ValidationError::BonusOutOfRange { value: 0 })
        );
    }

    #[test]
    fn zero_white_is_out_of_range() {
        let state = EntryState::from_raw(["0", "2", "3", "4", "5"], "9");
        assert_eq!(
            validate(&state),
            Err(ValidationError::WhiteOutOfRange { value: 0 })
        );
    }

    #[test]
    fn complete_distinct_entry_is_accepted() {
        let state = EntryState::from_raw(["44", "3", "28", "19", "12"], "17");
        assert_eq!(
            validate(&state),
            Ok(DrawResult {
                numbers: [44, 3, 28, 19, 12],
                powerball: 17
            })
        );
    }

    proptest! {
        #[test]
        fn flags_are_symmetric(values in proptest::array::uniform5(proptest::option::of(1u8..=69))) {
            let flags = duplicate_indices(&values);
            for i in 0..WHITE_COUNT {
                let shared = values[i].is_some()
                    && (0..WHITE_COUNT).any(|j| j != i && values[j] == values[i]);
                prop_assert_eq!(flags.contains(i), shared);
            }
        }
    }
}
