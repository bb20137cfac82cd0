//! Segmented entry controller for one draw result.
//!
//! Six slots in navigation order: five white values followed by the bonus.
//! [`EntryForm`] owns the cells and drives buffering, focus, duplicate flags,
//! sort-on-commit and submission.

pub mod buffer;
pub mod cell;
pub mod flags;
pub mod form;
pub mod nav;
pub mod sort;
pub mod state;
pub mod submit;

pub use buffer::{FieldBuffer, SlotKind, BONUS_RANGE, FIELD_WIDTH, WHITE_RANGE};
pub use cell::{CellOutcome, CellView, CellVisual, EntryKey, InputCell};
pub use flags::{check_values, compute_flags, validate, DuplicateFlags, ValidationError};
pub use form::{EntryForm, FormEvent, PrefillHandle, PrefillRequest};
pub use nav::{NavIntent, Transition};
pub use sort::sort_on_commit;
pub use state::EntryState;
pub use submit::{
    PendingSubmission, Phase, Resolution, SubmissionStatus, SubmitOutcome, SubmitStart, Ticket,
};

/// Total number of slots.
pub const SLOT_COUNT: usize = crate::models::WHITE_COUNT + 1;
/// Index of the first slot.
pub const FIRST_INDEX: usize = 0;
/// Index of the bonus slot, always last.
pub const BONUS_INDEX: usize = SLOT_COUNT - 1;
