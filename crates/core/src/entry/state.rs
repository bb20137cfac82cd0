//! Snapshot of the six slot buffers.

use crate::models::WHITE_COUNT;

use super::{
    buffer::{FieldBuffer, SlotKind},
    BONUS_INDEX, SLOT_COUNT,
};

/// Snapshot of all six slot buffers in navigation order.
///
/// Slots `0..5` are white, slot 5 is the bonus. The layout is fixed by
/// construction so the bonus is always last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryState {
    slots: [FieldBuffer; SLOT_COUNT],
}

impl Default for EntryState {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|idx| FieldBuffer::new(kind_for(idx))),
        }
    }
}

impl EntryState {
    /// Build a state from raw texts, each passed through the slot's buffer rules.
    pub fn from_raw(whites: [&str; WHITE_COUNT], bonus: &str) -> Self {
        let mut state = Self::default();
        for (slot, text) in state.slots.iter_mut().zip(whites) {
            slot.set_raw(text);
        }
        state.slots[BONUS_INDEX].set_raw(bonus);
        state
    }

    pub(crate) fn from_slots(slots: [FieldBuffer; SLOT_COUNT]) -> Self {
        Self { slots }
    }

    /// The five white buffers.
    pub fn whites(&self) -> &[FieldBuffer] {
        &self.slots[..WHITE_COUNT]
    }

    pub(crate) fn whites_mut(&mut self) -> &mut [FieldBuffer] {
        &mut self.slots[..WHITE_COUNT]
    }

    /// The bonus buffer.
    pub fn bonus(&self) -> &FieldBuffer {
        &self.slots[BONUS_INDEX]
    }

    /// Parsed white values, `None` for empty slots.
    pub fn white_values(&self) -> [Option<u8>; WHITE_COUNT] {
        std::array::from_fn(|idx| self.slots[idx].value())
    }

    /// Parsed bonus value.
    pub fn bonus_value(&self) -> Option<u8> {
        self.bonus().value()
    }

    /// Every slot is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(FieldBuffer::is_empty)
    }

    pub(crate) fn into_slots(self) -> [FieldBuffer; SLOT_COUNT] {
        self.slots
    }
}

pub(crate) fn kind_for(index: usize) -> SlotKind {
    if index == BONUS_INDEX {
        SlotKind::Bonus
    } else {
        SlotKind::White
    }
}
