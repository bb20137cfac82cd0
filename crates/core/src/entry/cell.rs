//! One interactive slot: key handling, selection and render state.

use super::{
    buffer::{FieldBuffer, SlotKind},
    nav::NavIntent,
};

/// Key events the entry form understands, independent of the terminal backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKey {
    /// A typed character; anything but an ASCII digit is ignored.
    Char(char),
    /// Erase, or step back from an empty cell.
    Backspace,
    /// Previous slot.
    Left,
    /// Next slot.
    Right,
    /// Next slot.
    Tab,
    /// Previous slot.
    BackTab,
}

/// How a cell should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellVisual {
    /// Nothing typed, not focused.
    Empty,
    /// Holds a value, not focused.
    Filled,
    /// Holds a white value repeated elsewhere.
    Duplicate,
    /// Has focus.
    Editing,
}

/// Render state of one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    /// Slot position, `0..=5`.
    pub index: usize,
    /// White or bonus.
    pub kind: SlotKind,
    /// Raw text while editing, canonical two-digit text otherwise.
    pub display_text: String,
    /// Label shown for the slot: `1`..`5` or `PB`.
    pub placeholder: String,
    /// The value is repeated in another white slot.
    pub is_duplicate_highlighted: bool,
    /// The cell has focus.
    pub is_being_edited: bool,
    /// The whole content is selected and the next digit replaces it.
    pub is_selected: bool,
    /// Summary of the flags above for styling.
    pub visual: CellVisual,
}

/// What a key did to a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellOutcome {
    /// The buffer content changed.
    pub changed: bool,
    /// Where the cell asks focus to go next, if anywhere.
    pub intent: Option<NavIntent>,
}

impl CellOutcome {
    fn navigate(intent: NavIntent) -> Self {
        Self {
            changed: false,
            intent: Some(intent),
        }
    }
}

/// One interactive slot of the entry form.
#[derive(Debug, Clone)]
pub struct InputCell {
    index: usize,
    buffer: FieldBuffer,
    editing: bool,
    selected: bool,
}

impl InputCell {
    /// Unfocused, empty cell at `index`.
    pub fn new(index: usize, kind: SlotKind) -> Self {
        Self {
            index,
            buffer: FieldBuffer::new(kind),
            editing: false,
            selected: false,
        }
    }

    /// Slot position.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current content.
    pub fn buffer(&self) -> &FieldBuffer {
        &self.buffer
    }

    pub(crate) fn replace_buffer(&mut self, buffer: FieldBuffer) {
        self.buffer = buffer;
        self.selected = false;
    }

    /// The cell has focus.
    pub fn is_being_edited(&self) -> bool {
        self.editing
    }

    /// The content is selected for overwrite.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Apply a full replacement of the cell's text (typing, paste, prefill).
    ///
    /// Returns `Next` once the buffer holds a complete entry.
    pub fn on_content_change(&mut self, text: &str) -> CellOutcome {
        let before = self.buffer.raw().to_string();
        self.buffer.set_raw(text);
        self.selected = false;
        CellOutcome {
            changed: before != self.buffer.raw(),
            intent: self.buffer.is_complete().then_some(NavIntent::Next),
        }
    }

    /// Load a numeric value without asking focus to move.
    pub fn load_value(&mut self, value: u32) {
        self.buffer.set_value(value);
        self.selected = false;
    }

    /// React to one key while focused.
    pub fn on_key(&mut self, key: EntryKey) -> CellOutcome {
        match key {
            EntryKey::Char(ch) if !ch.is_ascii_digit() => {
                // rejected keystrokes leave the selection alone
                CellOutcome::default()
            }
            EntryKey::Char(ch) => {
                let typed = if self.selected {
                    ch.to_string()
                } else {
                    format!("{}{}", self.buffer.raw(), ch)
                };
                self.on_content_change(&typed)
            }
            EntryKey::Backspace if self.buffer.is_empty() => {
                CellOutcome::navigate(NavIntent::Prev)
            }
            EntryKey::Backspace => {
                if self.selected {
                    self.buffer.clear();
                    self.selected = false;
                } else {
                    self.buffer.pop();
                }
                CellOutcome {
                    changed: true,
                    intent: None,
                }
            }
            EntryKey::Left | EntryKey::BackTab => CellOutcome::navigate(NavIntent::Prev),
            EntryKey::Right | EntryKey::Tab => CellOutcome::navigate(NavIntent::Next),
        }
    }

    /// Start editing; the whole content is selected so typing overwrites it.
    pub fn on_gain_focus(&mut self) {
        self.editing = true;
        self.selected = !self.buffer.is_empty();
    }

    /// Stop editing and drop the selection.
    pub fn on_lose_focus(&mut self) {
        self.editing = false;
        self.selected = false;
    }

    pub(crate) fn clear(&mut self) {
        self.buffer.clear();
        self.selected = false;
    }

    /// Slot label: the white position or `PB`.
    pub fn placeholder(&self) -> String {
        match self.buffer.kind() {
            SlotKind::White => format!("{}", self.index + 1),
            SlotKind::Bonus => "PB".to_string(),
        }
    }

    /// Render state given whether the value is flagged as a duplicate.
    ///
    /// The bonus cell is never highlighted as a duplicate.
    pub fn view(&self, duplicate: bool) -> CellView {
        let duplicate = duplicate && !self.buffer.kind().is_bonus();
        let display_text = if self.editing {
            self.buffer.raw().to_string()
        } else {
            self.buffer.canonical()
        };
        let visual = if self.editing {
            CellVisual::Editing
        } else if duplicate {
            CellVisual::Duplicate
        } else if self.buffer.is_empty() {
            CellVisual::Empty
        } else {
            CellVisual::Filled
        };
        CellView {
            index: self.index,
            kind: self.buffer.kind(),
            display_text,
            placeholder: self.placeholder(),
            is_duplicate_highlighted: duplicate,
            is_being_edited: self.editing,
            is_selected: self.selected,
            visual,
        }
    }
}
