//! Per-slot text buffer with digit filtering and range clamping.

use std::ops::RangeInclusive;

/// Maximum number of characters a slot accepts.
pub const FIELD_WIDTH: usize = 2;

/// Range of a white value.
pub const WHITE_RANGE: RangeInclusive<u8> = 1..=69;
/// Range of the bonus value.
pub const BONUS_RANGE: RangeInclusive<u8> = 1..=26;

/// Which group a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// One of the five main balls.
    White,
    /// The Powerball.
    Bonus,
}

impl SlotKind {
    /// Values a complete entry of this kind may hold.
    pub fn range(self) -> RangeInclusive<u8> {
        match self {
            SlotKind::White => WHITE_RANGE,
            SlotKind::Bonus => BONUS_RANGE,
        }
    }

    /// Lowest accepted value.
    pub fn min(self) -> u8 {
        *self.range().start()
    }

    /// Highest accepted value.
    pub fn max(self) -> u8 {
        *self.range().end()
    }

    /// Whether this is the Powerball slot.
    pub fn is_bonus(self) -> bool {
        self == SlotKind::Bonus
    }
}

/// Raw text of one slot plus its derived value.
///
/// `raw` only ever holds up to [`FIELD_WIDTH`] ASCII digits. A complete
/// entry is always inside the slot's range; a single digit is left alone
/// because the user may still be typing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBuffer {
    kind: SlotKind,
    raw: String,
}

impl FieldBuffer {
    /// Empty buffer for a slot of `kind`.
    pub fn new(kind: SlotKind) -> Self {
        Self {
            kind,
            raw: String::new(),
        }
    }

    /// Which range this buffer clamps to.
    pub fn kind(&self) -> SlotKind {
        self.kind
    }

    /// Text exactly as held, at most [`FIELD_WIDTH`] digits.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// No digits typed.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The buffer is full and will accept no further digits.
    pub fn is_complete(&self) -> bool {
        self.raw.len() == FIELD_WIDTH
    }

    /// Replace the content, dropping non-digits and clamping complete entries.
    pub fn set_raw(&mut self, text: &str) {
        let mut next: String = text
            .chars()
            .filter(char::is_ascii_digit)
            .take(FIELD_WIDTH)
            .collect();

        if next.len() == FIELD_WIDTH {
            if let Ok(parsed) = next.parse::<u8>() {
                let clamped = parsed.clamp(self.kind.min(), self.kind.max());
                if clamped != parsed {
                    next = format!("{clamped:02}");
                }
            }
        }

        self.raw = next;
    }

    /// Load a numeric value in canonical form.
    ///
    /// Values above the slot's maximum store the maximum; zero is raised to
    /// the minimum by the usual clamp of a complete entry.
    pub fn set_value(&mut self, value: u32) {
        let clamped = value.min(u32::from(self.kind.max()));
        self.set_raw(&format!("{clamped:02}"));
    }

    /// Drop all content.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Remove the last typed character.
    pub fn pop(&mut self) {
        self.raw.pop();
    }

    /// Parsed value, `None` while empty.
    pub fn value(&self) -> Option<u8> {
        if self.raw.is_empty() {
            return None;
        }
        self.raw.parse().ok()
    }

    /// Value zero-padded to the field width, or an empty string.
    pub fn canonical(&self) -> String {
        self.value()
            .map(|value| format!("{value:02}"))
            .unwrap_or_default()
    }
}
