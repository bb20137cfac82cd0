//! Prediction list shown beside the entry form.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::models::{DrawResult, Prediction};

/// Text shown when the list is empty.
pub const EMPTY_MESSAGE: &str = "No predictions yet.";

/// One listed prediction with its local annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionEntry {
    /// Stable id within this book.
    pub id: u64,
    /// The listed values.
    pub prediction: Prediction,
    /// Marked by the user; kept across refreshes.
    pub favorite: bool,
    /// Entered through the form in this session rather than fetched.
    pub submitted: bool,
    /// When the entry joined the list.
    pub added_at: DateTime<Utc>,
}

impl PredictionEntry {
    /// Local time a submitted entry was added, as `HH:MM`.
    pub fn submitted_at(&self) -> Option<String> {
        self.submitted.then(|| {
            self.added_at
                .with_timezone(&Local)
                .format("%H:%M")
                .to_string()
        })
    }
}

/// Thread-safe list of predictions, newest first.
///
/// Cloning shares the same list, so a background fetch can fill it while
/// the UI reads from it.
#[derive(Debug, Clone, Default)]
pub struct PredictionBook {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<PredictionEntry>,
    next_id: u64,
}

impl Inner {
    fn entry(&mut self, prediction: Prediction, favorite: bool, submitted: bool) -> PredictionEntry {
        self.next_id += 1;
        PredictionEntry {
            id: self.next_id,
            prediction,
            favorite,
            submitted,
            added_at: Utc::now(),
        }
    }
}

impl PredictionBook {
    /// Empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries, newest first.
    pub fn entries(&self) -> Vec<PredictionEntry> {
        self.inner.read().entries.clone()
    }

    /// Entry with `id`, if still listed.
    pub fn get(&self, id: u64) -> Option<PredictionEntry> {
        self.inner
            .read()
            .entries
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// No entries listed.
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Prepend a just-submitted draw with a zero score.
    pub fn record_submission(&self, result: &DrawResult) -> u64 {
        let mut inner = self.inner.write();
        let entry = inner.entry(Prediction::from(*result), false, true);
        let id = entry.id;
        inner.entries.insert(0, entry);
        debug!(id, draw = %result.label(), "Submission added to predictions");
        id
    }

    /// Replace the list with freshly fetched predictions.
    ///
    /// Entries whose numbers match a previous favorite stay favorites.
    pub fn replace_fetched(&self, predictions: Vec<Prediction>) {
        let mut inner = self.inner.write();
        let favorites: Vec<(Vec<u32>, u32)> = inner
            .entries
            .iter()
            .filter(|entry| entry.favorite)
            .map(|entry| (entry.prediction.numbers.clone(), entry.prediction.powerball))
            .collect();

        let entries = predictions
            .into_iter()
            .map(|prediction| {
                let favorite = favorites.iter().any(|(numbers, powerball)| {
                    *numbers == prediction.numbers && *powerball == prediction.powerball
                });
                inner.entry(prediction, favorite, false)
            })
            .collect();
        inner.entries = entries;
    }

    /// Delete the entry with `id`; `false` if it was not listed.
    pub fn remove(&self, id: u64) -> bool {
        let mut inner = self.inner.write();
        let before = inner.entries.len();
        inner.entries.retain(|entry| entry.id != id);
        before != inner.entries.len()
    }

    /// Flip the favorite flag, returning the new value.
    pub fn toggle_favorite(&self, id: u64) -> Option<bool> {
        let mut inner = self.inner.write();
        let entry = inner.entries.iter_mut().find(|entry| entry.id == id)?;
        entry.favorite = !entry.favorite;
        Some(entry.favorite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(numbers: [u32; 5], powerball: u32, score: f64) -> Prediction {
        Prediction {
            numbers: numbers.to_vec(),
            powerball,
            score,
            note: None,
        }
    }

    #[test]
    fn submissions_are_prepended_with_zero_score() {
        let book = PredictionBook::new();
        let first = book.record_submission(&DrawResult {
            numbers: [1, 2, 3, 4, 5],
            powerball: 6,
        });
        let second = book.record_submission(&DrawResult {
            numbers: [3, 12, 19, 28, 44],
            powerball: 17,
        });
        assert_ne!(first, second);

        let entries = book.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, second);
        assert_eq!(entries[0].prediction.numbers, vec![3, 12, 19, 28, 44]);
        assert_eq!(entries[0].prediction.score, 0.0);
        assert!(!entries[0].favorite);
        assert!(entries[0].submitted);
        let stamp = entries[0].submitted_at().expect("submitted entries carry a time");
        assert_eq!(stamp.len(), 5);
        assert_eq!(stamp.as_bytes()[2], b':');
    }

    #[test]
    fn favorites_toggle_and_survive_refresh() {
        let book = PredictionBook::new();
        book.replace_fetched(vec![
            prediction([1, 4, 22, 31, 40], 11, 0.8),
            prediction([2, 5, 9, 10, 60], 3, 0.1),
        ]);
        let id = book.entries()[0].id;
        assert_eq!(book.toggle_favorite(id), Some(true));

        book.replace_fetched(vec![
            prediction([7, 8, 9, 10, 11], 1, 0.5),
            prediction([1, 4, 22, 31, 40], 11, 0.9),
        ]);
        let entries = book.entries();
        assert!(!entries[0].favorite);
        assert!(entries[1].favorite);
        assert!(entries.iter().all(|entry| entry.submitted_at().is_none()));
        assert_eq!(book.toggle_favorite(entries[1].id), Some(false));
        assert_eq!(book.toggle_favorite(9999), None);
    }

    #[test]
    fn remove_deletes_only_the_matching_entry() {
        let book = PredictionBook::new();
        book.replace_fetched(vec![
            prediction([1, 2, 3, 4, 5], 6, 0.2),
            prediction([6, 7, 8, 9, 10], 11, 0.3),
        ]);
        let shared = book.clone();
        let id = book.entries()[0].id;
        assert!(shared.remove(id));
        assert!(!shared.remove(id));
        assert_eq!(book.len(), 1);
        assert!(book.get(id).is_none());
    }
}
