//! Shared domain models.

use serde::{Deserialize, Serialize};

/// Number of white values in a draw.
pub const WHITE_COUNT: usize = 5;

/// A single validated draw result, as sent to the result service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrawResult {
    /// Five distinct white values, ascending once committed.
    pub numbers: [u8; WHITE_COUNT],
    /// Bonus value.
    pub powerball: u8,
}

impl DrawResult {
    /// Returns the draw formatted the way the ball cells display it.
    pub fn label(&self) -> String {
        format_balls(self.numbers.iter().map(|n| u32::from(*n)), u32::from(self.powerball))
    }
}

/// A prediction returned by the prediction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted white values. The service is not trusted to send exactly five.
    pub numbers: Vec<u32>,
    /// Predicted bonus value.
    pub powerball: u32,
    /// Confidence between 0 and 1.
    #[serde(default)]
    pub score: f64,
    /// Free-form remark from the service, shown under the balls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Prediction {
    /// Score clamped to `0..=1` and rounded to a whole percentage.
    pub fn score_percent(&self) -> u8 {
        let score = if self.score.is_finite() {
            self.score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        (score * 100.0).round() as u8
    }

    /// The note trimmed, or `None` when absent or blank.
    pub fn note(&self) -> Option<&str> {
        self.note
            .as_deref()
            .map(str::trim)
            .filter(|note| !note.is_empty())
    }

    /// Returns a user-facing label such as `03 12 19 28 44 + 17`.
    pub fn label(&self) -> String {
        format_balls(
            self.numbers.iter().take(WHITE_COUNT).copied(),
            self.powerball,
        )
    }
}

impl From<DrawResult> for Prediction {
    fn from(result: DrawResult) -> Self {
        Self {
            numbers: result.numbers.iter().map(|n| u32::from(*n)).collect(),
            powerball: u32::from(result.powerball),
            score: 0.0,
            note: None,
        }
    }
}

fn format_balls(whites: impl Iterator<Item = u32>, bonus: u32) -> String {
    let whites = whites
        .map(|value| format!("{value:02}"))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{whites} + {bonus:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_percent_clamps_out_of_range_scores() {
        let mut prediction = Prediction {
            numbers: vec![1, 2, 3, 4, 5],
            powerball: 6,
            score: 0.376,
            note: None,
        };
        assert_eq!(prediction.score_percent(), 38);
        prediction.score = 1.7;
        assert_eq!(prediction.score_percent(), 100);
        prediction.score = -0.2;
        assert_eq!(prediction.score_percent(), 0);
        prediction.score = f64::NAN;
        assert_eq!(prediction.score_percent(), 0);
    }

    #[test]
    fn labels_pad_to_two_digits() {
        let result = DrawResult {
            numbers: [3, 12, 19, 28, 44],
            powerball: 7,
        };
        assert_eq!(result.label(), "03 12 19 28 44 + 07");

        let prediction = Prediction {
            numbers: vec![1, 4, 22, 31, 40, 66],
            powerball: 11,
            score: 0.0,
            note: None,
        };
        assert_eq!(prediction.label(), "01 04 22 31 40 + 11");
    }

    #[test]
    fn missing_score_defaults_to_zero() -> anyhow::Result<()> {
        let prediction: Prediction =
            serde_json::from_str(r#"{"numbers":[1,2,3,4,5],"powerball":9}"#)?;
        assert_eq!(prediction.score, 0.0);
        assert_eq!(prediction.note(), None);
        Ok(())
    }

    #[test]
    fn blank_notes_are_hidden() -> anyhow::Result<()> {
        let prediction: Prediction = serde_json::from_str(
            r#"{"numbers":[1,2,3,4,5],"powerball":9,"note":"  hot streak "}"#,
        )?;
        assert_eq!(prediction.note(), Some("hot streak"));

        let blank: Prediction =
            serde_json::from_str(r#"{"numbers":[1,2,3,4,5],"powerball":9,"note":"   "}"#)?;
        assert_eq!(blank.note(), None);
        Ok(())
    }
}
