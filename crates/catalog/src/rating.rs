use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, ValueObject};

pub const MAX_RATING: f64 = 5.0;

/// Running average of 0..=5 scores.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RatingFields")]
pub struct Rating {
    average: f64,
    count: u64,
}

#[derive(Deserialize)]
struct RatingFields {
    average: f64,
    count: u64,
}

impl TryFrom<RatingFields> for Rating {
    type Error = DomainError;

    fn try_from(fields: RatingFields) -> DomainResult<Self> {
        Self::new(fields.average, fields.count)
    }
}

impl ValueObject for Rating {}

impl Rating {
    pub fn new(average: f64, count: u64) -> DomainResult<Self> {
        check_score(average)?;
        if count == 0 && average != 0.0 {
            return Err(DomainError::invariant("a rating with no votes must average 0"));
        }
        Ok(Self { average, count })
    }

    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Fold one more score into the average.
    pub fn record(self, score: f64) -> DomainResult<Self> {
        check_score(score)?;
        let count = self.count + 1;
        let average = (self.average * self.count as f64 + score) / count as f64;
        Ok(Self {
            average: average.clamp(0.0, MAX_RATING),
            count,
        })
    }
}

fn check_score(score: f64) -> DomainResult<()> {
    if !score.is_finite() || !(0.0..=MAX_RATING).contains(&score) {
        return Err(DomainError::validation(format!(
            "rating must be within [0, {MAX_RATING}], got {score}"
        )));
    }
    Ok(())
}
