//! Review star ratings.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Rating must be between 1 and 5")]
pub struct RatingError;

/// A star rating from 1 to 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Validate a raw rating.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError`] when the value is outside `1..=5`.
    pub fn new(value: i64) -> Result<Self, RatingError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingError)
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl From<Rating> for i16 {
    fn from(rating: Rating) -> Self {
        Self::from(rating.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(Rating::new(0).is_err());
        assert_eq!(Rating::new(1).unwrap().get(), 1);
        assert_eq!(Rating::new(5).unwrap().get(), 5);
        assert!(Rating::new(6).is_err());
        assert!(Rating::new(-3).is_err());
    }

    #[test]
    fn test_deserialize_rejects_fractions_and_out_of_range() {
        assert_eq!(serde_json::from_str::<Rating>("4").unwrap().get(), 4);
        assert!(serde_json::from_str::<Rating>("4.5").is_err());
        assert!(serde_json::from_str::<Rating>("9").is_err());
        assert!(serde_json::from_str::<Rating>("\"5\"").is_err());
    }
}
