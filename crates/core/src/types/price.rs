//! Money as integer minor units.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PriceError {
    /// Prices must be strictly positive.
    #[error("price must be greater than zero")]
    NotPositive,
}

/// A monetary amount stored as integer minor units (cents).
///
/// Storing cents sidesteps floating-point rounding entirely: arithmetic on
/// order totals is plain integer arithmetic and the database column is a
/// `BIGINT`.
///
/// ```
/// use mercantia_core::Price;
///
/// let price = Price::from_cents(1999).unwrap();
/// assert_eq!(price.cents(), 1999);
/// assert_eq!(price.to_string(), "19.99");
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// Create a price from minor units.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NotPositive`] for zero or negative amounts.
    pub const fn from_cents(cents: i64) -> Result<Self, PriceError> {
        if cents <= 0 {
            return Err(PriceError::NotPositive);
        }
        Ok(Self(cents))
    }

    /// The amount in minor units.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Multiply by a quantity, saturating at `i64::MAX`.
    #[must_use]
    pub const fn times(self, quantity: i64) -> i64 {
        self.0.saturating_mul(quantity)
    }
}

impl fmt::Display for Price {
    /// Formats as major.minor, e.g. `19.99`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let cents = <i64 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(cents))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents_positive() {
        assert_eq!(Price::from_cents(100).unwrap().cents(), 100);
    }

    #[test]
    fn test_from_cents_rejects_zero_and_negative() {
        assert!(Price::from_cents(0).is_err());
        assert!(Price::from_cents(-5).is_err());
    }

    #[test]
    fn test_display_pads_minor_units() {
        assert_eq!(Price::from_cents(5).unwrap().to_string(), "0.05");
        assert_eq!(Price::from_cents(1999).unwrap().to_string(), "19.99");
        assert_eq!(Price::from_cents(100_00).unwrap().to_string(), "100.00");
    }

    #[test]
    fn test_times() {
        let price = Price::from_cents(250).unwrap();
        assert_eq!(price.times(4), 1000);
    }

    #[test]
    fn test_cents_maps_over_option() {
        // Optional money columns bind via `Option::map(Price::cents)`, which
        // needs a by-value receiver.
        let cost = Some(Price::from_cents(750).unwrap());
        assert_eq!(cost.map(Price::cents), Some(750));
        assert_eq!(None::<Price>.map(Price::cents), None);
    }

    #[test]
    fn test_serde_is_plain_integer() {
        let price = Price::from_cents(1500).unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "1500");
    }
}
