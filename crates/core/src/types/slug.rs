//! URL slug type for stores and products.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum SlugError {
    /// The input is shorter than the minimum length.
    #[error("slug must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The input is longer than the maximum length.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[a-z0-9-]`.
    #[error("slug can only contain lowercase letters, numbers, and hyphens")]
    InvalidCharacter,
}

/// A URL-safe identifier for stores and products.
///
/// Slugs are 2-255 characters of lowercase ASCII letters, digits, and
/// hyphens. They appear in public URLs and must be unique per store.
///
/// ```
/// use mercantia_core::Slug;
///
/// assert!(Slug::parse("my-store-42").is_ok());
/// assert!(Slug::parse("My Store").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Minimum slug length.
    pub const MIN_LENGTH: usize = 2;
    /// Maximum slug length.
    pub const MAX_LENGTH: usize = 255;

    /// Parse a `Slug` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is outside the 2-255 character range or
    /// contains anything other than lowercase letters, digits, and hyphens.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        let s = s.trim();

        if s.len() < Self::MIN_LENGTH {
            return Err(SlugError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if !s
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return Err(SlugError::InvalidCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Slug` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Slug {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Slug {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Slug {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Slug::parse("store").is_ok());
        assert!(Slug::parse("my-store-42").is_ok());
        assert!(Slug::parse("a1").is_ok());
    }

    #[test]
    fn test_parse_too_short() {
        assert!(matches!(Slug::parse("a"), Err(SlugError::TooShort { .. })));
        assert!(matches!(Slug::parse(""), Err(SlugError::TooShort { .. })));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a".repeat(256);
        assert!(matches!(
            Slug::parse(&long),
            Err(SlugError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_invalid_characters() {
        assert!(matches!(
            Slug::parse("My-Store"),
            Err(SlugError::InvalidCharacter)
        ));
        assert!(matches!(
            Slug::parse("my store"),
            Err(SlugError::InvalidCharacter)
        ));
        assert!(matches!(
            Slug::parse("store_1"),
            Err(SlugError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_display() {
        let slug = Slug::parse("my-store").unwrap();
        assert_eq!(format!("{slug}"), "my-store");
    }
}
