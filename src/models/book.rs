//! Book (catalog entry) model and related types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Cover type of a physical book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum CoverType {
    Hard,
    Soft,
}

impl CoverType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverType::Hard => "Hard",
            CoverType::Soft => "Soft",
        }
    }
}

impl std::fmt::Display for CoverType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CoverType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Hard" => Ok(CoverType::Hard),
            "Soft" => Ok(CoverType::Soft),
            _ => Err(format!("Invalid cover type: {}", s)),
        }
    }
}

// SQLx conversion for CoverType (stored as text)
impl sqlx::Type<Postgres> for CoverType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for CoverType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for CoverType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Book model from database.
///
/// `inventory` is the number of physical copies available for loan; the
/// storage layer keeps it non-negative and it is only mutated through the
/// borrow/return workflows or direct catalog edits.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub cover: CoverType,
    pub inventory: i32,
    #[schema(value_type = String)]
    pub daily_fee: Decimal,
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub inventory: i32,
}

/// Book query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Case-insensitive substring match on the title
    pub title: Option<String>,
    /// Case-insensitive substring match on the author
    pub author: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "Author must be 1-255 characters"))]
    pub author: String,
    pub cover: CoverType,
    #[validate(range(min = 0, message = "Inventory cannot be negative"))]
    pub inventory: i32,
    #[schema(value_type = String)]
    pub daily_fee: Decimal,
}

/// Update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Author must be 1-255 characters"))]
    pub author: Option<String>,
    pub cover: Option<CoverType>,
    #[validate(range(min = 0, message = "Inventory cannot be negative"))]
    pub inventory: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub daily_fee: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_type_round_trips_through_text() {
        assert_eq!("Hard".parse::<CoverType>().unwrap(), CoverType::Hard);
        assert_eq!("Soft".parse::<CoverType>().unwrap(), CoverType::Soft);
        assert_eq!(CoverType::Hard.as_str(), "Hard");
        assert_eq!(CoverType::Soft.to_string(), "Soft");
    }

    #[test]
    fn cover_type_rejects_unknown_values() {
        assert!("hardback".parse::<CoverType>().is_err());
        assert!("".parse::<CoverType>().is_err());
    }
}
