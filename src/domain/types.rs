//! Strongly-typed value objects used by catalog entities.
//!
//! Domain structs carry these wrappers instead of raw primitives so that
//! identifiers, names, URLs and prices are checked once at the boundary.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;
use validator::ValidateUrl;

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// An identifier was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveId(&'static str),
    /// A numeric value required to be non-negative was negative or not finite.
    #[error("{0} must be zero or greater")]
    NegativeNumber(&'static str),
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// URL validation failed.
    #[error("{0} must be a valid URL")]
    InvalidUrl(&'static str),
    /// Catch-all for custom validation failures.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

/// Macro to generate lightweight newtypes for database-assigned identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId($field))
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }
    };
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                trim_and_require_non_empty(value, $field).map(Self)
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

macro_rules! url_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed URL and validates its format.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let trimmed = trim_and_require_non_empty(value, $field)?;
                if !trimmed.as_str().validate_url() {
                    return Err(TypeConstraintError::InvalidUrl($field));
                }
                Ok(Self(trimmed))
            }

            /// Borrow the URL as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned URL.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

id_newtype!(
    CategoryId,
    "Unique identifier for a top-level category.",
    "category_id"
);
id_newtype!(
    SubcategoryLvl1Id,
    "Unique identifier for a first-level subcategory.",
    "subcat_lvl1_id"
);
id_newtype!(
    SubcategoryLvl2Id,
    "Unique identifier for a second-level (crawlable) subcategory.",
    "subcat_lvl2_id"
);
id_newtype!(ProductId, "Unique identifier for a product.", "product_id");
id_newtype!(
    ProductPropertyId,
    "Unique identifier for a product property row.",
    "product_property_id"
);

non_empty_string_newtype!(
    CategoryName,
    "Category name enforcing non-empty values.",
    "category name"
);
non_empty_string_newtype!(
    SubcategoryName,
    "Subcategory name enforcing non-empty values.",
    "subcategory name"
);
non_empty_string_newtype!(
    ProductName,
    "Product name enforcing non-empty values.",
    "product name"
);
non_empty_string_newtype!(
    ProductUnits,
    "Product units enforcing non-empty values.",
    "units"
);
non_empty_string_newtype!(
    ProductDescription,
    "Product description enforcing non-empty values.",
    "description"
);
non_empty_string_newtype!(
    PropertyName,
    "Product property name enforcing non-empty values.",
    "property name"
);
non_empty_string_newtype!(
    WorkerId,
    "Identifier a crawler worker stamps on the rows it leases.",
    "worker id"
);

url_string_newtype!(CrawlUrl, "Subcategory listing URL.", "crawl url");
url_string_newtype!(ProductUrl, "Product page URL.", "product url");
url_string_newtype!(ImageUrl, "Product image URL.", "image url");

/// Name and description written when a product page could not be parsed.
pub const CRAWL_ERROR_SENTINEL: &str = "error";

impl ProductName {
    /// The sentinel name recorded for pages that failed to parse.
    pub fn crawl_error() -> Self {
        Self(CRAWL_ERROR_SENTINEL.to_string())
    }
}

impl ProductDescription {
    /// The sentinel description recorded for pages that failed to parse.
    pub fn crawl_error() -> Self {
        Self(CRAWL_ERROR_SENTINEL.to_string())
    }
}

impl WorkerId {
    /// Worker identity derived from the current process id.
    pub fn for_current_process() -> Self {
        Self(format!("worker-{}", std::process::id()))
    }
}

/// Largest accepted price, in cents.
pub const MAX_PRICE_CENTS: i64 = 100_000_000_000_000;

/// Scaled amounts this close to a whole cent are treated as that cent.
const CENT_TOLERANCE: f64 = 1e-6;

/// `value` in cents, snapped to the nearest cent when within float noise of
/// it and otherwise rounded with `direction`.
fn snap_to_cents(value: f64, direction: fn(f64) -> f64) -> f64 {
    let scaled = value * 100.0;
    let nearest = scaled.round();
    if (scaled - nearest).abs() < CENT_TOLERANCE {
        nearest
    } else {
        direction(scaled)
    }
}

/// Non-negative price with two fixed decimal digits, stored as whole cents.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ProductPrice(i64);

impl ProductPrice {
    /// Converts a decimal amount, rounding to the nearest cent.
    pub fn new(value: f64) -> Result<Self, TypeConstraintError> {
        if !value.is_finite() || value < 0.0 {
            return Err(TypeConstraintError::NegativeNumber("price"));
        }
        let cents = (value * 100.0).round();
        if cents > MAX_PRICE_CENTS as f64 {
            return Err(TypeConstraintError::InvalidValue(format!(
                "price {value} exceeds the maximum"
            )));
        }
        Ok(Self(cents as i64))
    }

    /// Smallest price not below `value`. Negative bounds clamp to zero;
    /// `None` when no price can reach the bound.
    pub fn lower_bound(value: f64) -> Result<Option<Self>, TypeConstraintError> {
        if value.is_nan() {
            return Err(TypeConstraintError::InvalidValue("price bound: NaN".into()));
        }
        let cents = snap_to_cents(value, f64::ceil).max(0.0);
        if cents > MAX_PRICE_CENTS as f64 {
            return Ok(None);
        }
        Ok(Some(Self(cents as i64)))
    }

    /// Largest price not above `value`. Bounds past the maximum clamp to it;
    /// `None` when the bound is negative.
    pub fn upper_bound(value: f64) -> Result<Option<Self>, TypeConstraintError> {
        if value.is_nan() {
            return Err(TypeConstraintError::InvalidValue("price bound: NaN".into()));
        }
        let cents = snap_to_cents(value, f64::floor);
        if cents < 0.0 {
            return Ok(None);
        }
        Ok(Some(Self(cents.min(MAX_PRICE_CENTS as f64) as i64)))
    }

    pub fn from_cents(cents: i64) -> Result<Self, TypeConstraintError> {
        if cents >= 0 {
            Ok(Self(cents))
        } else {
            Err(TypeConstraintError::NegativeNumber("price"))
        }
    }

    /// Returns the amount in cents.
    pub const fn cents(self) -> i64 {
        self.0
    }
}

impl Display for ProductPrice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for ProductPrice {
    type Err = TypeConstraintError;

    /// Parses `"49"`, `"49.9"` or `"49.99"`; more than two decimals is rejected.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || TypeConstraintError::InvalidValue(format!("price: {value}"));
        let trimmed = value.trim();
        let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        if whole.is_empty()
            || fraction.len() > 2
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };
        whole
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(fraction))
            .map(Self)
            .ok_or_else(invalid)
    }
}
