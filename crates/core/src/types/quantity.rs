//! Cart line quantity.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// The requested quantity is zero or negative.
    #[error("quantity must be at least 1 (got {0})")]
    NotPositive(i64),
    /// The requested quantity does not fit in a `u32`.
    #[error("quantity must be at most {max} (got {got})")]
    TooLarge {
        /// Largest accepted quantity.
        max: u32,
        /// Rejected value.
        got: i64,
    },
}

/// Number of units of a product in the cart.
///
/// A cart line always holds at least one unit, so a `Quantity` is never zero.
///
/// ## Examples
///
/// ```
/// use rocketshoes_core::Quantity;
///
/// assert_eq!(Quantity::try_from(3_i64).unwrap().get(), 3);
/// assert!(Quantity::try_from(0_i64).is_err());
/// assert!(Quantity::try_from(-2_i64).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(1);

    /// Get the underlying count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// One more unit, or `None` on overflow.
    #[must_use]
    pub fn incremented(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 1 {
            return Err(QuantityError::NotPositive(value));
        }
        u32::try_from(value).map(Self).map_err(|_| QuantityError::TooLarge {
            max: u32::MAX,
            got: value,
        })
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
