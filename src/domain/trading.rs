//! Trading parameters assigned by administrators on approval.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Wire label of the unbounded upper trading amount.
pub const UNLIMITED: &str = "Unlimited";

/// Upper bound of the amount a user may trade.
///
/// Stored as a nullable float: `NULL` is `Unlimited`. On the wire it is
/// either a number or the string `"Unlimited"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TradingBound {
    Amount(f64),
    Unlimited,
}

impl TradingBound {
    /// The only place the storage representation is interpreted.
    pub fn from_storage(value: Option<f64>) -> Self {
        match value {
            Some(amount) => TradingBound::Amount(amount),
            None => TradingBound::Unlimited,
        }
    }

    /// The only place the storage representation is produced.
    pub fn to_storage(self) -> Option<f64> {
        match self {
            TradingBound::Amount(amount) => Some(amount),
            TradingBound::Unlimited => None,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, TradingBound::Unlimited)
    }

    /// Bound amount, if any.
    pub fn amount(&self) -> Option<f64> {
        match self {
            TradingBound::Amount(amount) => Some(*amount),
            TradingBound::Unlimited => None,
        }
    }
}

impl Default for TradingBound {
    fn default() -> Self {
        TradingBound::Amount(0.0)
    }
}

impl std::fmt::Display for TradingBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradingBound::Amount(amount) => write!(f, "{}", amount),
            TradingBound::Unlimited => f.write_str(UNLIMITED),
        }
    }
}

impl Serialize for TradingBound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TradingBound::Amount(amount) => serializer.serialize_f64(*amount),
            TradingBound::Unlimited => serializer.serialize_str(UNLIMITED),
        }
    }
}

impl<'de> Deserialize<'de> for TradingBound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BoundVisitor;

        impl<'de> de::Visitor<'de> for BoundVisitor {
            type Value = TradingBound;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a non-negative number or \"Unlimited\"")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(TradingBound::Amount(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(TradingBound::Amount(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(TradingBound::Amount(v as f64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                if v.trim().eq_ignore_ascii_case(UNLIMITED) {
                    Ok(TradingBound::Unlimited)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(TradingBound::Unlimited)
            }
        }

        deserializer.deserialize_any(BoundVisitor)
    }
}

/// Admin-assigned trading parameters, meaningful only once approved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingProfile {
    pub group_id: String,
    pub allowed_trading_amount_from: f64,
    pub allowed_trading_amount_to: TradingBound,
    pub admin_fee: f64,
    pub user_profit: f64,
    pub introducer_fee: f64,
}

impl TradingProfile {
    /// Zero defaults carried by every pending user.
    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn is_cleared(&self) -> bool {
        *self == Self::cleared()
    }
}
