use serde::Serialize;
use serde_with::SerializeAs;
use serde_json::value::RawValue;

#[cfg(feature = "serde_deser_unquoted_bigdecimal")]
mod big_decimal_exact {
    use serde_with::{DeserializeAs, SerializeAs};
    use bigdecimal::BigDecimal;
    use serde::{Deserializer, Deserialize};
    use std::str::FromStr;

    /// Reads a bare JSON number into a `BigDecimal` without passing through `f64`.
    pub struct BigDecimalExact;

    impl<'de> DeserializeAs<'de, BigDecimal> for BigDecimalExact
    {
        fn deserialize_as<D>(deserializer: D) -> Result<BigDecimal, D::Error>
            where
                D: Deserializer<'de>,
        {
            <serde_json::Number as Deserialize<'de>>::deserialize(deserializer)
                .and_then(|s| BigDecimal::from_str(&s.to_string()).map_err(serde::de::Error::custom))
        }
    }

    /// Exact in both directions: parsed with [`BigDecimalExact`], written back as a
    /// bare JSON number with [`ToStringVerbatim`](super::ToStringVerbatim).
    pub struct JsonDecimal;

    impl<'de> DeserializeAs<'de, BigDecimal> for JsonDecimal {
        fn deserialize_as<D>(deserializer: D) -> Result<BigDecimal, D::Error>
            where
                D: Deserializer<'de>,
        {
            BigDecimalExact::deserialize_as(deserializer)
        }
    }

    impl SerializeAs<BigDecimal> for JsonDecimal {
        fn serialize_as<S>(source: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
        {
            super::ToStringVerbatim::serialize_as(source, serializer)
        }
    }
}

#[cfg(feature = "serde_deser_unquoted_bigdecimal")]
pub use big_decimal_exact::*;

/// Writes `T::to_string()` into the JSON output as-is, so decimals stay numbers.
pub struct ToStringVerbatim { }

impl<T> SerializeAs<T> for ToStringVerbatim
    where
        T: ToString,
{
    fn serialize_as<S>(source: &T, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
    {
        let raw_value = RawValue::from_string(source.to_string())
            .map_err(serde::ser::Error::custom)?;
        raw_value.serialize(serializer)
    }
}
