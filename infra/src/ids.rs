use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use err_derive::Error;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Numeric identifier as handed out by the order API, tagged with the kind
/// of thing it names so a table id can't be passed where a product id is
/// expected.
pub struct Id<T> {
    val: u64,
    phantom: PhantomData<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error(display = "Invalid prefix")]
    InvalidPrefix,
    #[error(display = "Unparseable Id")]
    Unparseable,
}

pub trait Entity {
    const PREFIX: &'static str;
}

const DIVIDER: &str = "-";

impl<T> Id<T> {
    pub const fn new(val: u64) -> Self {
        Id {
            val,
            phantom: PhantomData,
        }
    }

    pub fn get(&self) -> u64 {
        self.val
    }

    pub fn is_zero(&self) -> bool {
        self.val == 0
    }
}

impl<T: Entity> fmt::Display for Id<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}{}{}", T::PREFIX, DIVIDER, self.val)
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_tuple("Id").field(&self.val).finish()
    }
}

/// Accepts either the bare number (`7`) or the prefixed form (`producto-7`).
impl<T: Entity> std::str::FromStr for Id<T> {
    type Err = IdParseError;
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let src = src.trim();
        if !src.is_empty() && src.bytes().all(|b| b.is_ascii_digit()) {
            return src
                .parse::<u64>()
                .map(Id::new)
                .map_err(|_| IdParseError::Unparseable);
        }

        if T::PREFIX.len() > src.len() {
            return Err(IdParseError::InvalidPrefix);
        }
        let (start, remainder) = src.split_at(T::PREFIX.len());
        if start != T::PREFIX {
            return Err(IdParseError::InvalidPrefix);
        }
        if !remainder.starts_with(DIVIDER) {
            return Err(IdParseError::Unparseable);
        }
        let digits = &remainder[DIVIDER.len()..];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdParseError::Unparseable);
        }
        digits
            .parse::<u64>()
            .map(Id::new)
            .map_err(|_| IdParseError::Unparseable)
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Id::new(0)
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.val == other.val
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.val.hash(state)
    }
}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.val.cmp(&other.val)
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Id::new(self.val)
    }
}

impl<T> Copy for Id<T> {}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.val)
    }
}

impl<'de, T: Entity> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor<T>(PhantomData<T>);
        impl<'vi, T: Entity> de::Visitor<'vi> for IdVisitor<T> {
            type Value = Id<T>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "a non-negative integer id")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Id<T>, E> {
                Ok(Id::new(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Id<T>, E> {
                if value < 0 {
                    return Err(E::invalid_value(de::Unexpected::Signed(value), &self));
                }
                Ok(Id::new(value as u64))
            }

            // Some backends hand back whole-number floats (`5.0`).
            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Id<T>, E> {
                if value < 0.0 || value.fract() != 0.0 || value > u64::MAX as f64 {
                    return Err(E::invalid_value(de::Unexpected::Float(value), &self));
                }
                Ok(Id::new(value as u64))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Id<T>, E> {
                value.parse::<Id<T>>().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(IdVisitor(PhantomData))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json;

    #[derive(Debug)]
    struct Canary;

    impl Entity for Canary {
        const PREFIX: &'static str = "canary";
    }

    #[test]
    fn round_trips_via_to_from_str() {
        let id = Id::<Canary>::new(42);
        let s = id.to_string();
        assert_eq!(s, "canary-42");
        let id2 = s.parse::<Id<Canary>>().expect("parse id");
        assert_eq!(id, id2);
    }

    #[test]
    fn serializes_as_a_bare_number() {
        let id = Id::<Canary>::new(5);
        let json = serde_json::to_string(&id).expect("serde_json::to_string");
        assert_eq!(json, "5");
    }

    #[test]
    fn deserializes_from_numbers_and_strings() {
        let from_num: Id<Canary> = serde_json::from_str("5").expect("number");
        let from_float: Id<Canary> = serde_json::from_str("5.0").expect("float");
        let from_str: Id<Canary> = serde_json::from_str("\"canary-5\"").expect("string");
        assert_eq!(from_num, Id::new(5));
        assert_eq!(from_float, Id::new(5));
        assert_eq!(from_str, Id::new(5));
    }

    #[test]
    fn should_reject_negative_and_fractional_ids() {
        assert!(serde_json::from_str::<Id<Canary>>("-1").is_err());
        assert!(serde_json::from_str::<Id<Canary>>("1.5").is_err());
    }

    #[test]
    fn should_parse_bare_number() {
        let id = "17".parse::<Id<Canary>>().expect("parse");
        assert_eq!(id.get(), 17);
    }

    #[test]
    fn should_verify_has_correct_entity_prefix() {
        let result = "wrongy-12".parse::<Id<Canary>>();

        assert_eq!(result, Err(IdParseError::InvalidPrefix));
    }

    #[test]
    fn should_yield_useful_error_when_just_prefix() {
        let result = "canary".parse::<Id<Canary>>();

        assert_eq!(result, Err(IdParseError::Unparseable));
    }

    #[test]
    fn should_yield_useful_error_when_wrong_divider() {
        let result = "canary#12".parse::<Id<Canary>>();

        assert_eq!(result, Err(IdParseError::Unparseable));
    }

    #[test]
    fn should_yield_useful_error_when_prefix_is_longer_than_input() {
        #[derive(Debug)]
        struct Long;
        impl Entity for Long {
            // Borrowed from https://en.wikipedia.org/wiki/Longest_word_in_English
            const PREFIX: &'static str = "pseudopseudohypoparathyroidism";
        }

        let result = "wrong-12".parse::<Id<Long>>();

        assert_eq!(result, Err(IdParseError::InvalidPrefix));
    }

    #[test]
    fn should_allow_ordering() {
        assert!(Id::<Canary>::new(1) < Id::new(2));
    }
}

