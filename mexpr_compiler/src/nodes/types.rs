//! Value types and type sets

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Runtime type of a value.
///
/// Boolean, integer and float form the numeric lattice
/// `Boolean < Integer < Float`; binary and string sit outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Boolean,
    Integer,
    Float,
    Binary,
    String,
}

impl ValueType {
    pub const ALL: [ValueType; 5] = [
        Self::Boolean,
        Self::Integer,
        Self::Float,
        Self::Binary,
        Self::String,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Binary => "binary",
            Self::String => "string",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Boolean => 1,
            Self::Integer => 2,
            Self::Float => 4,
            Self::Binary => 8,
            Self::String => 16,
        }
    }

    /// Position in the numeric lattice, `None` outside it
    pub const fn numeric_rank(self) -> Option<u8> {
        match self {
            Self::Boolean => Some(0),
            Self::Integer => Some(1),
            Self::Float => Some(2),
            Self::Binary | Self::String => None,
        }
    }

    pub const fn is_numeric(self) -> bool {
        self.numeric_rank().is_some()
    }

    /// Wider of two numeric types, never narrower than integer
    pub fn arithmetic_promotion(left: ValueType, right: ValueType) -> Option<ValueType> {
        let rank = left.numeric_rank()?.max(right.numeric_rank()?);
        Some(if rank >= 2 { Self::Float } else { Self::Integer })
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of value types, used for static typing and parameter narrowing
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeSet(u8);

impl TypeSet {
    pub const EMPTY: TypeSet = TypeSet(0);
    pub const BOOLEAN: TypeSet = TypeSet::single(ValueType::Boolean);
    pub const INTEGER: TypeSet = TypeSet::single(ValueType::Integer);
    pub const FLOAT: TypeSet = TypeSet::single(ValueType::Float);
    pub const BINARY: TypeSet = TypeSet::single(ValueType::Binary);
    pub const STRING: TypeSet = TypeSet::single(ValueType::String);
    pub const NUMERIC: TypeSet = TypeSet(0b00111);
    pub const ANY: TypeSet = TypeSet(0b11111);

    pub const fn single(value_type: ValueType) -> Self {
        TypeSet(value_type.bit())
    }

    pub const fn contains(self, value_type: ValueType) -> bool {
        self.0 & value_type.bit() != 0
    }

    pub const fn union(self, other: TypeSet) -> TypeSet {
        TypeSet(self.0 | other.0)
    }

    pub const fn intersection(self, other: TypeSet) -> TypeSet {
        TypeSet(self.0 & other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// The only member, if there is exactly one
    pub fn as_single(self) -> Option<ValueType> {
        let mut iter = self.iter();
        match (iter.next(), iter.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    pub fn iter(self) -> impl Iterator<Item = ValueType> {
        ValueType::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl FromIterator<ValueType> for TypeSet {
    fn from_iter<I: IntoIterator<Item = ValueType>>(iter: I) -> Self {
        iter.into_iter()
            .fold(TypeSet::EMPTY, |set, t| set.union(TypeSet::single(t)))
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == TypeSet::ANY {
            return f.write_str("any");
        }
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.iter().map(ValueType::as_str).collect();
        f.write_str(&names.join("|"))
    }
}

impl fmt::Debug for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeSet({})", self)
    }
}

impl Serialize for TypeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_set_operations() {
        let set = TypeSet::INTEGER.union(TypeSet::STRING);
        assert!(set.contains(ValueType::Integer));
        assert!(!set.contains(ValueType::Float));
        assert_eq!(set.len(), 2);
        assert_eq!(set.intersection(TypeSet::NUMERIC), TypeSet::INTEGER);
        assert!(TypeSet::BINARY.intersection(TypeSet::NUMERIC).is_empty());
        assert_eq!(TypeSet::NUMERIC.iter().count(), 3);
    }

    #[test]
    fn test_type_set_display() {
        assert_eq!(TypeSet::ANY.to_string(), "any");
        assert_eq!(TypeSet::EMPTY.to_string(), "none");
        assert_eq!(TypeSet::NUMERIC.to_string(), "boolean|integer|float");
    }

    #[test]
    fn test_single_member() {
        assert_eq!(TypeSet::FLOAT.as_single(), Some(ValueType::Float));
        assert_eq!(TypeSet::NUMERIC.as_single(), None);
        let collected: TypeSet = [ValueType::Binary].into_iter().collect();
        assert_eq!(collected, TypeSet::BINARY);
    }

    #[test]
    fn test_arithmetic_promotion() {
        use ValueType::*;
        assert_eq!(ValueType::arithmetic_promotion(Boolean, Boolean), Some(Integer));
        assert_eq!(ValueType::arithmetic_promotion(Integer, Boolean), Some(Integer));
        assert_eq!(ValueType::arithmetic_promotion(Integer, Float), Some(Float));
        assert_eq!(ValueType::arithmetic_promotion(String, Integer), None);
    }
}
