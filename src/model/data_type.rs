//! Document field data types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Data type of a field, attribute or summary field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    String,
    Int,
    Long,
    Float,
    Double,
    Bool,
    Byte,
    Raw,
    Uri,
    /// Geographical position (x, y)
    Position,
    Predicate,
    /// Tensor with its type spec, e.g. `tensor<float>(x[128])`
    Tensor(String),
    /// Named struct type
    Struct(String),
    Array(Box<DataType>),
    WeightedSet(Box<DataType>),
    Map(Box<DataType>, Box<DataType>),
}

impl DataType {
    pub fn array(inner: DataType) -> Self {
        Self::Array(Box::new(inner))
    }

    pub fn map(key: DataType, value: DataType) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    /// Single scalar value type
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::String
                | Self::Int
                | Self::Long
                | Self::Float
                | Self::Double
                | Self::Bool
                | Self::Byte
                | Self::Uri
        )
    }

    /// Holds more than one value per document
    pub fn is_multi_value(&self) -> bool {
        matches!(self, Self::Array(_) | Self::WeightedSet(_) | Self::Map(..))
    }

    pub fn is_tensor(&self) -> bool {
        matches!(self, Self::Tensor(_))
    }

    /// Complex types whose value can be rebuilt from struct field attributes:
    /// `array<struct>`, `map<primitive, primitive>` and `map<primitive, struct>`.
    pub fn is_supported_complex(&self) -> bool {
        match self {
            Self::Array(inner) => matches!(**inner, Self::Struct(_)),
            Self::Map(key, value) => {
                key.is_primitive() && (value.is_primitive() || matches!(**value, Self::Struct(_)))
            }
            _ => false,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Int => write!(f, "int"),
            Self::Long => write!(f, "long"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::Bool => write!(f, "bool"),
            Self::Byte => write!(f, "byte"),
            Self::Raw => write!(f, "raw"),
            Self::Uri => write!(f, "uri"),
            Self::Position => write!(f, "position"),
            Self::Predicate => write!(f, "predicate"),
            Self::Tensor(spec) => write!(f, "{}", spec),
            Self::Struct(name) => write!(f, "{}", name),
            Self::Array(inner) => write!(f, "array<{}>", inner),
            Self::WeightedSet(inner) => write!(f, "weightedset<{}>", inner),
            Self::Map(key, value) => write!(f, "map<{},{}>", key, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_complex_types() {
        let person = DataType::Struct("person".to_string());
        assert!(DataType::array(person.clone()).is_supported_complex());
        assert!(DataType::map(DataType::String, DataType::Int).is_supported_complex());
        assert!(DataType::map(DataType::String, person).is_supported_complex());
        assert!(!DataType::array(DataType::String).is_supported_complex());
        assert!(!DataType::map(DataType::Position, DataType::Int).is_supported_complex());
    }

    #[test]
    fn test_display() {
        let dt = DataType::map(DataType::String, DataType::array(DataType::Int));
        assert_eq!(dt.to_string(), "map<string,array<int>>");
    }

    #[test]
    fn test_serde_shape() {
        let dt: DataType = serde_json::from_str(r#"{"array":{"struct":"person"}}"#).unwrap();
        assert_eq!(dt, DataType::array(DataType::Struct("person".to_string())));
        let dt: DataType = serde_json::from_str(r#""position""#).unwrap();
        assert_eq!(dt, DataType::Position);
    }
}
