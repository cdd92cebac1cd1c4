//! In-memory attribute columns backing fields

use serde::{Deserialize, Serialize};

use super::DataType;

/// Explicit prefetch setting on an attribute
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefetchOverride {
    #[default]
    Unset,
    On,
    Off,
}

/// An attribute owned by a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub data_type: DataType,
    /// Backs a geo position (z-curve encoded)
    #[serde(default)]
    pub position: bool,
    #[serde(default)]
    pub prefetch: PrefetchOverride,
}

impl Attribute {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            position: false,
            prefetch: PrefetchOverride::Unset,
        }
    }

    /// Position attribute for a geo field
    pub fn position(name: impl Into<String>) -> Self {
        Self {
            position: true,
            ..Self::new(name, DataType::Position)
        }
    }

    pub fn with_prefetch(mut self, prefetch: PrefetchOverride) -> Self {
        self.prefetch = prefetch;
        self
    }

    pub fn is_position(&self) -> bool {
        self.position
    }

    /// Whether this attribute goes into the prefetch summary.
    ///
    /// Unless overridden, single-value non-tensor attributes are prefetched.
    pub fn is_prefetch(&self) -> bool {
        match self.prefetch {
            PrefetchOverride::On => true,
            PrefetchOverride::Off => false,
            PrefetchOverride::Unset => !self.data_type.is_tensor() && !self.data_type.is_multi_value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefetch_defaults() {
        assert!(Attribute::new("year", DataType::Int).is_prefetch());
        assert!(!Attribute::new("tags", DataType::array(DataType::String)).is_prefetch());
        assert!(!Attribute::new("emb", DataType::Tensor("tensor(x[4])".into())).is_prefetch());
    }

    #[test]
    fn test_prefetch_override() {
        let forced = Attribute::new("tags", DataType::array(DataType::String))
            .with_prefetch(PrefetchOverride::On);
        assert!(forced.is_prefetch());
        let off = Attribute::new("year", DataType::Int).with_prefetch(PrefetchOverride::Off);
        assert!(!off.is_prefetch());
    }
}
