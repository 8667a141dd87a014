use thiserror::Error;

/// Boxed error produced by a fallible product constructor.
pub type ConstructError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures reported by the `create*` operations of an [`ObjectFactory`](crate::ObjectFactory).
#[derive(Debug, Error)]
pub enum FactoryError {
    /// No creator is registered under the requested key. Nothing was constructed.
    #[error("unknown object type `{key}` passed to factory")]
    UnknownKey { key: String },

    /// The registered constructor failed.
    #[error("failed to construct object `{key}`: {source}")]
    Construction {
        key: String,
        #[source]
        source: ConstructError,
    },
}

impl FactoryError {
    /// The key the failing request was made with.
    pub fn key(&self) -> &str {
        match self {
            FactoryError::UnknownKey { key } | FactoryError::Construction { key, .. } => key,
        }
    }

    /// Returns `true` for [`FactoryError::UnknownKey`].
    pub fn is_unknown_key(&self) -> bool {
        matches!(self, FactoryError::UnknownKey { .. })
    }
}

/// Compares variant and key; construction sources are not compared.
impl PartialEq for FactoryError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FactoryError::UnknownKey { key: a }, FactoryError::UnknownKey { key: b }) => a == b,
            (
                FactoryError::Construction { key: a, .. },
                FactoryError::Construction { key: b, .. },
            ) => a == b,
            _ => false,
        }
    }
}
