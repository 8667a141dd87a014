/// Events emitted by an [`ObjectFactory`](crate::ObjectFactory) during operations.
///
/// These events are passed to the callback set via
/// [`ObjectFactory::set_trace_callback`](crate::ObjectFactory::set_trace_callback).
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use singleton_factory::FactoryEvent;
///
/// let event = FactoryEvent::Create { key: "circle".to_string(), found: true };
/// assert_eq!(event.to_string(), "create { key: circle, found: true }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactoryEvent {
    /// A creator was registered.
    Register {
        /// The registration key
        key: String,
        /// Whether an earlier creator under the same key was overwritten
        replaced: bool,
    },

    /// A creator removal was requested.
    Unregister {
        /// The key that was removed
        key: String,
        /// Whether the key was present
        found: bool,
    },

    /// An object was requested.
    Create {
        /// The requested key
        key: String,
        /// Whether a creator was registered under the key
        found: bool,
    },

    /// Every creator was removed.
    Clear {},
}

impl std::fmt::Display for FactoryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FactoryEvent::Register { key, replaced } => {
                write!(f, "register {{ key: {}, replaced: {} }}", key, replaced)
            }
            FactoryEvent::Unregister { key, found } => {
                write!(f, "unregister {{ key: {}, found: {} }}", key, found)
            }
            FactoryEvent::Create { key, found } => {
                write!(f, "create {{ key: {}, found: {} }}", key, found)
            }
            FactoryEvent::Clear {} => write!(f, "Clearing the Factory"),
        }
    }
}

impl crate::trace::TraceEvent for FactoryEvent {
    fn is_lookup(&self) -> bool {
        matches!(self, FactoryEvent::Create { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_event_display() {
        let event = FactoryEvent::Register {
            key: "square".to_string(),
            replaced: false,
        };
        assert_eq!(event.to_string(), "register { key: square, replaced: false }");

        let event = FactoryEvent::Unregister {
            key: "square".to_string(),
            found: true,
        };
        assert_eq!(event.to_string(), "unregister { key: square, found: true }");

        assert_eq!(FactoryEvent::Clear {}.to_string(), "Clearing the Factory");
    }

    #[test]
    fn test_only_create_is_lookup() {
        use crate::trace::TraceEvent;

        let create = FactoryEvent::Create {
            key: "circle".to_string(),
            found: false,
        };
        assert!(create.is_lookup());

        let register = FactoryEvent::Register {
            key: "circle".to_string(),
            replaced: false,
        };
        assert!(!register.is_lookup());
        assert!(!FactoryEvent::Clear {}.is_lookup());
    }
}
