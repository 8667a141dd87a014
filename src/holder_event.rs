/// Lifecycle events emitted by a [`RecoverableSingleton`](crate::RecoverableSingleton).
///
/// These events are passed to the callback set via
/// [`RecoverableSingleton::set_trace_callback`](crate::RecoverableSingleton::set_trace_callback).
///
/// # Examples
///
/// ```rust
/// use singleton_factory::HolderEvent;
///
/// let event = HolderEvent::Reconstruct { type_name: "app::Logger", generation: 2 };
/// assert_eq!(event.to_string(), "reconstruct { type_name: app::Logger, generation: 2 }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HolderEvent {
    /// The instance was built for the first time (`Uninitialized -> Live`).
    Construct {
        /// The wrapped type (e.g. "alloc::string::String")
        type_name: &'static str,
    },

    /// The instance was rebuilt after a teardown (`Destroyed -> Live`).
    Reconstruct {
        /// The wrapped type
        type_name: &'static str,
        /// How many instances the holder has built so far, this one included
        generation: u64,
    },

    /// The live instance was released (`Live -> Destroyed`).
    Destroy {
        /// The wrapped type
        type_name: &'static str,
    },
}

impl std::fmt::Display for HolderEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HolderEvent::Construct { type_name } => {
                write!(f, "construct {{ type_name: {} }}", type_name)
            }
            HolderEvent::Reconstruct {
                type_name,
                generation,
            } => write!(
                f,
                "reconstruct {{ type_name: {}, generation: {} }}",
                type_name, generation
            ),
            HolderEvent::Destroy { type_name } => {
                write!(f, "destroy {{ type_name: {} }}", type_name)
            }
        }
    }
}

impl crate::trace::TraceEvent for HolderEvent {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holder_event_display() {
        let event = HolderEvent::Construct { type_name: "u32" };
        assert_eq!(event.to_string(), "construct { type_name: u32 }");

        let event = HolderEvent::Destroy { type_name: "u32" };
        assert_eq!(event.to_string(), "destroy { type_name: u32 }");
    }

    #[test]
    fn test_holder_event_clone() {
        let event = HolderEvent::Reconstruct {
            type_name: "u32",
            generation: 3,
        };
        assert_eq!(event.clone(), event);
    }
}
