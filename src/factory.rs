//! Keyed object factory.
//!
//! An [`ObjectFactory<P>`] maps string keys to constructors of `Box<P>`, where `P` is
//! usually a trait object such as `dyn Shape`. Independently written modules
//! register concrete types under a key; callers later build instances by key
//! without naming the concrete type.
//!
//! The factory is an ordinary value. Put it where the application wants it: pass
//! it around explicitly, or hold it in a [`Singleton`](crate::Singleton) via
//! [`define_factory!`](crate::define_factory) together with a load-time
//! registration phase.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::trace::TraceSlot;
use crate::{ConstructError, FactoryError, FactoryEvent};

/// Stored constructor. Cloned out of the map before it runs.
type Creator<P> = Arc<dyn Fn() -> Result<Box<P>, ConstructError> + Send + Sync>;

/// A registration descriptor: a key plus a non-capturing constructor.
///
/// Descriptors are plain data so they can be built in `const` context and
/// collected at link time (see [`register_product!`](crate::register_product)),
/// then installed in one registration phase with [`ObjectFactory::install`].
pub struct Registration<P: ?Sized> {
    /// Key the product is registered under.
    pub key: &'static str,
    /// Builds a new product.
    pub create: fn() -> Box<P>,
}

impl<P: ?Sized> Registration<P> {
    pub const fn new(key: &'static str, create: fn() -> Box<P>) -> Self {
        Self { key, create }
    }
}

impl<P: ?Sized> fmt::Debug for Registration<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Registry of product constructors indexed by key.
///
/// Keys are unique: registering under an existing key replaces the earlier
/// constructor. Every `create*` call builds a brand-new object; nothing is cached.
///
/// # Examples
///
/// ```rust
/// use singleton_factory::ObjectFactory;
/// use std::sync::Arc;
///
/// trait Shape {
///     fn name(&self) -> &'static str;
/// }
///
/// struct Circle;
/// impl Shape for Circle {
///     fn name(&self) -> &'static str {
///         "circle"
///     }
/// }
///
/// let shapes: ObjectFactory<dyn Shape> = ObjectFactory::new();
/// shapes.register("circle", || Box::new(Circle));
///
/// let shape: Arc<dyn Shape> = shapes.create_shared("circle").unwrap();
/// assert_eq!(shape.name(), "circle");
///
/// assert!(shapes.create_unique("unknown").is_err());
/// ```
pub struct ObjectFactory<P: ?Sized + 'static> {
    creators: Mutex<HashMap<String, Creator<P>>>,
    trace: TraceSlot<FactoryEvent>,
}

impl<P: ?Sized + 'static> ObjectFactory<P> {
    /// Creates an empty factory.
    ///
    /// Name the product type (`ObjectFactory::<dyn Shape>::new()`): left to
    /// inference, `P` is taken from the first registered closure's concrete type.
    pub fn new() -> Self {
        Self {
            creators: Mutex::new(HashMap::new()),
            trace: TraceSlot::new(),
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Registration
    // -------------------------------------------------------------------------------------------------

    /// Register a constructor under `key`.
    ///
    /// Constructor arguments are whatever the closure captures; they are re-used
    /// on every call. An existing registration under `key` is replaced.
    ///
    /// # Lock Poisoning Recovery
    ///
    /// If the map lock is poisoned, this method recovers by extracting the inner
    /// value. Insertion is a single map operation, so the map is never left
    /// half-updated.
    pub fn register<F>(&self, key: impl Into<String>, create: F)
    where
        F: Fn() -> Box<P> + Send + Sync + 'static,
    {
        self.insert(key.into(), Arc::new(move || Ok::<_, ConstructError>(create())));
    }

    /// Register a constructor that can fail.
    ///
    /// A failure surfaces from `create*` as [`FactoryError::Construction`].
    pub fn register_fallible<F, E>(&self, key: impl Into<String>, create: F)
    where
        F: Fn() -> Result<Box<P>, E> + Send + Sync + 'static,
        E: Into<ConstructError>,
    {
        self.insert(
            key.into(),
            Arc::new(move || create().map_err(Into::<ConstructError>::into)),
        );
    }

    /// Install a batch of registration descriptors.
    ///
    /// Descriptors are applied in iteration order, so a later duplicate key wins.
    pub fn install<'a>(&self, registrations: impl IntoIterator<Item = &'a Registration<P>>) {
        for registration in registrations {
            let create = registration.create;
            self.insert(
                registration.key.to_string(),
                Arc::new(move || Ok::<_, ConstructError>(create())),
            );
        }
    }

    fn insert(&self, key: String, creator: Creator<P>) {
        let replaced = self
            .creators
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key.clone(), creator)
            .is_some();

        self.trace.emit(&FactoryEvent::Register { key, replaced });
    }

    /// Remove the registration under `key`.
    ///
    /// Returns `true` if an entry was removed. Removing an absent key is a no-op.
    pub fn unregister(&self, key: &str) -> bool {
        let found = self
            .creators
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(key)
            .is_some();

        self.trace.emit(&FactoryEvent::Unregister {
            key: key.to_string(),
            found,
        });

        found
    }

    /// Check if a constructor is registered under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.creators
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .creators
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.creators
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every registration.
    ///
    /// Primarily intended for tests. Objects already created are unaffected.
    #[doc(hidden)]
    pub fn clear(&self) {
        self.trace.emit(&FactoryEvent::Clear {});
        self.creators
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clear();
    }

    // -------------------------------------------------------------------------------------------------
    // Creation
    // -------------------------------------------------------------------------------------------------

    /// Build a new object registered under `key`, in the ownership form `H` the
    /// caller asks for (`Box<P>`, `Arc<P>`, `Rc<P>`, ...).
    ///
    /// The constructor runs without the map lock held, so it may use this factory.
    ///
    /// # Errors
    ///
    /// - [`FactoryError::UnknownKey`] if nothing is registered under `key`;
    ///   nothing is constructed.
    /// - [`FactoryError::Construction`] if a fallible constructor failed.
    pub fn create<H>(&self, key: &str) -> Result<H, FactoryError>
    where
        H: From<Box<P>>,
    {
        let creator = self
            .creators
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(key)
            .cloned();

        self.trace.emit(&FactoryEvent::Create {
            key: key.to_string(),
            found: creator.is_some(),
        });

        let creator = creator.ok_or_else(|| FactoryError::UnknownKey {
            key: key.to_string(),
        })?;

        let product = creator().map_err(|source| FactoryError::Construction {
            key: key.to_string(),
            source,
        })?;

        Ok(H::from(product))
    }

    /// Build a new object under sole ownership of the caller.
    ///
    /// # Errors
    ///
    /// See [`create`](Self::create).
    pub fn create_unique(&self, key: &str) -> Result<Box<P>, FactoryError> {
        self.create(key)
    }

    /// Build a new reference-counted object. The last handle dropped destroys it.
    ///
    /// # Errors
    ///
    /// See [`create`](Self::create).
    pub fn create_shared(&self, key: &str) -> Result<Arc<P>, FactoryError> {
        self.create(key)
    }

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Set a tracing callback for operations on this factory.
    ///
    /// The callback runs with no factory lock held, so events from concurrent
    /// operations may arrive in a different order than the operations took
    /// effect on the map.
    pub fn set_trace_callback(&self, callback: impl Fn(&FactoryEvent) + Send + Sync + 'static) {
        self.trace.set(callback);
    }

    /// Clear the tracing callback.
    pub fn clear_trace_callback(&self) {
        self.trace.clear();
    }
}

impl<P: ?Sized + 'static> Default for ObjectFactory<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ?Sized + 'static> fmt::Debug for ObjectFactory<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectFactory")
            .field("product", &std::any::type_name::<P>())
            .field("keys", &self.keys())
            .field("trace", &self.trace)
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::{ObjectFactory, Registration};
    use crate::FactoryError;

    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    trait Shape: Send + Sync {
        fn name(&self) -> String;
        fn area(&self) -> f64;
    }

    struct Circle {
        radius: f64,
    }

    impl Shape for Circle {
        fn name(&self) -> String {
            "Circle".to_string()
        }
        fn area(&self) -> f64 {
            std::f64::consts::PI * self.radius * self.radius
        }
    }

    struct Square {
        side: f64,
    }

    impl Shape for Square {
        fn name(&self) -> String {
            "Square".to_string()
        }
        fn area(&self) -> f64 {
            self.side * self.side
        }
    }

    fn shapes() -> ObjectFactory<dyn Shape> {
        let factory: ObjectFactory<dyn Shape> = ObjectFactory::new();
        factory.register("circle", || Box::new(Circle { radius: 1.0 }));
        factory
    }

    #[test]
    fn test_create_shared_returns_registered_type() {
        let factory = shapes();
        let shape = factory.create_shared("circle").unwrap();
        assert_eq!(shape.name(), "Circle");
    }

    #[test]
    fn test_unknown_key() {
        let factory = shapes();
        assert_eq!(
            factory.create_unique("unknown").err(),
            Some(FactoryError::UnknownKey {
                key: "unknown".to_string()
            })
        );

        let empty: ObjectFactory<dyn Shape> = ObjectFactory::new();
        assert!(empty.create_shared("circle").err().unwrap().is_unknown_key());
    }

    #[test]
    fn test_unknown_key_constructs_nothing() {
        let built = Arc::new(AtomicUsize::new(0));
        let built_clone = built.clone();

        let factory: ObjectFactory<dyn Shape> = ObjectFactory::new();
        factory.register("square", move || {
            built_clone.fetch_add(1, Ordering::SeqCst);
            Box::new(Square { side: 1.0 })
        });

        assert!(factory.create_unique("circle").is_err());
        assert_eq!(built.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_registration_overwrite() {
        let factory = shapes();
        factory.register("circle", || Box::new(Square { side: 2.0 }));

        assert_eq!(factory.len(), 1);
        for _ in 0..3 {
            assert_eq!(factory.create_unique("circle").unwrap().name(), "Square");
        }
    }

    #[test]
    fn test_unregister_idempotent() {
        let factory = shapes();

        assert!(factory.unregister("circle"));
        assert!(!factory.unregister("circle"));
        assert!(!factory.unregister("never-registered"));

        assert!(factory.create_unique("circle").err().unwrap().is_unknown_key());
        assert!(factory.is_empty());
    }

    #[test]
    fn test_captured_arguments_reused() {
        let factory: ObjectFactory<dyn Shape> = ObjectFactory::new();
        let side = 3.0;
        factory.register("square3", move || Box::new(Square { side }));

        assert_eq!(factory.create_unique("square3").unwrap().area(), 9.0);
        assert_eq!(factory.create_shared("square3").unwrap().area(), 9.0);
    }

    #[test]
    fn test_every_call_builds_a_new_object() {
        let factory = shapes();

        let raw: Box<dyn Shape> = factory.create("circle").unwrap();
        let shared: Arc<dyn Shape> = factory.create_shared("circle").unwrap();
        let shared_again = factory.create_shared("circle").unwrap();
        let unique = factory.create_unique("circle").unwrap();

        let addresses = [
            &*raw as *const dyn Shape as *const u8,
            &*shared as *const dyn Shape as *const u8,
            &*shared_again as *const dyn Shape as *const u8,
            &*unique as *const dyn Shape as *const u8,
        ];
        for (i, a) in addresses.iter().enumerate() {
            for b in &addresses[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(!Arc::ptr_eq(&shared, &shared_again));
    }

    #[test]
    fn test_independent_lifetimes() {
        struct Tracked(Arc<AtomicUsize>);
        impl Drop for Tracked {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let drops = Arc::new(AtomicUsize::new(0));
        let drops_clone = drops.clone();
        let factory: ObjectFactory<Tracked> = ObjectFactory::new();
        factory.register("tracked", move || Box::new(Tracked(drops_clone.clone())));

        let shared = factory.create_shared("tracked").unwrap();
        let other_holder = shared.clone();
        let unique = factory.create_unique("tracked").unwrap();

        drop(unique);
        assert_eq!(drops.load(Ordering::SeqCst), 1);

        drop(shared);
        assert_eq!(drops.load(Ordering::SeqCst), 1);

        drop(other_holder);
        assert_eq!(drops.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_create_into_rc() {
        let factory = shapes();
        let shape: Rc<dyn Shape> = factory.create("circle").unwrap();
        assert_eq!(Rc::strong_count(&shape), 1);
    }

    #[test]
    fn test_fallible_constructor() {
        let factory: ObjectFactory<dyn Shape> = ObjectFactory::new();
        factory.register_fallible("broken", || Err::<Box<dyn Shape>, _>("out of paint"));

        let err = factory.create_shared("broken").err().unwrap();
        assert_eq!(
            err,
            FactoryError::Construction {
                key: "broken".to_string(),
                source: "ignored by comparison".into(),
            }
        );
        assert_eq!(
            err.to_string(),
            "failed to construct object `broken`: out of paint"
        );
    }

    #[test]
    fn test_constructor_may_use_factory() {
        let factory: Arc<ObjectFactory<dyn Shape>> = Arc::new(ObjectFactory::new());
        let inner = factory.clone();

        factory.register("square", || Box::new(Square { side: 2.0 }));
        factory.register("double-square", move || {
            let base = inner.create_unique("square").unwrap();
            Box::new(Square {
                side: base.area().sqrt() * 2.0,
            })
        });

        assert_eq!(factory.create_unique("double-square").unwrap().area(), 16.0);
    }

    #[test]
    fn test_install_registrations() {
        static REGISTRATIONS: [Registration<dyn Shape>; 2] = [
            Registration::<dyn Shape>::new("circle", || Box::new(Circle { radius: 2.0 })),
            Registration::<dyn Shape>::new("square", || Box::new(Square { side: 2.0 })),
        ];

        let factory: ObjectFactory<dyn Shape> = ObjectFactory::new();
        factory.install(&REGISTRATIONS);

        assert_eq!(factory.keys(), vec!["circle", "square"]);
        assert_eq!(factory.create_unique("square").unwrap().area(), 4.0);
    }

    #[test]
    fn test_trace_events() {
        let factory = shapes();
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();

        factory.set_trace_callback(move |e| {
            events_clone.lock().unwrap().push(format!("{}", e));
        });

        factory.register("circle", || Box::new(Circle { radius: 2.0 }));
        let _ = factory.create_unique("circle");
        let _ = factory.create_unique("hexagon");
        factory.unregister("hexagon");
        factory.clear();

        let captured = events.lock().unwrap();
        assert_eq!(
            *captured,
            vec![
                "register { key: circle, replaced: true }",
                "create { key: circle, found: true }",
                "create { key: hexagon, found: false }",
                "unregister { key: hexagon, found: false }",
                "Clearing the Factory",
            ]
        );
        drop(captured);

        factory.clear_trace_callback();
        factory.register("circle", || Box::new(Circle { radius: 1.0 }));
        assert_eq!(events.lock().unwrap().len(), 5);
    }
}
