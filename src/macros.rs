//! Macros for declaring global singletons and factories.
//!
//! Each macro generates a module holding a private static plus free functions,
//! so the rest of the program never touches the static directly.

/// Declares a global singleton holder.
///
/// `define_singleton!(name: Type)` generates a module `name` backed by a
/// non-recoverable [`Singleton`](crate::Singleton);
/// `define_singleton!(recoverable name: Type)` uses a
/// [`RecoverableSingleton`](crate::RecoverableSingleton) and adds teardown functions.
///
/// The generated module glob-imports its parent, so `Type` resolves as it does
/// at the call site. `Type` must be `Send + Sync`.
///
/// # Examples
///
/// ```rust
/// use singleton_factory::{define_singleton, HolderState};
///
/// pub struct Config {
///     pub threads: usize,
/// }
///
/// pub struct Pool {
///     pub size: usize,
/// }
///
/// define_singleton!(config: Config);
/// define_singleton!(recoverable pool: Pool);
///
/// fn main() {
///     let cfg = config::instance(|| Config { threads: 4 });
///     assert_eq!(cfg.threads, 4);
///
///     let p = pool::instance(|| Pool { size: cfg.threads });
///     assert_eq!(p.size, 4);
///
///     assert!(pool::destroy());
///     assert_eq!(pool::state(), HolderState::Destroyed);
///     assert_eq!(pool::instance(|| Pool { size: 8 }).size, 8);
/// }
/// ```
#[macro_export]
macro_rules! define_singleton {
    (recoverable $name:ident : $ty:ty) => {
        #[allow(dead_code)]
        pub mod $name {
            #[allow(unused_imports)]
            use super::*;

            static HOLDER: $crate::RecoverableSingleton<$ty> = $crate::RecoverableSingleton::new();

            /// The underlying holder.
            pub fn holder() -> &'static $crate::RecoverableSingleton<$ty> {
                &HOLDER
            }

            /// Returns the live instance, building it with `init` if there is none.
            pub fn instance(init: impl FnOnce() -> $ty) -> ::std::sync::Arc<$ty> {
                HOLDER.instance(init)
            }

            /// Returns the live instance, building it with the fallible `init` if there is none.
            pub fn try_instance<E>(
                init: impl FnOnce() -> ::std::result::Result<$ty, E>,
            ) -> ::std::result::Result<::std::sync::Arc<$ty>, E> {
                HOLDER.try_instance(init)
            }

            /// Returns the live instance without building one.
            pub fn get() -> ::std::option::Option<::std::sync::Arc<$ty>> {
                HOLDER.get()
            }

            /// Tears down the live instance.
            pub fn destroy() -> bool {
                HOLDER.destroy()
            }

            /// Current lifecycle state.
            pub fn state() -> $crate::HolderState {
                HOLDER.state()
            }

            /// Returns a guard that tears the instance down when dropped.
            pub fn teardown_guard() -> $crate::TeardownGuard<'static, $ty> {
                HOLDER.teardown_guard()
            }
        }
    };
    ($name:ident : $ty:ty) => {
        #[allow(dead_code)]
        pub mod $name {
            #[allow(unused_imports)]
            use super::*;

            static HOLDER: $crate::Singleton<$ty> = $crate::Singleton::new();

            /// The underlying holder.
            pub fn holder() -> &'static $crate::Singleton<$ty> {
                &HOLDER
            }

            /// Returns the instance, building it with `init` on the first call.
            pub fn instance(init: impl FnOnce() -> $ty) -> &'static $ty {
                HOLDER.instance(init)
            }

            /// Returns the instance, building it with the fallible `init` on the first call.
            pub fn try_instance<E>(
                init: impl FnOnce() -> ::std::result::Result<$ty, E>,
            ) -> ::std::result::Result<&'static $ty, E> {
                HOLDER.try_instance(init)
            }

            /// Returns the instance if it has been built.
            pub fn get() -> ::std::option::Option<&'static $ty> {
                HOLDER.get()
            }
        }
    };
}

/// Declares a global [`ObjectFactory`](crate::ObjectFactory) for a product type.
///
/// `define_factory!(name: dyn Product)` generates a module `name` containing:
/// - the factory, held in a non-recoverable [`Singleton`](crate::Singleton) (hidden)
/// - a `Registration` type collected at link time, see [`register_product!`](crate::register_product)
/// - free functions `factory`, `register`, `register_fallible`, `unregister`,
///   `contains`, `keys`, `create`, `create_unique` and `create_shared`
///
/// The first call into the module runs the registration phase: every submitted
/// `Registration` is installed before the first lookup. Submissions are
/// installed in unspecified order.
///
/// # Examples
///
/// ```rust
/// use singleton_factory::{define_factory, register_product};
///
/// pub trait Animal: Send + Sync {
///     fn speak(&self) -> String;
/// }
///
/// #[derive(Default)]
/// pub struct Dog;
/// impl Animal for Dog {
///     fn speak(&self) -> String {
///         "woof".to_string()
///     }
/// }
///
/// pub struct Parrot {
///     word: &'static str,
/// }
/// impl Animal for Parrot {
///     fn speak(&self) -> String {
///         self.word.to_string()
///     }
/// }
///
/// define_factory!(animals: dyn Animal);
/// register_product!(animals, Dog);
/// register_product!(animals, "polly" => Parrot { word: "cracker" });
///
/// fn main() {
///     assert_eq!(animals::create_shared("Dog").unwrap().speak(), "woof");
///     assert_eq!(animals::create_unique("polly").unwrap().speak(), "cracker");
///     assert!(animals::create_unique("cat").is_err());
/// }
/// ```
#[macro_export]
macro_rules! define_factory {
    ($name:ident : $product:ty) => {
        #[allow(dead_code)]
        pub mod $name {
            #[allow(unused_imports)]
            use super::*;

            /// Load-time registration descriptor for this factory.
            pub struct Registration(pub $crate::Registration<$product>);

            $crate::inventory::collect!(Registration);

            static FACTORY: $crate::Singleton<$crate::ObjectFactory<$product>> =
                $crate::Singleton::new();

            /// Builds a descriptor; used by `register_product!`.
            pub const fn registration(
                key: &'static str,
                create: fn() -> ::std::boxed::Box<$product>,
            ) -> Registration {
                Registration($crate::Registration::new(key, create))
            }

            /// The factory, with every submitted registration installed.
            pub fn factory() -> &'static $crate::ObjectFactory<$product> {
                FACTORY.instance(|| {
                    let factory = $crate::ObjectFactory::new();
                    factory.install(
                        $crate::inventory::iter::<Registration>
                            .into_iter()
                            .map(|registration| &registration.0),
                    );
                    factory
                })
            }

            /// Register a constructor under `key`, replacing any earlier one.
            pub fn register<F>(key: impl ::std::convert::Into<::std::string::String>, create: F)
            where
                F: Fn() -> ::std::boxed::Box<$product> + Send + Sync + 'static,
            {
                factory().register(key, create)
            }

            /// Register a constructor that can fail, replacing any earlier one.
            pub fn register_fallible<F, E>(
                key: impl ::std::convert::Into<::std::string::String>,
                create: F,
            ) where
                F: Fn() -> ::std::result::Result<::std::boxed::Box<$product>, E>
                    + Send
                    + Sync
                    + 'static,
                E: ::std::convert::Into<$crate::ConstructError>,
            {
                factory().register_fallible(key, create)
            }

            /// Remove the registration under `key`.
            pub fn unregister(key: &str) -> bool {
                factory().unregister(key)
            }

            /// Check if a constructor is registered under `key`.
            pub fn contains(key: &str) -> bool {
                factory().contains(key)
            }

            /// Registered keys, sorted.
            pub fn keys() -> ::std::vec::Vec<::std::string::String> {
                factory().keys()
            }

            /// Build a new object in the ownership form `H` the caller asks for.
            pub fn create<H>(key: &str) -> ::std::result::Result<H, $crate::FactoryError>
            where
                H: ::std::convert::From<::std::boxed::Box<$product>>,
            {
                factory().create(key)
            }

            /// Build a new object under sole ownership of the caller.
            pub fn create_unique(
                key: &str,
            ) -> ::std::result::Result<::std::boxed::Box<$product>, $crate::FactoryError> {
                factory().create_unique(key)
            }

            /// Build a new reference-counted object.
            pub fn create_shared(
                key: &str,
            ) -> ::std::result::Result<::std::sync::Arc<$product>, $crate::FactoryError> {
                factory().create_shared(key)
            }
        }
    };
}

/// Registers a product with a factory declared by [`define_factory!`](crate::define_factory).
///
/// This is the registration descriptor: it is collected at link time and
/// installed when the factory is first accessed, so it may appear in any module
/// or crate linked into the program.
///
/// - `register_product!(factory, Type)` registers `Type::default()` under the key `"Type"`.
/// - `register_product!(factory, "key" => expr)` registers `expr` under `"key"`.
///   The expression is evaluated anew for every created object and must not
///   capture local variables.
///
/// `factory` is the path of the generated module (e.g. `crate::shapes`).
#[macro_export]
macro_rules! register_product {
    ($($factory:ident)::+, $ty:ident $(,)?) => {
        $crate::inventory::submit! {
            $($factory)::+::registration(::std::stringify!($ty), || {
                ::std::boxed::Box::new(<$ty as ::std::default::Default>::default())
            })
        }
    };
    ($($factory:ident)::+, $key:expr => $ctor:expr $(,)?) => {
        $crate::inventory::submit! {
            $($factory)::+::registration($key, || ::std::boxed::Box::new($ctor))
        }
    };
}
