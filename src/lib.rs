//! # Singleton Factory
//!
//! Two small building blocks for process-wide objects:
//!
//! - **Singleton holders**: a lazily-built single instance of a type, either
//!   [`Singleton`] (built once, lives as long as the holder) or
//!   [`RecoverableSingleton`] (can be torn down and is rebuilt on the next access).
//! - **Object factory**: [`ObjectFactory`] maps string keys to constructors of
//!   a product type such as `dyn Shape`, so callers build objects by key
//!   without naming the concrete type.
//!
//! [`SpinLock`] is the busy-waiting lock guarding the recoverable holder's slow path.
//!
//! ## Quick Start
//!
//! ```rust
//! use singleton_factory::{ObjectFactory, RecoverableSingleton};
//! use std::sync::Arc;
//!
//! trait Shape: Send + Sync {
//!     fn sides(&self) -> u32;
//! }
//!
//! struct Triangle;
//! impl Shape for Triangle {
//!     fn sides(&self) -> u32 {
//!         3
//!     }
//! }
//!
//! static SHAPES: RecoverableSingleton<ObjectFactory<dyn Shape>> = RecoverableSingleton::new();
//!
//! let shapes = SHAPES.instance(|| {
//!     let factory: ObjectFactory<dyn Shape> = ObjectFactory::new();
//!     factory.register("triangle", || Box::new(Triangle));
//!     factory
//! });
//!
//! let shape: Arc<dyn Shape> = shapes.create_shared("triangle").unwrap();
//! assert_eq!(shape.sides(), 3);
//! ```
//!
//! ## Features
//!
//! - **Thread-safe**: exactly one thread builds a recoverable instance under contention
//! - **Explicit lifecycle**: `Uninitialized -> Live -> Destroyed -> Live ...` via [`HolderState`]
//! - **Load-time registration**: [`register_product!`] descriptors are collected at link time
//! - **Tracing support**: per-instance callbacks plus `tracing` debug logs
//!
//! ## Main Items
//!
//! - [`Singleton`] / [`RecoverableSingleton`] - the two holder variants
//! - [`ObjectFactory`] - keyed constructor registry
//! - [`define_singleton!`] / [`define_factory!`] - global declarations
//! - [`register_product!`] - load-time registration descriptor

mod factory;
mod factory_error;
mod factory_event;
mod holder_event;
mod macros;
mod recoverable;
mod singleton;
mod spin_lock;
mod trace;

pub use factory::{ObjectFactory, Registration};
pub use factory_error::{ConstructError, FactoryError};
pub use factory_event::FactoryEvent;
pub use holder_event::HolderEvent;
pub use recoverable::{HolderState, RecoverableSingleton, TeardownGuard};
pub use singleton::Singleton;
pub use spin_lock::{SpinGuard, SpinLock};
pub use trace::TraceCallback;

#[doc(hidden)]
pub use inventory;
