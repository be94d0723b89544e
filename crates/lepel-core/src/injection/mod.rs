//! Inyección de dependencias por tipo y por nombre.
//!
//! - `param`: descripción declarada de los parámetros de un factory o step.
//! - `args`: instancias erasadas y argumentos ya resueltos.
//! - `factory`: contratos de factory (`Injectable`, `FnFactory`, `DynFactory`).
//! - `stateful`: capacidad de snapshot/restore de los singletons.
//! - `manager`: `DependencyManager`, registro de providers + resolver.

pub mod args;
pub mod factory;
pub mod manager;
pub mod param;
pub mod stateful;

pub use args::{Args, Instance, Resolved};
pub use factory::{DynFactory, FnFactory, Injectable, Provider};
pub use manager::{DependencyManager, Lifetime, Registration};
pub use param::{Annotation, Param};
pub use stateful::Stateful;
