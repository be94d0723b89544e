//! Contratos de factory.
//!
//! `DynFactory` es la interfaz neutra que usa el registro. Hay dos formas
//! cómodas de producir una:
//! - implementar `Injectable` en el propio tipo (dependencias declaradas +
//!   constructor), que se adapta con `InjectableFactory`.
//! - `FnFactory<K>`: un closure con su lista de parámetros; `K` puede ser un
//!   objeto trait para registrar una implementación bajo su interfaz.

use std::marker::PhantomData;
use std::sync::Arc;

use super::args::{Args, Instance};
use super::manager::DependencyManager;
use super::param::Param;
use crate::errors::Result;
use crate::key::TypeKey;

/// Provider sin argumentos propios: recibe el manager en la llamada para
/// resolver sus dependencias.
pub type Provider = Arc<dyn Fn(&DependencyManager) -> Result<Instance> + Send + Sync>;

pub trait DynFactory: Send + Sync {
    /// Clave bajo la que se registra. `None` si no se puede derivar.
    fn supplies(&self) -> Option<TypeKey>;

    /// Ámbito para las búsquedas de configuración (`"{owner}.{param}"`).
    fn owner(&self) -> Option<String> {
        None
    }

    fn dependencies(&self) -> Vec<Param>;

    fn construct(&self, args: &Args) -> Result<Instance>;
}

/// Tipo que sabe construirse a partir de sus dependencias declaradas.
pub trait Injectable: Sized + Send + Sync + 'static {
    fn dependencies() -> Vec<Param> {
        Vec::new()
    }

    fn construct(args: &Args) -> Result<Self>;
}

/// Adaptador `Injectable` -> `DynFactory`.
pub struct InjectableFactory<T>(PhantomData<fn() -> T>);

impl<T> InjectableFactory<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for InjectableFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Injectable> DynFactory for InjectableFactory<T> {
    fn supplies(&self) -> Option<TypeKey> {
        Some(TypeKey::of::<T>())
    }

    fn owner(&self) -> Option<String> {
        Some(TypeKey::of::<T>().short_name().to_string())
    }

    fn dependencies(&self) -> Vec<Param> {
        T::dependencies()
    }

    fn construct(&self, args: &Args) -> Result<Instance> {
        Ok(Instance::new(Arc::new(T::construct(args)?)))
    }
}

type BuildFn<K> = Box<dyn Fn(&Args) -> Result<Arc<K>> + Send + Sync>;

/// Factory a partir de un closure.
pub struct FnFactory<K: ?Sized> {
    params: Vec<Param>,
    owner: Option<String>,
    build: BuildFn<K>,
}

impl<K: ?Sized + Send + Sync + 'static> FnFactory<K> {
    /// El closure devuelve `Arc<K>`; útil para `K = dyn Trait`.
    pub fn new<F>(params: Vec<Param>, build: F) -> Self
        where F: Fn(&Args) -> Result<Arc<K>> + Send + Sync + 'static
    {
        Self { params,
               owner: None,
               build: Box::new(build) }
    }

    /// Fija el ámbito de configuración de los parámetros.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

impl<K: Send + Sync + 'static> FnFactory<K> {
    /// Variante para tipos concretos: el closure devuelve el valor.
    pub fn from_fn<F>(params: Vec<Param>, build: F) -> Self
        where F: Fn(&Args) -> Result<K> + Send + Sync + 'static
    {
        Self::new(params, move |args| build(args).map(Arc::new))
    }
}

impl<K: ?Sized + Send + Sync + 'static> DynFactory for FnFactory<K> {
    fn supplies(&self) -> Option<TypeKey> {
        Some(TypeKey::of::<K>())
    }

    fn owner(&self) -> Option<String> {
        self.owner.clone()
    }

    fn dependencies(&self) -> Vec<Param> {
        self.params.clone()
    }

    fn construct(&self, args: &Args) -> Result<Instance> {
        (self.build)(args).map(Instance::new)
    }
}
