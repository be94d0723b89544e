//! `DependencyManager`: registro de providers y resolver.
//!
//! Orden de resolución de un parámetro (gana la primera coincidencia):
//! 1. Tipo: si la anotación es `Provided(key)` y `key` está registrado, se
//!    invoca su provider (resolviendo a su vez sus dependencias).
//! 2. Nombre: variables de ejecución; si no existe, configuración
//!    (`"{owner}.{name}"`, `config[owner][name]`, `name`).
//! 3. El valor encontrado por nombre sólo cuenta si satisface la anotación.
//! 4. Valor por defecto declarado.
//! 5. Si nada de lo anterior aplica: `PipelineError::Lookup`.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use super::args::{Args, Instance, Resolved};
use super::factory::{DynFactory, FnFactory, Injectable, InjectableFactory, Provider};
use super::param::{Annotation, Param};
use super::stateful::Stateful;
use crate::config::{lookup_scoped, ConfigMap};
use crate::errors::{PipelineError, Result};
use crate::key::TypeKey;
use crate::variables::Variables;

/// Ciclo de vida de un provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Siempre devuelve la misma instancia preconstruida.
    Singleton,
    /// Reconstruye (y re-resuelve sus dependencias) en cada llamada.
    Transient,
}

struct ProviderEntry {
    provider: Provider,
    lifetime: Lifetime,
    factory: Option<Arc<dyn DynFactory>>,
    stateful: Option<Arc<dyn Stateful>>,
}

/// Algo que se puede registrar. Se construye con los métodos asociados y se
/// entrega a `DependencyManager::add`.
pub struct Registration {
    key: Option<TypeKey>,
    kind: RegistrationKind,
}

enum RegistrationKind {
    Factory(Arc<dyn DynFactory>),
    Singleton { instance: Instance, stateful: Option<Arc<dyn Stateful>> },
}

impl Registration {
    pub fn injectable<T: Injectable>() -> Self {
        Self::dynamic(Box::new(InjectableFactory::<T>::new()))
    }

    pub fn factory<K: ?Sized + Send + Sync + 'static>(factory: FnFactory<K>) -> Self {
        Self::dynamic(Box::new(factory))
    }

    /// Factory arbitrario; la clave sale de `supplies()`.
    pub fn dynamic(factory: Box<dyn DynFactory>) -> Self {
        let factory: Arc<dyn DynFactory> = Arc::from(factory);
        Self { key: factory.supplies(),
               kind: RegistrationKind::Factory(factory) }
    }

    pub fn singleton<T: ?Sized + Send + Sync + 'static>(instance: Arc<T>) -> Self {
        Self { key: Some(TypeKey::of::<T>()),
               kind: RegistrationKind::Singleton { instance: Instance::new(instance),
                                                   stateful: None } }
    }

    pub fn stateful<T: Stateful + 'static>(instance: Arc<T>) -> Self {
        let handle: Arc<dyn Stateful> = instance.clone();
        Self { key: Some(TypeKey::of::<T>()),
               kind: RegistrationKind::Singleton { instance: Instance::new(instance),
                                                   stateful: Some(handle) } }
    }

    pub fn key(&self) -> Option<TypeKey> {
        self.key
    }
}

/// Registro de providers + variables + configuración.
pub struct DependencyManager {
    config: ConfigMap,
    variables: Variables,
    providers: IndexMap<TypeKey, ProviderEntry>,
}

impl DependencyManager {
    pub fn new(config: ConfigMap) -> Self {
        Self { config,
               variables: Variables::new(),
               providers: IndexMap::new() }
    }

    // ---------------------------------------------------------------
    // Configuración y variables
    // ---------------------------------------------------------------

    pub fn config(&self) -> &ConfigMap {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigMap {
        &mut self.config
    }

    pub fn set_config(&mut self, config: ConfigMap) {
        self.config = config;
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut Variables {
        &mut self.variables
    }

    /// Reemplaza la bolsa de variables por una vacía.
    pub fn clear_variables(&mut self) {
        self.variables = Variables::new();
    }

    pub fn set_variables(&mut self, variables: Variables) {
        self.variables = variables;
    }

    pub fn update_variables<I, K>(&mut self, entries: I)
        where I: IntoIterator<Item = (K, Value)>,
              K: Into<String>
    {
        self.variables.update(entries);
    }

    // ---------------------------------------------------------------
    // Registro
    // ---------------------------------------------------------------

    /// Registra `T` con sus dependencias declaradas (transient).
    pub fn register<T: Injectable>(&mut self) -> Result<()> {
        self.add(Registration::injectable::<T>(), false)
    }

    pub fn register_factory<K: ?Sized + Send + Sync + 'static>(&mut self, factory: FnFactory<K>) -> Result<()> {
        self.add(Registration::factory(factory), false)
    }

    pub fn register_dyn(&mut self, factory: Box<dyn DynFactory>) -> Result<()> {
        self.add(Registration::dynamic(factory), false)
    }

    pub fn register_singleton<T: ?Sized + Send + Sync + 'static>(&mut self, instance: Arc<T>) -> Result<()> {
        self.add(Registration::singleton(instance), false)
    }

    pub fn register_stateful<T: Stateful + 'static>(&mut self, instance: Arc<T>) -> Result<()> {
        self.add(Registration::stateful(instance), false)
    }

    /// Forma general. Con `allow_override` una clave existente se reemplaza
    /// conservando su posición; sin él, es un conflicto.
    pub fn add(&mut self, registration: Registration, allow_override: bool) -> Result<()> {
        let key = registration.key
                              .ok_or_else(|| PipelineError::Registration("cannot get dependency type from factory".into()))?;

        if !allow_override && self.providers.contains_key(&key) {
            return Err(PipelineError::RegistrationConflict { key: key.name().to_string() });
        }

        let entry = match registration.kind {
            RegistrationKind::Factory(factory) => ProviderEntry { provider: Self::wire(factory.clone()),
                                                                  lifetime: Lifetime::Transient,
                                                                  factory: Some(factory),
                                                                  stateful: None },
            RegistrationKind::Singleton { instance, stateful } => ProviderEntry { provider: Arc::new(move |_: &DependencyManager| -> Result<Instance> { Ok(instance.clone()) }),
                                                                                  lifetime: Lifetime::Singleton,
                                                                                  factory: None,
                                                                                  stateful },
        };

        log::debug!("registered {:?} dependency {}", entry.lifetime, key);
        self.providers.insert(key, entry);
        Ok(())
    }

    /// Construye el provider de un factory: en cada llamada resuelve sus
    /// parámetros con el manager recibido y lo invoca.
    pub fn wire(factory: Arc<dyn DynFactory>) -> Provider {
        let params = factory.dependencies();
        if params.is_empty() {
            return Arc::new(move |_: &DependencyManager| factory.construct(&Args::new()));
        }
        Arc::new(move |dm: &DependencyManager| -> Result<Instance> {
            let owner = factory.owner();
            let args = dm.prepare_injection(&params, owner.as_deref(), Some("construct"))?;
            factory.construct(&args)
        })
    }

    pub fn contains_key(&self, key: TypeKey) -> bool {
        self.providers.contains_key(&key)
    }

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.contains_key(TypeKey::of::<T>())
    }

    /// `true` si `name` existe como variable o como clave de configuración.
    pub fn contains_name(&self, name: &str) -> bool {
        self.variables.contains(name) || self.config.contains_key(name)
    }

    pub fn lifetime(&self, key: TypeKey) -> Option<Lifetime> {
        self.providers.get(&key).map(|e| e.lifetime)
    }

    /// Claves registradas en orden de registro.
    pub fn keys(&self) -> impl Iterator<Item = &TypeKey> {
        self.providers.keys()
    }

    /// Singletons con capacidad `Stateful`, en orden de registro.
    pub fn stateful_singletons(&self) -> Vec<(TypeKey, Arc<dyn Stateful>)> {
        self.providers
            .iter()
            .filter_map(|(key, entry)| entry.stateful.clone().map(|s| (*key, s)))
            .collect()
    }

    // ---------------------------------------------------------------
    // Resolución
    // ---------------------------------------------------------------

    /// Resuelve una instancia por tipo.
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let key = TypeKey::of::<T>();
        let instance = self.resolve_key(key)?
                           .ok_or_else(|| PipelineError::lookup(key.name()))?;
        instance.downcast::<T>().ok_or_else(|| PipelineError::TypeMismatch { name: key.name().to_string(),
                                                                            expected: key.name().to_string(),
                                                                            found: instance.key().name().to_string() })
    }

    /// Invoca el provider de `key` si existe.
    pub fn resolve_key(&self, key: TypeKey) -> Result<Option<Instance>> {
        match self.providers.get(&key) {
            Some(entry) => (entry.provider)(self).map(Some),
            None => Ok(None),
        }
    }

    /// Resuelve un parámetro siguiendo el orden de precedencia del módulo.
    pub fn resolve_param(&self, param: &Param, owner: Option<&str>, method: Option<&str>) -> Result<Resolved> {
        if let Annotation::Provided(key) = param.annotation {
            if let Some(instance) = self.resolve_key(key)? {
                return Ok(Resolved::Instance(instance));
            }
        }

        if let Some(value) = self.lookup_by_name(&param.name, owner) {
            if param.annotation.accepts(value) {
                return Ok(Resolved::Value(value.clone()));
            }
        }

        if let Some(default) = &param.default {
            return Ok(Resolved::Value(default.clone()));
        }

        Err(PipelineError::lookup(qualified_name(&param.name, owner, method)))
    }

    /// Resuelve todos los parámetros declarados.
    pub fn prepare_injection(&self, params: &[Param], owner: Option<&str>, method: Option<&str>) -> Result<Args> {
        let mut args = Args::new();
        for param in params {
            args.insert(param.name.clone(), self.resolve_param(param, owner, method)?);
        }
        Ok(args)
    }

    /// Variables primero; si el nombre no existe allí, configuración. Un
    /// valor en variables oculta al de configuración aunque luego no
    /// satisfaga la anotación.
    fn lookup_by_name(&self, name: &str, owner: Option<&str>) -> Option<&Value> {
        match self.variables.get_opt(name) {
            Some(v) => Some(v),
            None => lookup_scoped(&self.config, name, owner),
        }
    }

    /// Misma resolución sin instanciar nada (ni defaults).
    pub fn can_resolve(&self, param: &Param, owner: Option<&str>) -> bool {
        if let Some(key) = param.annotation.key() {
            if self.providers.contains_key(&key) {
                return true;
            }
        }
        self.lookup_by_name(&param.name, owner)
            .map(|v| param.annotation.accepts(v))
            .unwrap_or(false)
    }

    /// Comprueba que cada parámetro sin default se podría resolver.
    pub fn throw_if_uninjectable(&self, params: &[Param], owner: Option<&str>, method: &str) -> Result<()> {
        for param in params.iter().filter(|p| !p.has_default()) {
            if !self.can_resolve(param, owner) {
                return Err(PipelineError::lookup(qualified_name(&param.name, owner, Some(method))));
            }
        }
        Ok(())
    }

    /// Valida las dependencias de todos los factories transient registrados.
    /// Devuelve los problemas encontrados en lugar de fallar.
    pub fn validate_dependencies(&self) -> Vec<PipelineError> {
        self.providers
            .values()
            .filter_map(|entry| entry.factory.as_ref())
            .filter_map(|factory| {
                let owner = factory.owner();
                self.throw_if_uninjectable(&factory.dependencies(), owner.as_deref(), "construct")
                    .err()
            })
            .collect()
    }
}

impl Default for DependencyManager {
    fn default() -> Self {
        Self::new(ConfigMap::new())
    }
}

impl std::fmt::Debug for DependencyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyManager")
         .field("providers", &self.providers.keys().collect::<Vec<_>>())
         .field("variables", &self.variables)
         .field("config", &self.config)
         .finish()
    }
}

fn qualified_name(name: &str, owner: Option<&str>, method: Option<&str>) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(3);
    parts.extend(owner);
    parts.extend(method);
    parts.push(name);
    parts.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ValueKind;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cfg(v: Value) -> ConfigMap {
        v.as_object().cloned().unwrap_or_default()
    }

    #[derive(Debug)]
    struct Service {
        value: String,
    }

    impl Injectable for Service {
        fn dependencies() -> Vec<Param> {
            vec![Param::of::<String>("value")]
        }

        fn construct(args: &Args) -> Result<Self> {
            Ok(Self { value: args.value("value")? })
        }
    }

    #[test]
    fn duplicate_registration_conflicts_unless_overridden() {
        let mut dm = DependencyManager::default();
        dm.register::<Service>().unwrap();
        let err = dm.register::<Service>().unwrap_err();
        assert!(matches!(err, PipelineError::RegistrationConflict { .. }));
        assert!(dm.add(Registration::injectable::<Service>(), true).is_ok());
    }

    #[test]
    fn override_replaces_provider_in_place() {
        let mut dm = DependencyManager::default();
        dm.register_singleton(Arc::new(1u8)).unwrap();
        dm.register_singleton(Arc::new(Service { value: "old".into() })).unwrap();
        dm.add(Registration::singleton(Arc::new(Service { value: "new".into() })), true).unwrap();

        assert_eq!(dm.resolve::<Service>().unwrap().value, "new");
        let keys: Vec<TypeKey> = dm.keys().copied().collect();
        assert_eq!(keys, vec![TypeKey::of::<u8>(), TypeKey::of::<Service>()]);
    }

    #[test]
    fn factory_without_key_is_rejected() {
        struct Anonymous;
        impl DynFactory for Anonymous {
            fn supplies(&self) -> Option<TypeKey> {
                None
            }
            fn dependencies(&self) -> Vec<Param> {
                vec![]
            }
            fn construct(&self, _args: &Args) -> Result<Instance> {
                Ok(Instance::new(Arc::new(())))
            }
        }
        let mut dm = DependencyManager::default();
        assert!(matches!(dm.register_dyn(Box::new(Anonymous)), Err(PipelineError::Registration(_))));
    }

    #[test]
    fn transient_rebuilds_and_rewires_each_call() {
        static BUILDS: AtomicUsize = AtomicUsize::new(0);
        let mut dm = DependencyManager::new(cfg(json!({"value": "ok"})));
        dm.register_factory(FnFactory::<Service>::from_fn(vec![Param::of::<String>("value")], |args| {
              BUILDS.fetch_add(1, Ordering::SeqCst);
              Ok(Service { value: args.value("value")? })
          }))
          .unwrap();

        let a = dm.resolve::<Service>().unwrap();
        dm.variables_mut().set("value", json!("changed"));
        let b = dm.resolve::<Service>().unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.value, "ok");
        assert_eq!(b.value, "changed");
        assert_eq!(BUILDS.load(Ordering::SeqCst), 2);
        assert_eq!(dm.lifetime(TypeKey::of::<Service>()), Some(Lifetime::Transient));
    }

    #[test]
    fn singleton_returns_same_reference() {
        let mut dm = DependencyManager::default();
        let svc = Arc::new(Service { value: "s".into() });
        dm.register_singleton(svc.clone()).unwrap();
        let a = dm.resolve::<Service>().unwrap();
        let b = dm.resolve::<Service>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &svc));
    }

    #[test]
    fn provider_beats_variables_and_config() {
        let mut dm = DependencyManager::new(cfg(json!({"foo": "from-config"})));
        let untyped = Param::untyped("foo");
        let value = |r: Resolved| match r {
            Resolved::Value(v) => v,
            Resolved::Instance(_) => Value::Null,
        };

        assert_eq!(value(dm.resolve_param(&untyped, None, None).unwrap()), json!("from-config"));
        dm.variables_mut().set("foo", json!("from-context"));
        assert_eq!(value(dm.resolve_param(&untyped, None, None).unwrap()), json!("from-context"));

        dm.register_singleton(Arc::new(Service { value: "ok".into() })).unwrap();
        let typed = Param::provided::<Service>("foo");
        assert!(matches!(dm.resolve_param(&typed, None, None).unwrap(), Resolved::Instance(_)));
    }

    #[test]
    fn variable_with_wrong_type_does_not_fall_back_to_config() {
        let mut dm = DependencyManager::new(cfg(json!({"foo": "text"})));
        dm.variables_mut().set("foo", json!(123));
        let err = dm.resolve_param(&Param::of::<String>("foo"), None, None).unwrap_err();
        assert_eq!(err, PipelineError::lookup("foo"));
    }

    #[test]
    fn config_key_precedence_with_owner() {
        let dm = DependencyManager::new(cfg(json!({"Foo.bar": 1, "bar": 2, "Foo": {"bar": 3}})));
        let p = Param::of::<i64>("bar");
        let with_owner = dm.prepare_injection(std::slice::from_ref(&p), Some("Foo"), None).unwrap();
        let bare = dm.prepare_injection(std::slice::from_ref(&p), None, None).unwrap();
        assert_eq!(with_owner.value::<i64>("bar").unwrap(), 1);
        assert_eq!(bare.value::<i64>("bar").unwrap(), 2);
    }

    #[test]
    fn defaults_and_lookup_errors() {
        let dm = DependencyManager::default();
        let with_default = Param::of::<String>("foo").with_default("bar");
        let args = dm.prepare_injection(&[with_default], None, None).unwrap();
        assert_eq!(args.value::<String>("foo").unwrap(), "bar");

        let err = dm.prepare_injection(&[Param::untyped("foo")], Some("Step"), Some("run")).unwrap_err();
        assert_eq!(err.to_string(), "Cannot resolve dependency for parameter \"Step.run.foo\"");
    }

    #[test]
    fn null_values_count_as_missing() {
        let mut dm = DependencyManager::default();
        dm.variables_mut().set("foo", Value::Null);
        assert!(dm.resolve_param(&Param::value("foo", ValueKind::Any), None, None).is_err());
    }

    #[test]
    fn nested_dependencies_are_wired() {
        struct Wrapper {
            svc: Arc<Service>,
        }
        impl Injectable for Wrapper {
            fn dependencies() -> Vec<Param> {
                vec![Param::provided::<Service>("svc")]
            }
            fn construct(args: &Args) -> Result<Self> {
                Ok(Self { svc: args.get("svc")? })
            }
        }

        let mut dm = DependencyManager::default();
        dm.register::<Wrapper>().unwrap();
        dm.register_factory(FnFactory::<Service>::from_fn(vec![], |_| Ok(Service { value: "ok".into() })))
          .unwrap();
        assert_eq!(dm.resolve::<Wrapper>().unwrap().svc.value, "ok");
    }

    #[test]
    fn injectable_params_are_scoped_by_type_name() {
        let mut dm = DependencyManager::new(cfg(json!({"value": "bare", "Service": {"value": "scoped"}})));
        dm.register::<Service>().unwrap();
        assert_eq!(dm.resolve::<Service>().unwrap().value, "scoped");
    }

    #[test]
    fn probe_reports_without_failing() {
        let mut dm = DependencyManager::default();
        dm.register::<Service>().unwrap();
        let problems = dm.validate_dependencies();
        assert_eq!(problems, vec![PipelineError::lookup("Service.construct.value")]);

        dm.config_mut().insert("value".into(), json!("now bound"));
        assert!(dm.validate_dependencies().is_empty());
    }
}
