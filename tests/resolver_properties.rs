use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lepel_rust::injection::{Registration, Resolved};
use lepel_rust::prelude::*;
use lepel_rust::{ConfigMap, FnFactory, TypeKey};
use serde_json::{json, Value};

fn config(v: Value) -> ConfigMap {
    v.as_object().cloned().unwrap_or_default()
}

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

struct English;

impl Greeter for English {
    fn greet(&self) -> String {
        "hello".into()
    }
}

struct Container<T>(T);

#[test]
fn singleton_resolves_to_the_same_instance() {
    let mut deps = DependencyManager::default();
    deps.register_singleton(Arc::new(Container(1i64))).expect("register");
    let a = deps.resolve::<Container<i64>>().expect("resolve");
    let b = deps.resolve::<Container<i64>>().expect("resolve");
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn transient_builds_a_new_instance_each_call() {
    static BUILT: AtomicUsize = AtomicUsize::new(0);
    let mut deps = DependencyManager::default();
    deps.register_factory(FnFactory::<Container<f64>>::from_fn(vec![], |_| {
            BUILT.fetch_add(1, Ordering::SeqCst);
            Ok(Container(0.5))
        }))
        .expect("register");

    let a = deps.resolve::<Container<f64>>().expect("resolve");
    let b = deps.resolve::<Container<f64>>().expect("resolve");
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(BUILT.load(Ordering::SeqCst), 2);
}

#[test]
fn generic_instantiations_do_not_collide() {
    let mut deps = DependencyManager::default();
    deps.register_singleton(Arc::new(Container(1i64))).expect("int");
    deps.register_singleton(Arc::new(Container(0.0f64))).expect("float");
    assert_eq!(deps.resolve::<Container<i64>>().expect("int").0, 1);
    assert_eq!(deps.resolve::<Container<f64>>().expect("float").0, 0.0);
    assert_ne!(TypeKey::of::<Container<i64>>(), TypeKey::of::<Container<f64>>());
}

#[test]
fn trait_object_alias_serves_implementations() {
    let mut deps = DependencyManager::default();
    let english: Arc<dyn Greeter> = Arc::new(English);
    deps.register_singleton(english).expect("register");

    let args = deps.prepare_injection(&[Param::provided::<dyn Greeter>("greeter")], None, None)
                   .expect("inject");
    assert_eq!(args.get::<dyn Greeter>("greeter").expect("greeter").greet(), "hello");
}

#[test]
fn provider_then_variables_then_config() {
    let mut deps = DependencyManager::new(config(json!({"greeter": "from config"})));
    deps.variables_mut().set("greeter", "from variables");
    deps.register_singleton::<dyn Greeter>(Arc::new(English)).expect("register");

    let typed = Param::provided::<dyn Greeter>("greeter");
    assert!(matches!(deps.resolve_param(&typed, None, None), Ok(Resolved::Instance(_))));

    let untyped = Param::untyped("greeter");
    let value = deps.prepare_injection(&[untyped.clone()], None, None).expect("inject");
    assert_eq!(value.value::<String>("greeter").expect("value"), "from variables");

    deps.variables_mut().remove("greeter").expect("remove");
    let value = deps.prepare_injection(&[untyped], None, None).expect("inject");
    assert_eq!(value.value::<String>("greeter").expect("value"), "from config");
}

#[test]
fn flat_owner_key_wins_over_nested_and_bare() {
    let deps = DependencyManager::new(config(json!({"Foo.bar": 1, "bar": 2, "Foo": {"bar": 3}})));
    let bar = Param::of::<i64>("bar");
    let owned = deps.prepare_injection(std::slice::from_ref(&bar), Some("Foo"), None).expect("owned");
    let bare = deps.prepare_injection(std::slice::from_ref(&bar), None, None).expect("bare");
    assert_eq!(owned.value::<i64>("bar").expect("bar"), 1);
    assert_eq!(bare.value::<i64>("bar").expect("bar"), 2);
}

#[test]
fn unmet_parameter_names_itself() {
    let deps = DependencyManager::default();
    let err = deps.prepare_injection(&[Param::of::<String>("missing")], Some("Step"), Some("run"))
                  .unwrap_err();
    assert_eq!(err.to_string(), "Cannot resolve dependency for parameter \"Step.run.missing\"");
}

#[test]
fn override_flag_replaces_provider() {
    let mut deps = DependencyManager::default();
    deps.register_singleton(Arc::new(Container("old"))).expect("first");
    assert!(matches!(deps.register_singleton(Arc::new(Container("dup"))),
                     Err(PipelineError::RegistrationConflict { .. })));

    deps.add(Registration::singleton(Arc::new(Container("new"))), true)
        .expect("override");
    assert_eq!(deps.resolve::<Container<&'static str>>().expect("resolve").0, "new");
}
