use super::*;
use rt_core::collaborators::fake::{FakeEvalError, FakeEvaluator, FakeHost};
use rt_core::FeatureName;
use std::sync::Arc;

struct NullHost;
impl FakeHost for NullHost {
    fn require(&self, _feature: &str) -> Result<(), FakeEvalError> {
        Ok(())
    }
    fn provide(&self, _feature: &str) {}
}

fn evaluator() -> FakeEvaluator<NullHost> {
    FakeEvaluator::new(Arc::new(NullHost))
}

#[test]
fn resolves_by_binding_the_symbol_after_a_successful_load() {
    let record = AutoloadRecord::new("make-list", "user".to_string(), FeatureName::new("srfi-1"), None);
    let registry = FeatureRegistry::new();
    let eval = evaluator();
    eval.bind(&"user".to_string(), "make-list", "#<procedure make-list>".to_string());

    let result = resolve_autoload(&record, &registry, &eval, || Ok(())).unwrap();
    assert_eq!(result, Binding::Value("#<procedure make-list>".to_string()));
    assert!(record.is_loaded());
}

#[test]
fn second_resolve_reuses_the_cached_value_without_reloading() {
    let record = AutoloadRecord::new("make-list", "user".to_string(), FeatureName::new("srfi-1"), None);
    let registry = FeatureRegistry::new();
    let eval = evaluator();
    eval.bind(&"user".to_string(), "make-list", "v1".to_string());

    resolve_autoload(&record, &registry, &eval, || Ok(())).unwrap();
    let result = resolve_autoload(&record, &registry, &eval, || panic!("must not reload")).unwrap();
    assert_eq!(result, Binding::Value("v1".to_string()));
}

#[test]
fn missing_binding_after_load_is_an_error() {
    let record = AutoloadRecord::new("never-defined", "user".to_string(), FeatureName::new("srfi-1"), None);
    let registry = FeatureRegistry::new();
    let eval = evaluator();

    let err = resolve_autoload(&record, &registry, &eval, || Ok(())).unwrap_err();
    assert!(matches!(err, LoadError::AutoloadUndefined { .. }));
    assert!(!record.is_loaded());
}

#[test]
fn load_failure_releases_the_locker_so_a_retry_can_proceed() {
    let record = AutoloadRecord::new("make-list", "user".to_string(), FeatureName::new("srfi-1"), None);
    let registry = FeatureRegistry::new();
    let eval = evaluator();

    let err = resolve_autoload(&record, &registry, &eval, || {
        Err(LoadError::BadArgument("boom".into()))
    })
    .unwrap_err();
    assert!(matches!(err, LoadError::BadArgument(_)));

    eval.bind(&"user".to_string(), "make-list", "v2".to_string());
    let result = resolve_autoload(&record, &registry, &eval, || Ok(())).unwrap();
    assert_eq!(result, Binding::Value("v2".to_string()));
}

#[test]
fn benign_recursion_during_the_targets_own_load_returns_unbound() {
    let record = AutoloadRecord::new("define-method", "user".to_string(), FeatureName::new("oo"), None);
    let registry = FeatureRegistry::new();
    let eval = evaluator();

    // Simulate this thread already being mid-`require` of the record's own
    // target (e.g. "oo.scm" probing whether `define-method` exists while
    // defining it): the registry's `providing` map lists the target.
    let target = FeatureName::new("oo");
    let outcome = registry.require(&target, || {
        let result = resolve_autoload(&record, &registry, &eval, || panic!("must not be driven"));
        assert_eq!(result.unwrap(), Binding::Unbound);
        Ok(())
    });
    assert!(outcome.is_ok());
}

#[test]
fn import_from_copies_the_value_into_the_target_module() {
    let record = AutoloadRecord::new(
        "fold",
        "user".to_string(),
        FeatureName::new("srfi-1"),
        Some("srfi-1-impl".to_string()),
    );
    let registry = FeatureRegistry::new();
    let eval = evaluator();
    eval.bind(&"srfi-1-impl".to_string(), "fold", "#<procedure fold>".to_string());

    let result = resolve_autoload(&record, &registry, &eval, || Ok(())).unwrap();
    assert_eq!(result, Binding::Value("#<procedure fold>".to_string()));
    assert_eq!(eval.lookup(&"user".to_string(), "fold").into_value(), Some("#<procedure fold>".to_string()));
}
