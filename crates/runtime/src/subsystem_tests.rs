use super::*;
use rt_core::collaborators::fake::{FakeEvalError, FakeEvaluator, FakeHost};
use rt_dynload::fake::FakeDlShim;
use std::io::Cursor;
use std::sync::Mutex as StdMutex;
use tempfile::tempdir;

/// Wires the fake evaluator's scripted `provide`/`require` lines straight
/// into a `LoadSubsystem`'s own registry, so `load()`ing a file that says
/// `provide foo` is observable through `subsystem.provided(...)`.
struct HostBridge {
    subsystem: StdMutex<Option<Arc<LoadSubsystem<FakeEvaluator<HostBridge>, FakeDlShim>>>>,
}

impl HostBridge {
    fn new() -> Arc<Self> {
        Arc::new(Self { subsystem: StdMutex::new(None) })
    }

    fn attach(&self, subsystem: Arc<LoadSubsystem<FakeEvaluator<HostBridge>, FakeDlShim>>) {
        *self.subsystem.lock().unwrap() = Some(subsystem);
    }

    fn subsystem(&self) -> Arc<LoadSubsystem<FakeEvaluator<HostBridge>, FakeDlShim>> {
        self.subsystem.lock().unwrap().clone().unwrap()
    }
}

impl FakeHost for HostBridge {
    fn require(&self, feature: &str) -> Result<(), FakeEvalError> {
        self.subsystem()
            .require(&feature.into(), LoadFlags::default().propagate_error(true))
            .map(|_| ())
            .map_err(|e| FakeEvalError(e.to_string()))
    }

    fn provide(&self, feature: &str) {
        self.subsystem().provide(&feature.into())
    }
}

fn build() -> Arc<LoadSubsystem<FakeEvaluator<HostBridge>, FakeDlShim>> {
    let host = HostBridge::new();
    let subsystem = Arc::new(LoadSubsystem::initialize(Init {
        evaluator: FakeEvaluator::new(host.clone()),
        dlshim: FakeDlShim::new(),
        source_suffixes: vec![".scm".to_string()],
        dso_suffixes: vec![".so".to_string()],
        built_in_provided: vec!["core".into()],
    }));
    host.attach(subsystem.clone());
    subsystem
}

#[test]
fn built_in_provided_set_is_seeded_at_initialization() {
    let subsystem = build();
    assert!(subsystem.provided(&"core".into()));
    assert!(!subsystem.provided(&"extra".into()));
}

#[test]
fn load_resolves_through_the_configured_search_path_and_suffix() {
    let subsystem = build();
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("greet.scm"), "define hello world\n").unwrap();
    subsystem.add_load_path(dir.path().display().to_string(), false);

    let module = subsystem.evaluator().current_module();
    let value = subsystem.load("greet", LoadFlags::default().propagate_error(true), &module).unwrap();
    assert!(matches!(value, LoadOutcome::Value(Some(ref v)) if v == "define hello world"));
}

#[test]
fn load_without_propagate_error_packs_a_missing_file_as_not_found() {
    let subsystem = build();
    let module = subsystem.evaluator().current_module();

    let outcome = subsystem.load("does-not-exist", LoadFlags::default(), &module).unwrap();
    match outcome {
        LoadOutcome::Packet(LoadResult { loaded: false, error: None, .. }) => {}
        other => panic!("expected a not-found packet, got {other:?}"),
    }
}

#[test]
fn load_without_propagate_error_packs_an_eval_failure_instead_of_discarding_it() {
    let subsystem = build();
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("bad.scm"), "fail boom\n").unwrap();
    subsystem.add_load_path(dir.path().display().to_string(), false);

    let module = subsystem.evaluator().current_module();
    let outcome = subsystem.load("bad", LoadFlags::default(), &module).unwrap();
    match outcome {
        LoadOutcome::Packet(LoadResult { loaded: false, error: Some(LoadError::LoadAbort { .. }), .. }) => {}
        other => panic!("expected a failed packet carrying the load-abort error, got {other:?}"),
    }
}

#[test]
fn load_from_port_evaluates_a_stream_directly() {
    let subsystem = build();
    let stream = Arc::new(Mutex::new(Cursor::new(b"provide from-port\n".to_vec())));
    let module = subsystem.evaluator().current_module();

    subsystem.load_from_port(&stream, "<test>", &module).unwrap();
    assert!(subsystem.provided(&"from-port".into()));
}

#[test]
fn require_loads_a_feature_file_exactly_once() {
    let subsystem = build();
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("thing.scm"), "provide thing\n").unwrap();
    subsystem.add_load_path(dir.path().display().to_string(), false);

    let flags = LoadFlags::default().propagate_error(true);
    let first = subsystem.require(&"thing".into(), flags).unwrap();
    let second = subsystem.require(&"thing".into(), flags).unwrap();
    assert!(matches!(first, LoadOutcome::Value(RequireOutcome::JustLoaded)));
    assert!(matches!(second, LoadOutcome::Value(RequireOutcome::Already)));
}

#[test]
fn require_via_evaluated_require_statement_round_trips_through_the_registry() {
    let subsystem = build();
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("base.scm"), "provide base\n").unwrap();
    std::fs::write(dir.path().join("top.scm"), "require base\nprovide top\n").unwrap();
    subsystem.add_load_path(dir.path().display().to_string(), false);

    subsystem.require(&"top".into(), LoadFlags::default().propagate_error(true)).unwrap();
    assert!(subsystem.provided(&"base".into()));
    assert!(subsystem.provided(&"top".into()));
}

#[test]
fn require_without_propagate_error_packs_a_cycle_instead_of_raising() {
    let subsystem = build();
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("a.scm"), "require b\n").unwrap();
    std::fs::write(dir.path().join("b.scm"), "require a\n").unwrap();
    subsystem.add_load_path(dir.path().display().to_string(), false);

    let outcome = subsystem.require(&"a".into(), LoadFlags::default()).unwrap();
    match outcome {
        LoadOutcome::Packet(LoadResult { loaded: false, error: Some(LoadError::RequireCycle { .. }), .. }) => {}
        other => panic!("expected a failed packet carrying the require-cycle error, got {other:?}"),
    }
}

#[test]
fn dynamic_load_resolves_through_the_dynload_path_then_errors_on_a_missing_initializer() {
    let subsystem = build();
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("ext.so"), b"fake").unwrap();
    subsystem.add_load_path(dir.path().display().to_string(), false);

    // No symbol installed in the fake shim's library table, so resolution
    // succeeds but the initializer lookup fails — proves the dynload path
    // was searched and the file found before the shim ever runs.
    let err = subsystem.dynamic_load("ext", None).unwrap_err();
    assert!(matches!(err, LoadError::InitSymbolMissing { .. }));
}

#[test]
fn dynamic_load_reports_a_missing_file_through_the_dynload_search_path() {
    let subsystem = build();
    let err = subsystem.dynamic_load("does-not-exist", None).unwrap_err();
    assert!(matches!(err, LoadError::FileNotFound { .. }));
}

#[test]
fn add_load_path_falls_back_to_the_directory_itself_when_no_arch_subdir_exists() {
    let subsystem = build();
    let dir = tempdir().unwrap();
    subsystem.add_load_path(dir.path().display().to_string(), false);
    // No panic, no arch subdirectory required: the dynload path simply
    // gets the bare directory appended/prepended.
    assert!(!subsystem.load_paths.is_empty());
}
