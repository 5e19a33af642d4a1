// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! Trait seams for the components this subsystem treats as external
//! collaborators: the expression reader, the evaluator, and the module
//! system (spec.md §1, "Out of scope").
//!
//! The reader and evaluator are fused into one [`Evaluator`] trait because
//! the Load Session only ever calls through the combined seam (spec.md
//! §4.2's read-one/eval-one loop), and a host embedding this crate owns
//! both halves together: a narrow interface plus an in-memory fake for
//! tests, threaded through as a generic type parameter.

use std::fmt;
use std::io::BufRead;

/// Minimal stream abstraction the reader reads from.
pub trait ReadExpr: BufRead + Send {}
impl<T: BufRead + Send> ReadExpr for T {}

/// Result of looking up a name in a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding<V> {
    /// No binding by this name.
    Unbound,
    /// Bound, but still an unforced autoload thunk rather than a concrete
    /// value.
    StillAutoload,
    /// Bound to a concrete value.
    Value(V),
}

impl<V> Binding<V> {
    pub fn is_unbound(&self) -> bool {
        matches!(self, Binding::Unbound)
    }

    pub fn into_value(self) -> Option<V> {
        match self {
            Binding::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// External reader+evaluator collaborator driven by the Load Session and
/// the Feature/Autoload registries.
pub trait Evaluator: Send + Sync {
    /// Opaque module/namespace handle.
    type Module: Clone + Send + Sync + fmt::Debug;
    /// Opaque evaluation result.
    type Value: Clone + Send;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read one expression from `source` and evaluate it in `module`.
    ///
    /// Returns `Ok(None)` at end of stream. `case_fold` mirrors spec.md
    /// §4.2's "case-folding if globally enabled".
    fn read_and_eval(
        &self,
        source: &mut dyn ReadExpr,
        module: &Self::Module,
        case_fold: bool,
    ) -> Result<Option<Self::Value>, Self::Error>;

    /// The module in effect when no explicit module is given.
    fn current_module(&self) -> Self::Module;

    /// Resolve a module by name (used by autoload's `import-from`).
    fn find_module(&self, name: &str) -> Option<Self::Module>;

    /// Look up `name` in `module`.
    fn lookup(&self, module: &Self::Module, name: &str) -> Binding<Self::Value>;

    /// Bind `name` to `value` in `module` (used to publish an autoload's
    /// resolved value, or to copy an `import-from` binding across modules).
    fn bind(&self, module: &Self::Module, name: &str, value: Self::Value);
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    //! An in-memory [`Evaluator`] fake: deterministic, no real parsing,
    //! enough behavior to exercise the loading subsystem's concurrency and
    //! error paths.

    use super::{Binding, Evaluator, ReadExpr};
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::io::Read;
    use std::sync::Arc;
    use std::time::Duration;

    /// A "expression" in the fake reader is just a line of text, and
    /// "evaluating" it runs a tiny scripted instruction set understood by
    /// [`FakeEvaluator`]: `provide <feature>`, `require <feature>`,
    /// `sleep <millis>`, `define <name> <value>`, or anything else is
    /// treated as a no-op that evaluates to the line itself.
    #[derive(Debug, Clone, thiserror::Error)]
    #[error("fake evaluator error: {0}")]
    pub struct FakeEvalError(pub String);

    /// A hook the fake evaluator calls for `require`/`provide` lines, so
    /// tests can wire the fake straight into a real `FeatureRegistry`
    /// without this crate depending on the `rt-registry` crate.
    pub trait FakeHost: Send + Sync {
        fn require(&self, feature: &str) -> Result<(), FakeEvalError>;
        fn provide(&self, feature: &str);
    }

    #[derive(Default)]
    struct ModuleEnv {
        bindings: HashMap<String, Binding<String>>,
    }

    /// A deterministic, in-memory evaluator used throughout this
    /// workspace's tests.
    pub struct FakeEvaluator<H: FakeHost> {
        host: Arc<H>,
        modules: Mutex<HashMap<String, Arc<Mutex<ModuleEnv>>>>,
    }

    impl<H: FakeHost> FakeEvaluator<H> {
        pub fn new(host: Arc<H>) -> Self {
            let mut modules = HashMap::new();
            modules.insert("user".to_string(), Arc::new(Mutex::new(ModuleEnv::default())));
            Self { host, modules: Mutex::new(modules) }
        }

        fn module_env(&self, name: &str) -> Arc<Mutex<ModuleEnv>> {
            self.modules
                .lock()
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(ModuleEnv::default())))
                .clone()
        }
    }

    impl<H: FakeHost> Evaluator for FakeEvaluator<H> {
        type Module = String;
        type Value = String;
        type Error = FakeEvalError;

        fn read_and_eval(
            &self,
            source: &mut dyn ReadExpr,
            module: &Self::Module,
            _case_fold: bool,
        ) -> Result<Option<Self::Value>, Self::Error> {
            let mut line = String::new();
            let n = source
                .read_to_string(&mut line)
                .map_err(|e| FakeEvalError(e.to_string()))?;
            if n == 0 {
                return Ok(None);
            }
            let mut last = None;
            for stmt in line.lines().filter(|l| !l.trim().is_empty()) {
                last = Some(self.eval_one(stmt.trim(), module)?);
            }
            Ok(last)
        }

        fn current_module(&self) -> Self::Module {
            "user".to_string()
        }

        fn find_module(&self, name: &str) -> Option<Self::Module> {
            self.modules.lock().contains_key(name).then(|| name.to_string())
        }

        fn lookup(&self, module: &Self::Module, name: &str) -> Binding<Self::Value> {
            let env = self.module_env(module);
            let env = env.lock();
            env.bindings.get(name).cloned().unwrap_or(Binding::Unbound)
        }

        fn bind(&self, module: &Self::Module, name: &str, value: Self::Value) {
            let env = self.module_env(module);
            env.lock().bindings.insert(name.to_string(), Binding::Value(value));
        }
    }

    impl<H: FakeHost> FakeEvaluator<H> {
        fn eval_one(&self, stmt: &str, module: &str) -> Result<String, FakeEvalError> {
            let mut parts = stmt.splitn(2, ' ');
            let head = parts.next().unwrap_or_default();
            let rest = parts.next().unwrap_or_default().trim();
            match head {
                "provide" => {
                    self.host.provide(rest);
                    Ok(stmt.to_string())
                }
                "require" => {
                    self.host.require(rest)?;
                    Ok(stmt.to_string())
                }
                "sleep" => {
                    let ms: u64 = rest.parse().unwrap_or(0);
                    std::thread::sleep(Duration::from_millis(ms));
                    Ok(stmt.to_string())
                }
                "define" => {
                    let mut bits = rest.splitn(2, ' ');
                    let name = bits.next().unwrap_or_default();
                    let value = bits.next().unwrap_or_default();
                    self.bind(&module.to_string(), name, value.to_string());
                    Ok(stmt.to_string())
                }
                "fail" => Err(FakeEvalError(rest.to_string())),
                _ => Ok(stmt.to_string()),
            }
        }
    }
}
