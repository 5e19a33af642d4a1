// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! A stand-in reader/evaluator for exercising the subsystem from a shell.
//!
//! The real reader and evaluator are out of scope for this workspace (they
//! belong to the embedding language runtime); this one understands the same
//! tiny scripted instruction set as the in-workspace test fakes
//! (`provide <feature>`, `require <feature>`) so `rt-load` can demonstrate
//! `load`/`require`/`dynamic-load` against plain text files without pulling
//! in a full parser.

use parking_lot::Mutex;
use rt_core::collaborators::{Binding, Evaluator, ReadExpr};
use rt_runtime::LoadSubsystem;
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("line evaluation failed: {0}")]
pub struct LineEvalError(pub String);

#[derive(Default)]
struct ModuleEnv {
    bindings: HashMap<String, Binding<String>>,
}

/// Routes `provide`/`require` lines straight into the [`LoadSubsystem`] that
/// owns this evaluator. Set once via [`LineEvaluator::attach`], since the
/// subsystem and its evaluator are mutually referential at construction
/// time.
pub struct LineEvaluator {
    subsystem: Mutex<Option<Arc<LoadSubsystem<LineEvaluator>>>>,
    modules: Mutex<HashMap<String, ModuleEnv>>,
}

impl LineEvaluator {
    pub fn new() -> Self {
        let mut modules = HashMap::new();
        modules.insert("user".to_string(), ModuleEnv::default());
        Self { subsystem: Mutex::new(None), modules: Mutex::new(modules) }
    }

    pub fn attach(&self, subsystem: Arc<LoadSubsystem<LineEvaluator>>) {
        *self.subsystem.lock() = Some(subsystem);
    }

    /// `main` always calls [`Self::attach`] immediately after constructing
    /// both halves, before any read/eval can run — if this ever sees `None`
    /// that ordering was broken, not something a caller can recover from.
    fn subsystem(&self) -> Arc<LoadSubsystem<LineEvaluator>> {
        match self.subsystem.lock().clone() {
            Some(subsystem) => subsystem,
            None => unreachable!("evaluator used before attach()"),
        }
    }

    fn eval_one(&self, stmt: &str, module: &str) -> Result<String, LineEvalError> {
        let mut parts = stmt.splitn(2, ' ');
        let head = parts.next().unwrap_or_default();
        let rest = parts.next().unwrap_or_default().trim();
        match head {
            "provide" => {
                self.subsystem().provide(&rest.into());
                tracing::info!(feature = rest, "provided");
                Ok(stmt.to_string())
            }
            "require" => {
                self.subsystem()
                    .require(&rest.into(), rt_core::LoadFlags::default().propagate_error(true))
                    .map_err(|e| LineEvalError(e.to_string()))?;
                Ok(stmt.to_string())
            }
            "dynamic-load" => {
                self.subsystem().dynamic_load(rest, None).map_err(|e| LineEvalError(e.to_string()))?;
                Ok(stmt.to_string())
            }
            "define" => {
                let mut bits = rest.splitn(2, ' ');
                let name = bits.next().unwrap_or_default();
                let value = bits.next().unwrap_or_default();
                self.bind(&module.to_string(), name, value.to_string());
                Ok(stmt.to_string())
            }
            _ => Ok(stmt.to_string()),
        }
    }
}

impl Default for LineEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for LineEvaluator {
    type Module = String;
    type Value = String;
    type Error = LineEvalError;

    fn read_and_eval(
        &self,
        source: &mut dyn ReadExpr,
        module: &Self::Module,
        _case_fold: bool,
    ) -> Result<Option<Self::Value>, Self::Error> {
        let mut text = String::new();
        let n = source.read_to_string(&mut text).map_err(|e| LineEvalError(e.to_string()))?;
        if n == 0 {
            return Ok(None);
        }
        let mut last = None;
        for line in text.lines().filter(|l| !l.trim().is_empty() && !l.trim_start().starts_with(';')) {
            last = Some(self.eval_one(line.trim(), module)?);
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
        self.modules.lock().get(module).and_then(|env| env.bindings.get(name).cloned()).unwrap_or(Binding::Unbound)
    }

    fn bind(&self, module: &Self::Module, name: &str, value: Self::Value) {
        self.modules
            .lock()
            .entry(module.clone())
            .or_default()
            .bindings
            .insert(name.to_string(), Binding::Value(value));
    }
}
