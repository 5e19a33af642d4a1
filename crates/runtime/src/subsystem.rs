// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! `LoadSubsystem`: the facade composing the Path Resolver, Load Session,
//! Feature Registry, Dynamic Object Registry, and Autoload Resolver into
//! the operation table of spec.md §6.

use crate::env;
use parking_lot::Mutex;
use rt_autoload::{resolve_autoload, AutoloadRecord};
use rt_core::{Binding, Evaluator, FeatureName, LoadError, LoadFlags, LoadOutcome, LoadResult, ReadExpr};
use rt_dynload::{DlShim, DsoRegistry, LibloadingShim};
use rt_pathresolve::{SearchPath, SuffixList};
use rt_registry::{FeatureRegistry, RequireOutcome};
use std::path::Path;
use std::sync::Arc;

/// Everything needed to stand up a [`LoadSubsystem`]: the evaluator to
/// drive, the DSO shim (defaults to the real `libloading`-backed one), the
/// file-suffix lists, and the built-in "provided" seed set (spec.md §6).
pub struct Init<E, S = LibloadingShim> {
    pub evaluator: E,
    pub dlshim: S,
    pub source_suffixes: Vec<String>,
    pub dso_suffixes: Vec<String>,
    pub built_in_provided: Vec<FeatureName>,
}

/// The composed loading subsystem. One instance is expected to live for
/// the lifetime of the embedding process (spec.md §9, "global mutable
/// state").
pub struct LoadSubsystem<E: Evaluator, S: DlShim = LibloadingShim> {
    evaluator: E,
    load_paths: SearchPath,
    dynload_paths: SearchPath,
    source_suffixes: SuffixList,
    dso_suffixes: SuffixList,
    registry: FeatureRegistry,
    dso: DsoRegistry<S>,
}

impl<E: Evaluator, S: DlShim> LoadSubsystem<E, S> {
    /// `initialize()`: seed load paths from the process environment
    /// (unless set-uid/set-gid) and publish the built-in "provided" set.
    pub fn initialize(init: Init<E, S>) -> Self {
        let load_paths = SearchPath::new(env::load_path_from_env());
        let dynload_paths = SearchPath::new(env::dynload_path_from_env());
        let registry = FeatureRegistry::new();
        registry.seed(init.built_in_provided);

        Self {
            evaluator: init.evaluator,
            load_paths,
            dynload_paths,
            source_suffixes: SuffixList::new(init.source_suffixes),
            dso_suffixes: SuffixList::new(init.dso_suffixes),
            registry,
            dso: DsoRegistry::new(init.dlshim),
        }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// `add-load-path(dir, after?)`: also probes `dir/<arch>` and
    /// `dir/../<arch>` for the dynload path (spec.md §6 "Path-adding
    /// policy").
    pub fn add_load_path(&self, dir: impl Into<String>, after: bool) {
        let dir = dir.into();
        self.load_paths.add(dir.clone(), after);

        let arch = env::host_arch();
        let direct = Path::new(&dir).join(arch);
        let sibling = Path::new(&dir).join("..").join(arch);
        let dynload_dir = if direct.is_dir() {
            direct.display().to_string()
        } else if sibling.is_dir() {
            sibling.display().to_string()
        } else {
            dir
        };
        self.dynload_paths.add(dynload_dir, after);
    }

    /// `load(filename, flags, module)`. `flags.propagate_error` selects
    /// spec.md §7's dual surface: `true` rethrows as `Err`, `false` packs
    /// the outcome into a [`LoadResult`] distinguishing "not found" from
    /// "failed" so a caller in packet mode can actually observe a failure
    /// instead of it disappearing.
    pub fn load(
        &self,
        filename: &str,
        flags: LoadFlags,
        module: &E::Module,
    ) -> Result<LoadOutcome<Option<E::Value>>, LoadError> {
        rt_session::load(filename, &self.load_paths, &self.source_suffixes, &flags, &self.evaluator, module)
    }

    /// Run `filename` through [`Self::load`] always in propagate mode,
    /// for internal callers (`require`, autoload resolution) that need a
    /// bare `Result<(), LoadError>` to hand to a claim-driving closure —
    /// regardless of what surface mode the caller-facing operation uses.
    fn load_propagating(&self, filename: &str, flags: LoadFlags, module: &E::Module) -> Result<(), LoadError> {
        match self.load(filename, flags.propagate_error(true), module)? {
            LoadOutcome::Value(_) => Ok(()),
            LoadOutcome::Packet(_) => Ok(()),
        }
    }

    /// `load-from-port(stream, module)`.
    pub fn load_from_port<R: ReadExpr>(
        &self,
        stream: &Arc<Mutex<R>>,
        port_desc: impl Into<String>,
        module: &E::Module,
    ) -> Result<Option<E::Value>, E::Error> {
        let mut session = rt_session::LoadSession::open(stream, port_desc, self.load_paths.snapshot());
        session.run(&self.evaluator, module, false)
    }

    /// `require(feature, flags)`. Mirrors `load`'s dual surface (spec.md
    /// §4.3: "propagation of errors from the loaded file is controlled by
    /// flags"): the loader closure handed to the registry always drives
    /// the underlying `load` in propagate mode, so the registry's claim
    /// machinery sees a real `Err` to roll back on; `flags.propagate_error`
    /// then governs only how *this* call reports that outcome to its
    /// caller.
    pub fn require(&self, feature: &FeatureName, flags: LoadFlags) -> Result<LoadOutcome<RequireOutcome>, LoadError> {
        let module = self.evaluator.current_module();
        let result = self.registry.require(feature, || self.load_propagating(&feature.source_file(), flags, &module));
        if flags.propagate_error {
            result.map(LoadOutcome::Value)
        } else {
            Ok(LoadOutcome::Packet(LoadResult::from_result(result)))
        }
    }

    /// `provide(feature)`.
    pub fn provide(&self, feature: &FeatureName) {
        self.registry.provide(feature)
    }

    /// `provided?(feature)`.
    pub fn provided(&self, feature: &FeatureName) -> bool {
        self.registry.provided(feature)
    }

    /// `dynamic-load(filename, explicit-init-name-or-none)`.
    pub fn dynamic_load(&self, filename: &str, explicit_init_name: Option<&str>) -> Result<(), LoadError> {
        self.dso.dynamic_load(filename, &self.dynload_paths, &self.dso_suffixes, explicit_init_name)
    }

    /// Force an autoload record, loading its target feature file at most
    /// once (spec.md §4.5). The inner `require` always runs in propagate
    /// mode — spec.md §4.5 itself says driving the load "calls
    /// `require(target-path, propagate-error)`" — so a failure surfaces as
    /// a real `Err` for `rt_autoload::resolve_autoload` to roll the locker
    /// back on, rather than a silently-discarded packet.
    pub fn resolve_autoload(
        &self,
        record: &AutoloadRecord<E::Module, E::Value>,
        flags: LoadFlags,
    ) -> Result<Binding<E::Value>, LoadError> {
        resolve_autoload(record, &self.registry, &self.evaluator, || {
            self.registry
                .require(&record.target, || self.load_propagating(&record.target.source_file(), flags, &record.module))
                .map(|_| ())
        })
    }
}

#[cfg(test)]
#[path = "subsystem_tests.rs"]
mod tests;
