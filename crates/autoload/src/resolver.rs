// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 rt-load Contributors

//! `resolve-autoload`: force an [`AutoloadRecord`], loading its target file
//! at most once across however many threads race to force it (spec.md
//! §4.5).

use crate::record::AutoloadRecord;
use rt_core::{Binding, Evaluator, LoadError, ThreadToken};
use rt_registry::FeatureRegistry;

/// Force `record`, using `require_and_load` to perform the actual
/// `require(target, ...)` when this call wins the claim (built by the
/// caller from a [`FeatureRegistry`] plus a loader, since this crate has
/// no dependency on the session/path-resolution machinery — it only ever
/// needs to know whether the load succeeded).
pub fn resolve_autoload<E: Evaluator>(
    record: &AutoloadRecord<E::Module, E::Value>,
    registry: &FeatureRegistry,
    evaluator: &E,
    require_and_load: impl FnOnce() -> Result<(), LoadError>,
) -> Result<Binding<E::Value>, LoadError> {
    if let Some(value) = record.loaded_value() {
        return Ok(Binding::Value(value));
    }

    let self_id = std::thread::current().id();
    if record.locker_is_benign(self_id) && registry.is_providing(&record.target) {
        return Ok(Binding::Unbound);
    }

    let token = ThreadToken::new();
    match record.claim(self_id, token.downgrade()) {
        Ok(Some(value)) => return Ok(Binding::Value(value)),
        Ok(None) => {}
        Err(()) => {
            record.release_locker();
            return Err(LoadError::AutoloadCircular { symbol: record.name.clone() });
        }
    }

    // `drive` runs `require_and_load`, which ultimately evaluates the
    // target file — arbitrary embedder code (spec.md §4.5). If it panics
    // instead of returning `Err`, `_locker` still clears the locker and
    // wakes any thread parked in `record.claim`'s wait loop, the same
    // scope-guard discipline as `rt_registry::ClaimGuard` and
    // `rt_dynload`'s `LoaderGuard` (spec.md §7, "autoload lockers are
    // always cleared and waiters broadcast").
    let _locker = LockerGuard { record };
    match drive(record, registry, evaluator, require_and_load) {
        Ok(value) => {
            record.publish(value.clone());
            Ok(Binding::Value(value))
        }
        Err(err) => Err(err),
    }
}

/// Clears an autoload record's locker and wakes waiters on drop. A no-op if
/// `record.publish` already cleared it on the success path — `release_locker`
/// is idempotent.
struct LockerGuard<'a, M, V: Clone> {
    record: &'a AutoloadRecord<M, V>,
}

impl<M, V: Clone> Drop for LockerGuard<'_, M, V> {
    fn drop(&mut self) {
        self.record.release_locker();
    }
}

fn drive<E: Evaluator>(
    record: &AutoloadRecord<E::Module, E::Value>,
    registry: &FeatureRegistry,
    evaluator: &E,
    require_and_load: impl FnOnce() -> Result<(), LoadError>,
) -> Result<E::Value, LoadError> {
    let _ = registry;
    require_and_load()?;

    let source_module = match &record.import_from {
        Some(other) => other,
        None => &record.module,
    };

    let binding = evaluator.lookup(source_module, &record.name);
    let value = match binding {
        Binding::Value(v) => v,
        Binding::Unbound => {
            return Err(LoadError::AutoloadUndefined {
                symbol: record.name.clone(),
                file: record.target.source_file(),
            })
        }
        Binding::StillAutoload => {
            return Err(LoadError::AutoloadUndefined {
                symbol: record.name.clone(),
                file: record.target.source_file(),
            })
        }
    };

    if record.import_from.is_some() {
        evaluator.bind(&record.module, &record.name, value.clone());
    }

    Ok(value)
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
