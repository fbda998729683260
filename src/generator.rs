//! Procedural object generators, the in-process counterpart of the old
//! dlopen'd rib-generator plugins. Hosts register generators by name; the
//! exporter invokes a generator exactly once per object and skips the
//! object (siblings unaffected) if it fails.

use std::collections::BTreeMap;

use crate::{
    error::{RibwireError, RibwireResult},
    registry::ObjectIdentity,
    snapshot::Snapshot,
};

/// Produces a snapshot for one object on demand.
pub trait ObjectGenerator {
    fn generate(
        &self,
        identity: &ObjectIdentity,
        args: &serde_json::Value,
    ) -> RibwireResult<Snapshot>;
}

#[derive(Default)]
pub struct GeneratorRegistry {
    generators: BTreeMap<String, Box<dyn ObjectGenerator>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        generator: Box<dyn ObjectGenerator>,
    ) {
        self.generators.insert(name.into(), generator);
    }

    pub fn get(&self, name: &str) -> Option<&dyn ObjectGenerator> {
        self.generators.get(name).map(|g| g.as_ref())
    }

    /// Runs the named generator once. Unknown names and generator failures
    /// both surface as `Plugin` errors; the caller decides whether to skip.
    pub fn run(
        &self,
        name: &str,
        identity: &ObjectIdentity,
        args: &serde_json::Value,
    ) -> RibwireResult<Snapshot> {
        let generator = self.get(name).ok_or_else(|| {
            RibwireError::plugin(format!("no generator registered under '{name}'"))
        })?;
        generator.generate(identity, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Topology;

    struct FixedCount;

    impl ObjectGenerator for FixedCount {
        fn generate(
            &self,
            _identity: &ObjectIdentity,
            args: &serde_json::Value,
        ) -> RibwireResult<Snapshot> {
            let count = args
                .get("count")
                .and_then(|v| v.as_u64())
                .ok_or_else(|| RibwireError::plugin("missing 'count' argument"))?;
            Ok(Snapshot::new(Topology::Particles {
                count: count as u32,
            }))
        }
    }

    #[test]
    fn registered_generator_runs_by_name() {
        let mut reg = GeneratorRegistry::new();
        reg.register("dust", Box::new(FixedCount));
        let snap = reg
            .run(
                "dust",
                &ObjectIdentity::path("|fx|dust"),
                &serde_json::json!({ "count": 32 }),
            )
            .unwrap();
        assert_eq!(snap.topology, Topology::Particles { count: 32 });
    }

    #[test]
    fn unknown_generator_is_a_plugin_error() {
        let reg = GeneratorRegistry::new();
        let err = reg
            .run(
                "missing",
                &ObjectIdentity::path("|x"),
                &serde_json::Value::Null,
            )
            .unwrap_err();
        assert!(matches!(err, RibwireError::Plugin(_)));
    }

    #[test]
    fn generator_failure_surfaces_as_plugin_error() {
        let mut reg = GeneratorRegistry::new();
        reg.register("dust", Box::new(FixedCount));
        let err = reg
            .run(
                "dust",
                &ObjectIdentity::path("|x"),
                &serde_json::Value::Null,
            )
            .unwrap_err();
        assert!(matches!(err, RibwireError::Plugin(_)));
    }
}
