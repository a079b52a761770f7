//! Method enumeration across an ancestor chain

use crate::registry::{MethodInfo, TypeHandle};
use crate::signature::ValueKind;
use fxhash::FxHashSet;
use markbench_core::BenchmarkType;

/// A method considered during resolution
#[derive(Debug, Clone, Copy)]
pub struct MethodCandidate<'r> {
    method: &'r MethodInfo,
}

impl<'r> MethodCandidate<'r> {
    /// Wrap a method descriptor
    pub fn new(method: &'r MethodInfo) -> Self {
        Self { method }
    }

    /// Underlying descriptor
    pub fn method(&self) -> &'r MethodInfo {
        self.method
    }

    /// Method name
    pub fn name(&self) -> &'r str {
        &self.method.name
    }

    /// Declaring type
    pub fn owner(&self) -> &'r str {
        &self.method.owner
    }

    /// Whether the benchmark marker is present
    pub fn has_marker(&self) -> bool {
        self.method.marker.is_some()
    }

    /// Mode declared by the marker
    pub fn mode(&self) -> Option<BenchmarkType> {
        self.method.marker
    }

    /// Kind of the declared return type
    pub fn return_kind(&self) -> ValueKind {
        ValueKind::of(&self.method.returns)
    }

    /// Kinds of the declared parameters, in order
    pub fn parameter_kinds(&self) -> Vec<ValueKind> {
        self.method.params.iter().map(|p| ValueKind::of(p)).collect()
    }

    /// Display signature
    pub fn signature(&self) -> String {
        self.method.signature()
    }
}

/// Every method visible on `ty`: its own, then each ancestor's.
///
/// A declaration hides any ancestor declaration with the same name and
/// parameter kinds, however the types are spelled. Declarations on the same
/// type never hide each other. Synthetic methods are skipped. Order is
/// declaration order, child first.
pub fn enumerate(ty: TypeHandle<'_>) -> Vec<MethodCandidate<'_>> {
    let mut candidates = Vec::new();
    let mut seen_types: FxHashSet<&str> = FxHashSet::default();
    let mut hidden: FxHashSet<(&str, Vec<ValueKind>)> = FxHashSet::default();

    let mut current = Some(ty);
    while let Some(t) = current {
        if !seen_types.insert(t.name()) {
            tracing::warn!("inheritance cycle through {}; stopping at {}", ty.name(), t.name());
            break;
        }

        let mut declared = Vec::new();
        for method in t.declared_methods() {
            if method.synthetic {
                continue;
            }
            let candidate = MethodCandidate::new(method);
            let key = (candidate.name(), candidate.parameter_kinds());
            if !hidden.contains(&key) {
                candidates.push(candidate);
            }
            declared.push(key);
        }
        hidden.extend(declared);

        current = match t.parent_name() {
            None => None,
            Some(parent) => {
                let handle = t.registry().get(parent);
                if handle.is_none() {
                    tracing::warn!("{} extends unregistered type {}", t.name(), parent);
                }
                handle
            }
        };
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{TypeInfo, TypeRegistry};

    const CTX: [&str; 1] = ["&mut Loop"];

    fn names<'a>(candidates: &[MethodCandidate<'a>]) -> Vec<(&'a str, &'a str)> {
        candidates.iter().map(|c| (c.owner(), c.name())).collect()
    }

    #[test]
    fn test_includes_inherited_methods() {
        let mut registry = TypeRegistry::new();
        registry
            .add_type(TypeInfo::new("Base"))
            .add_type(TypeInfo::new("Child").extends("Base"));
        registry
            .add_method(MethodInfo::new("Base", "setup", CTX, "RunResult"))
            .unwrap();
        registry
            .add_method(MethodInfo::new("Child", "run", CTX, "RunResult"))
            .unwrap();

        let found = enumerate(registry.get("Child").unwrap());
        assert_eq!(names(&found), vec![("Child", "run"), ("Base", "setup")]);
    }

    #[test]
    fn test_override_hides_ancestor() {
        let mut registry = TypeRegistry::new();
        registry
            .add_type(TypeInfo::new("Base"))
            .add_type(TypeInfo::new("Child").extends("Base"));
        registry
            .add_method(MethodInfo::new("Base", "run", CTX, "RunResult"))
            .unwrap();
        registry
            .add_method(MethodInfo::new("Child", "run", CTX, "RunResult"))
            .unwrap();

        let found = enumerate(registry.get("Child").unwrap());
        assert_eq!(names(&found), vec![("Child", "run")]);
    }

    #[test]
    fn test_override_ignores_path_spelling() {
        let mut registry = TypeRegistry::new();
        registry
            .add_type(TypeInfo::new("Base"))
            .add_type(TypeInfo::new("Child").extends("Base"));
        registry
            .add_method(
                MethodInfo::new("Base", "run", CTX, "RunResult").marked(BenchmarkType::Loop),
            )
            .unwrap();
        registry
            .add_method(
                MethodInfo::new("Child", "run", ["&mut markbench::Loop"], "RunResult")
                    .marked(BenchmarkType::SingleShot),
            )
            .unwrap();

        let found = enumerate(registry.get("Child").unwrap());
        assert_eq!(names(&found), vec![("Child", "run")]);
        assert_eq!(found[0].mode(), Some(BenchmarkType::SingleShot));
    }

    #[test]
    fn test_different_parameters_do_not_hide() {
        let mut registry = TypeRegistry::new();
        registry
            .add_type(TypeInfo::new("Base"))
            .add_type(TypeInfo::new("Child").extends("Base"));
        registry
            .add_method(MethodInfo::new("Base", "run", ["u32"], "RunResult"))
            .unwrap();
        registry
            .add_method(MethodInfo::new("Child", "run", CTX, "RunResult"))
            .unwrap();

        let found = enumerate(registry.get("Child").unwrap());
        assert_eq!(names(&found), vec![("Child", "run"), ("Base", "run")]);
    }

    #[test]
    fn test_same_type_declarations_are_all_kept() {
        let mut registry = TypeRegistry::new();
        registry.add_type(TypeInfo::new("Dup"));
        for param in ["&mut Loop", "&mut markbench::Loop"] {
            registry
                .add_method(MethodInfo::new("Dup", "run", [param], "RunResult"))
                .unwrap();
        }

        assert_eq!(enumerate(registry.get("Dup").unwrap()).len(), 2);
    }

    #[test]
    fn test_skips_synthetic() {
        let mut registry = TypeRegistry::new();
        registry.add_type(TypeInfo::new("Suite"));
        registry
            .add_method(MethodInfo::new("Suite", "run", CTX, "RunResult").synthetic())
            .unwrap();

        assert!(enumerate(registry.get("Suite").unwrap()).is_empty());
    }

    #[test]
    fn test_survives_cycles_and_missing_parents() {
        let mut registry = TypeRegistry::new();
        registry
            .add_type(TypeInfo::new("A").extends("B"))
            .add_type(TypeInfo::new("B").extends("A"))
            .add_type(TypeInfo::new("Orphan").extends("Nowhere"));
        registry
            .add_method(MethodInfo::new("A", "a", CTX, "RunResult"))
            .unwrap();
        registry
            .add_method(MethodInfo::new("B", "b", CTX, "RunResult"))
            .unwrap();
        registry
            .add_method(MethodInfo::new("Orphan", "o", CTX, "RunResult"))
            .unwrap();

        assert_eq!(
            names(&enumerate(registry.get("A").unwrap())),
            vec![("A", "a"), ("B", "b")]
        );
        assert_eq!(enumerate(registry.get("Orphan").unwrap()).len(), 1);
    }

    #[test]
    fn test_order_is_stable() {
        let mut registry = TypeRegistry::new();
        registry.add_type(TypeInfo::new("Suite"));
        for name in ["c", "a", "b"] {
            registry
                .add_method(MethodInfo::new("Suite", name, CTX, "RunResult"))
                .unwrap();
        }
        let suite = registry.get("Suite").unwrap();
        let first = names(&enumerate(suite));
        assert_eq!(first, vec![("Suite", "c"), ("Suite", "a"), ("Suite", "b")]);
        assert_eq!(first, names(&enumerate(suite)));
    }
}
