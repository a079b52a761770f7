//! Type Registry
//!
//! Plain-data view of suite types and their methods. Entries come from the
//! `#[suite]` inventory, from a [`BenchmarkTable`](crate::BenchmarkTable), or
//! from direct registration.

use crate::error::ResolveError;
use fxhash::FxHashMap;
use markbench_core::{BenchmarkType, MethodDef, RunnerFn, TypeDef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a type or method is declared
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Source file path
    pub file: String,
    /// Line number (1-based)
    pub line: u32,
}

impl SourceLocation {
    /// Create a location
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A registered type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// Fully-qualified name
    pub name: String,
    /// Fully-qualified name of the parent type
    pub parent: Option<String>,
    /// Declaration site
    pub location: Option<SourceLocation>,
}

impl TypeInfo {
    /// A root type with no parent
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            location: None,
        }
    }

    /// Set the parent type
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

impl From<&TypeDef> for TypeInfo {
    fn from(def: &TypeDef) -> Self {
        Self {
            name: def.name.to_string(),
            parent: def.parent.map(str::to_string),
            location: Some(SourceLocation::new(def.file, def.line)),
        }
    }
}

/// A method declared on a registered type
#[derive(Debug, Clone)]
pub struct MethodInfo {
    /// Fully-qualified name of the declaring type
    pub owner: String,
    /// Method name
    pub name: String,
    /// Mode from the benchmark marker; `None` when unmarked
    pub marker: Option<BenchmarkType>,
    /// Declared return type text
    pub returns: String,
    /// Declared parameter type texts, in order
    pub params: Vec<String>,
    /// Tool-generated, never a resolution candidate
    pub synthetic: bool,
    /// Entry point, when runnable
    pub runner: Option<RunnerFn>,
    /// Declaration site
    pub location: Option<SourceLocation>,
}

impl MethodInfo {
    /// An unmarked method
    pub fn new<P, S>(owner: impl Into<String>, name: impl Into<String>, params: P, returns: &str) -> Self
    where
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            owner: owner.into(),
            name: name.into(),
            marker: None,
            returns: normalize_type_text(returns),
            params: params
                .into_iter()
                .map(|p| normalize_type_text(p.as_ref()))
                .collect(),
            synthetic: false,
            runner: None,
            location: None,
        }
    }

    /// Attach a benchmark marker
    pub fn marked(mut self, mode: BenchmarkType) -> Self {
        self.marker = Some(mode);
        self
    }

    /// Flag as tool-generated
    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    /// Attach an entry point
    pub fn with_runner(mut self, runner: RunnerFn) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Attach a declaration site
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// `Owner::name(params) -> returns`
    pub fn signature(&self) -> String {
        format!(
            "{}::{}({}) -> {}",
            self.owner,
            self.name,
            self.params.join(", "),
            self.returns
        )
    }
}

impl From<&MethodDef> for MethodInfo {
    fn from(def: &MethodDef) -> Self {
        let mut info = MethodInfo::new(def.owner, def.name, def.params.iter(), def.returns)
            .at(SourceLocation::new(def.file, def.line));
        info.marker = def.marker;
        info.synthetic = def.synthetic;
        info.runner = def.runner;
        info
    }
}

// Function pointers compare by address, which is not meaningful here.
impl PartialEq for MethodInfo {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner
            && self.name == other.name
            && self.marker == other.marker
            && self.returns == other.returns
            && self.params == other.params
            && self.synthetic == other.synthetic
            && self.runner.is_some() == other.runner.is_some()
            && self.location == other.location
    }
}

/// Collapse the spacing token printers insert into type text
///
/// `& mut Loop` becomes `&mut Loop`, `a :: B < C >` becomes `a::B<C>`, and a
/// leading `::` after `mut` keeps its separating space.
pub fn normalize_type_text(text: &str) -> String {
    let joined = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut out = joined
        .replace(" :: ", "::")
        .replace(":: ", "::")
        .replace(" ::", "::")
        .replace("& ", "&")
        .replace(" <", "<")
        .replace("< ", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
        .replace("( ", "(")
        .replace(" )", ")")
        .replace("&mut::", "&mut ::")
        .replace(" mut::", " mut ::");
    if out.is_empty() {
        out.push_str("()");
    }
    out
}

#[derive(Debug, Clone)]
struct TypeEntry {
    info: TypeInfo,
    methods: Vec<MethodInfo>,
}

/// All known types and their declared methods
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: FxHashMap<String, TypeEntry>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from every `#[suite]` registered in this binary
    ///
    /// Methods keep source-line order within their type.
    pub fn from_inventory() -> Self {
        let mut registry = Self::new();
        for def in inventory::iter::<TypeDef> {
            registry.add_type(TypeInfo::from(def));
        }

        let mut methods: Vec<&MethodDef> = inventory::iter::<MethodDef>.into_iter().collect();
        methods.sort_by(|a, b| (a.owner, a.line, a.name).cmp(&(b.owner, b.line, b.name)));
        for def in methods {
            if let Err(e) = registry.add_method(MethodInfo::from(def)) {
                tracing::warn!("skipping method {}::{}: {}", def.owner, def.name, e);
            }
        }

        tracing::debug!("registry loaded {} types from inventory", registry.len());
        registry
    }

    /// Register a type, or update its metadata if already present
    pub fn add_type(&mut self, info: TypeInfo) -> &mut Self {
        match self.types.get_mut(&info.name) {
            Some(entry) => entry.info = info,
            None => {
                self.types.insert(
                    info.name.clone(),
                    TypeEntry {
                        info,
                        methods: Vec::new(),
                    },
                );
            }
        }
        self
    }

    /// Register a method on its (already registered) owner
    pub fn add_method(&mut self, method: MethodInfo) -> Result<&mut Self, ResolveError> {
        let entry = self
            .types
            .get_mut(&method.owner)
            .ok_or_else(|| ResolveError::TypeNotFound(method.owner.clone()))?;
        entry.methods.push(method);
        Ok(self)
    }

    /// Look up a type by fully-qualified name
    pub fn get(&self, name: &str) -> Option<TypeHandle<'_>> {
        self.types.get(name).map(|entry| TypeHandle {
            registry: self,
            entry,
        })
    }

    /// All type handles, sorted by name
    pub fn types(&self) -> Vec<TypeHandle<'_>> {
        let mut handles: Vec<_> = self
            .types
            .values()
            .map(|entry| TypeHandle {
                registry: self,
                entry,
            })
            .collect();
        handles.sort_by_key(|h| h.name());
        handles
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types are registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Borrowed handle to a registered type
#[derive(Debug, Clone, Copy)]
pub struct TypeHandle<'r> {
    registry: &'r TypeRegistry,
    entry: &'r TypeEntry,
}

impl<'r> TypeHandle<'r> {
    /// Fully-qualified name
    pub fn name(&self) -> &'r str {
        &self.entry.info.name
    }

    /// Type metadata
    pub fn info(&self) -> &'r TypeInfo {
        &self.entry.info
    }

    /// Name of the declared parent, if any
    pub fn parent_name(&self) -> Option<&'r str> {
        self.entry.info.parent.as_deref()
    }

    /// Handle to the parent, if declared and registered
    pub fn parent(&self) -> Option<TypeHandle<'r>> {
        self.parent_name().and_then(|p| self.registry.get(p))
    }

    /// Methods declared directly on this type, in declaration order
    pub fn declared_methods(&self) -> &'r [MethodInfo] {
        &self.entry.methods
    }

    /// The registry this handle belongs to
    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }
}

/// Turns a type name into a type handle
pub trait TypeLoader {
    /// Load `name`, failing with [`ResolveError::TypeNotFound`]
    fn load_type(&self, name: &str) -> Result<TypeHandle<'_>, ResolveError>;
}

impl TypeLoader for TypeRegistry {
    fn load_type(&self, name: &str) -> Result<TypeHandle<'_>, ResolveError> {
        self.get(name)
            .ok_or_else(|| ResolveError::TypeNotFound(name.to_string()))
    }
}
