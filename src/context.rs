//! The dynamic evaluation context (spec §4.7): "`{ item, position, size,
//! variables (stack of scopes), namespaces, default-element-namespace,
//! default-function-namespace, documents, base-URI, current-dateTime
//! (frozen at context creation), implicit-timezone, collations, schema
//! (optional) }`."
//!
//! The context is cloned (copy-on-write) whenever a sub-expression needs to
//! change focus — predicate evaluation, `for`/`let`/quantifier binding,
//! function-call boundary (spec §4.7). `EvaluationContext` is plain `Clone`;
//! each `with_*` builder returns an independent clone with one field
//! changed, which is the Rust-level expression of "copy-on-write" the spec
//! calls for, without requiring persistent/shared data structures the rest
//! of the corpus does not use.

use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, FixedOffset};

use crate::functions::{ARRAY_NAMESPACE, FN_NAMESPACE, MAP_NAMESPACE, MATH_NAMESPACE, XS_NAMESPACE};
use crate::schema::{NoSchema, SchemaProvider};
use crate::value::node::XdmNode;
use crate::value::sequence::{Item, Sequence};
use crate::value::types::QName;

/// The unicode codepoint collation URI, the one collation every conformant
/// implementation must support (spec §9 Open Questions: "Collation
/// registry"). Additional collations are pluggable via [`Collations`].
pub const UNICODE_CODEPOINT_COLLATION: &str = "http://www.w3.org/2005/xpath-functions/collation/codepoint";

/// A pluggable string comparator keyed by collation URI. The default
/// registry only knows the mandatory codepoint collation; a host
/// application can register locale-sensitive ones (spec §9).
#[derive(Clone)]
pub struct Collations {
    default: String,
    registry: HashMap<String, Rc<dyn Fn(&str, &str) -> std::cmp::Ordering>>,
}

impl Collations {
    pub fn new() -> Collations {
        let mut registry: HashMap<String, Rc<dyn Fn(&str, &str) -> std::cmp::Ordering>> = HashMap::new();
        registry.insert(UNICODE_CODEPOINT_COLLATION.to_string(), Rc::new(|a: &str, b: &str| a.cmp(b)));
        Collations { default: UNICODE_CODEPOINT_COLLATION.to_string(), registry }
    }

    pub fn register(&mut self, uri: &str, compare: impl Fn(&str, &str) -> std::cmp::Ordering + 'static) {
        self.registry.insert(uri.to_string(), Rc::new(compare));
    }

    pub fn default_uri(&self) -> &str {
        &self.default
    }

    pub fn compare(&self, uri: &str, a: &str, b: &str) -> Option<std::cmp::Ordering> {
        self.registry.get(uri).map(|f| f(a, b))
    }
}

impl Default for Collations {
    fn default() -> Collations {
        Collations::new()
    }
}

/// A caller-supplied loader consulted by `fn:doc`/`fn:doc-available` on a
/// document-cache miss (spec §5 "Resource discipline": "Network/file I/O
/// never happens implicitly" — population is the caller's responsibility).
pub type DocLoader<N> = Rc<dyn Fn(&str) -> Option<N>>;

/// The dynamic evaluation context (spec §4.7). Generic over the tree-adapter
/// node type so the evaluator never depends on a concrete XML library.
#[derive(Clone)]
pub struct EvaluationContext<N: XdmNode> {
    /// Current focus (spec Glossary "Focus"): `None` for the context an
    /// expression is first evaluated with no context item (`XPDY0002` if
    /// one is dereferenced); `Some` inside a path step or predicate.
    pub item: Option<Item<N>>,
    pub position: usize,
    pub size: usize,

    /// Stack of variable scopes, innermost last (spec §4.5 "Variable
    /// shadowing follows innermost-binding-wins").
    variables: Vec<HashMap<QName, Sequence<N>>>,

    namespaces: HashMap<String, String>,
    pub default_element_namespace: Option<String>,
    pub default_function_namespace: Option<String>,

    /// URI-keyed document cache (spec §6 `documents (URI→node)`).
    documents: HashMap<String, N>,
    doc_loader: Option<DocLoader<N>>,

    pub base_uri: Option<String>,
    /// Sampled once per evaluation and held fixed (spec §4.7: "`current-
    /// dateTime` must remain stable across an entire evaluation").
    pub current_date_time: DateTime<FixedOffset>,
    pub implicit_timezone: FixedOffset,
    pub collations: Collations,

    pub schema: Rc<dyn SchemaProvider>,

    /// XPath 1.0 backward-compatibility mode (spec §7): coerce instead of
    /// raising `XPTY0004` in general comparisons.
    pub compatibility_mode: bool,

    /// Polled at AST-node evaluation boundaries so a caller can abort a
    /// long-running evaluation (spec §5 "Cancellation/timeouts").
    cancelled: Option<Rc<dyn Fn() -> bool>>,
}

impl<N: XdmNode> EvaluationContext<N> {
    /// A fresh top-level context with the given context item and no focus
    /// siblings (`position`/`size` both 1), matching `select(root, path)`'s
    /// entry point.
    pub fn new(item: Option<Item<N>>, now: DateTime<FixedOffset>) -> EvaluationContext<N> {
        // The static context pre-declares these prefixes (spec §4.2 "unbound
        // namespace prefix" only applies to prefixes a query actually needs
        // to introduce itself); a host can still rebind them via
        // `bind_namespace`.
        let mut namespaces = HashMap::new();
        namespaces.insert("fn".to_string(), FN_NAMESPACE.to_string());
        namespaces.insert("xs".to_string(), XS_NAMESPACE.to_string());
        namespaces.insert("math".to_string(), MATH_NAMESPACE.to_string());
        namespaces.insert("map".to_string(), MAP_NAMESPACE.to_string());
        namespaces.insert("array".to_string(), ARRAY_NAMESPACE.to_string());

        EvaluationContext {
            item,
            position: 1,
            size: 1,
            variables: vec![HashMap::new()],
            namespaces,
            default_element_namespace: None,
            default_function_namespace: None,
            documents: HashMap::new(),
            doc_loader: None,
            base_uri: None,
            current_date_time: now,
            implicit_timezone: *now.offset(),
            collations: Collations::new(),
            schema: Rc::new(NoSchema),
            compatibility_mode: false,
            cancelled: None,
        }
    }

    pub fn bind_namespace(&mut self, prefix: &str, uri: &str) {
        self.namespaces.insert(prefix.to_string(), uri.to_string());
    }

    pub fn resolve_namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(|s| s.as_str())
    }

    pub fn cache_document(&mut self, uri: &str, root: N) {
        self.documents.insert(uri.to_string(), root);
    }

    pub fn set_doc_loader(&mut self, loader: DocLoader<N>) {
        self.doc_loader = Some(loader);
    }

    /// `fn:doc-available`/`fn:doc` semantics: a cache hit returns
    /// immediately; otherwise the loader callback is consulted and its
    /// result (if any) is memoized (spec §5 "cache population is the
    /// caller's responsibility via the loader callback").
    pub fn load_document(&mut self, uri: &str) -> Option<N> {
        if let Some(root) = self.documents.get(uri) {
            return Some(root.clone());
        }
        let loaded = self.doc_loader.as_ref().and_then(|loader| loader(uri))?;
        self.documents.insert(uri.to_string(), loaded.clone());
        Some(loaded)
    }

    pub fn set_cancellation_flag(&mut self, flag: Rc<dyn Fn() -> bool>) {
        self.cancelled = Some(flag);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.as_ref().map_or(false, |f| f())
    }

    /// A clone with the focus replaced — the copy-on-write snapshot taken at
    /// a predicate/step boundary (spec §4.7).
    pub fn with_focus(&self, item: Item<N>, position: usize, size: usize) -> EvaluationContext<N> {
        let mut next = self.clone();
        next.item = Some(item);
        next.position = position;
        next.size = size;
        next
    }

    /// Pushes a fresh innermost variable scope, returning the clone (spec
    /// §4.5 `for`/`let`/quantifier binding boundary).
    pub fn with_new_scope(&self) -> EvaluationContext<N> {
        let mut next = self.clone();
        next.variables.push(HashMap::new());
        next
    }

    /// Binds `name` in the innermost scope of a clone, shadowing any outer
    /// binding of the same name (spec §4.5).
    pub fn with_binding(&self, name: QName, value: Sequence<N>) -> EvaluationContext<N> {
        let mut next = self.clone();
        next.variables.last_mut().expect("at least one scope always present").insert(name, value);
        next
    }

    /// Innermost-first variable lookup (spec §4.5 "innermost-binding-wins").
    pub fn lookup_variable(&self, name: &QName) -> Option<&Sequence<N>> {
        self.variables.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Snapshots the current scope stack, used to close over the defining
    /// scope of an inline function literal (spec §4.6 "function items are
    /// first-class").
    pub fn capture_scopes(&self) -> Vec<HashMap<QName, Sequence<N>>> {
        self.variables.clone()
    }

    /// A clone whose scope stack is replaced wholesale by `scopes` — used to
    /// re-enter an inline function's captured closure environment at call
    /// time, keeping everything else (documents, namespaces, current-
    /// dateTime, ...) from the calling context.
    pub fn with_captured_scopes(&self, scopes: Vec<HashMap<QName, Sequence<N>>>) -> EvaluationContext<N> {
        let mut next = self.clone();
        next.variables = scopes;
        next
    }
}
