//! The tree-adapter node model (spec §3 "Nodes", §6 "Tree adapter
//! interface"). `XdmNode` is the trait concrete XML tree representations
//! implement so the evaluator can walk them generically; this crate ships
//! no XML parser or DOM of its own (spec §1 Non-goals).

use crate::value::atomic::AtomicValue;
use crate::value::types::QName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
    Namespace,
}

/// A totally-ordered key used for node identity, `<<`/`>>` comparison, and
/// deduplication in set operations (spec §3: "a stable document position").
/// `(document_id, position)` rather than Rust object identity, since tree
/// adapters are free to materialize node handles on demand rather than
/// hand back a stable pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentPosition {
    pub document_id: u64,
    pub position: u64,
}

/// The tree-adapter interface (spec §6). Implemented by the caller's
/// concrete XML representation; the evaluator is generic over `N: XdmNode`
/// so it never depends on a specific tree library.
pub trait XdmNode: Clone {
    fn kind(&self) -> NodeKind;

    /// `None` for nodes with no name (text, comment, document).
    fn expanded_name(&self) -> Option<QName>;

    fn string_value(&self) -> String;

    /// The typed value as an atomic sequence. The default atomizes the
    /// string value as `xs:untypedAtomic`, correct for a schema-less tree;
    /// a schema-aware adapter overrides this with the element/attribute's
    /// declared type.
    fn typed_value(&self) -> Vec<AtomicValue> {
        vec![AtomicValue::UntypedAtomic(self.string_value())]
    }

    fn children(&self) -> Vec<Self>
    where
        Self: Sized;

    fn attributes(&self) -> Vec<Self>
    where
        Self: Sized;

    fn namespaces(&self) -> Vec<Self>
    where
        Self: Sized;

    fn parent(&self) -> Option<Self>
    where
        Self: Sized;

    fn document_position(&self) -> DocumentPosition;

    fn base_uri(&self) -> Option<String> {
        None
    }

    /// Same node, by document position — used for `is` and for dedup.
    fn identical(&self, other: &Self) -> bool {
        self.document_position() == other.document_position()
    }
}
