//! A minimal in-memory `XdmNode` implementation used only by the
//! integration tests in this directory, built the way the teacher's own
//! snippet-test harness stands up throwaway fixtures (`tests/fledgling.rs`)
//! rather than importing a real XML library this crate deliberately does
//! not depend on (spec §1 Non-goals: "XML parsing and DOM construction").

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use xpath_engine::value::atomic::AtomicValue;
use xpath_engine::value::node::{DocumentPosition, NodeKind, XdmNode};
use xpath_engine::value::types::QName;

struct Inner {
    kind: NodeKind,
    name: Option<QName>,
    text: String,
    attributes: RefCell<Vec<TNode>>,
    children: RefCell<Vec<TNode>>,
    parent: RefCell<Option<TNode>>,
    position: Cell<u64>,
}

#[derive(Clone)]
pub struct TNode(Rc<Inner>);

impl TNode {
    fn new(kind: NodeKind, name: Option<QName>, text: &str) -> TNode {
        TNode(Rc::new(Inner {
            kind,
            name,
            text: text.to_string(),
            attributes: RefCell::new(Vec::new()),
            children: RefCell::new(Vec::new()),
            parent: RefCell::new(None),
            position: Cell::new(0),
        }))
    }

    fn adopt(&self, children: Vec<TNode>, attributes: Vec<TNode>) {
        for attr in &attributes {
            *attr.0.parent.borrow_mut() = Some(self.clone());
        }
        for child in &children {
            *child.0.parent.borrow_mut() = Some(self.clone());
        }
        *self.0.attributes.borrow_mut() = attributes;
        *self.0.children.borrow_mut() = children;
    }
}

/// Builds an element node named `name` with the given attributes and
/// children.
pub fn el(name: &str, attrs: Vec<TNode>, children: Vec<TNode>) -> TNode {
    let node = TNode::new(NodeKind::Element, Some(QName::no_namespace(name)), "");
    node.adopt(children, attrs);
    node
}

/// A leaf element with no children or attributes, e.g. `<B1/>`.
pub fn leaf(name: &str) -> TNode {
    el(name, vec![], vec![])
}

pub fn attr(name: &str, value: &str) -> TNode {
    TNode::new(NodeKind::Attribute, Some(QName::no_namespace(name)), value)
}

pub fn text(value: &str) -> TNode {
    TNode::new(NodeKind::Text, None, value)
}

/// Wraps `root` in a document node and assigns document-order positions to
/// every node in the tree, matching the `document_position` contract
/// (spec §3 "a stable document position").
pub fn doc(root: TNode) -> TNode {
    let document = TNode::new(NodeKind::Document, None, "");
    document.adopt(vec![root], vec![]);
    let mut counter = 0u64;
    assign_positions(&document, &mut counter);
    document
}

fn assign_positions(node: &TNode, counter: &mut u64) {
    node.0.position.set(*counter);
    *counter += 1;
    for attr in node.0.attributes.borrow().iter() {
        assign_positions(attr, counter);
    }
    for child in node.0.children.borrow().iter() {
        assign_positions(child, counter);
    }
}

fn collect_text(node: &TNode, out: &mut String) {
    if node.0.kind == NodeKind::Text {
        out.push_str(&node.0.text);
    }
    for child in node.0.children.borrow().iter() {
        collect_text(child, out);
    }
}

impl XdmNode for TNode {
    fn kind(&self) -> NodeKind {
        self.0.kind
    }

    fn expanded_name(&self) -> Option<QName> {
        self.0.name.clone()
    }

    fn string_value(&self) -> String {
        match self.0.kind {
            NodeKind::Text | NodeKind::Comment | NodeKind::ProcessingInstruction | NodeKind::Attribute => {
                self.0.text.clone()
            }
            _ => {
                let mut out = String::new();
                collect_text(self, &mut out);
                out
            }
        }
    }

    fn typed_value(&self) -> Vec<AtomicValue> {
        vec![AtomicValue::UntypedAtomic(self.string_value())]
    }

    fn children(&self) -> Vec<TNode> {
        self.0.children.borrow().clone()
    }

    fn attributes(&self) -> Vec<TNode> {
        self.0.attributes.borrow().clone()
    }

    fn namespaces(&self) -> Vec<TNode> {
        Vec::new()
    }

    fn parent(&self) -> Option<TNode> {
        self.0.parent.borrow().clone()
    }

    fn document_position(&self) -> DocumentPosition {
        DocumentPosition { document_id: 1, position: self.0.position.get() }
    }
}
