//! The thirteen XPath axes (spec §4.3), each a pure function from a context
//! node to an ordered `Vec<N>` over the generic [`XdmNode`] tree adapter.
//! Forward axes yield document order; reverse axes (`ancestor`,
//! `ancestor-or-self`, `preceding`, `preceding-sibling`) yield *reverse*
//! document order per the spec, which the path evaluator re-sorts after
//! node-test/predicate filtering (spec §4.3 `Axis::is_reverse`).

use crate::ast::Axis;
use crate::value::node::XdmNode;

fn descendants<N: XdmNode>(node: &N, acc: &mut Vec<N>) {
    for child in node.children() {
        acc.push(child.clone());
        descendants(&child, acc);
    }
}

fn following_siblings<N: XdmNode>(node: &N) -> Vec<N> {
    match node.parent() {
        None => Vec::new(),
        Some(parent) => {
            let siblings = parent.children();
            let pos = siblings.iter().position(|s| s.identical(node));
            match pos {
                Some(i) => siblings[i + 1..].to_vec(),
                None => Vec::new(),
            }
        }
    }
}

fn preceding_siblings<N: XdmNode>(node: &N) -> Vec<N> {
    match node.parent() {
        None => Vec::new(),
        Some(parent) => {
            let siblings = parent.children();
            let pos = siblings.iter().position(|s| s.identical(node));
            match pos {
                Some(i) => {
                    let mut result = siblings[..i].to_vec();
                    result.reverse();
                    result
                }
                None => Vec::new(),
            }
        }
    }
}

fn ancestors<N: XdmNode>(node: &N) -> Vec<N> {
    let mut result = Vec::new();
    let mut current = node.parent();
    while let Some(p) = current {
        result.push(p.clone());
        current = p.parent();
    }
    result
}

/// `following::` — every node after `node` in document order, excluding
/// descendants of `node` and attributes/namespaces of ancestors.
fn following<N: XdmNode>(node: &N) -> Vec<N> {
    let mut result = Vec::new();
    let mut excluded = vec![node.clone()];
    descendants(node, &mut excluded);

    let mut current = node.clone();
    loop {
        let after_siblings = following_siblings(&current);
        for sibling in &after_siblings {
            result.push(sibling.clone());
            descendants(sibling, &mut result);
        }
        match current.parent() {
            Some(p) => current = p,
            None => break,
        }
    }
    result
}

/// `preceding::` — every node before `node` in reverse document order,
/// excluding ancestors and their descendants-that-are-also-ancestors.
fn preceding<N: XdmNode>(node: &N) -> Vec<N> {
    let mut result = Vec::new();
    let ancestor_list = ancestors(node);
    let mut current = node.clone();
    loop {
        let before_siblings = preceding_siblings(&current);
        for sibling in &before_siblings {
            let mut subtree = vec![sibling.clone()];
            descendants(sibling, &mut subtree);
            subtree.reverse();
            result.extend(subtree);
        }
        match current.parent() {
            Some(p) => {
                if ancestor_list.iter().any(|a| a.identical(&p)) {
                    current = p;
                } else {
                    break;
                }
            }
            None => break,
        }
    }
    result
}

/// Walks `axis` from `node`, returning its members in the axis's natural
/// order (forward axes: document order; reverse axes: reverse document
/// order — spec §4.3).
pub fn walk_axis<N: XdmNode>(axis: Axis, node: &N) -> Vec<N> {
    match axis {
        Axis::Child => node.children(),
        Axis::Descendant => {
            let mut acc = Vec::new();
            descendants(node, &mut acc);
            acc
        }
        Axis::DescendantOrSelf => {
            let mut acc = vec![node.clone()];
            descendants(node, &mut acc);
            acc
        }
        Axis::SelfAxis => vec![node.clone()],
        Axis::Parent => node.parent().into_iter().collect(),
        Axis::Ancestor => ancestors(node),
        Axis::AncestorOrSelf => {
            let mut acc = vec![node.clone()];
            acc.extend(ancestors(node));
            acc
        }
        Axis::FollowingSibling => following_siblings(node),
        Axis::PrecedingSibling => preceding_siblings(node),
        Axis::Following => following(node),
        Axis::Preceding => preceding(node),
        Axis::Attribute => node.attributes(),
        Axis::Namespace => node.namespaces(),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::value::node::{DocumentPosition, NodeKind};
    use crate::value::types::QName;

    struct Inner {
        name: &'static str,
        children: RefCell<Vec<Node>>,
        parent: RefCell<Option<Node>>,
        position: u64,
    }

    #[derive(Clone)]
    struct Node(Rc<Inner>);

    impl Node {
        fn leaf(name: &'static str, position: u64) -> Node {
            Node(Rc::new(Inner {
                name,
                children: RefCell::new(Vec::new()),
                parent: RefCell::new(None),
                position,
            }))
        }
    }

    impl XdmNode for Node {
        fn kind(&self) -> NodeKind {
            NodeKind::Element
        }
        fn expanded_name(&self) -> Option<QName> {
            Some(QName::no_namespace(self.0.name))
        }
        fn string_value(&self) -> String {
            String::new()
        }
        fn children(&self) -> Vec<Node> {
            self.0.children.borrow().clone()
        }
        fn attributes(&self) -> Vec<Node> {
            Vec::new()
        }
        fn namespaces(&self) -> Vec<Node> {
            Vec::new()
        }
        fn parent(&self) -> Option<Node> {
            self.0.parent.borrow().clone()
        }
        fn document_position(&self) -> DocumentPosition {
            DocumentPosition { document_id: 1, position: self.0.position }
        }
    }

    /// `<A><B1/><B2><C1/><C2/><C3/></B2></A>` — spec.md §8's worked tree.
    fn sample() -> (Node, Node, Vec<Node>) {
        let c = vec![Node::leaf("C1", 3), Node::leaf("C2", 4), Node::leaf("C3", 5)];
        let b2 = Node::leaf("B2", 2);
        *b2.0.children.borrow_mut() = c.clone();
        for child in &c {
            *child.0.parent.borrow_mut() = Some(b2.clone());
        }
        let b1 = Node::leaf("B1", 1);
        let a = Node::leaf("A", 0);
        *a.0.children.borrow_mut() = vec![b1.clone(), b2.clone()];
        *b1.0.parent.borrow_mut() = Some(a.clone());
        *b2.0.parent.borrow_mut() = Some(a.clone());
        (a, b2, c)
    }

    fn names(nodes: &[Node]) -> Vec<&'static str> {
        nodes.iter().map(|n| n.0.name).collect()
    }

    #[test]
    fn child_axis_is_document_ordered() {
        let (a, _, _) = sample();
        assert_eq!(names(&walk_axis(Axis::Child, &a)), vec!["B1", "B2"]);
    }

    #[test]
    fn descendant_axis_excludes_self_but_descendant_or_self_includes_it() {
        let (a, _, _) = sample();
        assert_eq!(names(&walk_axis(Axis::Descendant, &a)), vec!["B1", "B2", "C1", "C2", "C3"]);
        assert_eq!(names(&walk_axis(Axis::DescendantOrSelf, &a)), vec!["A", "B1", "B2", "C1", "C2", "C3"]);
    }

    #[test]
    fn following_sibling_and_preceding_sibling_from_c2() {
        let (_, _, c) = sample();
        let c2 = &c[1];
        assert_eq!(names(&walk_axis(Axis::FollowingSibling, c2)), vec!["C3"]);
        assert_eq!(names(&walk_axis(Axis::PrecedingSibling, c2)), vec!["C1"]);
    }

    #[test]
    fn ancestor_axis_is_reverse_document_order() {
        let (_, _, c) = sample();
        let c1 = &c[0];
        assert_eq!(names(&walk_axis(Axis::Ancestor, c1)), vec!["B2", "A"]);
    }

    #[test]
    fn following_axis_from_b1_reaches_into_b2_subtree() {
        let (a, _, _) = sample();
        let b1 = walk_axis(Axis::Child, &a).into_iter().next().unwrap();
        assert_eq!(names(&walk_axis(Axis::Following, &b1)), vec!["B2", "C1", "C2", "C3"]);
    }

    #[test]
    fn preceding_axis_from_c3_excludes_ancestors_but_reaches_earlier_subtrees() {
        let (_, _, c) = sample();
        let c3 = &c[2];
        assert_eq!(names(&walk_axis(Axis::Preceding, c3)), vec!["C2", "C1", "B1"]);
    }
}
