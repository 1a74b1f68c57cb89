//! The unified AST node (spec §3 "AST node", §9 "AST = token tree"). Every
//! XPath construct — operator, axis step, control structure, literal — is a
//! variant of one `Ast` enum rather than a family of `dyn Trait` node types;
//! dialect parsers only ever *produce* variants via registry lookup, never
//! via inheritance (spec §9).
//!
//! Grounded on the shape of the teacher's `construct::tree::AST`
//! (`Base`/`Sugar`/`Lambda` wrapping one tree with a span on every node),
//! collapsed into a single flat enum since XPath's grammar, unlike
//! Passerine's macro-extensible surface syntax, is closed.

use crate::common::Spanned;
use crate::lexer::NameToken;
use crate::value::types::{AtomicTypeTag, SequenceType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    SelfAxis,
    Parent,
    Ancestor,
    AncestorOrSelf,
    FollowingSibling,
    PrecedingSibling,
    Following,
    Preceding,
    Attribute,
    Namespace,
}

impl Axis {
    /// The axis's principal node kind (spec §4.3), used by a bare-name node
    /// test on that axis.
    pub fn principal_kind(&self) -> crate::value::node::NodeKind {
        use crate::value::node::NodeKind;
        match self {
            Axis::Attribute => NodeKind::Attribute,
            Axis::Namespace => NodeKind::Namespace,
            _ => NodeKind::Element,
        }
    }

    /// Whether this axis walks toward the document root (used to decide
    /// whether a path step's output needs reverse-document-order handling
    /// before the final dedup-and-sort).
    pub fn is_reverse(&self) -> bool {
        matches!(self, Axis::Ancestor | Axis::AncestorOrSelf | Axis::Preceding | Axis::PrecedingSibling | Axis::Parent)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KindTest {
    AnyKind,
    Document(Option<Box<NodeTest>>),
    Element(Option<NameToken>),
    Attribute(Option<NameToken>),
    SchemaElement(NameToken),
    SchemaAttribute(NameToken),
    Text,
    Comment,
    ProcessingInstruction(Option<String>),
    NamespaceNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeTest {
    Name(NameToken),
    Kind(KindTest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    IDiv,
    Mod,
    GeneralEq,
    GeneralNe,
    GeneralLt,
    GeneralLe,
    GeneralGt,
    GeneralGe,
    ValueEq,
    ValueNe,
    ValueLt,
    ValueLe,
    ValueGt,
    ValueGe,
    Is,
    Precedes,
    Follows,
    Union,
    Intersect,
    Except,
    And,
    Or,
    Concat,
    SimpleMap,
    /// `/` path join; `double` distinguishes `//` (descendant-or-self
    /// insertion) from plain `/`.
    Path { double: bool },
    Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantKind {
    Some,
    Every,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupKey {
    Name(NameToken),
    Integer(i64),
    Wildcard,
    Expr(Box<Spanned<Ast>>),
}

/// The single XPath AST node type (spec §3, §9).
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    IntegerLit(i64),
    DecimalLit(f64),
    DoubleLit(f64),
    StringLit(String),
    /// `.`
    ContextItem,
    /// The document root implied by a leading `/` (evaluated relative to
    /// the context item's owner document).
    Root,
    VarRef(NameToken),
    Step { axis: Axis, test: NodeTest, predicates: Vec<Spanned<Ast>> },
    /// A postfix `[...]` applied to any primary expression, not just a step
    /// (2.0+ `FilterExpr`), e.g. `(1 to 10)[. mod 2 = 0]`.
    Predicate { base: Box<Spanned<Ast>>, predicate: Box<Spanned<Ast>> },
    Binary { op: BinOp, lhs: Box<Spanned<Ast>>, rhs: Box<Spanned<Ast>> },
    Unary { op: UnOp, operand: Box<Spanned<Ast>> },
    FunctionCall { name: NameToken, args: Vec<Spanned<Ast>> },
    NamedFunctionRef { name: NameToken, arity: usize },
    InlineFunction {
        params: Vec<(NameToken, Option<SequenceType>)>,
        return_type: Option<SequenceType>,
        body: Box<Spanned<Ast>>,
    },
    DynamicCall { callee: Box<Spanned<Ast>>, args: Vec<Spanned<Ast>> },
    If { cond: Box<Spanned<Ast>>, then_branch: Box<Spanned<Ast>>, else_branch: Box<Spanned<Ast>> },
    ForBinding { bindings: Vec<(NameToken, Spanned<Ast>)>, body: Box<Spanned<Ast>> },
    LetBinding { bindings: Vec<(NameToken, Spanned<Ast>)>, body: Box<Spanned<Ast>> },
    Quantified { kind: QuantKind, bindings: Vec<(NameToken, Spanned<Ast>)>, predicate: Box<Spanned<Ast>> },
    InstanceOf { operand: Box<Spanned<Ast>>, seq_type: SequenceType },
    TreatAs { operand: Box<Spanned<Ast>>, seq_type: SequenceType },
    CastAs { operand: Box<Spanned<Ast>>, target: AtomicTypeTag, optional: bool },
    CastableAs { operand: Box<Spanned<Ast>>, target: AtomicTypeTag, optional: bool },
    Sequence(Vec<Spanned<Ast>>),
    MapConstructor(Vec<(Spanned<Ast>, Spanned<Ast>)>),
    /// `[e1, e2, ...]` (3.1 square array constructor): one member per listed
    /// expression, each member itself a sequence.
    ArrayConstructor(Vec<Spanned<Ast>>),
    /// `array { expr }` (3.1 curly array constructor): one member *per item*
    /// of evaluating `expr`, unlike the square form's one-member-per-operand
    /// (spec §4.6 "Maps and arrays").
    CurlyArrayConstructor(Box<Spanned<Ast>>),
    Lookup { base: Box<Spanned<Ast>>, key: LookupKey },
    /// `E => f(args)`; `call` is a `FunctionCall`/`NamedFunctionRef`/
    /// `DynamicCall` node whose argument list gets `operand` prepended at
    /// evaluation time.
    Arrow { operand: Box<Spanned<Ast>>, call: Box<Spanned<Ast>> },
}
