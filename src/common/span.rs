use std::fmt::{self, Display, Formatter};
use std::rc::Rc;

use crate::common::source::Source;

/// A `Span` refers to a byte range of an expression's [`Source`], used to
/// anchor diagnostics to the offending token.
///
/// Spans carry a reference to their source rather than a substring so they
/// can't be mismatched against the wrong expression when errors are combined
/// across parse and evaluation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Span {
    source: Option<Rc<Source>>,
    offset: usize,
    length: usize,
}

impl Span {
    /// Creates a new `Span` from a byte offset and length into `source`.
    pub fn new(source: &Rc<Source>, offset: usize, length: usize) -> Span {
        Span { source: Some(Rc::clone(source)), offset, length }
    }

    /// A `Span` pointing at a single byte, used when no better range is known.
    pub fn point(source: &Rc<Source>, offset: usize) -> Span {
        Span { source: Some(Rc::clone(source)), offset, length: 1 }
    }

    /// An empty span with no source. Combining it with any other span
    /// yields that other span unchanged.
    pub fn empty() -> Span {
        Span { source: None, offset: 0, length: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_none()
    }

    /// The smallest span covering both `a` and `b`.
    pub fn combine(a: &Span, b: &Span) -> Span {
        if a.is_empty() {
            return b.clone();
        }
        if b.is_empty() {
            return a.clone();
        }

        if a.source != b.source {
            panic!("can not combine spans from two different sources");
        }

        let offset = a.offset.min(b.offset);
        let end = (a.offset + a.length).max(b.offset + b.length);
        Span::new(a.source.as_ref().unwrap(), offset, end - offset)
    }

    /// Fold-left over [`Span::combine`].
    pub fn join(spans: &[Span]) -> Span {
        spans.iter().fold(Span::empty(), |acc, s| Span::combine(&acc, s))
    }

    /// The literal text this span covers.
    pub fn contents(&self) -> &str {
        let source = self.source.as_ref().expect("empty span has no contents");
        &source.contents[self.offset..self.offset + self.length]
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Display for Span {
    /// Renders a single-line caret underline beneath the offending text,
    /// e.g.:
    /// ```plain
    /// /A/B2/*[@id = ]
    ///               ^
    /// ```
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "<no location>");
        }
        let source = self.source.as_ref().unwrap();
        writeln!(f, "{}", source.contents)?;
        write!(f, "{}{}", " ".repeat(self.offset), "^".repeat(self.length.max(1)))
    }
}

/// Pairs an item with the [`Span`] of source text it was produced from.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub item: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(item: T, span: Span) -> Spanned<T> {
        Spanned { item, span }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned { item: f(self.item), span: self.span }
    }

    pub fn as_ref(&self) -> Spanned<&T> {
        Spanned { item: &self.item, span: self.span.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combination() {
        let source = Source::expr("1 + 23 = x");
        let a = Span::new(&source, 0, 5);
        let b = Span::new(&source, 9, 1);
        assert_eq!(Span::combine(&a, &b), Span::new(&source, 0, 10));
    }

    #[test]
    fn empty_combine_is_identity() {
        let source = Source::expr("1 to 5");
        let a = Span::new(&source, 0, 1);
        assert_eq!(Span::combine(&Span::empty(), &a), a);
        assert_eq!(Span::combine(&a, &Span::empty()), a);
    }

    #[test]
    fn join_many() {
        let source = Source::expr("a/b/c");
        let spans = vec![
            Span::new(&source, 0, 1),
            Span::new(&source, 2, 1),
            Span::new(&source, 4, 1),
        ];
        assert_eq!(Span::join(&spans), Span::new(&source, 0, 5));
    }
}
