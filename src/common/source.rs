use std::rc::Rc;

/// The text of one XPath expression being compiled, plus an optional name
/// (e.g. the attribute or stylesheet location it was read from) used purely
/// for diagnostics.
///
/// Mirrors the role of a compiler's `Source`: XPath has no notion of a
/// multi-file module, so unlike a general-purpose language source this is
/// always a single expression string.
#[derive(Debug, PartialEq, Eq)]
pub struct Source {
    pub contents: String,
    pub name: String,
}

impl Source {
    /// Wraps an XPath expression string with a name for diagnostics.
    pub fn named(contents: &str, name: &str) -> Rc<Source> {
        Rc::new(Source {
            contents: contents.to_string(),
            name: name.to_string(),
        })
    }

    /// Wraps an XPath expression string; the source has no name of its own.
    pub fn expr(contents: &str) -> Rc<Source> {
        Source::named(contents, "<xpath>")
    }
}
