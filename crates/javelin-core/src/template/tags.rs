//! Pluggable custom template tags.
//!
//! A tag is recognized in template text either by its literal prefix token
//! (`:programref:CONSTRUCTOR:app.Main:()V`) or by one of its aliases used as
//! the kind itself (`CONSTRUCTOR:app.Main:()V`). Alias matching is
//! case-sensitive. A tag renders by writing directly into the output buffer;
//! it produces no value usable elsewhere in the template.

use crate::error::Result;

/// Handler for one custom tag.
pub trait TagHandler {
    /// Literal prefix token, e.g. `:programref:`.
    fn token(&self) -> &str;

    /// Recognized kind aliases, matched case-sensitively in template text.
    fn aliases(&self) -> &[&'static str];

    /// Render the invocation into the output buffer.
    ///
    /// `kind` is the matched alias (or the first payload segment when the
    /// prefix-token form was used); `payload` is the remaining colon-joined
    /// text.
    fn render(&self, kind: &str, payload: &str, out: &mut String) -> Result<()>;
}

/// Registry of custom tags, fixed at renderer construction.
///
/// Handlers may borrow the program model, so the registry carries their
/// lifetime.
#[derive(Default)]
pub struct TagSet<'h> {
    handlers: Vec<Box<dyn TagHandler + 'h>>,
}

impl<'h> TagSet<'h> {
    /// An empty registry: only the built-in syntax is recognized.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Box<dyn TagHandler + 'h>) {
        self.handlers.push(handler);
    }

    pub fn with(mut self, handler: Box<dyn TagHandler + 'h>) -> Self {
        self.register(handler);
        self
    }

    pub(crate) fn handlers(&self) -> &[Box<dyn TagHandler + 'h>] {
        &self.handlers
    }

    pub(crate) fn handler(&self, index: usize) -> &dyn TagHandler {
        self.handlers[index].as_ref()
    }
}
