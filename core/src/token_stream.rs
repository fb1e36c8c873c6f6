//! Single-token-lookahead stream over raw argument tokens.

/// Lazily pulled token sequence with one token of lookahead.
///
/// Exhaustion is `None`, never an empty string.
///
/// # Examples
///
/// ```
/// use argkit_core::TokenStream;
///
/// let mut stream = TokenStream::new(["-v".to_string(), String::new()]);
/// assert_eq!(stream.peek(), Some("-v"));
/// assert_eq!(stream.peek(), Some("-v"));
/// assert_eq!(stream.consume().as_deref(), Some("-v"));
/// assert_eq!(stream.consume().as_deref(), Some(""));
/// assert_eq!(stream.peek(), None);
/// assert_eq!(stream.consume(), None);
/// ```
#[derive(Debug)]
pub struct TokenStream<I: Iterator<Item = String>> {
    tokens: I,
    buffer: Option<String>,
}

impl<I: Iterator<Item = String>> TokenStream<I> {
    pub fn new(tokens: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            tokens: tokens.into_iter(),
            buffer: None,
        }
    }

    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> Option<&str> {
        if self.buffer.is_none() {
            self.buffer = self.tokens.next();
        }
        self.buffer.as_deref()
    }

    /// Returns and discards the next token.
    pub fn consume(&mut self) -> Option<String> {
        self.buffer.take().or_else(|| self.tokens.next())
    }
}

impl<I: Iterator<Item = String>> Iterator for TokenStream<I> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.consume()
    }
}
