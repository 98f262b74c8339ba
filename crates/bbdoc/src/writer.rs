use html_escape::{encode_double_quoted_attribute, encode_text};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriterError {
    #[error("attribute `{0}` written outside of a start tag")]
    AttributeOutsideTag(String),
    #[error("closing `{found}` while `{expected}` is open")]
    MismatchedClose { expected: String, found: String },
    #[error("closing `{0}` with no open tag")]
    UnexpectedClose(String),
    #[error("`{0}` was never closed")]
    Unclosed(String),
}

/// Receives the html events produced by the renderer.
///
/// Attributes belong to the most recently opened (or void) tag and may only be written before
/// any text or further tags.
pub trait HtmlSink {
    fn open_tag(&mut self, name: &str) -> Result<(), WriterError>;
    fn attribute(&mut self, name: &str, value: &str) -> Result<(), WriterError>;
    fn text(&mut self, text: &str) -> Result<(), WriterError>;
    fn close_tag(&mut self, name: &str) -> Result<(), WriterError>;
    fn void_tag(&mut self, name: &str) -> Result<(), WriterError>;
}

/// String backed [HtmlSink]. Duplicate attributes keep the first value written.
#[derive(Debug, Default)]
pub struct HtmlWriter {
    buf: String,
    open: Vec<String>,
    // attribute names of the start tag that has not been terminated yet
    pending: Option<Vec<String>>,
}

impl HtmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn end_start_tag(&mut self) {
        if self.pending.take().is_some() {
            self.buf.push('>');
        }
    }

    fn start_tag(&mut self, name: &str) {
        self.end_start_tag();
        self.buf.push('<');
        self.buf.push_str(name);
        self.pending = Some(vec![]);
    }

    /// Returns the written html. Fails if any tag is still open.
    pub fn finish(mut self) -> Result<String, WriterError> {
        self.end_start_tag();
        match self.open.pop() {
            Some(name) => Err(WriterError::Unclosed(name)),
            None => Ok(self.buf),
        }
    }
}

impl HtmlSink for HtmlWriter {
    fn open_tag(&mut self, name: &str) -> Result<(), WriterError> {
        self.start_tag(name);
        self.open.push(name.to_string());
        Ok(())
    }

    fn attribute(&mut self, name: &str, value: &str) -> Result<(), WriterError> {
        let names = self
            .pending
            .as_mut()
            .ok_or_else(|| WriterError::AttributeOutsideTag(name.to_string()))?;

        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
            self.buf.push(' ');
            self.buf.push_str(name);
            self.buf.push_str("=\"");
            self.buf.push_str(&encode_double_quoted_attribute(value));
            self.buf.push('"');
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), WriterError> {
        self.end_start_tag();
        self.buf.push_str(&encode_text(text));
        Ok(())
    }

    fn close_tag(&mut self, name: &str) -> Result<(), WriterError> {
        self.end_start_tag();
        match self.open.pop() {
            Some(open) if open == name => {
                self.buf.push_str("</");
                self.buf.push_str(name);
                self.buf.push('>');
                Ok(())
            }
            Some(open) => Err(WriterError::MismatchedClose {
                expected: open,
                found: name.to_string(),
            }),
            None => Err(WriterError::UnexpectedClose(name.to_string())),
        }
    }

    fn void_tag(&mut self, name: &str) -> Result<(), WriterError> {
        self.start_tag(name);
        Ok(())
    }
}
