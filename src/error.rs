//! Error handling for reading and writing XML documents
use crate::eval::EvalError;
use std::path::PathBuf;

/// A result type for XML operations, which can be either a successful value or an error.
pub type XmlResult<T> = std::result::Result<T, XmlError>;

/// An error that occurred while reading, writing or querying a document.
#[derive(Debug)]
pub struct XmlError {
    /// The context of the error
    pub context: Box<ErrorContext>,

    /// The kind of error that occurred
    pub kind: XmlErrorKind,
}
impl XmlError {
    /// Creates a new `XmlError`
    #[must_use]
    pub fn new(kind: XmlErrorKind, context: ErrorContext) -> Self {
        Self {
            context: Box::new(context),
            kind,
        }
    }

    /// Adds a path to the error context.
    #[must_use]
    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.context.path = Some(path);
        self
    }

    /// Returns the 1-based line of the error, or 0 if the error has no source location.
    #[must_use]
    pub fn line(&self) -> usize {
        self.context.line
    }
}
impl std::fmt::Display for XmlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.context)?;

        for line in self.kind.to_string().lines() {
            writeln!(f, "= {line}")?;
        }
        Ok(())
    }
}
impl std::error::Error for XmlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}
impl From<XmlErrorKind> for XmlError {
    fn from(kind: XmlErrorKind) -> Self {
        Self::new(kind, ErrorContext::default())
    }
}
impl From<std::io::Error> for XmlError {
    fn from(err: std::io::Error) -> Self {
        XmlErrorKind::Io(err).into()
    }
}
impl From<EvalError> for XmlError {
    fn from(err: EvalError) -> Self {
        XmlErrorKind::Evaluate(err).into()
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum XmlErrorKind {
    /// The `<?xml` declaration has no `version` attribute
    #[error("The <?xml> declaration has no version")]
    NoVersion,

    /// The `<?xml` declaration names an encoding other than UTF-8
    #[error("Encoding other than UTF-8: {0}")]
    UnsupportedEncoding(String),

    /// The `<?xml` declaration is not closed with `?>`
    #[error("The <?xml> declaration is not terminated")]
    UnterminatedDeclaration,

    /// A tag has no name, or its opening tag is not closed with `>` or `/>`
    #[error("Invalid tag")]
    InvalidTag,

    /// A closing tag has no name or is not closed with `>`
    #[error("Invalid closing tag")]
    InvalidClosingTag,

    /// A closing tag names a different entity than the one it closes
    #[error("Closing tag does not match opening tag: expected </{open}>, found </{close}>")]
    MismatchedTag {
        /// Name of the open entity
        open: String,

        /// Name found in the closing tag
        close: String,
    },

    /// The input ended, or could not be read further, before the entity was closed
    #[error("No closing tag for <{0}>")]
    NoClosingTag(String),

    /// Entities are nested deeper than the reader allows
    #[error("Entities are nested deeper than {0} levels")]
    TooDeep(usize),

    /// No root entity was found in the input
    #[error("No root entity")]
    NoRootEntity,

    /// An attribute name is not followed by `=`
    #[error("No Assignment")]
    NoAssignment,

    /// An attribute assignment is not followed by a quoted value
    #[error("No Value")]
    NoValue,

    /// An attribute value is missing its closing quote
    #[error("Open String")]
    OpenString,

    /// An attribute name occurs twice on the same tag
    #[error("Duplicate Attribute: {0}")]
    DuplicateAttribute(String),

    /// The input is not valid UTF-8
    #[error("Input is not valid UTF-8")]
    InvalidUtf8,

    /// The document has no root entity to write
    #[error("Document has no root entity")]
    NoRoot,

    /// An attribute value could not be evaluated as a number
    #[error("Cannot evaluate attribute: {0}")]
    Evaluate(#[from] EvalError),

    /// IO error occurred while reading or writing a file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Context describing the error location in the source text.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The path to the file that was read or written, if available.
    pub path: Option<PathBuf>,

    /// 1-based line of the error; 0 when the error has no source location.
    pub line: usize,

    /// 1-based column (in characters) of the error; 0 when the error has no source location.
    pub column: usize,

    /// The source line containing the error.
    pub snippet: String,
}
impl ErrorContext {
    /// Creates a new `ErrorContext` pointing at byte offset `offset` of `source`.
    #[must_use]
    pub fn new(source: &str, offset: usize) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }

        let (line, column) = position_in_text(offset, source);
        let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
        let snippet = source[line_start..]
            .split('\n')
            .next()
            .unwrap_or_default()
            .trim_end_matches('\r')
            .to_string();

        Self {
            path: None,
            line,
            column,
            snippet,
        }
    }

    /// Returns the line and column of the error in the source text.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }
}
impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path = self.path.as_ref().map(|p| p.display());

        if !self.snippet.is_empty() {
            writeln!(f, "| {}", self.snippet)?;
        }

        if self.line > 0 {
            write!(f, "= At ")?;

            if let Some(path) = path {
                write!(f, "{path}:")?;
            }

            writeln!(f, "{}:{}", self.line, self.column)?;
        } else if let Some(path) = path {
            writeln!(f, "= In {path}")?;
        }
        Ok(())
    }
}

/// Calculates the 1-based line and column of byte offset `start` in `source`.
///
/// Warning: This is an expensive operation, and should be used for error reporting only.
pub(crate) fn position_in_text(start: usize, source: &str) -> (usize, usize) {
    let mut row = 1;
    let mut col = 1;
    for (i, c) in source.char_indices() {
        if i >= start {
            break;
        }
        if c == '\n' {
            row += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (row, col)
}
