//! Error types for the droidc translator

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("Unresolved reference '{reference}': {message}")]
    UnresolvedReference { reference: String, message: String },

    #[error("Style error: {message}")]
    Style { message: String },

    #[error("No element rule matches <{tag}> in {file}")]
    NoElementRule { file: String, tag: String },

    #[error("Rule error in {origin}: {message}")]
    Rule { origin: String, message: String },

    #[error("Layout error in {file}: {message}")]
    Layout { file: String, message: String },

    #[error("{file}: <{tag}>{}: {source}", attribute_suffix(.attribute))]
    Context {
        file: String,
        tag: String,
        attribute: Option<String>,
        #[source]
        source: Box<TranslateError>,
    },

    #[error("Code generation error: {message}")]
    CodeGen { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },
}

pub type Result<T> = std::result::Result<T, TranslateError>;

fn attribute_suffix(attribute: &Option<String>) -> String {
    attribute.as_ref().map(|a| format!(" {a}")).unwrap_or_default()
}

impl TranslateError {
    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn unresolved(reference: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            reference: reference.into(),
            message: message.into(),
        }
    }

    pub fn style(message: impl Into<String>) -> Self {
        Self::Style {
            message: message.into(),
        }
    }

    pub fn rule(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rule {
            origin: origin.into(),
            message: message.into(),
        }
    }

    pub fn layout(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Layout {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn codegen(message: impl Into<String>) -> Self {
        Self::CodeGen {
            message: message.into(),
        }
    }

    /// Attach the element (and optionally attribute) being translated.
    ///
    /// Errors that already carry context are passed through so the innermost
    /// element stays the one reported.
    pub fn within(self, file: &str, tag: &str, attribute: Option<&str>) -> Self {
        match self {
            Self::Context { .. } | Self::NoElementRule { .. } => self,
            other => Self::Context {
                file: file.to_string(),
                tag: tag.to_string(),
                attribute: attribute.map(str::to_string),
                source: Box::new(other),
            },
        }
    }

    /// True for the failures that abort a single layout file but leave the
    /// rest of the project translatable.
    pub fn is_file_local(&self) -> bool {
        !matches!(self, Self::Rule { .. } | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_wraps_once() {
        let err = TranslateError::unresolved("@color/missing", "no such color")
            .within("main.xml", "TextView", Some("android:textColor"))
            .within("main.xml", "LinearLayout", None);

        let message = err.to_string();
        assert!(message.contains("<TextView>"));
        assert!(message.contains("android:textColor"));
        assert!(!message.contains("LinearLayout"));
    }

    #[test]
    fn test_file_local_classification() {
        assert!(TranslateError::layout("a.xml", "missing anchor").is_file_local());
        assert!(!TranslateError::rule("rules.toml", "bad document").is_file_local());
    }
}
