//! Error types for media type and quality source parsing.

use derive_more::{Display, Error, From};

/// A set of errors that can occur while validating a quality source (`qs`) weight.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[non_exhaustive]
pub enum QualitySourceError {
    /// The `qs` value is not a decimal number, such as `qs=abc`.
    #[display("the quality source (qs) value, {_0}, is not a valid value")]
    InvalidFormat(#[error(not(source))] String),

    /// The `qs` value is a number but scales to a negative weight, such as `qs=-0.1`.
    #[display("the quality source (qs) value, {_0}, must be non-negative number")]
    Negative(#[error(not(source))] String),
}

impl QualitySourceError {
    /// Returns the literal that failed validation.
    pub fn literal(&self) -> &str {
        match self {
            QualitySourceError::InvalidFormat(lit) | QualitySourceError::Negative(lit) => lit,
        }
    }
}

/// A set of errors that can occur while reading a media type from a header value.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
#[non_exhaustive]
pub enum ParseError {
    /// The header ended while more content was expected.
    #[display("unexpected end of header")]
    Incomplete,

    /// A token was expected but a non-token character was found.
    #[display("expected token at position {position}")]
    Token { position: usize },

    /// A specific separator was expected but something else was found.
    #[display("expected separator '{expected}' at position {position}")]
    Separator { expected: char, position: usize },

    /// A quoted string was not terminated before the end of the header.
    #[display("unterminated quoted string starting at position {position}")]
    QuotedString { position: usize },

    /// Content remained after a complete media type was read.
    #[display("unexpected content at position {position}")]
    TrailingContent { position: usize },

    /// The media type is well-formed but its `qs` parameter is not.
    #[display("{_0}")]
    #[from]
    QualitySource(QualitySourceError),
}

impl ParseError {
    /// Returns `true` if this error was raised by the header reader rather than by weight
    /// validation.
    pub fn is_structural(&self) -> bool {
        !matches!(self, ParseError::QualitySource(_))
    }

    /// Returns the weight validation error, if this is one.
    pub fn quality_source(&self) -> Option<&QualitySourceError> {
        match self {
            ParseError::QualitySource(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_source_error_display() {
        let err = QualitySourceError::InvalidFormat("abc".to_owned());
        assert_eq!(
            err.to_string(),
            "the quality source (qs) value, abc, is not a valid value"
        );
        assert_eq!(err.literal(), "abc");

        let err = QualitySourceError::Negative("-0.1".to_owned());
        assert_eq!(
            err.to_string(),
            "the quality source (qs) value, -0.1, must be non-negative number"
        );
        assert_eq!(err.literal(), "-0.1");
    }

    #[test]
    fn parse_error_display() {
        assert_eq!(ParseError::Incomplete.to_string(), "unexpected end of header");
        assert_eq!(
            ParseError::Separator {
                expected: '/',
                position: 4
            }
            .to_string(),
            "expected separator '/' at position 4"
        );
        assert_eq!(
            ParseError::Token { position: 0 }.to_string(),
            "expected token at position 0"
        );
    }

    #[test]
    fn structural_classification() {
        assert!(ParseError::Incomplete.is_structural());
        assert!(ParseError::TrailingContent { position: 3 }.is_structural());

        let err = ParseError::from(QualitySourceError::Negative("-1".to_owned()));
        assert!(!err.is_structural());
        assert_eq!(
            err.quality_source(),
            Some(&QualitySourceError::Negative("-1".to_owned()))
        );
    }
}
