use std::borrow::Cow;

use super::Parameters;
use crate::error::ParseError;

/// A positioned reader over a single header value.
///
/// The reader exposes the primitives needed to parse media types: whitespace skipping, token
/// reading, separator consumption and parameter list parsing. Every primitive skips leading
/// linear whitespace before it looks at the input.
///
/// # Examples
/// ```
/// use quality_source::header::HeaderReader;
///
/// let mut reader = HeaderReader::new("text/html; charset=utf-8");
/// assert_eq!(reader.next_token().unwrap(), "text");
/// reader.next_separator(b'/').unwrap();
/// assert_eq!(reader.next_token().unwrap(), "html");
///
/// let params = reader.read_parameters().unwrap();
/// assert_eq!(params.get("charset"), Some("utf-8"));
/// assert!(!reader.has_next());
/// ```
#[derive(Debug, Clone)]
pub struct HeaderReader<'a> {
    header: &'a str,
    pos: usize,
}

impl<'a> HeaderReader<'a> {
    /// Constructs a reader positioned at the start of `header`.
    pub fn new(header: &'a str) -> Self {
        HeaderReader { header, pos: 0 }
    }

    /// Current byte offset into the header value.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Skips whitespace and returns `true` if any content remains.
    ///
    /// Never fails; on an exhausted reader it simply returns `false`.
    pub fn has_next(&mut self) -> bool {
        self.skip_whitespace();
        self.pos < self.header.len()
    }

    /// Returns `true` if the next non-whitespace byte is `separator`. Does not consume it.
    pub fn has_next_separator(&mut self, separator: u8) -> bool {
        self.skip_whitespace();
        self.peek() == Some(separator)
    }

    /// Reads a token (RFC 7230 `tchar` run).
    pub fn next_token(&mut self) -> Result<&'a str, ParseError> {
        self.skip_whitespace();

        if self.pos >= self.header.len() {
            return Err(ParseError::Incomplete);
        }

        let start = self.pos;
        let len = self.header.as_bytes()[start..]
            .iter()
            .take_while(|&&b| is_token_char(b))
            .count();

        if len == 0 {
            return Err(ParseError::Token { position: start });
        }

        self.pos += len;
        Ok(&self.header[start..self.pos])
    }

    /// Consumes `separator` or fails.
    pub fn next_separator(&mut self, separator: u8) -> Result<(), ParseError> {
        self.skip_whitespace();

        match self.peek() {
            None => Err(ParseError::Incomplete),
            Some(b) if b == separator => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(ParseError::Separator {
                expected: separator as char,
                position: self.pos,
            }),
        }
    }

    /// Reads either a token or a quoted string.
    ///
    /// Quoted strings are returned without their surrounding quotes and with quoted-pairs
    /// unescaped; only values that contained escapes are allocated.
    pub fn next_token_or_quoted_string(&mut self) -> Result<Cow<'a, str>, ParseError> {
        self.skip_whitespace();

        match self.peek() {
            None => Err(ParseError::Incomplete),
            Some(b'"') => self.next_quoted_string(),
            Some(_) => self.next_token().map(Cow::Borrowed),
        }
    }

    /// Reads a `*( ";" name "=" value )` parameter list.
    ///
    /// Empty parameters (`;;` or a trailing `;`) are skipped. Parameter names are lowercased.
    /// Reading stops, without consuming it, at a `,` list delimiter.
    pub fn read_parameters(&mut self) -> Result<Parameters, ParseError> {
        let mut params = Parameters::new();

        while self.has_next() && !self.has_next_separator(b',') {
            self.next_separator(b';')?;

            while self.has_next_separator(b';') {
                self.pos += 1;
            }

            if !self.has_next() || self.has_next_separator(b',') {
                break;
            }

            let name = self.next_token()?;
            self.next_separator(b'=')?;
            let value = self.next_token_or_quoted_string()?;

            params.insert(name, value.into_owned());
        }

        Ok(params)
    }

    fn next_quoted_string(&mut self) -> Result<Cow<'a, str>, ParseError> {
        let start = self.pos;
        let rest = &self.header[start + 1..];

        // allocated only once the first quoted-pair is seen
        let mut unescaped: Option<String> = None;
        let mut chars = rest.char_indices();

        while let Some((idx, ch)) = chars.next() {
            match ch {
                '"' => {
                    self.pos = start + 1 + idx + 1;
                    return Ok(match unescaped {
                        Some(buf) => Cow::Owned(buf),
                        None => Cow::Borrowed(&rest[..idx]),
                    });
                }

                '\\' => {
                    let buf = unescaped.get_or_insert_with(|| rest[..idx].to_owned());
                    match chars.next() {
                        Some((_, escaped)) => buf.push(escaped),
                        None => break,
                    }
                }

                '\r' | '\n' => break,

                ch => {
                    if let Some(buf) = unescaped.as_mut() {
                        buf.push(ch);
                    }
                }
            }
        }

        Err(ParseError::QuotedString { position: start })
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.header.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.pos += 1;
        }
    }
}

/// token = 1*tchar
///
/// tchar = "!" / "#" / "$" / "%" / "&" / "'" / "*" / "+" / "-" / "." / "^" / "_" / "`" / "|" /
///         "~" / DIGIT / ALPHA
#[inline]
pub(crate) fn is_token_char(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

/// Returns `true` if `s` is a non-empty token and can be written without quoting.
pub(crate) fn is_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_token_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_next_skips_whitespace() {
        let mut reader = HeaderReader::new("  \t ");
        assert!(!reader.has_next());
        assert_eq!(reader.position(), 4);

        let mut reader = HeaderReader::new("");
        assert!(!reader.has_next());

        let mut reader = HeaderReader::new("  a");
        assert!(reader.has_next());
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn tokens() {
        let mut reader = HeaderReader::new("application/vnd.api+json");
        assert_eq!(reader.next_token().unwrap(), "application");
        assert!(reader.has_next_separator(b'/'));
        reader.next_separator(b'/').unwrap();
        assert_eq!(reader.next_token().unwrap(), "vnd.api+json");
        assert_eq!(reader.next_token(), Err(ParseError::Incomplete));
    }

    #[test]
    fn token_errors() {
        let mut reader = HeaderReader::new("/json");
        assert_eq!(reader.next_token(), Err(ParseError::Token { position: 0 }));

        let mut reader = HeaderReader::new("text;");
        reader.next_token().unwrap();
        assert_eq!(
            reader.next_separator(b'/'),
            Err(ParseError::Separator {
                expected: '/',
                position: 4
            })
        );

        let mut reader = HeaderReader::new("text");
        reader.next_token().unwrap();
        assert_eq!(reader.next_separator(b'/'), Err(ParseError::Incomplete));
    }

    #[test]
    fn quoted_strings() {
        let mut reader = HeaderReader::new(r#""hello world""#);
        let value = reader.next_token_or_quoted_string().unwrap();
        assert_eq!(value, "hello world");
        assert!(matches!(value, Cow::Borrowed(_)));
        assert!(!reader.has_next());

        let mut reader = HeaderReader::new(r#""a \"b\" \\c" ;"#);
        let value = reader.next_token_or_quoted_string().unwrap();
        assert_eq!(value, r#"a "b" \c"#);
        assert!(matches!(value, Cow::Owned(_)));
        assert!(reader.has_next_separator(b';'));

        let mut reader = HeaderReader::new("\"ünïcode\"");
        assert_eq!(reader.next_token_or_quoted_string().unwrap(), "ünïcode");

        let mut reader = HeaderReader::new(" \"unterminated");
        assert_eq!(
            reader.next_token_or_quoted_string(),
            Err(ParseError::QuotedString { position: 1 })
        );

        let mut reader = HeaderReader::new("\"dangling\\");
        assert_eq!(
            reader.next_token_or_quoted_string(),
            Err(ParseError::QuotedString { position: 0 })
        );
    }

    #[test]
    fn parameters() {
        let mut reader = HeaderReader::new("; Charset=utf-8 ;qs=\"0.5\"");
        let params = reader.read_parameters().unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("charset"), Some("utf-8"));
        assert_eq!(params.get("qs"), Some("0.5"));
    }

    #[test]
    fn empty_parameters_are_skipped() {
        let mut reader = HeaderReader::new(";;a=1;;;b=2;");
        let params = reader.read_parameters().unwrap();
        assert_eq!(params.get("a"), Some("1"));
        assert_eq!(params.get("b"), Some("2"));
        assert!(!reader.has_next());

        let mut reader = HeaderReader::new("");
        assert!(reader.read_parameters().unwrap().is_empty());
    }

    #[test]
    fn parameters_stop_at_list_delimiter() {
        let mut reader = HeaderReader::new(";a=1, text/plain");
        let params = reader.read_parameters().unwrap();
        assert_eq!(params.get("a"), Some("1"));
        assert!(reader.has_next_separator(b','));
    }

    #[test]
    fn malformed_parameters() {
        let mut reader = HeaderReader::new("a=1");
        assert_eq!(
            reader.read_parameters(),
            Err(ParseError::Separator {
                expected: ';',
                position: 0
            })
        );

        let mut reader = HeaderReader::new(";a");
        assert_eq!(reader.read_parameters(), Err(ParseError::Incomplete));

        let mut reader = HeaderReader::new(";a=");
        assert_eq!(reader.read_parameters(), Err(ParseError::Incomplete));

        let mut reader = HeaderReader::new(";a b");
        assert_eq!(
            reader.read_parameters(),
            Err(ParseError::Separator {
                expected: '=',
                position: 3
            })
        );
    }

    #[test]
    fn token_detection() {
        assert!(is_token("utf-8"));
        assert!(is_token("0.5"));
        assert!(!is_token(""));
        assert!(!is_token("a b"));
        assert!(!is_token("a;b"));
    }
}
