use std::{
    fmt,
    hash::{Hash, Hasher},
    str,
};

use super::Parameters;
use crate::{error::ParseError, header::HeaderReader};

/// Read access to anything shaped like a media type.
///
/// This is the seam between generic negotiation code and [`QualitySourceMediaType`]: ranking code
/// accepts any `AsMediaType` and asks [`carried_quality_source`] whether a weight was already
/// parsed before falling back to reading the `qs` parameter.
///
/// [`QualitySourceMediaType`]: super::QualitySourceMediaType
/// [`carried_quality_source`]: AsMediaType::carried_quality_source
pub trait AsMediaType {
    /// Primary type, e.g. `application`.
    fn type_(&self) -> &str;

    /// Subtype, e.g. `json`.
    fn subtype(&self) -> &str;

    /// Looks up a parameter value by case-insensitive name.
    fn parameter(&self, name: &str) -> Option<&str>;

    /// Copies all parameters into an owned map.
    fn to_parameters(&self) -> Parameters;

    /// The pre-parsed quality source weight, if this value carries one.
    fn carried_quality_source(&self) -> Option<u32> {
        None
    }
}

/// A media type: type, subtype and parameters, without any weight semantics.
///
/// Type and subtype are kept as written but compared (and hashed) ASCII-case-insensitively.
///
/// # Examples
/// ```
/// use quality_source::header::MediaType;
///
/// let mt: MediaType = "Text/HTML; charset=utf-8".parse().unwrap();
/// assert_eq!(mt.type_(), "Text");
/// assert_eq!(mt, MediaType::new("text", "html").with_parameter("charset", "utf-8"));
/// assert_eq!(mt.to_string(), "Text/HTML;charset=utf-8");
/// ```
#[derive(Debug, Clone)]
pub struct MediaType {
    type_: String,
    subtype: String,
    parameters: Parameters,
}

impl MediaType {
    /// Constructs a media type with no parameters.
    pub fn new(type_: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self::with_parameters(type_, subtype, Parameters::new())
    }

    /// Constructs a media type with the given parameters.
    pub fn with_parameters(
        type_: impl Into<String>,
        subtype: impl Into<String>,
        parameters: Parameters,
    ) -> Self {
        MediaType {
            type_: type_.into(),
            subtype: subtype.into(),
            parameters,
        }
    }

    /// Returns this media type with an additional parameter.
    pub fn with_parameter(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.parameters.insert(name, value);
        self
    }

    pub fn type_(&self) -> &str {
        &self.type_
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Reads `type "/" subtype *( ";" parameter )` from `reader`.
    ///
    /// Errors from the reader are returned unchanged.
    pub fn parse(reader: &mut HeaderReader<'_>) -> Result<Self, ParseError> {
        // exhausted input is left for `next_token` to report
        reader.has_next();

        let type_ = reader.next_token()?;
        reader.next_separator(b'/')?;
        let subtype = reader.next_token()?;

        let parameters = if reader.has_next() {
            reader.read_parameters()?
        } else {
            Parameters::new()
        };

        Ok(MediaType::with_parameters(type_, subtype, parameters))
    }

    pub(crate) fn into_parts(self) -> (String, String, Parameters) {
        (self.type_, self.subtype, self.parameters)
    }
}

impl PartialEq for MediaType {
    fn eq(&self, other: &Self) -> bool {
        self.type_.eq_ignore_ascii_case(&other.type_)
            && self.subtype.eq_ignore_ascii_case(&other.subtype)
            && self.parameters == other.parameters
    }
}

impl Eq for MediaType {}

impl Hash for MediaType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_ignore_ascii_case(&self.type_, state);
        hash_ignore_ascii_case(&self.subtype, state);
        self.parameters.hash(state);
    }
}

fn hash_ignore_ascii_case<H: Hasher>(s: &str, state: &mut H) {
    for b in s.bytes() {
        state.write_u8(b.to_ascii_lowercase());
    }
    // same terminator `str`'s own `Hash` impl uses
    state.write_u8(0xff);
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}{}", self.type_, self.subtype, self.parameters)
    }
}

impl str::FromStr for MediaType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut reader = HeaderReader::new(s);
        let media_type = MediaType::parse(&mut reader)?;

        if reader.has_next() {
            return Err(ParseError::TrailingContent {
                position: reader.position(),
            });
        }

        Ok(media_type)
    }
}

impl From<&mime::Mime> for MediaType {
    fn from(mime: &mime::Mime) -> Self {
        MediaType::with_parameters(
            mime.type_().as_str(),
            mime.subtype().as_str(),
            mime.to_parameters(),
        )
    }
}

impl AsMediaType for MediaType {
    fn type_(&self) -> &str {
        &self.type_
    }

    fn subtype(&self) -> &str {
        &self.subtype
    }

    fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name)
    }

    fn to_parameters(&self) -> Parameters {
        self.parameters.clone()
    }
}

impl AsMediaType for mime::Mime {
    fn type_(&self) -> &str {
        mime::Mime::type_(self).as_str()
    }

    fn subtype(&self) -> &str {
        mime::Mime::subtype(self).as_str()
    }

    fn parameter(&self, name: &str) -> Option<&str> {
        self.params()
            .find(|(attr, _)| attr.as_str().eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn to_parameters(&self) -> Parameters {
        self.params()
            .map(|(attr, value)| (attr.as_str(), value.as_str()))
            .collect()
    }
}

impl<T: AsMediaType + ?Sized> AsMediaType for &T {
    fn type_(&self) -> &str {
        (**self).type_()
    }

    fn subtype(&self) -> &str {
        (**self).subtype()
    }

    fn parameter(&self, name: &str) -> Option<&str> {
        (**self).parameter(name)
    }

    fn to_parameters(&self) -> Parameters {
        (**self).to_parameters()
    }

    fn carried_quality_source(&self) -> Option<u32> {
        (**self).carried_quality_source()
    }
}
