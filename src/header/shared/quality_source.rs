use std::{fmt, str};

use tracing::trace;

use super::{AsMediaType, MediaType, Parameters};
use crate::{
    error::{ParseError, QualitySourceError},
    header::HeaderReader,
};

/// Name of the media type parameter holding the quality source weight.
pub const QUALITY_SOURCE_FACTOR: &str = "qs";

/// Weight used when no `qs` parameter is present, equivalent to `qs=1.0`.
pub const DEFAULT_QUALITY_SOURCE_FACTOR: u32 = 1000;

const QUALITY_SOURCE_SCALE: f64 = 1000.0;

/// A media type annotated with a server-side quality source (`qs`) weight.
///
/// The weight expresses how strongly a server prefers to produce this representation when a
/// client would accept several. It is a fixed-point number with three decimal places: `qs=0.5` is
/// stored as `500` and an absent `qs` parameter means [`DEFAULT_QUALITY_SOURCE_FACTOR`].
///
/// The `qs` parameter itself stays in [`parameters`](Self::parameters); it is only read to derive
/// the weight.
///
/// # Equality
/// Two values are equal when their media types are equal _and_ their weights are equal.
///
/// # Examples
/// ```
/// use quality_source::header::{QualitySourceMediaType, DEFAULT_QUALITY_SOURCE_FACTOR};
///
/// let json: QualitySourceMediaType = "application/json;qs=0.8".parse().unwrap();
/// assert_eq!(json.quality_source(), 800);
/// assert_eq!(json.parameters().get("qs"), Some("0.8"));
///
/// let text: QualitySourceMediaType = "text/plain".parse().unwrap();
/// assert_eq!(text.quality_source(), DEFAULT_QUALITY_SOURCE_FACTOR);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualitySourceMediaType {
    media_type: MediaType,
    qs: u32,
}

impl QualitySourceMediaType {
    /// Constructs a value with no parameters and the default weight.
    pub fn new(type_: impl Into<String>, subtype: impl Into<String>) -> Self {
        QualitySourceMediaType {
            media_type: MediaType::new(type_, subtype),
            qs: DEFAULT_QUALITY_SOURCE_FACTOR,
        }
    }

    /// Constructs a value from its parts.
    ///
    /// The weight is stored as given; it is not checked against a `qs` entry in `parameters`.
    pub fn with_parameters(
        type_: impl Into<String>,
        subtype: impl Into<String>,
        qs: u32,
        parameters: Parameters,
    ) -> Self {
        QualitySourceMediaType {
            media_type: MediaType::with_parameters(type_, subtype, parameters),
            qs,
        }
    }

    /// Derives a value from any media type.
    ///
    /// A weight already carried by `media_type` is reused as-is; otherwise it is parsed from the
    /// `qs` parameter.
    pub fn from_media_type<M>(media_type: &M) -> Result<Self, QualitySourceError>
    where
        M: AsMediaType + ?Sized,
    {
        let qs = try_quality_source_of(media_type)?;

        Ok(Self::with_parameters(
            media_type.type_(),
            media_type.subtype(),
            qs,
            media_type.to_parameters(),
        ))
    }

    /// Reads a quality source media type from `reader`.
    ///
    /// Structural errors from the reader are returned unchanged. A malformed or negative `qs`
    /// parameter is reported as [`ParseError::QualitySource`].
    pub fn parse(reader: &mut HeaderReader<'_>) -> Result<Self, ParseError> {
        let media_type = MediaType::parse(reader)?;
        let qs = parse_quality_source(media_type.parameters().get(QUALITY_SOURCE_FACTOR))?;

        Ok(QualitySourceMediaType { media_type, qs })
    }

    /// Parses a comma-separated list of quality source media types.
    ///
    /// Empty list elements are skipped.
    ///
    /// # Examples
    /// ```
    /// use quality_source::header::QualitySourceMediaType;
    ///
    /// let list = QualitySourceMediaType::parse_list("application/json;qs=0.8, , text/plain")?;
    /// assert_eq!(list.len(), 2);
    /// assert_eq!(list[0].quality_source(), 800);
    /// assert_eq!(list[1].quality_source(), 1000);
    /// # Ok::<_, quality_source::error::ParseError>(())
    /// ```
    pub fn parse_list(header: &str) -> Result<Vec<Self>, ParseError> {
        let mut reader = HeaderReader::new(header);
        let mut items = Vec::new();

        while reader.has_next() {
            if reader.has_next_separator(b',') {
                reader.next_separator(b',')?;
                continue;
            }

            items.push(Self::parse(&mut reader)?);

            if reader.has_next() {
                reader.next_separator(b',')?;
            }
        }

        Ok(items)
    }

    /// The quality source weight, scaled by 1000.
    #[inline]
    pub fn quality_source(&self) -> u32 {
        self.qs
    }

    pub fn type_(&self) -> &str {
        self.media_type.type_()
    }

    pub fn subtype(&self) -> &str {
        self.media_type.subtype()
    }

    /// All parameters, including `qs` when it was present.
    pub fn parameters(&self) -> &Parameters {
        self.media_type.parameters()
    }

    /// The underlying media type, without weight semantics.
    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    pub fn into_media_type(self) -> MediaType {
        self.media_type
    }
}

impl fmt::Display for QualitySourceMediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.media_type, f)
    }
}

impl str::FromStr for QualitySourceMediaType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut reader = HeaderReader::new(s);
        let item = QualitySourceMediaType::parse(&mut reader)?;

        if reader.has_next() {
            return Err(ParseError::TrailingContent {
                position: reader.position(),
            });
        }

        Ok(item)
    }
}

impl TryFrom<MediaType> for QualitySourceMediaType {
    type Error = QualitySourceError;

    fn try_from(media_type: MediaType) -> Result<Self, Self::Error> {
        let qs = parse_quality_source(media_type.parameters().get(QUALITY_SOURCE_FACTOR))?;
        let (type_, subtype, parameters) = media_type.into_parts();
        Ok(Self::with_parameters(type_, subtype, qs, parameters))
    }
}

impl TryFrom<&mime::Mime> for QualitySourceMediaType {
    type Error = QualitySourceError;

    fn try_from(mime: &mime::Mime) -> Result<Self, Self::Error> {
        Self::from_media_type(mime)
    }
}

impl AsMediaType for QualitySourceMediaType {
    fn type_(&self) -> &str {
        self.media_type.type_()
    }

    fn subtype(&self) -> &str {
        self.media_type.subtype()
    }

    fn parameter(&self, name: &str) -> Option<&str> {
        self.media_type.parameters().get(name)
    }

    fn to_parameters(&self) -> Parameters {
        self.media_type.parameters().clone()
    }

    fn carried_quality_source(&self) -> Option<u32> {
        Some(self.qs)
    }
}

/// Parses a raw `qs` parameter value into a fixed-point weight.
///
/// `None` yields [`DEFAULT_QUALITY_SOURCE_FACTOR`]. Otherwise the value is read as an `f32`,
/// widened to `f64`, scaled by 1000 and truncated toward zero. The `f32` representation error is
/// kept, so `0.7` becomes `699` and `0.8005` becomes `800`. Weights above `1.0` are accepted and
/// saturate at `i32::MAX`.
///
/// Only finite decimal literals are accepted: `NaN`, infinities and type-suffixed literals such as
/// `0.5f` are rejected rather than mapped to a weight.
///
/// # Errors
/// - [`QualitySourceError::InvalidFormat`] if the value is not a finite decimal number.
/// - [`QualitySourceError::Negative`] if the truncated weight is below zero.
///
/// # Examples
/// ```
/// use quality_source::header::parse_quality_source;
///
/// assert_eq!(parse_quality_source(None), Ok(1000));
/// assert_eq!(parse_quality_source(Some("0.5")), Ok(500));
/// assert_eq!(parse_quality_source(Some("0.7")), Ok(699));
/// assert!(parse_quality_source(Some("-0.1")).is_err());
/// ```
pub fn parse_quality_source(value: Option<&str>) -> Result<u32, QualitySourceError> {
    let Some(value) = value else {
        return Ok(DEFAULT_QUALITY_SOURCE_FACTOR);
    };

    let parsed = match value.parse::<f32>() {
        Ok(parsed) if parsed.is_finite() => parsed,
        _ => {
            trace!("rejecting malformed quality source value: {:?}", value);
            return Err(QualitySourceError::InvalidFormat(value.to_owned()));
        }
    };

    // scale in f64 so the f32 rounding error survives into the truncation;
    // float-to-int `as` casts truncate toward zero and saturate at the integer bounds
    let scaled = (f64::from(parsed) * QUALITY_SOURCE_SCALE) as i32;

    u32::try_from(scaled).map_err(|_| {
        trace!("rejecting negative quality source value: {:?}", value);
        QualitySourceError::Negative(value.to_owned())
    })
}

/// Fallible form of [`quality_source_of`].
pub fn try_quality_source_of<M>(media_type: &M) -> Result<u32, QualitySourceError>
where
    M: AsMediaType + ?Sized,
{
    match media_type.carried_quality_source() {
        Some(qs) => Ok(qs),
        None => parse_quality_source(media_type.parameter(QUALITY_SOURCE_FACTOR)),
    }
}

/// Returns the quality source weight of any media type.
///
/// Values that already carry a weight (i.e., [`QualitySourceMediaType`]) return it directly.
/// Anything else has its `qs` parameter parsed, defaulting to [`DEFAULT_QUALITY_SOURCE_FACTOR`].
///
/// This lookup is meant for use inside ranking and sorting, where there is no sensible way to
/// recover from a bad weight. Media types should be validated when they are registered, for
/// example with [`Representations`](crate::config::Representations). Use
/// [`try_quality_source_of`] where recovery is possible.
///
/// # Panics
/// Panics if `media_type` does not carry a weight and its `qs` parameter is malformed or negative.
///
/// # Examples
/// ```
/// use quality_source::header::{quality_source_of, MediaType};
///
/// let mt = MediaType::new("application", "xml").with_parameter("qs", "0.25");
/// assert_eq!(quality_source_of(&mt), 250);
///
/// let mime: mime::Mime = "text/plain".parse().unwrap();
/// assert_eq!(quality_source_of(&mime), 1000);
/// ```
///
/// A malformed weight will panic.
/// ```should_panic
/// # use quality_source::header::{quality_source_of, MediaType};
/// let mt = MediaType::new("text", "plain").with_parameter("qs", "high");
/// let _qs = quality_source_of(&mt);
/// ```
pub fn quality_source_of<M>(media_type: &M) -> u32
where
    M: AsMediaType + ?Sized,
{
    match try_quality_source_of(media_type) {
        Ok(qs) => qs,
        Err(err) => panic!(
            "invalid quality source on {}/{}: {}",
            media_type.type_(),
            media_type.subtype(),
            err
        ),
    }
}
