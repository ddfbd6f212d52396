use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    error::{ParseError, QualitySourceError},
    header::{AsMediaType, QualitySourceMediaType},
    negotiation,
};

/// The representations a resource can produce, fixed at configuration time.
///
/// Every registered media type has its `qs` weight validated when it is registered, so a bad
/// weight is reported during startup rather than while handling a request. Once built, the set is
/// immutable and cheap to clone.
///
/// # Examples
/// ```
/// use quality_source::config::Representations;
///
/// let reps = Representations::builder()
///     .register("application/json;qs=0.8")?
///     .register("application/xml;qs=1")?
///     .register("text/plain")?
///     .finish();
///
/// let ranked = reps.ranked().map(ToString::to_string).collect::<Vec<_>>();
/// assert_eq!(ranked, ["application/xml;qs=1", "text/plain", "application/json;qs=0.8"]);
/// # Ok::<_, quality_source::error::ParseError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Representations(Arc<Inner>);

#[derive(Debug)]
struct Inner {
    /// In registration order.
    registered: Vec<QualitySourceMediaType>,

    /// Indices into `registered`, highest weight first, ties in registration order.
    ranking: Vec<usize>,
}

impl Default for Representations {
    fn default() -> Self {
        Representations::builder().finish()
    }
}

impl Representations {
    /// Starts building a set of representations.
    pub fn builder() -> RepresentationsBuilder {
        RepresentationsBuilder {
            registered: Vec::new(),
        }
    }

    /// Builds a set from a comma-separated list of media types.
    pub fn from_header(header: &str) -> Result<Representations, ParseError> {
        let items = QualitySourceMediaType::parse_list(header).map_err(|err| {
            warn!("rejected representation list {:?}: {}", header, err);
            err
        })?;

        let builder = items
            .into_iter()
            .fold(Representations::builder(), |builder, item| {
                builder.register_quality_source_media_type(item)
            });

        Ok(builder.finish())
    }

    pub fn len(&self) -> usize {
        self.0.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.registered.is_empty()
    }

    /// Iterates in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &QualitySourceMediaType> {
        self.0.registered.iter()
    }

    /// Iterates from highest to lowest quality source weight.
    ///
    /// Representations with equal weights keep their registration order.
    pub fn ranked(&self) -> impl Iterator<Item = &QualitySourceMediaType> {
        self.0.ranking.iter().map(move |&idx| &self.0.registered[idx])
    }

    /// The first registered representation with the highest weight.
    pub fn preferred(&self) -> Option<&QualitySourceMediaType> {
        self.ranked().next()
    }
}

/// Builder for [`Representations`].
#[derive(Debug, Default)]
pub struct RepresentationsBuilder {
    registered: Vec<QualitySourceMediaType>,
}

impl RepresentationsBuilder {
    /// Registers a representation from a media type string such as `application/json;qs=0.8`.
    pub fn register(self, media_type: &str) -> Result<Self, ParseError> {
        match media_type.parse::<QualitySourceMediaType>() {
            Ok(item) => Ok(self.register_quality_source_media_type(item)),
            Err(err) => {
                warn!("rejected representation {:?}: {}", media_type, err);
                Err(err)
            }
        }
    }

    /// Registers a representation derived from any media type value.
    pub fn register_media_type<M>(self, media_type: &M) -> Result<Self, QualitySourceError>
    where
        M: AsMediaType + ?Sized,
    {
        match QualitySourceMediaType::from_media_type(media_type) {
            Ok(item) => Ok(self.register_quality_source_media_type(item)),
            Err(err) => {
                warn!(
                    "rejected representation {}/{}: {}",
                    media_type.type_(),
                    media_type.subtype(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Registers an already weighted representation.
    pub fn register_quality_source_media_type(mut self, item: QualitySourceMediaType) -> Self {
        debug!(
            "registered representation {} with qs={}",
            item,
            item.quality_source()
        );
        self.registered.push(item);
        self
    }

    /// Freezes the registered representations.
    pub fn finish(self) -> Representations {
        let registered = self.registered;

        let mut ranking = (0..registered.len()).collect::<Vec<_>>();
        negotiation::sort_indices_by_quality_source(&mut ranking, &registered);

        Representations(Arc::new(Inner {
            registered,
            ranking,
        }))
    }
}

#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::header::MediaType;

    assert_impl_all!(Representations: Send, Sync, Clone, Default);

    #[test]
    fn empty() {
        let reps = Representations::default();
        assert!(reps.is_empty());
        assert_eq!(reps.len(), 0);
        assert!(reps.preferred().is_none());
        assert_eq!(reps.ranked().count(), 0);
    }

    #[test]
    fn registration_order_and_ranking() {
        let reps = Representations::builder()
            .register("application/json;qs=0.8")
            .unwrap()
            .register("application/xml;qs=1")
            .unwrap()
            .register("text/plain")
            .unwrap()
            .finish();

        let registered = reps.iter().map(|i| i.subtype()).collect::<Vec<_>>();
        assert_eq!(registered, vec!["json", "xml", "plain"]);

        let ranked = reps.ranked().map(|i| i.subtype()).collect::<Vec<_>>();
        assert_eq!(ranked, vec!["xml", "plain", "json"]);

        assert_eq!(reps.preferred().unwrap().subtype(), "xml");
    }

    #[test]
    fn rejects_bad_weights_at_registration() {
        let err = Representations::builder()
            .register("text/plain;qs=-0.1")
            .unwrap_err();
        assert_eq!(
            err,
            ParseError::QualitySource(QualitySourceError::Negative("-0.1".to_owned()))
        );

        let err = Representations::builder()
            .register("text/plain;qs=abc")
            .unwrap_err();
        assert!(!err.is_structural());

        let err = Representations::builder().register("textplain").unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn register_generic_media_types() {
        let mime: mime::Mime = "image/png; qs=0.4".parse().unwrap();

        let reps = Representations::builder()
            .register_media_type(&mime)
            .unwrap()
            .register_media_type(&MediaType::new("image", "webp"))
            .unwrap()
            .finish();

        let ranked = reps
            .ranked()
            .map(|i| (i.subtype(), i.quality_source()))
            .collect::<Vec<_>>();
        assert_eq!(ranked, vec![("webp", 1000), ("png", 400)]);

        let err = Representations::builder()
            .register_media_type(&MediaType::new("image", "gif").with_parameter("qs", "lots"))
            .unwrap_err();
        assert_eq!(err, QualitySourceError::InvalidFormat("lots".to_owned()));
    }

    #[test]
    fn from_header() {
        let reps =
            Representations::from_header("text/html;qs=0.9, application/json;qs=0.9, */*;qs=0.1")
                .unwrap();
        assert_eq!(reps.len(), 3);

        let ranked = reps.ranked().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(
            ranked,
            vec!["text/html;qs=0.9", "application/json;qs=0.9", "*/*;qs=0.1"]
        );

        assert!(Representations::from_header("text/html;qs=high").is_err());
    }

    #[test]
    fn clones_share_state() {
        let reps = Representations::from_header("text/plain").unwrap();
        let clone = reps.clone();
        assert!(Arc::ptr_eq(&reps.0, &clone.0));
    }
}
