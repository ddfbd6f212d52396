//! Media type values shared by header parsing and negotiation.

pub use self::media_type::{AsMediaType, MediaType};
pub use self::parameters::Parameters;
pub use self::quality_source::{
    parse_quality_source, quality_source_of, try_quality_source_of, QualitySourceMediaType,
    DEFAULT_QUALITY_SOURCE_FACTOR, QUALITY_SOURCE_FACTOR,
};

mod media_type;
mod parameters;
mod quality_source;
