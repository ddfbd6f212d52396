//! Quality source (`qs`) media types for server-side content negotiation.
//!
//! A quality source is a server-assigned preference weight attached to a media type, e.g.
//! `application/json;qs=0.8`. When a client would accept several representations, the server
//! ranks them by their weights. This crate parses those media types, validates the weights and
//! ranks candidates by them.
//!
//! # Examples
//! ```
//! use quality_source::header::QualitySourceMediaType;
//!
//! let json: QualitySourceMediaType = "application/json;qs=0.8".parse().unwrap();
//! assert_eq!(json.quality_source(), 800);
//!
//! // weights are validated while parsing
//! assert!("text/plain;qs=-0.1".parse::<QualitySourceMediaType>().is_err());
//! ```

#![deny(rust_2018_idioms, nonstandard_style)]
#![warn(future_incompatible, missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod header;
pub mod negotiation;

pub use self::config::{Representations, RepresentationsBuilder};
pub use self::error::{ParseError, QualitySourceError};
pub use self::header::{QualitySourceMediaType, DEFAULT_QUALITY_SOURCE_FACTOR};
