//! Ranking of candidate representations by quality source weight.
//!
//! All sorts here are stable: candidates with equal weights keep the order they were given in,
//! so callers can use list order as the secondary sort key.
//!
//! Weights are looked up with [`quality_source_of`], which panics on a malformed `qs` parameter.
//! Validate candidates up front (see [`Representations`](crate::config::Representations)) or use
//! [`QualitySourceMediaType`](crate::header::QualitySourceMediaType) values, which always carry a
//! valid weight.

use std::cmp::Reverse;

use crate::header::{quality_source_of, AsMediaType};

/// Sorts candidates from highest to lowest quality source weight.
///
/// # Panics
/// Panics if a candidate has a malformed `qs` parameter. See [`quality_source_of`].
pub fn sort_by_quality_source<T: AsMediaType>(candidates: &mut [T]) {
    candidates.sort_by_cached_key(|candidate| Reverse(quality_source_of(candidate)));
}

/// Returns references to the candidates, highest quality source weight first.
///
/// # Panics
/// Panics if a candidate has a malformed `qs` parameter. See [`quality_source_of`].
///
/// # Examples
/// ```
/// use quality_source::{header::QualitySourceMediaType, negotiation};
///
/// let candidates = QualitySourceMediaType::parse_list(
///     "application/json;qs=0.8, application/xml;qs=1, text/plain",
/// )?;
///
/// let ranked = negotiation::ranked(&candidates)
///     .into_iter()
///     .map(|c| c.subtype())
///     .collect::<Vec<_>>();
/// assert_eq!(ranked, ["xml", "plain", "json"]);
/// # Ok::<_, quality_source::error::ParseError>(())
/// ```
pub fn ranked<T: AsMediaType>(candidates: &[T]) -> Vec<&T> {
    let mut ranked = candidates.iter().collect::<Vec<_>>();
    sort_by_quality_source(&mut ranked);
    ranked
}

/// Returns the first candidate with the highest quality source weight.
///
/// # Panics
/// Panics if a candidate has a malformed `qs` parameter. See [`quality_source_of`].
pub fn preferred<T: AsMediaType>(candidates: &[T]) -> Option<&T> {
    let mut max_item = None;
    let mut max_qs = 0;

    // manual loop since `Iterator::max_by_key` would give us the last of equal maximums
    for candidate in candidates {
        let qs = quality_source_of(candidate);

        // only change if strictly greater, or to pick up the first candidate at all
        if max_item.is_none() || qs > max_qs {
            max_qs = qs;
            max_item = Some(candidate);
        }
    }

    max_item
}

/// Sorts `indices` into `candidates` from highest to lowest quality source weight.
pub(crate) fn sort_indices_by_quality_source<T: AsMediaType>(
    indices: &mut [usize],
    candidates: &[T],
) {
    indices.sort_by_cached_key(|&idx| Reverse(quality_source_of(&candidates[idx])));
}
