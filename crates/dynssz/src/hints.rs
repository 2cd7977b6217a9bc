//! Resolution of field size tags into per-dimension hints.
//!
//! The static tags give the sizes a precompiled routine was built with.  The
//! dynamic tags are laid over them dimension by dimension, and a dimension is
//! flagged as a spec override when a spec value moved it away from its static
//! default.  An unknown spec name stops the overlay, leaving that and all
//! later dimensions at their defaults.

use crate::errors::TagError;
use crate::spec::SpecValues;
use crate::types::FieldTags;

/// Resolved fixed size of one dimension.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SizeHint {
    /// Number of elements (or bytes) in this dimension.
    pub size: u64,
    /// The dimension is explicitly dynamic (`?`).
    pub dynamic: bool,
    /// The size comes from a spec value that differs from the static default.
    pub spec_override: bool,
}

/// Resolved maximum size of one dimension.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MaxSizeHint {
    /// Maximum number of elements (or bytes) in this dimension.
    pub size: u64,
    /// The size comes from a spec value that differs from the static default.
    pub spec_override: bool,
}

/// Resolves a field's fixed size hints.
pub fn resolve_size_hints(tags: &FieldTags, spec: &SpecValues) -> Result<Vec<SizeHint>, TagError> {
    let mut hints = match tags.ssz_size() {
        Some(tag) => split(tag)
            .map(|entry| {
                if entry == "?" {
                    return Ok(SizeHint {
                        dynamic: true,
                        ..Default::default()
                    });
                }
                parse_size(entry).map(|size| SizeHint {
                    size,
                    ..Default::default()
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    if let Some(tag) = tags.dyn_size() {
        for (i, entry) in split(tag).enumerate() {
            let hint = if entry == "?" {
                SizeHint {
                    dynamic: true,
                    ..Default::default()
                }
            } else if let Ok(size) = entry.parse() {
                SizeHint {
                    size,
                    ..Default::default()
                }
            } else {
                match spec.resolve(entry)? {
                    Some(size) => SizeHint {
                        size,
                        dynamic: false,
                        spec_override: true,
                    },
                    None => break,
                }
            };

            overlay(&mut hints, i, hint, |a, b| {
                a.size == b.size && a.dynamic == b.dynamic
            });
        }
    }

    Ok(hints)
}

/// Resolves a field's max size hints.
pub fn resolve_max_hints(
    tags: &FieldTags,
    spec: &SpecValues,
) -> Result<Vec<MaxSizeHint>, TagError> {
    let mut hints = match tags.ssz_max() {
        Some(tag) => split(tag)
            .map(|entry| {
                parse_size(entry).map(|size| MaxSizeHint {
                    size,
                    spec_override: false,
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    if let Some(tag) = tags.dyn_max() {
        for (i, entry) in split(tag).enumerate() {
            let hint = if let Ok(size) = entry.parse() {
                MaxSizeHint {
                    size,
                    spec_override: false,
                }
            } else {
                match spec.resolve(entry)? {
                    Some(size) => MaxSizeHint {
                        size,
                        spec_override: true,
                    },
                    None => break,
                }
            };

            overlay(&mut hints, i, hint, |a, b| a.size == b.size);
        }
    }

    Ok(hints)
}

fn split(tag: &str) -> impl Iterator<Item = &str> {
    tag.split(',').map(str::trim)
}

fn parse_size(entry: &str) -> Result<u64, TagError> {
    entry
        .parse()
        .map_err(|_| TagError::InvalidNumber(entry.to_owned()))
}

/// Replaces dimension `i` if the resolved hint differs from the default, or
/// appends it if there is no default.
fn overlay<T>(hints: &mut Vec<T>, i: usize, hint: T, same: impl Fn(&T, &T) -> bool) {
    match hints.get_mut(i) {
        Some(existing) => {
            if !same(existing, &hint) {
                *existing = hint;
            }
        }
        None => hints.push(hint),
    }
}
