//! Compound observation key decoding.

use crate::error::DecodeError;

/// Delimiter used between per-dimension indices unless configured otherwise.
pub const DEFAULT_KEY_DELIMITER: &str = ":";

/// Split `key` on `delimiter` and parse every segment as a non-negative index.
///
/// An empty `delimiter` treats the whole key as a single segment.
///
/// # Errors
///
/// Returns [`DecodeError::MalformedKey`] for the first segment that is empty,
/// contains anything but ASCII digits, or overflows `usize`.
pub fn decode_key(key: &str, delimiter: &str) -> Result<Vec<usize>, DecodeError> {
    if delimiter.is_empty() {
        return parse_segment(key, key).map(|index| vec![index]);
    }
    key.split(delimiter)
        .map(|segment| parse_segment(key, segment))
        .collect()
}

fn parse_segment(key: &str, segment: &str) -> Result<usize, DecodeError> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::malformed(key, segment));
    }
    segment
        .parse()
        .map_err(|_| DecodeError::malformed(key, segment))
}

/// Split a row-major linear index into one index per dimension.
///
/// `extents` holds the number of categories of each dimension, outermost
/// first. The last dimension varies fastest.
pub fn unravel_linear_index(
    key: &str,
    linear: usize,
    extents: &[usize],
) -> Result<Vec<usize>, DecodeError> {
    let cells = extents
        .iter()
        .try_fold(1usize, |acc, &extent| acc.checked_mul(extent));
    match cells {
        Some(cells) if linear < cells => {}
        _ => return Err(DecodeError::malformed(key, key)),
    }

    let mut indices = vec![0; extents.len()];
    let mut rest = linear;
    for (slot, &extent) in indices.iter_mut().zip(extents).rev() {
        *slot = rest % extent;
        rest /= extent;
    }
    Ok(indices)
}

/// Key decoder configured once per payload.
///
/// When the payload declares its cube extents (`size` in JSON-stat), a
/// single-segment key on a multi-dimensional cube is read as a linear index.
/// A linear index beyond the cube is kept as a plain one-segment key.
#[derive(Debug, Clone)]
pub struct KeyDecoder<'a> {
    delimiter: &'a str,
    extents: Option<Vec<usize>>,
}

impl<'a> KeyDecoder<'a> {
    pub fn new(delimiter: &'a str) -> Self {
        Self {
            delimiter,
            extents: None,
        }
    }

    pub fn with_extents(mut self, extents: Option<Vec<usize>>) -> Self {
        self.extents = extents;
        self
    }

    pub fn decode(&self, key: &str) -> Result<Vec<usize>, DecodeError> {
        let indices = decode_key(key, self.delimiter)?;
        match &self.extents {
            Some(extents) if extents.len() > 1 && indices.len() == 1 => {
                // outside the cube the key still names the first dimension
                Ok(unravel_linear_index(key, indices[0], extents).unwrap_or(indices))
            }
            _ => Ok(indices),
        }
    }
}
