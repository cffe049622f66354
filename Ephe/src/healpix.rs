//! HEALPix NUNIQ addressing
//!
//! A NUNIQ packs a HEALPix order and a nested pixel index into one integer:
//! `nuniq = 4 * 4^order + pixel`, with `pixel` in `[0, 12 * 4^order)`.

#![allow(clippy::doc_markdown)]

use std::fmt;

use crate::error::{Error, Result};

/// Highest order whose NUNIQ values fit in a `u64`.
pub const MAX_ORDER: u8 = 30;

/// A HEALPix tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HealpixIndex {
    /// Resolution level (nside = 2^order).
    pub order: u8,
    /// Nested pixel index within the order.
    pub pixel: u64,
}

impl HealpixIndex {
    /// Decompose a NUNIQ into (order, pixel).
    ///
    /// Values below 4 do not encode any tile and are rejected with
    /// [`Error::InvalidNuniq`].
    pub fn from_nuniq(nuniq: u64) -> Result<Self> {
        if nuniq < 4 {
            return Err(Error::InvalidNuniq(nuniq));
        }
        // floor(log2(nuniq / 4) / 2), in integer arithmetic
        let order = (nuniq / 4).ilog2() / 2;
        let pixel = nuniq - (4u64 << (2 * order));
        Ok(Self {
            order: order as u8,
            pixel,
        })
    }

    /// Pack back into a NUNIQ.
    ///
    /// Returns `None` if the order is above [`MAX_ORDER`] or the pixel is out
    /// of range for the order.
    pub fn to_nuniq(self) -> Option<u64> {
        if self.order > MAX_ORDER || self.pixel >= Self::npix(self.order)? {
            return None;
        }
        Some((4u64 << (2 * u32::from(self.order))) + self.pixel)
    }

    /// Number of pixels covering the sphere at `order` (12 * 4^order).
    pub fn npix(order: u8) -> Option<u64> {
        12u64.checked_mul(1u64.checked_shl(2 * u32::from(order))?)
    }

    /// HiPS directory bucket for this pixel (`DirN` in `NorderK/DirN/NpixM`).
    pub fn hips_dir(&self) -> u64 {
        (self.pixel / 10_000) * 10_000
    }
}

impl fmt::Display for HealpixIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Norder{}/Npix{}", self.order, self.pixel)
    }
}
