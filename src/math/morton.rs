//! Morton encoding (Z-order curve) for spatial locality sorting
//!
//! Each axis is quantized to 10 bits and the three values are interleaved
//! round-robin into a 30-bit key, with x in the top bit of every 3-bit
//! group. Sorting primitives by this key places spatial neighbors next to
//! each other, which is what the bulk tree build relies on.

use crate::core::types::Vec3;
use super::aabb::Aabb;

/// Spread the lower 10 bits of `x` so bit i lands at bit 3i
fn spread_bits(x: u32) -> u32 {
    let mut x = x & 0x3ff;
    x = (x ^ (x << 16)) & 0x0ff0_00ff;
    x = (x ^ (x << 8)) & 0x0300_f00f;
    x = (x ^ (x << 4)) & 0x030c_30c3;
    x = (x ^ (x << 2)) & 0x0924_9249;
    x
}

/// Inverse of [`spread_bits`]: collect every third bit back into 10 bits
fn compact_bits(x: u32) -> u32 {
    let mut x = x & 0x0924_9249;
    x = (x ^ (x >> 2)) & 0x030c_30c3;
    x = (x ^ (x >> 4)) & 0x0300_f00f;
    x = (x ^ (x >> 8)) & 0x0ff0_00ff;
    x = (x ^ (x >> 16)) & 0x3ff;
    x
}

/// Encode three 10-bit coordinates (0 <= c < 1024) into a 30-bit Morton code
pub fn encode(x: u32, y: u32, z: u32) -> u32 {
    (spread_bits(x) << 2) | (spread_bits(y) << 1) | spread_bits(z)
}

/// Decode a 30-bit Morton code back to its three 10-bit coordinates
pub fn decode(code: u32) -> (u32, u32, u32) {
    (
        compact_bits(code >> 2),
        compact_bits(code >> 1),
        compact_bits(code),
    )
}

/// Maps world-space points into Morton keys relative to a fixed bound.
///
/// Points outside the bound clamp to its surface; they still sort, just
/// without locality guarantees.
#[derive(Clone, Copy, Debug)]
pub struct MortonCoder {
    bounds: Aabb,
}

impl MortonCoder {
    pub fn new(bounds: Aabb) -> Self {
        Self { bounds }
    }

    /// Quantize each axis of `point` to a 10-bit cell and interleave
    pub fn encode_point(&self, point: Vec3) -> u32 {
        let size = self.bounds.size();
        let frac = ((point - self.bounds.min) / size).clamp(Vec3::ZERO, Vec3::ONE);
        let cell = frac * 1023.0;
        encode(cell.x as u32, cell.y as u32, cell.z as u32)
    }
}
