//! Crate wide constants used in Morton encoding and decoding.

/// Deepest refinement level a Morton key can address.
pub const DEEPEST_LEVEL: u64 = 16;

/// Number of boxes along each axis on the deepest level.
pub const LEVEL_SIZE: u64 = 1 << DEEPEST_LEVEL;

/// Number of low bits of a Morton key reserved for the level.
pub const LEVEL_DISPLACEMENT: usize = 15;

/// Mask selecting the level bits of a Morton key.
pub const LEVEL_MASK: u64 = 0x7FFF;

/// Displacement of the high byte of a 16 bit anchor.
pub const BYTE_DISPLACEMENT: usize = 8;

/// Mask selecting the low byte of an anchor.
pub const BYTE_MASK: u64 = 0xFF;

/// Mask selecting a 9 bit chunk, three interleaved bits per axis.
pub const NINE_BIT_MASK: u64 = 0x1FF;

/// Spread the 8 bits of `index` so that bit `i` lands at position `3i + offset`.
const fn encode_table(offset: usize) -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut index = 0;
    while index < 256 {
        let mut value = 0u64;
        let mut bit = 0;
        while bit < 8 {
            value |= (((index >> bit) & 1) as u64) << (3 * bit + offset);
            bit += 1;
        }
        table[index] = value;
        index += 1;
    }
    table
}

/// Gather the bits at positions `offset`, `3 + offset` and `6 + offset` of a 9 bit chunk.
const fn decode_table(offset: usize) -> [u64; 512] {
    let mut table = [0u64; 512];
    let mut index = 0;
    while index < 512 {
        let mut value = 0u64;
        let mut bit = 0;
        while bit < 3 {
            value |= (((index >> (3 * bit + offset)) & 1) as u64) << bit;
            bit += 1;
        }
        table[index] = value;
        index += 1;
    }
    table
}

/// Lookup table for encoding the x coordinate of an anchor.
pub const X_LOOKUP_ENCODE: [u64; 256] = encode_table(2);

/// Lookup table for encoding the y coordinate of an anchor.
pub const Y_LOOKUP_ENCODE: [u64; 256] = encode_table(1);

/// Lookup table for encoding the z coordinate of an anchor.
pub const Z_LOOKUP_ENCODE: [u64; 256] = encode_table(0);

/// Lookup table for decoding the x coordinate of a Morton key.
pub const X_LOOKUP_DECODE: [u64; 512] = decode_table(2);

/// Lookup table for decoding the y coordinate of a Morton key.
pub const Y_LOOKUP_DECODE: [u64; 512] = decode_table(1);

/// Lookup table for decoding the z coordinate of a Morton key.
pub const Z_LOOKUP_DECODE: [u64; 512] = decode_table(0);
