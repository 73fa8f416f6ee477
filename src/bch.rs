//! Systematic BCH(250,202) encoder over GF(2).

pub const INFO_BITS: usize = 202;
pub const PARITY_BITS: usize = 48;

/// Generator polynomial of BCH(250,202,6), 49 bits with the x^48 term set.
const GENERATOR: u64 = 0x1_C7EB_85DF_3C97;

const PARITY_MASK: u64 = (1 << PARITY_BITS) - 1;

/// Computes the 48 parity bits of a 202-bit information block.
///
/// The block is read MSB-first: `info[0]` is the degree-201 coefficient
/// of the message polynomial. Returns the remainder of `M(x) * x^48`
/// divided by the generator, highest-degree coefficient in bit 47.
pub fn compute(info: &[u8]) -> u64 {
    debug_assert_eq!(info.len(), INFO_BITS);
    let mut rem: u64 = 0;
    for &bit in info {
        rem = (rem << 1) | u64::from(bit & 1);
        if rem & (1 << PARITY_BITS) != 0 {
            rem ^= GENERATOR;
        }
    }
    // Multiply by x^48: shift 48 zero bits through the divider.
    for _ in 0..PARITY_BITS {
        rem <<= 1;
        if rem & (1 << PARITY_BITS) != 0 {
            rem ^= GENERATOR;
        }
    }
    rem & PARITY_MASK
}

/// Recomputes the parity of `info` and compares with `parity`.
pub fn verify(info: &[u8], parity: u64) -> bool {
    compute(info) == (parity & PARITY_MASK)
}

/// Unpacks a 48-bit parity word into single-bit values, MSB first.
pub fn parity_to_bits(parity: u64) -> [u8; PARITY_BITS] {
    let mut bits = [0u8; PARITY_BITS];
    for (i, b) in bits.iter_mut().enumerate() {
        *b = ((parity >> (PARITY_BITS - 1 - i)) & 1) as u8;
    }
    bits
}

/// Packs 48 single-bit values, MSB first, into a parity word.
pub fn bits_to_parity(bits: &[u8]) -> u64 {
    debug_assert_eq!(bits.len(), PARITY_BITS);
    bits.iter().fold(0u64, |acc, &b| (acc << 1) | u64::from(b & 1))
}
