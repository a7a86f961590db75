/// Xorshift32 pseudo-random generator.
///
/// Period 2^32 - 1 over non-zero states. Not cryptographic; it only has to
/// sound like noise and be cheap enough for the worker.
#[derive(Debug, Clone)]
pub struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    /// Replaces a zero seed, which would lock the generator at zero.
    const FALLBACK_SEED: u32 = 0x9E37_79B9;

    pub const fn new(seed: u32) -> Self {
        Xorshift32 {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Signed 8-bit sample taken from the high bits.
    #[inline]
    pub fn next_i8(&mut self) -> i8 {
        (self.next_u32() >> 24) as u8 as i8
    }
}
