//! Pseudo-random cadence generator.
//!
//! A four-lane 8-bit mixer sized for a part with no hardware entropy: each
//! draw costs a handful of ALU ops and the period is long relative to the
//! few thousand draws one night consumes. Not cryptographic. The state is
//! owned by the engine instance and threaded explicitly, so unit tests can
//! run generators in parallel and replay exact sequences.

/// Fixed seed for the `x` lane.
pub const SEED_X: u8 = 0xCA;
/// Fixed seed for the `a` lane.
pub const SEED_A: u8 = 0xFE;
/// Fixed seed for the `b` lane.
pub const SEED_B: u8 = 0xBA;
/// Fixed seed for the `c` lane.
pub const SEED_C: u8 = 0xBE;

/// Smallest supported `uniform` bound.
pub const UNIFORM_MIN: u8 = 1;
/// Largest supported `uniform` bound.
pub const UNIFORM_MAX: u8 = 8;

/// Deterministic non-cryptographic byte source.
///
/// Every power cycle starts from the same fixed seed; the cadence is meant
/// to look organic, not to be unpredictable across nights.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CadenceRng {
    x: u8,
    a: u8,
    b: u8,
    c: u8,
}

impl CadenceRng {
    /// Creates a generator carrying the fixed power-on seed.
    #[must_use]
    pub const fn seeded() -> Self {
        Self {
            x: SEED_X,
            a: SEED_A,
            b: SEED_B,
            c: SEED_C,
        }
    }

    /// Advances the state and returns the next byte.
    pub fn next_byte(&mut self) -> u8 {
        self.x = self.x.wrapping_add(1);
        self.a ^= self.c ^ self.x;
        self.b = self.b.wrapping_add(self.a);
        self.c = self.c.wrapping_add((self.b >> 1) ^ self.a);
        self.c
    }

    /// Draws a value uniformly distributed over `0..n` for `n` in 1..=8.
    ///
    /// Rejection sampling: mask down to the smallest power-of-two range
    /// covering `n`, redraw while the masked value lands outside. The draw
    /// count is unbounded in theory but expects at most two draws; for
    /// `n == 8` the mask is exact and nothing is ever rejected.
    pub fn uniform(&mut self, n: u8) -> u8 {
        debug_assert!((UNIFORM_MIN..=UNIFORM_MAX).contains(&n));
        let mask = Self::rejection_mask(n);
        loop {
            let value = self.next_byte() & mask;
            if value < n {
                return value;
            }
        }
    }

    const fn rejection_mask(n: u8) -> u8 {
        if n <= 2 {
            0x01
        } else if n <= 4 {
            0x03
        } else {
            0x07
        }
    }
}

impl Default for CadenceRng {
    fn default() -> Self {
        Self::seeded()
    }
}
