use rand::{Error, RngCore, SeedableRng};

const INCREMENT: u32 = 0x6D2B79F5;
const UNIT_SCALE: f64 = 4_294_967_296.0;

/// Mulberry32: a 32-bit state mixing generator.
///
/// Zone layouts must be reproducible by any client that knows the block
/// number, so this exact generator is used instead of one of `rand`'s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Uniform value in `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        f64::from(self.next_u32()) / UNIT_SCALE
    }
}

impl RngCore for Mulberry32 {
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(INCREMENT);
        let mut z = self.state;
        z = (z ^ (z >> 15)).wrapping_mul(1 | z);
        z ^= z.wrapping_add((z ^ (z >> 7)).wrapping_mul(61 | z));
        z ^ (z >> 14)
    }

    fn next_u64(&mut self) -> u64 {
        let low = u64::from(self.next_u32());
        let high = u64::from(self.next_u32());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Mulberry32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}
