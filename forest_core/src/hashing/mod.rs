pub mod field;
pub mod mimc;
pub mod perlin;

pub use field::{FieldElement, FieldInt};
pub use mimc::{MimcSponge, PERLIN_HASH_ROUNDS, PLANET_HASH_ROUNDS};
pub use perlin::{PerlinNoise, MAX_PERLIN_VALUE};
