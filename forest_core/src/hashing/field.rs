//! BN254 scalar field helpers: signed reduction, canonical encodings and the
//! small amount of big-integer arithmetic the rarity filter needs.

use ark_ff::{BigInt, BigInteger, PrimeField};
use forest_schema::{LocationId, LOCATION_ID_BYTES};

pub type FieldElement = ark_bn254::Fr;

/// Limb representation of a field element, least significant limb first.
pub type FieldInt = BigInt<4>;

const DECIMAL_CHUNK: u64 = 10_000_000_000_000_000_000;
const DECIMAL_CHUNK_DIGITS: usize = 19;

/// Reduces a signed integer into the field; negatives map to `p - |value|`.
pub fn from_i64(value: i64) -> FieldElement {
    from_i128(i128::from(value))
}

pub fn from_i128(value: i128) -> FieldElement {
    let magnitude = FieldElement::from(value.unsigned_abs());
    if value < 0 {
        -magnitude
    } else {
        magnitude
    }
}

pub fn modulus() -> FieldInt {
    FieldElement::MODULUS
}

/// `p / divisor`, rounded down. The rarity filter keeps hashes strictly
/// below this bound.
pub fn modulus_div(divisor: u64) -> FieldInt {
    let (quotient, _) = div_rem_small(modulus(), divisor.max(1));
    quotient
}

pub fn to_location_id(value: &FieldElement) -> LocationId {
    let encoded = value.into_bigint().to_bytes_be();
    let mut bytes = [0u8; LOCATION_ID_BYTES];
    let offset = LOCATION_ID_BYTES.saturating_sub(encoded.len());
    bytes[offset..].copy_from_slice(&encoded[encoded.len().saturating_sub(LOCATION_ID_BYTES)..]);
    LocationId::from_bytes(bytes)
}

pub fn from_location_id(id: &LocationId) -> FieldElement {
    FieldElement::from_be_bytes_mod_order(id.as_bytes())
}

/// Canonical decimal rendering, `"0"` for zero.
pub fn to_decimal(value: &FieldElement) -> String {
    int_to_decimal(value.into_bigint())
}

pub fn int_to_decimal(value: FieldInt) -> String {
    let mut chunks = Vec::new();
    let mut rest = value;
    while !rest.is_zero() {
        let (quotient, remainder) = div_rem_small(rest, DECIMAL_CHUNK);
        chunks.push(remainder);
        rest = quotient;
    }
    let Some((most_significant, lower)) = chunks.split_last() else {
        return "0".to_string();
    };
    let mut rendered = most_significant.to_string();
    for chunk in lower.iter().rev() {
        rendered.push_str(&format!("{chunk:0width$}", width = DECIMAL_CHUNK_DIGITS));
    }
    rendered
}

fn div_rem_small(value: FieldInt, divisor: u64) -> (FieldInt, u64) {
    let divisor = u128::from(divisor);
    let mut limbs = value.0;
    let mut remainder: u128 = 0;
    for limb in limbs.iter_mut().rev() {
        let current = (remainder << 64) | u128::from(*limb);
        *limb = (current / divisor) as u64;
        remainder = current % divisor;
    }
    (BigInt::new(limbs), remainder as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::{One, Zero};

    const MODULUS_DECIMAL: &str =
        "21888242871839275222246405745257275088548364400416034343698204186575808495617";

    #[test]
    fn modulus_renders_in_decimal() {
        assert_eq!(int_to_decimal(modulus()), MODULUS_DECIMAL);
    }

    #[test]
    fn small_values_render_without_padding() {
        assert_eq!(to_decimal(&FieldElement::zero()), "0");
        assert_eq!(to_decimal(&FieldElement::one()), "1");
        assert_eq!(to_decimal(&from_i64(10_000_000_000_000_000)), "10000000000000000");
        assert_eq!(
            to_decimal(&from_i128(10_000_000_000_000_000_000_123)),
            "10000000000000000000123"
        );
    }

    #[test]
    fn negative_inputs_wrap_below_modulus() {
        let minus_one = to_decimal(&from_i64(-1));
        assert_eq!(
            minus_one,
            "21888242871839275222246405745257275088548364400416034343698204186575808495616"
        );
        assert_eq!(from_i64(-5) + from_i64(5), FieldElement::zero());
    }

    #[test]
    fn modulus_div_matches_multiplication_bound() {
        // p - 1 is divisible by 2^28, so every power-of-two rarity leaves remainder 1.
        let (quotient, remainder) = div_rem_small(modulus(), 16384);
        assert_eq!(remainder, 1);
        assert_eq!(quotient, modulus_div(16384));
        assert!(modulus_div(16384) < modulus_div(8));
        assert_eq!(modulus_div(1), modulus());
    }

    #[test]
    fn location_id_round_trips_field_element() {
        let value = from_i64(-42);
        let id = to_location_id(&value);
        assert_eq!(from_location_id(&id), value);
        assert_eq!(id.to_string().len(), 64);
    }
}
