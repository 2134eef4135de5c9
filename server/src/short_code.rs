//! Short, URL-safe paste identifiers.

use std::fmt::{self, Display};

use rand::prelude::Distribution;
use rand::Rng;

/// Length of generated paste ids.
pub const ID_LENGTH: usize = 8;

/// Word-safe alphabet, a Base32 extension of the Open Location Code Base20
/// alphabet. Avoids lookalike characters and accidental words.
const ALPHABET: &[u8; 32] = b"23456789CFGHJMPQRVWXcfghjmpqrvwx";

/// A fixed-length code over [`ALPHABET`]. Rendered with `Display` to become
/// the paste's opaque string id.
pub struct ShortCode<const N: usize>([u8; N]);

impl<const N: usize> Display for ShortCode<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{}", byte as char)?;
        }
        Ok(())
    }
}

pub struct Generator;

impl<const N: usize> Distribution<ShortCode<N>> for Generator {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ShortCode<N> {
        let mut code = [0_u8; N];
        for byte in &mut code {
            *byte = ALPHABET[rng.gen_range(0..ALPHABET.len())];
        }
        ShortCode(code)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn codes_have_the_requested_length_and_alphabet() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let code: ShortCode<ID_LENGTH> = rng.sample(Generator);
            let rendered = code.to_string();
            assert_eq!(rendered.len(), ID_LENGTH);
            assert!(rendered.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn seeded_generation_is_deterministic() {
        let a: ShortCode<ID_LENGTH> = StdRng::seed_from_u64(42).sample(Generator);
        let b: ShortCode<ID_LENGTH> = StdRng::seed_from_u64(42).sample(Generator);
        assert_eq!(a.to_string(), b.to_string());
    }
}
