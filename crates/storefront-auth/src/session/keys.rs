//! Random keys for refresh tokens and signup confirmations.

use rand::Rng;

/// Alphabet for generated keys (58 alphanumerics, no `R`, `S`, `T`, `U`).
const KEY_ALPHABET: &[u8] = b"4fPwKEjkGrBJst2MpFVZx9y5lIm6A7LDinQzgOhqaWC3obXuv0H1cNde8Y";

/// Generates a random key of `len` characters.
pub fn generate_key(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| KEY_ALPHABET[rng.random_range(0..KEY_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_key_length_and_alphabet() {
        let key = generate_key(32);
        assert_eq!(key.len(), 32);
        assert!(key.bytes().all(|b| KEY_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_keys_do_not_repeat() {
        let keys: HashSet<String> = (0..1000).map(|_| generate_key(32)).collect();
        assert_eq!(keys.len(), 1000);
    }
}
