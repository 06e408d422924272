//! Reversible short-code codec.
//!
//! Maps positive row ids to short codes and back. The mapping is a pure
//! function of `(id, alphabet, min_length)`: there is no hidden state and no
//! randomness, so the same id always yields the same code across restarts.
//!
//! # Algorithm
//!
//! 1. The low [`BLOCK_SIZE`] bits of the id are bit-reversed; higher bits pass
//!    through unchanged. Consecutive ids differ in their lowest bits, which
//!    become the highest bits of the block, so their codes diverge in the
//!    leading symbol instead of the trailing one.
//! 2. The permuted value is written in the alphabet's radix, most significant
//!    digit first, and left-padded with the first alphabet symbol up to
//!    `min_length`.
//!
//! Both steps are bijections, so `decode(encode(id)) == id` for every id.
//!
//! # Operational note
//!
//! The alphabet ordering is the secret. Changing `GENERATOR_STRING` (or the
//! minimum length) invalidates every code issued before the change.

/// Number of low bits that are bit-reversed.
pub const BLOCK_SIZE: u32 = 24;

/// Default minimum code length.
pub const DEFAULT_MIN_LENGTH: usize = 5;

/// Default generator alphabet (31 symbols, shuffled, no look-alikes).
pub const DEFAULT_ALPHABET: &str = "mn6j2c4rv8bpygw95z7hsdaetxuk3fq";

/// Smallest accepted alphabet.
pub const MIN_ALPHABET_LEN: usize = 16;

const BLOCK_MASK: u64 = (1 << BLOCK_SIZE) - 1;

/// Errors produced by the codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("id must be positive, got {0}")]
    InvalidInput(i64),

    #[error("invalid short code")]
    InvalidCode,

    #[error("invalid alphabet: {0}")]
    InvalidAlphabet(String),
}

/// Bidirectional id <-> short code mapping.
#[derive(Debug, Clone)]
pub struct Codec {
    alphabet: Vec<u8>,
    index: [Option<u8>; 128],
    min_length: usize,
}

impl Codec {
    /// Builds a codec over `alphabet` with the default minimum length.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidAlphabet`] if the alphabet has fewer than
    /// [`MIN_ALPHABET_LEN`] symbols, repeats a symbol, or contains a character
    /// that is not URL-safe ASCII (`A-Z a-z 0-9 - _ . ~`).
    pub fn new(alphabet: &str) -> Result<Self, CodecError> {
        Self::with_min_length(alphabet, DEFAULT_MIN_LENGTH)
    }

    /// Builds a codec with an explicit minimum code length.
    pub fn with_min_length(alphabet: &str, min_length: usize) -> Result<Self, CodecError> {
        if min_length == 0 {
            return Err(CodecError::InvalidAlphabet(
                "minimum length must be at least 1".to_string(),
            ));
        }

        let symbols = alphabet.as_bytes();
        if symbols.len() < MIN_ALPHABET_LEN {
            return Err(CodecError::InvalidAlphabet(format!(
                "expected at least {} symbols, got {}",
                MIN_ALPHABET_LEN,
                alphabet.chars().count()
            )));
        }

        let mut index = [None; 128];
        for (position, &symbol) in symbols.iter().enumerate() {
            if !is_url_safe(symbol) {
                return Err(CodecError::InvalidAlphabet(format!(
                    "symbol {:?} is not URL-safe ASCII",
                    alphabet[position..].chars().next().unwrap_or('?')
                )));
            }

            let slot = &mut index[symbol as usize];
            if slot.is_some() {
                return Err(CodecError::InvalidAlphabet(format!(
                    "symbol {:?} appears more than once",
                    symbol as char
                )));
            }
            // Alphabets are bounded by the 66 URL-safe ASCII symbols.
            *slot = Some(position as u8);
        }

        Ok(Self {
            alphabet: symbols.to_vec(),
            index,
            min_length,
        })
    }

    /// Radix of the code alphabet.
    pub fn radix(&self) -> usize {
        self.alphabet.len()
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Encodes a positive id into its short code.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidInput`] for `id <= 0`.
    pub fn encode(&self, id: i64) -> Result<String, CodecError> {
        if id <= 0 {
            return Err(CodecError::InvalidInput(id));
        }

        Ok(self.enbase(permute(id as u64)))
    }

    /// Decodes a short code back into its id.
    ///
    /// Only canonical codes are accepted, i.e. exactly the strings
    /// [`Codec::encode`] produces. Anything else, including padded variants of
    /// a valid code, is rejected rather than mapped to a wrong id.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidCode`] if the code contains a symbol
    /// outside the alphabet, is not in canonical form, overflows the id range,
    /// or decodes to zero.
    pub fn decode(&self, code: &str) -> Result<i64, CodecError> {
        let bytes = code.as_bytes();

        if bytes.len() < self.min_length {
            return Err(CodecError::InvalidCode);
        }
        if bytes.len() > self.min_length && bytes[0] == self.alphabet[0] {
            return Err(CodecError::InvalidCode);
        }

        let radix = self.alphabet.len() as u64;
        let mut value: u64 = 0;
        for &symbol in bytes {
            let digit = self.digit_of(symbol).ok_or(CodecError::InvalidCode)?;
            value = value
                .checked_mul(radix)
                .and_then(|v| v.checked_add(u64::from(digit)))
                .ok_or(CodecError::InvalidCode)?;
        }

        let id = unpermute(value);
        if id == 0 || id > i64::MAX as u64 {
            return Err(CodecError::InvalidCode);
        }

        Ok(id as i64)
    }

    fn digit_of(&self, symbol: u8) -> Option<u8> {
        self.index.get(symbol as usize).copied().flatten()
    }

    fn enbase(&self, mut value: u64) -> String {
        let radix = self.alphabet.len() as u64;
        let mut digits = Vec::with_capacity(self.min_length.max(8));

        loop {
            digits.push(self.alphabet[(value % radix) as usize]);
            value /= radix;
            if value == 0 {
                break;
            }
        }
        while digits.len() < self.min_length {
            digits.push(self.alphabet[0]);
        }
        digits.reverse();

        // Every symbol was validated as ASCII at construction.
        digits.into_iter().map(char::from).collect()
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_ALPHABET.as_bytes().to_vec(),
            index: build_index(DEFAULT_ALPHABET.as_bytes()),
            min_length: DEFAULT_MIN_LENGTH,
        }
    }
}

fn build_index(symbols: &[u8]) -> [Option<u8>; 128] {
    let mut index = [None; 128];
    for (position, &symbol) in symbols.iter().enumerate() {
        index[symbol as usize] = Some(position as u8);
    }
    index
}

fn is_url_safe(symbol: u8) -> bool {
    symbol.is_ascii_alphanumeric() || matches!(symbol, b'-' | b'_' | b'.' | b'~')
}

/// Reverses the low [`BLOCK_SIZE`] bits of `n`.
fn reverse_block(n: u64) -> u64 {
    let block = (n & BLOCK_MASK) as u32;
    u64::from(block.reverse_bits() >> (u32::BITS - BLOCK_SIZE))
}

fn permute(n: u64) -> u64 {
    (n & !BLOCK_MASK) | reverse_block(n)
}

/// Bit reversal is an involution, so the inverse is the same operation.
fn unpermute(n: u64) -> u64 {
    permute(n)
}
