//! Password generation.
//!
//! `generate` draws every character from the operating system CSPRNG. Draws go
//! through `RngCore::try_fill_bytes` so that a failing entropy source is
//! reported as `GenerateError::GenerationFailure` instead of panicking. Index
//! selection uses rejection sampling, so every candidate character is equally
//! likely.
//!
//! For the `full` charset the generator guarantees one uppercase letter, one
//! lowercase letter, one digit and one punctuation character, then shuffles the
//! result so those guaranteed characters do not sit at fixed positions.

use std::fmt;

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tracing::debug;

use crate::charset::{CharClass, CharsetKind};
use crate::error::{GenerateError, Result};

pub const MIN_LENGTH: usize = 8;
pub const MAX_LENGTH: usize = 128;
pub const DEFAULT_LENGTH: usize = 20;

/// A validated request: length is within `MIN_LENGTH..=MAX_LENGTH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordRequest {
    length: usize,
    charset: CharsetKind,
}

impl PasswordRequest {
    pub fn new(length: usize, charset: CharsetKind) -> Result<Self> {
        check_length(length)?;
        Ok(Self { length, charset })
    }

    /// Validate `length` first, then resolve the charset `key`.
    pub fn parse(length: usize, key: &str) -> Result<Self> {
        check_length(length)?;
        let charset = key.parse()?;
        Ok(Self { length, charset })
    }
}

fn check_length(length: usize) -> Result<()> {
    if (MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        Ok(())
    } else {
        Err(GenerateError::InvalidLength { length })
    }
}

/// A generated password. `Debug` is redacted so it never ends up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct GeneratedPassword(String);

impl GeneratedPassword {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for GeneratedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeneratedPassword(<redacted, {} chars>)", self.len())
    }
}

/// Generate one password of `length` characters from the charset named `charset`.
///
/// # Errors
/// - `InvalidLength` when `length` is outside `8..=128` (checked first).
/// - `InvalidCharset` when `charset` is not `full`, `alnum`, `letters` or `digits`.
/// - `GenerationFailure` when the OS entropy source fails.
pub fn generate(length: usize, charset: &str) -> Result<GeneratedPassword> {
    let request = PasswordRequest::parse(length, charset)?;
    generate_with(&mut OsRng, &request)
}

/// Generate `count` passwords for the same request.
///
/// The request is validated once; any draw failure aborts the whole batch.
pub fn generate_many(length: usize, charset: &str, count: usize) -> Result<Vec<GeneratedPassword>> {
    let request = PasswordRequest::parse(length, charset)?;
    let mut rng = OsRng;
    (0..count)
        .map(|_| generate_with(&mut rng, &request))
        .collect()
}

/// Generate a password for `request` using `rng`.
pub fn generate_with<R>(rng: &mut R, request: &PasswordRequest) -> Result<GeneratedPassword>
where
    R: RngCore + CryptoRng + ?Sized,
{
    debug!(
        length = request.length,
        charset = %request.charset,
        "generating password"
    );
    let symbols = request.charset.symbols();
    let classes = request.charset.classes();
    if request.charset == CharsetKind::Full && request.length >= classes.len() {
        covering_string(rng, request.length, &symbols, classes)
    } else {
        generate_from_symbols(rng, request.length, &symbols)
    }
}

/// Draw `length` characters independently from an arbitrary table.
///
/// This is the plain path used for every charset except `full`; it is public
/// so callers with their own tables get the same length and emptiness checks.
pub fn generate_from_symbols<R>(
    rng: &mut R,
    length: usize,
    symbols: &[char],
) -> Result<GeneratedPassword>
where
    R: RngCore + CryptoRng + ?Sized,
{
    check_length(length)?;
    if symbols.is_empty() {
        return Err(GenerateError::EmptyCharset);
    }
    let mut out = String::with_capacity(length);
    for _ in 0..length {
        out.push(pick(rng, symbols)?);
    }
    Ok(GeneratedPassword(out))
}

/// One character from each class, the rest from `symbols`, then shuffled.
fn covering_string<R>(
    rng: &mut R,
    length: usize,
    symbols: &[char],
    classes: &[CharClass],
) -> Result<GeneratedPassword>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let mut chars = Vec::with_capacity(length);
    for class in classes {
        let pool: Vec<char> = class.symbols().chars().collect();
        chars.push(pick(rng, &pool)?);
    }
    for _ in classes.len()..length {
        chars.push(pick(rng, symbols)?);
    }
    shuffle(rng, &mut chars)?;
    Ok(GeneratedPassword(chars.into_iter().collect()))
}

fn pick<R>(rng: &mut R, pool: &[char]) -> Result<char>
where
    R: RngCore + ?Sized,
{
    Ok(pool[uniform_index(rng, pool.len())?])
}

/// Fisher-Yates.
fn shuffle<R>(rng: &mut R, items: &mut [char]) -> Result<()>
where
    R: RngCore + ?Sized,
{
    for i in (1..items.len()).rev() {
        let j = uniform_index(rng, i + 1)?;
        items.swap(i, j);
    }
    Ok(())
}

/// Uniform index in `0..bound`. `bound` must be in `1..=u32::MAX`.
fn uniform_index<R>(rng: &mut R, bound: usize) -> Result<usize>
where
    R: RngCore + ?Sized,
{
    debug_assert!(bound > 0 && bound as u64 <= u64::from(u32::MAX));
    const SPAN: u64 = 1 << 32;
    let bound = bound as u64;
    // Values at or above `zone` would favour the low indices.
    let zone = SPAN - SPAN % bound;
    let mut buf = [0u8; 4];
    loop {
        rng.try_fill_bytes(&mut buf)?;
        let v = u64::from(u32::from_le_bytes(buf));
        if v < zone {
            return Ok((v % bound) as usize);
        }
    }
}
