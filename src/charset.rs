//! Character classes and the charset kinds built from them.
//!
//! Every kind is a concatenation of one or more `CharClass` tables. The
//! generator relies on this to seed one character per class for `Full`.

use std::fmt;
use std::str::FromStr;

use crate::error::GenerateError;

const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
const DIGITS: &str = "0123456789";
const PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;

/// A single class of ASCII characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    Upper,
    Lower,
    Digit,
    Punctuation,
}

impl CharClass {
    /// The characters belonging to this class, in table order.
    pub fn symbols(self) -> &'static str {
        match self {
            CharClass::Upper => UPPER,
            CharClass::Lower => LOWER,
            CharClass::Digit => DIGITS,
            CharClass::Punctuation => PUNCTUATION,
        }
    }

    pub fn contains(self, c: char) -> bool {
        self.symbols().contains(c)
    }

    /// Class of `c`, or `None` for characters outside every table.
    pub fn of(c: char) -> Option<CharClass> {
        [
            CharClass::Upper,
            CharClass::Lower,
            CharClass::Digit,
            CharClass::Punctuation,
        ]
        .into_iter()
        .find(|class| class.contains(c))
    }
}

/// Which characters a password may be drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharsetKind {
    /// Letters, digits and punctuation.
    #[default]
    Full,
    Alphanumeric,
    Letters,
    Digits,
}

impl CharsetKind {
    /// The classes this kind is made of.
    pub fn classes(self) -> &'static [CharClass] {
        match self {
            CharsetKind::Full => &[
                CharClass::Upper,
                CharClass::Lower,
                CharClass::Digit,
                CharClass::Punctuation,
            ],
            CharsetKind::Alphanumeric => &[CharClass::Upper, CharClass::Lower, CharClass::Digit],
            CharsetKind::Letters => &[CharClass::Upper, CharClass::Lower],
            CharsetKind::Digits => &[CharClass::Digit],
        }
    }

    /// The combined candidate sequence for this kind.
    pub fn symbols(self) -> Vec<char> {
        self.classes()
            .iter()
            .flat_map(|class| class.symbols().chars())
            .collect()
    }

    pub fn contains(self, c: char) -> bool {
        self.classes().iter().any(|class| class.contains(c))
    }

    /// Key used on the command line.
    pub fn key(self) -> &'static str {
        match self {
            CharsetKind::Full => "full",
            CharsetKind::Alphanumeric => "alnum",
            CharsetKind::Letters => "letters",
            CharsetKind::Digits => "digits",
        }
    }
}

impl FromStr for CharsetKind {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(CharsetKind::Full),
            "alnum" => Ok(CharsetKind::Alphanumeric),
            "letters" => Ok(CharsetKind::Letters),
            "digits" => Ok(CharsetKind::Digits),
            _ => Err(GenerateError::InvalidCharset(s.to_string())),
        }
    }
}

impl fmt::Display for CharsetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
