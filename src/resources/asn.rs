//! Types for Autonomous System Numbers (ASN) and ASN resources.

use std::{error, fmt};
use std::str::FromStr;
use bcder::Tag;
use bcder::decode::{self, DecodeError, Source};


//------------ Asn -----------------------------------------------------------

/// An AS number (ASN).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Asn(u32);

impl Asn {
    pub const MIN: Asn = Asn(u32::MIN);
    pub const MAX: Asn = Asn(u32::MAX);

    /// Creates an AS number from a `u32`.
    pub fn from_u32(value: u32) -> Self {
        Asn(value)
    }

    /// Converts an AS number into a `u32`.
    pub fn into_u32(self) -> u32 {
        self.0
    }
}

impl Asn {
    /// Takes an AS number from the beginning of an encoded value.
    ///
    /// The value must be an INTEGER in the range of a `u32`. Negative or
    /// overly large values are rejected as a malformed AS identifier.
    pub fn take_from<S: Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_primitive_if(Tag::INTEGER, |prim| {
            match prim.to_u32() {
                Ok(value) => Ok(Asn(value)),
                Err(_) => Err(prim.content_err("malformed AS identifier")),
            }
        })
    }

    pub fn encode(self) -> impl bcder::encode::Values {
        bcder::encode::PrimitiveContent::encode(self.0)
    }
}


//--- From

impl From<u32> for Asn {
    fn from(id: u32) -> Self {
        Asn(id)
    }
}

impl From<Asn> for u32 {
    fn from(id: Asn) -> Self {
        id.0
    }
}


//--- FromStr

impl FromStr for Asn {
    type Err = ParseAsnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = if s.len() > 2 && s[..2].eq_ignore_ascii_case("as") {
            &s[2..]
        } else {
            s
        };

        u32::from_str(s).map(Asn).map_err(|_| ParseAsnError)
    }
}


//--- Display

impl fmt::Display for Asn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AS{}", self.0)
    }
}


//------------ AsBlock -------------------------------------------------------

/// A block of AS numbers as listed in a certificate’s AS resources.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AsBlock {
    /// A single AS number.
    Id(Asn),

    /// An inclusive range of AS numbers.
    Range(Asn, Asn),
}

impl AsBlock {
    /// Returns the smallest AS number in the block.
    pub fn min(self) -> Asn {
        match self {
            AsBlock::Id(id) => id,
            AsBlock::Range(min, _) => min,
        }
    }

    /// Returns the largest AS number in the block.
    pub fn max(self) -> Asn {
        match self {
            AsBlock::Id(id) => id,
            AsBlock::Range(_, max) => max,
        }
    }

    /// Returns whether `asn` is part of the block.
    pub fn contains(self, asn: Asn) -> bool {
        self.min() <= asn && asn <= self.max()
    }
}

impl From<Asn> for AsBlock {
    fn from(id: Asn) -> Self {
        AsBlock::Id(id)
    }
}

impl From<(Asn, Asn)> for AsBlock {
    fn from((min, max): (Asn, Asn)) -> Self {
        AsBlock::Range(min, max)
    }
}

impl fmt::Display for AsBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            AsBlock::Id(id) => id.fmt(f),
            AsBlock::Range(min, max) => write!(f, "{}-{}", min, max),
        }
    }
}


//------------ ParseAsnError -------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ParseAsnError;

impl fmt::Display for ParseAsnError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid AS number")
    }
}

impl error::Error for ParseAsnError {}


//============ Tests =========================================================
