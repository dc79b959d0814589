//! IP addresses and prefixes as used in Signed Prefix Lists.
//!
//! Addresses of both families are kept in a single 128 bit integer. IPv6
//! addresses use all of it in host byte order while IPv4 addresses live in
//! the upper four bytes. This way prefix lengths count from the top of the
//! integer for both families and comparing the integers is the same as
//! comparing the address bytes in network order.

use std::{cmp, fmt, io};
use std::net::{AddrParseError, IpAddr, Ipv4Addr, Ipv6Addr};
use std::num::ParseIntError;
use std::str::FromStr;
use bcder::{decode, encode};
use bcder::{BitString, Mode, OctetString, Tag};
use bcder::decode::{ContentError, DecodeError, Source};


//------------ Addr ----------------------------------------------------------

/// An address of either family.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Addr(u128);

impl Addr {
    /// Creates a new address from 128 raw bits in host byte order.
    pub fn from_bits(bits: u128) -> Self {
        Addr(bits)
    }

    /// Creates a new address value for an IPv4 address.
    pub fn from_v4(addr: Ipv4Addr) -> Self {
        Addr::from_bits(u128::from(u32::from(addr)) << 96)
    }

    /// Creates a new address value for an IPv6 address.
    pub fn from_v6(addr: Ipv6Addr) -> Self {
        Addr::from_bits(u128::from(addr))
    }

    /// Returns the raw bits of the underlying integer.
    pub fn to_bits(self) -> u128 {
        self.0
    }

    /// Converts the address value into an IPv4 address.
    ///
    /// The method disregards the lower twelve bytes of the value.
    pub fn to_v4(self) -> Ipv4Addr {
        ((self.0 >> 96) as u32).into()
    }

    /// Converts the address value into an IPv6 address.
    pub fn to_v6(self) -> Ipv6Addr {
        self.0.into()
    }

    /// Returns a byte array for the address.
    pub fn to_bytes(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    /// Creates an address from its byte array.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Addr(u128::from_be_bytes(bytes))
    }

    /// Returns an address with all but the first `prefix_len` bits cleared.
    pub fn to_min(self, prefix_len: u8) -> Self {
        if prefix_len >= 128 {
            self
        }
        else if prefix_len == 0 {
            Addr(0)
        }
        else {
            Addr(self.0 & !(!0 >> u32::from(prefix_len)))
        }
    }

    /// Returns an address with all but the first `prefix_len` bits set.
    pub fn to_max(self, prefix_len: u8) -> Self {
        if prefix_len >= 128 {
            self
        }
        else {
            Addr(self.0 | (!0 >> u32::from(prefix_len)))
        }
    }
}

impl From<IpAddr> for Addr {
    fn from(addr: IpAddr) -> Addr {
        match addr {
            IpAddr::V4(addr) => Addr::from_v4(addr),
            IpAddr::V6(addr) => Addr::from_v6(addr),
        }
    }
}

impl From<Ipv4Addr> for Addr {
    fn from(addr: Ipv4Addr) -> Addr {
        Addr::from_v4(addr)
    }
}

impl From<Ipv6Addr> for Addr {
    fn from(addr: Ipv6Addr) -> Addr {
        Addr::from_v6(addr)
    }
}


//------------ AddressFamily -------------------------------------------------

/// The address family of a prefix block.
///
/// The variants are ordered: IPv4 sorts before IPv6.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AddressFamily {
    /// IPv4.
    ///
    /// This is encoded by a two byte octet string with value `0x00 0x01`.
    Ipv4,

    /// IPv6.
    ///
    /// This is encoded by a two byte octet string with value `0x00 0x02`.
    Ipv6
}

impl AddressFamily {
    /// Takes a single address family from the beginning of a value.
    ///
    /// Only the two byte AFI values for IPv4 and IPv6 are accepted. A SAFI
    /// octet is not allowed.
    pub fn take_from<S: Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let octet_string = OctetString::take_from(cons)?;
        let mut octets = octet_string.octets();
        let res = match (octets.next(), octets.next(), octets.next()) {
            (Some(0), Some(1), None) => AddressFamily::Ipv4,
            (Some(0), Some(2), None) => AddressFamily::Ipv6,
            _ => return Err(cons.content_err("unknown address family")),
        };
        Ok(res)
    }

    pub fn encode(self) -> impl encode::Values {
        OctetString::encode_slice(
            match self {
                AddressFamily::Ipv4 => b"\x00\x01",
                AddressFamily::Ipv6 => b"\x00\x02",
            }
        )
    }

    /// Returns the AFI value of the family.
    pub fn afi(self) -> u8 {
        match self {
            AddressFamily::Ipv4 => 1,
            AddressFamily::Ipv6 => 2,
        }
    }

    /// Returns the family for an AFI value.
    pub fn from_afi(afi: u8) -> Option<Self> {
        match afi {
            1 => Some(AddressFamily::Ipv4),
            2 => Some(AddressFamily::Ipv6),
            _ => None
        }
    }

    /// Returns the maximum prefix length for this family.
    pub fn max_addr_len(self) -> u8 {
        match self {
            AddressFamily::Ipv4 => 32,
            AddressFamily::Ipv6 => 128
        }
    }

    /// Returns the number of octets of an address of this family.
    pub fn octet_len(self) -> usize {
        match self {
            AddressFamily::Ipv4 => 4,
            AddressFamily::Ipv6 => 16
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            AddressFamily::Ipv4 => "IPv4",
            AddressFamily::Ipv6 => "IPv6",
        })
    }
}


//------------ Prefix --------------------------------------------------------

/// An IP address prefix.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Prefix {
    /// The address of the prefix.
    ///
    /// The unused bits are zero.
    addr: Addr,

    /// The length of the prefix.
    ///
    /// This will never be more than 128.
    len: u8,
}

impl Prefix {
    /// Creates a new prefix from an address and a length.
    ///
    /// Bits of the address beyond the length are cleared.
    ///
    /// # Panics
    ///
    /// This function panics if `len` is larger than 128.
    pub fn new<A: Into<Addr>>(addr: A, len: u8) -> Self {
        assert!(len <= 128);
        Prefix {
            addr: addr.into().to_min(len),
            len
        }
    }

    /// Returns the raw address of the prefix.
    pub fn addr(self) -> Addr {
        self.addr
    }

    /// Returns the length of the prefix.
    pub fn addr_len(self) -> u8 {
        self.len
    }

    /// Returns the smallest address covered by the prefix.
    pub fn min(self) -> Addr {
        self.addr
    }

    /// Returns the largest address covered by the prefix.
    pub fn max(self) -> Addr {
        self.addr.to_max(self.len)
    }

    /// Creates a prefix of the given family from its BIT STRING encoding.
    ///
    /// The bit string is the one from section 2.1.1 of RFC 3779: it holds
    /// all the bits of the prefix and nothing else. If `strict` is set,
    /// a bit string with set bits beyond the prefix length is rejected.
    /// Otherwise those bits are cleared.
    pub fn from_bit_string(
        src: &BitString,
        family: AddressFamily,
        strict: bool,
    ) -> Result<Self, ContentError> {
        if src.octet_len() > family.octet_len() {
            return Err(ContentError::from_static(
                "invalid prefix encoding: address too long for family"
            ))
        }
        let mut bits = 0;
        for octet in src.octets() {
            bits = (bits << 8) | (u128::from(octet))
        }
        for _ in src.octet_len()..16 {
            bits <<= 8;
        }
        let addr = Addr::from_bits(bits);
        let res = Self::new(addr, src.bit_len() as u8);
        if strict && res.addr != addr {
            return Err(ContentError::from_static(
                "invalid prefix encoding: bits set beyond prefix length"
            ))
        }
        Ok(res)
    }

    /// Takes an optional encoded prefix of the given family from a source.
    pub fn take_opt_from_with_family<S: Source>(
        cons: &mut decode::Constructed<S>,
        family: AddressFamily,
        strict: bool,
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        let bits = match cons.take_opt_value_if(
            Tag::BIT_STRING, BitString::from_content
        )? {
            Some(bits) => bits,
            None => return Ok(None)
        };
        Self::from_bit_string(&bits, family, strict).map(Some).map_err(|err| {
            cons.content_err(err)
        })
    }
}


//--- PrimitiveContent

impl encode::PrimitiveContent for Prefix {
    const TAG: Tag = Tag::BIT_STRING;

    fn encoded_len(&self, _: Mode) -> usize {
        if self.len % 8 == 0 {
            self.len as usize / 8 + 1
        }
        else {
            self.len as usize / 8 + 2
        }
    }

    fn write_encoded<W: io::Write>(
        &self,
        _: Mode,
        target: &mut W
    ) -> Result<(), io::Error> {
        // The type ensures that all the unused bits are zero, so we don’t
        // need to take care of that here.
        let addr = self.addr.to_bytes();
        if self.len % 8 == 0 {
            target.write_all(&[0])?;
            target.write_all(&addr[..(self.len / 8) as usize])
        }
        else {
            target.write_all(&[8 - self.len % 8])?;
            target.write_all(&addr[..(self.len / 8 + 1) as usize])
        }
    }
}


//------------ SplPrefix -----------------------------------------------------

/// A prefix together with its address family.
///
/// This is the element type of the prefix lists of both Signed Prefix
/// Lists and the merged VSPs. Its ordering is the one ordering used for
/// all sorting and deduplication of prefixes in this crate: IPv4 prefixes
/// come before IPv6 prefixes, within a family prefixes are ordered by
/// their address bytes and then by ascending length.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SplPrefix {
    family: AddressFamily,
    prefix: Prefix,
}

impl SplPrefix {
    /// Creates a new value from a family and prefix.
    ///
    /// Returns `None` if the prefix is too long for the family or an IPv4
    /// prefix has bits set outside the upper four bytes.
    pub fn new(family: AddressFamily, prefix: Prefix) -> Option<Self> {
        if prefix.addr_len() > family.max_addr_len() {
            return None
        }
        if family == AddressFamily::Ipv4
            && prefix.addr().to_bits() & (!0 >> 32) != 0
        {
            return None
        }
        Some(SplPrefix { family, prefix })
    }

    /// Creates a new value from an IPv4 address and prefix length.
    ///
    /// # Panics
    ///
    /// The function panics if `len` is larger than 32.
    pub fn v4(addr: Ipv4Addr, len: u8) -> Self {
        assert!(len <= 32);
        SplPrefix {
            family: AddressFamily::Ipv4,
            prefix: Prefix::new(addr, len)
        }
    }

    /// Creates a new value from an IPv6 address and prefix length.
    ///
    /// # Panics
    ///
    /// The function panics if `len` is larger than 128.
    pub fn v6(addr: Ipv6Addr, len: u8) -> Self {
        SplPrefix {
            family: AddressFamily::Ipv6,
            prefix: Prefix::new(addr, len)
        }
    }

    pub fn family(self) -> AddressFamily {
        self.family
    }

    pub fn prefix(self) -> Prefix {
        self.prefix
    }

    pub fn addr_len(self) -> u8 {
        self.prefix.addr_len()
    }

    /// Returns the prefix’s address as a std address.
    pub fn ip_addr(self) -> IpAddr {
        match self.family {
            AddressFamily::Ipv4 => self.prefix.addr().to_v4().into(),
            AddressFamily::Ipv6 => self.prefix.addr().to_v6().into(),
        }
    }
}


//--- PartialOrd and Ord

impl PartialOrd for SplPrefix {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SplPrefix {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.family.cmp(&other.family).then_with(|| {
            self.prefix.addr().cmp(&other.prefix.addr())
        }).then_with(|| {
            self.prefix.addr_len().cmp(&other.prefix.addr_len())
        })
    }
}


//--- FromStr and Display

impl FromStr for SplPrefix {
    type Err = FromStrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sep = s.find('/').ok_or(FromStrError::MissingSeparator)?;
        let addr = IpAddr::from_str(&s[..sep])?;
        let len = u8::from_str(&s[sep + 1..])?;
        match addr {
            IpAddr::V4(addr) if len <= 32 => Ok(SplPrefix::v4(addr, len)),
            IpAddr::V6(addr) if len <= 128 => Ok(SplPrefix::v6(addr, len)),
            _ => Err(FromStrError::BadLength)
        }
    }
}

impl fmt::Display for SplPrefix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.ip_addr(), self.prefix.addr_len())
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for SplPrefix {
    fn serialize<S: serde::Serializer>(
        &self, serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SplPrefix {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        use serde::de;

        let string = String::deserialize(deserializer)?;
        SplPrefix::from_str(&string).map_err(de::Error::custom)
    }
}


//------------ IpRange -------------------------------------------------------

/// An inclusive range of addresses of a single family.
///
/// This is the most general form of an IP resource in a certificate.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct IpRange {
    family: AddressFamily,
    min: Addr,
    max: Addr,
}

impl IpRange {
    pub fn new(family: AddressFamily, min: Addr, max: Addr) -> Self {
        IpRange { family, min, max }
    }

    pub fn family(self) -> AddressFamily {
        self.family
    }

    pub fn min(self) -> Addr {
        self.min
    }

    pub fn max(self) -> Addr {
        self.max
    }
}

impl From<SplPrefix> for IpRange {
    fn from(prefix: SplPrefix) -> Self {
        IpRange::new(
            prefix.family(), prefix.prefix().min(), prefix.prefix().max()
        )
    }
}


//------------ FromStrError --------------------------------------------------

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FromStrError {
    Addr(AddrParseError),
    PrefixLen(ParseIntError),
    BadLength,
    MissingSeparator,
}

impl From<AddrParseError> for FromStrError {
    fn from(err: AddrParseError) -> Self {
        FromStrError::Addr(err)
    }
}

impl From<ParseIntError> for FromStrError {
    fn from(err: ParseIntError) -> Self {
        FromStrError::PrefixLen(err)
    }
}

impl fmt::Display for FromStrError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FromStrError::Addr(ref err) => err.fmt(f),
            FromStrError::PrefixLen(ref err) => {
                write!(f, "bad prefix length: {}", err)
            }
            FromStrError::BadLength => {
                f.write_str("prefix length too large for family")
            }
            FromStrError::MissingSeparator => {
                f.write_str("missing separator")
            }
        }
    }
}

impl std::error::Error for FromStrError { }


//============ Tests =========================================================
