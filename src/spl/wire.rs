//! The binary transport encoding of a processed SPL.
//!
//! This encoding is used to hand an [`Spl`] from the process that
//! validated it to another process. It is not meant for storage.
//!
//! All integers are in network byte order. The encoding is:
//!
//! ```txt
//! valid       u8      (0 or 1)
//! as_id       u32
//! talid       u32
//! count       u32     number of prefixes
//! expires     i64     seconds since the Unix epoch
//! prefixes    count × (afi u8, addr [u8; 16], len u8)
//! aia         u32 length, UTF-8 bytes
//! aki         u32 length, UTF-8 bytes
//! ski         u32 length, UTF-8 bytes
//! ```
//!
//! IPv4 addresses occupy the first four octets of the address field, the
//! rest is zero.

use std::{error, fmt};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use crate::resources::{Addr, AddressFamily, Asn, Prefix, SplPrefix};
use crate::tal::TalId;
use crate::x509::Time;
use super::Spl;


/// The encoded length of a single prefix.
const PREFIX_LEN: usize = 1 + 16 + 1;


//------------ Spl -----------------------------------------------------------

impl Spl {
    /// Appends the transport encoding of the SPL to `target`.
    pub fn encode<B: BufMut>(&self, target: &mut B) {
        target.put_u8(u8::from(self.valid));
        target.put_u32(self.as_id.into_u32());
        target.put_u32(self.talid.into_u32());
        // The prefix count is bounded by SplConfig::max_prefixes.
        target.put_u32(self.prefixes.len() as u32);
        target.put_i64(self.expires.timestamp());
        for prefix in &self.prefixes {
            target.put_u8(prefix.family().afi());
            target.put_slice(&prefix.prefix().addr().to_bytes());
            target.put_u8(prefix.addr_len());
        }
        encode_str(&self.aia, target);
        encode_str(&self.aki, target);
        encode_str(&self.ski, target);
    }

    /// Returns the transport encoding of the SPL.
    pub fn to_bytes(&self) -> Bytes {
        let mut res = BytesMut::with_capacity(
            1 + 4 + 4 + 4 + 8 + self.prefixes.len() * PREFIX_LEN
            + 12 + self.aia.len() + self.aki.len() + self.ski.len()
        );
        self.encode(&mut res);
        res.freeze()
    }

    /// Decodes an SPL from the beginning of `source`.
    ///
    /// The transport encoding does not carry the SIA, the signing time,
    /// or the validity period of the EE certificate. These are `None` in
    /// the returned value.
    ///
    /// Any error means the peer is broken. There is no way to recover the
    /// stream afterwards.
    pub fn decode<B: Buf>(source: &mut B) -> Result<Self, WireError> {
        let valid = match get_u8(source)? {
            0 => false,
            1 => true,
            other => return Err(WireError::InvalidFlag(other)),
        };
        let as_id = Asn::from_u32(get_u32(source)?);
        let talid = TalId::from_u32(get_u32(source)?);
        let count = get_u32(source)? as usize;
        let expires = get_i64(source)?;
        let expires = Time::from_timestamp(expires).ok_or(
            WireError::InvalidTime(expires)
        )?;

        // Check before allocating so a bogus count can’t make us reserve
        // gigabytes.
        if source.remaining() / PREFIX_LEN < count {
            return Err(WireError::ShortInput)
        }
        let mut prefixes = Vec::with_capacity(count);
        for _ in 0..count {
            let prefix = decode_prefix(source)?;
            if let Some(last) = prefixes.last() {
                if *last >= prefix {
                    return Err(WireError::UnsortedPrefixes)
                }
            }
            prefixes.push(prefix);
        }

        let aia = decode_str(source)?;
        let aki = decode_str(source)?;
        let ski = decode_str(source)?;

        Ok(Spl {
            valid,
            as_id,
            talid,
            prefixes,
            expires,
            signing_time: None,
            not_before: None,
            not_after: None,
            aia,
            aki,
            ski,
            sia: None,
        })
    }
}


//------------ Helpers -------------------------------------------------------

fn decode_prefix<B: Buf>(source: &mut B) -> Result<SplPrefix, WireError> {
    let afi = get_u8(source)?;
    let family = AddressFamily::from_afi(afi).ok_or(
        WireError::InvalidFamily(afi)
    )?;
    if source.remaining() < 17 {
        return Err(WireError::ShortInput)
    }
    let mut addr = [0u8; 16];
    source.copy_to_slice(&mut addr);
    let addr = Addr::from_bytes(addr);
    let len = source.get_u8();
    if len > family.max_addr_len() {
        return Err(WireError::InvalidPrefix)
    }
    let prefix = Prefix::new(addr, len);
    if prefix.addr() != addr {
        return Err(WireError::InvalidPrefix)
    }
    SplPrefix::new(family, prefix).ok_or(WireError::InvalidPrefix)
}

fn encode_str<B: BufMut>(s: &str, target: &mut B) {
    target.put_u32(s.len() as u32);
    target.put_slice(s.as_bytes());
}

fn decode_str<B: Buf>(source: &mut B) -> Result<String, WireError> {
    let len = get_u32(source)? as usize;
    if len == 0 {
        return Err(WireError::EmptyString)
    }
    if source.remaining() < len {
        return Err(WireError::ShortInput)
    }
    let mut res = vec![0u8; len];
    source.copy_to_slice(&mut res);
    String::from_utf8(res).map_err(|_| WireError::InvalidString)
}

fn get_u8<B: Buf>(source: &mut B) -> Result<u8, WireError> {
    if source.remaining() < 1 {
        return Err(WireError::ShortInput)
    }
    Ok(source.get_u8())
}

fn get_u32<B: Buf>(source: &mut B) -> Result<u32, WireError> {
    if source.remaining() < 4 {
        return Err(WireError::ShortInput)
    }
    Ok(source.get_u32())
}

fn get_i64<B: Buf>(source: &mut B) -> Result<i64, WireError> {
    if source.remaining() < 8 {
        return Err(WireError::ShortInput)
    }
    Ok(source.get_i64())
}


//------------ WireError -----------------------------------------------------

/// Decoding the transport encoding of an SPL failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WireError {
    /// The input ended before the value was complete.
    ShortInput,

    /// The valid flag was neither 0 nor 1.
    InvalidFlag(u8),

    /// The expiry time is out of range.
    InvalidTime(i64),

    /// A prefix has an unknown address family.
    InvalidFamily(u8),

    /// A prefix is too long or has bits set beyond its length.
    InvalidPrefix,

    /// The prefixes are not strictly ascending.
    UnsortedPrefixes,

    /// One of the strings is empty.
    EmptyString,

    /// One of the strings is not valid UTF-8.
    InvalidString,
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            WireError::ShortInput => f.write_str("unexpected end of input"),
            WireError::InvalidFlag(value) => {
                write!(f, "invalid valid flag {}", value)
            }
            WireError::InvalidTime(value) => {
                write!(f, "expiry time {} out of range", value)
            }
            WireError::InvalidFamily(value) => {
                write!(f, "unknown address family {}", value)
            }
            WireError::InvalidPrefix => f.write_str("invalid prefix"),
            WireError::UnsortedPrefixes => {
                f.write_str("prefixes not strictly ascending")
            }
            WireError::EmptyString => f.write_str("empty string"),
            WireError::InvalidString => f.write_str("string not UTF-8"),
        }
    }
}

impl error::Error for WireError { }


//============ Tests =========================================================
