//! AS numbers, addresses and prefixes.
//!
//! The types in this module are the primitives everything else in the crate
//! is built from. In particular, [`SplPrefix`] carries the single ordering
//! that is used for checking the sorting of prefixes in a Signed Prefix List
//! and for merging prefixes into a VSP.

pub use self::addr::{
    Addr, AddressFamily, FromStrError, IpRange, Prefix, SplPrefix
};
pub use self::asn::{AsBlock, Asn, ParseAsnError};

mod addr;
mod asn;
