//! Trust anchor identification.

use std::fmt;


//------------ TalId ---------------------------------------------------------

/// The identifier of the trust anchor a certificate chain ends in.
///
/// Identifiers are handed out by whoever loads the trust anchors, usually as
/// the index of the trust anchor in its list. This crate only compares them
/// and carries them along.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TalId(u32);

impl TalId {
    pub const fn from_u32(id: u32) -> Self {
        TalId(id)
    }

    pub fn into_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for TalId {
    fn from(id: u32) -> Self {
        TalId(id)
    }
}

impl From<TalId> for u32 {
    fn from(id: TalId) -> Self {
        id.0
    }
}

impl fmt::Display for TalId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "tal#{}", self.0)
    }
}
