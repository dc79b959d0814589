//! The object identifiers used in this crate.
//!
//! This module collects all the object indentifiers used at various places
//! in this crate in one central place. They are public so you can refer to
//! them should that ever become necessary.

use bcder::Oid;

/// [draft-ietf-sidrops-rpki-prefixlist] `id-ct-signedPrefixList`
///
/// The eContent type of a Signed Prefix List, i.e.,
/// 1.2.840.113549.1.9.16.1.51.
///
/// [draft-ietf-sidrops-rpki-prefixlist]: https://datatracker.ietf.org/doc/draft-ietf-sidrops-rpki-prefixlist/
pub const CT_SIGNED_PREFIX_LIST: Oid<&[u8]>
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 1, 51]);
