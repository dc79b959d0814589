//! Signed Prefix Lists for RPKI relying parties.
//!
//! A _Signed Prefix List_ (SPL) is an RPKI signed object in which the
//! holder of an AS number lists all the prefixes the AS may originate. This
//! crate contains what a relying party needs to turn the SPLs it found in
//! the RPKI repositories into a per-AS list of validated prefixes:
//!
//! * [`spl::Spl::process`] checks a single SPL and the resources of its EE
//!   certificate and produces an [`Spl`],
//! * [`spl::SignedPrefixList`] decodes and encodes the SPL content,
//! * [`Spl::encode`] and [`Spl::decode`] transfer a processed SPL between
//!   processes, and
//! * [`vsp::VspTree`] merges the SPLs for each AS number into a single
//!   [`vsp::Vsp`].
//!
//! Verifying the CMS envelope and the certificate chain is left to the
//! caller. The [`cert`] module defines the traits through which this crate
//! asks for it.
//!
//! The crate logs via the [`log`] facade. With the `serde` feature, the
//! data types implement serde’s `Serialize` and `Deserialize`.

//--- Re-exports
//
pub use self::spl::{SignedPrefixList, Spl, SplConfig, SplError};
pub use self::vsp::{Vsp, VspTree};


//--- Modules
//
pub mod cert;
pub mod error;
pub mod oid;
pub mod resources;
pub mod spl;
pub mod stats;
pub mod tal;
pub mod vsp;
pub mod x509;
