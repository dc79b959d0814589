//! The certificate side of processing a Signed Prefix List.
//!
//! Verifying the CMS envelope of a signed object, checking its signature,
//! and digging through the EE certificate are not done by this crate. The
//! traits in this module describe what a caller needs to provide instead.
//!
//! [`SignedObjectVerifier`] verifies the envelope and hands out the EE
//! certificate, which implements [`EeCert`]. Once the object’s content has
//! been decoded, an [`SplValidator`] decides whether the SPL is
//! semantically valid. [`AsCoverage`] is a validator that checks the SPL’s
//! AS number against the AS resources of the EE certificate.

use bcder::ConstOid;
use bytes::Bytes;
use log::debug;
use crate::error::{InspectionError, ValidationError};
use crate::resources::{AsBlock, IpRange};
use crate::spl::Spl;
use crate::tal::TalId;
use crate::x509::Time;


//------------ SignedObjectVerifier ------------------------------------------

/// Verification of signed objects and their EE certificates.
pub trait SignedObjectVerifier {
    /// The type of the EE certificate of a verified object.
    type Cert: EeCert;

    /// Verifies the envelope of a signed object.
    ///
    /// The object is given in its encoded form in `data`. Its eContent type
    /// must be `content_type`. If the object’s signature checks out, the
    /// method returns the EE certificate, the still encoded eContent and
    /// the signing time.
    fn verify(
        &self,
        label: &str,
        data: &[u8],
        content_type: &ConstOid,
    ) -> Result<VerifiedObject<Self::Cert>, ValidationError>;

    /// Parses the resources of an EE certificate.
    ///
    /// Checks that the certificate is a valid EE certificate for the trust
    /// anchor `talid` and returns its AS and IP resources.
    fn parse_ee_cert(
        &self,
        label: &str,
        talid: TalId,
        cert: &Self::Cert,
    ) -> Result<EeResources, ValidationError>;
}


//------------ VerifiedObject ------------------------------------------------

/// A signed object with a verified envelope.
#[derive(Clone, Debug)]
pub struct VerifiedObject<C> {
    cert: C,
    content: Bytes,
    signing_time: Time,
}

impl<C> VerifiedObject<C> {
    pub fn new(cert: C, content: Bytes, signing_time: Time) -> Self {
        VerifiedObject { cert, content, signing_time }
    }

    /// Returns a reference to the EE certificate.
    pub fn cert(&self) -> &C {
        &self.cert
    }

    /// Returns the encoded eContent.
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn signing_time(&self) -> Time {
        self.signing_time
    }

    pub fn into_parts(self) -> (C, Bytes, Time) {
        (self.cert, self.content, self.signing_time)
    }
}


//------------ EeCert --------------------------------------------------------

/// Access to the parts of an EE certificate needed for an SPL.
///
/// The extension accessors return `Ok(None)` if the extension is absent
/// and an error if it is present but malformed. Key identifiers are
/// returned in their usual hex representation.
pub trait EeCert {
    /// Returns the CA issuer URI from the Authority Information Access.
    fn aia(&self) -> Result<Option<String>, InspectionError>;

    /// Returns the Authority Key Identifier.
    fn aki(&self) -> Result<Option<String>, InspectionError>;

    /// Returns the signed object URI from the Subject Information Access.
    fn sia(&self) -> Result<Option<String>, InspectionError>;

    /// Returns the Subject Key Identifier.
    fn ski(&self) -> Result<Option<String>, InspectionError>;

    fn not_before(&self) -> Result<Time, InspectionError>;

    fn not_after(&self) -> Result<Time, InspectionError>;

    /// Returns whether any of the certificate’s resources are inherited.
    fn has_inherited_resources(&self) -> bool;
}


//------------ EeResources ---------------------------------------------------

/// The resources of an EE certificate.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EeResources {
    as_resources: Vec<AsBlock>,
    ip_resources: Vec<IpRange>,
}

impl EeResources {
    pub fn new(as_resources: Vec<AsBlock>, ip_resources: Vec<IpRange>) -> Self {
        EeResources { as_resources, ip_resources }
    }

    pub fn as_resources(&self) -> &[AsBlock] {
        &self.as_resources
    }

    pub fn ip_resources(&self) -> &[IpRange] {
        &self.ip_resources
    }
}


//------------ SplValidator --------------------------------------------------

/// Semantic validation of a Signed Prefix List.
///
/// A validator is given an SPL after it has been decoded and checked
/// structurally. Returning `false` does not reject the object. It is kept
/// with its valid flag cleared.
pub trait SplValidator {
    fn validate_spl(
        &self, label: &str, resources: &EeResources, spl: &Spl
    ) -> bool;
}

impl<F> SplValidator for F
where F: Fn(&str, &EeResources, &Spl) -> bool {
    fn validate_spl(
        &self, label: &str, resources: &EeResources, spl: &Spl
    ) -> bool {
        (self)(label, resources, spl)
    }
}


//------------ AsCoverage ----------------------------------------------------

/// A validator requiring the SPL’s AS to be covered by the certificate.
#[derive(Clone, Copy, Debug, Default)]
pub struct AsCoverage;

impl SplValidator for AsCoverage {
    fn validate_spl(
        &self, label: &str, resources: &EeResources, spl: &Spl
    ) -> bool {
        let covered = resources.as_resources().iter().any(|block| {
            block.contains(spl.as_id())
        });
        if !covered {
            debug!(
                "{}: {} not covered by certificate AS resources",
                label, spl.as_id()
            );
        }
        covered
    }
}
