//! Signed Prefix Lists.
//!
//! A Signed Prefix List (SPL) is a [signed object] by which the holder of
//! an AS number lists all the prefixes it may originate. It is defined in
//! [draft-ietf-sidrops-rpki-prefixlist].
//!
//! The type [`Spl`] represents an SPL after its envelope was verified, its
//! content decoded and checked, and its semantic validity determined via
//! [`Spl::process`]. The content alone is available as
//! [`SignedPrefixList`].
//!
//! An [`Spl`] can be encoded into a compact binary form for handing it to
//! another process and decoded again. See [`Spl::encode`] and
//! [`Spl::decode`].
//!
//! [signed object]: https://tools.ietf.org/html/rfc6488
//! [draft-ietf-sidrops-rpki-prefixlist]: https://datatracker.ietf.org/doc/draft-ietf-sidrops-rpki-prefixlist/

pub use self::content::SignedPrefixList;
pub use self::wire::WireError;

use std::{error, fmt};
use log::{debug, warn};
use crate::oid;
use crate::cert::{EeCert, SignedObjectVerifier, SplValidator};
use crate::error::{InspectionError, ValidationError, VerificationError};
use crate::resources::{Asn, SplPrefix};
use crate::tal::TalId;
use crate::x509::Time;

mod content;
mod wire;


//------------ SplConfig -----------------------------------------------------

/// Configuration for processing Signed Prefix Lists.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SplConfig {
    /// Whether to insist on DER encoding.
    ///
    /// If `true`, the content has to be DER encoded. This excludes an
    /// explicitly encoded default version and prefixes with bits set
    /// beyond their length. Otherwise, BER is accepted.
    pub strict: bool,

    /// The prefix count at which an SPL is rejected.
    ///
    /// An SPL must have fewer prefixes than this.
    pub max_prefixes: usize,
}

impl SplConfig {
    /// The default maximum number of prefixes.
    pub const DEFAULT_MAX_PREFIXES: usize = 200_000;
}

impl Default for SplConfig {
    fn default() -> Self {
        SplConfig {
            strict: true,
            max_prefixes: Self::DEFAULT_MAX_PREFIXES,
        }
    }
}


//------------ Spl -----------------------------------------------------------

/// A processed Signed Prefix List.
///
/// Values are created by [`Spl::process`] or by decoding their binary
/// transport encoding via [`Spl::decode`]. The latter only carries part
/// of the information, so the SIA, the signing time and the validity of
/// the EE certificate are `None` for decoded values.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Spl {
    valid: bool,
    as_id: Asn,
    talid: TalId,
    prefixes: Vec<SplPrefix>,
    expires: Time,
    signing_time: Option<Time>,
    not_before: Option<Time>,
    not_after: Option<Time>,
    aia: String,
    aki: String,
    ski: String,
    sia: Option<String>,
}

impl Spl {
    /// Processes a Signed Prefix List.
    ///
    /// The encoded object is given via `data`, `label` names it for error
    /// messages (usually it is the file name), and `talid` is the trust
    /// anchor the object was found under.
    ///
    /// The envelope is verified and the EE certificate examined using
    /// `verifier`. The content is decoded and checked according to
    /// `config`. Finally `validator` determines whether the SPL is
    /// semantically valid. If it isn’t, the SPL is still returned but its
    /// [`valid`][Self::valid] flag is cleared.
    ///
    /// Upon success, returns the EE certificate for further checks by the
    /// caller together with the SPL.
    pub fn process<V, C>(
        data: &[u8],
        label: &str,
        talid: TalId,
        verifier: &V,
        validator: &C,
        config: &SplConfig,
    ) -> Result<(V::Cert, Self), SplError>
    where V: SignedObjectVerifier, C: SplValidator + ?Sized {
        Self::process_inner(
            data, label, talid, verifier, validator, config
        ).map_err(|err| {
            debug!("{}: {}", label, err);
            SplError::new(label, err)
        })
    }

    fn process_inner<V, C>(
        data: &[u8],
        label: &str,
        talid: TalId,
        verifier: &V,
        validator: &C,
        config: &SplConfig,
    ) -> Result<(V::Cert, Self), ValidationError>
    where V: SignedObjectVerifier, C: SplValidator + ?Sized {
        let (cert, content, signing_time) = verifier.verify(
            label, data, &oid::CT_SIGNED_PREFIX_LIST
        )?.into_parts();

        // An empty identifier is as good as none.
        let present = |s: Option<String>| s.filter(|s| !s.is_empty());
        let (aia, aki, sia, ski) = match (
            present(cert.aia()?), present(cert.aki()?),
            present(cert.sia()?), present(cert.ski()?),
        ) {
            (Some(aia), Some(aki), Some(sia), Some(ski)) => {
                (aia, aki, sia, ski)
            }
            _ => {
                return Err(InspectionError::new(
                    "RFC 6487 section 4.8: \
                     missing AIA, AKI, SIA, or SKI X509 extension"
                ).into())
            }
        };
        let not_before = cert.not_before()?;
        let not_after = cert.not_after()?;

        let (as_id, prefixes) = SignedPrefixList::decode(
            content, config
        )?.into_parts();

        if cert.has_inherited_resources() {
            return Err(VerificationError::new(
                "inherit elements not allowed in EE cert"
            ).into())
        }
        let resources = verifier.parse_ee_cert(label, talid, &cert)?;
        if resources.as_resources().is_empty() {
            return Err(VerificationError::new(
                "AS Resources extension missing"
            ).into())
        }
        if !resources.ip_resources().is_empty() {
            return Err(VerificationError::new(
                "superfluous IP Resources extension present"
            ).into())
        }

        let mut spl = Spl {
            valid: false,
            as_id,
            talid,
            prefixes,
            expires: not_after,
            signing_time: Some(signing_time),
            not_before: Some(not_before),
            not_after: Some(not_after),
            aia,
            aki,
            ski,
            sia: Some(sia),
        };
        spl.valid = validator.validate_spl(label, &resources, &spl);
        if !spl.valid {
            warn!(
                "{}: SPL for {} failed validation, keeping it as invalid",
                label, spl.as_id
            );
        }
        Ok((cert, spl))
    }

    /// Replaces the expiry time.
    ///
    /// Upon processing, the expiry time is the end of the EE certificate’s
    /// validity. A caller that has walked the certificate chain and its
    /// CRLs can use this method to set it to the earliest expiry of any
    /// object along the chain.
    pub fn with_expires(mut self, expires: Time) -> Self {
        self.expires = expires;
        self
    }
}

/// # Data Access
///
impl Spl {
    /// Returns whether the SPL is semantically valid.
    pub fn valid(&self) -> bool {
        self.valid
    }

    pub fn as_id(&self) -> Asn {
        self.as_id
    }

    pub fn talid(&self) -> TalId {
        self.talid
    }

    /// Returns the prefixes.
    ///
    /// The IPv4 prefixes come first, then the IPv6 prefixes. Each family
    /// is strictly ascending.
    pub fn prefixes(&self) -> &[SplPrefix] {
        &self.prefixes
    }

    pub fn expires(&self) -> Time {
        self.expires
    }

    pub fn signing_time(&self) -> Option<Time> {
        self.signing_time
    }

    pub fn not_before(&self) -> Option<Time> {
        self.not_before
    }

    pub fn not_after(&self) -> Option<Time> {
        self.not_after
    }

    /// Returns the CA issuer URI of the EE certificate.
    pub fn aia(&self) -> &str {
        &self.aia
    }

    /// Returns the Authority Key Identifier of the EE certificate.
    pub fn aki(&self) -> &str {
        &self.aki
    }

    /// Returns the Subject Key Identifier of the EE certificate.
    pub fn ski(&self) -> &str {
        &self.ski
    }

    /// Returns the signed object URI of the EE certificate.
    pub fn sia(&self) -> Option<&str> {
        self.sia.as_deref()
    }
}


//------------ SplError ------------------------------------------------------

/// Processing a Signed Prefix List failed.
///
/// The error is qualified with the label of the object.
#[derive(Debug)]
pub struct SplError {
    label: String,
    inner: ValidationError,
}

impl SplError {
    fn new(label: &str, inner: ValidationError) -> Self {
        SplError { label: label.into(), inner }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn inner(&self) -> &ValidationError {
        &self.inner
    }

    pub fn into_inner(self) -> ValidationError {
        self.inner
    }
}

impl fmt::Display for SplError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.inner)
    }
}

impl error::Error for SplError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.inner)
    }
}


//============ Tests =========================================================

#[cfg(test)]
pub(crate) mod test {
    use std::str::FromStr;
    use std::cell::Cell;
    use bcder::{ConstOid, Mode};
    use bcder::encode::Values;
    use bytes::Bytes;
    use crate::cert::{AsCoverage, EeResources, VerifiedObject};
    use crate::resources::{AsBlock, IpRange};
    use super::*;

    #[derive(Clone, Debug)]
    pub struct MockCert {
        pub aia: Option<String>,
        pub aki: Option<String>,
        pub sia: Option<String>,
        pub ski: Option<String>,
        pub inherits: bool,
        pub resources: EeResources,
    }

    impl Default for MockCert {
        fn default() -> Self {
            MockCert {
                aia: Some("rsync://example.com/parent/ca.cer".into()),
                aki: Some("0A:0B".into()),
                sia: Some("rsync://example.com/ca/as64496.spl".into()),
                ski: Some("0C:0D".into()),
                inherits: false,
                resources: EeResources::new(
                    vec![AsBlock::from(Asn::from_u32(64496))], Vec::new()
                ),
            }
        }
    }

    impl EeCert for MockCert {
        fn aia(&self) -> Result<Option<String>, InspectionError> {
            Ok(self.aia.clone())
        }

        fn aki(&self) -> Result<Option<String>, InspectionError> {
            Ok(self.aki.clone())
        }

        fn sia(&self) -> Result<Option<String>, InspectionError> {
            Ok(self.sia.clone())
        }

        fn ski(&self) -> Result<Option<String>, InspectionError> {
            Ok(self.ski.clone())
        }

        fn not_before(&self) -> Result<Time, InspectionError> {
            Ok(Time::utc(2024, 1, 1, 0, 0, 0))
        }

        fn not_after(&self) -> Result<Time, InspectionError> {
            Ok(Time::utc(2025, 1, 1, 0, 0, 0))
        }

        fn has_inherited_resources(&self) -> bool {
            self.inherits
        }
    }

    /// A verifier that treats the data as the eContent.
    pub struct MockVerifier {
        pub cert: MockCert,
        pub ee_cert_parsed: Cell<bool>,
    }

    impl MockVerifier {
        pub fn new(cert: MockCert) -> Self {
            MockVerifier { cert, ee_cert_parsed: Cell::new(false) }
        }
    }

    impl SignedObjectVerifier for MockVerifier {
        type Cert = MockCert;

        fn verify(
            &self,
            _label: &str,
            data: &[u8],
            content_type: &ConstOid,
        ) -> Result<VerifiedObject<MockCert>, ValidationError> {
            assert!(content_type == &oid::CT_SIGNED_PREFIX_LIST);
            if data.is_empty() {
                return Err(VerificationError::new(
                    "signature verification failed"
                ).into())
            }
            Ok(VerifiedObject::new(
                self.cert.clone(),
                Bytes::copy_from_slice(data),
                Time::utc(2024, 1, 1, 12, 0, 0),
            ))
        }

        fn parse_ee_cert(
            &self,
            _label: &str,
            _talid: TalId,
            cert: &MockCert,
        ) -> Result<EeResources, ValidationError> {
            self.ee_cert_parsed.set(true);
            Ok(cert.resources.clone())
        }
    }

    pub fn content(as_id: u32, prefixes: &[&str]) -> Vec<u8> {
        SignedPrefixList::new(
            Asn::from_u32(as_id),
            prefixes.iter().map(|s| SplPrefix::from_str(s).unwrap())
        ).encode_ref().to_captured(Mode::Der).into_bytes().to_vec()
    }

    fn process(
        verifier: &MockVerifier, data: &[u8]
    ) -> Result<(MockCert, Spl), SplError> {
        Spl::process(
            data, "as64496.spl", TalId::from_u32(1), verifier, &AsCoverage,
            &SplConfig::default()
        )
    }

    #[test]
    fn process_valid() {
        let verifier = MockVerifier::new(MockCert::default());
        let (_, spl) = process(
            &verifier, &content(64496, &["192.0.2.0/24", "2001:db8::/32"])
        ).unwrap();
        assert!(spl.valid());
        assert_eq!(spl.as_id(), Asn::from_u32(64496));
        assert_eq!(spl.talid(), TalId::from_u32(1));
        assert_eq!(spl.prefixes().len(), 2);
        assert_eq!(spl.expires(), Time::utc(2025, 1, 1, 0, 0, 0));
        assert_eq!(spl.not_after(), Some(spl.expires()));
        assert_eq!(spl.not_before(), Some(Time::utc(2024, 1, 1, 0, 0, 0)));
        assert_eq!(spl.signing_time(), Some(Time::utc(2024, 1, 1, 12, 0, 0)));
        assert_eq!(spl.aia(), "rsync://example.com/parent/ca.cer");
        assert_eq!(spl.aki(), "0A:0B");
        assert_eq!(spl.ski(), "0C:0D");
        assert_eq!(spl.sia(), Some("rsync://example.com/ca/as64496.spl"));

        let expires = Time::utc(2024, 6, 1, 0, 0, 0);
        assert_eq!(spl.with_expires(expires).expires(), expires);
    }

    #[test]
    fn process_semantically_invalid() {
        // AS not covered by the certificate: accepted, but not valid.
        let verifier = MockVerifier::new(MockCert::default());
        let (_, spl) = process(
            &verifier, &content(64497, &["192.0.2.0/24"])
        ).unwrap();
        assert!(!spl.valid());
        assert_eq!(spl.as_id(), Asn::from_u32(64497));

        let (_, spl) = Spl::process(
            &content(64496, &["192.0.2.0/24"]), "as64496.spl",
            TalId::from_u32(1), &verifier,
            &|_: &str, _: &EeResources, _: &Spl| false,
            &SplConfig::default()
        ).unwrap();
        assert!(!spl.valid());
    }

    #[test]
    fn reject_missing_extension() {
        let verifier = MockVerifier::new(MockCert {
            sia: None, .. Default::default()
        });
        let err = process(
            &verifier, &content(64496, &["192.0.2.0/24"])
        ).unwrap_err();
        assert_eq!(err.label(), "as64496.spl");
        assert!(err.to_string().starts_with("as64496.spl: "));
        assert!(err.to_string().contains("missing AIA, AKI, SIA, or SKI"));
        assert!(!verifier.ee_cert_parsed.get());

        // The identifiers are checked before the content is decoded, so
        // garbage content still reports the missing SIA.
        let err = process(&verifier, b"\x05\x00").unwrap_err();
        assert!(!err.inner().is_decoding());
        assert!(err.to_string().contains("missing AIA, AKI, SIA, or SKI"));
    }

    #[test]
    fn reject_empty_extension() {
        let data = content(64496, &["192.0.2.0/24"]);
        for cert in [
            MockCert { aia: Some(String::new()), .. Default::default() },
            MockCert { aki: Some(String::new()), .. Default::default() },
            MockCert { sia: Some(String::new()), .. Default::default() },
            MockCert { ski: Some(String::new()), .. Default::default() },
        ] {
            let err = process(
                &MockVerifier::new(cert), &data
            ).unwrap_err();
            assert!(
                err.to_string().contains("missing AIA, AKI, SIA, or SKI")
            );
        }

        // Whatever is accepted survives the transport encoding.
        let (_, spl) = process(
            &MockVerifier::new(MockCert::default()), &data
        ).unwrap();
        let decoded = Spl::decode(&mut spl.to_bytes()).unwrap();
        assert_eq!(decoded.aia(), spl.aia());
        assert_eq!(decoded.aki(), spl.aki());
        assert_eq!(decoded.ski(), spl.ski());
    }

    #[test]
    fn reject_failed_verification() {
        let verifier = MockVerifier::new(MockCert::default());
        let err = process(&verifier, b"").unwrap_err();
        assert!(err.to_string().contains("signature verification failed"));
    }

    #[test]
    fn reject_malformed_content() {
        let verifier = MockVerifier::new(MockCert::default());
        let mut data = content(64496, &["192.0.2.0/24"]);
        data.push(0);
        let err = process(&verifier, &data).unwrap_err();
        assert!(err.inner().is_decoding());
        assert!(!verifier.ee_cert_parsed.get());
    }

    #[test]
    fn reject_bad_resources() {
        let data = content(64496, &["192.0.2.0/24"]);

        let verifier = MockVerifier::new(MockCert {
            inherits: true, .. Default::default()
        });
        let err = process(&verifier, &data).unwrap_err();
        assert!(err.to_string().contains("inherit elements not allowed"));

        let verifier = MockVerifier::new(MockCert {
            resources: EeResources::default(), .. Default::default()
        });
        let err = process(&verifier, &data).unwrap_err();
        assert!(err.to_string().contains("AS Resources extension missing"));

        let verifier = MockVerifier::new(MockCert {
            resources: EeResources::new(
                vec![AsBlock::from(Asn::from_u32(64496))],
                vec![IpRange::from(SplPrefix::from_str("10.0.0.0/8").unwrap())]
            ),
            .. Default::default()
        });
        let err = process(&verifier, &data).unwrap_err();
        assert!(err.to_string().contains("superfluous IP Resources"));
    }

    #[test]
    fn config_default() {
        let config = SplConfig::default();
        assert!(config.strict);
        assert_eq!(config.max_prefixes, 200_000);
    }
}


//============ Specification Documentation ===================================

/// SPL Specification.
///
/// This is a documentation-only module. It summarizes the specification for
/// SPLs and how they are parsed.
///
/// A Signed Prefix List is a [signed object] with an eContent of type
/// `SignedPrefixList` which is defined as follows:
///
/// ```txt
/// SignedPrefixList ::= SEQUENCE {
///     version        [0] INTEGER DEFAULT 0,
///     asID           ASID,
///     prefixBlocks   SEQUENCE (SIZE(0..2)) OF AddressFamilyPrefixes
/// }
///
/// ASID ::= INTEGER (0..4294967295)
///
/// AddressFamilyPrefixes ::= SEQUENCE {
///     addressFamily    ADDRESS-FAMILY.&afi ({AddressFamilySet}),
///     addressPrefixes  SEQUENCE (SIZE(1..MAX)) OF IPAddress
/// }
///
/// IPAddress ::= BIT STRING
/// ```
///
/// The _version_ must be 0. The _addressFamily_ is an octet string of
/// `"\0\x01"` for IPv4 or `"\0\x02"` for IPv6. The IPv4 block must come
/// first and each family may only appear once. The prefixes of each block
/// must be sorted ascending by address and then prefix length, without
/// duplicates.
///
/// The EE certificate must contain AS resources and no IP resources, and
/// none of its resources may be inherited.
///
/// [signed object]: https://tools.ietf.org/html/rfc6488
pub mod spec { }
