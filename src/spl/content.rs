//! The eContent of a Signed Prefix List.

use bcder::{decode, encode};
use bcder::{Mode, Tag};
use bcder::decode::{DecodeError, IntoSource, Source};
use bcder::encode::PrimitiveContent;
use crate::resources::{AddressFamily, Asn, Prefix, SplPrefix};
use super::SplConfig;


//------------ SignedPrefixList ----------------------------------------------

/// The content of a Signed Prefix List.
///
/// The prefixes are kept as a single list. It contains the IPv4 prefixes
/// followed by the IPv6 prefixes, each strictly ascending, and thus is
/// strictly ascending under the ordering of [`SplPrefix`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignedPrefixList {
    as_id: Asn,
    prefixes: Vec<SplPrefix>,
}

impl SignedPrefixList {
    /// Creates a new value from an AS number and a list of prefixes.
    ///
    /// The prefixes are sorted and duplicates are dropped.
    pub fn new(
        as_id: Asn, prefixes: impl IntoIterator<Item = SplPrefix>
    ) -> Self {
        let mut prefixes: Vec<_> = prefixes.into_iter().collect();
        prefixes.sort();
        prefixes.dedup();
        SignedPrefixList { as_id, prefixes }
    }

    pub fn as_id(&self) -> Asn {
        self.as_id
    }

    /// Returns all prefixes, IPv4 before IPv6.
    pub fn prefixes(&self) -> &[SplPrefix] {
        &self.prefixes
    }

    pub fn v4_prefixes(&self) -> &[SplPrefix] {
        &self.prefixes[..self.v6_start()]
    }

    pub fn v6_prefixes(&self) -> &[SplPrefix] {
        &self.prefixes[self.v6_start()..]
    }

    pub fn into_parts(self) -> (Asn, Vec<SplPrefix>) {
        (self.as_id, self.prefixes)
    }

    fn v6_start(&self) -> usize {
        self.prefixes.partition_point(|prefix| {
            prefix.family() == AddressFamily::Ipv4
        })
    }
}

/// # Decoding and Encoding
///
impl SignedPrefixList {
    /// Decodes the content from a source.
    ///
    /// The source must contain exactly one encoded value.
    pub fn decode<S: IntoSource>(
        source: S,
        config: &SplConfig,
    ) -> Result<Self, DecodeError<<S::Source as Source>::Error>> {
        let mode = if config.strict { Mode::Der } else { Mode::Ber };
        let mut source = source.into_source();
        let res = mode.decode(&mut source, |cons| {
            Self::take_from(cons, config)
        })?;
        // The top-level decoder doesn’t care about what comes after the
        // value, so we have to look ourselves.
        if source.request(1)? > 0 {
            return Err(DecodeError::content(
                "trailing garbage in eContent", source.pos()
            ))
        }
        Ok(res)
    }

    /// Takes the content from the beginning of an encoded value.
    pub fn take_from<S: Source>(
        cons: &mut decode::Constructed<S>,
        config: &SplConfig,
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            Self::take_version(cons, config.strict)?;
            let as_id = Asn::take_from(cons)?;
            let mut prefixes = Vec::new();
            cons.take_sequence(|cons| {
                let mut blocks = 0;
                let mut v4_seen = false;
                let mut v6_seen = false;
                while let Some(()) = cons.take_opt_sequence(|cons| {
                    blocks += 1;
                    if blocks > 2 {
                        return Err(cons.content_err(
                            "more than two AddressFamilyPrefixes"
                        ))
                    }
                    let family = AddressFamily::take_from(cons)?;
                    match family {
                        AddressFamily::Ipv4 => {
                            if v4_seen {
                                return Err(cons.content_err(
                                    "addressFamilyIPv4 appeared twice"
                                ))
                            }
                            if v6_seen {
                                return Err(cons.content_err(
                                    "invalid sorting, IPv6 before IPv4"
                                ))
                            }
                            v4_seen = true;
                        }
                        AddressFamily::Ipv6 => {
                            if v6_seen {
                                return Err(cons.content_err(
                                    "addressFamilyIPv6 appeared twice"
                                ))
                            }
                            v6_seen = true;
                        }
                    }
                    Self::take_block(cons, family, config, &mut prefixes)
                })? { }
                Ok(())
            })?;
            Ok(SignedPrefixList { as_id, prefixes })
        })
    }

    /// Takes the optional version field.
    ///
    /// The version is `[0] EXPLICIT INTEGER DEFAULT 0` and only version 0
    /// is supported. In DER, a value equal to the default must not be
    /// encoded, so in strict mode an explicit version 0 is rejected, too.
    fn take_version<S: Source>(
        cons: &mut decode::Constructed<S>,
        strict: bool,
    ) -> Result<(), DecodeError<S::Error>> {
        let version = cons.take_opt_constructed_if(Tag::CTX_0, |cons| {
            cons.take_primitive_if(Tag::INTEGER, |prim| {
                match prim.to_u32() {
                    Ok(version) => Ok(version),
                    Err(_) => Err(prim.content_err(
                        "unsupported SignedPrefixList version"
                    ))
                }
            })
        })?;
        match version {
            None => Ok(()),
            Some(0) if !strict => Ok(()),
            Some(0) => {
                Err(cons.content_err(
                    "incorrect encoding for SignedPrefixList version 0"
                ))
            }
            Some(_) => {
                Err(cons.content_err("unsupported SignedPrefixList version"))
            }
        }
    }

    /// Takes the addressPrefixes of one block and appends them.
    ///
    /// The prefixes must be a non-empty, strictly ascending sequence of
    /// prefixes valid for `family`. The total number of prefixes must stay
    /// below the configured maximum.
    fn take_block<S: Source>(
        cons: &mut decode::Constructed<S>,
        family: AddressFamily,
        config: &SplConfig,
        prefixes: &mut Vec<SplPrefix>,
    ) -> Result<(), DecodeError<S::Error>> {
        let start = prefixes.len();
        cons.take_sequence(|cons| {
            while let Some(prefix) = Prefix::take_opt_from_with_family(
                cons, family, config.strict
            )? {
                let prefix = match SplPrefix::new(family, prefix) {
                    Some(prefix) => prefix,
                    None => {
                        return Err(cons.content_err(
                            "invalid prefix encoding"
                        ))
                    }
                };
                if let Some(last) = prefixes[start..].last() {
                    if *last >= prefix {
                        return Err(cons.content_err(
                            "invalid addressPrefixes sorting"
                        ))
                    }
                }
                if prefixes.len() + 1 >= config.max_prefixes {
                    return Err(cons.content_err(
                        "too many addressPrefixes entries"
                    ))
                }
                prefixes.push(prefix);
            }
            Ok(())
        })?;
        if prefixes.len() == start {
            return Err(cons.content_err("empty AddressFamilyPrefixes"))
        }
        Ok(())
    }

    /// Returns a value encoder for a reference to the content.
    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            // version is DEFAULT
            self.as_id.encode(),
            encode::sequence((
                Self::encode_block(AddressFamily::Ipv4, self.v4_prefixes()),
                Self::encode_block(AddressFamily::Ipv6, self.v6_prefixes()),
            ))
        ))
    }

    fn encode_block(
        family: AddressFamily,
        prefixes: &[SplPrefix],
    ) -> Option<impl encode::Values + '_> {
        if prefixes.is_empty() {
            None
        }
        else {
            Some(encode::sequence((
                family.encode(),
                encode::sequence(
                    encode::slice(prefixes, |prefix: &SplPrefix| {
                        prefix.prefix().encode()
                    })
                )
            )))
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use std::str::FromStr;
    use bcder::encode::Values;
    use super::*;

    //--- Hand-rolled DER so we can produce content the encoder won’t.

    fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
        let mut res = vec![tag];
        let len = content.len();
        if len < 0x80 {
            res.push(len as u8);
        }
        else if len < 0x100 {
            res.extend_from_slice(&[0x81, len as u8]);
        }
        else {
            res.extend_from_slice(&[0x82, (len >> 8) as u8, len as u8]);
        }
        res.extend_from_slice(content);
        res
    }

    fn seq(items: &[Vec<u8>]) -> Vec<u8> {
        tlv(0x30, &items.concat())
    }

    fn asid(id: u32) -> Vec<u8> {
        let mut bytes = id.to_be_bytes().to_vec();
        while bytes.len() > 1 && bytes[0] == 0 && bytes[1] & 0x80 == 0 {
            bytes.remove(0);
        }
        if bytes[0] & 0x80 != 0 {
            bytes.insert(0, 0);
        }
        tlv(0x02, &bytes)
    }

    fn bits(prefix: &str) -> Vec<u8> {
        let prefix = SplPrefix::from_str(prefix).unwrap();
        prefix.prefix().encode().to_captured(Mode::Der).into_bytes().to_vec()
    }

    fn block(afi: &[u8], prefixes: &[&str]) -> Vec<u8> {
        seq(&[
            tlv(0x04, afi),
            seq(&prefixes.iter().map(|p| bits(p)).collect::<Vec<_>>()),
        ])
    }

    fn v4(prefixes: &[&str]) -> Vec<u8> {
        block(b"\x00\x01", prefixes)
    }

    fn v6(prefixes: &[&str]) -> Vec<u8> {
        block(b"\x00\x02", prefixes)
    }

    fn content(blocks: &[Vec<u8>]) -> Vec<u8> {
        seq(&[asid(64496), seq(blocks)])
    }

    fn decode(data: Vec<u8>) -> Result<SignedPrefixList, String> {
        SignedPrefixList::decode(
            bytes::Bytes::from(data), &SplConfig::default()
        ).map_err(|err| err.to_string())
    }

    fn assert_rejected(data: Vec<u8>, reason: &str) {
        match decode(data) {
            Ok(spl) => panic!("accepted {:?}", spl),
            Err(err) => {
                assert!(err.contains(reason), "{} doesn’t contain {}", err, reason)
            }
        }
    }

    fn pfx(s: &str) -> SplPrefix {
        SplPrefix::from_str(s).unwrap()
    }

    #[test]
    fn decode_valid() {
        let spl = decode(content(&[
            v4(&["10.0.0.0/16", "10.0.0.0/24", "192.0.2.0/24"]),
            v6(&["2001:db8::/32", "2001:db8:1::/48"]),
        ])).unwrap();
        assert_eq!(spl.as_id(), Asn::from_u32(64496));
        assert_eq!(
            spl.prefixes(),
            &[
                pfx("10.0.0.0/16"), pfx("10.0.0.0/24"), pfx("192.0.2.0/24"),
                pfx("2001:db8::/32"), pfx("2001:db8:1::/48"),
            ]
        );
        assert_eq!(spl.v4_prefixes().len(), 3);
        assert_eq!(spl.v6_prefixes().len(), 2);
    }

    #[test]
    fn decode_single_family_and_empty() {
        let spl = decode(content(&[v6(&["2001:db8::/32"])])).unwrap();
        assert!(spl.v4_prefixes().is_empty());
        assert_eq!(spl.v6_prefixes(), &[pfx("2001:db8::/32")]);

        let spl = decode(content(&[])).unwrap();
        assert!(spl.prefixes().is_empty());
    }

    #[test]
    fn decode_version() {
        // Explicit version 0 is fine for BER only.
        let data = seq(&[
            tlv(0xa0, &tlv(0x02, &[0])), asid(64496),
            seq(&[v4(&["10.0.0.0/8"])])
        ]);
        assert_rejected(data.clone(), "incorrect encoding");
        let config = SplConfig { strict: false, .. Default::default() };
        assert!(
            SignedPrefixList::decode(bytes::Bytes::from(data), &config).is_ok()
        );

        let data = seq(&[
            tlv(0xa0, &tlv(0x02, &[1])), asid(64496),
            seq(&[v4(&["10.0.0.0/8"])])
        ]);
        assert_rejected(data, "unsupported SignedPrefixList version");
    }

    #[test]
    fn reject_bad_as_id() {
        assert_rejected(
            seq(&[tlv(0x02, &[0xff]), seq(&[v4(&["10.0.0.0/8"])])]),
            "malformed AS identifier"
        );
        assert_rejected(
            seq(&[
                tlv(0x02, &[1, 0, 0, 0, 0]), seq(&[v4(&["10.0.0.0/8"])])
            ]),
            "malformed AS identifier"
        );
    }

    #[test]
    fn reject_block_structure() {
        assert_rejected(
            content(&[v4(&["10.0.0.0/8"]), v4(&["11.0.0.0/8"])]),
            "addressFamilyIPv4 appeared twice"
        );
        assert_rejected(
            content(&[v6(&["2001:db8::/32"]), v6(&["2001:db9::/32"])]),
            "addressFamilyIPv6 appeared twice"
        );
        assert_rejected(
            content(&[v6(&["2001:db8::/32"]), v4(&["10.0.0.0/8"])]),
            "invalid sorting, IPv6 before IPv4"
        );
        assert_rejected(
            content(&[
                v4(&["10.0.0.0/8"]), v6(&["2001:db8::/32"]),
                v6(&["2001:db9::/32"])
            ]),
            "more than two AddressFamilyPrefixes"
        );
        assert_rejected(content(&[v4(&[])]), "empty AddressFamilyPrefixes");
        assert_rejected(
            content(&[block(b"\x00\x03", &["10.0.0.0/8"])]),
            "unknown address family"
        );
        assert_rejected(
            content(&[block(b"\x00\x01\x01", &["10.0.0.0/8"])]),
            "unknown address family"
        );
    }

    #[test]
    fn reject_prefix_sorting() {
        // Accepted in ascending order ...
        assert!(decode(content(&[v4(&["10.0.0.0/16", "10.0.0.0/24"])])).is_ok());
        // ... rejected in descending order ...
        assert_rejected(
            content(&[v4(&["10.0.0.0/24", "10.0.0.0/16"])]),
            "invalid addressPrefixes sorting"
        );
        // ... and with duplicates.
        assert_rejected(
            content(&[v6(&["2001:db8::/32", "2001:db8::/32"])]),
            "invalid addressPrefixes sorting"
        );
    }

    #[test]
    fn reject_bad_prefix() {
        // An IPv6 prefix in the IPv4 block.
        assert_rejected(
            content(&[v4(&["2001:db8::/40"])]),
            "address too long for family"
        );
        // Bits set past the prefix length: 10.0.1.0/23 with the unused
        // bit set.
        let data = content(&[seq(&[
            tlv(0x04, b"\x00\x01"),
            seq(&[tlv(0x03, &[1, 10, 0, 1])]),
        ])]);
        assert!(decode(data.clone()).is_err());
        let config = SplConfig { strict: false, .. Default::default() };
        let spl = SignedPrefixList::decode(
            bytes::Bytes::from(data), &config
        ).unwrap();
        assert_eq!(spl.prefixes(), &[pfx("10.0.0.0/23")]);
    }

    #[test]
    fn reject_too_many() {
        // The count must stay below the maximum, across both blocks.
        let config = SplConfig { max_prefixes: 3, .. Default::default() };
        let ok = content(&[v4(&["10.0.0.0/8"]), v6(&["2001:db8::/32"])]);
        assert!(
            SignedPrefixList::decode(bytes::Bytes::from(ok), &config).is_ok()
        );
        for bad in [
            content(&[
                v4(&["10.0.0.0/8"]), v6(&["2001:db8::/32", "2001:db9::/32"])
            ]),
            content(&[v4(&["10.0.0.0/8", "11.0.0.0/8", "12.0.0.0/8"])]),
        ] {
            let err = SignedPrefixList::decode(
                bytes::Bytes::from(bad), &config
            ).unwrap_err();
            assert!(
                err.to_string().contains("too many addressPrefixes entries")
            );
        }
    }

    #[test]
    fn reject_trailing_data() {
        let data = content(&[v4(&["10.0.0.0/8"])]);
        assert!(decode(data.clone()).is_ok());

        let mut trailing = data.clone();
        trailing.extend_from_slice(&[0x05, 0x00]);
        assert_rejected(trailing, "trailing garbage in eContent");

        // Not even a complete value.
        let mut trailing = data.clone();
        trailing.push(0x30);
        assert_rejected(trailing, "trailing garbage in eContent");

        // Same for a slice source and for BER.
        let mut trailing = data;
        trailing.push(0);
        let config = SplConfig { strict: false, .. Default::default() };
        assert!(
            SignedPrefixList::decode(trailing.as_slice(), &config).is_err()
        );
    }

    #[test]
    fn encode_decode() {
        let spl = SignedPrefixList::new(
            Asn::from_u32(64496),
            vec![
                pfx("2001:db8::/32"), pfx("192.0.2.0/24"),
                pfx("10.0.0.0/8"), pfx("192.0.2.0/24"),
            ]
        );
        assert_eq!(spl.prefixes().len(), 3);
        let encoded = spl.encode_ref().to_captured(Mode::Der).into_bytes();
        assert_eq!(
            encoded.as_ref(),
            content(&[
                v4(&["10.0.0.0/8", "192.0.2.0/24"]), v6(&["2001:db8::/32"])
            ]).as_slice()
        );
        assert_eq!(decode(encoded.to_vec()).unwrap(), spl);
    }
}
