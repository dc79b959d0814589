//! Validated Signed Prefixes.
//!
//! All SPLs seen for an AS number are merged into a single [`Vsp`]. Its
//! prefix list is the union of the prefixes of all these SPLs. It only
//! ever grows during a validation run. The trust anchor, repository, and
//! expiry time follow the SPL that expires last.
//!
//! The merged values for all AS numbers are kept in a [`VspTree`].

use std::fmt;
use std::collections::btree_map::{self, BTreeMap};
use log::{debug, trace};
use crate::resources::{Asn, SplPrefix};
use crate::spl::Spl;
use crate::stats::{ObjectType, RepoId, StatType, StatsSink};
use crate::tal::TalId;
use crate::x509::Time;


//------------ Vsp -----------------------------------------------------------

/// The merged prefixes of all SPLs for one AS number.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Vsp {
    as_id: Asn,
    talid: TalId,
    repoid: Option<RepoId>,
    expires: Time,
    prefixes: Vec<SplPrefix>,
}

impl Vsp {
    fn new(spl: &Spl, repoid: Option<RepoId>) -> Self {
        Vsp {
            as_id: spl.as_id(),
            talid: spl.talid(),
            repoid,
            expires: spl.expires(),
            prefixes: spl.prefixes().to_vec(),
        }
    }

    pub fn as_id(&self) -> Asn {
        self.as_id
    }

    /// Returns the trust anchor of the latest expiring SPL.
    pub fn talid(&self) -> TalId {
        self.talid
    }

    /// Returns the repository of the latest expiring SPL.
    pub fn repoid(&self) -> Option<RepoId> {
        self.repoid
    }

    /// Returns the latest expiry time of all merged SPLs.
    pub fn expires(&self) -> Time {
        self.expires
    }

    /// Returns the merged prefixes.
    ///
    /// These are strictly ascending and thus free of duplicates.
    pub fn prefixes(&self) -> &[SplPrefix] {
        &self.prefixes
    }

    /// Merges the prefixes of an SPL.
    ///
    /// Both lists are sorted, so we walk them in lockstep and insert
    /// whatever is missing at the current position.
    fn merge_prefixes(&mut self, prefixes: &[SplPrefix]) {
        let mut pos = 0;
        for &prefix in prefixes {
            while pos < self.prefixes.len() && self.prefixes[pos] < prefix {
                pos += 1;
            }
            if self.prefixes.get(pos) != Some(&prefix) {
                self.prefixes.insert(pos, prefix);
            }
            pos += 1;
        }
    }
}

impl fmt::Display for Vsp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({}, expires {}):", self.as_id, self.talid, self.expires)?;
        let mut first = true;
        for prefix in &self.prefixes {
            if first {
                write!(f, " {}", prefix)?;
                first = false;
            }
            else {
                write!(f, ", {}", prefix)?;
            }
        }
        Ok(())
    }
}


//------------ VspTree -------------------------------------------------------

/// The VSPs of all AS numbers, ordered by AS number.
///
/// An AS number, once added, stays. Merging needs exclusive access, so a
/// tree shared between threads has to live behind a lock such as a
/// [`Mutex`][std::sync::Mutex].
#[derive(Clone, Debug, Default)]
pub struct VspTree {
    vsps: BTreeMap<Asn, Vsp>,
}

impl VspTree {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the number of AS numbers in the tree.
    pub fn len(&self) -> usize {
        self.vsps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vsps.is_empty()
    }

    pub fn get(&self, as_id: Asn) -> Option<&Vsp> {
        self.vsps.get(&as_id)
    }

    /// Returns an iterator over the VSPs in order of their AS numbers.
    pub fn iter(&self) -> impl Iterator<Item = &Vsp> + '_ {
        self.vsps.values()
    }

    /// Merges an SPL into the tree.
    ///
    /// The SPL is merged whether it is valid or not. Callers that only
    /// want valid SPLs need to check [`Spl::valid`] first.
    ///
    /// If the AS number is new, a VSP is created from the SPL. Otherwise
    /// the SPL’s prefixes are added to the existing VSP and, if the SPL
    /// expires later, the VSP takes over its trust anchor, repository and
    /// expiry time.
    ///
    /// `repoid` is the repository the SPL was fetched from. What happens
    /// is reported to `stats`.
    pub fn insert(
        &mut self,
        spl: &Spl,
        repoid: Option<RepoId>,
        mut stats: impl StatsSink,
    ) {
        match self.vsps.entry(spl.as_id()) {
            btree_map::Entry::Vacant(entry) => {
                debug!("VSP for {}: new from {}", spl.as_id(), spl.talid());
                stats.record(
                    repoid, spl.talid(), ObjectType::Spl, StatType::Unique
                );
                entry.insert(Vsp::new(spl, repoid));
            }
            btree_map::Entry::Occupied(mut entry) => {
                let vsp = entry.get_mut();
                if spl.expires() > vsp.expires {
                    trace!(
                        "VSP for {}: attribution moves from {} to {}",
                        vsp.as_id, vsp.talid, spl.talid()
                    );
                    stats.record(
                        vsp.repoid, vsp.talid,
                        ObjectType::Spl, StatType::DecUnique
                    );
                    vsp.expires = spl.expires();
                    vsp.talid = spl.talid();
                    vsp.repoid = repoid;
                    stats.record(
                        repoid, spl.talid(), ObjectType::Spl, StatType::Unique
                    );
                }
                vsp.merge_prefixes(spl.prefixes());
            }
        }
        stats.record(repoid, spl.talid(), ObjectType::Spl, StatType::Total);
    }
}

impl<'a> IntoIterator for &'a VspTree {
    type Item = &'a Vsp;
    type IntoIter = btree_map::Values<'a, Asn, Vsp>;

    fn into_iter(self) -> Self::IntoIter {
        self.vsps.values()
    }
}


//============ Tests =========================================================
