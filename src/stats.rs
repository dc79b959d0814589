//! Statistics collected while merging.
//!
//! Merging an SPL into a [`VspTree`][crate::vsp::VspTree] reports what
//! happened to a [`StatsSink`]. Recording is fire and forget. The sink for
//! `()` drops everything, [`RepoStats`] counts per repository and trust
//! anchor.

use std::collections::HashMap;
use std::fmt;
use crate::tal::TalId;


//------------ RepoId --------------------------------------------------------

/// The identifier of the repository an object was fetched from.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RepoId(u32);

impl RepoId {
    pub const fn from_u32(id: u32) -> Self {
        RepoId(id)
    }

    pub fn into_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for RepoId {
    fn from(id: u32) -> Self {
        RepoId(id)
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "repo#{}", self.0)
    }
}


//------------ ObjectType ----------------------------------------------------

/// The kind of object a statistic is about.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ObjectType {
    Spl,
}


//------------ StatType ------------------------------------------------------

/// What happened to an object.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StatType {
    /// An AS is now attributed to the repository and trust anchor.
    Unique,

    /// An AS is no longer attributed to the repository and trust anchor.
    DecUnique,

    /// An object was merged.
    Total,
}


//------------ StatsSink -----------------------------------------------------

/// A type receiving statistics.
pub trait StatsSink {
    fn record(
        &mut self,
        repo: Option<RepoId>,
        talid: TalId,
        kind: ObjectType,
        stat: StatType,
    );
}

impl StatsSink for () {
    fn record(
        &mut self, _: Option<RepoId>, _: TalId, _: ObjectType, _: StatType
    ) { }
}

impl<'a, T: StatsSink + ?Sized> StatsSink for &'a mut T {
    fn record(
        &mut self,
        repo: Option<RepoId>,
        talid: TalId,
        kind: ObjectType,
        stat: StatType,
    ) {
        (**self).record(repo, talid, kind, stat)
    }
}


//------------ RepoStats -----------------------------------------------------

/// In-memory SPL counters per repository and trust anchor.
#[derive(Clone, Debug, Default)]
pub struct RepoStats {
    counters: HashMap<(Option<RepoId>, TalId), SplCounters>,
}

impl RepoStats {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the counters for a repository and trust anchor.
    ///
    /// Pairs nothing was recorded for have all counters at zero.
    pub fn get(&self, repo: Option<RepoId>, talid: TalId) -> SplCounters {
        self.counters.get(&(repo, talid)).copied().unwrap_or_default()
    }

    /// Returns an iterator over all pairs with counters.
    pub fn iter(
        &self
    ) -> impl Iterator<Item = (Option<RepoId>, TalId, SplCounters)> + '_ {
        self.counters.iter().map(|(&(repo, talid), &counters)| {
            (repo, talid, counters)
        })
    }

    /// Returns the counters summed over all pairs.
    pub fn sum(&self) -> SplCounters {
        self.counters.values().fold(SplCounters::default(), |acc, item| {
            SplCounters {
                total: acc.total + item.total,
                unique: acc.unique + item.unique,
            }
        })
    }
}

impl StatsSink for RepoStats {
    fn record(
        &mut self,
        repo: Option<RepoId>,
        talid: TalId,
        _kind: ObjectType,
        stat: StatType,
    ) {
        let counters = self.counters.entry((repo, talid)).or_default();
        match stat {
            StatType::Unique => counters.unique += 1,
            StatType::DecUnique => {
                counters.unique = counters.unique.saturating_sub(1)
            }
            StatType::Total => counters.total += 1,
        }
    }
}


//------------ SplCounters ---------------------------------------------------

/// The SPL counters for one repository and trust anchor.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SplCounters {
    /// The number of SPLs merged.
    pub total: u64,

    /// The number of AS numbers currently attributed.
    pub unique: u64,
}


//============ Tests =========================================================
