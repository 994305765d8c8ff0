//! Window-keyed dispatch between the hot graph and the archive.
//!
//! A window is searched in exactly one tier: the hot index if any live record
//! falls in it, otherwise the archive. There is no fallback from one tier to
//! the other. Hot-tier searches cover the whole graph, not only the target
//! window.

use tracing::trace;

use crate::archive::{ArchiveLookup, ArchiveStore};
use crate::error::Result;
use crate::hnsw::LayeredGraphIndex;
use crate::record::SearchHit;
use crate::window::{WindowStart, Windowing};

/// Which tier serves a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Hot,
    Archive,
}

/// Ranked results tagged with the tier that produced them.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutedResults {
    /// Approximate graph search over the hot tier.
    Hot(Vec<SearchHit>),
    /// Exact scan over the window's archive partitions.
    Archive(Vec<SearchHit>),
    /// The window is neither resident nor archived.
    WindowNotFound,
}

impl RoutedResults {
    pub fn tier(&self) -> Option<Tier> {
        match self {
            RoutedResults::Hot(_) => Some(Tier::Hot),
            RoutedResults::Archive(_) => Some(Tier::Archive),
            RoutedResults::WindowNotFound => None,
        }
    }

    pub fn hits(&self) -> &[SearchHit] {
        match self {
            RoutedResults::Hot(hits) | RoutedResults::Archive(hits) => hits,
            RoutedResults::WindowNotFound => &[],
        }
    }

    pub fn into_hits(self) -> Vec<SearchHit> {
        match self {
            RoutedResults::Hot(hits) | RoutedResults::Archive(hits) => hits,
            RoutedResults::WindowNotFound => Vec::new(),
        }
    }
}

/// Borrowed view over both tiers for one query.
pub struct QueryRouter<'a> {
    index: &'a LayeredGraphIndex,
    archive: &'a ArchiveStore,
    windowing: Windowing,
}

impl<'a> QueryRouter<'a> {
    pub fn new(index: &'a LayeredGraphIndex, archive: &'a ArchiveStore, windowing: Windowing) -> Self {
        Self {
            index,
            archive,
            windowing,
        }
    }

    /// Tier that owns `window`, decided by hot-tier residency alone.
    pub fn route(&self, window: WindowStart) -> Tier {
        if self.index.resident_windows(&self.windowing).contains(&window) {
            Tier::Hot
        } else {
            Tier::Archive
        }
    }

    pub fn query(
        &self,
        query: &[f32],
        window: WindowStart,
        k: usize,
        ef: usize,
    ) -> Result<RoutedResults> {
        let tier = self.route(window);
        trace!(window, ?tier, "routing query");
        match tier {
            Tier::Hot => Ok(RoutedResults::Hot(self.index.search(query, k, ef)?)),
            Tier::Archive => match self.archive.query_vectors(query, window, k)? {
                ArchiveLookup::Hits(hits) => Ok(RoutedResults::Archive(hits)),
                ArchiveLookup::WindowNotArchived => Ok(RoutedResults::WindowNotFound),
            },
        }
    }
}
