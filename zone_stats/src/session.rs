//! Session state: the canonical row set and the load sequencing.

use log::{info, warn};

use crate::config::*;
use crate::aggregate_zone;

/// Ticket handed out when a load starts. A completion is only accepted if
/// its ticket is still the most recent one.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct LoadSeq(u64);

/// The per-session context: the in-memory canonical row set, the zone
/// mode, and a monotonic load counter.
///
/// The row set is replaced wholesale on each successful load, never merged
/// or partially mutated. When two loads overlap, the later-started one
/// wins: a slow completion carrying a stale [LoadSeq] is discarded, so a
/// first load finishing after a superseding second load cannot clobber it.
#[derive(Debug, Clone)]
pub struct Session {
    rows: Vec<CanonicalRow>,
    mode: ZoneMode,
    loaded: bool,
    load_seq: u64,
}

impl Session {
    pub fn new(mode: ZoneMode) -> Session {
        Session {
            rows: Vec::new(),
            mode,
            loaded: false,
            load_seq: 0,
        }
    }

    pub fn mode(&self) -> ZoneMode {
        self.mode
    }

    /// Starts a load and returns its ticket.
    pub fn begin_load(&mut self) -> LoadSeq {
        self.load_seq += 1;
        LoadSeq(self.load_seq)
    }

    /// Installs a freshly normalized row set, replacing the previous one.
    /// Returns false (and leaves the state untouched) when a newer load
    /// has started since `seq` was issued.
    pub fn complete_load(&mut self, seq: LoadSeq, rows: Vec<CanonicalRow>) -> bool {
        if seq.0 != self.load_seq {
            warn!(
                "complete_load: discarding stale load {} (current is {})",
                seq.0, self.load_seq
            );
            return false;
        }
        info!("complete_load: installing {} rows", rows.len());
        self.rows = rows;
        self.loaded = true;
        true
    }

    /// A failed load leaves the previous row set intact and invalidates
    /// the ticket, so a completion arriving after the failure report is
    /// discarded too.
    pub fn fail_load(&mut self, seq: LoadSeq) {
        warn!("fail_load: load {} aborted, keeping previous data", seq.0);
        if seq.0 == self.load_seq {
            self.load_seq += 1;
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[CanonicalRow] {
        &self.rows
    }

    /// The distinct years present in the loaded data, ascending. This is
    /// what populates a year-selector control.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.rows.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Runs one aggregation pass over the current row set.
    ///
    /// Asking for an aggregate before any successful load is a
    /// precondition failure surfaced as [ZoneStatsError::NoData], so the
    /// caller can show guidance instead of an empty table.
    pub fn aggregate(
        &self,
        zone: &ZoneDescriptor,
        selection: YearSelection,
    ) -> Result<AggregateResult, ZoneStatsError> {
        if !self.loaded {
            return Err(ZoneStatsError::NoData);
        }
        Ok(aggregate_zone(&self.rows, zone, selection))
    }
}
