//! Analysis cache with time-based invalidation.
//!
//! Two states: `Fresh` when the stored result may be served, `Stale`
//! otherwise. A result is fresh only while all of these hold: it exists and
//! was not invalidated, no refresh was forced, the symbol matches, less than
//! `ttl` has elapsed, its confidence is at or above the usability floor and
//! the registry generation it was computed against is still current.

use crate::models::AnalysisResult;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
    Stale,
    Fresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleReason {
    Empty,
    Invalidated,
    ForcedRefresh,
    SymbolChanged,
    Expired,
    BelowConfidenceFloor,
    RegistryChanged,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    result: AnalysisResult,
    symbol: String,
    computed_at: DateTime<Utc>,
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct AnalysisCache {
    entry: Option<CacheEntry>,
    ttl: Duration,
    confidence_floor: f64,
    invalidated: bool,
}

impl AnalysisCache {
    pub fn new(ttl: Duration, confidence_floor: f64) -> Self {
        Self {
            entry: None,
            ttl,
            confidence_floor,
            invalidated: false,
        }
    }

    /// The stored result if it may be served, otherwise why not
    pub fn check(
        &self,
        symbol: &str,
        force_refresh: bool,
        now: DateTime<Utc>,
        generation: u64,
    ) -> Result<&AnalysisResult, StaleReason> {
        let entry = self.entry.as_ref().ok_or(StaleReason::Empty)?;
        if self.invalidated {
            return Err(StaleReason::Invalidated);
        }
        if force_refresh {
            return Err(StaleReason::ForcedRefresh);
        }
        if entry.symbol != symbol {
            return Err(StaleReason::SymbolChanged);
        }
        let elapsed = now - entry.computed_at;
        if elapsed < Duration::zero() || elapsed >= self.ttl {
            return Err(StaleReason::Expired);
        }
        if entry.result.total_confidence < self.confidence_floor {
            return Err(StaleReason::BelowConfidenceFloor);
        }
        if entry.generation != generation {
            return Err(StaleReason::RegistryChanged);
        }
        Ok(&entry.result)
    }

    pub fn state(
        &self,
        symbol: &str,
        force_refresh: bool,
        now: DateTime<Utc>,
        generation: u64,
    ) -> CacheState {
        match self.check(symbol, force_refresh, now, generation) {
            Ok(_) => CacheState::Fresh,
            Err(_) => CacheState::Stale,
        }
    }

    pub fn store(
        &mut self,
        result: AnalysisResult,
        symbol: &str,
        now: DateTime<Utc>,
        generation: u64,
    ) {
        self.entry = Some(CacheEntry {
            result,
            symbol: symbol.to_string(),
            computed_at: now,
            generation,
        });
        self.invalidated = false;
    }

    /// Mark stale; the last result stays readable through [`Self::last`]
    pub fn invalidate(&mut self) {
        self.invalidated = true;
    }

    pub fn clear(&mut self) {
        self.entry = None;
        self.invalidated = false;
    }

    /// Last stored result regardless of freshness
    pub fn last(&self) -> Option<&AnalysisResult> {
        self.entry.as_ref().map(|e| &e.result)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn confidence_floor(&self) -> f64 {
        self.confidence_floor
    }
}
