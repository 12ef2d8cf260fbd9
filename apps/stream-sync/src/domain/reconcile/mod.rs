//! Reconciliation Engine
//!
//! Merges a channel's push-delivered buffer contents with the latest
//! polled snapshot for the same channel into one deduplicated,
//! deterministically ordered view.
//!
//! # Algorithm
//!
//! 1. Concatenate stream records before polled records (the stream is
//!    fresher).
//! 2. Deduplicate by stable identity, first occurrence wins — the
//!    shadow rule: a stream record always shadows a polled record
//!    with the same identity.
//! 3. Stable-sort descending by the channel's ranking field, so ties
//!    keep their prior relative order.
//!
//! Reconciliation is best-effort: records arriving as raw JSON are
//! decoded leniently and anything with a missing identity or a
//! malformed numeric field is excluded, never surfaced as an error.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

use crate::domain::records::{ArbitrageOpportunity, PriceUpdate, YieldOpportunity};

// =============================================================================
// Identity and ranking
// =============================================================================

/// Identity and ranking for records that can be reconciled.
pub trait Reconcile {
    /// Stable identity used for deduplication.
    fn merge_key(&self) -> String;

    /// Ranking value; reconciled views sort descending on this.
    fn rank(&self) -> f64;
}

impl Reconcile for PriceUpdate {
    fn merge_key(&self) -> String {
        // Price ticks have no single id field; symbol plus timestamp
        // identifies one observation.
        format!("{}@{}", self.symbol, self.timestamp.timestamp_millis())
    }

    fn rank(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        {
            self.timestamp.timestamp_millis() as f64
        }
    }
}

impl Reconcile for ArbitrageOpportunity {
    fn merge_key(&self) -> String {
        self.opportunity_id.clone()
    }

    fn rank(&self) -> f64 {
        self.profit_percent
    }
}

impl Reconcile for YieldOpportunity {
    fn merge_key(&self) -> String {
        self.pool_address.clone()
    }

    fn rank(&self) -> f64 {
        self.apy
    }
}

// =============================================================================
// Reconciliation
// =============================================================================

/// Merge stream records with a polled snapshot.
///
/// Pure and deterministic: inputs are not mutated, identical inputs
/// produce identical output, and the output never contains two
/// records with the same identity.
///
/// # Example
///
/// ```rust
/// use defi_stream_sync::domain::reconcile::{Reconcile, reconcile};
///
/// #[derive(Clone)]
/// struct R(u32, f64);
/// impl Reconcile for R {
///     fn merge_key(&self) -> String { self.0.to_string() }
///     fn rank(&self) -> f64 { self.1 }
/// }
///
/// let stream = vec![R(1, 5.0)];
/// let polled = vec![R(1, 1.0), R(2, 9.0)];
/// let merged = reconcile(&stream, &polled);
///
/// // Stream value wins on id 1; sorted descending by rank.
/// assert_eq!(merged.len(), 2);
/// assert_eq!(merged[0].0, 2);
/// assert_eq!(merged[1].1, 5.0);
/// ```
#[must_use]
pub fn reconcile<T>(stream: &[T], polled: &[T]) -> Vec<T>
where
    T: Reconcile + Clone,
{
    let mut seen = HashSet::with_capacity(stream.len() + polled.len());
    let mut merged: Vec<T> = stream
        .iter()
        .chain(polled.iter())
        .filter(|record| seen.insert(record.merge_key()))
        .cloned()
        .collect();

    // Stable sort: equal ranks keep their stream-before-polled order.
    merged.sort_by(|a, b| b.rank().total_cmp(&a.rank()));
    merged
}

/// Decode raw JSON values into typed records, dropping failures.
///
/// Malformed records (missing identity fields, unparseable numerics)
/// are logged at debug level and excluded.
#[must_use]
pub fn decode_lenient<T>(values: &[serde_json::Value]) -> Vec<T>
where
    T: DeserializeOwned,
{
    values
        .iter()
        .filter_map(|value| match serde_json::from_value(value.clone()) {
            Ok(record) => Some(record),
            Err(error) => {
                tracing::debug!(%error, "Dropping malformed record");
                None
            }
        })
        .collect()
}

/// Lenient-decode both sides, then [`reconcile`] them.
#[must_use]
pub fn reconcile_values<T>(
    stream: &[serde_json::Value],
    polled: &[serde_json::Value],
) -> Vec<T>
where
    T: Reconcile + DeserializeOwned + Clone,
{
    reconcile(&decode_lenient::<T>(stream), &decode_lenient::<T>(polled))
}

// =============================================================================
// Yield aggregation
// =============================================================================

/// Rollup of one protocol or chain group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupRollup {
    /// Number of pools in the group.
    pub count: usize,
    /// Summed TVL across the group.
    pub total_tvl: Decimal,
    /// Mean APY across the group; zero when the group is empty.
    pub avg_apy: f64,
}

/// Summary statistics over a reconciled yield set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct YieldSummary {
    /// Number of pools.
    pub count: usize,
    /// Mean APY; zero when the set is empty.
    pub avg_apy: f64,
    /// Highest APY in the set.
    pub max_apy: f64,
    /// Summed TVL.
    pub total_tvl: Decimal,
    /// Rollups keyed by protocol name.
    pub by_protocol: BTreeMap<String, GroupRollup>,
    /// Rollups keyed by chain name.
    pub by_chain: BTreeMap<String, GroupRollup>,
}

/// Compute summary statistics over a set of yield records.
#[must_use]
pub fn summarize_yields(records: &[YieldOpportunity]) -> YieldSummary {
    let mut summary = YieldSummary::default();
    let mut apy_sum = 0.0_f64;
    let mut protocol_apy: BTreeMap<String, f64> = BTreeMap::new();
    let mut chain_apy: BTreeMap<String, f64> = BTreeMap::new();

    for record in records {
        summary.count += 1;
        apy_sum += record.apy;
        summary.max_apy = summary.max_apy.max(record.apy);
        summary.total_tvl += record.tvl;

        let protocol = summary
            .by_protocol
            .entry(record.protocol_name.clone())
            .or_default();
        protocol.count += 1;
        protocol.total_tvl += record.tvl;
        *protocol_apy.entry(record.protocol_name.clone()).or_default() += record.apy;

        let chain = summary.by_chain.entry(record.chain.clone()).or_default();
        chain.count += 1;
        chain.total_tvl += record.tvl;
        *chain_apy.entry(record.chain.clone()).or_default() += record.apy;
    }

    summary.avg_apy = mean(apy_sum, summary.count);
    for (name, rollup) in &mut summary.by_protocol {
        rollup.avg_apy = mean(protocol_apy.get(name).copied().unwrap_or_default(), rollup.count);
    }
    for (name, rollup) in &mut summary.by_chain {
        rollup.avg_apy = mean(chain_apy.get(name).copied().unwrap_or_default(), rollup.count);
    }

    summary
}

/// Mean with a division-by-zero guard: empty groups report zero.
fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        {
            sum / count as f64
        }
    }
}
