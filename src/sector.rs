use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::model::PriceSeries;

/// Equal-weight close-only aggregate of a sector's constituents.
///
/// Timestamps are the union of all constituent timestamps, ascending. The
/// value at each timestamp is the mean of the closes of the constituents
/// that have a sample at that exact timestamp; absent constituents are
/// skipped, never counted as zero.
#[derive(Debug, Clone)]
pub struct SectorAggregate {
    pub timestamps: Vec<DateTime<Utc>>,
    pub closes: Vec<f64>,
}

impl SectorAggregate {
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

/// Combine per-ticker histories into one aggregate series.
///
/// Constituents with empty series contribute nothing; callers are expected
/// to have dropped (and warned about) unavailable tickers already. An empty
/// input produces an empty aggregate.
pub fn aggregate(constituents: &[(String, PriceSeries)]) -> SectorAggregate {
    let mut sums: BTreeMap<DateTime<Utc>, (f64, usize)> = BTreeMap::new();

    for (_, series) in constituents {
        for bar in series {
            let slot = sums.entry(bar.timestamp).or_insert((0.0, 0));
            slot.0 += bar.close;
            slot.1 += 1;
        }
    }

    let mut timestamps = Vec::with_capacity(sums.len());
    let mut closes = Vec::with_capacity(sums.len());
    for (ts, (sum, count)) in sums {
        timestamps.push(ts);
        closes.push(sum / count as f64);
    }

    SectorAggregate { timestamps, closes }
}
