// src/report/mod.rs
//! Chart-ready series derived from normalized revenue records.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::normalize::RevenueRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearTotal {
    pub year: i32,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    pub month: u32,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentChange {
    pub date: NaiveDate,
    pub change_pct: f64,
}

/// Every series the charts are drawn from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub time_series: Vec<TimePoint>,
    pub yearly: Vec<YearTotal>,
    pub monthly: Vec<MonthTotal>,
    pub distribution: Vec<HistogramBin>,
    pub percent_change: Vec<PercentChange>,
}

impl ChartData {
    pub fn build(records: &[RevenueRecord], bins: usize, years_before: Option<i32>) -> Self {
        Self {
            time_series: time_series(records),
            yearly: yearly_totals(records, years_before),
            monthly: monthly_totals(records),
            distribution: histogram(records, bins),
            percent_change: percent_change(records),
        }
    }
}

/// Records in ascending date order.
pub fn time_series(records: &[RevenueRecord]) -> Vec<TimePoint> {
    let mut points: Vec<TimePoint> = records
        .iter()
        .map(|r| TimePoint { date: r.date, revenue: r.revenue })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

/// Revenue summed per calendar year. With `before` set, only years strictly
/// earlier are kept, which drops a year still in progress.
pub fn yearly_totals(records: &[RevenueRecord], before: Option<i32>) -> Vec<YearTotal> {
    let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.date.year()).or_default() += record.revenue;
    }
    totals
        .into_iter()
        .filter(|(year, _)| before.map_or(true, |cutoff| *year < cutoff))
        .map(|(year, revenue)| YearTotal { year, revenue })
        .collect()
}

/// Revenue summed per calendar month (1-12) across all years.
pub fn monthly_totals(records: &[RevenueRecord]) -> Vec<MonthTotal> {
    let mut totals: BTreeMap<u32, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.date.month()).or_default() += record.revenue;
    }
    totals
        .into_iter()
        .map(|(month, revenue)| MonthTotal { month, revenue })
        .collect()
}

/// Equal-width histogram of revenue values; the last bin is closed on the right.
pub fn histogram(records: &[RevenueRecord], bins: usize) -> Vec<HistogramBin> {
    if records.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = records.iter().map(|r| r.revenue).fold(f64::INFINITY, f64::min);
    let max = records.iter().map(|r| r.revenue).fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        return vec![HistogramBin { lower: min, upper: max, count: records.len() }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for record in records {
        let index = (((record.revenue - min) / width) as usize).min(bins - 1);
        out[index].count += 1;
    }
    out
}

/// Period-over-period change in ascending date order. A period following a
/// zero value has no defined change and is skipped.
pub fn percent_change(records: &[RevenueRecord]) -> Vec<PercentChange> {
    time_series(records)
        .windows(2)
        .filter(|pair| pair[0].revenue != 0.0)
        .map(|pair| PercentChange {
            date: pair[1].date,
            change_pct: (pair[1].revenue - pair[0].revenue) / pair[0].revenue * 100.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(y: i32, m: u32, d: u32, revenue: f64) -> RevenueRecord {
        RevenueRecord { date: NaiveDate::from_ymd_opt(y, m, d).unwrap(), revenue }
    }

    // Reverse-chronological, as the source publishes it
    fn sample() -> Vec<RevenueRecord> {
        vec![
            record(2023, 3, 31, 300.0),
            record(2022, 12, 31, 400.0),
            record(2022, 9, 30, 200.0),
            record(2021, 12, 31, 100.0),
        ]
    }

    #[test]
    fn test_time_series_is_ascending() {
        let dates: Vec<i32> = time_series(&sample()).iter().map(|p| p.date.year()).collect();
        assert_eq!(dates, vec![2021, 2022, 2022, 2023]);
    }

    #[test]
    fn test_yearly_totals_with_cutoff() {
        assert_eq!(
            yearly_totals(&sample(), None),
            vec![
                YearTotal { year: 2021, revenue: 100.0 },
                YearTotal { year: 2022, revenue: 600.0 },
                YearTotal { year: 2023, revenue: 300.0 },
            ]
        );
        assert_eq!(yearly_totals(&sample(), Some(2023)).len(), 2);
    }

    #[test]
    fn test_monthly_totals() {
        assert_eq!(
            monthly_totals(&sample()),
            vec![
                MonthTotal { month: 3, revenue: 300.0 },
                MonthTotal { month: 9, revenue: 200.0 },
                MonthTotal { month: 12, revenue: 500.0 },
            ]
        );
    }

    #[test]
    fn test_histogram_counts_every_record() {
        let bins = histogram(&sample(), 3);
        assert_eq!(bins.len(), 3);
        assert_eq!(bins[0].lower, 100.0);
        assert_eq!(bins[2].upper, 400.0);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 4);
        // 400 falls into the closed last bin next to 300
        assert_eq!(bins.iter().map(|b| b.count).collect::<Vec<_>>(), vec![1, 1, 2]);
    }

    #[test]
    fn test_histogram_degenerate_inputs() {
        assert!(histogram(&[], 5).is_empty());
        let flat = vec![record(2022, 1, 1, 5.0), record(2022, 2, 1, 5.0)];
        assert_eq!(histogram(&flat, 4), vec![HistogramBin { lower: 5.0, upper: 5.0, count: 2 }]);
    }

    #[test]
    fn test_percent_change() {
        let changes = percent_change(&sample());
        let pct: Vec<f64> = changes.iter().map(|c| c.change_pct).collect();
        assert_eq!(pct, vec![100.0, 100.0, -25.0]);
        assert_eq!(changes[0].date, NaiveDate::from_ymd_opt(2022, 9, 30).unwrap());
    }

    #[test]
    fn test_percent_change_skips_zero_base() {
        let records = vec![record(2022, 1, 1, 0.0), record(2022, 4, 1, 10.0), record(2022, 7, 1, 15.0)];
        let changes = percent_change(&records);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].change_pct, 50.0);
    }
}
