//! Weekly and monthly training summaries.
//!
//! `aggregate` is a pure function of the record collection and the reference
//! day. Callers run it again after every create or delete; nothing here keeps
//! state between calls.

use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{models::FitnessRecord, types::BodyPart};

/// A calendar month, displayed and looked up as `2024年6月`. `month` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}年{}月", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || format!("`{s}` is not a month key like 2024年6月");
        let (year, rest) = s.trim().split_once('年').ok_or_else(bad)?;
        let month = rest.strip_suffix('月').ok_or_else(bad)?;
        let year: i32 = year.parse().map_err(|_| bad())?;
        let month: u32 = month.parse().map_err(|_| bad())?;
        Self::new(year, month).ok_or_else(bad)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Summary of one bucket of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeRangeStats {
    pub total_sessions: usize,
    /// Only parts that occur in the bucket have an entry.
    pub parts: BTreeMap<BodyPart, usize>,
    pub records: Vec<FitnessRecord>,
}

impl TimeRangeStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a FitnessRecord>) -> Self {
        let mut stats = Self::default();
        for r in records {
            stats.push(r);
        }
        stats
    }

    fn push(&mut self, record: &FitnessRecord) {
        self.total_sessions += 1;
        *self.parts.entry(record.part).or_default() += 1;
        self.records.push(record.clone());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsData {
    pub current_week: TimeRangeStats,
    pub current_month: TimeRangeStats,
    pub monthly: BTreeMap<MonthKey, TimeRangeStats>,
}

impl StatsData {
    pub fn month(&self, year: i32, month: u32) -> Option<&TimeRangeStats> {
        self.monthly.get(&MonthKey::new(year, month)?)
    }

    pub fn months_newest_first(&self) -> impl Iterator<Item = (&MonthKey, &TimeRangeStats)> {
        self.monthly.iter().rev()
    }
}

/// Monday of the week containing `today`.
pub fn week_start(today: NaiveDate) -> NaiveDate {
    let back = today.weekday().num_days_from_monday();
    today
        .checked_sub_days(Days::new(back.into()))
        .unwrap_or(NaiveDate::MIN)
}

/// Bucket `records` into the current week (Monday of `today` onwards, no upper
/// bound), the current calendar month, and one bucket per month seen.
/// Records keep their input order inside every bucket.
pub fn aggregate(records: &[FitnessRecord], today: NaiveDate) -> StatsData {
    let monday = week_start(today);
    let this_month = MonthKey::of(today);

    let current_week = TimeRangeStats::from_records(records.iter().filter(|r| r.date >= monday));
    let current_month =
        TimeRangeStats::from_records(records.iter().filter(|r| MonthKey::of(r.date) == this_month));

    let mut monthly: BTreeMap<MonthKey, TimeRangeStats> = BTreeMap::new();
    for r in records {
        monthly.entry(MonthKey::of(r.date)).or_default().push(r);
    }

    StatsData { current_week, current_month, monthly }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DATE_FMT, NewRecord};

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FMT).unwrap()
    }

    fn rec(id: &str, date: &str, part: BodyPart) -> FitnessRecord {
        NewRecord::new(day(date), part).exercise("x").into_record(id.to_string())
    }

    #[test]
    fn week_starts_on_monday() {
        assert_eq!(week_start(day("2024-06-12")), day("2024-06-10")); // Wednesday
        assert_eq!(week_start(day("2024-06-10")), day("2024-06-10")); // Monday
        assert_eq!(week_start(day("2024-06-16")), day("2024-06-10")); // Sunday
        assert_eq!(week_start(day("2024-06-17")), day("2024-06-17"));
        assert_eq!(week_start(day("2024-03-01")), day("2024-02-26"));
    }

    #[test]
    fn week_boundary_is_inclusive_and_unbounded_above() {
        let records = vec![
            rec("a", "2024-06-09", BodyPart::Legs),
            rec("b", "2024-06-10", BodyPart::Legs),
            rec("c", "2024-06-12", BodyPart::Back),
            rec("d", "2024-06-30", BodyPart::Back),
        ];
        let stats = aggregate(&records, day("2024-06-12"));
        let ids: Vec<_> = stats.current_week.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "d"]);
        assert_eq!(stats.current_week.total_sessions, 3);
        assert_eq!(stats.current_week.parts[&BodyPart::Legs], 1);
        assert_eq!(stats.current_week.parts[&BodyPart::Back], 2);
    }

    #[test]
    fn monthly_histogram() {
        let records = vec![
            rec("1", "2024-06-01", BodyPart::Legs),
            rec("2", "2024-06-15", BodyPart::Legs),
            rec("3", "2024-07-01", BodyPart::Back),
        ];
        let stats = aggregate(&records, day("2024-07-03"));

        let june: MonthKey = "2024年6月".parse().unwrap();
        let july: MonthKey = "2024年7月".parse().unwrap();
        assert_eq!(stats.monthly[&june].total_sessions, 2);
        assert_eq!(stats.monthly[&july].total_sessions, 1);
        assert_eq!(stats.monthly[&june].parts[&BodyPart::Legs], 2);
        assert!(!stats.monthly[&june].parts.contains_key(&BodyPart::Back));

        assert_eq!(stats.current_month, stats.monthly[&july]);
        assert_eq!(stats.month(2024, 6), Some(&stats.monthly[&june]));
        assert_eq!(stats.month(2024, 5), None);
        assert_eq!(stats.month(2024, 13), None);
    }

    #[test]
    fn current_month_matches_year_too() {
        let records = vec![
            rec("1", "2023-06-20", BodyPart::Arms),
            rec("2", "2024-06-20", BodyPart::Arms),
        ];
        let stats = aggregate(&records, day("2024-06-21"));
        assert_eq!(stats.current_month.total_sessions, 1);
        assert_eq!(stats.current_month.records[0].id, "2");
    }

    #[test]
    fn every_record_lands_in_exactly_one_month() {
        let parts = BodyPart::ALL;
        let mut records = Vec::new();
        let mut d = day("2023-11-20");
        for i in 0..200 {
            records.push(rec(&i.to_string(), &d.format(DATE_FMT).to_string(), parts[i % parts.len()]));
            d = d + Days::new((i % 3) as u64);
        }

        let today = day("2024-01-17");
        let stats = aggregate(&records, today);
        let total: usize = stats.monthly.values().map(|m| m.total_sessions).sum();
        assert_eq!(total, records.len());

        let expected_week = records.iter().filter(|r| r.date >= week_start(today)).count();
        assert_eq!(stats.current_week.total_sessions, expected_week);

        for bucket in stats.monthly.values() {
            assert_eq!(bucket.parts.values().sum::<usize>(), bucket.total_sessions);
        }
    }

    #[test]
    fn aggregate_is_deterministic() {
        let records = vec![
            rec("1", "2024-06-11", BodyPart::Chest),
            rec("2", "2024-05-02", BodyPart::Cardio),
            rec("3", "2024-06-12", BodyPart::Chest),
        ];
        let today = day("2024-06-12");
        assert_eq!(aggregate(&records, today), aggregate(&records, today));
    }

    #[test]
    fn empty_input_gives_empty_views() {
        let stats = aggregate(&[], day("2024-06-12"));
        assert_eq!(stats, StatsData::default());
    }

    #[test]
    fn month_key_round_trips_and_orders_chronologically() {
        let key = MonthKey::new(2024, 6).unwrap();
        assert_eq!(key.to_string(), "2024年6月");
        assert_eq!("2024年6月".parse::<MonthKey>(), Ok(key));
        assert!("2024年13月".parse::<MonthKey>().is_err());
        assert!("2024-06".parse::<MonthKey>().is_err());

        let mut keys: Vec<MonthKey> = ["2024年10月", "2023年12月", "2024年9月"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        keys.sort();
        let shown: Vec<_> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(shown, ["2023年12月", "2024年9月", "2024年10月"]);
    }

    #[test]
    fn serializes_month_keys_as_labels() {
        let records = vec![rec("1", "2024-06-11", BodyPart::Chest)];
        let json = serde_json::to_value(aggregate(&records, day("2024-06-12"))).unwrap();
        assert_eq!(json["monthly"]["2024年6月"]["total_sessions"], 1);
        assert_eq!(json["current_week"]["parts"]["胸"], 1);
    }
}
