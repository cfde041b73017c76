use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::{Error, Result};
use crate::types::BodyPart;

pub const DATE_FMT: &str = "%Y-%m-%d";

/// Quantity of a single entry. Exactly one shape per record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Payload {
    Sets { sets: u32, reps: u32 },
    Distance { meters: f64 },
    Time { minutes: u32, seconds: u32 },
}

impl Payload {
    fn validate(&self) -> Result<()> {
        match *self {
            Self::Sets { sets, reps } => {
                if sets == 0 || reps == 0 {
                    return Err(Error::validation("sets and reps must both be at least 1"));
                }
            }
            Self::Distance { meters } => {
                if !meters.is_finite() || meters <= 0.0 {
                    return Err(Error::validation("distance must be a positive number of meters"));
                }
            }
            Self::Time { seconds, .. } => {
                if seconds > 59 {
                    return Err(Error::validation("seconds must be between 0 and 59"));
                }
            }
        }
        Ok(())
    }

    /// Rebuild a payload from the nullable table columns. Values that break
    /// the payload rules (negative counts, seconds past 59, ...) are an error
    /// message naming the problem.
    pub fn from_columns(
        sets: Option<i64>,
        reps: Option<i64>,
        distance: Option<f64>,
        minutes: Option<i64>,
        seconds: Option<i64>,
    ) -> std::result::Result<Option<Self>, String> {
        let count = |name: &str, v: i64| {
            u32::try_from(v).map_err(|_| format!("{name} must not be negative, got {v}"))
        };
        let payload = match (sets, reps, distance, minutes, seconds) {
            (Some(s), Some(r), _, _, _) => Self::Sets {
                sets: count("sets", s)?,
                reps: count("reps", r)?,
            },
            (_, _, Some(d), _, _) => Self::Distance { meters: d },
            (_, _, _, None, None) => return Ok(None),
            (_, _, _, m, s) => Self::Time {
                minutes: m.map(|v| count("minutes", v)).transpose()?.unwrap_or(0),
                seconds: s.map(|v| count("seconds", v)).transpose()?.unwrap_or(0),
            },
        };
        payload.validate().map_err(|e| match e {
            Error::Validation(msg) => msg,
            other => other.to_string(),
        })?;
        Ok(Some(payload))
    }

    /// The `(sets, reps, distance, minutes, seconds)` column values.
    pub fn columns(
        payload: Option<&Payload>,
    ) -> (Option<i64>, Option<i64>, Option<f64>, Option<i64>, Option<i64>) {
        match payload {
            Some(Self::Sets { sets, reps }) => (Some(*sets as i64), Some(*reps as i64), None, None, None),
            Some(Self::Distance { meters }) => (None, None, Some(*meters), None, None),
            Some(Self::Time { minutes, seconds }) => {
                (None, None, None, Some(*minutes as i64), Some(*seconds as i64))
            }
            None => (None, None, None, None, None),
        }
    }
}

impl Display for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sets { sets, reps } => write!(f, "{sets}组×{reps}次"),
            Self::Distance { meters } => write!(f, "{meters}米"),
            Self::Time { minutes, seconds } => write!(f, "{minutes}分{seconds}秒"),
        }
    }
}

/// One logged exercise entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessRecord {
    pub id: String,
    pub date: NaiveDate,
    pub part: BodyPart,
    pub exercise: Option<String>,
    pub payload: Option<Payload>,
}

impl FitnessRecord {
    /// Chinese weekday name, 日 for Sunday through 六 for Saturday.
    pub fn weekday_label(&self) -> &'static str {
        const DAYS: [&str; 7] = ["日", "一", "二", "三", "四", "五", "六"];
        DAYS[self.date.weekday().num_days_from_sunday() as usize]
    }
}

impl Display for FitnessRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} 星期{} {}",
            self.date.format(DATE_FMT),
            self.weekday_label(),
            self.part
        )?;
        match (&self.exercise, &self.payload) {
            (Some(ex), Some(p)) => write!(f, " {ex}: {p}"),
            (Some(ex), None) => write!(f, " {ex}"),
            (None, Some(p)) => write!(f, " {p}"),
            (None, None) => Ok(()),
        }
    }
}

/// Everything needed to create a record; the id is assigned by whoever
/// persists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub date: NaiveDate,
    pub part: BodyPart,
    pub exercise: Option<String>,
    pub payload: Option<Payload>,
}

impl NewRecord {
    pub fn new(date: NaiveDate, part: BodyPart) -> Self {
        Self { date, part, exercise: None, payload: None }
    }

    pub fn exercise(mut self, name: impl Into<String>) -> Self {
        self.exercise = Some(name.into());
        self
    }

    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Checks the creation rules and normalizes a blank exercise name to `None`.
    ///
    /// A record needs an exercise name, a distance or a time. Sets and reps on
    /// their own do not say what was trained.
    pub fn validate(mut self) -> Result<Self> {
        self.exercise = self
            .exercise
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());

        if let Some(p) = &self.payload {
            p.validate()?;
        }

        let has_quantity = matches!(
            self.payload,
            Some(Payload::Distance { .. }) | Some(Payload::Time { .. })
        );
        if self.exercise.is_none() && !has_quantity {
            return Err(Error::validation(
                "an exercise name, a distance or a time is required",
            ));
        }

        Ok(self)
    }

    pub fn into_record(self, id: String) -> FitnessRecord {
        FitnessRecord {
            id,
            date: self.date,
            part: self.part,
            exercise: self.exercise,
            payload: self.payload,
        }
    }
}

/// Raw `records` row as stored by the local table.
#[derive(Debug, sqlx::FromRow)]
pub struct RecordRow {
    pub id: String,
    pub date: String,
    pub part: String,
    pub exercise: Option<String>,
    pub sets: Option<i64>,
    pub reps: Option<i64>,
    pub distance: Option<f64>,
    pub minutes: Option<i64>,
    pub seconds: Option<i64>,
}

impl TryFrom<RecordRow> for FitnessRecord {
    type Error = Error;

    fn try_from(row: RecordRow) -> Result<Self> {
        let date = NaiveDate::parse_from_str(&row.date, DATE_FMT).map_err(|e| {
            Error::persistence(format!("record {} has invalid date `{}`: {e}", row.id, row.date))
        })?;
        let part = row.part.parse::<BodyPart>().map_err(|e| {
            Error::persistence(format!("record {} has invalid part: {e}", row.id))
        })?;

        let payload = Payload::from_columns(row.sets, row.reps, row.distance, row.minutes, row.seconds)
            .map_err(|e| Error::persistence(format!("record {} has an invalid quantity: {e}", row.id)))?;

        Ok(FitnessRecord {
            payload,
            exercise: row.exercise.filter(|e| !e.is_empty()),
            id: row.id,
            date,
            part,
        })
    }
}
