use once_cell::sync::Lazy;
use std::{collections::HashMap, fmt::Display, str::FromStr};
use strsim::jaro_winkler;

use serde::{Deserialize, Serialize};

/// Body part trained by a record. Stored and sent over the wire as the
/// Chinese label; the English name is accepted on input as well.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BodyPart {
    #[serde(rename = "胸")]
    Chest,
    #[serde(rename = "背")]
    Back,
    #[serde(rename = "肩")]
    Shoulders,
    #[serde(rename = "臂")]
    Arms,
    #[serde(rename = "腿")]
    Legs,
    #[serde(rename = "腹")]
    Abs,
    #[serde(rename = "有氧")]
    Cardio,
}

impl BodyPart {
    pub const ALL: [BodyPart; 7] = [
        Self::Chest,
        Self::Back,
        Self::Shoulders,
        Self::Arms,
        Self::Legs,
        Self::Abs,
        Self::Cardio,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Chest => "胸",
            Self::Back => "背",
            Self::Shoulders => "肩",
            Self::Arms => "臂",
            Self::Legs => "腿",
            Self::Abs => "腹",
            Self::Cardio => "有氧",
        }
    }

    pub fn english(self) -> &'static str {
        match self {
            Self::Chest => "chest",
            Self::Back => "back",
            Self::Shoulders => "shoulders",
            Self::Arms => "arms",
            Self::Legs => "legs",
            Self::Abs => "abs",
            Self::Cardio => "cardio",
        }
    }
}

impl Display for BodyPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Every accepted spelling, label and lowercase English name alike.
pub static ALLOWED_PARTS: Lazy<HashMap<&'static str, BodyPart>> = Lazy::new(|| {
    BodyPart::ALL
        .iter()
        .flat_map(|&p| [(p.label(), p), (p.english(), p)])
        .collect()
});

/// Returns the body part for `s`, or `None` if it is not one of the seven.
pub fn canonical_part<S: AsRef<str>>(s: S) -> Option<BodyPart> {
    let raw = s.as_ref().trim();
    let lower = raw.to_lowercase();
    ALLOWED_PARTS.get(lower.as_str()).copied()
}

/// Return the closest English body-part name for `input` if similarity is at
/// least 0.80 *and* clearly better than the runner-up.
pub fn best_part_suggestion(input: &str) -> Option<BodyPart> {
    let inp = input.trim().to_lowercase();
    if inp.is_empty() {
        return None;
    }

    let mut scores: Vec<(BodyPart, f64)> = BodyPart::ALL
        .iter()
        .map(|&p| (p, jaro_winkler(&inp, p.english())))
        .collect();

    scores.sort_by(|a, b| b.1.total_cmp(&a.1));

    let (best, best_score) = scores[0];
    let second_score = scores.get(1).map(|(_, s)| *s).unwrap_or(0.0);

    const MIN_SCORE: f64 = 0.80;
    const GAP: f64 = 0.02;

    if best_score >= MIN_SCORE && best_score - second_score >= GAP {
        Some(best)
    } else {
        None
    }
}

impl FromStr for BodyPart {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("body part must not be empty".to_string());
        }

        canonical_part(s).ok_or_else(|| {
            let allowed = BodyPart::ALL
                .iter()
                .map(|p| format!("{} ({})", p.label(), p.english()))
                .collect::<Vec<_>>()
                .join(", ");
            match best_part_suggestion(s) {
                Some(sug) => format!(
                    "unknown body part `{s}` -- did you mean `{}`? allowed: {allowed}",
                    sug.english()
                ),
                None => format!("unknown body part `{s}`; allowed: {allowed}"),
            }
        })
    }
}
