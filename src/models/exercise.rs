use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseCategory {
    Cardio,
    Strength,
    Flexibility,
    Balance,
    Other,
}

lazy_static! {
    static ref CATEGORY_KEYWORDS: [(ExerciseCategory, Regex); 4] = [
        (ExerciseCategory::Cardio, keyword_regex("run|jog|walk|swim|cycle|bike|cardio")),
        (ExerciseCategory::Strength, keyword_regex("lift|push|pull|weight|strength")),
        (ExerciseCategory::Flexibility, keyword_regex("stretch|yoga|flexibility")),
        (ExerciseCategory::Balance, keyword_regex("balance|pose|pilates")),
    ];
}

fn keyword_regex(alternatives: &str) -> Regex {
    // Patterns are literal alternations, so compilation cannot fail.
    Regex::new(&format!("(?i)(?:{})", alternatives)).unwrap()
}

impl ExerciseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseCategory::Cardio => "cardio",
            ExerciseCategory::Strength => "strength",
            ExerciseCategory::Flexibility => "flexibility",
            ExerciseCategory::Balance => "balance",
            ExerciseCategory::Other => "other",
        }
    }

    /// Guesses a category from substrings of the exercise name, first match wins.
    pub fn infer_from_name(name: &str) -> Self {
        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, re)| re.is_match(name))
            .map(|(category, _)| *category)
            .unwrap_or(ExerciseCategory::Other)
    }
}

impl FromStr for ExerciseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cardio" => Ok(ExerciseCategory::Cardio),
            "strength" => Ok(ExerciseCategory::Strength),
            "flexibility" => Ok(ExerciseCategory::Flexibility),
            "balance" => Ok(ExerciseCategory::Balance),
            "other" => Ok(ExerciseCategory::Other),
            other => Err(format!("Unknown exercise category '{}'", other)),
        }
    }
}

#[derive(sqlx::FromRow, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub category: String,
    pub duration: i32,
    pub calories_burned: i32,
    #[serde(rename = "date")]
    pub logged_at: chrono::DateTime<Utc>,
}
