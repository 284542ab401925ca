use serde::Serialize;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub calories_burned: i64,
    pub calories_consumed: i64,
    /// Goal minus consumed; negative once the goal is exceeded.
    pub remaining_calories: i64,
}

/// Calories burned per ISO weekday, Monday first.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    pub calories_burned: [i64; 7],
}

impl WeeklySummary {
    pub fn total(&self) -> i64 {
        self.calories_burned.iter().sum()
    }
}
