use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate};
use log::debug;

use crate::errors::AppError;
use crate::models::summary::{DailySummary, WeeklySummary};
use crate::models::user::UserProfile;
use crate::services::goal::stored_goal_or_default;

/// Days covered by the weekly summary, today included.
pub const WEEKLY_WINDOW_DAYS: i64 = 7;

/// Read side of the relational store the summaries are computed from.
/// Sums are 0 when there are no rows.
#[async_trait]
pub trait CalorieStore {
    async fn sum_exercise_calories(&self, user_id: i64, date: NaiveDate) -> Result<i64, AppError>;

    /// Burned calories per calendar day in `[from, to]`, one row per day with entries.
    async fn exercise_calories_by_day(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(NaiveDate, i64)>, AppError>;

    async fn sum_meal_calories(&self, user_id: i64, date: NaiveDate) -> Result<i64, AppError>;

    async fn fetch_profile(&self, user_id: i64) -> Result<Option<UserProfile>, AppError>;
}

pub fn daily_summary(goal: i32, burned: i64, consumed: i64) -> DailySummary {
    DailySummary {
        calories_burned: burned,
        calories_consumed: consumed,
        remaining_calories: i64::from(goal) - consumed,
    }
}

/// First day of the window ending at `today`.
pub fn window_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(WEEKLY_WINDOW_DAYS - 1)
}

/// Buckets per-day totals by ISO weekday (Monday = 0), summing rows that land
/// on the same weekday. Rows outside the window ending at `today` are skipped.
pub fn bucket_by_weekday(rows: &[(NaiveDate, i64)], today: NaiveDate) -> WeeklySummary {
    let start = window_start(today);
    let mut summary = WeeklySummary::default();
    for (day, calories) in rows.iter().filter(|(day, _)| *day >= start && *day <= today) {
        let slot = day.weekday().num_days_from_monday() as usize;
        summary.calories_burned[slot] += calories;
    }
    summary
}

pub async fn get_daily_summary<S>(store: &S, user_id: i64, date: NaiveDate) -> Result<DailySummary, AppError>
where
    S: CalorieStore + ?Sized,
{
    let profile = store.fetch_profile(user_id).await?;
    let goal = stored_goal_or_default(user_id, profile.as_ref());

    let burned = store.sum_exercise_calories(user_id, date).await?;
    let consumed = store.sum_meal_calories(user_id, date).await?;

    debug!(
        "Daily summary for user {} on {}: goal={} burned={} consumed={}",
        user_id, date, goal, burned, consumed
    );
    Ok(daily_summary(goal, burned, consumed))
}

pub async fn get_weekly_summary<S>(store: &S, user_id: i64, today: NaiveDate) -> Result<WeeklySummary, AppError>
where
    S: CalorieStore + ?Sized,
{
    let rows = store
        .exercise_calories_by_day(user_id, window_start(today), today)
        .await?;
    let summary = bucket_by_weekday(&rows, today);
    debug!("Weekly summary for user {} ending {}: total={}", user_id, today, summary.total());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::goal::DEFAULT_CALORIE_GOAL;
    use std::collections::HashMap;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[derive(Default)]
    struct MemoryStore {
        exercises: Vec<(i64, NaiveDate, i64)>,
        meals: Vec<(i64, NaiveDate, i64)>,
        profiles: HashMap<i64, UserProfile>,
    }

    #[async_trait]
    impl CalorieStore for MemoryStore {
        async fn sum_exercise_calories(&self, user_id: i64, date: NaiveDate) -> Result<i64, AppError> {
            Ok(self
                .exercises
                .iter()
                .filter(|(u, d, _)| *u == user_id && *d == date)
                .map(|(_, _, c)| c)
                .sum())
        }

        async fn exercise_calories_by_day(
            &self,
            user_id: i64,
            from: NaiveDate,
            to: NaiveDate,
        ) -> Result<Vec<(NaiveDate, i64)>, AppError> {
            let mut per_day: HashMap<NaiveDate, i64> = HashMap::new();
            for (u, d, c) in &self.exercises {
                if *u == user_id && *d >= from && *d <= to {
                    *per_day.entry(*d).or_default() += c;
                }
            }
            Ok(per_day.into_iter().collect())
        }

        async fn sum_meal_calories(&self, user_id: i64, date: NaiveDate) -> Result<i64, AppError> {
            Ok(self
                .meals
                .iter()
                .filter(|(u, d, _)| *u == user_id && *d == date)
                .map(|(_, _, c)| c)
                .sum())
        }

        async fn fetch_profile(&self, user_id: i64) -> Result<Option<UserProfile>, AppError> {
            Ok(self.profiles.get(&user_id).cloned())
        }
    }

    fn profile_with_goal(user_id: i64, goal: i32) -> UserProfile {
        UserProfile {
            user_id,
            daily_calorie_goal: Some(goal),
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn empty_day_returns_full_goal() {
        let mut store = MemoryStore::default();
        store.profiles.insert(1, profile_with_goal(1, 2300));

        let summary = get_daily_summary(&store, 1, date("2024-05-06")).await.unwrap();
        assert_eq!(
            summary,
            DailySummary {
                calories_burned: 0,
                calories_consumed: 0,
                remaining_calories: 2300
            }
        );
    }

    #[actix_web::test]
    async fn missing_profile_uses_default_goal() {
        let store = MemoryStore {
            meals: vec![(9, date("2024-05-06"), 500)],
            ..Default::default()
        };

        let summary = get_daily_summary(&store, 9, date("2024-05-06")).await.unwrap();
        assert_eq!(summary.remaining_calories, i64::from(DEFAULT_CALORIE_GOAL) - 500);
    }

    #[actix_web::test]
    async fn sums_only_the_requested_user_and_day() {
        let day = date("2024-05-06");
        let mut store = MemoryStore {
            exercises: vec![
                (1, day, 300),
                (1, day, 150),
                (1, date("2024-05-05"), 999),
                (2, day, 777),
            ],
            meals: vec![(1, day, 600), (1, day, 250), (2, day, 100)],
            ..Default::default()
        };
        store.profiles.insert(1, profile_with_goal(1, 2000));

        let summary = get_daily_summary(&store, 1, day).await.unwrap();
        assert_eq!(summary.calories_burned, 450);
        assert_eq!(summary.calories_consumed, 850);
        assert_eq!(summary.remaining_calories, 1150);
    }

    #[actix_web::test]
    async fn remaining_calories_go_negative() {
        let day = date("2024-05-06");
        let mut store = MemoryStore {
            meals: vec![(1, day, 2600)],
            ..Default::default()
        };
        store.profiles.insert(1, profile_with_goal(1, 1800));

        let summary = get_daily_summary(&store, 1, day).await.unwrap();
        assert_eq!(summary.remaining_calories, -800);
    }

    #[actix_web::test]
    async fn daily_summary_is_repeatable() {
        let day = date("2024-05-06");
        let store = MemoryStore {
            exercises: vec![(1, day, 320)],
            meals: vec![(1, day, 410)],
            ..Default::default()
        };

        let first = get_daily_summary(&store, 1, day).await.unwrap();
        let second = get_daily_summary(&store, 1, day).await.unwrap();
        assert_eq!(first, second);
    }

    #[actix_web::test]
    async fn weekly_summary_buckets_by_weekday() {
        // 2024-05-08 is a Wednesday; window runs Thu 2024-05-02 .. Wed 2024-05-08
        let today = date("2024-05-08");
        let store = MemoryStore {
            exercises: vec![
                (1, date("2024-05-06"), 200), // Mon
                (1, date("2024-05-06"), 50),  // Mon, accumulates
                (1, date("2024-05-08"), 120), // Wed
                (1, date("2024-05-02"), 90),  // Thu, first day of window
                (1, date("2024-05-05"), 60),  // Sun
                (1, date("2024-05-01"), 500), // outside window
                (2, date("2024-05-07"), 400), // other user
            ],
            ..Default::default()
        };

        let summary = get_weekly_summary(&store, 1, today).await.unwrap();
        assert_eq!(summary.calories_burned, [250, 0, 120, 90, 0, 0, 60]);
        assert_eq!(summary.total(), 520);
    }

    #[actix_web::test]
    async fn weekly_summary_without_entries_is_all_zero() {
        let store = MemoryStore::default();
        let summary = get_weekly_summary(&store, 1, date("2024-05-08")).await.unwrap();
        assert_eq!(summary.calories_burned, [0; 7]);
    }

    #[test]
    fn bucketing_skips_rows_outside_window() {
        let today = date("2024-05-12"); // Sunday
        let rows = vec![
            (date("2024-05-05"), 1000), // previous Sunday, one day too early
            (date("2024-05-06"), 10),
            (date("2024-05-12"), 20),
            (date("2024-05-13"), 1000), // future
        ];
        let summary = bucket_by_weekday(&rows, today);
        assert_eq!(summary.calories_burned, [10, 0, 0, 0, 0, 0, 20]);
    }

    #[test]
    fn window_is_seven_days_inclusive() {
        assert_eq!(window_start(date("2024-03-01")), date("2024-02-24"));
    }
}
