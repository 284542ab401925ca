use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::user::{ProfileRow, UserProfile};
use crate::services::aggregation::CalorieStore;

/// Calendar day of a stored timestamp. Days are UTC days throughout.
pub const LOGGED_DAY: &str = "(logged_at AT TIME ZONE 'UTC')::date";

pub const PROFILE_COLUMNS: &str =
    "user_id, fullname, age, weight, height, gender, activity_level, daily_calorie_goal";

/// Calories summed over one UTC day of `table`. Binds: user id, date.
fn day_total_sql(table: &str, column: &str) -> String {
    format!(
        "SELECT COALESCE(SUM({}), 0)::BIGINT FROM {} WHERE user_id = $1 AND {} = $2",
        column, table, LOGGED_DAY
    )
}

/// Burned calories per UTC day in an inclusive range. Binds: user id, from, to.
fn exercise_by_day_sql() -> String {
    format!(
        "SELECT {day} AS day, SUM(calories_burned)::BIGINT AS calories FROM exercises \
         WHERE user_id = $1 AND {day} BETWEEN $2 AND $3 GROUP BY day ORDER BY day",
        day = LOGGED_DAY
    )
}

fn profile_sql() -> String {
    format!("SELECT {} FROM user_profiles WHERE user_id = $1", PROFILE_COLUMNS)
}

pub async fn fetch_profile(pool: &PgPool, user_id: i64) -> Result<Option<UserProfile>, AppError> {
    let row = sqlx::query_as::<_, ProfileRow>(&profile_sql())
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(UserProfile::from))
}

#[async_trait]
impl CalorieStore for PgPool {
    async fn sum_exercise_calories(&self, user_id: i64, date: NaiveDate) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(&day_total_sql("exercises", "calories_burned"))
            .bind(user_id)
            .bind(date)
            .fetch_one(self)
            .await?;

        Ok(total)
    }

    async fn exercise_calories_by_day(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(NaiveDate, i64)>, AppError> {
        let rows = sqlx::query_as::<_, (NaiveDate, i64)>(&exercise_by_day_sql())
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_all(self)
            .await?;

        Ok(rows)
    }

    async fn sum_meal_calories(&self, user_id: i64, date: NaiveDate) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(&day_total_sql("meals", "calories"))
            .bind(user_id)
            .bind(date)
            .fetch_one(self)
            .await?;

        Ok(total)
    }

    async fn fetch_profile(&self, user_id: i64) -> Result<Option<UserProfile>, AppError> {
        fetch_profile(self, user_id).await
    }
}
