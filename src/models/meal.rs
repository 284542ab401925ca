use chrono::Utc;
use serde::Serialize;

#[derive(sqlx::FromRow, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub calories: i32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(rename = "date")]
    pub logged_at: chrono::DateTime<Utc>,
}
