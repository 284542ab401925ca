use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use validator::Validate;

use crate::db::LOGGED_DAY;
use crate::errors::AppError;
use crate::models::exercise::{Exercise, ExerciseCategory};
use crate::utils::jwt::Session;
use crate::utils::validation::{parse_date, parse_optional_enum, parse_timestamp_or_now, validate_payload};

const EXERCISE_COLUMNS: &str = "id, user_id, name, category, duration, calories_burned, logged_at";

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRequest {
    #[validate(required(message = "Name is required"))]
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    name: Option<String>,

    category: Option<String>,

    #[validate(required(message = "Duration is required"))]
    #[validate(range(min = 1, message = "Duration must be at least 1 minute"))]
    duration: Option<i32>,

    #[validate(required(message = "Calories burned is required"))]
    #[validate(range(min = 0, message = "Calories burned cannot be negative"))]
    calories_burned: Option<i32>,

    date: Option<String>,
}

/// A validated exercise ready to be written.
#[derive(Debug, PartialEq)]
struct NewExercise {
    name: String,
    category: ExerciseCategory,
    duration: i32,
    calories_burned: i32,
    logged_at: DateTime<Utc>,
}

impl ExerciseRequest {
    fn into_new_exercise(self) -> Result<NewExercise, AppError> {
        validate_payload(&self)?;
        let missing = |field: &str| AppError::BadRequest(format!("{} is required", field));

        let name = self.name.ok_or_else(|| missing("Name"))?.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Name cannot be blank".to_string()));
        }
        let category = parse_optional_enum(self.category.as_deref())?
            .unwrap_or_else(|| ExerciseCategory::infer_from_name(&name));

        Ok(NewExercise {
            category,
            duration: self.duration.ok_or_else(|| missing("Duration"))?,
            calories_burned: self.calories_burned.ok_or_else(|| missing("Calories burned"))?,
            logged_at: parse_timestamp_or_now(self.date.as_deref())?,
            name,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetExercisesQuery {
    start_date: Option<String>,
    end_date: Option<String>,
    category: Option<String>,
}

#[derive(Serialize, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
struct ExerciseTotals {
    total_exercises: usize,
    total_duration: i64,
    total_calories: i64,
}

impl ExerciseTotals {
    fn of(exercises: &[Exercise]) -> Self {
        ExerciseTotals {
            total_exercises: exercises.len(),
            total_duration: exercises.iter().map(|e| i64::from(e.duration)).sum(),
            total_calories: exercises.iter().map(|e| i64::from(e.calories_burned)).sum(),
        }
    }
}

#[derive(Serialize)]
struct ExerciseListResponse {
    exercises: Vec<Exercise>,
    summary: ExerciseTotals,
}

// POST /v1/exercises
pub async fn create_exercise(
    session: Session,
    pool: web::Data<PgPool>,
    payload: web::Json<ExerciseRequest>,
) -> Result<HttpResponse, AppError> {
    let new = payload.into_inner().into_new_exercise()?;

    let exercise = sqlx::query_as::<_, Exercise>(&format!(
        "INSERT INTO exercises (user_id, name, category, duration, calories_burned, logged_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {}",
        EXERCISE_COLUMNS
    ))
    .bind(session.user_id)
    .bind(&new.name)
    .bind(new.category.as_str())
    .bind(new.duration)
    .bind(new.calories_burned)
    .bind(new.logged_at)
    .fetch_one(&**pool)
    .await?;

    info!("User {} logged exercise {}", session.user_id, exercise.id);
    Ok(HttpResponse::Created().json(exercise))
}

// GET /v1/exercises
pub async fn get_exercises(
    session: Session,
    pool: web::Data<PgPool>,
    query: web::Query<GetExercisesQuery>,
) -> Result<HttpResponse, AppError> {
    let start = query.start_date.as_deref().map(parse_date).transpose()?;
    let end = query.end_date.as_deref().map(parse_date).transpose()?;
    let category: Option<ExerciseCategory> = parse_optional_enum(query.category.as_deref())?;

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "SELECT {} FROM exercises WHERE user_id = ",
        EXERCISE_COLUMNS
    ));
    builder.push_bind(session.user_id);

    if let Some(start) = start {
        builder.push(format!(" AND {} >= ", LOGGED_DAY)).push_bind(start);
    }
    if let Some(end) = end {
        builder.push(format!(" AND {} <= ", LOGGED_DAY)).push_bind(end);
    }
    if let Some(category) = category {
        builder.push(" AND category = ").push_bind(category.as_str());
    }
    builder.push(" ORDER BY logged_at DESC");

    let exercises = builder
        .build_query_as::<Exercise>()
        .fetch_all(&**pool)
        .await?;

    let summary = ExerciseTotals::of(&exercises);
    Ok(HttpResponse::Ok().json(ExerciseListResponse { exercises, summary }))
}

// PUT /v1/exercises/{id}
pub async fn update_exercise(
    session: Session,
    pool: web::Data<PgPool>,
    exercise_id: web::Path<i64>,
    payload: web::Json<ExerciseRequest>,
) -> Result<HttpResponse, AppError> {
    let new = payload.into_inner().into_new_exercise()?;

    let exercise = sqlx::query_as::<_, Exercise>(&format!(
        "UPDATE exercises SET name = $1, category = $2, duration = $3, calories_burned = $4, logged_at = $5
        WHERE id = $6 AND user_id = $7
        RETURNING {}",
        EXERCISE_COLUMNS
    ))
    .bind(&new.name)
    .bind(new.category.as_str())
    .bind(new.duration)
    .bind(new.calories_burned)
    .bind(new.logged_at)
    .bind(*exercise_id)
    .bind(session.user_id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Exercise not found".to_string()))?;

    Ok(HttpResponse::Ok().json(exercise))
}

// DELETE /v1/exercises/{id}
pub async fn delete_exercise(
    session: Session,
    pool: web::Data<PgPool>,
    exercise_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let result = sqlx::query("DELETE FROM exercises WHERE id = $1 AND user_id = $2")
        .bind(*exercise_id)
        .bind(session.user_id)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Exercise not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Exercise deleted successfully" })))
}
