use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use log::info;
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::db::LOGGED_DAY;
use crate::errors::AppError;
use crate::models::meal::Meal;
use crate::utils::jwt::Session;
use crate::utils::validation::{parse_date_or_today, parse_timestamp_or_now, validate_payload};

const MEAL_COLUMNS: &str = "id, user_id, name, calories, protein, carbs, fat, logged_at";

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MealRequest {
    #[validate(required(message = "Name is required"))]
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    name: Option<String>,

    #[validate(required(message = "Calories are required"))]
    #[validate(range(min = 0, message = "Calories cannot be negative"))]
    calories: Option<i32>,

    #[validate(range(min = 0, message = "Protein cannot be negative"))]
    protein: Option<f64>,

    #[validate(range(min = 0, message = "Carbs cannot be negative"))]
    carbs: Option<f64>,

    #[validate(range(min = 0, message = "Fat cannot be negative"))]
    fat: Option<f64>,

    date: Option<String>,
}

struct NewMeal {
    name: String,
    calories: i32,
    protein: f64,
    carbs: f64,
    fat: f64,
    logged_at: DateTime<Utc>,
}

impl MealRequest {
    fn into_new_meal(self) -> Result<NewMeal, AppError> {
        validate_payload(&self)?;
        let name = self
            .name
            .ok_or_else(|| AppError::BadRequest("Name is required".to_string()))?
            .trim()
            .to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Name cannot be blank".to_string()));
        }
        Ok(NewMeal {
            name,
            calories: self
                .calories
                .ok_or_else(|| AppError::BadRequest("Calories are required".to_string()))?,
            // Macros are optional in the log and default to zero.
            protein: self.protein.unwrap_or(0.0),
            carbs: self.carbs.unwrap_or(0.0),
            fat: self.fat.unwrap_or(0.0),
            logged_at: parse_timestamp_or_now(self.date.as_deref())?,
        })
    }
}

#[derive(Deserialize)]
pub struct GetMealsQuery {
    date: Option<String>,
}

// POST /v1/meals
pub async fn create_meal(
    session: Session,
    pool: web::Data<PgPool>,
    payload: web::Json<MealRequest>,
) -> Result<HttpResponse, AppError> {
    let new = payload.into_inner().into_new_meal()?;

    let meal = sqlx::query_as::<_, Meal>(&format!(
        "INSERT INTO meals (user_id, name, calories, protein, carbs, fat, logged_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {}",
        MEAL_COLUMNS
    ))
    .bind(session.user_id)
    .bind(&new.name)
    .bind(new.calories)
    .bind(new.protein)
    .bind(new.carbs)
    .bind(new.fat)
    .bind(new.logged_at)
    .fetch_one(&**pool)
    .await?;

    info!("User {} logged meal {}", session.user_id, meal.id);
    Ok(HttpResponse::Created().json(meal))
}

// GET /v1/meals?date=YYYY-MM-DD
pub async fn get_meals(
    session: Session,
    pool: web::Data<PgPool>,
    query: web::Query<GetMealsQuery>,
) -> Result<HttpResponse, AppError> {
    let day = parse_date_or_today(query.date.as_deref())?;

    let meals = sqlx::query_as::<_, Meal>(&format!(
        "SELECT {} FROM meals WHERE user_id = $1 AND {} = $2 ORDER BY logged_at",
        MEAL_COLUMNS, LOGGED_DAY
    ))
    .bind(session.user_id)
    .bind(day)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(meals))
}

// PUT /v1/meals/{id}
pub async fn update_meal(
    session: Session,
    pool: web::Data<PgPool>,
    meal_id: web::Path<i64>,
    payload: web::Json<MealRequest>,
) -> Result<HttpResponse, AppError> {
    let new = payload.into_inner().into_new_meal()?;

    let meal = sqlx::query_as::<_, Meal>(&format!(
        "UPDATE meals SET name = $1, calories = $2, protein = $3, carbs = $4, fat = $5, logged_at = $6
        WHERE id = $7 AND user_id = $8
        RETURNING {}",
        MEAL_COLUMNS
    ))
    .bind(&new.name)
    .bind(new.calories)
    .bind(new.protein)
    .bind(new.carbs)
    .bind(new.fat)
    .bind(new.logged_at)
    .bind(*meal_id)
    .bind(session.user_id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Meal not found".to_string()))?;

    Ok(HttpResponse::Ok().json(meal))
}

// DELETE /v1/meals/{id}
pub async fn delete_meal(
    session: Session,
    pool: web::Data<PgPool>,
    meal_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let result = sqlx::query("DELETE FROM meals WHERE id = $1 AND user_id = $2")
        .bind(*meal_id)
        .bind(session.user_id)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Meal not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Meal deleted successfully" })))
}
