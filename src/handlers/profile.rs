use actix_web::{web, HttpResponse};
use log::info;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::db::{self, PROFILE_COLUMNS};
use crate::errors::AppError;
use crate::models::user::{ProfileRow, UserProfile};
use crate::services::goal::{calculate_bmr, calculate_calorie_goal, stored_goal_or_default, GoalInputs};
use crate::utils::jwt::Session;
use crate::utils::validation::{parse_optional_enum, validate_payload};

#[derive(Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    #[validate(length(min = 1, max = 100, message = "Full name must be between 1 and 100 characters"))]
    fullname: Option<String>,

    #[validate(range(min = 1, max = 150, message = "Age must be between 1 and 150"))]
    age: Option<i32>,

    #[validate(range(min = 1, max = 1000, message = "Weight must be between 1 and 1000 kg"))]
    weight: Option<f64>,

    #[validate(range(min = 1, max = 300, message = "Height must be between 1 and 300 cm"))]
    height: Option<f64>,

    gender: Option<String>,

    activity_level: Option<String>,
}

impl ProfilePayload {
    fn goal_inputs(&self) -> Result<GoalInputs, AppError> {
        Ok(GoalInputs {
            age: self.age,
            weight: self.weight,
            height: self.height,
            gender: parse_optional_enum(self.gender.as_deref())?,
            activity_level: parse_optional_enum(self.activity_level.as_deref())?,
        })
    }
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct GoalResponse {
    bmr: Option<f64>,
    daily_calorie_goal: i32,
}

fn goal_response(inputs: &GoalInputs) -> GoalResponse {
    let bmr = match (inputs.age, inputs.weight, inputs.height, inputs.gender) {
        (Some(age), Some(weight), Some(height), Some(gender)) => {
            Some(calculate_bmr(age, weight, height, gender))
        }
        _ => None,
    };
    GoalResponse {
        bmr,
        daily_calorie_goal: calculate_calorie_goal(inputs),
    }
}

/// The stored profile, or an empty one, with the goal always filled in.
fn profile_view(user_id: i64, stored: Option<UserProfile>) -> UserProfile {
    let goal = stored_goal_or_default(user_id, stored.as_ref());
    let mut profile = stored.unwrap_or_else(|| UserProfile {
        user_id,
        ..Default::default()
    });
    profile.daily_calorie_goal = Some(goal);
    profile
}

// GET /v1/profile
pub async fn get_profile(
    session: Session,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let stored = db::fetch_profile(&pool, session.user_id).await?;
    Ok(HttpResponse::Ok().json(profile_view(session.user_id, stored)))
}

// PUT /v1/profile
pub async fn update_profile(
    session: Session,
    pool: web::Data<PgPool>,
    payload: web::Json<ProfilePayload>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*payload)?;
    let inputs = payload.goal_inputs()?;
    let goal = calculate_calorie_goal(&inputs);

    let row = sqlx::query_as::<_, ProfileRow>(&format!(
        "INSERT INTO user_profiles (user_id, fullname, age, weight, height, gender, activity_level, daily_calorie_goal)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id) DO UPDATE SET
            fullname = EXCLUDED.fullname,
            age = EXCLUDED.age,
            weight = EXCLUDED.weight,
            height = EXCLUDED.height,
            gender = EXCLUDED.gender,
            activity_level = EXCLUDED.activity_level,
            daily_calorie_goal = EXCLUDED.daily_calorie_goal
        RETURNING {}",
        PROFILE_COLUMNS
    ))
    .bind(session.user_id)
    .bind(&payload.fullname)
    .bind(inputs.age)
    .bind(inputs.weight)
    .bind(inputs.height)
    .bind(inputs.gender.map(|g| g.as_str()))
    .bind(inputs.activity_level.map(|a| a.as_str()))
    .bind(goal)
    .fetch_one(&**pool)
    .await?;

    info!("Saved profile for user {} with daily goal {}", session.user_id, goal);
    Ok(HttpResponse::Ok().json(UserProfile::from(row)))
}

// POST /v1/goal/calculate
pub async fn calculate_goal(payload: web::Json<ProfilePayload>) -> Result<HttpResponse, AppError> {
    validate_payload(&*payload)?;
    let inputs = payload.goal_inputs()?;
    Ok(HttpResponse::Ok().json(goal_response(&inputs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::goal::DEFAULT_CALORIE_GOAL;
    use actix_web::{http::StatusCode, test as actix_test, App};
    use serde_json::{json, Value};

    #[test]
    fn goal_response_for_incomplete_inputs() {
        let response = goal_response(&GoalInputs::default());
        assert_eq!(
            response,
            GoalResponse {
                bmr: None,
                daily_calorie_goal: DEFAULT_CALORIE_GOAL
            }
        );
    }

    #[test]
    fn profile_view_fills_in_missing_goal() {
        let missing = profile_view(4, None);
        assert_eq!(missing.user_id, 4);
        assert_eq!(missing.daily_calorie_goal, Some(DEFAULT_CALORIE_GOAL));

        let null_goal = UserProfile {
            user_id: 4,
            fullname: Some("Ana".into()),
            daily_calorie_goal: None,
            ..Default::default()
        };
        let view = profile_view(4, Some(null_goal));
        assert_eq!(view.fullname.as_deref(), Some("Ana"));
        assert_eq!(view.daily_calorie_goal, Some(DEFAULT_CALORIE_GOAL));

        let stored = UserProfile {
            user_id: 4,
            daily_calorie_goal: Some(2450),
            ..Default::default()
        };
        assert_eq!(profile_view(4, Some(stored)).daily_calorie_goal, Some(2450));
    }

    #[test]
    fn payload_rejects_unknown_enums() {
        let payload = ProfilePayload {
            gender: Some("other".into()),
            ..Default::default()
        };
        assert!(matches!(payload.goal_inputs(), Err(AppError::BadRequest(_))));
    }

    #[actix_web::test]
    async fn calculate_goal_endpoint() {
        let app = actix_test::init_service(
            App::new().route("/v1/goal/calculate", web::post().to(calculate_goal)),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/v1/goal/calculate")
            .set_json(json!({
                "age": 25,
                "weight": 70.0,
                "height": 175.0,
                "gender": "male",
                "activityLevel": "Moderately active"
            }))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["dailyCalorieGoal"], 2672);

        let req = actix_test::TestRequest::post()
            .uri("/v1/goal/calculate")
            .set_json(json!({ "age": 25, "gender": "female" }))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["dailyCalorieGoal"], 2000);
        assert!(body["bmr"].is_null());

        let req = actix_test::TestRequest::post()
            .uri("/v1/goal/calculate")
            .set_json(json!({ "age": -4 }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
