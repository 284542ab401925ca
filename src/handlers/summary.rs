use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::services::aggregation::{get_daily_summary, get_weekly_summary};
use crate::utils::jwt::Session;
use crate::utils::validation::{parse_date_or_today, today};

#[derive(Deserialize)]
pub struct DailySummaryQuery {
    date: Option<String>,
}

// GET /v1/summary/daily
pub async fn daily_summary(
    session: Session,
    pool: web::Data<PgPool>,
    query: web::Query<DailySummaryQuery>,
) -> Result<HttpResponse, AppError> {
    let date = parse_date_or_today(query.date.as_deref())?;
    let summary = get_daily_summary(&**pool, session.user_id, date).await?;
    Ok(HttpResponse::Ok().json(summary))
}

// GET /v1/summary/weekly
pub async fn weekly_summary(
    session: Session,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let summary = get_weekly_summary(&**pool, session.user_id, today()).await?;
    Ok(HttpResponse::Ok().json(summary))
}
