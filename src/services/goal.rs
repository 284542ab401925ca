//! Daily calorie goal from a biometric profile (Harris-Benedict BMR scaled
//! by an activity multiplier).

use log::warn;

use crate::errors::ProfileError;
use crate::models::user::{ActivityLevel, Gender, UserProfile};

/// Goal used whenever the profile cannot produce one.
pub const DEFAULT_CALORIE_GOAL: i32 = 2000;

/// The five profile fields the goal is derived from.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GoalInputs {
    pub age: Option<i32>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub gender: Option<Gender>,
    pub activity_level: Option<ActivityLevel>,
}

impl From<&UserProfile> for GoalInputs {
    fn from(profile: &UserProfile) -> Self {
        GoalInputs {
            age: profile.age,
            weight: profile.weight,
            height: profile.height,
            gender: profile.gender,
            activity_level: profile.activity_level,
        }
    }
}

pub fn calculate_bmr(age: i32, weight_kg: f64, height_cm: f64, gender: Gender) -> f64 {
    let age = f64::from(age);
    match gender {
        Gender::Male => 88.362 + 13.397 * weight_kg + 4.799 * height_cm - 5.677 * age,
        Gender::Female => 447.593 + 9.247 * weight_kg + 3.098 * height_cm - 4.330 * age,
    }
}

pub fn activity_multiplier(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 1.2,
        ActivityLevel::LightlyActive => 1.375,
        ActivityLevel::ModeratelyActive => 1.55,
        ActivityLevel::VeryActive => 1.725,
        ActivityLevel::SuperActive => 1.9,
    }
}

/// Rounds half away from zero.
pub fn calculate_tdee(bmr: f64, level: ActivityLevel) -> i32 {
    (bmr * activity_multiplier(level)).round() as i32
}

pub fn calculate_calorie_goal(inputs: &GoalInputs) -> i32 {
    match complete_inputs(inputs) {
        Ok((age, weight, height, gender, level)) => {
            calculate_tdee(calculate_bmr(age, weight, height, gender), level)
        }
        Err(_) => DEFAULT_CALORIE_GOAL,
    }
}

fn complete_inputs(
    inputs: &GoalInputs,
) -> Result<(i32, f64, f64, Gender, ActivityLevel), ProfileError> {
    match *inputs {
        GoalInputs {
            age: Some(age),
            weight: Some(weight),
            height: Some(height),
            gender: Some(gender),
            activity_level: Some(level),
        } if age != 0 && weight != 0.0 && height != 0.0 => {
            Ok((age, weight, height, gender, level))
        }
        _ => Err(ProfileError::IncompleteProfile),
    }
}

/// The goal stored on the profile, if there is a usable one.
pub fn stored_goal(profile: Option<&UserProfile>) -> Result<i32, ProfileError> {
    let profile = profile.ok_or(ProfileError::MissingProfile)?;
    match profile.daily_calorie_goal {
        Some(goal) if goal > 0 => Ok(goal),
        _ => Err(ProfileError::IncompleteProfile),
    }
}

pub fn stored_goal_or_default(user_id: i64, profile: Option<&UserProfile>) -> i32 {
    stored_goal(profile).unwrap_or_else(|reason| {
        warn!(
            "Using default calorie goal {} for user {}: {}",
            DEFAULT_CALORIE_GOAL, user_id, reason
        );
        DEFAULT_CALORIE_GOAL
    })
}
