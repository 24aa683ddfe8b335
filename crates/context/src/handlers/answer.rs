//! Answer handler

use axum::{extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use crate::AppState;
use solvewithme_common::{
    errors::{AppError, Result},
    models::{AnswerResult, GradeLevel},
};

/// Answer request
#[derive(Debug, Deserialize, Validate)]
pub struct AnswerRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question: String,

    /// SS1, SS2 or SS3; SS2 when omitted
    #[serde(default)]
    pub grade_level: Option<String>,
}

/// Answer a question
pub async fn answer(
    State(state): State<AppState>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<AnswerResult>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("question".to_string()),
    })?;

    let grade_level = match request.grade_level.as_deref() {
        Some(level) => level.parse::<GradeLevel>()?,
        None => GradeLevel::default(),
    };

    let result = state.engine.answer(&request.question, grade_level).await;
    Ok(Json(result))
}
