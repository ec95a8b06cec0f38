//! Form page handlers

use std::collections::HashMap;

use axum::{
    extract::{rejection::FormRejection, State},
    response::Html,
    Form,
};
use validator::Validate;

use crate::AppState;
use crate::models::{describe_validation, FeatureRecord};
use crate::views;

/// Render the empty form
pub async fn show(State(state): State<AppState>) -> Html<String> {
    Html(views::render_page(&state.model_info, &FeatureRecord::default(), None))
}

/// Handle the trigger: run the pipeline and render exactly one result inline.
///
/// Fields are read individually so a single bad value does not discard the
/// rest of what the user entered.
pub async fn submit(
    State(state): State<AppState>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Html<String> {
    let (input, result) = match form {
        Ok(Form(fields)) => {
            let (input, invalid) = FeatureRecord::from_form(&fields);
            let result = if !invalid.is_empty() {
                Err(format!("Invalid input: {} could not be read", invalid.join(", ")))
            } else {
                match input.validate() {
                    Ok(()) => state
                        .pipeline
                        .run(&input)
                        .map(|prediction| prediction.addiction_level)
                        .map_err(|err| {
                            tracing::warn!(stage = err.stage(), "Prediction failed: {}", err);
                            err.to_string()
                        }),
                    Err(err) => Err(format!("Invalid input: {}", describe_validation(&err))),
                }
            };
            (input, result)
        }
        Err(rejection) => {
            tracing::debug!("Form rejected: {}", rejection.body_text());
            (
                FeatureRecord::default(),
                Err("Invalid input: the form could not be read".to_string()),
            )
        }
    };

    Html(views::render_page(&state.model_info, &input, Some(&result)))
}
