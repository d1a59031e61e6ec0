use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use stemtutor_orchestration::prompts::{diagram_image, problem_illustration_image};
use stemtutor_orchestration::{
    CapabilityInput, CapabilityRequest, CapabilityResponse, DiagramInput, ErrorKind,
    ExplainInput, FormulaInput, IllustrationInput, ImageInput, SolveInput, StudyTipsInput,
    TranscribeInput, VoiceSolveInput, VoiceSolveResponse,
};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

/// Capability input plus an optional preferred provider (`provider` or `model`).
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WithPreference<T> {
    #[serde(flatten)]
    input: T,
    #[serde(default, alias = "model")]
    provider: Option<String>,
}

async fn respond(
    state: &AppState,
    input: CapabilityInput,
    provider: Option<String>,
) -> ApiResult<Json<CapabilityResponse>> {
    let request = CapabilityRequest {
        input,
        preferred_provider: provider,
    };
    let response = state.tutor.handle(request).await?;
    provider_error(&response, "")?;
    Ok(Json(response))
}

/// `Err` for an unsuccessful response, its message prefixed with `prefix`.
fn provider_error(response: &CapabilityResponse, prefix: &str) -> ApiResult<()> {
    if response.success {
        return Ok(());
    }
    Err(ApiError::Provider {
        kind: response.error_kind.unwrap_or(ErrorKind::Unknown),
        message: format!("{}{}", prefix, response.error.as_deref().unwrap_or_default()),
    })
}

async fn solve(
    State(state): State<Arc<AppState>>,
    Json(body): Json<WithPreference<SolveInput>>,
) -> ApiResult<Json<CapabilityResponse>> {
    respond(&state, CapabilityInput::Solve(body.input), body.provider).await
}

async fn explain(
    State(state): State<Arc<AppState>>,
    Json(body): Json<WithPreference<ExplainInput>>,
) -> ApiResult<Json<CapabilityResponse>> {
    respond(&state, CapabilityInput::Explain(body.input), body.provider).await
}

async fn formulas(
    State(state): State<Arc<AppState>>,
    Json(body): Json<WithPreference<FormulaInput>>,
) -> ApiResult<Json<CapabilityResponse>> {
    respond(&state, CapabilityInput::Formulas(body.input), body.provider).await
}

async fn study_tips(
    State(state): State<Arc<AppState>>,
    Json(body): Json<WithPreference<StudyTipsInput>>,
) -> ApiResult<Json<CapabilityResponse>> {
    respond(&state, CapabilityInput::Tips(body.input), body.provider).await
}

async fn generate_image(
    State(state): State<Arc<AppState>>,
    Json(body): Json<WithPreference<ImageInput>>,
) -> ApiResult<Json<CapabilityResponse>> {
    respond(&state, CapabilityInput::Image(body.input), body.provider).await
}

async fn generate_diagram(
    State(state): State<Arc<AppState>>,
    Json(body): Json<WithPreference<DiagramInput>>,
) -> ApiResult<Json<CapabilityResponse>> {
    let image = diagram_image(&body.input)?;
    respond(&state, CapabilityInput::Image(image), body.provider).await
}

async fn generate_problem_illustration(
    State(state): State<Arc<AppState>>,
    Json(body): Json<WithPreference<IllustrationInput>>,
) -> ApiResult<Json<CapabilityResponse>> {
    let image = problem_illustration_image(&body.input)?;
    respond(&state, CapabilityInput::Image(image), body.provider).await
}

async fn solve_with_voice(
    State(state): State<Arc<AppState>>,
    Json(body): Json<WithPreference<VoiceSolveInput>>,
) -> ApiResult<Json<VoiceSolveResponse>> {
    let response = state.tutor.solve_with_voice(body.input, body.provider).await?;

    provider_error(&response.transcription, "Transcription failed: ")?;
    if let Some(solution) = &response.solution {
        provider_error(solution, "")?;
    }
    Ok(Json(response))
}

async fn transcribe_audio(
    State(state): State<Arc<AppState>>,
    Json(input): Json<TranscribeInput>,
) -> ApiResult<Json<CapabilityResponse>> {
    respond(&state, CapabilityInput::Transcribe(input), None).await
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/solve", post(solve))
        .route("/explain", post(explain))
        .route("/formulas", post(formulas))
        .route("/study-tips", post(study_tips))
        .route("/generate-image", post(generate_image))
        .route("/generate-diagram", post(generate_diagram))
        .route(
            "/generate-problem-illustration",
            post(generate_problem_illustration),
        )
        .route("/transcribe-audio", post(transcribe_audio))
        .route("/solve-with-voice", post(solve_with_voice))
}
