use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};

use tracing::error;

use crate::chat::{self, Outcome};
use crate::AppState;

use super::models::{AskRequest, AskResponse, ChatForm, ErrorResponse, HealthResponse};
use super::page;

type PageResult = Result<Html<String>, (StatusCode, Html<String>)>;

fn render_page(prompt: &str, output: Option<&str>) -> PageResult {
    page::render(prompt, output).map(Html).map_err(|e| {
        error!("Failed to render template: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("Internal Server Error: {e}")),
        )
    })
}

pub async fn index() -> PageResult {
    render_page("", None)
}

pub async fn submit(State(state): State<AppState>, Form(form): Form<ChatForm>) -> PageResult {
    let outcome = chat::respond(state.gateway.as_ref(), &form.prompt).await;
    let output = match &outcome {
        Outcome::Reply(reply) => format!("🤖: {reply}"),
        Outcome::MissingPrompt => outcome.text().to_string(),
    };

    render_page(&form.prompt, Some(&output))
}

pub async fn ask(
    State(state): State<AppState>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, (StatusCode, Json<ErrorResponse>)> {
    match chat::respond(state.gateway.as_ref(), &payload.prompt).await {
        Outcome::Reply(reply) => Ok(Json(AskResponse { reply })),
        missing @ Outcome::MissingPrompt => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: missing.text().to_string(),
            }),
        )),
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "route not found".to_string(),
        }),
    )
        .into_response()
}
