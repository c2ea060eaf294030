//! Search autocomplete

use std::sync::Arc;

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::LabelRepo;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiQuery, CurrentUser};
use crate::http::server::AppState;

const MAX_SUGGESTIONS: i64 = 10;

#[derive(Deserialize)]
pub struct SuggestParams {
    pub term: Option<String>,
}

/// GET /suggestions?term= - tag, color and wallpaper names containing `term`
async fn suggestions(
    State(state): State<Arc<AppState>>,
    CurrentUser(_user): CurrentUser,
    ApiQuery(params): ApiQuery<SuggestParams>,
) -> Result<Json<Vec<String>>, ApiError> {
    let term = params.term.unwrap_or_default();
    let names = LabelRepo::new(&state.pool)
        .suggest(&term, MAX_SUGGESTIONS)
        .await?;
    Ok(Json(names))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/suggestions", get(suggestions))
}

#[cfg(test)]
mod tests {
    use crate::db::repos::testing as db;
    use crate::http::routes::testing::{json, TestApp};
    use serde_json::json;

    #[tokio::test]
    async fn suggests_up_to_ten_sorted_names() {
        let app = TestApp::new().await;
        let (id, cookie) = app.user("ala", false).await;
        for i in 0..12 {
            db::wallpaper(&app.state.pool, id, &format!("Blue {i:02}"), "sky", "navy").await;
        }

        let body = json(app.get("/suggestions?term=blue", &cookie).await).await;
        let names = body.as_array().unwrap();
        assert_eq!(names.len(), 10);
        assert_eq!(names[0], "Blue 00");

        let body = json(app.get("/suggestions?term=SK", &cookie).await).await;
        assert_eq!(body, json!(["sky"]));

        let body = json(app.get("/suggestions", &cookie).await).await;
        assert_eq!(body, json!([]));
    }
}
