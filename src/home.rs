use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::{error, instrument};

use crate::{
    auth::extractors::CurrentUser,
    products::services::latest,
    state::AppState,
    views::{self, PageContext},
};

/// Landing page: every supplier plus the newest products. A failed query
/// renders empty lists instead of redirecting.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> Response {
    let suppliers = state.suppliers.list().await.unwrap_or_else(|e| {
        error!(error = %e, "home: list suppliers failed");
        Vec::new()
    });
    let products = latest(state.products.as_ref()).await.unwrap_or_else(|e| {
        error!(error = %e, "home: latest products failed");
        Vec::new()
    });
    let ctx = PageContext::load(&session, user).await;
    views::home::index(&ctx, &suppliers, &products).into_response()
}
