use axum::{
    extract::{rejection::FormRejection, Path, State},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use tower_sessions::Session;
use tracing::instrument;

use super::{dto::SupplierForm, services};
use crate::{
    auth::extractors::{require_authenticated, CurrentUser},
    error::AppError,
    flash::{self, Notice},
    state::AppState,
    views::{self, PageContext},
};

const LIST_PATH: &str = "/suppliers";

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/suppliers", get(list_suppliers))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/suppliers/create", get(show_create).post(create_supplier))
        .route("/suppliers/edit/:id", get(show_edit).post(update_supplier))
        .route("/suppliers/delete/:id", post(delete_supplier))
        .route_layer(middleware::from_fn(require_authenticated))
}

#[instrument(skip_all)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> Response {
    match state.suppliers.list().await {
        Ok(suppliers) => {
            let ctx = PageContext::load(&session, user).await;
            views::suppliers::index(&ctx, &suppliers).into_response()
        }
        Err(e) => {
            let err = AppError::from(e);
            flash::redirect_error(&session, &err, "Could not load suppliers.", "/").await
        }
    }
}

#[instrument(skip_all)]
pub async fn show_create(session: Session, CurrentUser(user): CurrentUser) -> Response {
    let ctx = PageContext::load(&session, user).await;
    views::suppliers::form(&ctx, None).into_response()
}

#[instrument(skip(state, session, form))]
pub async fn create_supplier(
    State(state): State<AppState>,
    session: Session,
    form: Result<Form<SupplierForm>, FormRejection>,
) -> Response {
    let form = match flash::form_or_redirect(&session, form, LIST_PATH).await {
        Ok(form) => form,
        Err(res) => return res,
    };
    match services::create(state.suppliers.as_ref(), &form).await {
        Ok(_) => {
            flash::redirect_with(&session, Notice::success("Supplier created."), LIST_PATH).await
        }
        Err(e) => {
            flash::redirect_error(&session, &e, "Could not create supplier.", LIST_PATH).await
        }
    }
}

#[instrument(skip(state, session, user))]
pub async fn show_edit(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Response {
    match services::get(state.suppliers.as_ref(), &id).await {
        Ok(supplier) => {
            let ctx = PageContext::load(&session, user).await;
            views::suppliers::form(&ctx, Some(&supplier)).into_response()
        }
        Err(e) => {
            flash::redirect_error(&session, &e, "Could not load supplier.", LIST_PATH).await
        }
    }
}

#[instrument(skip(state, session, form))]
pub async fn update_supplier(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    form: Result<Form<SupplierForm>, FormRejection>,
) -> Response {
    let form = match flash::form_or_redirect(&session, form, LIST_PATH).await {
        Ok(form) => form,
        Err(res) => return res,
    };
    match services::update(state.suppliers.as_ref(), &id, &form).await {
        Ok(()) => {
            flash::redirect_with(&session, Notice::success("Supplier updated."), LIST_PATH).await
        }
        Err(e) => {
            flash::redirect_error(&session, &e, "Could not update supplier.", LIST_PATH).await
        }
    }
}

#[instrument(skip(state, session))]
pub async fn delete_supplier(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Response {
    match services::delete(state.suppliers.as_ref(), &id).await {
        Ok(()) => {
            flash::redirect_with(&session, Notice::success("Supplier deleted."), LIST_PATH).await
        }
        Err(e) => {
            flash::redirect_error(&session, &e, "Could not delete supplier.", LIST_PATH).await
        }
    }
}
