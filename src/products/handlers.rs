use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use tower_sessions::Session;
use tracing::instrument;

use super::{
    dto::{ProductForm, ProductQuery},
    services,
};
use crate::{
    auth::extractors::{require_authenticated, CurrentUser},
    error::{AppError, AppResult},
    flash::{self, Notice},
    products::repo_types::{ProductFilter, ProductListing},
    state::AppState,
    suppliers::repo_types::Supplier,
    views::{self, PageContext},
};

const LIST_PATH: &str = "/products";

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/products", get(list_products))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/products/create", get(show_create).post(create_product))
        .route("/products/edit/:id", get(show_edit).post(update_product))
        .route("/products/delete/:id", post(delete_product))
        .route_layer(middleware::from_fn(require_authenticated))
}

async fn load_listing(
    state: &AppState,
    query: &ProductQuery,
) -> AppResult<(ProductFilter, Vec<ProductListing>, Vec<Supplier>)> {
    let filter = query.to_filter()?;
    let listings = state.products.list(&filter).await?;
    let suppliers = state.suppliers.list().await?;
    Ok((filter, listings, suppliers))
}

#[instrument(skip(state, session, user))]
pub async fn list_products(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ProductQuery>,
) -> Response {
    match load_listing(&state, &query).await {
        Ok((filter, listings, suppliers)) => {
            let ctx = PageContext::load(&session, user).await;
            views::products::index(&ctx, &listings, &suppliers, &filter).into_response()
        }
        Err(e) => flash::redirect_error(&session, &e, "Could not load products.", "/").await,
    }
}

#[instrument(skip_all)]
pub async fn show_create(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(user): CurrentUser,
) -> Response {
    match state.suppliers.list().await {
        Ok(suppliers) => {
            let ctx = PageContext::load(&session, user).await;
            views::products::form(&ctx, None, &suppliers).into_response()
        }
        Err(e) => {
            let err = AppError::from(e);
            flash::redirect_error(&session, &err, "Could not load suppliers.", LIST_PATH).await
        }
    }
}

#[instrument(skip(state, session, form))]
pub async fn create_product(
    State(state): State<AppState>,
    session: Session,
    form: Result<Form<ProductForm>, FormRejection>,
) -> Response {
    let form = match flash::form_or_redirect(&session, form, LIST_PATH).await {
        Ok(form) => form,
        Err(res) => return res,
    };
    match services::create(state.products.as_ref(), &form).await {
        Ok(_) => {
            flash::redirect_with(&session, Notice::success("Product created."), LIST_PATH).await
        }
        Err(e) => {
            flash::redirect_error(&session, &e, "Could not create product.", LIST_PATH).await
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
    let loaded = async {
        let product = services::get(state.products.as_ref(), &id).await?;
        let suppliers = state.suppliers.list().await?;
        Ok::<_, AppError>((product, suppliers))
    }
    .await;
    match loaded {
        Ok((product, suppliers)) => {
            let ctx = PageContext::load(&session, user).await;
            views::products::form(&ctx, Some(&product), &suppliers).into_response()
        }
        Err(e) => flash::redirect_error(&session, &e, "Could not load product.", LIST_PATH).await,
    }
}

#[instrument(skip(state, session, form))]
pub async fn update_product(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    form: Result<Form<ProductForm>, FormRejection>,
) -> Response {
    let form = match flash::form_or_redirect(&session, form, LIST_PATH).await {
        Ok(form) => form,
        Err(res) => return res,
    };
    match services::update(state.products.as_ref(), &id, &form).await {
        Ok(()) => {
            flash::redirect_with(&session, Notice::success("Product updated."), LIST_PATH).await
        }
        Err(e) => {
            flash::redirect_error(&session, &e, "Could not update product.", LIST_PATH).await
        }
    }
}

#[instrument(skip(state, session))]
pub async fn delete_product(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Response {
    match services::delete(state.products.as_ref(), &id).await {
        Ok(()) => {
            flash::redirect_with(&session, Notice::success("Product deleted."), LIST_PATH).await
        }
        Err(e) => {
            flash::redirect_error(&session, &e, "Could not delete product.", LIST_PATH).await
        }
    }
}
