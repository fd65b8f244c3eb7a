use std::net::SocketAddr;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::AppConfig;
use crate::state::AppState;
use crate::{auth, home, products, suppliers};

pub fn build_app<Store>(state: AppState, session_store: Store) -> Router
where
    Store: SessionStore + Clone,
{
    let session_cfg = &state.config.session;
    let sessions = SessionManagerLayer::new(session_store)
        .with_name(session_cfg.cookie_name.clone())
        .with_http_only(true)
        .with_secure(session_cfg.secure)
        .with_expiry(Expiry::OnInactivity(Duration::hours(session_cfg.ttl_hours)))
        .with_signed(session_cfg.key.clone());

    Router::new()
        .route("/", get(home::index))
        .route("/health", get(health))
        .merge(auth::router())
        .merge(suppliers::router())
        .merge(products::router())
        .with_state(state)
        .layer(sessions)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services::register;
    use crate::products::repo_types::ProductFilter;
    use crate::suppliers::repo_types::SupplierFields;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    struct Harness {
        state: AppState,
        app: Router,
    }

    impl Harness {
        async fn new() -> Self {
            let state = AppState::fake();
            register(state.users.as_ref(), "alice", "alice@example.com", "s3cret", None)
                .await
                .expect("seed user");
            let app = build_app(state.clone(), MemoryStore::default());
            Self { state, app }
        }

        async fn send(&self, req: Request<Body>) -> Response {
            self.app.clone().oneshot(req).await.expect("infallible")
        }

        async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
            let mut req = Request::get(uri);
            if let Some(c) = cookie {
                req = req.header(header::COOKIE, c);
            }
            self.send(req.body(Body::empty()).unwrap()).await
        }

        async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response {
            let mut req = Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            if let Some(c) = cookie {
                req = req.header(header::COOKIE, c);
            }
            self.send(req.body(Body::from(body.to_string())).unwrap()).await
        }

        /// Log in as alice and return the `name=value` cookie pair.
        async fn login(&self) -> String {
            let res = self
                .post_form("/login", "username=alice&password=s3cret", None)
                .await;
            assert_eq!(location(&res), Some("/"));
            session_cookie(&res).expect("login sets a session cookie")
        }

        async fn supplier(&self, name: &str) -> uuid::Uuid {
            self.state
                .suppliers
                .create(SupplierFields {
                    name: name.into(),
                    address: None,
                    phone: None,
                })
                .await
                .unwrap()
                .id
        }

        async fn product_count(&self) -> usize {
            self.state
                .products
                .list(&ProductFilter::default())
                .await
                .unwrap()
                .len()
        }
    }

    fn location(res: &Response) -> Option<&str> {
        res.headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    fn session_cookie(res: &Response) -> Option<String> {
        res.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("stockroom.sid="))
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }

    async fn body_text(res: Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let h = Harness::new().await;
        let res = h.get("/health", None).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_text(res).await).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn session_cookie_is_http_only() {
        let h = Harness::new().await;
        let res = h
            .post_form("/login", "username=alice&password=s3cret", None)
            .await;
        let raw = res
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert!(raw.contains("HttpOnly"));
    }

    #[tokio::test]
    async fn anonymous_create_redirects_to_login() {
        let h = Harness::new().await;
        let supplier = h.supplier("Acme").await;
        let body = format!("name=Widget&price=1&quantity=1&supplier={supplier}");

        let res = h.post_form("/products/create", &body, None).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), Some("/login"));
        assert_eq!(h.product_count().await, 0);

        // the login page shows the guard's notice
        let cookie = session_cookie(&res).expect("guard stores a notice");
        let page = body_text(h.get("/login", Some(&cookie)).await).await;
        assert!(page.contains("Please log in to continue."));
    }

    #[tokio::test]
    async fn authenticated_create_adds_one_product() {
        let h = Harness::new().await;
        let cookie = h.login().await;
        let supplier = h.supplier("Acme").await;
        let body = format!("name=Widget&price=abc&quantity=4&supplier={supplier}");

        let res = h.post_form("/products/create", &body, Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), Some("/products"));

        let all = h
            .state
            .products
            .list(&ProductFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].product.name, "Widget");
        assert_eq!(all[0].product.price, 0.0);
        assert_eq!(all[0].product.quantity, 4);

        let page = body_text(h.get("/products", Some(&cookie)).await).await;
        assert!(page.contains("Product created."));
        assert!(page.contains("Widget"));
    }

    #[tokio::test]
    async fn missing_name_is_rejected_with_notice() {
        let h = Harness::new().await;
        let cookie = h.login().await;
        let supplier = h.supplier("Acme").await;
        let body = format!("price=3&quantity=1&supplier={supplier}");

        let res = h.post_form("/products/create", &body, Some(&cookie)).await;
        assert_eq!(location(&res), Some("/products"));
        assert_eq!(h.product_count().await, 0);

        let page = body_text(h.get("/products", Some(&cookie)).await).await;
        assert!(page.contains("Product name is required."));
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let h = Harness::new().await;
        let cookie = h.login().await;

        let res = h.get("/suppliers/create", Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = h.get("/logout", Some(&cookie)).await;
        assert_eq!(location(&res), Some("/"));

        let res = h.get("/suppliers/create", Some(&cookie)).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), Some("/login"));
    }

    #[tokio::test]
    async fn logged_in_users_skip_auth_forms() {
        let h = Harness::new().await;
        let cookie = h.login().await;
        for path in ["/login", "/register", "/forgot"] {
            let res = h.get(path, Some(&cookie)).await;
            assert_eq!(location(&res), Some("/"), "{path}");
        }
        let res = h.get("/login", None).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn wrong_password_stays_anonymous() {
        let h = Harness::new().await;
        let res = h
            .post_form("/login", "username=alice&password=nope", None)
            .await;
        assert_eq!(location(&res), Some("/login"));
        let cookie = session_cookie(&res).expect("notice cookie");

        let page = body_text(h.get("/login", Some(&cookie)).await).await;
        assert!(page.contains("Incorrect password."));
        let res = h.get("/products/create", Some(&cookie)).await;
        assert_eq!(location(&res), Some("/login"));
    }

    #[tokio::test]
    async fn register_then_reset_then_login() {
        let h = Harness::new().await;
        let res = h
            .post_form(
                "/register",
                "username=bob&email=bob%40example.com&password=first&phone=",
                None,
            )
            .await;
        assert_eq!(location(&res), Some("/login"));

        let res = h
            .post_form("/register", "username=bob&email=b2%40example.com&password=x", None)
            .await;
        assert_eq!(location(&res), Some("/register"));

        let res = h
            .post_form("/forgot", "email=bob%40example.com&new_password=second", None)
            .await;
        assert_eq!(location(&res), Some("/login"));

        let res = h
            .post_form("/login", "username=bob&password=first", None)
            .await;
        assert_eq!(location(&res), Some("/login"));
        let res = h
            .post_form("/login", "username=bob&password=second", None)
            .await;
        assert_eq!(location(&res), Some("/"));
    }

    #[tokio::test]
    async fn product_listing_filters() {
        let h = Harness::new().await;
        let acme = h.supplier("Acme").await;
        let globex = h.supplier("Globex").await;
        let cookie = h.login().await;
        for (name, supplier) in [
            ("Blue Widget", acme),
            ("Gadget", acme),
            ("widget mini", globex),
        ] {
            let body = format!("name={}&price=2&quantity=1&supplier={supplier}", name.replace(' ', "+"));
            h.post_form("/products/create", &body, Some(&cookie)).await;
        }

        let page = body_text(h.get("/products?q=WIDGET", None).await).await;
        assert!(page.contains("Blue Widget"));
        assert!(page.contains("widget mini"));
        assert!(!page.contains("Gadget"));

        let page = body_text(h.get(&format!("/products?supplier={acme}"), None).await).await;
        assert!(page.contains("Blue Widget"));
        assert!(page.contains("Gadget"));
        assert!(!page.contains("widget mini"));

        let res = h.get("/products?supplier=not-an-id", None).await;
        assert_eq!(location(&res), Some("/"));
    }

    #[tokio::test]
    async fn supplier_edit_and_delete() {
        let h = Harness::new().await;
        let cookie = h.login().await;
        let id = h.supplier("Acme").await;

        let res = h
            .post_form(
                &format!("/suppliers/edit/{id}"),
                "name=Acme+Corp&address=1+Main+St&phone=",
                Some(&cookie),
            )
            .await;
        assert_eq!(location(&res), Some("/suppliers"));
        let s = h.state.suppliers.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(s.name, "Acme Corp");
        assert_eq!(s.address.as_deref(), Some("1 Main St"));
        assert_eq!(s.phone, None);

        let res = h
            .get(&format!("/suppliers/edit/{}", uuid::Uuid::new_v4()), Some(&cookie))
            .await;
        assert_eq!(location(&res), Some("/suppliers"));

        let res = h
            .post_form(&format!("/suppliers/delete/{id}"), "", Some(&cookie))
            .await;
        assert_eq!(location(&res), Some("/suppliers"));
        assert!(h.state.suppliers.get_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn public_listings_hide_edit_controls() {
        let h = Harness::new().await;
        h.supplier("Acme").await;
        let page = body_text(h.get("/suppliers", None).await).await;
        assert!(page.contains("Acme"));
        assert!(!page.contains("/suppliers/delete/"));

        let cookie = h.login().await;
        let page = body_text(h.get("/suppliers", Some(&cookie)).await).await;
        assert!(page.contains("/suppliers/delete/"));
    }

    fn raw_set_cookie(res: &Response) -> String {
        res.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("stockroom.sid="))
            .expect("session cookie")
            .to_string()
    }

    #[tokio::test]
    async fn login_cookie_lasts_a_day() {
        let h = Harness::new().await;
        let res = h
            .post_form("/login", "username=alice&password=s3cret", None)
            .await;
        assert!(raw_set_cookie(&res).contains("Max-Age=86400"));
    }

    #[tokio::test]
    async fn login_issues_a_new_session_id() {
        let h = Harness::new().await;
        // any notice gives the visitor a session before logging in
        let res = h.get("/products/create", None).await;
        let before = session_cookie(&res).expect("pre-login session");

        let res = h
            .post_form("/login", "username=alice&password=s3cret", Some(&before))
            .await;
        assert_eq!(location(&res), Some("/"));
        let after = session_cookie(&res).expect("post-login session");
        assert_ne!(before, after);

        // the old id is gone, the new one is logged in
        let res = h.get("/products/create", Some(&before)).await;
        assert_eq!(location(&res), Some("/login"));
        let res = h.get("/products/create", Some(&after)).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn tampered_cookie_is_anonymous() {
        let h = Harness::new().await;
        let mut cookie = h.login().await;
        let last = cookie.pop().unwrap();
        cookie.push(if last == 'A' { 'B' } else { 'A' });

        let res = h.get("/suppliers/create", Some(&cookie)).await;
        assert_eq!(location(&res), Some("/login"));
    }

    #[tokio::test]
    async fn unreadable_form_redirects_with_notice() {
        let h = Harness::new().await;
        let cookie = h.login().await;

        let req = Request::post("/suppliers/create")
            .header(header::COOKIE, &cookie)
            .body(Body::from("name=Acme"))
            .unwrap();
        let res = h.send(req).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), Some("/suppliers"));

        let page = body_text(h.get("/suppliers", Some(&cookie)).await).await;
        assert!(page.contains("Could not read the submitted form."));
        assert!(h.state.suppliers.list().await.unwrap().is_empty());

        let req = Request::post("/login")
            .body(Body::from("username=alice&password=s3cret"))
            .unwrap();
        let res = h.send(req).await;
        assert_eq!(location(&res), Some("/login"));
    }
}
