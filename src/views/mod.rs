//! HTML pages rendered with `maud`; spliced values are escaped by the macro.

use maud::{html, Markup, DOCTYPE};
use tower_sessions::Session;

use crate::auth::dto::SessionUser;
use crate::flash::{self, Notice, NoticeKind};

pub mod auth;
pub mod home;
pub mod products;
pub mod suppliers;

/// Per-request data shared by every page.
pub struct PageContext {
    pub user: Option<SessionUser>,
    pub notices: Vec<Notice>,
}

impl PageContext {
    /// Drains pending notices, so call it only when a page is about to be rendered.
    pub async fn load(session: &Session, user: Option<SessionUser>) -> Self {
        Self {
            user,
            notices: flash::take(session).await,
        }
    }
}

fn notice_class(kind: NoticeKind) -> &'static str {
    match kind {
        NoticeKind::Success => "notice success",
        NoticeKind::Error => "notice error",
    }
}

pub(crate) fn layout(ctx: &PageContext, title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) " · Stockroom" }
            }
            body {
                nav {
                    a href="/" { "Home" } " "
                    a href="/suppliers" { "Suppliers" } " "
                    a href="/products" { "Products" } " "
                    @match &ctx.user {
                        Some(user) => {
                            span class="who" { (user.username) } " "
                            a href="/logout" { "Log out" }
                        }
                        None => {
                            a href="/login" { "Log in" } " "
                            a href="/register" { "Register" }
                        }
                    }
                }
                @for n in &ctx.notices {
                    div class=(notice_class(n.kind)) { (n.message) }
                }
                main {
                    h1 { (title) }
                    (body)
                }
            }
        }
    }
}
