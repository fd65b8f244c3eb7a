use maud::{html, Markup};

use super::{layout, PageContext};

pub fn register(ctx: &PageContext) -> Markup {
    let body = html! {
        form method="post" action="/register" {
            label { "Username " input name="username" required; }
            label { "Email " input name="email" type="email" required; }
            label { "Phone " input name="phone"; }
            label { "Password " input name="password" type="password" required; }
            button type="submit" { "Register" }
        }
        p { "Already have an account? " a href="/login" { "Log in" } }
    };
    layout(ctx, "Register", body)
}

pub fn login(ctx: &PageContext) -> Markup {
    let body = html! {
        form method="post" action="/login" {
            label { "Username " input name="username" required; }
            label { "Password " input name="password" type="password" required; }
            button type="submit" { "Log in" }
        }
        p { a href="/forgot" { "Forgot your password?" } }
    };
    layout(ctx, "Log in", body)
}

pub fn forgot(ctx: &PageContext) -> Markup {
    let body = html! {
        form method="post" action="/forgot" {
            label { "Email " input name="email" type="email" required; }
            label { "New password " input name="new_password" type="password" required; }
            button type="submit" { "Reset password" }
        }
    };
    layout(ctx, "Reset password", body)
}
