use maud::{html, Markup};

use super::{layout, PageContext};
use crate::suppliers::repo_types::Supplier;

pub fn index(ctx: &PageContext, suppliers: &[Supplier]) -> Markup {
    let can_edit = ctx.user.is_some();
    let body = html! {
        @if can_edit {
            p { a href="/suppliers/create" { "New supplier" } }
        }
        table {
            tr { th { "Name" } th { "Address" } th { "Phone" } th {} }
            @for s in suppliers {
                tr {
                    td { (s.name) }
                    td { (s.address.as_deref().unwrap_or_default()) }
                    td { (s.phone.as_deref().unwrap_or_default()) }
                    td {
                        a href=(format!("/products?supplier={}", s.id)) { "Products" }
                        @if can_edit {
                            " "
                            a href=(format!("/suppliers/edit/{}", s.id)) { "Edit" } " "
                            form method="post" action=(format!("/suppliers/delete/{}", s.id)) style="display:inline" {
                                button type="submit" { "Delete" }
                            }
                        }
                    }
                }
            }
        }
        @if suppliers.is_empty() {
            p { "No suppliers yet." }
        }
    };
    layout(ctx, "Suppliers", body)
}

pub fn form(ctx: &PageContext, supplier: Option<&Supplier>) -> Markup {
    let (title, action) = match supplier {
        Some(s) => ("Edit supplier", format!("/suppliers/edit/{}", s.id)),
        None => ("New supplier", "/suppliers/create".to_string()),
    };
    let body = html! {
        form method="post" action=(action) {
            label { "Name " input name="name" value=(supplier.map(|s| s.name.as_str()).unwrap_or_default()) required; }
            label { "Address " input name="address" value=(supplier.and_then(|s| s.address.as_deref()).unwrap_or_default()); }
            label { "Phone " input name="phone" value=(supplier.and_then(|s| s.phone.as_deref()).unwrap_or_default()); }
            button type="submit" { "Save" }
        }
        p { a href="/suppliers" { "Back" } }
    };
    layout(ctx, title, body)
}
