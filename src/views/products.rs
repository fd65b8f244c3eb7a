use maud::{html, Markup};
use uuid::Uuid;

use super::{layout, PageContext};
use crate::products::repo_types::{Product, ProductFilter, ProductListing, ProductSort};
use crate::suppliers::repo_types::Supplier;

fn supplier_options(suppliers: &[Supplier], selected: Option<Uuid>) -> Markup {
    html! {
        @for s in suppliers {
            option value=(s.id.to_string()) selected[selected == Some(s.id)] { (s.name) }
        }
    }
}

/// Rows shared by the product listing and the home page.
pub(crate) fn table(listings: &[ProductListing], can_edit: bool) -> Markup {
    html! {
        table {
            tr { th { "Name" } th { "Price" } th { "Quantity" } th { "Supplier" } th {} }
            @for row in listings {
                @let p = &row.product;
                tr {
                    td { (p.name) }
                    td { (format!("{:.2}", p.price)) }
                    td { (p.quantity) }
                    td {
                        @match &row.supplier {
                            Some(s) => { (s.name) }
                            None => { em { "missing supplier" } }
                        }
                    }
                    td {
                        @if can_edit {
                            a href=(format!("/products/edit/{}", p.id)) { "Edit" } " "
                            form method="post" action=(format!("/products/delete/{}", p.id)) style="display:inline" {
                                button type="submit" { "Delete" }
                            }
                        }
                    }
                }
            }
        }
        @if listings.is_empty() {
            p { "No products found." }
        }
    }
}

pub fn index(
    ctx: &PageContext,
    listings: &[ProductListing],
    suppliers: &[Supplier],
    filter: &ProductFilter,
) -> Markup {
    let can_edit = ctx.user.is_some();
    let body = html! {
        @if can_edit {
            p { a href="/products/create" { "New product" } }
        }
        form method="get" action="/products" {
            select name="supplier" {
                option value="" { "All suppliers" }
                (supplier_options(suppliers, filter.supplier_id))
            }
            input name="q" value=(filter.name_contains.as_deref().unwrap_or_default()) placeholder="Search by name";
            select name="sort" {
                option value="" { "Newest" }
                option value="name" selected[filter.sort == ProductSort::Name] { "Name" }
            }
            button type="submit" { "Filter" }
        }
        (table(listings, can_edit))
    };
    layout(ctx, "Products", body)
}

pub fn form(ctx: &PageContext, product: Option<&Product>, suppliers: &[Supplier]) -> Markup {
    let (title, action) = match product {
        Some(p) => ("Edit product", format!("/products/edit/{}", p.id)),
        None => ("New product", "/products/create".to_string()),
    };
    let body = html! {
        form method="post" action=(action) {
            label { "Name " input name="name" value=(product.map(|p| p.name.as_str()).unwrap_or_default()) required; }
            label { "Price " input name="price" type="number" step="0.01" min="0" value=(product.map(|p| p.price).unwrap_or(0.0).to_string()) required; }
            label { "Quantity " input name="quantity" type="number" step="1" min="0" value=(product.map(|p| p.quantity).unwrap_or(0)) required; }
            label {
                "Supplier "
                select name="supplier" required {
                    option value="" { "Choose…" }
                    (supplier_options(suppliers, product.map(|p| p.supplier_id)))
                }
            }
            button type="submit" { "Save" }
        }
        p { a href="/products" { "Back" } }
    };
    layout(ctx, title, body)
}
