use maud::{html, Markup};

use super::{layout, products, PageContext};
use crate::products::repo_types::ProductListing;
use crate::suppliers::repo_types::Supplier;

pub fn index(ctx: &PageContext, suppliers: &[Supplier], latest: &[ProductListing]) -> Markup {
    let body = html! {
        h2 { "Suppliers" }
        ul {
            @for s in suppliers {
                li { a href=(format!("/products?supplier={}", s.id)) { (s.name) } }
            }
        }
        h2 { "Latest products" }
        (products::table(latest, ctx.user.is_some()))
    };
    layout(ctx, "Inventory", body)
}
