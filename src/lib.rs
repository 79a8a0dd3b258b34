//! Render HTML data tables from Rust types. Cells are rendered with [maud], row attributes are
//! looked up through [serde], and link columns are resolved against named [axum] routes.
//!
//! Example
//!
//! ```
//! use axum::routing::get;
//! use derived_table::{
//!     render::{self, RenderContext},
//!     urls::NamedRouter,
//!     Column, FieldColumn, Link, LinkColumn, Row,
//! };
//! use serde::Serialize;
//!
//! #[derive(Serialize, Row)]
//! struct Post {
//!     id: u32,
//!     title: String,
//! }
//!
//! let (_router, urls) = NamedRouter::<()>::new()
//!     .route("/posts/:id", "post-detail", get(|| async { "post" }))
//!     .route("/posts/:id/edit", "post-edit", get(|| async { "edit" }))
//!     .into_parts();
//!
//! let title = FieldColumn::new("title");
//! let actions = LinkColumn::new([
//!     Link::new("View", "post-detail").arg("id"),
//!     Link::new("Edit", "post-edit").arg("id"),
//! ])
//! .delimiter(" | ");
//!
//! let post = Post { id: 1, title: "Hello".into() };
//! let ctx = RenderContext::new(&urls);
//! let html = actions.render(&post, &ctx).unwrap();
//! assert_eq!(
//!     html.into_string(),
//!     r#"<a href="/posts/1">View</a> | <a href="/posts/1/edit">Edit</a>"#
//! );
//! let table = render::table(&ctx, &[&title, &actions], [&post as &dyn Row]).unwrap();
//! assert!(table.into_string().contains("<th>Title</th>"));
//! ```

pub use accessor::{Accessor, Row};
pub use column::{Column, FieldColumn, LinkColumn};
pub use error::Error;
pub use link::{Link, LinkText};

pub mod accessor;
pub mod column;
mod error;
pub mod link;
pub mod render;
pub mod urls;

#[doc(hidden)]
pub mod derive {
    pub use serde_json;
}
