use convert_case::{Case, Casing};
use maud::{html, Markup};

use crate::{column::ColumnInfo, urls::Reverse, Column, Error, Row};

/// Everything a [`Column`] needs besides the row itself
#[non_exhaustive]
pub struct RenderContext<'a> {
    /// used to resolve view names of links
    pub urls: &'a dyn Reverse,
}

impl<'a> RenderContext<'a> {
    pub fn new(urls: &'a dyn Reverse) -> Self {
        Self { urls }
    }
}

pub fn header(info: &ColumnInfo) -> String {
    match (&info.header, &info.field) {
        (Some(header), _) => header.clone(),
        (None, Some(field)) => field.as_str().replace('.', " ").to_case(Case::Title),
        (None, None) => String::new(),
    }
}

/// Render `rows` as a HTML table, skipping hidden columns.
///
/// Rendering stops at the first cell that fails.
pub fn table<'r>(
    ctx: &RenderContext,
    columns: &[&dyn Column],
    rows: impl IntoIterator<Item = &'r dyn Row>,
) -> Result<Markup, Error> {
    let columns = columns
        .iter()
        .copied()
        .filter(|c| c.info().visible)
        .collect::<Vec<_>>();
    let cells = rows
        .into_iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| c.render(row, ctx))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(html! {
        table class="table" {
            thead {
                tr {
                    @for c in &columns {
                        th {(header(c.info()))}
                    }
                }
            }
            tbody {
                @for row in cells {
                    tr {
                        @for cell in row {
                            td {(cell)}
                        }
                    }
                }
            }
        }
    })
}
