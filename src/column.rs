use std::fmt::Debug;

use maud::{html, Markup, PreEscaped};
use serde::Deserialize;

use crate::{accessor::Accessor, link::Link, render::RenderContext, Error, Row};

/// A column of a table, rendering one cell per row
pub trait Column: Debug {
    fn info(&self) -> &ColumnInfo;
    fn render(&self, obj: &dyn Row, ctx: &RenderContext) -> Result<Markup, Error>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnInfo {
    /// text of the header cell, derived from `field` if unset
    pub header: Option<String>,
    /// attribute of the row displayed in this column
    pub field: Option<Accessor>,
    pub sortable: bool,
    pub searchable: bool,
    /// whether the content is trusted HTML and must not be escaped
    pub safe: bool,
    /// whether the column is displayed at all
    pub visible: bool,
}

impl Default for ColumnInfo {
    fn default() -> Self {
        Self {
            header: None,
            field: None,
            sortable: true,
            searchable: true,
            safe: false,
            visible: true,
        }
    }
}

/// Displays a single attribute of the row
#[derive(Clone, Debug, Default)]
pub struct FieldColumn {
    pub info: ColumnInfo,
}

impl FieldColumn {
    pub fn new(field: impl Into<Accessor>) -> Self {
        Self {
            info: ColumnInfo {
                field: Some(field.into()),
                ..Default::default()
            },
        }
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.info.header = Some(header.into());
        self
    }

    pub fn safe(mut self, safe: bool) -> Self {
        self.info.safe = safe;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.info.visible = visible;
        self
    }
}

impl Column for FieldColumn {
    fn info(&self) -> &ColumnInfo {
        &self.info
    }

    fn render(&self, obj: &dyn Row, _ctx: &RenderContext) -> Result<Markup, Error> {
        let Some(field) = &self.info.field else {
            return Ok(html!());
        };
        let value = field.resolve_text(obj)?;
        Ok(if self.info.safe {
            PreEscaped(value)
        } else {
            html!((value))
        })
    }
}

/// Displays one or more [`Link`]s per row, separated by `delimiter`.
///
/// Never searchable. Escaping is left to the links, which produce trusted markup.
#[derive(Clone, Debug, Deserialize)]
#[serde(from = "LinkColumnConfig")]
pub struct LinkColumn {
    info: ColumnInfo,
    pub links: Vec<Link>,
    /// inserted between links as is
    pub delimiter: String,
}

impl LinkColumn {
    pub fn new(links: impl IntoIterator<Item = Link>) -> Self {
        Self {
            info: ColumnInfo {
                searchable: false,
                safe: false,
                ..Default::default()
            },
            links: links.into_iter().collect(),
            delimiter: " ".to_string(),
        }
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.info.header = Some(header.into());
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.info.sortable = sortable;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.info.visible = visible;
        self
    }
}

impl Column for LinkColumn {
    fn info(&self) -> &ColumnInfo {
        &self.info
    }

    fn render(&self, obj: &dyn Row, ctx: &RenderContext) -> Result<Markup, Error> {
        let mut out = String::new();
        for (i, link) in self.links.iter().enumerate() {
            if i > 0 {
                out.push_str(&self.delimiter);
            }
            out.push_str(&link.render(obj, ctx)?.into_string());
        }
        Ok(PreEscaped(out))
    }
}

/// Declarative form of a [`LinkColumn`]
#[derive(Clone, Debug, Deserialize)]
pub struct LinkColumnConfig {
    #[serde(default)]
    pub header: Option<String>,
    pub links: Vec<Link>,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

fn default_delimiter() -> String {
    " ".to_string()
}

impl From<LinkColumnConfig> for LinkColumn {
    fn from(value: LinkColumnConfig) -> Self {
        let column = LinkColumn::new(value.links).delimiter(value.delimiter);
        match value.header {
            Some(header) => column.header(header),
            None => column,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::urls::UrlConf;

    fn urls() -> UrlConf {
        UrlConf::new()
            .route("post-edit", "/posts/:id/edit")
            .route("post-delete", "/posts/:id/delete")
    }

    #[test]
    fn joins_links_with_delimiter() {
        let urls = urls();
        let ctx = RenderContext::new(&urls);
        let row = json!({"id": 4});
        let edit = Link::new("Edit", "post-edit").arg("id");
        let delete = Link::new("Delete", "post-delete").arg("id");
        let column = LinkColumn::new([edit.clone(), delete.clone()]).delimiter(", ");

        let expected = format!(
            "{}, {}",
            edit.render(&row, &ctx).unwrap().into_string(),
            delete.render(&row, &ctx).unwrap().into_string()
        );
        assert_eq!(column.render(&row, &ctx).unwrap().into_string(), expected);
        assert_eq!(
            expected,
            r#"<a href="/posts/4/edit">Edit</a>, <a href="/posts/4/delete">Delete</a>"#
        );
    }

    #[test]
    fn link_column_flags() {
        let column = LinkColumn::new(Vec::new());
        assert!(!column.info().searchable);
        assert!(!column.info().safe);
        assert_eq!(column.delimiter, " ");
        let urls = urls();
        assert_eq!(
            column
                .render(&json!({}), &RenderContext::new(&urls))
                .unwrap()
                .into_string(),
            ""
        );
    }

    #[test]
    fn link_column_from_config() {
        let column: LinkColumn = serde_json::from_value(json!({
            "header": "Actions",
            "links": [{"text": {"literal": "Edit"}, "viewname": "post-edit", "args": ["id"]}],
        }))
        .unwrap();
        assert_eq!(column.info().header.as_deref(), Some("Actions"));
        assert_eq!(column.delimiter, " ");
        assert!(!column.info().searchable);
        assert_eq!(column.links.len(), 1);
    }

    #[test]
    fn field_column_escapes_unless_safe() {
        let urls = urls();
        let ctx = RenderContext::new(&urls);
        let row = json!({"title": "<i>x</i>"});
        assert_eq!(
            FieldColumn::new("title")
                .render(&row, &ctx)
                .unwrap()
                .into_string(),
            "&lt;i&gt;x&lt;/i&gt;"
        );
        assert_eq!(
            FieldColumn::new("title")
                .safe(true)
                .render(&row, &ctx)
                .unwrap()
                .into_string(),
            "<i>x</i>"
        );
        assert!(FieldColumn::new("missing").render(&row, &ctx).is_err());
    }
}
