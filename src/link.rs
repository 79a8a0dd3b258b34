use std::collections::BTreeMap;

use maud::{html, Markup, PreEscaped};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    accessor::Accessor,
    render::RenderContext,
    urls::{Reverse, ReverseRequest},
    Error, Row,
};

/// Display text of a [`Link`]
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkText {
    Literal(String),
    /// resolved against the row at render time
    Accessor(Accessor),
}

impl LinkText {
    pub fn resolve(&self, obj: &dyn Row) -> Result<String, Error> {
        match self {
            LinkText::Literal(text) => Ok(text.clone()),
            LinkText::Accessor(accessor) => accessor.resolve_text(obj),
        }
    }
}

impl From<&str> for LinkText {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for LinkText {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<Accessor> for LinkText {
    fn from(value: Accessor) -> Self {
        Self::Accessor(value)
    }
}

/// A `<a>` element pointing to a named view, with parameters taken from the row.
///
/// ```
/// use derived_table::{render::RenderContext, urls::UrlConf, Accessor, Link};
/// use serde_json::json;
///
/// let urls = UrlConf::new().route("post-detail", "/posts/:id");
/// let link = Link::new(Accessor::from("title"), "post-detail").arg("id");
/// let row = json!({"id": 7, "title": "Hello"});
/// let html = link.render(&row, &RenderContext::new(&urls)).unwrap();
/// assert_eq!(html.into_string(), r#"<a href="/posts/7">Hello</a>"#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Link {
    pub text: LinkText,
    pub viewname: String,
    /// attributes of the row used as positional parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Accessor>,
    /// parameter name -> attribute of the row
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub kwargs: BTreeMap<String, Accessor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urlconf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_app: Option<String>,
    /// name of a javascript function called with the url instead of following it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onclick: Option<String>,
}

impl Link {
    pub fn new(text: impl Into<LinkText>, viewname: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            viewname: viewname.into(),
            args: Vec::new(),
            kwargs: BTreeMap::new(),
            urlconf: None,
            current_app: None,
            onclick: None,
        }
    }

    pub fn arg(mut self, attr: impl Into<Accessor>) -> Self {
        self.args.push(attr.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, attr: impl Into<Accessor>) -> Self {
        self.kwargs.insert(name.into(), attr.into());
        self
    }

    pub fn urlconf(mut self, urlconf: impl Into<String>) -> Self {
        self.urlconf = Some(urlconf.into());
        self
    }

    pub fn current_app(mut self, current_app: impl Into<String>) -> Self {
        self.current_app = Some(current_app.into());
        self
    }

    pub fn onclick(mut self, handler: impl Into<String>) -> Self {
        self.onclick = Some(handler.into());
        self
    }

    /// Resolve the url of this link for `obj`.
    ///
    /// A view that can't be reversed results in an empty url. Attributes missing on `obj` are
    /// returned as [`Error::MissingAttribute`].
    pub fn resolve(&self, obj: &dyn Row, urls: &dyn Reverse) -> Result<String, Error> {
        let req = ReverseRequest {
            viewname: &self.viewname,
            args: self
                .args
                .iter()
                .map(|a| a.resolve_text(obj))
                .collect::<Result<_, _>>()?,
            kwargs: self
                .kwargs
                .iter()
                .map(|(k, a)| Ok((k.clone(), a.resolve_text(obj)?)))
                .collect::<Result<_, Error>>()?,
            urlconf: self.urlconf.as_deref(),
            current_app: self.current_app.as_deref(),
        };
        match urls.reverse(&req) {
            Ok(url) => {
                trace!("resolved link `{}` to {url}", self.viewname);
                Ok(url)
            }
            Err(e) => {
                debug!("failed to resolve link `{}`: {e}", self.viewname);
                Ok(String::new())
            }
        }
    }

    /// Render this link as `<a>` element. The text is not escaped.
    pub fn render(&self, obj: &dyn Row, ctx: &RenderContext) -> Result<Markup, Error> {
        let url = self.resolve(obj, ctx.urls)?;
        let text = PreEscaped(self.text.resolve(obj)?);
        Ok(match &self.onclick {
            Some(onclick) => html! {
                a href="javascript:void(0)" onclick=(format!("{onclick}({url})")) {(text)}
            },
            None => html! {
                a href=(url) {(text)}
            },
        })
    }
}
