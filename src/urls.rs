//! Named routes and reverse resolution of view names to URL paths.
//!
//! Route paths use the axum path syntax: `:name` captures a single segment, `*name` captures
//! the rest of the path. View names may be namespaced with `:`, e.g. `"blog:post-detail"`.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{routing::MethodRouter, Router};
use thiserror::Error;
use tracing::warn;

/// Maps a view name and its parameters to a URL path
pub trait Reverse {
    fn reverse(&self, req: &ReverseRequest<'_>) -> Result<String, NoReverseMatch>;
}

impl<T: Reverse + ?Sized> Reverse for &T {
    fn reverse(&self, req: &ReverseRequest<'_>) -> Result<String, NoReverseMatch> {
        (**self).reverse(req)
    }
}

impl<T: Reverse + ?Sized> Reverse for Arc<T> {
    fn reverse(&self, req: &ReverseRequest<'_>) -> Result<String, NoReverseMatch> {
        (**self).reverse(req)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NoReverseMatch {
    #[error("no route named `{0}`")]
    UnknownView(String),
    #[error("`{0}` is not a registered namespace")]
    UnknownNamespace(String),
    #[error("no url configuration named `{0}`")]
    UnknownUrlConf(String),
    #[error("positional and keyword arguments can not be mixed")]
    MixedArguments,
    #[error("no route named `{viewname}` accepts the given arguments")]
    Arguments { viewname: String },
}

/// Everything needed to reverse a view name
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReverseRequest<'a> {
    pub viewname: &'a str,
    pub args: Vec<String>,
    pub kwargs: BTreeMap<String, String>,
    /// name of the url configuration to use instead of the root one
    pub urlconf: Option<&'a str>,
    /// `:` separated instance namespaces to prefer when resolving application namespaces
    pub current_app: Option<&'a str>,
}

impl<'a> ReverseRequest<'a> {
    pub fn new(viewname: &'a str) -> Self {
        Self {
            viewname,
            ..Default::default()
        }
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }
}

#[derive(Clone, Debug)]
struct NamedRoute {
    name: String,
    path: String,
}

impl NamedRoute {
    fn params(&self) -> impl Iterator<Item = &str> {
        self.path
            .split('/')
            .filter_map(|p| p.strip_prefix(':').or_else(|| p.strip_prefix('*')))
    }

    /// substitute the parameters, returns [`None`] if they don't fit the path
    fn fill(&self, args: &[String], kwargs: &BTreeMap<String, String>) -> Option<String> {
        let names = self.params().collect::<Vec<_>>();
        let values: HashMap<&str, &str> = if kwargs.is_empty() {
            if args.len() != names.len() {
                return None;
            }
            names
                .iter()
                .copied()
                .zip(args.iter().map(String::as_str))
                .collect()
        } else {
            if kwargs.len() != names.len() || !names.iter().all(|n| kwargs.contains_key(*n)) {
                return None;
            }
            kwargs
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect()
        };

        let mut pieces = Vec::new();
        for piece in self.path.split('/') {
            if let Some(name) = piece.strip_prefix(':') {
                let value = values.get(name).filter(|v| !v.is_empty())?;
                pieces.push(urlencoding::encode(value).into_owned());
            } else if let Some(name) = piece.strip_prefix('*') {
                let value = values.get(name).filter(|v| !v.is_empty())?;
                pieces.push(
                    value
                        .split('/')
                        .map(urlencoding::encode)
                        .collect::<Vec<_>>()
                        .join("/"),
                );
            } else {
                pieces.push(piece.to_string());
            }
        }
        Some(pieces.join("/"))
    }
}

#[derive(Clone, Debug)]
struct Include {
    prefix: String,
    /// instance namespace, routes of includes without one are reachable from the parent
    namespace: Option<String>,
    conf: UrlConf,
}

#[derive(Clone, Debug)]
enum Entry {
    Route(NamedRoute),
    Include(Include),
}

/// A set of named routes, optionally including other [`UrlConf`]s under a prefix
#[derive(Clone, Debug, Default)]
pub struct UrlConf {
    app_name: Option<String>,
    entries: Vec<Entry>,
}

impl UrlConf {
    pub fn new() -> Self {
        Self::default()
    }

    /// set the application namespace used when this conf is included into another one
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }

    pub fn route(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        let name = name.into();
        if self.routes().any(|r| r.name == name) {
            warn!("route name `{name}` is registered more than once");
        }
        self.entries.push(Entry::Route(NamedRoute {
            name,
            path: path.into(),
        }));
        self
    }

    /// Include `conf` under `prefix`.
    ///
    /// If `conf` has an application namespace it is also used as instance namespace,
    /// otherwise the routes of `conf` can be reversed as if they were registered here.
    pub fn include(mut self, prefix: impl Into<String>, conf: UrlConf) -> Self {
        self.entries.push(Entry::Include(Include {
            prefix: prefix.into(),
            namespace: conf.app_name.clone(),
            conf,
        }));
        self
    }

    /// Include `conf` under `prefix` with the instance namespace `namespace`.
    pub fn include_as(
        mut self,
        prefix: impl Into<String>,
        namespace: impl Into<String>,
        conf: UrlConf,
    ) -> Self {
        self.entries.push(Entry::Include(Include {
            prefix: prefix.into(),
            namespace: Some(namespace.into()),
            conf,
        }));
        self
    }

    fn routes(&self) -> impl Iterator<Item = &NamedRoute> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Route(r) => Some(r),
            Entry::Include(_) => None,
        })
    }

    /// namespaced includes reachable from this conf, in registration order
    fn namespaces(&self) -> Vec<(String, &Include)> {
        let mut out = Vec::new();
        for e in &self.entries {
            let Entry::Include(inc) = e else { continue };
            match inc.namespace {
                Some(_) => out.push((inc.prefix.clone(), inc)),
                None => out.extend(
                    inc.conf
                        .namespaces()
                        .into_iter()
                        .map(|(p, i)| (join_paths(&inc.prefix, &p), i)),
                ),
            }
        }
        out
    }

    /// routes named `view`, most recently registered first
    fn candidates(&self, view: &str) -> Vec<(String, &NamedRoute)> {
        let mut out = Vec::new();
        for e in self.entries.iter().rev() {
            match e {
                Entry::Route(r) if r.name == view => out.push((String::new(), r)),
                Entry::Include(inc) if inc.namespace.is_none() => out.extend(
                    inc.conf
                        .candidates(view)
                        .into_iter()
                        .map(|(p, r)| (join_paths(&inc.prefix, &p), r)),
                ),
                _ => {}
            }
        }
        out
    }

    fn lookup_namespace(&self, ns: &str, current: Option<&str>) -> Option<(String, &Include)> {
        let namespaces = self.namespaces();
        let instances = namespaces
            .iter()
            .filter(|(_, i)| i.conf.app_name.as_deref() == Some(ns))
            .collect::<Vec<_>>();
        if !instances.is_empty() {
            let found = current
                .and_then(|cur| {
                    instances
                        .iter()
                        .find(|(_, i)| i.namespace.as_deref() == Some(cur))
                })
                .or_else(|| {
                    instances
                        .iter()
                        .find(|(_, i)| i.namespace.as_deref() == Some(ns))
                })
                .or_else(|| instances.last());
            return found.map(|(p, i)| (p.clone(), *i));
        }
        namespaces
            .into_iter()
            .rev()
            .find(|(_, i)| i.namespace.as_deref() == Some(ns))
    }

    fn reverse_path(&self, req: &ReverseRequest<'_>) -> Result<String, NoReverseMatch> {
        if !req.args.is_empty() && !req.kwargs.is_empty() {
            return Err(NoReverseMatch::MixedArguments);
        }

        let mut path = req.viewname.split(':').collect::<Vec<_>>();
        let view = path.pop().unwrap_or_default();
        let mut current_app = req.current_app.map(|a| a.split(':').collect::<Vec<_>>());

        let mut conf = self;
        let mut prefix = String::new();
        for (depth, ns) in path.iter().enumerate() {
            let current = current_app.as_ref().and_then(|c| c.get(depth).copied());
            let (inc_prefix, inc) = conf
                .lookup_namespace(ns, current)
                .ok_or_else(|| NoReverseMatch::UnknownNamespace(path[..=depth].join(":")))?;
            if current.is_none() || inc.namespace.as_deref() != current {
                current_app = None;
            }
            prefix = join_paths(&prefix, &inc_prefix);
            conf = &inc.conf;
        }

        let candidates = conf.candidates(view);
        if candidates.is_empty() {
            return Err(NoReverseMatch::UnknownView(req.viewname.to_string()));
        }
        candidates
            .into_iter()
            .find_map(|(p, route)| {
                route
                    .fill(&req.args, &req.kwargs)
                    .map(|filled| join_paths(&join_paths(&prefix, &p), &filled))
            })
            .ok_or_else(|| NoReverseMatch::Arguments {
                viewname: req.viewname.to_string(),
            })
    }
}

impl Reverse for UrlConf {
    fn reverse(&self, req: &ReverseRequest<'_>) -> Result<String, NoReverseMatch> {
        if let Some(name) = req.urlconf {
            return Err(NoReverseMatch::UnknownUrlConf(name.to_string()));
        }
        self.reverse_path(req)
    }
}

fn join_paths(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        return path.to_string();
    }
    if path.is_empty() {
        return prefix.to_string();
    }
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// A root [`UrlConf`] and additional url configurations selectable by name
#[derive(Clone, Debug, Default)]
pub struct Urls {
    root: UrlConf,
    confs: BTreeMap<String, UrlConf>,
}

impl Urls {
    pub fn new(root: UrlConf) -> Self {
        Self {
            root,
            confs: BTreeMap::new(),
        }
    }

    pub fn with_urlconf(mut self, name: impl Into<String>, conf: UrlConf) -> Self {
        self.confs.insert(name.into(), conf);
        self
    }
}

impl Reverse for Urls {
    fn reverse(&self, req: &ReverseRequest<'_>) -> Result<String, NoReverseMatch> {
        match req.urlconf {
            Some(name) => self
                .confs
                .get(name)
                .ok_or_else(|| NoReverseMatch::UnknownUrlConf(name.to_string()))?
                .reverse_path(req),
            None => self.root.reverse_path(req),
        }
    }
}

/// build an [`axum::Router`] and the matching [`UrlConf`] at the same time
#[derive(Debug)]
pub struct NamedRouter<S = ()> {
    router: Router<S>,
    urls: UrlConf,
}

impl<S> Default for NamedRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self {
            router: Router::new(),
            urls: UrlConf::new(),
        }
    }
}

impl<S> NamedRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.urls = self.urls.with_app_name(name);
        self
    }

    pub fn route(
        mut self,
        path: &str,
        name: impl Into<String>,
        method_router: MethodRouter<S>,
    ) -> Self {
        self.router = self.router.route(path, method_router);
        self.urls = self.urls.route(name, path);
        self
    }

    /// see [`Router::nest`] and [`UrlConf::include`]
    pub fn nest(mut self, prefix: &str, other: NamedRouter<S>) -> Self {
        self.router = self.router.nest(prefix, other.router);
        self.urls = self.urls.include(prefix, other.urls);
        self
    }

    /// see [`Router::nest`] and [`UrlConf::include_as`]
    pub fn nest_as(mut self, prefix: &str, namespace: &str, other: NamedRouter<S>) -> Self {
        self.router = self.router.nest(prefix, other.router);
        self.urls = self.urls.include_as(prefix, namespace, other.urls);
        self
    }

    pub fn urls(&self) -> &UrlConf {
        &self.urls
    }

    pub fn into_parts(self) -> (Router<S>, UrlConf) {
        (self.router, self.urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blog() -> UrlConf {
        UrlConf::new()
            .with_app_name("blog")
            .route("post-list", "/posts")
            .route("post-detail", "/posts/:id")
    }

    #[test]
    fn reverses_positional_and_keyword_args() {
        let urls = UrlConf::new()
            .route("home", "/")
            .route("post", "/posts/:year/:slug/");
        assert_eq!(urls.reverse(&ReverseRequest::new("home")).unwrap(), "/");
        assert_eq!(
            urls.reverse(&ReverseRequest::new("post").arg("2024").arg("hello world"))
                .unwrap(),
            "/posts/2024/hello%20world/"
        );
        assert_eq!(
            urls.reverse(
                &ReverseRequest::new("post")
                    .kwarg("slug", "a")
                    .kwarg("year", "1999")
            )
            .unwrap(),
            "/posts/1999/a/"
        );
    }

    #[test]
    fn rejects_arguments_that_do_not_fit() {
        let urls = UrlConf::new().route("post", "/posts/:id");
        assert_eq!(
            urls.reverse(&ReverseRequest::new("post")),
            Err(NoReverseMatch::Arguments {
                viewname: "post".into()
            })
        );
        assert!(urls.reverse(&ReverseRequest::new("post").arg("")).is_err());
        assert!(urls
            .reverse(&ReverseRequest::new("post").kwarg("pk", "1"))
            .is_err());
        assert_eq!(
            urls.reverse(&ReverseRequest::new("post").arg("1").kwarg("id", "1")),
            Err(NoReverseMatch::MixedArguments)
        );
        assert_eq!(
            urls.reverse(&ReverseRequest::new("missing")),
            Err(NoReverseMatch::UnknownView("missing".into()))
        );
    }

    #[test]
    fn same_name_tries_every_route() {
        let urls = UrlConf::new()
            .route("post", "/posts/")
            .route("post", "/posts/:id");
        assert_eq!(urls.reverse(&ReverseRequest::new("post")).unwrap(), "/posts/");
        assert_eq!(
            urls.reverse(&ReverseRequest::new("post").arg("3")).unwrap(),
            "/posts/3"
        );
    }

    #[test]
    fn wildcard_keeps_slashes() {
        let urls = UrlConf::new().route("static", "/static/*path");
        assert_eq!(
            urls.reverse(&ReverseRequest::new("static").arg("css/main file.css"))
                .unwrap(),
            "/static/css/main%20file.css"
        );
    }

    #[test]
    fn namespaces_and_current_app() {
        let urls = UrlConf::new()
            .include("/blog", blog())
            .include_as("/archive", "archive", blog())
            .include("/pages", UrlConf::new().route("about", "/about"));

        let req = ReverseRequest::new("blog:post-detail").arg("1");
        assert_eq!(urls.reverse(&req).unwrap(), "/blog/posts/1");

        let req = ReverseRequest {
            current_app: Some("archive"),
            ..req
        };
        assert_eq!(urls.reverse(&req).unwrap(), "/archive/posts/1");

        assert_eq!(
            urls.reverse(&ReverseRequest::new("archive:post-list"))
                .unwrap(),
            "/archive/posts"
        );
        assert_eq!(
            urls.reverse(&ReverseRequest::new("about")).unwrap(),
            "/pages/about"
        );
        assert_eq!(
            urls.reverse(&ReverseRequest::new("shop:post-list")),
            Err(NoReverseMatch::UnknownNamespace("shop".into()))
        );
    }

    #[test]
    fn last_instance_without_default() {
        let urls = UrlConf::new()
            .include_as("/one", "one", blog())
            .include_as("/two", "two", blog());
        assert_eq!(
            urls.reverse(&ReverseRequest::new("blog:post-list"))
                .unwrap(),
            "/two/posts"
        );
    }

    #[test]
    fn nested_namespaces() {
        let urls = UrlConf::new().include_as(
            "/api",
            "api",
            UrlConf::new().include_as("/v1/", "v1", UrlConf::new().route("user", "/users/:id")),
        );
        assert_eq!(
            urls.reverse(&ReverseRequest::new("api:v1:user").arg("5"))
                .unwrap(),
            "/api/v1/users/5"
        );
        assert_eq!(
            urls.reverse(&ReverseRequest::new("api:v2:user").arg("5")),
            Err(NoReverseMatch::UnknownNamespace("api:v2".into()))
        );
    }

    #[test]
    fn urlconf_selection() {
        let urls = Urls::new(UrlConf::new().route("home", "/"))
            .with_urlconf("admin", UrlConf::new().route("home", "/admin/"));
        let req = ReverseRequest::new("home");
        assert_eq!(urls.reverse(&req).unwrap(), "/");
        let req = ReverseRequest {
            urlconf: Some("admin"),
            ..req
        };
        assert_eq!(urls.reverse(&req).unwrap(), "/admin/");
        let req = ReverseRequest {
            urlconf: Some("nope"),
            ..req
        };
        assert_eq!(
            urls.reverse(&req),
            Err(NoReverseMatch::UnknownUrlConf("nope".into()))
        );
        assert!(UrlConf::new().route("home", "/").reverse(&req).is_err());
    }
}
