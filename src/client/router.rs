//! Route table and navigation guard
//!
//! Pages are declared as path patterns (`/circles/:id`) with optional access
//! metadata. On every navigation the guard decides whether to proceed,
//! redirect to login, or redirect to the landing page. The guard keeps no
//! state of its own; everything it knows comes from the session store.

use std::collections::HashMap;

use thiserror::Error;

use crate::client::session::SessionStore;
use crate::shared::models::Role;

/// Query parameter carrying the original target through the login page
pub const REDIRECT_PARAM: &str = "redirect";

/// Access requirements of a route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    /// Only consulted when `requires_auth` is set
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: String,
    pub pattern: String,
    pub meta: RouteMeta,
}

impl Route {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            meta: RouteMeta::default(),
        }
    }

    pub fn requires_auth(mut self) -> Self {
        self.meta.requires_auth = true;
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.meta.role = Some(role);
        self
    }

    /// Match a path (no query string) against this route's pattern
    fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let pattern: Vec<&str> = segments(&self.pattern).collect();
        let actual: Vec<&str> = segments(path).collect();
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (expected, got) in pattern.iter().zip(actual.iter()) {
            if let Some(param) = expected.strip_prefix(':') {
                params.insert(param.to_string(), (*got).to_string());
            } else if expected != got {
                return None;
            }
        }
        Some(params)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// A route matched against a concrete path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub name: String,
    pub path: String,
    pub params: HashMap<String, String>,
    pub meta: RouteMeta,
}

/// Redirect target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Render as `path?key=value`, percent-encoding query components
    pub fn to_url_string(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, query)
    }
}

/// Outcome of a guarded navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed(ResolvedRoute),
    Redirect(Location),
    NotFound,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteConfigError {
    #[error("route {0} is declared twice")]
    DuplicateName(String),
    #[error("route {0} is not declared")]
    UnknownRoute(String),
    #[error("landing route {0} must not require a role")]
    LandingRequiresRole(String),
    #[error("login route {0} must not require authentication")]
    LoginRequiresAuth(String),
    #[error("route {0} cannot be both the login and the landing route")]
    LoginIsLanding(String),
    #[error("redirect target {0} must not have path parameters")]
    ParameterizedRedirect(String),
}

/// Declared pages plus the two routes the guard redirects to.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    login: String,
    landing: String,
}

impl RouteTable {
    /// Build a table, checking that a redirect chain always ends in one hop.
    /// Login and landing are distinct, parameter-free routes; the landing route
    /// is reachable by every authenticated role and the login route by everyone.
    pub fn new(
        routes: Vec<Route>,
        login: impl Into<String>,
        landing: impl Into<String>,
    ) -> Result<Self, RouteConfigError> {
        let login = login.into();
        let landing = landing.into();

        for (i, route) in routes.iter().enumerate() {
            if routes[..i].iter().any(|r| r.name == route.name) {
                return Err(RouteConfigError::DuplicateName(route.name.clone()));
            }
        }

        let find = |name: &str| {
            routes
                .iter()
                .find(|r| r.name == name)
                .ok_or_else(|| RouteConfigError::UnknownRoute(name.to_string()))
        };

        let login_route = find(&login)?;
        let landing_route = find(&landing)?;

        if login == landing {
            return Err(RouteConfigError::LoginIsLanding(login));
        }
        if login_route.meta.requires_auth {
            return Err(RouteConfigError::LoginRequiresAuth(login));
        }
        if landing_route.meta.role.is_some() {
            return Err(RouteConfigError::LandingRequiresRole(landing));
        }
        for route in [login_route, landing_route] {
            if segments(&route.pattern).any(|s| s.starts_with(':')) {
                return Err(RouteConfigError::ParameterizedRedirect(route.name.clone()));
            }
        }

        Ok(Self {
            routes,
            login,
            landing,
        })
    }

    /// The application's page set. All authenticated roles share one landing
    /// page.
    pub fn default_routes() -> Self {
        let routes = vec![
            Route::new("login", "/login"),
            Route::new("dashboard", "/").requires_auth(),
            Route::new("circle", "/circles/:id").requires_auth(),
            Route::new("translation", "/circles/:id/translation/:session_id").requires_auth(),
            Route::new("facilitator", "/facilitator")
                .requires_auth()
                .with_role(Role::Facilitator),
            Route::new("test-conference", "/test-conference"),
        ];
        Self {
            routes,
            login: "login".to_string(),
            landing: "dashboard".to_string(),
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    pub fn login_path(&self) -> &str {
        self.route(&self.login)
            .map(|r| r.pattern.as_str())
            .unwrap_or("/login")
    }

    pub fn landing_path(&self) -> &str {
        self.route(&self.landing)
            .map(|r| r.pattern.as_str())
            .unwrap_or("/")
    }

    /// Match a full path (query string ignored) to the first declared route
    pub fn resolve(&self, full_path: &str) -> Option<ResolvedRoute> {
        let path = full_path.split(['?', '#']).next().unwrap_or("");
        self.routes.iter().find_map(|route| {
            route.matches(path).map(|params| ResolvedRoute {
                name: route.name.clone(),
                path: path.to_string(),
                params,
                meta: route.meta,
            })
        })
    }

    /// Decide a navigation to `to`.
    ///
    /// An unauthenticated store is first given a chance to restore from
    /// durable storage, which may change its state.
    pub fn guard(&self, to: &str, session: &mut SessionStore) -> Navigation {
        if !session.is_authenticated() {
            session.restore_session();
        }

        let Some(target) = self.resolve(to) else {
            tracing::debug!("No route matches {}", to);
            return Navigation::NotFound;
        };

        let authenticated = session.is_authenticated();

        if target.meta.requires_auth && !authenticated {
            tracing::debug!("Redirecting {} to login", to);
            return Navigation::Redirect(
                Location::new(self.login_path()).with_query(REDIRECT_PARAM, to),
            );
        }

        if target.meta.requires_auth {
            if let Some(required) = target.meta.role {
                if session.role() != Some(required) {
                    tracing::debug!("Route {} requires role {}", target.name, required);
                    return Navigation::Redirect(Location::new(self.landing_path()));
                }
            }
        }

        if target.name == self.login && authenticated {
            return Navigation::Redirect(Location::new(self.landing_path()));
        }

        Navigation::Proceed(target)
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::default_routes()
    }
}
