use axum::{
    extract::{Request, State},
    http::{header::COOKIE, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::config::AppConfig;

/// Outcome of the edge rule for one navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

/// The edge rule table
///
/// | cookie | on login page | decision         |
/// |--------|---------------|------------------|
/// | no     | no            | redirect → login |
/// | no     | yes           | allow            |
/// | yes    | no            | allow            |
/// | yes    | yes           | redirect → home  |
///
/// Only presence is checked; the token itself is validated by the backend.
pub fn evaluate(has_cookie: bool, path: &str, login_path: &str, home_path: &str) -> GuardDecision {
    let on_login = path == login_path;
    match (has_cookie, on_login) {
        (false, false) => GuardDecision::Redirect(login_path.to_string()),
        (true, true) => GuardDecision::Redirect(home_path.to_string()),
        _ => GuardDecision::Allow,
    }
}

const STATIC_PREFIXES: [&str; 2] = ["/_next/", "/assets/"];
const STATIC_EXTENSIONS: [&str; 7] = ["svg", "png", "jpg", "jpeg", "gif", "webp", "ico"];

/// Paths the guard never runs for
pub fn is_static_asset(path: &str) -> bool {
    if path == "/favicon.ico" || STATIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return true;
    }
    path.rsplit_once('.')
        .map(|(_, ext)| !ext.contains('/') && STATIC_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Value of the named cookie from the `Cookie` headers; an empty value counts as absent
pub fn session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Settings the middleware needs, taken from `AppConfig::session`
#[derive(Debug, Clone)]
pub struct EdgeGuard {
    pub cookie_name: String,
    pub login_path: String,
    pub home_path: String,
}

impl EdgeGuard {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            cookie_name: config.session.cookie_name.clone(),
            login_path: config.session.login_path.clone(),
            home_path: config.session.home_path.clone(),
        }
    }

    pub fn decide(&self, headers: &HeaderMap, path: &str) -> GuardDecision {
        if is_static_asset(path) {
            return GuardDecision::Allow;
        }
        let has_cookie = session_cookie(headers, &self.cookie_name).is_some();
        evaluate(has_cookie, path, &self.login_path, &self.home_path)
    }
}

/// Edge guard middleware; redirects keep the requested query string
///
/// Page loads get a 307. Anything else gets a 303 so the browser follows up
/// with a GET instead of replaying a form body against another route.
pub async fn edge_guard(State(guard): State<EdgeGuard>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    match guard.decide(request.headers(), &path) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect(target) => {
            let location = match request.uri().query() {
                Some(query) if !query.is_empty() => format!("{}?{}", target, query),
                _ => target,
            };
            tracing::debug!(from = %path, to = %location, method = %request.method(), "edge guard redirect");
            if request.method() == Method::GET || request.method() == Method::HEAD {
                Redirect::temporary(&location).into_response()
            } else {
                Redirect::to(&location).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn rule_table() {
        assert_eq!(evaluate(false, "/clients", "/login", "/"), GuardDecision::Redirect("/login".into()));
        assert_eq!(evaluate(false, "/login", "/login", "/"), GuardDecision::Allow);
        assert_eq!(evaluate(true, "/clients", "/login", "/"), GuardDecision::Allow);
        assert_eq!(evaluate(true, "/login", "/login", "/"), GuardDecision::Redirect("/".into()));
    }

    #[test]
    fn static_assets_are_skipped() {
        for path in ["/_next/static/app.js", "/assets/site.css", "/favicon.ico", "/logo.svg", "/img/photo.jpg"] {
            assert!(is_static_asset(path), "{}", path);
        }
        for path in ["/", "/clients", "/appointments/7", "/v1.2/clients", "/login", "/img/photo.JPG", "/logo.Svg"] {
            assert!(!is_static_asset(path), "{}", path);
        }
    }

    #[test]
    fn cookie_lookup_treats_empty_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; access_token=abc123"));
        assert_eq!(session_cookie(&headers, "access_token").as_deref(), Some("abc123"));
        assert_eq!(session_cookie(&headers, "missing"), None);

        headers.insert(COOKIE, HeaderValue::from_static("access_token="));
        assert_eq!(session_cookie(&headers, "access_token"), None);
    }

    #[test]
    fn guard_allows_assets_without_cookie() {
        let guard = EdgeGuard::from_config(&AppConfig::development());
        assert_eq!(guard.decide(&HeaderMap::new(), "/favicon.ico"), GuardDecision::Allow);
        assert_eq!(guard.decide(&HeaderMap::new(), "/"), GuardDecision::Redirect("/login".into()));
    }
}
