use std::fmt;

/// Canonical identifier of a (method, route) pair used for plan lookups.
///
/// The method is lower-cased and the route is the full resource path template
/// as written in the description (e.g. `/widgets/{id}`). Every component builds
/// keys through [`RouteKey::new`], so `GET /widgets/` and `get /widgets` land on
/// the same plan. Rendered as `method:route`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey {
    method: String,
    route: String,
}

impl RouteKey {
    pub fn new(method: &str, route: &str) -> Self {
        Self {
            method: method.trim().to_lowercase(),
            route: normalize_route(route),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn route(&self) -> &str {
        &self.route
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.method, self.route)
    }
}

fn normalize_route(route: &str) -> String {
    let trimmed = route.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Translate a description path template into an axum route pattern.
///
/// Whole-segment parameters (`{id}`) become positional captures (`:p0`, `:p1`),
/// so two templates that differ only in parameter names share one pattern.
/// Returns `None` for templates the router cannot express, such as a parameter
/// embedded inside a literal segment (`/users{ext}`).
pub fn route_pattern(route: &str) -> Option<String> {
    let route = normalize_route(route);
    if route == "/" {
        return Some(route);
    }

    let mut pattern = String::with_capacity(route.len());
    let mut captures = 0;
    for segment in route.split('/').skip(1) {
        if segment.is_empty() {
            return None;
        }
        pattern.push('/');
        if segment.starts_with('{') && segment.ends_with('}') && segment.len() > 2 {
            let name = &segment[1..segment.len() - 1];
            if name.contains(['{', '}']) {
                return None;
            }
            pattern.push_str(&format!(":p{}", captures));
            captures += 1;
        } else if segment.contains(['{', '}', ':', '*']) {
            return None;
        } else {
            pattern.push_str(segment);
        }
    }
    Some(pattern)
}
