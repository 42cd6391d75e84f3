use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};

/// Records request count and latency per method and route template.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| normalize_path(req.uri().path()));

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .observe(duration);

    response
}

/// Fallback for unmatched routes: collapse id-like segments to keep label
/// cardinality bounded.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| if is_id_like(segment) { "{id}" } else { segment })
        .collect::<Vec<_>>()
        .join("/")
}

/// UUIDs, numeric ids and room codes such as `DEMO123`. API version
/// segments (`v1`, `v2`) are route structure, not ids.
fn is_id_like(segment: &str) -> bool {
    !segment.is_empty()
        && !is_version_segment(segment)
        && segment.chars().any(|c| c.is_ascii_digit())
        && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_version_segment(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path("/api/v1/sessions/550e8400-e29b-41d4-a716-446655440000/answers"),
            "/api/v1/sessions/{id}/answers"
        );
        assert_eq!(normalize_path("/api/v1/videos/7234"), "/api/v1/videos/{id}");
        assert_eq!(normalize_path("/health"), "/health");
        assert_eq!(
            normalize_path("/api/v2/videos/DEMO123"),
            "/api/v2/videos/{id}"
        );
    }

    #[test]
    fn test_is_id_like() {
        assert!(is_id_like("550e8400-e29b-41d4-a716-446655440000"));
        assert!(is_id_like("DEMO123"));
        assert!(is_id_like("42"));
        assert!(!is_id_like("sessions"));
        assert!(!is_id_like(""));
        assert!(!is_id_like("v1"));
        assert!(!is_id_like("v10"));
        assert!(is_id_like("v1x9"));
    }
}
