//! Span builder helpers for request instrumentation.

/// Create the top-level span for an inbound HTTP request.
///
/// Usage: `let span = http_request_span!(method, path, request_id);`
///
/// `request_id` is the identifier injected for this request, so every event
/// emitted inside the span carries it. Fields recorded later:
/// - `status`: response status code
/// - `latency_ms`: milliseconds until the response was produced
#[macro_export]
macro_rules! http_request_span {
    ($method:expr, $path:expr, $request_id:expr) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %$request_id,
            status = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
        )
    };
}
