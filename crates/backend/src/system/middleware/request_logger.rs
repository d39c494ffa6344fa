use axum::body::{to_bytes, Body};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Middleware для логирования HTTP запросов
///
/// Пишет в лог метод, путь, статус, длительность и размер ответа.
/// Тело ответа буферизуется, чтобы узнать реальный размер.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();
    let status = parts.status.as_u16();

    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(
                "{} {} -> {} | {}ms | body read failed: {}",
                method,
                path,
                status,
                start.elapsed().as_millis(),
                e
            );
            return Response::from_parts(parts, Body::default());
        }
    };

    let elapsed = start.elapsed().as_millis();
    let size = format_size(bytes.len());
    if parts.status.is_server_error() {
        tracing::error!("{} {} -> {} | {}ms | {}", method, path, status, elapsed, size);
    } else if parts.status.is_client_error() {
        tracing::warn!("{} {} -> {} | {}ms | {}", method, path, status, elapsed, size);
    } else {
        tracing::info!("{} {} -> {} | {}ms | {}", method, path, status, elapsed, size);
    }

    Response::from_parts(parts, Body::from(bytes))
}

/// Размер с разделителями тысяч: 1234567 → "1.234.567 B"
fn format_size(n: usize) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("{} B", grouped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_is_grouped_by_thousands() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(999), "999 B");
        assert_eq!(format_size(1000), "1.000 B");
        assert_eq!(format_size(1234567), "1.234.567 B");
    }
}
