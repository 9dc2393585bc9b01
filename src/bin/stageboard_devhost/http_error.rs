use super::*;

fn message(status: StatusCode, msg: &str) -> Response {
    (status, Json(serde_json::json!({ "message": msg }))).into_response()
}

pub(super) fn unauthorized(msg: &str) -> Response {
    message(StatusCode::UNAUTHORIZED, msg)
}

pub(super) fn not_found() -> Response {
    message(StatusCode::NOT_FOUND, "Not Found")
}

pub(super) fn conflict(path: &str, sent: Option<&str>) -> Response {
    let msg = match sent {
        Some(_) => format!("{} does not match", path),
        None => format!("\"sha\" wasn't supplied for {}", path),
    };
    message(StatusCode::CONFLICT, &msg)
}

pub(super) fn unprocessable(msg: &str) -> Response {
    message(StatusCode::UNPROCESSABLE_ENTITY, msg)
}
