use canvas::confirm::Prompt;

use super::*;
use crate::services::local::LocalStoreError;
use crate::services::remote::RemoteError;

#[test]
fn floor_error_to_status_maps_unknown_floor() {
    let err = FloorError::Validation(ValidationError::UnknownFloor(4));
    assert_eq!(floor_error_to_status(&err), StatusCode::NOT_FOUND);
}

#[test]
fn floor_error_to_status_maps_validation() {
    for v in [ValidationError::InvalidNumber(0), ValidationError::DuplicateNumber(2), ValidationError::LastFloor] {
        assert_eq!(floor_error_to_status(&FloorError::Validation(v)), StatusCode::UNPROCESSABLE_ENTITY);
    }
}

#[test]
fn floor_error_to_status_maps_declined() {
    let err = FloorError::Declined(Prompt::DeleteFloor { number: 2 });
    assert_eq!(floor_error_to_status(&err), StatusCode::CONFLICT);
}

#[test]
fn floor_error_to_status_maps_persistence() {
    let err = FloorError::Persistence(LayoutError::BothTiersFailed {
        local: LocalStoreError::Poisoned,
        remote: RemoteError::Unavailable("down".into()),
    });
    assert_eq!(floor_error_to_status(&err), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn api_error_carries_code_and_message() {
    let err = ApiError::from(FloorError::Validation(ValidationError::DuplicateNumber(3)));
    assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err.code, "E_VALIDATION");
    assert_eq!(err.message, "floor 3 already exists");
}

#[tokio::test]
async fn api_error_renders_json_body() {
    let err = ApiError::from(FloorError::Validation(ValidationError::LastFloor));
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "E_VALIDATION");
    assert_eq!(body["message"], "a facility must keep at least one floor");
}

#[tokio::test]
async fn healthz_is_ok() {
    assert_eq!(healthz().await, StatusCode::OK);
}
