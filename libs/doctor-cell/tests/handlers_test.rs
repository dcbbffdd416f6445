use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use async_trait::async_trait;
use uuid::Uuid;

use doctor_cell::{doctor_routes, AvailabilityService, DoctorState, InMemoryAvailabilityStore};
use shared_database::{InMemoryProfileStore, ProfileStore};
use shared_models::profile::{ClientProfile, DoctorProfile};
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn app_with_profiles(profiles: Arc<dyn ProfileStore>) -> Router {
    let state = DoctorState {
        config: TestConfig::default().to_arc(),
        profiles,
        availability: Arc::new(AvailabilityService::new(Arc::new(InMemoryAvailabilityStore::new()))),
    };
    doctor_routes(state)
}

fn create_test_app() -> Router {
    app_with_profiles(Arc::new(InMemoryProfileStore::new()))
}

fn doctor_profile(id: Uuid, name: &str, specialization: &str) -> DoctorProfile {
    DoctorProfile {
        id,
        name: name.to_string(),
        email: None,
        phone: None,
        specialization: Some(specialization.to_string()),
        consultation_fee: Some(150.0),
    }
}

struct UnreachableProfiles;

#[async_trait]
impl ProfileStore for UnreachableProfiles {
    async fn doctor(&self, _id: Uuid) -> anyhow::Result<Option<DoctorProfile>> {
        anyhow::bail!("connection refused")
    }

    async fn client(&self, _id: Uuid) -> anyhow::Result<Option<ClientProfile>> {
        anyhow::bail!("connection refused")
    }

    async fn doctors(&self) -> anyhow::Result<Vec<DoctorProfile>> {
        anyhow::bail!("connection refused")
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn put_availability(user: &TestUser, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri("/availability")
        .header("Authorization", JwtTestUtils::bearer(user))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_doctor_sets_and_reads_availability() {
    let app = create_test_app();
    let doctor = TestUser::doctor("sarah.johnson@example.com");

    let response = app
        .clone()
        .oneshot(put_availability(&doctor, json!({
            "available_slots": [
                { "day": "Monday", "start_time": "09:00", "end_time": "17:00", "is_available": true },
                { "day": "Tuesday", "start_time": "09:00", "end_time": "17:00", "is_available": false }
            ]
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{}/availability?day=Tuesday", doctor.id))
                .header("Authorization", JwtTestUtils::bearer(&TestUser::client("john.smith@example.com")))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let slots = body["available_slots"].as_array().unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0]["is_available"], json!(false));
}

#[tokio::test]
async fn test_client_cannot_set_availability() {
    let app = create_test_app();
    let client = TestUser::client("john.smith@example.com");

    let response = app
        .oneshot(put_availability(&client, json!({ "available_slots": [] })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{}/availability", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_doctor_directory_is_public() {
    let profiles = Arc::new(InMemoryProfileStore::new());
    let sarah = Uuid::new_v4();
    profiles.put_doctor(doctor_profile(sarah, "Dr. Sarah Johnson", "Cardiology")).await;
    profiles.put_doctor(doctor_profile(Uuid::new_v4(), "Dr. Michael Chen", "Neurology")).await;
    let app = app_with_profiles(profiles);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["doctors"][0]["name"], "Dr. Michael Chen");
    assert_eq!(body["doctors"][1]["name"], "Dr. Sarah Johnson");

    let response = app
        .clone()
        .oneshot(Request::builder().uri(format!("/{}", sarah)).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["specialization"], "Cardiology");

    let response = app
        .oneshot(Request::builder().uri(format!("/{}", Uuid::new_v4())).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_directory_outage_is_internal_error() {
    let app = app_with_profiles(Arc::new(UnreachableProfiles));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "Internal server error");
}
