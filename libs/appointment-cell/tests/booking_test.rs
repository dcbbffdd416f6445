use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use uuid::Uuid;

use appointment_cell::models::{AppointmentError, AppointmentStatus, BookAppointmentRequest};
use appointment_cell::services::{AppointmentBookingService, AppointmentRepository, InMemoryAppointmentRepository};
use doctor_cell::{AvailabilityService, AvailabilitySlot, DayOfWeek, InMemoryAvailabilityStore};
use shared_database::InMemoryProfileStore;
use shared_models::auth::Actor;
use shared_models::profile::DoctorProfile;

struct Fixture {
    repository: Arc<InMemoryAppointmentRepository>,
    availability: Arc<AvailabilityService>,
    booking: AppointmentBookingService,
    doctor_id: Uuid,
}

async fn setup(enforce_availability: bool) -> Fixture {
    let repository = Arc::new(InMemoryAppointmentRepository::new());
    let profiles = Arc::new(InMemoryProfileStore::new());
    let availability = Arc::new(AvailabilityService::new(Arc::new(InMemoryAvailabilityStore::new())));

    let doctor_id = Uuid::new_v4();
    profiles
        .put_doctor(DoctorProfile {
            id: doctor_id,
            name: "Dr. Sarah Johnson".to_string(),
            email: Some("sarah.johnson@example.com".to_string()),
            phone: None,
            specialization: Some("Cardiology".to_string()),
            consultation_fee: Some(150.0),
        })
        .await;

    let booking = AppointmentBookingService::new(repository.clone(), profiles, availability.clone())
        .with_enforced_availability(enforce_availability);

    Fixture {
        repository,
        availability,
        booking,
        doctor_id,
    }
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

fn request(doctor_id: Uuid, time: &str) -> BookAppointmentRequest {
    BookAppointmentRequest {
        doctor_id,
        appointment_date: monday(),
        appointment_time: time.to_string(),
        reason: "checkup".to_string(),
        notes: None,
    }
}

#[tokio::test]
async fn test_booking_creates_pending_appointment() {
    let fixture = setup(false).await;
    let client = Actor::client(Uuid::new_v4());

    let mut req = request(fixture.doctor_id, "10:00");
    req.notes = Some("  first visit  ".to_string());
    let view = fixture.booking.book_appointment(&client, req).await.unwrap();

    assert_eq!(view.appointment.status, AppointmentStatus::Pending);
    assert_eq!(view.appointment.client_id, client.id);
    assert_eq!(view.appointment.doctor_id, fixture.doctor_id);
    assert_eq!(view.appointment.appointment_time.as_str(), "10:00");
    assert_eq!(view.appointment.notes.as_deref(), Some("first visit"));
    assert!(view.appointment.doctor_notes.is_none());
    assert_eq!(view.doctor.unwrap().name, "Dr. Sarah Johnson");

    let stored = fixture.repository.get(view.appointment.id).await.unwrap();
    assert_eq!(stored, Some(view.appointment));
}

#[tokio::test]
async fn test_same_slot_conflicts_even_with_unpadded_time() {
    let fixture = setup(false).await;

    fixture
        .booking
        .book_appointment(&Actor::client(Uuid::new_v4()), request(fixture.doctor_id, "09:00"))
        .await
        .unwrap();

    let second = fixture
        .booking
        .book_appointment(&Actor::client(Uuid::new_v4()), request(fixture.doctor_id, "9:00"))
        .await;
    assert_matches!(second, Err(AppointmentError::Conflict));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bookings_for_one_slot_have_single_winner() {
    let fixture = Arc::new(setup(false).await);
    let attempts = 32;

    let handles: Vec<_> = (0..attempts)
        .map(|_| {
            let fixture = fixture.clone();
            tokio::spawn(async move {
                fixture
                    .booking
                    .book_appointment(&Actor::client(Uuid::new_v4()), request(fixture.doctor_id, "10:00"))
                    .await
            })
        })
        .collect();

    let mut winners = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(AppointmentError::Conflict) => conflicts += 1,
            Err(other) => panic!("unexpected booking error: {:?}", other),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(conflicts, attempts - 1);
    assert_eq!(fixture.repository.list_by_doctor(fixture.doctor_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_only_clients_can_book() {
    let fixture = setup(false).await;

    let result = fixture
        .booking
        .book_appointment(&Actor::doctor(Uuid::new_v4()), request(fixture.doctor_id, "10:00"))
        .await;

    assert_matches!(result, Err(AppointmentError::Forbidden(_)));
    assert!(fixture.repository.list_by_doctor(fixture.doctor_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_validation_failures_store_nothing() {
    let fixture = setup(false).await;
    let client = Actor::client(Uuid::new_v4());

    let mut blank_reason = request(fixture.doctor_id, "10:00");
    blank_reason.reason = "   ".to_string();
    assert_matches!(
        fixture.booking.book_appointment(&client, blank_reason).await,
        Err(AppointmentError::Validation(_))
    );

    assert_matches!(
        fixture.booking.book_appointment(&client, request(fixture.doctor_id, "")).await,
        Err(AppointmentError::Validation(_))
    );
    assert_matches!(
        fixture.booking.book_appointment(&client, request(fixture.doctor_id, "half past ten")).await,
        Err(AppointmentError::Validation(_))
    );

    assert!(fixture.repository.list_by_client(client.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_doctor() {
    let fixture = setup(false).await;
    let missing = Uuid::new_v4();

    let result = fixture
        .booking
        .book_appointment(&Actor::client(Uuid::new_v4()), request(missing, "10:00"))
        .await;

    assert_eq!(result, Err(AppointmentError::DoctorNotFound(missing)));
}

#[tokio::test]
async fn test_availability_is_advisory_by_default() {
    let fixture = setup(false).await;

    // No slots declared at all.
    let result = fixture
        .booking
        .book_appointment(&Actor::client(Uuid::new_v4()), request(fixture.doctor_id, "22:00"))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_enforced_availability_rejects_uncovered_times() {
    let fixture = setup(true).await;
    let doctor = Actor::doctor(fixture.doctor_id);

    fixture
        .availability
        .set_availability(
            &doctor,
            fixture.doctor_id,
            vec![AvailabilitySlot::new(DayOfWeek::Monday, "09:00", "12:00")],
        )
        .await
        .unwrap();

    let client = Actor::client(Uuid::new_v4());
    assert!(fixture
        .booking
        .book_appointment(&client, request(fixture.doctor_id, "11:30"))
        .await
        .is_ok());

    assert_matches!(
        fixture.booking.book_appointment(&client, request(fixture.doctor_id, "12:00")).await,
        Err(AppointmentError::Validation(_))
    );

    let mut tuesday = request(fixture.doctor_id, "10:00");
    tuesday.appointment_date = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
    assert_matches!(
        fixture.booking.book_appointment(&client, tuesday).await,
        Err(AppointmentError::Validation(_))
    );
}
