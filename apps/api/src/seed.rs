use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use doctor_cell::{AvailabilityError, AvailabilitySlot, AvailabilityStore, DayOfWeek, InMemoryAvailabilityStore};
use shared_database::InMemoryProfileStore;
use shared_models::profile::{ClientProfile, DoctorProfile};

// Fixed ids so demo tokens can be minted against a known subject.
pub const SARAH_JOHNSON: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0101);
pub const MICHAEL_CHEN: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0102);
pub const EMILY_RODRIGUEZ: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0103);
pub const JAMES_WILSON: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0104);

pub const JOHN_SMITH: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0201);
pub const JANE_DOE: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0202);
pub const ROBERT_BROWN: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0203);

const WEEKDAYS: [DayOfWeek; 5] = [
    DayOfWeek::Monday,
    DayOfWeek::Tuesday,
    DayOfWeek::Wednesday,
    DayOfWeek::Thursday,
    DayOfWeek::Friday,
];

struct DemoDoctor {
    id: Uuid,
    name: &'static str,
    email: &'static str,
    phone: &'static str,
    specialization: &'static str,
    fee: f64,
    opens: &'static str,
    closes: &'static str,
}

const DOCTORS: [DemoDoctor; 4] = [
    DemoDoctor {
        id: SARAH_JOHNSON,
        name: "Dr. Sarah Johnson",
        email: "sarah.johnson@example.com",
        phone: "+1-555-0101",
        specialization: "Cardiology",
        fee: 150.0,
        opens: "09:00",
        closes: "17:00",
    },
    DemoDoctor {
        id: MICHAEL_CHEN,
        name: "Dr. Michael Chen",
        email: "michael.chen@example.com",
        phone: "+1-555-0102",
        specialization: "Neurology",
        fee: 200.0,
        opens: "10:00",
        closes: "18:00",
    },
    DemoDoctor {
        id: EMILY_RODRIGUEZ,
        name: "Dr. Emily Rodriguez",
        email: "emily.rodriguez@example.com",
        phone: "+1-555-0103",
        specialization: "Dermatology",
        fee: 120.0,
        opens: "08:00",
        closes: "16:00",
    },
    DemoDoctor {
        id: JAMES_WILSON,
        name: "Dr. James Wilson",
        email: "james.wilson@example.com",
        phone: "+1-555-0104",
        specialization: "Orthopedics",
        fee: 180.0,
        opens: "09:00",
        closes: "17:00",
    },
];

const CLIENTS: [(Uuid, &str, &str, &str); 3] = [
    (JOHN_SMITH, "John Smith", "john.smith@example.com", "+1-555-0201"),
    (JANE_DOE, "Jane Doe", "jane.doe@example.com", "+1-555-0202"),
    (ROBERT_BROWN, "Robert Brown", "robert.brown@example.com", "+1-555-0203"),
];

/// Profile and availability stores pre-filled with the demo clinic, for
/// running without Supabase. Every doctor works Monday to Friday.
pub async fn demo_stores() -> Result<(Arc<InMemoryProfileStore>, Arc<InMemoryAvailabilityStore>), AvailabilityError> {
    let profiles = Arc::new(InMemoryProfileStore::new());
    let availability = Arc::new(InMemoryAvailabilityStore::new());

    for doctor in &DOCTORS {
        profiles
            .put_doctor(DoctorProfile {
                id: doctor.id,
                name: doctor.name.to_string(),
                email: Some(doctor.email.to_string()),
                phone: Some(doctor.phone.to_string()),
                specialization: Some(doctor.specialization.to_string()),
                consultation_fee: Some(doctor.fee),
            })
            .await;

        let slots = WEEKDAYS
            .iter()
            .map(|day| AvailabilitySlot::new(*day, doctor.opens, doctor.closes))
            .collect();
        availability.set_slots(doctor.id, slots).await?;
    }

    for (id, name, email, phone) in CLIENTS {
        profiles
            .put_client(ClientProfile {
                id,
                name: name.to_string(),
                email: Some(email.to_string()),
                phone: Some(phone.to_string()),
            })
            .await;
    }

    info!("Seeded {} demo doctors and {} demo clients", DOCTORS.len(), CLIENTS.len());

    Ok((profiles, availability))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use doctor_cell::AvailabilityService;
    use shared_database::ProfileStore;

    use super::*;

    #[tokio::test]
    async fn test_demo_stores_hold_weekday_hours() {
        let (profiles, store) = demo_stores().await.unwrap();

        let doctors = profiles.doctors().await.unwrap();
        assert_eq!(doctors.len(), 4);
        assert!(profiles.client(ROBERT_BROWN).await.unwrap().is_some());

        let availability = AvailabilityService::new(store);
        // 2025-03-10 is a Monday, 2025-03-15 a Saturday.
        let monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        assert!(availability.covers(MICHAEL_CHEN, monday, "17:30").await.unwrap());
        assert!(!availability.covers(EMILY_RODRIGUEZ, monday, "17:30").await.unwrap());
        assert!(!availability.covers(SARAH_JOHNSON, saturday, "10:00").await.unwrap());
    }
}
