//! Demo data: four volunteers and one learner.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use mentorlink_core::error::Result;
use mentorlink_core::slot::TimeSlot;
use mentorlink_core::user::{Interest, InterestCategory, User, UserRepository, UserRole};

pub const DEMO_LEARNER_ID: &str = "learner-1";

const SLOT_DATES: [(i32, u32, u32); 5] = [
    (2025, 1, 20),
    (2025, 1, 22),
    (2025, 1, 24),
    (2025, 1, 27),
    (2025, 1, 29),
];
const SLOT_HOURS: [u32; 5] = [10, 11, 14, 15, 16];

/// The slot grid every demo volunteer offers.
pub fn demo_slots() -> Vec<TimeSlot> {
    SLOT_DATES
        .iter()
        .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .flat_map(|date| {
            SLOT_HOURS
                .iter()
                .filter_map(move |&h| NaiveTime::from_hms_opt(h, 0, 0).map(|t| TimeSlot::new(date, t)))
        })
        .collect()
}

struct VolunteerSeed {
    id: &'static str,
    name: &'static str,
    phone: &'static str,
    cedula: &'static str,
    specialty: &'static str,
    location: &'static str,
    bio: &'static str,
    skills: [&'static str; 3],
}

const VOLUNTEERS: [VolunteerSeed; 4] = [
    VolunteerSeed {
        id: "vol-1",
        name: "María García",
        phone: "6000-1001",
        cedula: "8-234-5678",
        specialty: "WhatsApp y Redes Sociales",
        location: "Ciudad de Panamá",
        bio: "Estudiante de informática con paciencia para enseñar.",
        skills: ["WhatsApp", "Facebook", "Instagram"],
    },
    VolunteerSeed {
        id: "vol-2",
        name: "Carlos Rodríguez",
        phone: "6000-1002",
        cedula: "8-345-6789",
        specialty: "Email y Videollamadas",
        location: "San Miguelito",
        bio: "Ingeniero jubilado, le encanta la tecnología.",
        skills: ["Email", "Zoom", "Google Meet"],
    },
    VolunteerSeed {
        id: "vol-3",
        name: "Ana Martínez",
        phone: "6000-1003",
        cedula: "3-456-7890",
        specialty: "Banca Digital y Pagos",
        location: "Arraiján",
        bio: "Trabaja en un banco y explica los pagos digitales paso a paso.",
        skills: ["Yappy", "Nequi", "Banca Online"],
    },
    VolunteerSeed {
        id: "vol-4",
        name: "Luis González",
        phone: "6000-1004",
        cedula: "8-567-8901",
        specialty: "Smartphone Básico",
        location: "Chorrera",
        bio: "Técnico de celulares, configura cualquier teléfono.",
        skills: ["iPhone", "Android", "Configuración"],
    },
];

fn interest(id: &str, name: &str, category: InterestCategory, icon: &str) -> Interest {
    Interest {
        id: id.to_string(),
        name: name.to_string(),
        category,
        icon: Some(icon.to_string()),
    }
}

/// Builds the demo users with `now` as their creation time.
///
/// The learner comes first; volunteers follow in listing order.
pub fn demo_users(now: DateTime<Utc>) -> Vec<User> {
    let learner = User {
        id: DEMO_LEARNER_ID.to_string(),
        full_name: "Juan Pérez".to_string(),
        role: UserRole::Elderly,
        phone: "6000-0000".to_string(),
        cedula: "8-123-4567".to_string(),
        email: None,
        location: Some("Ciudad de Panamá".to_string()),
        bio: None,
        profile_image: None,
        specialty: None,
        interests: vec![
            interest("whatsapp", "WhatsApp", InterestCategory::Social, "💬"),
            interest("facebook", "Facebook", InterestCategory::Social, "📘"),
            interest("email", "Email y Gmail", InterestCategory::Technical, "📧"),
            interest("reading", "Lectura", InterestCategory::Hobbies, "📖"),
        ],
        skills: Vec::new(),
        availability: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    let slots = demo_slots();
    let volunteers = VOLUNTEERS.iter().map(|seed| User {
        id: seed.id.to_string(),
        full_name: seed.name.to_string(),
        role: UserRole::Volunteer,
        phone: seed.phone.to_string(),
        cedula: seed.cedula.to_string(),
        email: None,
        location: Some(seed.location.to_string()),
        bio: Some(seed.bio.to_string()),
        profile_image: None,
        specialty: Some(seed.specialty.to_string()),
        interests: Vec::new(),
        skills: seed.skills.iter().map(|s| s.to_string()).collect(),
        availability: slots.clone(),
        created_at: now,
        updated_at: now,
    });

    std::iter::once(learner).chain(volunteers).collect()
}

/// Saves every demo user that does not exist yet and returns how many were
/// added. Existing users are left untouched.
pub async fn seed_demo(users: &dyn UserRepository, now: DateTime<Utc>) -> Result<usize> {
    let mut added = 0;
    for user in demo_users(now) {
        if users.find_by_id(&user.id).await?.is_none() {
            users.save(&user).await?;
            added += 1;
        }
    }
    tracing::info!(added, "Seeded demo users");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_repository::InMemoryUserRepository;
    use mentorlink_core::user::validation::{validate_cedula, validate_phone};

    #[test]
    fn test_demo_slot_grid() {
        let slots = demo_slots();
        assert_eq!(slots.len(), 25);
        assert_eq!(slots[0].to_string(), "2025-01-20 10:00");
        assert_eq!(slots[24].to_string(), "2025-01-29 16:00");
    }

    #[test]
    fn test_demo_users_pass_format_validation() {
        for user in demo_users(Utc::now()) {
            validate_phone(&user.phone).unwrap();
            validate_cedula(&user.cedula).unwrap();
        }
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let repo = InMemoryUserRepository::new();
        let now = Utc::now();

        assert_eq!(seed_demo(&repo, now).await.unwrap(), 5);
        assert_eq!(seed_demo(&repo, now).await.unwrap(), 0);

        let volunteers = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .filter(|u| u.is_volunteer())
            .count();
        assert_eq!(volunteers, 4);
    }
}
