//! Initial fixture data
//!
//! Populates the database with the Titanium Science Club workshops and the
//! host school. Safe to run repeatedly: existing rows are left untouched.

use rust_decimal::Decimal;
use tracing::info;

use crate::database::DatabaseService;
use crate::models::workshop::CreateWorkshopRequest;
use crate::utils::errors::Result;

/// Insert the initial workshops and school if they are not present yet
pub async fn seed_initial_data(db: &DatabaseService) -> Result<()> {
    let school = db
        .schools
        .create_or_get("St. Joseph International School")
        .await?;
    info!(school = %school.name, "Seeded host school");

    for request in initial_workshops() {
        if db.workshops.exists_by_name(&request.name).await? {
            info!(workshop = %request.name, "Workshop already present, skipping");
            continue;
        }
        let workshop = db.workshops.create(request).await?;
        info!(workshop = %workshop.name, fee = %workshop.fee, "Seeded workshop");
    }

    Ok(())
}

fn initial_workshops() -> Vec<CreateWorkshopRequest> {
    vec![
        CreateWorkshopRequest {
            name: "PROJECT DISPLAY & PRESENTATION Workshop".to_string(),
            description: "Showcase your innovative projects and present them to judges and peers. \
                This workshop provides a platform for students to demonstrate their creativity, \
                critical thinking, and problem-solving skills through hands-on projects. \
                Participants will receive feedback and guidance from experienced mentors."
                .to_string(),
            workshop_date: "10 & 11 December 2025".to_string(),
            time_slot: "10:30 AM - 1:30 PM".to_string(),
            duration: "3 hours per day".to_string(),
            venue: "New building, St Joseph International School".to_string(),
            organizer: "Titanium Science Club".to_string(),
            fee: Decimal::new(20000, 2),
            capacity: 100,
            is_active: true,
        },
        CreateWorkshopRequest {
            name: "PHYSICS OLYMPIAD Workshop".to_string(),
            description: "Prepare for Physics Olympiad competitions with expert guidance from \
                national coaches. This intensive workshop covers advanced physics concepts, \
                problem-solving strategies, and competition techniques. Perfect for students \
                passionate about physics and looking to compete at national and international levels."
                .to_string(),
            workshop_date: "Saturday, 13 December 2025".to_string(),
            time_slot: "9:45 AM - 12:30 PM".to_string(),
            duration: "2 hours 45 minutes".to_string(),
            venue: "New building, St Joseph International School".to_string(),
            organizer: "Fayez Ahmed Jahangir Masud, General Secretary & Dr Arshad Momen, National Coach, BDPhO"
                .to_string(),
            fee: Decimal::ZERO,
            capacity: 150,
            is_active: true,
        },
        CreateWorkshopRequest {
            name: "ARDUINO ROBOTICS BOOTCAMP".to_string(),
            description: "Learn the fundamentals of robotics and programming with Arduino! \
                This hands-on bootcamp covers Arduino basics, sensor integration, motor control, \
                and building autonomous robots. Students will work on real projects and gain \
                practical experience in electronics and programming. No prior experience required!"
                .to_string(),
            workshop_date: "Monday, 15 December 2025 & Wednesday, 17 December 2025".to_string(),
            time_slot: "9:45 AM - 12:30 PM".to_string(),
            duration: "2 hours 45 minutes per day".to_string(),
            venue: "New building, St Joseph International School".to_string(),
            organizer: "2 teams from Zan Tech".to_string(),
            fee: Decimal::ZERO,
            capacity: 120,
            is_active: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_has_one_paid_workshop() {
        let workshops = initial_workshops();
        assert_eq!(workshops.len(), 3);

        let paid: Vec<_> = workshops.iter().filter(|w| !w.fee.is_zero()).collect();
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].fee, Decimal::new(20000, 2));
    }
}
