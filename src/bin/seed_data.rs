//! Seed data script - populates the database with demo catalog and clinic data
//!
//! Run with: cargo run --bin seed-data
//!
//! This creates:
//! - 3 medicine categories with 6 products, two of them prescription-only
//! - 2 pet categories with 4 pet products
//! - 2 doctors and 1 vet with weekly schedules
//!
//! and prints bearer tokens for a demo patient and the first doctor.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tracing::info;
use uuid::Uuid;

use medimart_api::{
    auth::{AuthConfig, AuthService, Role},
    config, db,
    entities::{
        catalog::{category, pet_category, pet_product, product},
        healthcare::{
            doctor::{self, DoctorType},
            schedule::{self, Weekday},
        },
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("=== MediMart Seed Data ===");

    let cfg = config::load_config()?;
    let db = db::establish_connection_from_app_config(&cfg).await?;
    db::run_migrations(&db).await?;

    info!("Creating catalog...");
    let products = create_catalog(&db).await?;
    info!("  Created {} products", products);

    info!("Creating pet shop...");
    let pet_products = create_pet_shop(&db).await?;
    info!("  Created {} pet products", pet_products);

    info!("Creating doctors...");
    let doctor_user = Uuid::new_v4();
    let doctors = create_doctors(&db, doctor_user).await?;
    info!("  Created {} doctors and vets", doctors);

    let auth = AuthService::new(AuthConfig::from(&cfg));
    let patient_token = auth.issue_token(Uuid::new_v4(), "Demo Patient", Role::Patient)?;
    let doctor_token = auth.issue_token(doctor_user, "Dr. Farhana Rahman", Role::Doctor)?;

    info!("\n=== Seed Data Complete ===");
    info!("Patient token: {}", patient_token);
    info!("Doctor token:  {}", doctor_token);
    info!("Explore interactively at: http://localhost:{}/swagger-ui", cfg.port);

    Ok(())
}

async fn create_catalog(db: &DatabaseConnection) -> anyhow::Result<usize> {
    let catalog: [(&str, &[(&str, Decimal, bool)]); 3] = [
        (
            "Pain Relief",
            &[
                ("Napa 500mg", dec!(12), false),
                ("Ace Plus", dec!(25), false),
            ],
        ),
        (
            "Antibiotics",
            &[
                ("Azithromycin 500mg", dec!(350), true),
                ("Amoxicillin 250mg", dec!(180), true),
            ],
        ),
        (
            "Personal Care",
            &[
                ("Hand Sanitizer", dec!(120), false),
                ("Digital Thermometer", dec!(450), false),
            ],
        ),
    ];

    let mut count = 0;
    for (category_name, items) in catalog {
        let category = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(category_name.to_string()),
            description: Set(None),
            image_ref: Set(None),
        }
        .insert(db)
        .await?;

        for (name, price, requires_prescription) in items {
            product::ActiveModel {
                id: Set(Uuid::new_v4()),
                category_id: Set(category.id),
                name: Set(name.to_string()),
                price: Set(*price),
                description: Set(None),
                stock: Set(100),
                requires_prescription: Set(*requires_prescription),
                image_ref: Set(None),
            }
            .insert(db)
            .await?;
            count += 1;
        }
    }
    Ok(count)
}

async fn create_pet_shop(db: &DatabaseConnection) -> anyhow::Result<usize> {
    let shop: [(&str, &[(&str, Decimal, bool)]); 2] = [
        (
            "Pet Food",
            &[
                ("Cat Dry Food 1kg", dec!(650), false),
                ("Puppy Starter 3kg", dec!(1800), false),
            ],
        ),
        (
            "Pet Medicine",
            &[
                ("Deworming Tablet", dec!(90), false),
                ("Antibiotic Ear Drops", dec!(420), true),
            ],
        ),
    ];

    let mut count = 0;
    for (category_name, items) in shop {
        let category = pet_category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(category_name.to_string()),
            short_description: Set(None),
            image_ref: Set(None),
        }
        .insert(db)
        .await?;

        for (name, price, prescription_required) in items {
            pet_product::ActiveModel {
                id: Set(Uuid::new_v4()),
                category_id: Set(category.id),
                name: Set(name.to_string()),
                price: Set(*price),
                prescription_required: Set(*prescription_required),
                image_ref: Set(None),
            }
            .insert(db)
            .await?;
            count += 1;
        }
    }
    Ok(count)
}

async fn create_doctors(db: &DatabaseConnection, first_doctor_user: Uuid) -> anyhow::Result<usize> {
    let roster = [
        (Some(first_doctor_user), "Dr. Farhana Rahman", "Medicine", DoctorType::Human, dec!(800)),
        (None, "Dr. Kamal Hossain", "Pediatrics", DoctorType::Human, dec!(1000)),
        (None, "Dr. Nusrat Akter", "Small animals", DoctorType::Vet, dec!(600)),
    ];
    let morning = NaiveTime::from_hms_opt(9, 0, 0);
    let noon = NaiveTime::from_hms_opt(13, 0, 0);

    for (user_id, name, specialty, doctor_type, fee) in &roster {
        let doctor = doctor::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(*user_id),
            name: Set(name.to_string()),
            specialty: Set(specialty.to_string()),
            doctor_type: Set(*doctor_type),
            languages: Set("Bangla,English".to_string()),
            location: Set("Dhaka".to_string()),
            fee: Set(*fee),
            bkash_number: Set(None),
            bio: Set(None),
            image_ref: Set(None),
        }
        .insert(db)
        .await?;

        if let (Some(start), Some(end)) = (morning, noon) {
            for day in [Weekday::Sunday, Weekday::Tuesday, Weekday::Thursday] {
                schedule::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    doctor_id: Set(doctor.id),
                    day_of_week: Set(day),
                    start_time: Set(start),
                    end_time: Set(end),
                }
                .insert(db)
                .await?;
            }
        }
    }
    Ok(roster.len())
}
