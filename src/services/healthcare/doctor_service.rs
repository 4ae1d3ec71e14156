use crate::{
    entities::healthcare::{
        doctor::{self, DoctorType},
        schedule,
    },
    errors::ServiceError,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DoctorProfile {
    pub doctor: doctor::Model,
    pub languages: Vec<String>,
    pub schedules: Vec<schedule::Model>,
}

/// Directory of doctors and veterinarians
#[derive(Clone)]
pub struct DoctorService {
    db: Arc<DatabaseConnection>,
}

impl DoctorService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn list_by_type(&self, doctor_type: DoctorType) -> Result<Vec<doctor::Model>, ServiceError> {
        Ok(doctor::Entity::find()
            .filter(doctor::Column::DoctorType.eq(doctor_type))
            .order_by_asc(doctor::Column::Name)
            .all(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn list_doctors(&self) -> Result<Vec<doctor::Model>, ServiceError> {
        self.list_by_type(DoctorType::Human).await
    }

    #[instrument(skip(self))]
    pub async fn list_vets(&self) -> Result<Vec<doctor::Model>, ServiceError> {
        self.list_by_type(DoctorType::Vet).await
    }

    /// Profile with weekly schedule
    #[instrument(skip(self))]
    pub async fn get_profile(&self, doctor_id: Uuid) -> Result<DoctorProfile, ServiceError> {
        let doctor = doctor::Entity::find_by_id(doctor_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Doctor {} not found", doctor_id)))?;

        let schedules = doctor
            .find_related(schedule::Entity)
            .order_by_asc(schedule::Column::StartTime)
            .all(&*self.db)
            .await?;

        Ok(DoctorProfile {
            languages: doctor.language_list().into_iter().map(String::from).collect(),
            doctor,
            schedules,
        })
    }
}
