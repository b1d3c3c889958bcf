//! Modelo de Driver

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del conductor - mapea al ENUM driver_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "driver_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    OffDuty,
    OnDuty,
    OnTrip,
    Suspended,
}

impl DriverStatus {
    pub const ALL: [DriverStatus; 4] = [
        DriverStatus::OffDuty,
        DriverStatus::OnDuty,
        DriverStatus::OnTrip,
        DriverStatus::Suspended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::OffDuty => "off_duty",
            DriverStatus::OnDuty => "on_duty",
            DriverStatus::OnTrip => "on_trip",
            DriverStatus::Suspended => "suspended",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Driver {
    pub id: Uuid,
    pub full_name: String,
    pub status: DriverStatus,
    pub license_expiry: NaiveDate,
    pub license_category: Option<String>,
    pub safety_score: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Driver {
    /// La licencia sigue vigente el mismo día de su vencimiento
    pub fn license_valid_on(&self, day: NaiveDate) -> bool {
        self.license_expiry >= day
    }
}

#[derive(Debug, Clone)]
pub struct NewDriver {
    pub full_name: String,
    pub license_expiry: NaiveDate,
    pub license_category: Option<String>,
    pub safety_score: i32,
}
