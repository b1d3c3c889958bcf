use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::models::{DriverStatus, NewDriver};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDriverRequest {
    #[validate(length(min = 2, max = 100))]
    pub full_name: String,

    pub license_expiry: NaiveDate,

    #[validate(length(min = 1, max = 10))]
    pub license_category: Option<String>,

    #[validate(range(min = 0, max = 100))]
    pub safety_score: Option<i32>,
}

impl From<CreateDriverRequest> for NewDriver {
    fn from(request: CreateDriverRequest) -> Self {
        Self {
            full_name: request.full_name.trim().to_string(),
            license_expiry: request.license_expiry,
            license_category: request.license_category,
            safety_score: request.safety_score.unwrap_or(100),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDriverStatusRequest {
    pub status: DriverStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn safety_score_out_of_range_is_rejected() {
        let request: CreateDriverRequest = serde_json::from_value(json!({
            "full_name": "Ana Ruiz",
            "license_expiry": "2030-01-31",
            "safety_score": 140,
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn status_uses_snake_case() {
        let request: UpdateDriverStatusRequest =
            serde_json::from_value(json!({ "status": "on_duty" })).unwrap();
        assert_eq!(request.status, DriverStatus::OnDuty);
    }
}
