use crate::hospital::service::HospitalService;
use time::OffsetDateTime;

/// Shared, read-only handles used by the HTTP handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    hospitals: HospitalService,
    started_at: OffsetDateTime,
}

impl AppState {
    pub fn new(hospitals: HospitalService) -> Self {
        Self {
            hospitals,
            started_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn hospitals(&self) -> &HospitalService {
        &self.hospitals
    }

    pub fn started_at(&self) -> OffsetDateTime {
        self.started_at
    }
}
