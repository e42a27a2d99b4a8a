use crate::beds::BedService;
use crate::beds::history::BedHistory;
use crate::error::AppError;
use crate::hospital::geo::{Bounds, Coordinates};
use crate::hospital::{Hospital, HospitalCatalog, HospitalId};
use crate::routing::{RouteEstimate, RouteEstimator};
use serde::Serialize;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub id: HospitalId,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HospitalPreview {
    pub id: HospitalId,
    pub name: String,
    pub address: String,
    pub representative_contact: String,
    pub emergency_contact: String,
    pub available_beds: i32,
    pub distance_km: f64,
    pub arrival_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HospitalDetail {
    pub name: String,
    pub address: String,
    pub simple_address: String,
    pub representative_contact: String,
    pub emergency_contact: String,
    pub has_ambulance: bool,
    pub has_ct: bool,
    pub has_mri: bool,
    pub available_beds: i32,
    pub distance_km: f64,
    pub arrival_time: String,
    pub latitude: f64,
    pub longitude: f64,
    pub bed_history: BedHistory,
}

/// Builds the hospital payloads shown to end users.
#[derive(Debug, Clone)]
pub struct HospitalService {
    catalog: Arc<dyn HospitalCatalog>,
    beds: BedService,
    router: Arc<dyn RouteEstimator>,
}

impl HospitalService {
    pub fn new(
        catalog: Arc<dyn HospitalCatalog>,
        beds: BedService,
        router: Arc<dyn RouteEstimator>,
    ) -> Self {
        Self {
            catalog,
            beds,
            router,
        }
    }

    pub fn beds(&self) -> &BedService {
        &self.beds
    }

    /// Hospitals whose location falls inside the viewport.
    pub fn map(&self, bounds: &Bounds) -> Vec<MapMarker> {
        self.catalog
            .all()
            .into_iter()
            .filter_map(|hospital| {
                let location = hospital.location()?;
                bounds.contains(&location).then_some(MapMarker {
                    id: hospital.id,
                    latitude: location.latitude,
                    longitude: location.longitude,
                })
            })
            .collect()
    }

    pub async fn preview(
        &self,
        id: HospitalId,
        origin: Coordinates,
    ) -> Result<HospitalPreview, AppError> {
        self.preview_at(id, origin, self.beds.now()).await
    }

    pub async fn preview_at(
        &self,
        id: HospitalId,
        origin: Coordinates,
        now: OffsetDateTime,
    ) -> Result<HospitalPreview, AppError> {
        let hospital = self.find(id)?;
        self.build_preview(hospital, origin, now).await
    }

    /// Previews of hospitals within 5 km, nearest first.
    pub async fn list(&self, origin: Coordinates) -> Result<Vec<HospitalPreview>, AppError> {
        self.list_at(origin, self.beds.now()).await
    }

    pub async fn list_at(
        &self,
        origin: Coordinates,
        now: OffsetDateTime,
    ) -> Result<Vec<HospitalPreview>, AppError> {
        let nearby: Vec<Hospital> = self
            .catalog
            .all()
            .into_iter()
            .filter(|hospital| {
                hospital
                    .location()
                    .is_some_and(|location| origin.is_nearby(&location))
            })
            .collect();
        debug!(count = nearby.len(), "Nearby hospitals selected");

        let mut previews = Vec::with_capacity(nearby.len());
        for hospital in nearby {
            previews.push(self.build_preview(hospital, origin, now).await?);
        }
        previews.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

        Ok(previews)
    }

    pub async fn detail(
        &self,
        id: HospitalId,
        origin: Coordinates,
    ) -> Result<HospitalDetail, AppError> {
        self.detail_at(id, origin, self.beds.now()).await
    }

    pub async fn detail_at(
        &self,
        id: HospitalId,
        origin: Coordinates,
        now: OffsetDateTime,
    ) -> Result<HospitalDetail, AppError> {
        let hospital = self.find(id)?;
        let location = hospital
            .location()
            .ok_or(AppError::MissingLocation(hospital.id))?;
        let route = self.router.estimate(origin, location).await?;

        let bed_history = self.beds.recent_history_at(&hospital.name, now)?;
        let available_beds = bed_history.latest_bucket().unwrap_or(0).max(0);

        Ok(HospitalDetail {
            name: hospital.name,
            address: hospital.address,
            simple_address: hospital.simple_address.unwrap_or_default(),
            representative_contact: hospital.representative_contact,
            emergency_contact: hospital.emergency_contact,
            has_ambulance: hospital.ambulance,
            has_ct: hospital.ct,
            has_mri: hospital.mri,
            available_beds,
            distance_km: route.distance_km(),
            arrival_time: route.arrival_label(now),
            latitude: location.latitude,
            longitude: location.longitude,
            bed_history,
        })
    }

    fn find(&self, id: HospitalId) -> Result<Hospital, AppError> {
        self.catalog
            .find_by_id(id)
            .ok_or(AppError::HospitalNotFound(id))
    }

    async fn build_preview(
        &self,
        hospital: Hospital,
        origin: Coordinates,
        now: OffsetDateTime,
    ) -> Result<HospitalPreview, AppError> {
        let location = hospital
            .location()
            .ok_or(AppError::MissingLocation(hospital.id))?;
        let route: RouteEstimate = self.router.estimate(origin, location).await?;
        let available_beds = self.beds.current_count_at(&hospital.name, now)?.max(0);

        Ok(HospitalPreview {
            id: hospital.id,
            name: hospital.name,
            address: hospital.address,
            representative_contact: hospital.representative_contact,
            emergency_contact: hospital.emergency_contact,
            available_beds,
            distance_km: route.distance_km(),
            arrival_time: route.arrival_label(now),
        })
    }
}
