//! Bloqueos de fila exclusivos y no bloqueantes
//!
//! `LockSet` adquiere siempre en el orden global Vehicle -> Driver -> Trip,
//! sin importar el orden en que se registraron los objetivos. Cada fila se
//! bloquea con `FOR UPDATE NOWAIT`: si otra transacción la tiene, la
//! operación falla de inmediato con `RESOURCE_LOCKED`.

use sqlx::PgConnection;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Driver, EntityKind, Trip, Vehicle};
use crate::repositories::{driver_repository, trip_repository, vehicle_repository};
use crate::utils::errors::{DomainError, DomainResult};

/// Fila a bloquear. El orden de las variantes es el orden global de adquisición.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LockTarget {
    Vehicle(Uuid),
    Driver(Uuid),
    Trip(Uuid),
}

impl LockTarget {
    pub fn entity(&self) -> EntityKind {
        match self {
            LockTarget::Vehicle(_) => EntityKind::Vehicle,
            LockTarget::Driver(_) => EntityKind::Driver,
            LockTarget::Trip(_) => EntityKind::Trip,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            LockTarget::Vehicle(id) | LockTarget::Driver(id) | LockTarget::Trip(id) => *id,
        }
    }
}

/// Conjunto de filas que una operación va a mutar (como máximo una por tipo)
#[derive(Debug, Default, Clone)]
pub struct LockSet {
    vehicle: Option<Uuid>,
    driver: Option<Uuid>,
    trip: Option<Uuid>,
}

impl LockSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vehicle(mut self, id: Uuid) -> Self {
        self.vehicle = Some(id);
        self
    }

    pub fn driver(mut self, id: Uuid) -> Self {
        self.driver = Some(id);
        self
    }

    pub fn trip(mut self, id: Uuid) -> Self {
        self.trip = Some(id);
        self
    }

    /// Objetivos en orden de adquisición
    pub fn plan(&self) -> Vec<LockTarget> {
        let mut targets: Vec<LockTarget> = [
            self.vehicle.map(LockTarget::Vehicle),
            self.driver.map(LockTarget::Driver),
            self.trip.map(LockTarget::Trip),
        ]
        .into_iter()
        .flatten()
        .collect();
        targets.sort();
        targets
    }

    /// Bloquea cada fila del plan dentro de la transacción en curso
    pub async fn acquire(self, conn: &mut PgConnection) -> DomainResult<LockedRows> {
        let mut rows = LockedRows::default();

        for target in self.plan() {
            debug!(entity = %target.entity(), id = %target.id(), "🔒 Bloqueando fila");
            match target {
                LockTarget::Vehicle(id) => {
                    let vehicle = vehicle_repository::lock_nowait(&mut *conn, id)
                        .await?
                        .ok_or_else(|| DomainError::not_found(EntityKind::Vehicle, id))?;
                    rows.vehicle = Some(vehicle);
                }
                LockTarget::Driver(id) => {
                    let driver = driver_repository::lock_nowait(&mut *conn, id)
                        .await?
                        .ok_or_else(|| DomainError::not_found(EntityKind::Driver, id))?;
                    rows.driver = Some(driver);
                }
                LockTarget::Trip(id) => {
                    let trip = trip_repository::lock_nowait(&mut *conn, id)
                        .await?
                        .ok_or_else(|| DomainError::not_found(EntityKind::Trip, id))?;
                    rows.trip = Some(trip);
                }
            }
        }

        Ok(rows)
    }
}

/// Instantáneas leídas bajo bloqueo
#[derive(Debug, Default)]
pub struct LockedRows {
    pub vehicle: Option<Vehicle>,
    pub driver: Option<Driver>,
    pub trip: Option<Trip>,
}

impl LockedRows {
    pub fn into_vehicle_and_driver(self) -> DomainResult<(Vehicle, Driver)> {
        match (self.vehicle, self.driver) {
            (Some(vehicle), Some(driver)) => Ok((vehicle, driver)),
            _ => Err(DomainError::Unclassified(
                "lock set did not include vehicle and driver".to_string(),
            )),
        }
    }

    pub fn into_all(self) -> DomainResult<(Vehicle, Driver, Trip)> {
        match (self.vehicle, self.driver, self.trip) {
            (Some(vehicle), Some(driver), Some(trip)) => Ok((vehicle, driver, trip)),
            _ => Err(DomainError::Unclassified(
                "lock set did not include vehicle, driver and trip".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_is_vehicle_driver_trip_regardless_of_call_order() {
        let (v, d, t) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let plan = LockSet::new().trip(t).driver(d).vehicle(v).plan();
        assert_eq!(
            plan,
            vec![LockTarget::Vehicle(v), LockTarget::Driver(d), LockTarget::Trip(t)]
        );
    }

    #[test]
    fn plan_skips_missing_targets() {
        let t = Uuid::new_v4();
        let plan = LockSet::new().trip(t).plan();
        assert_eq!(plan, vec![LockTarget::Trip(t)]);
        assert_eq!(plan[0].entity(), EntityKind::Trip);
        assert!(LockSet::new().plan().is_empty());
    }

    #[test]
    fn variant_order_beats_id_order() {
        // Un id de vehículo "mayor" sigue yendo antes que el conductor
        let big = Uuid::from_u128(u128::MAX);
        let small = Uuid::from_u128(1);
        assert!(LockTarget::Vehicle(big) < LockTarget::Driver(small));
        assert!(LockTarget::Driver(big) < LockTarget::Trip(small));
    }
}
