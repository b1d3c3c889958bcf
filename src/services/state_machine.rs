//! Motor de máquinas de estado
//!
//! Tablas de adyacencia puras para Vehicle, Driver y Trip. No hay I/O: la
//! escritura del nuevo estado y su auditoría viven en `transition_service`.
//! Los estados terminales (`retired`, `suspended`, `completed`, `cancelled`)
//! tienen su lista de salida vacía de forma explícita.

use std::fmt;
use std::hash::Hash;
use thiserror::Error;

use crate::models::{DriverStatus, EntityKind, TripStatus, VehicleStatus};

/// Estado de una entidad con ciclo de vida guardado
pub trait Lifecycle: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Entidad a la que pertenece este conjunto de estados
    const ENTITY: EntityKind;

    /// Estados alcanzables desde `self`
    fn allowed_next(self) -> &'static [Self];

    fn name(self) -> &'static str;

    fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }

    fn can_transition_to(self, target: Self) -> bool {
        self.allowed_next().contains(&target)
    }

    /// Nombre de acción de auditoría para `self -> target`
    fn audit_action(self, _target: Self) -> &'static str {
        "entity_state_changed"
    }
}

/// Transición rechazada por la guarda
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal {entity} transition {from} -> {to} (allowed: {})", format_allowed(.allowed_next))]
pub struct IllegalTransition {
    pub entity: EntityKind,
    pub from: &'static str,
    pub to: &'static str,
    pub allowed_next: Vec<&'static str>,
}

fn format_allowed(allowed: &[&'static str]) -> String {
    if allowed.is_empty() {
        "none, state is terminal".to_string()
    } else {
        allowed.join(", ")
    }
}

impl IllegalTransition {
    pub fn new<S: Lifecycle>(from: S, to: S) -> Self {
        Self {
            entity: S::ENTITY,
            from: from.name(),
            to: to.name(),
            allowed_next: from.allowed_next().iter().map(|s| s.name()).collect(),
        }
    }
}

/// Guarda: devuelve el estado destino si la arista existe en la tabla
pub fn transition<S: Lifecycle>(current: S, target: S) -> Result<S, IllegalTransition> {
    if current.can_transition_to(target) {
        Ok(target)
    } else {
        Err(IllegalTransition::new(current, target))
    }
}

/// Guarda para cambios manuales (fuera del protocolo de despacho).
///
/// `on_trip` sólo lo mueve el protocolo de despacho; un cambio manual que
/// entra o sale de él se rechaza aunque la arista exista en la tabla.
pub fn manual_transition<S: Lifecycle>(
    current: S,
    target: S,
    reserved: S,
) -> Result<S, IllegalTransition> {
    if current == reserved || target == reserved {
        let mut err = IllegalTransition::new(current, target);
        err.allowed_next.retain(|name| *name != reserved.name());
        return Err(err);
    }
    transition(current, target)
}

impl Lifecycle for VehicleStatus {
    const ENTITY: EntityKind = EntityKind::Vehicle;

    fn allowed_next(self) -> &'static [Self] {
        use VehicleStatus::*;
        match self {
            Available => &[OnTrip, InShop, Retired],
            OnTrip => &[Available],
            InShop => &[Available, Retired],
            Retired => &[],
        }
    }

    fn name(self) -> &'static str {
        self.as_str()
    }

    fn audit_action(self, target: Self) -> &'static str {
        use VehicleStatus::*;
        match (self, target) {
            (Available, OnTrip) => "vehicle_dispatched",
            (OnTrip, Available) => "vehicle_released",
            (_, InShop) => "vehicle_sent_to_shop",
            (_, Retired) => "vehicle_retired",
            _ => "entity_state_changed",
        }
    }
}

impl Lifecycle for DriverStatus {
    const ENTITY: EntityKind = EntityKind::Driver;

    fn allowed_next(self) -> &'static [Self] {
        use DriverStatus::*;
        match self {
            OffDuty => &[OnDuty],
            OnDuty => &[OnTrip, OffDuty, Suspended],
            OnTrip => &[OnDuty],
            Suspended => &[],
        }
    }

    fn name(self) -> &'static str {
        self.as_str()
    }

    fn audit_action(self, target: Self) -> &'static str {
        use DriverStatus::*;
        match (self, target) {
            (OnDuty, OnTrip) => "driver_dispatched",
            (OnTrip, OnDuty) => "driver_released",
            (_, Suspended) => "driver_suspended",
            _ => "entity_state_changed",
        }
    }
}

impl Lifecycle for TripStatus {
    const ENTITY: EntityKind = EntityKind::Trip;

    fn allowed_next(self) -> &'static [Self] {
        use TripStatus::*;
        match self {
            Draft => &[Dispatched, Cancelled],
            Dispatched => &[Completed, Cancelled],
            Completed => &[],
            Cancelled => &[],
        }
    }

    fn name(self) -> &'static str {
        self.as_str()
    }

    fn audit_action(self, target: Self) -> &'static str {
        match target {
            TripStatus::Dispatched => "trip_dispatched",
            TripStatus::Completed => "trip_completed",
            TripStatus::Cancelled => "trip_cancelled",
            TripStatus::Draft => "entity_state_changed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges<S: Lifecycle>(all: &[S]) -> Vec<(S, S)> {
        all.iter()
            .flat_map(|from| all.iter().map(move |to| (*from, *to)))
            .collect()
    }

    #[test]
    fn vehicle_table_matches_lifecycle() {
        use VehicleStatus::*;
        let allowed = [
            (Available, OnTrip),
            (Available, InShop),
            (Available, Retired),
            (OnTrip, Available),
            (InShop, Available),
            (InShop, Retired),
        ];
        for (from, to) in edges(&VehicleStatus::ALL) {
            assert_eq!(
                transition(from, to).is_ok(),
                allowed.contains(&(from, to)),
                "{:?} -> {:?}",
                from,
                to
            );
        }
    }

    #[test]
    fn driver_table_matches_lifecycle() {
        use DriverStatus::*;
        let allowed = [
            (OffDuty, OnDuty),
            (OnDuty, OnTrip),
            (OnDuty, OffDuty),
            (OnDuty, Suspended),
            (OnTrip, OnDuty),
        ];
        for (from, to) in edges(&DriverStatus::ALL) {
            assert_eq!(transition(from, to).is_ok(), allowed.contains(&(from, to)));
        }
    }

    #[test]
    fn trip_table_matches_lifecycle() {
        use TripStatus::*;
        let allowed = [
            (Draft, Dispatched),
            (Draft, Cancelled),
            (Dispatched, Completed),
            (Dispatched, Cancelled),
        ];
        for (from, to) in edges(&TripStatus::ALL) {
            assert_eq!(transition(from, to).is_ok(), allowed.contains(&(from, to)));
        }
    }

    #[test]
    fn terminal_states_reject_every_target() {
        for to in VehicleStatus::ALL {
            assert!(transition(VehicleStatus::Retired, to).is_err());
        }
        for to in DriverStatus::ALL {
            assert!(transition(DriverStatus::Suspended, to).is_err());
        }
        for to in TripStatus::ALL {
            assert!(transition(TripStatus::Completed, to).is_err());
            assert!(transition(TripStatus::Cancelled, to).is_err());
        }
        assert!(VehicleStatus::Retired.is_terminal());
        assert!(DriverStatus::Suspended.is_terminal());
        assert!(!TripStatus::Draft.is_terminal());
    }

    #[test]
    fn rejected_transition_leaves_state_unchanged() {
        for (from, to) in edges(&TripStatus::ALL) {
            let mut state = from;
            match transition(state, to) {
                Ok(next) => state = next,
                Err(_) => assert_eq!(state, from),
            }
            assert!(state == from || state == to);
        }
    }

    #[test]
    fn illegal_transition_reports_allowed_next() {
        let err = transition(VehicleStatus::OnTrip, VehicleStatus::Retired).unwrap_err();
        assert_eq!(err.entity, EntityKind::Vehicle);
        assert_eq!(err.from, "on_trip");
        assert_eq!(err.to, "retired");
        assert_eq!(err.allowed_next, vec!["available"]);
        assert!(err.to_string().contains("on_trip -> retired"));

        let terminal = transition(TripStatus::Completed, TripStatus::Cancelled).unwrap_err();
        assert!(terminal.allowed_next.is_empty());
        assert!(terminal.to_string().contains("terminal"));
    }

    #[test]
    fn manual_transition_cannot_touch_on_trip() {
        assert!(manual_transition(
            VehicleStatus::Available,
            VehicleStatus::OnTrip,
            VehicleStatus::OnTrip
        )
        .is_err());
        assert!(manual_transition(DriverStatus::OnTrip, DriverStatus::OnDuty, DriverStatus::OnTrip)
            .is_err());
        assert_eq!(
            manual_transition(DriverStatus::OnDuty, DriverStatus::Suspended, DriverStatus::OnTrip),
            Ok(DriverStatus::Suspended)
        );

        let err = manual_transition(
            DriverStatus::OnDuty,
            DriverStatus::OnTrip,
            DriverStatus::OnTrip,
        )
        .unwrap_err();
        assert_eq!(err.allowed_next, vec!["off_duty", "suspended"]);
    }

    #[test]
    fn audit_actions_are_specialised() {
        assert_eq!(
            VehicleStatus::Available.audit_action(VehicleStatus::OnTrip),
            "vehicle_dispatched"
        );
        assert_eq!(
            VehicleStatus::InShop.audit_action(VehicleStatus::Available),
            "entity_state_changed"
        );
        assert_eq!(
            DriverStatus::OnDuty.audit_action(DriverStatus::Suspended),
            "driver_suspended"
        );
        assert_eq!(
            TripStatus::Dispatched.audit_action(TripStatus::Completed),
            "trip_completed"
        );
    }
}
