//! Services module
//!
//! Lógica de negocio del núcleo de despacho: máquinas de estado, guardas,
//! auditoría y las operaciones transaccionales que las combinan.

pub mod audit_service;
pub mod dispatch_service;
pub mod fleet_service;
pub mod post_commit;
pub mod preconditions;
pub mod protocol;
pub mod state_machine;
pub mod transition_service;

pub use dispatch_service::{
    CompleteTripCommand, CompletionOutcome, CreateTripCommand, DispatchOutcome, DispatchService,
};
pub use fleet_service::FleetService;
pub use post_commit::PostCommitRunner;
