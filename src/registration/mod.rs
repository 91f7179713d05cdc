//! Event-registration core: the checks and mutations that register or
//! unregister a volunteer for a capacity-limited event while keeping the
//! denormalized `registered_volunteers` counter consistent with the
//! membership rows.

pub mod capacity;
pub mod coordinator;
pub mod error;
pub mod ledger;

pub use capacity::{check_capacity, has_capacity, EventCapacity};
pub use coordinator::RegistrationCoordinator;
pub use error::RegistrationError;
