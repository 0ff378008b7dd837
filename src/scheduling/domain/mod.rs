//! Domain model for appointment scheduling.
//!
//! The scheduling domain models appointment creation, outcome recording,
//! rescheduling, and the pure wall-clock classification of scheduled work,
//! keeping all infrastructure concerns outside of the domain boundary.

mod appointment;
mod error;
mod ids;
mod temporal;

pub use appointment::{
    Appointment, AppointmentOutcome, AppointmentStatus, AppointmentTitle,
    PersistedAppointmentData,
};
pub use error::{ParseAppointmentStatusError, SchedulingDomainError};
pub use ids::AppointmentId;
pub use temporal::{classify, TemporalClass};
