//! In-memory adapters for appointment persistence.

mod appointment;

pub use appointment::InMemoryAppointmentRepository;
