//! Application services for appointment orchestration and mirror sync.

mod coordinator;

pub use coordinator::{
    CreateAppointmentRequest, PartialSyncError, SchedulingCoordinator, SchedulingError,
    SchedulingResult,
};
