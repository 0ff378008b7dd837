//! Application services for client intake and pipeline orchestration.

mod pipeline;

pub use pipeline::{
    ClientIntakeRequest, ClientPipelineError, ClientPipelineResult, ClientPipelineService,
    StaffClientRequest,
};
