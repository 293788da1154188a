pub mod match_service;
pub mod realize_service;
pub mod schedule_service;

pub use match_service::{BulkAcceptOutcome, MatchService};
pub use realize_service::{RealizeOutcome, RealizeRequest, RealizeService};
pub use schedule_service::ScheduleService;
