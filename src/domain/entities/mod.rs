pub mod billable;
pub mod plan;
pub mod subscription;
