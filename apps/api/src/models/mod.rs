pub mod filters;
pub mod job;
pub mod plan;
pub mod subscription;
