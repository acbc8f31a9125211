pub mod crsf_task;
pub mod nav_task;
pub mod position_loop;
pub mod telemetry_task;
