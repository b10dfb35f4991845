mod config;
mod driver;

pub use config::{DYNAMIC_OT_NAME, DynamicOpenTracingTracerFactory};
pub use driver::DynamicOpenTracingDriver;
