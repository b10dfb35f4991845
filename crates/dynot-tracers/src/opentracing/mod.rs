mod driver;
mod span;

pub use driver::{
    DriverStats, DriverStatsSnapshot, NODE_ID_TAG, OpenTracingDriver, PropagationMode,
    SPAN_CONTEXT_HEADER,
};
pub use span::{OpenTracingSpan, SAMPLING_PRIORITY_TAG};
