//! Usage and cost recording
//!
//! [`PrometheusUsageRecorder`] owns an explicit prometheus registry built
//! once by the composition root. [`NullUsageRecorder`] discards everything.

mod null;
mod recorder;

pub use null::NullUsageRecorder;
pub use recorder::PrometheusUsageRecorder;
