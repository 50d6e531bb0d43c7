//! Self-rescheduling event workload
//!
//! The event-throughput benchmark: one event that reschedules itself one
//! tick later, forever, until a terminal event at the configured end time
//! stops the run. Every tick pops exactly one event and pushes exactly one,
//! so the run measures raw queue and record-allocation cost.

use crate::scheduler::{RunReport, Scheduler, SchedulerConfig, SchedulerError};
use std::ops::ControlFlow;

/// Reschedule this same action one tick from now
pub fn reschedule<S>(scheduler: &mut Scheduler<S>) -> ControlFlow<()> {
    scheduler.schedule_in(1, reschedule::<S>);
    ControlFlow::Continue(())
}

/// Terminal sentinel: stop the run
pub fn finish<S>(_: &mut Scheduler<S>) -> ControlFlow<()> {
    ControlFlow::Break(())
}

/// Run the self-rescheduling workload to completion
///
/// # Example
/// ```
/// use event_scheduler_core::{workload, SchedulerConfig};
///
/// let config = SchedulerConfig { end_time: 50, pooling: true, ..Default::default() };
/// let report = workload::run_self_rescheduling(config).unwrap();
///
/// assert_eq!(report.events_processed, 51);
/// assert_eq!(report.final_time, 50);
/// ```
pub fn run_self_rescheduling(config: SchedulerConfig) -> Result<RunReport, SchedulerError> {
    let mut scheduler = Scheduler::new(config, ())?;
    let report = scheduler.run(reschedule::<()>, finish::<()>);
    scheduler.into_state();
    Ok(report)
}
