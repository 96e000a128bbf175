mod lifecycle;
mod model;
mod plan;

pub use lifecycle::{parse_manual_duration, LifecycleManager};
pub use model::{
    format_hms, format_minutes, minutes_from_ms, Target, TargetKey, TargetPhase, TimerSnapshot,
    MIN_DURATION_MIN,
};
pub use plan::{add_target, targets_for_day, NewTarget};
