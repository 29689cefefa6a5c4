//! Bay indicator LEDs — classification and control.

mod indicator;
mod ops;

pub use indicator::{
    IndicatorKind, IndicatorRecord, IndicatorSummary, LedMode, LedState, classify,
    parse_indicator_kind, parse_led_mode,
};
pub use ops::{ControlOutcome, ControlRequest, control_bay};
