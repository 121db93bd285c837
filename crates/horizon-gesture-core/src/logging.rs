//! Logging facilities for Horizon Gesture.
//!
//! Horizon Gesture uses the `tracing` crate for instrumentation. Detectors log
//! state transitions at `trace` level and gesture recognition at `debug`
//! level. To see logs, install a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_gesture=debug")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Timer system target.
    pub const TIMER: &str = "horizon_gesture_core::timer";
    /// Document-level listener registry target.
    pub const LISTENERS: &str = "horizon_gesture_core::listeners";
    /// Touch dispatcher target.
    pub const TOUCH: &str = "horizon_gesture::touch";
    /// Drag detector target.
    pub const DRAG: &str = "horizon_gesture::drag";
    /// Flick detector target.
    pub const FLICK: &str = "horizon_gesture::flick";
    /// Hold detector target.
    pub const HOLD: &str = "horizon_gesture::hold";
    /// Pinch detector target.
    pub const PINCH: &str = "horizon_gesture::pinch";
    /// Gesture configuration target.
    pub const CONFIG: &str = "horizon_gesture::config";
}
