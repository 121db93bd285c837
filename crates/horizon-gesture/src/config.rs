//! Gesture configuration.
//!
//! Every gesture kind has a typed configuration record with tunable
//! thresholds. Application-wide defaults live in a [`GestureConfigStore`] that
//! is created once and shared by every [`Touch`](crate::Touch) dispatcher.
//! Dispatchers take a snapshot of the store when a gesture begins, so a
//! [`configure`](GestureConfigStore::configure) call only affects gestures
//! that start afterwards.
//!
//! Updates come in two shapes:
//!
//! - Typed partial records ([`PartialGestureConfig`]), merged with
//!   [`merge_config`].
//! - Loose JSON objects ([`GestureConfigStore::configure_json`]), merged key by
//!   key with [`merge_gesture_config`]. Unknown keys are dropped.
//!
//! ```
//! use horizon_gesture::config::{GestureConfigStore, PartialFlickConfig, PartialGestureConfig};
//!
//! let store = GestureConfigStore::new();
//! store.configure(&PartialGestureConfig {
//!     flick: Some(PartialFlickConfig {
//!         max_moves: Some(10),
//!         ..Default::default()
//!     }),
//!     ..Default::default()
//! });
//! assert_eq!(store.get_config().flick.max_moves, 10);
//!
//! store.reset_default_config();
//! assert_eq!(store.get_config().flick.max_moves, 5);
//! ```

use std::time::Duration;

use horizon_gesture_core::logging::targets;
use horizon_gesture_core::{Error, Result};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default pixel distance before a drag, hold-cancel or pinch update counts.
pub const DEFAULT_MOVE_TOLERANCE: f32 = 16.0;

/// Default window after which an unfinished flick is abandoned.
pub const DEFAULT_FLICK_MAX_DURATION_MS: u64 = 250;

/// Default number of samples kept for flick velocity.
pub const DEFAULT_FLICK_MAX_MOVES: usize = 5;

/// Default minimum flick velocity in pixels per millisecond.
pub const DEFAULT_FLICK_MIN_VELOCITY: f32 = 0.1;

/// Default interval between hold pulses.
pub const DEFAULT_HOLD_FREQUENCY_MS: u64 = 200;

/// Default time before the built-in `hold` event fires.
pub const DEFAULT_HOLD_TIME_MS: u64 = 200;

/// Which box of a node bounds a drag or pinch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoxSizing {
    /// The node's full bounding rectangle.
    #[default]
    BorderBox,
    /// The bounding rectangle minus padding.
    ContentBox,
}

/// Drag thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DragConfig {
    pub box_sizing: BoxSizing,
    /// Track against the whole viewport instead of the node.
    pub global: bool,
    /// Distance in pixels before a drag starts.
    pub move_tolerance: f32,
}

impl DragConfig {
    /// Recognized configuration keys.
    pub const KEYS: &'static [&'static str] = &["boxSizing", "global", "moveTolerance"];
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            box_sizing: BoxSizing::BorderBox,
            global: false,
            move_tolerance: DEFAULT_MOVE_TOLERANCE,
        }
    }
}

/// Flick thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlickConfig {
    /// Milliseconds after which tracking is abandoned. Zero disables the
    /// deadline.
    pub max_duration: u64,
    /// Number of most recent samples used for the velocity.
    pub max_moves: usize,
    /// Minimum velocity, in pixels per millisecond, for a flick to fire.
    pub min_velocity: f32,
}

impl FlickConfig {
    /// Recognized configuration keys.
    pub const KEYS: &'static [&'static str] = &["maxDuration", "maxMoves", "minVelocity"];

    /// The tracking deadline, if any.
    pub fn max_duration(&self) -> Option<Duration> {
        (self.max_duration > 0).then(|| Duration::from_millis(self.max_duration))
    }
}

impl Default for FlickConfig {
    fn default() -> Self {
        Self {
            max_duration: DEFAULT_FLICK_MAX_DURATION_MS,
            max_moves: DEFAULT_FLICK_MAX_MOVES,
            min_velocity: DEFAULT_FLICK_MIN_VELOCITY,
        }
    }
}

/// A named hold event fired once the pointer has been held for `time` ms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HoldEventDef {
    pub name: String,
    pub time: u64,
}

impl HoldEventDef {
    pub fn new(name: impl Into<String>, time: u64) -> Self {
        Self {
            name: name.into(),
            time,
        }
    }
}

/// Hold thresholds and schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HoldConfig {
    /// Suspend or end the hold when the pointer strays too far.
    pub cancel_on_move: bool,
    pub move_tolerance: f32,
    /// Milliseconds between pulse checks.
    pub frequency: u64,
    /// Hold events, kept sorted ascending by `time`.
    pub events: Vec<HoldEventDef>,
}

impl HoldConfig {
    /// Recognized configuration keys.
    pub const KEYS: &'static [&'static str] =
        &["cancelOnMove", "events", "frequency", "moveTolerance"];

    /// The pulse interval. Never zero.
    pub fn frequency(&self) -> Duration {
        Duration::from_millis(self.frequency.max(1))
    }

    /// Sort `events` ascending by time, keeping the order of equal times.
    pub fn sort_events(&mut self) {
        self.events.sort_by_key(|event| event.time);
    }
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self {
            cancel_on_move: false,
            move_tolerance: DEFAULT_MOVE_TOLERANCE,
            frequency: DEFAULT_HOLD_FREQUENCY_MS,
            events: vec![HoldEventDef::new("hold", DEFAULT_HOLD_TIME_MS)],
        }
    }
}

/// Pinch thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PinchConfig {
    pub box_sizing: BoxSizing,
    pub global: bool,
    pub max_scale: f32,
    pub min_scale: f32,
    /// Minimum change in finger distance before a new scale is reported.
    pub move_tolerance: f32,
}

impl PinchConfig {
    /// Recognized configuration keys.
    pub const KEYS: &'static [&'static str] =
        &["boxSizing", "global", "maxScale", "minScale", "moveTolerance"];
}

impl Default for PinchConfig {
    fn default() -> Self {
        Self {
            box_sizing: BoxSizing::BorderBox,
            global: false,
            max_scale: 4.0,
            min_scale: 0.5,
            move_tolerance: DEFAULT_MOVE_TOLERANCE,
        }
    }
}

/// Configuration for every gesture kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub drag: DragConfig,
    pub flick: FlickConfig,
    pub hold: HoldConfig,
    pub pinch: PinchConfig,
}

/// Partial update for [`DragConfig`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialDragConfig {
    pub box_sizing: Option<BoxSizing>,
    pub global: Option<bool>,
    pub move_tolerance: Option<f32>,
}

impl PartialDragConfig {
    pub fn apply_to(&self, config: &mut DragConfig) {
        if let Some(box_sizing) = self.box_sizing {
            config.box_sizing = box_sizing;
        }
        if let Some(global) = self.global {
            config.global = global;
        }
        if let Some(move_tolerance) = self.move_tolerance {
            config.move_tolerance = move_tolerance;
        }
    }
}

/// Partial update for [`FlickConfig`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialFlickConfig {
    pub max_duration: Option<u64>,
    pub max_moves: Option<usize>,
    pub min_velocity: Option<f32>,
}

impl PartialFlickConfig {
    pub fn apply_to(&self, config: &mut FlickConfig) {
        if let Some(max_duration) = self.max_duration {
            config.max_duration = max_duration;
        }
        if let Some(max_moves) = self.max_moves {
            config.max_moves = max_moves;
        }
        if let Some(min_velocity) = self.min_velocity {
            config.min_velocity = min_velocity;
        }
    }
}

/// Partial update for [`HoldConfig`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialHoldConfig {
    pub cancel_on_move: Option<bool>,
    pub move_tolerance: Option<f32>,
    pub frequency: Option<u64>,
    pub events: Option<Vec<HoldEventDef>>,
}

impl PartialHoldConfig {
    /// Apply the update. Replaced events are copied and sorted.
    pub fn apply_to(&self, config: &mut HoldConfig) {
        if let Some(cancel_on_move) = self.cancel_on_move {
            config.cancel_on_move = cancel_on_move;
        }
        if let Some(move_tolerance) = self.move_tolerance {
            config.move_tolerance = move_tolerance;
        }
        if let Some(frequency) = self.frequency {
            config.frequency = frequency;
        }
        if let Some(events) = &self.events {
            config.events = events.clone();
            config.sort_events();
        }
    }
}

/// Partial update for [`PinchConfig`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartialPinchConfig {
    pub box_sizing: Option<BoxSizing>,
    pub global: Option<bool>,
    pub max_scale: Option<f32>,
    pub min_scale: Option<f32>,
    pub move_tolerance: Option<f32>,
}

impl PartialPinchConfig {
    pub fn apply_to(&self, config: &mut PinchConfig) {
        if let Some(box_sizing) = self.box_sizing {
            config.box_sizing = box_sizing;
        }
        if let Some(global) = self.global {
            config.global = global;
        }
        if let Some(max_scale) = self.max_scale {
            config.max_scale = max_scale;
        }
        if let Some(min_scale) = self.min_scale {
            config.min_scale = min_scale;
        }
        if let Some(move_tolerance) = self.move_tolerance {
            config.move_tolerance = move_tolerance;
        }
    }
}

/// Partial update for [`GestureConfig`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PartialGestureConfig {
    pub drag: Option<PartialDragConfig>,
    pub flick: Option<PartialFlickConfig>,
    pub hold: Option<PartialHoldConfig>,
    pub pinch: Option<PartialPinchConfig>,
}

impl PartialGestureConfig {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.drag.is_none() && self.flick.is_none() && self.hold.is_none() && self.pinch.is_none()
    }
}

/// Shallow-merge `update` onto `current`, keeping only `allowed_keys`.
pub fn merge_gesture_config(
    current: &Map<String, Value>,
    update: &Map<String, Value>,
    allowed_keys: &[&str],
) -> Map<String, Value> {
    let mut merged = current.clone();
    for (key, value) in update {
        merged.insert(key.clone(), value.clone());
    }
    merged.retain(|key, _| allowed_keys.contains(&key.as_str()));
    merged
}

/// Apply a typed partial update to a configuration.
///
/// The result owns all of its data; nothing in `update` is shared with it.
pub fn merge_config(current: &GestureConfig, update: &PartialGestureConfig) -> GestureConfig {
    let mut merged = current.clone();
    if let Some(drag) = &update.drag {
        drag.apply_to(&mut merged.drag);
    }
    if let Some(flick) = &update.flick {
        flick.apply_to(&mut merged.flick);
    }
    if let Some(hold) = &update.hold {
        hold.apply_to(&mut merged.hold);
    }
    if let Some(pinch) = &update.pinch {
        pinch.apply_to(&mut merged.pinch);
    }
    merged
}

fn merge_section<T>(
    kind: &'static str,
    current: &T,
    update: Option<&Value>,
    allowed_keys: &[&str],
) -> Result<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    let Some(update) = update else {
        return Ok(current.clone());
    };
    let Value::Object(update) = update else {
        return Err(Error::config_shape(kind));
    };
    let Value::Object(current) =
        serde_json::to_value(current).map_err(|err| Error::config(kind, err))?
    else {
        return Err(Error::config_shape(kind));
    };

    let merged = merge_gesture_config(&current, update, allowed_keys);
    serde_json::from_value(Value::Object(merged)).map_err(|err| Error::config(kind, err))
}

/// Apply a JSON update of the shape `{drag: {...}, flick: {...}, ...}`.
///
/// Unknown sections and unknown keys are ignored. A recognized key with a
/// value of the wrong type is an error and leaves nothing applied.
pub fn merge_config_json(current: &GestureConfig, update: &Value) -> Result<GestureConfig> {
    let Value::Object(update) = update else {
        return Err(Error::config_shape("gesture"));
    };

    let mut merged = GestureConfig {
        drag: merge_section("drag", &current.drag, update.get("drag"), DragConfig::KEYS)?,
        flick: merge_section("flick", &current.flick, update.get("flick"), FlickConfig::KEYS)?,
        hold: merge_section("hold", &current.hold, update.get("hold"), HoldConfig::KEYS)?,
        pinch: merge_section("pinch", &current.pinch, update.get("pinch"), PinchConfig::KEYS)?,
    };
    merged.hold.sort_events();
    Ok(merged)
}

/// Application-wide gesture defaults.
///
/// Create one store per application and hand it to every dispatcher.
#[derive(Debug, Default)]
pub struct GestureConfigStore {
    config: RwLock<GestureConfig>,
}

impl GestureConfigStore {
    /// A store holding the built-in defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store starting from the given configuration.
    pub fn with_config(mut config: GestureConfig) -> Self {
        config.hold.sort_events();
        Self {
            config: RwLock::new(config),
        }
    }

    /// Merge a typed partial update into the defaults.
    pub fn configure(&self, update: &PartialGestureConfig) {
        let mut config = self.config.write();
        *config = merge_config(&config, update);
        tracing::debug!(target: targets::CONFIG, ?update, "gesture defaults updated");
    }

    /// Merge a JSON update into the defaults.
    pub fn configure_json(&self, update: &Value) -> Result<()> {
        let mut config = self.config.write();
        match merge_config_json(&config, update) {
            Ok(merged) => {
                *config = merged;
                tracing::debug!(target: targets::CONFIG, %update, "gesture defaults updated");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(target: targets::CONFIG, %err, "rejected gesture configuration");
                Err(err)
            }
        }
    }

    /// A snapshot of the current defaults.
    pub fn get_config(&self) -> GestureConfig {
        self.config.read().clone()
    }

    /// Restore the built-in defaults.
    pub fn reset_default_config(&self) {
        *self.config.write() = GestureConfig::default();
        tracing::debug!(target: targets::CONFIG, "gesture defaults reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = GestureConfig::default();
        assert_eq!(config.drag.move_tolerance, 16.0);
        assert_eq!(config.drag.box_sizing, BoxSizing::BorderBox);
        assert_eq!(config.flick.max_duration(), Some(Duration::from_millis(250)));
        assert_eq!(config.flick.max_moves, 5);
        assert_eq!(config.hold.events, vec![HoldEventDef::new("hold", 200)]);
        assert_eq!(config.pinch.max_scale, 4.0);
        assert_eq!(config.pinch.min_scale, 0.5);
    }

    #[test]
    fn test_merge_gesture_config_strips_unknown_keys() {
        let current = json!({"global": false, "moveTolerance": 16});
        let update = json!({"moveTolerance": 4, "bogus": true});
        let merged = merge_gesture_config(
            current.as_object().unwrap(),
            update.as_object().unwrap(),
            DragConfig::KEYS,
        );
        assert_eq!(Value::Object(merged), json!({"global": false, "moveTolerance": 4}));
    }

    #[test]
    fn test_merge_config_sorts_hold_events() {
        let update = PartialGestureConfig {
            hold: Some(PartialHoldConfig {
                events: Some(vec![HoldEventDef::new("b", 20), HoldEventDef::new("a", 10)]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge_config(&GestureConfig::default(), &update);
        let names: Vec<_> = merged.hold.events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_configure_is_isolated_from_caller() {
        let store = GestureConfigStore::new();
        let mut update = PartialGestureConfig {
            flick: Some(PartialFlickConfig {
                max_moves: Some(10),
                ..Default::default()
            }),
            hold: Some(PartialHoldConfig {
                events: Some(vec![HoldEventDef::new("long", 1000)]),
                ..Default::default()
            }),
            ..Default::default()
        };
        store.configure(&update);

        if let Some(flick) = update.flick.as_mut() {
            flick.max_moves = Some(99);
        }
        if let Some(events) = update.hold.as_mut().and_then(|h| h.events.as_mut()) {
            events[0].time = 1;
            events.push(HoldEventDef::new("extra", 5));
        }

        let config = store.get_config();
        assert_eq!(config.flick.max_moves, 10);
        assert_eq!(config.hold.events, vec![HoldEventDef::new("long", 1000)]);
    }

    #[test]
    fn test_configure_json() {
        let store = GestureConfigStore::new();
        store
            .configure_json(&json!({
                "drag": {"boxSizing": "content-box", "unknown": 1},
                "hold": {"events": [{"name": "late", "time": 900}, {"name": "early", "time": 100}]},
                "swipe": {"minDistance": 3}
            }))
            .unwrap();

        let config = store.get_config();
        assert_eq!(config.drag.box_sizing, BoxSizing::ContentBox);
        assert_eq!(config.drag.move_tolerance, 16.0);
        assert_eq!(config.hold.events[0].name, "early");
        assert_eq!(config.hold.events[1].name, "late");
    }

    #[test]
    fn test_configure_json_rejects_bad_values() {
        let store = GestureConfigStore::new();
        let err = store
            .configure_json(&json!({"flick": {"maxMoves": "many"}}))
            .unwrap_err();
        assert!(matches!(err, Error::Config { kind: "flick", .. }));

        let err = store.configure_json(&json!({"pinch": 3})).unwrap_err();
        assert!(matches!(err, Error::ConfigShape { .. }));

        assert_eq!(store.get_config(), GestureConfig::default());
    }

    #[test]
    fn test_reset_default_config() {
        let store = GestureConfigStore::new();
        store.configure(&PartialGestureConfig {
            pinch: Some(PartialPinchConfig {
                max_scale: Some(8.0),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(store.get_config().pinch.max_scale, 8.0);
        store.reset_default_config();
        assert_eq!(store.get_config(), GestureConfig::default());
    }
}
