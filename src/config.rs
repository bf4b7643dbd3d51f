//! Tracker configuration.
//!
//! [`TrackerConfig`] is a fluent builder covering the options both trackers recognize:
//!
//! * **`max`**: total step count (bounded trackers only, default `100`).
//! * **`avg_window`**: smoothing window for the rate estimate (default `10` for
//!   unbounded trackers, `max / 10` for bounded ones).
//! * **`period`**: minimum time between throttled redraws (default: every advance).
//! * **`backtrack`**: whether [`goto`](crate::Bounded::goto) may move backward.
//!
//! Anything else is passthrough display context (a label, a suffix template, ...) and
//! lands verbatim in the tracker's [`Context`].
//!
//! When options arrive as loose key/value pairs (parsed from a config file, forwarded
//! from a CLI), [`TrackerConfig::from_pairs`] splits the recognized keys from the
//! residual context and rejects recognized keys carrying the wrong type.

use std::time::Duration;

use compact_str::CompactString;

use crate::{
    context::{Context, Value},
    error::ConfigError,
};

/// Default total for bounded trackers.
pub const DEFAULT_MAX: u64 = 100;

/// Default smoothing window for unbounded trackers.
pub const DEFAULT_AVG_WINDOW: f64 = 10.0;

/// Options shared by [`Unbounded`](crate::Unbounded) and [`Bounded`](crate::Bounded).
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Context"))]
pub struct TrackerConfig {
    pub(crate) max: Option<u64>,
    pub(crate) avg_window: Option<f64>,
    pub(crate) period: Option<Duration>,
    pub(crate) backtrack: bool,
    pub(crate) extra: Context,
}

impl TrackerConfig {
    /// Starts an empty configuration; every option takes its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the total step count.
    #[must_use]
    pub const fn max(mut self, max: u64) -> Self {
        self.max = Some(max);
        self
    }

    /// Sets the smoothing window, in effective samples.
    #[must_use]
    pub const fn avg_window(mut self, window: f64) -> Self {
        self.avg_window = Some(window);
        self
    }

    /// Sets the minimum time between throttled redraws.
    ///
    /// A zero period disables throttling.
    #[must_use]
    pub fn period(mut self, period: Duration) -> Self {
        self.period = (!period.is_zero()).then_some(period);
        self
    }

    /// Allows [`goto`](crate::Bounded::goto) to move the index backward.
    #[must_use]
    pub const fn backtrack(mut self, backtrack: bool) -> Self {
        self.backtrack = backtrack;
        self
    }

    /// Adds a passthrough display entry.
    #[must_use]
    pub fn with(mut self, key: impl AsRef<str>, value: impl Into<Value>) -> Self {
        self.extra.insert(key, value);
        self
    }

    /// The passthrough display entries collected so far.
    #[must_use]
    pub const fn extra(&self) -> &Context {
        &self.extra
    }

    /// The configured smoothing window, if any.
    #[must_use]
    pub const fn configured_avg_window(&self) -> Option<f64> {
        self.avg_window
    }

    /// Builds a configuration from loose key/value pairs.
    ///
    /// Recognized keys are type-checked; every other key becomes passthrough context.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a recognized key carries a value of the wrong type,
    /// a negative count, or an invalid smoothing window.
    pub fn from_pairs<K, V, I>(pairs: I) -> Result<Self, ConfigError>
    where
        K: AsRef<str>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut config = Self::new();
        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.into();
            match key {
                "max" => config.max = Some(parse_count(key, &value)?),
                "avg_window" => config.avg_window = Some(parse_window(key, &value)?),
                "period" => config.period = parse_period(key, &value)?,
                "backtrack" => match value {
                    Value::Bool(b) => config.backtrack = b,
                    _ => return Err(unexpected(key, "a boolean")),
                },
                _ => {
                    config.extra.insert(key, value);
                }
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Checks option values that the builder cannot rule out by type.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAvgWindow`] for a non-finite or non-positive window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.avg_window {
            Some(w) if !w.is_finite() || w <= 0.0 => Err(ConfigError::InvalidAvgWindow(w)),
            _ => Ok(()),
        }
    }
}

impl TryFrom<Context> for TrackerConfig {
    type Error = ConfigError;

    fn try_from(ctx: Context) -> Result<Self, Self::Error> {
        Self::from_pairs(ctx.iter().map(|(k, v)| (k, v.clone())))
    }
}

fn unexpected(key: &str, expected: &'static str) -> ConfigError {
    ConfigError::UnexpectedType {
        key: CompactString::from(key),
        expected,
    }
}

fn negative(key: &str) -> ConfigError {
    ConfigError::NegativeValue {
        key: CompactString::from(key),
    }
}

fn parse_count(key: &str, value: &Value) -> Result<u64, ConfigError> {
    match *value {
        Value::UInt(v) => Ok(v),
        Value::Int(v) => u64::try_from(v).map_err(|_| negative(key)),
        _ => Err(unexpected(key, "an unsigned integer")),
    }
}

fn parse_window(key: &str, value: &Value) -> Result<f64, ConfigError> {
    match value {
        Value::UInt(_) | Value::Int(_) | Value::Float(_) => value
            .as_f64()
            .ok_or_else(|| unexpected(key, "a number")),
        _ => Err(unexpected(key, "a number")),
    }
}

fn parse_period(key: &str, value: &Value) -> Result<Option<Duration>, ConfigError> {
    let period = match *value {
        // `false` is the conventional "no throttling" spelling.
        Value::Bool(false) => return Ok(None),
        Value::Duration(d) => d,
        Value::UInt(secs) => Duration::from_secs(secs),
        Value::Int(secs) => Duration::from_secs(u64::try_from(secs).map_err(|_| negative(key))?),
        Value::Float(secs) if secs < 0.0 => return Err(negative(key)),
        Value::Float(secs) => Duration::try_from_secs_f64(secs)
            .map_err(|_| unexpected(key, "a representable number of seconds"))?,
        _ => return Err(unexpected(key, "a duration or a number of seconds")),
    };
    Ok((!period.is_zero()).then_some(period))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::TrackerConfig;
    use crate::{
        context::Value,
        error::ConfigError,
    };

    /// Builder
    /// Fluent setters populate typed fields and passthrough context separately.
    #[test]
    fn test_builder_splits_options() {
        let config = TrackerConfig::new()
            .max(500)
            .period(Duration::from_millis(500))
            .backtrack(true)
            .with("message", "Downloading")
            .with("suffix", "{percent:.1}%");

        assert_eq!(config.max, Some(500));
        assert_eq!(config.period, Some(Duration::from_millis(500)));
        assert!(config.backtrack);
        assert_eq!(config.extra().len(), 2);
        assert_eq!(config.extra().get("message"), Some(&Value::from("Downloading")));
    }

    #[test]
    fn test_zero_period_disables_throttling() {
        assert_eq!(TrackerConfig::new().period(Duration::ZERO).period, None);
    }

    /// Loose Pairs
    /// Recognized keys are typed, unknown keys are kept in order.
    #[test]
    fn test_from_pairs() {
        let config = TrackerConfig::from_pairs([
            ("message", Value::from("Copying")),
            ("max", Value::from(40u64)),
            ("period", Value::from(0.25)),
            ("avg_window", Value::from(4i64)),
            ("backtrack", Value::from(true)),
            ("fill", Value::from("#")),
        ])
        .unwrap();

        assert_eq!(config.max, Some(40));
        assert_eq!(config.period, Some(Duration::from_millis(250)));
        assert_eq!(config.configured_avg_window(), Some(4.0));
        assert!(config.backtrack);

        let keys: Vec<&str> = config.extra().iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["message", "fill"]);
    }

    #[test]
    fn test_from_pairs_rejects_bad_values() {
        assert_eq!(
            TrackerConfig::from_pairs([("period", Value::from(1e30))]),
            Err(ConfigError::UnexpectedType {
                key: "period".into(),
                expected: "a representable number of seconds",
            })
        );
        assert!(matches!(
            TrackerConfig::from_pairs([("period", Value::from(f64::NAN))]),
            Err(ConfigError::UnexpectedType { .. })
        ));
        assert_eq!(
            TrackerConfig::from_pairs([("max", Value::from(-1i64))]),
            Err(ConfigError::NegativeValue { key: "max".into() })
        );
        assert!(matches!(
            TrackerConfig::from_pairs([("max", Value::from("ten"))]),
            Err(ConfigError::UnexpectedType { .. })
        ));
        assert!(matches!(
            TrackerConfig::from_pairs([("backtrack", Value::from(1u64))]),
            Err(ConfigError::UnexpectedType { .. })
        ));
        assert_eq!(
            TrackerConfig::from_pairs([("avg_window", Value::from(0u64))]),
            Err(ConfigError::InvalidAvgWindow(0.0))
        );
        assert_eq!(
            TrackerConfig::from_pairs([("period", Value::from(-0.5))]),
            Err(ConfigError::NegativeValue {
                key: "period".into()
            })
        );
    }

    #[test]
    fn test_period_false_means_unthrottled() {
        let config = TrackerConfig::from_pairs([("period", Value::from(false))]).unwrap();
        assert_eq!(config.period, None);
    }

    #[test]
    fn test_validate_rejects_nan_window() {
        let config = TrackerConfig::new().avg_window(f64::NAN);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAvgWindow(w)) if w.is_nan()
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_from_flat_map() {
        let config: TrackerConfig =
            serde_json::from_str(r#"{"max": 20, "period": 0.5, "message": "Fetching"}"#).unwrap();
        assert_eq!(config.max, Some(20));
        assert_eq!(config.period, Some(Duration::from_millis(500)));
        assert_eq!(config.extra().get("message"), Some(&Value::from("Fetching")));

        let err = serde_json::from_str::<TrackerConfig>(r#"{"max": "many"}"#);
        assert!(err.is_err());
    }
}
