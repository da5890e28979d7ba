//! # Drawer Configuration
//!
//! Typed configuration parsed once at bind time from the host's option
//! attributes.
//!
//! ## Why Typed?
//! The storefront passed options as loose string attributes read ad hoc at
//! each use site, with silent fallbacks for typos. Here the full set of
//! recognized options is enumerated in one place, each with its default,
//! and an unrecognized key is a bind-time error instead of a silently
//! ignored attribute.
//!
//! ## Recognized Options
//! ```text
//! ┌──────────────────┬──────────┬───────────────────────────────────────────┐
//! │ key              │ default  │ meaning                                   │
//! ├──────────────────┼──────────┼───────────────────────────────────────────┤
//! │ cart-type        │ drawer   │ "drawer" opens in place, "page" navigates │
//! │ reduced-motion   │ false    │ collapse transition durations             │
//! │ speed            │ 0.42     │ base transition duration, seconds         │
//! │ fallback-width   │ 420      │ panel width when unmeasurable, px         │
//! │ fetch-timeout-ms │ 8000     │ cart fetch abort threshold                │
//! └──────────────────┴──────────┴───────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{DrawerError, DrawerResult};

// =============================================================================
// Cart Mode
// =============================================================================

/// How cart triggers behave on this page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CartMode {
    /// Open the in-page drawer.
    #[default]
    Drawer,
    /// Let the trigger navigate to the cart page; the drawer stays out of
    /// the way.
    Page,
}

// =============================================================================
// Drawer Config
// =============================================================================

/// Validated drawer options.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawerConfig {
    /// Drawer vs page navigation.
    pub cart_mode: CartMode,

    /// Collapse all transition durations to a negligible value.
    pub reduced_motion: bool,

    /// Base transition duration in seconds. Open uses this directly; close
    /// and overlay durations are derived fractions of it.
    pub speed: f64,

    /// Panel width in pixels when the surface cannot measure.
    pub fallback_width: f64,

    /// Abort threshold for cart fetches. Mutations are never aborted.
    pub fetch_timeout: Duration,
}

impl Default for DrawerConfig {
    fn default() -> Self {
        DrawerConfig {
            cart_mode: CartMode::Drawer,
            reduced_motion: false,
            speed: 0.42,
            fallback_width: 420.0,
            fetch_timeout: Duration::from_millis(8000),
        }
    }
}

impl DrawerConfig {
    /// Parses and validates host option attributes.
    ///
    /// Every key is checked against the recognized set; every value must
    /// parse as its declared type. Missing keys take their defaults.
    pub fn from_attrs(attrs: &BTreeMap<String, String>) -> DrawerResult<Self> {
        let mut config = DrawerConfig::default();

        for (key, value) in attrs {
            match key.as_str() {
                "cart-type" => {
                    config.cart_mode = match value.as_str() {
                        "drawer" => CartMode::Drawer,
                        "page" => CartMode::Page,
                        other => {
                            return Err(DrawerError::InvalidConfig(format!(
                                "cart-type must be \"drawer\" or \"page\", got {other:?}"
                            )))
                        }
                    };
                }
                "reduced-motion" => {
                    config.reduced_motion = parse_bool(key, value)?;
                }
                "speed" => {
                    let speed = parse_f64(key, value)?;
                    if speed <= 0.0 {
                        return Err(DrawerError::InvalidConfig(
                            "speed must be positive".into(),
                        ));
                    }
                    config.speed = speed;
                }
                "fallback-width" => {
                    let width = parse_f64(key, value)?;
                    if width <= 0.0 {
                        return Err(DrawerError::InvalidConfig(
                            "fallback-width must be positive".into(),
                        ));
                    }
                    config.fallback_width = width;
                }
                "fetch-timeout-ms" => {
                    let ms: u64 = value.parse().map_err(|_| {
                        DrawerError::InvalidConfig(format!(
                            "fetch-timeout-ms must be an integer, got {value:?}"
                        ))
                    })?;
                    config.fetch_timeout = Duration::from_millis(ms);
                }
                other => {
                    return Err(DrawerError::InvalidConfig(format!(
                        "unrecognized option {other:?}"
                    )));
                }
            }
        }

        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> DrawerResult<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(DrawerError::InvalidConfig(format!(
            "{key} must be \"true\" or \"false\", got {other:?}"
        ))),
    }
}

fn parse_f64(key: &str, value: &str) -> DrawerResult<f64> {
    value.parse().map_err(|_| {
        DrawerError::InvalidConfig(format!("{key} must be a number, got {value:?}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_attrs_give_defaults() {
        let config = DrawerConfig::from_attrs(&BTreeMap::new()).unwrap();
        assert_eq!(config, DrawerConfig::default());
        assert_eq!(config.cart_mode, CartMode::Drawer);
        assert!(!config.reduced_motion);
    }

    #[test]
    fn test_parses_recognized_options() {
        let config = DrawerConfig::from_attrs(&attrs(&[
            ("cart-type", "page"),
            ("reduced-motion", "true"),
            ("speed", "0.2"),
            ("fallback-width", "360"),
            ("fetch-timeout-ms", "4000"),
        ]))
        .unwrap();

        assert_eq!(config.cart_mode, CartMode::Page);
        assert!(config.reduced_motion);
        assert_eq!(config.speed, 0.2);
        assert_eq!(config.fallback_width, 360.0);
        assert_eq!(config.fetch_timeout, Duration::from_millis(4000));
    }

    #[test]
    fn test_unknown_key_is_a_bind_error() {
        let err = DrawerConfig::from_attrs(&attrs(&[("cart-typ", "drawer")])).unwrap_err();
        assert!(err.to_string().contains("cart-typ"));
    }

    #[test]
    fn test_bad_values_are_bind_errors() {
        assert!(DrawerConfig::from_attrs(&attrs(&[("cart-type", "modal")])).is_err());
        assert!(DrawerConfig::from_attrs(&attrs(&[("reduced-motion", "yes")])).is_err());
        assert!(DrawerConfig::from_attrs(&attrs(&[("speed", "-1")])).is_err());
        assert!(DrawerConfig::from_attrs(&attrs(&[("fetch-timeout-ms", "soon")])).is_err());
    }
}
