use scene::Color;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub const DEFAULT_DATA_SOURCES: [&str; 3] = [
    "/world-110m.json",
    "https://unpkg.com/world-atlas@1/world/110m.json",
    "https://raw.githubusercontent.com/holtzy/D3-graph-gallery/master/DATA/world.geojson",
];

/// Widget options as handed in by the host page. Immutable once the widget
/// is built.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobeConfig {
    /// CSS width of the container.
    pub width: String,
    /// CSS height of the container.
    pub height: String,
    pub ocean_color: Color,
    pub dot_color: Color,
    pub glow_color: Color,
    /// Clear with alpha 0 so the page shows through.
    pub transparent: bool,
    pub dot_size: f64,
    pub auto_rotate: bool,
    /// Starting yaw in degrees.
    pub initial_longitude: Option<f64>,
    /// Radians per second.
    pub rotation_speed: f64,
    pub data_sources: Vec<String>,
}

const KNOWN_KEYS: [&str; 11] = [
    "width",
    "height",
    "oceanColor",
    "dotColor",
    "glowColor",
    "transparent",
    "dotSize",
    "autoRotate",
    "initialLongitude",
    "rotationSpeed",
    "dataSources",
];

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            width: "100%".to_string(),
            height: "100vh".to_string(),
            ocean_color: Color::from_hex_u32(0x001a1a),
            dot_color: Color::from_hex_u32(0x00ff88),
            glow_color: Color::from_hex_u32(0x00ff88),
            transparent: true,
            dot_size: 2.0,
            auto_rotate: true,
            initial_longitude: None,
            rotation_speed: 0.1,
            data_sources: DEFAULT_DATA_SOURCES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A host option that was present but unusable; its default was kept.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigWarning {
    /// camelCase option name, or `"options"` when the whole payload was bad.
    pub key: &'static str,
    pub reason: String,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}; using default", self.key, self.reason)
    }
}

/// Options together with every problem found while reading them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedConfig {
    pub config: GlobeConfig,
    pub warnings: Vec<ConfigWarning>,
}

fn read_field<T: DeserializeOwned>(
    options: &Map<String, Value>,
    key: &'static str,
    slot: &mut T,
    warnings: &mut Vec<ConfigWarning>,
) {
    let Some(value) = options.get(key) else {
        return;
    };
    match T::deserialize(value) {
        Ok(parsed) => *slot = parsed,
        Err(e) => warnings.push(ConfigWarning {
            key,
            reason: e.to_string(),
        }),
    }
}

fn check_positive(key: &'static str, slot: &mut f64, default: f64, warnings: &mut Vec<ConfigWarning>) {
    if !(slot.is_finite() && *slot > 0.0) {
        warnings.push(ConfigWarning {
            key,
            reason: format!("expected a positive number, got {slot}"),
        });
        *slot = default;
    }
}

impl GlobeConfig {
    /// Reads host options leniently. Each camelCase key is parsed on its own;
    /// a key that fails keeps its default and adds a warning. An empty or
    /// whitespace-only string means defaults. Unknown keys are ignored.
    pub fn parse(json: &str) -> ParsedConfig {
        let mut parsed = ParsedConfig::default();
        if json.trim().is_empty() {
            return parsed;
        }
        let options = match serde_json::from_str::<Value>(json) {
            Ok(Value::Object(options)) => options,
            Ok(other) => {
                parsed.warnings.push(ConfigWarning {
                    key: "options",
                    reason: format!("expected a JSON object, got {other}"),
                });
                return parsed;
            }
            Err(e) => {
                parsed.warnings.push(ConfigWarning {
                    key: "options",
                    reason: e.to_string(),
                });
                return parsed;
            }
        };

        let defaults = GlobeConfig::default();
        let cfg = &mut parsed.config;
        let warnings = &mut parsed.warnings;
        read_field(&options, "width", &mut cfg.width, warnings);
        read_field(&options, "height", &mut cfg.height, warnings);
        read_field(&options, "oceanColor", &mut cfg.ocean_color, warnings);
        read_field(&options, "dotColor", &mut cfg.dot_color, warnings);
        read_field(&options, "glowColor", &mut cfg.glow_color, warnings);
        read_field(&options, "transparent", &mut cfg.transparent, warnings);
        read_field(&options, "dotSize", &mut cfg.dot_size, warnings);
        read_field(&options, "autoRotate", &mut cfg.auto_rotate, warnings);
        read_field(&options, "initialLongitude", &mut cfg.initial_longitude, warnings);
        read_field(&options, "rotationSpeed", &mut cfg.rotation_speed, warnings);
        read_field(&options, "dataSources", &mut cfg.data_sources, warnings);

        check_positive("dotSize", &mut cfg.dot_size, defaults.dot_size, warnings);
        if !cfg.rotation_speed.is_finite() {
            cfg.rotation_speed = defaults.rotation_speed;
        }
        if cfg.initial_longitude.is_some_and(|lon| !lon.is_finite()) {
            cfg.initial_longitude = None;
        }

        for key in options.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                debug!(key = %key, "ignoring unknown globe option");
            }
        }
        for w in &parsed.warnings {
            warn!(key = w.key, reason = %w.reason, "invalid globe option");
        }
        parsed
    }

    pub fn initial_yaw_rad(&self) -> f64 {
        self.initial_longitude.unwrap_or(0.0).to_radians()
    }

    /// World-space size of a boundary dot before pulsing.
    pub fn base_point_size(&self) -> f32 {
        (self.dot_size * 0.008) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_DATA_SOURCES, GlobeConfig};
    use scene::Color;

    #[test]
    fn empty_json_is_default() {
        for input in ["", "  ", "{}"] {
            let parsed = GlobeConfig::parse(input);
            assert_eq!(parsed.config, GlobeConfig::default());
            assert!(parsed.warnings.is_empty());
        }
    }

    #[test]
    fn camel_case_keys_override_defaults() {
        let parsed = GlobeConfig::parse(
            r##"{ "dotColor": "#f00", "dotSize": 3, "autoRotate": false,
                  "initialLongitude": -90, "dataSources": ["/a.json"],
                  "oceanColor": 6728 }"##,
        );
        assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
        let cfg = parsed.config;
        assert_eq!(cfg.dot_color, Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(cfg.ocean_color, Color::from_hex_u32(0x001a48));
        assert_eq!(cfg.dot_size, 3.0);
        assert!(!cfg.auto_rotate);
        assert!((cfg.initial_yaw_rad() + std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(cfg.data_sources, vec!["/a.json".to_string()]);
        assert!(cfg.transparent);
        assert_eq!(cfg.rotation_speed, 0.1);
    }

    #[test]
    fn defaults_match_widget_look() {
        let cfg = GlobeConfig::default();
        assert_eq!(cfg.data_sources.len(), DEFAULT_DATA_SOURCES.len());
        assert_eq!(cfg.data_sources[0], "/world-110m.json");
        assert!((cfg.base_point_size() - 0.016).abs() < 1e-6);
        assert_eq!(cfg.initial_yaw_rad(), 0.0);
    }

    #[test]
    fn bad_fields_fall_back_one_by_one() {
        let parsed = GlobeConfig::parse(
            r##"{ "oceanColor": "teal-ish", "dotColor": null, "dotSize": "2",
                  "glowColor": "#123456", "autoRotate": false, "mystery": 1 }"##,
        );
        let defaults = GlobeConfig::default();
        let keys: Vec<_> = parsed.warnings.iter().map(|w| w.key).collect();
        assert_eq!(keys, vec!["oceanColor", "dotColor", "dotSize"]);
        assert_eq!(parsed.config.ocean_color, defaults.ocean_color);
        assert_eq!(parsed.config.dot_color, defaults.dot_color);
        assert_eq!(parsed.config.dot_size, defaults.dot_size);
        assert_eq!(parsed.config.glow_color, Color::from_hex_u32(0x123456));
        assert!(!parsed.config.auto_rotate);
        assert!(parsed.warnings[0].to_string().ends_with("using default"));
    }

    #[test]
    fn non_positive_dot_size_is_replaced() {
        let parsed = GlobeConfig::parse(r#"{ "dotSize": -1 }"#);
        assert_eq!(parsed.config.dot_size, 2.0);
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].key, "dotSize");
    }

    #[test]
    fn unusable_payload_means_defaults_with_one_warning() {
        for input in ["{not json", "[1, 2]", "\"hello\"", "null"] {
            let parsed = GlobeConfig::parse(input);
            assert_eq!(parsed.config, GlobeConfig::default(), "{input}");
            assert_eq!(parsed.warnings.len(), 1, "{input}");
            assert_eq!(parsed.warnings[0].key, "options");
        }
    }

    #[test]
    fn null_longitude_means_unset() {
        let parsed = GlobeConfig::parse(r#"{ "initialLongitude": null }"#);
        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.config.initial_longitude, None);
    }
}
