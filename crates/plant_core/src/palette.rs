//! Display colors and the keyed label → color palette.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A CSS hex color such as `#4CAF50`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    pub const GREEN: &'static str = "#4CAF50";
    pub const AMBER: &'static str = "#FF9800";
    pub const RED: &'static str = "#F44336";
    pub const NEUTRAL: &'static str = "#9E9E9E";

    pub fn parse(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        let valid_len = matches!(digits.len(), 3 | 6 | 8);
        if valid_len && digits.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(Self(format!("#{}", digits.to_ascii_uppercase())))
        } else {
            None
        }
    }

    pub fn green() -> Self {
        Self(Self::GREEN.to_string())
    }

    pub fn amber() -> Self {
        Self(Self::AMBER.to_string())
    }

    pub fn red() -> Self {
        Self(Self::RED.to_string())
    }

    pub fn neutral() -> Self {
        Self(Self::NEUTRAL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Same color with an alpha suffix, used for tinted backgrounds.
    pub fn tint(&self) -> String {
        if self.0.len() == 7 {
            format!("{}22", self.0)
        } else {
            self.0.clone()
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value).ok_or_else(|| format!("not a hex color: {value}"))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

/// Colors handed out to labels that configuration did not color explicitly.
const CYCLE: [&str; 8] = [
    Color::GREEN,
    Color::AMBER,
    Color::RED,
    "#2196F3",
    "#9C27B0",
    "#795548",
    "#009688",
    "#607D8B",
];

/// Label → color mapping fixed at configuration time.
///
/// Lookups are by name, so the order of the backend's class list does not
/// matter and an unknown label falls back to a neutral color.
#[derive(Debug, Clone)]
pub struct ClassPalette {
    labels: Vec<String>,
    colors: HashMap<String, Color>,
    fallback: Color,
}

impl ClassPalette {
    /// Build from `(label, optional color)` pairs; uncolored labels take the
    /// next color of the cycle by their position.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<Color>)>,
        S: Into<String>,
    {
        let mut labels = Vec::new();
        let mut colors = HashMap::new();
        for (idx, (label, color)) in entries.into_iter().enumerate() {
            let label = label.into();
            if colors.contains_key(&label) {
                tracing::warn!("duplicate class label `{label}` in palette, keeping the first");
                continue;
            }
            let color = color.unwrap_or_else(|| Color(CYCLE[idx % CYCLE.len()].to_string()));
            labels.push(label.clone());
            colors.insert(label, color);
        }
        Self {
            labels,
            colors,
            fallback: Color::neutral(),
        }
    }

    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(labels.into_iter().map(|l| (l, None)))
    }

    pub fn color_for(&self, label: &str) -> &Color {
        self.colors.get(label).unwrap_or(&self.fallback)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.colors.contains_key(label)
    }

    /// Labels in configuration order, which is also the order of the class probabilities.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn fallback(&self) -> &Color {
        &self.fallback
    }
}

impl Default for ClassPalette {
    fn default() -> Self {
        Self::new([
            ("Saludable", Some(Color::green())),
            ("Enferma", Some(Color::amber())),
            ("Muerta", Some(Color::red())),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_matches_health_classes() {
        let palette = ClassPalette::default();
        assert_eq!(palette.color_for("Saludable").as_str(), Color::GREEN);
        assert_eq!(palette.color_for("Enferma").as_str(), Color::AMBER);
        assert_eq!(palette.color_for("Muerta").as_str(), Color::RED);
    }

    #[test]
    fn unknown_label_gets_fallback_instead_of_failing() {
        let palette = ClassPalette::default();
        assert_eq!(palette.color_for("Marchita"), &Color::neutral());
        assert!(!palette.contains("Marchita"));
    }

    #[test]
    fn uncolored_labels_cycle_through_defaults() {
        let labels: Vec<String> = (0..10).map(|i| format!("c{i}")).collect();
        let palette = ClassPalette::from_labels(labels);
        assert_eq!(palette.color_for("c0").as_str(), Color::GREEN);
        assert_eq!(palette.color_for("c8").as_str(), Color::GREEN);
        assert_eq!(palette.labels().len(), 10);
    }

    #[test]
    fn duplicate_labels_keep_first_color() {
        let palette = ClassPalette::new([
            ("Sana", Some(Color::green())),
            ("Sana", Some(Color::red())),
        ]);
        assert_eq!(palette.color_for("Sana"), &Color::green());
        assert_eq!(palette.labels(), ["Sana".to_string()]);
    }

    #[test]
    fn color_parse_normalizes_and_rejects() {
        assert_eq!(Color::parse("#4caf50").unwrap().as_str(), "#4CAF50");
        assert!(Color::parse("4CAF50").is_none());
        assert!(Color::parse("#12345G").is_none());
        assert_eq!(Color::green().tint(), "#4CAF5022");
    }
}
