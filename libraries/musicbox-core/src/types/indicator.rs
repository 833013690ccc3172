//! Appearance of the progress indicator (a boss bar on the host)

use serde::{Deserialize, Serialize};

/// Indicator bar colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BarColor {
    Pink,
    #[default]
    Blue,
    Red,
    Green,
    Yellow,
    Purple,
    White,
}

/// Indicator bar segmentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BarStyle {
    #[default]
    Solid,
    #[serde(rename = "SEGMENTED_6")]
    Segmented6,
    #[serde(rename = "SEGMENTED_10")]
    Segmented10,
    #[serde(rename = "SEGMENTED_12")]
    Segmented12,
    #[serde(rename = "SEGMENTED_20")]
    Segmented20,
}

/// Look of a newly created indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndicatorStyle {
    #[serde(default)]
    pub color: BarColor,
    #[serde(default)]
    pub style: BarStyle,
}
