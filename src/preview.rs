//! Derived dropdown and badge preview of a stage list.
//!
//! The preview is rebuilt from scratch on every edit; nothing here is
//! incremental.

use serde::Serialize;

use crate::model::Stage;

pub const PLACEHOLDER_OPTION: &str = "Current: NA";

pub const BLACK: &str = "#000000";
pub const WHITE: &str = "#ffffff";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DropdownOption {
    pub value: String,
    pub text: String,
    pub disabled: bool,
    pub background: Option<String>,
    pub color: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub text: String,
    pub class: String,
    pub background: String,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub dropdown: Vec<DropdownOption>,
    pub badges: Vec<Badge>,
}

pub fn to_preview(stages: &[Stage]) -> Preview {
    let mut dropdown = Vec::with_capacity(stages.len() + 1);
    dropdown.push(DropdownOption {
        value: String::new(),
        text: PLACEHOLDER_OPTION.to_string(),
        disabled: true,
        background: None,
        color: None,
    });
    dropdown.extend(stages.iter().map(|s| DropdownOption {
        value: s.value.clone(),
        text: s.label.clone(),
        disabled: false,
        background: Some(s.background.clone()),
        color: Some(contrast_color(&s.background).to_string()),
    }));

    let badges = stages
        .iter()
        .map(|s| Badge {
            text: s.label.clone(),
            class: format!("badge me-2 {}", s.badge_class),
            background: s.background.clone(),
            color: contrast_color(&s.background).to_string(),
        })
        .collect();

    Preview { dropdown, badges }
}

/// Relative luminance of a `#rrggbb` colour, in `0.0..=1.0`, or `None` when
/// any channel is not hex.
pub fn luminance(hex: &str) -> Option<f64> {
    let (r, g, b) = rgb(hex)?;
    Some((0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)) / 255.0)
}

/// Black text on light backgrounds, white otherwise. Exactly 0.5 is white,
/// and so is anything that does not parse.
pub fn contrast_color(hex: &str) -> &'static str {
    luminance(hex).map_or(WHITE, contrast_for_luminance)
}

fn contrast_for_luminance(luminance: f64) -> &'static str {
    if luminance > 0.5 { BLACK } else { WHITE }
}

/// Splits `#rrggbb` into channels.
pub fn rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
    };
    Some((channel(1..3)?, channel(3..5)?, channel(5..7)?))
}

#[cfg(test)]
#[path = "tests/preview_tests.rs"]
mod tests;
