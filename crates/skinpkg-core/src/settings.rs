//! Accent color and LED settings, and their on-disk text formats.
//!
//! Accents use flat `key=value` lines (`color1`..`color6`). LED settings use
//! INI-style sections, one per zone:
//!
//! ```text
//! [F1 key]
//! effect=1
//! color1=0xFFFFFF
//! color2=0x000000
//! speed=1000
//! brightness=100
//! trigger=1
//! inbrightness=100
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while parsing settings text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// A required key is absent.
    #[error("missing key '{0}'")]
    MissingKey(String),
    /// None of `color1`..`color6` is present.
    #[error("no accent color keys found")]
    NoAccentColors,
    /// A required INI section is absent.
    #[error("missing section '[{0}]'")]
    MissingSection(String),
    /// An integer field could not be parsed.
    #[error("invalid integer for '{key}': '{value}'")]
    InvalidInteger {
        /// Key whose value failed to parse.
        key: String,
        /// Raw value.
        value: String,
    },
}

/// Keys of the six accent color slots, in file order.
pub const ACCENT_KEYS: [&str; 6] = ["color1", "color2", "color3", "color4", "color5", "color6"];

/// The six accent color slots, stored as the string encoding found in the
/// file. A package may set only some of them; unset slots leave the device
/// value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccentColors {
    /// Main UI color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color1: Option<String>,
    /// Primary accent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color2: Option<String>,
    /// Secondary accent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color3: Option<String>,
    /// List text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color4: Option<String>,
    /// Selected list text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color5: Option<String>,
    /// Hint text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color6: Option<String>,
}

impl AccentColors {
    /// Values paired with their file keys, in file order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, Option<&str>); 6] {
        [
            (ACCENT_KEYS[0], self.color1.as_deref()),
            (ACCENT_KEYS[1], self.color2.as_deref()),
            (ACCENT_KEYS[2], self.color3.as_deref()),
            (ACCENT_KEYS[3], self.color4.as_deref()),
            (ACCENT_KEYS[4], self.color5.as_deref()),
            (ACCENT_KEYS[5], self.color6.as_deref()),
        ]
    }

    /// Only the slots that are set, in file order.
    pub fn present(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries()
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
    }

    fn slot_mut(&mut self, idx: usize) -> Option<&mut Option<String>> {
        Some(match idx {
            0 => &mut self.color1,
            1 => &mut self.color2,
            2 => &mut self.color3,
            3 => &mut self.color4,
            4 => &mut self.color5,
            5 => &mut self.color6,
            _ => return None,
        })
    }
}

/// Iterate `key=value` pairs of `text`, trimming both sides and skipping
/// blank lines, comments and lines without `=`.
fn key_values(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.lines().filter_map(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            return None;
        }
        let (k, v) = line.split_once('=')?;
        Some((k.trim(), v.trim()))
    })
}

fn accent_index(key: &str) -> Option<usize> {
    ACCENT_KEYS.iter().position(|k| *k == key)
}

/// Parse accent colors from `minuisettings.txt` text.
///
/// Unknown keys are ignored; the last occurrence of a key wins. Keys that are
/// absent stay unset.
///
/// # Errors
///
/// Returns [`SettingsError::NoAccentColors`] if none of `color1`..`color6`
/// is present.
pub fn parse_accents(text: &str) -> Result<AccentColors, SettingsError> {
    let mut accents = AccentColors::default();
    for (key, value) in key_values(text) {
        if let Some(slot) = accent_index(key).and_then(|idx| accents.slot_mut(idx)) {
            *slot = Some(value.to_owned());
        }
    }
    if accents.present().next().is_none() {
        return Err(SettingsError::NoAccentColors);
    }
    Ok(accents)
}

/// Render the set accent colors as `key=value` lines.
#[must_use]
pub fn format_accents(accents: &AccentColors) -> String {
    accents.present().map(|(k, v)| format!("{k}={v}\n")).collect()
}

/// Replace the set accent keys in an existing `minuisettings.txt`, keeping
/// every other line in place, including accent keys the package leaves
/// unset. Set keys missing from `existing` are appended.
#[must_use]
pub fn merge_accents(existing: &str, accents: &AccentColors) -> String {
    let entries = accents.entries();
    let mut written = [false; 6];
    let mut out = String::with_capacity(existing.len() + 96);

    for line in existing.lines() {
        let key = line.split_once('=').map(|(k, _)| k.trim());
        match key.and_then(accent_index) {
            Some(idx) if entries[idx].1.is_some() => {
                if !written[idx] {
                    let (k, v) = entries[idx];
                    out.push_str(&format!("{k}={}\n", v.unwrap_or_default()));
                    written[idx] = true;
                }
                // Duplicates of a replaced key are dropped.
            }
            _ => {
                out.push_str(line);
                out.push('\n');
            }
        }
    }

    for (idx, (k, v)) in entries.iter().enumerate() {
        if let (false, Some(v)) = (written[idx], v) {
            out.push_str(&format!("{k}={v}\n"));
        }
    }
    out
}

/// One LED zone of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedZone {
    /// F1 key light.
    F1Key,
    /// F2 key light.
    F2Key,
    /// Top bar light strip.
    TopBar,
    /// Shoulder trigger lights.
    LrTriggers,
}

impl LedZone {
    /// All zones in file order.
    pub const ALL: [LedZone; 4] = [
        LedZone::F1Key,
        LedZone::F2Key,
        LedZone::TopBar,
        LedZone::LrTriggers,
    ];

    /// INI section header text (without brackets).
    #[must_use]
    pub fn section(self) -> &'static str {
        match self {
            LedZone::F1Key => "F1 key",
            LedZone::F2Key => "F2 key",
            LedZone::TopBar => "Top bar",
            LedZone::LrTriggers => "L&R triggers",
        }
    }

    fn from_section(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|z| z.section() == name)
    }
}

/// Lighting configuration of one zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedSetting {
    /// Effect code.
    pub effect: i32,
    /// Primary color.
    pub color1: String,
    /// Secondary color.
    pub color2: String,
    /// Animation speed.
    pub speed: i32,
    /// Brightness.
    pub brightness: i32,
    /// Trigger code.
    pub trigger: i32,
    /// In-game brightness.
    pub in_brightness: i32,
}

/// LED settings for all four zones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedSettings {
    /// `[F1 key]`.
    pub f1_key: LedSetting,
    /// `[F2 key]`.
    pub f2_key: LedSetting,
    /// `[Top bar]`.
    pub top_bar: LedSetting,
    /// `[L&R triggers]`.
    pub lr_triggers: LedSetting,
}

impl LedSettings {
    /// Settings of `zone`.
    #[must_use]
    pub fn zone(&self, zone: LedZone) -> &LedSetting {
        match zone {
            LedZone::F1Key => &self.f1_key,
            LedZone::F2Key => &self.f2_key,
            LedZone::TopBar => &self.top_bar,
            LedZone::LrTriggers => &self.lr_triggers,
        }
    }

    fn zone_mut(&mut self, zone: LedZone) -> &mut LedSetting {
        match zone {
            LedZone::F1Key => &mut self.f1_key,
            LedZone::F2Key => &mut self.f2_key,
            LedZone::TopBar => &mut self.top_bar,
            LedZone::LrTriggers => &mut self.lr_triggers,
        }
    }
}

fn parse_int(key: &str, value: &str) -> Result<i32, SettingsError> {
    value.parse().map_err(|_| SettingsError::InvalidInteger {
        key: key.to_owned(),
        value: value.to_owned(),
    })
}

/// Parse `ledsettings_brick.txt` text.
///
/// Unknown sections and keys (such as `filename`) are ignored. Integer keys
/// missing inside a present section keep their default value.
///
/// # Errors
///
/// Returns [`SettingsError::MissingSection`] if any zone section is absent,
/// [`SettingsError::MissingKey`] if a zone has no `color1` or `color2`, or
/// [`SettingsError::InvalidInteger`] if an integer field does not parse.
pub fn parse_leds(text: &str) -> Result<LedSettings, SettingsError> {
    let mut leds = LedSettings::default();
    let mut seen = [false; 4];
    // Per zone: color1, color2 present.
    let mut colors = [[false; 2]; 4];
    let mut current: Option<LedZone> = None;

    for line in text.lines() {
        let line = line.trim();
        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            current = LedZone::from_section(header.trim());
            if let Some(zone) = current {
                seen[zone as usize] = true;
            }
            continue;
        }
        let Some(zone) = current else { continue };
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        let setting = leds.zone_mut(zone);
        match key {
            "effect" => setting.effect = parse_int(key, value)?,
            "color1" => {
                setting.color1 = value.to_owned();
                colors[zone as usize][0] = true;
            }
            "color2" => {
                setting.color2 = value.to_owned();
                colors[zone as usize][1] = true;
            }
            "speed" => setting.speed = parse_int(key, value)?,
            "brightness" => setting.brightness = parse_int(key, value)?,
            "trigger" => setting.trigger = parse_int(key, value)?,
            "inbrightness" => setting.in_brightness = parse_int(key, value)?,
            _ => {}
        }
    }

    for zone in LedZone::ALL {
        if !seen[zone as usize] {
            return Err(SettingsError::MissingSection(zone.section().to_owned()));
        }
        for (key, present) in ["color1", "color2"].into_iter().zip(colors[zone as usize]) {
            if !present {
                return Err(SettingsError::MissingKey(format!("[{}] {key}", zone.section())));
            }
        }
    }
    Ok(leds)
}

/// Render LED settings in the INI-style device format.
#[must_use]
pub fn format_leds(leds: &LedSettings) -> String {
    let mut out = String::new();
    for (i, zone) in LedZone::ALL.into_iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let s = leds.zone(zone);
        out.push_str(&format!("[{}]\n", zone.section()));
        out.push_str(&format!("effect={}\n", s.effect));
        out.push_str(&format!("color1={}\ncolor2={}\n", s.color1, s.color2));
        out.push_str(&format!("speed={}\n", s.speed));
        out.push_str(&format!("brightness={}\n", s.brightness));
        out.push_str(&format!("trigger={}\n", s.trigger));
        out.push_str(&format!("inbrightness={}\n", s.in_brightness));
    }
    out
}
