//! Scenario and variable records edited by the session.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const MIN_VALUE: i32 = 0;
pub const MAX_VALUE: i32 = 100;
pub const DEFAULT_VALUE: i32 = 50;

/// Preset factors a scenario starts with in additive mode: (label, weight).
const ADDITIVE_PRESETS: [(&str, i32); 3] = [
    ("Public pressure", 10),
    ("Legal deadline passed", 15),
    ("Media coverage", 5),
];

/// Which variant of the odds formula is in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ScoringMode {
    /// Active weights are added to an even-odds baseline of 50.
    Additive,
    /// Values of variables with pressure are averaged.
    Pressure,
    /// Values of variables with pressure that are also impactful are averaged.
    #[default]
    Weighted,
}

impl ScoringMode {
    /// Whether `variable` belongs to the contributing set under this mode.
    pub fn contributes(self, variable: &Variable) -> bool {
        match self {
            Self::Additive | Self::Pressure => variable.has_pressure,
            Self::Weighted => variable.has_pressure && variable.impactful,
        }
    }

    /// Flags that can be toggled from a front-end under this mode.
    pub fn flags(self) -> &'static [Flag] {
        match self {
            Self::Additive | Self::Pressure => &[Flag::Pressure],
            Self::Weighted => &[Flag::Pressure, Flag::Impactful],
        }
    }

    /// Whether a variable's value can be edited (the slider is shown).
    /// Active variables get one in every mode, including additive weights.
    pub fn shows_slider(self, variable: &Variable) -> bool {
        variable.has_pressure
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Additive => "additive",
            Self::Pressure => "pressure",
            Self::Weighted => "weighted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// `hasPressure`; shown as "active" in additive mode.
    Pressure,
    Impactful,
}

impl Flag {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "pressure" | "active" | "p" => Some(Self::Pressure),
            "impact" | "impactful" | "i" => Some(Self::Impactful),
            _ => None,
        }
    }

    pub fn label(self, mode: ScoringMode) -> &'static str {
        match (self, mode) {
            (Self::Pressure, ScoringMode::Additive) => "active",
            (Self::Pressure, _) => "pressure",
            (Self::Impactful, _) => "impactful",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub label: String,
    pub value: i32,
    pub has_pressure: bool,
    pub impactful: bool,
}

impl Default for Variable {
    fn default() -> Self {
        Self {
            label: String::new(),
            value: DEFAULT_VALUE,
            has_pressure: true,
            impactful: true,
        }
    }
}

impl Variable {
    pub fn new(label: impl Into<String>, value: i32) -> Self {
        Self {
            label: label.into(),
            value,
            ..Self::default()
        }
    }

    pub fn flag(&self, flag: Flag) -> bool {
        match flag {
            Flag::Pressure => self.has_pressure,
            Flag::Impactful => self.impactful,
        }
    }

    pub fn toggle(&mut self, flag: Flag) {
        match flag {
            Flag::Pressure => self.has_pressure = !self.has_pressure,
            Flag::Impactful => self.impactful = !self.impactful,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scenario {
    pub title: String,
    pub variables: Vec<Variable>,
}

impl Scenario {
    /// A fresh scenario as the "Add Scenario" button creates it.
    pub fn new(mode: ScoringMode) -> Self {
        let variables = match mode {
            ScoringMode::Additive => ADDITIVE_PRESETS
                .iter()
                .map(|&(label, weight)| Variable {
                    has_pressure: false,
                    ..Variable::new(label, weight)
                })
                .collect(),
            ScoringMode::Pressure | ScoringMode::Weighted => Vec::new(),
        };
        Self {
            title: String::new(),
            variables,
        }
    }

    /// Title for display, falling back to a numbered placeholder.
    pub fn display_title(&self, index: usize) -> String {
        if self.title.trim().is_empty() {
            format!("Scenario #{}", index + 1)
        } else {
            self.title.clone()
        }
    }
}

/// Coerce free-form numeric input, degrading to 0 for anything unparsable.
pub fn coerce_value(raw: &str) -> i32 {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i32>() {
        return value;
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => truncate(value),
        _ => 0,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn truncate(value: f64) -> i32 {
    value
        .trunc()
        .clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

/// Clamp a value into the slider range.
pub fn clamp_value(value: i32) -> i32 {
    value.clamp(MIN_VALUE, MAX_VALUE)
}
