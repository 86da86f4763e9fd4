//! Game options with host and forced semantics.
//!
//! Options come in two shapes sharing one contract: a checkbox holds a
//! boolean, a choice holds the index of one of its items. Both remember the
//! value the host last picked (`host`) separately from the value in effect
//! (`current`) so a map can force an option temporarily and the host's pick
//! comes back when another map is selected.

use serde::{Deserialize, Serialize};

use crate::error::{LobbyError, Result};
use crate::ini::IniDocument;

/// Spawn file section that option values are written into.
pub const SETTINGS_SECTION: &str = "Settings";

/// How a checkbox affects ranked scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScoringEffect {
    /// No effect on scoring.
    #[default]
    None,
    /// Scoring is denied while the box is checked.
    DenyWhenSet,
    /// Scoring is denied while the box is unchecked.
    DenyWhenUnset,
}

/// Value held by an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionValue {
    /// Checkbox state.
    Bool(bool),
    /// Selected choice item.
    Choice(usize),
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Choice(i) => write!(f, "#{i}"),
        }
    }
}

/// Checkbox-specific data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckboxSpec {
    /// Key written to the spawn file, if any.
    #[serde(default)]
    pub spawn_key: Option<String>,
    /// Value written when checked.
    #[serde(default = "default_enabled_value")]
    pub enabled_value: String,
    /// Value written when unchecked.
    #[serde(default = "default_disabled_value")]
    pub disabled_value: String,
    /// Ranked scoring effect.
    #[serde(default)]
    pub scoring: ScoringEffect,
    /// Sides vetoed while checked.
    #[serde(default)]
    pub disallowed_sides: Vec<usize>,
    /// Map patch applied while checked.
    #[serde(default)]
    pub map_code: Option<IniDocument>,
}

fn default_enabled_value() -> String {
    "True".to_string()
}

fn default_disabled_value() -> String {
    "False".to_string()
}

impl Default for CheckboxSpec {
    fn default() -> Self {
        Self {
            spawn_key: None,
            enabled_value: default_enabled_value(),
            disabled_value: default_disabled_value(),
            scoring: ScoringEffect::None,
            disallowed_sides: Vec::new(),
            map_code: None,
        }
    }
}

/// One entry of a choice option.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoiceItem {
    /// Display label.
    pub label: String,
    /// Value written to the spawn file; the item index when absent.
    #[serde(default)]
    pub spawn_value: Option<String>,
    /// Sides vetoed while this item is selected.
    #[serde(default)]
    pub disallowed_sides: Vec<usize>,
    /// Map patch applied while this item is selected.
    #[serde(default)]
    pub map_code: Option<IniDocument>,
}

impl ChoiceItem {
    /// Item with just a label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Set the spawn value.
    #[must_use]
    pub fn with_spawn_value(mut self, value: impl Into<String>) -> Self {
        self.spawn_value = Some(value.into());
        self
    }

    /// Set the vetoed sides.
    #[must_use]
    pub fn with_disallowed_sides(mut self, sides: Vec<usize>) -> Self {
        self.disallowed_sides = sides;
        self
    }
}

/// Choice-specific data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoiceSpec {
    /// Key written to the spawn file, if any.
    #[serde(default)]
    pub spawn_key: Option<String>,
    /// Items in display order.
    pub items: Vec<ChoiceItem>,
}

/// The shape of an option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OptionKind {
    /// A boolean toggle.
    Checkbox(CheckboxSpec),
    /// A pick from a list.
    Choice(ChoiceSpec),
}

/// A single game option.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionControl {
    name: String,
    kind: OptionKind,
    current: OptionValue,
    host: OptionValue,
    allow_change: bool,
}

impl OptionControl {
    /// Create an option. The value must fit the kind.
    pub fn new(name: impl Into<String>, kind: OptionKind, value: OptionValue) -> Result<Self> {
        let name = name.into();
        if !kind_accepts(&kind, value) {
            return Err(LobbyError::InvalidOptionValue {
                name,
                value: value.to_string(),
            });
        }
        Ok(Self {
            name,
            kind,
            current: value,
            host: value,
            allow_change: true,
        })
    }

    /// Convenience constructor for a plain checkbox.
    #[must_use]
    pub fn checkbox(name: impl Into<String>, spec: CheckboxSpec, checked: bool) -> Self {
        Self {
            name: name.into(),
            kind: OptionKind::Checkbox(spec),
            current: OptionValue::Bool(checked),
            host: OptionValue::Bool(checked),
            allow_change: true,
        }
    }

    /// Option name (unique key).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Option shape.
    #[must_use]
    pub const fn kind(&self) -> &OptionKind {
        &self.kind
    }

    /// Value in effect.
    #[must_use]
    pub const fn value(&self) -> OptionValue {
        self.current
    }

    /// Value the host last chose.
    #[must_use]
    pub const fn host_value(&self) -> OptionValue {
        self.host
    }

    /// Whether participants may change the option (false while forced).
    #[must_use]
    pub const fn allow_change(&self) -> bool {
        self.allow_change
    }

    /// Checkbox state; `None` for choices.
    #[must_use]
    pub const fn checked(&self) -> Option<bool> {
        match self.current {
            OptionValue::Bool(b) => Some(b),
            OptionValue::Choice(_) => None,
        }
    }

    /// Selected item; `None` for checkboxes.
    #[must_use]
    pub const fn selected(&self) -> Option<usize> {
        match self.current {
            OptionValue::Choice(i) => Some(i),
            OptionValue::Bool(_) => None,
        }
    }

    /// Whether `value` fits this option's kind and range.
    #[must_use]
    pub fn accepts(&self, value: OptionValue) -> bool {
        kind_accepts(&self.kind, value)
    }

    /// Change the option as the host. Updates both current and host values.
    pub fn set_value(&mut self, value: OptionValue) -> Result<()> {
        if !self.allow_change {
            return Err(LobbyError::OptionLocked(self.name.clone()));
        }
        if !self.accepts(value) {
            return Err(LobbyError::InvalidOptionValue {
                name: self.name.clone(),
                value: value.to_string(),
            });
        }
        self.current = value;
        self.host = value;
        Ok(())
    }

    /// Change the value in effect without recording it as the host's pick.
    ///
    /// Used for saved-settings restore and presets.
    pub fn set_current(&mut self, value: OptionValue) -> Result<()> {
        if !self.accepts(value) {
            return Err(LobbyError::InvalidOptionValue {
                name: self.name.clone(),
                value: value.to_string(),
            });
        }
        self.current = value;
        Ok(())
    }

    /// Lock the option to a forced value.
    pub fn apply_forced(&mut self, value: OptionValue) -> Result<()> {
        if !self.accepts(value) {
            return Err(LobbyError::InvalidOptionValue {
                name: self.name.clone(),
                value: value.to_string(),
            });
        }
        self.current = value;
        self.allow_change = false;
        Ok(())
    }

    /// Unlock the option and return it to the host's value.
    pub fn restore_host(&mut self) {
        self.current = self.host;
        self.allow_change = true;
    }

    /// Whether the current state disqualifies ranked scoring.
    #[must_use]
    pub fn denies_scoring(&self) -> bool {
        let OptionKind::Checkbox(spec) = &self.kind else {
            return false;
        };
        let checked = self.checked().unwrap_or(false);
        match spec.scoring {
            ScoringEffect::None => false,
            ScoringEffect::DenyWhenSet => checked,
            ScoringEffect::DenyWhenUnset => !checked,
        }
    }

    /// Mark the sides this option currently vetoes. Out-of-range sides are
    /// ignored.
    pub fn apply_side_vetoes(&self, disallowed: &mut [bool]) {
        let sides: &[usize] = match (&self.kind, self.current) {
            (OptionKind::Checkbox(spec), OptionValue::Bool(true)) => &spec.disallowed_sides,
            (OptionKind::Choice(spec), OptionValue::Choice(i)) => spec
                .items
                .get(i)
                .map_or(&[][..], |item| item.disallowed_sides.as_slice()),
            _ => &[],
        };
        for &side in sides {
            if let Some(slot) = disallowed.get_mut(side) {
                *slot = true;
            }
        }
    }

    /// Write this option's spawn file entry.
    pub fn write_spawn(&self, ini: &mut IniDocument) {
        match (&self.kind, self.current) {
            (OptionKind::Checkbox(spec), OptionValue::Bool(checked)) => {
                if let Some(key) = &spec.spawn_key {
                    let value = if checked {
                        &spec.enabled_value
                    } else {
                        &spec.disabled_value
                    };
                    ini.set(SETTINGS_SECTION, key.clone(), value.clone());
                }
            }
            (OptionKind::Choice(spec), OptionValue::Choice(i)) => {
                if let Some(key) = &spec.spawn_key {
                    let value = spec
                        .items
                        .get(i)
                        .and_then(|item| item.spawn_value.clone())
                        .unwrap_or_else(|| i.to_string());
                    ini.set(SETTINGS_SECTION, key.clone(), value);
                }
            }
            _ => {}
        }
    }

    /// Merge this option's map patch into the map geometry.
    pub fn apply_map_code(&self, map: &mut IniDocument) {
        let patch = match (&self.kind, self.current) {
            (OptionKind::Checkbox(spec), OptionValue::Bool(true)) => spec.map_code.as_ref(),
            (OptionKind::Choice(spec), OptionValue::Choice(i)) => {
                spec.items.get(i).and_then(|item| item.map_code.as_ref())
            }
            _ => None,
        };
        if let Some(patch) = patch {
            map.merge(patch);
        }
    }
}

fn kind_accepts(kind: &OptionKind, value: OptionValue) -> bool {
    match (kind, value) {
        (OptionKind::Checkbox(_), OptionValue::Bool(_)) => true,
        (OptionKind::Choice(spec), OptionValue::Choice(i)) => i < spec.items.len(),
        _ => false,
    }
}

/// The session's options, keyed by unique name, in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSet {
    options: Vec<OptionControl>,
}

impl OptionSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option. Names must be unique.
    pub fn insert(&mut self, option: OptionControl) -> Result<()> {
        if self.get(option.name()).is_some() {
            return Err(LobbyError::InvalidOptionValue {
                name: option.name().to_string(),
                value: "duplicate option name".to_string(),
            });
        }
        self.options.push(option);
        Ok(())
    }

    /// Look up an option.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OptionControl> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Look up an option mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut OptionControl> {
        self.options.iter_mut().find(|o| o.name == name)
    }

    /// Iterate in display order.
    pub fn iter(&self) -> impl Iterator<Item = &OptionControl> {
        self.options.iter()
    }

    /// Iterate mutably in display order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut OptionControl> {
        self.options.iter_mut()
    }

    /// Number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Whether the named checkbox exists and is checked.
    #[must_use]
    pub fn is_checked(&self, name: &str) -> bool {
        self.get(name).and_then(OptionControl::checked).unwrap_or(false)
    }

    /// Host change of a named option.
    pub fn set_value(&mut self, name: &str, value: OptionValue) -> Result<()> {
        self.get_mut(name)
            .ok_or_else(|| LobbyError::UnknownOption(name.to_string()))?
            .set_value(value)
    }

    /// Whether any option currently disqualifies ranked scoring.
    #[must_use]
    pub fn denies_scoring(&self) -> bool {
        self.options.iter().any(OptionControl::denies_scoring)
    }

    /// Mark the sides vetoed by any option.
    pub fn apply_side_vetoes(&self, disallowed: &mut [bool]) {
        for option in &self.options {
            option.apply_side_vetoes(disallowed);
        }
    }

    /// Write every option's spawn file entry.
    pub fn write_spawn(&self, ini: &mut IniDocument) {
        for option in &self.options {
            option.write_spawn(ini);
        }
    }

    /// Apply every option's map patch.
    pub fn apply_map_code(&self, map: &mut IniDocument) {
        for option in &self.options {
            option.apply_map_code(map);
        }
    }
}
