//! Persisted lobby settings.
//!
//! Stored as a flat INI file:
//!
//! ```text
//! [Player]
//! Info=name,side,start,color,team,ai_level,is_ai
//! [AIPlayers]
//! 0=...
//! [Settings]
//! Map=<map id>
//! GameMode=<game mode name>
//! [GameOptions]
//! <option name>=<value>
//! ```
//!
//! In participant info, the name is everything before the last six fields.
//! `side` is the flat side index, `start` and `color` are one-based with 0
//! meaning random, `team` is 0 for no team and `ai_level` is the engine
//! handicap.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{LobbyError, Result};
use crate::factions::{ColorPalette, SideChoice, SideLayout};
use crate::ini::{format_bool, parse_bool, IniDocument};
use crate::map::{ForcedValues, Map};
use crate::options::{OptionKind, OptionSet, OptionValue};
use crate::roster::{AiLevel, Participant, MAX_PLAYERS, MAX_TEAMS};

const PLAYER_SECTION: &str = "Player";
const AI_SECTION: &str = "AIPlayers";
const SETTINGS_SECTION: &str = "Settings";
const OPTIONS_SECTION: &str = "GameOptions";

/// Encode a participant as a settings string.
#[must_use]
pub fn encode_participant(p: &Participant, layout: &SideLayout) -> String {
    format!(
        "{},{},{},{},{},{},{}",
        p.name,
        layout.index_of(p.side),
        p.start.map_or(0, |s| s + 1),
        p.color.map_or(0, |c| c + 1),
        p.team.unwrap_or(0),
        p.ai_level.map_or(0, AiLevel::handicap),
        format_bool(p.is_ai),
    )
}

fn field<T: std::str::FromStr>(value: &str, what: &str, raw: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| LobbyError::InvalidAttribute(format!("bad {what} in '{raw}'")))
}

/// Decode a settings string. Out-of-range values are left for
/// [`clamp_participant`].
///
/// Fields are split from the right, so a name may itself contain commas.
pub fn decode_participant(raw: &str, layout: &SideLayout) -> Result<Participant> {
    let parts: Vec<&str> = raw.rsplitn(7, ',').collect();
    let [is_ai, ai_level, team, color, start, side, name] = parts.as_slice() else {
        return Err(LobbyError::InvalidAttribute(format!(
            "expected 7 fields in participant info '{raw}'"
        )));
    };

    let side: usize = field(side, "side", raw)?;
    let start: usize = field(start, "start", raw)?;
    let color: usize = field(color, "color", raw)?;
    let team: u8 = field(team, "team", raw)?;
    let handicap: u8 = field(ai_level, "AI level", raw)?;
    let is_ai = parse_bool(is_ai)
        .ok_or_else(|| LobbyError::InvalidAttribute(format!("bad AI flag in '{raw}'")))?;

    let mut p = if is_ai {
        let level = 2u8
            .checked_sub(handicap)
            .and_then(AiLevel::from_strength)
            .unwrap_or(AiLevel::Easy);
        Participant::ai(level)
    } else {
        Participant::human(name.trim())
    };
    // Unknown flat indices fall back to Random.
    p.side = layout.choice_at(side).unwrap_or_default();
    p.start = start.checked_sub(1);
    p.color = color.checked_sub(1);
    p.team = (team > 0).then_some(team);
    Ok(p)
}

/// Reset attributes that do not fit the current tables to random/none.
pub fn clamp_participant(p: &mut Participant, layout: &SideLayout, palette: &ColorPalette, map: Option<&Map>) {
    if !layout.contains(p.side) || (p.is_ai && p.side == SideChoice::Spectator) {
        debug!("{}: saved side out of range", p.name);
        p.side = SideChoice::Random;
    }
    if p.color.is_some_and(|c| c >= palette.len()) {
        debug!("{}: saved color out of range", p.name);
        p.color = None;
    }
    if p.team.is_some_and(|t| t == 0 || t > MAX_TEAMS) {
        p.team = None;
    }
    let max_start = map.map_or(MAX_PLAYERS, |m| m.max_players);
    if p.start.is_some_and(|s| s >= max_start) {
        p.start = None;
    }
}

/// Everything persisted between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedSettings {
    /// The local human, name included.
    pub player: Option<Participant>,
    /// AI participants in slot order.
    pub ai: Vec<Participant>,
    /// Identifier of the last map.
    pub map_id: Option<String>,
    /// Name of the last game mode.
    pub game_mode: Option<String>,
    /// Host option values by option name.
    pub options: Vec<(String, String)>,
}

impl SavedSettings {
    /// Render as an INI document.
    #[must_use]
    pub fn to_ini(&self, layout: &SideLayout) -> IniDocument {
        let mut ini = IniDocument::new();
        if let Some(player) = &self.player {
            ini.set(PLAYER_SECTION, "Info", encode_participant(player, layout));
        }
        for (i, ai) in self.ai.iter().enumerate() {
            ini.set(AI_SECTION, i.to_string(), encode_participant(ai, layout));
        }
        if let Some(map_id) = &self.map_id {
            ini.set(SETTINGS_SECTION, "Map", map_id.as_str());
        }
        if let Some(mode) = &self.game_mode {
            ini.set(SETTINGS_SECTION, "GameMode", mode.as_str());
        }
        for (name, value) in &self.options {
            ini.set(OPTIONS_SECTION, name.as_str(), value.as_str());
        }
        ini
    }

    /// Read from an INI document. A malformed AI entry is skipped.
    pub fn from_ini(ini: &IniDocument, layout: &SideLayout) -> Result<Self> {
        let player = ini
            .get(PLAYER_SECTION, "Info")
            .map(|raw| decode_participant(raw, layout))
            .transpose()?;

        let mut ai = Vec::new();
        if let Some(section) = ini.section(AI_SECTION) {
            for (key, raw) in &section.entries {
                match decode_participant(raw, layout) {
                    Ok(p) if ai.len() < MAX_PLAYERS - 1 => ai.push(p),
                    Ok(_) => warn!("Too many saved AI players, ignoring '{key}'"),
                    Err(e) => warn!("Skipping saved AI player '{key}': {e}"),
                }
            }
        }

        let options = ini
            .section(OPTIONS_SECTION)
            .map(|s| s.entries.clone())
            .unwrap_or_default();

        Ok(Self {
            player,
            ai,
            map_id: ini.get(SETTINGS_SECTION, "Map").map(str::to_string),
            game_mode: ini.get(SETTINGS_SECTION, "GameMode").map(str::to_string),
            options,
        })
    }

    /// Write to a file, replacing it.
    pub fn save<P: AsRef<Path>>(&self, path: P, layout: &SideLayout) -> Result<()> {
        let path = path.as_ref();
        if path.exists() {
            std::fs::remove_file(path).map_err(|e| LobbyError::io(path, e))?;
        }
        self.to_ini(layout).save(path)
    }

    /// Read from a file. A missing file yields empty settings.
    pub fn load<P: AsRef<Path>>(path: P, layout: &SideLayout) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No saved settings at {}", path.display());
            return Ok(Self::default());
        }
        Self::from_ini(&IniDocument::load(path)?, layout)
    }
}

/// Host option values in persisted form.
#[must_use]
pub fn capture_options(options: &OptionSet) -> Vec<(String, String)> {
    options
        .iter()
        .map(|o| {
            let value = match o.host_value() {
                OptionValue::Bool(b) => format_bool(b).to_string(),
                OptionValue::Choice(i) => i.to_string(),
            };
            (o.name().to_string(), value)
        })
        .collect()
}

/// Apply saved option values, skipping options the current map or game mode
/// forces. Returns the names that were restored.
pub fn restore_options(
    options: &mut OptionSet,
    saved: &[(String, String)],
    game_mode_forced: &ForcedValues,
    map_forced: &ForcedValues,
) -> Vec<String> {
    let mut restored = Vec::new();
    for (name, raw) in saved {
        if game_mode_forced.forces(name) || map_forced.forces(name) {
            debug!("Option '{name}' is forced, saved value ignored");
            continue;
        }
        let Some(option) = options.get_mut(name) else {
            warn!("Saved option '{name}' no longer exists");
            continue;
        };
        let value = match option.kind() {
            OptionKind::Checkbox(_) => parse_bool(raw).map(OptionValue::Bool),
            OptionKind::Choice(_) => raw.trim().parse().ok().map(OptionValue::Choice),
        };
        match value.map(|v| option.set_value(v)) {
            Some(Ok(())) => restored.push(name.clone()),
            Some(Err(e)) => warn!("Saved option '{name}' not restored: {e}"),
            None => warn!("Saved option '{name}' has unreadable value '{raw}'"),
        }
    }
    restored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factions::{MultiplayerColor, RandomSelector};
    use crate::options::{CheckboxSpec, ChoiceItem, ChoiceSpec, OptionControl};

    fn layout() -> SideLayout {
        SideLayout::new(
            vec!["America".into(), "Korea".into(), "Russia".into()],
            vec![RandomSelector::new("Random Allies", vec![0, 1])],
        )
    }

    fn palette() -> ColorPalette {
        ColorPalette::new(vec![
            MultiplayerColor::new("Gold", 0),
            MultiplayerColor::new("Red", 1),
        ])
    }

    #[test]
    fn test_participant_encoding() {
        let p = Participant::human("Host")
            .with_side(SideChoice::Side(1))
            .with_start(2)
            .with_color(0)
            .with_team(3);
        let encoded = encode_participant(&p, &layout());
        assert_eq!(encoded, "Host,3,3,1,3,0,False");

        let decoded = decode_participant(&encoded, &layout()).unwrap();
        assert_eq!(decoded, p);

        let ai = Participant::ai(AiLevel::Hard).with_side(SideChoice::Selector(0));
        let decoded = decode_participant(&encode_participant(&ai, &layout()), &layout()).unwrap();
        assert_eq!(decoded.ai_level, Some(AiLevel::Hard));
        assert_eq!(decoded.side, SideChoice::Selector(0));
        assert!(decoded.is_ai);
    }

    #[test]
    fn test_name_with_commas_survives() {
        let p = Participant::human("Smith, John, Jr").with_side(SideChoice::Side(2)).with_color(1);
        let encoded = encode_participant(&p, &layout());
        assert_eq!(encoded, "Smith, John, Jr,4,0,2,0,0,False");

        let decoded = decode_participant(&encoded, &layout()).unwrap();
        assert_eq!(decoded.name, "Smith, John, Jr");
        assert_eq!(decoded, p);
    }

    #[test]
    fn test_decode_rejects_short_info() {
        assert!(decode_participant("Host,1,2", &layout()).is_err());
        assert!(decode_participant("Host,x,0,0,0,0,False", &layout()).is_err());
    }

    #[test]
    fn test_clamp_out_of_range_values() {
        let mut p = decode_participant("Host,42,9,7,6,0,False", &layout()).unwrap();
        clamp_participant(&mut p, &layout(), &palette(), Some(&Map::new("Duel", 2)));

        assert_eq!(p.side, SideChoice::Random);
        assert_eq!(p.start, None);
        assert_eq!(p.color, None);
        assert_eq!(p.team, None);
    }

    #[test]
    fn test_restore_skips_forced_options() {
        let mut options = OptionSet::new();
        options
            .insert(OptionControl::checkbox("Crates", CheckboxSpec::default(), false))
            .unwrap();
        options
            .insert(OptionControl::checkbox("Superweapons", CheckboxSpec::default(), false))
            .unwrap();
        options
            .insert(
                OptionControl::new(
                    "Credits",
                    OptionKind::Choice(ChoiceSpec {
                        spawn_key: None,
                        items: vec![ChoiceItem::new("5k"), ChoiceItem::new("10k")],
                    }),
                    OptionValue::Choice(0),
                )
                .unwrap(),
            )
            .unwrap();

        let saved = vec![
            ("Crates".to_string(), "True".to_string()),
            ("Superweapons".to_string(), "True".to_string()),
            ("Credits".to_string(), "1".to_string()),
            ("Gone".to_string(), "True".to_string()),
        ];
        let map_forced = ForcedValues {
            checkboxes: vec![("Superweapons".into(), false)],
            choices: vec![],
        };

        let restored = restore_options(&mut options, &saved, &ForcedValues::default(), &map_forced);

        assert_eq!(restored, vec!["Crates".to_string(), "Credits".to_string()]);
        assert!(options.is_checked("Crates"));
        assert!(!options.is_checked("Superweapons"));
        assert_eq!(capture_options(&options)[2], ("Credits".to_string(), "1".to_string()));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skirmish.ini");
        let settings = SavedSettings {
            player: Some(Participant::human("Host").with_color(1)),
            ai: vec![Participant::ai(AiLevel::Medium).with_team(2)],
            map_id: Some("abc123".into()),
            game_mode: Some("Standard".into()),
            options: vec![("Crates".into(), "True".into())],
        };

        settings.save(&path, &layout()).unwrap();
        let loaded = SavedSettings::load(&path, &layout()).unwrap();
        assert_eq!(loaded, settings);

        let missing = SavedSettings::load(dir.path().join("nope.ini"), &layout()).unwrap();
        assert_eq!(missing, SavedSettings::default());
    }
}
