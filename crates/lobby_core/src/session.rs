//! Session state and its controller.
//!
//! [`LobbySession`] is the single owner of everything mutable in a lobby:
//! options, roster, selection, seed and the derived constraints. Every
//! mutation goes through `&mut self` and leaves the session consistent:
//! forced options applied, constraints resolved, ready flags cleared.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constraints::{resolve_constraints, ConstraintSnapshot};
use crate::error::{LobbyError, Result};
use crate::factions::{ColorPalette, SideChoice, SideLayout};
use crate::forced::apply_forced_options;
use crate::ini::IniDocument;
use crate::map::{
    ai_allowed, starts_forced_random, teams_disabled, ForcedValues, GameMode, Map, TeamStartMapping,
};
use crate::options::{OptionSet, OptionValue};
use crate::randomizer::{randomize, HouseInfo, RandomizeInputs};
use crate::rank::{evaluate_rank, Rank, RankInputs};
use crate::remap::{remap_stacked_starts, StartRemap};
use crate::roster::{AiLevel, Participant, Roster, MAX_TEAMS};
use crate::settings::{capture_options, clamp_participant, restore_options, SavedSettings};
use crate::slots::SlotOrder;
use crate::spawn::{write_spawn_config, SpawnInputs};
use crate::statistics::{build_match_statistics, MatchStatistics};
use crate::validation::{validate_launch, ValidationError, ValidationInputs};

/// Map section the engine requires to come first.
const DIALOG_SETTINGS_SECTION: &str = "MultiplayerDialogSettings";

/// Static configuration of a lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyConfig {
    /// Sides and random selectors.
    pub layout: SideLayout,
    /// Selectable colors.
    pub palette: ColorPalette,
    /// Raw `[Settings]` entries written for every launch.
    #[serde(default)]
    pub forced_spawn_options: Vec<(String, String)>,
    /// Checkbox that, when checked, strips the map's default starting
    /// waypoints before launch.
    #[serde(default)]
    pub remove_start_waypoints_option: Option<String>,
    /// Online/LAN lobby rather than skirmish.
    #[serde(default)]
    pub is_multiplayer: bool,
}

/// A change to one participant. `None` fields are left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParticipantUpdate {
    /// New side.
    pub side: Option<SideChoice>,
    /// New color; `Some(None)` is random.
    pub color: Option<Option<usize>>,
    /// New starting location; `Some(None)` is random.
    pub start: Option<Option<usize>>,
    /// New team; `Some(None)` is no team.
    pub team: Option<Option<u8>>,
    /// New AI level (AI only).
    pub ai_level: Option<AiLevel>,
}

/// Everything produced for one launch.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    /// `spawn.ini` contents.
    pub spawn: IniDocument,
    /// `spawnmap.ini` contents.
    pub map: IniDocument,
    /// Resolved houses in roster order.
    pub houses: Vec<HouseInfo>,
    /// Engine slot numbering.
    pub slots: SlotOrder,
    /// Stacked starts that were moved.
    pub remaps: Vec<StartRemap>,
    /// Record for the statistics store.
    pub statistics: MatchStatistics,
    /// Seed the plan was resolved with.
    pub seed: u64,
}

/// The lobby session controller.
#[derive(Debug, Clone)]
pub struct LobbySession {
    config: LobbyConfig,
    local_name: String,
    options: OptionSet,
    roster: Roster,
    map: Option<Map>,
    game_mode: Option<GameMode>,
    team_start_mappings: Vec<TeamStartMapping>,
    constraints: ConstraintSnapshot,
    seed: u64,
    next_game_id: u64,
}

impl LobbySession {
    /// Create a session with the local human as the only participant.
    pub fn new(config: LobbyConfig, local: Participant, options: OptionSet, seed: u64) -> Result<Self> {
        let constraints = ConstraintSnapshot::unconstrained(&config.layout, &config.palette, 0);
        let local_name = local.name.clone();
        let mut roster = Roster::new();
        roster.add_human(local)?;

        let mut session = Self {
            config,
            local_name,
            options,
            roster,
            map: None,
            game_mode: None,
            team_start_mappings: Vec::new(),
            constraints,
            seed,
            next_game_id: 1,
        };
        session.refresh_constraints();
        Ok(session)
    }

    /// Static configuration.
    #[must_use]
    pub const fn config(&self) -> &LobbyConfig {
        &self.config
    }

    /// Name of the local human.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Options.
    #[must_use]
    pub const fn options(&self) -> &OptionSet {
        &self.options
    }

    /// Participants.
    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Selected map.
    #[must_use]
    pub const fn map(&self) -> Option<&Map> {
        self.map.as_ref()
    }

    /// Selected game mode.
    #[must_use]
    pub const fn game_mode(&self) -> Option<&GameMode> {
        self.game_mode.as_ref()
    }

    /// Current constraints.
    #[must_use]
    pub const fn constraints(&self) -> &ConstraintSnapshot {
        &self.constraints
    }

    /// Team-start mappings.
    #[must_use]
    pub fn team_start_mappings(&self) -> &[TeamStartMapping] {
        &self.team_start_mappings
    }

    /// Current seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Replace the seed.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    /// Replace the team-start mappings.
    pub fn set_team_start_mappings(&mut self, mappings: Vec<TeamStartMapping>) {
        self.team_start_mappings = mappings;
        self.roster.clear_ready_statuses(false);
    }

    fn selection(&self) -> Option<(&Map, &GameMode)> {
        self.map.as_ref().zip(self.game_mode.as_ref())
    }

    /// Select a game mode and map.
    ///
    /// Forced options are merged (game mode, then map), AI is dropped when
    /// not allowed, starts and teams are reset where the selection forces
    /// them, constraints are resolved and coop maps put everyone on team 1.
    pub fn select(&mut self, game_mode: GameMode, map: Map) {
        info!("Selected map '{}' ({})", map.name, game_mode.ui_name);
        let forced = apply_forced_options(&mut self.options, &game_mode.forced, &map.forced);
        if !forced.is_empty() {
            debug!("Forced options: {}", forced.join(", "));
        }
        self.game_mode = Some(game_mode);
        self.map = Some(map);
        self.normalize_selection();
    }

    fn normalize_selection(&mut self) {
        let Some((map, mode)) = self.map.as_ref().zip(self.game_mode.as_ref()) else {
            self.refresh_constraints();
            return;
        };

        if !ai_allowed(map, mode) && self.roster.ai_count() > 0 {
            info!("AI players are not allowed on this selection, removing them");
            self.roster.clear_ai();
        }

        let random_starts = starts_forced_random(map, mode);
        let no_teams = teams_disabled(map, mode);
        let max_players = map.max_players;
        let coop = map.is_coop();
        for p in self.roster.iter_mut() {
            if random_starts || p.start.is_some_and(|s| s >= max_players) {
                p.start = None;
            }
            if no_teams {
                p.team = None;
            }
        }

        self.refresh_constraints();

        if coop {
            for p in self.roster.iter_mut() {
                p.team = Some(1);
            }
        }
    }

    /// Recompute constraints and move participants off vetoed choices.
    pub fn refresh_constraints(&mut self) {
        self.constraints = resolve_constraints(
            &self.config.layout,
            &self.config.palette,
            &self.options,
            self.map.as_ref(),
            self.game_mode.as_ref(),
            &mut self.roster,
        );
    }

    /// Change an option as the host.
    pub fn set_option(&mut self, name: &str, value: OptionValue) -> Result<()> {
        self.options.set_value(name, value)?;
        debug!("Option '{name}' set to {value}");
        self.refresh_constraints();
        self.roster.clear_ready_statuses(false);
        Ok(())
    }

    /// Add a human participant.
    pub fn add_human(&mut self, participant: Participant) -> Result<usize> {
        if self.roster.find_human(&participant.name).is_some() {
            return Err(LobbyError::InvalidAttribute(format!(
                "a player named '{}' is already in the lobby",
                participant.name
            )));
        }
        let index = self.roster.add_human(participant)?;
        self.refresh_constraints();
        self.roster.clear_ready_statuses(false);
        Ok(index)
    }

    /// Add an AI participant.
    pub fn add_ai(&mut self, participant: Participant) -> Result<usize> {
        if let Some((map, mode)) = self.selection() {
            if !ai_allowed(map, mode) {
                return Err(LobbyError::InvalidAttribute(
                    "AI players are not allowed on the selected map".to_string(),
                ));
            }
        }
        let index = self.roster.add_ai(participant)?;
        self.refresh_constraints();
        if self.map.as_ref().is_some_and(Map::is_coop) {
            if let Some(p) = self.roster.get_mut(index) {
                p.team = Some(1);
            }
        }
        self.roster.clear_ready_statuses(false);
        Ok(index)
    }

    /// Remove a participant. The local human cannot be removed.
    pub fn remove_participant(&mut self, index: usize) -> Result<Participant> {
        if self.roster.human_index(&self.local_name) == Some(index) {
            return Err(LobbyError::InvalidAttribute(
                "the local player cannot be removed".to_string(),
            ));
        }
        let removed = self.roster.remove(index)?;
        debug!("Removed participant '{}'", removed.name);
        self.roster.clear_ready_statuses(false);
        Ok(removed)
    }

    /// Change a participant's attributes.
    ///
    /// Every requested value is checked against the current constraints
    /// before anything is applied. Choosing to spectate clears the start.
    pub fn update_participant(&mut self, index: usize, update: ParticipantUpdate) -> Result<()> {
        let participant = self
            .roster
            .get(index)
            .ok_or(LobbyError::InvalidParticipant(index))?;
        self.check_update(participant, &update)?;

        let p = self
            .roster
            .get_mut(index)
            .ok_or(LobbyError::InvalidParticipant(index))?;
        if let Some(side) = update.side {
            p.side = side;
        }
        if let Some(color) = update.color {
            p.color = color;
        }
        if let Some(start) = update.start {
            p.start = start;
        }
        if let Some(team) = update.team {
            p.team = team;
        }
        if let Some(level) = update.ai_level {
            p.ai_level = Some(level);
            p.name = level.display_name().to_string();
        }
        if p.is_spectator() {
            p.start = None;
        }

        self.roster.clear_ready_statuses(false);
        Ok(())
    }

    fn check_update(&self, p: &Participant, update: &ParticipantUpdate) -> Result<()> {
        let reject = |what: String| Err(LobbyError::InvalidAttribute(what));

        if let Some(side) = update.side {
            if !self.config.layout.contains(side) || !self.constraints.allows_side(side) {
                return reject(format!("side '{}' is not available", self.config.layout.name_of(side)));
            }
            if p.is_ai && side == SideChoice::Spectator {
                return reject("AI players cannot spectate".to_string());
            }
        }

        if let Some(Some(color)) = update.color {
            if color >= self.config.palette.len() || !self.constraints.allows_color(color) {
                return reject(format!("color {color} is not available"));
            }
        }

        if let Some(Some(start)) = update.start {
            let Some((map, mode)) = self.selection() else {
                return Err(LobbyError::NoMapSelected);
            };
            if start >= map.max_players || !self.constraints.allows_start(start) {
                return reject(format!("starting location {} is not available", start + 1));
            }
            if starts_forced_random(map, mode) {
                return reject("starting locations are random on this map".to_string());
            }
        }

        if let Some(Some(team)) = update.team {
            if team == 0 || team > MAX_TEAMS {
                return reject(format!("team {team} does not exist"));
            }
            if self.selection().is_some_and(|(map, mode)| teams_disabled(map, mode)) {
                return reject("teams are disabled on this map".to_string());
            }
        }

        if update.ai_level.is_some() && !p.is_ai {
            return reject(format!("{} is not an AI player", p.name));
        }

        Ok(())
    }

    /// Rank of the current configuration.
    #[must_use]
    pub fn rank(&self) -> Rank {
        evaluate_rank(&RankInputs {
            roster: &self.roster,
            local_name: &self.local_name,
            map: self.map.as_ref(),
            game_mode: self.game_mode.as_ref(),
            options: &self.options,
            is_multiplayer: self.config.is_multiplayer,
        })
    }

    /// Run the launch gate.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        validate_launch(&ValidationInputs {
            roster: &self.roster,
            local_name: &self.local_name,
            map: self.map.as_ref(),
            game_mode: self.game_mode.as_ref(),
            team_start_mappings: &self.team_start_mappings,
            layout: &self.config.layout,
            palette: &self.config.palette,
            constraints: &self.constraints,
            is_multiplayer: self.config.is_multiplayer,
        })
    }

    /// Resolve everything needed to launch.
    ///
    /// Nothing is produced unless validation passes. Coop maps put every
    /// participant on team 1 before houses are resolved.
    pub fn prepare_launch(&mut self) -> Result<LaunchPlan> {
        self.validate()?;

        if self.map.as_ref().is_some_and(Map::is_coop) {
            for p in self.roster.iter_mut() {
                p.team = Some(1);
            }
        }

        let (map, mode) = self.selection().ok_or(LobbyError::NoMapSelected)?;

        let mut houses = randomize(&RandomizeInputs {
            roster: &self.roster,
            layout: &self.config.layout,
            palette: &self.config.palette,
            map,
            constraints: &self.constraints,
            team_start_mappings: &self.team_start_mappings,
            seed: self.seed,
        })?;

        let mut geometry = map.geometry.clone();
        if let Some(code) = &mode.map_code {
            geometry.merge(code);
        }
        self.options.apply_map_code(&mut geometry);
        geometry.move_section_to_first(DIALOG_SETTINGS_SECTION);

        let remove_starts = self
            .config
            .remove_start_waypoints_option
            .as_deref()
            .is_some_and(|name| self.options.is_checked(name));
        let remaps = remap_stacked_starts(&mut houses, &mut geometry, remove_starts, map.enforce_max_players)?;

        let slots = SlotOrder::new(&houses, self.roster.human_count());
        let spawn = write_spawn_config(&SpawnInputs {
            local_name: &self.local_name,
            roster: &self.roster,
            houses: &houses,
            slots: &slots,
            options: &self.options,
            map,
            game_mode: mode,
            lobby_forced: &self.config.forced_spawn_options,
            team_start_mappings: &self.team_start_mappings,
            seed: self.seed,
        })?;

        let statistics = build_match_statistics(
            self.next_game_id,
            &self.local_name,
            &self.roster,
            &houses,
            &self.config.palette,
            &self.options,
            map,
            mode,
        );

        info!(
            "Prepared launch of '{}' with {} participants (seed {})",
            map.name,
            self.roster.len(),
            self.seed
        );

        let plan = LaunchPlan {
            spawn,
            map: geometry,
            houses,
            slots,
            remaps,
            statistics,
            seed: self.seed,
        };
        self.next_game_id += 1;
        Ok(plan)
    }

    /// Called once the game process has exited.
    pub fn finish_match(&mut self, next_seed: u64) {
        self.roster.clear_ready_statuses(false);
        self.seed = next_seed;
    }

    /// Snapshot of what is persisted between sessions.
    #[must_use]
    pub fn capture_settings(&self) -> SavedSettings {
        SavedSettings {
            player: self.roster.find_human(&self.local_name).cloned(),
            ai: self.roster.ai().to_vec(),
            map_id: self.map.as_ref().map(|m| m.id.clone()),
            game_mode: self.game_mode.as_ref().map(|m| m.name.clone()),
            options: capture_options(&self.options),
        }
    }

    /// Apply persisted settings to the current selection.
    ///
    /// The saved player keeps the local name; out-of-range values are
    /// reset, AI is skipped when the selection disallows it and forced
    /// options keep their forced values.
    pub fn apply_saved_settings(&mut self, saved: &SavedSettings) -> Result<()> {
        let layout = &self.config.layout;
        let palette = &self.config.palette;
        let map = self.map.as_ref();

        if let Some(player) = &saved.player {
            let mut player = player.clone();
            clamp_participant(&mut player, layout, palette, map);
            player.name.clone_from(&self.local_name);
            if let Some(index) = self.roster.human_index(&self.local_name) {
                if let Some(local) = self.roster.get_mut(index) {
                    local.side = player.side;
                    local.color = player.color;
                    local.start = player.start;
                    local.team = player.team;
                }
            }
        }

        let allow_ai = self.selection().map_or(true, |(m, g)| ai_allowed(m, g));
        if allow_ai {
            self.roster.clear_ai();
            for ai in &saved.ai {
                let mut ai = ai.clone();
                clamp_participant(&mut ai, &self.config.layout, &self.config.palette, self.map.as_ref());
                self.roster.add_ai(ai)?;
            }
        }

        let no_forced = ForcedValues::default();
        let mode_forced = self.game_mode.as_ref().map_or(&no_forced, |m| &m.forced);
        let map_forced = self.map.as_ref().map_or(&no_forced, |m| &m.forced);
        let restored = restore_options(&mut self.options, &saved.options, mode_forced, map_forced);
        debug!("Restored {} saved options", restored.len());

        self.normalize_selection();
        Ok(())
    }
}
