//! Ranked eligibility.
//!
//! [`evaluate_rank`] is a decision table: the checks run in a fixed order and
//! the first failing one yields [`Rank::None`]. Later checks rely on earlier
//! ones having passed, so the order must not change.

use serde::{Deserialize, Serialize};

use crate::map::{GameMode, Map};
use crate::options::OptionSet;
use crate::roster::{Participant, Roster, MAX_TEAMS};

/// Eligibility tier of the current configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Rank {
    /// Not eligible.
    #[default]
    None,
    /// Weakest opponents are easy AI.
    Easy,
    /// Weakest opponents are medium AI.
    Medium,
    /// Weakest opponents are hard AI, or a full PvP match.
    Hard,
}

impl Rank {
    /// Numeric tier, 0 for [`Rank::None`].
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Easy => 1,
            Self::Medium => 2,
            Self::Hard => 3,
        }
    }

    fn from_lowest_enemy(strength: u8) -> Self {
        match strength {
            0 => Self::Easy,
            1 => Self::Medium,
            _ => Self::Hard,
        }
    }
}

/// Kind of match by human team structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameType {
    /// No human team has two members.
    Ffa,
    /// Exactly one human team has two or more members.
    Coop,
    /// Several human teams.
    TeamGame,
}

/// State the ranker reads.
#[derive(Debug, Clone, Copy)]
pub struct RankInputs<'a> {
    /// Participants.
    pub roster: &'a Roster,
    /// Name of the local human.
    pub local_name: &'a str,
    /// Selected map.
    pub map: Option<&'a Map>,
    /// Selected game mode.
    pub game_mode: Option<&'a GameMode>,
    /// Session options.
    pub options: &'a OptionSet,
    /// Online/LAN session rather than skirmish.
    pub is_multiplayer: bool,
}

fn team_slot(p: &Participant) -> usize {
    usize::from(p.team.unwrap_or(0).min(MAX_TEAMS))
}

/// Number of human teams with at least two non-spectating members.
#[must_use]
pub fn pvp_team_count(roster: &Roster) -> usize {
    let mut counts = [0usize; MAX_TEAMS as usize + 1];
    let mut teams = 0;
    for p in roster.humans().iter().filter(|p| !p.is_spectator()) {
        let slot = team_slot(p);
        if slot == 0 {
            continue;
        }
        counts[slot] += 1;
        if counts[slot] == 2 {
            teams += 1;
        }
    }
    teams
}

/// Classify the match by human team structure.
#[must_use]
pub fn game_type(roster: &Roster) -> GameType {
    match pvp_team_count(roster) {
        0 => GameType::Ffa,
        1 => GameType::Coop,
        _ => GameType::TeamGame,
    }
}

/// Whether no other non-local team is smaller than the local team.
fn teams_balanced(counts: &[usize], local_team: usize) -> bool {
    let allies = counts[local_team];
    counts
        .iter()
        .enumerate()
        .skip(1)
        .filter(|&(i, &n)| i != local_team && n > 0)
        .all(|(_, &n)| n >= allies)
}

/// Evaluate the rank of the current configuration. Pure.
#[must_use]
pub fn evaluate_rank(inputs: &RankInputs<'_>) -> Rank {
    let (Some(map), Some(_)) = (inputs.map, inputs.game_mode) else {
        return Rank::None;
    };

    if inputs.options.denies_scoring() {
        return Rank::None;
    }

    let roster = inputs.roster;
    let Some(local) = roster.find_human(inputs.local_name) else {
        return Rank::None;
    };
    if local.is_spectator() {
        return Rank::None;
    }
    let local_team = team_slot(local);

    let mut team_counts = [0usize; MAX_TEAMS as usize + 1];
    let mut lowest_enemy = 2u8;
    let mut highest_ally = 0u8;
    for ai in roster.ai() {
        let slot = team_slot(ai);
        team_counts[slot] += 1;
        if slot > 0 && slot == local_team {
            highest_ally = highest_ally.max(ai.strength());
        } else {
            lowest_enemy = lowest_enemy.min(ai.strength());
        }
    }

    if inputs.is_multiplayer {
        let humans = roster.humans();
        if humans.len() == 1 {
            return Rank::None;
        }

        if map.max_players <= 3 {
            let players: Vec<&Participant> = humans.iter().filter(|p| !p.is_spectator()).collect();
            if roster.ai_count() > 0 || players.len() != map.max_players {
                return Rank::None;
            }
            if local_team > 0 && players.iter().filter(|p| team_slot(p) == local_team).count() > 1 {
                return Rank::None;
            }
            return Rank::Hard;
        }

        if humans.iter().any(Participant::is_spectator)
            || roster.ai_count() == 0
            || humans.iter().any(|p| team_slot(p) != local_team)
            || humans.iter().any(|p| team_slot(p) == 0)
            || roster.ai().iter().any(|p| team_slot(p) == 0)
        {
            return Rank::None;
        }

        team_counts[local_team] += humans.len();

        if lowest_enemy < highest_ally || !teams_balanced(&team_counts, local_team) {
            return Rank::None;
        }

        return Rank::from_lowest_enemy(lowest_enemy);
    }

    if roster.ai_count() + 1 != map.max_players {
        return Rank::None;
    }

    team_counts[local_team] += 1;

    if lowest_enemy < highest_ally {
        return Rank::None;
    }

    if local_team > 0 {
        if !teams_balanced(&team_counts, local_team) {
            return Rank::None;
        }
        let allies = team_counts[local_team];
        let contested = team_counts
            .iter()
            .enumerate()
            .skip(1)
            .any(|(i, &n)| i != local_team && n >= allies);
        if !contested {
            return Rank::None;
        }
    }

    Rank::from_lowest_enemy(lowest_enemy)
}
