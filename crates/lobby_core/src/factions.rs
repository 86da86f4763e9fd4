//! Side (faction) and color tables.
//!
//! A participant's side selection is one of a flat list laid out as
//! `[Random, random selectors..., sides..., Spectator]`. [`SideChoice`] is the
//! typed form; [`SideLayout::index_of`] and [`SideLayout::choice_at`]
//! convert to and from the flat index used by persisted settings.

use serde::{Deserialize, Serialize};

/// A named alias that randomizes across a fixed subset of sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomSelector {
    /// Display name, e.g. "Random Allies".
    pub name: String,
    /// Member side indices.
    pub sides: Vec<usize>,
}

impl RandomSelector {
    /// Create a selector over the given sides.
    #[must_use]
    pub fn new(name: impl Into<String>, sides: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            sides,
        }
    }
}

/// A participant's side selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SideChoice {
    /// Any allowed side, picked at launch.
    #[default]
    Random,
    /// One of the members of random selector `k`, picked at launch.
    Selector(usize),
    /// A concrete side.
    Side(usize),
    /// Watch the match instead of playing.
    Spectator,
}

impl SideChoice {
    /// Whether the side is resolved at launch time.
    #[must_use]
    pub const fn is_randomized(&self) -> bool {
        matches!(self, Self::Random | Self::Selector(_))
    }
}

/// The playable sides and random-selector groups of the mod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideLayout {
    /// Side names in internal index order.
    pub sides: Vec<String>,
    /// Named random-selector groups.
    pub selectors: Vec<RandomSelector>,
}

impl SideLayout {
    /// Create a layout.
    #[must_use]
    pub fn new(sides: Vec<String>, selectors: Vec<RandomSelector>) -> Self {
        Self { sides, selectors }
    }

    /// Number of concrete sides.
    #[must_use]
    pub fn side_count(&self) -> usize {
        self.sides.len()
    }

    /// Number of random pseudo-sides, including plain Random.
    #[must_use]
    pub fn random_selector_count(&self) -> usize {
        self.selectors.len() + 1
    }

    /// Flat index of the spectator pseudo-side.
    #[must_use]
    pub fn spectator_index(&self) -> usize {
        self.side_count() + self.random_selector_count()
    }

    /// Flat index of a choice.
    #[must_use]
    pub fn index_of(&self, choice: SideChoice) -> usize {
        match choice {
            SideChoice::Random => 0,
            SideChoice::Selector(k) => 1 + k,
            SideChoice::Side(i) => self.random_selector_count() + i,
            SideChoice::Spectator => self.spectator_index(),
        }
    }

    /// Choice at a flat index, if it is in range.
    #[must_use]
    pub fn choice_at(&self, index: usize) -> Option<SideChoice> {
        let rsc = self.random_selector_count();
        if index == 0 {
            Some(SideChoice::Random)
        } else if index < rsc {
            Some(SideChoice::Selector(index - 1))
        } else if index < rsc + self.side_count() {
            Some(SideChoice::Side(index - rsc))
        } else if index == self.spectator_index() {
            Some(SideChoice::Spectator)
        } else {
            None
        }
    }

    /// Whether a choice refers to something that exists in this layout.
    #[must_use]
    pub fn contains(&self, choice: SideChoice) -> bool {
        match choice {
            SideChoice::Random | SideChoice::Spectator => true,
            SideChoice::Selector(k) => k < self.selectors.len(),
            SideChoice::Side(i) => i < self.side_count(),
        }
    }

    /// Display name of a choice.
    #[must_use]
    pub fn name_of(&self, choice: SideChoice) -> &str {
        match choice {
            SideChoice::Random => "Random",
            SideChoice::Spectator => "Spectator",
            SideChoice::Selector(k) => self.selectors.get(k).map_or("?", |s| s.name.as_str()),
            SideChoice::Side(i) => self.sides.get(i).map_or("?", String::as_str),
        }
    }
}

/// One selectable multiplayer color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplayerColor {
    /// Display name.
    pub name: String,
    /// Color index as understood by the game engine.
    pub game_color_index: usize,
}

impl MultiplayerColor {
    /// Create a color entry.
    #[must_use]
    pub fn new(name: impl Into<String>, game_color_index: usize) -> Self {
        Self {
            name: name.into(),
            game_color_index,
        }
    }
}

/// The ordered list of colors participants pick from.
///
/// Participants reference colors by palette position; the engine only
/// knows [`MultiplayerColor::game_color_index`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPalette {
    /// Colors in selection order.
    pub colors: Vec<MultiplayerColor>,
}

impl ColorPalette {
    /// Create a palette.
    #[must_use]
    pub fn new(colors: Vec<MultiplayerColor>) -> Self {
        Self { colors }
    }

    /// Number of colors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the palette is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Engine color index of a palette entry.
    #[must_use]
    pub fn game_index(&self, palette_index: usize) -> Option<usize> {
        self.colors.get(palette_index).map(|c| c.game_color_index)
    }

    /// Palette position of an engine color index.
    #[must_use]
    pub fn palette_index(&self, game_color_index: usize) -> Option<usize> {
        self.colors
            .iter()
            .position(|c| c.game_color_index == game_color_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> SideLayout {
        SideLayout::new(
            vec!["America".into(), "Korea".into(), "Russia".into()],
            vec![
                RandomSelector::new("Random Allies", vec![0, 1]),
                RandomSelector::new("Random Soviet", vec![2]),
            ],
        )
    }

    #[test]
    fn test_flat_index_layout() {
        let l = layout();
        assert_eq!(l.random_selector_count(), 3);
        assert_eq!(l.spectator_index(), 6);
        assert_eq!(l.index_of(SideChoice::Random), 0);
        assert_eq!(l.index_of(SideChoice::Selector(1)), 2);
        assert_eq!(l.index_of(SideChoice::Side(0)), 3);
        assert_eq!(l.index_of(SideChoice::Spectator), 6);
    }

    #[test]
    fn test_choice_at_inverts_index_of() {
        let l = layout();
        for idx in 0..=l.spectator_index() {
            let choice = l.choice_at(idx).unwrap();
            assert_eq!(l.index_of(choice), idx);
        }
        assert_eq!(l.choice_at(7), None);
    }

    #[test]
    fn test_palette_lookup() {
        let palette = ColorPalette::new(vec![
            MultiplayerColor::new("Gold", 4),
            MultiplayerColor::new("Red", 1),
        ]);
        assert_eq!(palette.game_index(0), Some(4));
        assert_eq!(palette.palette_index(1), Some(1));
        assert_eq!(palette.palette_index(9), None);
    }
}
