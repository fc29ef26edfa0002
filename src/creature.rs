use crate::catalog::get_species_data;
use schema::{ElementType, MoveData, Species, SpeciesData};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A creature owned by the player or met in the wild.
///
/// The serialized field names are the persisted save format and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    pub name: String,
    #[serde(rename = "type")]
    pub element: ElementType,
    #[serde(rename = "maxHP")]
    max_hp: u16,
    pub level: u16,
    pub moves: Vec<MoveData>,
    #[serde(rename = "currentHP")]
    current_hp: u16, // Always within 0..=max_hp
}

impl Creature {
    /// Create a full-health instance from a catalog template.
    pub fn from_species_data(data: &SpeciesData) -> Self {
        Creature {
            name: data.name().to_string(),
            element: data.element,
            max_hp: data.max_hp,
            level: data.level,
            moves: data.moves.clone(),
            current_hp: data.max_hp,
        }
    }

    /// Create a full-health instance of a catalog species.
    pub fn new(species: Species) -> Self {
        Self::from_species_data(get_species_data(species))
    }

    pub fn current_hp(&self) -> u16 {
        self.current_hp
    }

    pub fn max_hp(&self) -> u16 {
        self.max_hp
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    /// Set HP, clamped to `0..=max_hp`.
    pub fn set_hp(&mut self, hp: u16) {
        self.current_hp = hp.min(self.max_hp);
    }

    /// Change max HP. Current HP is pulled down if it no longer fits.
    pub fn set_max_hp(&mut self, max_hp: u16) {
        self.max_hp = max_hp;
        self.clamp_hp();
    }

    pub fn set_hp_to_max(&mut self) {
        self.current_hp = self.max_hp;
    }

    /// Re-apply the health clamp. Used on data that came from outside the core.
    pub fn clamp_hp(&mut self) {
        self.current_hp = self.current_hp.min(self.max_hp);
    }

    /// Apply damage and return the amount actually removed. Returns true in the
    /// second slot if this damage caused the creature to faint.
    pub fn take_damage(&mut self, damage: u16) -> (u16, bool) {
        let was_fainted = self.is_fainted();
        let dealt = damage.min(self.current_hp);
        self.current_hp -= dealt;
        (dealt, !was_fainted && self.is_fainted())
    }

    /// Fraction of health still remaining, in `0.0..=1.0`.
    pub fn hp_fraction(&self) -> f64 {
        if self.max_hp == 0 {
            return 0.0;
        }
        f64::from(self.current_hp) / f64::from(self.max_hp)
    }

    pub fn get_move(&self, move_index: usize) -> Option<&MoveData> {
        self.moves.get(move_index)
    }

    /// Position of a move in this creature's move list, compared by value.
    pub fn move_index(&self, move_: &MoveData) -> Option<usize> {
        self.moves.iter().position(|known| known == move_)
    }
}

impl fmt::Display for Creature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Lv {}) HP: {}/{}",
            self.name, self.level, self.current_hp, self.max_hp
        )
    }
}

/// The player's ordered roster. Index 0 is the lead, the only member that fights.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Team {
    members: Vec<Creature>,
}

impl Team {
    pub fn new(members: Vec<Creature>) -> Self {
        Team { members }
    }

    /// A fresh team holding only the given starter at full health.
    pub fn with_starter(species: Species) -> Self {
        Team::new(vec![Creature::new(species)])
    }

    pub fn lead(&self) -> Option<&Creature> {
        self.members.first()
    }

    /// Replace the lead with its post-battle state. Does nothing on an empty team.
    pub fn replace_lead(&mut self, creature: Creature) {
        if let Some(lead) = self.members.first_mut() {
            *lead = creature;
        }
    }

    pub fn push(&mut self, creature: Creature) {
        self.members.push(creature);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Creature> {
        self.members.iter()
    }

    pub fn members(&self) -> &[Creature] {
        &self.members
    }

    pub(crate) fn clamp_all(&mut self) {
        self.members.iter_mut().for_each(Creature::clamp_hp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_new_creature_is_a_full_health_copy_of_species() {
        let charmander = Creature::new(Species::Charmander);
        assert_eq!(charmander.name, "Charmander");
        assert_eq!(charmander.element, ElementType::Fire);
        assert_eq!(charmander.level, 5);
        assert_eq!(charmander.current_hp(), 40);
        assert_eq!(charmander.max_hp(), 40);
        assert_eq!(charmander.moves.len(), 2);
    }

    #[rstest]
    #[case(40, 15, 25, false)]
    #[case(12, 15, 0, true)]
    #[case(15, 15, 0, true)]
    #[case(0, 10, 0, false)]
    #[case(40, 0, 40, false)]
    fn test_damage_is_clamped_at_zero(
        #[case] start_hp: u16,
        #[case] damage: u16,
        #[case] expected_hp: u16,
        #[case] expected_faint: bool,
    ) {
        let mut creature = Creature::new(Species::Charmander);
        creature.set_hp(start_hp);
        let (_, fainted) = creature.take_damage(damage);
        assert_eq!(creature.current_hp(), expected_hp);
        assert_eq!(fainted, expected_faint);
    }

    #[test]
    fn test_health_never_leaves_bounds_for_any_damage() {
        for start in 0..=40u16 {
            for damage in [0u16, 1, 10, 15, 39, 40, 41, 500, u16::MAX] {
                let mut creature = Creature::new(Species::Charmander);
                creature.set_hp(start);
                creature.take_damage(damage);
                assert!(creature.current_hp() <= creature.max_hp());
                assert_eq!(creature.current_hp(), start.saturating_sub(damage));
            }
        }
    }

    #[test]
    fn test_set_hp_clamps_to_max() {
        let mut squirtle = Creature::new(Species::Squirtle);
        squirtle.set_hp(999);
        assert_eq!(squirtle.current_hp(), 42);
    }

    #[test]
    fn test_lowering_max_hp_pulls_current_hp_down() {
        let mut bulbasaur = Creature::new(Species::Bulbasaur);
        bulbasaur.set_max_hp(30);
        assert_eq!((bulbasaur.current_hp(), bulbasaur.max_hp()), (30, 30));

        bulbasaur.set_max_hp(50);
        assert_eq!((bulbasaur.current_hp(), bulbasaur.max_hp()), (30, 50));
    }

    #[test]
    fn test_move_lookup() {
        let bulbasaur = Creature::new(Species::Bulbasaur);
        let vine_whip = bulbasaur.moves[1].clone();
        assert_eq!(bulbasaur.move_index(&vine_whip), Some(1));
        assert_eq!(
            bulbasaur.move_index(&MoveData::new("Ember", 15, ElementType::Fire)),
            None
        );
    }

    #[test]
    fn test_team_lead_is_first_member() {
        let mut team = Team::with_starter(Species::Bulbasaur);
        team.push(Creature::new(Species::Squirtle));
        assert_eq!(team.len(), 2);
        assert_eq!(team.lead().map(|c| c.name.as_str()), Some("Bulbasaur"));
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(Creature::new(Species::Squirtle)).unwrap();
        assert_eq!(json["name"], "Squirtle");
        assert_eq!(json["type"], "Water");
        assert_eq!(json["maxHP"], 42);
        assert_eq!(json["currentHP"], 42);
        assert_eq!(json["level"], 5);
        assert_eq!(json["moves"][1]["name"], "Water Gun");
        assert_eq!(json["moves"][1]["power"], 15);
        assert_eq!(json["moves"][1]["type"], "Water");
    }
}
