use crate::creature::Creature;

/// Fixed victory reward: one level, `hp_bonus` extra max health, and a full heal.
pub fn apply_experience_gain(creature: &mut Creature, hp_bonus: u16) {
    creature.level = creature.level.saturating_add(1);
    creature.set_max_hp(creature.max_hp().saturating_add(hp_bonus));
    creature.set_hp_to_max();
}
