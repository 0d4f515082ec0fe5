//! The fourteen-field technology tree.
//!
//! Each house advances fourteen named technology fields independently.
//! Levels are small integers starting at 1; each level is bought with
//! accumulated research points on the bi-annual upgrade turns.

use serde::{Deserialize, Serialize};

/// A named technology field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TechField {
    /// EL: colony output multiplier.
    Economic,
    /// SL: science output and breakthrough ceiling.
    Science,
    /// CST: buildable hull classes and neoria dock multiplier.
    Construction,
    /// WEP: weapon strength frozen into ships at build time.
    Weapons,
    /// TER: highest planet class reachable by terraforming.
    Terraforming,
    /// ELI: sensor strength against cloaked attackers.
    ElectronicIntel,
    /// CLK: stealth rating of attacking forces.
    Cloaking,
    /// CIC: detection of foreign espionage.
    CounterIntel,
    /// SLD: planetary shield block chance.
    PlanetaryShields,
    /// STL: population-transfer range and capacity.
    StrategicLift,
    /// FC: fleet command overhead.
    FlagshipCommand,
    /// SC: theater-level coordination.
    StrategicCommand,
    /// FD: fighter effectiveness.
    FighterDoctrine,
    /// ACO: embarked-fighter capacity.
    CarrierOps,
}

impl TechField {
    /// All fourteen fields in canonical order.
    pub const ALL: [Self; 14] = [
        Self::Economic,
        Self::Science,
        Self::Construction,
        Self::Weapons,
        Self::Terraforming,
        Self::ElectronicIntel,
        Self::Cloaking,
        Self::CounterIntel,
        Self::PlanetaryShields,
        Self::StrategicLift,
        Self::FlagshipCommand,
        Self::StrategicCommand,
        Self::FighterDoctrine,
        Self::CarrierOps,
    ];

    /// Table index for fixed per-field arrays.
    #[must_use]
    pub const fn table_index(self) -> usize {
        self as usize
    }
}

/// A house's technology levels, one per field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechTree {
    /// EL level.
    pub economic: u8,
    /// SL level.
    pub science: u8,
    /// CST level.
    pub construction: u8,
    /// WEP level.
    pub weapons: u8,
    /// TER level.
    pub terraforming: u8,
    /// ELI level.
    pub electronic_intel: u8,
    /// CLK level.
    pub cloaking: u8,
    /// CIC level.
    pub counter_intel: u8,
    /// SLD level.
    pub planetary_shields: u8,
    /// STL level.
    pub strategic_lift: u8,
    /// FC level.
    pub flagship_command: u8,
    /// SC level.
    pub strategic_command: u8,
    /// FD level.
    pub fighter_doctrine: u8,
    /// ACO level.
    pub carrier_ops: u8,
}

impl TechTree {
    /// A tree with every field at the given starting level.
    #[must_use]
    pub const fn uniform(level: u8) -> Self {
        Self {
            economic: level,
            science: level,
            construction: level,
            weapons: level,
            terraforming: level,
            electronic_intel: level,
            cloaking: level,
            counter_intel: level,
            planetary_shields: level,
            strategic_lift: level,
            flagship_command: level,
            strategic_command: level,
            fighter_doctrine: level,
            carrier_ops: level,
        }
    }

    /// The current level of a field.
    #[must_use]
    pub const fn level(&self, field: TechField) -> u8 {
        match field {
            TechField::Economic => self.economic,
            TechField::Science => self.science,
            TechField::Construction => self.construction,
            TechField::Weapons => self.weapons,
            TechField::Terraforming => self.terraforming,
            TechField::ElectronicIntel => self.electronic_intel,
            TechField::Cloaking => self.cloaking,
            TechField::CounterIntel => self.counter_intel,
            TechField::PlanetaryShields => self.planetary_shields,
            TechField::StrategicLift => self.strategic_lift,
            TechField::FlagshipCommand => self.flagship_command,
            TechField::StrategicCommand => self.strategic_command,
            TechField::FighterDoctrine => self.fighter_doctrine,
            TechField::CarrierOps => self.carrier_ops,
        }
    }

    /// Set the level of a field.
    pub const fn set_level(&mut self, field: TechField, level: u8) {
        match field {
            TechField::Economic => self.economic = level,
            TechField::Science => self.science = level,
            TechField::Construction => self.construction = level,
            TechField::Weapons => self.weapons = level,
            TechField::Terraforming => self.terraforming = level,
            TechField::ElectronicIntel => self.electronic_intel = level,
            TechField::Cloaking => self.cloaking = level,
            TechField::CounterIntel => self.counter_intel = level,
            TechField::PlanetaryShields => self.planetary_shields = level,
            TechField::StrategicLift => self.strategic_lift = level,
            TechField::FlagshipCommand => self.flagship_command = level,
            TechField::StrategicCommand => self.strategic_command = level,
            TechField::FighterDoctrine => self.fighter_doctrine = level,
            TechField::CarrierOps => self.carrier_ops = level,
        }
    }

    /// Raise a field by one level, returning the new level.
    pub const fn advance(&mut self, field: TechField) -> u8 {
        let next = self.level(field).saturating_add(1);
        self.set_level(field, next);
        next
    }
}

impl Default for TechTree {
    fn default() -> Self {
        Self::uniform(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_and_set_level_cover_every_field() {
        let mut tree = TechTree::uniform(1);
        for (i, field) in TechField::ALL.iter().enumerate() {
            let level = u8::try_from(i).unwrap_or(0).saturating_add(2);
            tree.set_level(*field, level);
            assert_eq!(tree.level(*field), level);
        }
    }

    #[test]
    fn advance_raises_exactly_one_field() {
        let mut tree = TechTree::uniform(3);
        assert_eq!(tree.advance(TechField::Weapons), 4);
        assert_eq!(tree.level(TechField::Weapons), 4);
        assert_eq!(tree.level(TechField::Cloaking), 3);
    }
}
