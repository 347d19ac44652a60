//! Fixed-width player record layout.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  PlayerRecord (60 bytes, #[repr(C)], no padding)         │
//! ├──────────────────────────────────────────────────────────┤
//! │  0  id: u32                                              │
//! │  4  first_name_id, last_name_id: u16                     │
//! │  8  current_ability: u16                                 │
//! │ 10  matches_played, goals, assists, average_rating: u16  │
//! │ 18  age, preferred_foot, position, fitness, morale: u8   │
//! │ 23  physical: [u8; 8]                                    │
//! │ 31  technical: [u8; 14]                                  │
//! │ 45  mental: [u8; 14]                                     │
//! │ 59  reserved: u8                                         │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Attribute groups follow the FM 1-20 scale (36 attributes: Technical×14,
//! Mental×14, Physical×8). Display values map them onto 0-100.

use crate::error::RecordError;
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

pub const PHYSICAL_COUNT: usize = 8;
pub const TECHNICAL_COUNT: usize = 14;
pub const MENTAL_COUNT: usize = 14;

/// Highest raw attribute value (FM scale).
pub const ATTRIBUTE_MAX: u8 = 20;
/// Upper bound for fitness and morale.
pub const PERCENT_MAX: u8 = 100;

/// Size of one record on disk and in memory.
pub const RECORD_SIZE: usize = std::mem::size_of::<PlayerRecord>();

const _: () = assert!(RECORD_SIZE == 60);

/// Convert a raw 0-20 attribute into the 0-100 display scale.
///
/// 16 and above saturate at 100.
pub fn scale_attribute(v: u8) -> f64 {
    (v as f64 * 6.25).min(100.0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct PlayerRecord {
    pub id: u32,
    pub first_name_id: u16,
    pub last_name_id: u16,
    pub current_ability: u16,
    pub matches_played: u16,
    pub goals: u16,
    pub assists: u16,
    /// Rating × 10 (e.g. 72 = 7.2)
    pub average_rating: u16,
    pub age: u8,
    pub preferred_foot: u8,
    pub position: u8,
    pub fitness: u8,
    pub morale: u8,
    pub physical: [u8; PHYSICAL_COUNT],
    pub technical: [u8; TECHNICAL_COUNT],
    pub mental: [u8; MENTAL_COUNT],
    pub reserved: u8,
}

impl PlayerRecord {
    /// Empty slot for `id`: every field zero except the key.
    pub fn blank(id: u32) -> Self {
        Self { id, ..Self::zeroed() }
    }

    /// Ability as shown in the UI (`round(ca / 2)`).
    pub fn display_ability(&self) -> u16 {
        self.current_ability / 2 + self.current_ability % 2
    }

    pub fn display_rating(&self) -> f64 {
        self.average_rating as f64 / 10.0
    }

    pub fn foot(&self) -> Option<PreferredFoot> {
        PreferredFoot::try_from(self.preferred_foot).ok()
    }

    pub fn position_code(&self) -> Option<Position> {
        Position::try_from(self.position).ok()
    }

    pub fn physical_attr(&self, attr: PhysicalAttr) -> u8 {
        self.physical[attr as usize]
    }

    pub fn technical_attr(&self, attr: TechnicalAttr) -> u8 {
        self.technical[attr as usize]
    }

    pub fn mental_attr(&self, attr: MentalAttr) -> u8 {
        self.mental[attr as usize]
    }

    pub fn set_physical_attr(&mut self, attr: PhysicalAttr, value: u8) {
        self.physical[attr as usize] = value;
    }

    pub fn set_technical_attr(&mut self, attr: TechnicalAttr, value: u8) {
        self.technical[attr as usize] = value;
    }

    pub fn set_mental_attr(&mut self, attr: MentalAttr, value: u8) {
        self.mental[attr as usize] = value;
    }

    /// Mean of all 36 attributes on the display scale.
    pub fn overall_display(&self) -> f64 {
        let attrs = self.physical.iter().chain(&self.technical).chain(&self.mental);
        let total: f64 = attrs.map(|&v| scale_attribute(v)).sum();
        total / (PHYSICAL_COUNT + TECHNICAL_COUNT + MENTAL_COUNT) as f64
    }

    /// Check every bounded field against its documented range.
    pub fn validate(&self) -> Result<(), RecordError> {
        check_max("fitness", self.fitness, PERCENT_MAX)?;
        check_max("morale", self.morale, PERCENT_MAX)?;

        if self.foot().is_none() {
            return Err(RecordError::UnknownFoot(self.preferred_foot));
        }
        if self.position_code().is_none() {
            return Err(RecordError::UnknownPosition(self.position));
        }

        for &v in &self.physical {
            check_max("physical", v, ATTRIBUTE_MAX)?;
        }
        for &v in &self.technical {
            check_max("technical", v, ATTRIBUTE_MAX)?;
        }
        for &v in &self.mental {
            check_max("mental", v, ATTRIBUTE_MAX)?;
        }
        Ok(())
    }
}

fn check_max(field: &'static str, value: u8, max: u8) -> Result<(), RecordError> {
    if value > max {
        return Err(RecordError::OutOfBounds { field, value: value as u32, max: max as u32 });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PreferredFoot {
    Right = 0,
    Left = 1,
    Either = 2,
}

impl TryFrom<u8> for PreferredFoot {
    type Error = RecordError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(PreferredFoot::Right),
            1 => Ok(PreferredFoot::Left),
            2 => Ok(PreferredFoot::Either),
            other => Err(RecordError::UnknownFoot(other)),
        }
    }
}

/// Role codes, same ordering as the 14-position rating system
/// (GK, DL, DC, DR, WBL, WBR, DM, ML, MC, MR, AML, AMC, AMR, ST).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Position {
    GK = 0,
    DL = 1,
    DC = 2,
    DR = 3,
    WBL = 4,
    WBR = 5,
    DM = 6,
    ML = 7,
    MC = 8,
    MR = 9,
    AML = 10,
    AMC = 11,
    AMR = 12,
    ST = 13,
}

impl Position {
    pub fn all() -> &'static [Position] {
        &[
            Position::GK,
            Position::DL,
            Position::DC,
            Position::DR,
            Position::WBL,
            Position::WBR,
            Position::DM,
            Position::ML,
            Position::MC,
            Position::MR,
            Position::AML,
            Position::AMC,
            Position::AMR,
            Position::ST,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Position::GK => "GK",
            Position::DL => "DL",
            Position::DC => "DC",
            Position::DR => "DR",
            Position::WBL => "WBL",
            Position::WBR => "WBR",
            Position::DM => "DM",
            Position::ML => "ML",
            Position::MC => "MC",
            Position::MR => "MR",
            Position::AML => "AML",
            Position::AMC => "AMC",
            Position::AMR => "AMR",
            Position::ST => "ST",
        }
    }
}

impl TryFrom<u8> for Position {
    type Error = RecordError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Position::all().get(code as usize).copied().ok_or(RecordError::UnknownPosition(code))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalAttr {
    Acceleration,
    Agility,
    Balance,
    Jumping,
    NaturalFitness,
    Pace,
    Stamina,
    Strength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TechnicalAttr {
    Corners,
    Crossing,
    Dribbling,
    Finishing,
    FirstTouch,
    FreeKickTaking,
    Heading,
    LongShots,
    LongThrows,
    Marking,
    Passing,
    PenaltyTaking,
    Tackling,
    Technique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MentalAttr {
    Aggression,
    Anticipation,
    Bravery,
    Composure,
    Concentration,
    Decisions,
    Determination,
    Flair,
    Leadership,
    OffTheBall,
    Positioning,
    Teamwork,
    Vision,
    WorkRate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_layout() {
        assert_eq!(RECORD_SIZE, 60);
        assert_eq!(std::mem::align_of::<PlayerRecord>(), 4);

        let mut rec = PlayerRecord::blank(7);
        rec.physical[0] = 0xAA;
        rec.reserved = 0xBB;
        let bytes = bytemuck::bytes_of(&rec);
        assert_eq!(&bytes[0..4], &7u32.to_le_bytes());
        assert_eq!(bytes[23], 0xAA);
        assert_eq!(bytes[59], 0xBB);
    }

    #[test]
    fn test_scale_attribute() {
        assert_eq!(scale_attribute(0), 0.0);
        assert_eq!(scale_attribute(10), 62.5);
        assert_eq!(scale_attribute(16), 100.0);
        assert_eq!(scale_attribute(20), 100.0);
        assert_eq!(scale_attribute(255), 100.0);
    }

    #[test]
    fn test_display_helpers() {
        let mut rec = PlayerRecord::blank(1);
        rec.current_ability = 151;
        rec.average_rating = 72;
        assert_eq!(rec.display_ability(), 76);
        assert!((rec.display_rating() - 7.2).abs() < 1e-9);

        rec.current_ability = 150;
        assert_eq!(rec.display_ability(), 75);
    }

    #[test]
    fn test_named_attributes() {
        let mut rec = PlayerRecord::blank(1);
        rec.set_physical_attr(PhysicalAttr::Pace, 18);
        rec.set_technical_attr(TechnicalAttr::Finishing, 17);
        rec.set_mental_attr(MentalAttr::WorkRate, 12);

        assert_eq!(rec.physical[5], 18);
        assert_eq!(rec.technical_attr(TechnicalAttr::Finishing), 17);
        assert_eq!(rec.mental[13], 12);
    }

    #[test]
    fn test_codes() {
        assert_eq!(PreferredFoot::try_from(1u8), Ok(PreferredFoot::Left));
        assert_eq!(PreferredFoot::try_from(3u8), Err(RecordError::UnknownFoot(3)));
        assert_eq!(Position::try_from(13u8), Ok(Position::ST));
        assert_eq!(Position::try_from(14u8), Err(RecordError::UnknownPosition(14)));
        assert_eq!(Position::AMC.name(), "AMC");
    }

    #[test]
    fn test_validate() {
        let mut rec = PlayerRecord::blank(1);
        rec.fitness = 100;
        rec.morale = 55;
        rec.technical = [20; TECHNICAL_COUNT];
        assert!(rec.validate().is_ok());

        rec.fitness = 101;
        assert_eq!(
            rec.validate(),
            Err(RecordError::OutOfBounds { field: "fitness", value: 101, max: 100 })
        );

        rec.fitness = 90;
        rec.mental[3] = 21;
        assert!(matches!(rec.validate(), Err(RecordError::OutOfBounds { field: "mental", .. })));

        rec.mental[3] = 5;
        rec.preferred_foot = 9;
        assert_eq!(rec.validate(), Err(RecordError::UnknownFoot(9)));
    }

    #[test]
    fn test_overall_display() {
        let mut rec = PlayerRecord::blank(1);
        rec.physical = [16; PHYSICAL_COUNT];
        rec.technical = [16; TECHNICAL_COUNT];
        rec.mental = [16; MENTAL_COUNT];
        assert_eq!(rec.overall_display(), 100.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: display scale is monotone and capped at 100
            #[test]
            fn prop_scale_attribute_bounded(v in any::<u8>()) {
                let s = scale_attribute(v);
                prop_assert!((0.0..=100.0).contains(&s));
                if v < u8::MAX {
                    prop_assert!(scale_attribute(v + 1) >= s);
                }
            }

            /// Property: display ability is round-half-up of ca / 2
            #[test]
            fn prop_display_ability_rounds(ca in 0u16..=400) {
                let mut rec = PlayerRecord::blank(1);
                rec.current_ability = ca;
                let expected = (ca as f64 / 2.0).round() as u16;
                prop_assert_eq!(rec.display_ability(), expected);
            }
        }
    }
}
