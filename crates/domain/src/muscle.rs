use std::str::FromStr;

use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::StorageError;

/// Interned lookup table of `(muscle, activation level)` pairs.
pub trait MuscleEngagementRepository {
    fn read_muscle_engagements(&self) -> Result<Vec<MuscleEngagement>, StorageError>;
    /// Returns the interned rows matching `candidates`, skipping pairs that do not exist.
    fn find_muscle_engagements(
        &self,
        candidates: &[MuscleEngagement],
    ) -> Result<Vec<MuscleEngagement>, StorageError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MuscleEngagement {
    pub id: Option<EngagementID>,
    pub muscle: Muscle,
    pub activation_level: ActivationLevel,
}

impl MuscleEngagement {
    #[must_use]
    pub fn new(muscle: Muscle, activation_level: ActivationLevel) -> Self {
        Self {
            id: None,
            muscle,
            activation_level,
        }
    }

    #[must_use]
    pub fn key(&self) -> (Muscle, ActivationLevel) {
        (self.muscle, self.activation_level)
    }
}

#[derive(
    Deref,
    Display,
    From,
    Debug,
    Clone,
    Copy,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
pub struct EngagementID(u64);

#[derive(
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
    Debug,
    Clone,
    Copy,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Muscle {
    // Chest
    Chest,
    UpperChest,
    LowerChest,
    InnerChest,
    // Back
    Dorsals,
    WideBack,
    Rhomboids,
    Trapezes,
    Lumbar,
    // Shoulders
    AnteriorDeltoid,
    LateralDeltoid,
    PosteriorDeltoid,
    // Legs
    Quadriceps,
    Hamstrings,
    Calves,
    Buttocks,
    // Arms
    Biceps,
    Triceps,
    Forearms,
    // Core
    Abs,
    Obliques,
}

#[derive(
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
    Debug,
    Clone,
    Copy,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivationLevel {
    High,
    Medium,
    Low,
}

/// Parses a case-insensitive enum name, listing the accepted names on failure.
pub fn parse_enum<T>(value: &str) -> Result<T, InvalidEnumValue>
where
    T: FromStr + IntoEnumIterator + Into<&'static str>,
{
    value.trim().parse::<T>().map_err(|_| InvalidEnumValue {
        value: value.to_string(),
        expected: valid_values::<T>(),
    })
}

fn valid_values<T: IntoEnumIterator + Into<&'static str>>() -> String {
    let names = T::iter().map(Into::into).collect::<Vec<&'static str>>();
    match names.split_last() {
        Some((last, [])) => (*last).to_string(),
        Some((last, rest)) => format!("{} or {last}", rest.join(", ")),
        None => String::new(),
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid value '{value}', expected {expected}")]
pub struct InvalidEnumValue {
    pub value: String,
    pub expected: String,
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_muscle_count() {
        assert_eq!(Muscle::iter().count(), 21);
    }

    #[test]
    fn test_muscle_names_unique() {
        let names = Muscle::iter()
            .map(|m| m.to_string())
            .collect::<HashSet<_>>();
        assert_eq!(names.len(), 21);
    }

    #[rstest]
    #[case("CHEST", Ok(Muscle::Chest))]
    #[case("upper_chest", Ok(Muscle::UpperChest))]
    #[case(" Posterior_Deltoid ", Ok(Muscle::PosteriorDeltoid))]
    #[case("NECK", Err(()))]
    fn test_parse_muscle(#[case] value: &str, #[case] expected: Result<Muscle, ()>) {
        assert_eq!(parse_enum::<Muscle>(value).map_err(|_| ()), expected);
    }

    #[test]
    fn test_parse_activation_level_error() {
        assert_eq!(
            parse_enum::<ActivationLevel>("extreme"),
            Err(InvalidEnumValue {
                value: "extreme".to_string(),
                expected: "HIGH, MEDIUM or LOW".to_string(),
            })
        );
    }

    #[rstest]
    #[case(ActivationLevel::High, "HIGH")]
    #[case(ActivationLevel::Medium, "MEDIUM")]
    #[case(ActivationLevel::Low, "LOW")]
    fn test_activation_level_display(#[case] level: ActivationLevel, #[case] expected: &str) {
        assert_eq!(level.to_string(), expected);
    }

    #[test]
    fn test_muscle_engagement_serialize() {
        assert_eq!(
            serde_json::to_string(&MuscleEngagement::new(
                Muscle::LateralDeltoid,
                ActivationLevel::Low
            ))
            .unwrap(),
            r#"{"id":null,"muscle":"LATERAL_DELTOID","activation_level":"LOW"}"#
        );
    }
}
