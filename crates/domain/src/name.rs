use derive_more::{AsRef, Display};
use serde::{Deserialize, Serialize};

pub type EquipmentName = Name<3, 25>;
pub type ExerciseName = Name<4, 50>;

/// Trimmed, non-empty name of `MIN` to `MAX` characters.
#[derive(
    AsRef, Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Name<const MIN: usize, const MAX: usize>(String);

impl<const MIN: usize, const MAX: usize> Name<MIN, MAX> {
    pub fn new(name: &str) -> Result<Self, NameError> {
        let trimmed_name = name.trim();

        if trimmed_name.is_empty() {
            return Err(NameError::Empty);
        }

        let len = trimmed_name.chars().count();

        if len < MIN {
            return Err(NameError::TooShort(len, MIN));
        }

        if len > MAX {
            return Err(NameError::TooLong(len, MAX));
        }

        Ok(Name(trimmed_name.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<const MIN: usize, const MAX: usize> TryFrom<String> for Name<MIN, MAX> {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl<const MIN: usize, const MAX: usize> From<Name<MIN, MAX>> for String {
    fn from(value: Name<MIN, MAX>) -> Self {
        value.0
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,
    #[error("Name must be {1} characters or more ({0} < {1})")]
    TooShort(usize, usize),
    #[error("Name must be {1} characters or fewer ({0} > {1})")]
    TooLong(usize, usize),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Bench", Ok(Name("Bench".to_string())))]
    #[case("  Barbell  ", Ok(Name("Barbell".to_string())))]
    #[case("Bar", Ok(Name("Bar".to_string())))]
    #[case("", Err(NameError::Empty))]
    #[case("   ", Err(NameError::Empty))]
    #[case("TR", Err(NameError::TooShort(2, 3)))]
    #[case("AAAAAAAAAAAAAAAAAAAAAAAAAA", Err(NameError::TooLong(26, 25)))]
    fn test_equipment_name_new(
        #[case] name: &str,
        #[case] expected: Result<EquipmentName, NameError>,
    ) {
        assert_eq!(EquipmentName::new(name), expected);
    }

    #[rstest]
    #[case("Bench Press Flat", Ok(Name("Bench Press Flat".to_string())))]
    #[case("Dips", Ok(Name("Dips".to_string())))]
    #[case("Row", Err(NameError::TooShort(3, 4)))]
    #[case(
        "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
        Err(NameError::TooLong(51, 50))
    )]
    fn test_exercise_name_new(
        #[case] name: &str,
        #[case] expected: Result<ExerciseName, NameError>,
    ) {
        assert_eq!(ExerciseName::new(name), expected);
    }

    #[test]
    fn test_name_counts_characters() {
        assert_eq!(EquipmentName::new("Öse").unwrap().as_str(), "Öse");
    }

    #[test]
    fn test_name_deserialize() {
        assert_eq!(
            serde_json::from_str::<EquipmentName>("\" Kettlebell \"").unwrap(),
            EquipmentName::new("Kettlebell").unwrap()
        );
        assert!(serde_json::from_str::<EquipmentName>("\"K\"").is_err());
    }
}
