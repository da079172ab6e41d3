use std::collections::BTreeMap;

use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};

use crate::{
    ActivationLevel, Equipment, EquipmentID, ExerciseName, Muscle, MuscleEngagement, Page,
    PageRequest, StorageError,
};

pub trait ExerciseRepository {
    fn read_exercise(&self, id: ExerciseID) -> Result<Option<Exercise>, StorageError>;
    fn read_exercises(&self, request: &PageRequest) -> Result<Page<Exercise>, StorageError>;
    fn read_exercises_by_muscle(
        &self,
        muscle: Muscle,
        request: &PageRequest,
    ) -> Result<Page<Exercise>, StorageError>;
    fn read_exercises_by_equipment(
        &self,
        equipment_id: EquipmentID,
        request: &PageRequest,
    ) -> Result<Page<Exercise>, StorageError>;
    fn exercise_exists(&self, id: ExerciseID) -> Result<bool, StorageError>;
    fn exercise_key_exists(&self, key: &ExerciseKey) -> Result<bool, StorageError>;
    /// Inserts `exercise` when its id is absent, otherwise replaces the stored row.
    fn write_exercise(&self, exercise: Exercise) -> Result<Exercise, StorageError>;
    fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, StorageError>;
}

/// Persist-ready exercise with its references resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Option<ExerciseID>,
    pub name: ExerciseName,
    pub description: String,
    pub equipment: Equipment,
    pub muscle_engagements: Vec<MuscleEngagement>,
}

impl Exercise {
    #[must_use]
    pub fn muscle_activation(&self) -> BTreeMap<Muscle, ActivationLevel> {
        self.muscle_engagements
            .iter()
            .map(|e| (e.muscle, e.activation_level))
            .collect()
    }

    #[must_use]
    pub fn engages(&self, muscle: Muscle) -> bool {
        self.muscle_engagements.iter().any(|e| e.muscle == muscle)
    }

    /// Uniqueness key, available once the equipment has been persisted.
    #[must_use]
    pub fn key(&self) -> Option<ExerciseKey> {
        self.equipment.id.map(|equipment_id| ExerciseKey {
            name: self.name.clone(),
            equipment_id,
        })
    }
}

/// Candidate for create and full update. The equipment and the muscle
/// engagements are references that still need to be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseDraft {
    #[serde(default)]
    pub id: Option<ExerciseID>,
    pub name: ExerciseName,
    #[serde(default)]
    pub description: String,
    pub equipment_id: EquipmentID,
    pub muscle_engagements: Vec<MuscleEngagement>,
}

impl ExerciseDraft {
    #[must_use]
    pub fn new(
        name: ExerciseName,
        description: Option<String>,
        equipment_id: EquipmentID,
        muscle_engagements: Vec<MuscleEngagement>,
    ) -> Self {
        Self {
            id: None,
            name,
            description: description.unwrap_or_default(),
            equipment_id,
            muscle_engagements,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: ExerciseID) -> Self {
        self.id = Some(id);
        self
    }
}

/// Candidate for partial update. Absent or blank fields keep the persisted value.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExercisePatch {
    pub id: Option<ExerciseID>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub equipment_id: Option<EquipmentID>,
    #[serde(default)]
    pub muscle_engagements: Vec<MuscleEngagement>,
}

impl ExercisePatch {
    #[must_use]
    pub fn new(id: ExerciseID) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }
}

/// Uniqueness key of an exercise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExerciseKey {
    pub name: ExerciseName,
    pub equipment_id: EquipmentID,
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
pub struct ExerciseID(u64);
