use std::{collections::BTreeMap, fs, io, path::Path};

use gym_catalog_domain as domain;
use log::{debug, info};

use crate::memory::{ExerciseRow, MemoryStore, Tables};

/// On-disk form of the catalog. Muscle engagements are stored by value and
/// interned again when the snapshot is loaded.
#[derive(serde::Serialize, serde::Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct Snapshot {
    #[serde(default)]
    pub equipments: Vec<Equipment>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    /// Next id handed out for a new equipment.
    #[serde(default)]
    pub next_equipment_id: u64,
    /// Next id handed out for a new exercise.
    #[serde(default)]
    pub next_exercise_id: u64,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Equipment {
    pub id: u64,
    pub name: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub equipment_id: u64,
    pub muscle_engagements: Vec<MuscleEngagement>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MuscleEngagement {
    pub muscle: domain::Muscle,
    pub activation_level: domain::ActivationLevel,
}

impl From<domain::MuscleEngagement> for MuscleEngagement {
    fn from(value: domain::MuscleEngagement) -> Self {
        Self {
            muscle: value.muscle,
            activation_level: value.activation_level,
        }
    }
}

impl From<MuscleEngagement> for domain::MuscleEngagement {
    fn from(value: MuscleEngagement) -> Self {
        domain::MuscleEngagement::new(value.muscle, value.activation_level)
    }
}

impl From<&Tables> for Snapshot {
    fn from(value: &Tables) -> Self {
        let (next_equipment_id, next_exercise_id) = value.next_ids();
        Self {
            equipments: value
                .equipments
                .iter()
                .map(|(id, name)| Equipment {
                    id: **id,
                    name: name.to_string(),
                })
                .collect(),
            exercises: value
                .exercises
                .iter()
                .map(|(id, row)| Exercise {
                    id: **id,
                    name: row.name.to_string(),
                    description: row.description.clone(),
                    equipment_id: *row.equipment_id,
                    muscle_engagements: row
                        .engagement_ids
                        .iter()
                        .filter_map(|id| value.engagement(*id))
                        .map(MuscleEngagement::from)
                        .collect(),
                })
                .collect(),
            next_equipment_id,
            next_exercise_id,
        }
    }
}

impl TryFrom<Snapshot> for Tables {
    type Error = SnapshotError;

    fn try_from(value: Snapshot) -> Result<Self, Self::Error> {
        let mut equipments: BTreeMap<domain::EquipmentID, domain::EquipmentName> = BTreeMap::new();

        for equipment in value.equipments {
            let name = domain::EquipmentName::new(&equipment.name)?;
            if equipments.values().any(|n| *n == name) {
                return Err(SnapshotError::DuplicateEquipmentName(name.to_string()));
            }
            if equipments.insert(equipment.id.into(), name).is_some() {
                return Err(SnapshotError::DuplicateEquipmentID(equipment.id));
            }
        }

        let tables = Tables::with_rows(equipments, BTreeMap::new(), (0, 0));
        let mut exercises: BTreeMap<domain::ExerciseID, ExerciseRow> = BTreeMap::new();

        for exercise in value.exercises {
            let equipment_id = domain::EquipmentID::from(exercise.equipment_id);
            if !tables.equipments.contains_key(&equipment_id) {
                return Err(SnapshotError::UnknownEquipment(exercise.id, exercise.equipment_id));
            }

            let mut engagement_ids = Vec::with_capacity(exercise.muscle_engagements.len());
            for engagement in exercise.muscle_engagements {
                let Some(id) = tables.interned(&engagement.into()).and_then(|e| e.id) else {
                    continue;
                };
                if !engagement_ids.contains(&id) {
                    engagement_ids.push(id);
                }
            }
            if engagement_ids.is_empty() {
                return Err(SnapshotError::EmptyEngagements(exercise.id));
            }

            let row = ExerciseRow {
                name: domain::ExerciseName::new(&exercise.name)?,
                description: exercise.description,
                equipment_id,
                engagement_ids,
            };
            if exercises
                .values()
                .any(|r| r.name == row.name && r.equipment_id == row.equipment_id)
            {
                return Err(SnapshotError::DuplicateExerciseKey(
                    row.name.to_string(),
                    exercise.equipment_id,
                ));
            }
            if exercises.insert(exercise.id.into(), row).is_some() {
                return Err(SnapshotError::DuplicateExerciseID(exercise.id));
            }
        }

        Ok(Tables::with_rows(
            tables.equipments,
            exercises,
            (value.next_equipment_id, value.next_exercise_id),
        ))
    }
}

impl MemoryStore {
    /// Loads the catalog from `path`. A missing file yields an empty catalog.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(
                    "no snapshot at {}, starting with an empty catalog",
                    path.display()
                );
                return Ok(Self::new());
            }
            Err(err) => return Err(err.into()),
        };
        let store = Self::from_snapshot(serde_json::from_str(&content)?)?;
        debug!("loaded snapshot from {}", path.display());
        Ok(store)
    }

    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let content = serde_json::to_string_pretty(&self.snapshot()?)?;
        fs::write(path, content)?;
        debug!("saved snapshot to {}", path.display());
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SnapshotError {
    #[error("duplicate equipment ID {0}")]
    DuplicateEquipmentID(u64),
    #[error("duplicate equipment name '{0}'")]
    DuplicateEquipmentName(String),
    #[error("duplicate exercise ID {0}")]
    DuplicateExerciseID(u64),
    #[error("duplicate exercise '{0}' for equipment {1}")]
    DuplicateExerciseKey(String, u64),
    #[error("exercise {0} references unknown equipment {1}")]
    UnknownEquipment(u64, u64),
    #[error("exercise {0} has no muscle engagements")]
    EmptyEngagements(u64),
    #[error(transparent)]
    InvalidName(#[from] domain::NameError),
    #[error(transparent)]
    Storage(#[from] domain::StorageError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use gym_catalog_domain::{EquipmentRepository, ExerciseRepository};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use crate::tests::data::{BARBELL, BENCH_PRESS, EXERCISES, PULL_UP, PULL_UP_BAR, SQUAT, store};

    use super::*;

    #[test]
    fn test_snapshot_serde() {
        let snapshot = store().snapshot().unwrap();
        let serialized = json!(snapshot);
        let deserialized: Snapshot = serde_json::from_value(serialized).unwrap();
        assert_eq!(deserialized, snapshot);
    }

    #[test]
    fn test_snapshot_format() {
        let snapshot = store().snapshot().unwrap();
        assert_eq!(
            json!(snapshot.exercises[1]),
            json!({
                "id": 2,
                "name": "Pull Up",
                "description": "Overhand grip",
                "equipment_id": 3,
                "muscle_engagements": [
                    {"muscle": "DORSALS", "activation_level": "HIGH"},
                    {"muscle": "BICEPS", "activation_level": "MEDIUM"}
                ]
            })
        );
    }

    #[test]
    fn test_from_snapshot() {
        let store = MemoryStore::from_snapshot(store().snapshot().unwrap()).unwrap();
        for exercise in EXERCISES.iter() {
            assert_eq!(
                store.read_exercise(exercise.id.unwrap()).unwrap().as_ref(),
                Some(exercise)
            );
        }
        let created = store
            .write_equipment(domain::Equipment::new(
                domain::EquipmentName::new("Cable Machine").unwrap(),
            ))
            .unwrap();
        assert_eq!(created.id, Some(4.into()));
    }

    #[test]
    fn test_empty_snapshot() {
        let store = MemoryStore::from_snapshot(serde_json::from_str("{}").unwrap()).unwrap();
        assert_eq!(store.snapshot().unwrap(), empty_snapshot());
    }

    fn empty_snapshot() -> Snapshot {
        Snapshot {
            next_equipment_id: 1,
            next_exercise_id: 1,
            ..Snapshot::default()
        }
    }

    #[test]
    fn test_deleted_ids_not_reused_after_reload() {
        let store = store();
        store.delete_exercise(SQUAT.id.unwrap()).unwrap();
        store.delete_exercise(PULL_UP.id.unwrap()).unwrap();
        store.delete_equipment(PULL_UP_BAR.id.unwrap()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        store.save(&path).unwrap();
        let store = MemoryStore::load(&path).unwrap();

        let equipment = store
            .write_equipment(domain::Equipment::new(
                domain::EquipmentName::new("Kettlebell").unwrap(),
            ))
            .unwrap();
        let exercise = store
            .write_exercise(domain::Exercise {
                id: None,
                ..SQUAT.clone()
            })
            .unwrap();

        assert_eq!(equipment.id, Some(4.into()));
        assert_eq!(exercise.id, Some(4.into()));
    }

    #[rstest]
    #[case(0, 0, 4, 4)]
    #[case(10, 7, 10, 7)]
    fn test_from_snapshot_next_ids(
        #[case] next_equipment_id: u64,
        #[case] next_exercise_id: u64,
        #[case] expected_equipment_id: u64,
        #[case] expected_exercise_id: u64,
    ) {
        let snapshot = Snapshot {
            next_equipment_id,
            next_exercise_id,
            ..store().snapshot().unwrap()
        };
        let snapshot = MemoryStore::from_snapshot(snapshot)
            .unwrap()
            .snapshot()
            .unwrap();
        assert_eq!(
            (snapshot.next_equipment_id, snapshot.next_exercise_id),
            (expected_equipment_id, expected_exercise_id)
        );
    }

    fn exercise(id: u64, name: &str, equipment_id: u64) -> Exercise {
        Exercise {
            id,
            name: name.to_string(),
            description: String::new(),
            equipment_id,
            muscle_engagements: vec![MuscleEngagement {
                muscle: domain::Muscle::Chest,
                activation_level: domain::ActivationLevel::High,
            }],
        }
    }

    fn equipment(id: u64, name: &str) -> Equipment {
        Equipment {
            id,
            name: name.to_string(),
        }
    }

    #[rstest]
    #[case(
        vec![equipment(1, "Barbell"), equipment(1, "Dumbbell")],
        vec![],
        "duplicate equipment ID 1"
    )]
    #[case(
        vec![equipment(1, "Barbell"), equipment(2, " Barbell ")],
        vec![],
        "duplicate equipment name 'Barbell'"
    )]
    #[case(
        vec![equipment(1, "BB")],
        vec![],
        "Name must be 3 characters or more (2 < 3)"
    )]
    #[case(
        vec![equipment(1, "Barbell")],
        vec![exercise(1, "Squat", 2)],
        "exercise 1 references unknown equipment 2"
    )]
    #[case(
        vec![equipment(1, "Barbell")],
        vec![exercise(1, "Squat", 1), exercise(2, "Squat", 1)],
        "duplicate exercise 'Squat' for equipment 1"
    )]
    #[case(
        vec![equipment(1, "Barbell")],
        vec![exercise(1, "Squat", 1), exercise(1, "Deadlift", 1)],
        "duplicate exercise ID 1"
    )]
    #[case(
        vec![equipment(1, "Barbell")],
        vec![Exercise { muscle_engagements: vec![], ..exercise(1, "Squat", 1) }],
        "exercise 1 has no muscle engagements"
    )]
    fn test_from_snapshot_inconsistent(
        #[case] equipments: Vec<Equipment>,
        #[case] exercises: Vec<Exercise>,
        #[case] expected: &str,
    ) {
        assert_eq!(
            MemoryStore::from_snapshot(Snapshot {
                equipments,
                exercises,
                ..Snapshot::default()
            })
            .unwrap_err()
            .to_string(),
            expected
        );
    }

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        store().save(&path).unwrap();

        let store = MemoryStore::load(&path).unwrap();

        assert_eq!(
            store.read_exercise(BENCH_PRESS.id.unwrap()).unwrap(),
            Some(BENCH_PRESS.clone())
        );
        assert_eq!(
            store.read_exercise(PULL_UP.id.unwrap()).unwrap(),
            Some(PULL_UP.clone())
        );
        assert_eq!(
            store.read_equipment(BARBELL.id.unwrap()).unwrap(),
            Some(BARBELL.clone())
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::load(&dir.path().join("missing.json")).unwrap();
        assert_eq!(store.snapshot().unwrap(), empty_snapshot());
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, "{").unwrap();
        assert!(matches!(
            MemoryStore::load(&path),
            Err(SnapshotError::Json(_))
        ));
    }
}
