use std::{
    cmp::Ordering,
    collections::BTreeMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use gym_catalog_domain as domain;
use log::debug;
use strum::IntoEnumIterator;

use crate::snapshot::{Snapshot, SnapshotError};

/// Catalog kept in memory. Writes are serialised through a single lock and
/// checked against the unique keys before they are applied.
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Debug, Clone)]
pub(crate) struct Tables {
    pub(crate) equipments: BTreeMap<domain::EquipmentID, domain::EquipmentName>,
    pub(crate) exercises: BTreeMap<domain::ExerciseID, ExerciseRow>,
    engagements: Vec<domain::MuscleEngagement>,
    next_equipment_id: u64,
    next_exercise_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExerciseRow {
    pub(crate) name: domain::ExerciseName,
    pub(crate) description: String,
    pub(crate) equipment_id: domain::EquipmentID,
    pub(crate) engagement_ids: Vec<domain::EngagementID>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, SnapshotError> {
        Ok(Self {
            tables: RwLock::new(Tables::try_from(snapshot)?),
        })
    }

    pub fn snapshot(&self) -> Result<Snapshot, domain::StorageError> {
        Ok(Snapshot::from(&*self.read()?))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, domain::StorageError> {
        self.tables.read().map_err(|_| {
            debug!("store lock poisoned");
            domain::StorageError::Unavailable
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, domain::StorageError> {
        self.tables.write().map_err(|_| {
            debug!("store lock poisoned");
            domain::StorageError::Unavailable
        })
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Tables {
    fn default() -> Self {
        let engagements = domain::Muscle::iter()
            .flat_map(|muscle| {
                domain::ActivationLevel::iter()
                    .map(move |level| domain::MuscleEngagement::new(muscle, level))
            })
            .zip(1..)
            .map(|(engagement, id)| domain::MuscleEngagement {
                id: Some(domain::EngagementID::from(id)),
                ..engagement
            })
            .collect();
        Self {
            equipments: BTreeMap::new(),
            exercises: BTreeMap::new(),
            engagements,
            next_equipment_id: 1,
            next_exercise_id: 1,
        }
    }
}

impl Tables {
    /// The sequences continue after `next_ids` or after the highest existing
    /// id, whichever is larger, so ids of deleted rows are not handed out again.
    pub(crate) fn with_rows(
        equipments: BTreeMap<domain::EquipmentID, domain::EquipmentName>,
        exercises: BTreeMap<domain::ExerciseID, ExerciseRow>,
        next_ids: (u64, u64),
    ) -> Self {
        let tables = Self::default();
        let (next_equipment_id, next_exercise_id) = next_ids;
        Self {
            next_equipment_id: equipments
                .keys()
                .next_back()
                .map_or(1, |id| **id + 1)
                .max(next_equipment_id),
            next_exercise_id: exercises
                .keys()
                .next_back()
                .map_or(1, |id| **id + 1)
                .max(next_exercise_id),
            equipments,
            exercises,
            ..tables
        }
    }

    pub(crate) fn next_ids(&self) -> (u64, u64) {
        (self.next_equipment_id, self.next_exercise_id)
    }

    pub(crate) fn engagement(&self, id: domain::EngagementID) -> Option<domain::MuscleEngagement> {
        self.engagements.iter().find(|e| e.id == Some(id)).copied()
    }

    pub(crate) fn interned(
        &self,
        candidate: &domain::MuscleEngagement,
    ) -> Option<domain::MuscleEngagement> {
        self.engagements
            .iter()
            .find(|e| e.key() == candidate.key())
            .copied()
    }

    fn equipment(&self, id: domain::EquipmentID) -> Option<domain::Equipment> {
        self.equipments.get(&id).map(|name| domain::Equipment {
            id: Some(id),
            name: name.clone(),
        })
    }

    fn exercise(&self, id: domain::ExerciseID) -> Option<domain::Exercise> {
        self.exercises.get(&id).and_then(|row| self.join(id, row))
    }

    fn join(&self, id: domain::ExerciseID, row: &ExerciseRow) -> Option<domain::Exercise> {
        Some(domain::Exercise {
            id: Some(id),
            name: row.name.clone(),
            description: row.description.clone(),
            equipment: self.equipment(row.equipment_id)?,
            muscle_engagements: row
                .engagement_ids
                .iter()
                .filter_map(|id| self.engagement(*id))
                .collect(),
        })
    }

    fn exercises_where(
        &self,
        predicate: impl Fn(&ExerciseRow) -> bool,
        request: &domain::PageRequest,
    ) -> domain::Page<domain::Exercise> {
        let mut exercises = self
            .exercises
            .iter()
            .filter(|(_, row)| predicate(row))
            .filter_map(|(id, row)| self.join(*id, row))
            .collect::<Vec<_>>();
        exercises.sort_by(|a, b| {
            request
                .direction
                .apply(compare_exercises(a, b, request.order_by))
        });
        request.paginate(exercises)
    }

    fn name_taken(
        &self,
        name: &domain::EquipmentName,
        except: Option<domain::EquipmentID>,
    ) -> bool {
        self.equipments
            .iter()
            .any(|(id, n)| n == name && Some(*id) != except)
    }

    fn key_taken(&self, key: &domain::ExerciseKey, except: Option<domain::ExerciseID>) -> bool {
        self.exercises.iter().any(|(id, row)| {
            row.name == key.name && row.equipment_id == key.equipment_id && Some(*id) != except
        })
    }

    fn intern_all(
        &self,
        engagements: &[domain::MuscleEngagement],
    ) -> Result<Vec<domain::EngagementID>, domain::StorageError> {
        let mut ids = Vec::with_capacity(engagements.len());
        for engagement in engagements {
            let id = self
                .interned(engagement)
                .and_then(|e| e.id)
                .ok_or_else(|| {
                    domain::StorageError::Constraint(format!(
                        "unknown muscle engagement {} {}",
                        engagement.muscle, engagement.activation_level
                    ))
                })?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

fn compare_exercises(
    a: &domain::Exercise,
    b: &domain::Exercise,
    order_by: domain::OrderBy,
) -> Ordering {
    match order_by {
        domain::OrderBy::Id => Ordering::Equal,
        domain::OrderBy::Name => a.name.cmp(&b.name),
        domain::OrderBy::EquipmentName => a.equipment.name.cmp(&b.equipment.name),
    }
    .then_with(|| a.id.cmp(&b.id))
}

impl domain::EquipmentRepository for MemoryStore {
    fn read_equipment(
        &self,
        id: domain::EquipmentID,
    ) -> Result<Option<domain::Equipment>, domain::StorageError> {
        Ok(self.read()?.equipment(id))
    }

    fn read_equipments(
        &self,
        request: &domain::PageRequest,
    ) -> Result<domain::Page<domain::Equipment>, domain::StorageError> {
        let tables = self.read()?;
        let mut equipments = tables
            .equipments
            .iter()
            .map(|(id, name)| domain::Equipment {
                id: Some(*id),
                name: name.clone(),
            })
            .collect::<Vec<_>>();
        equipments.sort_by(|a, b| {
            let ordering = match request.order_by {
                domain::OrderBy::Id => Ordering::Equal,
                domain::OrderBy::Name | domain::OrderBy::EquipmentName => a.name.cmp(&b.name),
            };
            request.direction.apply(ordering.then_with(|| a.id.cmp(&b.id)))
        });
        Ok(request.paginate(equipments))
    }

    fn equipment_exists(&self, id: domain::EquipmentID) -> Result<bool, domain::StorageError> {
        Ok(self.read()?.equipments.contains_key(&id))
    }

    fn equipment_name_exists(
        &self,
        name: &domain::EquipmentName,
    ) -> Result<bool, domain::StorageError> {
        Ok(self.read()?.name_taken(name, None))
    }

    fn write_equipment(
        &self,
        equipment: domain::Equipment,
    ) -> Result<domain::Equipment, domain::StorageError> {
        let mut tables = self.write()?;

        if tables.name_taken(&equipment.name, equipment.id) {
            return Err(domain::StorageError::Constraint(format!(
                "equipment name '{}' already exists",
                equipment.name
            )));
        }

        let id = match equipment.id {
            Some(id) if tables.equipments.contains_key(&id) => id,
            Some(id) => {
                return Err(domain::StorageError::Constraint(format!(
                    "equipment {id} does not exist"
                )));
            }
            None => {
                let id = domain::EquipmentID::from(tables.next_equipment_id);
                tables.next_equipment_id += 1;
                id
            }
        };

        tables.equipments.insert(id, equipment.name.clone());
        debug!("wrote equipment {id}");

        Ok(domain::Equipment {
            id: Some(id),
            name: equipment.name,
        })
    }

    fn delete_equipment(
        &self,
        id: domain::EquipmentID,
    ) -> Result<domain::EquipmentID, domain::StorageError> {
        let mut tables = self.write()?;

        if tables.exercises.values().any(|row| row.equipment_id == id) {
            return Err(domain::StorageError::Constraint(format!(
                "equipment {id} is referenced by exercises"
            )));
        }

        match tables.equipments.remove(&id) {
            Some(_) => Ok(id),
            None => Err(domain::StorageError::Constraint(format!(
                "equipment {id} does not exist"
            ))),
        }
    }
}

impl domain::ExerciseRepository for MemoryStore {
    fn read_exercise(
        &self,
        id: domain::ExerciseID,
    ) -> Result<Option<domain::Exercise>, domain::StorageError> {
        Ok(self.read()?.exercise(id))
    }

    fn read_exercises(
        &self,
        request: &domain::PageRequest,
    ) -> Result<domain::Page<domain::Exercise>, domain::StorageError> {
        Ok(self.read()?.exercises_where(|_| true, request))
    }

    fn read_exercises_by_muscle(
        &self,
        muscle: domain::Muscle,
        request: &domain::PageRequest,
    ) -> Result<domain::Page<domain::Exercise>, domain::StorageError> {
        let tables = self.read()?;
        Ok(tables.exercises_where(
            |row| {
                row.engagement_ids
                    .iter()
                    .filter_map(|id| tables.engagement(*id))
                    .any(|e| e.muscle == muscle)
            },
            request,
        ))
    }

    fn read_exercises_by_equipment(
        &self,
        equipment_id: domain::EquipmentID,
        request: &domain::PageRequest,
    ) -> Result<domain::Page<domain::Exercise>, domain::StorageError> {
        Ok(self
            .read()?
            .exercises_where(|row| row.equipment_id == equipment_id, request))
    }

    fn exercise_exists(&self, id: domain::ExerciseID) -> Result<bool, domain::StorageError> {
        Ok(self.read()?.exercises.contains_key(&id))
    }

    fn exercise_key_exists(&self, key: &domain::ExerciseKey) -> Result<bool, domain::StorageError> {
        Ok(self.read()?.key_taken(key, None))
    }

    fn write_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::StorageError> {
        let mut tables = self.write()?;

        let equipment_id = exercise
            .equipment
            .id
            .filter(|id| tables.equipments.contains_key(id))
            .ok_or_else(|| {
                domain::StorageError::Constraint(format!(
                    "equipment '{}' does not exist",
                    exercise.equipment.name
                ))
            })?;

        let key = domain::ExerciseKey {
            name: exercise.name.clone(),
            equipment_id,
        };

        if tables.key_taken(&key, exercise.id) {
            return Err(domain::StorageError::Constraint(format!(
                "exercise '{}' already exists for equipment {equipment_id}",
                exercise.name
            )));
        }

        let engagement_ids = tables.intern_all(&exercise.muscle_engagements)?;

        let id = match exercise.id {
            Some(id) if tables.exercises.contains_key(&id) => id,
            Some(id) => {
                return Err(domain::StorageError::Constraint(format!(
                    "exercise {id} does not exist"
                )));
            }
            None => {
                let id = domain::ExerciseID::from(tables.next_exercise_id);
                tables.next_exercise_id += 1;
                id
            }
        };

        let row = ExerciseRow {
            name: exercise.name,
            description: exercise.description,
            equipment_id,
            engagement_ids,
        };
        let exercise = tables.join(id, &row);
        tables.exercises.insert(id, row);
        debug!("wrote exercise {id}");

        exercise.ok_or_else(|| {
            domain::StorageError::Constraint(format!("exercise {id} is inconsistent"))
        })
    }

    fn delete_exercise(
        &self,
        id: domain::ExerciseID,
    ) -> Result<domain::ExerciseID, domain::StorageError> {
        match self.write()?.exercises.remove(&id) {
            Some(_) => Ok(id),
            None => Err(domain::StorageError::Constraint(format!(
                "exercise {id} does not exist"
            ))),
        }
    }
}

impl domain::MuscleEngagementRepository for MemoryStore {
    fn read_muscle_engagements(
        &self,
    ) -> Result<Vec<domain::MuscleEngagement>, domain::StorageError> {
        Ok(self.read()?.engagements.clone())
    }

    fn find_muscle_engagements(
        &self,
        candidates: &[domain::MuscleEngagement],
    ) -> Result<Vec<domain::MuscleEngagement>, domain::StorageError> {
        let tables = self.read()?;
        let mut found: Vec<domain::MuscleEngagement> = Vec::with_capacity(candidates.len());
        for engagement in candidates.iter().filter_map(|c| tables.interned(c)) {
            if !found.contains(&engagement) {
                found.push(engagement);
            }
        }
        Ok(found)
    }
}
