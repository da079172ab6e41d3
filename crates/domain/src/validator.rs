//! Invariants of the equipment, exercise and muscle engagement graph.
//!
//! The validator is stateless. Every store access goes through the
//! capability passed in by the caller, and every answer is taken as
//! authoritative at call time. Storage failures are passed through unchanged.

use std::fmt::Display;

use crate::{
    CatalogError, DefaultMessages, Equipment, EquipmentID, EquipmentName, Exercise, ExerciseDraft,
    ExerciseID, ExerciseKey, ExerciseName, ExercisePatch, Exists, Lookup, MessageKey,
    MessageResolver, MuscleEngagement, Resolve,
};

#[derive(Debug, Default, Clone)]
pub struct Validator<M = DefaultMessages> {
    messages: M,
}

impl<M: MessageResolver> Validator<M> {
    pub fn new(messages: M) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &M {
        &self.messages
    }

    pub fn require_id_absent<I>(&self, id: Option<I>, key: MessageKey) -> Result<(), CatalogError> {
        match id {
            Some(_) => Err(self.invalid_argument(key, &[])),
            None => Ok(()),
        }
    }

    pub fn require_id_present<I>(&self, id: Option<I>, key: MessageKey) -> Result<I, CatalogError> {
        id.ok_or_else(|| self.invalid_argument(key, &[]))
    }

    pub fn validate_get_equipment(
        &self,
        id: Option<EquipmentID>,
        lookup: &impl Lookup<EquipmentID, Equipment>,
    ) -> Result<Equipment, CatalogError> {
        let id = self.require_id_present(id, MessageKey::IdIsNull)?;
        self.resolve_equipment(id, lookup)
    }

    pub fn validate_create_equipment(
        &self,
        equipment: &Equipment,
        exists_by_name: &impl Exists<EquipmentName>,
    ) -> Result<(), CatalogError> {
        self.require_id_absent(equipment.id, MessageKey::EquipmentSaveIdIsNotNull)?;
        self.ensure_equipment_name_free(&equipment.name, exists_by_name)
    }

    /// The name check does not exempt the equipment's own current name.
    pub fn validate_update_equipment(
        &self,
        equipment: &Equipment,
        exists_by_id: &impl Exists<EquipmentID>,
        exists_by_name: &impl Exists<EquipmentName>,
    ) -> Result<(), CatalogError> {
        let id = self.require_id_present(equipment.id, MessageKey::EquipmentUpdateIdIsNull)?;
        self.ensure_equipment_exists(id, exists_by_id)?;
        self.ensure_equipment_name_free(&equipment.name, exists_by_name)
    }

    pub fn validate_delete_equipment(
        &self,
        id: Option<EquipmentID>,
        exists_by_id: &impl Exists<EquipmentID>,
    ) -> Result<EquipmentID, CatalogError> {
        let id = self.require_id_present(id, MessageKey::IdIsNull)?;
        self.ensure_equipment_exists(id, exists_by_id)?;
        Ok(id)
    }

    pub fn validate_get_exercise(
        &self,
        id: Option<ExerciseID>,
        lookup: &impl Lookup<ExerciseID, Exercise>,
    ) -> Result<Exercise, CatalogError> {
        let id = self.require_id_present(id, MessageKey::IdIsNull)?;
        self.resolve_exercise(id, lookup)
    }

    pub fn validate_create_exercise(
        &self,
        draft: ExerciseDraft,
        exists_by_key: &impl Exists<ExerciseKey>,
        equipment_lookup: &impl Lookup<EquipmentID, Equipment>,
        engagement_resolver: &impl Resolve<MuscleEngagement>,
    ) -> Result<Exercise, CatalogError> {
        self.require_id_absent(draft.id, MessageKey::ExerciseSaveIdIsNotNull)?;
        self.resolve_draft(draft, exists_by_key, equipment_lookup, engagement_resolver)
    }

    pub fn validate_update_exercise(
        &self,
        draft: ExerciseDraft,
        exists_by_id: &impl Exists<ExerciseID>,
        exists_by_key: &impl Exists<ExerciseKey>,
        equipment_lookup: &impl Lookup<EquipmentID, Equipment>,
        engagement_resolver: &impl Resolve<MuscleEngagement>,
    ) -> Result<Exercise, CatalogError> {
        let id = self.require_id_present(draft.id, MessageKey::ExerciseUpdateIdIsNull)?;
        if !exists_by_id.exists(&id)? {
            return Err(self.not_found(MessageKey::ExerciseNotExistsById, &id));
        }
        self.resolve_draft(draft, exists_by_key, equipment_lookup, engagement_resolver)
    }

    /// Overlays the present, non-blank fields of `patch` onto the persisted
    /// exercise. Muscle engagements are always resolved again. The uniqueness
    /// key is only checked again when the merge changed it, so an unchanged
    /// exercise never conflicts with itself.
    pub fn validate_partial_update_exercise(
        &self,
        patch: ExercisePatch,
        exercise_lookup: &impl Lookup<ExerciseID, Exercise>,
        exists_by_key: &impl Exists<ExerciseKey>,
        equipment_lookup: &impl Lookup<EquipmentID, Equipment>,
        engagement_resolver: &impl Resolve<MuscleEngagement>,
    ) -> Result<Exercise, CatalogError> {
        let id = self.require_id_present(patch.id, MessageKey::ExerciseUpdateIdIsNull)?;
        let persisted = self.resolve_exercise(id, exercise_lookup)?;

        let name = match patch.name.filter(|name| !name.trim().is_empty()) {
            Some(name) => ExerciseName::new(&name)
                .map_err(|err| self.invalid_argument(MessageKey::InvalidValue, &[&"name", &err]))?,
            None => persisted.name.clone(),
        };

        let description = patch
            .description
            .filter(|description| !description.trim().is_empty())
            .unwrap_or_else(|| persisted.description.clone());

        let equipment = match patch.equipment_id {
            Some(equipment_id) => self.resolve_equipment(equipment_id, equipment_lookup)?,
            None => persisted.equipment.clone(),
        };

        let candidates = if patch.muscle_engagements.is_empty() {
            &persisted.muscle_engagements
        } else {
            &patch.muscle_engagements
        };
        let muscle_engagements = self.resolve_engagements(candidates, engagement_resolver)?;

        if name != persisted.name || equipment.id != persisted.equipment.id {
            let equipment_id =
                self.require_id_present(equipment.id, MessageKey::IdIsNull)?;
            self.ensure_exercise_key_free(
                &ExerciseKey {
                    name: name.clone(),
                    equipment_id,
                },
                exists_by_key,
            )?;
        }

        Ok(Exercise {
            id: persisted.id,
            name,
            description,
            equipment,
            muscle_engagements,
        })
    }

    pub fn validate_delete_exercise(
        &self,
        id: Option<ExerciseID>,
        exists_by_id: &impl Exists<ExerciseID>,
    ) -> Result<ExerciseID, CatalogError> {
        let id = self.require_id_present(id, MessageKey::IdIsNull)?;
        if !exists_by_id.exists(&id)? {
            return Err(self.not_found(MessageKey::ExerciseNotExistsById, &id));
        }
        Ok(id)
    }

    fn resolve_draft(
        &self,
        draft: ExerciseDraft,
        exists_by_key: &impl Exists<ExerciseKey>,
        equipment_lookup: &impl Lookup<EquipmentID, Equipment>,
        engagement_resolver: &impl Resolve<MuscleEngagement>,
    ) -> Result<Exercise, CatalogError> {
        let key = ExerciseKey {
            name: draft.name,
            equipment_id: draft.equipment_id,
        };
        self.ensure_exercise_key_free(&key, exists_by_key)?;
        let equipment = self.resolve_equipment(key.equipment_id, equipment_lookup)?;
        let muscle_engagements =
            self.resolve_engagements(&draft.muscle_engagements, engagement_resolver)?;
        Ok(Exercise {
            id: draft.id,
            name: key.name,
            description: draft.description,
            equipment,
            muscle_engagements,
        })
    }

    fn resolve_equipment(
        &self,
        id: EquipmentID,
        lookup: &impl Lookup<EquipmentID, Equipment>,
    ) -> Result<Equipment, CatalogError> {
        lookup
            .lookup(&id)?
            .ok_or_else(|| self.not_found(MessageKey::EquipmentNotExistsById, &id))
    }

    fn resolve_exercise(
        &self,
        id: ExerciseID,
        lookup: &impl Lookup<ExerciseID, Exercise>,
    ) -> Result<Exercise, CatalogError> {
        lookup
            .lookup(&id)?
            .ok_or_else(|| self.not_found(MessageKey::ExerciseNotExistsById, &id))
    }

    /// Unknown candidates are dropped, but at least one has to remain.
    fn resolve_engagements(
        &self,
        candidates: &[MuscleEngagement],
        resolver: &impl Resolve<MuscleEngagement>,
    ) -> Result<Vec<MuscleEngagement>, CatalogError> {
        let resolved = resolver.resolve(candidates)?;
        if resolved.is_empty() {
            return Err(self.invalid_argument(MessageKey::ExerciseMuscleEngagementsEmpty, &[]));
        }
        Ok(resolved)
    }

    fn ensure_equipment_exists(
        &self,
        id: EquipmentID,
        exists_by_id: &impl Exists<EquipmentID>,
    ) -> Result<(), CatalogError> {
        if exists_by_id.exists(&id)? {
            Ok(())
        } else {
            Err(self.not_found(MessageKey::EquipmentNotExistsById, &id))
        }
    }

    fn ensure_equipment_name_free(
        &self,
        name: &EquipmentName,
        exists_by_name: &impl Exists<EquipmentName>,
    ) -> Result<(), CatalogError> {
        if exists_by_name.exists(name)? {
            Err(CatalogError::Conflict(
                self.messages
                    .message(MessageKey::EquipmentExistsByName, &[name]),
            ))
        } else {
            Ok(())
        }
    }

    fn ensure_exercise_key_free(
        &self,
        key: &ExerciseKey,
        exists_by_key: &impl Exists<ExerciseKey>,
    ) -> Result<(), CatalogError> {
        if exists_by_key.exists(key)? {
            Err(CatalogError::Conflict(self.messages.message(
                MessageKey::ExerciseExistsByNameAndEquipmentId,
                &[&key.name, &key.equipment_id],
            )))
        } else {
            Ok(())
        }
    }

    fn invalid_argument(&self, key: MessageKey, params: &[&dyn Display]) -> CatalogError {
        CatalogError::InvalidArgument(self.messages.message(key, params))
    }

    fn not_found(&self, key: MessageKey, id: &dyn Display) -> CatalogError {
        CatalogError::NotFound(self.messages.message(key, &[id]))
    }
}
