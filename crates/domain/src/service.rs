use log::{debug, error, info};

use crate::{
    CatalogError, Equipment, EquipmentID, EquipmentName, EquipmentRepository, Exercise,
    ExerciseDraft, ExerciseID, ExerciseKey, ExercisePatch, ExerciseRepository, MessageKey,
    MessageResolver, Muscle, MuscleEngagement, MuscleEngagementRepository, OrderBy, Page,
    PageRequest, StorageError, Validator,
};

pub trait EquipmentService {
    fn get_equipment(&self, id: Option<EquipmentID>) -> Result<Equipment, CatalogError>;
    fn get_equipments(&self, request: &PageRequest) -> Result<Page<Equipment>, CatalogError>;
    fn create_equipment(&self, equipment: Equipment) -> Result<Equipment, CatalogError>;
    fn replace_equipment(&self, equipment: Equipment) -> Result<Equipment, CatalogError>;
    fn delete_equipment(&self, id: Option<EquipmentID>) -> Result<EquipmentID, CatalogError>;
}

pub trait ExerciseService {
    fn get_exercise(&self, id: Option<ExerciseID>) -> Result<Exercise, CatalogError>;
    fn get_exercises(&self, request: &PageRequest) -> Result<Page<Exercise>, CatalogError>;
    fn get_exercises_by_muscle(
        &self,
        muscle: Muscle,
        request: &PageRequest,
    ) -> Result<Page<Exercise>, CatalogError>;
    fn get_exercises_by_equipment(
        &self,
        equipment_id: Option<EquipmentID>,
        request: &PageRequest,
    ) -> Result<Page<Exercise>, CatalogError>;
    fn create_exercise(&self, draft: ExerciseDraft) -> Result<Exercise, CatalogError>;
    fn replace_exercise(&self, draft: ExerciseDraft) -> Result<Exercise, CatalogError>;
    fn modify_exercise(&self, patch: ExercisePatch) -> Result<Exercise, CatalogError>;
    fn delete_exercise(&self, id: Option<ExerciseID>) -> Result<ExerciseID, CatalogError>;
}

pub trait MuscleEngagementService {
    fn get_muscle_engagements(&self) -> Result<Vec<MuscleEngagement>, CatalogError>;
}

/// Runs every operation through the validator before touching the repository.
pub struct Service<R, M = crate::DefaultMessages> {
    repository: R,
    validator: Validator<M>,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            validator: Validator::default(),
        }
    }
}

impl<R, M: MessageResolver> Service<R, M> {
    pub fn with_validator(repository: R, validator: Validator<M>) -> Self {
        Self {
            repository,
            validator,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    fn check_order_by(
        &self,
        request: &PageRequest,
        allowed: &[OrderBy],
    ) -> Result<(), CatalogError> {
        request.ensure_order_by(allowed).map_err(|err| {
            CatalogError::InvalidArgument(
                self.validator
                    .messages()
                    .message(MessageKey::InvalidValue, &[&"order_by", &err]),
            )
        })
    }
}

macro_rules! log_on_error {
    ($func: expr, $action: literal, $entity: literal) => {{
        let result = $func;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                CatalogError::Storage(StorageError::Unavailable) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: EquipmentRepository, M: MessageResolver> EquipmentService for Service<R, M> {
    fn get_equipment(&self, id: Option<EquipmentID>) -> Result<Equipment, CatalogError> {
        log_on_error!(
            self.validator.validate_get_equipment(id, &|id: &EquipmentID| {
                self.repository.read_equipment(*id)
            }),
            "get",
            "equipment"
        )
    }

    fn get_equipments(&self, request: &PageRequest) -> Result<Page<Equipment>, CatalogError> {
        log_on_error!(
            self.check_order_by(request, &[OrderBy::Id, OrderBy::Name])
                .and_then(|()| {
                    self.repository.read_equipments(request).map_err(CatalogError::from)
                }),
            "get",
            "equipments"
        )
    }

    fn create_equipment(&self, equipment: Equipment) -> Result<Equipment, CatalogError> {
        log_on_error!(
            self.validator
                .validate_create_equipment(&equipment, &|name: &EquipmentName| {
                    self.repository.equipment_name_exists(name)
                })
                .and_then(|()| {
                    self.repository.write_equipment(equipment).map_err(CatalogError::from)
                })
                .inspect(|equipment| info!("created equipment {}", equipment.name)),
            "create",
            "equipment"
        )
    }

    fn replace_equipment(&self, equipment: Equipment) -> Result<Equipment, CatalogError> {
        log_on_error!(
            self.validator
                .validate_update_equipment(
                    &equipment,
                    &|id: &EquipmentID| self.repository.equipment_exists(*id),
                    &|name: &EquipmentName| self.repository.equipment_name_exists(name),
                )
                .and_then(|()| {
                    self.repository.write_equipment(equipment).map_err(CatalogError::from)
                }),
            "replace",
            "equipment"
        )
    }

    fn delete_equipment(&self, id: Option<EquipmentID>) -> Result<EquipmentID, CatalogError> {
        log_on_error!(
            self.validator
                .validate_delete_equipment(id, &|id: &EquipmentID| {
                    self.repository.equipment_exists(*id)
                })
                .and_then(|id| {
                    self.repository.delete_equipment(id).map_err(CatalogError::from)
                }),
            "delete",
            "equipment"
        )
    }
}

impl<R, M> ExerciseService for Service<R, M>
where
    R: ExerciseRepository + EquipmentRepository + MuscleEngagementRepository,
    M: MessageResolver,
{
    fn get_exercise(&self, id: Option<ExerciseID>) -> Result<Exercise, CatalogError> {
        log_on_error!(
            self.validator.validate_get_exercise(id, &|id: &ExerciseID| {
                self.repository.read_exercise(*id)
            }),
            "get",
            "exercise"
        )
    }

    fn get_exercises(&self, request: &PageRequest) -> Result<Page<Exercise>, CatalogError> {
        log_on_error!(
            self.repository.read_exercises(request).map_err(CatalogError::from),
            "get",
            "exercises"
        )
    }

    fn get_exercises_by_muscle(
        &self,
        muscle: Muscle,
        request: &PageRequest,
    ) -> Result<Page<Exercise>, CatalogError> {
        log_on_error!(
            self.repository
                .read_exercises_by_muscle(muscle, request)
                .map_err(CatalogError::from),
            "get",
            "exercises by muscle"
        )
    }

    fn get_exercises_by_equipment(
        &self,
        equipment_id: Option<EquipmentID>,
        request: &PageRequest,
    ) -> Result<Page<Exercise>, CatalogError> {
        log_on_error!(
            self.validator
                .validate_get_equipment(equipment_id, &|id: &EquipmentID| {
                    self.repository.read_equipment(*id)
                })
                .and_then(|equipment| {
                    let id = self
                        .validator
                        .require_id_present(equipment.id, MessageKey::IdIsNull)?;
                    self.repository
                        .read_exercises_by_equipment(id, request)
                        .map_err(CatalogError::from)
                }),
            "get",
            "exercises by equipment"
        )
    }

    fn create_exercise(&self, draft: ExerciseDraft) -> Result<Exercise, CatalogError> {
        log_on_error!(
            self.validator
                .validate_create_exercise(
                    draft,
                    &|key: &ExerciseKey| self.repository.exercise_key_exists(key),
                    &|id: &EquipmentID| self.repository.read_equipment(*id),
                    &|candidates: &[MuscleEngagement]| {
                        self.repository.find_muscle_engagements(candidates)
                    },
                )
                .and_then(|exercise| {
                    self.repository.write_exercise(exercise).map_err(CatalogError::from)
                })
                .inspect(|exercise| info!("created exercise {}", exercise.name)),
            "create",
            "exercise"
        )
    }

    fn replace_exercise(&self, draft: ExerciseDraft) -> Result<Exercise, CatalogError> {
        log_on_error!(
            self.validator
                .validate_update_exercise(
                    draft,
                    &|id: &ExerciseID| self.repository.exercise_exists(*id),
                    &|key: &ExerciseKey| self.repository.exercise_key_exists(key),
                    &|id: &EquipmentID| self.repository.read_equipment(*id),
                    &|candidates: &[MuscleEngagement]| {
                        self.repository.find_muscle_engagements(candidates)
                    },
                )
                .and_then(|exercise| {
                    self.repository.write_exercise(exercise).map_err(CatalogError::from)
                }),
            "replace",
            "exercise"
        )
    }

    fn modify_exercise(&self, patch: ExercisePatch) -> Result<Exercise, CatalogError> {
        log_on_error!(
            self.validator
                .validate_partial_update_exercise(
                    patch,
                    &|id: &ExerciseID| self.repository.read_exercise(*id),
                    &|key: &ExerciseKey| self.repository.exercise_key_exists(key),
                    &|id: &EquipmentID| self.repository.read_equipment(*id),
                    &|candidates: &[MuscleEngagement]| {
                        self.repository.find_muscle_engagements(candidates)
                    },
                )
                .and_then(|exercise| {
                    self.repository.write_exercise(exercise).map_err(CatalogError::from)
                }),
            "modify",
            "exercise"
        )
    }

    fn delete_exercise(&self, id: Option<ExerciseID>) -> Result<ExerciseID, CatalogError> {
        log_on_error!(
            self.validator
                .validate_delete_exercise(id, &|id: &ExerciseID| {
                    self.repository.exercise_exists(*id)
                })
                .and_then(|id| {
                    self.repository.delete_exercise(id).map_err(CatalogError::from)
                }),
            "delete",
            "exercise"
        )
    }
}

impl<R: MuscleEngagementRepository, M: MessageResolver> MuscleEngagementService
    for Service<R, M>
{
    fn get_muscle_engagements(&self) -> Result<Vec<MuscleEngagement>, CatalogError> {
        log_on_error!(
            self.repository.read_muscle_engagements().map_err(CatalogError::from),
            "get",
            "muscle engagements"
        )
    }
}
