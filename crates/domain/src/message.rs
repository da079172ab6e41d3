use std::fmt::Display;

#[derive(strum::AsRefStr, strum::EnumIter, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    #[strum(serialize = "exception.generic.id_is_null")]
    IdIsNull,
    #[strum(serialize = "exception.equipment.save.id_is_not_null")]
    EquipmentSaveIdIsNotNull,
    #[strum(serialize = "exception.equipment.update.id_is_null")]
    EquipmentUpdateIdIsNull,
    #[strum(serialize = "exception.equipment.not_exists_by_id")]
    EquipmentNotExistsById,
    #[strum(serialize = "exception.equipment.exists_by_name")]
    EquipmentExistsByName,
    #[strum(serialize = "exception.exercise.save.id_is_not_null")]
    ExerciseSaveIdIsNotNull,
    #[strum(serialize = "exception.exercise.update.id_is_null")]
    ExerciseUpdateIdIsNull,
    #[strum(serialize = "exception.exercise.not_exists_by_id")]
    ExerciseNotExistsById,
    #[strum(serialize = "exception.exercise.exists_by_name_and_equipment_id")]
    ExerciseExistsByNameAndEquipmentId,
    #[strum(serialize = "exception.exercise.muscle_engagements_empty")]
    ExerciseMuscleEngagementsEmpty,
    #[strum(serialize = "validation.invalid_value.message")]
    InvalidValue,
    #[strum(serialize = "exception.insufficient.authentication")]
    InsufficientAuthentication,
    #[strum(serialize = "exception.insufficient.permissions")]
    InsufficientPermissions,
}

/// Turns an error code and its positional parameters into a readable message.
pub trait MessageResolver {
    fn message(&self, key: MessageKey, params: &[&dyn Display]) -> String;
}

/// Built-in English messages. `{0}`, `{1}`, ... are replaced by the parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMessages;

impl DefaultMessages {
    fn template(key: MessageKey) -> &'static str {
        match key {
            MessageKey::IdIsNull => "The ID must not be null",
            MessageKey::EquipmentSaveIdIsNotNull => "A new equipment must not have an ID",
            MessageKey::EquipmentUpdateIdIsNull => "The ID of the equipment to update is required",
            MessageKey::EquipmentNotExistsById => "Equipment with ID {0} does not exist",
            MessageKey::EquipmentExistsByName => "Equipment with name '{0}' already exists",
            MessageKey::ExerciseSaveIdIsNotNull => "A new exercise must not have an ID",
            MessageKey::ExerciseUpdateIdIsNull => "The ID of the exercise to update is required",
            MessageKey::ExerciseNotExistsById => "Exercise with ID {0} does not exist",
            MessageKey::ExerciseExistsByNameAndEquipmentId => {
                "Exercise with name '{0}' already exists for equipment with ID {1}"
            }
            MessageKey::ExerciseMuscleEngagementsEmpty => {
                "An exercise must engage at least one known muscle"
            }
            MessageKey::InvalidValue => "Invalid value for '{0}': {1}",
            MessageKey::InsufficientAuthentication => {
                "Full authentication is required to access this resource"
            }
            MessageKey::InsufficientPermissions => {
                "You do not have permission to perform this action"
            }
        }
    }
}

impl MessageResolver for DefaultMessages {
    fn message(&self, key: MessageKey, params: &[&dyn Display]) -> String {
        params
            .iter()
            .enumerate()
            .fold(Self::template(key).to_string(), |message, (i, param)| {
                message.replace(&format!("{{{i}}}"), &param.to_string())
            })
    }
}
