use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};

use crate::{EquipmentName, Page, PageRequest, StorageError};

pub trait EquipmentRepository {
    fn read_equipment(&self, id: EquipmentID) -> Result<Option<Equipment>, StorageError>;
    fn read_equipments(&self, request: &PageRequest) -> Result<Page<Equipment>, StorageError>;
    fn equipment_exists(&self, id: EquipmentID) -> Result<bool, StorageError>;
    fn equipment_name_exists(&self, name: &EquipmentName) -> Result<bool, StorageError>;
    /// Inserts `equipment` when its id is absent, otherwise replaces the stored row.
    fn write_equipment(&self, equipment: Equipment) -> Result<Equipment, StorageError>;
    fn delete_equipment(&self, id: EquipmentID) -> Result<EquipmentID, StorageError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: Option<EquipmentID>,
    pub name: EquipmentName,
}

impl Equipment {
    #[must_use]
    pub fn new(name: EquipmentName) -> Self {
        Self { id: None, name }
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
pub struct EquipmentID(u64);
