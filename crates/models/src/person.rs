use sea_orm::{entity::prelude::*, DatabaseConnection, NotSet, Set};
use serde::{Deserialize, Serialize};

use crate::errors;

/// Message shared by every write that fails the name check.
pub const EMPTY_FIELDS: &str = "fields are empty";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "person")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Both names must be non-empty. Whitespace counts as content.
pub fn validate_names(first_name: &str, last_name: &str) -> Result<(), errors::ModelError> {
    if first_name.is_empty() || last_name.is_empty() {
        return Err(errors::ModelError::Validation(EMPTY_FIELDS.into()));
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, first_name: &str, last_name: &str) -> Result<Model, errors::ModelError> {
    validate_names(first_name, last_name)?;
    let am = ActiveModel {
        id: NotSet,
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.to_string()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id).one(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Overwrite both names of row `id`. The row must exist.
pub async fn update_names(db: &DatabaseConnection, id: i32, first_name: &str, last_name: &str) -> Result<Model, errors::ModelError> {
    validate_names(first_name, last_name)?;
    let am = ActiveModel {
        id: Set(id),
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.to_string()),
    };
    am.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Returns the number of rows removed (0 or 1).
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<u64, errors::ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected)
}
