use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Statement};

use models::person;

use crate::errors::ServiceError;
use crate::person::domain::Person;
use crate::person::predicate::Filter;
use crate::person::repository::PersonRepository;

pub struct SeaOrmPersonRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmPersonRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn query_err(e: sea_orm::DbErr) -> ServiceError { ServiceError::Query(e.to_string()) }

#[async_trait::async_trait]
impl PersonRepository for SeaOrmPersonRepository {
    async fn list(&self) -> Result<Vec<Person>, ServiceError> {
        person::Entity::find()
            .order_by_asc(person::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_err)
    }

    async fn find_where(&self, filter: &Filter) -> Result<Vec<Person>, ServiceError> {
        person::Entity::find()
            .filter(filter.to_condition())
            .order_by_asc(person::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_err)
    }

    async fn find_where_raw(&self, clause: &str) -> Result<Vec<Person>, ServiceError> {
        let sql = format!("SELECT id, first_name, last_name FROM person WHERE {clause}");
        let stmt = Statement::from_string(self.db.get_database_backend(), sql);
        person::Entity::find()
            .from_raw_sql(stmt)
            .all(&self.db)
            .await
            .map_err(query_err)
    }

    async fn get(&self, id: i32) -> Result<Option<Person>, ServiceError> {
        person::find(&self.db, id)
            .await
            .map_err(|e| ServiceError::Query(e.to_string()))
    }

    async fn insert(&self, first_name: &str, last_name: &str) -> Result<Person, ServiceError> {
        Ok(person::create(&self.db, first_name, last_name).await?)
    }

    async fn update(&self, p: &Person) -> Result<Person, ServiceError> {
        Ok(person::update_names(&self.db, p.id, &p.first_name, &p.last_name).await?)
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        Ok(person::delete(&self.db, id).await? > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::predicate;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn seaorm_repository_round_trip() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let repo = SeaOrmPersonRepository::new(get_db().await?);

        let rob = repo.insert("Rob", "Pike").await?;
        let ken = repo.insert("Ken", "Thompson").await?;
        assert_eq!(repo.list().await?, vec![rob.clone(), ken.clone()]);

        let by_name = repo.find_where(&predicate::parse("last_name='Thompson'")?).await?;
        assert_eq!(by_name, vec![ken.clone()]);

        let raw = repo.find_where_raw(&format!("id={}", rob.id)).await?;
        assert_eq!(raw, vec![rob.clone()]);

        let renamed = Person { first_name: "Robert".into(), ..rob.clone() };
        assert_eq!(repo.update(&renamed).await?, renamed);
        assert_eq!(repo.get(rob.id).await?, Some(renamed));

        assert!(repo.delete(rob.id).await?);
        assert!(!repo.delete(rob.id).await?);
        assert_eq!(repo.list().await?, vec![ken]);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_raw_clause_is_a_query_error() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let repo = SeaOrmPersonRepository::new(get_db().await?);

        let err = repo.find_where_raw("id = = 1").await.unwrap_err();
        assert!(matches!(err, ServiceError::Query(_)));
        Ok(())
    }
}
