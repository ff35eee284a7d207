use std::sync::Arc;

use configs::PredicateMode;
use tracing::{info, instrument, warn};

use super::domain::{Person, PersonInput};
use super::predicate;
use super::repository::PersonRepository;
use crate::errors::ServiceError;

/// Record service independent of the web framework.
///
/// Every operation issues at most two statements (lookup, then write) and no
/// transaction; a failed lookup aborts before anything is written.
pub struct PersonService<R: PersonRepository + ?Sized> {
    repo: Arc<R>,
    mode: PredicateMode,
}

/// Path ids arrive as text; anything that is not an `i32` cannot name a row.
pub fn parse_id(raw: &str) -> Result<i32, ServiceError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ServiceError::InvalidId(raw.to_string()))
}

impl<R: PersonRepository + ?Sized> PersonService<R> {
    pub fn new(repo: Arc<R>, mode: PredicateMode) -> Self { Self { repo, mode } }

    pub fn predicate_mode(&self) -> PredicateMode { self.mode }

    /// All records in store order.
    pub async fn list(&self) -> Result<Vec<Person>, ServiceError> {
        self.repo.list().await
    }

    /// Records matching a caller-supplied predicate.
    ///
    /// # Examples
    /// ```
    /// use service::person::{PersonService, domain::PersonInput, repository::mock::MockPersonRepository};
    /// use std::sync::Arc;
    /// let svc = PersonService::new(Arc::new(MockPersonRepository::default()), configs::PredicateMode::Structured);
    /// let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    /// let rob = rt.block_on(svc.create(PersonInput::new("Rob", "Pike"))).unwrap();
    /// let hits = rt.block_on(svc.find_by_clause(&format!("id={}", rob.id))).unwrap();
    /// assert_eq!(hits, vec![rob]);
    /// ```
    #[instrument(skip(self), fields(mode = ?self.mode))]
    pub async fn find_by_clause(&self, clause: &str) -> Result<Vec<Person>, ServiceError> {
        match self.mode {
            PredicateMode::Structured => {
                let filter = predicate::parse(clause)
                    .map_err(|e| ServiceError::InvalidPredicate(e.to_string()))?;
                self.repo.find_where(&filter).await
            }
            PredicateMode::Raw => self.repo.find_where_raw(clause).await,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: PersonInput) -> Result<Person, ServiceError> {
        models::person::validate_names(&input.first_name, &input.last_name)?;
        let created = self.repo.insert(&input.first_name, &input.last_name).await?;
        info!(id = created.id, "person_created");
        Ok(created)
    }

    /// Lookup by id, then validate the merged record, then write.
    #[instrument(skip(self, input))]
    pub async fn update(&self, raw_id: &str, input: PersonInput) -> Result<Person, ServiceError> {
        let id = parse_id(raw_id)?;
        if self.repo.get(id).await?.is_none() {
            return Err(ServiceError::not_found("person"));
        }
        let merged = input.into_person(id);
        models::person::validate_names(&merged.first_name, &merged.last_name)?;
        let updated = self.repo.update(&merged).await?;
        info!(id, "person_updated");
        Ok(updated)
    }

    /// Lookup by id, then delete. Returns the id that was removed.
    #[instrument(skip(self))]
    pub async fn delete(&self, raw_id: &str) -> Result<i32, ServiceError> {
        let id = parse_id(raw_id)?;
        if self.repo.get(id).await?.is_none() {
            return Err(ServiceError::not_found("person"));
        }
        if !self.repo.delete(id).await? {
            // Removed by a concurrent request between lookup and delete.
            warn!(id, "person_vanished_before_delete");
            return Err(ServiceError::not_found("person"));
        }
        info!(id, "person_deleted");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::repository::mock::MockPersonRepository;

    fn service() -> (Arc<MockPersonRepository>, PersonService<MockPersonRepository>) {
        let repo = Arc::new(MockPersonRepository::default());
        let svc = PersonService::new(Arc::clone(&repo), PredicateMode::Structured);
        (repo, svc)
    }

    #[tokio::test]
    async fn create_assigns_fresh_ids() -> Result<(), anyhow::Error> {
        let (_, svc) = service();
        let a = svc.create(PersonInput::new("Dennis", "Ritchie")).await?;
        let b = svc.create(PersonInput::new("Rob", "Pike")).await?;
        assert!(a.id > 0);
        assert_ne!(a.id, b.id);
        assert_eq!(b.first_name, "Rob");
        Ok(())
    }

    #[tokio::test]
    async fn create_with_empty_field_writes_nothing() {
        let (repo, svc) = service();
        let err = svc.create(PersonInput::new("", "Pike")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let err = svc.create(PersonInput::new("Rob", "")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn update_checks_existence_before_fields() -> Result<(), anyhow::Error> {
        let (repo, svc) = service();
        // Missing row wins over empty fields.
        let err = svc.update("42", PersonInput::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let p = svc.create(PersonInput::new("John", "Doe")).await?;
        let err = svc.update(&p.id.to_string(), PersonInput::new("Jane", "")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(svc.list().await?, vec![p.clone()]);
        assert_eq!(repo.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn update_is_idempotent() -> Result<(), anyhow::Error> {
        let (_, svc) = service();
        let p = svc.create(PersonInput::new("John", "Doe")).await?;
        let id = p.id.to_string();
        let first = svc.update(&id, PersonInput::new("Jane", "Doe")).await?;
        let second = svc.update(&id, PersonInput::new("Jane", "Doe")).await?;
        assert_eq!(first, second);
        assert_eq!(first.id, p.id);
        assert_eq!(svc.find_by_clause(&format!("id={id}")).await?, vec![first]);
        Ok(())
    }

    #[tokio::test]
    async fn non_numeric_ids_are_rejected_before_lookup() {
        let (repo, svc) = service();
        repo.fail_reads(true);
        let err = svc.update("abc", PersonInput::new("a", "b")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidId(_)));
        let err = svc.delete("1 OR 1=1").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidId(_)));
    }

    #[tokio::test]
    async fn delete_then_delete_again() -> Result<(), anyhow::Error> {
        let (_, svc) = service();
        let p = svc.create(PersonInput::new("Ken", "Thompson")).await?;
        let id = p.id.to_string();
        assert_eq!(svc.delete(&id).await?, p.id);
        assert!(svc.find_by_clause(&id).await?.is_empty());
        let err = svc.delete(&id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn list_reflects_creates_minus_deletes() -> Result<(), anyhow::Error> {
        let (_, svc) = service();
        let mut ids = Vec::new();
        for (f, l) in [("Dennis", "Ritchie"), ("Rob", "Pike"), ("Ken", "Thompson"), ("Robert", "Griesemer")] {
            ids.push(svc.create(PersonInput::new(f, l)).await?.id);
        }
        svc.delete(&ids[1].to_string()).await?;
        svc.update(&ids[3].to_string(), PersonInput::new("Robert", "G.")).await?;

        let all = svc.list().await?;
        assert_eq!(all.len(), 3);
        assert_eq!(all.iter().map(|p| p.id).collect::<Vec<_>>(), vec![ids[0], ids[2], ids[3]]);
        assert_eq!(all[2].last_name, "G.");
        Ok(())
    }

    #[tokio::test]
    async fn store_failures_surface_by_category() -> Result<(), anyhow::Error> {
        let (repo, svc) = service();
        let p = svc.create(PersonInput::new("Rob", "Pike")).await?;

        repo.fail_writes(true);
        let err = svc.create(PersonInput::new("Ken", "Thompson")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Db(_)));
        let err = svc.update(&p.id.to_string(), PersonInput::new("R", "P")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Db(_)));
        let err = svc.delete(&p.id.to_string()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Db(_)));

        repo.fail_reads(true);
        assert!(matches!(svc.list().await.unwrap_err(), ServiceError::Query(_)));
        // A failed lookup is reported as a query error, never as a write.
        let err = svc.update(&p.id.to_string(), PersonInput::new("R", "P")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Query(_)));
        Ok(())
    }

    #[tokio::test]
    async fn malformed_clause_is_an_invalid_predicate() {
        let (_, svc) = service();
        let err = svc.find_by_clause("id = = 1").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidPredicate(_)));
    }

    #[tokio::test]
    async fn raw_mode_delegates_verbatim() {
        let repo = Arc::new(MockPersonRepository::default());
        let svc = PersonService::new(repo, PredicateMode::Raw);
        // The mock has no SQL engine, so the raw path reports a query error.
        let err = svc.find_by_clause("id=1").await.unwrap_err();
        assert!(matches!(err, ServiceError::Query(_)));
    }
}
