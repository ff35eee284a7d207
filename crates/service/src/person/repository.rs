use async_trait::async_trait;

use super::domain::Person;
use super::predicate::Filter;
use crate::errors::ServiceError;

/// Repository abstraction over the `person` table.
///
/// Reads report failures as [`ServiceError::Query`], writes as [`ServiceError::Db`].
#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// Every row in ascending id order.
    async fn list(&self) -> Result<Vec<Person>, ServiceError>;
    async fn find_where(&self, filter: &Filter) -> Result<Vec<Person>, ServiceError>;
    /// `clause` is spliced verbatim after `WHERE`.
    async fn find_where_raw(&self, clause: &str) -> Result<Vec<Person>, ServiceError>;
    async fn get(&self, id: i32) -> Result<Option<Person>, ServiceError>;
    async fn insert(&self, first_name: &str, last_name: &str) -> Result<Person, ServiceError>;
    async fn update(&self, person: &Person) -> Result<Person, ServiceError>;
    /// `false` when no row had that id.
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Table {
        rows: BTreeMap<i32, Person>,
        last_id: i32,
    }

    #[derive(Default)]
    pub struct MockPersonRepository {
        table: Mutex<Table>,
        fail_reads: AtomicBool,
        fail_writes: AtomicBool,
    }

    impl MockPersonRepository {
        /// Make every subsequent read fail with a query error.
        pub fn fail_reads(&self, on: bool) {
            self.fail_reads.store(on, Ordering::SeqCst);
        }

        /// Make every subsequent write fail with a database error.
        pub fn fail_writes(&self, on: bool) {
            self.fail_writes.store(on, Ordering::SeqCst);
        }

        pub fn len(&self) -> usize {
            self.table.lock().unwrap().rows.len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        fn check_read(&self) -> Result<(), ServiceError> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(ServiceError::Query("injected read failure".into()));
            }
            Ok(())
        }

        fn check_write(&self) -> Result<(), ServiceError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(ServiceError::Db("injected write failure".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PersonRepository for MockPersonRepository {
        async fn list(&self) -> Result<Vec<Person>, ServiceError> {
            self.check_read()?;
            Ok(self.table.lock().unwrap().rows.values().cloned().collect())
        }

        async fn find_where(&self, filter: &Filter) -> Result<Vec<Person>, ServiceError> {
            self.check_read()?;
            let table = self.table.lock().unwrap();
            Ok(table.rows.values().filter(|p| filter.matches(p)).cloned().collect())
        }

        async fn find_where_raw(&self, _clause: &str) -> Result<Vec<Person>, ServiceError> {
            Err(ServiceError::Query("raw predicates need a SQL store".into()))
        }

        async fn get(&self, id: i32) -> Result<Option<Person>, ServiceError> {
            self.check_read()?;
            Ok(self.table.lock().unwrap().rows.get(&id).cloned())
        }

        async fn insert(&self, first_name: &str, last_name: &str) -> Result<Person, ServiceError> {
            self.check_write()?;
            let mut table = self.table.lock().unwrap();
            table.last_id += 1;
            let p = Person { id: table.last_id, first_name: first_name.to_string(), last_name: last_name.to_string() };
            table.rows.insert(p.id, p.clone());
            Ok(p)
        }

        async fn update(&self, person: &Person) -> Result<Person, ServiceError> {
            self.check_write()?;
            let mut table = self.table.lock().unwrap();
            match table.rows.get_mut(&person.id) {
                Some(row) => {
                    *row = person.clone();
                    Ok(row.clone())
                }
                None => Err(ServiceError::Db(format!("no row with id {}", person.id))),
            }
        }

        async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
            self.check_write()?;
            Ok(self.table.lock().unwrap().rows.remove(&id).is_some())
        }
    }
}
