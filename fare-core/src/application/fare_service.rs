use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::data::csv_codec::{self, CsvFile};
use crate::data::fare_repository::{self, FareRepository};
use crate::domain::error::DomainError;
use crate::domain::fare::{Fare, FareDraft};
use crate::domain::session::Session;

/// Outcome of a successful CSV import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub rejected: usize,
}

/// The fare table as the signed-in operator sees it.
///
/// The in-memory table is authoritative for the session: every mutation is
/// applied here first and then written through to the repository, whose save
/// failures are logged and otherwise ignored.
pub struct FareService<R: FareRepository + 'static> {
    repo: Arc<R>,
    fares: Vec<Fare>,
}

impl<R> FareService<R>
where
    R: FareRepository + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        let fares = repo.load();
        Self { repo, fares }
    }

    pub fn all(&self) -> &[Fare] {
        &self.fares
    }

    pub fn fares(&self, session: &Session, term: &str) -> Result<Vec<&Fare>, DomainError> {
        session.require_user()?;
        Ok(fare_repository::filter(&self.fares, term))
    }

    pub fn find(&self, session: &Session, id: &str) -> Result<Option<&Fare>, DomainError> {
        session.require_user()?;
        Ok(self.fares.iter().find(|f| f.id == id))
    }

    #[instrument(skip(self, session))]
    pub fn add(&mut self, session: &Session, draft: FareDraft) -> Result<Fare, DomainError> {
        session.require_admin()?;
        let fare = Fare::new(draft.validate()?);
        self.apply(|fares| fare_repository::add(fares, fare.clone()));
        info!(fare_id = %fare.id, "fare added");
        Ok(fare)
    }

    /// Replaces the fare with `id`. Returns `None`, leaving the table as it
    /// was, when no fare has that id.
    #[instrument(skip(self, session))]
    pub fn update(
        &mut self,
        session: &Session,
        id: &str,
        draft: FareDraft,
    ) -> Result<Option<Fare>, DomainError> {
        session.require_admin()?;
        let fare = Fare::with_id(id.to_string(), draft.validate()?);
        let exists = self.fares.iter().any(|f| f.id == id);
        self.apply(|fares| fare_repository::update(fares, fare.clone()));
        if exists {
            info!(fare_id = %id, "fare updated");
        }
        Ok(exists.then_some(fare))
    }

    /// Deletes every fare with `id` and returns how many were dropped.
    #[instrument(skip(self, session))]
    pub fn remove(&mut self, session: &Session, id: &str) -> Result<usize, DomainError> {
        session.require_admin()?;
        let before = self.fares.len();
        self.apply(|fares| fare_repository::remove(fares, id));
        let removed = before - self.fares.len();
        if removed > 0 {
            info!(fare_id = %id, removed, "fare removed");
        }
        Ok(removed)
    }

    #[instrument(skip(self, session, bytes), fields(len = bytes.len()))]
    pub fn import_csv(
        &mut self,
        session: &Session,
        bytes: &[u8],
    ) -> Result<ImportReport, DomainError> {
        session.require_admin()?;
        let batch = csv_codec::parse_bytes(bytes)?;
        let report = ImportReport {
            imported: batch.fares.len(),
            rejected: batch.rejected,
        };
        self.apply(|fares| fare_repository::import_batch(fares, batch.fares));
        info!(imported = report.imported, rejected = report.rejected, "fares imported");
        Ok(report)
    }

    pub fn export_csv(&self, session: &Session, today: NaiveDate) -> Result<CsvFile, DomainError> {
        session.require_admin()?;
        if self.fares.is_empty() {
            return Err(DomainError::NothingToExport);
        }
        Ok(CsvFile {
            file_name: csv_codec::export_file_name(today),
            content: csv_codec::serialize(&self.fares),
        })
    }

    pub fn template(&self) -> CsvFile {
        csv_codec::template()
    }

    fn apply<F>(&mut self, op: F)
    where
        F: FnOnce(Vec<Fare>) -> Vec<Fare>,
    {
        self.fares = op(std::mem::take(&mut self.fares));
        self.repo.save(&self.fares);
    }
}
