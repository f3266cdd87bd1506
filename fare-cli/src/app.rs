use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::Utc;
use fare_core::application::auth_service::AuthService;
use fare_core::application::fare_service::FareService;
use fare_core::application::trip_service::TripService;
use fare_core::data::csv_codec::CsvFile;
use fare_core::data::fare_repository::StoreFareRepository;
use fare_core::data::store::KeyValueStore;
use fare_core::data::user_repository::StoreUserRepository;
use fare_core::domain::fare::{FareDraft, format_brl};
use fare_core::domain::ports::DistanceEstimator;
use fare_core::domain::session::Session;

/// Field overrides for `fares edit`; unset fields keep their current value.
#[derive(Debug, Default)]
pub struct FareEdit {
    pub destination: Option<String>,
    pub region: Option<String>,
    pub meter_value: Option<f64>,
    pub counter_value: Option<f64>,
}

/// Top-level controller: owns the session and routes each command to a service.
pub struct App<S: KeyValueStore + 'static, D: DistanceEstimator + 'static> {
    session: Session,
    auth: AuthService<StoreUserRepository<S>>,
    fares: FareService<StoreFareRepository<S>>,
    trips: TripService<S, D>,
}

impl<S, D> App<S, D>
where
    S: KeyValueStore + 'static,
    D: DistanceEstimator + 'static,
{
    pub fn new(store: Arc<S>, estimator: Arc<D>, default_price_per_km: f64) -> Self {
        let auth = AuthService::new(Arc::new(StoreUserRepository::new(Arc::clone(&store))));
        let session = auth
            .current_user()
            .map(Session::signed_in)
            .unwrap_or_default();
        let fares = FareService::new(Arc::new(StoreFareRepository::new(Arc::clone(&store))));
        let trips = TripService::new(store, estimator, default_price_per_km);

        Self {
            session,
            auth,
            fares,
            trips,
        }
    }

    pub fn register(&self, email: &str, password: &str, confirm: &str) -> anyhow::Result<String> {
        if password != confirm {
            bail!("the passwords do not match");
        }
        let user = self.auth.register(email, password).into_result()?;
        Ok(format!("Registered {}. Sign in to continue.", user.email))
    }

    pub fn login(&mut self, email: &str, password: &str) -> anyhow::Result<String> {
        let user = self.auth.login(email, password).into_result()?;
        let message = format!("Signed in as {} ({}).", user.email, user.role);
        self.session = Session::signed_in(user);
        Ok(message)
    }

    pub fn logout(&mut self) -> String {
        self.auth.logout();
        self.session = Session::anonymous();
        "Signed out.".to_string()
    }

    pub fn whoami(&self) -> String {
        match self.session.user() {
            Some(user) => format!("{} ({})", user.email, user.role),
            None => "Not signed in.".to_string(),
        }
    }

    pub fn users(&self) -> anyhow::Result<String> {
        self.session.require_admin()?;
        let mut users = self.auth.list_all();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let mut out = format!("{} user(s)\n", users.len());
        if users.is_empty() {
            out.push_str("No users registered yet.\n");
        }
        for user in users {
            writeln!(out, "- {} (since {})", user.email, user.created_at.format("%d/%m/%Y"))?;
        }
        Ok(out)
    }

    pub fn list_fares(&self, search: &str) -> anyhow::Result<String> {
        let fares = self.fares.fares(&self.session, search)?;
        if fares.is_empty() {
            return Ok("No fares found.\n".to_string());
        }
        let mut out = String::new();
        for fare in fares {
            writeln!(out, "{fare}")?;
        }
        Ok(out)
    }

    pub fn add_fare(&mut self, draft: FareDraft) -> anyhow::Result<String> {
        let fare = self.fares.add(&self.session, draft)?;
        Ok(format!("Fare added: {fare}"))
    }

    pub fn edit_fare(&mut self, id: &str, edit: FareEdit) -> anyhow::Result<String> {
        let Some(current) = self.fares.find(&self.session, id)? else {
            return Ok(format!("No fare with id {id}; nothing changed."));
        };
        let draft = FareDraft {
            region: edit.region.unwrap_or_else(|| current.region.clone()),
            destination: edit.destination.unwrap_or_else(|| current.destination.clone()),
            meter_value: edit.meter_value.unwrap_or(current.meter_value),
            counter_value: edit.counter_value.unwrap_or(current.counter_value),
        };
        match self.fares.update(&self.session, id, draft)? {
            Some(fare) => Ok(format!("Fare updated: {fare}")),
            None => Ok(format!("No fare with id {id}; nothing changed.")),
        }
    }

    pub fn delete_fare(&mut self, id: &str) -> anyhow::Result<String> {
        match self.fares.remove(&self.session, id)? {
            0 => Ok(format!("No fare with id {id}; nothing changed.")),
            _ => Ok(format!("Fare {id} deleted.")),
        }
    }

    pub fn import_fares(&mut self, path: &Path) -> anyhow::Result<String> {
        self.session.require_admin()?;
        let bytes = std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
        let report = self.fares.import_csv(&self.session, &bytes)?;

        let mut message = format!(
            "{} fare(s) imported successfully. The table was updated.",
            report.imported
        );
        if report.rejected > 0 {
            write!(message, " {} invalid row(s) skipped.", report.rejected)?;
        }
        Ok(message)
    }

    pub fn export_fares(&self, dir: &Path) -> anyhow::Result<String> {
        let file = self.fares.export_csv(&self.session, Utc::now().date_naive())?;
        let path = write_csv(dir, &file)?;
        Ok(format!("Exported to {}", path.display()))
    }

    pub fn template(&self, dir: &Path) -> anyhow::Result<String> {
        let path = write_csv(dir, &self.fares.template())?;
        Ok(format!("Import template written to {}", path.display()))
    }

    pub fn price(&self, new_price: Option<f64>) -> anyhow::Result<String> {
        self.session.require_user()?;
        if let Some(price) = new_price {
            self.trips.set_price_per_km(&self.session, price)?;
        }
        Ok(format!("Price per km: {}", format_brl(self.trips.price_per_km())))
    }

    pub async fn estimate(&self, origin: &str, destination: &str) -> anyhow::Result<String> {
        self.session.require_user()?;
        let estimate = self.trips.estimate(origin, destination).await?;
        Ok(format!(
            "Approximate distance: {:.2} km\nEstimated total fare: {} ({} per km)\n*Approximate value, it may vary.",
            estimate.distance_km,
            format_brl(estimate.fare),
            format_brl(estimate.price_per_km),
        ))
    }
}

fn write_csv(dir: &Path, file: &CsvFile) -> anyhow::Result<PathBuf> {
    let path = dir.join(&file.file_name);
    std::fs::write(&path, &file.content)
        .with_context(|| format!("cannot write {}", path.display()))?;
    Ok(path)
}
