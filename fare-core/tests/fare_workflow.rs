use std::sync::Arc;

use chrono::NaiveDate;
use fare_core::application::auth_service::AuthService;
use fare_core::application::fare_service::FareService;
use fare_core::data::fare_repository::StoreFareRepository;
use fare_core::data::store::JsonFileStore;
use fare_core::data::user_repository::StoreUserRepository;
use fare_core::domain::error::DomainError;
use fare_core::domain::fare::FareDraft;
use fare_core::domain::session::Session;
use fare_core::domain::user::Role;

struct Workspace {
    _dir: tempfile::TempDir,
    store: Arc<JsonFileStore>,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::new(dir.path().join("store.json")));
        Self { _dir: dir, store }
    }

    fn auth(&self) -> AuthService<StoreUserRepository<JsonFileStore>> {
        AuthService::new(Arc::new(StoreUserRepository::new(Arc::clone(&self.store))))
    }

    fn fares(&self) -> FareService<StoreFareRepository<JsonFileStore>> {
        FareService::new(Arc::new(StoreFareRepository::new(Arc::clone(&self.store))))
    }

    /// A new run of the application over the same store file.
    fn reopen(&self) -> Arc<JsonFileStore> {
        Arc::new(JsonFileStore::new(self.store.path()))
    }
}

#[test]
fn admin_edits_survive_a_restart() {
    let ws = Workspace::new();
    let admin = Session::signed_in(ws.auth().login("admin", "Admin").into_result().unwrap());

    let mut fares = ws.fares();
    let added = fares
        .add(
            &admin,
            FareDraft {
                region: "Zona Oeste".into(),
                destination: "Estádio".into(),
                meter_value: 27.0,
                counter_value: 30.0,
            },
        )
        .unwrap();
    fares.remove(&admin, "4").unwrap();

    let reopened = FareService::new(Arc::new(StoreFareRepository::new(ws.reopen())));
    let ids: Vec<_> = reopened.all().iter().map(|f| f.id.clone()).collect();
    assert_eq!(ids, [added.id.as_str(), "3", "5"]);

    let session = AuthService::new(Arc::new(StoreUserRepository::new(ws.reopen())))
        .current_user()
        .map(|u| u.role);
    assert_eq!(session, Some(Role::Admin));
}

#[test]
fn exported_table_imports_back_with_the_same_values() {
    let ws = Workspace::new();
    let admin = Session::signed_in(ws.auth().login("Admin", "Admin").into_result().unwrap());
    let mut fares = ws.fares();
    fares
        .add(
            &admin,
            FareDraft {
                region: "Zona Sul, Orla".into(),
                destination: "Hotel \"Mar\"".into(),
                meter_value: 19.9,
                counter_value: 22.0,
            },
        )
        .unwrap();

    let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let file = fares.export_csv(&admin, today).unwrap();
    let report = fares.import_csv(&admin, file.content.as_bytes()).unwrap();
    assert_eq!(report.imported, 4);
    assert_eq!(report.rejected, 0);

    let all = fares.all();
    let (originals, copies) = all.split_at(4);
    for (original, copy) in originals.iter().zip(copies) {
        assert_ne!(original.id, copy.id);
        assert_eq!(original.destination, copy.destination);
        assert_eq!(original.region, copy.region);
        assert_eq!(original.meter_value, copy.meter_value);
        assert_eq!(original.counter_value, copy.counter_value);
    }
}

#[test]
fn registered_user_can_view_but_not_edit() {
    let ws = Workspace::new();
    let auth = ws.auth();
    auth.register("ana@example.com", "pw").into_result().unwrap();
    auth.logout();
    assert_eq!(auth.current_user(), None);

    let user = auth.login("ana@example.com", "pw").into_result().unwrap();
    let session = Session::signed_in(user);
    let mut fares = ws.fares();

    assert_eq!(fares.fares(&session, "zona").unwrap().len(), 3);
    assert!(matches!(
        fares.remove(&session, "3"),
        Err(DomainError::Forbidden)
    ));
    assert_eq!(auth.list_all().len(), 1);
}
