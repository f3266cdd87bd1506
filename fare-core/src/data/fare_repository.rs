use std::sync::Arc;

use tracing::{error, info};

use crate::data::store::{KeyValueStore, load_json, store_json};
use crate::domain::fare::{Fare, seed_fares};

pub const FARES_KEY: &str = "taxi_app_fares";

pub trait FareRepository: Send + Sync {
    /// Returns the persisted table, seeding it on first run.
    fn load(&self) -> Vec<Fare>;
    /// Overwrites the persisted table. Failures are logged, never returned.
    fn save(&self, fares: &[Fare]);
}

#[derive(Clone)]
pub struct StoreFareRepository<S: KeyValueStore> {
    store: Arc<S>,
}

impl<S: KeyValueStore> StoreFareRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> FareRepository for StoreFareRepository<S> {
    fn load(&self) -> Vec<Fare> {
        match load_json::<_, Vec<Fare>>(self.store.as_ref(), FARES_KEY) {
            Ok(Some(fares)) => fares,
            Ok(None) => {
                let seed = seed_fares();
                self.save(&seed);
                info!(count = seed.len(), "fare table seeded");
                seed
            }
            Err(e) => {
                error!("failed to read fares from store: {}", e);
                seed_fares()
            }
        }
    }

    fn save(&self, fares: &[Fare]) {
        if let Err(e) = store_json(self.store.as_ref(), FARES_KEY, fares) {
            error!(count = fares.len(), "failed to store fares: {}", e);
        }
    }
}

/// Puts `fare` at the head of the table. Ids are not checked for collisions.
pub fn add(mut fares: Vec<Fare>, fare: Fare) -> Vec<Fare> {
    fares.insert(0, fare);
    fares
}

/// Replaces the first fare with the same id; without a match the table is returned as is.
pub fn update(mut fares: Vec<Fare>, updated: Fare) -> Vec<Fare> {
    if let Some(slot) = fares.iter_mut().find(|f| f.id == updated.id) {
        *slot = updated;
    }
    fares
}

pub fn remove(mut fares: Vec<Fare>, id: &str) -> Vec<Fare> {
    fares.retain(|f| f.id != id);
    fares
}

pub fn import_batch(mut fares: Vec<Fare>, new_fares: Vec<Fare>) -> Vec<Fare> {
    fares.extend(new_fares);
    fares
}

/// Case-insensitive substring match on destination or region, order preserved.
pub fn filter<'a>(fares: &'a [Fare], term: &str) -> Vec<&'a Fare> {
    let term = term.to_lowercase();
    fares
        .iter()
        .filter(|f| {
            term.is_empty()
                || f.destination.to_lowercase().contains(&term)
                || f.region.to_lowercase().contains(&term)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::store::MemoryStore;
    use serde_json::json;

    fn fare(id: &str, destination: &str, region: &str) -> Fare {
        Fare {
            id: id.into(),
            region: region.into(),
            destination: destination.into(),
            meter_value: 10.0,
            counter_value: 12.0,
        }
    }

    fn table() -> Vec<Fare> {
        vec![
            fare("a", "Centro", "Zona Sul"),
            fare("b", "Aeroporto", "Zona Norte"),
            fare("c", "Rodoviária", "Zona Central"),
        ]
    }

    #[test]
    fn load_on_empty_store_seeds_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let repo = StoreFareRepository::new(Arc::clone(&store));

        let loaded = repo.load();
        assert_eq!(loaded, seed_fares());
        let ids: Vec<_> = loaded.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["3", "4", "5"]);

        let persisted: Option<Vec<Fare>> = load_json(store.as_ref(), FARES_KEY).unwrap();
        assert_eq!(persisted, Some(seed_fares()));
    }

    #[test]
    fn load_returns_stored_table_untouched() {
        let store = Arc::new(MemoryStore::new());
        let repo = StoreFareRepository::new(Arc::clone(&store));
        repo.save(&table());
        assert_eq!(repo.load(), table());

        // an explicitly emptied table is not re-seeded
        repo.save(&[]);
        assert!(repo.load().is_empty());
    }

    #[test]
    fn corrupt_table_falls_back_to_seed_without_writing() {
        let store = Arc::new(MemoryStore::new());
        store.set(FARES_KEY, json!({"not": "a list"})).unwrap();
        let repo = StoreFareRepository::new(Arc::clone(&store));

        assert_eq!(repo.load(), seed_fares());
        assert_eq!(store.get(FARES_KEY).unwrap(), Some(json!({"not": "a list"})));
    }

    #[test]
    fn save_swallows_quota_errors() {
        let store = Arc::new(MemoryStore::with_quota(8));
        let repo = StoreFareRepository::new(Arc::clone(&store));
        repo.save(&table());
        assert_eq!(store.get(FARES_KEY).unwrap(), None);
    }

    #[test]
    fn add_prepends() {
        let fares = add(table(), fare("new", "Praia", "Litoral"));
        assert_eq!(fares.len(), 4);
        assert_eq!(fares[0].id, "new");
        assert_eq!(fares[1].id, "a");
    }

    #[test]
    fn update_replaces_by_id() {
        let fares = update(table(), fare("b", "Aeroporto Internacional", "Zona Norte"));
        assert_eq!(fares[1].destination, "Aeroporto Internacional");
        assert_eq!(fares.len(), 3);
    }

    #[test]
    fn update_without_match_is_identity() {
        assert_eq!(update(table(), fare("zzz", "X", "Y")), table());
    }

    #[test]
    fn remove_is_idempotent() {
        let once = remove(table(), "b");
        let twice = remove(once.clone(), "b");
        assert_eq!(once.len(), 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn remove_drops_every_duplicate() {
        let fares = import_batch(table(), vec![fare("a", "Outro", "Zona Oeste")]);
        assert!(remove(fares, "a").iter().all(|f| f.id != "a"));
    }

    #[test]
    fn import_batch_appends() {
        let fares = import_batch(table(), vec![fare("x", "Praia", "Litoral")]);
        assert_eq!(fares.last().map(|f| f.id.as_str()), Some("x"));
    }

    #[test]
    fn empty_filter_returns_everything_in_order() {
        let fares = table();
        let all: Vec<Fare> = filter(&fares, "").into_iter().cloned().collect();
        assert_eq!(all, fares);
    }

    #[test]
    fn filter_is_case_insensitive_on_either_field() {
        let fares = vec![fare("a", "Centro", "Zona Sul")];
        assert_eq!(filter(&fares, "zona").len(), 1);
        assert_eq!(filter(&fares, "CENTRO").len(), 1);
        assert!(filter(&fares, "norte").is_empty());

        let fares = table();
        let ids: Vec<_> = filter(&fares, "zona n").iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["b"]);
    }
}
