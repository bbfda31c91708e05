use std::sync::Arc;

use log::debug;
use serde_json::Value;

use super::model::{Reservation, ReservationPatch};
use crate::cms::{EntityStore, Populate, StoreError, RESERVAS};

pub const USER_RELATION: &str = "users_permissions_user";
pub const TOUR_RELATION: &str = "tour_id";

/// Relations and fields the contract needs.
pub fn contract_populate() -> Populate {
    Populate::new()
        .relation(
            USER_RELATION,
            &["username", "email", "firstName", "lastName", "Phone", "Nationality"],
        )
        .relation(TOUR_RELATION, &["nombre", "descripcion", "precio", "ubicacion"])
}

/// Both relations with every field.
pub fn full_populate() -> Populate {
    Populate::new().all(USER_RELATION).all(TOUR_RELATION)
}

/// Typed access to reservation records.
#[derive(Clone)]
pub struct ReservationRepository {
    store: Arc<dyn EntityStore>,
}

impl ReservationRepository {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn find(&self, id: i64, populate: &Populate) -> Result<Option<Reservation>, StoreError> {
        let value = self.store.find_one(RESERVAS, id, populate).await?;
        value.map(decode).transpose()
    }

    /// Apply `patch`. Returns the updated record, `None` when it no longer
    /// exists.
    pub async fn update(&self, id: i64, patch: &ReservationPatch) -> Result<Option<Value>, StoreError> {
        let data = serde_json::to_value(patch).map_err(|e| StoreError::Decode(e.to_string()))?;
        debug!("Updating reservation {} with {}", id, data);
        self.store.update(RESERVAS, id, data).await
    }
}

fn decode(value: Value) -> Result<Reservation, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_populate_selects_contract_fields() {
        let query = contract_populate().to_query();
        assert!(query.contains(&(
            "populate[users_permissions_user][fields][5]".to_string(),
            "Nationality".to_string()
        )));
        assert!(query.contains(&("populate[tour_id][fields][3]".to_string(), "ubicacion".to_string())));
        assert_eq!(query.len(), 10);
    }

    #[test]
    fn test_full_populate_takes_all_fields() {
        assert_eq!(
            full_populate().to_query(),
            vec![
                ("populate[users_permissions_user]".to_string(), "true".to_string()),
                ("populate[tour_id]".to_string(), "true".to_string()),
            ]
        );
    }
}
