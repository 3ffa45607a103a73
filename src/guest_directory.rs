use crate::data_backend::Store;
use crate::data_types::records::{Guest, NewGuest};
use crate::errors::{RecipeBookError, ValidationError};

/// Adds a guest. Returns the stored record so it can be selected right away.
pub async fn create_guest(store: &dyn Store, name: &str) -> Result<Guest, RecipeBookError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyGuestName.into());
    }

    let new_guest = NewGuest {
        name: name.to_string(),
    };
    match store.insert_guest(&new_guest).await {
        Ok(guest) => {
            log::info!("Guest {} added: {}", guest.id, guest.name);
            Ok(guest)
        }
        Err(e) => {
            log::error!("Adding guest '{}' failed: {}", name, e);
            Err(e.into())
        }
    }
}

/// All guests, ordered by name.
pub async fn list_guests(store: &dyn Store) -> Result<Vec<Guest>, RecipeBookError> {
    store.guests().await.map_err(|e| {
        log::error!("Fetching guests failed: {}", e);
        e.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_backend::sqlite_store::SqliteStore;

    #[tokio::test]
    async fn blank_names_are_not_written() {
        let store = SqliteStore::open_in_memory().unwrap();

        for name in ["", "   ", "\t\n"] {
            let err = create_guest(&store, name).await.unwrap_err();
            assert!(matches!(
                err,
                RecipeBookError::Validation(ValidationError::EmptyGuestName)
            ));
        }
        assert!(list_guests(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn guests_are_listed_by_name() {
        let store = SqliteStore::open_in_memory().unwrap();
        for name in ["Zoé", "Alice", " Bob "] {
            create_guest(&store, name).await.unwrap();
        }

        let names: Vec<String> = list_guests(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, ["Alice", "Bob", "Zoé"]);
    }
}
