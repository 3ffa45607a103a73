use futures::future::try_join_all;
use std::time::Instant;
use uuid::Uuid;

use crate::data_backend::Store;
use crate::data_types::records::{Meal, MealWithDetails};
use crate::errors::{RecipeBookError, StoreError};

async fn meal_details(store: &dyn Store, meal: Meal) -> Result<MealWithDetails, StoreError> {
    let (guests, recipes) =
        tokio::try_join!(store.meal_guests(meal.id), store.meal_recipes(meal.id))?;

    let linked_guests = guests.len();
    let linked_recipes = recipes.len();
    let guests: Vec<_> = guests.into_iter().flatten().collect();
    let recipes: Vec<_> = recipes.into_iter().flatten().collect();

    if guests.len() != linked_guests || recipes.len() != linked_recipes {
        log::warn!(
            "Meal {} has {} dangling guest and {} dangling recipe links",
            meal.id,
            linked_guests - guests.len(),
            linked_recipes - recipes.len()
        );
    }

    Ok(MealWithDetails {
        meal,
        guests,
        recipes,
    })
}

async fn collect_history(
    store: &dyn Store,
    guest_id: Uuid,
    concurrency: usize,
) -> Result<Vec<MealWithDetails>, StoreError> {
    let meal_ids = store.meal_ids_for_guest(guest_id).await?;
    if meal_ids.is_empty() {
        return Ok(Vec::new());
    }

    let meals = store.meals_by_ids(&meal_ids).await?;
    let mut history = Vec::with_capacity(meals.len());
    let mut pending = meals.into_iter().peekable();

    // batches of `concurrency` meals, each batch in date order
    while pending.peek().is_some() {
        let batch: Vec<_> = pending
            .by_ref()
            .take(concurrency.max(1))
            .map(|meal| meal_details(store, meal))
            .collect();
        history.extend(try_join_all(batch).await?);
    }

    Ok(history)
}

/// Every meal the guest attended, newest first, with all guests and recipes
/// of each meal resolved.
///
/// Details are fetched for at most `concurrency` meals at a time. The first
/// failing fetch aborts the whole history.
pub async fn meals_for_guest(
    store: &dyn Store,
    guest_id: Uuid,
    concurrency: usize,
) -> Result<Vec<MealWithDetails>, RecipeBookError> {
    let now = Instant::now();

    match collect_history(store, guest_id, concurrency).await {
        Ok(history) => {
            log::debug!(
                "History of guest {}: {} meals in {:.2?}",
                guest_id,
                history.len(),
                now.elapsed()
            );
            Ok(history)
        }
        Err(e) => {
            log::error!("Fetching history of guest {} failed: {}", guest_id, e);
            Err(e.into())
        }
    }
}
