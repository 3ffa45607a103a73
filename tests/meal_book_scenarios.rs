mod common;

use std::collections::BTreeSet;

use common::date;
use recettes_telegram_rs::data_backend::{sqlite_store::SqliteStore, Store};
use recettes_telegram_rs::data_types::records::RecipeOrder;
use recettes_telegram_rs::errors::{RecipeBookError, ValidationError};
use recettes_telegram_rs::guest_directory::{create_guest, list_guests};
use recettes_telegram_rs::meal_history::meals_for_guest;
use recettes_telegram_rs::meal_recording::record_meal;
use recettes_telegram_rs::recipe_catalog::{
    create_recipe, list_recipes, search_recipes, RecipeForm,
};

fn form(title: &str, ingredients: &str, category: Option<&str>, day: u32) -> RecipeForm {
    RecipeForm {
        title: title.to_string(),
        ingredients: ingredients.to_string(),
        instructions: "Préparer et servir.".to_string(),
        category: category.map(str::to_string),
        creation_date: date(2024, 3, day),
    }
}

#[tokio::test]
async fn created_recipe_is_listed_unchanged() {
    let store = SqliteStore::open_in_memory().unwrap();
    let created = create_recipe(
        &store,
        form("Tarte aux pommes", "pommes, pâte, sucre", Some("Dessert"), 1),
    )
    .await
    .unwrap();

    let listed = list_recipes(&store, RecipeOrder::NewestFirst).await.unwrap();
    assert_eq!(listed, vec![created.clone()]);

    let recipe = &listed[0];
    assert_eq!(recipe.title, "Tarte aux pommes");
    assert_eq!(recipe.ingredients, "pommes, pâte, sucre");
    assert_eq!(recipe.category.as_deref(), Some("Dessert"));
    assert_eq!(recipe.creation_date, date(2024, 3, 1));
}

#[tokio::test]
async fn listing_twice_gives_the_same_order() {
    let store = SqliteStore::open_in_memory().unwrap();
    for (title, day) in [("Soupe", 3), ("Quiche", 3), ("Crumble", 9), ("Blanquette", 1)] {
        create_recipe(&store, form(title, "divers", None, day))
            .await
            .unwrap();
    }
    for name in ["Marc", "Anne", "Lucie"] {
        create_guest(&store, name).await.unwrap();
    }

    for order in [RecipeOrder::NewestFirst, RecipeOrder::ByTitle] {
        let first = list_recipes(&store, order).await.unwrap();
        let second = list_recipes(&store, order).await.unwrap();
        assert_eq!(first, second);
    }
    assert_eq!(
        list_guests(&store).await.unwrap(),
        list_guests(&store).await.unwrap()
    );
}

#[tokio::test]
async fn meal_shows_up_in_each_guest_history() {
    let store = SqliteStore::open_in_memory().unwrap();
    let alice = create_guest(&store, "Alice").await.unwrap();
    let bob = create_guest(&store, "Bob").await.unwrap();
    let salade = create_recipe(&store, form("Salade", "laitue, tomates", None, 2))
        .await
        .unwrap();

    let meal = record_meal(
        &store,
        date(2024, 5, 1),
        None,
        &BTreeSet::from([alice.id, bob.id]),
        &BTreeSet::from([salade.id]),
    )
    .await
    .unwrap();

    let history = meals_for_guest(&store, alice.id, 4).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].meal, meal);
    assert_eq!(history[0].guests, vec![alice.clone(), bob.clone()]);
    assert_eq!(history[0].recipes, vec![salade]);

    let bob_history = meals_for_guest(&store, bob.id, 4).await.unwrap();
    assert_eq!(bob_history, history);
}

#[tokio::test]
async fn history_is_newest_first_and_limited_to_the_guest() {
    let store = SqliteStore::open_in_memory().unwrap();
    let alice = create_guest(&store, "Alice").await.unwrap();
    let bob = create_guest(&store, "Bob").await.unwrap();
    let soupe = create_recipe(&store, form("Soupe", "poireaux", None, 1))
        .await
        .unwrap();

    for (day, guests) in [
        (3, vec![alice.id]),
        (10, vec![alice.id, bob.id]),
        (7, vec![bob.id]),
        (20, vec![alice.id]),
    ] {
        record_meal(
            &store,
            date(2024, 6, day),
            Some(format!("repas du {}", day)),
            &guests.into_iter().collect(),
            &BTreeSet::from([soupe.id]),
        )
        .await
        .unwrap();
    }

    // a concurrency of 1 still returns every meal, in order
    for concurrency in [1, 2, 8] {
        let dates: Vec<_> = meals_for_guest(&store, alice.id, concurrency)
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.meal.date)
            .collect();
        assert_eq!(
            dates,
            [date(2024, 6, 20), date(2024, 6, 10), date(2024, 6, 3)]
        );
    }
}

#[tokio::test]
async fn guest_without_meals_has_empty_history() {
    let store = SqliteStore::open_in_memory().unwrap();
    let guest = create_guest(&store, "Zoé").await.unwrap();

    assert!(meals_for_guest(&store, guest.id, 4).await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_catalog_and_unmatched_search_are_told_apart() {
    let store = SqliteStore::open_in_memory().unwrap();

    let empty = search_recipes(&store, "chocolat").await.unwrap();
    assert!(empty.matches.is_empty());
    assert!(empty.catalog_is_empty());

    create_recipe(&store, form("Salade", "laitue", Some("Entrée"), 1))
        .await
        .unwrap();

    let unmatched = search_recipes(&store, "chocolat").await.unwrap();
    assert!(unmatched.matches.is_empty());
    assert!(!unmatched.catalog_is_empty());

    let matched = search_recipes(&store, "ENTRÉE").await.unwrap();
    assert_eq!(matched.matches.len(), 1);
}

#[tokio::test]
async fn incomplete_recipe_is_not_stored() {
    let store = SqliteStore::open_in_memory().unwrap();

    let err = create_recipe(&store, form("  ", "pommes", None, 1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RecipeBookError::Validation(ValidationError::EmptyTitle)
    ));
    assert!(store.recipes(RecipeOrder::ByTitle).await.unwrap().is_empty());
}

#[tokio::test]
async fn file_backed_store_keeps_data_between_opens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recettes.sqlite");

    let guest_id = {
        let store = SqliteStore::open(&path).unwrap();
        create_guest(&store, "Alice").await.unwrap().id
    };

    let store = SqliteStore::open(&path).unwrap();
    let guests = list_guests(&store).await.unwrap();
    assert_eq!(guests.len(), 1);
    assert_eq!(guests[0].id, guest_id);
}
