use std::collections::BTreeSet;

use chrono::NaiveDate;
use regex_lite::Regex;
use static_init::dynamic;
use uuid::Uuid;

use crate::data_backend::Store;
use crate::data_types::records::{Guest, Meal, NewMeal, Recipe};
use crate::errors::{RecipeBookError, ValidationError};

/// State of one meal form, owned by the chat that opened it.
#[derive(Debug, Clone, PartialEq)]
pub struct MealDraft {
    pub date: NaiveDate,
    pub comment: Option<String>,
    pub guest_options: Vec<Guest>,
    pub recipe_options: Vec<Recipe>,
    pub guests: BTreeSet<Uuid>,
    pub recipes: BTreeSet<Uuid>,
    /// set while the save request is in flight
    pub submitting: bool,
}

impl MealDraft {
    pub fn new(
        date: NaiveDate,
        comment: Option<String>,
        guest_options: Vec<Guest>,
        recipe_options: Vec<Recipe>,
    ) -> Self {
        MealDraft {
            date,
            comment,
            guest_options,
            recipe_options,
            guests: BTreeSet::new(),
            recipes: BTreeSet::new(),
            submitting: false,
        }
    }

    pub fn toggle_guest(&mut self, guest_id: Uuid) {
        if !self.guests.remove(&guest_id) {
            self.guests.insert(guest_id);
        }
    }

    pub fn toggle_recipe(&mut self, recipe_id: Uuid) {
        if !self.recipes.remove(&recipe_id) {
            self.recipes.insert(recipe_id);
        }
    }

    /// Adds a guest created from inside the form and selects it.
    pub fn add_guest(&mut self, guest: Guest) {
        self.guests.insert(guest.id);
        if !self.guest_options.iter().any(|g| g.id == guest.id) {
            self.guest_options.push(guest);
        }
    }
}

/// Splits the `/repas` argument into an optional leading date and a comment.
pub fn parse_meal_args(
    args: &str,
    today: NaiveDate,
) -> Result<(NaiveDate, Option<String>), ValidationError> {
    #[dynamic]
    static RE: Regex = Regex::new(r"(?s)^\s*(\d{4}-\d{1,2}-\d{1,2})?\s*(.*)$").unwrap();

    let Some(caps) = RE.captures(args) else {
        return Ok((today, None));
    };

    let date = match caps.get(1) {
        Some(m) => NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(m.as_str().to_string()))?,
        None => today,
    };
    let comment = caps
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .filter(|c| !c.is_empty());

    Ok((date, comment))
}

/// Stores a meal with its guests and recipes.
///
/// Both selections must be non-empty, otherwise nothing is written. The meal
/// and its links are written together or not at all.
pub async fn record_meal(
    store: &dyn Store,
    date: NaiveDate,
    comment: Option<String>,
    guest_ids: &BTreeSet<Uuid>,
    recipe_ids: &BTreeSet<Uuid>,
) -> Result<Meal, RecipeBookError> {
    if guest_ids.is_empty() {
        return Err(ValidationError::NoGuestSelected.into());
    }
    if recipe_ids.is_empty() {
        return Err(ValidationError::NoRecipeSelected.into());
    }

    let new_meal = NewMeal {
        date,
        comment: comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
    };
    let guest_ids: Vec<Uuid> = guest_ids.iter().copied().collect();
    let recipe_ids: Vec<Uuid> = recipe_ids.iter().copied().collect();

    match store
        .create_meal_with_links(&new_meal, &guest_ids, &recipe_ids)
        .await
    {
        Ok(meal) => {
            log::info!(
                "Meal {} on {} recorded: {} guests, {} recipes",
                meal.id,
                meal.date,
                guest_ids.len(),
                recipe_ids.len()
            );
            Ok(meal)
        }
        Err(e) => {
            log::error!("Recording meal on {} failed: {}", date, e);
            Err(e.into())
        }
    }
}

pub async fn record_draft(store: &dyn Store, draft: &MealDraft) -> Result<Meal, RecipeBookError> {
    record_meal(
        store,
        draft.date,
        draft.comment.clone(),
        &draft.guests,
        &draft.recipes,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn guest(name: &str) -> Guest {
        Guest {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn toggling_twice_deselects() {
        let mut draft = MealDraft::new(today(), None, vec![], vec![]);
        let id = Uuid::new_v4();

        draft.toggle_guest(id);
        assert!(draft.guests.contains(&id));
        draft.toggle_guest(id);
        assert!(draft.guests.is_empty());

        draft.toggle_recipe(id);
        draft.toggle_recipe(id);
        draft.toggle_recipe(id);
        assert_eq!(draft.recipes.len(), 1);
    }

    #[test]
    fn new_guest_is_offered_and_selected_once() {
        let mut draft = MealDraft::new(today(), None, vec![guest("Alice")], vec![]);
        let bob = guest("Bob");

        draft.add_guest(bob.clone());
        draft.add_guest(bob.clone());

        assert_eq!(draft.guest_options.len(), 2);
        assert_eq!(draft.guests.len(), 1);
        assert!(draft.guests.contains(&bob.id));
    }

    #[test]
    fn meal_args_with_date_and_comment() {
        let (date, comment) = parse_meal_args(" 2024-03-09 chez Alice ", today()).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(comment.as_deref(), Some("chez Alice"));
    }

    #[test]
    fn meal_args_default_to_today() {
        assert_eq!(parse_meal_args("", today()).unwrap(), (today(), None));
        assert_eq!(
            parse_meal_args("barbecue", today()).unwrap(),
            (today(), Some("barbecue".to_string()))
        );
    }

    #[test]
    fn impossible_date_is_rejected() {
        assert_eq!(
            parse_meal_args("2024-02-30", today()),
            Err(ValidationError::InvalidDate("2024-02-30".to_string()))
        );
    }
}
