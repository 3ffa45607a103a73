use chrono::NaiveDate;

use crate::data_backend::Store;
use crate::data_types::records::{NewRecipe, Recipe, RecipeOrder};
use crate::errors::{RecipeBookError, ValidationError};
use crate::formatting::parse_user_date;

/// Recipe fields as entered by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeForm {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub category: Option<String>,
    pub creation_date: NaiveDate,
}

impl RecipeForm {
    /// Trims every field and rejects empty required ones. A blank category
    /// becomes `None`.
    pub fn validate(self) -> Result<NewRecipe, ValidationError> {
        let title = self.title.trim();
        let ingredients = self.ingredients.trim();
        let instructions = self.instructions.trim();

        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if ingredients.is_empty() {
            return Err(ValidationError::EmptyIngredients);
        }
        if instructions.is_empty() {
            return Err(ValidationError::EmptyInstructions);
        }

        Ok(NewRecipe {
            title: title.to_string(),
            ingredients: ingredients.to_string(),
            instructions: instructions.to_string(),
            category: self
                .category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            creation_date: self.creation_date,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeStep {
    Title,
    Ingredients,
    Instructions,
    Category,
    CreationDate,
}

/// A recipe being entered one answer at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeDraft {
    pub title: Option<String>,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
    pub category: Option<Option<String>>,
}

impl RecipeDraft {
    pub fn next_step(&self) -> RecipeStep {
        if self.title.is_none() {
            RecipeStep::Title
        } else if self.ingredients.is_none() {
            RecipeStep::Ingredients
        } else if self.instructions.is_none() {
            RecipeStep::Instructions
        } else if self.category.is_none() {
            RecipeStep::Category
        } else {
            RecipeStep::CreationDate
        }
    }

    /// Stores the answer to the current step. Once the date is given the
    /// complete form is returned.
    pub fn answer(
        &mut self,
        reply: &str,
        today: NaiveDate,
    ) -> Result<Option<RecipeForm>, ValidationError> {
        let reply = reply.trim();
        match self.next_step() {
            RecipeStep::Title => {
                if reply.is_empty() {
                    return Err(ValidationError::EmptyTitle);
                }
                self.title = Some(reply.to_string());
            }
            RecipeStep::Ingredients => {
                if reply.is_empty() {
                    return Err(ValidationError::EmptyIngredients);
                }
                self.ingredients = Some(reply.to_string());
            }
            RecipeStep::Instructions => {
                if reply.is_empty() {
                    return Err(ValidationError::EmptyInstructions);
                }
                self.instructions = Some(reply.to_string());
            }
            RecipeStep::Category => {
                self.category = Some(
                    Some(reply)
                        .filter(|c| !c.is_empty() && *c != crate::constants::SKIP_FIELD)
                        .map(str::to_string),
                );
            }
            RecipeStep::CreationDate => {
                let creation_date = parse_user_date(reply, today)?;
                return Ok(Some(RecipeForm {
                    title: self.title.clone().unwrap_or_default(),
                    ingredients: self.ingredients.clone().unwrap_or_default(),
                    instructions: self.instructions.clone().unwrap_or_default(),
                    category: self.category.clone().flatten(),
                    creation_date,
                }));
            }
        }
        Ok(None)
    }
}

pub async fn create_recipe(store: &dyn Store, form: RecipeForm) -> Result<Recipe, RecipeBookError> {
    let new_recipe = form.validate()?;

    match store.insert_recipe(&new_recipe).await {
        Ok(recipe) => {
            log::info!("Recipe {} added: {}", recipe.id, recipe.title);
            Ok(recipe)
        }
        Err(e) => {
            log::error!("Adding recipe '{}' failed: {}", new_recipe.title, e);
            Err(e.into())
        }
    }
}

pub async fn list_recipes(
    store: &dyn Store,
    order: RecipeOrder,
) -> Result<Vec<Recipe>, RecipeBookError> {
    store.recipes(order).await.map_err(|e| {
        log::error!("Fetching recipes failed: {}", e);
        e.into()
    })
}

/// Recipes whose title, ingredients or category contain `term`, ignoring
/// case. A blank term keeps every recipe. Order is preserved.
///
/// Surrounding whitespace only decides whether the term is blank, it is part
/// of the substring otherwise.
pub fn filter_recipes(recipes: &[Recipe], term: &str) -> Vec<Recipe> {
    if term.trim().is_empty() {
        return recipes.to_vec();
    }
    let term = term.to_lowercase();

    recipes
        .iter()
        .filter(|recipe| {
            recipe.title.to_lowercase().contains(&term)
                || recipe.ingredients.to_lowercase().contains(&term)
                || recipe
                    .category
                    .as_ref()
                    .is_some_and(|c| c.to_lowercase().contains(&term))
        })
        .cloned()
        .collect()
}

/// Result of a catalog search. `catalog_size` tells an empty catalog apart
/// from a search without hits.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeSearch {
    pub term: String,
    pub catalog_size: usize,
    pub matches: Vec<Recipe>,
}

impl RecipeSearch {
    pub fn catalog_is_empty(&self) -> bool {
        self.catalog_size == 0
    }
}

pub async fn search_recipes(store: &dyn Store, term: &str) -> Result<RecipeSearch, RecipeBookError> {
    let all = list_recipes(store, RecipeOrder::NewestFirst).await?;
    let matches = filter_recipes(&all, term);
    log::debug!(
        "Search '{}': {} of {} recipes",
        term,
        matches.len(),
        all.len()
    );

    Ok(RecipeSearch {
        term: term.to_string(),
        catalog_size: all.len(),
        matches,
    })
}
