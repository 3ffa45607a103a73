use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardButtonKind, InlineKeyboardMarkup,
};

use crate::data_types::records::Guest;
use crate::data_types::CallbackAction;
use crate::formatting::french_date_fmt;
use crate::meal_recording::MealDraft;

fn checkbox(selected: bool) -> &'static str {
    if selected {
        "✅"
    } else {
        "⬜"
    }
}

/// Guest and recipe checkboxes of a meal form, two per row, followed by the
/// save button.
pub fn make_meal_keyboard(draft: &MealDraft) -> InlineKeyboardMarkup {
    let mut buttons = Vec::new();

    for guest in &draft.guest_options {
        buttons.push(InlineKeyboardButton::callback(
            format!("{} 👤 {}", checkbox(draft.guests.contains(&guest.id)), guest.name),
            CallbackAction::ToggleGuest(guest.id).encode(),
        ));
    }
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> =
        buttons.chunks(2).map(|row| row.to_vec()).collect();

    let mut buttons = Vec::new();
    for recipe in &draft.recipe_options {
        buttons.push(InlineKeyboardButton::callback(
            format!(
                "{} 🍽 {}",
                checkbox(draft.recipes.contains(&recipe.id)),
                recipe.title
            ),
            CallbackAction::ToggleRecipe(recipe.id).encode(),
        ));
    }
    keyboard.extend(buttons.chunks(2).map(|row| row.to_vec()));

    keyboard.push(vec![InlineKeyboardButton::callback(
        "💾 Enregistrer le repas",
        CallbackAction::SaveMeal.encode(),
    )]);

    InlineKeyboardMarkup::new(keyboard)
}

pub fn make_guest_keyboard(guests: &[Guest]) -> InlineKeyboardMarkup {
    let mut keyboard = Vec::new();

    for guest in guests {
        keyboard.push([InlineKeyboardButton::callback(
            &guest.name,
            CallbackAction::ShowHistory(guest.id).encode(),
        )]);
    }
    InlineKeyboardMarkup::new(keyboard)
}

/// Label of the button that carried `data`, used to name the picked guest
/// without asking the backend again.
pub fn button_label(markup: Option<&InlineKeyboardMarkup>, data: &str) -> Option<String> {
    markup?
        .inline_keyboard
        .iter()
        .flatten()
        .find(|button| {
            matches!(&button.kind, InlineKeyboardButtonKind::CallbackData(d) if d == data)
        })
        .map(|button| button.text.clone())
}

pub fn meal_form_msg(draft: &MealDraft) -> String {
    let mut msg = format!("Repas du {}", french_date_fmt(draft.date));
    if let Some(comment) = &draft.comment {
        msg += &format!("\nCommentaire : {}", comment);
    }
    msg += "\n\nSélectionnez au moins un invité 👤 et une recette 🍽, puis enregistrez.";
    msg += "\nEnvoyez un nom pour ajouter un nouvel invité.";
    msg
}
