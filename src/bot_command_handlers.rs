use std::time::Instant;

use teloxide::{prelude::*, types::ParseMode, utils::command::BotCommands};

use crate::bot_command_helpers::{make_guest_keyboard, make_meal_keyboard, meal_form_msg};
use crate::constants::{NO_GUESTS_MSG, NO_RECIPES_MSG, OPERATION_FAILED_MSG};
use crate::data_backend::SharedStore;
use crate::data_types::records::RecipeOrder;
use crate::data_types::{Command, DialogueState, DialogueType, HandlerResult};
use crate::formatting::{guest_list_msgs, recipe_prompt, recipe_search_msgs};
use crate::guest_directory::{create_guest, list_guests};
use crate::meal_recording::{parse_meal_args, MealDraft};
use crate::recipe_catalog::{create_recipe, list_recipes, search_recipes, RecipeDraft};

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

pub async fn start(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        format!(
            "Mes Recettes\nGérez vos recettes, invités et repas en un seul endroit.\n\n{}",
            Command::descriptions()
        ),
    )
    .await?;
    Ok(())
}

pub async fn start_recipe_dialogue(bot: Bot, msg: Message, dialogue: DialogueType) -> HandlerResult {
    let draft = RecipeDraft::default();
    bot.send_message(msg.chat.id, recipe_prompt(draft.next_step()))
        .await?;
    dialogue.update(DialogueState::RecipeForm(draft)).await?;
    Ok(())
}

pub async fn reply_recipe_dialogue(
    bot: Bot,
    msg: Message,
    dialogue: DialogueType,
    mut draft: RecipeDraft,
    store: SharedStore,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Répondez par un message texte.")
            .await?;
        return Ok(());
    };

    match draft.answer(text, today()) {
        Err(e) => {
            bot.send_message(
                msg.chat.id,
                format!("{}\n{}", e, recipe_prompt(draft.next_step())),
            )
            .await?;
        }
        Ok(None) => {
            bot.send_message(msg.chat.id, recipe_prompt(draft.next_step()))
                .await?;
            dialogue.update(DialogueState::RecipeForm(draft)).await?;
        }
        Ok(Some(form)) => match create_recipe(store.as_ref(), form).await {
            Ok(recipe) => {
                bot.send_message(
                    msg.chat.id,
                    format!("Recette ajoutée avec succès ! ({})", recipe.title),
                )
                .await?;
                dialogue.exit().await?;
            }
            Err(e) => {
                // the draft stays at the date step, resending the date retries
                bot.send_message(
                    msg.chat.id,
                    format!(
                        "{}\nRenvoyez la date pour réessayer ou /annuler.",
                        e.user_message()
                    ),
                )
                .await?;
            }
        },
    }
    Ok(())
}

pub async fn search(bot: Bot, msg: Message, term: String, store: SharedStore) -> HandlerResult {
    let now = Instant::now();

    match search_recipes(store.as_ref(), &term).await {
        Ok(result) => {
            log::debug!("Build search msg: {:.2?}", now.elapsed());
            for text in recipe_search_msgs(&result) {
                bot.send_message(msg.chat.id, text)
                    .parse_mode(ParseMode::MarkdownV2)
                    .await?;
            }
        }
        Err(e) => {
            bot.send_message(msg.chat.id, e.user_message()).await?;
        }
    }
    Ok(())
}

pub async fn add_guest(bot: Bot, msg: Message, name: String, store: SharedStore) -> HandlerResult {
    let text = match create_guest(store.as_ref(), &name).await {
        Ok(guest) => format!("Invité ajouté : {}", guest.name),
        Err(e) => e.user_message(),
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

pub async fn show_guests(bot: Bot, msg: Message, store: SharedStore) -> HandlerResult {
    match list_guests(store.as_ref()).await {
        Ok(guests) if guests.is_empty() => {
            bot.send_message(msg.chat.id, NO_GUESTS_MSG).await?;
        }
        Ok(guests) => {
            for text in guest_list_msgs(&guests) {
                bot.send_message(msg.chat.id, text)
                    .parse_mode(ParseMode::MarkdownV2)
                    .await?;
            }
        }
        Err(e) => {
            bot.send_message(msg.chat.id, e.user_message()).await?;
        }
    }
    Ok(())
}

pub async fn start_meal_form(
    bot: Bot,
    msg: Message,
    args: String,
    dialogue: DialogueType,
    store: SharedStore,
) -> HandlerResult {
    let (date, comment) = match parse_meal_args(&args, today()) {
        Ok(parsed) => parsed,
        Err(e) => {
            bot.send_message(msg.chat.id, e.to_string()).await?;
            return Ok(());
        }
    };

    let options = tokio::try_join!(
        list_guests(store.as_ref()),
        list_recipes(store.as_ref(), RecipeOrder::ByTitle)
    );
    let (guests, recipes) = match options {
        Ok(options) => options,
        Err(_) => {
            bot.send_message(msg.chat.id, OPERATION_FAILED_MSG).await?;
            return Ok(());
        }
    };

    if recipes.is_empty() {
        bot.send_message(msg.chat.id, NO_RECIPES_MSG).await?;
        return Ok(());
    }

    let draft = MealDraft::new(date, comment, guests, recipes);
    bot.send_message(msg.chat.id, meal_form_msg(&draft))
        .reply_markup(make_meal_keyboard(&draft))
        .await?;
    dialogue.update(DialogueState::MealForm(draft)).await?;
    Ok(())
}

/// Text sent while a meal form is open adds that guest and selects it.
pub async fn reply_meal_form(
    bot: Bot,
    msg: Message,
    dialogue: DialogueType,
    mut draft: MealDraft,
    store: SharedStore,
) -> HandlerResult {
    let Some(name) = msg.text() else {
        return Ok(());
    };

    match create_guest(store.as_ref(), name).await {
        Ok(guest) => {
            draft.add_guest(guest);
            bot.send_message(msg.chat.id, meal_form_msg(&draft))
                .reply_markup(make_meal_keyboard(&draft))
                .await?;
            dialogue.update(DialogueState::MealForm(draft)).await?;
        }
        Err(e) => {
            bot.send_message(msg.chat.id, e.user_message()).await?;
        }
    }
    Ok(())
}

pub async fn pick_history_guest(bot: Bot, msg: Message, store: SharedStore) -> HandlerResult {
    match list_guests(store.as_ref()).await {
        Ok(guests) if guests.is_empty() => {
            bot.send_message(msg.chat.id, NO_GUESTS_MSG).await?;
        }
        Ok(guests) => {
            bot.send_message(msg.chat.id, "Sélectionner un invité :")
                .reply_markup(make_guest_keyboard(&guests))
                .await?;
        }
        Err(e) => {
            bot.send_message(msg.chat.id, e.user_message()).await?;
        }
    }
    Ok(())
}

pub async fn cancel(bot: Bot, msg: Message, dialogue: DialogueType) -> HandlerResult {
    dialogue.exit().await?;
    bot.send_message(msg.chat.id, "Saisie annulée.").await?;
    Ok(())
}
