use std::env;

use teloxide::{
    dispatching::{
        dialogue::{self, InMemStorage},
        UpdateHandler,
    },
    prelude::*,
    types::ParseMode,
};

use crate::bot_command_handlers::{
    add_guest, cancel, pick_history_guest, reply_meal_form, reply_recipe_dialogue, search,
    show_guests, start, start_meal_form, start_recipe_dialogue,
};
use crate::bot_command_helpers::{button_label, make_meal_keyboard};
use crate::constants::{NO_FORM_MSG, SUBMIT_IN_FLIGHT_MSG};
use crate::data_backend::SharedStore;
use crate::data_types::{
    BotSettings, CallbackAction, Command, DialogueState, DialogueType, HandlerResult,
};
use crate::formatting::meal_history_msgs;
use crate::meal_history::meals_for_guest;
use crate::meal_recording::record_draft;

pub fn logger_init(module_path: &str) {
    pretty_env_logger::formatted_timed_builder()
        .filter_level(log::LevelFilter::Info)
        .filter_module(
            module_path,
            if env::var(pretty_env_logger::env_logger::DEFAULT_FILTER_ENV).unwrap_or_default()
                == "debug"
            {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            },
        )
        .init();
}

pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(start))
        .branch(case![Command::Recette].endpoint(start_recipe_dialogue))
        .branch(case![Command::Recherche(term)].endpoint(search))
        .branch(case![Command::Invite(name)].endpoint(add_guest))
        .branch(case![Command::Invites].endpoint(show_guests))
        .branch(case![Command::Repas(args)].endpoint(start_meal_form))
        .branch(case![Command::Historique].endpoint(pick_history_guest))
        .branch(case![Command::Annuler].endpoint(cancel));

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .branch(case![DialogueState::RecipeForm(draft)].endpoint(reply_recipe_dialogue))
        .branch(case![DialogueState::MealForm(draft)].endpoint(reply_meal_form))
        .branch(dptree::endpoint(invalid_cmd));

    let callback_query_handler = Update::filter_callback_query().endpoint(callback_handler);

    dialogue::enter::<Update, InMemStorage<DialogueState>, DialogueState, _>()
        .branch(message_handler)
        .branch(callback_query_handler)
}

async fn invalid_cmd(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, "Commande inconnue. /start pour la liste des commandes.")
        .await?;
    Ok(())
}

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    dialogue: DialogueType,
    store: SharedStore,
    settings: BotSettings,
) -> HandlerResult {
    let Some(q_data) = q.data.clone() else {
        return Ok(());
    };

    // acknowledge callback query to remove the loading alert
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(message) = q.message else {
        return Ok(());
    };
    let chat_id = message.chat.id;

    let Some(action) = CallbackAction::decode(&q_data) else {
        log::warn!("Unknown callback query data: {}", q_data);
        return Ok(());
    };

    match action {
        CallbackAction::ToggleGuest(_) | CallbackAction::ToggleRecipe(_) => {
            let Some(DialogueState::MealForm(mut draft)) = dialogue.get().await? else {
                bot.send_message(chat_id, NO_FORM_MSG).await?;
                return Ok(());
            };
            if draft.submitting {
                bot.send_message(chat_id, SUBMIT_IN_FLIGHT_MSG).await?;
                return Ok(());
            }

            match action {
                CallbackAction::ToggleGuest(id) => draft.toggle_guest(id),
                CallbackAction::ToggleRecipe(id) => draft.toggle_recipe(id),
                _ => unreachable!(),
            }

            bot.edit_message_reply_markup(chat_id, message.id)
                .reply_markup(make_meal_keyboard(&draft))
                .await?;
            dialogue.update(DialogueState::MealForm(draft)).await?;
        }
        CallbackAction::SaveMeal => {
            let Some(DialogueState::MealForm(mut draft)) = dialogue.get().await? else {
                bot.send_message(chat_id, NO_FORM_MSG).await?;
                return Ok(());
            };
            if draft.submitting {
                bot.send_message(chat_id, SUBMIT_IN_FLIGHT_MSG).await?;
                return Ok(());
            }

            draft.submitting = true;
            dialogue
                .update(DialogueState::MealForm(draft.clone()))
                .await?;

            match record_draft(store.as_ref(), &draft).await {
                Ok(_) => {
                    bot.edit_message_text(chat_id, message.id, "Repas ajouté avec succès !")
                        .await?;
                    dialogue.exit().await?;
                }
                Err(e) => {
                    draft.submitting = false;
                    dialogue.update(DialogueState::MealForm(draft)).await?;
                    bot.send_message(chat_id, e.user_message()).await?;
                }
            }
        }
        CallbackAction::ShowHistory(guest_id) => {
            let guest_name = button_label(message.reply_markup(), &q_data)
                .unwrap_or_else(|| "cet invité".to_string());

            match meals_for_guest(store.as_ref(), guest_id, settings.history_concurrency).await {
                Ok(history) => {
                    for text in meal_history_msgs(&guest_name, &history) {
                        bot.send_message(chat_id, text)
                            .parse_mode(ParseMode::MarkdownV2)
                            .await?;
                    }
                }
                Err(e) => {
                    bot.send_message(chat_id, e.user_message()).await?;
                }
            }
        }
    }

    Ok(())
}
