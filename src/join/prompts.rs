//! Messages sent during the join flow and to operators.

use teloxide::utils::html;

use crate::messaging::{Keyboard, OutgoingText};

pub fn confirm_full_name(first_name: &str, last_name: &str) -> OutgoingText {
    OutgoingText::html(format!(
        "Is <b>{}</b> your first name and <b>{}</b> your last name?",
        html::escape(first_name),
        html::escape(last_name)
    ))
    .with_keyboard(Keyboard::yes_no())
}

pub fn confirm_first_name(first_name: &str) -> OutgoingText {
    OutgoingText::html(format!("Is <b>{}</b> your first name?", html::escape(first_name)))
        .with_keyboard(Keyboard::yes_no())
}

pub fn confirm_last_name(last_name: &str) -> OutgoingText {
    OutgoingText::html(format!("Is <b>{}</b> your last name?", html::escape(last_name)))
        .with_keyboard(Keyboard::yes_no())
}

pub fn ask_first_name() -> OutgoingText {
    OutgoingText::plain("What is your first name?").with_keyboard(Keyboard::Remove)
}

pub fn ask_last_name() -> OutgoingText {
    OutgoingText::plain("What is your last name?").with_keyboard(Keyboard::Remove)
}

pub fn ask_email() -> OutgoingText {
    OutgoingText::plain("What is your email address?").with_keyboard(Keyboard::Remove)
}

pub fn city_options() -> OutgoingText {
    OutgoingText::plain("Which city do you live in?")
        .with_keyboard(Keyboard::options([["Espoo", "Helsinki"], ["Vantaa", "Other"]]))
}

pub fn ask_city() -> OutgoingText {
    OutgoingText::plain("Which city do you live in?").with_keyboard(Keyboard::Remove)
}

pub fn ayy_member_check() -> OutgoingText {
    OutgoingText::plain("Are you currently an AYY member?").with_keyboard(Keyboard::yes_no())
}

pub fn school_options() -> OutgoingText {
    OutgoingText::plain("Which School do you belong to?")
        .with_keyboard(Keyboard::options([["ARTS", "BIZ", "CHEM"], ["ELEC", "ENG", "SCI"]]))
}

pub fn invalid_first_name() -> OutgoingText {
    OutgoingText::plain("Please enter a valid first name.")
}

pub fn invalid_last_name() -> OutgoingText {
    OutgoingText::plain("Please enter a valid last name.")
}

pub fn invalid_email() -> OutgoingText {
    OutgoingText::plain("Please enter a valid email address.")
}

pub fn invalid_city() -> OutgoingText {
    OutgoingText::plain("Please enter a valid city name.")
}

pub fn answer_yes_or_no() -> OutgoingText {
    OutgoingText::plain("Please answer Yes or No.")
}

pub fn choose_an_option() -> OutgoingText {
    OutgoingText::plain("Please choose one of the options.")
}

pub fn pending_approval() -> OutgoingText {
    OutgoingText::plain(
        "Your membership application is now pending approval. Once you pay the membership fee, \
         you will be added to the members list.",
    )
    .with_keyboard(Keyboard::Remove)
}

pub fn approved(community_link: &str) -> OutgoingText {
    OutgoingText::plain(format!(
        "Your membership application has been approved! Join the AC Community group here: {}",
        community_link
    ))
    .with_keyboard(Keyboard::Remove)
}

pub fn already_preapproved(username: &str) -> OutgoingText {
    OutgoingText::plain(format!("@{} has already been preapproved.", username))
}

pub fn now_preapproved(username: &str) -> OutgoingText {
    OutgoingText::plain(format!("@{} is now preapproved.", username))
}

pub fn already_member(username: &str) -> OutgoingText {
    OutgoingText::plain(format!("@{} is already a member!", username))
}

pub fn now_member(username: &str) -> OutgoingText {
    OutgoingText::plain(format!("@{} is now a member!", username))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_confirmation_escapes_html() {
        let message = confirm_full_name("<Alex>", "Kim & Co");
        assert!(message.html);
        assert_eq!(
            message.text,
            "Is <b>&lt;Alex&gt;</b> your first name and <b>Kim &amp; Co</b> your last name?"
        );
        assert_eq!(message.keyboard, Keyboard::yes_no());
    }

    #[test]
    fn test_free_text_prompts_remove_keyboard() {
        for message in [ask_first_name(), ask_last_name(), ask_email(), ask_city()] {
            assert_eq!(message.keyboard, Keyboard::Remove, "Failed for: {}", message.text);
        }
    }

    #[test]
    fn test_reprompts_keep_keyboard() {
        for message in [answer_yes_or_no(), choose_an_option(), invalid_email()] {
            assert_eq!(message.keyboard, Keyboard::Unchanged, "Failed for: {}", message.text);
        }
    }
}
