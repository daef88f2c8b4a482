//! Command handlers driven through a recording messenger

mod common;

use acbot::messaging::Keyboard;
use acbot::storage::Table;
use acbot::telegram::handlers::commands;
use acbot::telegram::handlers::membership::{handle_member_left, handle_members_joined, GroupMember};
use common::{
    operator, private_caller, sample_event, Sent, TestEnvironment, ACTIVE_GROUP_ID, NON_AYY_ANSWERS, OPERATOR_ID,
};
use pretty_assertions::assert_eq;

const ALEX: i64 = 42;

async fn env_with_operator() -> TestEnvironment {
    let env = TestEnvironment::new();
    env.add_active(OPERATOR_ID, "boardmember").await;
    env
}

#[tokio::test]
async fn test_start_offers_membership() {
    let env = TestEnvironment::new();
    let alex = private_caller(ALEX, Some("alexkim"), "Alex", Some("Kim"));

    commands::handle_start(&env.deps, &alex).await.unwrap();

    assert_eq!(
        env.messenger.last_text_to(ALEX).unwrap(),
        "Hello Alex! Do you want to become an Aalto Cocktail member?"
    );
    assert_eq!(env.messenger.last_keyboard_to(ALEX), Some(Keyboard::yes_no()));
}

#[tokio::test]
async fn test_start_greets_existing_member() {
    let env = TestEnvironment::new();
    env.add_member(ALEX, "alexkim").await;
    let alex = private_caller(ALEX, Some("alexkim"), "Alex", Some("Kim"));

    commands::handle_start(&env.deps, &alex).await.unwrap();

    let text = env.messenger.last_text_to(ALEX).unwrap();
    assert!(text.starts_with("Hello Alex! I see you are already a member!"));
    assert!(text.ends_with(common::COMMUNITY_LINK));
}

#[tokio::test]
async fn test_start_without_username_is_ignored() {
    let env = TestEnvironment::new();
    let anonymous = private_caller(ALEX, None, "Alex", None);

    commands::handle_start(&env.deps, &anonymous).await.unwrap();

    assert!(env.messenger.sent().is_empty());
}

#[tokio::test]
async fn test_yes_after_start_begins_join() {
    let env = TestEnvironment::new();
    let alex = private_caller(ALEX, Some("alexkim"), "Alex", Some("Kim"));

    commands::handle_start(&env.deps, &alex).await.unwrap();
    commands::handle_private_text(&env.deps, &alex, "Yes").await.unwrap();

    assert!(env.registry.has_attempt(ALEX));
    assert_eq!(
        env.messenger.last_text_to(ALEX).unwrap(),
        "Is <b>Alex</b> your first name and <b>Kim</b> your last name?"
    );

    // Further answers go to the attempt, not to the Yes/No handling
    commands::handle_private_text(&env.deps, &alex, "No").await.unwrap();
    assert_eq!(env.messenger.last_text_to(ALEX).unwrap(), "What is your first name?");
}

#[tokio::test]
async fn test_no_after_start() {
    let env = TestEnvironment::new();
    let alex = private_caller(ALEX, Some("alexkim"), "Alex", None);

    commands::handle_private_text(&env.deps, &alex, "No").await.unwrap();

    assert_eq!(
        env.messenger.last_text_to(ALEX).unwrap(),
        "No worries, you can always join later by typing /join!"
    );
    assert_eq!(env.messenger.last_keyboard_to(ALEX), Some(Keyboard::Remove));
    assert!(!env.registry.has_attempt(ALEX));
}

#[tokio::test]
async fn test_unrelated_private_text_is_ignored() {
    let env = TestEnvironment::new();
    let alex = private_caller(ALEX, Some("alexkim"), "Alex", None);

    commands::handle_private_text(&env.deps, &alex, "hello?").await.unwrap();

    assert!(env.messenger.sent().is_empty());
}

#[tokio::test]
async fn test_join_requires_username() {
    let env = TestEnvironment::new();
    let anonymous = private_caller(ALEX, None, "Alex", None);

    commands::handle_join(&env.deps, &anonymous, "/join").await.unwrap();

    assert!(env
        .messenger
        .last_text_to(ALEX)
        .unwrap()
        .starts_with("Please set a Telegram username"));
    assert!(!env.registry.has_attempt(ALEX));
}

#[tokio::test]
async fn test_join_in_group_is_ignored() {
    let env = TestEnvironment::new();
    let mut alex = private_caller(ALEX, Some("alexkim"), "Alex", None);
    alex.is_private = false;
    alex.chat_id = ACTIVE_GROUP_ID;

    commands::handle_join(&env.deps, &alex, "/join").await.unwrap();

    assert!(env.messenger.sent().is_empty());
    assert!(!env.registry.has_attempt(ALEX));
}

#[tokio::test]
async fn test_join_as_member() {
    let env = TestEnvironment::new();
    env.add_member(ALEX, "alexkim").await;
    let alex = private_caller(ALEX, Some("alexkim"), "Alex", None);

    commands::handle_join(&env.deps, &alex, "/join").await.unwrap();

    assert!(env
        .messenger
        .last_text_to(ALEX)
        .unwrap()
        .starts_with("You are already a member!"));
    assert!(!env.registry.has_attempt(ALEX));
}

#[tokio::test]
async fn test_operator_commands_ignore_non_operators() {
    let env = TestEnvironment::new();
    let stranger = private_caller(77, Some("stranger"), "Stranger", None);

    commands::handle_confirm(&env.deps, &stranger, "").await.unwrap();
    commands::handle_confirm(&env.deps, &stranger, "alexkim").await.unwrap();
    commands::handle_preapprove(&env.deps, &stranger, "alexkim").await.unwrap();
    commands::handle_check(&env.deps, &stranger, "alexkim").await.unwrap();
    commands::handle_download(&env.deps, &stranger).await.unwrap();
    commands::handle_delete_member(&env.deps, &stranger, "alexkim").await.unwrap();

    assert!(env.messenger.sent().is_empty());
    assert!(env.rows(Table::PreApprovals).await.is_empty());
}

#[tokio::test]
async fn test_operator_commands_need_private_chat() {
    let env = env_with_operator().await;
    let mut board = operator();
    board.is_private = false;
    board.chat_id = ACTIVE_GROUP_ID;

    assert!(!commands::is_operator(&env.deps, &board).await);
    assert!(commands::is_operator(&env.deps, &operator()).await);
}

#[tokio::test]
async fn test_confirm_picker_and_cancel() {
    let env = env_with_operator().await;
    let profile = acbot::join::ApplicantProfile::new(Some("Sam"), Some("Lee"));
    for (id, username) in [(11, "dana"), (12, "alex"), (13, "cai"), (14, "bo")] {
        env.converse(id, username, &profile, &NON_AYY_ANSWERS).await;
    }
    let board = operator();

    commands::handle_confirm(&env.deps, &board, "").await.unwrap();

    assert_eq!(env.messenger.last_text_to(OPERATOR_ID).unwrap(), "Who do you want to confirm?");
    assert_eq!(
        env.messenger.last_keyboard_to(OPERATOR_ID),
        Some(Keyboard::options([
            vec!["@alex", "@bo", "@cai"],
            vec!["@dana"],
            vec!["/cancel"],
        ]))
    );
    assert!(env.deps.awaiting_confirm.contains(&OPERATOR_ID));

    commands::handle_private_text(&env.deps, &board, "@cai").await.unwrap();
    assert_eq!(env.messenger.last_text_to(OPERATOR_ID).unwrap(), "@cai is now a member!");
    assert!(!env.registry.has_attempt(13));

    // Still picking until cancelled
    commands::handle_private_text(&env.deps, &board, "@cai").await.unwrap();
    assert_eq!(env.messenger.last_text_to(OPERATOR_ID).unwrap(), "@cai is already a member!");

    commands::handle_cancel(&env.deps, &board).await.unwrap();
    assert_eq!(env.messenger.last_text_to(OPERATOR_ID).unwrap(), "Cancelled!");
    assert_eq!(env.messenger.last_keyboard_to(OPERATOR_ID), Some(Keyboard::Remove));
    assert!(!env.deps.awaiting_confirm.contains(&OPERATOR_ID));

    env.messenger.clear();
    commands::handle_cancel(&env.deps, &board).await.unwrap();
    assert!(env.messenger.sent().is_empty());
}

#[tokio::test]
async fn test_confirm_picker_when_nobody_waits() {
    let env = env_with_operator().await;

    commands::handle_confirm(&env.deps, &operator(), "").await.unwrap();

    assert_eq!(env.messenger.last_text_to(OPERATOR_ID).unwrap(), "No one to confirm!");
    assert!(!env.deps.awaiting_confirm.contains(&OPERATOR_ID));
}

#[tokio::test]
async fn test_confirm_with_username_argument() {
    let env = env_with_operator().await;
    let profile = acbot::join::ApplicantProfile::new(Some("Alex"), Some("Kim"));
    env.converse(ALEX, "alexkim", &profile, &NON_AYY_ANSWERS).await;

    commands::handle_confirm(&env.deps, &operator(), " @alexkim ").await.unwrap();

    assert_eq!(env.rows(Table::Members).await.len(), 1);
    assert!(env
        .messenger
        .last_text_to(ALEX)
        .unwrap()
        .starts_with("Your membership application has been approved!"));
    assert_eq!(env.messenger.last_text_to(OPERATOR_ID).unwrap(), "@alexkim is now a member!");
}

#[tokio::test]
async fn test_preapprove() {
    let env = env_with_operator().await;
    env.add_member(7, "member").await;
    let board = operator();

    commands::handle_preapprove(&env.deps, &board, "").await.unwrap();
    assert_eq!(env.messenger.last_text_to(OPERATOR_ID).unwrap(), "Usage: /preapprove <username>");

    commands::handle_preapprove(&env.deps, &board, "member").await.unwrap();
    assert_eq!(env.messenger.last_text_to(OPERATOR_ID).unwrap(), "@member is already a member!");

    commands::handle_preapprove(&env.deps, &board, "@newbie").await.unwrap();
    assert_eq!(env.messenger.last_text_to(OPERATOR_ID).unwrap(), "@newbie is now preapproved.");
    assert_eq!(env.rows(Table::PreApprovals).await.len(), 1);
}

#[tokio::test]
async fn test_check() {
    let env = env_with_operator().await;
    env.add_member(7, "member").await;
    let board = operator();

    commands::handle_check(&env.deps, &board, "@member").await.unwrap();
    assert_eq!(env.messenger.last_text_to(OPERATOR_ID).unwrap(), "@member is a member.");

    commands::handle_check(&env.deps, &board, "nobody").await.unwrap();
    assert_eq!(env.messenger.last_text_to(OPERATOR_ID).unwrap(), "@nobody is not a member!");
}

#[tokio::test]
async fn test_download_sends_csv() {
    let env = env_with_operator().await;
    env.add_member(7, "member").await;

    commands::handle_download(&env.deps, &operator()).await.unwrap();

    let sent = env.messenger.sent();
    assert_eq!(sent.len(), 1);
    let Sent::Document {
        chat_id,
        file_name,
        content,
    } = &sent[0]
    else {
        panic!("expected a document, got {:?}", sent[0]);
    };
    assert_eq!(*chat_id, OPERATOR_ID);
    assert_eq!(file_name, "members.csv");

    let csv = String::from_utf8(content.clone()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "id,joinedAt,username,firstName,lastName,email,city,ayyMember,school");
    assert!(lines[1].starts_with("\"7\","));
    assert!(lines[1].contains("\"member\""));
}

#[tokio::test]
async fn test_delete_member() {
    let env = env_with_operator().await;
    env.add_member(7, "member").await;
    let board = operator();

    commands::handle_delete_member(&env.deps, &board, "@member").await.unwrap();
    assert_eq!(env.messenger.last_text_to(OPERATOR_ID).unwrap(), "Deleted @member!");
    assert!(env.rows(Table::Members).await.is_empty());

    commands::handle_delete_member(&env.deps, &board, "member").await.unwrap();
    assert_eq!(env.messenger.last_text_to(OPERATOR_ID).unwrap(), "@member is not a member!");
}

#[tokio::test]
async fn test_chat_id() {
    let env = TestEnvironment::new();
    let mut caller = private_caller(ALEX, None, "Alex", None);
    caller.chat_id = ACTIVE_GROUP_ID;
    caller.is_private = false;

    commands::handle_chat_id(&env.deps, &caller).await.unwrap();

    assert_eq!(
        env.messenger.last_text_to(ACTIVE_GROUP_ID).unwrap(),
        format!("Chat ID: {}", ACTIVE_GROUP_ID)
    );
}

#[tokio::test]
async fn test_events_without_listing() {
    let env = TestEnvironment::new();
    let alex = private_caller(ALEX, Some("alexkim"), "Alex", None);

    commands::handle_events(&env.deps, &alex).await.unwrap();

    assert_eq!(
        env.messenger.last_text_to(ALEX).unwrap(),
        "No upcoming events with tickets available!"
    );
}

#[tokio::test]
async fn test_events_posts_each_event() {
    let env = TestEnvironment::with_events(vec![
        sample_event("Tiki night", Some("https://images.example/tiki.jpg")),
        sample_event("Gin tasting", None),
    ]);
    assert_eq!(env.events.refresh().await.unwrap(), 2);
    let alex = private_caller(ALEX, Some("alexkim"), "Alex", None);

    commands::handle_events(&env.deps, &alex).await.unwrap();

    let sent = env.messenger.sent();
    assert_eq!(sent.len(), 2);
    match &sent[0] {
        Sent::Photo {
            chat_id,
            photo_url,
            caption,
        } => {
            assert_eq!(*chat_id, ALEX);
            assert_eq!(photo_url, "https://images.example/tiki.jpg");
            assert!(caption.html);
            assert!(caption.text.starts_with("<b>Tiki night</b>\nOn Friday 18:00 at Otaniemi"));
        }
        other => panic!("expected a photo, got {:?}", other),
    }
    match &sent[1] {
        Sent::Text { chat_id, message } => {
            assert_eq!(*chat_id, ALEX);
            assert!(message.html);
            assert!(message.text.contains("Get tickets here"));
        }
        other => panic!("expected a text, got {:?}", other),
    }
}

#[tokio::test]
async fn test_actives_mirror() {
    let env = TestEnvironment::new();
    let joined = vec![
        GroupMember {
            id: 1,
            username: Some("first".to_string()),
        },
        GroupMember { id: 2, username: None },
        GroupMember {
            id: 3,
            username: Some("third".to_string()),
        },
    ];

    assert_eq!(handle_members_joined(&env.deps, &joined).await.unwrap(), 2);
    // Joining again does not duplicate rows
    assert_eq!(handle_members_joined(&env.deps, &joined).await.unwrap(), 0);
    assert_eq!(env.rows(Table::Actives).await.len(), 2);

    let first = private_caller(1, Some("first"), "First", None);
    assert!(commands::is_operator(&env.deps, &first).await);

    assert!(handle_member_left(&env.deps, &joined[0]).await.unwrap());
    assert!(!handle_member_left(&env.deps, &joined[0]).await.unwrap());
    assert!(!handle_member_left(&env.deps, &joined[1]).await.unwrap());
    assert!(!commands::is_operator(&env.deps, &first).await);
    assert_eq!(env.rows(Table::Actives).await.len(), 1);
}
