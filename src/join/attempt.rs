//! One applicant's walk through the join questions.
//!
//! [`JoinAttempt::advance`] consumes a message and returns the effects the
//! registry must carry out, as data. It performs no I/O.

use chrono::{DateTime, Utc};

use crate::join::prompts;
use crate::join::rules;
use crate::join::step::Step;
use crate::messaging::OutgoingText;
use crate::storage::records::{MemberRecord, PartialProgressRecord};

/// Stable identity of an applicant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applicant {
    pub id: i64,
    pub username: String,
}

/// Names the transport reports for the sender of a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicantProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ApplicantProfile {
    pub fn new(first_name: Option<&str>, last_name: Option<&str>) -> Self {
        let non_empty = |name: Option<&str>| name.filter(|n| !n.is_empty()).map(str::to_string);
        Self {
            first_name: non_empty(first_name),
            last_name: non_empty(last_name),
        }
    }
}

/// A text message from the applicant.
#[derive(Debug, Clone, Copy)]
pub struct Inbound<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    pub profile: &'a ApplicantProfile,
}

/// Work requested by a transition, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Answer in the chat the message came from.
    Reply(OutgoingText),
    /// Replace the stored partial-progress snapshot with the current one.
    PersistProgress,
    /// The attempt is at `done`: confirm it if pre-approved, otherwise tell
    /// the applicant it is pending.
    Finish,
}

#[derive(Debug, Clone)]
pub struct JoinAttempt {
    id: i64,
    username: String,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    city: Option<String>,
    ayy_member: Option<bool>,
    school: Option<String>,
    step: Step,
    last_activity: DateTime<Utc>,
    approval_chat: Option<i64>,
    retired: bool,
}

impl JoinAttempt {
    pub fn new(applicant: Applicant) -> Self {
        Self {
            id: applicant.id,
            username: applicant.username,
            first_name: None,
            last_name: None,
            email: None,
            city: None,
            ayy_member: None,
            school: None,
            step: Step::Start,
            last_activity: Utc::now(),
            approval_chat: None,
            retired: false,
        }
    }

    /// Rebuilds an idle attempt from a stored snapshot.
    pub fn from_progress(record: PartialProgressRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            city: record.city,
            ayy_member: record.ayy_member,
            school: record.school,
            step: record.step,
            last_activity: Utc::now(),
            approval_chat: None,
            retired: false,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn ayy_member(&self) -> Option<bool> {
        self.ayy_member
    }

    pub fn school(&self) -> Option<&str> {
        self.school.as_deref()
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Chat to notify once the application is approved. Set when `done` is reached.
    pub fn approval_chat(&self) -> Option<i64> {
        self.approval_chat
    }

    /// Marks the attempt as committed; it ignores every later message.
    pub fn retire(&mut self) {
        self.retired = true;
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    /// Feeds one message to the attempt.
    pub fn advance(&mut self, inbound: &Inbound<'_>) -> Vec<Effect> {
        self.last_activity = Utc::now();
        let text = inbound.text;
        let profile = inbound.profile;

        match self.step {
            Step::Start => match (&profile.first_name, &profile.last_name) {
                (Some(first), Some(last)) => {
                    self.step = Step::FirstAndLastNameCheck;
                    vec![Effect::Reply(prompts::confirm_full_name(first, last))]
                }
                (Some(first), None) => {
                    self.step = Step::FirstNameCheck;
                    vec![Effect::Reply(prompts::confirm_first_name(first))]
                }
                (None, Some(last)) => {
                    self.step = Step::LastNameCheck;
                    vec![Effect::Reply(prompts::confirm_last_name(last))]
                }
                (None, None) => vec![self.ask_for_first_name()],
            },

            Step::FirstAndLastNameCheck => {
                if rules::is_yes(text) {
                    self.first_name = profile.first_name.clone();
                    self.last_name = profile.last_name.clone();
                    vec![self.ask_next_name()]
                } else {
                    vec![self.ask_for_first_name()]
                }
            }

            Step::FirstNameCheck => {
                if rules::is_yes(text) {
                    self.first_name = profile.first_name.clone();
                    vec![self.ask_next_name()]
                } else {
                    vec![self.ask_for_first_name()]
                }
            }

            Step::LastNameCheck => {
                if rules::is_yes(text) {
                    self.last_name = profile.last_name.clone();
                    vec![self.ask_next_name()]
                } else {
                    vec![self.ask_for_last_name()]
                }
            }

            Step::AskForFirstName => {
                if rules::is_blank(text) {
                    return vec![Effect::Reply(prompts::invalid_first_name())];
                }
                self.first_name = Some(text.to_string());
                vec![self.ask_next_name()]
            }

            Step::AskForLastName => {
                if rules::is_blank(text) {
                    return vec![Effect::Reply(prompts::invalid_last_name())];
                }
                self.last_name = Some(text.to_string());
                vec![self.ask_next_name()]
            }

            Step::AskForEmail => {
                if !rules::is_plausible_email(text) {
                    return vec![Effect::Reply(prompts::invalid_email())];
                }
                self.email = Some(text.to_string());
                self.step = Step::CityCheck;
                vec![Effect::Reply(prompts::city_options())]
            }

            Step::CityCheck => {
                if rules::is_listed_city(text) {
                    self.city = Some(text.to_string());
                    self.step = Step::AyyMemberCheck;
                    vec![Effect::Reply(prompts::ayy_member_check())]
                } else {
                    self.step = Step::AskForCity;
                    vec![Effect::Reply(prompts::ask_city())]
                }
            }

            Step::AskForCity => {
                if rules::is_blank(text) {
                    return vec![Effect::Reply(prompts::invalid_city())];
                }
                self.city = Some(text.to_string());
                self.step = Step::AyyMemberCheck;
                vec![Effect::Reply(prompts::ayy_member_check())]
            }

            Step::AyyMemberCheck => {
                if rules::is_yes(text) {
                    self.ayy_member = Some(true);
                    self.step = Step::SchoolCheck;
                    vec![Effect::Reply(prompts::school_options()), Effect::PersistProgress]
                } else if rules::is_no(text) {
                    self.ayy_member = Some(false);
                    self.enter_done(inbound.chat_id);
                    vec![Effect::PersistProgress, Effect::Finish]
                } else {
                    vec![Effect::Reply(prompts::answer_yes_or_no())]
                }
            }

            Step::SchoolCheck => match rules::school_code(text) {
                Some(code) => {
                    self.school = Some(code);
                    self.enter_done(inbound.chat_id);
                    vec![Effect::PersistProgress, Effect::Finish]
                }
                None => vec![Effect::Reply(prompts::choose_an_option())],
            },

            Step::Done => {
                self.enter_done(inbound.chat_id);
                vec![Effect::Finish]
            }
        }
    }

    /// Snapshot for the partial-progress table.
    pub fn snapshot(&self) -> PartialProgressRecord {
        PartialProgressRecord {
            id: self.id,
            username: self.username.clone(),
            step: self.step,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            city: self.city.clone(),
            ayy_member: self.ayy_member,
            school: self.school.clone(),
        }
    }

    /// The member row for this application, or `None` while a required
    /// answer is missing. School is required only for AYY members.
    pub fn member_record(&self, joined_at: DateTime<Utc>) -> Option<MemberRecord> {
        let ayy_member = self.ayy_member?;
        if ayy_member && self.school.is_none() {
            return None;
        }

        Some(MemberRecord {
            id: self.id,
            joined_at,
            username: self.username.clone(),
            first_name: self.first_name.clone()?,
            last_name: self.last_name.clone()?,
            email: self.email.clone()?,
            city: self.city.clone()?,
            ayy_member,
            school: self.school.clone(),
        })
    }

    fn enter_done(&mut self, chat_id: i64) {
        self.step = Step::Done;
        self.approval_chat = Some(chat_id);
    }

    fn ask_for_first_name(&mut self) -> Effect {
        self.step = Step::AskForFirstName;
        Effect::Reply(prompts::ask_first_name())
    }

    fn ask_for_last_name(&mut self) -> Effect {
        self.step = Step::AskForLastName;
        Effect::Reply(prompts::ask_last_name())
    }

    /// Email once both names are known, otherwise the missing name.
    fn ask_next_name(&mut self) -> Effect {
        match (self.first_name.is_some(), self.last_name.is_some()) {
            (true, true) => {
                self.step = Step::AskForEmail;
                Effect::Reply(prompts::ask_email())
            }
            (false, _) => self.ask_for_first_name(),
            (true, false) => self.ask_for_last_name(),
        }
    }
}

/// Replies carried by a list of effects.
pub fn replies(effects: &[Effect]) -> impl Iterator<Item = &OutgoingText> {
    effects.iter().filter_map(|effect| match effect {
        Effect::Reply(message) => Some(message),
        _ => None,
    })
}
