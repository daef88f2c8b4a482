use strum::{Display, EnumString, IntoStaticStr};

/// Position of an applicant in the join conversation.
///
/// Stored in the partial-progress table by its camelCase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "camelCase")]
pub enum Step {
    #[default]
    Start,
    FirstAndLastNameCheck,
    AskForFirstName,
    AskForLastName,
    FirstNameCheck,
    LastNameCheck,
    AskForEmail,
    CityCheck,
    AskForCity,
    AyyMemberCheck,
    SchoolCheck,
    Done,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_names() {
        let cases = vec![
            (Step::Start, "start"),
            (Step::FirstAndLastNameCheck, "firstAndLastNameCheck"),
            (Step::AskForFirstName, "askForFirstName"),
            (Step::AskForEmail, "askForEmail"),
            (Step::AyyMemberCheck, "ayyMemberCheck"),
            (Step::Done, "done"),
        ];

        for (step, name) in cases {
            assert_eq!(step.to_string(), name);
            assert_eq!(name.parse::<Step>().unwrap(), step, "Failed for: {}", name);
        }
    }

    #[test]
    fn test_unknown_step_name() {
        assert!("finished".parse::<Step>().is_err());
    }
}
