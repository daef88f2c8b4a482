//! Common test utilities
//!
//! This module is shared across all integration tests

pub mod fixtures;
pub mod recorder;

#[allow(unused_imports)]
pub use fixtures::{
    operator, private_caller, sample_event, TestEnvironment, ACTIVE_GROUP_ID, COMMUNITY_LINK, NON_AYY_ANSWERS,
    OPERATOR_ID,
};
#[allow(unused_imports)]
pub use recorder::{RecordingMessenger, Sent};
