//! Registration submissions as received from participants.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub college: Option<String>,
}

impl Member {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
            college: None,
        }
    }
}

/// One registration attempt: a team (or a single person) and its members.
/// The first member is the team lead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    pub members: Vec<Member>,
}

impl Submission {
    pub fn solo(member: Member) -> Self {
        Self {
            team_name: None,
            members: vec![member],
        }
    }

    pub fn team(name: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            team_name: Some(name.into()),
            members,
        }
    }

    pub fn member_count(&self) -> u32 {
        u32::try_from(self.members.len()).unwrap_or(u32::MAX)
    }

    pub fn lead(&self) -> Option<&Member> {
        self.members.first()
    }

    /// Team name if present, else the lead's name. Used in logs.
    pub fn display_name(&self) -> &str {
        match (&self.team_name, self.lead()) {
            (Some(team), _) if !team.trim().is_empty() => team,
            (_, Some(lead)) => &lead.name,
            _ => "<empty>",
        }
    }
}
