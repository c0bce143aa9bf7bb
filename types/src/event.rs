//! Event configuration: the eligibility, capacity and pricing knobs that
//! admission and pricing read.

use serde::{Deserialize, Serialize};

use crate::{Amount, EventId, Percent, Timestamp, TypesError};

/// How many people make up one registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistrationType {
    Solo,
    Duo,
    Team,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPricing {
    /// Charge `price` once per registration instead of once per member.
    #[serde(default)]
    pub per_team: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarlyBirdDiscount {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub discount_percent: Percent,
    /// Last instant (inclusive) at which the discount applies. `None` means
    /// no deadline.
    #[serde(default)]
    pub valid_until: Option<Timestamp>,
    /// Maximum number of discounted registrations; 0 = unlimited.
    #[serde(default)]
    pub limited_to: u32,
}

/// Configuration of one event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventConfig {
    pub id: EventId,
    /// Maximum confirmed registrations; 0 = unlimited.
    #[serde(default)]
    pub capacity: u32,
    pub registration_type: RegistrationType,
    #[serde(default = "default_team_size")]
    pub min_team_size: u32,
    #[serde(default = "default_team_size")]
    pub max_team_size: u32,
    #[serde(default)]
    pub registration_opens: Option<Timestamp>,
    #[serde(default)]
    pub registration_closes: Option<Timestamp>,
    #[serde(default)]
    pub auto_close_on_capacity: bool,
    #[serde(default)]
    pub enable_waitlist: bool,
    #[serde(default)]
    pub price: Amount,
    #[serde(default)]
    pub team_pricing: TeamPricing,
    #[serde(default)]
    pub early_bird_discount: EarlyBirdDiscount,
    #[serde(default)]
    pub gst_enabled: bool,
    #[serde(default)]
    pub gst_percent: Percent,
}

fn default_team_size() -> u32 {
    1
}

impl EventConfig {
    /// A free, unlimited solo event that is always open.
    pub fn solo(id: EventId) -> Self {
        Self {
            id,
            capacity: 0,
            registration_type: RegistrationType::Solo,
            min_team_size: 1,
            max_team_size: 1,
            registration_opens: None,
            registration_closes: None,
            auto_close_on_capacity: false,
            enable_waitlist: false,
            price: Amount::ZERO,
            team_pricing: TeamPricing::default(),
            early_bird_discount: EarlyBirdDiscount::default(),
            gst_enabled: false,
            gst_percent: Percent::ZERO,
        }
    }

    /// Inclusive member-count bounds for one registration.
    pub fn member_bounds(&self) -> (u32, u32) {
        match self.registration_type {
            RegistrationType::Solo => (1, 1),
            RegistrationType::Duo => (2, 2),
            RegistrationType::Team => (self.min_team_size, self.max_team_size),
        }
    }

    /// Whether registrations are accepted at `now`.
    pub fn window_contains(&self, now: Timestamp) -> bool {
        let opened = self.registration_opens.map_or(true, |opens| now >= opens);
        let not_closed = self.registration_closes.map_or(true, |closes| now <= closes);
        opened && not_closed
    }

    pub fn requires_payment(&self) -> bool {
        !self.price.is_zero()
    }

    pub fn has_capacity_limit(&self) -> bool {
        self.capacity != 0
    }

    /// Reject configurations admission could never satisfy.
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.registration_type == RegistrationType::Team {
            if self.min_team_size == 0 {
                return Err(TypesError::InvalidConfig(
                    "minTeamSize must be at least 1".into(),
                ));
            }
            if self.max_team_size < self.min_team_size {
                return Err(TypesError::InvalidConfig(format!(
                    "maxTeamSize {} is below minTeamSize {}",
                    self.max_team_size, self.min_team_size
                )));
            }
        }
        if let (Some(opens), Some(closes)) = (self.registration_opens, self.registration_closes) {
            if closes < opens {
                return Err(TypesError::InvalidConfig(
                    "registrationCloses is before registrationOpens".into(),
                ));
            }
        }
        Ok(())
    }
}
