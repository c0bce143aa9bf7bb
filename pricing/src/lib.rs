//! Registration fee computation.
//!
//! `fee = base − discount + gst`, where
//! - `base` is the event price, once per team or once per member,
//! - `discount` is the early-bird percentage of `base` while the offer is
//!   valid and slots remain,
//! - `gst` is the tax percentage of the discounted amount.
//!
//! All arithmetic is integer, in minor currency units, truncating fractions.
//! The engine is pure: it never fails and never mutates anything. Counting
//! granted early-bird slots is the caller's job (see [`FeeQuote::early_bird_applied`]).

use regdesk_types::{Amount, EventConfig, FeeQuote, PaymentStatus, Timestamp};

/// Compute the fee for a registration of `member_count` people made at `at`,
/// given that `early_bird_used` discounted registrations were already granted.
pub fn compute_fee(
    event: &EventConfig,
    member_count: u32,
    at: Timestamp,
    early_bird_used: u32,
) -> FeeQuote {
    let base = if event.team_pricing.per_team {
        event.price
    } else {
        event.price.saturating_mul(member_count as u64)
    };

    let early_bird_applied = early_bird_eligible(event, at, early_bird_used);
    let discount = if early_bird_applied {
        base.percent_of(event.early_bird_discount.discount_percent.capped())
    } else {
        Amount::ZERO
    };

    let taxable = base.saturating_sub(discount);
    let gst = if event.gst_enabled {
        taxable.percent_of(event.gst_percent)
    } else {
        Amount::ZERO
    };

    FeeQuote {
        base,
        discount,
        gst,
        total: taxable.saturating_add(gst),
        early_bird_applied,
    }
}

/// Whether a registration at `at` would receive the early-bird discount.
pub fn early_bird_eligible(event: &EventConfig, at: Timestamp, early_bird_used: u32) -> bool {
    let eb = &event.early_bird_discount;
    if !eb.enabled || eb.discount_percent.is_zero() {
        return false;
    }
    let in_time = eb.valid_until.map_or(true, |until| at <= until);
    let slots_left = eb.limited_to == 0 || early_bird_used < eb.limited_to;
    in_time && slots_left
}

/// Fee and initial payment status for a newly confirmed registration.
///
/// Free events skip the engine entirely and need no payment step.
pub fn quote_for_confirmation(
    event: &EventConfig,
    member_count: u32,
    at: Timestamp,
    early_bird_used: u32,
) -> (FeeQuote, PaymentStatus) {
    if !event.requires_payment() {
        return (FeeQuote::FREE, PaymentStatus::NoPaymentRequired);
    }
    (
        compute_fee(event, member_count, at, early_bird_used),
        PaymentStatus::Pending,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use regdesk_types::{EarlyBirdDiscount, EventId, Percent, RegistrationType};

    fn priced(price: u64) -> EventConfig {
        let mut ev = EventConfig::solo(EventId::new("fee-test").unwrap());
        ev.registration_type = RegistrationType::Team;
        ev.min_team_size = 1;
        ev.max_team_size = 4;
        ev.price = Amount::new(price);
        ev
    }

    fn with_early_bird(mut ev: EventConfig, pct: f64, until: u64, limit: u32) -> EventConfig {
        ev.early_bird_discount = EarlyBirdDiscount {
            enabled: true,
            discount_percent: Percent::from_percent(pct),
            valid_until: Some(Timestamp::new(until)),
            limited_to: limit,
        };
        ev
    }

    #[test]
    fn per_team_pricing_charges_once() {
        let mut ev = priced(500);
        ev.team_pricing.per_team = true;
        let q = compute_fee(&ev, 4, Timestamp::new(0), 0);
        assert_eq!(q.total, Amount::new(500));
    }

    #[test]
    fn per_member_pricing_multiplies() {
        let ev = priced(500);
        let q = compute_fee(&ev, 4, Timestamp::new(0), 0);
        assert_eq!(q.base, Amount::new(2000));
        assert_eq!(q.total, Amount::new(2000));
    }

    #[test]
    fn early_bird_applies_until_deadline_inclusive() {
        let ev = with_early_bird(priced(500), 20.0, 1000, 0);
        let on_time = compute_fee(&ev, 1, Timestamp::new(1000), 0);
        assert_eq!(on_time.total, Amount::new(400));
        assert_eq!(on_time.discount, Amount::new(100));
        assert!(on_time.early_bird_applied);

        let late = compute_fee(&ev, 1, Timestamp::new(1001), 0);
        assert_eq!(late.total, Amount::new(500));
        assert!(!late.early_bird_applied);
    }

    #[test]
    fn early_bird_respects_slot_limit() {
        let ev = with_early_bird(priced(500), 20.0, 1000, 2);
        assert!(compute_fee(&ev, 1, Timestamp::new(0), 1).early_bird_applied);
        let exhausted = compute_fee(&ev, 1, Timestamp::new(0), 2);
        assert!(!exhausted.early_bird_applied);
        assert_eq!(exhausted.total, Amount::new(500));
    }

    #[test]
    fn early_bird_without_deadline_is_open_ended() {
        let mut ev = with_early_bird(priced(500), 10.0, 0, 0);
        ev.early_bird_discount.valid_until = None;
        assert!(compute_fee(&ev, 1, Timestamp::new(u64::MAX), 0).early_bird_applied);
    }

    #[test]
    fn disabled_early_bird_is_ignored() {
        let mut ev = with_early_bird(priced(500), 20.0, 1000, 0);
        ev.early_bird_discount.enabled = false;
        assert_eq!(compute_fee(&ev, 1, Timestamp::new(0), 0).total, Amount::new(500));
    }

    #[test]
    fn gst_is_levied_on_discounted_amount() {
        let mut ev = with_early_bird(priced(1000), 10.0, 1000, 0);
        ev.gst_enabled = true;
        ev.gst_percent = Percent::from_percent(18.0);
        let q = compute_fee(&ev, 1, Timestamp::new(0), 0);
        assert_eq!(q.discount, Amount::new(100));
        assert_eq!(q.gst, Amount::new(162));
        assert_eq!(q.total, Amount::new(1062));
    }

    #[test]
    fn gst_percent_ignored_when_disabled() {
        let mut ev = priced(1000);
        ev.gst_percent = Percent::from_percent(18.0);
        assert_eq!(compute_fee(&ev, 1, Timestamp::new(0), 0).gst, Amount::ZERO);
    }

    #[test]
    fn oversized_discount_floors_total_at_zero() {
        let ev = with_early_bird(priced(500), 150.0, 1000, 0);
        let q = compute_fee(&ev, 1, Timestamp::new(0), 0);
        assert_eq!(q.discount, Amount::new(500));
        assert_eq!(q.total, Amount::ZERO);
    }

    #[test]
    fn negative_percentages_clamp_to_zero() {
        let mut ev = with_early_bird(priced(500), -20.0, 1000, 0);
        ev.gst_enabled = true;
        ev.gst_percent = Percent::from_percent(-5.0);
        let q = compute_fee(&ev, 1, Timestamp::new(0), 0);
        assert_eq!(q.total, Amount::new(500));
        assert!(!q.early_bird_applied);
    }

    #[test]
    fn free_event_needs_no_payment() {
        let ev = priced(0);
        let (quote, status) = quote_for_confirmation(&ev, 3, Timestamp::new(0), 0);
        assert_eq!(quote, FeeQuote::FREE);
        assert_eq!(status, PaymentStatus::NoPaymentRequired);
    }

    #[test]
    fn priced_event_starts_pending() {
        let ev = priced(250);
        let (quote, status) = quote_for_confirmation(&ev, 2, Timestamp::new(0), 0);
        assert_eq!(quote.total, Amount::new(500));
        assert_eq!(status, PaymentStatus::Pending);
    }
}
