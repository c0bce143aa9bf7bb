#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use regdesk_pricing::compute_fee;
use regdesk_types::{Amount, EventConfig, EventId, Percent, Timestamp};

#[derive(Debug, Arbitrary)]
struct FeeInput {
    price: u64,
    per_team: bool,
    members: u32,
    gst_bps: u32,
    early_bird: bool,
    discount_bps: u32,
    valid_until: Option<u64>,
    limited_to: u32,
    used: u32,
    at: u64,
}

// Fee computation must never panic or overflow, and the total never exceeds
// the discounted base plus GST.
fuzz_target!(|input: FeeInput| {
    let Ok(id) = EventId::new("fuzz") else { return };
    let mut event = EventConfig::solo(id);
    event.price = Amount::new(input.price);
    event.team_pricing.per_team = input.per_team;
    event.gst_enabled = input.gst_bps > 0;
    event.gst_percent = Percent::from_basis_points(input.gst_bps);
    event.early_bird_discount.enabled = input.early_bird;
    event.early_bird_discount.discount_percent = Percent::from_basis_points(input.discount_bps);
    event.early_bird_discount.valid_until = input.valid_until.map(Timestamp::new);
    event.early_bird_discount.limited_to = input.limited_to;

    let quote = compute_fee(&event, input.members, Timestamp::new(input.at), input.used);
    assert!(quote.discount <= quote.base);
    assert_eq!(
        quote.total,
        quote.base.saturating_sub(quote.discount).saturating_add(quote.gst)
    );
});
