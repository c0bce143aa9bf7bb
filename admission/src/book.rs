//! Per-event admission state.

use crate::validation::validate_submission;
use crate::AdmissionError;
use regdesk_pricing::quote_for_confirmation;
use regdesk_types::{
    EventConfig, EventId, Registration, RegistrationIndex, Submission, Timestamp, WaitlistEntry,
};
use serde::Serialize;
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, info, warn};

/// Result of a successful registration attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Admission {
    /// A seat was allocated. The caller takes ownership of the new
    /// registration record.
    Confirmed(Registration),
    /// The event is full; the submission was queued at 1-based `rank`.
    Waitlisted { rank: usize },
}

/// Read-only view of an event's admission counters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionSummary {
    pub event_id: EventId,
    pub capacity: u32,
    pub confirmed: usize,
    pub waitlisted: usize,
    pub next_registration_index: RegistrationIndex,
    pub early_bird_used: u32,
    pub window_open: bool,
}

/// Admission state of one event.
///
/// Seats are tracked by registration index. An index is handed out once from
/// a monotonically increasing counter and never reused, even after
/// [`release_seat`](Self::release_seat).
#[derive(Debug)]
pub struct AdmissionBook {
    config: EventConfig,
    next_index: RegistrationIndex,
    /// Indices currently holding a seat.
    seats: BTreeSet<RegistrationIndex>,
    waitlist: VecDeque<WaitlistEntry>,
    next_arrival: u64,
    early_bird_used: u32,
}

impl AdmissionBook {
    pub fn new(config: EventConfig) -> Result<Self, AdmissionError> {
        config.validate()?;
        Ok(Self {
            config,
            next_index: RegistrationIndex::FIRST,
            seats: BTreeSet::new(),
            waitlist: VecDeque::new(),
            next_arrival: 1,
            early_bird_used: 0,
        })
    }

    /// Continue numbering after `last`, an index issued by an earlier run.
    /// Never moves the counter backwards.
    pub fn resume_after(&mut self, last: RegistrationIndex) {
        if last >= self.next_index {
            self.next_index = last.next();
            info!(event = %self.config.id, next = %self.next_index, "registration numbering resumed");
        }
    }

    pub fn config(&self) -> &EventConfig {
        &self.config
    }

    pub fn event_id(&self) -> &EventId {
        &self.config.id
    }

    /// Decide a registration attempt: confirm, waitlist or refuse.
    ///
    /// Checks run in order and the first failure wins: registration window,
    /// submission validity, then capacity. Nothing is recorded on failure.
    pub fn attempt_register(
        &mut self,
        submission: Submission,
        now: Timestamp,
    ) -> Result<Admission, AdmissionError> {
        if !self.config.window_contains(now) {
            return Err(AdmissionError::WindowClosed);
        }
        validate_submission(&self.config, &submission)?;

        if self.has_free_seat() {
            return Ok(Admission::Confirmed(self.confirm(submission, now, None)));
        }

        if self.config.enable_waitlist && self.config.auto_close_on_capacity {
            let arrival = self.next_arrival;
            self.next_arrival += 1;
            debug!(
                event = %self.config.id,
                arrival,
                who = submission.display_name(),
                "event full, queueing on waitlist"
            );
            self.waitlist.push_back(WaitlistEntry {
                arrival,
                queued_at: now,
                submission,
            });
            return Ok(Admission::Waitlisted {
                rank: self.waitlist.len(),
            });
        }

        Err(AdmissionError::CapacityExceeded)
    }

    /// Move the earliest waitlisted submission into a free seat.
    ///
    /// Returns `None` when no seat is free or nobody is waiting. The promoted
    /// entry goes through the same confirmation path as a fresh submission:
    /// revalidated against the current configuration, new index, fee quoted
    /// at `now`, initial payment status. Entries that no longer pass
    /// validation are dropped from the queue and the next one is tried.
    pub fn promote_from_waitlist(&mut self, now: Timestamp) -> Option<Registration> {
        if !self.has_free_seat() {
            return None;
        }
        while let Some(entry) = self.waitlist.pop_front() {
            if let Err(e) = validate_submission(&self.config, &entry.submission) {
                warn!(
                    event = %self.config.id,
                    arrival = entry.arrival,
                    who = entry.submission.display_name(),
                    error = %e,
                    "dropping waitlisted submission invalid under current configuration"
                );
                continue;
            }
            let registration = self.confirm(entry.submission, now, Some(entry.queued_at));
            info!(
                event = %self.config.id,
                index = %registration.registration_index,
                arrival = entry.arrival,
                "promoted from waitlist"
            );
            return Some(registration);
        }
        None
    }

    /// Promote waitlisted entries until seats run out or the queue empties.
    pub fn promote_while_free(&mut self, now: Timestamp) -> Vec<Registration> {
        std::iter::from_fn(|| self.promote_from_waitlist(now)).collect()
    }

    /// Free the seat held by `index`. Returns `false` if it held none.
    pub fn release_seat(&mut self, index: RegistrationIndex) -> bool {
        self.seats.remove(&index)
    }

    /// Replace the event configuration. Counters, seats and the waitlist are
    /// kept; a lower capacity never evicts anyone already seated.
    pub fn reconfigure(&mut self, config: EventConfig) -> Result<(), AdmissionError> {
        if config.id != self.config.id {
            return Err(AdmissionError::EventMismatch {
                expected: self.config.id.clone(),
                got: config.id,
            });
        }
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn has_free_seat(&self) -> bool {
        !self.config.has_capacity_limit() || self.seats.len() < self.config.capacity as usize
    }

    pub fn confirmed_count(&self) -> usize {
        self.seats.len()
    }

    pub fn holds_seat(&self, index: RegistrationIndex) -> bool {
        self.seats.contains(&index)
    }

    /// Waitlist in FIFO order.
    pub fn waitlist(&self) -> impl Iterator<Item = &WaitlistEntry> {
        self.waitlist.iter()
    }

    pub fn waitlist_len(&self) -> usize {
        self.waitlist.len()
    }

    pub fn early_bird_used(&self) -> u32 {
        self.early_bird_used
    }

    pub fn summary(&self, now: Timestamp) -> AdmissionSummary {
        AdmissionSummary {
            event_id: self.config.id.clone(),
            capacity: self.config.capacity,
            confirmed: self.seats.len(),
            waitlisted: self.waitlist.len(),
            next_registration_index: self.next_index,
            early_bird_used: self.early_bird_used,
            window_open: self.config.window_contains(now),
        }
    }

    fn confirm(
        &mut self,
        submission: Submission,
        now: Timestamp,
        waitlisted_at: Option<Timestamp>,
    ) -> Registration {
        let index = self.next_index;
        self.next_index = index.next();
        self.seats.insert(index);

        let (fee, payment_status) = quote_for_confirmation(
            &self.config,
            submission.member_count(),
            now,
            self.early_bird_used,
        );
        if fee.early_bird_applied {
            self.early_bird_used += 1;
        }

        info!(
            event = %self.config.id,
            %index,
            who = submission.display_name(),
            total = %fee.total,
            status = %payment_status,
            "registration confirmed"
        );

        Registration {
            event_id: self.config.id.clone(),
            registration_index: index,
            team_name: submission.team_name,
            members: submission.members,
            registered_at: now,
            waitlisted_at,
            fee,
            payment_status,
            payment_proof: None,
            rejection_reason: None,
            cancelled_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regdesk_types::{
        Amount, EarlyBirdDiscount, Member, PaymentStatus, Percent, RegistrationType,
    };

    fn event(capacity: u32, waitlist: bool) -> EventConfig {
        let mut ev = EventConfig::solo(EventId::new("book").unwrap());
        ev.capacity = capacity;
        ev.enable_waitlist = waitlist;
        ev.auto_close_on_capacity = waitlist;
        ev
    }

    fn person(n: u32) -> Submission {
        Submission::solo(Member::new(format!("P{n}"), format!("p{n}@uni.edu")))
    }

    fn confirmed_index(a: Admission) -> RegistrationIndex {
        match a {
            Admission::Confirmed(r) => r.registration_index,
            other => panic!("expected confirmation, got {other:?}"),
        }
    }

    #[test]
    fn confirms_until_capacity_then_waitlists() {
        let mut book = AdmissionBook::new(event(2, true)).unwrap();
        let now = Timestamp::new(10);
        assert_eq!(confirmed_index(book.attempt_register(person(1), now).unwrap()).get(), 1);
        assert_eq!(confirmed_index(book.attempt_register(person(2), now).unwrap()).get(), 2);
        assert_eq!(
            book.attempt_register(person(3), now).unwrap(),
            Admission::Waitlisted { rank: 1 }
        );
        assert_eq!(
            book.attempt_register(person(4), now).unwrap(),
            Admission::Waitlisted { rank: 2 }
        );
        assert_eq!(book.confirmed_count(), 2);
    }

    #[test]
    fn full_without_waitlist_is_capacity_exceeded() {
        let mut book = AdmissionBook::new(event(1, false)).unwrap();
        book.attempt_register(person(1), Timestamp::new(0)).unwrap();
        assert_eq!(
            book.attempt_register(person(2), Timestamp::new(0)),
            Err(AdmissionError::CapacityExceeded)
        );
        assert_eq!(book.waitlist_len(), 0);
    }

    #[test]
    fn waitlist_requires_auto_close_as_well() {
        let mut ev = event(1, true);
        ev.auto_close_on_capacity = false;
        let mut book = AdmissionBook::new(ev).unwrap();
        book.attempt_register(person(1), Timestamp::new(0)).unwrap();
        assert_eq!(
            book.attempt_register(person(2), Timestamp::new(0)),
            Err(AdmissionError::CapacityExceeded)
        );
    }

    #[test]
    fn zero_capacity_is_unlimited() {
        let mut book = AdmissionBook::new(event(0, false)).unwrap();
        for n in 0..100 {
            confirmed_index(book.attempt_register(person(n), Timestamp::new(0)).unwrap());
        }
        assert_eq!(book.confirmed_count(), 100);
    }

    #[test]
    fn window_is_checked_before_validation() {
        let mut ev = event(0, false);
        ev.registration_closes = Some(Timestamp::new(5));
        let mut book = AdmissionBook::new(ev).unwrap();
        let invalid = Submission::solo(Member::new("", "nope"));
        assert_eq!(
            book.attempt_register(invalid, Timestamp::new(6)),
            Err(AdmissionError::WindowClosed)
        );
    }

    #[test]
    fn validation_is_checked_before_capacity() {
        let mut book = AdmissionBook::new(event(1, false)).unwrap();
        book.attempt_register(person(1), Timestamp::new(0)).unwrap();
        let invalid = Submission::solo(Member::new("", "nope"));
        assert!(matches!(
            book.attempt_register(invalid, Timestamp::new(0)),
            Err(AdmissionError::Validation(_))
        ));
    }

    #[test]
    fn failed_attempt_consumes_no_index() {
        let mut book = AdmissionBook::new(event(0, false)).unwrap();
        let _ = book.attempt_register(Submission::solo(Member::new("", "x")), Timestamp::new(0));
        assert_eq!(confirmed_index(book.attempt_register(person(1), Timestamp::new(0)).unwrap()).get(), 1);
    }

    #[test]
    fn promotion_is_fifo_and_uses_fresh_index() {
        let mut book = AdmissionBook::new(event(1, true)).unwrap();
        let first = confirmed_index(book.attempt_register(person(1), Timestamp::new(0)).unwrap());
        book.attempt_register(person(2), Timestamp::new(1)).unwrap();
        book.attempt_register(person(3), Timestamp::new(2)).unwrap();

        // No free seat yet.
        assert!(book.promote_from_waitlist(Timestamp::new(3)).is_none());

        assert!(book.release_seat(first));
        let promoted = book.promote_from_waitlist(Timestamp::new(4)).unwrap();
        assert_eq!(promoted.members[0].name, "P2");
        assert_eq!(promoted.registration_index.get(), 2);
        assert_eq!(promoted.waitlisted_at, Some(Timestamp::new(1)));
        assert_eq!(promoted.registered_at, Timestamp::new(4));
        assert_eq!(book.waitlist_len(), 1);
        assert!(book.promote_from_waitlist(Timestamp::new(5)).is_none());
    }

    #[test]
    fn released_index_is_never_reissued() {
        let mut book = AdmissionBook::new(event(1, false)).unwrap();
        let first = confirmed_index(book.attempt_register(person(1), Timestamp::new(0)).unwrap());
        book.release_seat(first);
        let second = confirmed_index(book.attempt_register(person(2), Timestamp::new(0)).unwrap());
        assert!(second > first);
        assert!(!book.release_seat(first));
    }

    #[test]
    fn capacity_increase_lets_waitlist_through() {
        let mut book = AdmissionBook::new(event(1, true)).unwrap();
        for n in 1..=4 {
            book.attempt_register(person(n), Timestamp::new(n as u64)).unwrap();
        }
        let mut bigger = book.config().clone();
        bigger.capacity = 3;
        book.reconfigure(bigger).unwrap();
        let promoted = book.promote_while_free(Timestamp::new(10));
        let names: Vec<_> = promoted.iter().map(|r| r.members[0].name.as_str()).collect();
        assert_eq!(names, ["P2", "P3"]);
        assert_eq!(book.waitlist_len(), 1);
    }

    #[test]
    fn promotion_revalidates_against_current_config() {
        let mut ev = event(1, true);
        ev.registration_type = RegistrationType::Team;
        ev.min_team_size = 1;
        ev.max_team_size = 4;
        let mut book = AdmissionBook::new(ev).unwrap();
        book.attempt_register(person(1), Timestamp::new(0)).unwrap();
        let four: Vec<Member> = (10..14)
            .map(|n| Member::new(format!("T{n}"), format!("t{n}@uni.edu")))
            .collect();
        book.attempt_register(Submission::team("Quad", four), Timestamp::new(1))
            .unwrap();
        book.attempt_register(person(2), Timestamp::new(2)).unwrap();
        assert_eq!(book.waitlist_len(), 2);

        book.reconfigure(event(3, true)).unwrap();
        let promoted = book.promote_while_free(Timestamp::new(5));
        assert_eq!(promoted.len(), 1);
        assert_eq!(promoted[0].members.len(), 1);
        assert_eq!(promoted[0].members[0].name, "P2");
        assert_eq!(book.waitlist_len(), 0);
        assert_eq!(book.confirmed_count(), 2);
    }

    #[test]
    fn resume_after_skips_issued_indices() {
        let mut book = AdmissionBook::new(event(0, false)).unwrap();
        book.resume_after(RegistrationIndex::new(7));
        let idx = confirmed_index(book.attempt_register(person(1), Timestamp::new(0)).unwrap());
        assert_eq!(idx.get(), 8);

        // An older high-water mark leaves the counter alone.
        book.resume_after(RegistrationIndex::new(3));
        let idx = confirmed_index(book.attempt_register(person(2), Timestamp::new(0)).unwrap());
        assert_eq!(idx.get(), 9);
    }

    #[test]
    fn reconfigure_rejects_other_event() {
        let mut book = AdmissionBook::new(event(1, false)).unwrap();
        let other = EventConfig::solo(EventId::new("other").unwrap());
        assert!(matches!(
            book.reconfigure(other),
            Err(AdmissionError::EventMismatch { .. })
        ));
    }

    #[test]
    fn early_bird_counter_only_counts_granted_discounts() {
        let mut ev = event(0, false);
        ev.price = Amount::new(500);
        ev.early_bird_discount = EarlyBirdDiscount {
            enabled: true,
            discount_percent: Percent::from_percent(20.0),
            valid_until: Some(Timestamp::new(100)),
            limited_to: 2,
        };
        let mut book = AdmissionBook::new(ev).unwrap();

        let totals: Vec<u64> = (1..=3)
            .map(|n| match book.attempt_register(person(n), Timestamp::new(50)).unwrap() {
                Admission::Confirmed(r) => {
                    assert_eq!(r.payment_status, PaymentStatus::Pending);
                    r.fee.total.minor()
                }
                other => panic!("{other:?}"),
            })
            .collect();
        assert_eq!(totals, [400, 400, 500]);
        assert_eq!(book.early_bird_used(), 2);
    }

    #[test]
    fn free_event_confirms_without_payment() {
        let mut book = AdmissionBook::new(event(0, false)).unwrap();
        match book.attempt_register(person(1), Timestamp::new(0)).unwrap() {
            Admission::Confirmed(r) => {
                assert_eq!(r.payment_status, PaymentStatus::NoPaymentRequired)
            }
            other => panic!("{other:?}"),
        }
    }
}
