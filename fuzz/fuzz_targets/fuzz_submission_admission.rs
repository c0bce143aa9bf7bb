#![no_main]

use libfuzzer_sys::fuzz_target;

use regdesk_admission::{Admission, AdmissionBook};
use regdesk_types::{EventConfig, EventId, RegistrationType, Submission, Timestamp};

// Feed arbitrary JSON as a submission into a small team event. Parsing and
// admission must never panic, and capacity must hold.
fuzz_target!(|data: &[u8]| {
    let Ok(submission) = serde_json::from_slice::<Submission>(data) else {
        return;
    };
    let Ok(id) = EventId::new("fuzz") else { return };
    let mut event = EventConfig::solo(id);
    event.registration_type = RegistrationType::Team;
    event.min_team_size = 1;
    event.max_team_size = 4;
    event.capacity = 2;
    event.enable_waitlist = true;
    event.auto_close_on_capacity = true;

    let Ok(mut book) = AdmissionBook::new(event) else { return };
    for round in 0..4u64 {
        let outcome = book.attempt_register(submission.clone(), Timestamp::new(round));
        if let Ok(Admission::Confirmed(reg)) = outcome {
            assert_eq!(reg.members.len(), submission.members.len());
        }
        assert!(book.confirmed_count() <= 2);
    }
});
