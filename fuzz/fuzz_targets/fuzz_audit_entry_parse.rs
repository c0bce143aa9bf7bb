#![no_main]

use libfuzzer_sys::fuzz_target;

use regdesk_types::AuditLogEntry;

// Journal replay parses untrusted lines; parsing must never panic and any
// accepted entry must serialize back.
fuzz_target!(|data: &[u8]| {
    if let Ok(entry) = serde_json::from_slice::<AuditLogEntry>(data) {
        let _ = serde_json::to_string(&entry).expect("parsed entry serializes");
    }
});
