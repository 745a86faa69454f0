#![no_main]

use libfuzzer_sys::fuzz_target;

use trap_ingest::{ListenAddress, normalize_listen_address};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Normalization must be total and idempotent.
        let once = normalize_listen_address(s);
        let twice = normalize_listen_address(&once);
        assert_eq!(once, twice);

        // Parsing must never panic, normalized or not.
        let _ = ListenAddress::parse(s);
        let _ = ListenAddress::parse(&once);
    }
});
