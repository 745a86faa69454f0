#![no_main]

use libfuzzer_sys::fuzz_target;

use trap_ingest::Oid;

fuzz_target!(|data: &[u8]| {
    // Fuzz OID parsing from dotted string notation (if data is valid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(oid) = Oid::parse(s) {
            // A parsed OID must round-trip through Display.
            let rendered = oid.to_string();
            assert_eq!(Oid::parse(&rendered).unwrap(), oid);
        }
    }
});
