#![no_main]

use libfuzzer_sys::fuzz_target;
use sns_validator::TrustPattern;

fuzz_target!(|data: &[u8]| {
    let Ok(url) = std::str::from_utf8(data) else {
        return;
    };
    let _ = TrustPattern::default().is_trusted_url(url);
});
