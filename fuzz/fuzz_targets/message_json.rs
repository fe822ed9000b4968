#![no_main]

use libfuzzer_sys::fuzz_target;
use sns_validator::{canonical_bytes, structure, Message, TextEncoding};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(message) = Message::from_json_str(s) else {
        return;
    };

    let message = message.normalized();
    if let Ok(message_type) = structure::check(&message) {
        for encoding in [TextEncoding::Utf8, TextEncoding::Latin1, TextEncoding::Utf16Le] {
            let _ = canonical_bytes(&message, message_type, encoding);
        }
    }
});
