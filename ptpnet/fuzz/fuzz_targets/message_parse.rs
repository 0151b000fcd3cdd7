#![no_main]

use libfuzzer_sys::fuzz_target;
use ptpnet::fuzz::FuzzMessage;

fuzz_target!(|data: &[u8]| {
    if let Ok(message) = FuzzMessage::deserialize(data) {
        let encoded = message.serialize();
        assert_eq!(&encoded[..], &data[..encoded.len()]);
    }
});
