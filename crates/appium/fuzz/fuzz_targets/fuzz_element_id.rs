#![no_main]

use appium_rs::server::envelope::element_id;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        if let Some(id) = element_id(&value) {
            assert!(!id.is_empty());
        }
    }
});
