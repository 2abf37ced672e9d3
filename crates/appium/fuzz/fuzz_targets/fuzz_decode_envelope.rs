#![no_main]

// Arbitrary server bodies and HTTP statuses must decode to Ok or Err, never panic.

use appium_rs::server::envelope::decode_response;
use appium_rs::server::transport::{HttpResponse, Method};
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&status_byte, body)) = data.split_first() else {
        return;
    };
    // Spread the first byte over 2xx/4xx/5xx
    let status = match status_byte % 3 {
        0 => 200,
        1 => 404,
        _ => 500,
    };
    let response = HttpResponse {
        status,
        body: Bytes::copy_from_slice(body),
    };

    if let Ok(decoded) = decode_response(Method::Post, "/session/s1/element", &response) {
        let _ = decoded.value_as::<serde_json::Value>();
        let _ = decoded.value_as::<Vec<String>>();
    }
});
