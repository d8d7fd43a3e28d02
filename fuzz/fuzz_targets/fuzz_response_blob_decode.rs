#![no_main]

use libfuzzer_sys::fuzz_target;
use trappist_codec::ResponseBlob;

// Decoding arbitrary bytes never panics, and anything that decodes
// re-encodes to the same bytes.
fuzz_target!(|data: &[u8]| {
    if let Ok(blob) = ResponseBlob::decode(data, 256) {
        assert_eq!(blob.operators.len(), blob.signatures.len());
        assert!(blob.operators.len() <= 256);
        let encoded = blob.encode().expect("decoded blob re-encodes");
        assert_eq!(encoded, data);
    }
});
