#![no_main]

use libfuzzer_sys::fuzz_target;
use rpki_spl::{SignedPrefixList, Spl, SplConfig};

fuzz_target!(|data: &[u8]| {
    let (which, mut data) = match data.split_first() {
        Some((first, data)) => (*first, data),
        None => return,
    };

    let strict = SplConfig::default();
    let lax = SplConfig { strict: false, .. Default::default() };
    match which % 3 {
        0 => { let _ = SignedPrefixList::decode(data, &strict); },
        1 => { let _ = SignedPrefixList::decode(data, &lax); },
        2 => {
            if let Ok(spl) = Spl::decode(&mut data) {
                assert_eq!(Spl::decode(&mut spl.to_bytes()), Ok(spl));
            }
        },
        _ => panic!("what?"),
    }
});
