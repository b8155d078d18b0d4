#![no_main]
use ecert_core::input::stage_token;
use ecert_core::output::until_nul;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&cap, token)) = data.split_first() else {
        return;
    };
    let capacity = usize::from(cap);
    let mut buf = vec![0x5au8; capacity + 8];
    let staged = stage_token(token, &mut buf[..capacity]);

    assert!(staged.length <= capacity);
    assert!(buf[capacity..].iter().all(|&b| b == 0x5a));
    if capacity > 0 {
        assert_eq!(buf[staged.length - 1], 0);
        let copied = &buf[..staged.length - 1];
        assert_eq!(copied, &token[..copied.len()]);
        if !staged.truncated() && !token.contains(&0) {
            assert_eq!(until_nul(&buf), token);
        }
    }
});
