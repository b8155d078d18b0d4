#![no_main]
use ecert_core::{Console, RuntimeError};
use ecert_membrane::{HealingPolicy, RuntimeConfig, RuntimeMode};
use libfuzzer_sys::fuzz_target;

static POLICY: HealingPolicy = HealingPolicy::new();

fuzz_target!(|data: &[u8]| {
    // First byte picks the read sequence; the rest is stdin.
    let Some((&selector, input)) = data.split_first() else {
        return;
    };

    let mut strict =
        Console::new(input, Vec::new(), RuntimeConfig::default()).with_policy(&POLICY);
    let mut hardened = Console::new(
        input,
        Vec::new(),
        RuntimeConfig::default().with_mode(RuntimeMode::Hardened),
    )
    .with_policy(&POLICY);

    // Both consoles consume exactly one token per read, so they stay in step.
    for step in 0..16u32 {
        match selector.rotate_left(step) % 3 {
            0 => {
                let s = strict.get_integer();
                let h = hardened.get_integer();
                match s {
                    Ok(v) => assert_eq!(h.ok(), Some(v)),
                    Err(RuntimeError::Io(_)) => unreachable!("in-memory input"),
                    Err(_) => assert!(h.is_ok(), "hardened reads never fail on input"),
                }
            }
            1 => {
                let s = strict.get_float();
                let h = hardened.get_float();
                match s {
                    Ok(v) => assert_eq!(h.ok().map(f32::to_bits), Some(v.to_bits())),
                    Err(_) => assert!(h.is_ok()),
                }
            }
            _ => {
                let mut buf = [0xa5u8; 16];
                let len = hardened
                    .get_string_into(&mut buf[..8])
                    .expect("hardened string reads heal");
                assert!(len <= 8);
                assert!(buf[8..].iter().all(|&b| b == 0xa5), "wrote past capacity");
                let _ = strict.get_string();
            }
        }
    }
});
