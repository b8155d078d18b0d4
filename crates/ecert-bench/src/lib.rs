//! Benchmark inputs shared by the `ecert-bench` benches.

/// `count` whitespace-separated decimal integers, cycling through signs and
/// widths.
#[must_use]
pub fn integer_stream(count: usize) -> String {
    let mut out = String::with_capacity(count * 8);
    for i in 0..count {
        let v = (i as i64 * 7_919) % 2_000_003 - 1_000_001;
        out.push_str(&v.to_string());
        out.push(if i % 16 == 15 { '\n' } else { ' ' });
    }
    out
}

/// `count` whitespace-separated float tokens.
#[must_use]
pub fn float_stream(count: usize) -> String {
    (0..count)
        .map(|i| format!("{:.3}", i as f64 * 0.125 - 50.0))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streams_have_requested_token_count() {
        assert_eq!(integer_stream(100).split_ascii_whitespace().count(), 100);
        assert_eq!(float_stream(10).split_ascii_whitespace().count(), 10);
    }
}
