use rand::Rng;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Number of random characters appended after the timestamp prefix.
const RANDOM_SUFFIX_LEN: usize = 9;

/// Generate a request token for correlating a submission with its status row.
///
/// The token is the current Unix time in milliseconds in base 36 followed by
/// nine random base-36 characters, e.g. `mb2x7k1qf3k9z0a8c`. Uniqueness is
/// probabilistic only.
pub fn generate() -> String {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let mut id = to_base36(millis);

    let mut rng = rand::rng();
    id.extend((0..RANDOM_SUFFIX_LEN).map(|_| BASE36[rng.random_range(0..BASE36.len())] as char));
    id
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(13);
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base36_encoding() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
    }

    #[test]
    fn test_token_shape() {
        let id = generate();
        assert!(id.len() > RANDOM_SUFFIX_LEN);
        assert!(id.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()));
    }

    #[test]
    fn test_prefix_tracks_clock() {
        let before = chrono::Utc::now().timestamp_millis() as u64;
        let id = generate();
        let prefix = &id[..id.len() - RANDOM_SUFFIX_LEN];
        let decoded = u64::from_str_radix(prefix, 36).unwrap();
        assert!(decoded >= before);
        assert!(decoded - before < 60_000);
    }

    #[test]
    fn test_rapid_tokens_differ() {
        let ids: std::collections::HashSet<String> = (0..1000).map(|_| generate()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
