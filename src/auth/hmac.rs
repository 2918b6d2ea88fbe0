use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;

type HmacSha1 = Hmac<Sha1>;

/// `hex(HMAC-SHA1(secret, message))` в нижнем регистре.
///
/// Общий примитив для токенов путей, подписи вебхуков и внешних роутеров.
pub fn hmac_hex(
    secret: &[u8],
    message: &[u8],
) -> String {
    let mut mac = HmacSha1::new_from_slice(secret)
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Сравнение за постоянное время (без выхода на первом несовпадении).
///
/// Разная длина даёт `false`.
pub fn secure_eq(
    a: &[u8],
    b: &[u8],
) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    /// Тест проверяет известный вектор RFC 2202 (test case 2).
    #[test]
    fn test_hmac_hex_known_vector() {
        assert_eq!(
            hmac_hex(b"Jefe", b"what do ya want for nothing?"),
            "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79"
        );
    }

    #[test]
    fn test_hmac_hex_is_lowercase_40_chars() {
        let token = hmac_hex(b"secret", b"/sub/foo");
        assert_eq!(token.len(), 40);
        assert!(token.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_secure_eq_basic() {
        assert!(secure_eq(b"abc", b"abc"));
        assert!(!secure_eq(b"abc", b"abd"));
        assert!(!secure_eq(b"abc", b"abcd"));
        assert!(secure_eq(b"", b""));
    }

    proptest! {
        /// Совпадение `secure_eq` с обычным равенством.
        #[test]
        fn prop_secure_eq_matches_eq(
            a in proptest::collection::vec(any::<u8>(), 0..64),
            b in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            prop_assert_eq!(secure_eq(&a, &b), a == b);
        }
    }
}
