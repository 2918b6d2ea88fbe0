use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hookbot_error::AuthError;

use super::{hmac_hex, secure_eq};
use crate::config::Secrets;

/// Заголовок подписи GitHub-вебхука.
pub const HUB_SIGNATURE: &str = "x-hub-signature";

/// Проверка доступа к путям `/pub/...` и `/sub/...`.
///
/// 1. Есть `X-Hub-Signature`: проверяется только подпись тела, итог
///    окончательный, `Authorization` игнорируется.
/// 2. Иначе `Authorization` из ровно двух полей: `basic` (base64, не
///    более одного завершающего `:`) или `bearer`, без учёта регистра
///    схемы. Значение сравнивается с `hex(HMAC-SHA1(key, path))`.
///
/// Все сравнения выполняются за постоянное время.
#[derive(Debug, Clone)]
pub struct AuthGate {
    secrets: Arc<Secrets>,
}

impl AuthGate {
    pub fn new(secrets: Arc<Secrets>) -> Self {
        Self { secrets }
    }

    /// Проверяет запрос. `body` нужен только для схемы с подписью;
    /// отсутствующее тело считается пустым.
    pub fn verify(
        &self,
        headers: &HeaderMap,
        path: &str,
        body: Option<&[u8]>,
    ) -> Result<(), AuthError> {
        if let Some(signature) = headers.get(HUB_SIGNATURE) {
            return self.verify_signature(signature.as_bytes(), body.unwrap_or_default());
        }

        let authorization = headers
            .get(AUTHORIZATION)
            .map(|v| v.as_bytes())
            .unwrap_or_default();
        let authorization =
            std::str::from_utf8(authorization).map_err(|_| AuthError::MalformedAuthorization {
                fields: 0,
            })?;

        let fields: Vec<&str> = authorization.split_whitespace().collect();
        let (scheme, value) = match fields.as_slice() {
            [] => return Err(AuthError::MissingAuthorization),
            [scheme, value] => (*scheme, *value),
            other => {
                return Err(AuthError::MalformedAuthorization {
                    fields: other.len(),
                })
            }
        };

        let given = match scheme.to_ascii_lowercase().as_str() {
            "basic" => {
                let mut decoded = STANDARD
                    .decode(value)
                    .map_err(|_| AuthError::InvalidBase64)?;
                if decoded.last() == Some(&b':') {
                    decoded.pop();
                }
                decoded
            }
            "bearer" => value.as_bytes().to_vec(),
            _ => {
                return Err(AuthError::UnsupportedScheme {
                    scheme: scheme.to_string(),
                })
            }
        };

        let expected = hmac_hex(self.secrets.key(), path.as_bytes());
        if secure_eq(&given, expected.as_bytes()) {
            Ok(())
        } else {
            Err(AuthError::TokenMismatch)
        }
    }

    fn verify_signature(
        &self,
        given: &[u8],
        body: &[u8],
    ) -> Result<(), AuthError> {
        let expected = format!("sha1={}", hmac_hex(self.secrets.github_secret(), body));
        if secure_eq(given, expected.as_bytes()) {
            Ok(())
        } else {
            Err(AuthError::SignatureMismatch)
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    const KEY: &str = "test-key";
    const GITHUB: &str = "gh-secret";
    const PATH: &str = "/sub/foo";

    fn gate() -> AuthGate {
        AuthGate::new(Arc::new(Secrets::new(KEY, GITHUB).unwrap()))
    }

    fn token() -> String {
        hmac_hex(KEY.as_bytes(), PATH.as_bytes())
    }

    fn with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_accepted() {
        let headers = with_auth(&format!("Bearer {}", token()));
        assert_eq!(gate().verify(&headers, PATH, None), Ok(()));
    }

    /// Тест проверяет, что токен привязан к пути.
    #[test]
    fn test_bearer_for_other_path_rejected() {
        let headers = with_auth(&format!("Bearer {}", token()));
        assert_eq!(
            gate().verify(&headers, "/pub/foo", None),
            Err(AuthError::TokenMismatch)
        );
    }

    /// Тест проверяет обработку завершающего двоеточия в Basic.
    #[rstest]
    #[case("", true)]
    #[case(":", true)]
    #[case("::", false)]
    #[case(":x", false)]
    fn test_basic_trailing_colon(
        #[case] suffix: &str,
        #[case] accepted: bool,
    ) {
        let encoded = STANDARD.encode(format!("{}{suffix}", token()));
        let headers = with_auth(&format!("Basic {encoded}"));
        assert_eq!(gate().verify(&headers, PATH, None).is_ok(), accepted);
    }

    #[rstest]
    #[case("bearer")]
    #[case("BEARER")]
    #[case("BeArEr")]
    fn test_scheme_is_case_insensitive(#[case] scheme: &str) {
        let headers = with_auth(&format!("{scheme} {}", token()));
        assert!(gate().verify(&headers, PATH, None).is_ok());
    }

    #[rstest]
    #[case("", AuthError::MissingAuthorization)]
    #[case("Bearer", AuthError::MalformedAuthorization { fields: 1 })]
    #[case("Bearer a b", AuthError::MalformedAuthorization { fields: 3 })]
    #[case("Digest abc", AuthError::UnsupportedScheme { scheme: "Digest".to_string() })]
    #[case("Basic !!!", AuthError::InvalidBase64)]
    fn test_malformed_authorization(
        #[case] value: &str,
        #[case] expected: AuthError,
    ) {
        let headers = with_auth(value);
        assert_eq!(gate().verify(&headers, PATH, None), Err(expected));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            gate().verify(&HeaderMap::new(), PATH, None),
            Err(AuthError::MissingAuthorization)
        );
    }

    /// Тест проверяет, что поля разделяются любыми пробельными символами.
    #[test]
    fn test_fields_split_on_whitespace_runs() {
        let headers = with_auth(&format!("  Bearer \t {}  ", token()));
        assert!(gate().verify(&headers, PATH, None).is_ok());
    }

    #[test]
    fn test_hub_signature_accepted() {
        let body = b"{\"ref\":\"main\"}";
        let mut headers = HeaderMap::new();
        let sig = format!("sha1={}", hmac_hex(GITHUB.as_bytes(), body));
        headers.insert(HUB_SIGNATURE, HeaderValue::from_str(&sig).unwrap());

        assert!(gate().verify(&headers, "/pub/anything", Some(body)).is_ok());
    }

    /// Тест проверяет, что неверная подпись отклоняется даже при
    /// корректном Bearer-токене.
    #[test]
    fn test_wrong_signature_overrides_valid_bearer() {
        let mut headers = with_auth(&format!("Bearer {}", token()));
        headers.insert(HUB_SIGNATURE, HeaderValue::from_static("sha1=deadbeef"));

        assert_eq!(
            gate().verify(&headers, PATH, Some(b"body")),
            Err(AuthError::SignatureMismatch)
        );
    }

    /// Тест проверяет, что подпись без префикса `sha1=` отклоняется.
    #[test]
    fn test_signature_requires_prefix() {
        let body = b"payload";
        let mut headers = HeaderMap::new();
        let sig = hmac_hex(GITHUB.as_bytes(), body);
        headers.insert(HUB_SIGNATURE, HeaderValue::from_str(&sig).unwrap());

        assert_eq!(
            gate().verify(&headers, PATH, Some(body)),
            Err(AuthError::SignatureMismatch)
        );
    }

    proptest! {
        /// Любая однобитовая мутация токена отклоняется.
        #[test]
        fn prop_single_bit_mutation_rejected(idx in 0usize..40, bit in 0u8..7) {
            let mut bytes = token().into_bytes();
            bytes[idx] ^= 1 << bit;
            prop_assume!(bytes.iter().all(|b| b.is_ascii_graphic()));

            let value = format!("Bearer {}", String::from_utf8(bytes).unwrap());
            let headers = with_auth(&value);
            prop_assert_eq!(
                gate().verify(&headers, PATH, None),
                Err(AuthError::TokenMismatch)
            );
        }
    }
}
