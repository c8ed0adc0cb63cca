use super::*;

const SECRET: &str = "super-secret-jwt-token-with-at-least-32-characters";
const AUDIENCE: &str = "authenticated";

mod test_helpers {
    use super::*;

    pub fn manager() -> JwtManager {
        JwtManager::with_secret(SECRET, Some(AUDIENCE.to_string()))
    }

    pub fn claims(subject: &str, now: i64) -> Claims {
        Claims {
            sub: subject.to_string(),
            aud: Some(Audience::Single(AUDIENCE.to_string())),
            exp: now + 3600,
            iat: Some(now),
            nbf: None,
        }
    }

    /// Signs raw JSON claims, for shapes [`Claims`] would not produce
    pub fn sign_json(algorithm: Algorithm, claims: &serde_json::Value) -> String {
        encode(
            &Header::new(algorithm),
            claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }
}

mod signature_validation {
    use super::test_helpers::*;
    use super::*;

    #[test]
    fn test_accepts_token_signed_with_shared_secret() {
        let now = Utc::now().timestamp();
        let token = manager().sign(&claims("user-1", now)).unwrap();

        let claims = manager().validate(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
    }

    #[test]
    fn test_rejects_token_signed_with_other_secret() {
        let now = Utc::now().timestamp();
        let other = JwtManager::with_secret("another-secret", Some(AUDIENCE.to_string()));
        let token = other.sign(&claims("user-1", now)).unwrap();

        assert_eq!(manager().validate(&token), Err(JwtError::InvalidSignature));
    }

    #[test]
    fn test_rejects_tampered_payload() {
        let now = Utc::now().timestamp();
        let token = manager().sign(&claims("user-1", now)).unwrap();
        let forged = manager().sign(&claims("user-2", now)).unwrap();

        // Payload of user-2 with the signature of user-1
        let mut parts: Vec<&str> = forged.split('.').collect();
        parts[2] = token.rsplit('.').next().unwrap();
        let tampered = parts.join(".");

        assert_eq!(
            manager().validate(&tampered),
            Err(JwtError::InvalidSignature)
        );
    }

    #[test]
    fn test_rejects_other_hmac_algorithms() {
        let now = Utc::now().timestamp();
        let payload = serde_json::to_value(claims("user-1", now)).unwrap();

        for algorithm in [Algorithm::HS384, Algorithm::HS512] {
            let token = sign_json(algorithm, &payload);

            assert_eq!(
                manager().validate(&token),
                Err(JwtError::UnsupportedAlgorithm),
                "Should reject {algorithm:?}"
            );
        }
    }

    #[test]
    fn test_rejects_unsigned_token() {
        let now = Utc::now().timestamp();
        let token = manager().sign(&claims("user-1", now)).unwrap();

        // {"alg":"none"} with the original payload and no signature
        let payload = token.split('.').nth(1).unwrap();
        let unsigned = format!("eyJhbGciOiJub25lIn0.{payload}.");

        assert_eq!(manager().validate(&unsigned), Err(JwtError::InvalidToken));
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        let malformed_tokens = vec![
            ("missing_parts", "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiJ0ZXN0In0"),
            (
                "extra_parts",
                "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiJ0ZXN0In0.sig.extra",
            ),
            ("invalid_base64_header", "not!base64.eyJzdWIiOiJ0ZXN0In0.sig"),
            ("empty_parts", ".."),
            ("empty", ""),
        ];

        for (test_name, malformed_token) in malformed_tokens {
            assert!(
                manager().validate(malformed_token).is_err(),
                "Should reject malformed token: {test_name}"
            );
        }
    }

    #[test]
    fn test_rejects_subject_that_escapes_namespace() {
        let now = Utc::now().timestamp();
        let token = manager().sign(&claims("alice/../bob", now)).unwrap();

        assert_eq!(manager().validate(&token), Err(JwtError::InvalidSubject));
    }

    #[test]
    fn test_issue_token_round_trip() {
        let token = manager()
            .issue_token("user-9", Duration::from_secs(60))
            .unwrap();

        let claims = manager().validate(&token).unwrap();
        assert_eq!(claims.sub, "user-9");
        assert!(claims.aud.unwrap().contains(AUDIENCE));
    }
}

mod audience_validation {
    use super::test_helpers::*;
    use super::*;

    #[test]
    fn test_accepts_audience_list() {
        let now = Utc::now().timestamp();
        let token = sign_json(
            Algorithm::HS256,
            &serde_json::json!({
                "sub": "user-1",
                "aud": ["authenticated"],
                "exp": now + 3600,
                "role": "authenticated",
            }),
        );

        let claims = manager().validate(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(
            claims.aud,
            Some(Audience::Many(vec![AUDIENCE.to_string()]))
        );
    }

    #[test]
    fn test_accepts_list_containing_audience() {
        let now = Utc::now().timestamp();
        let token = sign_json(
            Algorithm::HS256,
            &serde_json::json!({
                "sub": "user-1",
                "aud": ["service", "authenticated"],
                "exp": now + 3600,
            }),
        );

        assert!(manager().validate(&token).is_ok());
    }

    #[test]
    fn test_rejects_wrong_audience() {
        let now = Utc::now().timestamp();
        let mut wrong_single = claims("user-1", now);
        wrong_single.aud = Some(Audience::Single("service_role".to_string()));
        let mut wrong_list = claims("user-1", now);
        wrong_list.aud = Some(Audience::Many(vec!["service_role".to_string()]));

        for claims in [wrong_single, wrong_list] {
            let token = manager().sign(&claims).unwrap();
            assert_eq!(manager().validate(&token), Err(JwtError::InvalidAudience));
        }
    }

    #[test]
    fn test_audience_check_can_be_skipped() {
        let now = Utc::now().timestamp();
        let manager = JwtManager::with_secret(SECRET, None);
        let mut claims = claims("user-1", now);
        claims.aud = Some(Audience::Single("anything".to_string()));
        let token = manager.sign(&claims).unwrap();

        assert!(manager.validate(&token).is_ok());
    }
}

mod claims_validation {
    use super::test_helpers::*;
    use super::*;

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now().timestamp();
        let mut claims = claims("test", now - 7200);
        claims.exp = now - 3600;
        let token = manager().sign(&claims).unwrap();

        assert_eq!(manager().validate(&token), Err(JwtError::Expired));
    }

    #[test]
    fn test_expired_token_within_skew_accepted() {
        let now = Utc::now().timestamp();
        let mut claims = claims("test", now - 3600);
        claims.exp = now - 30;
        let token = manager().sign(&claims).unwrap();

        assert!(manager().validate(&token).is_ok());
    }

    #[test]
    fn test_not_before_in_future_rejected() {
        let now = Utc::now().timestamp();
        let mut claims = claims("test", now);
        claims.nbf = Some(now + 600);
        let token = manager().sign(&claims).unwrap();

        assert_eq!(manager().validate(&token), Err(JwtError::NotYetValid));
    }

    #[test]
    fn test_missing_expiry_rejected() {
        let token = sign_json(
            Algorithm::HS256,
            &serde_json::json!({ "sub": "user-1", "aud": AUDIENCE }),
        );

        assert!(manager().validate(&token).is_err());
    }
}
