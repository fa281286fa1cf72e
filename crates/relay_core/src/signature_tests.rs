//! Tests for signature module.

use super::*;

const FOX: &[u8] = b"The quick brown fox jumps over the lazy dog";
const FOX_SHA1: &str = "de7c9b85b8b78aa6bc8a7a36f70a90701c9db4d9";
const FOX_SHA256: &str = "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8";

fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

fn bare_sha1() -> SignatureScheme {
    SignatureScheme::new(SignatureAlgorithm::HmacSha1, SignatureFormat::BareHex)
}

fn prefixed_sha1() -> SignatureScheme {
    SignatureScheme::new(SignatureAlgorithm::HmacSha1, SignatureFormat::Prefixed)
}

mod compute_tests {
    use super::*;

    #[test]
    fn test_sha1_bare_matches_known_vector() {
        let sig = compute_signature(FOX, &secret("key"), &bare_sha1()).unwrap();
        assert_eq!(sig, FOX_SHA1);
    }

    #[test]
    fn test_sha256_bare_matches_known_vector() {
        let scheme = SignatureScheme::new(SignatureAlgorithm::HmacSha256, SignatureFormat::BareHex);
        let sig = compute_signature(FOX, &secret("key"), &scheme).unwrap();
        assert_eq!(sig, FOX_SHA256);
    }

    #[test]
    fn test_prefixed_format_carries_scheme_label() {
        let sig = compute_signature(FOX, &secret("key"), &prefixed_sha1()).unwrap();
        assert_eq!(sig, format!("sha1={}", FOX_SHA1));

        let scheme =
            SignatureScheme::new(SignatureAlgorithm::HmacSha256, SignatureFormat::Prefixed);
        let sig = compute_signature(FOX, &secret("key"), &scheme).unwrap();
        assert_eq!(sig, format!("sha256={}", FOX_SHA256));
    }

    #[test]
    fn test_digest_is_lowercase_hex() {
        let sig = compute_signature(b"{}", &secret("s3cr3t"), &bare_sha1()).unwrap();
        assert_eq!(sig.len(), 40);
        assert!(sig
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_empty_secret_is_accepted_by_hmac() {
        // HMAC pads short keys, so an empty key still produces a digest.
        let sig = compute_signature(b"body", &secret(""), &bare_sha1());
        assert!(sig.is_ok());
    }
}

mod verify_tests {
    use super::*;

    #[test]
    fn test_own_digest_always_verifies() {
        let bodies: [&[u8]; 4] = [b"", b"{}", FOX, "ünïcødé ✅".as_bytes()];
        for scheme in [bare_sha1(), prefixed_sha1()] {
            for body in bodies {
                let s = secret("webhook-secret");
                let sig = compute_signature(body, &s, &scheme).unwrap();
                assert!(
                    verify_signature(body, Some(&sig), &s, &scheme),
                    "digest of {:?} should verify under {:?}",
                    body,
                    scheme
                );
            }
        }
    }

    #[test]
    fn test_digest_of_other_body_is_rejected() {
        let s = secret("webhook-secret");
        let sig = compute_signature(b"{\"type\":\"a\"}", &s, &bare_sha1()).unwrap();
        assert!(!verify_signature(
            b"{\"type\":\"b\"}",
            Some(&sig),
            &s,
            &bare_sha1()
        ));
    }

    #[test]
    fn test_whitespace_change_in_body_is_rejected() {
        // The digest covers raw bytes; re-serialised JSON is a different body.
        let s = secret("webhook-secret");
        let original = b"{\"type\": \"deployment.created\"}";
        let reserialised = b"{\"type\":\"deployment.created\"}";
        let sig = compute_signature(original, &s, &bare_sha1()).unwrap();
        assert!(!verify_signature(reserialised, Some(&sig), &s, &bare_sha1()));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let sig = compute_signature(FOX, &secret("key"), &bare_sha1()).unwrap();
        assert!(!verify_signature(
            FOX,
            Some(&sig),
            &secret("other"),
            &bare_sha1()
        ));
    }

    #[test]
    fn test_missing_header_is_rejected() {
        assert!(!verify_signature(FOX, None, &secret("key"), &bare_sha1()));
    }

    #[test]
    fn test_empty_header_is_rejected() {
        assert!(!verify_signature(FOX, Some(""), &secret("key"), &bare_sha1()));
    }

    #[test]
    fn test_length_mismatch_is_rejected_without_panic() {
        let s = secret("key");
        let short = &FOX_SHA1[..39];
        let long = format!("{}0", FOX_SHA1);
        assert!(!verify_signature(FOX, Some(short), &s, &bare_sha1()));
        assert!(!verify_signature(FOX, Some(&long), &s, &bare_sha1()));
        assert!(!verify_signature(FOX, Some("x"), &s, &bare_sha1()));
    }

    #[test]
    fn test_mismatch_at_every_position_is_rejected() {
        let s = secret("key");
        for position in 0..FOX_SHA1.len() {
            let mut tampered: Vec<u8> = FOX_SHA1.as_bytes().to_vec();
            tampered[position] = if tampered[position] == b'0' { b'1' } else { b'0' };
            let tampered = String::from_utf8(tampered).unwrap();
            assert!(
                !verify_signature(FOX, Some(&tampered), &s, &bare_sha1()),
                "tampered byte at {} should be rejected",
                position
            );
        }
    }

    #[test]
    fn test_uppercase_hex_is_rejected() {
        // The provider sends lowercase; the received value is not normalised.
        let upper = FOX_SHA1.to_ascii_uppercase();
        assert!(!verify_signature(
            FOX,
            Some(&upper),
            &secret("key"),
            &bare_sha1()
        ));
    }

    #[test]
    fn test_non_ascii_header_is_rejected() {
        let weird = "é".repeat(20);
        assert_eq!(weird.len(), 40);
        assert!(!verify_signature(FOX, Some(&weird), &secret("key"), &bare_sha1()));
    }
}

mod header_convention_tests {
    use super::*;

    #[test]
    fn test_bare_convention_accepts_bare_header() {
        assert!(verify_signature(
            FOX,
            Some(FOX_SHA1),
            &secret("key"),
            &bare_sha1()
        ));
    }

    #[test]
    fn test_bare_convention_rejects_prefixed_header() {
        let prefixed = format!("sha1={}", FOX_SHA1);
        assert!(!verify_signature(
            FOX,
            Some(&prefixed),
            &secret("key"),
            &bare_sha1()
        ));
    }

    #[test]
    fn test_prefixed_convention_accepts_prefixed_header() {
        let prefixed = format!("sha1={}", FOX_SHA1);
        assert!(verify_signature(
            FOX,
            Some(&prefixed),
            &secret("key"),
            &prefixed_sha1()
        ));
    }

    #[test]
    fn test_prefixed_convention_rejects_bare_header() {
        assert!(!verify_signature(
            FOX,
            Some(FOX_SHA1),
            &secret("key"),
            &prefixed_sha1()
        ));
    }

    #[test]
    fn test_prefixed_convention_rejects_wrong_scheme_label() {
        let mislabelled = format!("sha2={}", FOX_SHA1);
        assert!(!verify_signature(
            FOX,
            Some(&mislabelled),
            &secret("key"),
            &prefixed_sha1()
        ));
    }
}

mod scheme_parsing_tests {
    use super::*;

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!(
            "sha1".parse::<SignatureAlgorithm>().unwrap(),
            SignatureAlgorithm::HmacSha1
        );
        assert_eq!(
            " SHA256 ".parse::<SignatureAlgorithm>().unwrap(),
            SignatureAlgorithm::HmacSha256
        );
        assert_eq!(
            "md5".parse::<SignatureAlgorithm>().unwrap_err(),
            SignatureError::UnknownAlgorithm("md5".to_string())
        );
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(
            "bare".parse::<SignatureFormat>().unwrap(),
            SignatureFormat::BareHex
        );
        assert_eq!(
            "Prefixed".parse::<SignatureFormat>().unwrap(),
            SignatureFormat::Prefixed
        );
        assert!("base64".parse::<SignatureFormat>().is_err());
    }

    #[test]
    fn test_default_scheme_is_bare_sha1() {
        assert_eq!(SignatureScheme::default(), bare_sha1());
    }
}
