use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{TimeZone, Utc};
use orbit_notifier::crypto::{
    HEADER_LEN, PUBLIC_KEY_LEN, RECORD_SIZE, SALT_LEN, VapidSigner, audience, decode_base64url,
    derive_content_keys, encrypt_payload, seal_record,
};
use pretty_assertions::assert_eq;
use ring::{
    aead, agreement,
    rand::SystemRandom,
    signature::{ECDSA_P256_SHA256_FIXED, UnparsedPublicKey},
};
use rstest::rstest;

// Fixed P-256 key pair used only by these tests
const VAPID_PUBLIC: &str =
    "BMFiVbElYdRNQEGPAdBjmSM-U8GCQW5-eUev3txWD6da-epKuVoTDio3bxbddUEV2un0yY_HbQKVxTVTIIhunz4";
const VAPID_PRIVATE: &str = "GyG39qIyCTqFtGV20ZIjJxziGKVyxSu-muyNasYOQ8s";

fn b64(value: &str) -> Vec<u8> {
    decode_base64url(value).unwrap()
}

#[test]
fn test_seal_record_matches_rfc8291_example() {
    let body = seal_record(
        b"When I grow up, I want to be a watermelon",
        &b64("kyrL1jIIOHEzg3sM2ZWRHDRB62YACZhhSlknJ672kSs"),
        &b64("BTBZMqHH6r4Tts7J_aSIgg"),
        &b64("BCVxsr7N_eNgVRqvHtD0zTZsEc6-VV-JvLexhqUzORcxaOzi6-AYWXvTBHm4bjyPjs7Vd8pZGH6SRpkNtoIAiw4"),
        &b64("BP4z9KsN6nGRTbVYI_c7VJSPQTBtkgcy27mlmlMoZIIgDll6e3vCYLocInmYWAmS6TlzAC8wEqKK6PBru3jl7A8"),
        &b64("DGv6ra1nlYgDCS1FRnbzlw"),
    )
    .unwrap();

    assert_eq!(
        URL_SAFE_NO_PAD.encode(body),
        "DGv6ra1nlYgDCS1FRnbzlwAAEABBBP4z9KsN6nGRTbVYI_c7VJSPQTBtkgcy27mlmlMoZIIgDll6e3vCYLocInmYWAmS6TlzAC8wEqKK6PBru3jl7A_yl95bQpu6cVPTpK4Mqgkf1CXztLVBSt2Ks3oZwbuwXPXLWyouBWLVWGNWQexSgSxsj_Qulcy4a-fN"
    );
}

#[test]
fn test_browser_can_decrypt_payload() {
    let rng = SystemRandom::new();
    let ua_private = agreement::EphemeralPrivateKey::generate(&agreement::ECDH_P256, &rng).unwrap();
    let ua_public = ua_private.compute_public_key().unwrap().as_ref().to_vec();
    let auth_secret = [7u8; 16];
    let message = br#"{"title":"Upcoming class: Physics"}"#;

    let body = encrypt_payload(message, &ua_public, &auth_secret).unwrap();

    let salt = &body[..SALT_LEN];
    assert_eq!(&body[SALT_LEN..SALT_LEN + 4], &RECORD_SIZE.to_be_bytes());
    assert_eq!(body[SALT_LEN + 4] as usize, PUBLIC_KEY_LEN);
    let as_public = &body[HEADER_LEN..HEADER_LEN + PUBLIC_KEY_LEN];
    let mut record = body[HEADER_LEN + PUBLIC_KEY_LEN..].to_vec();

    let peer = agreement::UnparsedPublicKey::new(&agreement::ECDH_P256, as_public);
    let shared = agreement::agree_ephemeral(ua_private, &peer, |s| s.to_vec()).unwrap();
    let keys = derive_content_keys(&shared, &auth_secret, &ua_public, as_public, salt).unwrap();

    let key = aead::LessSafeKey::new(aead::UnboundKey::new(&aead::AES_128_GCM, &keys.cek).unwrap());
    let plaintext = key
        .open_in_place(
            aead::Nonce::assume_unique_for_key(keys.nonce),
            aead::Aad::empty(),
            &mut record,
        )
        .unwrap();

    assert_eq!(plaintext.last(), Some(&0x02));
    assert_eq!(&plaintext[..plaintext.len() - 1], message.as_slice());
}

#[rstest]
#[case(vec![4u8; 64], vec![1u8; 16])]
#[case(vec![4u8; 65], vec![1u8; 12])]
fn test_encrypt_rejects_malformed_keys(#[case] ua_public: Vec<u8>, #[case] auth: Vec<u8>) {
    assert!(encrypt_payload(b"hi", &ua_public, &auth).is_err());
}

#[test]
fn test_oversized_payload_is_refused() {
    let shared = [1u8; 32];
    let result = seal_record(&[b'x'; 5000], &shared, &[2u8; 16], &[4u8; 65], &[4u8; 65], &[3u8; 16]);
    assert!(result.is_err());
}

#[rstest]
#[case("BTBZMqHH6r4Tts7J_aSIgg")]
#[case("BTBZMqHH6r4Tts7J_aSIgg==")]
fn test_decode_accepts_padding(#[case] value: &str) {
    assert_eq!(decode_base64url(value).unwrap().len(), 16);
}

#[rstest]
#[case("https://fcm.googleapis.com/fcm/send/abc123", "https://fcm.googleapis.com")]
#[case("https://updates.push.services.mozilla.com:443/wpush/v2/xyz", "https://updates.push.services.mozilla.com")]
#[case("https://push.example.com:8443/p/1", "https://push.example.com:8443")]
fn test_audience_is_endpoint_origin(#[case] endpoint: &str, #[case] expected: &str) {
    assert_eq!(audience(endpoint).unwrap(), expected);
}

#[test]
fn test_vapid_token_verifies_with_public_key() {
    let signer = VapidSigner::new(VAPID_PUBLIC, VAPID_PRIVATE, "mailto:ops@example.com").unwrap();
    assert_eq!(signer.public_key(), VAPID_PUBLIC);

    let now = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
    let token = signer
        .sign_token("https://push.example.com/send/abc", now)
        .unwrap();

    let parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts.len(), 3);

    let header: serde_json::Value =
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[0]).unwrap()).unwrap();
    assert_eq!(header["alg"], "ES256");

    let claims: serde_json::Value =
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
    assert_eq!(claims["aud"], "https://push.example.com");
    assert_eq!(claims["sub"], "mailto:ops@example.com");
    assert_eq!(claims["exp"], now.timestamp() + 12 * 60 * 60);

    let signature = URL_SAFE_NO_PAD.decode(parts[2]).unwrap();
    let signing_input = format!("{}.{}", parts[0], parts[1]);
    UnparsedPublicKey::new(&ECDSA_P256_SHA256_FIXED, b64(VAPID_PUBLIC))
        .verify(signing_input.as_bytes(), &signature)
        .unwrap();
}

#[test]
fn test_vapid_authorization_header_shape() {
    let signer = VapidSigner::new(VAPID_PUBLIC, VAPID_PRIVATE, "mailto:ops@example.com").unwrap();
    let header = signer
        .authorization("https://push.example.com/send/abc", Utc::now())
        .unwrap();

    assert!(header.starts_with("vapid t="));
    assert!(header.ends_with(&format!(", k={}", VAPID_PUBLIC)));
}

#[test]
fn test_mismatched_vapid_keys_are_rejected() {
    let other_private = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8";
    assert!(VapidSigner::new(VAPID_PUBLIC, other_private, "mailto:ops@example.com").is_err());
}
