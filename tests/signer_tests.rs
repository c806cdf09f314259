use chrono::{TimeZone, Utc};
use spark_summary::signer;

const HOST: &str = "spark-api.xf-yun.com";
const PATH: &str = "/v3.5/chat";

fn fixed_instant() -> chrono::DateTime<Utc>
{   Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap()
}

#[test]
fn test_http_date_format()
{   assert_eq!(
      signer::http_date(fixed_instant()),
      "Wed, 21 Oct 2015 07:28:00 GMT"
    );
}

#[test]
fn test_sign_known_vector()
{   let target = signer::sign(
      HOST, PATH, "test-key", "test-secret", fixed_instant()
    ).unwrap();

    assert_eq!(target.host, HOST);
    assert_eq!(target.date, "Wed, 21 Oct 2015 07:28:00 GMT");
    assert_eq!(
      target.authorization,
      "YXBpX2tleT0idGVzdC1rZXkiLCBhbGdvcml0aG09ImhtYWMtc2hhMjU2IiwgaGVhZGVy\
       cz0iaG9zdCBkYXRlIHJlcXVlc3QtbGluZSIsIHNpZ25hdHVyZT0iUlBHOGxSTzJQb0Jk\
       MHVjaUE0RlBEWjJ0RjBhQVVoNGZ3bk96VWIrUjZpTT0i"
    );
}

#[test]
fn test_authorization_embeds_key_and_signature()
{   use base64::{engine::general_purpose::STANDARD, Engine as _};

    let target = signer::sign(
      HOST, PATH, "test-key", "test-secret", fixed_instant()
    ).unwrap();
    let decoded = String::from_utf8(
      STANDARD.decode(&target.authorization).unwrap()
    ).unwrap();

    assert_eq!(
      decoded,
      "api_key=\"test-key\", algorithm=\"hmac-sha256\", \
       headers=\"host date request-line\", \
       signature=\"RPG8lRO2PoBd0uciA4FPDZ2tF0aAUh4fwnOzUb+R6iM=\""
    );
}

#[test]
fn test_same_instant_same_token()
{   let a = signer::sign(HOST, PATH, "k", "s", fixed_instant()).unwrap();
    let b = signer::sign(HOST, PATH, "k", "s", fixed_instant()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_different_instants_different_tokens()
{   let later = fixed_instant() + chrono::Duration::seconds(1);
    let a = signer::sign(HOST, PATH, "k", "s", fixed_instant()).unwrap();
    let b = signer::sign(HOST, PATH, "k", "s", later).unwrap();
    assert_ne!(a.date, b.date);
    assert_ne!(a.authorization, b.authorization);
}

#[test]
fn test_secret_changes_token()
{   let a = signer::sign(HOST, PATH, "k", "s1", fixed_instant()).unwrap();
    let b = signer::sign(HOST, PATH, "k", "s2", fixed_instant()).unwrap();
    assert_ne!(a.authorization, b.authorization);
}

#[test]
fn test_url_carries_form_encoded_params()
{   let target = signer::sign(
      HOST, PATH, "test-key", "test-secret", fixed_instant()
    ).unwrap();
    let url = target.url("wss://spark-api.xf-yun.com/v3.5/chat").unwrap();

    assert_eq!(url.scheme(), "wss");
    assert_eq!(url.path(), PATH);
    let query = url.query().unwrap();
    assert!(query.starts_with(
      "host=spark-api.xf-yun.com&date=Wed%2C+21+Oct+2015+07%3A28%3A00+GMT&authorization="
    ));

    let pairs: Vec<(String, String)> = url.query_pairs()
      .map(|(k, v)| (k.into_owned(), v.into_owned()))
      .collect();
    assert_eq!(pairs[2], ("authorization".to_string(), target.authorization));
}

#[test]
fn test_url_rejects_bad_endpoint()
{   let target = signer::sign(HOST, PATH, "k", "s", fixed_instant()).unwrap();
    let err = target.url("not a url").unwrap_err();
    assert!(matches!(err, spark_summary::Error::Configuration(_)));
}
