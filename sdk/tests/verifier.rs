use std::{sync::Arc, time::Duration};

use serde_json::json;
use whitelist_sdk::{
    Address, Backoff, ConsistencyPolicy, WhitelistVerifier, error::VerifyError,
};

mod common;
use common::{MirrorFixture, whitelist_log};

const CONTRACT: &str = "0.0.5723470";

fn verifier(fixture: &MirrorFixture) -> WhitelistVerifier {
    WhitelistVerifier::new(Arc::new(fixture.client()), CONTRACT)
}

macro_rules! fixture_or_skip {
    () => {
        match MirrorFixture::spawn().await {
            Some(fixture) => fixture,
            None => {
                eprintln!("skipping test: failed to bind local port");
                return;
            }
        }
    };
}

#[test_log::test(tokio::test)]
async fn unknown_accounts_are_not_whitelisted() {
    let fixture = fixture_or_skip!();
    let verifier = verifier(&fixture);

    assert!(!verifier.is_whitelisted(Address::repeat_byte(1)).await.unwrap());

    fixture.publish(Address::repeat_byte(2), 10);
    assert!(!verifier.is_whitelisted(Address::repeat_byte(1)).await.unwrap());
}

#[test_log::test(tokio::test)]
async fn single_event_whitelists_exactly_that_account() {
    let fixture = fixture_or_skip!();
    let verifier = verifier(&fixture);
    let account = Address::repeat_byte(0xab);
    fixture.publish(account, 10);

    assert!(verifier.is_whitelisted(account).await.unwrap());
    for other in [Address::ZERO, Address::repeat_byte(0xac), Address::repeat_byte(0xff)] {
        assert!(!verifier.is_whitelisted(other).await.unwrap());
    }
}

#[test_log::test(tokio::test)]
async fn membership_index_is_idempotent() {
    let fixture = fixture_or_skip!();
    let verifier = verifier(&fixture);
    fixture.publish(Address::repeat_byte(1), 10);
    fixture.publish(Address::repeat_byte(2), 11);

    let first = verifier.membership_index().await.unwrap();
    let second = verifier.membership_index().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(fixture.log_requests(), 2);
}

#[test_log::test(tokio::test)]
async fn corrupt_records_do_not_abort_the_replay() {
    let fixture = fixture_or_skip!();
    let verifier = verifier(&fixture);
    let before = Address::repeat_byte(1);
    let after = Address::repeat_byte(2);

    fixture.push_log(whitelist_log(before, 10));
    // 31 bytes: one short of an ABI word
    fixture.push_log(json!({ "data": format!("0x{}", "00".repeat(31)), "topics": [] }));
    fixture.push_log(json!({ "data": "0xzz", "topics": [] }));
    fixture.push_log(whitelist_log(after, 12));

    let index = verifier.membership_index().await.unwrap();
    assert!(index.contains(&before));
    assert!(index.contains(&after));
    assert_eq!(index.skipped(), 2);
}

#[test_log::test(tokio::test)]
async fn malformed_mirror_response_is_an_error() {
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        eprintln!("skipping test: failed to bind local port");
        return;
    };
    let addr = listener.local_addr().unwrap();
    let router = axum::Router::new().route(
        "/api/v1/contracts/{contract}/results/logs",
        axum::routing::get(|| async { axum::Json(json!({ "results": [] })) }),
    );
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, router.into_make_service()).await;
    });

    let client = whitelist_sdk::MirrorClient::new(&format!("http://{addr}/api/v1"), None).unwrap();
    let verifier = WhitelistVerifier::new(Arc::new(client), CONTRACT);
    let err = verifier
        .is_whitelisted(Address::repeat_byte(1))
        .await
        .expect_err("missing logs array");
    assert!(matches!(
        err,
        VerifyError::Mirror(whitelist_sdk::MirrorError::MalformedResponse(_))
    ));

    handle.abort();
}

#[test_log::test(tokio::test)]
async fn fixed_delay_policy_waits_then_queries() {
    let fixture = fixture_or_skip!();
    let verifier = verifier(&fixture);
    let account = Address::repeat_byte(3);
    fixture.publish(account, 5);

    let started = tokio::time::Instant::now();
    let whitelisted = verifier
        .is_whitelisted_consistent(account, ConsistencyPolicy::FixedDelay(Duration::from_millis(50)))
        .await
        .unwrap();
    assert!(whitelisted);
    assert!(started.elapsed() >= Duration::from_millis(50));
}

#[test_log::test(tokio::test)]
async fn block_policy_gives_up_when_never_indexed() {
    let fixture = fixture_or_skip!();
    let verifier = verifier(&fixture);
    fixture.set_latest_block(3);

    let policy = ConsistencyPolicy::UntilBlockIndexed {
        block: 10,
        backoff: Backoff {
            initial: Duration::from_millis(5),
            max: Duration::from_millis(20),
            max_attempts: 3,
        },
    };
    let err = verifier
        .is_whitelisted_consistent(Address::repeat_byte(1), policy)
        .await
        .expect_err("block never indexed");
    assert!(matches!(
        err,
        VerifyError::NotIndexed {
            block: 10,
            attempts: 3
        }
    ));
    assert_eq!(fixture.log_requests(), 0);
}

#[test_log::test(tokio::test)]
async fn block_policy_passes_once_block_is_indexed() {
    let fixture = fixture_or_skip!();
    let verifier = verifier(&fixture);
    let account = Address::repeat_byte(4);
    fixture.publish(account, 20);

    let policy = ConsistencyPolicy::UntilBlockIndexed {
        block: 20,
        backoff: Backoff::default(),
    };
    assert!(verifier.is_whitelisted_consistent(account, policy).await.unwrap());
}
