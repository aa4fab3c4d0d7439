use ledger_core::constants::NO_SUCH_BLOCK;
use ledger_core::{Ledger, LedgerConfig};
use ledger_node::{router, AppState};
use rand::{rngs::StdRng, SeedableRng};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const T0: u64 = 1_600_000_000;

async fn spawn_node() -> anyhow::Result<String> {
    let ledger = Ledger::starting_at(LedgerConfig::default(), T0)?;
    let state = AppState::new(ledger, StdRng::seed_from_u64(1));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router(state)).await;
    });
    Ok(format!("http://{addr}"))
}

async fn get(client: &Client, url: String) -> anyhow::Result<Value> {
    Ok(client.get(url).send().await?.error_for_status()?.json().await?)
}

#[tokio::test]
async fn test_health_and_head() -> anyhow::Result<()> {
    let node = spawn_node().await?;
    let client = Client::new();

    let health = get(&client, format!("{node}/health")).await?;
    assert_eq!(health["status"], "ok");

    let head = get(&client, format!("{node}/chain/head")).await?;
    assert_eq!(head["height"], 0);
    assert_eq!(head["next_difficulty"], 4);
    assert_eq!(head["pending"], 0);
    assert_eq!(head["hash"].as_str().map(str::len), Some(64));
    Ok(())
}

#[tokio::test]
async fn test_submit_mine_and_query() -> anyhow::Result<()> {
    let node = spawn_node().await?;
    let client = Client::new();

    // nobody has funds yet
    let res = client
        .post(format!("{node}/tx"))
        .json(&json!({ "from": "alice", "to": "bob", "amount": 10, "fee": 1 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let mined: Value = client
        .post(format!("{node}/mine"))
        .json(&json!({ "miner": "alice", "timestamp": T0 + 60 }))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(mined["index"], 1);
    assert_eq!(mined["tx_count"], 1);

    let tx = json!({ "from": "alice", "to": "bob", "amount": 10, "fee": 1, "timestamp": T0 + 61 });
    let res = client.post(format!("{node}/tx")).json(&tx).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let accepted: Value = res.json().await?;
    assert_eq!(accepted["accepted"], true);

    let dup = client.post(format!("{node}/tx")).json(&tx).send().await?;
    assert_eq!(dup.status(), StatusCode::CONFLICT);
    let body: Value = dup.json().await?;
    assert!(body["error"].as_str().unwrap().contains("already pending"));

    let pool = get(&client, format!("{node}/mempool")).await?;
    assert_eq!(pool["count"], 1);
    assert_eq!(pool["transactions"][0]["from"], "alice");

    let mined: Value = client
        .post(format!("{node}/mine"))
        .json(&json!({ "miner": "miner", "policy": "Greedy", "timestamp": T0 + 120 }))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(mined["index"], 2);
    assert_eq!(mined["tx_count"], 2);

    let pool = get(&client, format!("{node}/mempool")).await?;
    assert_eq!(pool["count"], 0);

    assert_eq!(get(&client, format!("{node}/balance/alice")).await?["balance"], 39);
    assert_eq!(get(&client, format!("{node}/balance/bob")).await?["balance"], 10);
    assert_eq!(get(&client, format!("{node}/balance/miner")).await?["balance"], 51);

    let chain = get(&client, format!("{node}/chain")).await?;
    assert_eq!(chain["valid"], true);
    assert_eq!(chain["height"], 2);
    Ok(())
}

#[tokio::test]
async fn test_block_lookup_and_bad_policy() -> anyhow::Result<()> {
    let node = spawn_node().await?;
    let client = Client::new();

    let genesis = get(&client, format!("{node}/blocks/0")).await?;
    assert!(genesis["rendered"].as_str().unwrap().starts_with("Block 0"));
    for index in ["-1", "1"] {
        let missing = get(&client, format!("{node}/blocks/{index}")).await?;
        assert_eq!(missing["rendered"], NO_SUCH_BLOCK);
    }

    let res = client
        .post(format!("{node}/mine"))
        .json(&json!({ "miner": "alice", "policy": "Lazy" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let head = get(&client, format!("{node}/chain/head")).await?;
    assert_eq!(head["height"], 0);
    Ok(())
}
