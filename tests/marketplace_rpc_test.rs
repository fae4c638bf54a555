//! Marketplace Client Tests - Trade Transactions Against a Fake Node
//!
//! Runs `MarketplaceClient` over a real alloy provider pointed at a
//! minimal JSON-RPC endpoint on localhost. The endpoint records every
//! request, so the tests can check who simulates the offer, what the
//! signed transactions carry and in which order the node sees them.

use std::sync::{Arc, Mutex};

use alloy::consensus::{Transaction, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolCall;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use game_asset_market::adapters::chain::contracts::Marketplace;
use game_asset_market::adapters::chain::{ChainConnection, MarketplaceClient};
use game_asset_market::ports::marketplace::TradeMarketplace;

/// Hardhat account #0.
const SIGNER_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const CHAIN_ID: u64 = 31337;
const MARKET: Address = Address::repeat_byte(0x9f);
const TX_HASH: B256 = B256::repeat_byte(0xab);
const TARGET: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

// ---- Fake Node ----

/// How the fake node answers `eth_call`.
#[derive(Clone, Copy)]
enum CallBehavior {
    /// Return the given trade id.
    Returns(u64),
    /// Revert like a marketplace rejecting a non-owner.
    Reverts,
}

/// JSON-RPC endpoint that records requests and answers from fixtures.
struct FakeNode {
    url: String,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl FakeNode {
    async fn start(call: CallBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, Arc::clone(&log), call));
            }
        });

        Self { url, requests }
    }

    fn methods(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r["method"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    fn first(&self, method: &str) -> Option<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .find(|r| r["method"] == method)
            .cloned()
    }

    /// The single transaction sent with `eth_sendRawTransaction`.
    fn sent_transaction(&self) -> TxEnvelope {
        let request = self.first("eth_sendRawTransaction").unwrap();
        let raw: Bytes = serde_json::from_value(request["params"][0].clone()).unwrap();
        TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap()
    }

    async fn client(&self) -> MarketplaceClient {
        let signer: PrivateKeySigner = SIGNER_KEY.parse().unwrap();
        let connection = ChainConnection::with_signer(&self.url, signer, Some(CHAIN_ID))
            .await
            .unwrap();
        MarketplaceClient::new(Arc::new(connection), MARKET)
    }
}

/// Serve HTTP/1.1 requests on one keep-alive connection.
async fn serve(stream: TcpStream, log: Arc<Mutex<Vec<Value>>>, call: CallBehavior) {
    let (read, mut write) = stream.into_split();
    let mut reader = BufReader::new(read);

    loop {
        let mut request_line = String::new();
        if reader.read_line(&mut request_line).await.unwrap_or(0) == 0 {
            return;
        }

        let mut content_length = 0usize;
        loop {
            let mut header = String::new();
            if reader.read_line(&mut header).await.unwrap_or(0) == 0 {
                return;
            }
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                if name.trim().eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
        }

        let mut body = vec![0u8; content_length];
        if reader.read_exact(&mut body).await.is_err() {
            return;
        }
        let request: Value = serde_json::from_slice(&body).unwrap();
        log.lock().unwrap().push(request.clone());

        let payload = answer(&request, call).to_string();
        let head = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n",
            payload.len()
        );
        if write.write_all(head.as_bytes()).await.is_err()
            || write.write_all(payload.as_bytes()).await.is_err()
        {
            return;
        }
    }
}

fn answer(request: &Value, call: CallBehavior) -> Value {
    let id = request["id"].clone();
    let result = match request["method"].as_str().unwrap_or_default() {
        "eth_chainId" => json!(format!("{CHAIN_ID:#x}")),
        "eth_blockNumber" => json!("0x2"),
        "eth_getTransactionCount" => json!("0x0"),
        "eth_estimateGas" => json!("0x186a0"),
        "eth_gasPrice" | "eth_maxPriorityFeePerGas" => json!("0x3b9aca00"),
        "eth_feeHistory" => json!({
            "oldestBlock": "0x1",
            "baseFeePerGas": ["0x3b9aca00", "0x3b9aca00"],
            "gasUsedRatio": [0.5],
            "reward": [["0x3b9aca00"]]
        }),
        "eth_call" => match call {
            CallBehavior::Returns(trade_id) => {
                json!(Bytes::from(U256::from(trade_id).to_be_bytes_vec()))
            }
            CallBehavior::Reverts => {
                return json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": {"code": 3, "message": "execution reverted: not owner", "data": "0x"}
                });
            }
        },
        "eth_sendRawTransaction" => json!(TX_HASH),
        "eth_getTransactionReceipt" => receipt(&request["params"][0]),
        other => {
            return json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {"code": -32601, "message": format!("method {other} not found")}
            });
        }
    };
    json!({"jsonrpc": "2.0", "id": id, "result": result})
}

fn receipt(tx_hash: &Value) -> Value {
    json!({
        "type": "0x2",
        "status": "0x1",
        "cumulativeGasUsed": "0x186a0",
        "logs": [],
        "logsBloom": format!("0x{}", "0".repeat(512)),
        "transactionHash": tx_hash,
        "transactionIndex": "0x0",
        "blockHash": B256::repeat_byte(0x11),
        "blockNumber": "0x2",
        "gasUsed": "0x186a0",
        "effectiveGasPrice": "0x3b9aca00",
        "from": signer_address(),
        "to": MARKET,
        "contractAddress": null
    })
}

fn signer_address() -> Address {
    SIGNER_KEY.parse::<PrivateKeySigner>().unwrap().address()
}

fn position(methods: &[String], method: &str) -> usize {
    methods
        .iter()
        .position(|m| m == method)
        .unwrap_or_else(|| panic!("{method} never issued: {methods:?}"))
}

// ---- Tests ----

#[tokio::test]
async fn test_offer_is_simulated_as_signer_then_sent() {
    let node = FakeNode::start(CallBehavior::Returns(7)).await;
    let client = node.client().await;

    let confirmation = client.create_trade_offer("1", TARGET, "2").await.unwrap();

    assert_eq!(confirmation.trade_id, Some(U256::from(7u64)));
    assert_eq!(confirmation.tx_hash, TX_HASH);
    assert_eq!(confirmation.block_number, Some(2));

    // The preview must run with the signer as msg.sender
    let call = node.first("eth_call").unwrap();
    let from: Address = serde_json::from_value(call["params"][0]["from"].clone()).unwrap();
    let to: Address = serde_json::from_value(call["params"][0]["to"].clone()).unwrap();
    assert_eq!(from, signer_address());
    assert_eq!(to, MARKET);

    let methods = node.methods();
    let simulated = position(&methods, "eth_call");
    let sent = position(&methods, "eth_sendRawTransaction");
    let confirmed = position(&methods, "eth_getTransactionReceipt");
    assert!(simulated < sent, "{methods:?}");
    assert!(sent < confirmed, "{methods:?}");

    let tx = node.sent_transaction();
    let expected = Marketplace::createTradeOfferCall {
        offeredTokenId: U256::from(1u64),
        to: TARGET.parse().unwrap(),
        requestedTokenId: U256::from(2u64),
    };
    assert_eq!(tx.to(), Some(MARKET));
    assert_eq!(tx.input().as_ref(), expected.abi_encode().as_slice());
    assert_eq!(tx.recover_signer().unwrap(), signer_address());
}

#[tokio::test]
async fn test_reverting_preview_still_sends_offer() {
    let node = FakeNode::start(CallBehavior::Reverts).await;
    let client = node.client().await;

    let confirmation = client.create_trade_offer("1", TARGET, "2").await.unwrap();

    assert_eq!(confirmation.trade_id, None);
    assert_eq!(confirmation.tx_hash, TX_HASH);
    let methods = node.methods();
    assert!(position(&methods, "eth_call") < position(&methods, "eth_sendRawTransaction"));
}

#[tokio::test]
async fn test_accept_sends_exact_trade_id() {
    let node = FakeNode::start(CallBehavior::Returns(0)).await;
    let client = node.client().await;

    let confirmation = client.accept_trade("3").await.unwrap();

    assert_eq!(confirmation.trade_id, Some(U256::from(3u64)));
    assert_eq!(confirmation.tx_hash, TX_HASH);

    let tx = node.sent_transaction();
    let expected = Marketplace::acceptTradeCall {
        tradeId: U256::from(3u64),
    };
    assert_eq!(tx.to(), Some(MARKET));
    assert_eq!(tx.input().as_ref(), expected.abi_encode().as_slice());

    let methods = node.methods();
    assert!(!methods.iter().any(|m| m == "eth_call"));
    let sent = position(&methods, "eth_sendRawTransaction");
    assert!(sent < position(&methods, "eth_getTransactionReceipt"));
}

#[tokio::test]
async fn test_malformed_input_sends_nothing() {
    let node = FakeNode::start(CallBehavior::Returns(0)).await;
    let client = node.client().await;

    let err = client.create_trade_offer("abc", TARGET, "2").await.unwrap_err();
    assert!(err.to_string().contains("fromTokenId"));

    let err = client.accept_trade("0xzz").await.unwrap_err();
    assert!(err.to_string().contains("tradeId"));

    assert!(node.methods().iter().all(|m| m == "eth_chainId"));
}
