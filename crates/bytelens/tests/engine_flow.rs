//! End-to-end engine behaviour against a scripted RPC transport.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytelens::codec::base58;
use bytelens::config::Endpoint;
use bytelens::rpc::{RpcRequest, RpcResponse};
use bytelens::{
    AccountInfo, ByteRange, ByteState, Engine, EngineConfig, Error, InterpretationKind,
    ManualClock, PatternDatabase, RpcError, RpcTransport, SuggestionKind,
};
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;

#[derive(Default)]
struct ScriptedTransport {
    accounts: HashMap<String, AccountInfo>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn with_account(mut self, address: &str, lamports: u64, data: Vec<u8>) -> Self {
        self.accounts.insert(
            address.to_string(),
            AccountInfo {
                owner: "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA".to_string(),
                lamports,
                executable: false,
                rent_epoch: 0,
                data,
            },
        );
        self
    }

    fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn respond(&self, request: &RpcRequest) -> RpcResponse {
        let address = request.address().unwrap_or_default().to_string();
        self.requests.lock().push(address.clone());
        match self.accounts.get(&address) {
            Some(info) => RpcResponse::found(request.id, info),
            None => RpcResponse::missing(request.id),
        }
    }
}

#[async_trait]
impl RpcTransport for ScriptedTransport {
    async fn send(&self, _: &Endpoint, request: &RpcRequest) -> Result<RpcResponse, RpcError> {
        Ok(self.respond(request))
    }

    async fn send_batch(
        &self,
        _: &Endpoint,
        requests: &[RpcRequest],
    ) -> Result<Vec<RpcResponse>, RpcError> {
        Ok(requests.iter().map(|r| self.respond(r)).collect())
    }
}

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
    ))
}

fn config(batching: bool) -> EngineConfig {
    EngineConfig::builder()
        .endpoint(Endpoint::new("https://rpc.test"))
        .batching(batching)
        .batch_delay(Duration::ZERO)
        .sequential_delay(Duration::ZERO)
        .build()
}

fn engine(transport: Arc<ScriptedTransport>, clock: Arc<ManualClock>) -> Engine {
    Engine::new(config(false), PatternDatabase::new(), transport, clock)
}

fn key_bytes(seed: u8) -> Vec<u8> {
    (0..32u8).map(|i| (seed ^ i.wrapping_mul(29)) | 0x80).collect()
}

fn assert_conserved(engine: &Engine) {
    let state = engine.state();
    let covered: usize = engine.annotations().iter().map(|a| a.range.len()).sum();
    assert_eq!(
        covered + state.count(ByteState::Free) + state.count(ByteState::Staged),
        engine.bytes().len()
    );
}

#[tokio::test]
async fn u64_one_reported_at_point_eight() {
    let mut engine = engine(Arc::new(ScriptedTransport::default()), clock());
    engine.load_hex("0100000000000000").unwrap();
    engine.run_detectors().unwrap();

    let suggestions = engine.all_suggestions();
    let wide = suggestions
        .iter()
        .find(|s| s.range == ByteRange::new(0, 8))
        .unwrap();
    assert_eq!(wide.kind, SuggestionKind::U64);
    assert_eq!(wide.value, "1");
    assert_eq!(wide.confidence, 0.8);
}

#[tokio::test]
async fn thousand_is_round_not_timestamp() {
    let mut engine = engine(Arc::new(ScriptedTransport::default()), clock());
    engine.load_hex("E8 03 00 00").unwrap();
    engine.run_detectors().unwrap();

    let suggestions = engine.all_suggestions();
    assert!(suggestions
        .iter()
        .any(|s| s.kind == SuggestionKind::U32 && s.value == "1000" && s.confidence >= 0.8));
    assert!(suggestions.iter().all(|s| s.kind != SuggestionKind::Timestamp));
}

#[tokio::test]
async fn all_zero_window_makes_no_candidate() {
    let transport = Arc::new(ScriptedTransport::default());
    let mut engine = engine(transport.clone(), clock());
    engine.load_bytes(vec![0u8; 32], false);

    let job = engine.run_detectors().unwrap();
    assert!(job.candidates().is_empty());
    let report = job.run().await;
    assert_eq!(report.processed(), 0);
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn accepted_range_is_never_reoffered() {
    let mut engine = engine(Arc::new(ScriptedTransport::default()), clock());
    engine.load_hex("AABBCCDD E8030000 E8030000 00000000").unwrap();
    engine.run_detectors().unwrap();

    let key = (ByteRange::new(4, 8), SuggestionKind::U32);
    engine.accept_suggestion(&key, None).unwrap();
    for i in 4..8 {
        assert_eq!(engine.state().get(i), ByteState::Decoded);
    }
    assert!(engine.ranked_suggestions().iter().all(|s| s.key() != key));

    engine.run_detectors().unwrap();
    let accepted = ByteRange::new(4, 8);
    assert!(engine
        .all_suggestions()
        .iter()
        .all(|s| !s.range.overlaps(&accepted)));
    // The untouched copy at [8, 12) is still offered
    assert!(engine
        .all_suggestions()
        .iter()
        .any(|s| s.range == ByteRange::new(8, 12)));
    assert_conserved(&engine);
}

#[tokio::test]
async fn verified_keys_rank_and_rerun_is_idempotent() {
    let funded = key_bytes(3);
    let empty = key_bytes(90);
    let funded_address = base58::encode(&funded);

    let transport = Arc::new(ScriptedTransport::default().with_account(&funded_address, 5_000, vec![]));
    let mut engine = engine(transport.clone(), clock());
    let mut bytes = funded.clone();
    bytes.extend(&empty);
    engine.load_bytes(bytes, false);

    let report = engine.run_detectors().unwrap().run().await;
    assert_eq!(report.positive, 1);
    assert_eq!(report.negative, 1);

    let max = engine.max_confidence_suggestions();
    assert_eq!(max.len(), 1);
    assert_eq!(max[0].value, funded_address);
    assert_eq!(engine.ranked_suggestions()[0].kind, SuggestionKind::PublicKey);

    let count = engine.all_suggestions().len();
    let report = engine.run_detectors().unwrap().run().await;
    assert_eq!(report.cache_hits, 2);
    assert_eq!(engine.all_suggestions().len(), count);
    assert_eq!(transport.request_count(), 2);

    let annotation = engine.accept_suggestion(&max[0].key(), None).unwrap();
    assert_eq!(annotation.kind, "PublicKey");
    assert_eq!(annotation.name, "publickey_0000");
    assert_conserved(&engine);
}

#[tokio::test]
async fn batched_mode_uses_one_request_per_group() {
    let transport = Arc::new(ScriptedTransport::default());
    let mut engine = Engine::new(config(true), PatternDatabase::new(), transport.clone(), clock());
    let bytes: Vec<u8> = (0..6).flat_map(key_bytes).collect();
    engine.load_bytes(bytes, false);

    let report = engine.run_detectors().unwrap().run().await;
    assert_eq!(report.negative, 6);
    assert_eq!(transport.request_count(), 6);
    assert_eq!(engine.metrics().rpc_requests, 2);
}

#[tokio::test]
async fn negative_cache_respects_ttl() {
    let transport = Arc::new(ScriptedTransport::default());
    let clock = clock();
    let mut engine = engine(transport.clone(), clock.clone());
    engine.load_bytes(key_bytes(11), false);

    engine.run_detectors().unwrap().run().await;
    assert_eq!(transport.request_count(), 1);

    clock.advance(chrono::Duration::seconds(299));
    engine.run_detectors().unwrap().run().await;
    assert_eq!(transport.request_count(), 1);

    clock.advance(chrono::Duration::seconds(1));
    engine.run_detectors().unwrap().run().await;
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn reload_drops_in_flight_results() {
    let funded = key_bytes(40);
    let address = base58::encode(&funded);
    let transport = Arc::new(ScriptedTransport::default().with_account(&address, 1, vec![]));
    let mut engine = engine(transport, clock());
    engine.load_bytes(funded, false);

    let job = engine.run_detectors().unwrap();
    engine.load_hex("00").unwrap();
    let report = job.run().await;

    assert!(report.stale);
    assert!(engine.all_suggestions().is_empty());
}

#[tokio::test]
async fn late_key_result_skips_decoded_bytes() {
    let funded = key_bytes(21);
    let address = base58::encode(&funded);
    let transport = Arc::new(ScriptedTransport::default().with_account(&address, 9, vec![]));
    let mut engine = engine(transport, clock());
    engine.load_bytes(funded, false);

    let job = engine.run_detectors().unwrap();
    engine.select(ByteRange::new(0, 1)).unwrap();
    engine.interpret_selection().unwrap();
    engine
        .accept_interpretation(InterpretationKind::U8, None)
        .unwrap();

    let report = job.run().await;
    assert_eq!(report.positive, 1);
    assert!(!report.stale);
    assert!(engine.max_confidence_suggestions().is_empty());
    assert!(engine
        .all_suggestions()
        .iter()
        .all(|s| !s.range.overlaps(&ByteRange::new(0, 1))));

    // Releasing the byte lets a fresh pass offer the key again
    engine.remove_annotation(0).unwrap();
    engine.run_detectors().unwrap().run().await;
    assert_eq!(engine.max_confidence_suggestions().len(), 1);
}

#[tokio::test]
async fn selection_key_check_updates_reading() {
    let key = key_bytes(77);
    let address = base58::encode(&key);
    let transport = Arc::new(ScriptedTransport::default().with_account(&address, 12, vec![]));
    let mut engine = engine(transport, clock());
    let mut bytes = vec![0xFFu8; 4];
    bytes.extend(&key);
    engine.load_bytes(bytes, false);

    engine.select(ByteRange::new(4, 36)).unwrap();
    let selection = engine.interpret_selection().unwrap();
    let check = selection.check.unwrap();
    assert_eq!(check.address(), address);

    let text = check.run().await.unwrap();
    assert!(text.contains("12 lamports"));
    let reading = engine
        .selection_readings()
        .into_iter()
        .find(|r| r.kind == InterpretationKind::PublicKey)
        .unwrap();
    assert_eq!(reading.value, text);
    assert_eq!(reading.range, ByteRange::new(4, 36));

    engine
        .accept_interpretation(InterpretationKind::PublicKey, Some("authority"))
        .unwrap();
    assert_conserved(&engine);
}

#[tokio::test]
async fn load_account_enables_discriminator() {
    let address = base58::encode(&key_bytes(5));
    let mut data = vec![0xf8, 0xc6, 0x9e, 0x91, 0xe1, 0x75, 0x87, 0xc8];
    data.extend(b"hello world");
    let transport = Arc::new(ScriptedTransport::default().with_account(&address, 1, data.clone()));
    let mut engine = engine(transport, clock());

    let info = engine.load_account(&address).await.unwrap();
    assert_eq!(info.data, data);
    assert!(engine.is_account_data());

    engine.run_detectors().unwrap();
    let discriminator = engine
        .all_suggestions()
        .into_iter()
        .find(|s| s.kind == SuggestionKind::Discriminator)
        .unwrap();
    assert_eq!(discriminator.value, "f8c69e91e17587c8");
    assert_eq!(discriminator.confidence, 0.95);
}

#[tokio::test]
async fn invalid_inputs_leave_state_untouched() {
    let mut engine = engine(Arc::new(ScriptedTransport::default()), clock());
    engine.load_hex("0102").unwrap();

    assert!(matches!(engine.load_hex("012"), Err(Error::InvalidHex(_))));
    assert!(matches!(
        engine.load_account("0OIl").await,
        Err(Error::InvalidBase58(_))
    ));
    assert_eq!(engine.bytes(), &[1, 2]);
}

#[test]
fn base58_round_trip_with_leading_zeros() {
    for zeros in 0..4 {
        let mut bytes = vec![0u8; zeros];
        bytes.extend([0x3a, 0x00, 0xff]);
        let encoded = base58::encode(&bytes);
        assert_eq!(encoded.chars().take_while(|&c| c == '1').count(), zeros);
        assert_eq!(base58::decode(&encoded).unwrap(), bytes);
    }
}
