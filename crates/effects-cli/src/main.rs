use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::time::{Duration, sleep};
use tracing::info;
use tracing_subscriber::EnvFilter;

use effects_core::{
    Action, ContinuationStep, DeclarativePromise, Effect, EffectAction, EffectError, EffectHandle, EffectsBuilder, EffectsConfig,
    Handler, InMemoryStore, Resolution, StoreApi, handler_fn,
};

#[derive(Debug, Serialize, Deserialize)]
struct Sleep {
    ms: u64,
}

impl Effect for Sleep {
    const TYPE: &'static str = "sleep";
}

struct SleepHandler;

#[async_trait]
impl Handler<Sleep> for SleepHandler {
    async fn handle(&self, _store: Arc<dyn StoreApi>, effect: Sleep) -> Result<Value, EffectError> {
        sleep(Duration::from_millis(effect.ms)).await;
        Ok(json!(effect.ms))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Greet {
    name: String,
}

impl Effect for Greet {
    const TYPE: &'static str = "greet";
}

struct GreetHandler;

#[async_trait]
impl Handler<Greet> for GreetHandler {
    async fn handle(&self, _store: Arc<dyn StoreApi>, effect: Greet) -> Result<Value, EffectError> {
        if effect.name.is_empty() {
            return Err(EffectError::rejected("nobody to greet"));
        }
        Ok(json!(format!("Hello, {}!", effect.name)))
    }
}

fn log(kind: &'static str) -> impl Fn(Value) -> Option<Action> + Send + Sync + 'static {
    move |value| Some(Action::plain(json!({ "type": kind, "value": value })))
}

fn log_error(kind: &'static str) -> impl Fn(EffectError) -> Option<Action> + Send + Sync + 'static {
    move |err| Some(Action::plain(json!({ "type": kind, "error": err.into_value() })))
}

fn effect_handle(store: &InMemoryStore, action: Action) -> Result<EffectHandle, Box<dyn std::error::Error>> {
    store
        .dispatch(action)?
        .into_effect()
        .ok_or_else(|| "dispatch did not start an effect".into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // (A) config: optional JSON file as the first argument
    let config = match std::env::args().nth(1) {
        Some(path) => EffectsConfig::from_path(&path)?,
        None => EffectsConfig::default(),
    };

    // (B) handlers: a closure handler for fan-out, typed handlers behind it
    let middleware = EffectsBuilder::new()
        .handler(handler_fn(|_store, payload, next| {
            if payload["type"] != "sleep.all" {
                return next(payload);
            }
            let delays: Vec<u64> = payload["ms"]
                .as_array()
                .map(|items| items.iter().filter_map(Value::as_u64).collect())
                .unwrap_or_default();
            Resolution::join(delays.into_iter().map(|ms| async move {
                sleep(Duration::from_millis(ms)).await;
                Ok(json!(ms))
            }))
        }))
        .register::<Sleep, _>(SleepHandler)?
        .register::<Greet, _>(GreetHandler)?
        .expect_effects(&[Sleep::TYPE, Greet::TYPE])
        .config(config)
        .build()?;

    let store = InMemoryStore::recording_with(vec![Arc::new(middleware.clone())]);

    // (C) dispatch a handful of effects
    let mut handles = Vec::new();

    // nested: a child step runs after its parent
    let nested = EffectAction::new(json!({ "type": "sleep", "ms": 20 })).step(
        ContinuationStep::new()
            .on_success(log("SLEPT"))
            .then(ContinuationStep::new().on_success(log("AFTER_SLEPT"))),
    );
    handles.push(effect_handle(&store, nested.into())?);

    // fan-out: three sleeps joined, siblings observe the same array
    let fan_out = EffectAction::new(json!({ "type": "sleep.all", "ms": [30, 10, 20] }))
        .step(ContinuationStep::new().on_success(log("ALL_SLEPT")))
        .step(ContinuationStep::new().on_success(|value| {
            let total: u64 = value
                .as_array()
                .map(|items| items.iter().filter_map(Value::as_u64).sum())
                .unwrap_or(0);
            Some(Action::plain(json!({ "type": "TOTAL", "value": total })))
        }));
    handles.push(effect_handle(&store, fan_out.into())?);

    // failing: rejection routed to on_failure
    let failing = EffectAction::new(json!({ "type": "greet", "name": "" })).step(
        ContinuationStep::new()
            .on_success(log("GREETED"))
            .on_failure(log_error("GREET_FAILED")),
    );
    handles.push(effect_handle(&store, failing.into())?);

    // legacy shape: a root declarative promise with a linear chain
    let legacy = DeclarativePromise::new(json!({
        "type": "EFFECT",
        "payload": { "type": "greet", "name": "Ada" }
    }))
    .then(ContinuationStep::new().on_success(log("GREETED")))
    .then(ContinuationStep::new().on_success(log("LEGACY_DONE")));
    handles.push(effect_handle(&store, legacy.into())?);

    // unhandled: nobody claims it, continuations see null
    let unhandled = EffectAction::new(json!({ "type": "nobody.home" }))
        .step(ContinuationStep::new().on_success(log("UNHANDLED_SETTLED")));
    handles.push(effect_handle(&store, unhandled.into())?);

    // plain actions pass straight through
    store.dispatch(Action::plain(json!({ "type": "PLAIN" })))?;

    // (D) wait for every root, then report
    for handle in handles {
        handle.settled().await?;
    }

    info!(counts = ?middleware.counts(), "all effects settled");
    println!("state  = {}", serde_json::to_string_pretty(&store.get_state())?);
    println!("counts = {}", serde_json::to_string(&middleware.counts())?);

    Ok(())
}
