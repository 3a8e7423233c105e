//! scripthook-host
//!
//! Demo host that wires the crates together: spawns the script-thread
//! executor, installs an in-memory script bridge, registers a couple of
//! handlers and callbacks, and drives the hooks from simulated native
//! threads.

use std::sync::Arc;
use std::thread;

use tracing_subscriber::{EnvFilter, fmt};

use scripthook_bridge::MemoryBridge;
use scripthook_core::config::EngineConfig;
use scripthook_core::error::AppError;
use scripthook_core::traits::{NativeFn, ScriptBridge};
use scripthook_core::types::CallerId;
use scripthook_engine::EventsApi;
use scripthook_executor::ScriptExecutor;

fn main() {
    let env = std::env::var("SCRIPTHOOK_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match EngineConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config) {
        tracing::error!("Host error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &EngineConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

fn run(config: EngineConfig) -> Result<(), AppError> {
    tracing::info!("Starting scripthook v{}", env!("CARGO_PKG_VERSION"));

    let bridge = MemoryBridge::new();
    let executor = Arc::new(ScriptExecutor::spawn(&config.executor)?);
    let api = Arc::new(EventsApi::new(
        Arc::new(bridge.clone()),
        Arc::clone(&executor),
    ));

    register_demo_handlers(&bridge, &api)?;

    // Simulated native threads bracketing instrumented calls.
    let mut threads = Vec::new();
    for worker in 0..4u32 {
        let api = Arc::clone(&api);
        threads.push(thread::spawn(move || {
            let caller = CallerId::current();
            for i in 0..8 {
                let mut name = format!("attackStart{i}");
                api.send_animation_event_enter(caller, worker, &mut name);
                api.send_animation_event_leave(caller, i % 2 == 0);

                let mut name = format!("OnUpdate{i}");
                api.send_papyrus_event_enter(caller, worker, &mut name);
                api.send_papyrus_event_leave(caller, true);
            }
        }));
    }
    for t in threads {
        t.join()
            .map_err(|_| AppError::internal("Native thread panicked"))?;
    }

    // Producer-side event broadcast runs on the script thread.
    {
        let api = Arc::clone(&api);
        let bridge = bridge.clone();
        executor.push(move || {
            api.send_event("tick", &[bridge.number(1.0)]);
            api.send_event("update", &[]);
        })?;
    }

    executor.flush();
    for err in executor.drain_errors() {
        tracing::warn!(error = %err, "Deferred script error");
    }

    // The registry holds executor clones; release them before unwrapping.
    drop(api);
    let executor = Arc::try_unwrap(executor)
        .map_err(|_| AppError::internal("Executor still shared at shutdown"))?;
    executor.shutdown();

    tracing::info!("scripthook host shut down");
    Ok(())
}

fn register_demo_handlers(bridge: &MemoryBridge, api: &Arc<EventsApi>) -> Result<(), AppError> {
    let handler = bridge.object();
    let enter: NativeFn = {
        let bridge = bridge.clone();
        Arc::new(move |args| {
            let context = &args[1];
            let name = context.get("animEventName").expect_str("animEventName")?;
            tracing::info!(event = %name, "Animation event enter");
            context.get("storage").set("entered", bridge.bool(true));
            Ok(bridge.undefined())
        })
    };
    let leave: NativeFn = {
        let bridge = bridge.clone();
        Arc::new(move |args| {
            let succeeded = args[1].get("animationSucceeded").as_bool();
            tracing::info!(?succeeded, "Animation event leave");
            Ok(bridge.undefined())
        })
    };
    handler.set("enter", bridge.function(enter));
    handler.set("leave", bridge.function(leave));
    api.add_handler("sendAnimationEvent", &handler, None, None, Some("attack*"))?;

    let tick = {
        let inner = bridge.clone();
        bridge.function(Arc::new(move |args| {
            tracing::info!(count = ?args.get(1).and_then(|v| v.as_f64()), "Tick");
            Ok(inner.undefined())
        }))
    };
    api.on("tick", tick)?;

    Ok(())
}
