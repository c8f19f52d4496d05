//! The same sync through each dispatch gives the same outcome.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use repo_git::CommandSpec;
use repo_sync::{
    Delegate, Dispatch, DispatchMode, Host, SyncConfig, SyncEngine, SyncPath, SyncRequest,
    ThreadWorker,
};
use repo_test_utils::dest::Destination;
use repo_test_utils::git::{Upstream, head_commit};

fn config(dispatch: DispatchMode) -> SyncConfig {
    SyncConfig {
        dispatch,
        install: CommandSpec::new("git").arg("--version"),
        ..SyncConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_thread_worker_matches_inline() {
    let upstream = Upstream::new();
    let inline_dest = Destination::new();
    let thread_dest = Destination::new();

    let inline = SyncEngine::local(config(DispatchMode::Inline)).unwrap();
    let thread = SyncEngine::local(config(DispatchMode::Thread)).unwrap();
    assert!(inline.dispatch().is_inline());
    assert_eq!(thread.dispatch().to_string(), "thread");

    for _ in 0..2 {
        let a = inline
            .sync(SyncRequest::new(upstream.url(), inline_dest.path()))
            .await
            .unwrap();
        let b = thread
            .sync(SyncRequest::new(upstream.url(), thread_dest.path()))
            .await
            .unwrap();
        assert_eq!(a, b);
    }

    assert_eq!(head_commit(inline_dest.path()), head_commit(thread_dest.path()));
}

#[test]
fn test_auto_dispatch_on_bare_current_thread_runtime() {
    let upstream = Upstream::new();
    let dest = Destination::new();

    // No IO or time drivers: the sync has to run on the worker's runtime
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();

    let report = runtime.block_on(async {
        let engine = SyncEngine::local(config(DispatchMode::Auto)).unwrap();
        assert_eq!(engine.dispatch().to_string(), "thread");
        engine
            .sync(SyncRequest::new(upstream.url(), dest.path()))
            .await
            .unwrap()
    });

    assert_eq!(report.path, SyncPath::FreshClone);
    assert_eq!(head_commit(dest.path()), upstream.head());
}

#[test]
fn test_auto_dispatch_outside_runtime_delegates() {
    let engine = SyncEngine::local(config(DispatchMode::Auto)).unwrap();
    assert_eq!(engine.dispatch().to_string(), "thread");
}

#[tokio::test]
async fn test_delegate_used_directly() {
    let upstream = Upstream::new();
    let dest = Destination::new();
    let worker = ThreadWorker::new(Host::local(), Arc::new(config(DispatchMode::Thread)));

    let report = worker
        .delegate(SyncRequest::new(upstream.url(), dest.path()))
        .await
        .unwrap();
    assert_eq!(report.path, SyncPath::FreshClone);

    let engine = SyncEngine::local(config(DispatchMode::Inline))
        .unwrap()
        .with_dispatch(Dispatch::Delegated(Arc::new(worker)));
    let report = engine
        .sync(SyncRequest::new(upstream.url(), dest.path()))
        .await
        .unwrap();
    assert_eq!(report.path, SyncPath::Updated);
}
