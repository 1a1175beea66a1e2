//! Name resolution tests.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use horizon_reach_net::dns::{AddressResolver, IpStrategy, NameLookup, ResolverConfig, ResolverRequest};
use horizon_reach_net::ResolveError;

/// A primitive that sleeps, counts its invocations and returns a fixed answer.
struct StubLookup {
    delay: Duration,
    answer: Result<Vec<IpAddr>, ResolveError>,
    calls: Arc<AtomicUsize>,
}

impl StubLookup {
    fn new(delay: Duration, answer: Result<Vec<IpAddr>, ResolveError>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                delay,
                answer,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl NameLookup for StubLookup {
    fn lookup(&self, _host_name: &str, _timeout: Duration) -> Result<Vec<IpAddr>, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        self.answer.clone()
    }
}

fn addr(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(a, b, c, d))
}

#[test]
fn test_empty_host_never_reaches_primitive() {
    let (stub, calls) = StubLookup::new(Duration::ZERO, Ok(vec![addr(192, 0, 2, 1)]));
    let resolver = AddressResolver::with_lookup(ResolverConfig::default(), stub);

    let result = resolver.resolve_sync("", Duration::from_secs(1));
    assert!(matches!(result, Err(ResolveError::InvalidArgument(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_hard_timeout() {
    let (stub, _calls) = StubLookup::new(Duration::from_millis(10), Ok(vec![addr(192, 0, 2, 1)]));
    let resolver = AddressResolver::with_lookup(ResolverConfig::default(), stub);
    // Keep runtime start-up out of the measurement.
    horizon_reach_core::runtime::get().unwrap();

    let started = Instant::now();
    let result = resolver.resolve_sync("example.test", Duration::from_millis(1));
    let elapsed = started.elapsed();

    assert_eq!(result, Err(ResolveError::Timeout(Duration::from_millis(1))));
    assert!(elapsed < Duration::from_millis(50), "took {elapsed:?}");
}

#[test]
fn test_primitive_that_never_returns_is_bounded() {
    let (stub, _calls) = StubLookup::new(Duration::from_secs(30), Ok(Vec::new()));
    let resolver = AddressResolver::with_lookup(ResolverConfig::default(), stub);

    let started = Instant::now();
    let result = resolver.resolve_sync("slow.example.test", Duration::from_millis(100));
    assert!(matches!(result, Err(ResolveError::Timeout(_))));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_empty_answer_is_success() {
    let (stub, _calls) = StubLookup::new(Duration::ZERO, Ok(Vec::new()));
    let resolver = AddressResolver::with_lookup(ResolverConfig::default(), stub);

    assert_eq!(resolver.resolve_sync("empty.example.test", Duration::from_secs(1)), Ok(Vec::new()));
}

#[test]
fn test_errors_pass_through() {
    let (stub, _calls) = StubLookup::new(
        Duration::ZERO,
        Err(ResolveError::NotFound("nope.example.test".to_string())),
    );
    let resolver = AddressResolver::with_lookup(ResolverConfig::default(), stub);
    assert!(matches!(
        resolver.resolve_sync("nope.example.test", Duration::from_secs(1)),
        Err(ResolveError::NotFound(_))
    ));
}

#[test]
fn test_ip_strategy_applies_to_answer() {
    let v6: IpAddr = "2001:db8::1".parse().unwrap();
    let (stub, _calls) = StubLookup::new(Duration::ZERO, Ok(vec![v6, addr(192, 0, 2, 1)]));
    let config = ResolverConfig::default().ip_strategy(IpStrategy::Ipv4ThenIpv6);
    let resolver = AddressResolver::with_lookup(config, stub);

    let addresses = resolver.resolve_sync("dual.example.test", Duration::from_secs(1)).unwrap();
    assert_eq!(addresses, vec![addr(192, 0, 2, 1), v6]);
}

#[test]
fn test_async_completion_runs_once_off_thread() {
    let (stub, _calls) = StubLookup::new(Duration::from_millis(5), Ok(vec![addr(192, 0, 2, 7)]));
    let resolver = AddressResolver::with_lookup(ResolverConfig::default(), stub);

    let caller = thread::current().id();
    let (tx, rx) = crossbeam_channel::unbounded();
    resolver.resolve_async("async.example.test", move |result| {
        tx.send((thread::current().id(), result)).unwrap();
    });

    let (thread_id, result) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_ne!(thread_id, caller);
    assert_eq!(result, Ok(vec![addr(192, 0, 2, 7)]));
    // The sender moved into the completion, which has now run and been dropped.
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
}

#[test]
fn test_async_invalid_argument_is_still_off_thread() {
    let resolver = AddressResolver::system();
    let caller = thread::current().id();
    let (tx, rx) = crossbeam_channel::bounded(1);

    resolver.resolve_async("", move |result| {
        tx.send((thread::current().id(), result)).unwrap();
    });

    let (thread_id, result) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_ne!(thread_id, caller);
    assert!(matches!(result, Err(ResolveError::InvalidArgument(_))));
}

#[test]
fn test_async_burst_beyond_blocking_pool() {
    // More concurrent resolves than the runtime has blocking threads.
    const BURST: usize = 200;
    let (stub, calls) = StubLookup::new(Duration::ZERO, Ok(vec![addr(192, 0, 2, 11)]));
    let resolver = AddressResolver::with_lookup(
        ResolverConfig::default().timeout(Duration::from_millis(200)),
        stub,
    );
    let (tx, rx) = crossbeam_channel::unbounded();

    for _ in 0..BURST {
        let tx = tx.clone();
        resolver.resolve_async("instant.example.test", move |result| {
            tx.send(result).unwrap();
        });
    }
    drop(tx);

    let mut resolved = 0;
    let mut timeouts = 0;
    for _ in 0..BURST {
        match rx.recv_timeout(Duration::from_secs(10)).unwrap() {
            Ok(addresses) => {
                assert_eq!(addresses, vec![addr(192, 0, 2, 11)]);
                resolved += 1;
            }
            Err(ResolveError::Timeout(_)) => timeouts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(timeouts, 0);
    assert_eq!(resolved, BURST);
    assert_eq!(calls.load(Ordering::SeqCst), BURST);
}

#[test]
fn test_request_resolves_once() {
    let (stub, calls) = StubLookup::new(Duration::ZERO, Ok(vec![addr(192, 0, 2, 9)]));
    let resolver = AddressResolver::with_lookup(ResolverConfig::default(), stub);

    let request = ResolverRequest::new("once.example.test").unwrap();
    assert!(request.addresses().is_none());
    assert_eq!(request.resolve(&resolver).unwrap(), &[addr(192, 0, 2, 9)]);
    assert_eq!(request.resolve(&resolver).unwrap(), &[addr(192, 0, 2, 9)]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(request.is_complete());
}

#[test]
fn test_resolve_localhost() {
    let resolver = AddressResolver::system();

    // localhost should always resolve
    let addresses = resolver
        .resolve_sync("localhost", Duration::from_secs(5))
        .expect("localhost should resolve");
    assert!(!addresses.is_empty());
    assert!(addresses.iter().any(|addr| addr.is_loopback()));
}

#[tokio::test]
async fn test_async_resolve_with_stub() {
    let (stub, _calls) = StubLookup::new(Duration::ZERO, Ok(vec![addr(198, 51, 100, 1)]));
    let resolver = AddressResolver::with_lookup(ResolverConfig::default(), stub);

    let addresses = resolver.resolve("tokio.example.test").await.unwrap();
    assert_eq!(addresses, vec![addr(198, 51, 100, 1)]);
}

#[tokio::test]
async fn test_async_resolve_times_out() {
    let (stub, _calls) = StubLookup::new(Duration::from_millis(500), Ok(Vec::new()));
    let config = ResolverConfig::default().timeout(Duration::from_millis(20));
    let resolver = AddressResolver::with_lookup(config, stub);

    let result = resolver.resolve("slow.example.test").await;
    assert_eq!(result, Err(ResolveError::Timeout(Duration::from_millis(20))));
}
