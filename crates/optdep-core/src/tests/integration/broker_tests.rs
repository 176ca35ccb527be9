#![cfg(test)]

use std::sync::{Arc, Mutex};

use crate::api::{ApiAccess, ApiRegistry, CallbackFailure, NotifyPhase, Provider};
use super::common::{LOREM_API, Lorem, LoremImpl};

fn lorem(prefix: &str) -> Provider {
    let api = Arc::new(LoremImpl { prefix: prefix.to_string() });
    Provider::builder(Arc::clone(&api))
        .method("Words", |api: &LoremImpl, (count,): (usize,)| api.words(count))
        .interface::<dyn Lorem>(api)
        .build()
}

fn prefix_recorder(log: &Arc<Mutex<Vec<String>>>) -> impl Fn(ApiAccess) -> crate::api::CallbackResult + Send + Sync + 'static {
    let log = Arc::clone(log);
    move |api: ApiAccess| {
        let lorem = api.get_api::<dyn Lorem>().ok_or("not a lorem provider")?;
        log.lock().unwrap().push(lorem.words(1));
        Ok(())
    }
}

#[test]
fn test_register_subscribe_interleaving() {
    let registry = ApiRegistry::new();
    registry.register(LOREM_API, lorem("A")).unwrap();

    let first = Arc::new(Mutex::new(Vec::new()));
    registry.subscribe(LOREM_API, prefix_recorder(&first)).unwrap();
    assert_eq!(*first.lock().unwrap(), vec!["A"]);

    let second = Arc::new(Mutex::new(Vec::new()));
    registry.subscribe(LOREM_API, prefix_recorder(&second)).unwrap();
    assert_eq!(*second.lock().unwrap(), vec!["A"]);

    registry.register(LOREM_API, lorem("B")).unwrap();

    assert_eq!(*first.lock().unwrap(), vec!["A", "B"]);
    assert_eq!(*second.lock().unwrap(), vec!["A", "B"]);
}

#[test]
fn test_typed_and_name_based_paths_agree() {
    let registry = ApiRegistry::new();
    registry.register(LOREM_API, lorem("Lorem")).unwrap();

    let by_interface = registry.get_api::<dyn Lorem>(LOREM_API).unwrap().words(3);
    let access = &registry.providers(LOREM_API)[0];
    let by_binding = access.get_method::<(usize,), String>("Words").unwrap().call((3,));

    assert_eq!(by_interface, "Lorem ipsum ipsum");
    assert_eq!(by_binding, by_interface);
    assert!(registry.try_invoke(LOREM_API, "Words", &[&3usize]));
    assert!(!registry.try_invoke(LOREM_API, "Words", &[&3u32]));
}

#[test]
fn test_replay_failures_reach_reporter_but_registration_continues() {
    let failures = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&failures);
    let registry = ApiRegistry::with_reporter(move |failure: &CallbackFailure| {
        sink.lock().unwrap().push((failure.phase, failure.api_name.clone()));
    });

    registry.register(LOREM_API, Provider::new(5u8)).unwrap();
    let heard = Arc::new(Mutex::new(Vec::new()));
    registry.subscribe(LOREM_API, prefix_recorder(&heard)).unwrap();
    registry.register(LOREM_API, lorem("C")).unwrap();

    assert_eq!(*heard.lock().unwrap(), vec!["C"]);
    assert_eq!(
        *failures.lock().unwrap(),
        vec![(NotifyPhase::Replay, LOREM_API.to_string())]
    );
}
