use std::sync::Arc;

use crate::api::{ApiAccess, BoxError, InvokeError, Provider};
use super::{Greeter, RecordingApi, recording_provider};

fn access_for(api: &Arc<RecordingApi>) -> ApiAccess {
    ApiAccess::new("IpsumClass", Arc::new(recording_provider(api).build()))
}

#[test]
fn test_try_invoke_existing_method() {
    let api = RecordingApi::new("A");
    let access = access_for(&api);

    assert!(access.try_invoke("Existing", &[&1u32, &"one".to_string()]));
    assert!(access.try_invoke("Existing", &[&2u32, &"two".to_string()]));
    assert_eq!(api.calls(), vec!["Existing(1, one)", "Existing(2, two)"]);
}

#[test]
fn test_invoke_reports_why_a_call_failed() {
    let api = RecordingApi::new("A");
    let access = access_for(&api);

    match access.invoke("Missing", &[]) {
        Err(InvokeError::MissingMethod { method }) => assert_eq!(method, "Missing"),
        other => panic!("expected MissingMethod, got {:?}", other),
    }
    match access.invoke("Existing", &[&1u32]) {
        Err(InvokeError::ArgumentCount { expected, found, .. }) => {
            assert_eq!(expected, 2);
            assert_eq!(found, 1);
        }
        other => panic!("expected ArgumentCount, got {:?}", other),
    }
    match access.invoke("Existing", &[&1u64, &"x".to_string()]) {
        Err(InvokeError::ArgumentType { index, expected, .. }) => {
            assert_eq!(index, 0);
            assert_eq!(expected, "u32");
        }
        other => panic!("expected ArgumentType, got {:?}", other),
    }
    match access.invoke("Fail", &[]) {
        Err(err @ InvokeError::Failed { .. }) => {
            assert_eq!(err.method(), "Fail");
            assert!(err.to_string().contains("A refuses"));
        }
        other => panic!("expected Failed, got {:?}", other),
    }
    assert!(matches!(access.invoke("Boom", &[]), Err(InvokeError::Panicked { .. })));

    // Nothing ran for the mismatched calls
    assert_eq!(api.calls(), vec!["Fail()"]);
}

#[test]
fn test_try_invoke_never_propagates_failures() {
    let access = access_for(&RecordingApi::new("A"));

    assert!(!access.try_invoke("Missing", &[]));
    assert!(!access.try_invoke("Fail", &[]));
    assert!(!access.try_invoke("Boom", &[]));
}

#[test]
fn test_get_method_binds_typed_callable() {
    let api = RecordingApi::new("A");
    let access = access_for(&api);

    let sum = access.get_method::<(i64, i64), i64>("Sum").expect("Sum should bind");
    assert_eq!(sum.name(), "Sum");
    assert_eq!(sum.call((2, 3)), 5);
    assert_eq!(sum.call((10, -4)), 6);

    let existing = access.get_method::<(u32, String), ()>("Existing").expect("Existing should bind");
    existing.call((9, "nine".to_string()));

    assert_eq!(api.calls(), vec!["Sum(2, 3)", "Sum(10, -4)", "Existing(9, nine)"]);
}

#[test]
fn test_get_method_rejects_incompatible_signature() {
    let access = access_for(&RecordingApi::new("A"));

    assert!(access.get_method::<(i64, i64), i64>("Missing").is_none());
    assert!(access.get_method::<(i32, i32), i64>("Sum").is_none());
    assert!(access.get_method::<(i64, i64), ()>("Sum").is_none());
    assert!(access.get_method::<(i64,), i64>("Sum").is_none());
}

#[test]
fn test_get_method_on_fallible_method() {
    let access = access_for(&RecordingApi::new("A"));

    let fail = access
        .get_method::<(), Result<(), BoxError>>("Fail")
        .expect("fallible methods bind with a BoxError result");
    let err = fail.call(()).unwrap_err();
    assert_eq!(err.to_string(), "A refuses");

    assert!(access.get_method::<(), ()>("Fail").is_none());
}

#[test]
fn test_bound_method_try_call_contains_panics() {
    let access = access_for(&RecordingApi::new("A"));
    let boom = access.get_method::<(), ()>("Boom").unwrap();

    match boom.try_call(()) {
        Err(InvokeError::Panicked { method, message }) => {
            assert_eq!(method, "Boom");
            assert_eq!(message, "provider blew up");
        }
        other => panic!("expected Panicked, got {:?}", other),
    }
}

#[test]
fn test_access_exposes_interfaces_and_metadata() {
    let api = RecordingApi::new("A");
    let access = access_for(&api);

    assert_eq!(access.api_name(), "IpsumClass");
    assert!(access.type_name().ends_with("RecordingApi"));
    assert!(access.has_method("Sum"));
    assert!(!access.has_method("sum"), "method lookup is case sensitive");
    assert_eq!(access.method_names(), vec!["Existing", "Sum", "Fail", "Boom"]);

    let greeter = access.get_api::<dyn Greeter>().unwrap();
    assert_eq!(greeter.greet("B"), "A greets B");
    assert!(Arc::ptr_eq(&access.get_api::<RecordingApi>().unwrap(), &api));
    assert!(access.get_api::<String>().is_none());

    let signatures = access.signatures();
    let (name, sum) = signatures[1];
    assert_eq!(name, "Sum");
    assert_eq!(sum.arity(), 2);
    assert_eq!(sum.to_string(), "(i64, i64) -> i64");
}

#[test]
fn test_provider_without_methods() {
    let access = ApiAccess::new("Plain", Arc::new(Provider::new(String::from("data")).build()));

    assert!(access.method_names().is_empty());
    assert!(!access.try_invoke("Anything", &[]));
    assert_eq!(*access.get_api::<String>().unwrap(), "data");
}
