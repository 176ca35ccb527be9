#![cfg(test)]

use std::sync::{Arc, Mutex};

use tempfile::tempdir;

use crate::kernel::bootstrap::Application;
use crate::plugin_system::Plugin;
use super::common::{LOREM_API, Lorem, LoremConsumer, LoremProvider};

fn boot(plugins: Vec<Arc<dyn Plugin>>) -> Application {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let mut app = Application::new(temp_dir.path()).expect("Application::new failed");
    for plugin in plugins {
        app.register_plugin(plugin).expect("plugin should register");
    }
    app.run().expect("startup should succeed");
    app
}

#[test]
fn test_consumer_registered_before_providers_hears_all_of_them() {
    let heard = Arc::new(Mutex::new(Vec::new()));
    let app = boot(vec![
        Arc::new(LoremConsumer { heard: Arc::clone(&heard) }) as Arc<dyn Plugin>,
        Arc::new(LoremProvider { name: "one", prefix: "One" }) as Arc<dyn Plugin>,
        Arc::new(LoremProvider { name: "two", prefix: "Two" }) as Arc<dyn Plugin>,
    ]);

    assert_eq!(*heard.lock().unwrap(), vec!["One ipsum ipsum", "Two ipsum ipsum"]);
    assert_eq!(app.registry().get_all_apis::<dyn Lorem>(LOREM_API).len(), 2);
}

#[test]
fn test_consumer_registered_after_providers_hears_all_of_them() {
    let heard = Arc::new(Mutex::new(Vec::new()));
    boot(vec![
        Arc::new(LoremProvider { name: "one", prefix: "One" }) as Arc<dyn Plugin>,
        Arc::new(LoremConsumer { heard: Arc::clone(&heard) }) as Arc<dyn Plugin>,
    ]);

    assert_eq!(*heard.lock().unwrap(), vec!["One ipsum ipsum"]);
}

#[test]
fn test_consumer_without_provider_stays_idle() {
    let heard = Arc::new(Mutex::new(Vec::new()));
    let app = boot(vec![Arc::new(LoremConsumer { heard: Arc::clone(&heard) }) as Arc<dyn Plugin>]);

    assert!(heard.lock().unwrap().is_empty());
    assert_eq!(app.registry().subscriber_count(LOREM_API), 1);
    assert!(app.registry().get_api::<dyn Lorem>(LOREM_API).is_none());
    assert!(app.startup_report().unwrap().is_clean());
}
