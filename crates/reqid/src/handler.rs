//! Per-request identifier injection.

use std::sync::Arc;

use crate::config::IdConfig;
use crate::generate::generate;
use crate::reload::ConfigHandle;
use crate::store::{derived_key, VariableStore, PRIMARY_KEY};

/// Generates fresh identifiers for every request and writes them into the
/// request's variable store. Holds no per-request state; cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct RequestIdInjector {
    config: ConfigHandle,
}

impl RequestIdInjector {
    pub fn new(config: IdConfig) -> Self {
        Self::with_handle(ConfigHandle::new(config))
    }

    pub fn with_handle(config: ConfigHandle) -> Self {
        Self { config }
    }

    /// Handle for reloading the configuration used by later requests.
    pub fn config_handle(&self) -> &ConfigHandle {
        &self.config
    }

    /// Write one identifier per namespace into `store`.
    ///
    /// Returns the configuration snapshot the identifiers were generated from.
    pub fn inject<S>(&self, store: &mut S) -> Arc<IdConfig>
    where
        S: VariableStore + ?Sized,
    {
        let config = self.config.snapshot();

        store.set(PRIMARY_KEY, generate(config.length()));
        for (name, length) in config.additional() {
            store.set(&derived_key(name), generate(length));
        }

        config
    }

    /// Inject identifiers, then run `next` exactly once and return its
    /// result unchanged.
    pub fn handle<S, F, R>(&self, store: &mut S, next: F) -> R
    where
        S: VariableStore + ?Sized,
        F: FnOnce(&mut S) -> R,
    {
        self.inject(store);
        next(store)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::{materialize, RawIdConfig};
    use crate::generate::ALPHABET;

    fn injector(raw: RawIdConfig) -> RequestIdInjector {
        RequestIdInjector::new(materialize(&raw).unwrap())
    }

    fn over_alphabet(id: &str) -> bool {
        id.bytes().all(|b| ALPHABET.contains(&b))
    }

    /// Store that records every write, including repeats.
    #[derive(Default)]
    struct RecordingStore {
        writes: Vec<(String, String)>,
    }

    impl VariableStore for RecordingStore {
        fn set(&mut self, key: &str, value: String) {
            self.writes.push((key.to_string(), value));
        }
    }

    #[test]
    fn test_default_config_writes_primary_only() {
        let mut store = RecordingStore::default();
        RequestIdInjector::default().inject(&mut store);

        assert_eq!(store.writes.len(), 1);
        let (key, id) = &store.writes[0];
        assert_eq!(key, PRIMARY_KEY);
        assert_eq!(id.len(), 21);
        assert!(over_alphabet(id));
    }

    #[test]
    fn test_primary_and_additional_written_once_each() {
        let injector = injector(RawIdConfig::new().with_length(10).with_additional("trace", 5));
        let mut store = RecordingStore::default();
        let mut calls = 0;

        let out = injector.handle(&mut store, |s| {
            calls += 1;
            s.writes.len()
        });

        assert_eq!(calls, 1);
        assert_eq!(out, 2);

        let writes: HashMap<_, _> = store.writes.into_iter().collect();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes["request_id"].len(), 10);
        assert_eq!(writes["request_id.trace"].len(), 5);
        assert!(writes.values().all(|id| over_alphabet(id)));
    }

    #[test]
    fn test_next_error_passes_through() {
        let injector = RequestIdInjector::default();
        let mut store: HashMap<String, String> = HashMap::new();

        let result: Result<(), &str> = injector.handle(&mut store, |_| Err("downstream failed"));

        assert_eq!(result, Err("downstream failed"));
        assert!(store.contains_key(PRIMARY_KEY));
    }

    #[test]
    fn test_each_request_gets_fresh_ids() {
        let injector = injector(RawIdConfig::new().with_additional("trace", 21));
        let mut first: HashMap<String, String> = HashMap::new();
        let mut second: HashMap<String, String> = HashMap::new();

        injector.inject(&mut first);
        injector.inject(&mut second);

        assert_ne!(first["request_id"], second["request_id"]);
        assert_ne!(first["request_id.trace"], second["request_id.trace"]);
        // Namespaces are generated independently.
        assert_ne!(first["request_id"], first["request_id.trace"]);
    }

    #[test]
    fn test_reload_applies_to_next_request() {
        let injector = RequestIdInjector::default();
        let handle = injector.config_handle().clone();

        let mut before: HashMap<String, String> = HashMap::new();
        let used = injector.inject(&mut before);

        handle
            .reload(&RawIdConfig::new().with_length(6).with_additional("span", 3))
            .unwrap();

        let mut after: HashMap<String, String> = HashMap::new();
        injector.inject(&mut after);

        assert_eq!(used.length().get(), 21);
        assert_eq!(before.len(), 1);
        assert_eq!(after["request_id"].len(), 6);
        assert_eq!(after["request_id.span"].len(), 3);
    }
}
