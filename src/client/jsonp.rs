use super::{Transport, TransportError};
use crate::models::SensorReading;
use async_trait::async_trait;
use log::debug;
use rand::Rng;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

/// One-shot named slots standing in for the global callback namespace a
/// browser JSONP client would pollute. Each in-flight request owns exactly
/// one slot; the slot is removed when the callback fires or the request
/// settles with an error.
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    slots: Arc<Mutex<HashMap<String, oneshot::Sender<Value>>>>,
}

impl CallbackRegistry {
    /// Register a fresh slot under a unique `jsonp_callback_<n>` name,
    /// n in [0, 100000). Redraws on collision with an in-flight slot.
    pub fn register(&self) -> (String, oneshot::Receiver<Value>) {
        let mut slots = self.slots.lock().unwrap();
        loop {
            let name = format!("jsonp_callback_{}", rand::thread_rng().gen_range(0..100_000));
            if slots.contains_key(&name) {
                continue;
            }
            let (tx, rx) = oneshot::channel();
            slots.insert(name.clone(), tx);
            return (name, rx);
        }
    }

    /// Deliver a payload to the named slot, consuming it. Returns false if
    /// no such slot exists (already settled or never registered).
    pub fn invoke(&self, name: &str, payload: Value) -> bool {
        match self.slots.lock().unwrap().remove(name) {
            Some(tx) => tx.send(payload).is_ok(),
            None => false,
        }
    }

    pub fn remove(&self, name: &str) {
        self.slots.lock().unwrap().remove(name);
    }

    pub fn pending(&self) -> usize {
        self.slots.lock().unwrap().len()
    }
}

// Removes the slot when the request settles, on every path. Removing an
// already-consumed slot is a no-op.
struct SlotGuard<'a> {
    registry: &'a CallbackRegistry,
    name: &'a str,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.registry.remove(self.name);
    }
}

/// Append the callback parameter the way a script loader would.
fn callback_url(url: &str, name: &str) -> String {
    let join = if url.contains('?') { '&' } else { '?' };
    format!("{url}{join}callback={name}")
}

/// Extract the JSON argument from a `name({...});` script body.
fn extract_padding<'a>(body: &'a str, name: &str) -> Option<&'a str> {
    let rest = body.trim().strip_prefix(name)?.trim_start();
    let rest = rest.strip_prefix('(')?;
    let end = rest.rfind(')')?;
    Some(&rest[..end])
}

/// Fallback transport: JSONP-style script loading for endpoints that refuse
/// direct cross-origin requests. The loader fetches the padded script text
/// and dispatches its argument through the callback registry.
pub struct JsonpTransport {
    client: reqwest::Client,
    registry: CallbackRegistry,
}

impl JsonpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            registry: CallbackRegistry::default(),
        })
    }

    #[cfg(test)]
    fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    async fn load(&self, url: &str, name: &str) -> Result<(), TransportError> {
        let src = callback_url(url, name);
        debug!("GET {}", src);
        let response = self.client.get(&src).send().await?.error_for_status()?;
        let body = response.text().await?;
        let json = extract_padding(&body, name)
            .ok_or_else(|| TransportError::BadPadding(name.to_string()))?;
        let value: Value = serde_json::from_str(json)
            .map_err(|_| TransportError::BadPadding(name.to_string()))?;
        self.registry.invoke(name, value);
        Ok(())
    }
}

#[async_trait]
impl Transport for JsonpTransport {
    async fn fetch(&self, url: &str) -> Result<SensorReading, TransportError> {
        let (name, rx) = self.registry.register();
        let _guard = SlotGuard {
            registry: &self.registry,
            name: &name,
        };
        self.load(url, &name).await?;
        let value = rx.await.map_err(|_| TransportError::CallbackDropped)?;
        Ok(SensorReading::from_value(value))
    }
}
