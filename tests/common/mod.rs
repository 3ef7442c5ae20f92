//! Shared utilities for integration tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use listing_import::import::{Listing, ListingSink};
use listing_import::ServiceError;

/// A unit of work that fails `failures` times before succeeding, counting calls.
#[allow(dead_code)]
pub fn flaky(
    failures: u32,
    calls: Arc<AtomicU32>,
) -> impl FnMut() -> BoxFuture<'static, Result<u32, String>> + Send {
    move || {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            if n <= failures {
                Err(format!("transient failure {}", n))
            } else {
                Ok(n)
            }
        }
        .boxed()
    }
}

/// In-memory sink that throttles configured MLS numbers a number of times.
#[derive(Default)]
pub struct ScriptedSink {
    throttle: Mutex<HashMap<String, u32>>,
    always_fail: HashSet<String>,
    pub saved: Mutex<Vec<String>>,
    pub calls: AtomicU32,
}

#[allow(dead_code)]
impl ScriptedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn throttle(self, mls: &str, times: u32) -> Self {
        self.throttle.lock().unwrap().insert(mls.to_string(), times);
        self
    }

    pub fn always_fail(mut self, mls: &str) -> Self {
        self.always_fail.insert(mls.to_string());
        self
    }
}

impl ListingSink for ScriptedSink {
    fn save<'a>(&'a self, listing: &'a Listing) -> BoxFuture<'a, Result<(), ServiceError>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.always_fail.contains(&listing.mls_number) {
                return Err(ServiceError::Unavailable);
            }
            {
                let mut throttle = self.throttle.lock().unwrap();
                if let Some(remaining) = throttle.get_mut(&listing.mls_number) {
                    if *remaining > 0 {
                        *remaining -= 1;
                        return Err(ServiceError::Throttled);
                    }
                }
            }
            self.saved.lock().unwrap().push(listing.mls_number.clone());
            Ok(())
        }
        .boxed()
    }
}
