//! Keyed TTL cache in front of any [`DataSource`].

use std::{
  collections::HashMap,
  sync::{Mutex, MutexGuard},
  time::{Duration, Instant},
};

use bytes::Bytes;
use demand_core::{
  Result,
  source::{DataSource, SourceDescriptor},
};

/// Remembers successful fetches for `ttl`, keyed by descriptor.
///
/// Failures are never cached, and inline sources bypass the cache entirely.
/// A zero `ttl` turns the wrapper into a pass-through.
pub struct CachedSource<S> {
  inner:   S,
  ttl:     Duration,
  entries: Mutex<Entries>,
}

type Entries = HashMap<SourceDescriptor, (Bytes, Instant)>;

impl<S: DataSource> CachedSource<S> {
  pub fn new(inner: S, ttl: Duration) -> Self {
    Self {
      inner,
      ttl,
      entries: Mutex::new(HashMap::new()),
    }
  }

  pub fn inner(&self) -> &S { &self.inner }

  /// Drop the cached copy of one source, if any.
  pub fn invalidate(&self, descriptor: &SourceDescriptor) {
    self.lock().remove(descriptor);
  }

  pub fn clear(&self) { self.lock().clear(); }

  /// Number of live entries.
  pub fn len(&self) -> usize {
    let mut entries = self.lock();
    self.purge(&mut entries);
    entries.len()
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  fn lock(&self) -> MutexGuard<'_, Entries> {
    // A poisoned map only ever holds complete entries.
    self.entries.lock().unwrap_or_else(|e| e.into_inner())
  }

  fn purge(&self, entries: &mut Entries) {
    let ttl = self.ttl;
    entries.retain(|_, (_, stored)| stored.elapsed() < ttl);
  }

  fn lookup(&self, descriptor: &SourceDescriptor) -> Option<Bytes> {
    let mut entries = self.lock();
    self.purge(&mut entries);
    entries.get(descriptor).map(|(bytes, _)| bytes.clone())
  }
}

impl<S: DataSource> DataSource for CachedSource<S> {
  async fn fetch(&self, descriptor: &SourceDescriptor) -> Result<Bytes> {
    let cacheable = descriptor.is_remote() && !self.ttl.is_zero();
    if !cacheable {
      return self.inner.fetch(descriptor).await;
    }

    if let Some(bytes) = self.lookup(descriptor) {
      tracing::debug!(source = %descriptor, "cache hit");
      return Ok(bytes);
    }

    let bytes = self.inner.fetch(descriptor).await?;
    self
      .lock()
      .insert(descriptor.clone(), (bytes.clone(), Instant::now()));
    Ok(bytes)
  }
}
