//! In-memory registry of completed loads.

use std::{
  collections::{HashMap, VecDeque},
  sync::Arc,
};

use demand_core::Dataset;
use tokio::sync::RwLock;
use uuid::Uuid;

/// How many loads a registry keeps unless told otherwise.
pub const DEFAULT_CAPACITY: usize = 16;

/// Completed loads keyed by id. Datasets are immutable once registered, so
/// readers share them through an `Arc`.
///
/// At most `capacity` loads are kept; registering one more evicts the oldest.
pub struct LoadRegistry {
  capacity: usize,
  inner:    RwLock<Loads>,
}

#[derive(Default)]
struct Loads {
  by_id: HashMap<Uuid, Arc<Dataset>>,
  /// Insertion order, oldest first.
  order: VecDeque<Uuid>,
}

impl Default for LoadRegistry {
  fn default() -> Self { Self::with_capacity(DEFAULT_CAPACITY) }
}

impl LoadRegistry {
  pub fn new() -> Self { Self::default() }

  /// A capacity of zero is treated as one.
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      capacity: capacity.max(1),
      inner:    RwLock::new(Loads::default()),
    }
  }

  pub fn capacity(&self) -> usize { self.capacity }

  /// Register `dataset` under a fresh id, evicting the oldest load when full.
  pub async fn insert(&self, dataset: Dataset) -> (Uuid, Arc<Dataset>) {
    let id = Uuid::new_v4();
    let dataset = Arc::new(dataset);

    let mut loads = self.inner.write().await;
    while loads.order.len() >= self.capacity {
      let Some(oldest) = loads.order.pop_front() else {
        break;
      };
      loads.by_id.remove(&oldest);
      tracing::info!(id = %oldest, "load evicted");
    }
    loads.by_id.insert(id, dataset.clone());
    loads.order.push_back(id);
    (id, dataset)
  }

  pub async fn get(&self, id: Uuid) -> Option<Arc<Dataset>> {
    self.inner.read().await.by_id.get(&id).cloned()
  }

  /// Forget one load. Returns whether it was registered.
  pub async fn remove(&self, id: Uuid) -> bool {
    let mut loads = self.inner.write().await;
    if loads.by_id.remove(&id).is_none() {
      return false;
    }
    loads.order.retain(|other| *other != id);
    true
  }

  pub async fn len(&self) -> usize { self.inner.read().await.by_id.len() }

  pub async fn is_empty(&self) -> bool { self.len().await == 0 }
}
