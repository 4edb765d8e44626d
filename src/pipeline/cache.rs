//! One open channel per distinct writer key.

use std::{
    collections::{HashMap, hash_map::Entry},
    fmt,
    sync::Arc,
};

use log::{debug, warn};
use parking_lot::Mutex;

use crate::writer::{TransportError, WriterChannel, WriterOpener};

/// Shares channels between writers that resolve to the same key.
///
/// Two descriptors with equal [`WriterOpener::writer_key`] values receive the
/// same channel; the first one to be opened wins.
#[derive(Default)]
pub struct ChannelCache {
    channels: Mutex<HashMap<String, Arc<dyn WriterChannel>>>,
}

impl ChannelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached channel for `opener`'s key, opening one if needed.
    ///
    /// A failed open leaves the cache unchanged.
    pub fn get_or_open(
        &self,
        opener: &Arc<dyn WriterOpener>,
    ) -> Result<Arc<dyn WriterChannel>, TransportError> {
        let mut channels = self.channels.lock();
        match channels.entry(opener.writer_key()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let channel = Arc::clone(opener).open_writer()?;
                debug!("ChannelCache: opened channel for {opener}");
                Ok(Arc::clone(entry.insert(channel)))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.channels.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.lock().is_empty()
    }

    /// Close and drop every cached channel.
    ///
    /// Every channel is closed even when some fail; the last failure is
    /// returned.
    pub fn close_all(&self) -> Result<(), TransportError> {
        let drained: Vec<_> = self.channels.lock().drain().collect();
        let mut result = Ok(());
        for (key, channel) in drained {
            if let Err(err) = channel.close() {
                warn!("ChannelCache: failed to close channel {key}: {err}");
                result = Err(err);
            }
        }
        result
    }
}

impl fmt::Debug for ChannelCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.channels.lock().keys().cloned().collect();
        keys.sort_unstable();
        f.debug_struct("ChannelCache").field("keys", &keys).finish()
    }
}
