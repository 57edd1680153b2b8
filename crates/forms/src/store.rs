//! Reading and writing form records through the storage adapter.

use {
    formstash_storage::StorageAdapter,
    tracing::{debug, warn},
};

use crate::{
    error::{Error, Result},
    options::SessionOptions,
    record::{Envelope, StoredRecord, field_key},
};

/// Loads and saves the records of one app id in the configured layout.
///
/// Values pass through untouched: encoding and decoding is the
/// serializer's job.
pub struct RecordStore<'a> {
    adapter: &'a StorageAdapter,
    opts: &'a SessionOptions,
}

impl<'a> RecordStore<'a> {
    pub fn new(adapter: &'a StorageAdapter, opts: &'a SessionOptions) -> Self {
        Self { adapter, opts }
    }

    /// The envelope under the app id. `Ok(None)` when nothing is stored,
    /// `Err` with a reason when what is stored is not usable.
    fn envelope(&self) -> std::result::Result<Option<Envelope>, String> {
        match self.adapter.get(self.opts.storage, &self.opts.app_id) {
            Some(raw) => Envelope::parse(&raw, self.opts.layout).map(Some),
            None => Ok(None),
        }
    }

    /// Stored record of `form_id`; empty when nothing usable is stored.
    pub fn load(&self, form_id: &str) -> StoredRecord {
        let envelope = match self.envelope() {
            Ok(Some(envelope)) => envelope,
            Ok(None) => return StoredRecord::new(),
            Err(reason) => {
                warn!(app_id = %self.opts.app_id, form_id, %reason, "ignoring stored record");
                return StoredRecord::new();
            },
        };

        let record = match envelope {
            Envelope::Blob { mut forms, .. } => forms.remove(form_id).unwrap_or_default(),
            Envelope::PerField { forms, .. } => forms
                .get(form_id)
                .into_iter()
                .flatten()
                .filter_map(|name| {
                    let key = field_key(&self.opts.app_id, form_id, name);
                    self.adapter
                        .get(self.opts.storage, &key)
                        .map(|value| (name.clone(), value))
                })
                .collect(),
        };
        debug!(app_id = %self.opts.app_id, form_id, fields = record.len(), "loaded record");
        record
    }

    /// Replace the stored record of `form_id`, leaving other forms of the
    /// same app id alone.
    ///
    /// An incompatible envelope already stored under the app id is never
    /// overwritten. The per-field layout is not atomic: the index is written
    /// first, then each field, so a failure partway leaves some fields at
    /// their previous value but never an entry the index does not list.
    pub fn save(&self, form_id: &str, record: &StoredRecord) -> Result<()> {
        let existing = self
            .envelope()
            .map_err(|reason| Error::IncompatibleRecord {
                app_id: self.opts.app_id.clone(),
                reason,
            })?
            .unwrap_or_else(|| Envelope::empty(self.opts.layout));

        let envelope = match existing {
            Envelope::Blob { version, mut forms } => {
                forms.insert(form_id.to_string(), record.clone());
                Envelope::Blob { version, forms }
            },
            Envelope::PerField { version, mut forms } => {
                forms
                    .entry(form_id.to_string())
                    .or_default()
                    .extend(record.names().map(str::to_owned));
                Envelope::PerField { version, forms }
            },
        };

        let raw = serde_json::to_string(&envelope)?;
        if !self.adapter.set(self.opts.storage, &self.opts.app_id, &raw) {
            return Err(Error::write_failed(&self.opts.app_id));
        }
        if matches!(envelope, Envelope::PerField { .. }) {
            self.write_fields(form_id, record)?;
        }
        debug!(
            app_id = %self.opts.app_id,
            form_id,
            layout = %envelope.layout(),
            fields = record.len(),
            "saved record"
        );
        Ok(())
    }

    fn write_fields(&self, form_id: &str, record: &StoredRecord) -> Result<()> {
        for (name, value) in record.iter() {
            let key = field_key(&self.opts.app_id, form_id, name);
            if !self.adapter.set(self.opts.storage, &key, value) {
                return Err(Error::write_failed(key));
            }
        }
        Ok(())
    }

    /// Every form id with a record under the app id.
    pub fn form_ids(&self) -> Vec<String> {
        match self.envelope() {
            Ok(Some(Envelope::Blob { forms, .. })) => forms.into_keys().collect(),
            Ok(Some(Envelope::PerField { forms, .. })) => forms.into_keys().collect(),
            Ok(None) | Err(_) => Vec::new(),
        }
    }
}
