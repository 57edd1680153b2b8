//! Conversion between form values and stored records.

use {formstash_common::usable, tracing::warn};

use crate::{
    codec::ValueCodec,
    error::Result,
    field::NamedValueSet,
    options::SessionOptions,
    record::StoredRecord,
};

/// Applies the emptiness guard and the value codec in both directions.
#[derive(Debug, Clone, Default)]
pub struct FieldSerializer {
    codec: ValueCodec,
}

impl FieldSerializer {
    pub fn new(codec: ValueCodec) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &ValueCodec {
        &self.codec
    }

    /// Encode every usable name/value pair. Empty names and empty values are
    /// left out. Fails instead of writing plaintext when encryption is on
    /// without a key.
    pub fn collect(&self, values: &NamedValueSet, opts: &SessionOptions) -> Result<StoredRecord> {
        let mut record = StoredRecord::new();
        for (name, value) in values.iter() {
            let (Some(name), Some(value)) = (usable(Some(name)), usable(Some(value))) else {
                continue;
            };
            record.insert(name, self.codec.encode(value, opts)?);
        }
        Ok(record)
    }

    /// Decode a stored record back into form values. Entries that fail to
    /// decode are dropped with a warning so one bad value cannot block the
    /// rest of the form.
    pub fn restore(&self, record: &StoredRecord, opts: &SessionOptions) -> NamedValueSet {
        let mut values = NamedValueSet::new();
        for (name, stored) in record.iter() {
            let (Some(name), Some(stored)) = (usable(Some(name)), usable(Some(stored))) else {
                continue;
            };
            match self.codec.decode(stored, opts) {
                Ok(value) => {
                    if let Some(value) = usable(Some(&value)) {
                        values.insert(name, value);
                    }
                },
                Err(e) => {
                    warn!(app_id = %opts.app_id, field = name, error = %e, "dropping undecodable stored value");
                },
            }
        }
        values
    }
}
