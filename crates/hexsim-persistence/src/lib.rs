mod save;

pub use save::{compute_save_hash, read_save, write_save, LoadedSave, SavePayload, SCHEMA_VERSION};
