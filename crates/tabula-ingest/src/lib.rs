//! Raw ingestion for Tabula.
//!
//! Reads an input file into a [`RawTable`] (decoded text cells, no
//! semantics) and loads the manifest of active schema descriptions into a
//! [`SchemaCatalog`](tabula_model::SchemaCatalog). Interpreting the cells is
//! the validation engine's job.

pub mod error;
pub mod manifest;
pub mod reader;

pub use error::{FileKind, IngestError, MissingFileError, Result};
pub use manifest::{MANIFEST_FILE_NAME, Manifest, ManifestEntry, load_catalog, load_manifest};
pub use reader::{RawTable, decode_bytes, input_path, read_raw_table, read_raw_table_from_str};
