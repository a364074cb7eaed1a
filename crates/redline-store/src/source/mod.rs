//! Reading pipeline inputs from disk.

pub mod reader;

pub use reader::{
    load_config, load_config_or_default, read_change_records, read_source_table, SourceFormat,
};
