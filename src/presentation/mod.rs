pub mod display;

pub use display::{
    format_catalog, format_duration, format_file_size, format_json, format_no_results,
    format_results, format_warnings, FormatOptions,
};
