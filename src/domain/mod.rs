pub mod catalog;
pub mod error;
pub mod file_walker;
pub mod matcher;
pub mod results;

pub use catalog::{Catalog, CategoryEntry};
pub use error::ScanError;
pub use file_walker::{search_configuration_files, Scanner, SearchOptions, SearchOverrides};
pub use matcher::ConfigMatcher;
pub use results::{ConfigFile, ResultAggregator, ResultSet, ScanWarning, Summary};
