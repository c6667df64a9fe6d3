// 四层架构模块
pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

// 重新导出主要类型
pub use domain::{
    search_configuration_files, Catalog, CategoryEntry, ConfigFile, ConfigMatcher, ResultSet,
    ScanError, ScanWarning, Scanner, SearchOptions, SearchOverrides, Summary,
};
pub use application::Config;
pub use infrastructure::{ErrorLogger, ErrorType, Logger, LoggerTrait};
pub use presentation::{format_json, format_results, FormatOptions};
