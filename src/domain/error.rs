use std::path::PathBuf;

use thiserror::Error;

/// 搜索过程中会中止整次搜索的错误
///
/// 子目录不可读之类的可恢复问题不会走这里，而是作为警告记录在结果集中。
#[derive(Error, Debug)]
pub enum ScanError {
    /// 搜索根路径不存在
    #[error("路径不存在: {0}")]
    PathNotFound(PathBuf),

    /// 搜索根路径不是目录
    #[error("路径不是目录: {0}")]
    NotADirectory(PathBuf),

    /// 目录中的模式无法编译
    #[error("无效的匹配模式 {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: grep_regex::Error,
    },

    /// 解析根路径失败
    #[error("无法访问 {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
