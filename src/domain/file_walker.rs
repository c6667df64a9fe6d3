use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use ignore::{DirEntry, WalkBuilder};
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::catalog::Catalog;
use crate::domain::error::ScanError;
use crate::domain::matcher::ConfigMatcher;
use crate::domain::results::{ConfigFile, ResultAggregator, ResultSet, ScanWarning};
use crate::infrastructure::{ErrorLogger, ErrorType, Logger, LoggerTrait};

/// 默认最大递归深度
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// 默认排除的路径前缀
pub const DEFAULT_EXCLUDED: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "coverage",
    "target",
    ".next",
    ".cache",
];

/// 搜索选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// 是否进入子目录
    pub recursive: bool,
    /// 最大深度，0 表示只扫描根目录
    pub max_depth: usize,
    /// 相对根目录的排除前缀
    pub exclude: BTreeSet<String>,
    /// 是否构建按类别分组的结果
    pub categorize: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            max_depth: DEFAULT_MAX_DEPTH,
            exclude: DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
            categorize: true,
        }
    }
}

/// 调用方提供的选项覆盖，未设置的字段保留原值
#[derive(Debug, Clone, Default)]
pub struct SearchOverrides {
    pub recursive: Option<bool>,
    pub max_depth: Option<usize>,
    /// 替换整个排除集合
    pub exclude: Option<Vec<String>>,
    /// 追加到排除集合
    pub extra_exclude: Vec<String>,
    pub categorize: Option<bool>,
}

impl SearchOptions {
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_categorize(mut self, categorize: bool) -> Self {
        self.categorize = categorize;
        self
    }

    /// 替换排除前缀集合
    pub fn with_exclude(mut self, exclude: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude = exclude
            .into_iter()
            .map(|s| normalize_prefix(&s.into()))
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    /// 合并覆盖项
    pub fn merge(mut self, overrides: &SearchOverrides) -> Self {
        if let Some(recursive) = overrides.recursive {
            self.recursive = recursive;
        }
        if let Some(max_depth) = overrides.max_depth {
            self.max_depth = max_depth;
        }
        if let Some(exclude) = &overrides.exclude {
            self = self.with_exclude(exclude.iter().cloned());
        }
        self.exclude.extend(
            overrides
                .extra_exclude
                .iter()
                .map(|s| normalize_prefix(s))
                .filter(|s| !s.is_empty()),
        );
        if let Some(categorize) = overrides.categorize {
            self.categorize = categorize;
        }
        self
    }

    /// 检查相对路径是否落在某个排除前缀下
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        self.exclude.iter().any(|prefix| {
            let prefix = normalize_prefix(prefix);
            !prefix.is_empty()
                && (relative_path == prefix
                    || relative_path
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/')))
        })
    }

    /// 换算为遍历器的深度：根目录自身为 0，其直接子项为 1
    fn walk_depth(&self) -> usize {
        if self.recursive {
            self.max_depth.saturating_add(1)
        } else {
            1
        }
    }
}

/// 统一使用 `/` 作为分隔符，去掉开头的 `./` 和首尾分隔符
fn normalize_prefix(prefix: &str) -> String {
    let mut prefix = prefix.replace('\\', "/");
    while let Some(rest) = prefix.strip_prefix("./") {
        prefix = rest.to_string();
    }
    prefix.trim_matches('/').to_string()
}

/// 计算相对根目录的路径，分隔符统一为 `/`
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let components: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(components.join("/"))
}

/// 解析根路径：转为绝对路径并确认存在且为目录
fn resolve_root(path: &Path) -> Result<PathBuf, ScanError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|source| ScanError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .join(path)
    };

    if !absolute.exists() {
        return Err(ScanError::PathNotFound(absolute));
    }

    let resolved = absolute.canonicalize().map_err(|source| ScanError::Io {
        path: absolute.clone(),
        source,
    })?;

    if !resolved.is_dir() {
        return Err(ScanError::NotADirectory(resolved));
    }

    Ok(resolved)
}

/// 从遍历错误中取出出错的路径
fn error_path(err: &ignore::Error) -> Option<PathBuf> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        _ => None,
    }
}

/// 配置文件扫描器
///
/// 单线程深度优先遍历：父目录先于子项，同级条目按文件名排序。
/// 不可读的目录只记录警告并跳过，不会中止搜索。
pub struct Scanner {
    matcher: ConfigMatcher,
    logger: Arc<dyn LoggerTrait>,
    error_logger: Arc<ErrorLogger>,
    show_progress: bool,
}

impl Scanner {
    pub fn new(catalog: &Catalog) -> Result<Self, ScanError> {
        Ok(Self {
            matcher: ConfigMatcher::new(catalog)?,
            logger: Arc::new(Logger::disabled()),
            error_logger: Arc::new(ErrorLogger::disabled()),
            show_progress: false,
        })
    }

    pub fn with_logger(mut self, logger: Arc<dyn LoggerTrait>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_error_logger(mut self, error_logger: Arc<ErrorLogger>) -> Self {
        self.error_logger = error_logger;
        self
    }

    /// 扫描时在终端显示进度
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            progress.set_style(style);
        }
        progress.set_message("已扫描 0 文件");
        progress
    }

    /// 搜索 `root` 下的配置文件
    pub fn search(&self, root: &Path, options: &SearchOptions) -> Result<ResultSet, ScanError> {
        let root = resolve_root(root)?;
        let mut aggregator = ResultAggregator::new(options.categorize);
        let progress = self.progress_bar();

        if self.logger.is_enabled() {
            let _ = self.logger.log_message(&format!("开始扫描目录: {}", root.display()));
        }

        let mut builder = WalkBuilder::new(&root);
        builder
            .standard_filters(false)
            .follow_links(false)
            .max_depth(Some(options.walk_depth()))
            .sort_by_file_name(|a, b| a.cmp(b));

        let filter_root = root.clone();
        let filter_options = options.clone();
        let filter_logger = Arc::clone(&self.logger);
        builder.filter_entry(move |entry| {
            let excluded = relative_path(&filter_root, entry.path())
                .is_some_and(|relative| filter_options.is_excluded(&relative));
            if excluded && filter_logger.is_enabled() {
                let _ = filter_logger.log_file(entry.path(), 0, "已跳过(路径排除)");
            }
            !excluded
        });

        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    self.warn(&mut aggregator, ErrorType::DirectoryRead, error_path(&err), err.to_string());
                    continue;
                }
            };

            // 跳过根目录自身
            if entry.depth() == 0 {
                continue;
            }

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            aggregator.count_scanned();
            progress.set_message(format!("已扫描 {} 文件", aggregator.scanned()));
            progress.tick();

            if let Some(file) = self.inspect(&root, &entry, &mut aggregator) {
                if self.logger.is_enabled() {
                    let _ = self.logger.log_file(&file.absolute_path, file.size, &file.category);
                }
                aggregator.record(file);
            }
        }

        progress.finish_and_clear();

        let result = aggregator.finish();
        if self.logger.is_enabled() {
            let _ = self.logger.log_message(&format!(
                "扫描结束: {} 个配置文件, {} 个警告",
                result.len(),
                result.warnings().len()
            ));
        }

        Ok(result)
    }

    /// 对单个文件分类并读取元数据
    fn inspect(&self, root: &Path, entry: &DirEntry, aggregator: &mut ResultAggregator) -> Option<ConfigFile> {
        let relative = relative_path(root, entry.path())?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let category = self.matcher.classify(&name, &relative)?.to_string();

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                self.warn(aggregator, ErrorType::Metadata, Some(entry.path().to_path_buf()), err.to_string());
                return None;
            }
        };

        Some(ConfigFile {
            name,
            relative_path: relative,
            absolute_path: entry.path().to_path_buf(),
            category,
            size: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Local>::from),
        })
    }

    fn warn(&self, aggregator: &mut ResultAggregator, kind: ErrorType, path: Option<PathBuf>, message: String) {
        let display_path = path.as_ref().map(|p| p.display().to_string());

        if self.logger.is_enabled() {
            let _ = self.logger.log_message(&format!("警告: {}", message));
        }
        let _ = self
            .error_logger
            .log_error(kind, display_path.as_deref(), "已跳过", Some(message.as_str()));

        aggregator.warn(ScanWarning { kind, path, message });
    }
}

/// 使用内置目录搜索配置文件
pub fn search_configuration_files(path: impl AsRef<Path>, options: &SearchOptions) -> Result<ResultSet, ScanError> {
    Scanner::new(&Catalog::default_catalog())?.search(path.as_ref(), options)
}
