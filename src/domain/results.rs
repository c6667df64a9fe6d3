use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::infrastructure::ErrorType;

/// 匹配到的配置文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigFile {
    /// 文件名
    pub name: String,
    /// 相对于搜索根目录的路径，使用 `/` 分隔
    pub relative_path: String,
    /// 绝对路径
    pub absolute_path: PathBuf,
    /// 所属类别
    pub category: String,
    /// 文件大小（字节）
    pub size: u64,
    /// 最后修改时间，平台不支持时为空
    pub modified: Option<DateTime<Local>>,
}

/// 遍历中遇到的可恢复问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanWarning {
    pub kind: ErrorType,
    pub path: Option<PathBuf>,
    pub message: String,
}

/// 计数摘要
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub by_category: BTreeMap<String, usize>,
}

impl Summary {
    /// 按数量降序、名称升序排列的类别计数
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<_> = self
            .by_category
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

/// 一次搜索的完整结果
///
/// 由 [`ResultAggregator::finish`] 产出，之后只提供只读访问。
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultSet {
    files: Vec<ConfigFile>,
    by_category: BTreeMap<String, Vec<ConfigFile>>,
    summary: Summary,
    warnings: Vec<ScanWarning>,
    scanned_files: u64,
}

impl ResultSet {
    /// 按发现顺序排列的全部文件
    pub fn files(&self) -> &[ConfigFile] {
        &self.files
    }

    /// 按类别分组的文件，未启用分类时为空
    ///
    /// 类别按名称字典序排列，而不是首次发现的顺序；组内文件保持发现顺序。
    /// 文本报告按 [`Summary::ranked`] 的数量顺序输出各组。
    pub fn by_category(&self) -> &BTreeMap<String, Vec<ConfigFile>> {
        &self.by_category
    }

    pub fn category(&self, name: &str) -> &[ConfigFile] {
        self.by_category.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    /// 遍历过的普通文件总数（含未匹配的）
    pub fn scanned_files(&self) -> u64 {
        self.scanned_files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// 在一次遍历中构建结果集
#[derive(Debug, Default)]
pub struct ResultAggregator {
    group: bool,
    result: ResultSet,
}

impl ResultAggregator {
    pub fn new(group: bool) -> Self {
        Self {
            group,
            result: ResultSet::default(),
        }
    }

    /// 记录一个匹配文件，重复调用会产生重复条目
    pub fn record(&mut self, file: ConfigFile) {
        *self
            .result
            .summary
            .by_category
            .entry(file.category.clone())
            .or_insert(0) += 1;
        self.result.summary.total += 1;

        if self.group {
            self.result
                .by_category
                .entry(file.category.clone())
                .or_default()
                .push(file.clone());
        }
        self.result.files.push(file);
    }

    pub fn warn(&mut self, warning: ScanWarning) {
        self.result.warnings.push(warning);
    }

    pub fn count_scanned(&mut self) {
        self.result.scanned_files += 1;
    }

    pub fn scanned(&self) -> u64 {
        self.result.scanned_files
    }

    pub fn len(&self) -> usize {
        self.result.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.result.files.is_empty()
    }

    pub fn finish(self) -> ResultSet {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, category: &str) -> ConfigFile {
        ConfigFile {
            name: name.to_string(),
            relative_path: name.to_string(),
            absolute_path: PathBuf::from("/project").join(name),
            category: category.to_string(),
            size: 10,
            modified: None,
        }
    }

    #[test]
    fn test_record_updates_all_views() {
        let mut aggregator = ResultAggregator::new(true);
        aggregator.record(file("package.json", "package"));
        aggregator.record(file("yarn.lock", "package"));
        aggregator.record(file(".gitignore", "git"));

        let result = aggregator.finish();
        assert_eq!(result.len(), 3);
        assert_eq!(result.summary().total, 3);
        assert_eq!(result.summary().by_category.get("package"), Some(&2));
        assert_eq!(result.category("package").len(), 2);
        assert_eq!(result.category("git")[0].name, ".gitignore");
        assert!(result.category("docker").is_empty());

        let sum: usize = result.summary().by_category.values().sum();
        assert_eq!(sum, result.files().len());
    }

    #[test]
    fn test_record_without_grouping() {
        let mut aggregator = ResultAggregator::new(false);
        aggregator.record(file("package.json", "package"));

        let result = aggregator.finish();
        assert!(result.by_category().is_empty());
        assert_eq!(result.summary().total, 1);
        assert_eq!(result.summary().by_category.get("package"), Some(&1));
    }

    #[test]
    fn test_record_is_not_idempotent() {
        let mut aggregator = ResultAggregator::new(true);
        aggregator.record(file("package.json", "package"));
        aggregator.record(file("package.json", "package"));

        assert_eq!(aggregator.len(), 2);
        assert_eq!(aggregator.finish().category("package").len(), 2);
    }

    #[test]
    fn test_groups_are_ordered_by_name() {
        let mut aggregator = ResultAggregator::new(true);
        aggregator.record(file("tsconfig.json", "typescript"));
        aggregator.record(file("package.json", "package"));
        aggregator.record(file(".gitignore", "git"));

        let result = aggregator.finish();
        let groups: Vec<_> = result.by_category().keys().map(String::as_str).collect();
        assert_eq!(groups, vec!["git", "package", "typescript"]);
        assert_eq!(result.files()[0].name, "tsconfig.json");
    }

    #[test]
    fn test_ranked_summary() {
        let mut aggregator = ResultAggregator::new(true);
        aggregator.record(file(".gitignore", "git"));
        aggregator.record(file("Dockerfile", "docker"));
        aggregator.record(file("compose.yml", "docker"));
        aggregator.record(file("Cargo.toml", "rust"));

        let result = aggregator.finish();
        assert_eq!(
            result.summary().ranked(),
            vec![("docker", 2), ("git", 1), ("rust", 1)]
        );
    }
}
