use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use humansize::{format_size, BINARY};

use crate::domain::{Catalog, ConfigFile, ResultSet, ScanWarning, SearchOptions};

/// 报告格式选项，只影响输出，不影响搜索结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// 显示相对路径
    pub show_paths: bool,
    /// 显示摘要
    pub show_summary: bool,
    /// 按类别分组输出
    pub group_output: bool,
    /// 使用ANSI颜色
    pub color: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            show_paths: true,
            show_summary: true,
            group_output: true,
            color: false,
        }
    }
}

fn paint(text: &str, code: &str, color: bool) -> String {
    if color {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

/// 格式化文件大小
pub fn format_file_size(size: u64) -> String {
    format_size(size, BINARY)
}

/// 格式化持续时间
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}.{:03}s", secs, duration.subsec_millis())
    }
}

fn format_file(file: &ConfigFile, options: &FormatOptions, with_category: bool) -> Vec<String> {
    let mut line = format!("  • {}", paint(&file.name, "1;32", options.color));
    if with_category {
        line.push_str(&format!(" [{}]", paint(&file.category, "1;34", options.color)));
    }
    line.push_str(&format!("  ({})", format_file_size(file.size)));
    if let Some(modified) = &file.modified {
        line.push_str(&format!("  {}", modified.format("%Y-%m-%d %H:%M")));
    }

    let mut lines = vec![line];
    if options.show_paths {
        lines.push(format!("      {}", paint(&file.relative_path, "2;37", options.color)));
    }
    lines
}

/// 将结果集渲染为文本报告
///
/// 纯函数，不会失败；没有数据时输出空的段落。
pub fn format_results(result: &ResultSet, options: &FormatOptions) -> String {
    let mut lines = Vec::new();
    lines.push(paint(
        &format!("找到 {} 个配置文件", result.len()),
        "1",
        options.color,
    ));

    if options.group_output && !result.by_category().is_empty() {
        for (category, count) in result.summary().ranked() {
            let files = result.category(category);
            if files.is_empty() {
                continue;
            }
            lines.push(String::new());
            lines.push(format!("{} ({})", paint(category, "1;34", options.color), count));
            for file in files {
                lines.extend(format_file(file, options, false));
            }
        }
    } else if !result.is_empty() {
        lines.push(String::new());
        for file in result.files() {
            lines.extend(format_file(file, options, true));
        }
    }

    if options.show_summary {
        let summary = result.summary();
        lines.push(String::new());
        lines.push("摘要:".to_string());
        lines.push("----------------------------".to_string());
        lines.push(format!("配置文件总数: {}", summary.total));
        lines.push(format!("扫描文件数: {}", result.scanned_files()));
        lines.push(format!("类别数: {}", summary.by_category.len()));
        for (category, count) in summary.ranked() {
            lines.push(format!("  {}: {}", category, count));
        }
    }

    lines.join("\n")
}

/// 将结果集序列化为JSON
pub fn format_json(result: &ResultSet) -> Result<String> {
    serde_json::to_string_pretty(result).context("无法序列化搜索结果")
}

/// 没有找到配置文件时的提示
pub fn format_no_results(root: &Path, options: &SearchOptions) -> String {
    let mut lines = vec![
        format!("在 {} 中没有找到配置文件", root.display()),
        String::new(),
        "建议:".to_string(),
    ];

    if !options.recursive {
        lines.push("  - 去掉 --no-recursive 以搜索子目录".to_string());
    } else {
        lines.push(format!(
            "  - 使用 --max-depth 增大搜索深度（当前: {}）",
            options.max_depth
        ));
    }
    if !options.exclude.is_empty() {
        let excluded: Vec<_> = options.exclude.iter().map(String::as_str).collect();
        lines.push(format!("  - 检查排除规则: {}", excluded.join(", ")));
    }
    lines.push("  - 使用 --list-categories 查看支持的配置文件类型".to_string());

    lines.join("\n")
}

/// 列出目录中的类别与模式
pub fn format_catalog(catalog: &Catalog) -> String {
    let mut lines = vec![format!("支持的配置文件类别 ({}):", catalog.len())];
    for entry in catalog.entries() {
        lines.push(format!("  {}: {}", entry.name, entry.patterns.join(", ")));
    }
    lines.join("\n")
}

/// 渲染遍历中被跳过的路径
pub fn format_warnings(warnings: &[ScanWarning]) -> String {
    warnings
        .iter()
        .map(|warning| match &warning.path {
            Some(path) => format!(
                "警告: 已跳过 {} ({}): {}",
                path.display(),
                warning.kind.as_str(),
                warning.message
            ),
            None => format!("警告: {}: {}", warning.kind.as_str(), warning.message),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResultAggregator;
    use crate::infrastructure::ErrorType;
    use std::path::PathBuf;

    fn file(relative: &str, category: &str, size: u64) -> ConfigFile {
        let name = relative.rsplit('/').next().unwrap_or(relative).to_string();
        ConfigFile {
            name,
            relative_path: relative.to_string(),
            absolute_path: PathBuf::from("/project").join(relative),
            category: category.to_string(),
            size,
            modified: None,
        }
    }

    fn sample(group: bool) -> ResultSet {
        let mut aggregator = ResultAggregator::new(group);
        aggregator.record(file("package.json", "package", 512));
        aggregator.record(file(".gitignore", "git", 20));
        aggregator.record(file("apps/web/package.json", "package", 2048));
        aggregator.finish()
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.500s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }

    #[test]
    fn test_format_file_size() {
        assert!(format_file_size(512).starts_with("512"));
        assert!(format_file_size(2048).contains("KiB"));
    }

    #[test]
    fn test_grouped_report() {
        let report = format_results(&sample(true), &FormatOptions::default());

        assert!(report.starts_with("找到 3 个配置文件"));
        assert!(report.contains("package (2)"));
        assert!(report.contains("git (1)"));
        assert!(report.contains("apps/web/package.json"));
        assert!(report.contains("配置文件总数: 3"));
        // 数量多的类别排在前面
        assert!(report.find("package (2)").unwrap() < report.find("git (1)").unwrap());
        assert!(!report.contains("\x1b["));
    }

    #[test]
    fn test_flat_report_without_paths_and_summary() {
        let options = FormatOptions {
            show_paths: false,
            show_summary: false,
            group_output: false,
            color: false,
        };
        let report = format_results(&sample(true), &options);

        assert!(report.contains("• .gitignore [git]"));
        assert!(!report.contains("apps/web/package.json"));
        assert!(!report.contains("摘要"));
    }

    #[test]
    fn test_ungrouped_result_renders_flat() {
        let report = format_results(&sample(false), &FormatOptions::default());
        assert!(report.contains("• package.json [package]"));
        assert!(!report.contains("package (2)"));
    }

    #[test]
    fn test_empty_report() {
        let report = format_results(&ResultSet::default(), &FormatOptions::default());
        assert!(report.contains("找到 0 个配置文件"));
        assert!(report.contains("配置文件总数: 0"));
    }

    #[test]
    fn test_color_report() {
        let options = FormatOptions {
            color: true,
            ..Default::default()
        };
        let report = format_results(&sample(true), &options);
        assert!(report.contains("\x1b[1;32mpackage.json\x1b[0m"));
    }

    #[test]
    fn test_format_json() {
        let json = format_json(&sample(true)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["summary"]["total"], 3);
        assert_eq!(value["files"][1]["category"], "git");
        assert_eq!(value["by_category"]["package"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_no_results_suggestions() {
        let options = SearchOptions::default().with_recursive(false);
        let message = format_no_results(Path::new("/empty"), &options);

        assert!(message.contains("/empty"));
        assert!(message.contains("--no-recursive"));
        assert!(message.contains("node_modules"));
    }

    #[test]
    fn test_format_catalog() {
        let listing = format_catalog(&Catalog::default_catalog());
        assert!(listing.contains("package: package.json"));
        assert!(listing.contains("tsconfig.*.json"));
    }

    #[test]
    fn test_format_warnings() {
        let warnings = vec![ScanWarning {
            kind: ErrorType::DirectoryRead,
            path: Some(PathBuf::from("/project/locked")),
            message: "Permission denied".to_string(),
        }];
        let text = format_warnings(&warnings);
        assert!(text.contains("/project/locked"));
        assert!(text.contains("目录读取"));
    }
}
