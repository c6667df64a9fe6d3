use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::file_walker::{DEFAULT_EXCLUDED, DEFAULT_MAX_DEPTH};
use crate::domain::{Catalog, CategoryEntry, SearchOptions};
use crate::presentation::FormatOptions;

/// 允许配置的最大搜索深度
pub const MAX_CONFIG_DEPTH: usize = 64;

/// 应用程序配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// 搜索相关配置
    pub search: SearchConfig,
    /// 排除规则配置
    pub exclude: ExcludeConfig,
    /// 显示相关配置
    pub display: DisplayConfig,
    /// 追加到内置目录之后的类别
    #[serde(default)]
    pub categories: Vec<CategoryEntry>,
}

/// 搜索配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// 默认搜索路径
    pub default_search_path: String,
    /// 最大搜索深度
    pub max_depth: usize,
    /// 是否搜索子目录
    pub recursive: bool,
    /// 是否按类别分组
    pub categorize: bool,
}

/// 排除规则配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludeConfig {
    /// 默认排除的路径前缀
    pub default_dirs: Vec<String>,
}

/// 显示配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub show_paths: bool,
    pub show_summary: bool,
    pub group_output: bool,
    /// 是否使用颜色输出
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search: SearchConfig {
                default_search_path: ".".to_string(),
                max_depth: DEFAULT_MAX_DEPTH,
                recursive: true,
                categorize: true,
            },
            exclude: ExcludeConfig {
                default_dirs: DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect(),
            },
            display: DisplayConfig {
                show_paths: true,
                show_summary: true,
                group_output: true,
                color: true,
            },
            categories: Vec::new(),
        }
    }
}

impl Config {
    /// 从配置文件加载配置，如果文件不存在则创建默认配置文件
    pub fn load_or_create(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load_from_file(config_path)
        } else {
            let config = Self::default();
            config.save_to_file(config_path)?;
            println!("已创建默认配置文件: {}", config_path.display());
            Ok(config)
        }
    }

    /// 从文件加载配置
    pub fn load_from_file(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("无法读取配置文件: {}", config_path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", config_path.display()))?;

        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("无法创建配置目录: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("无法序列化配置")?;

        fs::write(config_path, content)
            .with_context(|| format!("无法写入配置文件: {}", config_path.display()))?;

        Ok(())
    }

    /// 获取配置文件的默认路径（程序同级目录）
    pub fn default_config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("无法获取程序路径")?;

        let exe_dir = exe_path.parent().context("无法获取程序目录")?;

        Ok(exe_dir.join("config-finder.toml"))
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.search.max_depth > MAX_CONFIG_DEPTH {
            anyhow::bail!("max_depth 不能超过 {}", MAX_CONFIG_DEPTH);
        }

        if self.exclude.default_dirs.iter().any(|d| d.trim().is_empty()) {
            anyhow::bail!("default_dirs 不能包含空路径");
        }

        for category in &self.categories {
            if category.name.trim().is_empty() {
                anyhow::bail!("类别名称不能为空");
            }
            if category.patterns.is_empty() {
                anyhow::bail!("类别 {} 没有任何模式", category.name);
            }
            if category.patterns.iter().any(|p| p.trim().is_empty()) {
                anyhow::bail!("类别 {} 包含空模式", category.name);
            }
        }

        Ok(())
    }

    /// 内置目录加上配置中的额外类别
    pub fn catalog(&self) -> Catalog {
        Catalog::default_catalog().with_extra(&self.categories)
    }

    /// 配置对应的搜索选项
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions::default()
            .with_recursive(self.search.recursive)
            .with_max_depth(self.search.max_depth)
            .with_categorize(self.search.categorize)
            .with_exclude(self.exclude.default_dirs.iter().cloned())
    }

    /// 配置对应的格式选项
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            show_paths: self.display.show_paths,
            show_summary: self.display.show_summary,
            group_output: self.display.group_output,
            color: self.display.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search.default_search_path, ".");
        assert_eq!(config.search.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.exclude.default_dirs.contains(&"node_modules".to_string()));
        assert!(config.categories.is_empty());
    }

    #[test]
    fn test_default_config_matches_default_options() {
        let config = Config::default();
        assert_eq!(config.search_options(), SearchOptions::default());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.categories.push(CategoryEntry::new("deno", ["deno.json", "deno.jsonc"]));

        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_config_file_operations() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let created = Config::load_or_create(&config_path).unwrap();
        assert!(config_path.exists());

        let loaded = Config::load_from_file(&config_path).unwrap();
        assert_eq!(created, loaded);
    }

    #[test]
    fn test_categories_from_toml() {
        let toml_str = r#"
            [search]
            default_search_path = "."
            max_depth = 3
            recursive = true
            categorize = false

            [exclude]
            default_dirs = ["vendor"]

            [display]
            show_paths = false
            show_summary = true
            group_output = true
            color = false

            [[categories]]
            name = "deno"
            patterns = ["deno.json"]

            [[categories]]
            name = "git"
            patterns = [".git-blame-ignore-revs"]
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_ok());

        let catalog = config.catalog();
        assert_eq!(catalog.categories().last(), Some("deno"));
        assert!(catalog
            .patterns("git")
            .unwrap()
            .contains(&".git-blame-ignore-revs".to_string()));

        let options = config.search_options();
        assert_eq!(options.max_depth, 3);
        assert!(!options.categorize);
        assert!(options.exclude.contains("vendor"));
        assert!(!options.exclude.contains("node_modules"));

        assert!(!config.format_options().show_paths);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.search.max_depth = 100;
        assert!(config.validate().is_err());

        config = Config::default();
        config.categories.push(CategoryEntry::new("", ["x"]));
        assert!(config.validate().is_err());

        config = Config::default();
        config.categories.push(CategoryEntry::new("empty", Vec::<String>::new()));
        assert!(config.validate().is_err());

        config = Config::default();
        config.exclude.default_dirs.push("  ".to_string());
        assert!(config.validate().is_err());
    }
}
