use grep_matcher::Matcher;
use grep_regex::RegexMatcher;

use crate::domain::catalog::Catalog;
use crate::domain::error::ScanError;

/// 编译后的单个模式
#[derive(Debug, Clone)]
enum CompiledPattern {
    /// 字面文件名或根相对路径
    Literal(String),
    /// 通配模式，匹配相对路径中的任意子串
    Wildcard(RegexMatcher),
}

impl CompiledPattern {
    fn compile(pattern: &str) -> Result<Self, ScanError> {
        if !is_wildcard(pattern) {
            return Ok(CompiledPattern::Literal(pattern.to_string()));
        }

        RegexMatcher::new(&wildcard_to_regex(pattern))
            .map(CompiledPattern::Wildcard)
            .map_err(|source| ScanError::Pattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    fn matches(&self, file_name: &str, relative_path: &str) -> bool {
        match self {
            CompiledPattern::Literal(literal) => file_name == literal || relative_path == literal,
            CompiledPattern::Wildcard(matcher) => matcher
                .is_match(relative_path.as_bytes())
                .unwrap_or(false),
        }
    }
}

/// 模式中是否含有通配符
pub fn is_wildcard(pattern: &str) -> bool {
    pattern.contains('*')
}

/// 将通配模式转换为正则表达式
///
/// 只支持 `*`（任意长度的任意字符，包括 `/`），其余字符按字面处理。
/// 结果不加锚点，按子串搜索相对路径，因此 `webpack.*.js` 也会命中
/// `src/webpack.helpers.js` 这类路径。不支持 `?` 和字符类。
pub fn wildcard_to_regex(pattern: &str) -> String {
    pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*")
}

/// 配置文件分类器
///
/// 按目录顺序遍历类别，再按顺序遍历类别内的模式，返回第一个命中的类别。
#[derive(Debug, Clone)]
pub struct ConfigMatcher {
    categories: Vec<(String, Vec<CompiledPattern>)>,
}

impl ConfigMatcher {
    pub fn new(catalog: &Catalog) -> Result<Self, ScanError> {
        let categories = catalog
            .entries()
            .iter()
            .map(|entry| {
                let patterns = entry
                    .patterns
                    .iter()
                    .map(|p| CompiledPattern::compile(p))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((entry.name.clone(), patterns))
            })
            .collect::<Result<Vec<_>, ScanError>>()?;

        Ok(Self { categories })
    }

    /// 判断文件所属类别，`relative_path` 须使用 `/` 作为分隔符
    pub fn classify(&self, file_name: &str, relative_path: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|(_, patterns)| patterns.iter().any(|p| p.matches(file_name, relative_path)))
            .map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::CategoryEntry;

    fn default_matcher() -> ConfigMatcher {
        ConfigMatcher::new(&Catalog::default_catalog()).unwrap()
    }

    #[test]
    fn test_wildcard_to_regex() {
        assert_eq!(wildcard_to_regex("tsconfig.*.json"), r"tsconfig\..*\.json");
        assert_eq!(wildcard_to_regex("*"), ".*");
        assert_eq!(wildcard_to_regex("plain"), "plain");
    }

    #[test]
    fn test_literal_matches_file_name() {
        let matcher = default_matcher();

        assert_eq!(matcher.classify("package.json", "package.json"), Some("package"));
        assert_eq!(matcher.classify("package.json", "apps/web/package.json"), Some("package"));
        assert_eq!(matcher.classify(".gitignore", ".gitignore"), Some("git"));
        assert_eq!(matcher.classify("tsconfig.json", "tsconfig.json"), Some("typescript"));
        assert_eq!(matcher.classify("index.js", "src/index.js"), None);
    }

    #[test]
    fn test_literal_matches_relative_path() {
        let matcher = default_matcher();

        assert_eq!(
            matcher.classify("settings.json", ".vscode/settings.json"),
            Some("editor")
        );
        // 仅文件名相同不足以匹配带目录的字面模式
        assert_eq!(matcher.classify("settings.json", "other/settings.json"), None);
    }

    #[test]
    fn test_wildcard_matches_relative_path() {
        let matcher = default_matcher();

        assert_eq!(matcher.classify("ci.yml", ".github/workflows/ci.yml"), Some("ci"));
        assert_eq!(matcher.classify("tsconfig.build.json", "tsconfig.build.json"), Some("typescript"));
        assert_eq!(matcher.classify(".env.local", "app/.env.local"), Some("env"));
        assert_eq!(matcher.classify("ci.yml", "ci.yml"), None);
    }

    #[test]
    fn test_wildcard_is_unanchored() {
        let matcher = default_matcher();

        // 子串匹配带来的误报是已知行为
        assert_eq!(
            matcher.classify("webpack.helpers.js", "src/webpack.helpers.js"),
            Some("bundler")
        );
    }

    #[test]
    fn test_wildcard_treats_dot_literally() {
        let catalog = Catalog::new(vec![CategoryEntry::new("demo", ["a.*.b"])]);
        let matcher = ConfigMatcher::new(&catalog).unwrap();

        assert_eq!(matcher.classify("a.x.b", "a.x.b"), Some("demo"));
        assert_eq!(matcher.classify("aXxXb", "aXxXb"), None);
    }

    #[test]
    fn test_first_category_wins() {
        let catalog = Catalog::new(vec![
            CategoryEntry::new("first", ["*.json"]),
            CategoryEntry::new("second", ["package.json"]),
        ]);
        let matcher = ConfigMatcher::new(&catalog).unwrap();
        assert_eq!(matcher.classify("package.json", "package.json"), Some("first"));

        let reversed = Catalog::new(vec![
            CategoryEntry::new("second", ["package.json"]),
            CategoryEntry::new("first", ["*.json"]),
        ]);
        let matcher = ConfigMatcher::new(&reversed).unwrap();
        assert_eq!(matcher.classify("package.json", "package.json"), Some("second"));
    }

    #[test]
    fn test_empty_catalog_matches_nothing() {
        let matcher = ConfigMatcher::new(&Catalog::new(Vec::new())).unwrap();
        assert_eq!(matcher.classify("package.json", "package.json"), None);
    }
}
