use serde::{Deserialize, Serialize};

/// 一个配置文件类别及其文件名模式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    /// 类别名称（唯一）
    pub name: String,
    /// 按顺序排列的模式：字面文件名，或包含 `*` 的通配模式
    pub patterns: Vec<String>,
}

impl CategoryEntry {
    pub fn new(name: impl Into<String>, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }
}

/// 内置类别，顺序即匹配优先级
const BUILTIN_CATEGORIES: &[(&str, &[&str])] = &[
    ("package", &[
        "package.json",
        "package-lock.json",
        "yarn.lock",
        "pnpm-lock.yaml",
        "pnpm-workspace.yaml",
        "lerna.json",
        ".npmrc",
        ".yarnrc",
        ".yarnrc.yml",
        ".nvmrc",
        ".node-version",
    ]),
    ("typescript", &[
        "tsconfig.json",
        "tsconfig.*.json",
        "jsconfig.json",
    ]),
    ("eslint", &[
        ".eslintrc",
        ".eslintrc.js",
        ".eslintrc.cjs",
        ".eslintrc.json",
        ".eslintrc.yml",
        ".eslintrc.yaml",
        "eslint.config.js",
        "eslint.config.mjs",
        ".eslintignore",
    ]),
    ("prettier", &[
        ".prettierrc",
        ".prettierrc.json",
        ".prettierrc.js",
        ".prettierrc.yml",
        ".prettierrc.yaml",
        "prettier.config.js",
        ".prettierignore",
    ]),
    ("babel", &[
        ".babelrc",
        ".babelrc.json",
        "babel.config.js",
        "babel.config.json",
    ]),
    ("bundler", &[
        "webpack.config.js",
        "webpack.*.js",
        "vite.config.js",
        "vite.config.ts",
        "rollup.config.js",
        "rollup.config.mjs",
        "esbuild.config.js",
    ]),
    ("testing", &[
        "jest.config.js",
        "jest.config.ts",
        "vitest.config.js",
        "vitest.config.ts",
        "karma.conf.js",
        "cypress.config.js",
        "playwright.config.ts",
        ".mocharc.json",
        ".mocharc.yml",
    ]),
    ("style", &[
        ".stylelintrc",
        ".stylelintrc.json",
        "stylelint.config.js",
        "postcss.config.js",
        "tailwind.config.js",
        "tailwind.config.ts",
        ".browserslistrc",
    ]),
    ("git", &[
        ".gitignore",
        ".gitattributes",
        ".gitmodules",
        ".mailmap",
    ]),
    ("docker", &[
        "Dockerfile",
        "Dockerfile.*",
        "docker-compose.yml",
        "docker-compose.yaml",
        "docker-compose.*.yml",
        "compose.yml",
        "compose.yaml",
        ".dockerignore",
    ]),
    ("ci", &[
        ".github/workflows/*.yml",
        ".github/workflows/*.yaml",
        ".gitlab-ci.yml",
        ".travis.yml",
        ".circleci/config.yml",
        "azure-pipelines.yml",
        "bitbucket-pipelines.yml",
        "Jenkinsfile",
    ]),
    ("editor", &[
        ".editorconfig",
        ".vscode/settings.json",
        ".vscode/extensions.json",
        ".vscode/launch.json",
    ]),
    ("env", &[
        ".env",
        ".env.*",
        ".envrc",
    ]),
    ("rust", &[
        "Cargo.toml",
        "Cargo.lock",
        "rust-toolchain",
        "rust-toolchain.toml",
        "rustfmt.toml",
        ".rustfmt.toml",
        "clippy.toml",
        ".cargo/config.toml",
    ]),
    ("python", &[
        "pyproject.toml",
        "setup.py",
        "setup.cfg",
        "requirements.txt",
        "requirements-*.txt",
        "Pipfile",
        "Pipfile.lock",
        "poetry.lock",
        "tox.ini",
        "mypy.ini",
        ".flake8",
        ".python-version",
    ]),
    ("go", &[
        "go.mod",
        "go.sum",
        ".golangci.yml",
    ]),
    ("java", &[
        "pom.xml",
        "build.gradle",
        "build.gradle.kts",
        "settings.gradle",
        "gradle.properties",
    ]),
    ("ruby", &[
        "Gemfile",
        "Gemfile.lock",
        ".ruby-version",
        ".rubocop.yml",
    ]),
    ("php", &[
        "composer.json",
        "composer.lock",
    ]),
    ("build", &[
        "Makefile",
        "CMakeLists.txt",
        "justfile",
    ]),
    ("deploy", &[
        "vercel.json",
        "netlify.toml",
        "fly.toml",
        "Procfile",
        "serverless.yml",
    ]),
    ("tooling", &[
        ".pre-commit-config.yaml",
        "commitlint.config.js",
        ".commitlintrc.json",
        ".lintstagedrc",
        ".releaserc",
        "renovate.json",
    ]),
];

/// 配置文件模式目录
///
/// 有序的 类别 -> 模式 映射，构造后只读。类别顺序决定匹配优先级：
/// 多个类别都能匹配同一文件时，先声明的类别胜出。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CategoryEntry>,
}

impl Catalog {
    /// 由类别列表构建目录，同名类别的模式会合并到首次出现的位置
    pub fn new(entries: impl IntoIterator<Item = CategoryEntry>) -> Self {
        let mut catalog = Self { entries: Vec::new() };
        catalog.merge(entries);
        catalog
    }

    /// 内置目录
    pub fn default_catalog() -> Self {
        Self::new(
            BUILTIN_CATEGORIES
                .iter()
                .map(|(name, patterns)| CategoryEntry::new(*name, patterns.iter().copied())),
        )
    }

    /// 返回追加了额外类别的新目录，原目录不变
    pub fn with_extra(&self, extra: &[CategoryEntry]) -> Self {
        let mut catalog = self.clone();
        catalog.merge(extra.iter().cloned());
        catalog
    }

    fn merge(&mut self, entries: impl IntoIterator<Item = CategoryEntry>) {
        for entry in entries {
            match self.entries.iter_mut().find(|e| e.name == entry.name) {
                Some(existing) => existing.patterns.extend(entry.patterns),
                None => self.entries.push(entry),
            }
        }
    }

    pub fn entries(&self) -> &[CategoryEntry] {
        &self.entries
    }

    /// 按优先级顺序返回类别名称
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn patterns(&self, category: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.name == category)
            .map(|e| e.patterns.as_slice())
    }

    pub fn contains(&self, category: &str) -> bool {
        self.patterns(category).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::default_catalog()
    }
}
