use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use config_finder::application::Config;
use config_finder::domain::{Scanner, SearchOverrides};
use config_finder::infrastructure::{ErrorLogger, Logger, LoggerTrait};
use config_finder::presentation::{
    format_catalog, format_duration, format_json, format_no_results, format_results,
    format_warnings,
};

/// 在目录树中查找并分类配置文件
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// 要搜索的目录路径
    path: Option<PathBuf>,

    /// 要搜索的目录路径（与位置参数等价）
    #[clap(short = 'p', long = "path", value_name = "PATH")]
    path_option: Option<PathBuf>,

    /// 最大搜索深度，0 表示只搜索根目录
    #[clap(short = 'd', long)]
    max_depth: Option<usize>,

    /// 不搜索子目录
    #[clap(long)]
    no_recursive: bool,

    /// 不按类别分组
    #[clap(long)]
    no_categorize: bool,

    /// 不显示文件路径
    #[clap(long)]
    no_paths: bool,

    /// 不显示摘要
    #[clap(long)]
    no_summary: bool,

    /// 额外排除的路径前缀（可多次指定）
    #[clap(short = 'e', long = "exclude", value_name = "PREFIX")]
    exclude: Vec<String>,

    /// 以JSON格式输出结果
    #[clap(long)]
    json: bool,

    /// 列出支持的配置文件类别
    #[clap(long)]
    list_categories: bool,

    /// 配置文件路径，默认读取程序同级目录下的 config-finder.toml
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// 写入默认配置文件后退出
    #[clap(long)]
    init_config: bool,

    /// 启用详细日志记录，日志文件将保存到当前目录
    #[clap(long)]
    log: bool,

    /// 不显示进度
    #[clap(short, long)]
    quiet: bool,

    /// 禁用颜色输出
    #[clap(long)]
    no_color: bool,
}

/// 加载配置：显式指定的文件不存在时创建，默认位置的文件不存在时使用内置默认值
fn load_config(args: &Args) -> Result<Config> {
    if let Some(path) = &args.config {
        return Config::load_or_create(path);
    }

    match Config::default_config_path() {
        Ok(path) if path.exists() => Config::load_from_file(&path),
        _ => Ok(Config::default()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.init_config {
        let path = match &args.config {
            Some(path) => path.clone(),
            None => Config::default_config_path()?,
        };
        Config::default().save_to_file(&path)?;
        println!("已写入默认配置文件: {}", path.display());
        return Ok(());
    }

    let config = load_config(&args)?;
    config.validate()?;

    let catalog = config.catalog();
    if args.list_categories {
        println!("{}", format_catalog(&catalog));
        return Ok(());
    }

    let logger = Arc::new(Logger::new(args.log)?);
    let error_logger = Arc::new(ErrorLogger::new(args.log)?);

    let root = args
        .path
        .clone()
        .or_else(|| args.path_option.clone())
        .unwrap_or_else(|| PathBuf::from(&config.search.default_search_path));

    let overrides = SearchOverrides {
        recursive: args.no_recursive.then_some(false),
        max_depth: args.max_depth,
        exclude: None,
        extra_exclude: args.exclude.clone(),
        categorize: args.no_categorize.then_some(false),
    };
    let options = config.search_options().merge(&overrides);

    let mut format_options = config.format_options();
    format_options.show_paths &= !args.no_paths;
    format_options.show_summary &= !args.no_summary;
    format_options.group_output &= options.categorize;
    format_options.color &= !args.no_color && std::io::stdout().is_terminal();

    if logger.is_enabled() {
        logger.log_message(&format!("目标目录: {}", root.display()))?;
        logger.log_message(&format!("最大深度: {}", options.max_depth))?;
        logger.log_message(&format!("搜索子目录: {}", options.recursive))?;
        logger.log_message(&format!("按类别分组: {}", options.categorize))?;
        let excluded: Vec<_> = options.exclude.iter().map(String::as_str).collect();
        logger.log_message(&format!("排除前缀: {}", excluded.join(", ")))?;
        logger.log_message(&format!("类别数: {}", catalog.len()))?;
    }

    let start_time = Instant::now();
    let scanner = Scanner::new(&catalog)?
        .with_logger(logger.clone())
        .with_error_logger(Arc::clone(&error_logger))
        .with_progress(!args.quiet && !args.json);
    let result = scanner.search(&root, &options)?;
    let duration = start_time.elapsed();

    if args.json {
        println!("{}", format_json(&result)?);
    } else {
        if !result.warnings().is_empty() {
            eprintln!("{}", format_warnings(result.warnings()));
        }

        if result.is_empty() {
            println!("{}", format_no_results(&root, &options));
        } else {
            println!("{}", format_results(&result, &format_options));
        }
        println!("\n用时: {}", format_duration(duration));
    }

    logger.finalize(
        result.scanned_files(),
        result.len() as u64,
        result.warnings().len() as u64,
        duration,
    )?;
    error_logger.finalize()?;
    if !args.json {
        error_logger.print_error_summary();
    }

    Ok(())
}
