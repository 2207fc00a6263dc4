//! eolfix - EOL NORMALIZER
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};

use eolfix::{
    cli::Args,
    config::EolConfig,
    hooks::EolPlugin,
    sources::{list_output_dir, OutputTarget},
};

fn main() -> Result<()> {
    let args = Args::parse();

    let cwd = std::env::current_dir().context("현재 작업 폴더를 확인할 수 없습니다")?;

    // 기본값 ← 설정 파일 ← 명령줄 인자
    let config = load_config(&args)?;

    if config.debug {
        print_header(&args, &config);
    }

    let plugin = EolPlugin::new(config, args.hook, args.threads, cwd.clone())
        .context("플러그인 초기화 실패")?
        .with_progress(args.progress);

    // 산출물 위치가 없으면 산출물 출처는 빈 목록으로 실행
    let target = args
        .output_target()
        .unwrap_or_else(|| OutputTarget::Dir(cwd.clone()));
    let bundle = collect_bundle_files(&args, &target, &cwd);

    // 한 번의 빌드 주기: 산출물 기록 → 주기 종료
    plugin.write_bundle(&target, &bundle, &args.watch);
    plugin.close_bundle(&args.watch);

    Ok(())
}

/// 설정 파일과 명령줄 인자를 병합
fn load_config(args: &Args) -> Result<EolConfig> {
    let base = match &args.config {
        Some(path) => EolConfig::load(path)?,
        None => EolConfig::default(),
    };
    args.merge_into(base)
        .context("명령줄 인자를 해석할 수 없습니다")
}

/// 산출물 이름 목록 (명시되지 않으면 출력 폴더 전체)
fn collect_bundle_files(args: &Args, target: &OutputTarget, cwd: &Path) -> Vec<String> {
    if !args.bundle.is_empty() {
        return args.bundle.clone();
    }
    if args.output_target().is_none() {
        return Vec::new();
    }

    let dir: PathBuf = eolfix::resolve_path(&target.dir(), cwd);
    match target {
        OutputTarget::Dir(_) => list_output_dir(&dir),
        OutputTarget::File(file) => file
            .file_name()
            .map(|name| vec![name.to_string_lossy().into_owned()])
            .unwrap_or_default(),
    }
}

/// 헤더 출력
fn print_header(args: &Args, config: &EolConfig) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!("{}", " 🚀 EOL NORMALIZER".bright_white().bold());
    println!("{}", "═".repeat(50).bright_blue());

    if let Some(target) = args.output_target() {
        println!("  {} 출력 위치: {:?}", "📂".bright_cyan(), target.dir());
    }
    println!("  {} 줄바꿈: {:?}", "⚙️".bright_yellow(), config.eol);
    println!("  {} 인코딩: {}", "📄".bright_green(), config.encoding);
    println!("  {} 훅 모드: {}", "🪝".bright_magenta(), args.hook);

    if let Some(pattern) = &config.glob_pattern {
        println!("  {} 글로브: {}", "🔍".bright_magenta(), pattern);
    }
    if !config.include.is_empty() {
        println!("  {} include: {}", "✅".bright_green(), config.include.join(", "));
    }
    if !config.exclude.is_empty() {
        println!("  {} exclude: {}", "🚫".bright_red(), config.exclude.join(", "));
    }

    println!("{}", "═".repeat(50).bright_blue());
}
