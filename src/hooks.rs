//! 빌드 수명 주기 훅
//!
//! 산출물 기록 직후(`write_bundle`)와 빌드/감시 주기 종료 시(`close_bundle`)에
//! 출처별로 독립된 파이프라인 실행을 돌립니다. 훅은 어떤 경우에도 실패하지
//! 않으며 출처 단위 오류는 로그로만 남깁니다.

use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::cli::HookMode;
use crate::config::EolConfig;
use crate::error::Result;
use crate::filter::PathFilter;
use crate::pipeline::Pipeline;
use crate::report::Statistics;
use crate::resolver::FileTask;
use crate::sources::{glob_candidates, output_candidates, watch_candidates, OutputTarget, Source};

/// 줄바꿈 정규화 플러그인
pub struct EolPlugin {
    config: EolConfig,
    filter: PathFilter,
    pipeline: Pipeline,
    mode: HookMode,
    cwd: PathBuf,
}

impl EolPlugin {
    /// 설정으로 플러그인 생성
    ///
    /// # Arguments
    /// * `config` - 병합이 끝난 설정
    /// * `mode` - 출처를 어느 훅에서 처리할지
    /// * `threads` - 작업 스레드 수 (None이면 CPU 코어 수)
    /// * `cwd` - 상대 경로와 상대 패턴의 기준 폴더
    pub fn new(
        config: EolConfig,
        mode: HookMode,
        threads: Option<usize>,
        cwd: PathBuf,
    ) -> Result<Self> {
        let filter = PathFilter::new(&config.include, &config.exclude, &cwd)?;
        let pipeline = Pipeline::new(config.normalization_options(), threads)?;
        Ok(Self {
            config,
            filter,
            pipeline,
            mode,
            cwd,
        })
    }

    /// 정규화 단계 진행률 바 표시 설정
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.pipeline = self.pipeline.with_progress(progress);
        self
    }

    pub fn config(&self) -> &EolConfig {
        &self.config
    }

    /// 산출물 기록 직후 호출
    ///
    /// `OutputOnly` 모드에서는 감시 파일과 글로브 매칭도 여기서 처리합니다.
    pub fn write_bundle(
        &self,
        target: &OutputTarget,
        bundle_files: &[String],
        watch_files: &[PathBuf],
    ) -> Vec<(Source, Statistics)> {
        let mut runs = Vec::new();

        if self.config.output_files {
            let candidates = output_candidates(target, bundle_files, &self.filter, &self.cwd);
            runs.push(self.run_source(Source::Output, candidates));
        }

        if self.mode == HookMode::OutputOnly {
            runs.extend(self.process_watch_and_glob(watch_files));
        }

        runs
    }

    /// 빌드/감시 주기 종료 시 호출
    pub fn close_bundle(&self, watch_files: &[PathBuf]) -> Vec<(Source, Statistics)> {
        match self.mode {
            HookMode::Split => self.process_watch_and_glob(watch_files),
            HookMode::OutputOnly => Vec::new(),
        }
    }

    fn process_watch_and_glob(&self, watch_files: &[PathBuf]) -> Vec<(Source, Statistics)> {
        let mut runs = Vec::new();

        if self.config.watch_files {
            let candidates = watch_candidates(watch_files, &self.filter, &self.cwd);
            runs.push(self.run_source(Source::Watch, candidates));
        }

        if let Some(pattern) = &self.config.glob_pattern {
            match glob_candidates(
                pattern,
                &self.config.glob_pattern_options,
                &self.filter,
                &self.cwd,
            ) {
                Ok(candidates) => runs.push(self.run_source(Source::Glob, candidates)),
                Err(e) => println!("{}", format!("EOL {}: {}", Source::Glob, e).red().bold()),
            }
        }

        runs
    }

    fn run_source(&self, source: Source, candidates: Vec<FileTask>) -> (Source, Statistics) {
        let stats = self.pipeline.run(candidates);
        if self.config.debug {
            stats.print_summary(&source.to_string());
        }
        (source, stats)
    }

    /// 상대 경로 기준 폴더
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }
}
