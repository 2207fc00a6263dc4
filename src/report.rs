//! 통계 및 로그 출력 모듈
//!
//! 파일별 결과 로그와 실행 통계 수집/출력을 담당합니다.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::normalizer::{ProcessResult, Status};

/// 실행 통계 구조체
#[derive(Debug, Default)]
pub struct Statistics {
    /// 후보 수
    pub total_candidates: usize,
    /// 존재 확인에서 제외된 수
    pub excluded_count: AtomicUsize,
    /// 갱신된 파일 수
    pub updated_count: AtomicUsize,
    /// 변경 없는 파일 수
    pub ignored_count: AtomicUsize,
    /// 실패 수
    pub error_count: AtomicUsize,
    /// 처리 시작 시간
    start_time: Option<Instant>,
}

impl Statistics {
    /// 새 통계 인스턴스 생성
    pub fn new(total_candidates: usize) -> Self {
        Self {
            total_candidates,
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// 제외 카운트 증가
    pub fn increment_excluded(&self) {
        self.excluded_count.fetch_add(1, Ordering::Relaxed);
    }

    /// 결과 상태에 맞는 카운트 증가
    pub fn record(&self, status: Status) {
        let counter = match status {
            Status::Updated => &self.updated_count,
            Status::Ignored => &self.ignored_count,
            Status::Error => &self.error_count,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_excluded_count(&self) -> usize {
        self.excluded_count.load(Ordering::Relaxed)
    }

    pub fn get_updated_count(&self) -> usize {
        self.updated_count.load(Ordering::Relaxed)
    }

    pub fn get_ignored_count(&self) -> usize {
        self.ignored_count.load(Ordering::Relaxed)
    }

    pub fn get_error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// 정규화 단계에서 나온 결과 수
    pub fn result_count(&self) -> usize {
        self.get_updated_count() + self.get_ignored_count() + self.get_error_count()
    }

    /// 경과 시간 반환
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// 실행 통계 요약 출력
    pub fn print_summary(&self, source: &str) {
        let errors = self.get_error_count();

        println!("{}", "─".repeat(50).bright_blue());
        println!("{}", format!(" EOL {}", source).bright_white().bold());
        println!("  후보:      {}", self.total_candidates);
        println!("  제외:      {}", self.get_excluded_count());
        println!(
            "  갱신:      {}",
            self.get_updated_count().to_string().yellow()
        );
        println!("  변경 없음: {}", self.get_ignored_count());
        if errors > 0 {
            println!("  실패:      {}", errors.to_string().red());
        } else {
            println!("  실패:      {}", "0".green());
        }
        println!("  처리 시간: {}", format_duration(self.elapsed()));
        println!("{}", "─".repeat(50).bright_blue());
    }
}

/// 결과 로그 한 줄 (색상 없음)
///
/// 디버그가 아니면 변경 없는 파일은 기록하지 않습니다.
///
/// # Examples
/// ```
/// use eolfix::normalizer::ProcessResult;
/// use eolfix::report::log_message;
/// use std::path::PathBuf;
///
/// let result = ProcessResult::updated(PathBuf::from("/dist/a.js"));
/// assert_eq!(log_message(&result, false).unwrap(), "EOL updated: /dist/a.js");
/// assert!(log_message(&ProcessResult::ignored(PathBuf::from("/b.js")), false).is_none());
/// ```
pub fn log_message(result: &ProcessResult, debug: bool) -> Option<String> {
    if result.status == Status::Ignored && !debug {
        return None;
    }
    Some(format!("EOL {}: {}", result.status, display_path(&result.file)))
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// 결과를 터미널에 출력하는 리포터
///
/// 진행률 바가 있으면 바를 깨지 않도록 바를 통해 출력합니다.
#[derive(Default)]
pub struct Reporter {
    debug: bool,
    progress: Option<ProgressBar>,
}

impl Reporter {
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            progress: None,
        }
    }

    /// 진행률 바를 붙인 리포터
    pub fn with_progress(debug: bool, total: usize) -> Self {
        Self {
            debug,
            progress: Some(create_progress_bar(total)),
        }
    }

    /// 정규화 결과 한 건 출력
    pub fn report(&self, result: &ProcessResult) {
        if let Some(pb) = &self.progress {
            pb.inc(1);
        }

        let Some(message) = log_message(result, self.debug) else {
            return;
        };

        if result.status == Status::Error {
            self.emit(message.red().bold().to_string());
            if self.debug {
                if let Some(error) = &result.error {
                    self.emit(format!("    {}", error.to_string().dimmed()));
                }
            }
        } else {
            self.emit(message.yellow().bold().to_string());
        }
    }

    /// 존재 확인 작업의 비정상 종료 출력
    pub fn report_crash(&self, path: &Path, message: &str) {
        self.emit(
            format!("EOL error: {}", display_path(path))
                .red()
                .bold()
                .to_string(),
        );
        self.emit(format!("    {}", message.dimmed()));
    }

    /// 진행률 바 마무리
    pub fn finish(&self) {
        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }
    }

    fn emit(&self, line: String) {
        match &self.progress {
            Some(pb) => pb.println(line),
            None => println!("{}", line),
        }
    }
}

/// 진행률 바 생성
fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░");
    pb.set_style(style);
    pb
}

/// 경과 시간을 읽기 쉬운 형식으로 변환
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}시간 {}분", hours, mins)
    } else if secs >= 60 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        format!("{}분 {}초", mins, remaining_secs)
    } else if secs > 0 {
        format!("{}.{:03}초", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}
