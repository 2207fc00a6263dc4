//! 2단계 처리 파이프라인
//!
//! 후보마다 존재 확인 작업을 돌리고 전부 끝난 뒤에야 확인된 파일마다
//! 정규화 작업을 돌립니다. 두 단계 모두 크기가 정해진 rayon 스레드 풀에서
//! 실행되며, 작업 하나의 패닉은 그 작업의 결과 값으로 바뀝니다.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use crate::config::NormalizationOptions;
use crate::error::{EolError, Result};
use crate::normalizer::{normalize_file, ProcessResult};
use crate::report::{Reporter, Statistics};
use crate::resolver::{validate, FileTask};

/// 결과 채널 용량
const RESULT_CHANNEL_CAPACITY: usize = 1024;

/// 존재 확인 → 정규화 파이프라인
pub struct Pipeline {
    options: NormalizationOptions,
    pool: ThreadPool,
    progress: bool,
}

impl Pipeline {
    /// 새 파이프라인 생성
    ///
    /// # Arguments
    /// * `options` - 실행 동안 공유할 불변 옵션
    /// * `threads` - 작업 스레드 수 (None이면 CPU 코어 수)
    pub fn new(options: NormalizationOptions, threads: Option<usize>) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.unwrap_or(0))
            .thread_name(|i| format!("eolfix-worker-{}", i))
            .build()
            .map_err(|e| EolError::ThreadPoolError {
                reason: e.to_string(),
            })?;

        Ok(Self {
            options,
            pool,
            progress: false,
        })
    }

    /// 정규화 단계 진행률 바 표시 설정
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn options(&self) -> &NormalizationOptions {
        &self.options
    }

    /// 작업 스레드 수
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// 후보 목록 한 묶음을 처리
    ///
    /// 파일별 실패는 로그와 통계로만 남고 실행은 항상 끝까지 진행됩니다.
    pub fn run(&self, candidates: Vec<FileTask>) -> Statistics {
        self.run_stages(candidates, validate, normalize_file)
    }

    /// 단계별 작업을 직접 지정해 실행
    ///
    /// `validate`는 후보마다 정확히 한 번, `normalize`는 확인된 파일마다
    /// 정확히 한 번 호출됩니다. `normalize`는 모든 `validate` 호출이 끝난
    /// 뒤에만 시작합니다.
    pub fn run_stages<V, N>(&self, candidates: Vec<FileTask>, validate: V, normalize: N) -> Statistics
    where
        V: Fn(&FileTask) -> Option<PathBuf> + Sync,
        N: Fn(&Path, &NormalizationOptions) -> ProcessResult + Sync,
    {
        let stats = Statistics::new(candidates.len());
        if candidates.is_empty() {
            return stats;
        }

        let validated = self.validate_all(&candidates, &validate, &stats);
        if validated.is_empty() {
            return stats;
        }

        self.normalize_all(&validated, &normalize, &stats);
        stats
    }

    /// 1단계: 모든 존재 확인 작업이 끝날 때까지 기다림
    fn validate_all<V>(&self, candidates: &[FileTask], validate: &V, stats: &Statistics) -> Vec<PathBuf>
    where
        V: Fn(&FileTask) -> Option<PathBuf> + Sync,
    {
        let outcomes: Vec<std::result::Result<Option<PathBuf>, String>> = self.pool.install(|| {
            candidates
                .par_iter()
                .map(|task| isolate(|| validate(task)))
                .collect()
        });

        let reporter = Reporter::new(self.options.debug);
        let mut validated = Vec::with_capacity(outcomes.len());

        for (task, outcome) in candidates.iter().zip(outcomes) {
            match outcome {
                Ok(Some(file)) => validated.push(file),
                Ok(None) => stats.increment_excluded(),
                Err(message) => {
                    stats.increment_excluded();
                    reporter.report_crash(&task.resolve(), &message);
                }
            }
        }

        validated
    }

    /// 2단계: 결과를 채널로 받아 도착 순서대로 집계
    fn normalize_all<N>(&self, files: &[PathBuf], normalize: &N, stats: &Statistics)
    where
        N: Fn(&Path, &NormalizationOptions) -> ProcessResult + Sync,
    {
        let reporter = if self.progress {
            Reporter::with_progress(self.options.debug, files.len())
        } else {
            Reporter::new(self.options.debug)
        };

        let (tx, rx) = crossbeam_channel::bounded::<ProcessResult>(RESULT_CHANNEL_CAPACITY);
        let options = &self.options;
        let pool = &self.pool;

        std::thread::scope(|scope| {
            scope.spawn(move || {
                pool.install(|| {
                    files.par_iter().for_each_with(tx, |tx, file| {
                        let result = isolate(|| normalize(file.as_path(), options)).unwrap_or_else(|message| {
                            ProcessResult::failure(
                                file.clone(),
                                EolError::TaskPanicked {
                                    path: file.clone(),
                                    message,
                                },
                            )
                        });
                        // 수신 측은 모든 송신자가 끝날 때까지 살아 있음
                        let _ = tx.send(result);
                    });
                });
            });

            for result in rx.iter() {
                stats.record(result.status);
                reporter.report(&result);
            }
        });

        reporter.finish();
    }
}

/// 작업 하나를 패닉으로부터 격리
fn isolate<T>(task: impl FnOnce() -> T) -> std::result::Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(task)).map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "알 수 없는 패닉".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::Status;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn pipeline(threads: usize) -> Pipeline {
        Pipeline::new(NormalizationOptions::new(), Some(threads)).unwrap()
    }

    #[test]
    fn test_pool_is_bounded() {
        assert_eq!(pipeline(3).threads(), 3);
    }

    #[test]
    fn test_empty_run() {
        let stats = pipeline(2).run(Vec::new());
        assert_eq!(stats.total_candidates, 0);
        assert_eq!(stats.result_count(), 0);
    }

    #[test]
    fn test_missing_candidates_never_reach_normalization() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "a\r\n").unwrap();

        let normalized = AtomicUsize::new(0);
        let stats = pipeline(2).run_stages(
            vec![
                FileTask::new("a.txt", temp_dir.path()),
                FileTask::new("missing.txt", temp_dir.path()),
            ],
            validate,
            |file, options| {
                normalized.fetch_add(1, Ordering::SeqCst);
                normalize_file(file, options)
            },
        );

        assert_eq!(normalized.load(Ordering::SeqCst), 1);
        assert_eq!(stats.get_excluded_count(), 1);
        assert_eq!(stats.get_updated_count(), 1);
    }

    #[test]
    fn test_validation_panic_is_excluded() {
        let stats = pipeline(2).run_stages(
            vec![FileTask::new("/boom", "/"), FileTask::new("/fine", "/")],
            |task| {
                if task.path.ends_with("boom") {
                    panic!("validator crashed");
                }
                Some(task.resolve())
            },
            |file, _| ProcessResult::ignored(file.to_path_buf()),
        );

        assert_eq!(stats.get_excluded_count(), 1);
        assert_eq!(stats.get_ignored_count(), 1);
    }

    #[test]
    fn test_normalization_panic_becomes_error_result() {
        let stats = pipeline(2).run_stages(
            (0..4).map(|i| FileTask::new(format!("/f{}", i), "/")).collect(),
            |task| Some(task.resolve()),
            |file, _| {
                if file.ends_with("f2") {
                    panic!("normalizer crashed");
                }
                ProcessResult::updated(file.to_path_buf())
            },
        );

        assert_eq!(stats.result_count(), 4);
        assert_eq!(stats.get_updated_count(), 3);
        assert_eq!(stats.get_error_count(), 1);
    }

    #[test]
    fn test_panic_message() {
        let err = isolate::<()>(|| panic!("plain")).unwrap_err();
        assert_eq!(err, "plain");
        let err = isolate::<()>(|| panic!("{}-{}", "fmt", 1)).unwrap_err();
        assert_eq!(err, "fmt-1");
        assert_eq!(isolate(|| Status::Ignored).unwrap(), Status::Ignored);
    }
}
