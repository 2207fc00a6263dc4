//! 후보 경로 수집 모듈
//!
//! 빌드 산출물, 감시 파일, 글로브 매칭의 세 출처에서 후보를 모읍니다.
//! 출처 사이의 중복은 제거하지 않습니다.

use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::GlobOptions;
use crate::error::{EolError, Result};
use crate::filter::PathFilter;
use crate::resolver::{resolve_path, FileTask};

/// 후보 출처
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Output,
    Watch,
    Glob,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Output => write!(f, "output"),
            Source::Watch => write!(f, "watch"),
            Source::Glob => write!(f, "glob"),
        }
    }
}

/// 빌드 산출물 위치
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// 출력 폴더
    Dir(PathBuf),
    /// 단일 출력 파일 (부모 폴더가 출력 폴더)
    File(PathBuf),
}

impl OutputTarget {
    /// 산출물 이름의 기준이 되는 폴더
    pub fn dir(&self) -> PathBuf {
        match self {
            OutputTarget::Dir(dir) => dir.clone(),
            OutputTarget::File(file) => file
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }
}

/// 산출물 이름들을 출력 폴더 기준 후보로 변환
///
/// # Arguments
/// * `target` - 출력 위치
/// * `bundle_files` - 기록된 산출물 이름 (출력 폴더 기준 상대 또는 절대)
/// * `filter` - include/exclude 필터
/// * `cwd` - 출력 폴더가 상대 경로일 때의 기준
pub fn output_candidates(
    target: &OutputTarget,
    bundle_files: &[String],
    filter: &PathFilter,
    cwd: &Path,
) -> Vec<FileTask> {
    let output_dir = resolve_path(&target.dir(), cwd);

    bundle_files
        .iter()
        .map(|name| resolve_path(Path::new(name), &output_dir))
        .filter(|file| filter.matches(file))
        .map(|file| FileTask::new(file, &output_dir))
        .collect()
}

/// 출력 폴더 아래 파일 이름 목록 (출력 폴더 기준 상대 경로)
pub fn list_output_dir(dir: &Path) -> Vec<String> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            e.path()
                .strip_prefix(dir)
                .ok()
                .map(|p| p.to_string_lossy().replace('\\', "/"))
        })
        .collect()
}

/// 감시 중인 파일들을 후보로 변환
pub fn watch_candidates(watch_files: &[PathBuf], filter: &PathFilter, cwd: &Path) -> Vec<FileTask> {
    watch_files
        .iter()
        .filter(|file| filter.matches_from(file, cwd))
        .map(|file| FileTask::new(file, cwd))
        .collect()
}

/// 글로브 패턴을 확장해 후보로 변환
///
/// `options.cwd`(기본값: `cwd`) 기준으로 확장하며 `ignore` 패턴은
/// 그 폴더 기준 상대 경로에 매칭합니다.
pub fn glob_candidates(
    pattern: &str,
    options: &GlobOptions,
    filter: &PathFilter,
    cwd: &Path,
) -> Result<Vec<FileTask>> {
    let root = match &options.cwd {
        Some(dir) => resolve_path(dir, cwd),
        None => cwd.to_path_buf(),
    };

    let ignore = options
        .ignore
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|_| EolError::InvalidPattern {
                pattern: p.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let match_options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: !options.dot,
    };

    let full_pattern = if Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        let base = Pattern::escape(&root.to_string_lossy().replace('\\', "/"));
        format!("{}/{}", base.trim_end_matches('/'), pattern.trim_start_matches("./"))
    };

    let entries = glob::glob_with(&full_pattern, match_options).map_err(|e| EolError::GlobFailed {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let files = entries
        .filter_map(|e| e.ok())
        .filter(|path| !path.is_dir())
        .filter(|path| {
            let relative = path.strip_prefix(&root).unwrap_or(path);
            let relative = relative.to_string_lossy().replace('\\', "/");
            !ignore.iter().any(|p| p.matches_with(&relative, match_options))
        })
        .filter(|path| filter.matches(path))
        .map(|path| FileTask::new(path, &root))
        .collect();

    Ok(files)
}
