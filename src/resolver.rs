//! 경로 해석 및 존재 확인 모듈

use std::path::{Component, Path, PathBuf};

/// 존재 확인 대상 후보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    /// 후보 경로 (상대 또는 절대)
    pub path: PathBuf,
    /// `path`가 상대 경로일 때만 쓰이는 기준 폴더
    pub base_dir: PathBuf,
}

impl FileTask {
    pub fn new(path: impl Into<PathBuf>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            base_dir: base_dir.into(),
        }
    }

    /// 정규화된 절대 경로
    pub fn resolve(&self) -> PathBuf {
        resolve_path(&self.path, &self.base_dir)
    }
}

/// 후보 경로를 기준 폴더에 붙이고 `.`/`..`을 정리
///
/// 파일 시스템에 접근하지 않는 순수한 문자열 수준 정규화입니다.
///
/// # Examples
/// ```
/// use eolfix::resolver::resolve_path;
/// use std::path::{Path, PathBuf};
///
/// let p = resolve_path(Path::new("./lib/../dist/a.js"), Path::new("/project"));
/// assert_eq!(p, PathBuf::from("/project/dist/a.js"));
/// ```
pub fn resolve_path(path: &Path, base_dir: &Path) -> PathBuf {
    let joined;
    let path = if path.is_absolute() {
        path
    } else {
        joined = base_dir.join(path);
        joined.as_path()
    };
    normalize_lexically(path)
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// 후보가 존재하면 정규화된 절대 경로를 반환
///
/// 한 번만 확인하며 재시도하지 않습니다. 확인 시점 이후의 변경은 보장하지 않습니다.
pub fn validate(task: &FileTask) -> Option<PathBuf> {
    let resolved = task.resolve();
    resolved.exists().then_some(resolved)
}
