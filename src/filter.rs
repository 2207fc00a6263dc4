//! 경로 필터 모듈
//!
//! include/exclude glob 패턴으로 후보 경로를 거릅니다.

use glob::{MatchOptions, Pattern};
use std::path::Path;

use crate::error::{EolError, Result};
use crate::resolver::resolve_path;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// 컴파일된 include/exclude 필터
#[derive(Debug, Default)]
pub struct PathFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl PathFilter {
    /// 새 필터 생성
    ///
    /// # Arguments
    /// * `include` - 통과시킬 패턴 목록 (비어 있으면 모든 경로 통과)
    /// * `exclude` - 걸러낼 패턴 목록
    /// * `base` - 상대 패턴과 상대 경로의 기준 폴더
    ///
    /// 절대 경로 패턴과 `**`로 시작하는 패턴은 그대로 사용합니다.
    ///
    /// # Examples
    /// ```
    /// use eolfix::filter::PathFilter;
    /// use std::path::Path;
    ///
    /// let filter = PathFilter::new(
    ///     &["src/**/*.js".to_string()],
    ///     &["**/*.min.js".to_string()],
    ///     Path::new("/project"),
    /// )
    /// .unwrap();
    /// assert!(filter.matches(Path::new("/project/src/app.js")));
    /// assert!(!filter.matches(Path::new("/project/src/app.min.js")));
    /// assert!(!filter.matches(Path::new("/project/lib/app.js")));
    /// ```
    pub fn new(include: &[String], exclude: &[String], base: &Path) -> Result<Self> {
        Ok(Self {
            include: compile_all(include, base)?,
            exclude: compile_all(exclude, base)?,
        })
    }

    /// 경로가 필터를 통과하는지 확인
    pub fn matches(&self, path: &Path) -> bool {
        let id = path.to_string_lossy();
        if id.contains('\0') {
            return false;
        }
        let id = to_slash(&id);

        if self.exclude.iter().any(|p| p.matches_with(&id, MATCH_OPTIONS)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|p| p.matches_with(&id, MATCH_OPTIONS))
    }

    /// 기준 폴더를 적용해 경로를 절대 경로로 맞춘 뒤 필터링
    pub fn matches_from(&self, path: &Path, base: &Path) -> bool {
        self.matches(&resolve_path(path, base))
    }

    /// 패턴이 하나라도 설정되어 있는지 확인
    pub fn has_patterns(&self) -> bool {
        !self.include.is_empty() || !self.exclude.is_empty()
    }
}

fn compile_all(patterns: &[String], base: &Path) -> Result<Vec<Pattern>> {
    patterns.iter().map(|p| compile(p, base)).collect()
}

fn compile(pattern: &str, base: &Path) -> Result<Pattern> {
    let pattern = to_slash(pattern);
    let full = if pattern.starts_with("**") || Path::new(&pattern).is_absolute() {
        pattern.clone()
    } else {
        let base = to_slash(&base.to_string_lossy());
        let relative = pattern.trim_start_matches("./");
        format!("{}/{}", Pattern::escape(base.trim_end_matches('/')), relative)
    };

    Pattern::new(&full).map_err(|_| EolError::InvalidPattern { pattern })
}

fn to_slash(s: &str) -> String {
    s.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(include: &[&str], exclude: &[&str]) -> PathFilter {
        let include: Vec<String> = include.iter().map(|s| s.to_string()).collect();
        let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
        PathFilter::new(&include, &exclude, Path::new("/work")).unwrap()
    }

    #[test]
    fn test_empty_filter_accepts_everything() {
        let f = filter(&[], &[]);
        assert!(f.matches(Path::new("/work/a.js")));
        assert!(f.matches(Path::new("/elsewhere/.hidden/b.css")));
        assert!(!f.has_patterns());
    }

    #[test]
    fn test_relative_include_is_anchored_to_base() {
        let f = filter(&["dist/*.js"], &[]);
        assert!(f.matches(Path::new("/work/dist/main.js")));
        assert!(!f.matches(Path::new("/work/dist/nested/main.js")));
        assert!(!f.matches(Path::new("/other/dist/main.js")));
    }

    #[test]
    fn test_double_star_pattern_is_unanchored() {
        let f = filter(&["**/*.css"], &[]);
        assert!(f.matches(Path::new("/anywhere/style.css")));
        assert!(!f.matches(Path::new("/anywhere/style.js")));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let f = filter(&["**/*.js"], &["**/vendor/**"]);
        assert!(f.matches(Path::new("/work/src/a.js")));
        assert!(!f.matches(Path::new("/work/vendor/lib/a.js")));
    }

    #[test]
    fn test_matches_from_resolves_relative_paths() {
        let f = filter(&["src/*.js"], &[]);
        assert!(f.matches_from(Path::new("src/a.js"), Path::new("/work")));
        assert!(f.matches_from(Path::new("./lib/../src/a.js"), Path::new("/work")));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = PathFilter::new(&["[invalid".to_string()], &[], Path::new("/work"));
        assert!(matches!(result, Err(EolError::InvalidPattern { .. })));
    }
}
