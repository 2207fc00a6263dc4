//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 설정 병합을 담당합니다.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{parse_eol, EolConfig};
use crate::error::Result;
use crate::sources::OutputTarget;

/// 출처를 어느 훅에서 처리할지
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum HookMode {
    /// 산출물은 기록 직후, 감시 파일/글로브는 주기 종료 시
    #[default]
    Split,
    /// 모든 출처를 산출물 기록 직후에 처리
    OutputOnly,
}

impl std::fmt::Display for HookMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookMode::Split => write!(f, "Split"),
            HookMode::OutputOnly => write!(f, "OutputOnly"),
        }
    }
}

/// eolfix CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "eolfix",
    author = "YourName <your@email.com>",
    version,
    about = "EOL NORMALIZER - 빌드 산출물/감시 파일/글로브 매칭 파일의 줄바꿈 문자를 통일하는 CLI 도구",
    long_about = r#"
EOL NORMALIZER
==============

빌드 산출물, 감시 중인 파일, 글로브 패턴에 매칭된 파일의
줄바꿈 문자(CRLF/CR/LF)를 하나로 통일합니다.
내용이 실제로 바뀌는 파일만 다시 씁니다.

특징:
  • 존재 확인 → 정규화의 2단계 병렬 처리
  • 파일별 실패가 다른 파일에 영향을 주지 않음
  • JSON 설정 파일 + 명령줄 인자 병합
  • include/exclude 글로브 필터

예제:
  eolfix -o dist
  eolfix -o dist --eol crlf --debug
  eolfix --no-output-files --glob "src/**/*.js"
  eolfix --output-file dist/bundle.js -b bundle.js -b bundle.css
  eolfix -c eol.json --watch-files -w src/a.js -w src/b.js
"#
)]
pub struct Args {
    /// JSON 설정 파일 경로
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 빌드 출력 폴더
    #[arg(short = 'o', long, conflicts_with = "output_file")]
    pub output_dir: Option<PathBuf>,

    /// 단일 빌드 출력 파일 (부모 폴더가 출력 폴더)
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// 기록된 산출물 이름 (없으면 출력 폴더 전체)
    #[arg(short, long)]
    pub bundle: Vec<String>,

    /// 빌드 산출물 처리 끄기
    #[arg(long)]
    pub no_output_files: bool,

    /// 감시 파일 처리 켜기
    #[arg(long)]
    pub watch_files: bool,

    /// 감시 중인 파일 경로
    #[arg(short, long)]
    pub watch: Vec<PathBuf>,

    /// 글로브 패턴 (예: "src/**/*.js")
    #[arg(short, long)]
    pub glob: Option<String>,

    /// 글로브 결과에서 제외할 패턴 (기본값: node_modules/**)
    #[arg(long)]
    pub glob_ignore: Vec<String>,

    /// 글로브 기준 폴더
    #[arg(long)]
    pub glob_cwd: Option<PathBuf>,

    /// 글로브가 `.`으로 시작하는 항목도 매칭
    #[arg(long)]
    pub dot: bool,

    /// 통과시킬 경로 패턴
    #[arg(short, long)]
    pub include: Vec<String>,

    /// 걸러낼 경로 패턴
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// 목표 줄바꿈 (lf, crlf, cr, none)
    #[arg(long)]
    pub eol: Option<String>,

    /// 쓰기 인코딩 (utf8, utf16le, latin1, ascii)
    #[arg(long)]
    pub encoding: Option<String>,

    /// 변경 없는 파일도 출력하고 실행 통계 표시
    #[arg(short, long)]
    pub debug: bool,

    /// 정규화 단계 진행률 바 표시
    #[arg(long)]
    pub progress: bool,

    /// 병렬 처리 스레드 수 (기본값: CPU 코어 수)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// 훅 모드
    #[arg(long, value_enum, default_value_t = HookMode::Split)]
    pub hook: HookMode,
}

impl Args {
    /// 설정 위에 명령줄 인자를 덮어씀
    ///
    /// 지정된 인자만 덮어쓰고 나머지는 설정값을 유지합니다.
    pub fn merge_into(&self, mut config: EolConfig) -> Result<EolConfig> {
        if let Some(eol) = &self.eol {
            config.eol = parse_eol(eol)?;
        }
        if let Some(encoding) = &self.encoding {
            config.encoding = encoding.parse()?;
        }
        if self.debug {
            config.debug = true;
        }
        if self.no_output_files {
            config.output_files = false;
        }
        if self.watch_files {
            config.watch_files = true;
        }
        if let Some(glob) = &self.glob {
            config.glob_pattern = (!glob.is_empty()).then(|| glob.clone());
        }
        if !self.glob_ignore.is_empty() {
            config.glob_pattern_options.ignore = self.glob_ignore.clone();
        }
        if let Some(cwd) = &self.glob_cwd {
            config.glob_pattern_options.cwd = Some(cwd.clone());
        }
        if self.dot {
            config.glob_pattern_options.dot = true;
        }
        config.include.extend(self.include.iter().cloned());
        config.exclude.extend(self.exclude.iter().cloned());

        Ok(config)
    }

    /// 빌드 출력 위치
    pub fn output_target(&self) -> Option<OutputTarget> {
        match (&self.output_dir, &self.output_file) {
            (Some(dir), _) => Some(OutputTarget::Dir(dir.clone())),
            (None, Some(file)) => Some(OutputTarget::File(file.clone())),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Encoding;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["eolfix"]).unwrap();
        assert_eq!(args.hook, HookMode::Split);
        assert!(args.output_target().is_none());

        let config = args.merge_into(EolConfig::default()).unwrap();
        assert_eq!(config, EolConfig::default());
    }

    #[test]
    fn test_args_override_config() {
        let args = Args::try_parse_from([
            "eolfix",
            "--eol",
            "crlf",
            "--encoding",
            "latin1",
            "--no-output-files",
            "--watch-files",
            "--glob",
            "src/**/*.js",
            "--glob-ignore",
            "dist/**",
            "-e",
            "**/*.min.js",
        ])
        .unwrap();

        let base = EolConfig {
            exclude: vec!["vendor/**".to_string()],
            ..Default::default()
        };
        let config = args.merge_into(base).unwrap();

        assert_eq!(config.eol, "\r\n");
        assert_eq!(config.encoding, Encoding::Latin1);
        assert!(!config.output_files);
        assert!(config.watch_files);
        assert_eq!(config.glob_pattern.as_deref(), Some("src/**/*.js"));
        assert_eq!(config.glob_pattern_options.ignore, vec!["dist/**"]);
        assert_eq!(config.exclude, vec!["vendor/**", "**/*.min.js"]);
    }

    #[test]
    fn test_invalid_eol_rejected() {
        let args = Args::try_parse_from(["eolfix", "--eol", "<br>"]).unwrap();
        assert!(args.merge_into(EolConfig::default()).is_err());
    }

    #[test]
    fn test_output_target() {
        let args = Args::try_parse_from(["eolfix", "--output-file", "dist/app.js"]).unwrap();
        assert_eq!(
            args.output_target(),
            Some(OutputTarget::File(PathBuf::from("dist/app.js")))
        );

        assert!(Args::try_parse_from(["eolfix", "-o", "dist", "--output-file", "x.js"]).is_err());
    }

    #[test]
    fn test_hook_mode_value() {
        let args = Args::try_parse_from(["eolfix", "--hook", "output-only"]).unwrap();
        assert_eq!(args.hook, HookMode::OutputOnly);
        assert_eq!(args.hook.to_string(), "OutputOnly");
    }
}
