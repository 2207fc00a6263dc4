//! eolfix - EOL NORMALIZER
//!
//! 빌드 산출물, 감시 파일, 글로브 매칭 파일의 줄바꿈 문자를 하나로 통일하는 CLI 도구입니다.
//!
//! # 주요 기능
//!
//! - 🚀 **2단계 병렬 처리**: 존재 확인을 모두 마친 뒤에 정규화를 시작하는 rayon 스레드 풀
//! - 🛡️ **실패 격리**: 파일 하나의 읽기/쓰기 실패나 패닉이 다른 파일에 영향을 주지 않음
//! - 💾 **변경 시에만 쓰기**: 내용이 같으면 파일을 건드리지 않아 반복 실행해도 결과가 같음
//! - 🔍 **패턴 필터링**: include/exclude glob 필터와 글로브 확장
//! - ⚙️ **설정 병합**: 기본값 ← JSON 설정 파일 ← 명령줄 인자
//! - 🎨 **컬러 출력**: `EOL updated: <경로>` 형식의 결과 로그
//!
//! # 예제
//!
//! ```bash
//! # 출력 폴더 전체를 LF로
//! eolfix -o dist
//!
//! # CRLF로, 변경 없는 파일도 출력
//! eolfix -o dist --eol crlf --debug
//!
//! # 글로브 매칭 파일만
//! eolfix --no-output-files --glob "src/**/*.js"
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod hooks;
pub mod normalizer;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod sources;

// Re-exports for convenient access
pub use cli::{Args, HookMode};
pub use config::{EolConfig, Encoding, GlobOptions, NormalizationOptions};
pub use error::{EolError, Result};
pub use filter::PathFilter;
pub use hooks::EolPlugin;
pub use normalizer::{normalize_eol, normalize_file, ProcessResult, Status};
pub use pipeline::Pipeline;
pub use report::Statistics;
pub use resolver::{resolve_path, validate, FileTask};
pub use sources::{OutputTarget, Source};
