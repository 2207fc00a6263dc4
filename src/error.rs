//! 에러 타입 정의 모듈
//!
//! eolfix에서 발생할 수 있는 모든 에러 타입을 정의합니다.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// eolfix에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum EolError {
    /// 파일 읽기 실패
    #[error("파일을 읽을 수 없습니다 ({path}): {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 파일 쓰기 실패
    #[error("파일 쓰기 실패 ({path}): {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 작업 스레드에서 패닉 발생
    #[error("작업이 비정상 종료되었습니다 ({path}): {message}")]
    TaskPanicked { path: PathBuf, message: String },

    /// 유효하지 않은 패턴
    #[error("유효하지 않은 패턴: {pattern}")]
    InvalidPattern { pattern: String },

    /// 지원하지 않는 인코딩
    #[error("지원하지 않는 인코딩: {name}")]
    InvalidEncoding { name: String },

    /// 해석할 수 없는 줄바꿈 값
    #[error("유효하지 않은 줄바꿈 값: {value:?}")]
    InvalidEol { value: String },

    /// 설정 파일 읽기 실패
    #[error("설정 파일을 열 수 없습니다 ({path}): {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 설정 파일 파싱 실패
    #[error("설정 파일 파싱 실패 ({path}): {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    /// 스레드 풀 초기화 실패
    #[error("스레드 풀 초기화 실패: {reason}")]
    ThreadPoolError { reason: String },

    /// 글로브 확장 실패
    #[error("글로브 확장 실패 ({pattern}): {reason}")]
    GlobFailed { pattern: String, reason: String },
}

impl EolError {
    /// 원인이 된 I/O 에러 (읽기/쓰기 실패일 때만)
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            EolError::ReadFailed { source, .. } | EolError::WriteFailed { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

/// eolfix 결과 타입 별칭
pub type Result<T> = std::result::Result<T, EolError>;
