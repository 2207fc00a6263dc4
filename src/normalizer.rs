//! 줄바꿈 정규화 모듈
//!
//! 개별 파일의 읽기, 줄바꿈 변환, 변경 시 쓰기를 담당합니다.

use memmap2::Mmap;
use std::borrow::Cow;
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{Encoding, NormalizationOptions};
use crate::error::EolError;

/// 대용량 파일 임계값 (이상이면 메모리 매핑 사용)
pub const MMAP_THRESHOLD: u64 = 10 * 1024 * 1024;

/// 파일 처리 최종 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// 내용이 바뀌어 다시 썼음
    Updated,
    /// 바뀐 내용이 없어 쓰지 않았음
    Ignored,
    /// 읽기 또는 쓰기 실패
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Updated => write!(f, "updated"),
            Status::Ignored => write!(f, "ignored"),
            Status::Error => write!(f, "error"),
        }
    }
}

/// 파일 처리 결과
#[derive(Debug)]
pub struct ProcessResult {
    /// 처리된 파일 경로
    pub file: PathBuf,
    /// 최종 상태
    pub status: Status,
    /// 에러 정보 (실패 시)
    pub error: Option<EolError>,
}

impl ProcessResult {
    /// 갱신 결과 생성
    pub fn updated(file: PathBuf) -> Self {
        Self {
            file,
            status: Status::Updated,
            error: None,
        }
    }

    /// 변경 없음 결과 생성
    pub fn ignored(file: PathBuf) -> Self {
        Self {
            file,
            status: Status::Ignored,
            error: None,
        }
    }

    /// 실패 결과 생성
    pub fn failure(file: PathBuf, error: EolError) -> Self {
        Self {
            file,
            status: Status::Error,
            error: Some(error),
        }
    }
}

/// 모든 줄바꿈(CRLF, CR, LF)을 `eol`로 치환
///
/// 왼쪽부터 훑으며 CRLF를 CR보다 먼저 매칭합니다. 결과가 입력과 같으면
/// 빌려온 값을 그대로 돌려줍니다. `eol`이 비어 있으면 변환하지 않습니다.
///
/// # Examples
/// ```
/// use eolfix::normalizer::normalize_eol;
///
/// assert_eq!(normalize_eol("a\r\nb\rc\n", "\n"), "a\nb\nc\n");
/// assert_eq!(normalize_eol("a\nb", "\r\n"), "a\r\nb");
/// ```
pub fn normalize_eol<'a>(text: &'a str, eol: &str) -> Cow<'a, str> {
    if eol.is_empty() {
        return Cow::Borrowed(text);
    }

    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut segment_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let width = match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => 2,
            b'\r' | b'\n' => 1,
            _ => {
                i += 1;
                continue;
            }
        };
        out.push_str(&text[segment_start..i]);
        out.push_str(eol);
        i += width;
        segment_start = i;
    }
    out.push_str(&text[segment_start..]);

    if out == text {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(out)
    }
}

/// 단일 파일 정규화
///
/// # Arguments
/// * `file` - 존재가 확인된 파일 경로
/// * `options` - 실행 전체가 공유하는 옵션
///
/// # Returns
/// 항상 하나의 `ProcessResult`
pub fn normalize_file(file: &Path, options: &NormalizationOptions) -> ProcessResult {
    let original = match read_text(file, options.encoding) {
        Ok(text) => text,
        Err(e) => {
            return ProcessResult::failure(
                file.to_path_buf(),
                EolError::ReadFailed {
                    path: file.to_path_buf(),
                    source: e,
                },
            )
        }
    };

    let content = match normalize_eol(&original, &options.eol) {
        Cow::Borrowed(_) => return ProcessResult::ignored(file.to_path_buf()),
        Cow::Owned(content) => content,
    };

    // 인코딩할 수 없는 문자가 있으면 파일을 건드리지 않음
    let written = options
        .encoding
        .encode(&content)
        .and_then(|bytes| fs::write(file, bytes));

    match written {
        Ok(()) => ProcessResult::updated(file.to_path_buf()),
        Err(e) => ProcessResult::failure(
            file.to_path_buf(),
            EolError::WriteFailed {
                path: file.to_path_buf(),
                source: e,
            },
        ),
    }
}

/// 파일 전체를 읽어 지정된 인코딩으로 해석
///
/// FIFO나 장치 파일은 열기 전에 거부합니다 (열기 자체가 멈출 수 있음).
fn read_text(path: &Path, encoding: Encoding) -> io::Result<String> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "일반 파일이 아닙니다",
        ));
    }

    if metadata.len() >= MMAP_THRESHOLD {
        // 대용량 파일: 메모리 매핑 사용, 쓰기 전에 매핑 해제
        read_with_mmap(&File::open(path)?, encoding)
    } else {
        let bytes = fs::read(path)?;
        match encoding {
            Encoding::Utf8 => String::from_utf8(bytes)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            _ => encoding.decode(&bytes).map(Cow::into_owned),
        }
    }
}

fn read_with_mmap(file: &File, encoding: Encoding) -> io::Result<String> {
    let mmap = unsafe { Mmap::map(file)? };
    encoding.decode(&mmap).map(Cow::into_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn lf() -> NormalizationOptions {
        NormalizationOptions::new()
    }

    #[test]
    fn test_normalize_mixed_endings() {
        assert_eq!(normalize_eol("a\r\nb\rc\n", "\n"), "a\nb\nc\n");
        assert_eq!(normalize_eol("a\r\nb\rc\n", "\r\n"), "a\r\nb\r\nc\r\n");
        assert_eq!(normalize_eol("a\r\nb\rc\n", "\r"), "a\rb\rc\r");
    }

    #[test]
    fn test_crlf_matched_before_cr() {
        // "\r\r\n"은 CR 하나와 CRLF 하나
        assert_eq!(normalize_eol("\r\r\n", "\n"), "\n\n");
        assert_eq!(normalize_eol("\n\r", "\r\n"), "\r\n\r\n");
    }

    #[test]
    fn test_unchanged_is_borrowed() {
        assert!(matches!(normalize_eol("a\nb\n", "\n"), Cow::Borrowed(_)));
        assert!(matches!(normalize_eol("a\r\nb", "\r\n"), Cow::Borrowed(_)));
        assert!(matches!(normalize_eol("no newline", "\r\n"), Cow::Borrowed(_)));
        assert!(matches!(normalize_eol("a\r\nb", ""), Cow::Borrowed(_)));
    }

    #[test]
    fn test_multibyte_text_preserved() {
        assert_eq!(normalize_eol("한글\r\n줄바꿈\r", "\n"), "한글\n줄바꿈\n");
    }

    #[test]
    fn test_updated_then_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.txt");
        fs::write(&path, "a\r\nb\rc\n").unwrap();

        let first = normalize_file(&path, &lf());
        assert_eq!(first.status, Status::Updated);
        assert_eq!(fs::read(&path).unwrap(), b"a\nb\nc\n");

        let second = normalize_file(&path, &lf());
        assert_eq!(second.status, Status::Ignored);
        assert!(second.error.is_none());
    }

    #[test]
    fn test_directory_is_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = normalize_file(temp_dir.path(), &lf());

        assert_eq!(result.status, Status::Error);
        assert!(matches!(result.error, Some(EolError::ReadFailed { .. })));
    }

    #[test]
    fn test_invalid_utf8_is_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bin.dat");
        fs::write(&path, [0xff, 0xfe, b'\r', b'\n']).unwrap();

        let result = normalize_file(&path, &lf());
        assert_eq!(result.status, Status::Error);
        assert_eq!(fs::read(&path).unwrap(), [0xff, 0xfe, b'\r', b'\n']);
    }

    #[test]
    fn test_encodings_are_stable_across_runs() {
        let temp_dir = TempDir::new().unwrap();
        let cases: [(Encoding, &str); 4] = [
            (Encoding::Utf8, "한글\r\n줄\r"),
            (Encoding::Utf16Le, "a\n줄\r\n"),
            (Encoding::Latin1, "café\r\n"),
            (Encoding::Ascii, "plain\rtext\n"),
        ];

        for (i, (encoding, text)) in cases.iter().enumerate() {
            let path = temp_dir.path().join(format!("{}.txt", i));
            fs::write(&path, encoding.encode(text).unwrap()).unwrap();
            let options = lf().with_eol("\r\n").with_encoding(*encoding);

            let first = normalize_file(&path, &options);
            assert_eq!(first.status, Status::Updated, "{}", encoding);
            let after_first = fs::read(&path).unwrap();

            let second = normalize_file(&path, &options);
            assert_eq!(second.status, Status::Ignored, "{}", encoding);
            assert_eq!(fs::read(&path).unwrap(), after_first, "{}", encoding);
        }
    }

    #[test]
    fn test_utf16le_file_is_decoded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wide.txt");
        fs::write(&path, [b'a', 0, b'\n', 0]).unwrap();

        let options = lf().with_eol("\r\n").with_encoding(Encoding::Utf16Le);
        assert_eq!(normalize_file(&path, &options).status, Status::Updated);
        assert_eq!(fs::read(&path).unwrap(), [b'a', 0, b'\r', 0, b'\n', 0]);
    }

    #[test]
    fn test_unencodable_text_is_write_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.txt");
        fs::write(&path, "caf\u{e9}\r\n").unwrap();

        // latin1로 읽은 "Ã©"는 ascii로 쓸 수 없음
        let options = lf().with_encoding(Encoding::Ascii);
        let result = normalize_file(&path, &options);

        assert_eq!(result.status, Status::Error);
        assert!(matches!(result.error, Some(EolError::WriteFailed { .. })));
        assert_eq!(fs::read(&path).unwrap(), "caf\u{e9}\r\n".as_bytes());
    }

    #[test]
    fn test_readonly_file_is_write_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("locked.txt");
        fs::write(&path, "a\r\n").unwrap();

        let mut permissions = fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&path, permissions).unwrap();

        // root 등 권한 검사를 무시하는 환경에서는 확인할 수 없음
        if fs::OpenOptions::new().write(true).open(&path).is_ok() {
            return;
        }

        let result = normalize_file(&path, &lf());
        assert_eq!(result.status, Status::Error);
        assert!(matches!(result.error, Some(EolError::WriteFailed { .. })));
        assert_eq!(fs::read(&path).unwrap(), b"a\r\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_fifo_is_read_error_without_blocking() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pipe");
        let created = std::process::Command::new("mkfifo")
            .arg(&path)
            .status()
            .map(|s| s.success())
            .unwrap_or(false);
        if !created {
            return;
        }

        let result = normalize_file(&path, &lf());
        assert_eq!(result.status, Status::Error);
        assert!(matches!(result.error, Some(EolError::ReadFailed { .. })));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Updated.to_string(), "updated");
        assert_eq!(Status::Ignored.to_string(), "ignored");
        assert_eq!(Status::Error.to_string(), "error");
    }
}
