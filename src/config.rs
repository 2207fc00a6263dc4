//! 설정 모듈
//!
//! 기본값 위에 설정 파일과 CLI 인자를 덮어써서 한 번의 실행 동안 변하지 않는
//! 옵션 값을 만듭니다.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::borrow::Cow;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{EolError, Result};

/// 기본 줄바꿈 문자
pub const DEFAULT_EOL: &str = "\n";

/// 글로브 확장 시 기본 제외 패턴
pub const DEFAULT_GLOB_IGNORE: &str = "node_modules/**";

/// 파일 쓰기에 사용할 텍스트 인코딩
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Encoding {
    #[default]
    Utf8,
    Utf16Le,
    Latin1,
    Ascii,
}

impl Encoding {
    /// 바이트를 지정된 인코딩의 문자열로 해석
    ///
    /// `utf8`은 잘못된 시퀀스를, `utf16le`는 홀수 길이와 짝 없는 서로게이트를
    /// `InvalidData`로 거부합니다. `latin1`/`ascii`는 바이트 하나를 문자 하나
    /// (U+0000..=U+00FF)로 옮기므로 실패하지 않습니다.
    ///
    /// # Examples
    /// ```
    /// use eolfix::config::Encoding;
    ///
    /// assert_eq!(Encoding::Utf16Le.decode(&[0x61, 0, 0x0a, 0]).unwrap(), "a\n");
    /// assert_eq!(Encoding::Latin1.decode(&[0x63, 0xe9]).unwrap(), "c\u{e9}");
    /// ```
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> io::Result<Cow<'a, str>> {
        match self {
            Encoding::Utf8 => std::str::from_utf8(bytes)
                .map(Cow::Borrowed)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            Encoding::Utf16Le => {
                if bytes.len() % 2 != 0 {
                    return Err(invalid_data("utf16le 내용의 길이가 홀수입니다"));
                }
                let units = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
                char::decode_utf16(units)
                    .collect::<std::result::Result<String, _>>()
                    .map(Cow::Owned)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
            }
            Encoding::Latin1 | Encoding::Ascii => {
                if bytes.is_ascii() {
                    // ASCII 바이트열은 그대로 유효한 UTF-8
                    Encoding::Utf8.decode(bytes)
                } else {
                    Ok(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()))
                }
            }
        }
    }

    /// 문자열을 지정된 인코딩의 바이트로 변환
    ///
    /// `latin1`은 U+00FF, `ascii`는 U+007F를 넘는 문자를 만나면 내용을
    /// 바꾸지 않고 `InvalidData`를 돌려줍니다.
    pub fn encode<'a>(&self, text: &'a str) -> io::Result<Cow<'a, [u8]>> {
        match self {
            Encoding::Utf8 => Ok(Cow::Borrowed(text.as_bytes())),
            Encoding::Utf16Le => Ok(Cow::Owned(
                text.encode_utf16()
                    .flat_map(|unit| unit.to_le_bytes())
                    .collect(),
            )),
            Encoding::Latin1 | Encoding::Ascii => {
                if text.is_ascii() {
                    return Ok(Cow::Borrowed(text.as_bytes()));
                }
                let limit: u8 = if *self == Encoding::Ascii { 0x7f } else { 0xff };
                text.chars()
                    .map(|c| match u8::try_from(c) {
                        Ok(byte) if byte <= limit => Ok(byte),
                        _ => Err(invalid_data(format!(
                            "{} 인코딩으로 표현할 수 없는 문자: {:?}",
                            self, c
                        ))),
                    })
                    .collect::<io::Result<Vec<u8>>>()
                    .map(Cow::Owned)
            }
        }
    }
}

fn invalid_data(message: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.into())
}

impl FromStr for Encoding {
    type Err = EolError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "utf16le" | "utf-16le" | "ucs2" | "ucs-2" => Ok(Encoding::Utf16Le),
            "latin1" | "binary" => Ok(Encoding::Latin1),
            "ascii" => Ok(Encoding::Ascii),
            _ => Err(EolError::InvalidEncoding {
                name: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Encoding {
    type Error = EolError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Utf8 => write!(f, "utf8"),
            Encoding::Utf16Le => write!(f, "utf16le"),
            Encoding::Latin1 => write!(f, "latin1"),
            Encoding::Ascii => write!(f, "ascii"),
        }
    }
}

/// 줄바꿈 설정값 해석
///
/// `lf`, `crlf`, `cr`, `none` 또는 실제 줄바꿈/이스케이프 표기(`\r\n`)를 받습니다.
/// 빈 문자열은 변환을 끄는 값입니다. 반복 실행 시 결과가 변하지 않도록
/// LF, CR, CRLF 외의 시퀀스는 거부합니다.
///
/// # Examples
/// ```
/// use eolfix::config::parse_eol;
///
/// assert_eq!(parse_eol("crlf").unwrap(), "\r\n");
/// assert_eq!(parse_eol("\\n").unwrap(), "\n");
/// assert!(parse_eol("<br>").is_err());
/// ```
pub fn parse_eol(value: &str) -> Result<String> {
    let eol = match value.to_ascii_lowercase().as_str() {
        "lf" => "\n".to_string(),
        "crlf" => "\r\n".to_string(),
        "cr" => "\r".to_string(),
        "none" | "" => String::new(),
        _ => value.replace("\\r", "\r").replace("\\n", "\n"),
    };

    match eol.as_str() {
        "" | "\n" | "\r" | "\r\n" => Ok(eol),
        _ => Err(EolError::InvalidEol {
            value: value.to_string(),
        }),
    }
}

/// 정규화 작업 옵션
///
/// 실행마다 한 번 만들어지고 모든 작업이 참조로 공유합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationOptions {
    /// 목표 줄바꿈 문자 (비어 있으면 변환하지 않음)
    pub eol: String,
    /// 쓰기 인코딩
    pub encoding: Encoding,
    /// 변경 없는 파일도 로그에 남길지 여부
    pub debug: bool,
}

impl Default for NormalizationOptions {
    fn default() -> Self {
        Self {
            eol: DEFAULT_EOL.to_string(),
            encoding: Encoding::Utf8,
            debug: false,
        }
    }
}

impl NormalizationOptions {
    /// 기본 옵션 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 줄바꿈 문자 설정
    pub fn with_eol(mut self, eol: impl Into<String>) -> Self {
        self.eol = eol.into();
        self
    }

    /// 쓰기 인코딩 설정
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// 디버그 로그 설정
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl From<&EolConfig> for NormalizationOptions {
    fn from(config: &EolConfig) -> Self {
        Self {
            eol: config.eol.clone(),
            encoding: config.encoding,
            debug: config.debug,
        }
    }
}

/// 글로브 확장 옵션
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobOptions {
    /// 결과에서 제외할 패턴 (cwd 기준 상대 경로에 매칭)
    #[serde(deserialize_with = "one_or_many")]
    pub ignore: Vec<String>,
    /// 패턴 기준 폴더 (기본값: 현재 작업 폴더)
    pub cwd: Option<PathBuf>,
    /// `.`으로 시작하는 항목도 매칭할지 여부
    pub dot: bool,
}

impl Default for GlobOptions {
    fn default() -> Self {
        Self {
            ignore: vec![DEFAULT_GLOB_IGNORE.to_string()],
            cwd: None,
            dot: false,
        }
    }
}

/// 전체 설정
///
/// JSON 설정 파일의 키는 camelCase입니다. 빠진 키는 기본값을 씁니다.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EolConfig {
    #[serde(deserialize_with = "eol_value")]
    pub eol: String,
    pub encoding: Encoding,
    pub debug: bool,
    /// 빌드 산출물 처리 여부
    pub output_files: bool,
    /// 감시 파일 처리 여부
    pub watch_files: bool,
    #[serde(deserialize_with = "string_or_false")]
    pub glob_pattern: Option<String>,
    pub glob_pattern_options: GlobOptions,
    #[serde(deserialize_with = "one_or_many")]
    pub include: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub exclude: Vec<String>,
}

impl Default for EolConfig {
    fn default() -> Self {
        Self {
            eol: DEFAULT_EOL.to_string(),
            encoding: Encoding::Utf8,
            debug: false,
            output_files: true,
            watch_files: false,
            glob_pattern: None,
            glob_pattern_options: GlobOptions::default(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl EolConfig {
    /// JSON 설정 파일을 읽어 기본값 위에 덮어쓴 설정 생성
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| EolError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&text).map_err(|e| match e {
            EolError::ConfigParse { reason, .. } => EolError::ConfigParse {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// JSON 문자열에서 설정 생성
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| EolError::ConfigParse {
            path: PathBuf::new(),
            reason: e.to_string(),
        })
    }

    /// 정규화 작업에 넘길 불변 옵션
    pub fn normalization_options(&self) -> NormalizationOptions {
        NormalizationOptions::from(self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrBool {
    Text(String),
    Flag(bool),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn string_or_false<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StringOrBool>::deserialize(deserializer)? {
        None | Some(StringOrBool::Flag(false)) => Ok(None),
        Some(StringOrBool::Text(s)) if s.is_empty() => Ok(None),
        Some(StringOrBool::Text(s)) => Ok(Some(s)),
        Some(StringOrBool::Flag(true)) => Err(D::Error::custom(
            "문자열 또는 false만 허용됩니다",
        )),
    }
}

fn eol_value<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StringOrBool>::deserialize(deserializer)? {
        None | Some(StringOrBool::Flag(false)) => Ok(String::new()),
        Some(StringOrBool::Text(s)) => parse_eol(&s).map_err(D::Error::custom),
        Some(StringOrBool::Flag(true)) => Err(D::Error::custom(
            "문자열 또는 false만 허용됩니다",
        )),
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}
