use chardetng::EncodingDetector;
use encoding_rs::{Encoding, GB18030, GBK, UTF_8};

/// 编码检测结果
#[derive(Debug)]
pub struct DetectedText {
    pub text: String,
    pub encoding: &'static Encoding,
    pub had_bom: bool,
}

/// 按固定顺序尝试候选编码（UTF-8 → GBK → GB18030，最后补一个
/// chardetng 的猜测），保留第一个无损解码且通过 `validate` 校验的结果
pub fn decode_with_candidates(
    bytes: &[u8],
    validate: impl Fn(&str) -> bool,
) -> Option<DetectedText> {
    let had_bom = bytes.starts_with(&[0xEF, 0xBB, 0xBF]);

    let mut candidates: Vec<&'static Encoding> = vec![UTF_8, GBK, GB18030];
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let guessed = detector.guess(None, true);
    if !candidates.contains(&guessed) {
        candidates.push(guessed);
    }

    for encoding in candidates {
        let (decoded, actual, had_errors) = encoding.decode(bytes);
        if had_errors {
            continue;
        }
        if validate(&decoded) {
            return Some(DetectedText {
                text: decoded.into_owned(),
                encoding: actual,
                had_bom,
            });
        }
    }

    None
}

/// 以指定编码写出文本；目标编码无法表示的字符视为错误
pub fn encode_text(
    text: &str,
    encoding: &'static Encoding,
    with_bom: bool,
) -> Result<Vec<u8>, String> {
    let (encoded, _, had_errors) = encoding.encode(text);
    if had_errors {
        return Err(format!("文本包含 {} 无法表示的字符", encoding.name()));
    }

    let mut bytes = Vec::with_capacity(encoded.len() + 3);
    if with_bom && encoding == UTF_8 {
        bytes.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
    }
    bytes.extend_from_slice(&encoded);
    Ok(bytes)
}
