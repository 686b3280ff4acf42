// Copyright (c) 2025 assessrs contributors
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 响应体编码检测与解码
//!
//! 中文站点常见GBK/GB2312/Big5编码，先尝试UTF-8快路径，
//! 失败后用chardetng检测再交给encoding_rs转换。

use chardetng::EncodingDetector;
use thiserror::Error;
use tracing::debug;

/// 编码处理错误
#[derive(Error, Debug, Clone)]
pub enum TextEncodingError {
    #[error("编码转换失败: {0}")]
    ConversionFailed(String),
}

/// 将HTML响应字节解码为UTF-8字符串
pub fn decode_html_bytes(input: &[u8]) -> Result<String, TextEncodingError> {
    if let Ok(utf8_str) = std::str::from_utf8(input) {
        return Ok(utf8_str.to_string());
    }

    let mut detector = EncodingDetector::new();
    detector.feed(input, true);
    let encoding = detector.guess(None, true);
    debug!(encoding = encoding.name(), "检测到非UTF-8编码");

    let (decoded, _, had_errors) = encoding.decode(input);
    if had_errors {
        return Err(TextEncodingError::ConversionFailed(format!(
            "{} 解码存在错误字节",
            encoding.name()
        )));
    }
    Ok(decoded.into_owned())
}
