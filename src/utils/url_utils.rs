// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 提取 URL 的路径段，忽略空段并去掉末尾的 `.git`
pub fn path_segments(url: &Url) -> Vec<String> {
    url.path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(|s| s.trim_end_matches(".git").to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// 替换（或添加）查询参数
pub fn with_query_param(url: &str, key: &str, value: &str) -> Result<String, ParseError> {
    let mut parsed = Url::parse(url)?;
    let retained: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    parsed
        .query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair(key, value);
    Ok(parsed.to_string())
}
