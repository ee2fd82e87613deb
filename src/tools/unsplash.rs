//! Unsplash 图片搜索：按关键词取图并格式化为带署名的 Markdown
//!
//! GET 请求带超时与 Client-ID 鉴权；检索前剔除对图片搜索无益的词。
//! 无 Access Key、无结果或请求失败时回退到占位图片，调用方视角永不失败。

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

const BASE_URL: &str = "https://api.unsplash.com";

/// 查询中对图片搜索无益的词
const STOP_WORDS: &[&str] = &[
    "blog",
    "post",
    "article",
    "content",
    "guide",
    "tutorial",
    "introduction",
];

/// 搜索响应（仅保留用到的字段）
#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: PhotoUrls,
    links: PhotoLinks,
    user: Photographer,
    alt_description: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: String,
}

#[derive(Debug, Deserialize)]
struct PhotoLinks {
    html: String,
}

#[derive(Debug, Deserialize)]
struct Photographer {
    name: String,
    links: PhotographerLinks,
}

#[derive(Debug, Deserialize)]
struct PhotographerLinks {
    html: String,
}

pub struct UnsplashClient {
    client: Client,
    access_key: Option<String>,
}

impl UnsplashClient {
    pub fn new(access_key: Option<String>, timeout_secs: u64) -> Self {
        if access_key.is_none() {
            tracing::warn!("Unsplash access key not set, tool will return placeholder images");
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, access_key }
    }

    /// 搜索图片并返回可直接插入正文的 Markdown；任何失败都回退占位图片
    pub async fn search_markdown(&self, query: &str, count: usize, orientation: &str) -> String {
        let count = count.clamp(1, 3);
        let orientation = match orientation {
            "landscape" | "portrait" | "squarish" => orientation,
            _ => "landscape",
        };

        let key = match &self.access_key {
            Some(k) => k.clone(),
            None => return placeholder_markdown(query, count, orientation),
        };

        match self.search(&key, query, count, orientation).await {
            Ok(photos) if !photos.is_empty() => format_markdown(&photos, query),
            Ok(_) => placeholder_markdown(query, count, orientation),
            Err(e) => {
                tracing::warn!(error = %e, query = %query, "Unsplash search failed, using placeholder");
                placeholder_markdown(query, count, orientation)
            }
        }
    }

    async fn search(
        &self,
        key: &str,
        query: &str,
        count: usize,
        orientation: &str,
    ) -> Result<Vec<Photo>, String> {
        let resp = self
            .client
            .get(format!("{}/search/photos", BASE_URL))
            .header("Authorization", format!("Client-ID {}", key))
            .header("Accept-Version", "v1")
            .query(&[
                ("query", enhance_query(query)),
                ("per_page", count.to_string()),
                ("orientation", orientation.to_string()),
                ("order_by", "relevant".to_string()),
                ("content_filter", "high".to_string()),
            ])
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }

        let body: SearchResponse = resp
            .json()
            .await
            .map_err(|e| format!("Parse response: {}", e))?;
        Ok(body.results)
    }
}

/// 剔除 stop words；剩余过短时保留原查询
fn enhance_query(query: &str) -> String {
    let words: Vec<&str> = query
        .split_whitespace()
        .filter(|w| !STOP_WORDS.contains(&w.to_lowercase().as_str()))
        .collect();
    if words.len() < 2 {
        return query.to_string();
    }
    words.join(" ")
}

/// 清洗 alt 文本：去特殊字符、压缩空白、限长；过短时按查询生成
fn clean_alt_text(alt: &str, query: &str) -> String {
    let trimmed = alt.trim();
    if trimmed.chars().count() < 5 {
        return format!("Professional image showcasing {}", query);
    }
    let cleaned: String = trimmed
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || c == '-' {
                c
            } else {
                ' '
            }
        })
        .collect();
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.chars().count() > 100 {
        format!("{}...", cleaned.chars().take(97).collect::<String>())
    } else {
        cleaned
    }
}

/// 带署名的 Markdown：图片 + photographer 链接
fn format_markdown(photos: &[Photo], query: &str) -> String {
    photos
        .iter()
        .map(|photo| {
            let alt = photo
                .alt_description
                .as_deref()
                .or(photo.description.as_deref())
                .unwrap_or("");
            let alt = clean_alt_text(alt, query);
            format!(
                "![{alt}]({url} \"{alt}\")\n\n*Photo by [{photographer}]({photographer_url}) on [Unsplash]({photo_url})*",
                alt = alt,
                url = photo.urls.regular,
                photographer = photo.user.name,
                photographer_url = photo.user.links.html,
                photo_url = photo.links.html,
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// 占位图片：无鉴权的 Source API，保证撰写阶段总有图可用
fn placeholder_markdown(query: &str, count: usize, orientation: &str) -> String {
    let size = match orientation {
        "portrait" => "600x800",
        "squarish" => "600x600",
        _ => "800x450",
    };
    let search_terms = query.split_whitespace().collect::<Vec<_>>().join(",");
    let alt = format!("Professional image related to {}", query);

    (0..count)
        .map(|_| {
            format!(
                "![{alt}](https://source.unsplash.com/{size}/?{terms} \"{alt}\")\n\n*Image from Unsplash*",
                alt = alt,
                size = size,
                terms = search_terms,
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enhance_query_strips_stop_words() {
        assert_eq!(
            enhance_query("blog post about quantum computing"),
            "about quantum computing"
        );
        // 剩余过短时保留原查询
        assert_eq!(enhance_query("blog rust"), "blog rust");
    }

    #[test]
    fn test_clean_alt_text() {
        assert_eq!(
            clean_alt_text("", "robots"),
            "Professional image showcasing robots"
        );
        assert_eq!(
            clean_alt_text("a #robot! on    mars", "robots"),
            "a robot on mars"
        );
        let long = "x".repeat(200);
        assert!(clean_alt_text(&long, "robots").chars().count() <= 100);
    }

    #[test]
    fn test_placeholder_markdown() {
        let md = placeholder_markdown("quantum computing", 2, "landscape");
        assert_eq!(md.matches("source.unsplash.com/800x450").count(), 2);
        assert!(md.contains("?quantum,computing"));
        assert!(md.contains("*Image from Unsplash*"));
    }

    #[tokio::test]
    async fn test_search_markdown_without_key_falls_back() {
        let client = UnsplashClient::new(None, 1);
        let md = client.search_markdown("robots", 1, "portrait").await;
        assert!(md.contains("source.unsplash.com/600x800"));
    }
}
