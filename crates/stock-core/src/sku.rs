//! SKU 解析輔助
//!
//! 商品目錄的 SKU 慣例為 `貨號-色碼`（例如 `TRI-2041-NAV`），
//! 色碼為結尾的字母段。沒有色碼的 SKU 整串視為貨號。

/// SKU 解析結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuParts {
    /// 貨號
    pub base_code: String,

    /// 色碼（若有）
    pub color_code: Option<String>,
}

/// 解析 SKU 為貨號與色碼
pub fn parse_sku(sku: &str) -> SkuParts {
    let trimmed = sku.trim();

    if let Some((base, suffix)) = trimmed.rsplit_once('-') {
        if is_color_code(suffix) && !base.is_empty() {
            return SkuParts {
                base_code: base.to_string(),
                color_code: Some(normalize_color(suffix)),
            };
        }
    }

    SkuParts {
        base_code: trimmed.to_string(),
        color_code: None,
    }
}

/// 正規化色碼（大寫）
pub fn normalize_color(code: &str) -> String {
    code.trim().to_uppercase()
}

/// 色碼為 2-4 個英文字母
fn is_color_code(segment: &str) -> bool {
    let len = segment.chars().count();
    (2..=4).contains(&len) && segment.chars().all(|c| c.is_ascii_alphabetic())
}

/// 檢查 SKU 或名稱是否符合搜尋字串（不分大小寫的子字串比對）
pub fn matches_search(sku: &str, name: Option<&str>, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    if sku.to_lowercase().contains(&needle) {
        return true;
    }

    name.map(|n| n.to_lowercase().contains(&needle))
        .unwrap_or(false)
}
