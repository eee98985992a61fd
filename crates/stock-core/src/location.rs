//! 倉位模型
//!
//! 倉位集合是可配置的，新增門市時只需擴充 [`LocationSet`]，
//! 不需要改動任何欄位名稱。

use serde::{Deserialize, Serialize};

use crate::{Result, StockError};

/// 倉位識別碼（正規化為小寫）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(String);

impl LocationId {
    /// 創建新的倉位識別碼
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 系統認可的倉位集合
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSet {
    locations: Vec<LocationId>,
}

impl LocationSet {
    /// 創建新的倉位集合
    ///
    /// 集合不可為空；重複的倉位會被去除。
    pub fn new<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut locations: Vec<LocationId> = Vec::new();
        for id in ids {
            let location = LocationId::new(id);
            if location.as_str().is_empty() {
                return Err(StockError::Validation("倉位識別碼不可為空".to_string()));
            }
            if !locations.contains(&location) {
                locations.push(location);
            }
        }

        if locations.is_empty() {
            return Err(StockError::Validation("倉位集合不可為空".to_string()));
        }

        Ok(Self { locations })
    }

    /// 預設倉位集合：門市（chodov）與暢貨中心（outlet）
    pub fn default_pair() -> Self {
        Self {
            locations: vec![LocationId::new("chodov"), LocationId::new("outlet")],
        }
    }

    /// 檢查倉位是否存在於集合中
    pub fn contains(&self, location: &LocationId) -> bool {
        self.locations.contains(location)
    }

    /// 解析字串為已認可的倉位
    pub fn resolve(&self, raw: &str) -> Result<LocationId> {
        let location = LocationId::new(raw);
        if self.contains(&location) {
            Ok(location)
        } else {
            Err(StockError::UnknownLocation(raw.to_string()))
        }
    }

    /// 迭代所有倉位
    pub fn iter(&self) -> impl Iterator<Item = &LocationId> {
        self.locations.iter()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl Default for LocationSet {
    fn default() -> Self {
        Self::default_pair()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_id_normalization() {
        let location = LocationId::new("  Chodov ");
        assert_eq!(location.as_str(), "chodov");
        assert_eq!(location, LocationId::new("CHODOV"));
    }

    #[test]
    fn test_default_pair() {
        let set = LocationSet::default_pair();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&LocationId::new("chodov")));
        assert!(set.contains(&LocationId::new("outlet")));
    }

    #[test]
    fn test_resolve_unknown_location() {
        let set = LocationSet::default_pair();
        assert!(set.resolve("outlet").is_ok());
        assert!(matches!(
            set.resolve("warehouse-9"),
            Err(StockError::UnknownLocation(_))
        ));
    }

    #[test]
    fn test_empty_set_rejected() {
        let ids: Vec<&str> = vec![];
        assert!(LocationSet::new(ids).is_err());
    }

    #[test]
    fn test_duplicates_removed() {
        let set = LocationSet::new(["chodov", "Chodov", "outlet"]).unwrap();
        assert_eq!(set.len(), 2);
    }
}
