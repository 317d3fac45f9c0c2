//! 目录数据结构

use serde::{Deserialize, Serialize};

/// 平台
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// 类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// 商店
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// 标签
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// 发行商
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publisher {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// 截图
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screenshot {
    pub id: i64,
    pub image: String,
}

/// ESRB 分级
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EsrbRating {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// 游戏分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameCategory {
    #[default]
    All,
    Action,
    Adventure,
    Rpg,
    Strategy,
    Sports,
    Simulation,
    Puzzle,
}

/// 平台系列，按平台 slug 的子串归类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformFamily {
    #[default]
    All,
    Pc,
    PlayStation,
    Xbox,
    Nintendo,
    Mobile,
}

impl PlatformFamily {
    /// 该系列对应的 slug 关键字，`All` 没有关键字
    pub fn slug_keywords(self) -> &'static [&'static str] {
        match self {
            PlatformFamily::All => &[],
            PlatformFamily::Pc => &["pc"],
            PlatformFamily::PlayStation => &["playstation"],
            PlatformFamily::Xbox => &["xbox"],
            PlatformFamily::Nintendo => &["nintendo"],
            PlatformFamily::Mobile => &["android", "ios"],
        }
    }
}

/// 发售时间区间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateInterval {
    #[default]
    AllTime,
    LastWeek,
    Last30Days,
    Last90Days,
}

impl DateInterval {
    /// 区间长度（天），`AllTime` 为 None
    pub fn days(self) -> Option<i64> {
        match self {
            DateInterval::AllTime => None,
            DateInterval::LastWeek => Some(7),
            DateInterval::Last30Days => Some(30),
            DateInterval::Last90Days => Some(90),
        }
    }
}

/// 游戏（只读的目录数据）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub price: f64,
    pub rating: f64,
    /// ISO 日期 `YYYY-MM-DD`
    pub release_date: String,
    pub category: GameCategory,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub stores: Vec<Store>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub screenshots: Vec<Screenshot>,
    pub metacritic: Option<i32>,
    pub playtime: Option<i32>,
    pub ratings_count: Option<i32>,
    pub esrb_rating: Option<EsrbRating>,
}

impl Game {
    pub fn released_on(&self) -> Option<chrono::NaiveDate> {
        chrono::NaiveDate::parse_from_str(&self.release_date, "%Y-%m-%d").ok()
    }

    pub fn runs_on(&self, family: PlatformFamily) -> bool {
        let keywords = family.slug_keywords();
        if keywords.is_empty() {
            return true;
        }
        self.platforms.iter().any(|p| {
            let slug = p.slug.to_lowercase();
            keywords.iter().any(|k| slug.contains(k))
        })
    }
}
