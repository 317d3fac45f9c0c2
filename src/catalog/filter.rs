//! 目录筛选与排序
//!
//! 所有条件之间是 AND 关系；空条件不参与过滤。

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::model::{DateInterval, Game, GameCategory, PlatformFamily};

/// 排序字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    Relevance,
    Rating,
    ReleaseDate,
    Price,
    Title,
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameFilter {
    /// 标题或简介的子串（不区分大小写）
    pub query: String,
    pub category: GameCategory,
    pub platform: PlatformFamily,
    pub interval: DateInterval,
    /// 至少命中其中一个类型（名称或 slug）
    pub genres: Vec<String>,
    pub min_rating: Option<f64>,
    pub max_price: Option<f64>,
    /// 不指定时按条件推导默认排序
    pub sort: Option<(SortOption, SortOrder)>,
}

impl GameFilter {
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_category(category: GameCategory) -> Self {
        Self {
            category,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty()
            && self.category == GameCategory::All
            && self.platform == PlatformFamily::All
            && self.interval == DateInterval::AllTime
            && self.genres.is_empty()
            && self.min_rating.is_none()
            && self.max_price.is_none()
    }

    /// 实际生效的排序；None 表示保持目录顺序
    pub fn effective_sort(&self) -> Option<(SortOption, SortOrder)> {
        if self.sort.is_some() {
            return self.sort;
        }
        if !self.query.trim().is_empty() {
            Some((SortOption::Relevance, SortOrder::Desc))
        } else if self.category != GameCategory::All {
            Some((SortOption::Rating, SortOrder::Desc))
        } else if self.interval != DateInterval::AllTime {
            Some((SortOption::ReleaseDate, SortOrder::Desc))
        } else {
            None
        }
    }

    pub fn matches(&self, game: &Game, today: NaiveDate) -> bool {
        let query = self.query.trim().to_lowercase();
        if !query.is_empty() && relevance(game, &query) == 0 {
            return false;
        }

        if self.category != GameCategory::All && game.category != self.category {
            return false;
        }

        if !game.runs_on(self.platform) {
            return false;
        }

        if let Some(days) = self.interval.days() {
            let Some(released) = game.released_on() else {
                log::warn!("无法解析发售日期，跳过: {} ({})", game.title, game.release_date);
                return false;
            };
            if released <= today - Duration::days(days) {
                return false;
            }
        }

        if !self.genres.is_empty() {
            let wanted: Vec<String> = self.genres.iter().map(|g| g.to_lowercase()).collect();
            let hit = game.genres.iter().any(|g| {
                wanted.contains(&g.name.to_lowercase()) || wanted.contains(&g.slug.to_lowercase())
            });
            if !hit {
                return false;
            }
        }

        if let Some(min) = self.min_rating {
            if game.rating < min {
                return false;
            }
        }

        if let Some(max) = self.max_price {
            if game.price > max {
                return false;
            }
        }

        true
    }

    /// 过滤并排序
    pub fn apply(&self, games: &[Game], today: NaiveDate) -> Vec<Game> {
        let mut result: Vec<Game> = games
            .iter()
            .filter(|g| self.matches(g, today))
            .cloned()
            .collect();

        if let Some((option, order)) = self.effective_sort() {
            let query = self.query.trim().to_lowercase();
            sort_games(&mut result, option, order, &query);
        }

        result
    }
}

/// 相关度：标题命中 2，简介命中 1，否则 0
pub fn relevance(game: &Game, lowercase_query: &str) -> u8 {
    if lowercase_query.is_empty() {
        return 0;
    }
    if game.title.to_lowercase().contains(lowercase_query) {
        2
    } else if game.description.to_lowercase().contains(lowercase_query) {
        1
    } else {
        0
    }
}

/// 稳定排序
pub fn sort_games(games: &mut [Game], option: SortOption, order: SortOrder, lowercase_query: &str) {
    games.sort_by(|a, b| {
        let ord = match option {
            SortOption::Relevance => {
                relevance(a, lowercase_query).cmp(&relevance(b, lowercase_query))
            }
            SortOption::Rating => a.rating.total_cmp(&b.rating),
            SortOption::ReleaseDate => a.released_on().cmp(&b.released_on()),
            SortOption::Price => a.price.total_cmp(&b.price),
            SortOption::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        };
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

// ==================== 派生列表 ====================

/// 评分不低于 `min_rating`，按评分降序
pub fn top_rated(games: &[Game], min_rating: f64) -> Vec<Game> {
    let mut result: Vec<Game> = games
        .iter()
        .filter(|g| g.rating >= min_rating)
        .cloned()
        .collect();
    sort_games(&mut result, SortOption::Rating, SortOrder::Desc, "");
    result
}

/// 价格不高于 `max_price`，按价格升序
pub fn by_max_price(games: &[Game], max_price: f64) -> Vec<Game> {
    let mut result: Vec<Game> = games
        .iter()
        .filter(|g| g.price <= max_price)
        .cloned()
        .collect();
    sort_games(&mut result, SortOption::Price, SortOrder::Asc, "");
    result
}

/// 按评分降序取前 `limit` 个
pub fn popular(games: &[Game], limit: usize) -> Vec<Game> {
    let mut result = games.to_vec();
    sort_games(&mut result, SortOption::Rating, SortOrder::Desc, "");
    result.truncate(limit);
    result
}
