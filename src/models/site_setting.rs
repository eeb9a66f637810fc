use serde::{Deserialize, Serialize};

/// A page-scoped piece of copy text, editable from the admin panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteSetting {
    pub id: i64,
    pub page: String,
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    /// Sub-category id, resolved from the key when the row is written.
    pub category: String,
    pub version: i64,
    pub updated_at: String,
}

/// Row used when seeding or importing settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteSettingSeed {
    pub page: String,
    pub key: String,
    pub value: String,
    pub description: Option<String>,
}

pub struct PageInfo {
    pub id: &'static str,
    pub label: &'static str,
    /// (category id, label, key prefix)
    pub categories: &'static [(&'static str, &'static str, &'static str)],
}

pub const GENERAL_CATEGORY: &str = "general";

pub const PAGES: &[PageInfo] = &[
    PageInfo {
        id: "home",
        label: "首页",
        categories: &[
            ("hero", "Hero 区域", "home_hero_"),
            ("why", "为什么选择", "home_why_"),
            ("feature", "特色介绍", "home_feature_"),
        ],
    },
    PageInfo {
        id: "stores",
        label: "门店",
        categories: &[("page", "页面信息", "stores_page_"), ("map", "地图区域", "stores_map_")],
    },
    PageInfo {
        id: "menu",
        label: "菜单",
        categories: &[("page", "页面信息", "menu_page_"), ("tips", "用餐小贴士", "menu_tips_")],
    },
    PageInfo {
        id: "franchise",
        label: "加盟",
        categories: &[("page", "页面信息", "franchise_page_"), ("form", "申请表单", "franchise_form_")],
    },
    PageInfo {
        id: "about",
        label: "关于",
        categories: &[
            ("page", "页面信息", "about_page_"),
            ("story", "我们的故事", "about_story_"),
            ("value", "核心价值观", "about_value_"),
            ("milestone", "发展历程", "about_milestone_"),
            ("team", "我们的团队", "about_team_"),
            ("achievement", "我们的成就", "about_achievement_"),
        ],
    },
    PageInfo {
        id: "contact",
        label: "联系",
        categories: &[("page", "页面信息", "contact_page_")],
    },
];

pub fn page_info(page: &str) -> Option<&'static PageInfo> {
    PAGES.iter().find(|p| p.id == page)
}

/// Category stored alongside a setting row. First matching prefix wins;
/// unknown pages and unmatched keys fall into `general`.
pub fn resolve_category(page: &str, key: &str) -> &'static str {
    page_info(page)
        .and_then(|info| {
            info.categories
                .iter()
                .find(|(_, _, prefix)| key.starts_with(prefix))
                .map(|(id, _, _)| *id)
        })
        .unwrap_or(GENERAL_CATEGORY)
}

pub fn category_label(page: &str, category: &str) -> &'static str {
    page_info(page)
        .and_then(|info| info.categories.iter().find(|(id, _, _)| *id == category))
        .map(|(_, label, _)| *label)
        .unwrap_or("其他")
}

/// Admin list filter: page, category and a case-insensitive search over key,
/// value and description.
#[derive(Debug, Clone, Default)]
pub struct SettingFilter {
    pub page: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl SettingFilter {
    pub fn matches(&self, s: &SiteSetting) -> bool {
        if let Some(ref p) = self.page {
            if p != "all" && &s.page != p {
                return false;
            }
        }
        if let Some(ref c) = self.category {
            if c != "all" && &s.category != c {
                return false;
            }
        }
        if let Some(ref q) = self.search {
            let q = q.trim().to_lowercase();
            if !q.is_empty() {
                let hit = s.key.to_lowercase().contains(&q)
                    || s.value.to_lowercase().contains(&q)
                    || s
                        .description
                        .as_deref()
                        .map(|d| d.to_lowercase().contains(&q))
                        .unwrap_or(false);
                if !hit {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_resolved_from_prefix() {
        assert_eq!(resolve_category("home", "home_hero_title"), "hero");
        assert_eq!(resolve_category("about", "about_milestone_3_year"), "milestone");
        assert_eq!(resolve_category("menu", "menu_tips_title"), "tips");
        assert_eq!(resolve_category("home", "site_banner"), GENERAL_CATEGORY);
        assert_eq!(resolve_category("reviews", "reviews_title"), GENERAL_CATEGORY);
    }

    #[test]
    fn filter_matches_page_category_and_search() {
        let s = SiteSetting {
            id: 1,
            page: "about".into(),
            key: "about_story_paragraph_1".into(),
            value: "潮来源于对潮汕美食的执着".into(),
            description: Some("Story paragraph".into()),
            category: "story".into(),
            version: 1,
            updated_at: String::new(),
        };
        assert!(SettingFilter::default().matches(&s));
        let f = SettingFilter { page: Some("about".into()), category: Some("story".into()), search: Some("STORY".into()) };
        assert!(f.matches(&s));
        let f = SettingFilter { page: Some("home".into()), ..Default::default() };
        assert!(!f.matches(&s));
        let f = SettingFilter { search: Some("潮汕".into()), ..Default::default() };
        assert!(f.matches(&s));
        let f = SettingFilter { category: Some("value".into()), ..Default::default() };
        assert!(!f.matches(&s));
    }
}
