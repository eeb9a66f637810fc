//! Merge-with-fallback content for the public pages.
//!
//! Every public page ships a compiled-in copy of its text and lists. Live rows
//! from the store are laid over those defaults at render time; when the store
//! cannot be read the defaults are rendered unchanged and the failure is only
//! logged.

use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::models::collection::Collection;
use crate::models::content::{
    ContactInfoLine, FooterConfig, FranchiseBenefit, FranchiseRequirement, FranchiseStep,
    GalleryImage, MenuCategory, MenuItem, MenuTip, StoreLocation, Testimonial,
};
use crate::store::Store;

pub const PAGES_WITH_DEFAULTS: [&str; 6] = ["home", "menu", "stores", "franchise", "about", "contact"];

const HOME_DEFAULTS: &[(&str, &str)] = &[
    ("home_hero_title", "潮来"),
    ("home_hero_subtitle", "正宗潮汕牛肉粿粉"),
    ("home_hero_tagline", "三代美食传承 · 诚邀加盟合伙人"),
    ("home_why_title", "为什么选择潮来"),
    ("home_why_description", "我们坚持传统工艺与现代经营相结合，为顾客提供最地道的潮汕美食体验"),
    ("home_feature_1_icon", "🍲"),
    ("home_feature_1_title", "地道食材"),
    ("home_feature_1_description", "精选汕头当地牛肉，每日新鲜采购，保证品质"),
    ("home_feature_2_icon", "👨‍🍳"),
    ("home_feature_2_title", "传统手艺"),
    ("home_feature_2_description", "传承三代的烹饪工艺，每一碗都是用心之作"),
    ("home_feature_3_icon", "⭐"),
    ("home_feature_3_title", "顾客满意"),
    ("home_feature_3_description", "连年获得好评，成为顾客的美食首选"),
    ("home_stores_card_title", "我们的门店"),
    ("home_stores_card_description", "探索我们在全市的三家直营店，找到离你最近的潮来"),
    ("home_franchise_card_title", "加盟合作"),
    ("home_franchise_card_description", "加入潮来大家庭，共同打造美食品牌，实现创业梦想"),
    ("home_testimonials_title", "顾客怎么说"),
];

const MENU_DEFAULTS: &[(&str, &str)] = &[
    ("menu_page_title", "潮来菜单"),
    ("menu_page_description", "传统潮汕美食，每一道都是用心烹饪的经典之作"),
    ("menu_tips_title", "用餐小贴士"),
];

const STORES_DEFAULTS: &[(&str, &str)] = &[
    ("stores_page_title", "我们的门店"),
    ("stores_page_description", "三家直营店遍布汕头市中心，为您提供地道的潮汕美食体验"),
    ("stores_map_title", "门店位置地图"),
    ("stores_map_description", "我们的三家门店均位于汕头市中心商业区"),
];

const FRANCHISE_DEFAULTS: &[(&str, &str)] = &[
    ("franchise_page_title", "加盟潮来"),
    ("franchise_page_description", "加入我们的行列，成为潮来的合作伙伴，共同开创美食事业新局面"),
    ("franchise_page_benefits_title", "加盟优势"),
    ("franchise_page_benefits_description", "选择潮来，选择与一个有实力、有未来的美食品牌合作"),
    ("franchise_page_requirements_title", "加盟条件"),
    ("franchise_page_process_title", "加盟流程"),
    ("franchise_form_title", "立即申请"),
    ("franchise_form_description", "填写下方表格，我们将在24小时内与您联系"),
    ("franchise_form_notice", "提交申请即表示您同意我们的隐私政策和服务条款"),
];

const ABOUT_DEFAULTS: &[(&str, &str)] = &[
    ("about_page_title", "关于潮来"),
    ("about_page_description", "传承三代的潮汕美食品牌"),
    ("about_story_paragraph_1", "潮来源于对潮汕美食的执着与热爱。创始人李家是潮汕烹饪工艺的第三代传承人，从祖父开始就坚守手工制作的传统，用最简单的食材烹饪出最地道的风味。"),
    ("about_story_paragraph_2", "2003年，带着对美食事业的憧憬，潮来在汕头市中心开设了第一家店铺。我们坚信，美食不仅是食物，更是文化的传承和情感的表达。每一碗粿粉，都承载着我们对顾客的关爱和对品质的承诺。"),
    ("about_story_paragraph_3", "今天，潮来已经发展成拥有三家直营店的连锁品牌，日均服务数千名顾客。但我们从未改变初心——用最新鲜的食材，用最传统的手艺，为每位顾客献上最美的潮汕美食体验。"),
    ("about_value_1_title", "用心烹饪"),
    ("about_value_1_description", "每一道菜都倾注我们对美食的热爱与执着，坚持手工制作，绝不妥协品质"),
    ("about_value_2_title", "食材新鲜"),
    ("about_value_2_description", "每日从汕头本地精选最优质的牛肉和食材，确保顾客享受最地道的潮汕风味"),
    ("about_value_3_title", "团队专业"),
    ("about_value_3_description", "拥有经验丰富的烹饪团队，传承三代美食工艺，代代相传的手艺与技巧"),
    ("about_value_4_title", "品质保证"),
    ("about_value_4_description", "多次获得美食评选大奖，连年被评为汕头最受欢迎的潮汕美食品牌"),
    ("about_milestone_1_year", "2003年"),
    ("about_milestone_1_title", "潮来成立"),
    ("about_milestone_1_description", "创始人李家三代美食工艺的传承人创立潮来，以一家小店开始美食之旅"),
    ("about_milestone_2_year", "2010年"),
    ("about_milestone_2_title", "首家旗舰店"),
    ("about_milestone_2_description", "开设中山路旗舰店，采用现代经营理念，将传统美食与舒适环境完美结合"),
    ("about_milestone_3_year", "2015年"),
    ("about_milestone_3_title", "连锁扩展"),
    ("about_milestone_3_description", "发展为三家直营店，服务范围遍布汕头市中心，成为当地美食地标"),
    ("about_milestone_4_year", "2020年"),
    ("about_milestone_4_title", "数字化升级"),
    ("about_milestone_4_description", "推出美团外卖服务，让更多顾客享受到潮来的美食，实现线上线下融合"),
    ("about_milestone_5_year", "2024年"),
    ("about_milestone_5_title", "品牌升级"),
    ("about_milestone_5_description", "推出官方网站，启动加盟计划，准备将潮来美食品牌推向更广阔的舞台"),
    ("about_team_description", "潮来拥有专业的团队成员，每一个岗位都有专业的人才在坚守。从烹饪大师到服务人员，我们所有人都为同一个目标而努力——为顾客呈现最好的美食和服务体验。"),
    ("about_achievement_1_number", "20+"),
    ("about_achievement_1_label", "年美食传承"),
    ("about_achievement_2_number", "100K+"),
    ("about_achievement_2_label", "满意顾客"),
    ("about_achievement_3_number", "10+"),
    ("about_achievement_3_label", "行业奖项"),
];

const CONTACT_DEFAULTS: &[(&str, &str)] = &[
    ("contact_page_title", "联系我们"),
    ("contact_page_description", "有任何问题或建议？我们随时准备为您服务"),
    ("contact_page_form_title", "发送消息"),
    ("contact_page_form_description", "填写下方表格，我们将在24小时内与您联系"),
];

/// Compiled-in copy for a page. Unknown pages have no defaults.
pub fn page_defaults(page: &str) -> &'static [(&'static str, &'static str)] {
    match page {
        "home" => HOME_DEFAULTS,
        "menu" => MENU_DEFAULTS,
        "stores" => STORES_DEFAULTS,
        "franchise" => FRANCHISE_DEFAULTS,
        "about" => ABOUT_DEFAULTS,
        "contact" => CONTACT_DEFAULTS,
        _ => &[],
    }
}

/// Resolved key -> value copy for one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageCopy {
    values: HashMap<String, String>,
}

impl PageCopy {
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

/// Shallow merge: every fetched key wins over its default, other defaults stay.
pub fn merge(defaults: &[(&str, &str)], fetched: HashMap<String, String>) -> PageCopy {
    let mut values: HashMap<String, String> = defaults
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    values.extend(fetched);
    PageCopy { values }
}

pub fn resolve_page(store: &dyn Store, page: &str) -> PageCopy {
    match store.site_setting_page(page) {
        Ok(fetched) => merge(page_defaults(page), fetched),
        Err(e) => {
            log::warn!("Failed to load settings for page '{}', using defaults: {}", page, e);
            merge(page_defaults(page), HashMap::new())
        }
    }
}

/// Active rows of `collection` in display order, decoded into `T`.
///
/// Only a failed read or a malformed row brings back the defaults; an empty
/// result is live content and renders empty.
pub fn resolve_list<T: DeserializeOwned>(
    store: &dyn Store,
    collection: Collection,
    defaults: fn() -> Vec<T>,
) -> Vec<T> {
    let records = match store.collection_list(collection, true) {
        Ok(r) => r,
        Err(e) => {
            log::warn!("Failed to load {}, using defaults: {}", collection.table(), e);
            return defaults();
        }
    };
    let mut out = Vec::with_capacity(records.len());
    for rec in &records {
        match rec.decode::<T>() {
            Ok(v) => out.push(v),
            Err(e) => {
                log::warn!("Malformed {} row #{}, using defaults: {}", collection.table(), rec.id, e);
                return defaults();
            }
        }
    }
    out
}

pub fn resolve_footer(store: &dyn Store) -> FooterConfig {
    store.footer_get().unwrap_or_else(|e| {
        log::warn!("Failed to load footer, using defaults: {}", e);
        FooterConfig::default()
    })
}

// ── Default lists ───────────────────────────────────────────────────

pub fn default_contact_lines() -> Vec<ContactInfoLine> {
    [
        ("Phone", "联系电话", "400-XXXX-XXXX", Some("tel:400-xxxx-xxxx")),
        ("Mail", "邮箱地址", "service@chaolai.com", Some("mailto:service@chaolai.com")),
        ("MapPin", "公司地址", "广东省汕头市", None),
        ("Clock", "营业时间", "10:00-22:00", None),
    ]
    .iter()
    .enumerate()
    .map(|(i, (icon, label, value, link))| ContactInfoLine {
        id: i as i64 + 1,
        icon: icon.to_string(),
        label: label.to_string(),
        value: value.to_string(),
        link: link.map(str::to_string),
        sort_order: i as i64 + 1,
        is_active: true,
    })
    .collect()
}

pub fn default_testimonials() -> Vec<Testimonial> {
    [
        ("王先生", "常客", "潮来的牛肉粿粉真的绝了！牛肉鲜嫩，粿粉软滑，每次来都要吃。五年的忠实粉丝！"),
        ("李女士", "美食爱好者", "在潮来吃了一次就爱上了，地道的潮汕味道，价格也很公道。推荐给所有朋友！"),
        ("张先生", "上班族", "工作太忙经常点外卖，潮来的快手粿粉让我节省了很多时间，味道还特别好。"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (name, role, content))| Testimonial {
        id: i as i64 + 1,
        name: name.to_string(),
        role: role.to_string(),
        content: content.to_string(),
        rating: 5,
        avatar: name.chars().next().map(String::from).unwrap_or_default(),
        sort_order: i as i64 + 1,
        is_active: true,
    })
    .collect()
}

pub fn default_benefits() -> Vec<FranchiseBenefit> {
    [
        ("Award", "品牌力量", "拥有多年口碑积累的潮汕美食品牌，知名度高"),
        ("TrendingUp", "盈利模式", "成熟的商业模式，快速实现投资回报"),
        ("Users", "团队支持", "完善的培训体系和全程运营指导"),
        ("CheckCircle2", "供应保障", "统一的食材采购和质量标准控制"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (icon, title, description))| FranchiseBenefit {
        id: i as i64 + 1,
        icon: icon.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        sort_order: i as i64 + 1,
        is_active: true,
    })
    .collect()
}

pub fn default_requirements() -> Vec<FranchiseRequirement> {
    [
        "热爱美食行业，具有餐饮业经营经验优先",
        "有一定的资金实力和风险承受能力",
        "认同潮来品牌文化和经营理念",
        "具有良好的商业信誉和社会声誉",
        "能够按照总部要求执行经营方案",
        "承诺投入足够的时间和精力",
    ]
    .iter()
    .enumerate()
    .map(|(i, content)| FranchiseRequirement {
        id: i as i64 + 1,
        content: content.to_string(),
        sort_order: i as i64 + 1,
        is_active: true,
    })
    .collect()
}

pub fn default_process() -> Vec<FranchiseStep> {
    [
        ("提交申请", "填写申请表格"),
        ("资格审核", "我们审核评估"),
        ("深入洽谈", "了解详细方案"),
        ("正式合作", "签订合同开业"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (title, description))| FranchiseStep {
        id: i as i64 + 1,
        step_number: i as i64 + 1,
        title: title.to_string(),
        description: description.to_string(),
        sort_order: i as i64 + 1,
        is_active: true,
    })
    .collect()
}

pub fn default_menu_tips() -> Vec<MenuTip> {
    [
        "我们的所有菜品均采用新鲜食材，每日采购",
        "可根据个人口味调整辣度，请在点餐时告知",
        "支持团体聚餐预订，欢迎来电咨询",
        "菜单价格仅供参考，具体以门店为准",
    ]
    .iter()
    .enumerate()
    .map(|(i, content)| MenuTip {
        id: i as i64 + 1,
        content: content.to_string(),
        sort_order: i as i64 + 1,
        is_active: true,
    })
    .collect()
}

pub fn default_menu_categories() -> Vec<MenuCategory> {
    ["主食", "配菜", "饮品"]
        .iter()
        .enumerate()
        .map(|(i, name)| MenuCategory {
            id: i as i64 + 1,
            name: name.to_string(),
            sort_order: i as i64 + 1,
            is_active: true,
        })
        .collect()
}

pub fn default_menu_items() -> Vec<MenuItem> {
    [
        ("潮汕牛肉粿粉", "主食", 18.0, "精选汕头牛肉，传统手工制作牛肉粿粉，口感鲜香", 2, true),
        ("潮汕牛肉丸粉", "主食", 16.0, "手工牛肉丸配软滑牛肉粿粉，每一口都是美味", 1, true),
        ("牛肉汤粉", "主食", 15.0, "用8小时熬制的浓汤，牛肉鲜嫩，汤色金黄", 0, false),
        ("混合肉粿粉", "主食", 20.0, "牛肉、牛肉丸、牛筋的完美组合，让您品尝多种口感", 1, false),
        ("潮汕鹅肉饭", "配菜", 22.0, "卤水鹅肉鲜香，配秘制酱汁，香气十足", 1, true),
        ("冬菜牛肉饼", "配菜", 12.0, "酥脆饼皮，馅料饱满，冬菜香气扑鼻", 0, false),
        ("豆类蔬菜", "配菜", 8.0, "时令蔬菜，清爽健康，搭配粿粉更佳", 0, false),
        ("潮汕凤凰单丛茶", "饮品", 6.0, "精选单丛茶叶，香气悠长，回甘不断", 0, true),
        ("普洱老茶", "饮品", 8.0, "陈年普洱，滋味醇厚，茶香氤氲", 0, false),
        ("鲜果榨汁", "饮品", 10.0, "新鲜水果现榨，营养健康，清凉爽口", 0, false),
    ]
    .iter()
    .enumerate()
    .map(|(i, (name, category, price, description, spicy, bestseller))| MenuItem {
        id: i as i64 + 1,
        name: name.to_string(),
        category: category.to_string(),
        price: *price,
        description: Some(description.to_string()),
        spicy_level: *spicy,
        is_bestseller: *bestseller,
        image_url: None,
        sort_order: i as i64 + 1,
        is_active: true,
    })
    .collect()
}

pub fn default_stores() -> Vec<StoreLocation> {
    [
        ("潮来中山路旗舰店", "广东省汕头市中山路123号", "0754-8888-0001", "10:00-22:00",
         "我们的首家旗舰店，集传统美食与现代用餐环境为一体", 23.3563, 116.6802),
        ("潮来金砂路分店", "广东省汕头市金砂路456号", "0754-8888-0002", "10:00-22:30",
         "位于市中心商业区，交通便利，停车场宽敞", 23.3579, 116.6895),
        ("潮来东厦路旗舰店", "广东省汕头市东厦路789号", "0754-8888-0003", "10:00-22:00",
         "新开业分店，提供更舒适的用餐体验", 23.3412, 116.6745),
    ]
    .iter()
    .enumerate()
    .map(|(i, (name, address, phone, hours, description, lat, lng))| StoreLocation {
        id: i as i64 + 1,
        name: name.to_string(),
        address: address.to_string(),
        phone: phone.to_string(),
        hours: hours.to_string(),
        description: Some(description.to_string()),
        latitude: Some(*lat),
        longitude: Some(*lng),
        dianping_url: None,
        image_url: None,
        sort_order: i as i64 + 1,
        is_active: true,
    })
    .collect()
}

pub fn default_gallery() -> Vec<GalleryImage> {
    [
        ("https://images.unsplash.com/photo-1555939594-58056f625634?w=800&h=500&fit=crop", "地道潮汕牛肉粿汁"),
        ("https://images.unsplash.com/photo-1565299624946-b28f40a0ca4b?w=800&h=500&fit=crop", "中山路旗舰店"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (url, alt))| GalleryImage {
        id: i as i64 + 1,
        image_url: url.to_string(),
        alt_text: alt.to_string(),
        sort_order: i as i64 + 1,
        is_active: true,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_rows_means_exact_defaults() {
        for page in PAGES_WITH_DEFAULTS {
            let copy = merge(page_defaults(page), HashMap::new());
            assert_eq!(copy.len(), page_defaults(page).len());
            for (k, v) in page_defaults(page) {
                assert_eq!(copy.get(k), *v);
            }
        }
    }

    #[test]
    fn fetched_value_overrides_only_its_key() {
        let mut fetched = HashMap::new();
        fetched.insert("about_page_title".to_string(), "V".to_string());
        let copy = merge(page_defaults("about"), fetched);
        assert_eq!(copy.get("about_page_title"), "V");
        assert_eq!(copy.get("about_page_description"), "传承三代的潮汕美食品牌");
        assert_eq!(copy.get("about_milestone_5_year"), "2024年");
    }

    #[test]
    fn fetched_extra_keys_are_kept() {
        let mut fetched = HashMap::new();
        fetched.insert("home_banner_note".to_string(), "新店开业".to_string());
        let copy = merge(page_defaults("home"), fetched);
        assert_eq!(copy.get("home_banner_note"), "新店开业");
        assert_eq!(copy.get("missing_key"), "");
    }

    #[test]
    fn default_keys_resolve_to_a_named_category() {
        use crate::models::site_setting::{resolve_category, GENERAL_CATEGORY};
        for (key, _) in ABOUT_DEFAULTS {
            assert_ne!(resolve_category("about", key), GENERAL_CATEGORY, "{}", key);
        }
        assert_eq!(resolve_category("franchise", "franchise_form_title"), "form");
    }

    #[test]
    fn default_lists_are_ordered() {
        let tips = default_menu_tips();
        assert!(tips.windows(2).all(|w| w[0].sort_order < w[1].sort_order));
        assert_eq!(default_testimonials()[0].avatar, "王");
        assert_eq!(default_menu_items().iter().filter(|m| m.category == "饮品").count(), 3);
    }
}
