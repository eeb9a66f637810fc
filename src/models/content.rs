use serde::{Deserialize, Serialize};

// Typed read views over `OrderedRecord` rows, used by the public pages.

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreLocation {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub hours: String,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub dianping_url: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub description: Option<String>,
    #[serde(default)]
    pub spicy_level: i64,
    #[serde(default)]
    pub is_bestseller: bool,
    pub image_url: Option<String>,
    pub sort_order: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuCategory {
    pub id: i64,
    pub name: String,
    pub sort_order: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuTip {
    pub id: i64,
    pub content: String,
    pub sort_order: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Testimonial {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub content: String,
    pub rating: i64,
    pub avatar: String,
    pub sort_order: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GalleryImage {
    pub id: i64,
    pub image_url: String,
    pub alt_text: String,
    pub sort_order: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FranchiseBenefit {
    pub id: i64,
    pub icon: String,
    pub title: String,
    pub description: String,
    pub sort_order: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FranchiseRequirement {
    pub id: i64,
    pub content: String,
    pub sort_order: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FranchiseStep {
    pub id: i64,
    pub step_number: i64,
    pub title: String,
    pub description: String,
    pub sort_order: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactInfoLine {
    pub id: i64,
    pub icon: String,
    pub label: String,
    pub value: String,
    pub link: Option<String>,
    pub sort_order: i64,
    pub is_active: bool,
}

/// Single-row brand block shown in the footer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FooterConfig {
    pub brand_name: String,
    pub brand_description: String,
}

impl Default for FooterConfig {
    fn default() -> Self {
        FooterConfig {
            brand_name: "潮来".to_string(),
            brand_description: "正宗潮汕牛肉粿粉，传承三代美食工艺。我们用心为每位顾客奉献地道的潮汕美食。"
                .to_string(),
        }
    }
}
