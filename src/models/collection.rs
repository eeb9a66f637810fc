use std::collections::{BTreeMap, HashMap};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;

/// Every admin-ordered table. Each row carries `sort_order`, `is_active` and `version`
/// next to the domain columns described by `fields()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Stores,
    MenuItems,
    MenuCategories,
    MenuTips,
    Testimonials,
    BrandGallery,
    FranchiseBenefits,
    FranchiseRequirements,
    FranchiseProcess,
    ContactInfo,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text,
    LongText,
    Integer { min: i64, max: i64 },
    Real { min: f64, max: f64 },
    Bool,
    /// Public URL produced by the upload endpoint (or pasted by hand).
    Image,
    /// Name of a row in `menu_categories`.
    MenuCategory,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn field(name: &'static str, label: &'static str, kind: FieldKind, required: bool) -> FieldSpec {
    FieldSpec { name, label, kind, required }
}

const STORE_FIELDS: &[FieldSpec] = &[
    field("name", "门店名称", FieldKind::Text, true),
    field("address", "地址", FieldKind::Text, true),
    field("phone", "电话", FieldKind::Text, true),
    field("hours", "营业时间", FieldKind::Text, true),
    field("description", "描述", FieldKind::LongText, false),
    field("latitude", "纬度", FieldKind::Real { min: -90.0, max: 90.0 }, false),
    field("longitude", "经度", FieldKind::Real { min: -180.0, max: 180.0 }, false),
    field("dianping_url", "大众点评链接", FieldKind::Text, false),
    field("image_url", "门店图片", FieldKind::Image, false),
];

const MENU_ITEM_FIELDS: &[FieldSpec] = &[
    field("name", "菜品名称", FieldKind::Text, true),
    field("category", "分类", FieldKind::MenuCategory, true),
    field("price", "价格", FieldKind::Real { min: 0.0, max: 100_000.0 }, true),
    field("description", "描述", FieldKind::LongText, false),
    field("spicy_level", "辣度", FieldKind::Integer { min: 0, max: 5 }, false),
    field("is_bestseller", "招牌菜", FieldKind::Bool, false),
    field("image_url", "菜品图片", FieldKind::Image, false),
];

const MENU_CATEGORY_FIELDS: &[FieldSpec] = &[field("name", "分类名称", FieldKind::Text, true)];

const MENU_TIP_FIELDS: &[FieldSpec] = &[field("content", "内容", FieldKind::LongText, true)];

const TESTIMONIAL_FIELDS: &[FieldSpec] = &[
    field("name", "姓名", FieldKind::Text, true),
    field("role", "身份", FieldKind::Text, true),
    field("content", "评价内容", FieldKind::LongText, true),
    field("rating", "评分", FieldKind::Integer { min: 1, max: 5 }, true),
    field("avatar", "头像文字", FieldKind::Text, true),
];

const GALLERY_FIELDS: &[FieldSpec] = &[
    field("image_url", "图片", FieldKind::Image, true),
    field("alt_text", "图片描述", FieldKind::Text, true),
];

const BENEFIT_FIELDS: &[FieldSpec] = &[
    field("icon", "图标", FieldKind::Text, true),
    field("title", "标题", FieldKind::Text, true),
    field("description", "描述", FieldKind::LongText, true),
];

const REQUIREMENT_FIELDS: &[FieldSpec] = &[field("content", "条件内容", FieldKind::LongText, true)];

const PROCESS_FIELDS: &[FieldSpec] = &[
    field("step_number", "步骤序号", FieldKind::Integer { min: 1, max: 99 }, true),
    field("title", "标题", FieldKind::Text, true),
    field("description", "描述", FieldKind::LongText, true),
];

const CONTACT_INFO_FIELDS: &[FieldSpec] = &[
    field("icon", "图标", FieldKind::Text, true),
    field("label", "标签", FieldKind::Text, true),
    field("value", "内容", FieldKind::Text, true),
    field("link", "链接", FieldKind::Text, false),
];

impl Collection {
    pub const ALL: [Collection; 10] = [
        Collection::Stores,
        Collection::MenuItems,
        Collection::MenuCategories,
        Collection::MenuTips,
        Collection::Testimonials,
        Collection::BrandGallery,
        Collection::FranchiseBenefits,
        Collection::FranchiseRequirements,
        Collection::FranchiseProcess,
        Collection::ContactInfo,
    ];

    pub fn table(self) -> &'static str {
        match self {
            Collection::Stores => "stores",
            Collection::MenuItems => "menu_items",
            Collection::MenuCategories => "menu_categories",
            Collection::MenuTips => "menu_tips",
            Collection::Testimonials => "testimonials",
            Collection::BrandGallery => "brand_gallery",
            Collection::FranchiseBenefits => "franchise_benefits",
            Collection::FranchiseRequirements => "franchise_requirements",
            Collection::FranchiseProcess => "franchise_process",
            Collection::ContactInfo => "contact_info",
        }
    }

    /// URL segment used by the admin panel.
    pub fn slug(self) -> &'static str {
        match self {
            Collection::Stores => "stores",
            Collection::MenuItems => "menu",
            Collection::MenuCategories => "menu-categories",
            Collection::MenuTips => "menu-tips",
            Collection::Testimonials => "testimonials",
            Collection::BrandGallery => "brand-gallery",
            Collection::FranchiseBenefits => "franchise-benefits",
            Collection::FranchiseRequirements => "franchise-requirements",
            Collection::FranchiseProcess => "franchise-process",
            Collection::ContactInfo => "contact-info",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.slug() == slug)
    }

    pub fn label(self) -> &'static str {
        match self {
            Collection::Stores => "门店管理",
            Collection::MenuItems => "菜品管理",
            Collection::MenuCategories => "菜品分类",
            Collection::MenuTips => "用餐小贴士",
            Collection::Testimonials => "顾客评价",
            Collection::BrandGallery => "品牌图库",
            Collection::FranchiseBenefits => "加盟优势",
            Collection::FranchiseRequirements => "加盟条件",
            Collection::FranchiseProcess => "加盟流程",
            Collection::ContactInfo => "联系方式",
        }
    }

    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Collection::Stores => STORE_FIELDS,
            Collection::MenuItems => MENU_ITEM_FIELDS,
            Collection::MenuCategories => MENU_CATEGORY_FIELDS,
            Collection::MenuTips => MENU_TIP_FIELDS,
            Collection::Testimonials => TESTIMONIAL_FIELDS,
            Collection::BrandGallery => GALLERY_FIELDS,
            Collection::FranchiseBenefits => BENEFIT_FIELDS,
            Collection::FranchiseRequirements => REQUIREMENT_FIELDS,
            Collection::FranchiseProcess => PROCESS_FIELDS,
            Collection::ContactInfo => CONTACT_INFO_FIELDS,
        }
    }

    /// Column used to name a row in lists and delete prompts.
    pub fn title_field(self) -> &'static str {
        match self {
            Collection::MenuTips | Collection::FranchiseRequirements => "content",
            Collection::BrandGallery => "alt_text",
            Collection::FranchiseBenefits | Collection::FranchiseProcess => "title",
            Collection::ContactInfo => "label",
            _ => "name",
        }
    }

    /// Folder under the uploads directory for images attached to this collection.
    pub fn upload_folder(self) -> &'static str {
        match self {
            Collection::Stores => "stores",
            Collection::MenuItems => "menu",
            _ => "gallery",
        }
    }
}

/// One row of an ordered collection. Domain columns are kept as JSON values so a
/// single accessor serves every table; typed views decode with `decode()`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderedRecord {
    pub id: i64,
    pub sort_order: i64,
    pub is_active: bool,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl OrderedRecord {
    pub fn get_str(&self, name: &str) -> &str {
        self.fields.get(name).and_then(|v| v.as_str()).unwrap_or("")
    }

    pub fn title(&self, collection: Collection) -> String {
        match self.fields.get(collection.title_field()) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let value = serde_json::to_value(self).map_err(|e| StoreError::Invalid(e.to_string()))?;
        serde_json::from_value(value).map_err(|e| StoreError::Invalid(e.to_string()))
    }
}

/// Field-name -> message. Ordered so inline errors render deterministically.
pub type FieldErrors = BTreeMap<String, String>;

/// Validated domain values for an insert or update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFields {
    pub values: Map<String, Value>,
    pub is_active: Option<bool>,
    /// Honored by updates only; inserts always append at the end.
    pub sort_order: Option<i64>,
}

impl RecordFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(|v| v.as_str())
    }

    /// Parse a submitted admin form. Checkboxes arrive only when ticked, so a
    /// missing `Bool` field means false. Empty optional fields become NULL.
    pub fn from_form(collection: Collection, form: &HashMap<String, String>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut values = Map::new();

        for spec in collection.fields() {
            let raw = form.get(spec.name).map(|s| s.trim()).unwrap_or("");
            match parse_field(spec, raw) {
                Ok(v) => {
                    values.insert(spec.name.to_string(), v);
                }
                Err(msg) => {
                    errors.insert(spec.name.to_string(), msg);
                }
            }
        }

        let sort_order = match form.get("sort_order").map(|s| s.trim()) {
            None | Some("") => None,
            Some(s) => match s.parse::<i64>() {
                Ok(n) => Some(n),
                Err(_) => {
                    errors.insert("sort_order".to_string(), "排序必须是整数".to_string());
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        let is_active = form.get("is_active").map(|v| is_truthy(v)).unwrap_or(false);
        Ok(RecordFields { values, is_active: None, sort_order }.active(is_active))
    }
}

fn is_truthy(v: &str) -> bool {
    matches!(v, "on" | "true" | "1" | "yes")
}

fn parse_field(spec: &FieldSpec, raw: &str) -> Result<Value, String> {
    if let FieldKind::Bool = spec.kind {
        return Ok(Value::Bool(is_truthy(raw)));
    }
    if raw.is_empty() {
        if spec.required {
            return Err(format!("请填写{}", spec.label));
        }
        return Ok(match spec.kind {
            FieldKind::Integer { min, .. } => Value::from(min.max(0)),
            _ => Value::Null,
        });
    }
    match spec.kind {
        FieldKind::Integer { min, max } => {
            let n: i64 = raw.parse().map_err(|_| format!("{}必须是整数", spec.label))?;
            if n < min || n > max {
                return Err(format!("{}必须在 {} 到 {} 之间", spec.label, min, max));
            }
            Ok(Value::from(n))
        }
        FieldKind::Real { min, max } => {
            let n: f64 = raw.parse().map_err(|_| format!("{}必须是数字", spec.label))?;
            if !n.is_finite() || n < min || n > max {
                return Err(format!("{}必须在 {} 到 {} 之间", spec.label, min, max));
            }
            Ok(Value::from(n))
        }
        _ => Ok(Value::String(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn slugs_round_trip_for_every_collection() {
        for c in Collection::ALL {
            assert_eq!(Collection::from_slug(c.slug()), Some(c));
        }
        assert_eq!(Collection::from_slug("posts"), None);
    }

    #[test]
    fn testimonial_form_parses_and_checks_rating() {
        let ok = RecordFields::from_form(
            Collection::Testimonials,
            &form(&[
                ("name", "王先生"),
                ("role", "常客"),
                ("content", "好吃"),
                ("rating", "5"),
                ("avatar", "王"),
                ("is_active", "on"),
            ]),
        )
        .unwrap();
        assert_eq!(ok.values["rating"], Value::from(5));
        assert_eq!(ok.is_active, Some(true));

        let err = RecordFields::from_form(
            Collection::Testimonials,
            &form(&[("name", "王先生"), ("role", "常客"), ("content", "x"), ("rating", "9"), ("avatar", "王")]),
        )
        .unwrap_err();
        assert!(err.contains_key("rating"));
    }

    #[test]
    fn missing_required_and_unchecked_bool() {
        let err = RecordFields::from_form(Collection::MenuItems, &form(&[("price", "12")])).unwrap_err();
        assert!(err.contains_key("name"));
        assert!(err.contains_key("category"));
        assert!(!err.contains_key("price"));

        let ok = RecordFields::from_form(
            Collection::MenuItems,
            &form(&[("name", "牛肉粿粉"), ("category", "主食"), ("price", "18.5")]),
        )
        .unwrap();
        assert_eq!(ok.values["is_bestseller"], Value::Bool(false));
        assert_eq!(ok.values["description"], Value::Null);
        assert_eq!(ok.values["spicy_level"], Value::from(0));
        assert_eq!(ok.is_active, Some(false));
    }

    #[test]
    fn store_coordinates_are_range_checked() {
        let base = [("name", "中山路店"), ("address", "中山路123号"), ("phone", "0754"), ("hours", "10-22")];
        let mut bad = form(&base);
        bad.insert("latitude".into(), "91".into());
        bad.insert("longitude".into(), "116.7".into());
        let err = RecordFields::from_form(Collection::Stores, &bad).unwrap_err();
        assert!(err.contains_key("latitude"));
        assert!(!err.contains_key("longitude"));
    }

    #[test]
    fn record_decodes_into_typed_view() {
        #[derive(Deserialize)]
        struct Tip {
            id: i64,
            content: String,
        }
        let mut fields = Map::new();
        fields.insert("content".into(), Value::from("趁热吃"));
        let rec = OrderedRecord {
            id: 7,
            sort_order: 1,
            is_active: true,
            version: 1,
            created_at: String::new(),
            updated_at: String::new(),
            fields,
        };
        let tip: Tip = rec.decode().unwrap();
        assert_eq!(tip.id, 7);
        assert_eq!(tip.content, "趁热吃");
        assert_eq!(rec.title(Collection::MenuTips), "趁热吃");
    }
}
