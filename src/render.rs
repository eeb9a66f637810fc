//! Server-side HTML for the public site.
//!
//! Every page is a plain function from resolved content to a `String`; data
//! loading and fallbacks happen in `resolver`, so nothing here can fail.

use crate::models::collection::FieldErrors;
use crate::models::content::{
    ContactInfoLine, FooterConfig, FranchiseBenefit, FranchiseRequirement, FranchiseStep,
    GalleryImage, MenuCategory, MenuItem, MenuTip, StoreLocation, Testimonial,
};
use crate::models::submission::NewSubmission;
use crate::resolver::PageCopy;

const NAV: &[(&str, &str)] = &[
    ("/", "首页"),
    ("/menu", "菜单"),
    ("/stores", "门店"),
    ("/about", "关于我们"),
    ("/reviews", "顾客评价"),
    ("/franchise", "加盟合作"),
    ("/contact", "联系我们"),
];

const DIANPING_SEARCH_URL: &str = "https://www.dianping.com/search/keyword/9/0_%E6%BD%AE%E6%9D%A5";

/// Header/footer content shared by every page.
pub struct Chrome {
    pub footer: FooterConfig,
    pub contact_lines: Vec<ContactInfoLine>,
}

/// Values, field errors and an outcome message for a public form.
#[derive(Debug, Default)]
pub struct FormView {
    pub values: NewSubmission,
    pub errors: FieldErrors,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Success(String),
    Error(String),
}

pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn e(s: &str) -> String {
    html_escape(s)
}

/// Only http(s) and site-relative links are emitted into attributes.
fn safe_href(url: &str) -> Option<String> {
    let url = url.trim();
    let ok = url.starts_with("https://")
        || url.starts_with("http://")
        || url.starts_with("tel:")
        || url.starts_with("mailto:")
        || (url.starts_with('/') && !url.starts_with("//"));
    if ok {
        Some(e(url))
    } else {
        None
    }
}

fn icon_glyph(name: &str) -> &'static str {
    match name {
        "Phone" => "📞",
        "Mail" => "✉️",
        "MapPin" => "📍",
        "Clock" => "🕒",
        "Award" => "🏆",
        "TrendingUp" => "📈",
        "Users" => "👥",
        "CheckCircle2" => "✅",
        _ => "•",
    }
}

fn stars(rating: i64) -> String {
    let r = rating.clamp(0, 5) as usize;
    format!(
        "<span class=\"stars\" aria-label=\"{} 星\">{}{}</span>",
        r,
        "★".repeat(r),
        "☆".repeat(5 - r)
    )
}

fn price(p: f64) -> String {
    if p.fract() == 0.0 {
        format!("¥{:.0}", p)
    } else {
        format!("¥{:.2}", p)
    }
}

// ── Layout ──────────────────────────────────────────────────────────

fn layout(chrome: &Chrome, title: &str, active: &str, body: &str) -> String {
    let brand = e(&chrome.footer.brand_name);
    let mut nav = String::new();
    for (href, label) in NAV {
        let class = if *href == active { " class=\"active\"" } else { "" };
        nav.push_str(&format!("<a href=\"{}\"{}>{}</a>", href, class, label));
    }
    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | {brand}</title>
<style>{css}</style>
</head>
<body>
<header class="site-header"><div class="wrap"><a class="logo" href="/">{brand}</a><nav>{nav}</nav></div></header>
<main>
{body}
</main>
{footer}
</body>
</html>"#,
        title = e(title),
        brand = brand,
        css = DEFAULT_CSS,
        nav = nav,
        body = body,
        footer = build_footer(chrome),
    )
}

fn build_footer(chrome: &Chrome) -> String {
    let mut lines = String::new();
    for line in &chrome.contact_lines {
        let value = match line.link.as_deref().and_then(safe_href) {
            Some(href) => format!("<a href=\"{}\">{}</a>", href, e(&line.value)),
            None => e(&line.value),
        };
        lines.push_str(&format!(
            "<li><span class=\"icon\">{}</span><span class=\"label\">{}</span> {}</li>",
            icon_glyph(&line.icon),
            e(&line.label),
            value
        ));
    }
    let mut links = String::new();
    for (href, label) in NAV {
        links.push_str(&format!("<li><a href=\"{}\">{}</a></li>", href, label));
    }
    format!(
        r#"<footer class="site-footer"><div class="wrap grid-3">
<div><h3>{name}</h3><p>{desc}</p></div>
<div><h4>快速链接</h4><ul>{links}</ul></div>
<div><h4>联系方式</h4><ul class="contact-lines">{lines}</ul></div>
</div><p class="copyright">&copy; {year} {name}. 保留所有权利。</p></footer>"#,
        name = e(&chrome.footer.brand_name),
        desc = e(&chrome.footer.brand_description),
        links = links,
        lines = lines,
        year = chrono::Utc::now().format("%Y"),
    )
}

fn page_header(title: &str, description: &str) -> String {
    format!(
        "<section class=\"page-header\"><div class=\"wrap\"><h1>{}</h1><p>{}</p></div></section>",
        e(title),
        e(description)
    )
}

fn testimonial_cards(list: &[Testimonial]) -> String {
    let mut html = String::from("<div class=\"grid-3\">");
    for t in list {
        html.push_str(&format!(
            r#"<article class="card testimonial">{stars}<p>“{content}”</p><div class="who"><span class="avatar">{avatar}</span><div><strong>{name}</strong><small>{role}</small></div></div></article>"#,
            stars = stars(t.rating),
            content = e(&t.content),
            avatar = e(&t.avatar),
            name = e(&t.name),
            role = e(&t.role),
        ));
    }
    html.push_str("</div>");
    html
}

// ── Pages ───────────────────────────────────────────────────────────

pub fn render_home(chrome: &Chrome, copy: &PageCopy, testimonials: &[Testimonial], gallery: &[GalleryImage]) -> String {
    let mut body = format!(
        r#"<section class="hero"><div class="wrap"><h1>{}</h1><p class="subtitle">{}</p><p>{}</p>
<div class="actions"><a class="btn" href="/menu">查看菜单</a><a class="btn ghost" href="/franchise">加盟合作</a></div></div></section>"#,
        e(copy.get("home_hero_title")),
        e(copy.get("home_hero_subtitle")),
        e(copy.get("home_hero_tagline")),
    );

    if !gallery.is_empty() {
        body.push_str("<section class=\"gallery\"><div class=\"wrap gallery-strip\">");
        for img in gallery {
            if let Some(src) = safe_href(&img.image_url) {
                body.push_str(&format!("<img src=\"{}\" alt=\"{}\" loading=\"lazy\">", src, e(&img.alt_text)));
            }
        }
        body.push_str("</div></section>");
    }

    body.push_str(&format!(
        "<section><div class=\"wrap\"><h2>{}</h2><p class=\"lead\">{}</p><div class=\"grid-3\">",
        e(copy.get("home_why_title")),
        e(copy.get("home_why_description"))
    ));
    for n in 1..=3 {
        body.push_str(&format!(
            "<div class=\"card feature\"><div class=\"glyph\">{}</div><h3>{}</h3><p>{}</p></div>",
            e(copy.get(&format!("home_feature_{}_icon", n))),
            e(copy.get(&format!("home_feature_{}_title", n))),
            e(copy.get(&format!("home_feature_{}_description", n))),
        ));
    }
    body.push_str("</div></div></section>");

    body.push_str(&format!(
        r#"<section class="alt"><div class="wrap grid-2">
<a class="card link-card" href="/stores"><h3>{}</h3><p>{}</p></a>
<a class="card link-card" href="/franchise"><h3>{}</h3><p>{}</p></a>
</div></section>"#,
        e(copy.get("home_stores_card_title")),
        e(copy.get("home_stores_card_description")),
        e(copy.get("home_franchise_card_title")),
        e(copy.get("home_franchise_card_description")),
    ));

    if !testimonials.is_empty() {
        body.push_str(&format!(
            "<section><div class=\"wrap\"><h2>{}</h2>{}</div></section>",
            e(copy.get("home_testimonials_title")),
            testimonial_cards(testimonials)
        ));
    }

    layout(chrome, copy.get("home_hero_title"), "/", &body)
}

pub fn render_menu(
    chrome: &Chrome,
    copy: &PageCopy,
    categories: &[MenuCategory],
    items: &[MenuItem],
    tips: &[MenuTip],
) -> String {
    let mut body = page_header(copy.get("menu_page_title"), copy.get("menu_page_description"));
    body.push_str("<section><div class=\"wrap\">");

    // Active categories in admin order; items under a hidden category stay hidden.
    for name in categories.iter().map(|c| c.name.as_str()) {
        let in_cat: Vec<&MenuItem> = items.iter().filter(|i| i.category == name).collect();
        if in_cat.is_empty() {
            continue;
        }
        body.push_str(&format!("<h2 class=\"menu-category\">{}</h2><div class=\"grid-2\">", e(name)));
        for item in in_cat {
            let mut badges = String::new();
            if item.is_bestseller {
                badges.push_str("<span class=\"badge\">招牌</span>");
            }
            if item.spicy_level > 0 {
                badges.push_str(&format!(
                    "<span class=\"badge spicy\">{}</span>",
                    "🌶".repeat(item.spicy_level.clamp(0, 5) as usize)
                ));
            }
            let img = item
                .image_url
                .as_deref()
                .and_then(safe_href)
                .map(|src| format!("<img src=\"{}\" alt=\"{}\" loading=\"lazy\">", src, e(&item.name)))
                .unwrap_or_default();
            body.push_str(&format!(
                "<article class=\"card menu-item\">{}<div><h3>{} {}</h3><p>{}</p></div><span class=\"price\">{}</span></article>",
                img,
                e(&item.name),
                badges,
                e(item.description.as_deref().unwrap_or("")),
                price(item.price),
            ));
        }
        body.push_str("</div>");
    }

    if !tips.is_empty() {
        body.push_str(&format!("<div class=\"card tips\"><h3>{}</h3><ul>", e(copy.get("menu_tips_title"))));
        for tip in tips {
            body.push_str(&format!("<li>{}</li>", e(&tip.content)));
        }
        body.push_str("</ul></div>");
    }
    body.push_str("</div></section>");

    layout(chrome, copy.get("menu_page_title"), "/menu", &body)
}

pub fn render_stores(chrome: &Chrome, copy: &PageCopy, stores: &[StoreLocation]) -> String {
    let mut body = page_header(copy.get("stores_page_title"), copy.get("stores_page_description"));
    body.push_str("<section><div class=\"wrap grid-3\">");
    for s in stores {
        let img = s
            .image_url
            .as_deref()
            .and_then(safe_href)
            .map(|src| format!("<img src=\"{}\" alt=\"{}\" loading=\"lazy\">", src, e(&s.name)))
            .unwrap_or_default();
        let dianping = s
            .dianping_url
            .as_deref()
            .and_then(safe_href)
            .map(|href| format!("<a class=\"btn small\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">大众点评</a>", href))
            .unwrap_or_default();
        let map = match (s.latitude, s.longitude) {
            (Some(lat), Some(lng)) => format!(
                "<a class=\"btn small ghost\" href=\"https://uri.amap.com/marker?position={},{}&name={}\" target=\"_blank\" rel=\"noopener noreferrer\">地图导航</a>",
                lng,
                lat,
                e(&s.name)
            ),
            _ => String::new(),
        };
        body.push_str(&format!(
            r#"<article class="card store">{img}<h3>{name}</h3><p>📍 {address}</p><p>📞 <a href="tel:{phone}">{phone}</a></p><p>🕒 {hours}</p><p>{desc}</p><div class="actions">{map}{dianping}</div></article>"#,
            img = img,
            name = e(&s.name),
            address = e(&s.address),
            phone = e(&s.phone),
            hours = e(&s.hours),
            desc = e(s.description.as_deref().unwrap_or("")),
            map = map,
            dianping = dianping,
        ));
    }
    body.push_str("</div></section>");
    body.push_str(&format!(
        "<section class=\"alt\"><div class=\"wrap\"><h2>{}</h2><p class=\"lead\">{}</p></div></section>",
        e(copy.get("stores_map_title")),
        e(copy.get("stores_map_description"))
    ));
    layout(chrome, copy.get("stores_page_title"), "/stores", &body)
}

pub fn render_about(chrome: &Chrome, copy: &PageCopy) -> String {
    let mut body = page_header(copy.get("about_page_title"), copy.get("about_page_description"));

    body.push_str("<section><div class=\"wrap narrow\"><h2>我们的故事</h2>");
    for n in 1..=3 {
        let p = copy.get(&format!("about_story_paragraph_{}", n));
        if !p.is_empty() {
            body.push_str(&format!("<p>{}</p>", e(p)));
        }
    }
    body.push_str("</div></section>");

    body.push_str("<section class=\"alt\"><div class=\"wrap\"><h2>核心价值观</h2><div class=\"grid-2\">");
    for n in 1..=4 {
        body.push_str(&format!(
            "<div class=\"card\"><h3>{}</h3><p>{}</p></div>",
            e(copy.get(&format!("about_value_{}_title", n))),
            e(copy.get(&format!("about_value_{}_description", n))),
        ));
    }
    body.push_str("</div></div></section>");

    body.push_str("<section><div class=\"wrap narrow\"><h2>发展历程</h2><ol class=\"timeline\">");
    for n in 1..=5 {
        body.push_str(&format!(
            "<li><span class=\"year\">{}</span><h3>{}</h3><p>{}</p></li>",
            e(copy.get(&format!("about_milestone_{}_year", n))),
            e(copy.get(&format!("about_milestone_{}_title", n))),
            e(copy.get(&format!("about_milestone_{}_description", n))),
        ));
    }
    body.push_str("</ol></div></section>");

    body.push_str(&format!(
        "<section class=\"alt\"><div class=\"wrap narrow\"><h2>我们的团队</h2><p>{}</p></div></section>",
        e(copy.get("about_team_description"))
    ));

    body.push_str("<section><div class=\"wrap\"><h2>我们的成就</h2><div class=\"grid-3 stats\">");
    for n in 1..=3 {
        body.push_str(&format!(
            "<div><strong>{}</strong><span>{}</span></div>",
            e(copy.get(&format!("about_achievement_{}_number", n))),
            e(copy.get(&format!("about_achievement_{}_label", n))),
        ));
    }
    body.push_str("</div></div></section>");

    layout(chrome, copy.get("about_page_title"), "/about", &body)
}

pub fn render_reviews(chrome: &Chrome, testimonials: &[Testimonial]) -> String {
    let mut body = page_header("顾客评价", "听听我们的顾客怎么说，每一条评价都是对潮来最大的鼓励");

    let count = testimonials.len();
    let average = if count == 0 {
        0.0
    } else {
        testimonials.iter().map(|t| t.rating as f64).sum::<f64>() / count as f64
    };
    body.push_str(&format!(
        "<section class=\"alt\"><div class=\"wrap grid-2 stats\"><div><strong>{}</strong><span>总评价数（条）</span></div><div><strong>{:.1}</strong><span>平均评分（分）</span></div></div></section>",
        count, average
    ));

    body.push_str(&format!(
        "<section><div class=\"wrap\"><h2>所有顾客评价</h2>{}</div></section>",
        testimonial_cards(testimonials)
    ));
    body.push_str(&format!(
        r#"<section class="alt"><div class="wrap narrow center"><h2>想看更多真实评价？</h2><p>访问大众点评，查看数千条来自真实顾客的评价和门店照片</p><a class="btn" href="{}" target="_blank" rel="noopener noreferrer">前往大众点评 →</a></div></section>"#,
        DIANPING_SEARCH_URL
    ));
    layout(chrome, "顾客评价", "/reviews", &body)
}

fn notice_html(notice: &Option<Notice>) -> String {
    match notice {
        Some(Notice::Success(msg)) => format!("<div class=\"notice success\">{}</div>", e(msg)),
        Some(Notice::Error(msg)) => format!("<div class=\"notice error\">{}</div>", e(msg)),
        None => String::new(),
    }
}

fn input(form: &FormView, name: &str, label: &str, value: &str, kind: &str, required: bool) -> String {
    let err = form
        .errors
        .get(name)
        .map(|m| format!("<small class=\"field-error\">{}</small>", e(m)))
        .unwrap_or_default();
    format!(
        "<label>{}{}<input type=\"{}\" name=\"{}\" value=\"{}\"{}></label>{}",
        e(label),
        if required { " *" } else { "" },
        kind,
        name,
        e(value),
        if required { " required" } else { "" },
        err
    )
}

fn textarea(form: &FormView, name: &str, label: &str, required: bool) -> String {
    let err = form
        .errors
        .get(name)
        .map(|m| format!("<small class=\"field-error\">{}</small>", e(m)))
        .unwrap_or_default();
    format!(
        "<label>{}{}<textarea name=\"{}\" rows=\"5\" maxlength=\"1000\"{}>{}</textarea></label>{}",
        e(label),
        if required { " *" } else { "" },
        name,
        if required { " required" } else { "" },
        e(&form.values.message),
        err
    )
}

pub fn render_franchise(
    chrome: &Chrome,
    copy: &PageCopy,
    benefits: &[FranchiseBenefit],
    requirements: &[FranchiseRequirement],
    process: &[FranchiseStep],
    form: &FormView,
) -> String {
    let mut body = page_header(copy.get("franchise_page_title"), copy.get("franchise_page_description"));

    body.push_str(&format!(
        "<section><div class=\"wrap\"><h2>{}</h2><p class=\"lead\">{}</p><div class=\"grid-2\">",
        e(copy.get("franchise_page_benefits_title")),
        e(copy.get("franchise_page_benefits_description"))
    ));
    for b in benefits {
        body.push_str(&format!(
            "<div class=\"card\"><div class=\"glyph\">{}</div><h3>{}</h3><p>{}</p></div>",
            icon_glyph(&b.icon),
            e(&b.title),
            e(&b.description)
        ));
    }
    body.push_str("</div></div></section>");

    body.push_str(&format!(
        "<section class=\"alt\"><div class=\"wrap grid-2\"><div><h2>{}</h2><ul class=\"checks\">",
        e(copy.get("franchise_page_requirements_title"))
    ));
    for r in requirements {
        body.push_str(&format!("<li>{}</li>", e(&r.content)));
    }
    body.push_str(&format!(
        "</ul></div><div><h2>{}</h2><ol class=\"steps\">",
        e(copy.get("franchise_page_process_title"))
    ));
    for step in process {
        body.push_str(&format!(
            "<li><span class=\"step\">{}</span><div><h3>{}</h3><p>{}</p></div></li>",
            step.step_number,
            e(&step.title),
            e(&step.description)
        ));
    }
    body.push_str("</ol></div></div></section>");

    body.push_str(&format!(
        r#"<section id="apply"><div class="wrap narrow"><h2>{title}</h2><p class="lead">{desc}</p>{notice}
<form class="card form" method="post" action="/franchise#apply">{name}{phone}{email}{city}{message}
<button class="btn" type="submit">提交申请</button><p class="fine">{fine}</p></form></div></section>"#,
        title = e(copy.get("franchise_form_title")),
        desc = e(copy.get("franchise_form_description")),
        notice = notice_html(&form.notice),
        name = input(form, "name", "姓名", &form.values.name, "text", true),
        phone = input(form, "phone", "手机号码", &form.values.phone, "tel", true),
        email = input(form, "email", "电子邮箱", &form.values.email, "email", true),
        city = input(form, "city", "意向城市", form.values.city.as_deref().unwrap_or(""), "text", true),
        message = textarea(form, "message", "留言", false),
        fine = e(copy.get("franchise_form_notice")),
    ));

    layout(chrome, copy.get("franchise_page_title"), "/franchise", &body)
}

pub fn render_contact(chrome: &Chrome, copy: &PageCopy, form: &FormView) -> String {
    let mut body = page_header(copy.get("contact_page_title"), copy.get("contact_page_description"));

    body.push_str("<section><div class=\"wrap grid-2\"><div><h2>联系方式</h2><ul class=\"contact-lines big\">");
    for line in &chrome.contact_lines {
        let value = match line.link.as_deref().and_then(safe_href) {
            Some(href) => format!("<a href=\"{}\">{}</a>", href, e(&line.value)),
            None => e(&line.value),
        };
        body.push_str(&format!(
            "<li><span class=\"icon\">{}</span><div><strong>{}</strong><p>{}</p></div></li>",
            icon_glyph(&line.icon),
            e(&line.label),
            value
        ));
    }
    body.push_str("</ul></div>");

    body.push_str(&format!(
        r#"<div id="message"><h2>{title}</h2><p class="lead">{desc}</p>{notice}
<form class="card form" method="post" action="/contact#message">{name}{email}{phone}{message}
<button class="btn" type="submit">发送消息</button></form></div></div></section>"#,
        title = e(copy.get("contact_page_form_title")),
        desc = e(copy.get("contact_page_form_description")),
        notice = notice_html(&form.notice),
        name = input(form, "name", "姓名", &form.values.name, "text", true),
        email = input(form, "email", "电子邮箱", &form.values.email, "email", true),
        phone = input(form, "phone", "手机号码", &form.values.phone, "tel", true),
        message = textarea(form, "message", "留言内容", true),
    ));

    layout(chrome, copy.get("contact_page_title"), "/contact", &body)
}

pub fn render_not_found(chrome: &Chrome) -> String {
    let body = "<section class=\"page-header\"><div class=\"wrap\"><h1>404</h1><p>页面不存在</p><p><a class=\"btn\" href=\"/\">返回首页</a></p></div></section>";
    layout(chrome, "页面不存在", "", body)
}

const DEFAULT_CSS: &str = r#"
*{box-sizing:border-box}body{margin:0;font-family:-apple-system,"PingFang SC","Microsoft YaHei",sans-serif;color:#2b2118;background:#fffaf3;line-height:1.6}
a{color:#b33a1f}img{max-width:100%;display:block;border-radius:8px}
.wrap{max-width:1100px;margin:0 auto;padding:0 20px}.narrow{max-width:760px}.center{text-align:center}
.site-header{background:#fff;border-bottom:1px solid #eadfce;position:sticky;top:0;z-index:10}
.site-header .wrap{display:flex;align-items:center;justify-content:space-between;height:64px}
.logo{font-size:1.5rem;font-weight:700;color:#b33a1f;text-decoration:none}
nav a{margin-left:18px;color:#2b2118;text-decoration:none}nav a.active{color:#b33a1f;font-weight:600}
section{padding:56px 0}section.alt{background:#f6eddf}
.hero{background:linear-gradient(135deg,#b33a1f,#e0762c);color:#fff;padding:96px 0;text-align:center}
.hero h1{font-size:3rem;margin:0}.hero .subtitle{font-size:1.4rem}
.page-header{background:linear-gradient(90deg,#b33a1f,#d35a2a);color:#fff;text-align:center;padding:48px 0}
.grid-2,.grid-3{display:grid;gap:24px}.grid-2{grid-template-columns:repeat(auto-fit,minmax(320px,1fr))}
.grid-3{grid-template-columns:repeat(auto-fit,minmax(260px,1fr))}
.card{background:#fff;border:1px solid #eadfce;border-radius:12px;padding:24px}
.link-card{text-decoration:none;color:inherit}.lead{color:#6b5b4b}
.btn{display:inline-block;background:#b33a1f;color:#fff;padding:10px 22px;border-radius:8px;border:0;text-decoration:none;cursor:pointer}
.btn.ghost{background:transparent;border:1px solid currentColor;color:inherit}.btn.small{padding:6px 14px;font-size:.9rem}
.actions{display:flex;gap:12px;justify-content:center;margin-top:16px}
.stars{color:#e0a21b;letter-spacing:2px}.avatar{display:inline-flex;width:40px;height:40px;border-radius:50%;background:#f6eddf;align-items:center;justify-content:center;margin-right:10px}
.who{display:flex;align-items:center}.who small{display:block;color:#6b5b4b}
.menu-item{display:flex;gap:16px;align-items:flex-start}.menu-item img{width:96px;height:96px;object-fit:cover}
.price{margin-left:auto;font-weight:700;color:#b33a1f}.badge{font-size:.75rem;background:#fde3c8;border-radius:4px;padding:2px 6px;margin-left:4px}
.gallery-strip{display:flex;gap:16px;overflow-x:auto}.gallery-strip img{height:220px}
.timeline li{margin-bottom:18px}.year{font-weight:700;color:#b33a1f}
.stats strong{display:block;font-size:2.2rem;color:#b33a1f}.stats{text-align:center}
.form label{display:block;margin-bottom:12px}.form input,.form textarea{width:100%;padding:10px;border:1px solid #d8c8b4;border-radius:8px;font:inherit}
.field-error{color:#c0392b;display:block;margin:-8px 0 10px}.fine{font-size:.8rem;color:#6b5b4b}
.notice{padding:12px 16px;border-radius:8px;margin-bottom:16px}.notice.success{background:#e3f6e8;color:#1e6b34}.notice.error{background:#fde8e6;color:#a5281b}
.contact-lines{list-style:none;padding:0}.contact-lines li{margin-bottom:8px}.icon{margin-right:6px}
.site-footer{background:#2b2118;color:#eadfce;padding:40px 0 16px}.site-footer a{color:#fde3c8}.site-footer ul{list-style:none;padding:0}
.copyright{text-align:center;font-size:.85rem;opacity:.7;margin-top:24px}
"#;
