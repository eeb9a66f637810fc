use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

use crate::models::collection::{Collection, RecordFields};
use crate::models::content::FooterConfig;
use crate::resolver;

pub type DbPool = Pool<SqliteConnectionManager>;

pub fn init_pool_at(path: &str) -> Result<DbPool, String> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
    }
    let manager = SqliteConnectionManager::file(path)
        .with_init(|c| c.execute_batch("PRAGMA foreign_keys=ON; PRAGMA busy_timeout=5000;"));
    let pool = Pool::builder()
        .max_size(10)
        .build(manager)
        .map_err(|e| e.to_string())?;

    // Enable WAL mode for better concurrent read performance
    let conn = pool.get().map_err(|e| e.to_string())?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")
        .map_err(|e| e.to_string())?;

    Ok(pool)
}

/// Ordered tables share the same bookkeeping columns.
fn ordered_table(name: &str, domain_columns: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {name} (
            id INTEGER PRIMARY KEY,
            {domain_columns},
            sort_order INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            version INTEGER NOT NULL DEFAULT 1,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        CREATE INDEX IF NOT EXISTS idx_{name}_sort ON {name}(sort_order);"
    )
}

pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    conn.execute_batch(
        "
        -- Application settings (key-value)
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT
        );

        -- Page copy, grouped by page and category
        CREATE TABLE IF NOT EXISTS site_settings (
            id INTEGER PRIMARY KEY,
            page TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL DEFAULT '',
            description TEXT,
            category TEXT NOT NULL DEFAULT 'general',
            version INTEGER NOT NULL DEFAULT 1,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        CREATE INDEX IF NOT EXISTS idx_site_settings_page ON site_settings(page, key);

        -- Accounts
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            last_login_at DATETIME,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS profiles (
            id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
            role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('admin', 'user')),
            full_name TEXT,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at DATETIME NOT NULL,
            expires_at DATETIME NOT NULL,
            ip_address TEXT,
            user_agent TEXT
        );

        -- Public form submissions
        CREATE TABLE IF NOT EXISTS contact_submissions (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT NOT NULL,
            message TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'unread'
                CHECK (status IN ('unread', 'read', 'replied')),
            notes TEXT,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        CREATE INDEX IF NOT EXISTS idx_contact_status ON contact_submissions(status);

        CREATE TABLE IF NOT EXISTS franchise_applications (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            phone TEXT NOT NULL,
            email TEXT NOT NULL,
            city TEXT NOT NULL,
            message TEXT,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'contacted', 'rejected', 'partnered')),
            notes TEXT,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        CREATE INDEX IF NOT EXISTS idx_franchise_status ON franchise_applications(status);
        CREATE INDEX IF NOT EXISTS idx_franchise_email ON franchise_applications(email, created_at);

        -- Footer brand block (single row)
        CREATE TABLE IF NOT EXISTS footer_config (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            brand_name TEXT NOT NULL,
            brand_description TEXT NOT NULL,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        ",
    )?;

    let ordered = [
        ordered_table(
            "stores",
            "name TEXT NOT NULL,
            address TEXT NOT NULL,
            phone TEXT NOT NULL,
            hours TEXT NOT NULL,
            description TEXT,
            latitude REAL,
            longitude REAL,
            dianping_url TEXT,
            image_url TEXT",
        ),
        ordered_table(
            "menu_items",
            "name TEXT NOT NULL,
            category TEXT NOT NULL,
            price REAL NOT NULL DEFAULT 0,
            description TEXT,
            spicy_level INTEGER NOT NULL DEFAULT 0,
            is_bestseller INTEGER NOT NULL DEFAULT 0,
            image_url TEXT",
        ),
        ordered_table("menu_categories", "name TEXT NOT NULL"),
        ordered_table("menu_tips", "content TEXT NOT NULL"),
        ordered_table(
            "testimonials",
            "name TEXT NOT NULL,
            role TEXT NOT NULL,
            content TEXT NOT NULL,
            rating INTEGER NOT NULL DEFAULT 5,
            avatar TEXT NOT NULL",
        ),
        ordered_table("brand_gallery", "image_url TEXT NOT NULL, alt_text TEXT NOT NULL"),
        ordered_table(
            "franchise_benefits",
            "icon TEXT NOT NULL, title TEXT NOT NULL, description TEXT NOT NULL",
        ),
        ordered_table("franchise_requirements", "content TEXT NOT NULL"),
        ordered_table(
            "franchise_process",
            "step_number INTEGER NOT NULL, title TEXT NOT NULL, description TEXT NOT NULL",
        ),
        ordered_table(
            "contact_info",
            "icon TEXT NOT NULL, label TEXT NOT NULL, value TEXT NOT NULL, link TEXT",
        ),
    ];
    for ddl in ordered.iter() {
        conn.execute_batch(ddl)?;
    }
    conn.execute_batch("CREATE INDEX IF NOT EXISTS idx_menu_items_category ON menu_items(category);")?;

    Ok(())
}

pub fn seed_defaults(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    let defaults = vec![
        // Security
        ("session_expiry_hours", "24"),
        ("login_rate_limit", "5"),
        // Tasks
        ("task_session_cleanup_interval", "30"),
        // Public
        ("site_name", "潮来"),
        ("site_url", "http://localhost:8000"),
    ];

    for (key, value) in defaults {
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
    }

    let footer = FooterConfig::default();
    conn.execute(
        "INSERT OR IGNORE INTO footer_config (id, brand_name, brand_description) VALUES (1, ?1, ?2)",
        params![footer.brand_name, footer.brand_description],
    )?;

    Ok(())
}

/// Inserts the starter rows for every seeded collection.
pub fn seed_starter_content(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;
    for (collection, rows) in starter_content() {
        for (i, fields) in rows.into_iter().enumerate() {
            insert_starter(&conn, collection, &fields, i as i64 + 1)?;
        }
    }
    Ok(())
}

fn starter_content() -> Vec<(Collection, Vec<RecordFields>)> {
    vec![
        (
            Collection::ContactInfo,
            resolver::default_contact_lines()
                .into_iter()
                .map(|l| {
                    RecordFields::new()
                        .set("icon", l.icon)
                        .set("label", l.label)
                        .set("value", l.value)
                        .set("link", l.link)
                })
                .collect(),
        ),
        (
            Collection::Testimonials,
            resolver::default_testimonials()
                .into_iter()
                .map(|t| {
                    RecordFields::new()
                        .set("name", t.name)
                        .set("role", t.role)
                        .set("content", t.content)
                        .set("rating", t.rating)
                        .set("avatar", t.avatar)
                })
                .collect(),
        ),
        (
            Collection::FranchiseBenefits,
            resolver::default_benefits()
                .into_iter()
                .map(|b| {
                    RecordFields::new()
                        .set("icon", b.icon)
                        .set("title", b.title)
                        .set("description", b.description)
                })
                .collect(),
        ),
        (
            Collection::FranchiseRequirements,
            resolver::default_requirements()
                .into_iter()
                .map(|r| RecordFields::new().set("content", r.content))
                .collect(),
        ),
        (
            Collection::FranchiseProcess,
            resolver::default_process()
                .into_iter()
                .map(|s| {
                    RecordFields::new()
                        .set("step_number", s.step_number)
                        .set("title", s.title)
                        .set("description", s.description)
                })
                .collect(),
        ),
        (
            Collection::MenuCategories,
            resolver::default_menu_categories()
                .into_iter()
                .map(|c| RecordFields::new().set("name", c.name))
                .collect(),
        ),
        (
            Collection::MenuTips,
            resolver::default_menu_tips()
                .into_iter()
                .map(|t| RecordFields::new().set("content", t.content))
                .collect(),
        ),
    ]
}

fn insert_starter(
    conn: &rusqlite::Connection,
    collection: Collection,
    fields: &RecordFields,
    sort_order: i64,
) -> rusqlite::Result<()> {
    let names: Vec<&str> = collection.fields().iter().map(|f| f.name).collect();
    let placeholders: Vec<String> = (1..=names.len() + 1).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO {} ({}, sort_order) VALUES ({})",
        collection.table(),
        names.join(", "),
        placeholders.join(", ")
    );
    let mut values: Vec<rusqlite::types::Value> = collection
        .fields()
        .iter()
        .map(|spec| crate::store::sqlite::to_sql_value(spec, fields.values.get(spec.name)))
        .collect();
    values.push(rusqlite::types::Value::Integer(sort_order));
    conn.execute(&sql, rusqlite::params_from_iter(values))?;
    Ok(())
}
