//! SQLite schema

pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS pagetext (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    page_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    text TEXT NOT NULL,
    is_link INTEGER NOT NULL DEFAULT 0,
    link_id INTEGER,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    is_edited INTEGER NOT NULL DEFAULT 0,
    path TEXT,
    source INTEGER,
    FOREIGN KEY(page_id) REFERENCES pages(id),
    FOREIGN KEY(link_id) REFERENCES pages(id),
    FOREIGN KEY(source) REFERENCES pages(id),
    FOREIGN KEY(user_id) REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS pagetext_page ON pagetext (page_id, created_at);

INSERT OR IGNORE INTO pages (id, title) VALUES (0, 'Home');
INSERT OR IGNORE INTO pages (id, title) VALUES (1, 'Profile');
"#;

/// Databases created before entries tracked their source lack the column
pub const ADD_SOURCE_COLUMN: &str = "ALTER TABLE pagetext ADD COLUMN source INTEGER";

pub const HOME_TITLE: &str = "Home";
pub const PROFILE_TITLE: &str = "Profile";
