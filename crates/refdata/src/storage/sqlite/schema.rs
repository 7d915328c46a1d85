//! SQLite schema definitions and SQL query constants.
//!
//! Pure data, no I/O. Description rows are keyed by the upper-cased canonical
//! text so that lookups match case-insensitively.

/// How long a statement waits on a locked database before failing as busy.
pub const BUSY_TIMEOUT_MS: u64 = 5_000;

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
-- Countries table
CREATE TABLE IF NOT EXISTS countries (
    country_qid TEXT PRIMARY KEY,
    country_code TEXT,
    country_label TEXT NOT NULL
);

-- Places table
CREATE TABLE IF NOT EXISTS places (
    place_qid TEXT PRIMARY KEY,
    country_qid TEXT NOT NULL,
    place_label TEXT NOT NULL,
    FOREIGN KEY (country_qid) REFERENCES countries(country_qid)
);

-- Free-text place descriptions awaiting or carrying a resolution
CREATE TABLE IF NOT EXISTS place_external_descriptions (
    lookup_key TEXT PRIMARY KEY,
    external_text TEXT NOT NULL,
    place_qid TEXT,
    has_error INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (place_qid) REFERENCES places(place_qid)
);

-- Wikipedia languages
CREATE TABLE IF NOT EXISTS languages (
    language_code TEXT PRIMARY KEY,
    wikipedia_qid TEXT,
    sort_order INTEGER
);

-- Languages spoken per country
CREATE TABLE IF NOT EXISTS country_languages (
    country_qid TEXT NOT NULL,
    language_code TEXT NOT NULL,
    PRIMARY KEY (country_qid, language_code),
    FOREIGN KEY (language_code) REFERENCES languages(language_code)
);

-- Indexes for efficient queries
CREATE INDEX IF NOT EXISTS idx_countries_code ON countries(country_code);
CREATE INDEX IF NOT EXISTS idx_places_country_qid ON places(country_qid);
CREATE INDEX IF NOT EXISTS idx_languages_sort_order ON languages(sort_order);
"#;

// Country queries
pub const INSERT_COUNTRY: &str = r#"
INSERT INTO countries (country_qid, country_code, country_label)
VALUES (?1, ?2, ?3)
"#;

pub const SELECT_COUNTRY_BY_QID: &str = r#"
SELECT country_qid, country_code, country_label
FROM countries
WHERE country_qid = ?1
"#;

pub const SELECT_COUNTRY_BY_CODE: &str = r#"
SELECT country_qid, country_code, country_label
FROM countries
WHERE country_code = ?1
ORDER BY country_qid
LIMIT 1
"#;

pub const COUNTRY_EXISTS: &str = r#"
SELECT EXISTS (SELECT 1 FROM countries WHERE country_qid = ?1)
"#;

// Place queries
pub const INSERT_PLACE: &str = r#"
INSERT INTO places (place_qid, country_qid, place_label)
VALUES (?1, ?2, ?3)
"#;

pub const SELECT_PLACE_BY_QID: &str = r#"
SELECT place_qid, country_qid, place_label
FROM places
WHERE place_qid = ?1
"#;

pub const PLACE_EXISTS: &str = r#"
SELECT EXISTS (SELECT 1 FROM places WHERE place_qid = ?1)
"#;

// Place description queries
pub const INSERT_PLACE_DESCRIPTION_IF_ABSENT: &str = r#"
INSERT OR IGNORE INTO place_external_descriptions (lookup_key, external_text)
VALUES (?1, ?2)
"#;

pub const SELECT_PLACE_DESCRIPTION: &str = r#"
SELECT external_text, place_qid, has_error
FROM place_external_descriptions
WHERE lookup_key = ?1
"#;

pub const RESOLVE_PLACE_DESCRIPTION: &str = r#"
UPDATE place_external_descriptions
SET place_qid = ?2, has_error = 0
WHERE lookup_key = ?1
"#;

pub const MARK_PLACE_DESCRIPTION_ERROR: &str = r#"
UPDATE place_external_descriptions
SET has_error = 1
WHERE lookup_key = ?1
"#;

pub const SELECT_UNRESOLVED_PLACE_DESCRIPTIONS: &str = r#"
SELECT external_text, place_qid, has_error
FROM place_external_descriptions
WHERE place_qid IS NULL OR has_error <> 0
ORDER BY external_text
"#;

// Language queries
pub const INSERT_LANGUAGE: &str = r#"
INSERT INTO languages (language_code, wikipedia_qid, sort_order)
VALUES (?1, ?2, ?3)
"#;

pub const INSERT_COUNTRY_LANGUAGE: &str = r#"
INSERT OR IGNORE INTO country_languages (country_qid, language_code)
VALUES (?1, ?2)
"#;

pub const SELECT_LANGUAGES_FOR_COUNTRY: &str = r#"
SELECT l.language_code
FROM country_languages cl
INNER JOIN languages l ON l.language_code = cl.language_code
WHERE cl.country_qid = ?1
ORDER BY l.sort_order IS NULL, l.sort_order, l.language_code
"#;

pub const SELECT_SORTED_LANGUAGES: &str = r#"
SELECT language_code
FROM languages
WHERE sort_order IS NOT NULL
ORDER BY sort_order, language_code
"#;

pub const SELECT_WIKIPEDIA_QID: &str = r#"
SELECT wikipedia_qid
FROM languages
WHERE language_code = ?1
"#;
