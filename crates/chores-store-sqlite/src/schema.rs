//! SQL schema and fixed data for the Housechores SQLite store.
//!
//! [`SCHEMA`] is destructive: it drops every table before recreating it, so
//! running it is how a store gets (re)initialised. Whether a store exists at
//! all is decided by the presence of the `meta` table.

/// Stored in meta under `dbversion`.
pub const SCHEMA_VERSION: &str = "1";

/// Applied on every open; harmless for in-memory databases.
pub const PRAGMAS: &str = "PRAGMA journal_mode = WAL;";

/// Full schema DDL. Runs inside the initialisation transaction.
pub const SCHEMA: &str = "
DROP VIEW  IF EXISTS overview;
DROP VIEW  IF EXISTS chores_lastaction;
DROP TABLE IF EXISTS actions;
DROP TABLE IF EXISTS chores;
DROP TABLE IF EXISTS persons;
DROP TABLE IF EXISTS roles;
DROP TABLE IF EXISTS meta;

CREATE TABLE meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE roles (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE persons (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    name                 TEXT NOT NULL,
    name_key             TEXT NOT NULL UNIQUE,   -- lowercased name
    password             TEXT NOT NULL,   -- argon2 PHC string
    role_id              INTEGER NOT NULL,
    must_change_password INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE chores (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);

-- person_id and chore_id are deliberately not foreign keys: creation accepts
-- any id and deleting a person leaves their actions behind. Chore deletion
-- removes dependent actions explicitly, in the same transaction.
CREATE TABLE actions (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    action_date TEXT NOT NULL,        -- YYYY-MM-DD
    person_id   INTEGER NOT NULL,
    chore_id    INTEGER NOT NULL
);

CREATE INDEX actions_chore_idx ON actions(chore_id);
CREATE INDEX actions_date_idx  ON actions(action_date);

CREATE VIEW overview AS
    SELECT a.id          AS id,
           a.action_date AS action_date,
           a.chore_id    AS chore_id,
           c.name        AS chore,
           a.person_id   AS person_id,
           p.name        AS person
    FROM actions a
    LEFT JOIN chores  c ON c.id = a.chore_id
    LEFT JOIN persons p ON p.id = a.person_id;

CREATE VIEW chores_lastaction AS
    SELECT c.id               AS chore_id,
           c.name             AS chore,
           MAX(a.action_date) AS last_action
    FROM chores c
    LEFT JOIN actions a ON a.chore_id = c.id
    GROUP BY c.id, c.name;

INSERT INTO roles (id, name) VALUES (1, 'admin'), (2, 'user');
INSERT INTO meta (key, value) VALUES ('actions_per_page', '0');
";

/// Role assigned to the default administrator.
pub const ADMIN_ROLE_ID: i64 = 1;

/// Sample household. Explicit ids keep reloading idempotent; the person rows
/// are inserted separately because they need a password hash.
pub const SAMPLE_DATA: &str = "
INSERT OR IGNORE INTO chores (id, name) VALUES
    (1, 'dishes'),
    (2, 'vacuum cleaning'),
    (3, 'laundry'),
    (4, 'groceries lidl'),
    (5, 'change bedsheets'),
    (6, 'take out trash');

INSERT OR IGNORE INTO actions (id, action_date, person_id, chore_id) VALUES
    (1, '2015-10-01', 1, 1),
    (2, '2015-10-02', 2, 1),
    (3, '2015-10-02', 1, 2),
    (4, '2015-10-03', 3, 3),
    (5, '2015-10-04', 2, 5),
    (6, '2015-10-05', 3, 6);
";

/// `(id, name, role_id)` of the sample persons besides the administrator.
pub const SAMPLE_PERSONS: &[(i64, &str, i64)] =
  &[(2, "random", 2), (3, "alice", 2)];
