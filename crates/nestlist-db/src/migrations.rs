use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS gifts (
            id                TEXT PRIMARY KEY,
            title             TEXT NOT NULL,
            price             REAL,
            link              TEXT,
            notes             TEXT,
            images            TEXT NOT NULL DEFAULT '[]',
            is_shared         INTEGER NOT NULL DEFAULT 0,
            target_amount     REAL,
            min_contribution  REAL,
            reserved          INTEGER NOT NULL DEFAULT 0,
            reserved_by       TEXT,
            category          TEXT NOT NULL DEFAULT 'autres',
            created_at        TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
            updated_at        TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_gifts_created
            ON gifts(created_at);

        CREATE TABLE IF NOT EXISTS contributions (
            id                TEXT PRIMARY KEY,
            gift_id           TEXT NOT NULL REFERENCES gifts(id) ON DELETE CASCADE,
            name              TEXT NOT NULL,
            amount            REAL NOT NULL,
            payment_provider  TEXT,
            payment_id        TEXT,
            show_amount       INTEGER NOT NULL DEFAULT 1,
            created_at        TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_contributions_gift
            ON contributions(gift_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
