use std::collections::HashMap;

use anyhow::Result;
use rusqlite::{Connection, Row, params};
use uuid::Uuid;

use nestlist_types::models::{Contribution, Gift, GiftWithContributions};

use crate::Database;
use crate::models::{ContributionRow, GiftDraft, GiftRow, NewContribution};

const GIFT_COLUMNS: &str = "id, title, price, link, notes, images, is_shared, target_amount, \
     min_contribution, reserved, reserved_by, category, created_at, updated_at";

const CONTRIBUTION_COLUMNS: &str =
    "id, gift_id, name, amount, payment_provider, payment_id, show_amount, created_at";

const NOW: &str = "strftime('%Y-%m-%d %H:%M:%f', 'now')";

/// Result of a reservation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ReserveOutcome {
    Reserved(Gift),
    /// The gift is shared or someone already holds it.
    Unavailable(Gift),
    NotFound,
}

impl Database {
    // -- Gifts --

    /// All gifts with their contributions, oldest first.
    pub fn list_gifts(&self) -> Result<Vec<GiftWithContributions>> {
        self.with_conn(|conn| {
            let gifts = query_gifts(conn)?;
            let mut by_gift: HashMap<Uuid, Vec<Contribution>> = HashMap::new();
            for c in query_contributions(conn, None)? {
                by_gift.entry(c.gift_id).or_default().push(c);
            }

            Ok(gifts
                .into_iter()
                .map(|gift| {
                    let contributions = by_gift.remove(&gift.id).unwrap_or_default();
                    GiftWithContributions::assemble(gift, contributions)
                })
                .collect())
        })
    }

    pub fn get_gift(&self, id: Uuid) -> Result<Option<GiftWithContributions>> {
        self.with_conn(|conn| query_gift_with_contributions(conn, id))
    }

    pub fn insert_gift(&self, draft: &GiftDraft) -> Result<Gift> {
        let id = Uuid::new_v4();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO gifts (id, title, price, link, notes, images, is_shared, target_amount, min_contribution, category)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    id.to_string(),
                    draft.title,
                    draft.price,
                    draft.link,
                    draft.notes,
                    serde_json::to_string(&draft.images)?,
                    draft.is_shared,
                    draft.target_amount,
                    draft.min_contribution,
                    draft.category.as_str(),
                ],
            )?;
            query_gift(conn, id)?.ok_or_else(|| anyhow::anyhow!("Gift vanished after insert: {}", id))
        })
    }

    /// Replace the editable fields of a gift. Reservation state is left alone.
    pub fn update_gift(&self, id: Uuid, draft: &GiftDraft) -> Result<Option<Gift>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                &format!(
                    "UPDATE gifts SET title = ?2, price = ?3, link = ?4, notes = ?5, images = ?6,
                         is_shared = ?7, target_amount = ?8, min_contribution = ?9, category = ?10,
                         updated_at = {NOW}
                     WHERE id = ?1"
                ),
                params![
                    id.to_string(),
                    draft.title,
                    draft.price,
                    draft.link,
                    draft.notes,
                    serde_json::to_string(&draft.images)?,
                    draft.is_shared,
                    draft.target_amount,
                    draft.min_contribution,
                    draft.category.as_str(),
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_gift(conn, id)
        })
    }

    /// Delete a gift and, through the foreign key, its contributions.
    /// Returns false when no such gift existed.
    pub fn delete_gift(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM gifts WHERE id = ?1", [id.to_string()])?;
            Ok(deleted > 0)
        })
    }

    // -- Reservations --

    /// Claim a single-buyer gift. The claim only lands if the gift is still free,
    /// so two concurrent callers cannot both win.
    pub fn reserve_gift(&self, id: Uuid, reserved_by: &str) -> Result<ReserveOutcome> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                &format!(
                    "UPDATE gifts SET reserved = 1, reserved_by = ?2, updated_at = {NOW}
                     WHERE id = ?1 AND reserved = 0 AND is_shared = 0"
                ),
                params![id.to_string(), reserved_by],
            )?;

            Ok(match (changed, query_gift(conn, id)?) {
                (_, None) => ReserveOutcome::NotFound,
                (0, Some(gift)) => ReserveOutcome::Unavailable(gift),
                (_, Some(gift)) => ReserveOutcome::Reserved(gift),
            })
        })
    }

    /// Release a reservation. The flag is true when the gift was actually reserved;
    /// releasing a free gift leaves the row untouched.
    pub fn unreserve_gift(&self, id: Uuid) -> Result<Option<(Gift, bool)>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                &format!(
                    "UPDATE gifts SET reserved = 0, reserved_by = NULL, updated_at = {NOW}
                     WHERE id = ?1 AND reserved = 1"
                ),
                [id.to_string()],
            )?;
            Ok(query_gift(conn, id)?.map(|gift| (gift, changed > 0)))
        })
    }

    // -- Contributions --

    pub fn list_contributions(&self, gift_id: Uuid) -> Result<Vec<Contribution>> {
        self.with_conn(|conn| query_contributions(conn, Some(gift_id)))
    }

    /// Insert a contribution after `check` approves the gift's current funding state.
    ///
    /// The check and the insert share one transaction. `check` receives `None` when
    /// the gift does not exist; whatever it returns is handed back alongside the row,
    /// and its error untouched in the inner result.
    pub fn insert_contribution_checked<R, E, F>(
        &self,
        new: &NewContribution,
        check: F,
    ) -> Result<std::result::Result<(Contribution, R), E>>
    where
        F: FnOnce(Option<&GiftWithContributions>) -> std::result::Result<R, E>,
    {
        let id = Uuid::new_v4();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let current = query_gift_with_contributions(&tx, new.gift_id)?;
            let approved = match check(current.as_ref()) {
                Ok(approved) => approved,
                Err(e) => return Ok(Err(e)),
            };

            tx.execute(
                "INSERT INTO contributions (id, gift_id, name, amount, payment_provider, payment_id, show_amount)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id.to_string(),
                    new.gift_id.to_string(),
                    new.name,
                    new.amount,
                    new.payment_provider,
                    new.payment_id,
                    new.show_amount,
                ],
            )?;
            let inserted = query_contribution(&tx, id)?
                .ok_or_else(|| anyhow::anyhow!("Contribution vanished after insert: {}", id))?;
            tx.commit()?;

            Ok(Ok((inserted, approved)))
        })
    }

    pub fn delete_contribution(&self, id: Uuid) -> Result<Option<Contribution>> {
        self.with_conn(|conn| {
            let existing = query_contribution(conn, id)?;
            if existing.is_some() {
                conn.execute("DELETE FROM contributions WHERE id = ?1", [id.to_string()])?;
            }
            Ok(existing)
        })
    }
}

fn gift_row(row: &Row<'_>) -> rusqlite::Result<GiftRow> {
    Ok(GiftRow {
        id: row.get(0)?,
        title: row.get(1)?,
        price: row.get(2)?,
        link: row.get(3)?,
        notes: row.get(4)?,
        images: row.get(5)?,
        is_shared: row.get(6)?,
        target_amount: row.get(7)?,
        min_contribution: row.get(8)?,
        reserved: row.get(9)?,
        reserved_by: row.get(10)?,
        category: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn contribution_row(row: &Row<'_>) -> rusqlite::Result<ContributionRow> {
    Ok(ContributionRow {
        id: row.get(0)?,
        gift_id: row.get(1)?,
        name: row.get(2)?,
        amount: row.get(3)?,
        payment_provider: row.get(4)?,
        payment_id: row.get(5)?,
        show_amount: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn query_gifts(conn: &Connection) -> Result<Vec<Gift>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GIFT_COLUMNS} FROM gifts ORDER BY created_at ASC, rowid ASC"
    ))?;

    let rows = stmt
        .query_map([], gift_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows.into_iter().map(Gift::from).collect())
}

fn query_gift(conn: &Connection, id: Uuid) -> Result<Option<Gift>> {
    let mut stmt = conn.prepare(&format!("SELECT {GIFT_COLUMNS} FROM gifts WHERE id = ?1"))?;
    let row = stmt.query_row([id.to_string()], gift_row).optional()?;
    Ok(row.map(Gift::from))
}

fn query_gift_with_contributions(conn: &Connection, id: Uuid) -> Result<Option<GiftWithContributions>> {
    let Some(gift) = query_gift(conn, id)? else {
        return Ok(None);
    };
    let contributions = query_contributions(conn, Some(id))?;
    Ok(Some(GiftWithContributions::assemble(gift, contributions)))
}

fn query_contributions(conn: &Connection, gift_id: Option<Uuid>) -> Result<Vec<Contribution>> {
    let rows = match gift_id {
        Some(gift_id) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONTRIBUTION_COLUMNS} FROM contributions WHERE gift_id = ?1
                 ORDER BY created_at ASC, rowid ASC"
            ))?;
            stmt.query_map([gift_id.to_string()], contribution_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONTRIBUTION_COLUMNS} FROM contributions ORDER BY created_at ASC, rowid ASC"
            ))?;
            stmt.query_map([], contribution_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    Ok(rows.into_iter().map(Contribution::from).collect())
}

fn query_contribution(conn: &Connection, id: Uuid) -> Result<Option<Contribution>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CONTRIBUTION_COLUMNS} FROM contributions WHERE id = ?1"
    ))?;
    let row = stmt.query_row([id.to_string()], contribution_row).optional()?;
    Ok(row.map(Contribution::from))
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
