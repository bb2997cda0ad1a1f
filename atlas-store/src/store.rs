//! SQLite-backed store implementation.

use crate::error::{StoreError, StoreResult};
use atlas_model::{
    AbilityLine, EvolutionGraph, EvolutionStep, MoveLine, Pokemon, PokemonDetailed, PokemonId,
    PokemonKey, PokemonSummary, StatLine,
};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::sync::{Arc, Mutex};
use tracing::debug;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS entities (
        id INTEGER PRIMARY KEY,
        name TEXT UNIQUE NOT NULL,
        height INTEGER NOT NULL,
        weight INTEGER NOT NULL,
        sprite_url TEXT
    );

    CREATE TABLE IF NOT EXISTS types (
        name TEXT PRIMARY KEY
    );

    CREATE TABLE IF NOT EXISTS entity_types (
        entity_id INTEGER NOT NULL,
        type_name TEXT NOT NULL,
        slot INTEGER,

        PRIMARY KEY (entity_id, type_name),
        FOREIGN KEY (entity_id) REFERENCES entities(id),
        FOREIGN KEY (type_name) REFERENCES types(name)
    );

    CREATE TABLE IF NOT EXISTS abilities (
        name TEXT PRIMARY KEY
    );

    CREATE TABLE IF NOT EXISTS entity_abilities (
        entity_id INTEGER NOT NULL,
        ability_name TEXT NOT NULL,
        is_hidden INTEGER NOT NULL CHECK (is_hidden IN (0, 1)),

        PRIMARY KEY (entity_id, ability_name),
        FOREIGN KEY (entity_id) REFERENCES entities(id),
        FOREIGN KEY (ability_name) REFERENCES abilities(name)
    );

    CREATE TABLE IF NOT EXISTS stats (
        name TEXT PRIMARY KEY
    );

    CREATE TABLE IF NOT EXISTS entity_stats (
        entity_id INTEGER NOT NULL,
        stat_name TEXT NOT NULL,
        effort INTEGER NOT NULL,
        base_stat INTEGER NOT NULL,

        PRIMARY KEY (entity_id, stat_name),
        FOREIGN KEY (entity_id) REFERENCES entities(id),
        FOREIGN KEY (stat_name) REFERENCES stats(name)
    );

    CREATE TABLE IF NOT EXISTS moves (
        name TEXT PRIMARY KEY
    );

    CREATE TABLE IF NOT EXISTS move_learn_methods (
        learn_method TEXT PRIMARY KEY
    );

    CREATE TABLE IF NOT EXISTS version_groups (
        version_name TEXT PRIMARY KEY
    );

    CREATE TABLE IF NOT EXISTS entity_moves (
        move_name TEXT NOT NULL,
        entity_id INTEGER NOT NULL,
        version_group TEXT NOT NULL,
        move_learn_method TEXT NOT NULL,
        level_learned_at INTEGER,

        PRIMARY KEY (move_name, entity_id, version_group, move_learn_method),
        FOREIGN KEY (entity_id) REFERENCES entities(id),
        FOREIGN KEY (move_name) REFERENCES moves(name),
        FOREIGN KEY (version_group) REFERENCES version_groups(version_name),
        FOREIGN KEY (move_learn_method) REFERENCES move_learn_methods(learn_method)
    );

    CREATE TABLE IF NOT EXISTS evolution_edges (
        from_id INTEGER NOT NULL,
        to_id INTEGER NOT NULL,
        min_level INTEGER,
        trigger_name TEXT,

        PRIMARY KEY (from_id, to_id),
        FOREIGN KEY (from_id) REFERENCES entities(id),
        FOREIGN KEY (to_id) REFERENCES entities(id)
    );
";

const SUMMARY_COLUMNS: &str = "
    e.id, e.name, e.height, e.weight, e.sprite_url,
    (SELECT json_group_array(type_name)
       FROM (SELECT type_name FROM entity_types
              WHERE entity_id = e.id ORDER BY slot)) AS type_names
";

/// Local store backed by SQLite. Cheap to clone; clones share one
/// connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: &str) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        // Referential integrity is enforced at the schema level; edge writes
        // rely on FK violations to detect missing endpoints.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Creates the schema. Idempotent.
    pub fn init(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Closes the underlying connection if this is the last handle.
    pub fn close(self) -> StoreResult<()> {
        if let Ok(mutex) = Arc::try_unwrap(self.conn) {
            let conn = mutex.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
            conn.close().map_err(|(_, e)| StoreError::Database(e))?;
        }
        Ok(())
    }

    // ── Writes ───────────────────────────────────────────────────

    /// Persists a full record: the base row plus every nested collection,
    /// in one transaction. Insert-or-ignore throughout; an already stored
    /// record is left untouched.
    pub fn upsert_pokemon(&self, pokemon: &Pokemon) -> StoreResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT OR IGNORE INTO entities (id, name, height, weight, sprite_url)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                pokemon.id.as_i64(),
                pokemon.name,
                pokemon.height,
                pokemon.weight,
                pokemon.sprites.front_default,
            ],
        )?;

        {
            let mut insert_type =
                tx.prepare("INSERT OR IGNORE INTO types (name) VALUES (?1)")?;
            let mut insert_entity_type = tx.prepare(
                "INSERT OR IGNORE INTO entity_types (entity_id, type_name, slot)
                 VALUES (?1, ?2, ?3)",
            )?;
            for t in &pokemon.types {
                insert_type.execute(params![t.type_ref.name])?;
                insert_entity_type.execute(params![
                    pokemon.id.as_i64(),
                    t.type_ref.name,
                    t.slot
                ])?;
            }

            let mut insert_ability =
                tx.prepare("INSERT OR IGNORE INTO abilities (name) VALUES (?1)")?;
            let mut insert_entity_ability = tx.prepare(
                "INSERT OR IGNORE INTO entity_abilities (entity_id, ability_name, is_hidden)
                 VALUES (?1, ?2, ?3)",
            )?;
            for a in &pokemon.abilities {
                insert_ability.execute(params![a.ability.name])?;
                insert_entity_ability.execute(params![
                    pokemon.id.as_i64(),
                    a.ability.name,
                    a.is_hidden
                ])?;
            }

            let mut insert_stat =
                tx.prepare("INSERT OR IGNORE INTO stats (name) VALUES (?1)")?;
            let mut insert_entity_stat = tx.prepare(
                "INSERT OR IGNORE INTO entity_stats (entity_id, stat_name, effort, base_stat)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for s in &pokemon.stats {
                insert_stat.execute(params![s.stat.name])?;
                insert_entity_stat.execute(params![
                    pokemon.id.as_i64(),
                    s.stat.name,
                    s.effort,
                    s.base_stat
                ])?;
            }

            let mut insert_move =
                tx.prepare("INSERT OR IGNORE INTO moves (name) VALUES (?1)")?;
            let mut insert_method = tx.prepare(
                "INSERT OR IGNORE INTO move_learn_methods (learn_method) VALUES (?1)",
            )?;
            let mut insert_group = tx.prepare(
                "INSERT OR IGNORE INTO version_groups (version_name) VALUES (?1)",
            )?;
            let mut insert_entity_move = tx.prepare(
                "INSERT OR IGNORE INTO entity_moves
                 (move_name, entity_id, version_group, move_learn_method, level_learned_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for m in &pokemon.moves {
                insert_move.execute(params![m.move_ref.name])?;
                for d in &m.version_group_details {
                    insert_method.execute(params![d.move_learn_method.name])?;
                    insert_group.execute(params![d.version_group.name])?;
                    insert_entity_move.execute(params![
                        m.move_ref.name,
                        pokemon.id.as_i64(),
                        d.version_group.name,
                        d.move_learn_method.name,
                        d.level_learned_at
                    ])?;
                }
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Persists every edge of an evolution graph in one transaction.
    /// Fails with a constraint violation if any endpoint is not yet stored;
    /// nothing is persisted in that case.
    pub fn upsert_evolution_edges(&self, graph: &EvolutionGraph) -> StoreResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        {
            let mut insert_edge = tx.prepare(
                "INSERT OR IGNORE INTO evolution_edges (from_id, to_id, min_level, trigger_name)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for edge in &graph.edges {
                insert_edge.execute(params![
                    edge.from.as_i64(),
                    edge.to.as_i64(),
                    edge.min_level,
                    edge.trigger
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    // ── Reads ────────────────────────────────────────────────────

    /// Whether an entity with this id is stored.
    pub fn contains(&self, id: PokemonId) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        let found: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM entities WHERE id = ?1)",
            params![id.as_i64()],
            |row| row.get(0),
        )?;
        Ok(found)
    }

    /// Point lookup of the summary view by name or id.
    pub fn get_summary(&self, key: &PokemonKey) -> StoreResult<PokemonSummary> {
        let conn = self.conn.lock().unwrap();
        let row = match key {
            PokemonKey::Name(name) => conn
                .query_row(
                    &format!("SELECT {SUMMARY_COLUMNS} FROM entities e WHERE e.name = ?1"),
                    params![name],
                    summary_row,
                )
                .optional()?,
            PokemonKey::Id(id) => conn
                .query_row(
                    &format!("SELECT {SUMMARY_COLUMNS} FROM entities e WHERE e.id = ?1"),
                    params![id.as_i64()],
                    summary_row,
                )
                .optional()?,
        };
        match row {
            Some(raw) => decode_summary(raw),
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }

    /// Reads the summaries covering ids `(offset, offset+limit]`, validating
    /// contiguity as it walks. Any gap in the stored id sequence invalidates
    /// the whole range and an empty list is returned, signalling a full
    /// cache miss to the caller.
    pub fn get_range(&self, offset: u32, limit: u32) -> StoreResult<Vec<PokemonSummary>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM entities e
             WHERE e.id > ?1 AND e.id <= ?2 ORDER BY e.id"
        ))?;
        let rows = stmt.query_map(
            params![i64::from(offset), i64::from(offset) + i64::from(limit)],
            summary_row,
        )?;

        let mut summaries = Vec::new();
        let mut expected = i64::from(offset) + 1;
        for row in rows {
            let raw = row?;
            if raw.0 != expected {
                debug!(expected, found = raw.0, "gap in stored id range");
                return Ok(Vec::new());
            }
            summaries.push(decode_summary(raw)?);
            expected += 1;
        }
        Ok(summaries)
    }

    /// Reads the detailed view: every persisted attribute plus the complete
    /// evolution chain of the line the entity belongs to.
    pub fn get_detailed(&self, id: PokemonId) -> StoreResult<PokemonDetailed> {
        let conn = self.conn.lock().unwrap();

        let base = conn
            .query_row(
                "SELECT id, name, height, weight, sprite_url FROM entities WHERE id = ?1",
                params![id.as_i64()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, Option<String>>(4)?,
                    ))
                },
            )
            .optional()?;
        let Some((raw_id, name, height, weight, sprite_url)) = base else {
            return Err(StoreError::NotFound(id.to_string()));
        };

        let mut stmt = conn.prepare(
            "SELECT type_name FROM entity_types WHERE entity_id = ?1 ORDER BY slot",
        )?;
        let types = stmt
            .query_map(params![id.as_i64()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT stat_name, effort, base_stat FROM entity_stats
             WHERE entity_id = ?1 ORDER BY stat_name",
        )?;
        let stats = stmt
            .query_map(params![id.as_i64()], |row| {
                Ok(StatLine {
                    name: row.get(0)?,
                    effort: row.get(1)?,
                    base_stat: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT ability_name, is_hidden FROM entity_abilities
             WHERE entity_id = ?1 ORDER BY ability_name",
        )?;
        let abilities = stmt
            .query_map(params![id.as_i64()], |row| {
                Ok(AbilityLine {
                    name: row.get(0)?,
                    is_hidden: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT move_name, version_group, move_learn_method, level_learned_at
             FROM entity_moves WHERE entity_id = ?1
             ORDER BY move_name, version_group, move_learn_method",
        )?;
        let moves = stmt
            .query_map(params![id.as_i64()], |row| {
                Ok(MoveLine {
                    name: row.get(0)?,
                    version_group: row.get(1)?,
                    learn_method: row.get(2)?,
                    level_learned_at: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let evolution_chain = chain_for(&conn, id)?;

        Ok(PokemonDetailed {
            id: PokemonId::new(raw_id),
            name,
            height,
            weight,
            sprite_url,
            types,
            stats,
            abilities,
            moves,
            evolution_chain,
        })
    }
}

type RawSummary = (i64, String, i64, i64, Option<String>, String);

fn summary_row(row: &Row<'_>) -> rusqlite::Result<RawSummary> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn decode_summary(raw: RawSummary) -> StoreResult<PokemonSummary> {
    let (id, name, height, weight, sprite_url, type_names) = raw;
    Ok(PokemonSummary {
        id: PokemonId::new(id),
        name,
        height,
        weight,
        sprite_url,
        types: serde_json::from_str(&type_names)?,
    })
}

/// Reconstructs the complete evolution chain containing `id` in two passes:
/// walk edges backward from `id` to the root of its component (the node
/// with no incoming edge), then expand forward from that root. Querying any
/// member of a line therefore yields the same edge set.
fn chain_for(conn: &Connection, id: PokemonId) -> StoreResult<Vec<EvolutionStep>> {
    let mut stmt = conn.prepare(
        "WITH RECURSIVE backward(from_id, to_id, depth) AS (
             SELECT from_id, to_id, 0 FROM evolution_edges WHERE to_id = ?1
             UNION
             SELECT e.from_id, e.to_id, b.depth - 1
             FROM evolution_edges e
             JOIN backward b ON e.to_id = b.from_id
         ),
         root(root_id) AS (
             SELECT COALESCE((SELECT from_id FROM backward ORDER BY depth LIMIT 1), ?1)
         ),
         forward(from_id, to_id, min_level, trigger_name) AS (
             SELECT e.from_id, e.to_id, e.min_level, e.trigger_name
             FROM evolution_edges e
             JOIN root r ON e.from_id = r.root_id
             UNION
             SELECT e.from_id, e.to_id, e.min_level, e.trigger_name
             FROM evolution_edges e
             JOIN forward f ON e.from_id = f.to_id
         )
         SELECT f.from_id, p1.name, f.to_id, p2.name, f.min_level, f.trigger_name
         FROM forward f
         JOIN entities p1 ON p1.id = f.from_id
         JOIN entities p2 ON p2.id = f.to_id
         ORDER BY f.from_id, f.to_id",
    )?;
    let steps = stmt
        .query_map(params![id.as_i64()], |row| {
            Ok(EvolutionStep {
                from_id: PokemonId::new(row.get(0)?),
                from_name: row.get(1)?,
                to_id: PokemonId::new(row.get(2)?),
                to_name: row.get(3)?,
                min_level: row.get(4)?,
                trigger: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(steps)
}
