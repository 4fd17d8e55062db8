use crate::schema::guide_sessions;
use crate::schema::guide_sessions::dsl;
use chrono::Utc;
use diesel::prelude::*;
#[cfg(not(feature = "pg"))]
use diesel::connection::SimpleConnection;
#[cfg(not(feature = "pg"))]
use diesel::r2d2::CustomizeConnection;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::result::Error as DieselError;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use guide_state::{Result, SessionStore, StoreError};
use log::{debug, info};
use serde_json::Value as JsonValue;
use std::sync::Arc;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

const DEFAULT_POOL_SIZE: u32 = 4;
#[cfg(not(feature = "pg"))]
const IN_MEMORY_URL: &str = ":memory:";

#[cfg(feature = "pg")]
type DbConn = PgConnection;
#[cfg(not(feature = "pg"))]
type DbConn = SqliteConnection;
type DbPool = Pool<ConnectionManager<DbConn>>;

/// `SessionStore` respaldado por una base de datos relacional.
#[derive(Clone)]
pub struct DieselSessionStore {
  pool: Arc<DbPool>,
}

#[derive(Debug, Queryable, Insertable)]
#[diesel(table_name = guide_sessions)]
struct SessionRow {
  session_key: String,
  payload: String,
  updated_at: String,
}

fn map_db_err(e: DieselError) -> StoreError {
  StoreError::Storage(format!("db: {}", e))
}

/// Ajustes de SQLite que valen por conexión: cada conexión nueva del pool
/// espera al bloqueo de escritura en lugar de fallar con `database is locked`.
#[cfg(not(feature = "pg"))]
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

#[cfg(not(feature = "pg"))]
impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
  fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
    conn.batch_execute("PRAGMA busy_timeout = 5000; PRAGMA journal_mode = WAL;")
        .map_err(diesel::r2d2::Error::QueryError)
  }
}

impl DieselSessionStore {
  /// Abre el pool y aplica las migraciones pendientes.
  pub fn new(database_url: &str, pool_size: u32) -> Result<Self> {
    let manager = ConnectionManager::<DbConn>::new(database_url);
    let builder = Pool::builder().max_size(pool_size.max(1));
    #[cfg(not(feature = "pg"))]
    let builder = builder.connection_customizer(Box::new(SqlitePragmas));
    let pool = builder.build(manager)
                      .map_err(|e| StoreError::Storage(format!("pool: {}", e)))?;
    let store = DieselSessionStore { pool: Arc::new(pool) };
    let mut conn = store.conn()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)
                      .map_err(|e| StoreError::Storage(format!("migraciones: {}", e)))?;
    if !applied.is_empty() {
      info!("guide-persistence: {} migración(es) aplicada(s)", applied.len());
    }
    drop(conn);
    Ok(store)
  }

  /// Base SQLite en memoria de una sola conexión (cada conexión `:memory:`
  /// ve su propia base, así que el pool no puede crecer).
  #[cfg(not(feature = "pg"))]
  pub fn in_memory() -> Result<Self> {
    Self::new(IN_MEMORY_URL, 1)
  }

  fn conn(&self) -> Result<PooledConnection<ConnectionManager<DbConn>>> {
    self.pool.get().map_err(|e| StoreError::Storage(format!("pool: {}", e)))
  }
}

impl SessionStore for DieselSessionStore {
  fn get(&self, key: &str) -> Result<Option<JsonValue>> {
    let mut conn = self.conn()?;
    let row = dsl::guide_sessions.filter(dsl::session_key.eq(key))
                                 .first::<SessionRow>(&mut conn)
                                 .optional()
                                 .map_err(map_db_err)?;
    match row {
      Some(r) => Ok(Some(serde_json::from_str(&r.payload)?)),
      None => Ok(None),
    }
  }

  fn set(&self, key: &str, value: JsonValue) -> Result<()> {
    let mut conn = self.conn()?;
    let row = SessionRow { session_key: key.to_string(),
                           payload: serde_json::to_string(&value)?,
                           updated_at: Utc::now().to_rfc3339() };
    diesel::insert_into(dsl::guide_sessions).values(&row)
                                            .on_conflict(dsl::session_key)
                                            .do_update()
                                            .set((dsl::payload.eq(&row.payload), dsl::updated_at.eq(&row.updated_at)))
                                            .execute(&mut conn)
                                            .map_err(map_db_err)?;
    debug!("guide-persistence: sesión '{}' guardada", key);
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<bool> {
    let mut conn = self.conn()?;
    let deleted = diesel::delete(dsl::guide_sessions.filter(dsl::session_key.eq(key))).execute(&mut conn)
                                                                                     .map_err(map_db_err)?;
    Ok(deleted > 0)
  }
}

/// Construye el almacén a partir de `GUIDE_DB_URL` (o `DATABASE_URL`) y
/// `GUIDE_DB_POOL_SIZE`.
///
/// Sin URL configurada se usa SQLite en memoria; con la feature `pg` la URL es
/// obligatoria y debe apuntar a Postgres.
pub fn new_from_env() -> Result<DieselSessionStore> {
  dotenvy::dotenv().ok();
  let url = std::env::var("GUIDE_DB_URL").or_else(|_| std::env::var("DATABASE_URL")).ok();
  let pool_size = match std::env::var("GUIDE_DB_POOL_SIZE") {
    Ok(raw) => raw.trim()
                  .parse::<u32>()
                  .map_err(|_| StoreError::Invalid(format!("GUIDE_DB_POOL_SIZE no es un número: {}", raw)))?,
    Err(_) => DEFAULT_POOL_SIZE,
  };
  open_url(url, pool_size)
}

#[cfg(feature = "pg")]
fn open_url(url: Option<String>, pool_size: u32) -> Result<DieselSessionStore> {
  let url = url.ok_or_else(|| StoreError::Storage("GUIDE_DB_URL / DATABASE_URL no definida".into()))?;
  let l = url.to_lowercase();
  if !(l.starts_with("postgres") || url.contains('@')) {
    return Err(StoreError::Storage("GUIDE_DB_URL no parece una URL de Postgres".into()));
  }
  DieselSessionStore::new(&url, pool_size)
}

#[cfg(not(feature = "pg"))]
fn open_url(url: Option<String>, pool_size: u32) -> Result<DieselSessionStore> {
  match url {
    Some(u) if u.to_lowercase().starts_with("postgres") => {
      Err(StoreError::Storage("guide-persistence se compiló sin la feature 'pg'; no puede abrir Postgres".into()))
    }
    Some(u) if u != IN_MEMORY_URL => DieselSessionStore::new(&u, pool_size),
    _ => DieselSessionStore::in_memory(),
  }
}
