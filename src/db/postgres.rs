use async_trait::async_trait;
use sqlx::{
    postgres::{PgArguments, PgPoolOptions, PgRow},
    query::Query,
    FromRow, PgConnection, PgPool, Postgres, QueryBuilder, Row,
};
use std::marker::PhantomData;

use super::{CatalogStore, GenreStore, ItemQuery, UserDirectory};
use crate::{
    error::{AppError, AppResult},
    models::{
        CatalogItem, Genre, GenreId, ItemDetails, ItemId, ItemKind, MovieDetails, NewItem,
        SeriesDetails, Status, User,
    },
    services::sort::OrderRule,
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the schema migrations, including the genre taxonomy
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Row layout of the columns specific to one item kind
pub trait PgItemDetails: ItemDetails {
    /// Kind-specific columns, in bind order
    const COLUMNS: &'static [&'static str];

    fn read_row(row: &PgRow) -> Result<Self, sqlx::Error>;

    /// Binds the values for [`Self::COLUMNS`], in order
    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q>;
}

impl PgItemDetails for MovieDetails {
    const COLUMNS: &'static [&'static str] = &[];

    fn read_row(_row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(MovieDetails {})
    }

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
    }
}

impl PgItemDetails for SeriesDetails {
    const COLUMNS: &'static [&'static str] = &["episodes"];

    fn read_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(SeriesDetails {
            episodes: row.try_get("episodes")?,
        })
    }

    fn bind<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query.bind(self.episodes)
    }
}

#[derive(FromRow)]
struct ItemRow {
    id: i64,
    title: String,
    summary: String,
    duration: i32,
    image_url: Option<String>,
    status: Option<String>,
    user_id: Option<i64>,
    owner_username: Option<String>,
}

fn select_sql(kind: ItemKind, extra_columns: &[&str]) -> String {
    let extra: String = extra_columns
        .iter()
        .map(|column| format!(", i.{}", column))
        .collect();

    format!(
        "SELECT i.id, i.title, i.summary, i.duration, i.image_url, i.status, i.user_id, \
         u.username AS owner_username{} FROM {} i LEFT JOIN users u ON u.id = i.user_id",
        extra,
        kind.table()
    )
}

fn insert_sql(kind: ItemKind, extra_columns: &[&str]) -> String {
    let columns: String = extra_columns
        .iter()
        .map(|column| format!(", {}", column))
        .collect();
    let placeholders: String = (0..extra_columns.len())
        .map(|offset| format!(", ${}", offset + 7))
        .collect();

    format!(
        "INSERT INTO {} (title, summary, duration, image_url, status, user_id{}) \
         VALUES ($1, $2, $3, $4, $5, $6{}) RETURNING id",
        kind.table(),
        columns,
        placeholders
    )
}

fn update_sql(kind: ItemKind, extra_columns: &[&str]) -> String {
    let assignments: String = extra_columns
        .iter()
        .enumerate()
        .map(|(offset, column)| format!(", {} = ${}", column, offset + 6))
        .collect();

    format!(
        "UPDATE {} SET title = $1, summary = $2, duration = $3, image_url = $4, status = $5{} \
         WHERE id = ${}",
        kind.table(),
        assignments,
        extra_columns.len() + 6
    )
}

fn genre_links_sql(kind: ItemKind) -> String {
    format!(
        "SELECT jg.{fk}, g.id, g.name FROM {table} jg JOIN genres g ON g.id = jg.genre_id \
         WHERE jg.{fk} = ANY($1)",
        fk = kind.genre_foreign_key(),
        table = kind.genre_table()
    )
}

fn parse_status(status: Option<String>) -> AppResult<Option<Status>> {
    status
        .map(|s| s.parse::<Status>())
        .transpose()
        .map_err(|e| AppError::Internal(format!("Corrupt status column: {}", e)))
}

/// PostgreSQL-backed store for one kind of catalog item
pub struct PgCatalogStore<D> {
    pool: PgPool,
    _kind: PhantomData<D>,
}

impl<D> Clone for PgCatalogStore<D> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<D> PgCatalogStore<D> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _kind: PhantomData,
        }
    }
}

impl<D: PgItemDetails> PgCatalogStore<D> {
    /// Turns item rows into items, loading every row's genres in one query
    async fn hydrate(&self, rows: Vec<PgRow>) -> AppResult<Vec<CatalogItem<D>>> {
        let mut items = Vec::with_capacity(rows.len());

        for row in rows {
            let base = ItemRow::from_row(&row)?;
            let details = D::read_row(&row)?;
            let owner = match (base.user_id, base.owner_username) {
                (Some(id), Some(username)) => Some(User::new(id, username)),
                _ => None,
            };

            items.push(CatalogItem {
                id: base.id,
                title: base.title,
                summary: base.summary,
                duration: base.duration,
                image_url: base.image_url,
                status: parse_status(base.status)?,
                genres: Default::default(),
                owner,
                details,
            });
        }

        if items.is_empty() {
            return Ok(items);
        }

        let ids: Vec<ItemId> = items.iter().map(|item| item.id).collect();
        let links: Vec<(i64, i64, String)> = sqlx::query_as(&genre_links_sql(D::KIND))
            .bind(&ids[..])
            .fetch_all(&self.pool)
            .await?;

        for (item_id, genre_id, name) in links {
            if let Some(item) = items.iter_mut().find(|item| item.id == item_id) {
                item.genres.insert(Genre::new(genre_id, name));
            }
        }

        Ok(items)
    }

    async fn link_genres(
        conn: &mut PgConnection,
        item_id: ItemId,
        genre_ids: &[GenreId],
    ) -> AppResult<()> {
        if genre_ids.is_empty() {
            return Ok(());
        }

        let kind = D::KIND;
        let sql = format!(
            "INSERT INTO {} ({}, genre_id) SELECT $1, UNNEST($2::bigint[])",
            kind.genre_table(),
            kind.genre_foreign_key()
        );

        sqlx::query(&sql)
            .bind(item_id)
            .bind(genre_ids)
            .execute(conn)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl<D: PgItemDetails> CatalogStore<D> for PgCatalogStore<D> {
    async fn find_by_id(&self, id: ItemId) -> AppResult<Option<CatalogItem<D>>> {
        let sql = format!("{} WHERE i.id = $1", select_sql(D::KIND, D::COLUMNS));
        let rows = sqlx::query(&sql).bind(id).fetch_all(&self.pool).await?;

        Ok(self.hydrate(rows).await?.into_iter().next())
    }

    async fn find_matching(
        &self,
        query: &ItemQuery,
        order: OrderRule,
    ) -> AppResult<Vec<CatalogItem<D>>> {
        let kind = D::KIND;
        let mut builder = QueryBuilder::<Postgres>::new(select_sql(kind, D::COLUMNS));
        builder.push(" WHERE TRUE");

        if let Some(owner) = query.owner {
            builder.push(" AND i.user_id = ").push_bind(owner);
        }

        if let Some(fragment) = &query.title_contains {
            builder
                .push(" AND strpos(lower(i.title), lower(")
                .push_bind(fragment.clone())
                .push(")) > 0");
        }

        if let Some(name) = &query.genre_name {
            builder
                .push(format!(
                    " AND EXISTS (SELECT 1 FROM {} jg JOIN genres g ON g.id = jg.genre_id \
                     WHERE jg.{} = i.id AND g.name = ",
                    kind.genre_table(),
                    kind.genre_foreign_key()
                ))
                .push_bind(name.clone())
                .push(")");
        }

        builder.push(" ORDER BY i.").push(order.to_sql());

        let rows = builder.build().fetch_all(&self.pool).await?;
        self.hydrate(rows).await
    }

    async fn insert(&self, item: NewItem<D>) -> AppResult<CatalogItem<D>> {
        let sql = insert_sql(D::KIND, D::COLUMNS);
        let genre_ids: Vec<GenreId> = item.genres.iter().map(|genre| genre.id).collect();

        let mut tx = self.pool.begin().await?;

        let query = sqlx::query(&sql)
            .bind(&item.title)
            .bind(&item.summary)
            .bind(item.duration)
            .bind(&item.image_url)
            .bind(item.status.map(|status| status.as_str()))
            .bind(item.owner.as_ref().map(|owner| owner.id));
        let row = item.details.bind(query).fetch_one(&mut *tx).await?;
        let id: ItemId = row.try_get("id")?;

        Self::link_genres(&mut *tx, id, &genre_ids).await?;
        tx.commit().await?;

        tracing::debug!(kind = %D::KIND, item_id = id, "Inserted catalog item");

        Ok(item.with_id(id))
    }

    async fn save(&self, item: &CatalogItem<D>) -> AppResult<CatalogItem<D>> {
        let kind = D::KIND;
        let sql = update_sql(kind, D::COLUMNS);

        let mut tx = self.pool.begin().await?;

        let query = sqlx::query(&sql)
            .bind(&item.title)
            .bind(&item.summary)
            .bind(item.duration)
            .bind(&item.image_url)
            .bind(item.status.map(|status| status.as_str()));
        let result = item
            .details
            .bind(query)
            .bind(item.id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound { kind, id: item.id });
        }

        let unlink = format!(
            "DELETE FROM {} WHERE {} = $1",
            kind.genre_table(),
            kind.genre_foreign_key()
        );
        sqlx::query(&unlink).bind(item.id).execute(&mut *tx).await?;
        Self::link_genres(&mut *tx, item.id, &item.genre_ids()).await?;

        tx.commit().await?;

        Ok(item.clone())
    }

    async fn delete(&self, id: ItemId) -> AppResult<()> {
        let kind = D::KIND;
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound { kind, id });
        }

        Ok(())
    }
}

/// PostgreSQL-backed genre taxonomy and user directory
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenreStore for PgStore {
    async fn find_by_ids(&self, ids: &[GenreId]) -> AppResult<Vec<Genre>> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT id, name FROM genres WHERE id = ANY($1) ORDER BY id")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(id, name)| Genre::new(id, name)).collect())
    }

    async fn list_all(&self) -> AppResult<Vec<Genre>> {
        let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM genres ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|(id, name)| Genre::new(id, name)).collect())
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT id, username FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(id, username)| User::new(id, username)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::sort::SortSpec;

    #[test]
    fn test_select_sql_includes_kind_columns() {
        let sql = select_sql(ItemKind::Series, SeriesDetails::COLUMNS);
        assert!(sql.contains("u.username AS owner_username, i.episodes FROM series i"));

        let sql = select_sql(ItemKind::Movie, MovieDetails::COLUMNS);
        assert!(sql.contains("owner_username FROM movies i"));
    }

    #[test]
    fn test_insert_sql_placeholders() {
        assert_eq!(
            insert_sql(ItemKind::Movie, MovieDetails::COLUMNS),
            "INSERT INTO movies (title, summary, duration, image_url, status, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id"
        );
        assert_eq!(
            insert_sql(ItemKind::Series, SeriesDetails::COLUMNS),
            "INSERT INTO series (title, summary, duration, image_url, status, user_id, episodes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id"
        );
    }

    #[test]
    fn test_update_sql_never_touches_owner() {
        let sql = update_sql(ItemKind::Series, SeriesDetails::COLUMNS);
        assert_eq!(
            sql,
            "UPDATE series SET title = $1, summary = $2, duration = $3, image_url = $4, \
             status = $5, episodes = $6 WHERE id = $7"
        );
        assert!(!sql.contains("user_id"));

        let sql = update_sql(ItemKind::Movie, MovieDetails::COLUMNS);
        assert!(sql.ends_with("status = $5 WHERE id = $6"));
    }

    #[test]
    fn test_genre_links_sql_uses_kind_join_table() {
        let sql = genre_links_sql(ItemKind::Movie);
        assert!(sql.contains("FROM movie_genres jg"));
        assert!(sql.contains("jg.movie_id = ANY($1)"));
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(
            parse_status(Some("COMPLETED".to_string())).unwrap(),
            Some(Status::Completed)
        );
        assert_eq!(parse_status(None).unwrap(), None);
        assert!(parse_status(Some("done".to_string())).is_err());
    }

    #[test]
    fn test_order_rule_sql() {
        assert_eq!(SortSpec::build(Some("DESC")).to_sql(), "title DESC");
    }
}
