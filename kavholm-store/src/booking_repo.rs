use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use kavholm_core::models::{Booking, BookingRecord, Listing, User};
use kavholm_core::repository::{BookingRepository, ListingRepository, RepoError, UserRepository};

/// Enriched booking select over a `b` relation. Creator and host usernames
/// come from joins against `users`, so they are always current.
macro_rules! enriched_bookings {
    ($source:literal, $tail:literal) => {
        enriched_bookings!("", $source, $tail)
    };
    ($prefix:literal, $source:literal, $tail:literal) => {
        concat!(
            $prefix,
            "SELECT b.id, b.payment_method, b.start_date, b.end_date, b.guests, b.total_cost, ",
            "b.listing_id, b.user_id, creator.username AS username, host.username AS host_username, ",
            "b.created_at ",
            "FROM ", $source, " ",
            "JOIN users AS creator ON creator.id = b.user_id ",
            "JOIN listings AS l ON l.id = b.listing_id ",
            "JOIN users AS host ON host.id = l.user_id ",
            $tail
        )
    };
}

const FETCH_BOOKING: &str = enriched_bookings!("bookings AS b", "WHERE b.id = $1");

const LIST_BY_CREATOR: &str = enriched_bookings!(
    "bookings AS b",
    "WHERE creator.username = $1 ORDER BY b.created_at DESC, b.id DESC"
);

const LIST_BY_HOST: &str = enriched_bookings!(
    "bookings AS b",
    "WHERE host.username = $1 ORDER BY b.created_at DESC, b.id DESC"
);

// Insert and read back in one round trip.
const INSERT_BOOKING: &str = enriched_bookings!(
    "WITH inserted AS (INSERT INTO bookings \
     (payment_method, start_date, end_date, guests, total_cost, listing_id, user_id) \
     VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *) ",
    "inserted AS b",
    ""
);

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i64,
    payment_method: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    guests: i32,
    total_cost: i64,
    listing_id: i64,
    user_id: i64,
    username: String,
    host_username: String,
    created_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            payment_method: row.payment_method,
            start_date: row.start_date,
            end_date: row.end_date,
            guests: row.guests,
            total_cost: row.total_cost,
            listing_id: row.listing_id,
            user_id: row.user_id,
            username: row.username,
            host_username: row.host_username,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
}

#[derive(sqlx::FromRow)]
struct ListingRow {
    id: i64,
    user_id: i64,
    price: i64,
}

/// Postgres-backed implementation of the booking, user and listing
/// repositories.
#[derive(Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PgBookingStore {
    async fn fetch_booking(&self, id: i64) -> Result<Option<Booking>, RepoError> {
        let row = sqlx::query_as::<_, BookingRow>(FETCH_BOOKING)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Booking::from))
    }

    async fn list_bookings_by_creator(&self, username: &str) -> Result<Vec<Booking>, RepoError> {
        let rows = sqlx::query_as::<_, BookingRow>(LIST_BY_CREATOR)
            .bind(username)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }

    async fn list_bookings_by_host(&self, username: &str) -> Result<Vec<Booking>, RepoError> {
        let rows = sqlx::query_as::<_, BookingRow>(LIST_BY_HOST)
            .bind(username)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }

    async fn insert_booking(&self, record: &BookingRecord) -> Result<Booking, RepoError> {
        let row = sqlx::query_as::<_, BookingRow>(INSERT_BOOKING)
            .bind(&record.payment_method)
            .bind(record.start_date)
            .bind(record.end_date)
            .bind(record.guests)
            .bind(record.total_cost)
            .bind(record.listing_id)
            .bind(record.user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }
}

#[async_trait]
impl UserRepository for PgBookingStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT id, username FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| User {
            id: r.id,
            username: r.username,
        }))
    }
}

#[async_trait]
impl ListingRepository for PgBookingStore {
    async fn fetch_listing(&self, id: i64) -> Result<Option<Listing>, RepoError> {
        let row = sqlx::query_as::<_, ListingRow>("SELECT id, user_id, price FROM listings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| Listing {
            id: r.id,
            user_id: r.user_id,
            price: r.price,
        }))
    }
}
