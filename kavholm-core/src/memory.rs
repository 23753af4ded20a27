use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;

use crate::models::{Booking, BookingRecord, Listing, User};
use crate::repository::{BookingRepository, ListingRepository, RepoError, UserRepository};

#[derive(Debug, Clone)]
struct StoredBooking {
    id: i64,
    payment_method: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    guests: i32,
    total_cost: i64,
    listing_id: i64,
    user_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    listings: Vec<Listing>,
    bookings: Vec<StoredBooking>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn username(&self, user_id: i64) -> Option<&str> {
        self.users.iter().find(|u| u.id == user_id).map(|u| u.username.as_str())
    }

    fn user_id(&self, username: &str) -> Option<i64> {
        self.users.iter().find(|u| u.username == username).map(|u| u.id)
    }

    fn listing(&self, listing_id: i64) -> Option<&Listing> {
        self.listings.iter().find(|l| l.id == listing_id)
    }

    /// Joins a stored row against the current users and listings. Rows whose
    /// references no longer resolve are skipped, as an inner join would.
    fn enrich(&self, row: &StoredBooking) -> Option<Booking> {
        let username = self.username(row.user_id)?;
        let host_id = self.listing(row.listing_id)?.user_id;
        let host_username = self.username(host_id)?;

        Some(Booking {
            id: row.id,
            payment_method: row.payment_method.clone(),
            start_date: row.start_date,
            end_date: row.end_date,
            guests: row.guests,
            total_cost: row.total_cost,
            listing_id: row.listing_id,
            user_id: row.user_id,
            username: username.to_string(),
            host_username: host_username.to_string(),
            created_at: row.created_at,
        })
    }

    fn newest_first<F>(&self, keep: F) -> Vec<Booking>
    where
        F: Fn(&StoredBooking) -> bool,
    {
        let mut rows: Vec<&StoredBooking> = self.bookings.iter().filter(|b| keep(*b)).collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        rows.into_iter().filter_map(|row| self.enrich(row)).collect()
    }
}

/// Process-local store implementing every repository trait. Used by tests and
/// for running the API without a database.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, username: &str) -> User {
        let mut tables = self.tables.write().await;
        let user = User {
            id: tables.next_id(),
            username: username.to_string(),
        };
        tables.users.push(user.clone());
        user
    }

    pub async fn add_listing(&self, owner_id: i64, price: i64) -> Listing {
        let mut tables = self.tables.write().await;
        let listing = Listing {
            id: tables.next_id(),
            user_id: owner_id,
            price,
        };
        tables.listings.push(listing.clone());
        listing
    }

    /// Returns false when no user has the old name.
    pub async fn rename_user(&self, from: &str, to: &str) -> bool {
        let mut tables = self.tables.write().await;
        match tables.users.iter_mut().find(|u| u.username == from) {
            Some(user) => {
                user.username = to.to_string();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn fetch_booking(&self, id: i64) -> Result<Option<Booking>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookings
            .iter()
            .find(|b| b.id == id)
            .and_then(|row| tables.enrich(row)))
    }

    async fn list_bookings_by_creator(&self, username: &str) -> Result<Vec<Booking>, RepoError> {
        let tables = self.tables.read().await;
        let Some(user_id) = tables.user_id(username) else {
            return Ok(Vec::new());
        };
        Ok(tables.newest_first(|b| b.user_id == user_id))
    }

    async fn list_bookings_by_host(&self, username: &str) -> Result<Vec<Booking>, RepoError> {
        let tables = self.tables.read().await;
        let Some(host_id) = tables.user_id(username) else {
            return Ok(Vec::new());
        };
        Ok(tables.newest_first(|b| {
            tables
                .listing(b.listing_id)
                .is_some_and(|l| l.user_id == host_id)
        }))
    }

    async fn insert_booking(&self, record: &BookingRecord) -> Result<Booking, RepoError> {
        let mut tables = self.tables.write().await;

        if tables.username(record.user_id).is_none() {
            return Err(format!("user {} does not exist", record.user_id).into());
        }
        if tables.listing(record.listing_id).is_none() {
            return Err(format!("listing {} does not exist", record.listing_id).into());
        }

        let row = StoredBooking {
            id: tables.next_id(),
            payment_method: record.payment_method.clone(),
            start_date: record.start_date,
            end_date: record.end_date,
            guests: record.guests,
            total_cost: record.total_cost,
            listing_id: record.listing_id,
            user_id: record.user_id,
            created_at: Utc::now(),
        };
        tables.bookings.push(row.clone());

        tables
            .enrich(&row)
            .ok_or_else(|| RepoError::from("listing owner does not exist"))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl ListingRepository for InMemoryStore {
    async fn fetch_listing(&self, id: i64) -> Result<Option<Listing>, RepoError> {
        Ok(self.tables.read().await.listing(id).cloned())
    }
}
