use crate::error::Error;
use crate::store::Store;
use crate::Id;
use chrono::{DateTime, Utc};
use log::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum TenderStatus {
    Open,
    Closed,
    Awarded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Tender {
    #[schema(value_type = String, format = Uuid)]
    pub id: Id,
    #[schema(value_type = String, format = Uuid)]
    pub client_id: Id,
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub status: TenderStatus,
    pub deadline: DateTime<Utc>,
    pub attachment_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Tender {
    /// Whether bids may still be placed at `now`.
    pub fn accepts_bids_at(&self, now: DateTime<Utc>) -> Result<(), Error> {
        if self.status != TenderStatus::Open {
            return Err(Error::invalid(format!(
                "tender {} is not open for bidding",
                self.id
            )));
        }
        if now >= self.deadline {
            return Err(Error::invalid(format!(
                "tender {} deadline has passed",
                self.id
            )));
        }
        Ok(())
    }
}

/// Fields a client supplies when posting a tender.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewTender {
    #[schema(value_type = String, format = Uuid)]
    pub client_id: Id,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub budget: f64,
    pub deadline: DateTime<Utc>,
    pub attachment_url: Option<String>,
}

pub async fn create(store: &Store, params: NewTender) -> Result<Tender, Error> {
    debug!("New Tender to be inserted: {params:?}");

    if params.title.trim().is_empty() {
        return Err(Error::invalid("tender title must not be empty"));
    }
    if params.budget <= 0.0 {
        return Err(Error::invalid("tender budget must be greater than 0"));
    }

    let tender = Tender {
        id: Id::new_v4(),
        client_id: params.client_id,
        title: params.title,
        description: params.description,
        budget: params.budget,
        status: TenderStatus::Open,
        deadline: params.deadline,
        attachment_url: params.attachment_url,
        created_at: Utc::now(),
    };

    store.tenders.write().await.insert(tender.id, tender.clone());

    Ok(tender)
}

pub async fn find_by_id(store: &Store, id: Id) -> Result<Tender, Error> {
    store
        .tenders
        .read()
        .await
        .get(&id)
        .cloned()
        .ok_or_else(|| {
            error!("Tender with id {id} not found");
            Error::not_found(format!("tender {id}"))
        })
}

pub async fn update_status(store: &Store, id: Id, status: TenderStatus) -> Result<Tender, Error> {
    let mut tenders = store.tenders.write().await;

    match tenders.get_mut(&id) {
        Some(tender) => {
            debug!("Updating Tender {id} status {:?} -> {status:?}", tender.status);
            tender.status = status;
            Ok(tender.clone())
        }
        None => {
            error!("Tender with id {id} not found");
            Err(Error::not_found(format!("tender {id}")))
        }
    }
}

/// Remove a tender together with the bids placed on it.
pub async fn delete(store: &Store, id: Id) -> Result<(), Error> {
    if store.tenders.write().await.remove(&id).is_none() {
        error!("Tender with id {id} not found");
        return Err(Error::not_found(format!("tender {id}")));
    }

    let mut bids = store.bids.write().await;
    let before = bids.len();
    bids.retain(|_, bid| bid.tender_id != id);
    debug!("Deleted Tender {id} and {} of its bids", before - bids.len());

    Ok(())
}
