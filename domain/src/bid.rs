use crate::error::Error;
use crate::store::Store;
use crate::{tender, Id};
use chrono::{DateTime, Utc};
use events::{DomainEvent, EventPublisher};
use log::*;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Bid {
    #[schema(value_type = String, format = Uuid)]
    pub id: Id,
    #[schema(value_type = String, format = Uuid)]
    pub tender_id: Id,
    #[schema(value_type = String, format = Uuid)]
    pub contractor_id: Id,
    pub price: f64,
    /// Promised delivery time in days.
    pub delivery_time: i64,
    pub comments: String,
    pub status: BidStatus,
    pub created_at: DateTime<Utc>,
}

/// Fields a contractor supplies when bidding on a tender.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewBid {
    #[schema(value_type = String, format = Uuid)]
    pub tender_id: Id,
    #[schema(value_type = String, format = Uuid)]
    pub contractor_id: Id,
    pub price: f64,
    pub delivery_time: i64,
    #[serde(default)]
    pub comments: String,
}

/// Optional narrowing of a tender's bid list. Unset or non-positive bounds are ignored.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BidFilter {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub max_delivery: Option<i64>,
}

impl BidFilter {
    pub fn matches(&self, bid: &Bid) -> bool {
        let positive = |bound: Option<f64>| bound.filter(|value| *value > 0.0);

        positive(self.min_price).map_or(true, |min| bid.price >= min)
            && positive(self.max_price).map_or(true, |max| bid.price <= max)
            && self
                .max_delivery
                .filter(|days| *days > 0)
                .map_or(true, |max| bid.delivery_time <= max)
    }
}

/// Store a bid on an open tender and announce it.
///
/// The `BidCreated` event is published after the bid is stored; whatever happens
/// to the notification does not affect the result.
pub async fn create(
    store: &Store,
    event_publisher: &EventPublisher,
    params: NewBid,
) -> Result<Bid, Error> {
    debug!("New Bid to be inserted: {params:?}");

    if params.price <= 0.0 {
        return Err(Error::invalid("price must be greater than 0"));
    }
    if params.delivery_time <= 0 {
        return Err(Error::invalid("delivery time must be greater than 0"));
    }

    let tender = tender::find_by_id(store, params.tender_id).await?;
    tender.accepts_bids_at(Utc::now())?;

    let bid = Bid {
        id: Id::new_v4(),
        tender_id: tender.id,
        contractor_id: params.contractor_id,
        price: params.price,
        delivery_time: params.delivery_time,
        comments: params.comments,
        status: BidStatus::Pending,
        created_at: Utc::now(),
    };

    store.bids.write().await.insert(bid.id, bid.clone());
    info!("Stored bid {} on tender {}", bid.id, bid.tender_id);

    match serde_json::to_value(&bid) {
        Ok(value) => {
            event_publisher
                .publish(DomainEvent::BidCreated {
                    tender_id: bid.tender_id,
                    bid: value,
                })
                .await
        }
        Err(e) => error!("Failed to serialize bid {} for notification: {e}", bid.id),
    }

    Ok(bid)
}

pub async fn find_by_id(store: &Store, id: Id) -> Result<Bid, Error> {
    store
        .bids
        .read()
        .await
        .get(&id)
        .cloned()
        .ok_or_else(|| Error::not_found(format!("bid {id}")))
}

/// Bids placed on `tender_id`, oldest first.
pub async fn find_by_tender(
    store: &Store,
    tender_id: Id,
    filter: &BidFilter,
) -> Result<Vec<Bid>, Error> {
    let mut bids: Vec<Bid> = store
        .bids
        .read()
        .await
        .values()
        .filter(|bid| bid.tender_id == tender_id && filter.matches(bid))
        .cloned()
        .collect();

    bids.sort_by_key(|bid| bid.created_at);

    Ok(bids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, EntityErrorKind, InternalErrorKind};
    use crate::tender::{NewTender, TenderStatus};
    use async_trait::async_trait;
    use chrono::Duration;
    use events::EventHandler;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingHandler {
        events: Mutex<Vec<DomainEvent>>,
    }

    #[async_trait]
    impl EventHandler for RecordingHandler {
        async fn handle(&self, event: &DomainEvent) {
            self.events.lock().await.push(event.clone());
        }
    }

    async fn open_tender(store: &Store) -> tender::Tender {
        tender::create(
            store,
            NewTender {
                client_id: Id::new_v4(),
                title: "Road repair".to_string(),
                description: String::new(),
                budget: 10_000.0,
                deadline: Utc::now() + Duration::days(3),
                attachment_url: None,
            },
        )
        .await
        .unwrap()
    }

    fn new_bid(tender_id: Id, price: f64, delivery_time: i64) -> NewBid {
        NewBid {
            tender_id,
            contractor_id: Id::new_v4(),
            price,
            delivery_time,
            comments: "ready to start".to_string(),
        }
    }

    fn invalid() -> DomainErrorKind {
        DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Invalid))
    }

    #[tokio::test]
    async fn test_create_stores_pending_bid_and_publishes_event() {
        let store = Store::new();
        let recorder = Arc::new(RecordingHandler::default());
        let publisher = EventPublisher::new().with_handler(recorder.clone());
        let tender = open_tender(&store).await;

        let bid = create(&store, &publisher, new_bid(tender.id, 900.0, 14))
            .await
            .unwrap();

        assert_eq!(bid.status, BidStatus::Pending);
        assert_eq!(find_by_id(&store, bid.id).await.unwrap(), bid);

        let events = recorder.events.lock().await;
        assert_eq!(events.len(), 1);
        match &events[0] {
            DomainEvent::BidCreated {
                tender_id,
                bid: payload,
            } => {
                assert_eq!(*tender_id, tender.id);
                assert_eq!(payload["id"], bid.id.to_string());
                assert_eq!(payload["status"], "pending");
            }
        }
    }

    #[tokio::test]
    async fn test_create_rejects_non_positive_price_and_delivery() {
        let store = Store::new();
        let publisher = EventPublisher::new();
        let tender = open_tender(&store).await;

        let err = create(&store, &publisher, new_bid(tender.id, 0.0, 5))
            .await
            .unwrap_err();
        assert_eq!(err.error_kind, invalid());

        let err = create(&store, &publisher, new_bid(tender.id, 10.0, 0))
            .await
            .unwrap_err();
        assert_eq!(err.error_kind, invalid());
    }

    #[tokio::test]
    async fn test_create_on_missing_tender_is_not_found() {
        let store = Store::new();
        let err = create(&store, &EventPublisher::new(), new_bid(Id::new_v4(), 10.0, 5))
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound))
        );
    }

    #[tokio::test]
    async fn test_create_on_closed_tender_is_rejected_without_event() {
        let store = Store::new();
        let recorder = Arc::new(RecordingHandler::default());
        let publisher = EventPublisher::new().with_handler(recorder.clone());
        let tender = open_tender(&store).await;
        tender::update_status(&store, tender.id, TenderStatus::Closed)
            .await
            .unwrap();

        let err = create(&store, &publisher, new_bid(tender.id, 10.0, 5))
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, invalid());
        assert!(recorder.events.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_after_deadline_is_rejected() {
        let store = Store::new();
        let mut tender = open_tender(&store).await;
        tender.deadline = Utc::now() - Duration::hours(1);
        store.tenders.write().await.insert(tender.id, tender.clone());

        let err = create(&store, &EventPublisher::new(), new_bid(tender.id, 10.0, 5))
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, invalid());
    }

    #[tokio::test]
    async fn test_find_by_tender_applies_filter() {
        let store = Store::new();
        let publisher = EventPublisher::new();
        let tender = open_tender(&store).await;
        let other = open_tender(&store).await;

        create(&store, &publisher, new_bid(tender.id, 100.0, 30))
            .await
            .unwrap();
        create(&store, &publisher, new_bid(tender.id, 500.0, 10))
            .await
            .unwrap();
        create(&store, &publisher, new_bid(tender.id, 900.0, 5))
            .await
            .unwrap();
        create(&store, &publisher, new_bid(other.id, 500.0, 10))
            .await
            .unwrap();

        let all = find_by_tender(&store, tender.id, &BidFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let filter = BidFilter {
            min_price: Some(200.0),
            max_price: Some(800.0),
            max_delivery: None,
        };
        let priced = find_by_tender(&store, tender.id, &filter).await.unwrap();
        assert_eq!(priced.len(), 1);
        assert_eq!(priced[0].price, 500.0);

        let quick = BidFilter {
            max_delivery: Some(10),
            ..Default::default()
        };
        assert_eq!(
            find_by_tender(&store, tender.id, &quick).await.unwrap().len(),
            2
        );
    }

    #[test]
    fn test_non_positive_filter_bounds_are_ignored() {
        let bid = Bid {
            id: Id::new_v4(),
            tender_id: Id::new_v4(),
            contractor_id: Id::new_v4(),
            price: 50.0,
            delivery_time: 40,
            comments: String::new(),
            status: BidStatus::Pending,
            created_at: Utc::now(),
        };
        let filter = BidFilter {
            min_price: Some(0.0),
            max_price: Some(-1.0),
            max_delivery: Some(0),
        };
        assert!(filter.matches(&bid));
    }
}
