//! In-memory stand-in for the tender and bid document collections.

use crate::bid::Bid;
use crate::tender::Tender;
use crate::Id;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct Store {
    pub(crate) tenders: RwLock<HashMap<Id, Tender>>,
    pub(crate) bids: RwLock<HashMap<Id, Bid>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }
}
