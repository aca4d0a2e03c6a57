use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct ConnectParams {
    /// The tender whose bid notifications this connection subscribes to.
    pub(crate) tender_id: Option<String>,
}

impl ConnectParams {
    /// The trimmed tender id, or `None` when it is missing or blank.
    pub(crate) fn topic(&self) -> Option<&str> {
        self.tender_id
            .as_deref()
            .map(str::trim)
            .filter(|tender_id| !tender_id.is_empty())
    }
}
