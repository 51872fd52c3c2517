use std::convert::Infallible;

use chainquest_sdk::objects::Item;
use chainquest_sdk::objects::player::RewardGrantView;
use kanau::processor::Processor;
use time::OffsetDateTime;

use crate::store::MemoryStore;

/// Tokens and items granted to one recipient by one event. Never modified
/// once committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardGrant {
    pub recipient: String,
    pub tokens: u64,
    pub items: Vec<Item>,
    pub cause_event_id: String,
    pub granted_at: OffsetDateTime,
}

impl RewardGrant {
    pub fn to_view(&self) -> RewardGrantView {
        RewardGrantView {
            recipient: self.recipient.clone(),
            tokens: self.tokens,
            items: self.items.clone(),
            cause_event_id: self.cause_event_id.clone(),
            granted_at: self.granted_at,
        }
    }
}

/// Grants in commit order, optionally for one recipient.
#[derive(Debug, Clone, Default)]
pub struct ListRewardGrants {
    pub recipient: Option<String>,
}

impl Processor<ListRewardGrants> for MemoryStore {
    type Output = Vec<RewardGrant>;
    type Error = Infallible;
    #[tracing::instrument(skip_all, err, name = "STORE:ListRewardGrants")]
    async fn process(&self, query: ListRewardGrants) -> Result<Vec<RewardGrant>, Infallible> {
        let data = self.read().await;
        Ok(data
            .grants
            .iter()
            .filter(|g| {
                query
                    .recipient
                    .as_deref()
                    .is_none_or(|r| g.recipient == r)
            })
            .cloned()
            .collect())
    }
}
