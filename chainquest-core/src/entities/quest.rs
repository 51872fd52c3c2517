use std::convert::Infallible;

use chainquest_sdk::objects::player::QuestCompletionView;
use kanau::processor::Processor;
use time::OffsetDateTime;

use crate::store::MemoryStore;

/// Ledger row of one completed quest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestCompletion {
    pub player: String,
    pub quest_id: String,
    pub xp: u64,
    pub event_id: String,
    pub completed_at: OffsetDateTime,
}

impl QuestCompletion {
    pub fn to_view(&self) -> QuestCompletionView {
        QuestCompletionView {
            quest_id: self.quest_id.clone(),
            xp: self.xp,
            event_id: self.event_id.clone(),
            completed_at: self.completed_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListQuestCompletions {
    pub player: String,
}

impl Processor<ListQuestCompletions> for MemoryStore {
    type Output = Vec<QuestCompletion>;
    type Error = Infallible;
    #[tracing::instrument(skip_all, err, name = "STORE:ListQuestCompletions")]
    async fn process(
        &self,
        query: ListQuestCompletions,
    ) -> Result<Vec<QuestCompletion>, Infallible> {
        let data = self.read().await;
        Ok(data
            .quest_completions
            .iter()
            .filter(|q| q.player == query.player)
            .cloned()
            .collect())
    }
}
