use crate::prompts::PromptTemplate;
use async_trait::async_trait;
use murmur_common::Result;

#[async_trait]
pub trait AnswerSearch: Send + Sync {
    /// Submit `query` and return the synthesized answer, or a classified error.
    async fn try_search(&self, query: &str) -> Result<String>;

    /// Submit `query`; failures degrade to an `"Error: <description>"` string.
    async fn search(&self, query: &str) -> String {
        match self.try_search(query).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    target: "answers",
                    kind = ?e.kind(),
                    error = %e,
                    "answers.search.degraded"
                );
                e.to_marker()
            }
        }
    }

    /// Ask for `num_examples` verbatim quotes about `topic` from `r/{forum}`.
    async fn search_reddit(&self, forum: &str, topic: &str, num_examples: u32) -> String {
        let template = PromptTemplate::RedditDiscussions {
            forum,
            topic,
            num_examples,
        };
        tracing::debug!(target: "answers", template = template.name(), forum, topic, "answers.template");
        self.search(&template.render()).await
    }

    /// Ask for ten pain-point quotes about `category`.
    async fn find_pain_points(&self, category: &str, keywords: &str) -> String {
        let template = PromptTemplate::PainPoints { category, keywords };
        tracing::debug!(target: "answers", template = template.name(), category, "answers.template");
        self.search(&template.render()).await
    }
}
